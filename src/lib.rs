//! An interactive integer expression language with persistent variables,
//! comparisons, the `?:` conditional and user functions declared with
//! `deffn`, recursion included.
//!
//! ```
//! use deffn::{Outcome, Session};
//!
//! let mut session = Session::new();
//! session.evaluate("deffn fact(n) = n <= 1 ? 1 : n * fact(n-1)").unwrap();
//! assert_eq!(session.evaluate("fact(5)").unwrap(), Outcome::Value(120));
//! assert_eq!(session.evaluate("+1").unwrap(), Outcome::Value(121));
//! ```

pub mod parser;
pub use parser::{Expression, Signature, Span, SyntaxError};

mod environment;
pub use environment::{Environment, FunctionTable};

pub mod interpreter;
pub use interpreter::{Limits, RuntimeError};

mod error;
pub use error::{Error, ErrorKind};

mod session;
pub use session::{evaluate, request_tokens, Outcome, Session, SessionState, PRELUDE};
