mod ast;
mod error;
mod grammar;
mod locations;
pub mod tokenizer;

pub use ast::*;
pub use error::SyntaxError;
pub use grammar::{parse, Parser};
pub use locations::{Locatable, Location, Span};
pub use tokenizer::{tokenize_string, Token, TokenSequence, TokenType, Tokenizer};
