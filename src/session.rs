use crate::environment::{Environment, FunctionTable};
use crate::error::Error;
use crate::interpreter::{Evaluator, Limits, RuntimeError};
use crate::parser::{
    parse, tokenize_string, Signature, Statement, SyntaxError, Token, TokenSequence, TokenType,
};

/// Sample functions a fresh interactive session starts with.
pub const PRELUDE: [&str; 14] = [
    "deffn gcf(a,b) = (rem = a%b) == 0?b:gcf(b,rem)",
    "deffn lcm(a,b) = a*b/gcf(a,b)",
    "deffn mod(a,b) = a % b",
    "deffn sqr(s) = s*s",
    "deffn abs(x) = x > 0 ? x : -x",
    "deffn cube(x) = x * x * x",
    "deffn sum3(x,y,z) = x + y + z",
    "deffn avg5(x,y,z,a,b) = (x + y + z + a + b)/5",
    "deffn odd(x) = x%2?1:0",
    "deffn even(x) = x%2?0:1",
    "deffn neg(x) = -x",
    "deffn fact(n) = n <= 1 ? 1 : n * fact(n-1)",
    "deffn pow(a,b)= b==0?1:a*pow(a,b-1)",
    "deffn fib(n) = n <2?n:fib(n-1)+fib(n-2)",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Value(i64),
    Defined(Signature),
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Defined(signature) => write!(f, "Define {signature}"),
        }
    }
}

/// State carried from one request to the next besides the two tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Result of the last successful expression, 0 before the first one.
    pub previous: i64,
    pub limits: Limits,
}

/// Tokenizes, parses and evaluates one request.
///
/// A line that does not start with a number, a name or `(` continues the
/// previous result: after `7`, the line `+5` means `7+5`.
///
/// Nothing is changed unless the whole request succeeds. Definitions are
/// registered once their body has parsed, and expressions run against a
/// copy of `variables` that is only written back on success.
///
/// The request runs on its own thread with a stack of
/// `state.limits.stack_size()` bytes, so deep input and runaway recursion
/// end in an error whatever thread the caller is on.
pub fn evaluate(
    text: &str,
    variables: &mut Environment,
    functions: &mut FunctionTable,
    state: &mut SessionState,
) -> Result<Outcome, Error> {
    let bytes = state.limits.stack_size();
    let worker = std::thread::Builder::new()
        .name("deffn-eval".to_string())
        .stack_size(bytes);
    std::thread::scope(|scope| -> Result<Outcome, Error> {
        let handle = worker
            .spawn_scoped(scope, move || {
                evaluate_here(text, variables, functions, state)
            })
            .map_err(|_| RuntimeError::StackUnavailable { bytes })?;
        handle
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
    })
}

fn evaluate_here(
    text: &str,
    variables: &mut Environment,
    functions: &mut FunctionTable,
    state: &mut SessionState,
) -> Result<Outcome, Error> {
    match parse(request_tokens(text, state.previous)?)? {
        Statement::Definition(definition) => Ok(Outcome::Defined(functions.define(definition))),
        Statement::Expression(expr) => {
            let mut working = variables.clone();
            let value = Evaluator::new(functions, state.limits).evaluate(&expr, &mut working)?;
            *variables = working;
            state.previous = value;
            Ok(Outcome::Value(value))
        }
    }
}

/// Tokens of a request as the parser receives them, with `previous`
/// prepended when the line does not start with an operand.
pub fn request_tokens(text: &str, previous: i64) -> Result<TokenSequence, SyntaxError> {
    let mut tokens = tokenize_string(text)?;
    if tokens.peek().is_some_and(|first| !starts_operand(first)) {
        tokens.prepend(Token::number(previous));
    }
    Ok(tokens)
}

// The keyword is a NAME token, so it is covered here too.
fn starts_operand(token: &Token) -> bool {
    matches!(
        token.typ(),
        TokenType::NUMBER | TokenType::NAME | TokenType::LPAR
    )
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    variables: Environment,
    functions: FunctionTable,
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            state: SessionState {
                previous: 0,
                limits,
            },
            ..Self::default()
        }
    }

    pub fn evaluate(&mut self, text: &str) -> Result<Outcome, Error> {
        evaluate(
            text,
            &mut self.variables,
            &mut self.functions,
            &mut self.state,
        )
    }

    /// Registers the sample functions and returns their signatures.
    pub fn load_prelude(&mut self) -> Result<Vec<Signature>, Error> {
        let mut signatures = Vec::with_capacity(PRELUDE.len());
        for source in PRELUDE {
            if let Outcome::Defined(signature) = self.evaluate(source)? {
                signatures.push(signature);
            }
        }
        Ok(signatures)
    }

    pub fn variables(&self) -> &Environment {
        &self.variables
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn previous(&self) -> i64 {
        self.state.previous
    }
}
