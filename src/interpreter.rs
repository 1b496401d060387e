use crate::environment::{Environment, FunctionTable};
use crate::parser::{Expression, Locatable, Operator, Span};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("undefined function '{name}' at {span}")]
    UndefinedFunction { name: String, span: Span },
    #[error("division by zero in {expression} at {span}")]
    DivisionByZero { expression: String, span: Span },
    #[error("'{name}' takes {expected} arguments but {found} were given at {span}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("call to '{name}' exceeds the maximum call depth of {limit}")]
    CallDepthExceeded { name: String, limit: usize },
    #[error("evaluation nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error("cannot reserve a {bytes} byte stack for evaluation")]
    StackUnavailable { bytes: usize },
}

type Result<T> = std::result::Result<T, RuntimeError>;

// Stack reserved per level of evaluator recursion, and for everything else
// a request needs (tokenizing, parsing, rendering errors).
const FRAME_BYTES: usize = 4 * 1024;
const BASE_STACK_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Nested user function calls allowed before evaluation gives up.
    pub max_call_depth: usize,
    /// Nested subexpressions, summed over all active calls.
    pub max_nesting: usize,
}

impl Limits {
    /// Stack a request needs so that hitting either limit is reported as an
    /// error before the native stack runs out.
    pub fn stack_size(&self) -> usize {
        self.max_nesting
            .saturating_mul(FRAME_BYTES)
            .saturating_add(BASE_STACK_BYTES)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_call_depth: 10_000,
            max_nesting: 50_000,
        }
    }
}

/// Evaluates `expr` with the default limits on the calling thread, whose
/// stack has to be at least `Limits::default().stack_size()` for deep
/// recursion to fail cleanly.
pub fn evaluate(expr: &Expression, env: &mut Environment, functions: &FunctionTable) -> Result<i64> {
    Evaluator::new(functions, Limits::default()).evaluate(expr, env)
}

pub struct Evaluator<'a> {
    functions: &'a FunctionTable,
    limits: Limits,
    depth: usize,
    nesting: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(functions: &'a FunctionTable, limits: Limits) -> Self {
        Evaluator {
            functions,
            limits,
            depth: 0,
            nesting: 0,
        }
    }

    pub fn evaluate(&mut self, expr: &Expression, env: &mut Environment) -> Result<i64> {
        if self.nesting >= self.limits.max_nesting {
            return Err(RuntimeError::NestingTooDeep {
                limit: self.limits.max_nesting,
            });
        }
        self.nesting += 1;
        let value = self.visit(expr, env);
        self.nesting -= 1;
        value
    }

    fn visit(&mut self, expr: &Expression, env: &mut Environment) -> Result<i64> {
        match expr {
            Expression::Literal(value, _) => Ok(*value),
            Expression::Variable(name) => Ok(env.lookup(name.as_str())),
            Expression::Binary(Operator::Assign, operands) => {
                let value = self.evaluate(&operands.1, env)?;
                match &operands.0 {
                    Expression::Variable(name) => env.assign(name.as_str(), value),
                    // The parser only builds variable targets; anything else
                    // is stored under its rendering.
                    target => env.assign(&target.to_string(), value),
                }
                Ok(value)
            }
            Expression::Binary(op, operands) => {
                let left = self.evaluate(&operands.0, env)?;
                let right = self.evaluate(&operands.1, env)?;
                self.binary_operation(*op, left, right, expr)
            }
            Expression::Conditional(branches) => {
                if self.evaluate(&branches.0, env)? != 0 {
                    self.evaluate(&branches.1, env)
                } else {
                    self.evaluate(&branches.2, env)
                }
            }
            Expression::Call(name, arguments, close) => {
                self.visit_call_expr(name.as_str(), arguments, name.span.till(close), env)
            }
        }
    }

    fn binary_operation(&self, op: Operator, left: i64, right: i64, expr: &Expression) -> Result<i64> {
        let value = match op {
            Operator::Plus => left.wrapping_add(right),
            Operator::Minus => left.wrapping_sub(right),
            Operator::Times => left.wrapping_mul(right),
            Operator::Divide | Operator::Modulo if right == 0 => {
                return Err(RuntimeError::DivisionByZero {
                    expression: expr.to_string(),
                    span: expr.span(),
                })
            }
            Operator::Divide => left.wrapping_div(right),
            Operator::Modulo => left.wrapping_rem(right),
            Operator::Equal => i64::from(left == right),
            Operator::NotEqual => i64::from(left != right),
            Operator::LessThanEqual => i64::from(left <= right),
            Operator::LessThan => i64::from(left < right),
            Operator::GreaterThanEqual => i64::from(left >= right),
            Operator::GreaterThan => i64::from(left > right),
            Operator::Assign => unreachable!("assignment is evaluated before its operands"),
        };
        Ok(value)
    }

    // Arguments are evaluated in the caller's environment; the body runs in
    // a fresh one that is dropped on return.
    fn visit_call_expr(
        &mut self,
        name: &str,
        arguments: &[Expression],
        span: Span,
        env: &mut Environment,
    ) -> Result<i64> {
        let functions = self.functions;
        let function = functions
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_string(),
                span: span.clone(),
            })?;

        let mut evaluated_args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            evaluated_args.push(self.evaluate(arg, env)?);
        }
        if evaluated_args.len() > function.arity() {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: function.arity(),
                found: evaluated_args.len(),
                span,
            });
        }
        if self.depth >= self.limits.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                name: name.to_string(),
                limit: self.limits.max_call_depth,
            });
        }

        let mut locals = Environment::new();
        for (i, parameter) in function.parameters().enumerate() {
            locals.assign(parameter, evaluated_args.get(i).copied().unwrap_or(0));
        }
        self.depth += 1;
        let result = self.evaluate(function.body(), &mut locals);
        self.depth -= 1;
        result
    }
}
