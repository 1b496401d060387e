use crate::interpreter::RuntimeError;
use crate::parser::{Span, SyntaxError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Coarse classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedSyntax,
    UndefinedFunction,
    ArithmeticFault,
    ParameterOrArgumentOverflow,
    ArityMismatch,
    /// Too many nested calls or subexpressions at evaluation time.
    CallDepthExceeded,
    /// No thread with a large enough stack could be started.
    ResourceExhausted,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MalformedSyntax => "MalformedSyntax",
            Self::UndefinedFunction => "UndefinedFunction",
            Self::ArithmeticFault => "ArithmeticFault",
            Self::ParameterOrArgumentOverflow => "ParameterOrArgumentOverflow",
            Self::ArityMismatch => "ArityMismatch",
            Self::CallDepthExceeded => "CallDepthExceeded",
            Self::ResourceExhausted => "ResourceExhausted",
        };
        f.write_str(name)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax(err) if err.is_overflow() => ErrorKind::ParameterOrArgumentOverflow,
            Self::Syntax(_) => ErrorKind::MalformedSyntax,
            Self::Runtime(RuntimeError::UndefinedFunction { .. }) => ErrorKind::UndefinedFunction,
            Self::Runtime(RuntimeError::DivisionByZero { .. }) => ErrorKind::ArithmeticFault,
            Self::Runtime(RuntimeError::ArityMismatch { .. }) => ErrorKind::ArityMismatch,
            Self::Runtime(RuntimeError::CallDepthExceeded { .. })
            | Self::Runtime(RuntimeError::NestingTooDeep { .. }) => ErrorKind::CallDepthExceeded,
            Self::Runtime(RuntimeError::StackUnavailable { .. }) => ErrorKind::ResourceExhausted,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Syntax(err) => err.span(),
            Self::Runtime(RuntimeError::UndefinedFunction { span, .. })
            | Self::Runtime(RuntimeError::DivisionByZero { span, .. })
            | Self::Runtime(RuntimeError::ArityMismatch { span, .. }) => span.clone(),
            Self::Runtime(_) => Span::Indetermined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let err = Error::from(RuntimeError::NestingTooDeep { limit: 3 });
        assert_eq!(err.kind(), ErrorKind::CallDepthExceeded);
        assert_eq!(err.kind().to_string(), "CallDepthExceeded");
        let err = Error::from(SyntaxError::UnexpectedEnd {
            expected: "expression",
        });
        assert_eq!(err.kind().to_string(), "MalformedSyntax");
        assert_eq!(err.span(), Span::Indetermined);
    }
}
