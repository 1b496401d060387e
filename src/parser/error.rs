use super::locations::Span;

/// A request that does not match the grammar. Raised before anything is
/// evaluated or registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("unrecognized character '{character}' at {span}")]
    UnrecognizedCharacter { span: Span, character: char },
    #[error("expected {expected} but found '{found}' at {span}")]
    Expected {
        span: Span,
        expected: &'static str,
        found: String,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unexpected '{found}' at {span}")]
    UnexpectedToken { span: Span, found: String },
    #[error("cannot assign to '{target}' at {span}, only variables can be assigned")]
    InvalidAssignmentTarget { span: Span, target: String },
    #[error("parameter '{name}' declared twice at {span}")]
    DuplicateParameter { span: Span, name: String },
    #[error("'{word}' is reserved at {span}")]
    ReservedWord { span: Span, word: String },
    #[error("function '{name}' declares more than {limit} parameters")]
    TooManyParameters {
        span: Span,
        name: String,
        limit: usize,
    },
    #[error("expression nests deeper than {limit} levels at {span}")]
    TooDeep { span: Span, limit: usize },
    #[error("call to '{name}' passes more than {limit} arguments")]
    TooManyArguments {
        span: Span,
        name: String,
        limit: usize,
    },
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            Self::UnrecognizedCharacter { span, .. }
            | Self::Expected { span, .. }
            | Self::UnexpectedToken { span, .. }
            | Self::InvalidAssignmentTarget { span, .. }
            | Self::DuplicateParameter { span, .. }
            | Self::ReservedWord { span, .. }
            | Self::TooDeep { span, .. }
            | Self::TooManyParameters { span, .. }
            | Self::TooManyArguments { span, .. } => span.clone(),
            Self::UnexpectedEnd { .. } => Span::Indetermined,
        }
    }

    /// True for the parameter and argument count limits.
    pub fn is_overflow(&self) -> bool {
        matches!(
            self,
            Self::TooManyParameters { .. } | Self::TooManyArguments { .. }
        )
    }
}
