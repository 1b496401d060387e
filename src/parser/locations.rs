use super::ast::Expression;
use super::tokenizer::Token;

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

pub trait Locatable {
    fn span(&self) -> Span;
}

/// Source range of a token or subtree. Tokens synthesized by the session
/// (the implicit previous value) have no position in the input.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub enum Span {
    #[default]
    Indetermined,
    Determined(_Span),
}

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct _Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub(crate) fn new(line: usize, start_col: usize, end_col: usize) -> Self {
        Self::Determined(_Span {
            start: Location {
                line,
                column: start_col,
            },
            end: Location {
                line,
                column: end_col,
            },
        })
    }

    pub(crate) fn till<R: Locatable>(&self, other: &R) -> Self {
        match (self, other.span()) {
            (Self::Indetermined, Self::Indetermined) => Self::Indetermined,
            (Self::Indetermined, Self::Determined(t)) => Self::Determined(t),
            (Self::Determined(s), Self::Indetermined) => Self::Determined(s.clone()),
            (Self::Determined(s), Self::Determined(t)) => Self::Determined(_Span {
                start: s.start.clone(),
                end: t.end,
            }),
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indetermined => write!(f, "unknown location"),
            Self::Determined(s) if s.start == s.end => write!(f, "{}", s.start),
            Self::Determined(s) => write!(f, "{} till column {}", s.start, s.end.column),
        }
    }
}

impl Locatable for Token {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

impl Locatable for Span {
    fn span(&self) -> Span {
        self.clone()
    }
}

impl Locatable for Expression {
    fn span(&self) -> Span {
        match self {
            Self::Literal(_, s) => s.clone(),
            Self::Variable(name) => name.span.clone(),
            Self::Binary(_, operands) => operands.0.span().till(&operands.1),
            Self::Conditional(branches) => branches.0.span().till(&branches.2),
            Self::Call(name, _, s) => name.span.till(s),
        }
    }
}
