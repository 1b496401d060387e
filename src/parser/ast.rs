use derivative::Derivative;

use super::locations::Span;
use super::tokenizer::{Token, TokenType as TT};

/// Upper bound on declared parameters and on supplied call arguments.
pub const MAX_PARAMETERS: usize = 10;

/// Upper bound on how often one request re-enters the grammar. Every
/// parenthesis, unary minus, conditional branch, call argument and chained
/// assignment goes one level deeper; a parenthesis counts twice.
pub const MAX_NESTING: usize = 512;

/// Upper bound on the height of an expression tree, counting every operator
/// on the way from the root to a leaf.
pub const MAX_DEPTH: usize = 1024;

/// The only keyword of the language. It is lexed as an ordinary name.
pub const DEFFN: &str = "deffn";

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Definition(FunctionDefinition),
    Expression(Expression),
}

#[derive(Clone, Derivative)]
#[derivative(PartialEq, Eq)]
pub struct Name {
    pub(crate) name: String,
    #[derivative(PartialEq = "ignore")]
    pub(crate) span: Span,
}

impl Name {
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name(\"{}\")", self.name)
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<Token> for Name {
    fn from(value: Token) -> Self {
        match value.typ {
            TT::NAME => Self {
                name: value.lexeme,
                span: value.span,
            },
            _ => unreachable!(),
        }
    }
}

/// Expression tree. Every node owns its children; function bodies refer
/// to other functions only by name, so trees never share or cycle.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq)]
pub enum Expression {
    Literal(i64, #[derivative(PartialEq = "ignore")] Span),
    Variable(Name),
    Binary(Operator, Box<(Expression, Expression)>),
    /// test, then, else
    Conditional(Box<(Expression, Expression, Expression)>),
    /// Callee, arguments and the span of the closing parenthesis.
    Call(
        Name,
        Vec<Expression>,
        #[derivative(PartialEq = "ignore")] Span,
    ),
}

impl Expression {
    pub(crate) fn binary(op: Operator, left: Expression, right: Expression) -> Self {
        Self::Binary(op, Box::new((left, right)))
    }

    pub(crate) fn conditional(test: Expression, then: Expression, otherwise: Expression) -> Self {
        Self::Conditional(Box::new((test, then, otherwise)))
    }

    /// Renders the tree in prefix notation, assignment as `setq` and
    /// conditionals as `if`.
    pub fn to_lisp(&self) -> String {
        match self {
            Self::Literal(value, _) => value.to_string(),
            Self::Variable(name) => name.to_string(),
            Self::Binary(Operator::Assign, operands) => {
                format!("(setq {} {})", operands.0.to_lisp(), operands.1.to_lisp())
            }
            Self::Binary(op, operands) => format!(
                "({} {} {})",
                op.symbol(),
                operands.0.to_lisp(),
                operands.1.to_lisp()
            ),
            Self::Conditional(branches) => format!(
                "(if {} {} {})",
                branches.0.to_lisp(),
                branches.1.to_lisp(),
                branches.2.to_lisp()
            ),
            Self::Call(name, args, _) => {
                let args: Vec<String> = args.iter().map(Expression::to_lisp).collect();
                format!("{}({})", name, args.join(" "))
            }
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value, _) => write!(f, "{value}"),
            Self::Variable(name) => write!(f, "{name}"),
            Self::Binary(op, operands) => {
                write!(f, "({} {} {})", operands.0, op.symbol(), operands.1)
            }
            Self::Conditional(branches) => {
                write!(f, "({} ? {} : {})", branches.0, branches.1, branches.2)
            }
            Self::Call(name, args, _) => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i != 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThanEqual,
    LessThan,
    GreaterThanEqual,
    GreaterThan,
    Assign,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Times => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThanEqual => "<=",
            Self::LessThan => "<",
            Self::GreaterThanEqual => ">=",
            Self::GreaterThan => ">",
            Self::Assign => "=",
        }
    }

    pub(crate) fn from_token(typ: TT) -> Option<Self> {
        match typ {
            TT::PLUS => Some(Self::Plus),
            TT::MINUS => Some(Self::Minus),
            TT::STAR => Some(Self::Times),
            TT::SLASH => Some(Self::Divide),
            TT::PERCENT => Some(Self::Modulo),
            TT::EQEQUAL => Some(Self::Equal),
            TT::NOTEQUAL => Some(Self::NotEqual),
            TT::LESSEQUAL => Some(Self::LessThanEqual),
            TT::LESS => Some(Self::LessThan),
            TT::GREATEREQUAL => Some(Self::GreaterThanEqual),
            TT::GREATER => Some(Self::GreaterThan),
            TT::EQUAL => Some(Self::Assign),
            _ => None,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::LessThanEqual
                | Self::LessThan
                | Self::GreaterThanEqual
                | Self::GreaterThan
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub(crate) name: Name,
    pub(crate) parameters: Vec<Name>,
    pub(crate) body: Expression,
}

impl FunctionDefinition {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(Name::as_str)
    }

    pub fn body(&self) -> &Expression {
        &self.body
    }

    pub fn signature(&self) -> Signature {
        Signature {
            name: self.name.name.clone(),
            parameters: self.parameters().map(str::to_string).collect(),
        }
    }
}

/// `name(p1,p2,...)`, echoed when a definition is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub parameters: Vec<String>,
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.parameters.join(","))
    }
}
