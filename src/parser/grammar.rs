// Grammar, one method per precedence level, loosest first:
//
// define:      'deffn' NAME '(' [NAME (',' NAME)*] ')' '=' assign
//            | assign
// assign:      conditional ['=' assign]
// conditional: compare ('?' assign ':' assign)*
// compare:     sum (('<' | '<=' | '>' | '>=' | '==' | '!=') sum)*
// sum:         product (('+' | '-') product)*
// product:     factor (('*' | '/' | '%') factor)*
// factor:      NUMBER
//            | '(' assign ')'
//            | '-' product
//            | NAME '(' [assign (',' assign)*] ')'
//            | NAME
//
// Every rule is LL(1); the second token of lookahead is only used to tell
// a call from a bare variable. Requests nesting deeper than MAX_NESTING or
// building trees taller than MAX_DEPTH are rejected.

use super::ast::*;
use super::error::SyntaxError;
use super::locations::{Locatable, Span};
use super::tokenizer::{Token, TokenSequence, TokenType as TT};

type Result<T> = std::result::Result<T, SyntaxError>;

/// Parses one request. The whole sequence must be consumed.
pub fn parse(tokens: TokenSequence) -> Result<Statement> {
    Parser::new(tokens).parse()
}

pub struct Parser {
    tokens: TokenSequence,
    nesting: usize,
    // Height of the expression the last rule returned.
    height: usize,
}

impl Parser {
    pub fn new(tokens: TokenSequence) -> Self {
        Parser {
            tokens,
            nesting: 0,
            height: 0,
        }
    }

    pub fn parse(mut self) -> Result<Statement> {
        let statement = self.define()?;
        match self.tokens.peek() {
            Some(token) => Err(SyntaxError::UnexpectedToken {
                span: token.span(),
                found: token.lexeme.clone(),
            }),
            None => Ok(statement),
        }
    }

    fn peek_type(&self) -> Option<TT> {
        self.tokens.peek().map(|token| token.typ)
    }

    fn peek_span(&self) -> Span {
        self.tokens.peek().map(Locatable::span).unwrap_or_default()
    }

    fn check(&self, token_type: TT) -> bool {
        self.peek_type() == Some(token_type)
    }

    fn match_token(&mut self, token_types: &[TT]) -> Option<Token> {
        match self.peek_type() {
            Some(typ) if token_types.contains(&typ) => self.tokens.advance(),
            _ => None,
        }
    }

    fn consume(&mut self, token_type: TT, expected: &'static str) -> Result<Token> {
        let token = match self.tokens.peek() {
            Some(token) if token.typ == token_type => token.clone(),
            Some(token) => {
                return Err(SyntaxError::Expected {
                    span: token.span(),
                    expected,
                    found: token.lexeme.clone(),
                })
            }
            None => return Err(SyntaxError::UnexpectedEnd { expected }),
        };
        self.tokens.advance();
        Ok(token)
    }

    /// Runs a rule that can recurse back into the grammar, one level deeper.
    fn nested(&mut self, rule: fn(&mut Self) -> Result<Expression>) -> Result<Expression> {
        if self.nesting == MAX_NESTING {
            return Err(SyntaxError::TooDeep {
                span: self.peek_span(),
                limit: MAX_NESTING,
            });
        }
        self.nesting += 1;
        let expr = rule(self);
        self.nesting -= 1;
        expr
    }

    /// Records the height of a node whose tallest child is `child_height`.
    fn grow<R: Locatable>(&mut self, child_height: usize, at: &R) -> Result<()> {
        if child_height >= MAX_DEPTH {
            return Err(SyntaxError::TooDeep {
                span: at.span(),
                limit: MAX_DEPTH,
            });
        }
        self.height = child_height + 1;
        Ok(())
    }

    /// A name that is not the keyword.
    fn name(&mut self, expected: &'static str) -> Result<Name> {
        let token = self.consume(TT::NAME, expected)?;
        if token.lexeme == DEFFN {
            return Err(SyntaxError::ReservedWord {
                span: token.span(),
                word: token.lexeme,
            });
        }
        Ok(token.into())
    }

    fn define(&mut self) -> Result<Statement> {
        if !self.tokens.peek().is_some_and(|token| token.is_name(DEFFN)) {
            return Ok(Statement::Expression(self.assign()?));
        }
        self.tokens.advance();
        let name = self.name("function name")?;
        self.consume(TT::LPAR, "'('")?;
        let parameters = self.parameters(&name)?;
        self.consume(TT::RPAR, "')'")?;
        self.consume(TT::EQUAL, "'='")?;
        let body = self.assign()?;
        Ok(Statement::Definition(FunctionDefinition {
            name,
            parameters,
            body,
        }))
    }

    fn parameters(&mut self, function: &Name) -> Result<Vec<Name>> {
        let mut parameters: Vec<Name> = vec![];
        if self.check(TT::RPAR) {
            return Ok(parameters);
        }
        loop {
            let parameter = self.name("parameter name")?;
            if parameters.contains(&parameter) {
                return Err(SyntaxError::DuplicateParameter {
                    span: parameter.span,
                    name: parameter.name,
                });
            }
            if parameters.len() == MAX_PARAMETERS {
                return Err(SyntaxError::TooManyParameters {
                    span: parameter.span,
                    name: function.name.clone(),
                    limit: MAX_PARAMETERS,
                });
            }
            parameters.push(parameter);
            if self.match_token(&[TT::COMMA]).is_none() {
                return Ok(parameters);
            }
        }
    }

    fn assign(&mut self) -> Result<Expression> {
        self.nested(Self::assignment)
    }

    // Chains fold to the right so that every target stays a bare variable.
    fn assignment(&mut self) -> Result<Expression> {
        let target = self.conditional()?;
        let target_height = self.height;
        if self.match_token(&[TT::EQUAL]).is_none() {
            return Ok(target);
        }
        let value = self.assign()?;
        match target {
            Expression::Variable(_) => {
                self.grow(target_height.max(self.height), &value)?;
                Ok(Expression::binary(Operator::Assign, target, value))
            }
            _ => Err(SyntaxError::InvalidAssignmentTarget {
                span: target.span(),
                target: target.to_string(),
            }),
        }
    }

    fn conditional(&mut self) -> Result<Expression> {
        let mut expr = self.compare()?;
        let mut height = self.height;
        while self.match_token(&[TT::QUESTION]).is_some() {
            let then = self.assign()?;
            height = height.max(self.height);
            self.consume(TT::COLON, "':'")?;
            let otherwise = self.assign()?;
            self.grow(height.max(self.height), &otherwise)?;
            height = self.height;
            expr = Expression::conditional(expr, then, otherwise);
        }
        self.height = height;
        Ok(expr)
    }

    fn binary_chain(
        &mut self,
        operators: &[TT],
        operand: fn(&mut Self) -> Result<Expression>,
    ) -> Result<Expression> {
        let mut expr = operand(self)?;
        let mut height = self.height;
        while let Some(token) = self.match_token(operators) {
            let right = operand(self)?;
            self.grow(height.max(self.height), &token)?;
            height = self.height;
            // Every token in the operator sets maps to an operator.
            let op = Operator::from_token(token.typ).ok_or(SyntaxError::UnexpectedToken {
                span: token.span(),
                found: token.lexeme,
            })?;
            expr = Expression::binary(op, expr, right);
        }
        self.height = height;
        Ok(expr)
    }

    fn compare(&mut self) -> Result<Expression> {
        self.binary_chain(
            &[
                TT::LESS,
                TT::LESSEQUAL,
                TT::GREATER,
                TT::GREATEREQUAL,
                TT::EQEQUAL,
                TT::NOTEQUAL,
            ],
            Self::sum,
        )
    }

    fn sum(&mut self) -> Result<Expression> {
        self.binary_chain(&[TT::PLUS, TT::MINUS], Self::product)
    }

    fn product(&mut self) -> Result<Expression> {
        self.binary_chain(&[TT::STAR, TT::SLASH, TT::PERCENT], Self::factor)
    }

    fn factor(&mut self) -> Result<Expression> {
        self.nested(Self::primary)
    }

    fn primary(&mut self) -> Result<Expression> {
        let token = match self.tokens.peek() {
            Some(token) => token.clone(),
            None => {
                return Err(SyntaxError::UnexpectedEnd {
                    expected: "expression",
                })
            }
        };
        match token.typ {
            TT::NUMBER => {
                self.tokens.advance();
                self.height = 1;
                Ok(Expression::Literal(token.integer_value(), token.span))
            }
            TT::LPAR => {
                self.tokens.advance();
                let expr = self.assign()?;
                self.consume(TT::RPAR, "')'")?;
                Ok(expr)
            }
            TT::MINUS => {
                self.tokens.advance();
                let operand = self.product()?;
                self.grow(self.height, &token)?;
                Ok(Expression::binary(
                    Operator::Minus,
                    Expression::Literal(0, token.span),
                    operand,
                ))
            }
            TT::NAME if self.tokens.peek_nth(1).map(|t| t.typ) == Some(TT::LPAR) => self.call(),
            TT::NAME => {
                let name = self.name("variable")?;
                self.height = 1;
                Ok(Expression::Variable(name))
            }
            _ => Err(SyntaxError::Expected {
                span: token.span(),
                expected: "expression",
                found: token.lexeme,
            }),
        }
    }

    fn call(&mut self) -> Result<Expression> {
        let name = self.name("function name")?;
        self.consume(TT::LPAR, "'('")?;
        let mut arguments = vec![];
        let mut height = 0;
        if !self.check(TT::RPAR) {
            loop {
                if arguments.len() == MAX_PARAMETERS {
                    return Err(SyntaxError::TooManyArguments {
                        span: name.span,
                        name: name.name,
                        limit: MAX_PARAMETERS,
                    });
                }
                arguments.push(self.assign()?);
                height = height.max(self.height);
                if self.match_token(&[TT::COMMA]).is_none() {
                    break;
                }
            }
        }
        let close = self.consume(TT::RPAR, "')'")?;
        self.grow(height, &close)?;
        Ok(Expression::Call(name, arguments, close.span))
    }
}
