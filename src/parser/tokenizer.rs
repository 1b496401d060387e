use super::error::SyntaxError;
use super::locations::Span;
use const_format::concatcp;
use derivative::Derivative;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Clone, Debug, Derivative)]
#[derivative(PartialEq)]
pub struct Token {
    pub(crate) typ: TokenType,
    pub(crate) lexeme: String,
    #[derivative(PartialEq = "ignore")]
    pub(crate) span: Span,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}('{}')", self.typ, self.lexeme)
    }
}

#[allow(non_camel_case_types)]
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenType {
    NAME,
    NUMBER,
    LPAR,
    RPAR,
    COLON,
    COMMA,
    QUESTION,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    PERCENT,
    LESS,
    GREATER,
    EQUAL,
    EQEQUAL,
    NOTEQUAL,
    LESSEQUAL,
    GREATEREQUAL,
}

impl Token {
    /// Synthesizes an integer token that has no place in the input.
    pub(crate) fn number(value: i64) -> Self {
        Self {
            typ: TokenType::NUMBER,
            lexeme: value.to_string(),
            span: Span::Indetermined,
        }
    }

    pub fn typ(&self) -> TokenType {
        self.typ
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// Value of a NUMBER token. Digits accumulate with wrapping arithmetic,
    /// so over-long literals wrap instead of failing.
    pub(crate) fn integer_value(&self) -> i64 {
        let (negative, digits) = match self.lexeme.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, self.lexeme.as_str()),
        };
        let value = digits.bytes().fold(0i64, |total, digit| {
            total
                .wrapping_mul(10)
                .wrapping_add(i64::from(digit - b'0'))
        });
        if negative {
            value.wrapping_neg()
        } else {
            value
        }
    }

    pub(crate) fn is_name(&self, name: &str) -> bool {
        self.typ == TokenType::NAME && self.lexeme == name
    }
}

// Two-character operators must precede their one-character prefixes.
const SIMPLE_TOKENS: [(&str, TokenType); 17] = [
    ("==", TokenType::EQEQUAL),
    ("!=", TokenType::NOTEQUAL),
    ("<=", TokenType::LESSEQUAL),
    (">=", TokenType::GREATEREQUAL),
    ("(", TokenType::LPAR),
    (")", TokenType::RPAR),
    (":", TokenType::COLON),
    (",", TokenType::COMMA),
    ("?", TokenType::QUESTION),
    ("+", TokenType::PLUS),
    ("-", TokenType::MINUS),
    ("*", TokenType::STAR),
    ("/", TokenType::SLASH),
    ("%", TokenType::PERCENT),
    ("<", TokenType::LESS),
    (">", TokenType::GREATER),
    ("=", TokenType::EQUAL),
];

const S_LETTER: &str = r"[A-Za-z]";
const S_DIGIT: &str = r"[0-9]";
const S_WHITESPACE: &str = r"^\s+";
const S_NAME: &str = concatcp!("^", S_LETTER, "(?:", S_LETTER, "|", S_DIGIT, ")*");
const S_NUMBER: &str = concatcp!("^", S_DIGIT, "+");

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_WHITESPACE).expect("Error compiling regex."));
static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(S_NAME).expect("Error compiling regex."));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(S_NUMBER).expect("Error compiling regex."));

pub struct Tokenizer {
    tokens: Vec<Token>,
    start: usize,
    lineno: usize,
}

impl Tokenizer {
    pub fn new(lineno: usize) -> Self {
        Self {
            tokens: vec![],
            start: 0,
            lineno,
        }
    }

    pub fn tokenize(mut self, line: &str) -> Result<TokenSequence, SyntaxError> {
        while self.start < line.len() {
            let rest = &line[self.start..];
            if let Some(m) = WHITESPACE.find(rest) {
                self.start += m.end();
                continue;
            }
            if self.find_by_regex(&NUMBER, TokenType::NUMBER, rest) {
                continue;
            }
            if self.find_by_regex(&NAME, TokenType::NAME, rest) {
                continue;
            }
            if let Some((lexeme, typ)) = SIMPLE_TOKENS
                .iter()
                .find(|(lexeme, _)| rest.starts_with(lexeme))
            {
                self.push(*typ, lexeme, lexeme.len());
                continue;
            }
            // Neither whitespace nor a known token, so `rest` is non-empty
            // and starts with the offending character.
            let chr = rest.chars().next().unwrap_or_default();
            return Err(SyntaxError::UnrecognizedCharacter {
                span: self.span(chr.len_utf8()),
                character: chr,
            });
        }
        Ok(TokenSequence::new(self.tokens))
    }

    fn find_by_regex(&mut self, regex: &Regex, token_type: TokenType, rest: &str) -> bool {
        if let Some(m) = regex.find(rest) {
            self.push(token_type, m.as_str(), m.end());
            return true;
        }
        false
    }

    fn push(&mut self, typ: TokenType, lexeme: &str, len: usize) {
        let span = self.span(len);
        self.tokens.push(Token {
            typ,
            lexeme: lexeme.to_string(),
            span,
        });
        self.start += len;
    }

    // Columns are 1-based.
    fn span(&self, len: usize) -> Span {
        Span::new(self.lineno, self.start + 1, self.start + len)
    }
}

/// Tokenizes a single request as line 1.
pub fn tokenize_string(input: &str) -> Result<TokenSequence, SyntaxError> {
    Tokenizer::new(1).tokenize(input)
}

/// Ordered token buffer with a cursor.
#[derive(Debug, Clone, Default)]
pub struct TokenSequence {
    tokens: Vec<Token>,
    current: usize,
}

impl TokenSequence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.peek_nth(0)
    }

    /// Looks `n` tokens past the cursor without consuming anything.
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.current + n)
    }

    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).cloned();
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    /// Inserts a token right at the cursor, so it is the next one read.
    pub fn prepend(&mut self, token: Token) {
        self.tokens.insert(self.current, token);
    }

    pub fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    pub fn remaining(&self) -> &[Token] {
        &self.tokens[self.current.min(self.tokens.len())..]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(input: &str) -> Vec<TokenType> {
        tokenize_string(input)
            .unwrap()
            .iter()
            .map(|t| t.typ)
            .collect()
    }

    #[test]
    fn test_two_character_operators() {
        assert_eq!(
            types("a<=b>=c==d!=e<f>g=h"),
            vec![
                TokenType::NAME,
                TokenType::LESSEQUAL,
                TokenType::NAME,
                TokenType::GREATEREQUAL,
                TokenType::NAME,
                TokenType::EQEQUAL,
                TokenType::NAME,
                TokenType::NOTEQUAL,
                TokenType::NAME,
                TokenType::LESS,
                TokenType::NAME,
                TokenType::GREATER,
                TokenType::NAME,
                TokenType::EQUAL,
                TokenType::NAME,
            ]
        );
    }

    #[test]
    fn test_maximal_munch() {
        let tokens = tokenize_string("  x12 345abc ").unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(Token::lexeme).collect();
        assert_eq!(lexemes, vec!["x12", "345", "abc"]);
        assert_eq!(tokens.peek().unwrap().span, Span::new(1, 3, 5));
    }

    #[test]
    fn test_keyword_is_a_name() {
        let tokens = tokenize_string("deffn f(x)=x").unwrap();
        assert!(tokens.peek().unwrap().is_name("deffn"));
        assert_eq!(tokens.peek().unwrap().typ, TokenType::NAME);
    }

    #[test]
    fn test_unrecognized_character() {
        match tokenize_string("1 + $") {
            Err(SyntaxError::UnrecognizedCharacter { span, character }) => {
                assert_eq!(character, '$');
                assert_eq!(span, Span::new(1, 5, 5));
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(tokenize_string("!x").is_err());
        assert!(tokenize_string("a_b").is_err());
    }

    #[test]
    fn test_integer_value_wraps() {
        let tokens = tokenize_string("9223372036854775808").unwrap();
        assert_eq!(tokens.peek().unwrap().integer_value(), i64::MIN);
        assert_eq!(Token::number(-42).integer_value(), -42);
        assert_eq!(Token::number(i64::MIN).integer_value(), i64::MIN);
    }

    #[test]
    fn test_cursor() {
        let mut tokens = tokenize_string("+ 5").unwrap();
        tokens.prepend(Token::number(7));
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens.peek_nth(1).unwrap().typ, TokenType::PLUS);
        assert_eq!(tokens.advance().unwrap().integer_value(), 7);
        assert_eq!(tokens.advance().unwrap().typ, TokenType::PLUS);
        assert_eq!(tokens.remaining().len(), 1);
        tokens.advance();
        assert!(tokens.is_at_end());
        assert!(tokens.advance().is_none());
    }
}
