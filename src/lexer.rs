use crate::error::BasilError;
use crate::position::{Position, Span};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Var,
    And,
    Or,
    If,
    Elif,
    Else,
    For,
    To,
    Step,
    While,
    Then,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Var => "VAR",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::If => "IF",
            Keyword::Elif => "ELIF",
            Keyword::Else => "ELSE",
            Keyword::For => "FOR",
            Keyword::To => "TO",
            Keyword::Step => "STEP",
            Keyword::While => "WHILE",
            Keyword::Then => "THEN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    // Literals
    Int,
    Float,
    Str,
    Identifier,
    Keyword(Keyword),

    // Operators
    Plus,
    Minus,
    Mul,
    Div,
    Pow,
    Eq,
    LParen,
    RParen,

    // One or two character comparisons
    Ee,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,

    // Special
    Eof,
}

/// A classified lexical unit. `lexeme` holds the literal payload (number
/// text, string content, identifier name) and is empty for punctuation.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: Position,
    current: Option<char>,
    keywords: HashMap<&'static str, Keyword>,
}

impl Lexer {
    pub fn new(source_name: &str, source: &str) -> Self {
        let mut keywords = HashMap::new();
        for keyword in [
            Keyword::Var,
            Keyword::And,
            Keyword::Or,
            Keyword::If,
            Keyword::Elif,
            Keyword::Else,
            Keyword::For,
            Keyword::To,
            Keyword::Step,
            Keyword::While,
            Keyword::Then,
        ] {
            keywords.insert(keyword.as_str(), keyword);
        }

        let chars: Vec<char> = source.chars().collect();
        let current = chars.first().copied();

        Self {
            chars,
            pos: Position::start(source_name),
            current,
            keywords,
        }
    }

    /// Single forward pass over the source. The first bad character aborts
    /// the whole scan; on success the stream always ends with an Eof token.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, BasilError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.current {
            match c {
                ' ' | '\t' => self.advance(),
                '0'..='9' => tokens.push(self.number()),
                '"' => tokens.push(self.string()),
                c if c.is_ascii_alphabetic() => tokens.push(self.identifier()),
                '+' => tokens.push(self.punct(TokenKind::Plus)),
                '-' => tokens.push(self.punct(TokenKind::Minus)),
                '*' => tokens.push(self.punct(TokenKind::Mul)),
                '/' => tokens.push(self.punct(TokenKind::Div)),
                '^' => tokens.push(self.punct(TokenKind::Pow)),
                '(' => tokens.push(self.punct(TokenKind::LParen)),
                ')' => tokens.push(self.punct(TokenKind::RParen)),
                '!' => tokens.push(self.not_equals()?),
                '=' => tokens.push(self.one_or_two('=', TokenKind::Eq, TokenKind::Ee)),
                '<' => tokens.push(self.one_or_two('=', TokenKind::Lt, TokenKind::Lte)),
                '>' => tokens.push(self.one_or_two('=', TokenKind::Gt, TokenKind::Gte)),
                c => {
                    let start = self.pos.clone();
                    self.advance();
                    return Err(BasilError::illegal_char(
                        Span::new(start, self.pos.clone()),
                        format!("'{}'", c),
                    ));
                }
            }
        }

        tokens.push(Token::new(
            TokenKind::Eof,
            String::new(),
            Span::single(self.pos.clone()),
        ));
        Ok(tokens)
    }

    fn advance(&mut self) {
        self.pos.advance(self.current);
        self.current = self.chars.get(self.pos.offset).copied();
    }

    fn punct(&mut self, kind: TokenKind) -> Token {
        let start = self.pos.clone();
        self.advance();
        Token::new(kind, String::new(), Span::new(start, self.pos.clone()))
    }

    /// One- or two-character operator, upgraded when `second` follows.
    fn one_or_two(&mut self, second: char, single: TokenKind, double: TokenKind) -> Token {
        let start = self.pos.clone();
        self.advance();

        let kind = if self.current == Some(second) {
            self.advance();
            double
        } else {
            single
        };

        Token::new(kind, String::new(), Span::new(start, self.pos.clone()))
    }

    /// `!` is only valid as the start of `!=`.
    fn not_equals(&mut self) -> Result<Token, BasilError> {
        let start = self.pos.clone();
        self.advance();

        if self.current == Some('=') {
            self.advance();
            return Ok(Token::new(
                TokenKind::Ne,
                String::new(),
                Span::new(start, self.pos.clone()),
            ));
        }

        self.advance();
        Err(BasilError::expected_char(
            Span::new(start, self.pos.clone()),
            "'=' (after '!')".to_string(),
        ))
    }

    /// Digits with at most one dot. A second dot ends the literal; the dot
    /// itself is left for the main loop (where it becomes an illegal
    /// character, since nothing else consumes a bare dot).
    fn number(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();
        let mut dot_count = 0;

        while let Some(c) = self.current {
            if c == '.' {
                if dot_count == 1 {
                    break;
                }
                dot_count += 1;
            } else if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance();
        }

        let kind = if dot_count == 0 {
            TokenKind::Int
        } else {
            TokenKind::Float
        };
        Token::new(kind, text, Span::new(start, self.pos.clone()))
    }

    /// Double-quoted string. `\n` and `\t` are the named escapes; any other
    /// escaped character stands for itself. An unterminated string closes
    /// silently at end of input.
    fn string(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();
        self.advance();

        while let Some(c) = self.current {
            if c == '\\' {
                self.advance();
                match self.current {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(other) => text.push(other),
                    None => break,
                }
                self.advance();
            } else if c == '"' {
                break;
            } else {
                text.push(c);
                self.advance();
            }
        }

        // Consume the closing quote, if there was one.
        if self.current.is_some() {
            self.advance();
        }
        Token::new(TokenKind::Str, text, Span::new(start, self.pos.clone()))
    }

    fn identifier(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();

        while let Some(c) = self.current {
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            text.push(c);
            self.advance();
        }

        let kind = match self.keywords.get(text.as_str()) {
            Some(keyword) => TokenKind::Keyword(*keyword),
            None => TokenKind::Identifier,
        };
        Token::new(kind, text, Span::new(start, self.pos.clone()))
    }
}
