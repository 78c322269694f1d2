//! Tokenizer for search expressions.
//!
//! Turns text like `tag:climate AND NOT creator:"jane@example.org"` into a
//! flat token stream. Lexical problems do not abort tokenization with an
//! error; they become a [`TokenKind::Invalid`] token that the parser reports
//! with its offset.

/// Classification of a lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word: tag term, field name or unquoted value
    Ident(String),
    /// Quoted string literal, escapes already resolved
    Str(String),
    And,
    Or,
    Not,
    Colon,
    LParen,
    RParen,
    /// Lexical error with a human-readable message
    Invalid(String),
    /// End of input
    Eof,
}

/// A classified lexeme with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text of the lexeme
    pub text: String,
    /// 0-based character offset of the first character
    pub offset: usize,
}

impl Token {
    /// Short description used in parser error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::And => "AND".to_string(),
            TokenKind::Or => "OR".to_string(),
            TokenKind::Not => "NOT".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Characters allowed inside bare identifiers besides alphanumerics.
const IDENT_PUNCTUATION: &[char] = &[
    '_', '-', '.', '@', '/', '#', '+', '~', '\'', '?', '&', '=', '%', '*', ',', '!',
];

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || IDENT_PUNCTUATION.contains(&c)
}

/// Tokenize a whole expression.
///
/// The returned vector always ends with a [`TokenKind::Eof`] token. If a
/// lexical error is found, the [`TokenKind::Invalid`] token is the last one
/// before `Eof`.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Eof => {
                tokens.push(token);
                return tokens;
            }
            TokenKind::Invalid(_) => {
                tokens.push(token);
                tokens.push(lexer.eof());
                return tokens;
            }
            _ => tokens.push(token),
        }
    }
}

struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            text: self.slice(start),
            offset: start,
        }
    }

    fn eof(&self) -> Token {
        Token {
            kind: TokenKind::Eof,
            text: String::new(),
            offset: self.input.len(),
        }
    }

    fn invalid(&self, message: String, offset: usize) -> Token {
        Token {
            kind: TokenKind::Invalid(message),
            text: self.slice(offset),
            offset,
        }
    }

    fn read_word(&mut self, start: usize) -> Token {
        while self.current_char().is_some_and(is_ident_char) {
            self.advance();
        }
        let word = self.slice(start);
        let kind = match word.to_ascii_uppercase().as_str() {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            _ => TokenKind::Ident(word),
        };
        self.token(kind, start)
    }

    fn read_string(&mut self, start: usize) -> Token {
        let mut value = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return self.token(TokenKind::Str(value), start);
                }
                '\\' => {
                    let escape_at = self.position;
                    self.advance();
                    match self.current_char() {
                        Some(c @ ('"' | '\\')) => {
                            value.push(c);
                            self.advance();
                        }
                        Some(c) => {
                            self.advance();
                            return self.invalid(
                                format!("invalid escape sequence '\\{c}'"),
                                escape_at,
                            );
                        }
                        None => break,
                    }
                }
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        self.invalid("unterminated string literal".to_string(), start)
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.position;

        match self.current_char() {
            None => self.eof(),
            Some('(') => {
                self.advance();
                self.token(TokenKind::LParen, start)
            }
            Some(')') => {
                self.advance();
                self.token(TokenKind::RParen, start)
            }
            Some(':') => {
                self.advance();
                self.token(TokenKind::Colon, start)
            }
            Some('"') => self.read_string(start),
            Some(c) if is_ident_char(c) => self.read_word(start),
            Some(c) => {
                self.advance();
                self.invalid(format!("unexpected character '{c}'"), start)
            }
        }
    }
}
