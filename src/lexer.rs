//! Tokenizer for the analyzed language and for rendered edge text.
//!
//! The same token stream feeds both the source-program parser and the
//! edge-text re-parser used during CFG walks, so the token set covers the
//! full surface: labels, keywords, comparison/arithmetic operators and the
//! `!` negation marker. Text between `#` characters is a comment.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Ident(String),
    If,
    Else,
    While,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    LBrace,
    RBrace,
    /// `=`
    Assign,
    /// `==`
    EqEq,
    Less,
    Greater,
    Semi,
    Colon,
    Comma,
    Bang,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(n) => write!(f, "{}", n),
            Token::Ident(s) => write!(f, "{}", s),
            Token::If => write!(f, "IF"),
            Token::Else => write!(f, "ELSE"),
            Token::While => write!(f, "WHILE"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Assign => write!(f, "="),
            Token::EqEq => write!(f, "=="),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::Semi => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Bang => write!(f, "!"),
            Token::Eof => write!(f, "<eof>"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LexError {
    #[error("invalid character `{ch}` at offset {pos}")]
    InvalidChar { ch: char, pos: usize },
    #[error("unterminated `#` comment starting at offset {pos}")]
    UnterminatedComment { pos: usize },
    #[error("integer literal `{text}` at offset {pos} is out of range")]
    IntOutOfRange { text: String, pos: usize },
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Lexer {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_comment(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.advance(); // opening `#`
        loop {
            match self.current() {
                Some(b'#') => {
                    self.advance();
                    return Ok(());
                }
                Some(_) => self.advance(),
                None => return Err(LexError::UnterminatedComment { pos: start }),
            }
        }
    }

    fn number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        // The slice is ASCII digits only.
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).expect("ascii digits");
        text.parse().map(Token::Int).map_err(|_| LexError::IntOutOfRange {
            text: text.to_string(),
            pos: start,
        })
    }

    fn ident(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.current(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.advance();
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).expect("ascii identifier");
        match text {
            "IF" => Token::If,
            "ELSE" => Token::Else,
            "WHILE" => Token::While,
            _ => Token::Ident(text.to_string()),
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let c = match self.current() {
                None => return Ok(Token::Eof),
                Some(c) => c,
            };
            if c.is_ascii_whitespace() {
                self.advance();
                continue;
            }
            if c == b'#' {
                self.skip_comment()?;
                continue;
            }
            if c.is_ascii_digit() {
                return self.number();
            }
            if c.is_ascii_alphabetic() || c == b'_' {
                return Ok(self.ident());
            }
            let token = match c {
                b'+' => Token::Plus,
                b'-' => Token::Minus,
                b'*' => Token::Star,
                b'/' => Token::Slash,
                b'(' => Token::LParen,
                b')' => Token::RParen,
                b'{' => Token::LBrace,
                b'}' => Token::RBrace,
                b'<' => Token::Less,
                b'>' => Token::Greater,
                b';' => Token::Semi,
                b':' => Token::Colon,
                b',' => Token::Comma,
                b'!' => Token::Bang,
                b'=' => {
                    if self.peek() == Some(b'=') {
                        self.advance();
                        Token::EqEq
                    } else {
                        Token::Assign
                    }
                }
                _ => {
                    return Err(LexError::InvalidChar {
                        ch: c as char,
                        pos: self.pos,
                    })
                }
            };
            self.advance();
            return Ok(token);
        }
    }
}

/// Tokenizes `text` into a vector ending with [`Token::Eof`].
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
