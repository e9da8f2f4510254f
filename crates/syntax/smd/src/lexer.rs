//! Position-tracking SMD lexer.
//!
//! Scanning is total: every input produces a token list, and malformed
//! constructs surface later as unexpected tokens. Words are split only on
//! whitespace, comments and the single-character tokens
//! `{}()[];,+-*/=<>!|^%.:$`, then classified once.

use crate::token::{Token, TokenKind};
use dasm_ir::Span;

/// Tokenize SMD source.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    word: String,
    word_start: Span,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            word: String::new(),
            word_start: Span::new(1, 1),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.peek(0) {
            match c {
                '/' if self.peek(1) == Some('/') => {
                    self.flush_word();
                    while self.peek(0).is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                '\n' => {
                    self.flush_word();
                    self.pos += 1;
                    self.line += 1;
                    self.column = 1;
                }
                '\r' if self.peek(1) == Some('\n') => {
                    self.flush_word();
                    self.pos += 1;
                }
                c if c.is_whitespace() => {
                    self.flush_word();
                    self.bump();
                }
                '.' if self.peek(1) == Some('.') && self.peek(2) == Some('.') => {
                    self.flush_word();
                    let span = self.span();
                    self.pos += 3;
                    self.column += 3;
                    self.tokens.push(Token::new(TokenKind::RangeOp, "...", span));
                }
                '.' if self.is_decimal_point() => self.accumulate(c),
                c => match TokenKind::from_char(c) {
                    Some(kind) => {
                        self.flush_word();
                        let span = self.span();
                        self.bump();
                        self.tokens.push(Token::new(kind, c, span));
                    }
                    None => self.accumulate(c),
                },
            }
        }
        self.flush_word();
        self.tokens
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
        self.column += 1;
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    /// A `.` between an all-digit word and a digit belongs to a number.
    fn is_decimal_point(&self) -> bool {
        !self.word.is_empty()
            && self.word.chars().all(|c| c.is_ascii_digit())
            && self.peek(1).is_some_and(|c| c.is_ascii_digit())
    }

    fn accumulate(&mut self, c: char) {
        if self.word.is_empty() {
            self.word_start = self.span();
        }
        self.word.push(c);
        self.bump();
    }

    fn flush_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.word);
        let kind = TokenKind::classify(&text);
        self.tokens.push(Token::new(kind, text, self.word_start));
    }
}
