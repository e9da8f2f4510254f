//! SMD token model.

use dasm_ir::Span;
use serde::Serialize;
use std::fmt;

/// Reserved words that start a statement or expression form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    Uniform,
    Return,
    For,
    Switch,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Uniform => "uniform",
            Keyword::Return => "return",
            Keyword::For => "for",
            Keyword::Switch => "switch",
        }
    }

    fn lookup(word: &str) -> Option<Keyword> {
        match word {
            "uniform" => Some(Keyword::Uniform),
            "return" => Some(Keyword::Return),
            "for" => Some(Keyword::For),
            "switch" => Some(Keyword::Switch),
            _ => None,
        }
    }
}

/// Single-character operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equals,
    Less,
    Greater,
    Bang,
    Pipe,
    Caret,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Plus => '+',
            Operator::Minus => '-',
            Operator::Star => '*',
            Operator::Slash => '/',
            Operator::Percent => '%',
            Operator::Equals => '=',
            Operator::Less => '<',
            Operator::Greater => '>',
            Operator::Bang => '!',
            Operator::Pipe => '|',
            Operator::Caret => '^',
        }
    }

    pub fn from_char(c: char) -> Option<Operator> {
        Some(match c {
            '+' => Operator::Plus,
            '-' => Operator::Minus,
            '*' => Operator::Star,
            '/' => Operator::Slash,
            '%' => Operator::Percent,
            '=' => Operator::Equals,
            '<' => Operator::Less,
            '>' => Operator::Greater,
            '!' => Operator::Bang,
            '|' => Operator::Pipe,
            '^' => Operator::Caret,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Identifier or number; the parser tells them apart by the first char.
    Text,
    /// `float`, `int`, `vec2`, `vec3`, `any`
    Type,
    Builtin,
    DrawCommand,
    Keyword(Keyword),
    Operator(Operator),
    /// `...`
    RangeOp,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dollar,
    Dot,
}

impl TokenKind {
    /// Kind of a single-character punctuation or operator token.
    pub fn from_char(c: char) -> Option<TokenKind> {
        Some(match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '$' => TokenKind::Dollar,
            '.' => TokenKind::Dot,
            other => TokenKind::Operator(Operator::from_char(other)?),
        })
    }

    /// Classify an accumulated word. Matching is case-insensitive.
    pub fn classify(word: &str) -> TokenKind {
        let lower = word.to_ascii_lowercase();
        let lower = lower.as_str();
        if TYPE_NAMES.contains(&lower) {
            TokenKind::Type
        } else if BUILTINS.contains(&lower) {
            TokenKind::Builtin
        } else if DRAW_COMMANDS.contains(&lower) {
            TokenKind::DrawCommand
        } else if let Some(op) = single_char(lower).and_then(Operator::from_char) {
            TokenKind::Operator(op)
        } else if let Some(keyword) = Keyword::lookup(lower) {
            TokenKind::Keyword(keyword)
        } else {
            TokenKind::Text
        }
    }
}

fn single_char(word: &str) -> Option<char> {
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Text => write!(f, "identifier"),
            TokenKind::Type => write!(f, "type name"),
            TokenKind::Builtin => write!(f, "builtin"),
            TokenKind::DrawCommand => write!(f, "draw command"),
            TokenKind::Keyword(k) => write!(f, "'{}'", k.as_str()),
            TokenKind::Operator(op) => write!(f, "'{}'", op.symbol()),
            TokenKind::RangeOp => write!(f, "'...'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Dollar => write!(f, "'$'"),
            TokenKind::Dot => write!(f, "'.'"),
        }
    }
}

pub const TYPE_NAMES: &[&str] = &["float", "int", "vec2", "vec3", "any"];

pub const BUILTINS: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "count", "exp", "log", "sqrt", "abs", "min",
    "max", "floor", "ceil", "e", "pi", "tau",
];

pub const DRAW_COMMANDS: &[&str] = &["triangle", "polygon"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Text | TokenKind::Type | TokenKind::Builtin | TokenKind::DrawCommand => {
                format!("{} '{}'", self.kind, self.text)
            }
            _ => self.kind.to_string(),
        }
    }
}
