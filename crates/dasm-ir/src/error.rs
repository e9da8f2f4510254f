//! Compile errors shared by the SMD front end and the DASM declaration parser.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Source position, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Every error is fatal to the compile that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("unrepresentable input at {span}: {message}")]
    Lex { message: String, span: Span },

    #[error("syntax error at {span}: expected {expected}, found {found}")]
    Syntax {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected {found} at {span}: {message}")]
    UnexpectedToken {
        found: String,
        message: String,
        span: Span,
    },

    #[error("section order error at {span}: {message}")]
    SectionOrder { message: String, span: Span },

    #[error("incomplete declaration at {span}: '{text}'")]
    IncompleteDeclaration { text: String, span: Span },

    #[error("invalid {expected} literal '{literal}' at {span}")]
    InvalidLiteral {
        literal: String,
        expected: String,
        span: Span,
    },

    #[error("redeclaration of '{name}' at {span}")]
    Redeclaration { name: String, span: Span },

    #[error("template type '{type_name}' cannot declare the concrete value '{name}' at {span}")]
    TemplateMisuse {
        type_name: String,
        name: String,
        span: Span,
    },

    #[error("unknown instruction '{0}'")]
    UnknownInstruction(String),

    #[error("type mismatch: '{instruction}' has no signature taking ({})", .operands.join(", "))]
    TypeMismatch {
        instruction: String,
        operands: Vec<String>,
    },

    #[error("broadcast error in '{instruction}': {message}")]
    Broadcast {
        instruction: String,
        message: String,
    },
}

/// Discriminant of [`CompileError`] for callers that branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lex,
    Syntax,
    UnexpectedToken,
    SectionOrder,
    IncompleteDeclaration,
    InvalidLiteral,
    Redeclaration,
    TemplateMisuse,
    UnknownInstruction,
    TypeMismatch,
    Broadcast,
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lex { .. } => ErrorKind::Lex,
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            Self::SectionOrder { .. } => ErrorKind::SectionOrder,
            Self::IncompleteDeclaration { .. } => ErrorKind::IncompleteDeclaration,
            Self::InvalidLiteral { .. } => ErrorKind::InvalidLiteral,
            Self::Redeclaration { .. } => ErrorKind::Redeclaration,
            Self::TemplateMisuse { .. } => ErrorKind::TemplateMisuse,
            Self::UnknownInstruction(_) => ErrorKind::UnknownInstruction,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::Broadcast { .. } => ErrorKind::Broadcast,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex { span, .. }
            | Self::Syntax { span, .. }
            | Self::UnexpectedToken { span, .. }
            | Self::SectionOrder { span, .. }
            | Self::IncompleteDeclaration { span, .. }
            | Self::InvalidLiteral { span, .. }
            | Self::Redeclaration { span, .. }
            | Self::TemplateMisuse { span, .. } => Some(*span),
            Self::UnknownInstruction(_) | Self::TypeMismatch { .. } | Self::Broadcast { .. } => {
                None
            }
        }
    }

    pub fn line(&self) -> Option<usize> {
        self.span().map(|span| span.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.span().map(|span| span.column)
    }

    pub(crate) fn invalid_literal(
        literal: impl Into<String>,
        expected: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::InvalidLiteral {
            literal: literal.into(),
            expected: expected.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompileError::Syntax {
            expected: "';'".into(),
            found: "'}'".into(),
            span: Span::new(3, 7),
        };
        assert_eq!(
            err.to_string(),
            "syntax error at line 3, column 7: expected ';', found '}'"
        );

        let err = CompileError::TypeMismatch {
            instruction: "add".into(),
            operands: vec!["vec2".into(), "vec3".into()],
        };
        assert_eq!(
            err.to_string(),
            "type mismatch: 'add' has no signature taking (vec2, vec3)"
        );
    }

    #[test]
    fn test_error_position() {
        let err = CompileError::Redeclaration {
            name: "x".into(),
            span: Span::new(4, 1),
        };
        assert_eq!(err.kind(), ErrorKind::Redeclaration);
        assert_eq!(err.line(), Some(4));
        assert_eq!(err.column(), Some(1));

        let err = CompileError::UnknownInstruction("frob".into());
        assert_eq!(err.span(), None);
    }
}
