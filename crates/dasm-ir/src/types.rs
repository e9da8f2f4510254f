//! DASM data types.
//!
//! The IR has a closed set of concrete types (`num`, `vec2`, `vec3`) and two
//! template specifiers (`any`, `vecn`) that may only appear as parameter
//! types inside function signatures.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete value type of a DASM operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Scalar f64
    Num,
    /// Two-component vector
    Vec2,
    /// Three-component vector
    Vec3,
}

impl DataType {
    /// Returns the type keyword as written in DASM source.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Num => "num",
            DataType::Vec2 => "vec2",
            DataType::Vec3 => "vec3",
        }
    }

    /// Number of f64 components a value of this type holds.
    pub fn width(self) -> usize {
        match self {
            DataType::Num => 1,
            DataType::Vec2 => 2,
            DataType::Vec3 => 3,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter-only pseudo-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSpecifier {
    Any,
    VecN,
}

impl TemplateSpecifier {
    pub fn name(self) -> &'static str {
        match self {
            TemplateSpecifier::Any => "any",
            TemplateSpecifier::VecN => "vecn",
        }
    }
}

impl fmt::Display for TemplateSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type name as it appears in a declaration, before checking whether it
/// is allowed in that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    Concrete(DataType),
    Template(TemplateSpecifier),
}

impl TypeName {
    /// Parses a base type keyword, case-insensitively. The `[]` list suffix
    /// must already be stripped.
    pub fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "num" => Some(TypeName::Concrete(DataType::Num)),
            "vec2" => Some(TypeName::Concrete(DataType::Vec2)),
            "vec3" => Some(TypeName::Concrete(DataType::Vec3)),
            "any" => Some(TypeName::Template(TemplateSpecifier::Any)),
            "vecn" => Some(TypeName::Template(TemplateSpecifier::VecN)),
            _ => None,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Concrete(ty) => ty.fmt(f),
            TypeName::Template(spec) => spec.fmt(f),
        }
    }
}

/// Operand shape seen by the broadcast rules: a single value or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperandType {
    Singlet(DataType),
    List(DataType),
}

impl OperandType {
    pub fn element(self) -> DataType {
        match self {
            OperandType::Singlet(ty) | OperandType::List(ty) => ty,
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, OperandType::List(_))
    }

    /// Parses `num`, `vec2[]` and the like. Template names are not operand
    /// types.
    pub fn parse(word: &str) -> Option<Self> {
        let (base, is_list) = match word.strip_suffix("[]") {
            Some(base) => (base, true),
            None => (word, false),
        };
        match TypeName::parse(base)? {
            TypeName::Concrete(ty) if is_list => Some(OperandType::List(ty)),
            TypeName::Concrete(ty) => Some(OperandType::Singlet(ty)),
            TypeName::Template(_) => None,
        }
    }
}

impl fmt::Display for OperandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandType::Singlet(ty) => write!(f, "{ty}"),
            OperandType::List(ty) => write!(f, "{ty}[]"),
        }
    }
}
