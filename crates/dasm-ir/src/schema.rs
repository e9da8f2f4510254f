//! Instruction registry schema files.
//!
//! A registry can be written to and loaded from TOML:
//!
//! ```toml
//! [[instruction]]
//! name = "add"
//! broadcast = "elements"
//! interactions = [
//!     { inputs = ["num", "num"], returns = "num" },
//!     { inputs = ["vec2", "vec2"], returns = "vec2" },
//! ]
//! ```
//!
//! Loading checks the registry invariants. The built-in table is never
//! loaded this way; it is available through [`InstructionRegistry::builtin`].

use crate::registry::{InstructionRegistry, InstructionSignature};
use crate::types::DataType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid schema: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to write schema: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("instruction '{0}' has no type interactions")]
    NoInteractions(String),

    #[error("instruction '{instruction}' lists the input tuple ({inputs}) more than once")]
    DuplicateInteraction { instruction: String, inputs: String },

    #[error("instruction '{0}' is declared more than once")]
    DuplicateInstruction(String),
}

/// On-disk form of a registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySchema {
    #[serde(default)]
    pub instruction: Vec<InstructionSignature>,
}

impl RegistrySchema {
    /// Check the registry invariants and build the registry.
    pub fn into_registry(self) -> Result<InstructionRegistry, SchemaError> {
        let mut names = HashSet::new();
        for sig in &self.instruction {
            if !names.insert(sig.name.as_str()) {
                return Err(SchemaError::DuplicateInstruction(sig.name.clone()));
            }
            validate_signature(sig)?;
        }
        debug!(count = self.instruction.len(), "loaded instruction schema");
        Ok(InstructionRegistry::from_trusted(self.instruction))
    }
}

fn validate_signature(sig: &InstructionSignature) -> Result<(), SchemaError> {
    if sig.interactions.is_empty() {
        return Err(SchemaError::NoInteractions(sig.name.clone()));
    }
    let mut seen: HashSet<&[DataType]> = HashSet::new();
    for interaction in &sig.interactions {
        if !seen.insert(interaction.inputs.as_slice()) {
            return Err(SchemaError::DuplicateInteraction {
                instruction: sig.name.clone(),
                inputs: interaction
                    .inputs
                    .iter()
                    .map(|ty| ty.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
    }
    Ok(())
}

impl InstructionRegistry {
    /// Load a registry from TOML schema text.
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaError> {
        let schema: RegistrySchema = toml::from_str(text)?;
        schema.into_registry()
    }

    /// Load a registry from a TOML schema file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_schema(&self) -> RegistrySchema {
        RegistrySchema {
            instruction: self.iter().cloned().collect(),
        }
    }

    /// Serialize the registry in schema form.
    pub fn to_toml_string(&self) -> Result<String, SchemaError> {
        Ok(toml::to_string_pretty(&self.to_schema())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BroadcastKind;

    const SMALL: &str = r#"
[[instruction]]
name = "add"
broadcast = "elements"
interactions = [
    { inputs = ["num", "num"], returns = "num" },
    { inputs = ["vec2", "vec2"], returns = "vec2" },
]

[[instruction]]
name = "ret"
broadcast = "none"
interactions = [{ inputs = [] }, { inputs = ["num"] }]
"#;

    #[test]
    fn test_load_schema() {
        let registry = InstructionRegistry::from_toml_str(SMALL).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.resolve("add", &[DataType::Vec2, DataType::Vec2]).unwrap(),
            Some(DataType::Vec2)
        );
        assert_eq!(registry.resolve("ret", &[]).unwrap(), None);
        assert_eq!(
            registry.get("ret").map(|sig| sig.broadcast),
            Some(BroadcastKind::None)
        );
        assert!(!registry.contains("mul"));
    }

    #[test]
    fn test_builtin_round_trip() {
        let builtin = InstructionRegistry::builtin();
        let text = builtin.to_toml_string().unwrap();
        let loaded = InstructionRegistry::from_toml_str(&text).unwrap();
        assert_eq!(&loaded, builtin);
    }

    #[test]
    fn test_rejects_empty_interactions() {
        let text = r#"
[[instruction]]
name = "nop"
broadcast = "none"
interactions = []
"#;
        let err = InstructionRegistry::from_toml_str(text).unwrap_err();
        assert!(matches!(err, SchemaError::NoInteractions(ref name) if name == "nop"));
    }

    #[test]
    fn test_rejects_duplicate_tuple() {
        let text = r#"
[[instruction]]
name = "add"
broadcast = "elements"
interactions = [
    { inputs = ["num", "num"], returns = "num" },
    { inputs = ["num", "num"], returns = "vec2" },
]
"#;
        let err = InstructionRegistry::from_toml_str(text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "instruction 'add' lists the input tuple (num, num) more than once"
        );
    }

    #[test]
    fn test_rejects_duplicate_instruction() {
        let text = r#"
[[instruction]]
name = "neg"
broadcast = "elements"
interactions = [{ inputs = ["num"], returns = "num" }]

[[instruction]]
name = "neg"
broadcast = "elements"
interactions = [{ inputs = ["vec2"], returns = "vec2" }]
"#;
        let err = InstructionRegistry::from_toml_str(text).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateInstruction(_)));
    }

    #[test]
    fn test_rejects_unknown_type() {
        let text = r#"
[[instruction]]
name = "neg"
broadcast = "elements"
interactions = [{ inputs = ["mat4"], returns = "mat4" }]
"#;
        assert!(matches!(
            InstructionRegistry::from_toml_str(text),
            Err(SchemaError::Parse(_))
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let err = InstructionRegistry::from_file("/nonexistent/registry.toml").unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }
}
