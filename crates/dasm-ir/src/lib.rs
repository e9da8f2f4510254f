//! DASM intermediate representation: data declarations, typed instruction
//! registry and per-compile diagnostics.
//!
//! DASM is a small typed assembly-like IR over three concrete types
//! (`num`, `vec2`, `vec3`). A source file has three sections in fixed order:
//!
//! ```text
//! @data
//! num scale = 2
//! vec2[] points = [(1,2),(3,4)]
//! @functions
//! ...
//! @program
//! ...
//! ```
//!
//! [`compile`] reads the Data section into singlet and list tables. The
//! [`InstructionRegistry`] answers "what does `mul num vec2` return?", with
//! list operands handled by each instruction's [`BroadcastKind`].

pub mod context;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod literal;
pub mod registry;
pub mod schema;
pub mod sections;
pub mod types;

pub use context::{CompileContext, CompileOptions, HostCapabilities};
pub use data::{DataTables, DataValue, DataVar, List, Singlet};
pub use diagnostics::{Diagnostic, Diagnostics, Level};
pub use error::{CompileError, ErrorKind, Result, Span};
pub use registry::{
    BroadcastKind, InstructionRegistry, InstructionSignature, TypeInteraction, broadcast_len,
    resolve, resolve_operands,
};
pub use schema::{RegistrySchema, SchemaError};
pub use sections::{DataModule, Directives, Section, SourceLine, compile, compile_with};
pub use types::{DataType, OperandType, TemplateSpecifier, TypeName};

#[cfg(test)]
mod tests;
