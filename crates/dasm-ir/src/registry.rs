//! DASM instruction registry and type resolution.
//!
//! Every instruction declares the exact operand-type tuples it accepts and
//! the type it returns for each. Resolution is an exact, first-match lookup
//! in declaration order; there is no implicit scalar-to-vector promotion, so
//! `mul num vec2` exists only because it is listed.
//!
//! List operands are handled by the instruction's [`BroadcastKind`]:
//!
//! - `Elements` instructions map over same-length lists and return a list.
//! - `Reduce` instructions fold a single list into one value: by a unary
//!   signature when one exists (`total`, `count`), otherwise pairwise over
//!   the binary signature (`min`, `max`).
//! - `None` instructions (`call`, `ret`) reject lists outright.

use crate::error::{CompileError, Result};
use crate::types::{DataType, OperandType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// How an instruction treats list operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastKind {
    Elements,
    None,
    Reduce,
}

/// One accepted operand tuple and its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInteraction {
    pub inputs: Vec<DataType>,
    /// `None` for instructions that produce no value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<DataType>,
}

/// Signature of a single instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSignature {
    pub name: String,
    pub broadcast: BroadcastKind,
    pub interactions: Vec<TypeInteraction>,
}

impl InstructionSignature {
    /// Find the first interaction whose inputs equal `inputs` exactly.
    pub fn resolve(&self, inputs: &[DataType]) -> Result<Option<DataType>> {
        self.interactions
            .iter()
            .find(|interaction| interaction.inputs == inputs)
            .map(|interaction| interaction.returns)
            .ok_or_else(|| CompileError::TypeMismatch {
                instruction: self.name.clone(),
                operands: inputs.iter().map(|ty| ty.to_string()).collect(),
            })
    }

    /// Returns true if any interaction takes `arity` operands.
    pub fn accepts_arity(&self, arity: usize) -> bool {
        self.interactions.iter().any(|i| i.inputs.len() == arity)
    }
}

/// Immutable name → signature table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRegistry {
    instructions: BTreeMap<String, InstructionSignature>,
}

static BUILTIN: LazyLock<InstructionRegistry> =
    LazyLock::new(|| InstructionRegistry::from_trusted(builtin_signatures()));

impl InstructionRegistry {
    /// The registry of built-in DASM instructions, built on first use.
    pub fn builtin() -> &'static InstructionRegistry {
        &BUILTIN
    }

    /// Build a registry without checking invariants. Callers loading
    /// untrusted tables go through [`crate::schema`].
    pub(crate) fn from_trusted(signatures: Vec<InstructionSignature>) -> Self {
        Self {
            instructions: signatures
                .into_iter()
                .map(|sig| (sig.name.clone(), sig))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&InstructionSignature> {
        self.instructions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instructions.contains_key(name)
    }

    /// Signatures in name order.
    pub fn iter(&self) -> impl Iterator<Item = &InstructionSignature> {
        self.instructions.values()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    fn signature(&self, name: &str) -> Result<&InstructionSignature> {
        self.get(name)
            .ok_or_else(|| CompileError::UnknownInstruction(name.to_string()))
    }

    /// Resolve the return type of `name` applied to scalar operands.
    pub fn resolve(&self, name: &str, inputs: &[DataType]) -> Result<Option<DataType>> {
        self.signature(name)?.resolve(inputs)
    }

    /// Resolve the result shape of `name` applied to operands that may be
    /// lists, following the instruction's broadcast kind.
    pub fn resolve_operands(
        &self,
        name: &str,
        operands: &[OperandType],
    ) -> Result<Option<OperandType>> {
        let sig = self.signature(name)?;
        let elements: Vec<DataType> = operands.iter().map(|o| o.element()).collect();

        if !operands.iter().any(|o| o.is_list()) {
            return Ok(sig.resolve(&elements)?.map(OperandType::Singlet));
        }

        match sig.broadcast {
            BroadcastKind::Elements => Ok(sig.resolve(&elements)?.map(OperandType::List)),
            BroadcastKind::Reduce => match operands {
                [OperandType::List(ty)] => {
                    let returns = if sig.accepts_arity(1) {
                        sig.resolve(&[*ty])?
                    } else {
                        sig.resolve(&[*ty, *ty])?
                    };
                    Ok(returns.map(OperandType::Singlet))
                }
                _ => Err(CompileError::Broadcast {
                    instruction: name.to_string(),
                    message: "reduction takes exactly one list operand".into(),
                }),
            },
            BroadcastKind::None => Err(CompileError::Broadcast {
                instruction: name.to_string(),
                message: "list operands are not accepted".into(),
            }),
        }
    }
}

/// Resolve against the built-in registry.
pub fn resolve(name: &str, inputs: &[DataType]) -> Result<Option<DataType>> {
    InstructionRegistry::builtin().resolve(name, inputs)
}

/// Resolve list-aware operands against the built-in registry.
pub fn resolve_operands(name: &str, operands: &[OperandType]) -> Result<Option<OperandType>> {
    InstructionRegistry::builtin().resolve_operands(name, operands)
}

/// Common length of the list operands of an element-wise instruction.
///
/// `None` entries are singlet operands. Returns `None` when no operand is a
/// list.
pub fn broadcast_len(instruction: &str, lengths: &[Option<usize>]) -> Result<Option<usize>> {
    let mut common: Option<usize> = None;
    for &len in lengths.iter().flatten() {
        match common {
            None => common = Some(len),
            Some(expected) if expected == len => {}
            Some(expected) => {
                return Err(CompileError::Broadcast {
                    instruction: instruction.to_string(),
                    message: format!(
                        "list operands have different lengths ({} and {})",
                        expected, len
                    ),
                });
            }
        }
    }
    Ok(common)
}

// ============================================================================
// Built-in table
// ============================================================================

use DataType::{Num, Vec2, Vec3};

fn op(
    name: &str,
    broadcast: BroadcastKind,
    entries: Vec<(Vec<DataType>, Option<DataType>)>,
) -> InstructionSignature {
    InstructionSignature {
        name: name.to_string(),
        broadcast,
        interactions: entries
            .into_iter()
            .map(|(inputs, returns)| TypeInteraction { inputs, returns })
            .collect(),
    }
}

/// `T → T` for every concrete type.
fn unary_all(name: &str, broadcast: BroadcastKind) -> InstructionSignature {
    op(
        name,
        broadcast,
        vec![
            (vec![Num], Some(Num)),
            (vec![Vec2], Some(Vec2)),
            (vec![Vec3], Some(Vec3)),
        ],
    )
}

/// `T, T → T` for every concrete type.
fn binary_all(name: &str, broadcast: BroadcastKind) -> InstructionSignature {
    op(
        name,
        broadcast,
        vec![
            (vec![Num, Num], Some(Num)),
            (vec![Vec2, Vec2], Some(Vec2)),
            (vec![Vec3, Vec3], Some(Vec3)),
        ],
    )
}

fn unary_num(name: &str) -> InstructionSignature {
    op(name, BroadcastKind::Elements, vec![(vec![Num], Some(Num))])
}

fn binary_num(name: &str) -> InstructionSignature {
    op(name, BroadcastKind::Elements, vec![(vec![Num, Num], Some(Num))])
}

fn builtin_signatures() -> Vec<InstructionSignature> {
    use BroadcastKind::{Elements, Reduce};

    let mut table = vec![
        // Arithmetic
        binary_all("add", Elements),
        binary_all("sub", Elements),
        op(
            "mul",
            Elements,
            vec![
                (vec![Num, Num], Some(Num)),
                (vec![Num, Vec2], Some(Vec2)),
                (vec![Vec2, Num], Some(Vec2)),
                (vec![Num, Vec3], Some(Vec3)),
                (vec![Vec3, Num], Some(Vec3)),
                (vec![Vec2, Vec2], Some(Vec2)),
                (vec![Vec3, Vec3], Some(Vec3)),
            ],
        ),
        op(
            "div",
            Elements,
            vec![
                (vec![Num, Num], Some(Num)),
                (vec![Vec2, Num], Some(Vec2)),
                (vec![Vec3, Num], Some(Vec3)),
                (vec![Vec2, Vec2], Some(Vec2)),
                (vec![Vec3, Vec3], Some(Vec3)),
            ],
        ),
        binary_num("mod"),
        binary_num("pow"),
        unary_all("neg", Elements),
        unary_all("abs", Elements),
        unary_all("sqrt", Elements),
        unary_all("floor", Elements),
        unary_all("ceil", Elements),
        unary_all("mov", Elements),
        // Comparison and logic, 1.0 is true
        binary_num("lt"),
        binary_num("gt"),
        binary_num("ne"),
        binary_num("or"),
        binary_num("xor"),
        unary_num("not"),
        op(
            "select",
            Elements,
            vec![
                (vec![Num, Num, Num], Some(Num)),
                (vec![Num, Vec2, Vec2], Some(Vec2)),
                (vec![Num, Vec3, Vec3], Some(Vec3)),
            ],
        ),
        // Geometry
        op(
            "dot",
            Elements,
            vec![(vec![Vec2, Vec2], Some(Num)), (vec![Vec3, Vec3], Some(Num))],
        ),
        op("cross", Elements, vec![(vec![Vec3, Vec3], Some(Vec3))]),
        op(
            "length",
            Elements,
            vec![(vec![Vec2], Some(Num)), (vec![Vec3], Some(Num))],
        ),
        op(
            "normalize",
            Elements,
            vec![(vec![Vec2], Some(Vec2)), (vec![Vec3], Some(Vec3))],
        ),
        op("vec2", Elements, vec![(vec![Num, Num], Some(Vec2))]),
        op("vec3", Elements, vec![(vec![Num, Num, Num], Some(Vec3))]),
        op("getx", Elements, vec![(vec![Vec2], Some(Num)), (vec![Vec3], Some(Num))]),
        op("gety", Elements, vec![(vec![Vec2], Some(Num)), (vec![Vec3], Some(Num))]),
        op("getz", Elements, vec![(vec![Vec3], Some(Num))]),
        // Reductions
        unary_all("total", Reduce),
        op(
            "count",
            Reduce,
            vec![(vec![Num], Some(Num)), (vec![Vec2], Some(Num)), (vec![Vec3], Some(Num))],
        ),
        binary_all("min", Reduce),
        binary_all("max", Reduce),
        // Control
        op("call", BroadcastKind::None, vec![(vec![], None)]),
        op(
            "ret",
            BroadcastKind::None,
            vec![(vec![], None), (vec![Num], None), (vec![Vec2], None), (vec![Vec3], None)],
        ),
    ];

    for name in ["sin", "cos", "tan", "asin", "acos", "atan", "exp", "log"] {
        table.push(unary_num(name));
    }
    table
}
