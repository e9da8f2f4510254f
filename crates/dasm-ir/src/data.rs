//! Declared data values: singlets and lists.

use crate::error::{CompileError, Result, Span};
use crate::types::{DataType, OperandType};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A concrete value of one [`DataType`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataValue {
    Num(f64),
    Vec2([f64; 2]),
    Vec3([f64; 3]),
}

impl DataValue {
    pub fn data_type(&self) -> DataType {
        match self {
            DataValue::Num(_) => DataType::Num,
            DataValue::Vec2(_) => DataType::Vec2,
            DataValue::Vec3(_) => DataType::Vec3,
        }
    }
}

/// Canonical DASM literal form; re-parses to the same value.
impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Num(n) => write!(f, "{n}"),
            DataValue::Vec2([x, y]) => write!(f, "({x},{y})"),
            DataValue::Vec3([x, y, z]) => write!(f, "({x},{y},{z})"),
        }
    }
}

/// A named single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Singlet {
    pub name: String,
    pub value: DataValue,
}

/// A named ordered sequence of values of one type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub name: String,
    pub element_type: DataType,
    pub values: Vec<DataValue>,
}

impl List {
    /// Formats the values as a DASM list literal, e.g. `[(1,2),(3,4)]`.
    pub fn literal(&self) -> String {
        let items: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        format!("[{}]", items.join(","))
    }
}

/// A declared variable of either shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataVar {
    Singlet(Singlet),
    List(List),
}

impl DataVar {
    pub fn name(&self) -> &str {
        match self {
            DataVar::Singlet(s) => &s.name,
            DataVar::List(l) => &l.name,
        }
    }

    pub fn operand_type(&self) -> OperandType {
        match self {
            DataVar::Singlet(s) => OperandType::Singlet(s.value.data_type()),
            DataVar::List(l) => OperandType::List(l.element_type),
        }
    }
}

impl fmt::Display for DataVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataVar::Singlet(s) => write!(f, "{} {} = {}", s.value.data_type(), s.name, s.value),
            DataVar::List(l) => write!(f, "{}[] {} = {}", l.element_type, l.name, l.literal()),
        }
    }
}

/// Symbol tables built from one Data section.
///
/// A name is unique across singlets and lists combined.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataTables {
    singlets: Vec<Singlet>,
    lists: Vec<List>,
    #[serde(skip)]
    names: HashSet<String>,
}

impl DataTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, rejecting names already present in either table.
    pub fn declare(&mut self, var: DataVar, span: Span) -> Result<()> {
        if !self.names.insert(var.name().to_string()) {
            return Err(CompileError::Redeclaration {
                name: var.name().to_string(),
                span,
            });
        }
        match var {
            DataVar::Singlet(s) => self.singlets.push(s),
            DataVar::List(l) => self.lists.push(l),
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn singlet(&self, name: &str) -> Option<&Singlet> {
        self.singlets.iter().find(|s| s.name == name)
    }

    pub fn list(&self, name: &str) -> Option<&List> {
        self.lists.iter().find(|l| l.name == name)
    }

    pub fn get(&self, name: &str) -> Option<DataVar> {
        self.singlet(name)
            .cloned()
            .map(DataVar::Singlet)
            .or_else(|| self.list(name).cloned().map(DataVar::List))
    }

    pub fn singlets(&self) -> &[Singlet] {
        &self.singlets
    }

    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// One line per declared value, singlets first.
    pub fn dump(&self) -> Vec<String> {
        self.singlets
            .iter()
            .cloned()
            .map(DataVar::Singlet)
            .chain(self.lists.iter().cloned().map(DataVar::List))
            .map(|var| var.to_string())
            .collect()
    }
}
