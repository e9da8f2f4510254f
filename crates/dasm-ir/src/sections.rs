//! Line-oriented parser for DASM source sections.
//!
//! A DASM file is a sequence of `@section` blocks in fixed order:
//!
//! ```text
//! # dd
//! @data
//! num scale = 2
//! vec2[] points = [(1,2),(3,4)]
//! @functions
//! ...
//! @program
//! ...
//! ```
//!
//! Only the Data section is interpreted here. Functions and Program lines
//! are kept verbatim for the interpreter that consumes them.

use crate::context::CompileContext;
use crate::data::{DataTables, DataVar, List, Singlet};
use crate::error::{CompileError, Result, Span};
use crate::literal::{parse_list, parse_value};
use crate::types::TypeName;
use serde::Serialize;
use tracing::debug;

/// Parser state; each variant names the section currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Start,
    Data,
    Functions,
    Program,
}

impl Section {
    /// Header name without the `@` prefix.
    pub fn header(self) -> &'static str {
        match self {
            Section::Start => "start",
            Section::Data => "data",
            Section::Functions => "functions",
            Section::Program => "program",
        }
    }

    /// The only section allowed to follow this one.
    pub fn next(self) -> Option<Section> {
        match self {
            Section::Start => Some(Section::Data),
            Section::Data => Some(Section::Functions),
            Section::Functions => Some(Section::Program),
            Section::Program => None,
        }
    }
}

/// Flags set by the optional `#` directive line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Directives {
    /// `dd` / `dumpdata`: log every declared value once the Data section closes.
    pub dump_data: bool,
}

/// A retained source line from a section this parser does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub line: usize,
    pub text: String,
}

/// Result of compiling a DASM source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataModule {
    pub directives: Directives,
    pub data: DataTables,
    pub functions: Vec<SourceLine>,
    pub program: Vec<SourceLine>,
}

/// Compile DASM source with a fresh context.
pub fn compile(source: &str) -> Result<DataModule> {
    let mut ctx = CompileContext::new();
    compile_with(&mut ctx, source)
}

/// Compile DASM source, logging into the caller's context.
pub fn compile_with(ctx: &mut CompileContext, source: &str) -> Result<DataModule> {
    ctx.run("DASM", |ctx| DeclarationParser::new(ctx).parse(source))
}

struct DeclarationParser<'ctx> {
    ctx: &'ctx mut CompileContext,
    section: Section,
    module: DataModule,
    /// The single optional `#` line has been read.
    directive_seen: bool,
}

impl<'ctx> DeclarationParser<'ctx> {
    fn new(ctx: &'ctx mut CompileContext) -> Self {
        Self {
            ctx,
            section: Section::Start,
            module: DataModule::default(),
            directive_seen: false,
        }
    }

    fn parse(mut self, source: &str) -> Result<DataModule> {
        for (index, raw) in source.lines().enumerate() {
            let text = raw.trim();
            if text.is_empty() || text.starts_with("//") {
                continue;
            }

            let indent = raw.chars().take_while(|c| c.is_whitespace()).count();
            let span = Span::new(index + 1, indent + 1);

            if text.starts_with('@') {
                self.enter_section(text, span)?;
                continue;
            }

            match self.section {
                Section::Start if text.starts_with('#') && !self.directive_seen => {
                    self.directive_seen = true;
                    self.parse_directives(text);
                }
                Section::Start => {
                    return Err(CompileError::SectionOrder {
                        message: format!("'{}' before any section, must begin with '@data'", text),
                        span,
                    });
                }
                Section::Data => self.parse_declaration(text, span)?,
                Section::Functions => self.module.functions.push(SourceLine {
                    line: span.line,
                    text: text.to_string(),
                }),
                Section::Program => self.module.program.push(SourceLine {
                    line: span.line,
                    text: text.to_string(),
                }),
            }
        }

        if self.section == Section::Data {
            self.close_data();
        }
        Ok(self.module)
    }

    fn parse_directives(&mut self, text: &str) {
        for word in text.trim_start_matches('#').split_whitespace() {
            match word.to_lowercase().as_str() {
                "dd" | "dumpdata" => self.module.directives.dump_data = true,
                other => debug!(directive = other, "ignoring unknown directive"),
            }
        }
    }

    fn enter_section(&mut self, text: &str, span: Span) -> Result<()> {
        let name = text[1..]
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();

        let Some(expected) = self.section.next() else {
            return Err(CompileError::SectionOrder {
                message: format!("unexpected section '@{}' after '@program'", name),
                span,
            });
        };

        if name != expected.header() {
            return Err(CompileError::SectionOrder {
                message: format!(
                    "unknown section '@{}', expected '@{}'",
                    name,
                    expected.header()
                ),
                span,
            });
        }

        if self.section == Section::Data {
            self.close_data();
        }
        debug!(section = expected.header(), line = span.line, "entering section");
        self.section = expected;
        Ok(())
    }

    /// `<type> <name> = <value...>`
    fn parse_declaration(&mut self, text: &str, span: Span) -> Result<()> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() < 4 {
            return Err(CompileError::IncompleteDeclaration {
                text: text.to_string(),
                span,
            });
        }

        let (type_word, name) = (words[0], words[1]);
        if words[2] != "=" {
            return Err(CompileError::Syntax {
                expected: "'='".into(),
                found: format!("'{}'", words[2]),
                span,
            });
        }
        if !is_valid_name(name) {
            return Err(CompileError::Syntax {
                expected: "a variable name".into(),
                found: format!("'{}'", name),
                span,
            });
        }

        let (base, is_list) = match type_word.strip_suffix("[]") {
            Some(base) => (base, true),
            None => (type_word, false),
        };

        let ty = match TypeName::parse(base) {
            Some(TypeName::Concrete(ty)) => ty,
            Some(TypeName::Template(_)) => {
                return Err(CompileError::TemplateMisuse {
                    type_name: type_word.to_string(),
                    name: name.to_string(),
                    span,
                });
            }
            None => {
                return Err(CompileError::Syntax {
                    expected: "a data type (num, vec2, vec3)".into(),
                    found: format!("'{}'", type_word),
                    span,
                });
            }
        };

        let value = words[3..].join("");
        let var = if is_list {
            DataVar::List(List {
                name: name.to_string(),
                element_type: ty,
                values: parse_list(&value, ty, span)?,
            })
        } else {
            DataVar::Singlet(Singlet {
                name: name.to_string(),
                value: parse_value(&value, ty, span)?,
            })
        };

        debug!(name, ty = type_word, line = span.line, "declared data");
        self.module.data.declare(var, span)
    }

    fn close_data(&mut self) {
        if !(self.module.directives.dump_data || self.ctx.options().dump_data) {
            return;
        }
        let lines = self.module.data.dump();
        let log = self.ctx.diagnostics_mut();
        log.info(format!("Declared data ({} values):", lines.len()));
        for line in lines {
            log.info(line);
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
