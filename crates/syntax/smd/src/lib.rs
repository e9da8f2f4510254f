//! SMD front end: lexer, parser and AST.
//!
//! SMD is a small mathematical expression language with function, variable
//! and uniform declarations, list comprehensions, piecewise expressions and
//! vector literals:
//!
//! ```text
//! uniform float t = 0;
//! vec2 f(float x) { return (x, sin(x + t)); }
//! vec2[] points = for (i: [0...10]) { f(i / 10); };
//! $color: red;
//! polygon(points)
//! ```
//!
//! [`compile`] turns source text into a [`Program`] or the first
//! [`dasm_ir::CompileError`] it meets.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::tokenize;
pub use parser::{Parser, parse_program};
pub use token::{Keyword, Operator, Token, TokenKind};

use dasm_ir::{CompileContext, Result};
use tracing::debug;

/// Compile SMD source with a fresh context.
pub fn compile(source: &str) -> Result<Program> {
    let mut ctx = CompileContext::new();
    compile_with(&mut ctx, source)
}

/// Compile SMD source, logging into the caller's context.
pub fn compile_with(ctx: &mut CompileContext, source: &str) -> Result<Program> {
    ctx.run("SMD", |_| {
        let tokens = tokenize(source);
        debug!(count = tokens.len(), "tokenized");
        let program = parse_program(tokens)?;
        debug!(statements = program.body.len(), "parsed");
        Ok(program)
    })
}
