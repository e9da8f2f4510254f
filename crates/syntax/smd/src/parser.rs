//! Recursive descent parser for SMD.
//!
//! Precedence, lowest to highest:
//!
//! 1. `=` assignment (right-associative)
//! 2. `|` `^`
//! 3. `<` `>` `!`
//! 4. `+` `-`
//! 5. `*` `/` `%`
//! 6. prefix `-` `!`
//! 7. postfix `.name`, `[index]`, `(args)`
//!
//! The first error aborts the parse; there is no recovery.

use crate::ast::*;
use crate::token::{Keyword, Operator, Token, TokenKind};
use dasm_ir::{CompileError, Result, Span};
use tracing::trace;

/// Deepest expression nesting accepted before the parse is abandoned.
const MAX_DEPTH: usize = 64;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    /// Position just past the last token, reported for errors at end of input.
    end: Span,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end = tokens
            .last()
            .map(|t| Span::new(t.span.line, t.span.column + t.text.chars().count()))
            .unwrap_or_else(|| Span::new(1, 1));
        Self {
            tokens,
            pos: 0,
            depth: 0,
            end,
        }
    }

    pub fn parse_program(&mut self) -> Result<Program> {
        let mut body = Vec::new();
        while !self.at_end() {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            let statement = self.parse_top_level()?;
            trace!(line = statement.span().line, "parsed statement");
            body.push(statement);
        }
        Ok(Program { body })
    }

    // Top level

    fn parse_top_level(&mut self) -> Result<Statement> {
        match self.peek_kind() {
            Some(TokenKind::Keyword(Keyword::Uniform)) => self.parse_uniform(),
            Some(TokenKind::Type) => {
                let statement = self.parse_declaration()?;
                if let Statement::VariableDeclaration(decl) = &statement {
                    check_concrete(decl.ty, &decl.name, decl.span)?;
                }
                Ok(statement)
            }
            Some(TokenKind::Dollar) => self.parse_formatting_directive(),
            Some(TokenKind::DrawCommand) => self.parse_draw_call(),
            _ => Err(self.unexpected("expected a declaration, directive or draw call")),
        }
    }

    fn parse_uniform(&mut self) -> Result<Statement> {
        let span = self.advance_span();
        let ty = self.parse_type_spec()?;
        let name = self.expect_name()?;
        check_concrete(ty, &name, span)?;
        let value = if self.eat(TokenKind::Operator(Operator::Equals)) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Statement::UniformDeclaration(UniformDeclaration {
            ty,
            name,
            value,
            span,
        }))
    }

    /// `<type> <name>` followed by `(params) { ... }` for a function, or
    /// `[= expr];` for a variable.
    fn parse_declaration(&mut self) -> Result<Statement> {
        let ty = self.parse_type_spec()?;
        let span = self.current_span();
        let name = self.expect_name()?;

        if self.eat(TokenKind::LParen) {
            let mut params = Vec::new();
            if !self.check(TokenKind::RParen) {
                loop {
                    params.push(self.parse_param()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "')'")?;
            let body = self.parse_block()?;
            return Ok(Statement::FunctionDeclaration(FunctionDeclaration {
                return_type: ty,
                name,
                params,
                body,
                span,
            }));
        }

        let value = if self.eat(TokenKind::Operator(Operator::Equals)) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Statement::VariableDeclaration(VariableDeclaration {
            ty,
            name,
            value,
            span,
        }))
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec> {
        let token = self.expect(TokenKind::Type, "a type")?;
        let base = BaseType::parse(&token.text).ok_or_else(|| CompileError::Syntax {
            expected: "a type".into(),
            found: token.describe(),
            span: token.span,
        })?;
        let is_list = self.check(TokenKind::LBracket)
            && self.peek_kind_at(1) == Some(TokenKind::RBracket);
        if is_list {
            self.pos += 2;
        }
        Ok(TypeSpec { base, is_list })
    }

    fn parse_param(&mut self) -> Result<Param> {
        let ty = self.parse_type_spec()?;
        let span = self.current_span();
        let name = self.expect_name()?;
        Ok(Param { ty, name, span })
    }

    fn parse_formatting_directive(&mut self) -> Result<Statement> {
        let span = self.advance_span();
        let name = self.expect_name()?;
        self.expect(TokenKind::Colon, "':'")?;
        let value = self.expect(TokenKind::Text, "a directive value")?.text;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Statement::FormattingDirective(FormattingDirective {
            name,
            value,
            span,
        }))
    }

    fn parse_draw_call(&mut self) -> Result<Statement> {
        let token = self.advance();
        let command = DrawCommand::parse(&token.text).ok_or_else(|| CompileError::Syntax {
            expected: "a draw command".into(),
            found: token.describe(),
            span: token.span,
        })?;
        self.expect(TokenKind::LParen, "'('")?;
        let arguments = self.parse_arguments()?;
        self.eat(TokenKind::Semicolon);
        Ok(Statement::DrawCall(DrawCall {
            command,
            arguments,
            span: token.span,
        }))
    }

    // Blocks

    fn parse_block(&mut self) -> Result<Block> {
        let span = self.expect(TokenKind::LBrace, "'{'")?.span;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.syntax_error("'}'"));
            }
            statements.push(self.parse_statement()?);
        }
        self.advance();
        Ok(Block { statements, span })
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.peek_kind() {
            Some(TokenKind::Keyword(Keyword::Return)) => {
                let span = self.advance_span();
                let value = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Statement::ReturnStatement(ReturnStatement { value, span }))
            }
            // Declarations inside a block belong to a function template,
            // so `any` is allowed here.
            Some(TokenKind::Type) => self.parse_declaration(),
            _ => {
                let expression = self.parse_expression()?;
                let span = expression.span;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Statement::ExpressionStatement(ExpressionStatement {
                    expression,
                    span,
                }))
            }
        }
    }

    // Expressions

    pub fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_assignment()
    }

    /// Run `parse` one nesting level deeper.
    fn nested(&mut self, parse: fn(&mut Self) -> Result<Expr>) -> Result<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(self.unexpected("expression nested too deeply"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        self.nested(Self::parse_assignment_inner)
    }

    fn parse_assignment_inner(&mut self) -> Result<Expr> {
        let target = self.parse_logical()?;
        if self.check(TokenKind::Operator(Operator::Equals)) {
            let span = self.advance_span();
            let value = self.parse_assignment()?;
            return Ok(Expr::new(
                ExprKind::Assignment {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                span,
            ));
        }
        Ok(target)
    }

    fn parse_logical(&mut self) -> Result<Expr> {
        self.parse_binary(Self::parse_comparison, |op| match op {
            Operator::Pipe => Some(BinaryOp::Or),
            Operator::Caret => Some(BinaryOp::Xor),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        self.parse_binary(Self::parse_additive, |op| match op {
            Operator::Less => Some(BinaryOp::Lt),
            Operator::Greater => Some(BinaryOp::Gt),
            Operator::Bang => Some(BinaryOp::Ne),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        self.parse_binary(Self::parse_multiplicative, |op| match op {
            Operator::Plus => Some(BinaryOp::Add),
            Operator::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        self.parse_binary(Self::parse_unary, |op| match op {
            Operator::Star => Some(BinaryOp::Mul),
            Operator::Slash => Some(BinaryOp::Div),
            Operator::Percent => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    /// Left-associative fold of `operand (op operand)*`.
    fn parse_binary(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr>,
        op_for: fn(Operator) -> Option<BinaryOp>,
    ) -> Result<Expr> {
        let mut left = operand(self)?;
        while let Some(op) = self.peek_operator().and_then(op_for) {
            let span = self.advance_span();
            let right = operand(self)?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.peek_operator() {
            Some(Operator::Minus) => UnaryOp::Neg,
            Some(Operator::Bang) => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let span = self.advance_span();
        let operand = self.nested(Self::parse_unary)?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        // Only a bare name can be called; `(f)(x)` and `f(x)(y)` cannot.
        let named = matches!(
            self.peek_kind(),
            Some(TokenKind::Text | TokenKind::Builtin)
        );
        let mut expr = self.parse_primary()?;
        loop {
            expr = match self.peek_kind() {
                Some(TokenKind::Dot) => {
                    let span = self.advance_span();
                    let property = self.expect_name()?;
                    Expr::new(
                        ExprKind::MemberAccess {
                            object: Box::new(expr),
                            property,
                        },
                        span,
                    )
                }
                Some(TokenKind::LBracket) => {
                    let span = self.advance_span();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    Expr::new(
                        ExprKind::IndexAccess {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    )
                }
                Some(TokenKind::LParen) => {
                    let callee = expr.as_identifier().filter(|_| named);
                    let Some(name) = callee.map(str::to_string) else {
                        return Err(self.unexpected("only a named function can be called"));
                    };
                    let span = self.advance_span();
                    let arguments = self.parse_arguments()?;
                    Expr::new(ExprKind::FunctionCall { name, arguments }, span)
                }
                _ => return Ok(expr),
            };
        }
    }

    /// Comma-separated arguments up to and including the closing `)`.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some((kind, span)) = self.peek().map(|t| (t.kind, t.span)) else {
            return Err(self.syntax_error("an expression"));
        };

        match kind {
            TokenKind::Text => {
                let name = self.advance().text;
                let is_number = name.starts_with(|c: char| c.is_ascii_digit());
                Ok(Expr::new(ExprKind::Identifier { name, is_number }, span))
            }
            TokenKind::Builtin => {
                let name = self.advance().text.to_ascii_lowercase();
                Ok(Expr::new(
                    ExprKind::Identifier {
                        name,
                        is_number: false,
                    },
                    span,
                ))
            }
            TokenKind::Dollar => {
                self.advance();
                let name = format!("${}", self.expect_name()?);
                Ok(Expr::new(
                    ExprKind::FunctionCall {
                        name,
                        arguments: Vec::new(),
                    },
                    span,
                ))
            }
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch(),
            TokenKind::LParen => self.parse_paren_or_vector(),
            TokenKind::LBracket => self.parse_list_or_range(),
            _ => Err(self.unexpected("expected an expression")),
        }
    }

    /// `(a)` is the grouped expression itself, `(a, b)` a vector literal.
    fn parse_paren_or_vector(&mut self) -> Result<Expr> {
        let span = self.advance_span();
        if self.eat(TokenKind::RParen) {
            return Ok(Expr::new(ExprKind::VectorLiteral { elements: Vec::new() }, span));
        }

        let first = self.parse_expression()?;
        if !self.check(TokenKind::Comma) {
            self.expect(TokenKind::RParen, "')' or ','")?;
            return Ok(first);
        }

        let mut elements = vec![first];
        while self.eat(TokenKind::Comma) {
            elements.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(Expr::new(ExprKind::VectorLiteral { elements }, span))
    }

    /// `[a...b]` is a range, anything else a list. A trailing comma is allowed.
    fn parse_list_or_range(&mut self) -> Result<Expr> {
        let span = self.advance_span();
        if self.eat(TokenKind::RBracket) {
            return Ok(Expr::new(ExprKind::ListLiteral { elements: Vec::new() }, span));
        }

        let first = self.parse_expression()?;
        if self.eat(TokenKind::RangeOp) {
            let end = self.parse_expression()?;
            self.expect(TokenKind::RBracket, "']'")?;
            return Ok(Expr::new(
                ExprKind::Range {
                    start: Box::new(first),
                    end: Box::new(end),
                },
                span,
            ));
        }

        let mut elements = vec![first];
        while self.eat(TokenKind::Comma) {
            if self.check(TokenKind::RBracket) {
                break;
            }
            elements.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Expr::new(ExprKind::ListLiteral { elements }, span))
    }

    /// `for (v: range, ...) { body }`
    fn parse_for(&mut self) -> Result<Expr> {
        let span = self.advance_span();
        self.expect(TokenKind::LParen, "'('")?;
        let mut iterators = Vec::new();
        loop {
            let variable = self.expect_name()?;
            self.expect(TokenKind::Colon, "':'")?;
            let range = self.parse_expression()?;
            iterators.push(ForIterator { variable, range });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(Expr::new(ExprKind::For { iterators, body }, span))
    }

    /// `switch { test: value, ..., default }`; commas between cases are optional.
    fn parse_switch(&mut self) -> Result<Expr> {
        let span = self.advance_span();
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut cases: Vec<PiecewiseCase> = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            if cases.last().is_some_and(|case| case.test.is_none()) {
                return Err(self.syntax_error("'}' after the default case"));
            }
            let first = self.parse_expression()?;
            let case = if self.eat(TokenKind::Colon) {
                PiecewiseCase {
                    test: Some(first),
                    consequent: self.parse_expression()?,
                }
            } else {
                PiecewiseCase {
                    test: None,
                    consequent: first,
                }
            };
            cases.push(case);
            self.eat(TokenKind::Comma);
        }
        Ok(Expr::new(ExprKind::Piecewise { cases }, span))
    }

    // Cursor helpers

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek_kind_at(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    fn peek_operator(&self) -> Option<Operator> {
        match self.peek_kind() {
            Some(TokenKind::Operator(op)) => Some(op),
            _ => None,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or(self.end)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Consume the current token. Callers check that one exists first.
    fn advance(&mut self) -> Token {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .unwrap_or_else(|| Token::new(TokenKind::Semicolon, "", self.end));
        self.pos += 1;
        token
    }

    fn advance_span(&mut self) -> Span {
        self.advance().span
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.syntax_error(expected))
        }
    }

    /// An identifier: a text token that does not start with a digit.
    fn expect_name(&mut self) -> Result<String> {
        let is_name = self
            .peek()
            .is_some_and(|t| t.is(TokenKind::Text) && !t.text.starts_with(|c: char| c.is_ascii_digit()));
        if is_name {
            Ok(self.advance().text)
        } else {
            Err(self.syntax_error("an identifier"))
        }
    }

    fn found(&self) -> String {
        self.peek()
            .map(Token::describe)
            .unwrap_or_else(|| "end of input".to_string())
    }

    fn syntax_error(&self, expected: &str) -> CompileError {
        CompileError::Syntax {
            expected: expected.to_string(),
            found: self.found(),
            span: self.current_span(),
        }
    }

    fn unexpected(&self, message: &str) -> CompileError {
        CompileError::UnexpectedToken {
            found: self.found(),
            message: message.to_string(),
            span: self.current_span(),
        }
    }
}

/// Top-level variables and uniforms must have a concrete type.
fn check_concrete(ty: TypeSpec, name: &str, span: Span) -> Result<()> {
    if ty.base.is_template() {
        return Err(CompileError::TemplateMisuse {
            type_name: ty.to_string(),
            name: name.to_string(),
            span,
        });
    }
    Ok(())
}

/// Parse a token stream into a [`Program`].
pub fn parse_program(tokens: Vec<Token>) -> Result<Program> {
    Parser::new(tokens).parse_program()
}
