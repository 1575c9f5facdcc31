use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use log::{debug, trace, warn};
use thiserror::Error;

use super::{
    lexer::Lexer,
    tokens::{Token, TokenKind},
};
use crate::ir::{
    BuildError, Builder, Constant, ConstantError, Context, Func, Global, Inst, Ty, TyError, Value,
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected token {token}, expected {expected}")]
    UnexpectedToken { token: Token, expected: String },

    #[error("unexpected end of line {line}, expected {expected}")]
    UnexpectedEol { line: usize, expected: String },

    #[error("unterminated literal {token}")]
    UnterminatedLiteral { token: Token },

    #[error("unknown type {token}")]
    UnknownType { token: Token },

    #[error("malformed type {token}: {source}")]
    MalformedType { token: Token, source: TyError },

    #[error("malformed literal {token}: {source}")]
    MalformedLiteral {
        token: Token,
        source: ConstantError,
    },

    #[error("no overload of `{name}` accepts ({args}) at line {line}")]
    UnresolvedCallee {
        name: String,
        args: String,
        line: usize,
    },

    #[error("unknown global {token}")]
    UnknownGlobal { token: Token },

    #[error("redefinition of function `{name}` at line {line}")]
    Redefinition { name: String, line: usize },

    #[error("global `{name}` is already defined, at line {line}")]
    DuplicateGlobal { name: String, line: usize },

    #[error("`enddef` without a function at line {line}")]
    StrayEnddef { line: usize },

    #[error("function `{name}` is not terminated by `enddef`")]
    UnterminatedFunction { name: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Parse a module from a string.
pub fn parse_str(src: &str) -> Result<Context, ParseError> { Parser::new(src.as_bytes()).parse() }

/// Parse a module from a file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Context, ParseError> {
    let file = File::open(path)?;
    Parser::new(BufReader::new(file)).parse()
}

/// The recursive-descent parser of CSawIR.
///
/// The parser works on one line of tokens at a time, every construct except
/// a function body fits in a single line.
pub struct Parser<R>
where
    R: BufRead,
{
    lexer: Lexer<R>,
    /// The tokens of the current line.
    tokens: Vec<Token>,
    /// The index of the current token in `tokens`.
    index: usize,

    ctx: Context,
    builder: Builder,
}

impl<R> Parser<R>
where
    R: BufRead,
{
    pub fn new(reader: R) -> Self {
        Self {
            lexer: Lexer::new(reader),
            tokens: Vec::new(),
            index: 0,
            ctx: Context::new(),
            builder: Builder::new(),
        }
    }

    /// Parse the whole input into a context.
    ///
    /// Top-level lines that are neither a function nor a global are skipped
    /// with a warning.
    pub fn parse(mut self) -> Result<Context, ParseError> {
        loop {
            self.next_line()?;

            if self.at_eof() {
                break;
            }

            if self.at("def") || self.at("dec") {
                self.next_function()?;
            } else if self.at("global") {
                self.next_global()?;
            } else if self.at("enddef") {
                return Err(ParseError::StrayEnddef { line: self.line() });
            } else {
                let text: Vec<String> = self.tokens.iter().map(|t| t.to_string()).collect();
                warn!("skipping line {}: {}", self.line(), text.join(" "));
            }
        }

        Ok(self.ctx)
    }

    fn next_line(&mut self) -> Result<(), ParseError> {
        self.tokens = self.lexer.next_line()?;
        self.index = 0;
        Ok(())
    }

    fn line(&self) -> usize { self.lexer.line() }

    fn peek(&self) -> Option<&Token> { self.tokens.get(self.index) }

    fn at_eol(&self) -> bool { self.index >= self.tokens.len() }

    fn at_eof(&self) -> bool { self.peek().map_or(false, Token::is_eof) }

    /// Check if the current token is the keyword or operator `value`.
    fn at(&self, value: &str) -> bool {
        self.peek().map_or(false, |token| {
            matches!(token.kind, TokenKind::Identifier | TokenKind::Operator)
                && token.value == value
        })
    }

    fn at_kind(&self, kind: TokenKind) -> bool { self.peek().map_or(false, |t| t.kind == kind) }

    /// Consume the current token, whatever it is.
    fn next_token(&mut self, expected: &str) -> Result<Token, ParseError> {
        match self.tokens.get(self.index) {
            Some(token) if !token.is_eof() => {
                self.index += 1;
                Ok(token.clone())
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                token: token.clone(),
                expected: expected.to_string(),
            }),
            None => Err(ParseError::UnexpectedEol {
                line: self.line(),
                expected: expected.to_string(),
            }),
        }
    }

    /// Consume the current token if it is the keyword or operator `value`.
    fn expect(&mut self, value: &str) -> Result<Token, ParseError> {
        let expected = format!("`{}`", value);
        if self.at(value) {
            return self.next_token(&expected);
        }
        Err(self.unexpected(&expected))
    }

    /// Consume the current token if it is of `kind`.
    fn expect_kind(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let expected = kind.to_string();
        if self.at_kind(kind) {
            return self.next_token(&expected);
        }
        Err(self.unexpected(&expected))
    }

    fn expect_eol(&mut self) -> Result<(), ParseError> {
        if self.at_eol() {
            return Ok(());
        }
        Err(self.unexpected("end of line"))
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                token: token.clone(),
                expected: expected.to_string(),
            },
            None => ParseError::UnexpectedEol {
                line: self.line(),
                expected: expected.to_string(),
            },
        }
    }

    /// `def|dec <ret> <name> (<type> <param>)* [?]`, and the body up to
    /// `enddef` for a definition.
    fn next_function(&mut self) -> Result<(), ParseError> {
        let is_def = self.at("def");
        self.next_token("`def` or `dec`")?;

        let ret = self.next_ty()?;
        // any token can be a function name, even `?`
        let name = self.next_token("function name")?.value;

        let mut params = Vec::new();
        let mut param_names = Vec::new();
        let mut varargs = false;

        while !self.at_eol() {
            if self.at("?") {
                self.next_token("`?`")?;
                varargs = true;
                self.expect_eol()?;
                break;
            }
            params.push(self.next_ty()?);
            param_names.push(self.next_token("parameter name")?.value);
        }

        let ty = Ty::func(&mut self.ctx, ret, params, varargs);
        let func = match self.ctx.lookup_func(&name, ty) {
            Some(func) => func,
            None => Func::new(&mut self.ctx, name.clone(), ty),
        };

        if !is_def {
            debug!("declared `{}` as {}", name, ty.name(&self.ctx));
            if func.params(&self.ctx).is_empty() {
                func.set_params(&mut self.ctx, param_names);
            }
            return Ok(());
        }

        if func.is_defined(&self.ctx) {
            return Err(ParseError::Redefinition {
                name,
                line: self.line(),
            });
        }

        debug!("defining `{}` as {}", name, ty.name(&self.ctx));
        func.set_params(&mut self.ctx, param_names);
        self.builder.start_insert(func, "");

        loop {
            self.next_line()?;

            if self.at_eof() {
                return Err(ParseError::UnterminatedFunction { name });
            }

            if self.at("enddef") {
                self.next_token("`enddef`")?;
                return self.expect_eol();
            }

            if self.at_kind(TokenKind::Block) && self.tokens.len() == 1 {
                let label = self.next_token("label")?.value;
                trace!("line {}: label `{}`", self.line(), label);
                self.builder.set_insert_label(label);
                continue;
            }

            let inst = self.next_high_level()?;
            self.expect_eol()?;
            trace!("line {}: {}", self.line(), inst.display(&self.ctx));
            self.builder.append(&mut self.ctx, inst)?;
        }
    }

    /// `global $<name> const <type> <literal>`
    fn next_global(&mut self) -> Result<(), ParseError> {
        self.expect("global")?;
        let name = self.expect_kind(TokenKind::Global)?.value;

        if self.ctx.lookup_global(&name).is_some() {
            return Err(ParseError::DuplicateGlobal {
                name,
                line: self.line(),
            });
        }

        let init = self.next_const()?;
        self.expect_eol()?;

        debug!("global `{}` bound to {}", name, init.display(&self.ctx));
        Global::new(&mut self.ctx, name, init);
        Ok(())
    }

    /// Parse an instruction that may appear as a line of a body.
    fn next_high_level(&mut self) -> Result<Inst, ParseError> {
        if self.at_kind(TokenKind::Register) {
            let name = self.next_token("register")?.value;
            let value = if self.at("call") || self.at("alloc") || self.at("load") {
                let inst = self.next_inst()?;
                inst.value(&mut self.ctx)
            } else {
                self.next_value()?
            };
            return Ok(Inst::set(&mut self.ctx, name, value));
        }

        if self.at("ret") {
            self.next_token("`ret`")?;
            let value = if self.at_eol() {
                None
            } else {
                Some(self.next_value()?)
            };
            return Ok(Inst::ret(&mut self.ctx, value));
        }

        if self.at("store") {
            self.next_token("`store`")?;
            let ptr = self.next_value()?;
            let value = self.next_value()?;
            return Ok(Inst::store(&mut self.ctx, ptr, value));
        }

        if self.at("jmp") {
            self.next_token("`jmp`")?;
            let label = self.next_label()?;
            return Ok(Inst::jmp(&mut self.ctx, label));
        }

        if self.at("cjmp") {
            self.next_token("`cjmp`")?;
            let cond = self.next_value()?;
            let label_true = self.next_label()?;
            let label_false = self.next_label()?;
            return Ok(Inst::cjmp(&mut self.ctx, cond, label_true, label_false));
        }

        self.next_inst()
    }

    /// Parse an instruction producing a value: `call`, `alloc` or `load`.
    fn next_inst(&mut self) -> Result<Inst, ParseError> {
        if self.at("call") {
            self.next_token("`call`")?;
            let line = self.line();
            let name = self.next_token("callee name")?.value;

            let mut args = Vec::new();
            while !self.at_eol() {
                args.push(self.next_value()?);
            }

            let arg_tys: Option<Vec<Ty>> = args.iter().map(|arg| arg.ty(&self.ctx)).collect();
            let callee = arg_tys.and_then(|tys| self.ctx.resolve_func(&name, &tys));

            return match callee {
                Some(callee) => Ok(Inst::call(&mut self.ctx, callee, args)),
                None => {
                    let args: Vec<String> = args
                        .iter()
                        .map(|arg| match arg.ty(&self.ctx) {
                            Some(ty) => ty.name(&self.ctx).to_string(),
                            None => "?".to_string(),
                        })
                        .collect();
                    Err(ParseError::UnresolvedCallee {
                        name,
                        args: args.join(", "),
                        line,
                    })
                }
            };
        }

        if self.at("alloc") {
            self.next_token("`alloc`")?;
            let ty = self.next_ty()?;
            return Ok(Inst::alloc(&mut self.ctx, ty));
        }

        if self.at("load") {
            self.next_token("`load`")?;
            let ptr = self.next_value()?;
            return Ok(Inst::load(&mut self.ctx, ptr));
        }

        Err(self.unexpected("instruction"))
    }

    /// Parse an operand: `%<reg> <type>`, `$<global>` or a constant.
    fn next_value(&mut self) -> Result<Value, ParseError> {
        if self.at_kind(TokenKind::Register) {
            let name = self.next_token("register")?.value;
            let ty = self.next_ty()?;
            return Ok(Value::reg(&mut self.ctx, name, ty));
        }

        if self.at_kind(TokenKind::Global) {
            let token = self.next_token("global")?;
            let Some(global) = self.ctx.lookup_global(&token.value) else {
                return Err(ParseError::UnknownGlobal { token });
            };
            let ty = global.ty(&self.ctx);
            return Ok(Value::global_ptr(&mut self.ctx, token.value, ty));
        }

        if self.at("const") {
            let constant = self.next_const()?;
            return Ok(Value::constant(&mut self.ctx, constant));
        }

        Err(self.unexpected("value"))
    }

    /// `const <type> <literal>`
    fn next_const(&mut self) -> Result<Constant, ParseError> {
        self.expect("const")?;
        let ty = self.next_ty()?;
        let token = self.next_token("literal")?;

        Constant::parse(&self.ctx, ty, &token.value)
            .map_err(|source| ParseError::MalformedLiteral { token, source })
    }

    fn next_ty(&mut self) -> Result<Ty, ParseError> {
        let token = self.next_token("type")?;
        match self.ctx.ty_by_name(&token.value) {
            Ok(Some(ty)) => Ok(ty),
            Ok(None) => Err(ParseError::UnknownType { token }),
            Err(source) => Err(ParseError::MalformedType { token, source }),
        }
    }

    /// A branch target, with or without the `@` prefix.
    fn next_label(&mut self) -> Result<String, ParseError> {
        if self.at_kind(TokenKind::Block)
            || self.at_kind(TokenKind::Identifier)
            || self.at_kind(TokenKind::Number)
        {
            return Ok(self.next_token("label")?.value);
        }
        Err(self.unexpected("label"))
    }
}
