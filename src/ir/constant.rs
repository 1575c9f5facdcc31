use std::{fmt, num::ParseFloatError};

use thiserror::Error;

use super::{Context, Ty};

/// The escape sequences understood in string and character literals, as
/// `(letter, character)` pairs.
///
/// `\\` and `\"` let any string be written back as a literal.
const ESCAPES: [(char, char); 9] = [
    ('a', '\x07'),
    ('b', '\x08'),
    ('t', '\t'),
    ('n', '\n'),
    ('v', '\x0b'),
    ('f', '\x0c'),
    ('r', '\r'),
    ('\\', '\\'),
    ('"', '"'),
];

/// Resolve the escape sequences in a literal.
///
/// Unknown escapes are kept verbatim, backslash included.
pub fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some(letter) => match ESCAPES.iter().find(|(l, _)| *l == letter) {
                Some((_, ch)) => result.push(*ch),
                None => {
                    result.push('\\');
                    result.push(letter);
                }
            },
            None => result.push('\\'),
        }
    }

    result
}

/// Turn control characters, backslashes and double quotes back into escape
/// sequences, so that [unescape] restores `s` exactly.
pub fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match ESCAPES.iter().find(|(_, ch)| *ch == c) {
            Some((letter, _)) => {
                result.push('\\');
                result.push(*letter);
            }
            None => result.push(c),
        }
    }
    result
}

#[derive(Debug, Error)]
pub enum ConstantError {
    #[error("malformed number `{text}`")]
    MalformedNumber {
        text: String,
        source: ParseFloatError,
    },

    #[error("literals of type `{ty}` are not supported")]
    UnsupportedLiteralType { ty: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantKind {
    Num(f64),
    Str(String),
}

/// A typed literal.
///
/// Constants are plain values, they are copied into every operand that uses
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    ty: Ty,
    kind: ConstantKind,
}

impl Constant {
    pub fn num(ctx: &mut Context, value: f64) -> Self {
        Self {
            ty: Ty::num(ctx),
            kind: ConstantKind::Num(value),
        }
    }

    pub fn str_(ctx: &mut Context, value: impl Into<String>) -> Self {
        Self {
            ty: Ty::str_(ctx),
            kind: ConstantKind::Str(value.into()),
        }
    }

    /// Build a constant of type `ty` from the text of a literal.
    ///
    /// Numbers are parsed as decimal floating point, strings are taken as is
    /// (escapes are already resolved by the tokenizer).
    pub fn parse(ctx: &Context, ty: Ty, text: &str) -> Result<Self, ConstantError> {
        let kind = match ty.name(ctx) {
            "num" => {
                let value = text
                    .parse::<f64>()
                    .map_err(|source| ConstantError::MalformedNumber {
                        text: text.to_string(),
                        source,
                    })?;
                ConstantKind::Num(value)
            }
            "str" => ConstantKind::Str(text.to_string()),
            other => {
                return Err(ConstantError::UnsupportedLiteralType {
                    ty: other.to_string(),
                })
            }
        };
        Ok(Self { ty, kind })
    }

    pub fn ty(&self) -> Ty { self.ty }

    pub fn kind(&self) -> &ConstantKind { &self.kind }

    pub fn as_num(&self) -> Option<f64> {
        match self.kind {
            ConstantKind::Num(value) => Some(value),
            ConstantKind::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ConstantKind::Str(value) => Some(value),
            ConstantKind::Num(_) => None,
        }
    }

    pub fn display<'a>(&'a self, ctx: &'a Context) -> DisplayConstant<'a> {
        DisplayConstant {
            ctx,
            constant: self,
        }
    }
}

pub struct DisplayConstant<'a> {
    ctx: &'a Context,
    constant: &'a Constant,
}

impl fmt::Display for DisplayConstant<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "const {} ", self.constant.ty.display(self.ctx))?;
        match &self.constant.kind {
            ConstantKind::Num(value) => write!(f, "{}", value),
            ConstantKind::Str(value) => write!(f, "\"{}\"", escape(value)),
        }
    }
}
