use std::fmt;

use super::{Constant, Context, Global, Inst, Ty};
use crate::{
    collections::storage::{ArenaAlloc, ArenaPtr, BaseArenaPtr},
    impl_arena,
};

/// The kinds of values.
#[derive(Debug, Clone)]
pub enum ValueKind {
    /// A named register with its declared type, e.g. `%x num`.
    ///
    /// Registers are not resolved to their definitions, the name is the
    /// reference.
    Reg { name: String, ty: Ty },
    /// A reference to a global by name, e.g. `$counter`.
    GlobalPtr { name: String, ty: Ty },
    /// An inline literal.
    Const(Constant),
    /// A global itself.
    Global(Global),
    /// The result of an instruction.
    Inst(Inst),
}

#[derive(Debug)]
pub struct ValueData {
    kind: ValueKind,
}

/// A value in the IR, usable as an operand.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub struct Value(BaseArenaPtr<ValueData>);

impl_arena!(Context, ValueData, Value, values);

impl Value {
    pub(super) fn new(ctx: &mut Context, kind: ValueKind) -> Self { ctx.alloc(ValueData { kind }) }

    pub fn reg(ctx: &mut Context, name: impl Into<String>, ty: Ty) -> Self {
        Self::new(
            ctx,
            ValueKind::Reg {
                name: name.into(),
                ty,
            },
        )
    }

    pub fn global_ptr(ctx: &mut Context, name: impl Into<String>, ty: Ty) -> Self {
        Self::new(
            ctx,
            ValueKind::GlobalPtr {
                name: name.into(),
                ty,
            },
        )
    }

    pub fn constant(ctx: &mut Context, constant: Constant) -> Self {
        Self::new(ctx, ValueKind::Const(constant))
    }

    pub fn kind(self, ctx: &Context) -> &ValueKind { &self.deref(ctx).kind }

    /// The type of the value.
    ///
    /// Returns [None] only for instruction results without a type, e.g. the
    /// value of a `store`.
    pub fn ty(self, ctx: &Context) -> Option<Ty> {
        match self.kind(ctx) {
            ValueKind::Reg { ty, .. } | ValueKind::GlobalPtr { ty, .. } => Some(*ty),
            ValueKind::Const(constant) => Some(constant.ty()),
            ValueKind::Global(global) => Some(global.ty(ctx)),
            ValueKind::Inst(inst) => inst.result_ty(ctx),
        }
    }

    pub fn as_inst(self, ctx: &Context) -> Option<Inst> {
        if let ValueKind::Inst(inst) = self.kind(ctx) {
            Some(*inst)
        } else {
            None
        }
    }

    pub fn as_constant(self, ctx: &Context) -> Option<&Constant> {
        if let ValueKind::Const(constant) = self.kind(ctx) {
            Some(constant)
        } else {
            None
        }
    }

    pub fn display(self, ctx: &Context) -> DisplayValue<'_> { DisplayValue { ctx, value: self } }
}

pub struct DisplayValue<'a> {
    ctx: &'a Context,
    value: Value,
}

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.kind(self.ctx) {
            ValueKind::Reg { name, ty } => write!(f, "%{} {}", name, ty.display(self.ctx)),
            ValueKind::GlobalPtr { name, .. } => write!(f, "${}", name),
            ValueKind::Const(constant) => write!(f, "{}", constant.display(self.ctx)),
            ValueKind::Global(global) => write!(f, "${}", global.name(self.ctx)),
            ValueKind::Inst(inst) => write!(f, "{}", inst.display(self.ctx)),
        }
    }
}
