use std::fmt;

use super::{value::ValueKind, Context, Func, Label, Ty, Value};
use crate::{
    collections::{
        linked_list::LinkedListNodePtr,
        storage::{ArenaAlloc, ArenaPtr, BaseArenaPtr},
    },
    impl_arena,
};

/// The kinds of instructions.
///
/// Branch targets are label names, they are not resolved to [Label]s.
#[derive(Debug, Clone)]
pub enum InstKind {
    /// Call a resolved overload with the arguments.
    Call { callee: Func, args: Vec<Value> },
    /// Return from the function, optionally with a value.
    Ret(Option<Value>),
    /// Bind a value to a register name, `%<name> <value>`.
    Set { name: String, value: Value },
    /// Allocate storage of a type.
    Alloc(Ty),
    /// Store a value through a pointer.
    Store { ptr: Value, value: Value },
    /// Jump to a label.
    Jmp(String),
    /// Jump to `label_true` if `cond` holds, otherwise to `label_false`.
    CJmp {
        cond: Value,
        label_true: String,
        label_false: String,
    },
    /// Load from a pointer.
    Load(Value),
}

/// The data of an instruction.
#[derive(Debug)]
pub struct InstData {
    self_ptr: Inst,
    kind: InstKind,
    /// The value of this instruction, created on demand.
    value: Option<Value>,

    next: Option<Inst>,
    prev: Option<Inst>,
    /// The label chain holding the instruction.
    label: Option<Label>,
}

impl InstData {
    pub fn self_ptr(&self) -> Inst { self.self_ptr }

    pub fn kind(&self) -> &InstKind { &self.kind }
}

#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub struct Inst(BaseArenaPtr<InstData>);

impl_arena!(Context, InstData, Inst, insts);

impl Inst {
    fn new(ctx: &mut Context, kind: InstKind) -> Self {
        ctx.alloc_with(|self_ptr| InstData {
            self_ptr,
            kind,
            value: None,
            next: None,
            prev: None,
            label: None,
        })
    }

    pub fn call(ctx: &mut Context, callee: Func, args: Vec<Value>) -> Self {
        Self::new(ctx, InstKind::Call { callee, args })
    }

    pub fn ret(ctx: &mut Context, value: Option<Value>) -> Self { Self::new(ctx, InstKind::Ret(value)) }

    pub fn set(ctx: &mut Context, name: impl Into<String>, value: Value) -> Self {
        Self::new(
            ctx,
            InstKind::Set {
                name: name.into(),
                value,
            },
        )
    }

    pub fn alloc(ctx: &mut Context, ty: Ty) -> Self { Self::new(ctx, InstKind::Alloc(ty)) }

    pub fn store(ctx: &mut Context, ptr: Value, value: Value) -> Self {
        Self::new(ctx, InstKind::Store { ptr, value })
    }

    pub fn jmp(ctx: &mut Context, label: impl Into<String>) -> Self {
        Self::new(ctx, InstKind::Jmp(label.into()))
    }

    pub fn cjmp(
        ctx: &mut Context,
        cond: Value,
        label_true: impl Into<String>,
        label_false: impl Into<String>,
    ) -> Self {
        Self::new(
            ctx,
            InstKind::CJmp {
                cond,
                label_true: label_true.into(),
                label_false: label_false.into(),
            },
        )
    }

    pub fn load(ctx: &mut Context, ptr: Value) -> Self { Self::new(ctx, InstKind::Load(ptr)) }

    pub fn kind(self, ctx: &Context) -> &InstKind { &self.deref(ctx).kind }

    /// Get the value of the instruction, so it can be used as an operand.
    ///
    /// The same value is returned on every call.
    pub fn value(self, ctx: &mut Context) -> Value {
        if let Some(value) = self.deref(ctx).value {
            return value;
        }
        let value = Value::new(ctx, ValueKind::Inst(self));
        self.deref_mut(ctx).value = Some(value);
        value
    }

    /// The type of the value produced by the instruction.
    ///
    /// - `call` produces the return type of the callee.
    /// - `ret`, `set` and `load` produce the type of their operand.
    /// - `alloc` produces the allocated type.
    /// - `store`, `jmp`, `cjmp` and a bare `ret` produce nothing.
    pub fn result_ty(self, ctx: &Context) -> Option<Ty> {
        match self.kind(ctx) {
            InstKind::Call { callee, .. } => callee.ret_ty(ctx),
            InstKind::Ret(value) => value.and_then(|v| v.ty(ctx)),
            InstKind::Set { value, .. } => value.ty(ctx),
            InstKind::Alloc(ty) => Some(*ty),
            InstKind::Load(ptr) => ptr.ty(ctx),
            InstKind::Store { .. } | InstKind::Jmp(_) | InstKind::CJmp { .. } => None,
        }
    }

    /// The label chain holding the instruction, [None] if not appended.
    pub fn label(self, ctx: &Context) -> Option<Label> { self.deref(ctx).label }

    pub fn display(self, ctx: &Context) -> DisplayInst<'_> { DisplayInst { ctx, inst: self } }
}

impl LinkedListNodePtr for Inst {
    type ContainerPtr = Label;

    fn next(self, ctx: &Context) -> Option<Inst> { self.deref(ctx).next }

    fn prev(self, ctx: &Context) -> Option<Inst> { self.deref(ctx).prev }

    fn set_next(self, ctx: &mut Context, next: Option<Inst>) { self.deref_mut(ctx).next = next; }

    fn set_prev(self, ctx: &mut Context, prev: Option<Inst>) { self.deref_mut(ctx).prev = prev; }

    fn container(self, ctx: &Context) -> Option<Label> { self.deref(ctx).label }

    fn set_container(self, ctx: &mut Context, container: Option<Label>) {
        self.deref_mut(ctx).label = container;
    }
}

pub struct DisplayInst<'a> {
    ctx: &'a Context,
    inst: Inst,
}

impl fmt::Display for DisplayInst<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.ctx;
        match self.inst.kind(ctx) {
            InstKind::Call { callee, args } => {
                write!(f, "call {}", callee.name(ctx))?;
                for arg in args {
                    write!(f, " {}", arg.display(ctx))?;
                }
                Ok(())
            }
            InstKind::Ret(None) => write!(f, "ret"),
            InstKind::Ret(Some(value)) => write!(f, "ret {}", value.display(ctx)),
            InstKind::Set { name, value } => write!(f, "%{} {}", name, value.display(ctx)),
            InstKind::Alloc(ty) => write!(f, "alloc {}", ty.display(ctx)),
            InstKind::Store { ptr, value } => {
                write!(f, "store {} {}", ptr.display(ctx), value.display(ctx))
            }
            InstKind::Jmp(label) => write!(f, "jmp {}", label),
            InstKind::CJmp {
                cond,
                label_true,
                label_false,
            } => write!(
                f,
                "cjmp {} {} {}",
                cond.display(ctx),
                label_true,
                label_false
            ),
            InstKind::Load(ptr) => write!(f, "load {}", ptr.display(ctx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Inst, InstKind};
    use crate::ir::{Constant, Context, Ty, Value};

    #[test]
    fn test_inst_display() {
        let mut ctx = Context::default();
        let num = Ty::num(&mut ctx);

        let a = Value::reg(&mut ctx, "a", num);
        let b = Value::reg(&mut ctx, "b", num);
        let plus = ctx.resolve_func("+", &[num, num]).unwrap();

        let call = Inst::call(&mut ctx, plus, vec![a, b]);
        assert_eq!(format!("{}", call.display(&ctx)), "call + %a num %b num");

        let call_value = call.value(&mut ctx);
        let set = Inst::set(&mut ctx, "r", call_value);
        assert_eq!(
            format!("{}", set.display(&ctx)),
            "%r call + %a num %b num"
        );

        let ret = Inst::ret(&mut ctx, None);
        assert_eq!(format!("{}", ret.display(&ctx)), "ret");

        let one = Constant::num(&mut ctx, 1.0);
        let one = Value::constant(&mut ctx, one);
        let cjmp = Inst::cjmp(&mut ctx, one, "then", "else");
        assert_eq!(
            format!("{}", cjmp.display(&ctx)),
            "cjmp const num 1 then else"
        );

        let jmp = Inst::jmp(&mut ctx, "loop");
        assert_eq!(format!("{}", jmp.display(&ctx)), "jmp loop");

        let alloc = Inst::alloc(&mut ctx, num);
        assert_eq!(format!("{}", alloc.display(&ctx)), "alloc num");

        let ptr = Value::global_ptr(&mut ctx, "g", num);
        let store = Inst::store(&mut ctx, ptr, one);
        assert_eq!(
            format!("{}", store.display(&ctx)),
            "store $g const num 1"
        );

        let load = Inst::load(&mut ctx, ptr);
        assert_eq!(format!("{}", load.display(&ctx)), "load $g");
    }

    #[test]
    fn test_inst_result_ty() {
        let mut ctx = Context::default();
        let num = Ty::num(&mut ctx);
        let str_ = Ty::str_(&mut ctx);

        let s = Value::reg(&mut ctx, "s", str_);
        let printf = ctx.resolve_func("printf", &[str_]).unwrap();
        let call = Inst::call(&mut ctx, printf, vec![s]);
        assert_eq!(call.result_ty(&ctx), Some(Ty::void(&mut ctx)));

        let ptr = Value::global_ptr(&mut ctx, "g", num);
        let load = Inst::load(&mut ctx, ptr);
        assert_eq!(load.result_ty(&ctx), Some(num));

        let store = Inst::store(&mut ctx, ptr, s);
        assert_eq!(store.result_ty(&ctx), None);

        let ret = Inst::ret(&mut ctx, None);
        assert_eq!(ret.result_ty(&ctx), None);

        let alloc = Inst::alloc(&mut ctx, str_);
        let alloc_value = alloc.value(&mut ctx);
        assert_eq!(alloc_value.ty(&ctx), Some(str_));
        assert_eq!(alloc.value(&mut ctx), alloc_value);
        assert_eq!(alloc_value.as_inst(&ctx), Some(alloc));
    }

    #[test]
    fn test_inst_kind() {
        let mut ctx = Context::default();
        let jmp = Inst::jmp(&mut ctx, "exit");
        assert!(matches!(jmp.kind(&ctx), InstKind::Jmp(label) if label == "exit"));
        assert!(jmp.label(&ctx).is_none());
    }
}
