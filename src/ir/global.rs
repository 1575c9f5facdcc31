use std::fmt;

use rustc_hash::FxHashMap;

use super::{value::ValueKind, Constant, Context, Inst, Label, Ty, Value};
use crate::{
    collections::{
        linked_list::LinkedListContainerPtr,
        storage::{ArenaAlloc, ArenaPtr, BaseArenaPtr},
    },
    impl_arena,
};

/// The data of a function.
///
/// Declarations and definitions share one representation, a function is
/// defined once it has an entry instruction. The body is a set of label
/// chains, kept in creation order; the first chain is the entry chain.
pub struct FuncData {
    self_ptr: Func,
    name: String,
    /// The function type, see [TyKind::Func](super::TyKind::Func).
    ty: Ty,
    /// Parameter names, bound when the function is defined.
    params: Vec<String>,
    entry: Option<Inst>,

    labels: Vec<Label>,
    label_map: FxHashMap<String, Label>,
}

impl FuncData {
    pub fn self_ptr(&self) -> Func { self.self_ptr }
}

#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub struct Func(BaseArenaPtr<FuncData>);

impl_arena!(Context, FuncData, Func, funcs);

impl Func {
    /// Create a function and register it as an overload of `name`.
    ///
    /// # Panics
    ///
    /// - Panics if `ty` is not a function type.
    /// - Panics if a function with the same name and type already exists.
    pub fn new(ctx: &mut Context, name: impl Into<String>, ty: Ty) -> Func {
        assert!(ty.is_func(ctx), "type `{}` is not a function type", ty.name(ctx));

        let func = ctx.alloc_with(|self_ptr| FuncData {
            self_ptr,
            name: name.into(),
            ty,
            params: Vec::new(),
            entry: None,
            labels: Vec::new(),
            label_map: FxHashMap::default(),
        });
        ctx.insert_func(func);
        func
    }

    pub fn name(self, ctx: &Context) -> &str { &self.deref(ctx).name }

    pub fn ty(self, ctx: &Context) -> Ty { self.deref(ctx).ty }

    pub fn ret_ty(self, ctx: &Context) -> Option<Ty> { self.ty(ctx).ret_ty(ctx) }

    pub fn param_tys(self, ctx: &Context) -> &[Ty] { self.ty(ctx).params(ctx) }

    pub fn is_varargs(self, ctx: &Context) -> bool { self.ty(ctx).is_varargs(ctx) }

    pub fn params(self, ctx: &Context) -> &[String] { &self.deref(ctx).params }

    pub fn set_params(self, ctx: &mut Context, params: Vec<String>) {
        self.deref_mut(ctx).params = params;
    }

    /// The first instruction of the body, [None] for a declaration.
    pub fn entry(self, ctx: &Context) -> Option<Inst> { self.deref(ctx).entry }

    pub fn is_defined(self, ctx: &Context) -> bool { self.entry(ctx).is_some() }

    pub fn label(self, ctx: &Context, name: &str) -> Option<Label> {
        self.deref(ctx).label_map.get(name).copied()
    }

    /// All the labels, in creation order.
    pub fn labels(self, ctx: &Context) -> &[Label] { &self.deref(ctx).labels }

    /// The instructions under the label `name`, empty if there is no such
    /// label.
    pub fn label_insts(self, ctx: &Context, name: &str) -> Vec<Inst> {
        self.label(ctx, name)
            .map(|label| label.insts(ctx))
            .unwrap_or_default()
    }

    /// Append an instruction to the chain of label `name`.
    ///
    /// The label is created if it does not exist yet, and the first
    /// instruction ever appended becomes the entry of the function.
    ///
    /// # Panics
    ///
    /// Panics if `inst` is already appended somewhere.
    pub fn append(self, ctx: &mut Context, name: &str, inst: Inst) {
        let label = match self.label(ctx, name) {
            Some(label) => label,
            None => {
                let label = Label::new(ctx, self, name);
                let data = self.deref_mut(ctx);
                data.labels.push(label);
                data.label_map.insert(name.to_string(), label);
                label
            }
        };

        label.push_back(ctx, inst);

        let data = self.deref_mut(ctx);
        if data.entry.is_none() {
            data.entry = Some(inst);
        }
    }

    pub fn display(self, ctx: &Context) -> DisplayFunc<'_> {
        DisplayFunc {
            ctx,
            data: self.deref(ctx),
        }
    }
}

pub struct DisplayFunc<'a> {
    ctx: &'a Context,
    data: &'a FuncData,
}

impl fmt::Display for DisplayFunc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.ctx;
        let ty = self.data.ty;
        let keyword = if self.data.entry.is_some() { "def" } else { "dec" };

        write!(f, "{} ", keyword)?;
        match ty.ret_ty(ctx) {
            Some(ret) => write!(f, "{}", ret.display(ctx))?,
            None => write!(f, "void")?,
        }
        write!(f, " {}", self.data.name)?;

        for (i, param) in ty.params(ctx).iter().enumerate() {
            match self.data.params.get(i) {
                Some(name) => write!(f, " {} {}", param.display(ctx), name)?,
                None => write!(f, " {} v{}", param.display(ctx), i)?,
            }
        }
        if ty.is_varargs(ctx) {
            write!(f, " ?")?;
        }

        if self.data.entry.is_none() {
            return Ok(());
        }
        writeln!(f)?;

        for (i, label) in self.data.labels.iter().enumerate() {
            let name = label.name(ctx);
            // the entry chain starts right after the header
            if i > 0 || !name.is_empty() {
                writeln!(f, "@{}", name)?;
            }
            for inst in label.iter(ctx) {
                writeln!(f, "\t{}", inst.display(ctx))?;
            }
        }

        write!(f, "enddef")
    }
}

/// The data of a global.
pub struct GlobalData {
    self_ptr: Global,
    name: String,
    init: Constant,
    /// The value of the global itself, created on demand.
    value: Option<Value>,
}

impl GlobalData {
    pub fn self_ptr(&self) -> Global { self.self_ptr }
}

/// A named module-level constant, referenced by `$<name>` operands.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub struct Global(BaseArenaPtr<GlobalData>);

impl_arena!(Context, GlobalData, Global, globals);

impl Global {
    /// Create a global and bind its name in the context.
    ///
    /// # Panics
    ///
    /// Panics if the name is already bound.
    pub fn new(ctx: &mut Context, name: impl Into<String>, init: Constant) -> Global {
        let global = ctx.alloc_with(|self_ptr| GlobalData {
            self_ptr,
            name: name.into(),
            init,
            value: None,
        });
        ctx.insert_global(global);
        global
    }

    pub fn name(self, ctx: &Context) -> &str { &self.deref(ctx).name }

    pub fn init(self, ctx: &Context) -> &Constant { &self.deref(ctx).init }

    pub fn ty(self, ctx: &Context) -> Ty { self.init(ctx).ty() }

    /// Get the global as a value.
    pub fn value(self, ctx: &mut Context) -> Value {
        if let Some(value) = self.deref(ctx).value {
            return value;
        }
        let value = Value::new(ctx, ValueKind::Global(self));
        self.deref_mut(ctx).value = Some(value);
        value
    }

    pub fn display(self, ctx: &Context) -> DisplayGlobal<'_> {
        DisplayGlobal {
            ctx,
            data: self.deref(ctx),
        }
    }
}

pub struct DisplayGlobal<'a> {
    ctx: &'a Context,
    data: &'a GlobalData,
}

impl fmt::Display for DisplayGlobal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "global ${} {}",
            self.data.name,
            self.data.init.display(self.ctx)
        )
    }
}
