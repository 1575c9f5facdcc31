use std::fmt;

use rustc_hash::FxHashMap;

use super::{Func, FuncData, Global, GlobalData, InstData, LabelData, Ty, TyData, ValueData};
use crate::collections::storage::BaseArena;

/// The context of the IR.
///
/// A context can be understood as a container of all the data in the IR, or as
/// the state when creating the IR. Everything is owned here and referenced
/// through handles.
pub struct Context {
    // +-----------------+
    // |    storages     |
    // +-----------------+
    /// The storage of types, deduplicated through `ty_names`.
    pub(super) tys: BaseArena<TyData>,
    /// The storage of values.
    pub(super) values: BaseArena<ValueData>,
    /// The storage of instructions.
    pub(super) insts: BaseArena<InstData>,
    /// The storage of labels.
    pub(super) labels: BaseArena<LabelData>,
    /// The storage of functions, in declaration order.
    pub(super) funcs: BaseArena<FuncData>,
    /// The storage of globals, in definition order.
    pub(super) globals: BaseArena<GlobalData>,

    // +-----------------+
    // |     symbols     |
    // +-----------------+
    /// Canonical type names.
    pub(super) ty_names: FxHashMap<String, Ty>,
    /// The overloads of each function name, in registration order.
    overloads: FxHashMap<String, Vec<Func>>,
    global_names: FxHashMap<String, Global>,
}

impl Default for Context {
    fn default() -> Self { Self::new() }
}

impl Context {
    /// Create a context with the builtin functions registered.
    pub fn new() -> Self {
        let mut ctx = Self {
            tys: BaseArena::default(),
            values: BaseArena::default(),
            insts: BaseArena::default(),
            labels: BaseArena::default(),
            funcs: BaseArena::default(),
            globals: BaseArena::default(),
            ty_names: FxHashMap::default(),
            overloads: FxHashMap::default(),
            global_names: FxHashMap::default(),
        };
        ctx.register_builtins();
        ctx
    }

    fn register_builtins(&mut self) {
        let void = Ty::void(self);
        let num = Ty::num(self);
        let str_ = Ty::str_(self);

        let binary = Ty::func(self, num, vec![num, num], false);
        for op in ["+", "-", "*", "/", "==", "&&"] {
            Func::new(self, op, binary);
        }

        let str_cmp = Ty::func(self, num, vec![str_, str_], false);
        Func::new(self, "!=", str_cmp);

        let select = Ty::func(self, num, vec![num, num, num], false);
        Func::new(self, "?", select);

        let random = Ty::func(self, num, vec![], false);
        Func::new(self, "random", random);

        let floor = Ty::func(self, num, vec![num], false);
        Func::new(self, "floor", floor);

        let to_num = Ty::func(self, num, vec![str_], false);
        Func::new(self, "num", to_num);

        let printf = Ty::func(self, void, vec![str_], true);
        Func::new(self, "printf", printf);

        let readf = Ty::func(self, str_, vec![str_], true);
        Func::new(self, "readf", readf);
    }

    pub(super) fn insert_func(&mut self, func: Func) {
        let name = func.name(self).to_string();
        let ty = func.ty(self);
        if self.lookup_func(&name, ty).is_some() {
            panic!("function `{}` of type `{}` is already declared", name, ty.name(self));
        }
        self.overloads.entry(name).or_default().push(func);
    }

    pub(super) fn insert_global(&mut self, global: Global) {
        let name = global.name(self).to_string();
        if self.global_names.contains_key(&name) {
            panic!("global `{}` is already defined", name);
        }
        self.global_names.insert(name, global);
    }

    /// Find the function with exactly this name and type.
    pub fn lookup_func(&self, name: &str, ty: Ty) -> Option<Func> {
        self.overloads(name)
            .iter()
            .copied()
            .find(|func| func.ty(self) == ty)
    }

    /// All the overloads of `name`, in registration order.
    pub fn overloads(&self, name: &str) -> &[Func] {
        self.overloads.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pick the overload of `name` that accepts arguments of `args` types.
    ///
    /// Non-variadic overloads taking exactly `args` win over variadic ones.
    /// For a variadic overload, the fixed parameters must match the leading
    /// arguments. Ties are broken by registration order.
    pub fn resolve_func(&self, name: &str, args: &[Ty]) -> Option<Func> {
        let overloads = self.overloads(name);

        let exact = overloads
            .iter()
            .copied()
            .find(|func| !func.is_varargs(self) && func.param_tys(self) == args);

        exact.or_else(|| {
            overloads.iter().copied().find(|func| {
                let params = func.param_tys(self);
                func.is_varargs(self)
                    && params.len() <= args.len()
                    && params == &args[..params.len()]
            })
        })
    }

    /// All the functions, in declaration order.
    pub fn funcs(&self) -> Vec<Func> {
        self.funcs
            .iter()
            .map(|(_, data)| data.self_ptr())
            .collect()
    }

    pub fn lookup_global(&self, name: &str) -> Option<Global> { self.global_names.get(name).copied() }

    /// All the globals, in definition order.
    pub fn globals(&self) -> Vec<Global> {
        self.globals
            .iter()
            .map(|(_, data)| data.self_ptr())
            .collect()
    }

    /// Display the whole module, in a form [Parser](crate::frontend::Parser)
    /// reads back.
    pub fn display(&self) -> DisplayContext<'_> { DisplayContext { ctx: self } }
}

pub struct DisplayContext<'a> {
    ctx: &'a Context,
}

impl fmt::Display for DisplayContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for global in self.ctx.globals() {
            writeln!(f, "{}", global.display(self.ctx))?;
        }

        for func in self.ctx.funcs() {
            writeln!(f, "{}", func.display(self.ctx))?;
        }

        Ok(())
    }
}
