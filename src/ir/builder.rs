//! # Builder of CSawIR.
//!
//! The builder is an insertion cursor: a function and a label inside it.
//! Every appended instruction goes to the end of that label's chain.
//!
//! The builder does not borrow the [Context], every operation takes it as an
//! argument, so a builder can live next to the context it builds into.

use thiserror::Error;

use super::{Constant, Context, Func, Inst, Value};

#[derive(Error, Debug)]
pub enum BuildError {
    /// No function is selected.
    ///
    /// Call [Builder::start_insert] or [Builder::set_insert_func] first.
    #[error("no function to insert into")]
    NoInsertFunction,
}

/// The insertion cursor.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    func: Option<Func>,
    /// The label name, empty for the entry chain.
    label: String,
}

impl Builder {
    pub fn new() -> Self { Self::default() }

    /// Select both the function and the label.
    pub fn start_insert(&mut self, func: Func, label: impl Into<String>) {
        self.func = Some(func);
        self.label = label.into();
    }

    pub fn set_insert_func(&mut self, func: Func) { self.func = Some(func); }

    pub fn set_insert_label(&mut self, label: impl Into<String>) { self.label = label.into(); }

    pub fn insert_func(&self) -> Option<Func> { self.func }

    pub fn insert_label(&self) -> &str { &self.label }

    /// Append an instruction at the cursor.
    pub fn append(&self, ctx: &mut Context, inst: Inst) -> Result<Inst, BuildError> {
        let func = self.func.ok_or(BuildError::NoInsertFunction)?;
        func.append(ctx, &self.label, inst);
        Ok(inst)
    }

    pub fn append_ret(&self, ctx: &mut Context, value: Option<Value>) -> Result<Inst, BuildError> {
        let inst = Inst::ret(ctx, value);
        self.append(ctx, inst)
    }

    pub fn append_call(
        &self,
        ctx: &mut Context,
        callee: Func,
        args: Vec<Value>,
    ) -> Result<Inst, BuildError> {
        let inst = Inst::call(ctx, callee, args);
        self.append(ctx, inst)
    }

    pub fn append_set(
        &self,
        ctx: &mut Context,
        name: impl Into<String>,
        value: Value,
    ) -> Result<Inst, BuildError> {
        let inst = Inst::set(ctx, name, value);
        self.append(ctx, inst)
    }

    pub fn append_store(
        &self,
        ctx: &mut Context,
        ptr: Value,
        value: Value,
    ) -> Result<Inst, BuildError> {
        let inst = Inst::store(ctx, ptr, value);
        self.append(ctx, inst)
    }

    pub fn append_jmp(&self, ctx: &mut Context, label: impl Into<String>) -> Result<Inst, BuildError> {
        let inst = Inst::jmp(ctx, label);
        self.append(ctx, inst)
    }

    pub fn append_cjmp(
        &self,
        ctx: &mut Context,
        cond: Value,
        label_true: impl Into<String>,
        label_false: impl Into<String>,
    ) -> Result<Inst, BuildError> {
        let inst = Inst::cjmp(ctx, cond, label_true, label_false);
        self.append(ctx, inst)
    }

    /// Create a numeric constant value. Nothing is appended.
    pub fn create_num(&self, ctx: &mut Context, value: f64) -> Value {
        let constant = Constant::num(ctx, value);
        Value::constant(ctx, constant)
    }

    /// Create a string constant value. Nothing is appended.
    pub fn create_str(&self, ctx: &mut Context, value: impl Into<String>) -> Value {
        let constant = Constant::str_(ctx, value);
        Value::constant(ctx, constant)
    }
}
