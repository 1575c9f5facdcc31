use super::{Context, Func, Inst};
use crate::{
    collections::{
        linked_list::LinkedListContainerPtr,
        storage::{ArenaAlloc, ArenaPtr, BaseArenaPtr},
    },
    impl_arena,
};

/// The data of a label.
///
/// A label names one chain of instructions inside a function. The entry
/// chain may have an empty name.
#[derive(Debug)]
pub struct LabelData {
    self_ptr: Label,
    name: String,
    /// The function owning the label.
    func: Func,

    head: Option<Inst>,
    tail: Option<Inst>,
}

impl LabelData {
    pub fn self_ptr(&self) -> Label { self.self_ptr }
}

#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub struct Label(BaseArenaPtr<LabelData>);

impl_arena!(Context, LabelData, Label, labels);

impl Label {
    /// Create an empty label in `func`.
    ///
    /// Use [Func::append] to add instructions, which creates labels on demand.
    pub(super) fn new(ctx: &mut Context, func: Func, name: impl Into<String>) -> Label {
        ctx.alloc_with(|self_ptr| LabelData {
            self_ptr,
            name: name.into(),
            func,
            head: None,
            tail: None,
        })
    }

    pub fn name(self, ctx: &Context) -> &str { &self.deref(ctx).name }

    pub fn func(self, ctx: &Context) -> Func { self.deref(ctx).func }

    /// The instructions of the label, in insertion order.
    pub fn insts(self, ctx: &Context) -> Vec<Inst> { self.iter(ctx).collect() }
}

impl LinkedListContainerPtr<Inst> for Label {
    fn head(self, ctx: &Context) -> Option<Inst> { self.deref(ctx).head }

    fn tail(self, ctx: &Context) -> Option<Inst> { self.deref(ctx).tail }

    fn set_head(self, ctx: &mut Context, head: Option<Inst>) { self.deref_mut(ctx).head = head; }

    fn set_tail(self, ctx: &mut Context, tail: Option<Inst>) { self.deref_mut(ctx).tail = tail; }
}
