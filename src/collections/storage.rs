//! Arena storage for the IR graph.
//!
//! Every IR entity (type, value, instruction, label, function, global) lives
//! in a [BaseArena] owned by the [Context](crate::ir::Context). Entities refer
//! to each other with copyable handles wrapping a [BaseArenaPtr], so cyclic
//! links (an instruction and its label, a label and its function) need
//! neither reference counting nor lifetimes. Entities are never freed one by
//! one; they are dropped together with the context.
//!
//! A handle is bound to its arena field with [impl_arena], which implements
//! [ArenaPtr], [ArenaDeref] and [ArenaAlloc] for the pair.
//!
//! ```rust
//! use csawir::impl_arena;
//! use csawir::collections::storage::{ArenaAlloc, ArenaPtr, BaseArena, BaseArenaPtr};
//!
//! struct Cell { this: CellRef, next: Option<CellRef>, payload: u8 }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! struct CellRef(BaseArenaPtr<Cell>);
//!
//! #[derive(Default)]
//! struct Heap { cells: BaseArena<Cell> }
//!
//! impl_arena!(Heap, Cell, CellRef, cells);
//!
//! let mut heap = Heap::default();
//! let tail = heap.alloc_with(|this| Cell { this, next: None, payload: 2 });
//! let head = heap.alloc_with(|this| Cell { this, next: Some(tail), payload: 1 });
//!
//! assert_eq!(head.deref(&heap).this, head);
//! assert_eq!(head.deref(&heap).next, Some(tail));
//!
//! tail.deref_mut(&mut heap).payload = 3;
//! assert_eq!(tail.deref(&heap).payload, 3);
//! ```

use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// A container that resolves handles of type `Ptr` to `T`.
pub trait ArenaDeref<T, Ptr>
where
    Ptr: ArenaPtr<T = T, A = Self>,
{
    /// Resolve a handle, [None] if it was not allocated here.
    fn try_deref(&self, ptr: Ptr) -> Option<&T>;

    fn try_deref_mut(&mut self, ptr: Ptr) -> Option<&mut T>;
}

/// A container that hands out handles of type `Ptr` for new `T`s.
pub trait ArenaAlloc<T, Ptr>: ArenaDeref<T, Ptr>
where
    Ptr: ArenaPtr<T = T, A = Self>,
{
    /// Allocate the value built by `f`.
    ///
    /// `f` receives the handle the value is going to get, so the value can
    /// store its own handle.
    fn alloc_with<F>(&mut self, f: F) -> Ptr
    where
        F: FnOnce(Ptr) -> T;

    fn alloc(&mut self, val: T) -> Ptr { self.alloc_with(|_| val) }
}

/// A copyable handle into the container `A`.
pub trait ArenaPtr: Copy + Sized + Eq {
    /// The value behind the handle.
    type T;

    /// The container the handle belongs to.
    type A: ArenaDeref<Self::T, Self>;

    fn try_deref(self, arena: &Self::A) -> Option<&Self::T>;

    fn try_deref_mut(self, arena: &mut Self::A) -> Option<&mut Self::T>;

    /// Resolve the handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle comes from another container. Handles are only
    /// created by allocation, so this is a programming error.
    fn deref(self, arena: &Self::A) -> &Self::T {
        match self.try_deref(arena) {
            Some(val) => val,
            None => panic!("dangling arena handle"),
        }
    }

    /// Resolve the handle mutably.
    ///
    /// # Panics
    ///
    /// Same as [ArenaPtr::deref].
    fn deref_mut(self, arena: &mut Self::A) -> &mut Self::T {
        match self.try_deref_mut(arena) {
            Some(val) => val,
            None => panic!("dangling arena handle"),
        }
    }
}

/// The raw handle of a [BaseArena]: the allocation index, typed by `T`.
pub struct BaseArenaPtr<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BaseArenaPtr<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// The allocation index, unique within one arena.
    pub fn index(self) -> usize { self.index }
}

// Derives would require `T` to implement the traits too.

impl<T> Clone for BaseArenaPtr<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for BaseArenaPtr<T> {}

impl<T> PartialEq for BaseArenaPtr<T> {
    fn eq(&self, other: &Self) -> bool { self.index == other.index }
}

impl<T> Eq for BaseArenaPtr<T> {}

impl<T> Hash for BaseArenaPtr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) { self.index.hash(state) }
}

impl<T> fmt::Debug for BaseArenaPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.index) }
}

/// An append-only arena.
///
/// Values keep their allocation order, which the IR relies on to list
/// functions and globals in declaration order.
pub struct BaseArena<T> {
    slots: Vec<T>,
}

impl<T> Default for BaseArena<T> {
    fn default() -> Self { Self { slots: Vec::new() } }
}

impl<T> BaseArena<T> {
    /// Store `val` and return its handle.
    pub fn alloc(&mut self, val: T) -> BaseArenaPtr<T> { self.alloc_with(|_| val) }

    pub fn alloc_with<F>(&mut self, f: F) -> BaseArenaPtr<T>
    where
        F: FnOnce(BaseArenaPtr<T>) -> T,
    {
        let ptr = BaseArenaPtr::new(self.slots.len());
        self.slots.push(f(ptr));
        ptr
    }

    pub fn try_deref(&self, ptr: BaseArenaPtr<T>) -> Option<&T> { self.slots.get(ptr.index) }

    pub fn try_deref_mut(&mut self, ptr: BaseArenaPtr<T>) -> Option<&mut T> {
        self.slots.get_mut(ptr.index)
    }

    pub fn len(&self) -> usize { self.slots.len() }

    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// All the values with their handles, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (BaseArenaPtr<T>, &T)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, val)| (BaseArenaPtr::new(index), val))
    }
}

/// Bind the handle newtype `$ptr` (wrapping a [BaseArenaPtr] of `$value`) to
/// the arena field `$field` of `$arena`.
#[macro_export]
macro_rules! impl_arena {
    ($arena:ty, $value:ty, $ptr:ident, $field:ident) => {
        impl $crate::collections::storage::ArenaPtr for $ptr {
            type A = $arena;
            type T = $value;

            fn try_deref(self, arena: &$arena) -> Option<&$value> { arena.$field.try_deref(self.0) }

            fn try_deref_mut(self, arena: &mut $arena) -> Option<&mut $value> {
                arena.$field.try_deref_mut(self.0)
            }
        }

        impl $crate::collections::storage::ArenaDeref<$value, $ptr> for $arena {
            fn try_deref(&self, ptr: $ptr) -> Option<&$value> { self.$field.try_deref(ptr.0) }

            fn try_deref_mut(&mut self, ptr: $ptr) -> Option<&mut $value> {
                self.$field.try_deref_mut(ptr.0)
            }
        }

        impl $crate::collections::storage::ArenaAlloc<$value, $ptr> for $arena {
            fn alloc_with<F>(&mut self, f: F) -> $ptr
            where
                F: FnOnce($ptr) -> $value,
            {
                $ptr(self.$field.alloc_with(|raw| f($ptr(raw))))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::{ArenaAlloc, ArenaDeref, ArenaPtr, BaseArena, BaseArenaPtr};

    struct Slot {
        name: &'static str,
        this: SlotRef,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct SlotRef(BaseArenaPtr<Slot>);

    #[derive(Default)]
    struct Slots {
        slots: BaseArena<Slot>,
    }

    crate::impl_arena!(Slots, Slot, SlotRef, slots);

    #[test]
    fn test_alloc_and_deref() {
        let mut arena = Slots::default();

        let a = arena.alloc_with(|this| Slot { name: "a", this });
        let b = arena.alloc_with(|this| Slot { name: "b", this });

        assert_ne!(a, b);
        assert_eq!(a.deref(&arena).this, a);
        assert_eq!(ArenaDeref::try_deref(&arena, b).map(|s| s.name), Some("b"));

        b.deref_mut(&mut arena).name = "c";
        assert_eq!(b.deref(&arena).name, "c");
    }

    #[test]
    fn test_allocation_order() {
        let mut arena = BaseArena::default();
        let first = arena.alloc(10);
        let second = arena.alloc(20);

        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(arena.len(), 2);

        let values: Vec<i32> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![10, 20]);
        let handles: Vec<_> = arena.iter().map(|(ptr, _)| ptr).collect();
        assert_eq!(handles, vec![first, second]);
    }

    #[test]
    fn test_foreign_handle() {
        let mut big = BaseArena::default();
        big.alloc(1u8);
        let foreign = big.alloc(2u8);

        let small: BaseArena<u8> = BaseArena::default();
        assert!(small.is_empty());
        assert!(small.try_deref(foreign).is_none());
    }
}
