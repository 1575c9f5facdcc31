//! Intrusive doubly-linked lists over arena handles.
//!
//! The instructions of a label form such a list: every instruction stores its
//! neighbours and its label, and the label stores the two ends. Appending is
//! constant time and never walks the chain.

use super::storage::ArenaPtr;

/// The owner of a list, e.g. a label owning its instructions.
///
/// The owner and the nodes are stored in the same arena container.
pub trait LinkedListContainerPtr<NodePtr>: ArenaPtr
where
    NodePtr: LinkedListNodePtr<A = Self::A, ContainerPtr = Self>,
{
    /// The first node. [None] exactly when [tail](Self::tail) is [None].
    fn head(self, arena: &Self::A) -> Option<NodePtr>;

    fn tail(self, arena: &Self::A) -> Option<NodePtr>;

    fn set_head(self, arena: &mut Self::A, head: Option<NodePtr>);

    fn set_tail(self, arena: &mut Self::A, tail: Option<NodePtr>);

    /// Append a detached node.
    ///
    /// # Panics
    ///
    /// Panics if `node` is already owned by a list.
    fn push_back(self, arena: &mut Self::A, node: NodePtr) {
        assert!(node.container(arena).is_none(), "node is already linked");

        match self.tail(arena) {
            Some(tail) => tail.insert_after(arena, node),
            None => {
                self.set_head(arena, Some(node));
                self.set_tail(arena, Some(node));
                node.set_container(arena, Some(self));
            }
        }
    }

    /// Walk the nodes from head to tail.
    fn iter(self, arena: &Self::A) -> LinkedListIterator<'_, NodePtr> {
        LinkedListIterator {
            arena,
            front: self.head(arena),
            back: self.tail(arena),
        }
    }
}

/// Iterator over the nodes of one list, usable from both ends.
pub struct LinkedListIterator<'a, T: LinkedListNodePtr> {
    arena: &'a T::A,
    front: Option<T>,
    back: Option<T>,
}

impl<'a, T: LinkedListNodePtr> LinkedListIterator<'a, T> {
    // Both cursors are cleared once they cross.
    fn step(&mut self, curr: T, next: Option<T>, forward: bool) {
        let met = if forward {
            self.back == Some(curr)
        } else {
            self.front == Some(curr)
        };
        if met {
            self.front = None;
            self.back = None;
        } else if forward {
            self.front = next;
        } else {
            self.back = next;
        }
    }
}

impl<'a, T: LinkedListNodePtr> Iterator for LinkedListIterator<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let curr = self.front?;
        let next = curr.next(self.arena);
        self.step(curr, next, true);
        Some(curr)
    }
}

impl<'a, T: LinkedListNodePtr> DoubleEndedIterator for LinkedListIterator<'a, T> {
    fn next_back(&mut self) -> Option<T> {
        let curr = self.back?;
        let prev = curr.prev(self.arena);
        self.step(curr, prev, false);
        Some(curr)
    }
}

/// A node of an intrusive list. A node is linked into at most one list.
pub trait LinkedListNodePtr: ArenaPtr {
    type ContainerPtr: LinkedListContainerPtr<Self, A = Self::A>;

    fn next(self, arena: &Self::A) -> Option<Self>;

    fn prev(self, arena: &Self::A) -> Option<Self>;

    fn set_next(self, arena: &mut Self::A, next: Option<Self>);

    fn set_prev(self, arena: &mut Self::A, prev: Option<Self>);

    /// The list owning this node, [None] while detached.
    fn container(self, arena: &Self::A) -> Option<Self::ContainerPtr>;

    fn set_container(self, arena: &mut Self::A, container: Option<Self::ContainerPtr>);

    /// Link the detached `node` right after `self`, moving the tail of the
    /// owner if `self` was the last node.
    ///
    /// # Panics
    ///
    /// Panics if `self` is detached or `node` is already linked.
    fn insert_after(self, arena: &mut Self::A, node: Self) {
        let owner = match self.container(arena) {
            Some(owner) => owner,
            None => panic!("insertion point is not linked"),
        };
        assert!(node.container(arena).is_none(), "node is already linked");

        let after = self.next(arena);
        match after {
            Some(after) => after.set_prev(arena, Some(node)),
            None => owner.set_tail(arena, Some(node)),
        }
        node.set_next(arena, after);
        node.set_prev(arena, Some(self));
        node.set_container(arena, Some(owner));
        self.set_next(arena, Some(node));
    }
}

#[cfg(test)]
mod tests {
    use super::{LinkedListContainerPtr, LinkedListNodePtr};
    use crate::collections::storage::{ArenaAlloc, ArenaPtr, BaseArena, BaseArenaPtr};

    #[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
    struct Word(BaseArenaPtr<WordData>);

    struct WordData {
        text: &'static str,
        next: Option<Word>,
        prev: Option<Word>,
        line: Option<Line>,
    }

    #[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
    struct Line(BaseArenaPtr<LineData>);

    #[derive(Default)]
    struct LineData {
        first: Option<Word>,
        last: Option<Word>,
    }

    #[derive(Default)]
    struct Page {
        words: BaseArena<WordData>,
        lines: BaseArena<LineData>,
    }

    crate::impl_arena!(Page, WordData, Word, words);
    crate::impl_arena!(Page, LineData, Line, lines);

    impl LinkedListContainerPtr<Word> for Line {
        fn head(self, page: &Page) -> Option<Word> { self.deref(page).first }

        fn tail(self, page: &Page) -> Option<Word> { self.deref(page).last }

        fn set_head(self, page: &mut Page, head: Option<Word>) { self.deref_mut(page).first = head; }

        fn set_tail(self, page: &mut Page, tail: Option<Word>) { self.deref_mut(page).last = tail; }
    }

    impl LinkedListNodePtr for Word {
        type ContainerPtr = Line;

        fn next(self, page: &Page) -> Option<Word> { self.deref(page).next }

        fn prev(self, page: &Page) -> Option<Word> { self.deref(page).prev }

        fn set_next(self, page: &mut Page, next: Option<Word>) { self.deref_mut(page).next = next; }

        fn set_prev(self, page: &mut Page, prev: Option<Word>) { self.deref_mut(page).prev = prev; }

        fn container(self, page: &Page) -> Option<Line> { self.deref(page).line }

        fn set_container(self, page: &mut Page, line: Option<Line>) {
            self.deref_mut(page).line = line;
        }
    }

    fn word(page: &mut Page, text: &'static str) -> Word {
        page.alloc(WordData {
            text,
            next: None,
            prev: None,
            line: None,
        })
    }

    fn texts(page: &Page, words: impl Iterator<Item = Word>) -> Vec<&'static str> {
        words.map(|w| w.deref(page).text).collect()
    }

    #[test]
    fn test_push_back() {
        let mut page = Page::default();
        let line = page.alloc(LineData::default());
        assert!(line.iter(&page).next().is_none());

        let a = word(&mut page, "a");
        let b = word(&mut page, "b");
        let c = word(&mut page, "c");
        line.push_back(&mut page, a);
        assert_eq!(line.head(&page), Some(a));
        assert_eq!(line.tail(&page), Some(a));

        line.push_back(&mut page, b);
        line.push_back(&mut page, c);

        assert_eq!(line.tail(&page), Some(c));
        assert_eq!(b.prev(&page), Some(a));
        assert_eq!(c.container(&page), Some(line));
        assert_eq!(texts(&page, line.iter(&page)), vec!["a", "b", "c"]);
        assert_eq!(texts(&page, line.iter(&page).rev()), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut page = Page::default();
        let line = page.alloc(LineData::default());
        let hello = word(&mut page, "hello");
        let world = word(&mut page, "world");
        let big = word(&mut page, "big");

        line.push_back(&mut page, hello);
        line.push_back(&mut page, world);
        hello.insert_after(&mut page, big);

        assert_eq!(line.tail(&page), Some(world));
        assert_eq!(world.prev(&page), Some(big));
        assert_eq!(texts(&page, line.iter(&page)), vec!["hello", "big", "world"]);
    }

    #[test]
    fn test_iterate_from_both_ends() {
        let mut page = Page::default();
        let line = page.alloc(LineData::default());
        for text in ["x", "y", "z"] {
            let w = word(&mut page, text);
            line.push_back(&mut page, w);
        }

        let mut iter = line.iter(&page);
        let front = iter.next().map(|w| w.deref(&page).text);
        let back = iter.next_back().map(|w| w.deref(&page).text);
        let middle = iter.next().map(|w| w.deref(&page).text);
        assert_eq!((front, back, middle), (Some("x"), Some("z"), Some("y")));
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());
    }

    #[test]
    #[should_panic(expected = "node is already linked")]
    fn test_link_twice() {
        let mut page = Page::default();
        let first = page.alloc(LineData::default());
        let second = page.alloc(LineData::default());
        let w = word(&mut page, "w");

        first.push_back(&mut page, w);
        second.push_back(&mut page, w);
    }
}
