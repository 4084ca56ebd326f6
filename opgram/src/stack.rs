//! Persistent stacks backed by a shared arena.
//!
//! A [`Stack`] is a `Copy` handle (top index and length) into an append-only
//! [`StackArena`] of parent-linked nodes. Pushing appends a node whose parent
//! is the old top; popping moves the handle to the parent. Nodes are never
//! mutated, so any number of handles may share a prefix and copying a handle
//! forks the stack in constant time.

/// A node of the arena: a value and the index of the node below it.
#[derive(Debug, Clone)]
struct Link<T> {
    value: T,
    parent: Option<usize>,
}

/// Append-only storage shared by every stack handle pointing into it.
#[derive(Debug, Clone)]
pub struct StackArena<T> {
    links: Vec<Link<T>>,
}

/// A stack handle. Empty by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stack {
    top: Option<usize>,
    len: usize,
}

impl Stack {
    /// Number of elements reachable from this handle.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for StackArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StackArena<T> {
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    /// Total number of nodes ever pushed, across all handles.
    pub fn node_count(&self) -> usize {
        self.links.len()
    }

    /// Returns a handle to `stack` with `value` on top.
    pub fn push(&mut self, stack: Stack, value: T) -> Stack {
        self.links.push(Link {
            value,
            parent: stack.top,
        });
        Stack {
            top: Some(self.links.len() - 1),
            len: stack.len + 1,
        }
    }

    /// Returns the top value of `stack`.
    pub fn peek(&self, stack: Stack) -> Option<&T> {
        stack.top.map(|i| &self.links[i].value)
    }

    /// Returns the handle below the top and the top value.
    pub fn pop(&self, stack: Stack) -> Option<(Stack, &T)> {
        let i = stack.top?;
        let link = &self.links[i];
        Some((
            Stack {
                top: link.parent,
                len: stack.len - 1,
            },
            &link.value,
        ))
    }

    /// Iterates from the top of `stack` to its bottom.
    pub fn iter(&self, stack: Stack) -> StackIter<'_, T> {
        StackIter {
            arena: self,
            next: stack.top,
        }
    }
}

/// Top-to-bottom iterator over a stack.
pub struct StackIter<'a, T> {
    arena: &'a StackArena<T>,
    next: Option<usize>,
}

impl<'a, T> Iterator for StackIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let link = &self.arena.links[self.next?];
        self.next = link.parent;
        Some(&link.value)
    }
}
