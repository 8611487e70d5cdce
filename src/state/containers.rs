//! The container shapes of the information state. All operations are pure:
//! they borrow the container and return a replacement value, so a rollback
//! is a value swap rather than an undo log.

use serde::{Deserialize, Serialize};

/// Strict stack. Top is the last element of the backing vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack<T>(Vec<T>);

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Stack(Vec::new())
    }
}

impl<T: Clone> Stack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, item: T) -> Self {
        let mut inner = self.0.clone();
        inner.push(item);
        Stack(inner)
    }

    pub fn pop(&self) -> (Option<T>, Self) {
        let mut inner = self.0.clone();
        let top = inner.pop();
        (top, Stack(inner))
    }

    pub fn top(&self) -> Option<&T> {
        self.0.last()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Top-down iteration.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter().rev()
    }
}

impl<T: Clone + PartialEq> Stack<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.0.contains(item)
    }

    /// Remove every element satisfying the predicate, preserving order.
    pub fn remove_where(&self, pred: impl Fn(&T) -> bool) -> Self {
        Stack(self.0.iter().filter(|t| !pred(t)).cloned().collect())
    }
}

/// Duplicate-free set with stable (insertion) order, so the persisted form
/// round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Set<T>(Vec<T>);

impl<T> Default for Set<T> {
    fn default() -> Self {
        Set(Vec::new())
    }
}

impl<T: Clone + PartialEq> Set<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, item: T) -> Self {
        if self.0.contains(&item) {
            return self.clone();
        }
        let mut inner = self.0.clone();
        inner.push(item);
        Set(inner)
    }

    pub fn remove(&self, item: &T) -> Self {
        Set(self.0.iter().filter(|t| *t != item).cloned().collect())
    }

    pub fn contains(&self, item: &T) -> bool {
        self.0.contains(item)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn clear(&self) -> Self {
        Set(Vec::new())
    }
}

/// Stack semantics for top/pop, set semantics for membership: pushing an
/// element already present re-promotes it to the top instead of
/// duplicating. Sameness is caller-supplied so the QUD can use
/// unifiability rather than plain equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpenStack<T>(Vec<T>);

impl<T> Default for OpenStack<T> {
    fn default() -> Self {
        OpenStack(Vec::new())
    }
}

impl<T: Clone> OpenStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(&self) -> Option<&T> {
        self.0.last()
    }

    pub fn pop(&self) -> (Option<T>, Self) {
        let mut inner = self.0.clone();
        let top = inner.pop();
        (top, OpenStack(inner))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Top-down iteration.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter().rev()
    }

    pub fn member(&self, same: impl Fn(&T) -> bool) -> Option<&T> {
        self.0.iter().rev().find(|t| same(t))
    }

    /// Push with re-promotion: an existing same element is moved to the
    /// top (keeping its original value), otherwise the new element is
    /// inserted on top.
    pub fn push_promote(&self, item: T, same: impl Fn(&T, &T) -> bool) -> Self {
        let mut inner: Vec<T> = Vec::with_capacity(self.0.len() + 1);
        let mut existing = None;
        for t in &self.0 {
            if existing.is_none() && same(t, &item) {
                existing = Some(t.clone());
            } else {
                inner.push(t.clone());
            }
        }
        inner.push(existing.unwrap_or(item));
        OpenStack(inner)
    }

    /// Promote a matching element without inserting. Returns `None` when
    /// no element matches.
    pub fn raise(&self, same: impl Fn(&T) -> bool) -> Option<Self> {
        let found = self.0.iter().rev().find(|t| same(t))?.clone();
        let mut inner: Vec<T> = self
            .0
            .iter()
            .filter(|t| !same(t))
            .cloned()
            .collect();
        inner.push(found);
        Some(OpenStack(inner))
    }

    pub fn remove(&self, same: impl Fn(&T) -> bool) -> Self {
        OpenStack(self.0.iter().filter(|t| !same(t)).cloned().collect())
    }
}

/// FIFO queue for the non-integrated move queue, the action queue and the
/// agenda. `rotate` sends the front entry to the back so stuck moves do
/// not starve the rest of the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Queue<T>(Vec<T>);

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Queue(Vec::new())
    }
}

impl<T: Clone> Queue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&self, item: T) -> Self {
        let mut inner = self.0.clone();
        inner.push(item);
        Queue(inner)
    }

    pub fn push_front(&self, item: T) -> Self {
        let mut inner = Vec::with_capacity(self.0.len() + 1);
        inner.push(item);
        inner.extend(self.0.iter().cloned());
        Queue(inner)
    }

    pub fn pop_front(&self) -> (Option<T>, Self) {
        if self.0.is_empty() {
            return (None, self.clone());
        }
        let mut inner = self.0.clone();
        let front = inner.remove(0);
        (Some(front), Queue(inner))
    }

    pub fn front(&self) -> Option<&T> {
        self.0.first()
    }

    pub fn rotate(&self) -> Self {
        if self.0.len() < 2 {
            return self.clone();
        }
        let mut inner = self.0.clone();
        let front = inner.remove(0);
        inner.push(front);
        Queue(inner)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    /// Rebuild the queue by mapping every entry.
    pub fn map(&self, f: impl FnMut(&T) -> T) -> Self {
        Queue(self.0.iter().map(f).collect())
    }

    pub fn retain(&self, mut pred: impl FnMut(&T) -> bool) -> Self {
        Queue(self.0.iter().filter(|t| pred(t)).cloned().collect())
    }
}

impl<T: Clone + PartialEq> Queue<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.0.contains(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_push_pop_order() {
        let s = Stack::new().push(1).push(2).push(3);
        assert_eq!(s.top(), Some(&3));
        let (top, rest) = s.pop();
        assert_eq!(top, Some(3));
        assert_eq!(rest.top(), Some(&2));
        // Original untouched.
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn set_is_duplicate_free() {
        let s = Set::new().add("a").add("b").add("a");
        assert_eq!(s.len(), 2);
        let s = s.remove(&"a");
        assert!(!s.contains(&"a"));
        assert!(s.contains(&"b"));
    }

    #[test]
    fn open_stack_repromotes_instead_of_duplicating() {
        let s = OpenStack::new()
            .push_promote(1, |a, b| a == b)
            .push_promote(2, |a, b| a == b)
            .push_promote(1, |a, b| a == b);
        assert_eq!(s.len(), 2);
        assert_eq!(s.top(), Some(&1));
    }

    #[test]
    fn open_stack_raise_promotes_without_insertion() {
        let s = OpenStack::new()
            .push_promote(1, |a, b| a == b)
            .push_promote(2, |a, b| a == b);
        let raised = s.raise(|t| *t == 1).unwrap();
        assert_eq!(raised.top(), Some(&1));
        assert_eq!(raised.len(), 2);
        assert!(s.raise(|t| *t == 9).is_none());
    }

    #[test]
    fn queue_rotation() {
        let q = Queue::new().push_back(1).push_back(2).push_back(3);
        let r = q.rotate();
        assert_eq!(r.front(), Some(&2));
        assert_eq!(r.iter().cloned().collect::<Vec<_>>(), vec![2, 3, 1]);
    }
}
