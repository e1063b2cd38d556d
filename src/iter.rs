//! Iterators and cursors.
//!
//! All of them walk the tree through its thread links, so each step is
//! amortized O(1) and no stack is kept. Iterators borrow the map, which rules
//! out structural changes from elsewhere while they are alive; a
//! [`CursorMut`] can remove the entry it last returned.

use crate::{
    bounds::Bounds,
    error::{Error, Result},
    node::NodeId,
    order::KeyComparator,
    tree::Tree,
};
use std::iter::FusedIterator;

/// A double ended iterator over `(key, value)` pairs in ascending key order.
pub struct Iter<'a, K, V, C> {
    tree: &'a Tree<K, V, C>,
    front: Option<NodeId>,
    back: Option<NodeId>,
}

impl<'a, K, V, C> Clone for Iter<'a, K, V, C> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, K, V, C> Iter<'a, K, V, C>
where
    K: Copy,
    V: Copy,
    C: KeyComparator<K>,
{
    pub(crate) fn new(tree: &'a Tree<K, V, C>, bounds: &Bounds<K>) -> Self {
        let front = tree.first_in(bounds);
        let back = match front {
            None => None,
            Some(_) => tree.last_in(bounds),
        };
        Iter { tree, front, back }
    }

    // the entries of `bounds` after k
    pub(crate) fn new_from(tree: &'a Tree<K, V, C>, bounds: &Bounds<K>, k: K) -> Self {
        let (_, front) = tree.seek(bounds, k);
        let back = match front {
            None => None,
            Some(_) => tree.last_in(bounds),
        };
        Iter { tree, front, back }
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C>
where
    K: Copy,
    V: Copy,
    C: KeyComparator<K>,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.front?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.front = self.tree.next(id);
        }
        Some(self.tree.entry(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.front {
            None => (0, Some(0)),
            Some(_) => (1, Some(self.tree.len())),
        }
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Iter<'a, K, V, C>
where
    K: Copy,
    V: Copy,
    C: KeyComparator<K>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = self.back?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.back = self.tree.prev(id);
        }
        Some(self.tree.entry(id))
    }
}

impl<'a, K: Copy, V: Copy, C: KeyComparator<K>> FusedIterator for Iter<'a, K, V, C> {}

/// Keys in ascending order.
pub struct Keys<'a, K, V, C>(pub(crate) Iter<'a, K, V, C>);

impl<'a, K: Copy, V: Copy, C: KeyComparator<K>> Iterator for Keys<'a, K, V, C> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K: Copy, V: Copy, C: KeyComparator<K>> DoubleEndedIterator for Keys<'a, K, V, C> {
    fn next_back(&mut self) -> Option<K> {
        self.0.next_back().map(|(k, _)| k)
    }
}

impl<'a, K: Copy, V: Copy, C: KeyComparator<K>> FusedIterator for Keys<'a, K, V, C> {}

/// Values in ascending order of their keys.
pub struct Values<'a, K, V, C>(pub(crate) Iter<'a, K, V, C>);

impl<'a, K: Copy, V: Copy, C: KeyComparator<K>> Iterator for Values<'a, K, V, C> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K: Copy, V: Copy, C: KeyComparator<K>> DoubleEndedIterator for Values<'a, K, V, C> {
    fn next_back(&mut self) -> Option<V> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<'a, K: Copy, V: Copy, C: KeyComparator<K>> FusedIterator for Values<'a, K, V, C> {}

// cursor position: the gap between `prev` and `next`. `current` is the entry
// the last step returned, cleared by a removal.
#[derive(Clone, Copy, Debug)]
struct Walk<K> {
    bounds: Bounds<K>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    current: Option<NodeId>,
    index: isize,
}

impl<K: Copy> Walk<K> {
    fn start<V: Copy, C: KeyComparator<K>>(tree: &Tree<K, V, C>, bounds: Bounds<K>) -> Self {
        Walk {
            next: tree.first_in(&bounds),
            prev: None,
            current: None,
            index: 0,
            bounds,
        }
    }

    fn start_at<V: Copy, C: KeyComparator<K>>(
        tree: &Tree<K, V, C>,
        bounds: Bounds<K>,
        k: K,
    ) -> Self {
        let (prev, next) = tree.seek(&bounds, k);
        Walk {
            bounds,
            prev,
            next,
            current: None,
            index: 0,
        }
    }

    fn forward<V: Copy, C: KeyComparator<K>>(&mut self, tree: &Tree<K, V, C>) -> Option<NodeId> {
        let id = self.next?;
        self.current = Some(id);
        self.prev = Some(id);
        self.next = tree.next_in(id, &self.bounds);
        self.index += 1;
        Some(id)
    }

    fn backward<V: Copy, C: KeyComparator<K>>(&mut self, tree: &Tree<K, V, C>) -> Option<NodeId> {
        let id = self.prev?;
        self.current = Some(id);
        self.next = Some(id);
        self.prev = tree.prev_in(id, &self.bounds);
        self.index -= 1;
        Some(id)
    }
}

/// A bidirectional cursor over a map or view.
///
/// The cursor sits between two entries. [`Iterator::next`] returns the entry
/// after it and moves past it, [`Cursor::previous`] does the same in the other
/// direction. The index counts steps from the starting position, so it is
/// negative after stepping back from a seek position.
///
/// # Examples
/// ```
/// use rbtree_primitive_map::RbTreeMap;
///
/// let m: RbTreeMap<i32, f32> = (1..=5).map(|k| (k, k as f32)).collect();
/// let mut c = m.cursor_from(3);
/// assert_eq!(c.next(), Some((4, 4.0)));
/// assert_eq!(c.previous(), Some((4, 4.0)));
/// assert_eq!(c.previous(), Some((3, 3.0)));
/// assert_eq!(c.previous_index(), -2);
/// ```
pub struct Cursor<'a, K, V, C> {
    tree: &'a Tree<K, V, C>,
    walk: Walk<K>,
}

impl<'a, K, V, C> Cursor<'a, K, V, C>
where
    K: Copy,
    V: Copy,
    C: KeyComparator<K>,
{
    pub(crate) fn new(tree: &'a Tree<K, V, C>, bounds: Bounds<K>) -> Self {
        Cursor {
            walk: Walk::start(tree, bounds),
            tree,
        }
    }

    pub(crate) fn new_at(tree: &'a Tree<K, V, C>, bounds: Bounds<K>, k: K) -> Self {
        Cursor {
            walk: Walk::start_at(tree, bounds, k),
            tree,
        }
    }

    pub fn has_next(&self) -> bool {
        self.walk.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.walk.prev.is_some()
    }

    pub fn next_index(&self) -> isize {
        self.walk.index
    }

    pub fn previous_index(&self) -> isize {
        self.walk.index - 1
    }

    /// step backward, returning the entry passed over
    pub fn previous(&mut self) -> Option<(K, V)> {
        self.walk.backward(self.tree).map(|id| self.tree.entry(id))
    }

    /// the entry the last step returned
    pub fn current(&self) -> Option<(K, V)> {
        self.walk.current.map(|id| self.tree.entry(id))
    }

    /// step forward up to `n` times, returning how many steps were taken
    pub fn advance(&mut self, n: usize) -> usize {
        (0..n).take_while(|_| self.walk.forward(self.tree).is_some()).count()
    }

    /// step backward up to `n` times, returning how many steps were taken
    pub fn retreat(&mut self, n: usize) -> usize {
        (0..n).take_while(|_| self.walk.backward(self.tree).is_some()).count()
    }
}

impl<'a, K, V, C> Iterator for Cursor<'a, K, V, C>
where
    K: Copy,
    V: Copy,
    C: KeyComparator<K>,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.walk.forward(self.tree).map(|id| self.tree.entry(id))
    }
}

/// A bidirectional cursor that can also update or remove the entry it last
/// returned.
///
/// # Examples
/// ```
/// use rbtree_primitive_map::RbTreeMap;
///
/// let mut m: RbTreeMap<i32, i32> = (0..10).map(|k| (k, k)).collect();
/// let mut c = m.cursor_mut();
/// while let Some((k, _)) = c.next() {
///     if k % 2 == 1 {
///         c.remove().unwrap();
///     }
/// }
/// assert_eq!(m.keys().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);
/// ```
pub struct CursorMut<'a, K, V, C> {
    tree: &'a mut Tree<K, V, C>,
    walk: Walk<K>,
}

impl<'a, K, V, C> CursorMut<'a, K, V, C>
where
    K: Copy,
    V: Copy,
    C: KeyComparator<K>,
{
    pub(crate) fn new(tree: &'a mut Tree<K, V, C>, bounds: Bounds<K>) -> Self {
        CursorMut {
            walk: Walk::start(tree, bounds),
            tree,
        }
    }

    pub(crate) fn new_at(tree: &'a mut Tree<K, V, C>, bounds: Bounds<K>, k: K) -> Self {
        CursorMut {
            walk: Walk::start_at(tree, bounds, k),
            tree,
        }
    }

    pub fn has_next(&self) -> bool {
        self.walk.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.walk.prev.is_some()
    }

    pub fn next_index(&self) -> isize {
        self.walk.index
    }

    pub fn previous_index(&self) -> isize {
        self.walk.index - 1
    }

    pub fn previous(&mut self) -> Option<(K, V)> {
        self.walk.backward(self.tree).map(|id| self.tree.entry(id))
    }

    pub fn current(&self) -> Option<(K, V)> {
        self.walk.current.map(|id| self.tree.entry(id))
    }

    pub fn advance(&mut self, n: usize) -> usize {
        (0..n).take_while(|_| self.walk.forward(self.tree).is_some()).count()
    }

    pub fn retreat(&mut self, n: usize) -> usize {
        (0..n).take_while(|_| self.walk.backward(self.tree).is_some()).count()
    }

    /// Overwrite the value of the entry last returned, returning the old
    /// value.
    pub fn set_value(&mut self, v: V) -> Result<V> {
        let id = self.walk.current.ok_or(Error::NoCurrentEntry)?;
        Ok(std::mem::replace(self.tree.value_mut(id), v))
    }

    /// Remove the entry last returned. The cursor stays between that entry's
    /// neighbours, so iteration continues in either direction.
    pub fn remove(&mut self) -> Result<(K, V)> {
        let id = self.walk.current.take().ok_or(Error::NoCurrentEntry)?;
        if self.walk.prev == Some(id) {
            self.walk.index -= 1;
        }
        self.walk.prev = self.tree.prev_in(id, &self.walk.bounds);
        self.walk.next = self.tree.next_in(id, &self.walk.bounds);
        let (k, v) = self.tree.entry(id);
        self.tree.remove(k);
        Ok((k, v))
    }
}

impl<'a, K, V, C> Iterator for CursorMut<'a, K, V, C>
where
    K: Copy,
    V: Copy,
    C: KeyComparator<K>,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.walk.forward(self.tree).map(|id| self.tree.entry(id))
    }
}
