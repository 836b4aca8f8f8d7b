use core::borrow::Borrow;
use core::fmt;
use core::ptr;

use crate::raw::{Handle, RawBTree, Stack};

/// A position in the in-order sequence of a [`BTree`](crate::BTree).
///
/// A cursor is either at an item or at the end sentinel returned by
/// [`BTree::end`](crate::BTree::end). Besides its `(node, index)` position it
/// carries the child slots taken from the root down to the current node, so
/// stepping forward climbs back up without searching parents for the way it
/// came.
///
/// Cursors borrow the tree immutably; moving one never changes the tree.
///
/// # Examples
///
/// ```
/// use classic_btree::BTree;
///
/// let mut map = BTree::new();
/// map.insert(1, "B");
/// map.insert(2, "A");
///
/// let mut cursor = map.begin();
/// assert_eq!(cursor.key_value(), (&1, &"B"));
/// cursor.move_next();
/// assert_eq!(cursor.key_value(), (&2, &"A"));
/// cursor.move_next();
/// assert!(cursor == map.end());
/// ```
pub struct Cursor<'a, K, V> {
    tree: &'a RawBTree<K, V>,
    position: Option<(Handle, usize)>,
    stack: Stack,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn end(tree: &'a RawBTree<K, V>) -> Self {
        Self {
            tree,
            position: None,
            stack: Stack::new(),
        }
    }

    /// Positions a cursor at the smallest key, or at the end of an empty tree.
    pub(crate) fn first(tree: &'a RawBTree<K, V>) -> Self {
        let Some(root) = tree.root() else {
            return Self::end(tree);
        };
        let mut stack = Stack::new();
        let leaf = tree.leftmost_leaf(root, &mut stack);
        Self {
            tree,
            position: Some((leaf, 0)),
            stack,
        }
    }

    /// Positions a cursor at `key`, or at the end if the key is absent.
    pub(crate) fn find<Q>(tree: &'a RawBTree<K, V>, key: &Q) -> Self
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        let mut stack = Stack::new();
        match tree.search(key, &mut stack) {
            Some(position) => Self {
                tree,
                position: Some(position),
                stack,
            },
            None => Self::end(tree),
        }
    }

    /// Returns `true` if the cursor is past the last item.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position.is_none()
    }

    /// Returns the key-value pair under the cursor, or `None` at the end.
    #[must_use]
    pub fn peek(&self) -> Option<(&'a K, &'a V)> {
        let (node, idx) = self.position?;
        let (k, v) = self.tree.node(node).item(idx);
        Some((k, v))
    }

    /// Returns the key-value pair under the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end.
    #[must_use]
    pub fn key_value(&self) -> (&'a K, &'a V) {
        self.peek().expect("`Cursor::key_value()` - cursor is at end!")
    }

    /// Advances to the in-order successor, or to the end after the last item.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, O(1) amortized over a full traversal.
    pub fn move_next(&mut self) {
        let Some((handle, idx)) = self.position else {
            panic!("`Cursor::move_next()` - cursor is at end!");
        };
        let tree = self.tree;
        let node = tree.node(handle);

        if let Some(child) = node.child(idx + 1) {
            // Successor is the leftmost item of the right subtree.
            self.stack.push(idx + 1);
            let leaf = tree.leftmost_leaf(child, &mut self.stack);
            self.position = Some((leaf, 0));
        } else if idx + 1 < node.len() {
            self.position = Some((handle, idx + 1));
        } else {
            self.position = self.ascend(node.parent());
        }
    }

    /// Climbs from a finished subtree to the first ancestor with an item to
    /// the right of the slot it was entered through.
    fn ascend(&mut self, mut parent: Option<Handle>) -> Option<(Handle, usize)> {
        while let Some(handle) = parent {
            let idx = self.stack.pop().expect("`Cursor::move_next()` - ancestor stack is out of sync!");
            let node = self.tree.node(handle);
            if idx < node.len() {
                return Some((handle, idx));
            }
            parent = node.parent();
        }
        self.stack.clear();
        None
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            position: self.position,
            stack: self.stack.clone(),
        }
    }
}

/// Two cursors are equal when both are at the end, or both point at the same
/// item of the same tree. The ancestor stack does not take part.
impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self.position, other.position) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b && ptr::eq(self.tree, other.tree),
            _ => false,
        }
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.peek() {
            Some(item) => f.debug_tuple("Cursor").field(&item).finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::Order;
    use alloc::vec::Vec;

    fn tree_of(t: usize, keys: impl IntoIterator<Item = i32>) -> RawBTree<i32, i32> {
        let mut tree = RawBTree::new(Order::new(t).unwrap());
        for k in keys {
            tree.insert(k, -k);
        }
        tree
    }

    fn collect(tree: &RawBTree<i32, i32>) -> Vec<i32> {
        let mut out = Vec::new();
        let mut cursor = Cursor::first(tree);
        while let Some((k, _)) = cursor.peek() {
            out.push(*k);
            cursor.move_next();
        }
        out
    }

    #[test]
    fn first_records_leftmost_path() {
        let tree = tree_of(1, 1..=7);
        let cursor = Cursor::first(&tree);
        assert_eq!(cursor.key_value(), (&1, &-1));
        assert_eq!(cursor.stack.as_slice(), [0, 0]);
    }

    #[test]
    fn stack_tracks_depth_while_stepping() {
        let tree = tree_of(1, 1..=7);
        let mut cursor = Cursor::first(&tree);
        let mut depths = Vec::new();
        while !cursor.is_end() {
            depths.push(cursor.stack.len());
            cursor.move_next();
        }
        // Leaves sit two levels down, 2 and 6 one level, 4 at the root.
        assert_eq!(depths, [2, 1, 2, 0, 2, 1, 2]);
        assert!(cursor.stack.is_empty());
    }

    #[test]
    fn find_resumes_iteration() {
        let tree = tree_of(2, (0..100).rev());
        let mut cursor = Cursor::find(&tree, &41);
        let mut seen = Vec::new();
        while let Some((k, _)) = cursor.peek() {
            seen.push(*k);
            cursor.move_next();
        }
        assert_eq!(seen, (41..100).collect::<Vec<_>>());
    }

    #[test]
    fn traversal_matches_sorted_keys_for_many_orders() {
        for t in 1..=5 {
            let keys: Vec<i32> = (0..300).map(|i| (i * 7919) % 300).collect();
            let tree = tree_of(t, keys);
            assert_eq!(collect(&tree), (0..300).collect::<Vec<_>>(), "order {t}");
        }
    }

    #[test]
    fn cursors_from_different_trees_differ() {
        let a = tree_of(1, [1]);
        let b = tree_of(1, [1]);
        assert!(Cursor::first(&a) != Cursor::first(&b));
        assert!(Cursor::end(&a) == Cursor::end(&b));
    }

    #[test]
    #[should_panic(expected = "`Cursor::move_next()` - cursor is at end!")]
    fn advancing_end_panics() {
        let tree = tree_of(1, []);
        Cursor::end(&tree).move_next();
    }

    #[test]
    #[should_panic(expected = "`Cursor::key_value()` - cursor is at end!")]
    fn dereferencing_end_panics() {
        let tree = tree_of(1, [3]);
        let _ = Cursor::find(&tree, &4).key_value();
    }
}
