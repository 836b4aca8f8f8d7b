use core::borrow::Borrow;
use core::mem;

use smallvec::{SmallVec, smallvec};

use super::handle::Handle;
use crate::Order;

// Nodes of order 1 and 2 keep their items and child slots inline.
pub(crate) const INLINE_ITEMS: usize = 4;
pub(crate) const INLINE_SLOTS: usize = INLINE_ITEMS + 1;

/// A classic B-tree node: items live in every node, not only in leaves.
///
/// `children` always has `2t + 1` slots. Slot `i` holds the subtree whose keys
/// fall between `items[i - 1]` and `items[i]`, so slot `i + 1` is the "right
/// child" of item `i`. A leaf has every slot empty.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    // Lookup-only link to the node owning this one through a child slot.
    parent: Option<Handle>,
    items: SmallVec<[(K, V); INLINE_ITEMS]>,
    children: SmallVec<[Option<Handle>; INLINE_SLOTS]>,
}

/// Result of searching for a key in a node.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is the child slot to descend into.
    NotFound(usize),
}

impl<K, V> Node<K, V> {
    /// Creates an empty leaf with `2t + 1` vacant child slots.
    pub(crate) fn new(order: Order) -> Self {
        Self {
            parent: None,
            items: SmallVec::with_capacity(order.max_items()),
            children: smallvec![None; order.max_children()],
        }
    }

    /// Creates a root holding a single promoted item between two subtrees.
    pub(crate) fn new_root(order: Order, item: (K, V), left: Handle, right: Handle) -> Self {
        let mut root = Self::new(order);
        root.items.push(item);
        root.children[0] = Some(left);
        root.children[1] = Some(right);
        root
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    /// Returns the number of items in this node.
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children[0].is_none()
    }

    pub(crate) fn is_full(&self, order: Order) -> bool {
        self.items.len() == order.max_items()
    }

    #[inline]
    pub(crate) fn item(&self, index: usize) -> &(K, V) {
        &self.items[index]
    }

    #[cfg(test)]
    pub(crate) fn items(&self) -> &[(K, V)] {
        &self.items
    }

    pub(crate) fn value_mut(&mut self, index: usize) -> &mut V {
        &mut self.items[index].1
    }

    /// Returns the child in slot `index`, if any.
    #[inline]
    pub(crate) fn child(&self, index: usize) -> Option<Handle> {
        self.children.get(index).copied().flatten()
    }

    /// Returns the occupied child slots, left to right.
    pub(crate) fn children(&self) -> impl Iterator<Item = Handle> + '_ {
        self.children.iter().map_while(|slot| *slot)
    }

    #[cfg(test)]
    pub(crate) fn slots(&self) -> &[Option<Handle>] {
        &self.children
    }

    /// Locates the first item whose key is not less than `key`.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.items.binary_search_by(|(k, _)| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }
}

impl<K: Ord, V> Node<K, V> {
    /// Inserts `item` in key order and makes `right` its right child.
    ///
    /// Larger items move one position to the right together with their right
    /// children; slots at or left of the insertion point are untouched.
    ///
    /// # Panics
    ///
    /// Panics if the node already holds `2t` items. Full nodes go through
    /// [`Self::median_item_and_right_node`] and [`Self::split`] instead.
    pub(crate) fn insert(&mut self, order: Order, item: (K, V), right: Option<Handle>) {
        let len = self.items.len();
        assert!(len < order.max_items(), "`Node::insert()` - node is full!");

        let index = self.items.partition_point(|(key, _)| *key <= item.0);
        self.items.insert(index, item);

        // Slot `len + 1` is vacant, rotating it down opens slot `index + 1`.
        self.children[index + 1..=len + 1].rotate_right(1);
        self.children[index + 1] = right;
    }

    /// Picks the median of this full node's `2t` items plus the incoming
    /// `item`, leaving it (and the node logically right of it) in `item` and
    /// `right`.
    ///
    /// Two insertion-sort passes do the work in place: the first walks the
    /// candidate through slots `0..t` keeping the smaller items, the second
    /// walks it through slots `2t-1..=t` keeping the larger ones. Each item
    /// travels together with its right child. Afterwards slots `0..t` hold the
    /// `t` smallest items and slots `t..2t` the `t` largest, ready for
    /// [`Self::split`].
    ///
    /// # Panics
    ///
    /// Panics if the node is not full.
    pub(crate) fn median_item_and_right_node(&mut self, order: Order, item: &mut (K, V), right: &mut Option<Handle>) {
        assert!(self.is_full(order), "`Node::median_item_and_right_node()` - node is not full!");
        let t = order.get();

        for idx in 0..t {
            if item.0 < self.items[idx].0 {
                mem::swap(item, &mut self.items[idx]);
                mem::swap(right, &mut self.children[idx + 1]);
            }
        }

        for idx in (t..order.max_items()).rev() {
            if item.0 > self.items[idx].0 {
                mem::swap(item, &mut self.items[idx]);
                mem::swap(right, &mut self.children[idx + 1]);
            }
        }
    }

    /// Moves the upper `t` items and their right children into a new sibling
    /// whose leftmost child becomes `left_child_of_new_right`.
    ///
    /// The caller owns re-parenting: every child the sibling now holds still
    /// points at this node.
    ///
    /// # Panics
    ///
    /// Panics if the node is not full.
    pub(crate) fn split(&mut self, order: Order, left_child_of_new_right: Option<Handle>) -> Self {
        assert!(self.is_full(order), "`Node::split()` - node is not full!");
        let t = order.get();

        let mut right = Self::new(order);
        right.items = self.items.drain(t..).collect();
        right.children[0] = left_child_of_new_right;
        for (to, from) in right.children[1..].iter_mut().zip(&mut self.children[t + 1..]) {
            *to = from.take();
        }

        right
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn order(t: usize) -> Order {
        Order::new(t).unwrap()
    }

    fn h(index: usize) -> Handle {
        Handle::from_index(index)
    }

    fn keys<V>(node: &Node<i32, V>) -> Vec<i32> {
        node.items().iter().map(|(k, _)| *k).collect()
    }

    /// An internal node of order 1 holding `10` and `20` over children 0, 1, 2.
    fn full_internal() -> Node<i32, char> {
        let mut node = Node::new_root(order(1), (10, 'a'), h(0), h(1));
        node.insert(order(1), (20, 'b'), Some(h(2)));
        node
    }

    #[test]
    fn new_node_is_an_empty_leaf() {
        let node: Node<i32, ()> = Node::new(order(3));
        assert!(node.is_leaf());
        assert!(node.is_empty());
        assert_eq!(node.slots().len(), 7);
        assert_eq!(node.parent(), None);
    }

    #[test]
    fn insert_keeps_items_sorted() {
        let mut node = Node::new(order(2));
        for k in [30, 10, 40, 20] {
            node.insert(order(2), (k, ()), None);
        }
        assert_eq!(keys(&node), [10, 20, 30, 40]);
        assert!(node.is_full(order(2)));
        assert!(node.is_leaf());
    }

    #[test]
    fn insert_shifts_right_children_with_their_items() {
        let mut node = Node::new_root(order(2), (20, 'b'), h(0), h(2));
        node.insert(order(2), (40, 'd'), Some(h(4)));
        node.insert(order(2), (10, 'a'), Some(h(1)));
        node.insert(order(2), (30, 'c'), Some(h(3)));
        assert_eq!(keys(&node), [10, 20, 30, 40]);
        assert_eq!(node.slots(), [Some(h(0)), Some(h(1)), Some(h(2)), Some(h(3)), Some(h(4))]);
    }

    #[test]
    #[should_panic(expected = "`Node::insert()` - node is full!")]
    fn insert_into_full_node_panics() {
        let mut node = Node::new(order(1));
        node.insert(order(1), (1, ()), None);
        node.insert(order(1), (2, ()), None);
        node.insert(order(1), (3, ()), None);
    }

    #[test]
    fn median_of_smallest_incoming() {
        let mut node = full_internal();
        let mut item = (5, 'x');
        let mut right = Some(h(9));
        node.median_item_and_right_node(order(1), &mut item, &mut right);

        assert_eq!(item, (10, 'a'));
        assert_eq!(right, Some(h(1)));
        assert_eq!(keys(&node), [5, 20]);
        assert_eq!(node.slots(), [Some(h(0)), Some(h(9)), Some(h(2))]);
    }

    #[test]
    fn median_of_middle_incoming() {
        let mut node = full_internal();
        let mut item = (15, 'x');
        let mut right = Some(h(9));
        node.median_item_and_right_node(order(1), &mut item, &mut right);

        assert_eq!(item, (15, 'x'));
        assert_eq!(right, Some(h(9)));
        assert_eq!(keys(&node), [10, 20]);
    }

    #[test]
    fn median_of_largest_incoming() {
        let mut node = full_internal();
        let mut item = (25, 'x');
        let mut right = Some(h(9));
        node.median_item_and_right_node(order(1), &mut item, &mut right);

        assert_eq!(item, (20, 'b'));
        assert_eq!(right, Some(h(2)));
        assert_eq!(keys(&node), [10, 25]);
        assert_eq!(node.slots(), [Some(h(0)), Some(h(1)), Some(h(9))]);
    }

    #[test]
    fn split_moves_upper_half_and_its_children() {
        let mut node = full_internal();
        let mut item = (25, 'x');
        let mut right = Some(h(9));
        node.median_item_and_right_node(order(1), &mut item, &mut right);
        let sibling = node.split(order(1), right);

        assert_eq!(keys(&node), [10]);
        assert_eq!(node.slots(), [Some(h(0)), Some(h(1)), None]);
        assert_eq!(keys(&sibling), [25]);
        assert_eq!(sibling.slots(), [Some(h(2)), Some(h(9)), None]);
        assert_eq!(sibling.children().collect::<Vec<_>>(), [h(2), h(9)]);
    }

    #[test]
    #[should_panic(expected = "`Node::median_item_and_right_node()` - node is not full!")]
    fn median_requires_full_node() {
        let mut node: Node<i32, ()> = Node::new(order(1));
        node.insert(order(1), (1, ()), None);
        node.median_item_and_right_node(order(1), &mut (2, ()), &mut None);
    }

    #[test]
    fn search_reports_descent_slot() {
        let node = full_internal();
        assert!(matches!(node.search(&5), SearchResult::NotFound(0)));
        assert!(matches!(node.search(&10), SearchResult::Found(0)));
        assert!(matches!(node.search(&15), SearchResult::NotFound(1)));
        assert!(matches!(node.search(&20), SearchResult::Found(1)));
        assert!(matches!(node.search(&25), SearchResult::NotFound(2)));
    }

    proptest! {
        /// Median selection followed by a split partitions `2t + 1` distinct
        /// keys into `t` smaller, the median, and `t` larger ones.
        #[test]
        fn median_split_partitions_keys(
            t in 1usize..6,
            raw in prop::collection::hash_set(-1000i32..1000, 13),
        ) {
            let order = order(t);
            let mut all: Vec<i32> = raw.into_iter().take(order.max_items() + 1).collect();
            let incoming = all.pop().unwrap();

            let mut node = Node::new(order);
            for &k in &all {
                node.insert(order, (k, ()), None);
            }
            let mut item = (incoming, ());
            let mut right = None;
            node.median_item_and_right_node(order, &mut item, &mut right);
            let sibling = node.split(order, right);

            all.push(incoming);
            all.sort_unstable();
            prop_assert_eq!(keys(&node), &all[..t]);
            prop_assert_eq!(item.0, all[t]);
            prop_assert_eq!(keys(&sibling), &all[t + 1..]);
            prop_assert!(node.is_leaf() && sibling.is_leaf());
        }
    }
}
