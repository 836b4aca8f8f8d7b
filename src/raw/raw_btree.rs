use core::borrow::Borrow;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{INLINE_SLOTS, Node, SearchResult};
use crate::Order;

/// Child slots chosen on the way down, one per ancestor of the current node.
pub(crate) type Stack = SmallVec<[usize; 16]>;

/// The core B-tree implementation backing `BTree`.
#[derive(Clone)]
pub(crate) struct RawBTree<K, V> {
    /// Arena owning every node; child slots and parent links are handles into it.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    len: usize,
    order: Order,
}

impl<K, V> RawBTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new(order: Order) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            order,
        }
    }

    pub(crate) const fn order(&self) -> Order {
        self.order
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the root handle, if any.
    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    /// Returns the number of levels; zero for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            height += 1;
            current = self.nodes.get(handle).child(0);
        }
        height
    }

    /// Clears all elements from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns the leftmost leaf, pushing slot `0` for every level descended.
    pub(crate) fn leftmost_leaf(&self, from: Handle, stack: &mut Stack) -> Handle {
        let mut current = from;
        while let Some(child) = self.nodes.get(current).child(0) {
            stack.push(0);
            current = child;
        }
        current
    }

    /// Returns the first key-value pair in the tree.
    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.leftmost_leaf(self.root?, &mut Stack::new());
        let (k, v) = self.nodes.get(leaf).item(0);
        Some((k, v))
    }

    /// Returns the last key-value pair in the tree.
    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            match node.child(node.len()) {
                Some(child) => current = child,
                None => {
                    let (k, v) = node.item(node.len() - 1);
                    return Some((k, v));
                }
            }
        }
    }

    /// Points every child of `parent` back at it.
    fn adopt_children(&mut self, parent: Handle) {
        let children: SmallVec<[Handle; INLINE_SLOTS]> = self.nodes.get(parent).children().collect();
        for child in children {
            self.nodes.get_mut(child).set_parent(Some(parent));
        }
    }
}

impl<K: Ord, V> RawBTree<K, V> {
    /// Searches for a key, recording the child slots descended through.
    ///
    /// Returns the node and item index holding the key, or `None` once a leaf
    /// without it is reached.
    pub(crate) fn search<Q>(&self, key: &Q, stack: &mut Stack) -> Option<(Handle, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root?;

        loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::Found(idx) => return Some((current, idx)),
                SearchResult::NotFound(idx) => {
                    current = node.child(idx)?;
                    stack.push(idx);
                }
            }
        }
    }

    /// Returns the key-value pair corresponding to the key.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, idx) = self.search(key, &mut Stack::new())?;
        let (k, v) = self.nodes.get(handle).item(idx);
        Some((k, v))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, idx) = self.search(key, &mut Stack::new())?;
        Some(self.nodes.get_mut(handle).value_mut(idx))
    }

    /// Inserts a key-value pair into the tree.
    /// Returns the old value if the key was already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let order = self.order;

        let Some(root) = self.root else {
            let mut leaf = Node::new(order);
            leaf.insert(order, (key, value), None);
            self.root = Some(self.nodes.alloc(leaf));
            self.len = 1;
            return None;
        };

        // Descend to the leaf; an equal key anywhere on the way is overwritten.
        let mut current = root;
        loop {
            let node = self.nodes.get(current);
            match node.search(&key) {
                SearchResult::Found(idx) => {
                    let slot = self.nodes.get_mut(current).value_mut(idx);
                    return Some(core::mem::replace(slot, value));
                }
                SearchResult::NotFound(_) if node.is_leaf() => break,
                SearchResult::NotFound(idx) => {
                    current = node.child(idx).expect("`RawBTree::insert()` - internal node has a vacant child slot!");
                }
            }
        }

        self.len += 1;
        self.insert_and_promote(current, (key, value), None);
        None
    }

    /// Inserts `item` with right child `right` into `target`, splitting and
    /// promoting medians up the parent chain until a node has room or the root
    /// itself splits.
    fn insert_and_promote(&mut self, mut target: Handle, mut item: (K, V), mut right: Option<Handle>) {
        let order = self.order;
        let mut level = 0usize;

        loop {
            if let Some(child) = right {
                self.nodes.get_mut(child).set_parent(Some(target));
            }

            let node = self.nodes.get_mut(target);
            if !node.is_full(order) {
                node.insert(order, item, right);
                return;
            }

            node.median_item_and_right_node(order, &mut item, &mut right);
            let sibling = node.split(order, right);
            let parent = node.parent();

            let sibling = self.nodes.alloc(sibling);
            self.adopt_children(sibling);
            trace!(level, order = order.get(), "split full node");

            match parent {
                Some(parent) => {
                    target = parent;
                    right = Some(sibling);
                    level += 1;
                }
                None => {
                    self.grow_root(target, item, sibling);
                    return;
                }
            }
        }
    }

    /// Replaces the root with a new node holding only `median`; the only place
    /// the tree gains a level.
    fn grow_root(&mut self, left: Handle, median: (K, V), right: Handle) {
        let root = self.nodes.alloc(Node::new_root(self.order, median, left, right));
        self.nodes.get_mut(left).set_parent(Some(root));
        self.nodes.get_mut(right).set_parent(Some(root));
        self.root = Some(root);
        debug!(height = self.height(), len = self.len, "root split");
    }
}
