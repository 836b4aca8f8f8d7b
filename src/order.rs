use thiserror::Error;

/// The branching parameter `t` of a [`BTree`](crate::BTree).
///
/// Every node holds at most `2t` items and at most `2t + 1` children, and every
/// node other than the root holds at least `t` items.
///
/// # Examples
///
/// ```
/// use classic_btree::{BTree, Order, OrderError};
///
/// let order = Order::new(2).unwrap();
/// assert_eq!(order.max_items(), 4);
/// assert_eq!(order.max_children(), 5);
///
/// let map: BTree<i32, &str> = BTree::with_order(order);
/// assert_eq!(map.order(), order);
///
/// assert_eq!(Order::new(0), Err(OrderError::Zero));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Order(u8);

/// Why an order parameter was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum OrderError {
    /// A node must be able to hold at least two items.
    #[error("order must be at least 1")]
    Zero,
    /// `2 * order + 1` child slots must fit in a byte-sized slot index.
    #[error("order {order} exceeds the maximum of {max}")]
    TooLarge {
        /// The rejected order.
        order: usize,
        /// The largest accepted order.
        max: usize,
    },
}

impl Order {
    /// The largest accepted order.
    pub const MAX: usize = 127;

    /// The order used by [`BTree::new`](crate::BTree::new).
    pub const DEFAULT: Self = Self(1);

    /// Validates `order` as a branching parameter.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Zero`] for `0` and [`OrderError::TooLarge`] for
    /// anything above [`Order::MAX`].
    pub const fn new(order: usize) -> Result<Self, OrderError> {
        if order == 0 {
            return Err(OrderError::Zero);
        }
        if order > Self::MAX {
            return Err(OrderError::TooLarge { order, max: Self::MAX });
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(order as u8))
    }

    /// Returns `t`.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Returns `2t`, the item capacity of a node.
    #[must_use]
    pub const fn max_items(self) -> usize {
        2 * self.get()
    }

    /// Returns `2t + 1`, the number of child slots of a node.
    #[must_use]
    pub const fn max_children(self) -> usize {
        self.max_items() + 1
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for Order {
    type Error = OrderError;

    fn try_from(order: usize) -> Result<Self, Self::Error> {
        Self::new(order)
    }
}
