//! A classic B-tree ordered map for Rust.
//!
//! This crate provides [`BTree`], an ordered map in which every node, leaf or
//! internal, stores between `t` and `2t` key-value pairs for a configurable
//! [`Order`] `t`. Nodes keep a link to their parent, and traversal is exposed
//! through [`Cursor`]s that walk those links:
//!
//! - [`begin`](BTree::begin) - A cursor at the smallest key
//! - [`find`](BTree::find) - A cursor at an exact key, or the end
//! - [`end`](BTree::end) - The end sentinel every traversal finishes at
//!
//! # Example
//!
//! ```
//! use classic_btree::{BTree, Order};
//!
//! let mut map = BTree::with_order(Order::new(1)?);
//! for (key, value) in [(4, "A"), (6, "D"), (3, "C"), (5, "E"), (7, "B"), (2, "F"), (1, "G")] {
//!     map.insert(key, value);
//! }
//!
//! // Walk the keys in order with a cursor.
//! let mut cursor = map.begin();
//! let mut seen = Vec::new();
//! while cursor != map.end() {
//!     seen.push(*cursor.key_value().1);
//!     cursor.move_next();
//! }
//! assert_eq!(seen, ["G", "F", "C", "A", "E", "D", "B"]);
//!
//! // Exact lookups.
//! assert_eq!(map.find(&5).key_value(), (&5, &"E"));
//! assert!(map.find(&42) == map.end());
//! # Ok::<(), classic_btree::OrderError>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Configurable order** - Node capacity `2t` chosen per tree, validated by [`Order::new`]
//! - **Stack-threaded cursors** - In-order stepping in O(1) amortized time without searching parents
//!
//! # Implementation
//!
//! Insertion descends to a leaf and, when the leaf is full, selects the median
//! of its items plus the new one, splits the leaf around it and promotes the
//! median into the parent. Promotion repeats up the parent chain; only a split
//! of the root adds a level, which keeps every leaf at the same depth.
//!
//! Nodes live in an arena owned by the tree. Child slots and parent links are
//! arena handles, so parent links never own anything. Keys cannot be removed.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod order;
mod raw;

pub mod btree;

pub use btree::{BTree, Cursor};
pub use order::{Order, OrderError};
