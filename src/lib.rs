#![forbid(unsafe_code)]
//! Sorted maps from primitive keys to primitive values, stored as threaded
//! red-black trees. See the map module for details.
//!
//! Besides the usual lookups and updates, a map offers O(1) access to its
//! first and last entries, bidirectional cursors that can seek to a key and
//! remove as they go, and live range views over a bounded slice of its keys.

mod bounds;
pub mod error;
pub mod iter;
pub mod map;
mod node;
pub mod order;
pub mod submap;
mod tree;

pub use error::{Error, Result};
pub use iter::{Cursor, CursorMut, Iter, Keys, Values};
pub use map::*;
pub use order::{Increment, Key, KeyComparator, Natural, Reversed};
pub use submap::{SubMap, SubMapMut, SubMapRef};

#[cfg(test)]
mod tests;
