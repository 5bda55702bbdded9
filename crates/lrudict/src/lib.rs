//! # lrudict
//!
//! Thread-safe fixed-capacity LRU dictionary.
//!
//! ## Architecture
//! - **Index**: AHash map for O(1) key lookup
//! - **Recency list**: arena-backed doubly-linked list for O(1)
//!   promotion and eviction
//! - **Notification**: pairs evicted by overflow or shrink are staged
//!   under the lock and handed to the callback only after the lock is
//!   released, so a callback may call back into the cache without
//!   deadlocking
//!
//! ## Example
//! ```
//! use lrudict::LruDict;
//!
//! let cache = LruDict::new(2).unwrap();
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.insert("c", 3); // evicts "a"
//!
//! assert_eq!(cache.get(&"a"), None);
//! assert_eq!(cache.get(&"c"), Some(3));
//! assert_eq!(cache.keys(), vec!["c", "b"]);
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod list;
mod stats;

pub use cache::{EvictCallback, LruDict};
pub use error::{Error, Result};
pub use stats::CacheStats;
