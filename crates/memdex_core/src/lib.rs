//! # memdex core
//!
//! Embeddable, memory-resident record store with secondary indexes.
//!
//! This crate provides:
//! - A record store with monotonically assigned identifiers, optional
//!   versioning and soft deletes
//! - Per-field exact, prefix and substring indexes kept consistent with
//!   every mutation
//! - A query engine combining indexed lookups and range scans with
//!   pagination, deadlines and cancellation
//!
//! Nothing is persisted. Dropping the store drops every record.
//!
//! ## Example
//!
//! ```rust
//! use memdex_core::{IndexKind, Store, StoreConfig};
//!
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! let store: Store<User> = Store::new(StoreConfig::default());
//! store.register_index("name", |r| r.data.name.clone(), &IndexKind::ALL);
//! store.register_index("age", |r| r.data.age, &[IndexKind::Exact]);
//!
//! store.insert(User { name: "alice".into(), age: 30 });
//! store.insert(User { name: "alicia".into(), age: 25 });
//!
//! let hits = store
//!     .query()
//!     .field("name")
//!     .contains("ali")
//!     .field("age")
//!     .gte(28)
//!     .execute()
//!     .unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].data.name, "alice");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod index;
mod query;
mod record;
mod stats;
mod store;
mod types;
mod value;

pub use config::StoreConfig;
pub use error::{CoreError, CoreResult};
pub use index::{
    ExactIndex, Extractor, FieldIndexConfig, IdSet, Index, IndexKind, IndexManager, PrefixTrie,
    SubstringIndex,
};
pub use query::{CancelToken, Condition, FieldQuery, Query, RangeOp};
pub use record::{Record, RecordMeta};
pub use stats::{StatsSnapshot, StoreStats};
pub use store::{Storage, Store};
pub use types::RecordId;
pub use value::{compare, to_comparable_string, FieldKind, FieldValue, IndexableValue};
