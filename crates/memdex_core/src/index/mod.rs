//! Field indexes.
//!
//! Each registered field can carry up to three structures, all mapping
//! keys to sets of record identifiers:
//!
//! - [`ExactIndex`]: raw value equality
//! - [`PrefixTrie`]: prefixes of the value's string form
//! - [`SubstringIndex`]: any contiguous substring of the string form
//!
//! [`IndexManager`] keeps them in step with the record store. None of
//! the structures supports ordered range queries; those are served by a
//! scan in the query engine.

mod exact;
mod manager;
mod substring;
mod traits;
mod trie;

pub use exact::ExactIndex;
pub use manager::{Extractor, FieldIndexConfig, IndexKind, IndexManager};
pub use substring::SubstringIndex;
pub use traits::{IdSet, Index};
pub use trie::PrefixTrie;
