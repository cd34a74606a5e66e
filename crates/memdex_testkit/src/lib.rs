//! # memdex testkit
//!
//! Test utilities for memdex.
//!
//! This crate provides:
//! - A `Person` fixture and pre-indexed store helpers
//! - Property-based test generators using proptest
//! - A shadow-model integration harness that checks index/store
//!   consistency after every operation
//! - Stress testing utilities
//! - Test logging initialisation
//!
//! ## Usage
//!
//! ```rust
//! use memdex_testkit::prelude::*;
//!
//! let store = person_store();
//! store.insert(Person::new("alice", 30));
//! assert_eq!(store.live_count(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod logging;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::logging::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use logging::*;
pub use stress::*;
