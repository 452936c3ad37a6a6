//! # Tapcard
//!
//! Ownership and access control for NFC tags that expose digital business
//! cards and other content modules. Usable both as a standalone server and
//! as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! tapcard = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use tapcard::domain::registry;
//! use tapcard::store::{SqliteStore, Store};
//! use tapcard::types::Caller;
//!
//! let store = SqliteStore::new("./data/tapcard.db").unwrap();
//! store.initialize().unwrap();
//!
//! let caller = Caller::user("user-1");
//! let tag = registry::claim_only(&store, &caller, "ABC123").unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `tapcard` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
