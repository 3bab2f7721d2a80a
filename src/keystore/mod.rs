//! Local key material provisioning.
//!
//! # Data Flow
//! ```text
//! keys.dir + keys.count
//!     → store.rs (reuse or regenerate key files)
//!     → Vec<KeyRecord>
//!     → blockchain::wallet (signers)
//! ```
//!
//! # Security Constraints
//! - Test/dev tooling only: keys live in plain file names
//! - Key values are never logged

pub mod store;

pub use store::{KeyRecord, KeyStore, KeyStoreError};
