//! Persistence for practice sessions.
//!
//! State is kept in a string key-value store, one key per piece of session
//! state. Anything read back is validated as strictly as a fresh upload.
pub mod error;
pub mod session;
pub mod store;

pub use error::StoreError;
pub use session::{SessionStore, resume_session};
pub use store::{FileStore, KeyValueStore, MemoryStore};
