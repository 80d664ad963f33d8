//! Persistence layer: session records behind the `SessionStore` trait.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use traits::{SessionStore, SessionSummary};
