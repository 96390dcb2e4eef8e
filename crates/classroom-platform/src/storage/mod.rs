pub mod memory;
pub mod local;
pub mod auto;

pub use memory::MemoryStorage;
pub use local::LocalStorageBackend;
pub use auto::{auto_detect_storage, open_storage};
