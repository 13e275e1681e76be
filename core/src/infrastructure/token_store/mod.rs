pub mod file_store;
pub mod memory_store;

pub use file_store::FileTokenStore;
pub use memory_store::MemoryTokenStore;
