// Infra implementations of the automod config store.

pub mod in_memory;
pub mod json_store;

pub use in_memory::InMemoryConfigStore;
pub use json_store::JsonConfigStore;
