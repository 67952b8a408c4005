//! Script catalogue adapters.

mod memory;

pub use memory::InMemoryStore;
