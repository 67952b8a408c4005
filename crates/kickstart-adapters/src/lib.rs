//! Infrastructure adapters for Kickstart.
//!
//! This crate implements the ports defined in `kickstart-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod answers;
pub mod builtin_scripts;
pub mod clock;
pub mod config_storage;
pub mod filesystem;
pub mod process;
pub mod renderer;
pub mod script_loader;
pub mod script_store;
pub mod tool_probe;

// Re-export commonly used adapters
pub use answers::load_answers;
pub use clock::{FixedClock, SystemClock};
pub use config_storage::{MemoryConfigStorage, TomlConfigStorage};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use process::{ProcessRunner, RecordingRunner};
pub use renderer::StrictRenderer;
pub use script_loader::FilesystemScriptLoader;
pub use script_store::InMemoryStore;
pub use tool_probe::{FakeToolProbe, SystemToolProbe};
