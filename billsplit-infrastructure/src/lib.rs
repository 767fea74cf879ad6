#![warn(clippy::uninlined_format_args)]

pub mod json_source;
pub mod memory_store;

pub use json_source::JsonLedgerSource;
pub use memory_store::InMemoryLedgerStore;
