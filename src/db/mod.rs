//! Storage layer (in-process document store).

pub mod memory;

pub use memory::MemoryDb;
