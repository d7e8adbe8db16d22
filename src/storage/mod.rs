//! Storage backends implementing the [`Repository`](crate::repository::Repository) contract

pub mod in_memory;

pub use in_memory::InMemoryRepository;
