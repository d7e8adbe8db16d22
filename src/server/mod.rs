//! Explicit server assembly and serving

pub mod builder;

pub use builder::{ServerBuilder, init_tracing};
