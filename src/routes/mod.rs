//! Route descriptors and the CRUD generator engine

pub mod descriptor;
pub mod generator;

pub use descriptor::{ActionConfig, RouteDescriptor, RouteEntry, RouteMethod};
pub use generator::CrudGenerator;
