pub mod codec;
pub mod id;
pub mod model;
pub mod registry;
pub mod tree;

pub use codec::LoadError;
pub use id::ComponentId;
pub use model::*;
pub use registry::{ComponentDefinition, ComponentRegistry, InMemoryRegistry, PropError};
