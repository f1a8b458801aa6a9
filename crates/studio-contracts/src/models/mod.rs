mod registry;
mod selectors;

pub use registry::{ModelRegistry, ModelSpec, IMAGE_EDIT, VIDEO};
pub use selectors::{ModelSelection, ModelSelector};
