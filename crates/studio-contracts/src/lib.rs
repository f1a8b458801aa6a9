//! Domain types for the studio: input assets, parameter tables, request
//! builders and the error taxonomy shared by the engine and the CLI.

pub mod assets;
pub mod credential;
pub mod errors;
pub mod events;
pub mod models;
pub mod objects;
pub mod params;
pub mod requests;

pub use assets::{AssetSlot, ImageAsset};
pub use credential::Credential;
pub use errors::{ServiceError, StudioError};
pub use objects::{ObjectStore, ObjectUrl};
pub use params::{AspectRatio, Pose};
