//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace: the
//! typed run configuration, stage names and step selection, artifact
//! references, the stage invoker interface and the error taxonomy.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Artifact Model
//! - Stages exchange data only through artifact references (`name.format:version`)
//! - Consumers always ask for version `latest`; the external store resolves it

mod artifact;
mod config;
mod error;
mod invoker;
mod stage;

pub use artifact::{ArtifactRef, LATEST};
pub use config::*;
pub use error::*;
pub use invoker::*;
pub use stage::*;
