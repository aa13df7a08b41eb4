//! Local File Storage

mod artifact_writer;

pub use artifact_writer::{ArtifactError, ArtifactWriter};
