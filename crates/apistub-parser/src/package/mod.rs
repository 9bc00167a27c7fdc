//! The package on disk: archives, metadata, layout, and parsed sources.

pub mod archive;
pub mod discovery;
pub mod metadata;
mod resolve;
pub mod sources;

pub use discovery::{ModuleFile, PackageLayout, in_namespace};
pub use metadata::PackageMetadata;
pub use resolve::{DefSite, Target};
pub use sources::{Binding, SourceIndex, SourceModule, top_level_statements};
