pub mod dependency;
pub mod descriptor;
pub mod fabric;
pub mod forge;
pub mod mod_metadata;
pub mod quilt;
pub mod reader;
pub mod spigot;

pub use dependency::{CustomMetadata, Dependency, DependencyKind, CUSTOM_NAMESPACE};
pub use mod_metadata::{ModLoaderType, ModMetadata};
pub use reader::{MetadataReader, ModMetadataReader};
