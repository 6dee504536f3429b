pub mod catalog;
pub mod lookup;
pub mod manifest;
pub mod normalize;
pub mod reconciler;

pub use catalog::{CatalogCache, PlatformVersionCatalog, VersionEntry, VersionType};
pub use lookup::{GameVersionInfo, GameVersionLookup, MojangVersionLookup, StaticVersionLookup};
pub use manifest::{ManifestEntry, VersionManifest, VERSION_MANIFEST_URL};
pub use normalize::{unify_game_version, unify_game_version_syntax, unify_java, unify_loader};
pub use reconciler::{VersionQuery, VersionReconciler};
