use std::path::Path;

use serde_json::Value;
use tracing::info;

use super::fabric::FabricMetadataReader;
use super::forge::ForgeMetadataReader;
use super::mod_metadata::{ModLoaderType, ModMetadata};
use super::quilt::QuiltMetadataReader;
use super::spigot::SpigotMetadataReader;
use crate::core::archive::{read_config_from_archive, ConfigFormat};
use crate::core::error::{PublishError, PublishResult};

/// One implementation per descriptor ecosystem.
pub trait ModMetadataReader {
    /// Descriptor path inside the packaged artifact.
    fn config_file_name(&self) -> &'static str;

    fn config_format(&self) -> ConfigFormat;

    /// Turn a decoded descriptor into canonical metadata.
    fn create_metadata(&self, config: &Value) -> PublishResult<ModMetadata>;
}

/// Closed set of readers, one per loader tag.
pub enum MetadataReader {
    Fabric(FabricMetadataReader),
    Forge(ForgeMetadataReader),
    Quilt(QuiltMetadataReader),
    Spigot(SpigotMetadataReader),
}

impl MetadataReader {
    pub fn new(loader: ModLoaderType) -> Self {
        match loader {
            ModLoaderType::Fabric => Self::Fabric(FabricMetadataReader),
            ModLoaderType::Forge => Self::Forge(ForgeMetadataReader),
            ModLoaderType::Quilt => Self::Quilt(QuiltMetadataReader),
            ModLoaderType::Spigot => Self::Spigot(SpigotMetadataReader),
        }
    }

    /// Build a reader from a free-form loader tag such as `"Fabric"`.
    pub fn from_tag(tag: &str) -> PublishResult<Self> {
        Ok(Self::new(tag.parse()?))
    }

    pub fn config_file_name(&self) -> &'static str {
        match self {
            MetadataReader::Fabric(r) => r.config_file_name(),
            MetadataReader::Forge(r) => r.config_file_name(),
            MetadataReader::Quilt(r) => r.config_file_name(),
            MetadataReader::Spigot(r) => r.config_file_name(),
        }
    }

    pub fn config_format(&self) -> ConfigFormat {
        match self {
            MetadataReader::Fabric(r) => r.config_format(),
            MetadataReader::Forge(r) => r.config_format(),
            MetadataReader::Quilt(r) => r.config_format(),
            MetadataReader::Spigot(r) => r.config_format(),
        }
    }

    pub fn create_metadata(&self, config: &Value) -> PublishResult<ModMetadata> {
        match self {
            MetadataReader::Fabric(r) => r.create_metadata(config),
            MetadataReader::Forge(r) => r.create_metadata(config),
            MetadataReader::Quilt(r) => r.create_metadata(config),
            MetadataReader::Spigot(r) => r.create_metadata(config),
        }
    }

    /// Read metadata straight from a jar held in memory.
    pub fn read_archive(&self, archive: &[u8]) -> PublishResult<ModMetadata> {
        let config =
            read_config_from_archive(archive, self.config_file_name(), self.config_format())?;
        let metadata = self.create_metadata(&config)?;
        info!(
            "Read {} {} ({} dependencies)",
            metadata.name,
            metadata.version,
            metadata.dependencies.len()
        );
        Ok(metadata)
    }

    pub async fn read_file(&self, path: &Path) -> PublishResult<ModMetadata> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| PublishError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        self.read_archive(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::archive::tests::zip_with;
    use serde_json::json;

    #[test]
    fn factory_covers_every_loader() {
        for (tag, file, format) in [
            ("fabric", "fabric.mod.json", ConfigFormat::Json),
            ("Forge", "META-INF/mods.toml", ConfigFormat::Toml),
            ("QUILT", "quilt.mod.json", ConfigFormat::Json),
            ("spigot", "plugin.yml", ConfigFormat::Yaml),
        ] {
            let reader = MetadataReader::from_tag(tag).unwrap();
            assert_eq!(reader.config_file_name(), file);
            assert_eq!(reader.config_format(), format);
        }
    }

    #[test]
    fn factory_rejects_unknown_tags() {
        assert!(matches!(
            MetadataReader::from_tag("rift"),
            Err(PublishError::UnsupportedLoaderType(_))
        ));
    }

    #[test]
    fn every_variant_defaults_missing_identity() {
        for loader in [
            ModLoaderType::Fabric,
            ModLoaderType::Forge,
            ModLoaderType::Quilt,
            ModLoaderType::Spigot,
        ] {
            let metadata = MetadataReader::new(loader).create_metadata(&json!({})).unwrap();
            assert_eq!(metadata.id, "", "{loader}");
            assert_eq!(metadata.name, "", "{loader}");
            assert_eq!(metadata.version, "*", "{loader}");
            assert_eq!(metadata.loaders, vec![loader.to_string()]);
        }
    }

    #[test]
    fn every_variant_rejects_non_mapping_roots() {
        for loader in [
            ModLoaderType::Fabric,
            ModLoaderType::Forge,
            ModLoaderType::Quilt,
            ModLoaderType::Spigot,
        ] {
            let err = MetadataReader::new(loader).create_metadata(&json!([1, 2])).unwrap_err();
            assert!(matches!(err, PublishError::MalformedDescriptor(_)), "{loader}");
        }
    }

    #[test]
    fn reads_spigot_plugin_from_jar() {
        let jar = zip_with(&[(
            "plugin.yml",
            "id: example\nname: Example\nversion: 1.2.0\ndepends:\n  spigot: '1.20'\n",
        )]);

        let metadata = MetadataReader::new(ModLoaderType::Spigot)
            .read_archive(&jar)
            .unwrap();

        assert_eq!(metadata.id, "example");
        assert_eq!(metadata.version, "1.2.0");
        assert_eq!(metadata.dependencies[0].id, "spigot");
    }
}
