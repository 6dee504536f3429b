use serde_json::Value;

use super::dependency::CustomMetadata;
use super::descriptor::{as_mapping, optional_field, DependencyScheme};
use super::mod_metadata::{ModLoaderType, ModMetadata};
use super::reader::ModMetadataReader;
use crate::core::archive::ConfigFormat;
use crate::core::error::PublishResult;

const FABRIC_SCHEME: DependencyScheme = DependencyScheme {
    sections: ["depends", "recommends", "suggests", "conflicts", "includes"],
    ignored_by_default: &["minecraft", "java", "fabricloader"],
    aliases: &[("fabric", "fabric-api")],
};

/// Reads `fabric.mod.json`.
pub struct FabricMetadataReader;

impl ModMetadataReader for FabricMetadataReader {
    fn config_file_name(&self) -> &'static str {
        "fabric.mod.json"
    }

    fn config_format(&self) -> ConfigFormat {
        ConfigFormat::Json
    }

    fn create_metadata(&self, config: &Value) -> PublishResult<ModMetadata> {
        let root = as_mapping(config, "fabric.mod.json")?;

        let id = optional_field(root, "id")?.unwrap_or_default();
        let name = optional_field(root, "name")?.unwrap_or_else(|| id.clone());
        let version = optional_field(root, "version")?.unwrap_or_else(|| "*".into());

        Ok(ModMetadata {
            id,
            name,
            version,
            loaders: vec![ModLoaderType::Fabric.to_string()],
            dependencies: FABRIC_SCHEME.extract(root)?,
            project_ids: CustomMetadata::from_value(root.get("custom")).target_ids(),
        })
    }
}
