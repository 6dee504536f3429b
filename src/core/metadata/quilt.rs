use serde_json::Value;

use super::dependency::CustomMetadata;
use super::descriptor::{as_mapping, nested_mapping, optional_field, DependencyScheme};
use super::mod_metadata::{ModLoaderType, ModMetadata};
use super::reader::ModMetadataReader;
use crate::core::archive::ConfigFormat;
use crate::core::error::PublishResult;

const QUILT_SCHEME: DependencyScheme = DependencyScheme {
    sections: ["depends", "recommends", "suggests", "breaks", "includes"],
    ignored_by_default: &["minecraft", "java", "quilt_loader"],
    aliases: &[("quilted_fabric_api", "qsl"), ("fabric", "fabric-api")],
};

/// Reads `quilt.mod.json`. Identity and dependencies live under `quilt_loader`.
pub struct QuiltMetadataReader;

impl ModMetadataReader for QuiltMetadataReader {
    fn config_file_name(&self) -> &'static str {
        "quilt.mod.json"
    }

    fn config_format(&self) -> ConfigFormat {
        ConfigFormat::Json
    }

    fn create_metadata(&self, config: &Value) -> PublishResult<ModMetadata> {
        let root = as_mapping(config, "quilt.mod.json")?;
        let empty = serde_json::Map::new();
        let loader = nested_mapping(root, "quilt_loader")?.unwrap_or(&empty);
        let details = nested_mapping(loader, "metadata")?.unwrap_or(&empty);

        let id = optional_field(loader, "id")?.unwrap_or_default();
        let name = optional_field(details, "name")?.unwrap_or_else(|| id.clone());
        let version = optional_field(loader, "version")?.unwrap_or_else(|| "*".into());

        Ok(ModMetadata {
            id,
            name,
            version,
            loaders: vec![ModLoaderType::Quilt.to_string()],
            dependencies: QUILT_SCHEME.extract(loader)?,
            project_ids: CustomMetadata::from_value(root.get("custom")).target_ids(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::DependencyKind;
    use crate::core::publishing::PublisherTarget;
    use serde_json::json;

    #[test]
    fn parses_quilt_mod_json() {
        let config = json!({
            "schema_version": 1,
            "quilt_loader": {
                "id": "example_mod",
                "version": "0.3.0",
                "metadata": { "name": "Example Mod" },
                "depends": [
                    "quilt_loader",
                    { "id": "quilted_fabric_api", "versions": ">=7.0.0" },
                    { "id": "minecraft", "versions": "1.20.1" }
                ],
                "breaks": { "optifabric": "*" }
            }
        });

        let metadata = QuiltMetadataReader.create_metadata(&config).unwrap();

        assert_eq!(metadata.id, "example_mod");
        assert_eq!(metadata.name, "Example Mod");
        assert_eq!(metadata.version, "0.3.0");
        assert_eq!(metadata.loaders, vec!["quilt"]);
        assert_eq!(metadata.dependencies.len(), 4);

        let qfapi = &metadata.dependencies[1];
        assert_eq!(qfapi.version, ">=7.0.0");
        assert_eq!(qfapi.project_slug(PublisherTarget::CurseForge), "qsl");

        assert!(metadata.dependencies[0].ignore);
        assert!(metadata.dependencies[2].ignore);

        let breaks = &metadata.dependencies[3];
        assert_eq!(breaks.id, "optifabric");
        assert_eq!(breaks.kind, DependencyKind::Conflicts);
    }

    #[test]
    fn rejects_non_mapping_loader_block() {
        assert!(QuiltMetadataReader
            .create_metadata(&json!({ "quilt_loader": "nope" }))
            .is_err());
    }
}
