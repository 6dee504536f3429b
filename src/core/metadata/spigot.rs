use serde_json::Value;

use super::dependency::CustomMetadata;
use super::descriptor::{as_mapping, optional_field, DependencyScheme};
use super::mod_metadata::{ModLoaderType, ModMetadata};
use super::reader::ModMetadataReader;
use crate::core::archive::ConfigFormat;
use crate::core::error::PublishResult;

const SPIGOT_SCHEME: DependencyScheme = DependencyScheme {
    sections: ["depends", "recommends", "suggests", "conflicts", "includes"],
    ignored_by_default: &["minecraft", "java"],
    aliases: &[("spigot", "spigot-api")],
};

/// Reads `plugin.yml`.
pub struct SpigotMetadataReader;

impl ModMetadataReader for SpigotMetadataReader {
    fn config_file_name(&self) -> &'static str {
        "plugin.yml"
    }

    fn config_format(&self) -> ConfigFormat {
        ConfigFormat::Yaml
    }

    fn create_metadata(&self, config: &Value) -> PublishResult<ModMetadata> {
        let root = as_mapping(config, "plugin.yml")?;

        let id = optional_field(root, "id")?.unwrap_or_default();
        let name = optional_field(root, "name")?.unwrap_or_else(|| id.clone());
        let version = optional_field(root, "version")?.unwrap_or_else(|| "*".into());

        Ok(ModMetadata {
            id,
            name,
            version,
            loaders: vec![ModLoaderType::Spigot.to_string()],
            dependencies: SPIGOT_SCHEME.extract(root)?,
            project_ids: CustomMetadata::from_value(root.get("custom")).target_ids(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::publishing::PublisherTarget;

    fn parse(yaml: &str) -> ModMetadata {
        let config = ConfigFormat::Yaml.decode(yaml.as_bytes()).unwrap();
        SpigotMetadataReader.create_metadata(&config).unwrap()
    }

    #[test]
    fn parses_plugin_yml() {
        let metadata = parse(
            r#"
id: example-plugin
name: ExamplePlugin
version: 2.1.0
depends:
  spigot: "1.20.1"
  java: "17"
recommends:
  vault:
    version: "1.7"
custom:
  mc-publish:
    polymart: "4242"
"#,
        );

        assert_eq!(metadata.id, "example-plugin");
        assert_eq!(metadata.name, "ExamplePlugin");
        assert_eq!(metadata.loaders, vec!["spigot"]);
        assert_eq!(metadata.project_id(PublisherTarget::Polymart), Some("4242"));

        let spigot = metadata.dependencies.iter().find(|d| d.id == "spigot").unwrap();
        for target in PublisherTarget::ALL {
            assert_eq!(spigot.project_slug(target), "spigot-api");
        }

        let java = metadata.dependencies.iter().find(|d| d.id == "java").unwrap();
        assert!(java.ignore);

        let vault = metadata.dependencies.iter().find(|d| d.id == "vault").unwrap();
        assert_eq!(vault.version, "1.7");
        assert!(vault.aliases.is_none());
    }

    #[test]
    fn mapping_sections_keep_declaration_order() {
        let metadata = parse("depends:\n  zeta: '*'\n  alpha: '*'\n  mid: '*'\n");
        let ids: Vec<_> = metadata.dependencies.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn aliased_record_receives_alias_defaults() {
        let metadata = parse(
            r#"
depends:
  spigot:
    version: "1.20"
    custom:
      mc-publish:
        curseforge: bukkit
"#,
        );

        let spigot = &metadata.dependencies[0];
        assert_eq!(spigot.project_slug(PublisherTarget::CurseForge), "bukkit");
        assert_eq!(spigot.project_slug(PublisherTarget::Polymart), "spigot-api");
    }
}
