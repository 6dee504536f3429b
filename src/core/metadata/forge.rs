use serde_json::{Map, Value};

use super::dependency::{CustomMetadata, Dependency, DependencyKind};
use super::descriptor::{as_mapping, nested_mapping, optional_field, type_name, DependencyScheme};
use super::mod_metadata::{ModLoaderType, ModMetadata};
use super::reader::ModMetadataReader;
use crate::core::archive::ConfigFormat;
use crate::core::error::{PublishError, PublishResult};

const FORGE_SCHEME: DependencyScheme = DependencyScheme {
    sections: ["required", "optional", "suggested", "incompatible", "embedded"],
    ignored_by_default: &["minecraft", "java", "forge"],
    aliases: &[],
};

/// Reads `META-INF/mods.toml`. Identity comes from the first `[[mods]]` entry.
pub struct ForgeMetadataReader;

impl ForgeMetadataReader {
    fn first_mod(root: &Map<String, Value>) -> PublishResult<Option<&Map<String, Value>>> {
        match root.get("mods") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(mods)) => match mods.first() {
                Some(entry) => as_mapping(entry, "[[mods]] entry").map(Some),
                None => Ok(None),
            },
            Some(_) => Err(PublishError::MalformedDescriptor(
                "\"mods\" must be an array of tables".into(),
            )),
        }
    }
}

/// `${file.jarVersion}` and friends are filled in at build time.
fn is_placeholder(version: &str) -> bool {
    version.starts_with("${") && version.ends_with('}')
}

/// `[[dependencies.<modId>]]` tables, the layout Forge and NeoForge read.
///
/// Every key under `dependencies` that is not a section name is taken as the
/// owning mod id. An id depended on by several mods is listed once.
fn dependency_tables(sections: &Map<String, Value>) -> PublishResult<Vec<Dependency>> {
    let mut dependencies: Vec<Dependency> = Vec::new();
    for (owner, value) in sections {
        if FORGE_SCHEME.sections.contains(&owner.as_str()) {
            continue;
        }
        let Value::Array(tables) = value else {
            return Err(PublishError::MalformedDescriptor(format!(
                "dependencies of \"{}\" must be an array of tables, found {}",
                owner,
                type_name(value)
            )));
        };

        for table in tables {
            let table = as_mapping(table, &format!("[[dependencies.{}]] entry", owner))?;
            let id = optional_field(table, "modId")?.ok_or_else(|| {
                PublishError::MalformedDescriptor(format!(
                    "[[dependencies.{}]] entry is missing its modId",
                    owner
                ))
            })?;
            if dependencies.iter().any(|d| d.id == id) {
                continue;
            }
            let version = optional_field(table, "versionRange")?
                .filter(|v| !v.trim().is_empty() && !is_placeholder(v))
                .unwrap_or_else(|| "*".into());
            dependencies.push(FORGE_SCHEME.bare(&id, table_kind(table)?, version)?);
        }
    }
    Ok(dependencies)
}

/// NeoForge spells it `type`, older Forge uses `mandatory`. Neither means
/// required.
fn table_kind(table: &Map<String, Value>) -> PublishResult<DependencyKind> {
    if let Some(kind) = optional_field(table, "type")? {
        return match kind.to_ascii_lowercase().as_str() {
            "required" => Ok(DependencyKind::Depends),
            "optional" => Ok(DependencyKind::Recommends),
            "incompatible" | "discouraged" => Ok(DependencyKind::Conflicts),
            other => Err(PublishError::MalformedDescriptor(format!(
                "unknown dependency type \"{}\"",
                other
            ))),
        };
    }
    Ok(match table.get("mandatory").and_then(Value::as_bool) {
        Some(false) => DependencyKind::Recommends,
        _ => DependencyKind::Depends,
    })
}

impl ModMetadataReader for ForgeMetadataReader {
    fn config_file_name(&self) -> &'static str {
        "META-INF/mods.toml"
    }

    fn config_format(&self) -> ConfigFormat {
        ConfigFormat::Toml
    }

    fn create_metadata(&self, config: &Value) -> PublishResult<ModMetadata> {
        let root = as_mapping(config, "mods.toml")?;
        let empty = Map::new();
        let entry = Self::first_mod(root)?.unwrap_or(&empty);

        let id = optional_field(entry, "modId")?.unwrap_or_default();
        let name = optional_field(entry, "displayName")?.unwrap_or_else(|| id.clone());
        let version = optional_field(entry, "version")?
            .filter(|v| !is_placeholder(v))
            .unwrap_or_else(|| "*".into());

        let dependencies = match nested_mapping(root, "dependencies")? {
            Some(sections) => {
                let mut dependencies = FORGE_SCHEME.extract(sections)?;
                dependencies.extend(dependency_tables(sections)?);
                dependencies
            }
            None => Vec::new(),
        };

        Ok(ModMetadata {
            id,
            name,
            version,
            loaders: vec![ModLoaderType::Forge.to_string()],
            dependencies,
            project_ids: CustomMetadata::from_value(root.get("custom")).target_ids(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::publishing::PublisherTarget;

    fn parse(toml: &str) -> PublishResult<ModMetadata> {
        let config = ConfigFormat::Toml.decode(toml.as_bytes())?;
        ForgeMetadataReader.create_metadata(&config)
    }

    #[test]
    fn parses_mods_toml() {
        let metadata = parse(
            r#"
modLoader = "javafml"
loaderVersion = "[47,)"

[[mods]]
modId = "examplemod"
displayName = "Example Mod"
version = "${file.jarVersion}"

[dependencies.required]
forge = "[47,)"
minecraft = "[1.20.1,1.21)"
jei = "*"

[dependencies.embedded.kotlinforforge]
version = "4.4.0"

[custom.mc-publish]
curseforge = "238222"
"#,
        )
        .unwrap();

        assert_eq!(metadata.id, "examplemod");
        assert_eq!(metadata.name, "Example Mod");
        assert_eq!(metadata.version, "*");
        assert_eq!(metadata.loaders, vec!["forge"]);
        assert_eq!(metadata.project_id(PublisherTarget::CurseForge), Some("238222"));

        assert_eq!(metadata.dependencies.len(), 4);
        assert_eq!(metadata.published_dependencies().count(), 2);

        let kff = metadata
            .dependencies
            .iter()
            .find(|d| d.id == "kotlinforforge")
            .unwrap();
        assert_eq!(kff.kind, DependencyKind::Include);
        assert_eq!(kff.version, "4.4.0");
    }

    #[test]
    fn reads_dependency_tables() {
        let metadata = parse(
            r#"
modLoader = "javafml"

[[mods]]
modId = "examplemod"
version = "1.4.0"

[[dependencies.examplemod]]
modId = "forge"
mandatory = true
versionRange = "[47,)"
ordering = "NONE"
side = "BOTH"

[[dependencies.examplemod]]
modId = "jei"
mandatory = false
versionRange = "[15.2,)"

[[dependencies.examplemod]]
modId = "minecraft"
type = "required"
versionRange = "${minecraft_version_range}"

[[dependencies.examplemod]]
modId = "optifine"
type = "incompatible"
"#,
        )
        .unwrap();

        let ids: Vec<_> = metadata.dependencies.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["forge", "jei", "minecraft", "optifine"]);

        let forge = &metadata.dependencies[0];
        assert!(forge.ignore);
        assert_eq!(forge.kind, DependencyKind::Depends);
        assert_eq!(forge.version, "[47,)");

        let jei = &metadata.dependencies[1];
        assert!(!jei.ignore);
        assert_eq!(jei.kind, DependencyKind::Recommends);
        assert_eq!(jei.version, "[15.2,)");

        assert!(metadata.dependencies[2].ignore);
        assert_eq!(metadata.dependencies[2].version, "*");

        let optifine = &metadata.dependencies[3];
        assert_eq!(optifine.kind, DependencyKind::Conflicts);
        assert_eq!(optifine.version, "*");

        let published: Vec<_> = metadata.published_dependencies().map(|d| d.id.as_str()).collect();
        assert_eq!(published, vec!["jei", "optifine"]);
    }

    #[test]
    fn shared_dependencies_are_listed_once() {
        let metadata = parse(
            r#"
[[mods]]
modId = "first"

[[mods]]
modId = "second"

[[dependencies.first]]
modId = "jei"
mandatory = true

[[dependencies.second]]
modId = "jei"
mandatory = false
"#,
        )
        .unwrap();

        assert_eq!(metadata.dependencies.len(), 1);
        assert_eq!(metadata.dependencies[0].kind, DependencyKind::Depends);
    }

    #[test]
    fn rejects_malformed_dependency_tables() {
        assert!(matches!(
            parse("[dependencies]\nexamplemod = \"forge\"\n"),
            Err(PublishError::MalformedDescriptor(_))
        ));
        assert!(matches!(
            parse("[[dependencies.examplemod]]\nmandatory = true\n"),
            Err(PublishError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn rejects_mods_that_are_not_tables() {
        assert!(matches!(
            parse("mods = \"examplemod\""),
            Err(PublishError::MalformedDescriptor(_))
        ));
    }
}
