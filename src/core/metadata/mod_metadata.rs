use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dependency::Dependency;
use crate::core::error::PublishError;
use crate::core::publishing::PublisherTarget;

/// Supported descriptor ecosystems. No magic strings past this point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModLoaderType {
    Fabric,
    Forge,
    Quilt,
    Spigot,
}

impl fmt::Display for ModLoaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModLoaderType::Fabric => write!(f, "fabric"),
            ModLoaderType::Forge => write!(f, "forge"),
            ModLoaderType::Quilt => write!(f, "quilt"),
            ModLoaderType::Spigot => write!(f, "spigot"),
        }
    }
}

impl FromStr for ModLoaderType {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fabric" => Ok(ModLoaderType::Fabric),
            "forge" => Ok(ModLoaderType::Forge),
            "quilt" => Ok(ModLoaderType::Quilt),
            "spigot" => Ok(ModLoaderType::Spigot),
            _ => Err(PublishError::UnsupportedLoaderType(s.to_string())),
        }
    }
}

/// Loader-agnostic description of a mod or plugin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModMetadata {
    pub id: String,
    pub name: String,
    /// `"*"` when the descriptor does not pin one.
    pub version: String,
    pub loaders: Vec<String>,
    pub dependencies: Vec<Dependency>,
    /// Project ids declared per target in the descriptor's `custom` block.
    #[serde(default)]
    pub project_ids: HashMap<PublisherTarget, String>,
}

impl ModMetadata {
    pub fn project_id(&self, target: PublisherTarget) -> Option<&str> {
        self.project_ids.get(&target).map(String::as_str)
    }

    /// Dependencies that should be disclosed to platforms.
    pub fn published_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| !d.ignore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_tags_are_closed() {
        assert_eq!("Fabric".parse::<ModLoaderType>().unwrap(), ModLoaderType::Fabric);
        assert_eq!("SPIGOT".parse::<ModLoaderType>().unwrap(), ModLoaderType::Spigot);

        let err = "liteloader".parse::<ModLoaderType>().unwrap_err();
        assert!(matches!(err, PublishError::UnsupportedLoaderType(tag) if tag == "liteloader"));
    }
}
