use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use reqwest::multipart::Part;
use serde::{Deserialize, Serialize};

use super::target::PublisherTarget;
use crate::core::error::{PublishError, PublishResult};
use crate::core::metadata::Dependency;

/// Release channel of a published version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
    #[default]
    Release,
    Beta,
    Alpha,
}

impl ReleaseChannel {
    /// String boolean, `"1"` only for beta releases.
    pub fn beta_flag(&self) -> &'static str {
        if *self == ReleaseChannel::Beta {
            "1"
        } else {
            "0"
        }
    }

    /// String boolean, `"1"` only for alpha (snapshot) releases.
    pub fn snapshot_flag(&self) -> &'static str {
        if *self == ReleaseChannel::Alpha {
            "1"
        } else {
            "0"
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseChannel::Release => write!(f, "release"),
            ReleaseChannel::Beta => write!(f, "beta"),
            ReleaseChannel::Alpha => write!(f, "alpha"),
        }
    }
}

impl FromStr for ReleaseChannel {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "release" | "r" => Ok(ReleaseChannel::Release),
            "beta" | "b" => Ok(ReleaseChannel::Beta),
            "alpha" | "a" => Ok(ReleaseChannel::Alpha),
            other => Err(PublishError::Other(format!("Unknown release channel \"{}\"", other))),
        }
    }
}

/// A file on disk that will be attached to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFile {
    pub path: PathBuf,
    pub name: String,
}

impl PublishFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file into a multipart part carrying its file name.
    pub async fn to_part(&self) -> PublishResult<Part> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| PublishError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(Part::bytes(bytes).file_name(self.name.clone()))
    }
}

/// Everything one target needs to publish one version.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    /// Project / resource id on the target platform.
    pub target_id: String,
    pub token: String,
    pub name: String,
    pub version: String,
    pub channel: ReleaseChannel,
    pub game_versions: Vec<String>,
    pub loaders: Vec<String>,
    pub runtime_versions: Vec<String>,
    pub changelog: String,
    pub files: Vec<PublishFile>,
    pub dependencies: Vec<Dependency>,
}

impl PublishRequest {
    /// Display title, falling back to the version when no name was given.
    pub fn title(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.version
        } else {
            &self.name
        }
    }

    pub(crate) fn require_files(&self) -> PublishResult<&[PublishFile]> {
        if self.files.is_empty() {
            return Err(PublishError::Other(format!(
                "No files to publish for version {}",
                self.version
            )));
        }
        Ok(&self.files)
    }
}

/// Normalized outcome of a successful publish.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishedVersion {
    pub target: PublisherTarget,
    pub id: String,
    pub version: Option<String>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_flags_are_mutually_exclusive() {
        assert_eq!(ReleaseChannel::Beta.beta_flag(), "1");
        assert_eq!(ReleaseChannel::Beta.snapshot_flag(), "0");

        assert_eq!(ReleaseChannel::Alpha.beta_flag(), "0");
        assert_eq!(ReleaseChannel::Alpha.snapshot_flag(), "1");

        assert_eq!(ReleaseChannel::Release.beta_flag(), "0");
        assert_eq!(ReleaseChannel::Release.snapshot_flag(), "0");
    }

    #[test]
    fn parses_channel_names() {
        assert_eq!("Beta".parse::<ReleaseChannel>().unwrap(), ReleaseChannel::Beta);
        assert_eq!("alpha".parse::<ReleaseChannel>().unwrap(), ReleaseChannel::Alpha);
        assert!("nightly".parse::<ReleaseChannel>().is_err());
    }

    #[test]
    fn file_name_comes_from_the_path() {
        let file = PublishFile::new("build/libs/example-1.0.0.jar");
        assert_eq!(file.name, "example-1.0.0.jar");
    }

    #[test]
    fn title_falls_back_to_version() {
        let mut request = PublishRequest {
            version: "1.0.0".into(),
            ..Default::default()
        };
        assert_eq!(request.title(), "1.0.0");
        request.name = "Example 1.0.0".into();
        assert_eq!(request.title(), "Example 1.0.0");
    }

    #[tokio::test]
    async fn missing_files_surface_their_path() {
        let err = PublishFile::new("/definitely/not/here.jar").to_part().await.unwrap_err();
        assert!(matches!(err, PublishError::Io { path, .. } if path.ends_with("here.jar")));
    }
}
