// ─── Artifact Archive ───
// Pulls a loader descriptor out of a packaged jar and decodes it into a
// generic JSON value for the metadata adapters.

use std::io::{Cursor, Read};

use serde_json::Value;
use tracing::debug;

use crate::core::error::{PublishError, PublishResult};

/// Descriptors are a few kilobytes; anything past this is not one.
const MAX_DESCRIPTOR_BYTES: u64 = 1024 * 1024;

/// Encoding of a descriptor file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn decode(&self, raw: &[u8]) -> PublishResult<Value> {
        let value = match self {
            ConfigFormat::Json => serde_json::from_slice(raw)?,
            ConfigFormat::Yaml => serde_yaml::from_slice(raw)?,
            ConfigFormat::Toml => {
                let text = std::str::from_utf8(raw).map_err(|e| {
                    PublishError::MalformedDescriptor(format!("descriptor is not UTF-8: {}", e))
                })?;
                toml::from_str(text)?
            }
        };
        Ok(value)
    }
}

/// Read `file_name` from a zip buffer and decode it.
pub fn read_config_from_archive(
    archive: &[u8],
    file_name: &str,
    format: ConfigFormat,
) -> PublishResult<Value> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut entry = match zip.by_name(file_name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(PublishError::MissingConfigFile(file_name.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let mut raw = Vec::new();
    (&mut entry).take(MAX_DESCRIPTOR_BYTES + 1).read_to_end(&mut raw)?;
    if raw.len() as u64 > MAX_DESCRIPTOR_BYTES {
        return Err(PublishError::MalformedDescriptor(format!(
            "{} is larger than {} bytes",
            file_name, MAX_DESCRIPTOR_BYTES
        )));
    }
    debug!("Read {} ({} bytes) from artifact", file_name, raw.len());

    format.decode(&raw)
}
