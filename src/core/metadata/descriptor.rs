// ─── Descriptor Scheme ───
// Shared dependency extraction used by every loader adapter. Each adapter only
// supplies its section names, the ids it ignores and its alias table.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use super::dependency::{CustomMetadata, Dependency, DependencyKind, CUSTOM_NAMESPACE};
use crate::core::error::{PublishError, PublishResult};
use crate::core::publishing::PublisherTarget;

/// Fixed per-loader knowledge about how dependencies are declared.
pub struct DependencyScheme {
    /// Section name for each kind, in [`DependencyKind::ALL`] order.
    pub sections: [&'static str; 5],
    /// Platform-implicit ids (the game, the runtime, the loader itself).
    pub ignored_by_default: &'static [&'static str],
    /// `(dependency id, project id on every target)`.
    pub aliases: &'static [(&'static str, &'static str)],
}

impl DependencyScheme {
    fn section_name(&self, kind: DependencyKind) -> &'static str {
        let index = DependencyKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        self.sections[index]
    }

    fn alias(&self, id: &str) -> Option<&'static str> {
        self.aliases
            .iter()
            .find(|(source, _)| *source == id)
            .map(|(_, alias)| *alias)
    }

    fn is_ignored(&self, id: &str) -> bool {
        self.ignored_by_default.contains(&id)
    }

    /// Walk every dependency section under `root`.
    pub fn extract(&self, root: &Map<String, Value>) -> PublishResult<Vec<Dependency>> {
        let mut dependencies = Vec::new();
        for kind in DependencyKind::ALL {
            let section = self.section_name(kind);
            match root.get(section) {
                None | Some(Value::Null) => {}
                Some(Value::Object(entries)) => {
                    for (id, value) in entries {
                        dependencies.push(self.entry(id, kind, value)?);
                    }
                }
                Some(Value::Array(items)) => {
                    for item in items {
                        dependencies.push(self.list_item(kind, section, item)?);
                    }
                }
                Some(other) => {
                    return Err(PublishError::MalformedDescriptor(format!(
                        "dependency section \"{}\" must be a mapping or a list, found {}",
                        section,
                        type_name(other)
                    )))
                }
            }
        }

        debug!("Extracted {} dependencies", dependencies.len());
        Ok(dependencies)
    }

    fn list_item(
        &self,
        kind: DependencyKind,
        section: &str,
        item: &Value,
    ) -> PublishResult<Dependency> {
        match item {
            Value::String(id) => self.bare(id, kind, "*".to_string()),
            Value::Object(record) => match record.get("id").and_then(Value::as_str) {
                Some(id) => self.record(id, kind, record),
                None => Err(PublishError::MalformedDescriptor(format!(
                    "entry in \"{}\" is missing its id",
                    section
                ))),
            },
            other => Err(PublishError::MalformedDescriptor(format!(
                "entry in \"{}\" must be an id or a record, found {}",
                section,
                type_name(other)
            ))),
        }
    }

    fn entry(&self, id: &str, kind: DependencyKind, value: &Value) -> PublishResult<Dependency> {
        match value {
            Value::String(version) => self.bare(id, kind, version.clone()),
            Value::Array(_) => self.bare(id, kind, version_range(id, value)?),
            Value::Object(record) => self.record(id, kind, record),
            other => Err(PublishError::MalformedDescriptor(format!(
                "dependency \"{}\" must be a version string or a record, found {}",
                id,
                type_name(other)
            ))),
        }
    }

    /// A dependency given only by id and version, with the scheme's ignore
    /// set and aliases applied.
    pub fn bare(
        &self,
        id: &str,
        kind: DependencyKind,
        version: String,
    ) -> PublishResult<Dependency> {
        let id = non_empty_id(id)?;
        let aliases = self.alias(id).map(|alias| {
            PublisherTarget::ALL
                .into_iter()
                .map(|target| (target, alias.to_string()))
                .collect::<HashMap<_, _>>()
        });

        Ok(Dependency {
            id: id.to_string(),
            kind,
            version,
            ignore: self.is_ignored(id),
            aliases,
        })
    }

    fn record(
        &self,
        id: &str,
        kind: DependencyKind,
        record: &Map<String, Value>,
    ) -> PublishResult<Dependency> {
        let id = non_empty_id(id)?;

        let version = match record.get("version").or_else(|| record.get("versions")) {
            None | Some(Value::Null) => "*".to_string(),
            Some(value @ Value::Array(_)) => version_range(id, value)?,
            Some(value) => scalar(value).ok_or_else(|| {
                PublishError::MalformedDescriptor(format!(
                    "version of dependency \"{}\" must be a string",
                    id
                ))
            })?,
        };

        let ignore = record
            .get("ignore")
            .and_then(Value::as_bool)
            .unwrap_or_else(|| self.is_ignored(id));

        let optional = record
            .get("optional")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let kind = match kind {
            DependencyKind::Depends if optional => DependencyKind::Recommends,
            kind => kind,
        };

        let mut custom = CustomMetadata::from_value(record.get("custom"));
        if let Some(alias) = self.alias(id) {
            custom.merge_defaults(
                CUSTOM_NAMESPACE,
                PublisherTarget::ALL.map(|target| (target.key(), alias)),
            );
        }
        let aliases = custom.target_ids();

        Ok(Dependency {
            id: id.to_string(),
            kind,
            version,
            ignore,
            aliases: (!aliases.is_empty()).then_some(aliases),
        })
    }
}

fn non_empty_id(id: &str) -> PublishResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(PublishError::MalformedDescriptor(
            "dependency id must not be empty".into(),
        ));
    }
    Ok(id)
}

/// Any of several version constraints, e.g. `[">=1.0", "<0.5"]`.
fn version_range(id: &str, value: &Value) -> PublishResult<String> {
    let Value::Array(items) = value else {
        return Err(PublishError::MalformedDescriptor(format!(
            "version of dependency \"{}\" must be a string",
            id
        )));
    };

    let versions = items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                PublishError::MalformedDescriptor(format!(
                    "version list of dependency \"{}\" must contain strings",
                    id
                ))
            })
        })
        .collect::<PublishResult<Vec<_>>>()?;

    Ok(if versions.is_empty() {
        "*".to_string()
    } else {
        versions.join(" || ")
    })
}

/// Render a scalar the way descriptors usually mean it (`1.0` stays `1.0`).
pub fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read an optional scalar field, rejecting structured values.
pub fn optional_field(root: &Map<String, Value>, key: &str) -> PublishResult<Option<String>> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar(value).map(Some).ok_or_else(|| {
            PublishError::MalformedDescriptor(format!(
                "\"{}\" must be a string, found {}",
                key,
                type_name(value)
            ))
        }),
    }
}

/// Borrow `value` as a mapping, or fail naming `what`.
pub fn as_mapping<'a>(value: &'a Value, what: &str) -> PublishResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        PublishError::MalformedDescriptor(format!(
            "{} must be a mapping, found {}",
            what,
            type_name(value)
        ))
    })
}

/// Borrow an optional nested mapping; absent means empty.
pub fn nested_mapping<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> PublishResult<Option<&'a Map<String, Value>>> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_mapping(value, &format!("\"{}\"", key)).map(Some),
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
