use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::publishing::PublisherTarget;

/// Namespace inside a descriptor's `custom` block that belongs to this tool.
pub const CUSTOM_NAMESPACE: &str = "mc-publish";

/// How a mod relates to one of its dependencies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Depends,
    Recommends,
    Suggests,
    Conflicts,
    Include,
}

impl DependencyKind {
    /// Declaration order used when walking descriptor sections.
    pub const ALL: [DependencyKind; 5] = [
        DependencyKind::Depends,
        DependencyKind::Recommends,
        DependencyKind::Suggests,
        DependencyKind::Conflicts,
        DependencyKind::Include,
    ];
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Depends => write!(f, "depends"),
            DependencyKind::Recommends => write!(f, "recommends"),
            DependencyKind::Suggests => write!(f, "suggests"),
            DependencyKind::Conflicts => write!(f, "conflicts"),
            DependencyKind::Include => write!(f, "include"),
        }
    }
}

/// One dependency edge of a mod.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dependency {
    pub id: String,
    pub kind: DependencyKind,
    pub version: String,
    /// Kept in the metadata for diagnostics, but never sent to a platform.
    pub ignore: bool,
    /// Project id to use instead of `id` on specific targets.
    pub aliases: Option<HashMap<PublisherTarget, String>>,
}

impl Dependency {
    pub fn new(id: impl Into<String>, kind: DependencyKind, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            version: version.into(),
            ignore: false,
            aliases: None,
        }
    }

    /// Identifier of this dependency on the given target.
    pub fn project_slug(&self, target: PublisherTarget) -> &str {
        self.aliases
            .as_ref()
            .and_then(|aliases| aliases.get(&target))
            .map(String::as_str)
            .unwrap_or(&self.id)
    }
}

/// Sparse `namespace -> key -> value` metadata taken from a descriptor's
/// `custom` block. Only string leaves are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomMetadata(BTreeMap<String, BTreeMap<String, String>>);

impl CustomMetadata {
    pub fn from_value(value: Option<&Value>) -> Self {
        let mut custom = BTreeMap::new();
        let Some(Value::Object(namespaces)) = value else {
            return Self(custom);
        };

        for (namespace, entries) in namespaces {
            let Value::Object(entries) = entries else {
                continue;
            };
            let strings: BTreeMap<String, String> = entries
                .iter()
                .filter_map(|(key, value)| value.as_str().map(|s| (key.clone(), s.to_string())))
                .collect();
            custom.insert(namespace.clone(), strings);
        }

        Self(custom)
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<&str> {
        self.0.get(namespace)?.get(key).map(String::as_str)
    }

    /// Fill gaps in `namespace` with `defaults`. Existing entries win.
    pub fn merge_defaults<I, K, V>(&mut self, namespace: &str, defaults: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = self.0.entry(namespace.to_string()).or_default();
        for (key, value) in defaults {
            entries.entry(key.into()).or_insert_with(|| value.into());
        }
    }

    /// Per-target ids declared under this tool's namespace.
    pub fn target_ids(&self) -> HashMap<PublisherTarget, String> {
        PublisherTarget::ALL
            .into_iter()
            .filter_map(|target| {
                self.get(CUSTOM_NAMESPACE, target.key())
                    .map(|id| (target, id.to_string()))
            })
            .collect()
    }
}
