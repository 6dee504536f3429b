// ─── mc-publish Core ───
// Reads mod/plugin descriptors out of built jars and publishes releases.
//
// Architecture:
//   core/
//     archive     — Config file extraction from jars (JSON, YAML, TOML)
//     metadata/   — Fabric, Quilt, Forge, Spigot descriptor readers
//     version/    — Version normalization + cached platform catalogs
//     publishing/ — CurseForge and Polymart publishers
//     http        — Shared client + soft/hard error classification
//     state/      — Settings and shared services

pub mod archive;
pub mod error;
pub mod http;
pub mod metadata;
pub mod publishing;
pub mod state;
pub mod version;
