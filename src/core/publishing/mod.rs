pub mod curseforge;
pub mod polymart;
pub mod publisher;
pub mod request;
pub mod target;

pub use curseforge::{CurseForgeApi, CurseForgePublisher, CURSEFORGE_API_BASE};
pub use polymart::{PolymartApi, PolymartPublisher, POLYMART_API_BASE};
pub use publisher::{Publisher, TargetPublisher};
pub use request::{PublishFile, PublishRequest, PublishedVersion, ReleaseChannel};
pub use target::PublisherTarget;
