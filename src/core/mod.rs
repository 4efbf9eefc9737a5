pub mod render;
pub mod sections;
pub mod version;
pub mod watcher;

pub use crate::domain::model::{Category, Feed, Release, SectionMap};
pub use crate::domain::ports::{Notifier, ReleaseSource, StateStore, Summarizer};
pub use crate::utils::error::Result;
