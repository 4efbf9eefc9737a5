pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{GeminiSummarizer, GitHubClient, JsonStateStore, OpenAiSummarizer, SlackWebhook};
pub use config::{Settings, WatchConfig};
pub use core::sections::{extract_sections, SectionRules};
pub use core::version::{is_newer, parse, ParsedVersion, VersionNumber};
pub use core::watcher::{ReleaseWatcher, RunReport, WatchOptions};
pub use utils::error::{NotifierError, Result};
