// Adapters layer: concrete implementations of the domain ports.

pub mod github;
pub mod slack;
pub mod storage;
pub mod summarizer;

pub use github::GitHubClient;
pub use slack::SlackWebhook;
pub use storage::JsonStateStore;
pub use summarizer::{GeminiSummarizer, OpenAiSummarizer};
