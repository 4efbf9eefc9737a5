use crate::adapters::github::DEFAULT_API_URL;
use crate::adapters::storage::DEFAULT_STATE_PATH;
use crate::adapters::summarizer::{
    GeminiSummarizer, OpenAiSummarizer, DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL,
};
use crate::core::sections::{SectionRules, DEFAULT_MAX_BULLETS};
use crate::core::watcher::WatchOptions;
use crate::domain::model::{Feed, SendMode};
use crate::domain::ports::Summarizer;
use crate::utils::error::{NotifierError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_SUMMARY_LANGUAGE: &str = "English";

/// Optional TOML file. Every field overrides the matching environment value.
///
/// ```toml
/// send_mode = "per_repo"
/// max_bullets = 5
///
/// [[feeds]]
/// repo = "spring-projects/spring-boot"
/// product = "Spring Boot"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    pub webhook_url: Option<String>,
    pub send_mode: Option<String>,
    pub include_prereleases: Option<bool>,
    pub state_path: Option<String>,
    pub max_bullets: Option<usize>,
    pub summary_language: Option<String>,
    pub feeds: Option<Vec<Feed>>,
}

impl WatchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content, |key| std::env::var(key).ok())
    }

    pub fn from_toml_str(content: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let processed = substitute_env_vars(content, &lookup)?;
        Ok(toml::from_str(&processed)?)
    }
}

/// Replace `${VAR}` references; unknown variables are left as written.
fn substitute_env_vars(content: &str, lookup: &impl Fn(&str) -> Option<String>) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| NotifierError::ConfigError {
        message: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryProvider {
    Gemini { api_key: String, model: String },
    OpenAi { api_key: String, model: String },
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub webhook_url: String,
    pub send_mode: SendMode,
    pub github_api_url: String,
    pub github_token: Option<String>,
    pub include_prereleases: bool,
    pub state_path: String,
    pub feeds: Vec<Feed>,
    pub max_bullets: usize,
    pub summary: Option<SummaryProvider>,
    pub summary_language: String,
}

impl Settings {
    pub fn from_env(file: Option<WatchConfig>) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), file)
    }

    /// Resolve settings from a variable lookup, then apply the TOML overrides.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        file: Option<WatchConfig>,
    ) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let file = file.unwrap_or_default();

        let webhook_url = file
            .webhook_url
            .or_else(|| var("SLACK_WEBHOOK_URL"))
            .ok_or_else(|| NotifierError::MissingConfigError {
                field: "SLACK_WEBHOOK_URL".to_string(),
            })?;

        let send_mode = file
            .send_mode
            .or_else(|| var("SLACK_SEND_MODE"))
            .map(|mode| SendMode::parse_lenient(&mode))
            .unwrap_or_default();

        let include_prereleases = file
            .include_prereleases
            .unwrap_or_else(|| var("INCLUDE_PRERELEASES").is_some_and(|v| parse_bool(&v)));

        let summary = match (var("GEMINI_API_KEY"), var("OPENAI_API_KEY")) {
            (Some(api_key), _) => Some(SummaryProvider::Gemini {
                api_key,
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            }),
            (None, Some(api_key)) => Some(SummaryProvider::OpenAi {
                api_key,
                model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            }),
            (None, None) => None,
        };

        Ok(Self {
            webhook_url,
            send_mode,
            github_api_url: var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            github_token: var("GITHUB_TOKEN"),
            include_prereleases,
            state_path: file
                .state_path
                .or_else(|| var("STATE_PATH"))
                .unwrap_or_else(|| DEFAULT_STATE_PATH.to_string()),
            feeds: file.feeds.unwrap_or_else(Feed::defaults),
            max_bullets: file.max_bullets.unwrap_or(DEFAULT_MAX_BULLETS),
            summary,
            summary_language: file
                .summary_language
                .or_else(|| var("SUMMARY_LANGUAGE"))
                .unwrap_or_else(|| DEFAULT_SUMMARY_LANGUAGE.to_string()),
        })
    }

    pub fn watch_options(&self, dry_run: bool) -> WatchOptions {
        WatchOptions {
            feeds: self.feeds.clone(),
            send_mode: self.send_mode,
            include_prereleases: self.include_prereleases,
            rules: SectionRules::default().with_max_bullets(self.max_bullets),
            dry_run,
        }
    }

    /// The configured summarizer, or `None` (with a warning) if it cannot be built.
    pub fn summarizer(&self) -> Option<Box<dyn Summarizer>> {
        let built: Result<Box<dyn Summarizer>> = match self.summary.as_ref()? {
            SummaryProvider::Gemini { api_key, model } => {
                GeminiSummarizer::new(api_key, model, &self.summary_language)
                    .map(|s| Box::new(s) as Box<dyn Summarizer>)
            }
            SummaryProvider::OpenAi { api_key, model } => {
                OpenAiSummarizer::new(api_key, model, &self.summary_language)
                    .map(|s| Box::new(s) as Box<dyn Summarizer>)
            }
        };

        match built {
            Ok(summarizer) => {
                tracing::info!("Using {} for release summaries", summarizer.provider_name());
                Some(summarizer)
            }
            Err(e) => {
                tracing::warn!("Summarizer unavailable, continuing without: {}", e);
                None
            }
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("SLACK_WEBHOOK_URL", &self.webhook_url)?;
        validation::validate_url("GITHUB_API_URL", &self.github_api_url)?;
        validation::validate_path("state_path", &self.state_path)?;
        validation::validate_positive_number("max_bullets", self.max_bullets, 1)?;
        validation::validate_non_empty_string("summary_language", &self.summary_language)?;

        if self.feeds.is_empty() {
            return Err(NotifierError::ConfigError {
                message: "at least one feed must be configured".to_string(),
            });
        }
        for feed in &self.feeds {
            validation::validate_repo_slug("feeds.repo", &feed.repo)?;
            validation::validate_non_empty_string("feeds.product", &feed.product)?;
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_webhook_is_error() {
        let err = Settings::from_lookup(lookup(&[]), None).unwrap_err();
        assert!(matches!(
            err,
            NotifierError::MissingConfigError { ref field } if field == "SLACK_WEBHOOK_URL"
        ));

        let blank = Settings::from_lookup(lookup(&[("SLACK_WEBHOOK_URL", "  ")]), None);
        assert!(blank.is_err());
    }

    #[test]
    fn test_defaults() {
        let settings =
            Settings::from_lookup(lookup(&[("SLACK_WEBHOOK_URL", "https://hooks.example/x")]), None)
                .unwrap();

        assert_eq!(settings.send_mode, SendMode::Combined);
        assert_eq!(settings.github_api_url, "https://api.github.com");
        assert_eq!(settings.state_path, "state/last_seen.json");
        assert_eq!(settings.feeds, Feed::defaults());
        assert_eq!(settings.max_bullets, 8);
        assert!(!settings.include_prereleases);
        assert!(settings.summary.is_none());
        assert!(settings.github_token.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_env_values() {
        let settings = Settings::from_lookup(
            lookup(&[
                ("SLACK_WEBHOOK_URL", "https://hooks.example/x"),
                ("SLACK_SEND_MODE", "PER_REPO"),
                ("INCLUDE_PRERELEASES", "yes"),
                ("GITHUB_TOKEN", "ghp_x"),
                ("OPENAI_API_KEY", "sk-x"),
                ("STATE_PATH", "/tmp/state.json"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(settings.send_mode, SendMode::PerRepo);
        assert!(settings.include_prereleases);
        assert_eq!(settings.github_token.as_deref(), Some("ghp_x"));
        assert_eq!(settings.state_path, "/tmp/state.json");
        assert_eq!(
            settings.summary,
            Some(SummaryProvider::OpenAi {
                api_key: "sk-x".to_string(),
                model: "gpt-4o".to_string()
            })
        );
    }

    #[test]
    fn test_gemini_takes_priority() {
        let settings = Settings::from_lookup(
            lookup(&[
                ("SLACK_WEBHOOK_URL", "https://hooks.example/x"),
                ("GEMINI_API_KEY", "g"),
                ("GEMINI_MODEL", "gemini-pro"),
                ("OPENAI_API_KEY", "o"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(
            settings.summary,
            Some(SummaryProvider::Gemini {
                api_key: "g".to_string(),
                model: "gemini-pro".to_string()
            })
        );
        assert_eq!(settings.summarizer().unwrap().provider_name(), "Gemini");
    }

    #[test]
    fn test_toml_overrides_env() {
        let toml = r#"
webhook_url = "${HOOK}"
send_mode = "per_repo"
max_bullets = 3

[[feeds]]
repo = "acme/tool"
product = "Tool"
"#;
        let vars = lookup(&[
            ("HOOK", "https://hooks.example/from-file"),
            ("SLACK_WEBHOOK_URL", "https://hooks.example/from-env"),
            ("SLACK_SEND_MODE", "combined"),
        ]);
        let file = WatchConfig::from_toml_str(toml, &vars).unwrap();
        let settings = Settings::from_lookup(vars, Some(file)).unwrap();

        assert_eq!(settings.webhook_url, "https://hooks.example/from-file");
        assert_eq!(settings.send_mode, SendMode::PerRepo);
        assert_eq!(settings.max_bullets, 3);
        assert_eq!(settings.feeds, vec![Feed::new("acme/tool", "Tool")]);
        assert_eq!(settings.watch_options(false).rules.max_bullets(), 3);
    }

    #[test]
    fn test_unresolved_variable_fails_validation() {
        let file = WatchConfig::from_toml_str(r#"webhook_url = "${NOPE}""#, lookup(&[])).unwrap();
        let settings = Settings::from_lookup(lookup(&[]), Some(file)).unwrap();

        assert_eq!(settings.webhook_url, "${NOPE}");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unknown_toml_key_is_rejected() {
        assert!(WatchConfig::from_toml_str("colour = \"red\"", lookup(&[])).is_err());
    }

    #[test]
    fn test_invalid_feed_fails_validation() {
        let file = WatchConfig {
            feeds: Some(vec![Feed::new("not-a-slug", "Broken")]),
            ..WatchConfig::default()
        };
        let settings = Settings::from_lookup(
            lookup(&[("SLACK_WEBHOOK_URL", "https://hooks.example/x")]),
            Some(file),
        )
        .unwrap();

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["1", "true", "YES", "y", " on "] {
            assert!(parse_bool(truthy), "{truthy}");
        }
        for falsy in ["0", "false", "no", ""] {
            assert!(!parse_bool(falsy), "{falsy}");
        }
    }
}
