use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A release as returned by the GitHub Releases API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tag_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub html_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One upstream repository being watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// `owner/repo`, also the key in the persisted state.
    pub repo: String,
    pub product: String,
}

impl Feed {
    pub fn new(repo: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            product: product.into(),
        }
    }

    pub fn defaults() -> Vec<Feed> {
        vec![
            Feed::new("spring-projects/spring-boot", "Spring Boot"),
            Feed::new("spring-projects/spring-framework", "Spring Framework"),
        ]
    }
}

/// Release-note categories, in the order headings are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Breaking,
    Deprecated,
    Dependency,
    Features,
    BugFixes,
    Docs,
    Contributors,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Breaking,
        Category::Deprecated,
        Category::Dependency,
        Category::Features,
        Category::BugFixes,
        Category::Docs,
        Category::Contributors,
    ];

    /// Order used when rendering a notification.
    pub const DISPLAY_ORDER: [Category; 7] = [
        Category::Breaking,
        Category::Deprecated,
        Category::Features,
        Category::BugFixes,
        Category::Dependency,
        Category::Docs,
        Category::Contributors,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Breaking => "Breaking",
            Category::Deprecated => "Deprecated",
            Category::Dependency => "Dependency",
            Category::Features => "Features",
            Category::BugFixes => "BugFixes",
            Category::Docs => "Docs",
            Category::Contributors => "Contributors",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Breaking => "Breaking",
            Category::Deprecated => "Deprecated",
            Category::Dependency => "Dependency Upgrades",
            Category::Features => "New Features",
            Category::BugFixes => "Bug Fixes",
            Category::Docs => "Documentation",
            Category::Contributors => "Contributors",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Bullets extracted per category. Every category is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMap {
    sections: HashMap<Category, Vec<String>>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self {
            sections: Category::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    pub fn get(&self, category: Category) -> &[String] {
        self.sections
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn set(&mut self, category: Category, bullets: Vec<String>) {
        self.sections.insert(category, bullets);
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}

impl Default for SectionMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Feed id (`owner/repo`) to the last tag announced for it.
pub type LastSeenState = BTreeMap<String, String>;

/// Generated summary and the provider that wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub provider: String,
    pub text: String,
}

/// A webhook payload: fallback text plus Block Kit blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub text: String,
    pub blocks: Vec<serde_json::Value>,
}

/// How notifications are grouped into webhook posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendMode {
    #[default]
    Combined,
    PerRepo,
}

impl SendMode {
    /// Unknown values fall back to `Combined`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "per_repo" => SendMode::PerRepo,
            _ => SendMode::Combined,
        }
    }
}
