//! Heuristic extraction of well-known sections from release-note markdown.
//!
//! Headings are located first, in their own pass, and bullets are collected
//! afterwards by walking forward from each heading until a heading of the
//! same or a shallower level. Output per category is capped, which bounds the
//! result no matter how large the input is.

use crate::domain::model::{Category, SectionMap};
use crate::utils::error::{NotifierError, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::sync::LazyLock;

pub const DEFAULT_MAX_BULLETS: usize = 8;

/// Longest unmarked line still accepted as a change note.
const MAX_PROSE_LEN: usize = 120;

const BULLET: &str = "• ";

const DEFAULT_PATTERNS: &[(Category, &[&str])] = &[
    (
        Category::Breaking,
        &[
            r"^#+\s*Breaking\s+Changes\b",
            r"^#+\s*Breaking\b",
            r"^#+\s*Incompatible\s+Changes\b",
            r"^#+\s*Changes\s+in\s+Behavior\b",
        ],
    ),
    (
        Category::Deprecated,
        &[r"^#+\s*Deprecations?\b", r"^#+\s*Deprecated\b"],
    ),
    (
        Category::Dependency,
        &[
            r"^#+\s*(?::\w+:\s*)?Dependency\s+Upgrades?\b",
            r"^#+\s*Dependencies\b",
            r"^#+\s*Upgrades?\b",
            r"^#+\s*BOM\s+Updates\b",
        ],
    ),
    (
        Category::Features,
        &[
            r"^#+\s*(?::\w+:\s*)?New\s+Features\b",
            r"^#+\s*Features\b",
            r"^#+\s*Enhancements?\b",
            r"^#+\s*What'?s\s+New\b",
        ],
    ),
    (
        Category::BugFixes,
        &[
            r"^#+\s*(?::\w+:\s*)?Bug\s+Fixes\b",
            r"^#+\s*Fixes\b",
            r"^#+\s*Bugs\b",
            r"^#+\s*Bugfix(es)?\b",
        ],
    ),
    (
        Category::Docs,
        &[r"^#+\s*(?::\w+:\s*)?Documentation\b", r"^#+\s*Docs\b"],
    ),
    (
        Category::Contributors,
        &[r"^#+\s*(?::\w+:\s*)?Contributors\b", r"^#+\s*Thanks\b"],
    ),
];

static DEFAULT_RULES: LazyLock<Vec<SectionRule>> = LazyLock::new(|| {
    DEFAULT_PATTERNS
        .iter()
        .map(|(category, patterns)| {
            SectionRule::compile(*category, patterns.iter().copied())
                .expect("built-in section patterns are valid")
        })
        .collect()
});

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*+]|\d+\.)\s+").expect("list item pattern is valid"));

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+)\s+").expect("heading pattern is valid"));

/// Heading alternatives for one category, tried in order.
#[derive(Debug, Clone)]
pub struct SectionRule {
    category: Category,
    patterns: Vec<Regex>,
}

impl SectionRule {
    pub fn compile<'a>(
        category: Category,
        patterns: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| NotifierError::InvalidConfigValueError {
                        field: format!("sections.{}", category.key()),
                        value: pattern.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { category, patterns })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    fn matches(&self, line: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(line))
    }
}

/// The category table plus the per-category bullet cap.
#[derive(Debug, Clone)]
pub struct SectionRules {
    rules: Vec<SectionRule>,
    max_bullets: usize,
}

impl SectionRules {
    /// Rules are consulted in the order given; the first match claims a line.
    pub fn new(rules: Vec<SectionRule>, max_bullets: usize) -> Self {
        Self { rules, max_bullets }
    }

    pub fn from_patterns(
        table: &[(Category, Vec<String>)],
        max_bullets: usize,
    ) -> Result<Self> {
        let rules = table
            .iter()
            .map(|(category, patterns)| {
                SectionRule::compile(*category, patterns.iter().map(String::as_str))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules, max_bullets))
    }

    pub fn with_max_bullets(mut self, max_bullets: usize) -> Self {
        self.max_bullets = max_bullets;
        self
    }

    pub fn max_bullets(&self) -> usize {
        self.max_bullets
    }

    fn classify(&self, line: &str) -> Option<Category> {
        self.rules
            .iter()
            .find(|rule| rule.matches(line))
            .map(SectionRule::category)
    }
}

impl Default for SectionRules {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.clone(), DEFAULT_MAX_BULLETS)
    }
}

pub fn extract_sections(markdown: &str, rules: &SectionRules) -> SectionMap {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut out = SectionMap::new();

    for (category, start) in find_headings(&lines, rules) {
        out.set(category, collect_bullets(&lines, start, rules.max_bullets()));
    }

    out
}

/// First heading line per category, in document order.
fn find_headings(lines: &[&str], rules: &SectionRules) -> Vec<(Category, usize)> {
    let mut seen = HashSet::new();
    let mut headings = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if let Some(category) = rules.classify(line.trim()) {
            if seen.insert(category) {
                headings.push((category, idx));
            }
        }
    }

    headings
}

fn collect_bullets(lines: &[&str], start: usize, max_bullets: usize) -> Vec<String> {
    let start_level = lines[start]
        .trim()
        .chars()
        .take_while(|c| *c == '#')
        .count();
    let mut bullets = Vec::new();

    for raw in &lines[start + 1..] {
        if bullets.len() >= max_bullets {
            break;
        }

        let line = raw.trim();
        if let Some(level) = heading_level(line) {
            if level <= start_level {
                break;
            }
        }
        if line.is_empty() {
            continue;
        }

        if let Some(marker) = LIST_ITEM.find(line) {
            bullets.push(format!("{}{}", BULLET, &line[marker.end()..]));
        } else if is_change_note(line) {
            bullets.push(format!("{}{}", BULLET, line));
        }
    }

    bullets
}

fn heading_level(line: &str) -> Option<usize> {
    ATX_HEADING.captures(line).map(|caps| caps[1].len())
}

fn is_change_note(line: &str) -> bool {
    if line.chars().count() > MAX_PROSE_LEN {
        return false;
    }
    let lower = line.to_lowercase();
    line.contains(':') || lower.contains("removed") || lower.contains("deprecated")
}
