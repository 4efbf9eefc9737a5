//! Tag parsing and the "is this release newer" check.
//!
//! Upstream tags are not guaranteed to be semver (`v3.2`, `2.0.0-RC1`,
//! `nightly`), so parsing is lenient and never fails: anything without a
//! leading number becomes `0.0.0` with the whole tag as suffix.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^[vV]?([0-9]+)(?:\.([0-9]+))?(?:\.([0-9]+))?(.*)$")
        .expect("tag pattern is valid")
});

/// One numeric component, kept as its digits so arbitrarily long numbers
/// still order exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionNumber(String);

impl VersionNumber {
    fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Self("0".to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `None` when the component does not fit in a `u64`.
    pub fn to_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<u64> for VersionNumber {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    pub major: VersionNumber,
    pub minor: VersionNumber,
    pub patch: VersionNumber,
    pub suffix: String,
}

impl ParsedVersion {
    pub fn new(major: u64, minor: u64, patch: u64, suffix: impl Into<String>) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
            patch: patch.into(),
            suffix: suffix.into(),
        }
    }

    pub fn triple(&self) -> (&VersionNumber, &VersionNumber, &VersionNumber) {
        (&self.major, &self.minor, &self.patch)
    }

    /// Numeric triple first; on a tie a stable release beats any suffixed
    /// one, and two suffixes compare as plain strings (so `rc.10` < `rc.2`).
    pub fn is_newer_than(&self, other: &ParsedVersion) -> bool {
        match self.triple().cmp(&other.triple()) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match (self.suffix.is_empty(), other.suffix.is_empty()) {
                _ if self.suffix == other.suffix => false,
                (true, false) => true,
                (false, true) => false,
                _ => self.suffix > other.suffix,
            },
        }
    }
}

pub fn parse(tag: &str) -> ParsedVersion {
    let Some(caps) = TAG_PATTERN.captures(tag.trim()) else {
        return ParsedVersion::new(0, 0, 0, tag);
    };

    let number = |idx: usize| {
        caps.get(idx)
            .map(|m| VersionNumber::from_digits(m.as_str()))
            .unwrap_or_else(|| VersionNumber::from(0))
    };
    let suffix = caps.get(4).map(|m| m.as_str().trim()).unwrap_or_default();

    ParsedVersion {
        major: number(1),
        minor: number(2),
        patch: number(3),
        suffix: suffix.to_string(),
    }
}

/// Whether tag `a` should be announced over previously seen tag `b`.
pub fn is_newer(a: &str, b: &str) -> bool {
    parse(a).is_newer_than(&parse(b))
}
