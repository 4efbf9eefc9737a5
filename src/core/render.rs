//! Block Kit rendering of release announcements.

use crate::domain::model::{Category, ChatMessage, Release, ReleaseSummary, SectionMap};
use crate::utils::text::truncate_chars;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

const FALLBACK_TEXT: &str = "Release update";
const MAX_SUMMARY_CHARS: usize = 2700;
const EXCERPT_LINES: usize = 8;
const MAX_EXCERPT_CHARS: usize = 1200;

/// Wrap rendered blocks into a postable message.
pub fn message(blocks: Vec<Value>) -> ChatMessage {
    ChatMessage {
        text: FALLBACK_TEXT.to_string(),
        blocks,
    }
}

/// Blocks announcing one release. `max_bullets` caps each category again at
/// render time so callers can pass any section map.
pub fn release_blocks(
    product: &str,
    release: &Release,
    sections: &SectionMap,
    summary: Option<&ReleaseSummary>,
    max_bullets: usize,
) -> Vec<Value> {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {"type": "plain_text", "text": format!("{} update: {}", product, release.tag_name)}
        }),
        mrkdwn_section(format!("<{}|Open release notes>", release.html_url)),
    ];

    let mut context = Vec::new();
    if let Some(published) = release.published_at.as_deref() {
        context.push(format!("Published: {}", format_published(published)));
    }
    if release.prerelease {
        context.push("Prerelease".to_string());
    }
    if !context.is_empty() {
        blocks.push(json!({
            "type": "context",
            "elements": [{"type": "mrkdwn", "text": context.join(" · ")}]
        }));
    }

    if let Some(summary) = summary {
        let text = summary.text.trim();
        if !text.is_empty() {
            blocks.push(mrkdwn_section(format!(
                "*AI summary ({})*\n{}",
                summary.provider,
                truncate_chars(text, MAX_SUMMARY_CHARS)
            )));
        }
    }

    for category in Category::DISPLAY_ORDER {
        let items = sections.get(category);
        if items.is_empty() {
            continue;
        }
        let shown = &items[..items.len().min(max_bullets)];
        blocks.push(mrkdwn_section(format!(
            "*{}*\n{}",
            category.label(),
            shown.join("\n")
        )));
    }

    if sections.is_empty() {
        let excerpt = release
            .body
            .lines()
            .filter(|l| !l.trim().is_empty())
            .take(EXCERPT_LINES)
            .collect::<Vec<_>>()
            .join("\n");
        let excerpt = excerpt.trim();
        if !excerpt.is_empty() {
            blocks.push(mrkdwn_section(format!(
                "*Excerpt*\n```{}```",
                truncate_chars(excerpt, MAX_EXCERPT_CHARS)
            )));
        }
    }

    blocks.push(json!({"type": "divider"}));
    blocks
}

fn mrkdwn_section(text: String) -> Value {
    json!({"type": "section", "text": {"type": "mrkdwn", "text": text}})
}

fn format_published(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| {
            dt.with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M UTC")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}
