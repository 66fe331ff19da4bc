//! Line patterns recognised in triage documents.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::{BuildLabel, Category, MagnitudeNote};

static DATE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:#{1,6}\s*)?(\d{4}-\d{2}-\d{2})\b").unwrap());
static AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^triage\s+done\s+by\b:?\s*(.*)$").unwrap());
static REVISION_RANGE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^revision\s+range\b").unwrap());
static REVISION_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^revision\s+range:?\s*\[([^\]]*)\]\(([^)\s]+)\)").unwrap()
});
static SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s+regressions?\s*,\s*(\d+)\s+improvements?\s*,\s*(\d+)\s+mixed\b")
        .unwrap()
});
static SUMMARY_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bregressions?\b.*\bimprovements?\b.*\bmixed\b").unwrap()
});
static ROLLUPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s+of\s+them\s+in\s+rollups?\b").unwrap());
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}(?:\s+(.*))?$").unwrap());
static ISSUE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[#(\d+)\]\(([^)\s]+)\)").unwrap());
static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]?\d+(?:\.\d+)?)\s?%").unwrap());
static BUILD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bon\s+`([^`]+)`\s+builds?\s+of\s+`([^`]+)`").unwrap()
});
static COMPARE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(([^)\s]*compare\.html[^)\s]*)\)").unwrap());

/// Kind of a recognised section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    Category(Category),
    Nags,
}

/// A line that opens a new section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SectionStart {
    Known(SectionKind),
    Unknown(String),
}

/// Date string of a dated title line.
pub(crate) fn date_title(line: &str) -> Option<&str> {
    DATE_TITLE
        .captures(line.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Triager handle from an attribution line: `Triage done by **@handle**.`
pub(crate) fn author(line: &str) -> Option<String> {
    let caps = AUTHOR.captures(line)?;
    let raw = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let handle = raw
        .trim()
        .trim_end_matches('.')
        .replace('*', "")
        .trim()
        .trim_start_matches('@')
        .trim()
        .to_string();
    Some(handle)
}

pub(crate) fn is_revision_range_line(line: &str) -> bool {
    REVISION_RANGE_LABEL.is_match(line)
}

/// `(range text, link)` from `Revision range: [start..end](link)`.
pub(crate) fn revision_range(line: &str) -> Option<(&str, &str)> {
    let caps = REVISION_RANGE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Raw count strings of a summary line.
pub(crate) fn summary(line: &str) -> Option<[&str; 3]> {
    let caps = SUMMARY.captures(line)?;
    Some([
        caps.get(1)?.as_str(),
        caps.get(2)?.as_str(),
        caps.get(3)?.as_str(),
    ])
}

/// A line that names all three categories without matching the summary pattern.
pub(crate) fn looks_like_summary(line: &str) -> bool {
    SUMMARY_LIKE.is_match(line)
}

pub(crate) fn rollups(line: &str) -> Option<&str> {
    ROLLUPS
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn known_section(name: &str) -> Option<SectionKind> {
    let normalized = name
        .trim()
        .trim_end_matches(':')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace("follow-up", "follow up");
    match normalized.as_str() {
        "regressions" | "regression" => Some(SectionKind::Category(Category::Regression)),
        "improvements" | "improvement" => Some(SectionKind::Category(Category::Improvement)),
        "mixed" => Some(SectionKind::Category(Category::Mixed)),
        "nags requiring follow up" | "nags requiring followup" | "nags" => {
            Some(SectionKind::Nags)
        }
        _ => None,
    }
}

/// Section header, either `#`-prefixed or a bare known section name.
///
/// Bulleted lines are never headers, whatever their text.
pub(crate) fn section_start(line: &str) -> Option<SectionStart> {
    if bullet_text(line).is_some() {
        return None;
    }
    let trimmed = line.trim();
    if let Some(caps) = HEADING.captures(trimmed) {
        let name = caps
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or("")
            .trim_end_matches('#')
            .trim();
        return Some(match known_section(name) {
            Some(kind) => SectionStart::Known(kind),
            None => SectionStart::Unknown(name.to_string()),
        });
    }
    known_section(trimmed).map(SectionStart::Known)
}

/// Text of a bulleted line, without its marker.
pub(crate) fn bullet_text(line: &str) -> Option<&str> {
    let s = line.trim_start();
    ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| s.strip_prefix(marker))
        .map(str::trim)
}

pub(crate) fn is_indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

/// Head line of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntryStart {
    pub issue_ref: u64,
    pub issue_link: String,
    pub title: String,
    /// Text after the issue link, kept as the first narrative line
    pub trailer: Option<String>,
}

/// Recognise an entry head line.
///
/// Only non-indented lines qualify. A plain line carrying an issue link
/// opens an entry (the last link on the line is the entry's); a bullet opens
/// one only when its text begins with the link.
pub(crate) fn entry_start(line: &str) -> Option<EntryStart> {
    if is_indented(line) {
        return None;
    }
    if let Some(text) = bullet_text(line) {
        let caps = ISSUE_LINK.captures(text)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 {
            return None;
        }
        return Some(EntryStart {
            issue_ref: caps[1].parse().ok()?,
            issue_link: caps[2].to_string(),
            title: text[whole.end()..].trim().to_string(),
            trailer: None,
        });
    }

    let text = line.trim();
    let caps = ISSUE_LINK.captures_iter(text).last()?;
    let whole = caps.get(0)?;
    let before = text[..whole.start()].trim();
    let after = text[whole.end()..].trim();
    let (title, trailer) = if before.is_empty() {
        (after.to_string(), None)
    } else {
        (
            before.to_string(),
            (!after.is_empty()).then(|| after.to_string()),
        )
    };
    Some(EntryStart {
        issue_ref: caps[1].parse().ok()?,
        issue_link: caps[2].to_string(),
        title,
        trailer,
    })
}

/// Extract percentage, build label and comparison link from an observation.
pub(crate) fn annotate_note(text: String) -> MagnitudeNote {
    let percent = PERCENT
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok());
    let build = BUILD.captures(&text).map(|caps| BuildLabel {
        scenario: caps[1].to_string(),
        benchmark: caps[2].to_string(),
    });
    let comparison_link = COMPARE_LINK
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    MagnitudeNote {
        text,
        percent,
        build,
        comparison_link,
    }
}
