//! Canonical Markdown rendering of a `TriageLog`.
//!
//! The output is not byte-identical to the source document, but parsing it
//! yields the same `TriageLog`. Links are emitted verbatim.

use crate::core::{Category, SectionNote, TriageEntry, TriageLog};
use crate::parse::opens_entry;

/// Heading used for the nags section.
pub const NAGS_HEADING: &str = "Nags requiring follow up";

/// Render a log in the canonical Markdown shape.
pub fn render_markdown(log: &TriageLog) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {} Triage Log\n\n", log.date_string()));
    out.push_str(&format!("Triage done by **@{}**.\n", log.author));
    out.push_str(&format!(
        "Revision range: [{}]({})\n\n",
        log.revision_range, log.comparison_link
    ));

    out.push_str(&format!("{}\n", log.summary_counts));
    if let Some(rollups) = log.rollups {
        out.push_str(&format!("{} of them in rollups\n", rollups));
    }
    out.push('\n');

    for line in &log.synopsis {
        out.push_str(line);
        out.push_str("\n\n");
    }

    // Consecutive entries of one category share a section, so document
    // order survives the round trip.
    let mut rendered: Vec<Category> = Vec::new();
    let mut current: Option<Category> = None;
    for entry in &log.entries {
        if current != Some(entry.category) {
            current = Some(entry.category);
            push_section_heading(&mut out, entry.category);
            if !rendered.contains(&entry.category) {
                rendered.push(entry.category);
                push_section_notes(&mut out, log.notes_in(entry.category));
            }
        }
        push_entry(&mut out, entry);
    }

    for category in Category::ALL {
        if !rendered.contains(&category) {
            push_section_heading(&mut out, category);
            push_section_notes(&mut out, log.notes_in(category));
        }
    }

    out.push_str(&format!("#### {}\n\n", NAGS_HEADING));
    for nag in &log.nags {
        out.push_str(&format!("- {}\n", nag));
    }

    out
}

fn push_section_heading(out: &mut String, category: Category) {
    out.push_str(&format!("#### {}\n\n", category.heading()));
}

fn push_section_notes<'a>(out: &mut String, notes: impl Iterator<Item = &'a SectionNote>) {
    let mut any = false;
    for note in notes {
        out.push_str(&bullet(&note.text));
        any = true;
    }
    if any {
        out.push('\n');
    }
}

fn push_entry(out: &mut String, entry: &TriageEntry) {
    let link = format!("[#{}]({})", entry.issue_ref, entry.issue_link);
    if entry.title.is_empty() {
        out.push_str(&format!("{}\n", link));
    } else {
        out.push_str(&format!("{} {}\n", entry.title, link));
    }
    for line in entry.narrative.lines() {
        if opens_entry(line) {
            out.push_str("  ");
        }
        out.push_str(line);
        out.push('\n');
    }
    for note in &entry.magnitude_notes {
        out.push_str(&bullet(&note.text));
    }
    out.push('\n');
}

/// A bullet line that never reads back as an entry head.
fn bullet(text: &str) -> String {
    let line = format!("- {}", text);
    if opens_entry(&line) {
        format!("  {}\n", line)
    } else {
        format!("{}\n", line)
    }
}
