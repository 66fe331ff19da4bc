//! CLI command handler for `new`.
//!
//! Scaffolds an empty triage log with the comparison link derived from the
//! configured link conventions.

use std::path::PathBuf;

use crate::config::LinkConfig;
use crate::core::links::comparison_link;
use crate::core::schema::parse_date;
use crate::core::{HASH_LEN, RevisionRange, TriageLog};
use crate::render::render_markdown;
use crate::{TriageError, TriageResult, write_text};

/// Build the empty log `new` would write.
pub fn scaffold(
    links: &LinkConfig,
    date: &str,
    author: &str,
    start: &str,
    end: &str,
) -> TriageResult<TriageLog> {
    let date = parse_date(date).ok_or_else(|| {
        TriageError::Message(format!("invalid date `{date}`, expected YYYY-MM-DD"))
    })?;

    for hash in [start, end] {
        if !RevisionRange::is_valid_hash(hash) {
            return Err(TriageError::Message(format!(
                "invalid revision `{hash}`, expected {HASH_LEN} hex digits"
            )));
        }
    }

    let author = author.trim().trim_start_matches('@');
    if author.is_empty() {
        return Err(TriageError::Message("author must not be empty".to_string()));
    }

    let range = RevisionRange::new(start, end);
    let link = comparison_link(links, &range);
    Ok(TriageLog::new(date, author, range, link))
}

/// Run the `new` command.
pub fn run(
    links: &LinkConfig,
    date: String,
    author: String,
    start: String,
    end: String,
    output: Option<PathBuf>,
) -> TriageResult<()> {
    let log = scaffold(links, &date, &author, &start, &end)?;
    let markdown = render_markdown(&log);

    match output {
        Some(path) => {
            if path.exists() {
                return Err(TriageError::Message(format!(
                    "refusing to overwrite {}",
                    path.display()
                )));
            }
            write_text(&path, &markdown)?;
            eprintln!("Created {} for {}", path.display(), log.date_string());
        }
        None => print!("{}", markdown),
    }

    Ok(())
}
