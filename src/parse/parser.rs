use tracing::debug;

use super::ParseError;
use super::patterns::{self, EntryStart, SectionKind, SectionStart};
use crate::core::schema::parse_date;
use crate::core::{Category, RevisionRange, SectionNote, SummaryCounts, TriageEntry, TriageLog};

/// Parse one triage document.
///
/// # Errors
/// Returns an error if:
/// - The first non-blank line is not a dated title, or the date is invalid
/// - The attribution or revision-range line is missing or malformed
/// - The summary counts line is missing or not numeric
/// - A section header names an unknown section
pub fn parse(text: &str) -> Result<TriageLog, ParseError> {
    let lines: Vec<&str> = text.lines().collect();

    let title_idx = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .ok_or_else(|| ParseError::header("document is empty"))?;
    let title = lines[title_idx].trim();
    let date_str = patterns::date_title(title)
        .ok_or_else(|| ParseError::header(format!("`{title}` is not a dated title")))?;
    let date = parse_date(date_str)
        .ok_or_else(|| ParseError::header(format!("invalid date `{date_str}`")))?;

    let body_start = lines[title_idx + 1..]
        .iter()
        .position(|l| patterns::section_start(l).is_some())
        .map(|p| p + title_idx + 1)
        .unwrap_or(lines.len());

    let header = read_header(&lines[title_idx + 1..body_start])?;

    let mut body = BodyParser::default();
    for (offset, line) in lines[body_start..].iter().enumerate() {
        body.feed(line, body_start + offset + 1)?;
    }
    let (entries, mut section_notes, nags) = body.finish();
    section_notes.sort_by_key(|n| n.category);

    let log = TriageLog {
        date,
        author: header.author,
        revision_range: header.revision_range,
        comparison_link: header.comparison_link,
        summary_counts: header.summary_counts,
        rollups: header.rollups,
        synopsis: header.synopsis,
        entries,
        section_notes,
        nags,
    };
    debug!(
        date = %log.date_string(),
        entries = log.entries.len(),
        nags = log.nags.len(),
        "parsed triage log"
    );
    Ok(log)
}

struct Header {
    author: String,
    revision_range: RevisionRange,
    comparison_link: String,
    summary_counts: SummaryCounts,
    rollups: Option<u32>,
    synopsis: Vec<String>,
}

fn read_header(lines: &[&str]) -> Result<Header, ParseError> {
    let mut author: Option<String> = None;
    let mut range: Option<(RevisionRange, String)> = None;
    let mut summary: Option<SummaryCounts> = None;
    let mut summary_candidate: Option<String> = None;
    let mut rollups: Option<u32> = None;
    let mut synopsis = Vec::new();

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if author.is_none() {
            if let Some(handle) = patterns::author(line) {
                if handle.is_empty() {
                    return Err(ParseError::header("attribution line names no triager"));
                }
                author = Some(handle);
                continue;
            }
        }

        if range.is_none() && patterns::is_revision_range_line(line) {
            range = Some(read_revision_range(line)?);
            continue;
        }

        if summary.is_none() {
            if let Some(counts) = patterns::summary(line) {
                summary = Some(read_counts(line, counts)?);
                if rollups.is_none() {
                    rollups = patterns::rollups(line).and_then(|n| n.parse().ok());
                }
                continue;
            }
        }

        if rollups.is_none() {
            if let Some(n) = patterns::rollups(line).and_then(|n| n.parse().ok()) {
                rollups = Some(n);
                continue;
            }
        }

        if summary_candidate.is_none() && patterns::looks_like_summary(line) {
            summary_candidate = Some(line.to_string());
        }
        synopsis.push(line.to_string());
    }

    let author = author.ok_or_else(|| ParseError::header("missing author attribution"))?;
    let (revision_range, comparison_link) =
        range.ok_or_else(|| ParseError::header("missing revision range"))?;
    let summary_counts = summary.ok_or(ParseError::MalformedSummaryLine {
        line: summary_candidate,
    })?;

    Ok(Header {
        author,
        revision_range,
        comparison_link,
        summary_counts,
        rollups,
        synopsis,
    })
}

fn read_revision_range(line: &str) -> Result<(RevisionRange, String), ParseError> {
    let (text, link) = patterns::revision_range(line)
        .ok_or_else(|| ParseError::header(format!("malformed revision range `{line}`")))?;
    let (start, end) = text
        .split_once("..")
        .ok_or_else(|| ParseError::header(format!("revision range `{text}` has no `..`")))?;
    let (start, end) = (start.trim(), end.trim());
    for hash in [start, end] {
        if !RevisionRange::is_valid_hash(hash) {
            return Err(ParseError::header(format!(
                "revision `{hash}` is not a {}-character hex hash",
                crate::core::HASH_LEN
            )));
        }
    }
    Ok((RevisionRange::new(start, end), link.to_string()))
}

fn read_counts(line: &str, counts: [&str; 3]) -> Result<SummaryCounts, ParseError> {
    let malformed = || ParseError::MalformedSummaryLine {
        line: Some(line.to_string()),
    };
    let [r, i, m] = counts;
    Ok(SummaryCounts::new(
        r.parse().map_err(|_| malformed())?,
        i.parse().map_err(|_| malformed())?,
        m.parse().map_err(|_| malformed())?,
    ))
}

struct EntryBuilder {
    category: Category,
    start: EntryStart,
    notes: Vec<String>,
    narrative: Vec<String>,
}

impl EntryBuilder {
    fn new(category: Category, start: EntryStart) -> Self {
        let narrative = start.trailer.iter().cloned().collect();
        EntryBuilder {
            category,
            start,
            notes: Vec::new(),
            narrative,
        }
    }

    fn build(self) -> TriageEntry {
        TriageEntry {
            issue_ref: self.start.issue_ref,
            issue_link: self.start.issue_link,
            title: self.start.title,
            category: self.category,
            magnitude_notes: self.notes.into_iter().map(patterns::annotate_note).collect(),
            narrative: self.narrative.join("\n"),
        }
    }
}

#[derive(Default)]
struct BodyParser {
    section: Option<SectionKind>,
    entry: Option<EntryBuilder>,
    entries: Vec<TriageEntry>,
    section_notes: Vec<SectionNote>,
    nags: Vec<String>,
}

impl BodyParser {
    fn feed(&mut self, raw: &str, line_no: usize) -> Result<(), ParseError> {
        if let Some(start) = patterns::section_start(raw) {
            self.flush_entry();
            match start {
                SectionStart::Known(kind) => self.section = Some(kind),
                SectionStart::Unknown(header) => {
                    return Err(ParseError::UnrecognizedSection {
                        header,
                        line: line_no,
                    });
                }
            }
            return Ok(());
        }

        let line = raw.trim();
        if line.is_empty() {
            return Ok(());
        }

        match self.section {
            // The body always opens with a section header.
            None => {}
            Some(SectionKind::Nags) => {
                let nag = patterns::bullet_text(raw).unwrap_or(line);
                self.nags.push(nag.to_string());
            }
            Some(SectionKind::Category(category)) => {
                if let Some(start) = patterns::entry_start(raw) {
                    self.flush_entry();
                    self.entry = Some(EntryBuilder::new(category, start));
                    return Ok(());
                }
                match self.entry.as_mut() {
                    None => self.section_notes.push(SectionNote {
                        category,
                        text: patterns::bullet_text(raw).unwrap_or(line).to_string(),
                    }),
                    Some(entry) => {
                        if let Some(text) = patterns::bullet_text(raw) {
                            entry.notes.push(text.to_string());
                        } else if let (true, Some(last)) =
                            (patterns::is_indented(raw), entry.notes.last_mut())
                        {
                            last.push(' ');
                            last.push_str(line);
                        } else {
                            entry.narrative.push(line.to_string());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn flush_entry(&mut self) {
        if let Some(entry) = self.entry.take() {
            self.entries.push(entry.build());
        }
    }

    fn finish(mut self) -> (Vec<TriageEntry>, Vec<SectionNote>, Vec<String>) {
        self.flush_entry();
        (self.entries, self.section_notes, self.nags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const START: &str = "1111111111111111111111111111111111111111";
    const END: &str = "2222222222222222222222222222222222222222";

    fn header(summary: &str) -> String {
        format!(
            "# 2021-02-02 Triage Log\n\n\
             Triage done by **@tester**.\n\
             Revision range: [{START}..{END}](https://perf.example/?start={START}&end={END}&absolute=false&stat=instructions:u)\n\n\
             {summary}\n"
        )
    }

    #[test]
    fn test_empty_log() {
        let log = parse(&header("0 Regressions, 0 Improvements, 0 Mixed")).unwrap();
        assert_eq!(log.date, date!(2021 - 02 - 02));
        assert_eq!(log.author, "tester");
        assert_eq!(log.revision_range, RevisionRange::new(START, END));
        assert_eq!(log.summary_counts, SummaryCounts::default());
        assert!(log.entries.is_empty());
        assert!(log.nags.is_empty());
        assert!(log.synopsis.is_empty());
    }

    #[test]
    fn test_bare_title_is_accepted() {
        let text = header("0 Regressions, 0 Improvements, 0 Mixed").replacen("# ", "", 1);
        assert!(text.starts_with("2021-02-02 Triage Log"));
        let log = parse(&text).unwrap();
        assert_eq!(log.date, date!(2021 - 02 - 02));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse("  \n\n").unwrap_err(), ParseError::header("document is empty"));
    }

    #[test]
    fn test_undated_title() {
        let text = header("0 Regressions, 0 Improvements, 0 Mixed").replacen("2021-02-02", "Weekly", 1);
        assert!(matches!(parse(&text), Err(ParseError::MalformedHeader { .. })));
    }

    #[test]
    fn test_invalid_date() {
        let text = header("0 Regressions, 0 Improvements, 0 Mixed").replacen("2021-02-02", "2021-02-30", 1);
        let err = parse(&text).unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn test_missing_author() {
        let text = header("0 Regressions, 0 Improvements, 0 Mixed")
            .replace("Triage done by **@tester**.\n", "");
        assert_eq!(
            parse(&text).unwrap_err(),
            ParseError::header("missing author attribution")
        );
    }

    #[test]
    fn test_short_hash_is_malformed_header() {
        let text = header("0 Regressions, 0 Improvements, 0 Mixed")
            .replacen(&format!("[{START}.."), "[1111111..", 1);
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { .. }));
        assert!(err.to_string().contains("1111111"));
    }

    #[test]
    fn test_missing_summary_line() {
        let text = header("A quiet week.");
        assert_eq!(
            parse(&text).unwrap_err(),
            ParseError::MalformedSummaryLine { line: None }
        );
    }

    #[test]
    fn test_non_numeric_summary_line() {
        let text = header("two Regressions, 1 Improvement, 0 Mixed");
        assert_eq!(
            parse(&text).unwrap_err(),
            ParseError::MalformedSummaryLine {
                line: Some("two Regressions, 1 Improvement, 0 Mixed".to_string())
            }
        );
    }

    #[test]
    fn test_overflowing_count_is_malformed_summary() {
        let text = header("99999999999 Regressions, 1 Improvement, 0 Mixed");
        assert!(matches!(
            parse(&text),
            Err(ParseError::MalformedSummaryLine { line: Some(_) })
        ));
    }

    #[test]
    fn test_unrecognized_section_reports_line() {
        let text = format!(
            "{}\n#### Regressions\n\n#### Other news\n",
            header("0 Regressions, 0 Improvements, 0 Mixed")
        );
        let err = parse(&text).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnrecognizedSection {
                header: "Other news".to_string(),
                line: 10
            }
        );
    }

    #[test]
    fn test_entries_notes_and_narrative() {
        let text = format!(
            "{}\n#### Regressions\n\n\
             Some PR [#10](https://issues.example/compiler/issues/10)\n\
             - Large regression in [instruction counts](https://perf.example/compare.html?start=a&end=b&stat=instructions:u) (up to 5.5% on `full` builds of `syn-check`)\n  \
               which continues here.\n\
             Looks like more inlining.\n\n\
             #### Mixed\n\n\
             - [#11](https://issues.example/compiler/issues/11) Bullet entry\n\
             - Small changes either way.\n\n\
             #### Nags requiring follow up\n\n\
             - Ping on #10.\n\
             - Follow up on the hasher.\n",
            header("1 Regressions, 0 Improvements, 1 Mixed\n1 of them in rollups")
        );
        let log = parse(&text).unwrap();
        assert_eq!(log.rollups, Some(1));
        assert_eq!(log.entries.len(), 2);

        let first = &log.entries[0];
        assert_eq!(first.category, Category::Regression);
        assert_eq!(first.issue_ref, 10);
        assert_eq!(first.title, "Some PR");
        assert_eq!(first.magnitude_notes.len(), 1);
        assert!(first.magnitude_notes[0].text.ends_with("which continues here."));
        assert_eq!(first.magnitude_notes[0].percent, Some(5.5));
        assert_eq!(first.narrative, "Looks like more inlining.");

        let second = &log.entries[1];
        assert_eq!(second.category, Category::Mixed);
        assert_eq!(second.title, "Bullet entry");
        assert_eq!(second.magnitude_notes[0].text, "Small changes either way.");

        assert_eq!(log.nags, vec!["Ping on #10.", "Follow up on the hasher."]);
        assert!(!log.has_count_mismatch());
    }

    #[test]
    fn test_bullet_named_like_a_section_stays_in_its_entry() {
        let text = format!(
            "{}\n#### Regressions\n\n\
             PR [#3](https://issues.example/compiler/issues/3)\n\
             - Improvements\n\n\
             Other PR [#4](https://issues.example/compiler/issues/4)\n\
             * Mixed\n",
            header("2 Regressions, 0 Improvements, 0 Mixed")
        );
        let log = parse(&text).unwrap();
        let categories: Vec<Category> = log.entries.iter().map(|e| e.category).collect();
        assert_eq!(categories, vec![Category::Regression, Category::Regression]);
        assert_eq!(log.entries[0].magnitude_notes[0].text, "Improvements");
        assert_eq!(log.entries[1].magnitude_notes[0].text, "Mixed");
        assert!(!log.has_count_mismatch());
    }

    #[test]
    fn test_section_notes_are_kept_and_grouped() {
        let text = format!(
            "{}\n#### Mixed\n\nNothing mixed.\n\n#### Regressions\n\n- None this week.\n",
            header("0 Regressions, 0 Improvements, 0 Mixed")
        );
        let log = parse(&text).unwrap();
        assert_eq!(
            log.section_notes,
            vec![
                SectionNote {
                    category: Category::Regression,
                    text: "None this week.".to_string()
                },
                SectionNote {
                    category: Category::Mixed,
                    text: "Nothing mixed.".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_synopsis_is_kept() {
        let text = header("0 Regressions, 0 Improvements, 0 Mixed\n\nA quiet week overall.");
        let log = parse(&text).unwrap();
        assert_eq!(log.synopsis, vec!["A quiet week overall."]);
    }

    #[test]
    fn test_mismatched_counts_still_parse() {
        let text = format!(
            "{}\n#### Improvements\n\nPR [#3](https://issues.example/compiler/issues/3)\n",
            header("0 Regressions, 2 Improvements, 0 Mixed")
        );
        let log = parse(&text).unwrap();
        assert_eq!(log.summary_counts, SummaryCounts::new(0, 2, 0));
        assert_eq!(log.tallied_counts(), SummaryCounts::new(0, 1, 0));
    }
}
