//! Canonical rendering re-parses to the same log.

use perf_triage::{parse, render_markdown};

fn assert_round_trip(text: &str) {
    let log = parse(text).unwrap();
    let rendered = render_markdown(&log);
    let reparsed = parse(&rendered).unwrap();
    assert_eq!(reparsed, log);
    // Rendering is a fixed point after the first pass
    assert_eq!(render_markdown(&reparsed), rendered);
}

#[test]
fn test_round_trip_2021_01_05() {
    assert_round_trip(include_str!("fixtures/2021-01-05.md"));
}

#[test]
fn test_round_trip_2020_12_03() {
    assert_round_trip(include_str!("fixtures/2020-12-03.md"));
}

#[test]
fn test_render_normalizes_bare_headings() {
    let log = parse(include_str!("fixtures/2020-12-03.md")).unwrap();
    let rendered = render_markdown(&log);
    assert!(rendered.starts_with("# 2020-12-03 Triage Log\n"));
    assert!(rendered.contains("\n#### Regressions\n"));
    assert!(rendered.contains("2 Regressions, 2 Improvements, 2 Mixed\n"));
}

#[test]
fn test_round_trip_text_that_looks_like_structure() {
    use perf_triage::config::LinkConfig;
    use perf_triage::core::links::{comparison_link, issue_link};
    use perf_triage::core::{
        Category, MagnitudeNote, RevisionRange, SectionNote, SummaryCounts, TriageEntry, TriageLog,
    };
    use time::macros::date;

    let links = LinkConfig::default();
    let range = RevisionRange::new("c".repeat(40), "d".repeat(40));
    let mut log = TriageLog::new(
        date!(2021 - 02 - 16),
        "tester",
        range.clone(),
        comparison_link(&links, &range),
    );
    log.summary_counts = SummaryCounts::new(1, 0, 0);
    log.synopsis = vec!["- Mixed".to_string()];

    let awkward = [
        "Mixed",
        "Improvements",
        "Nags requiring follow-up",
        "[#9](https://issues.example/compiler/issues/9) did it",
        "#### Regressions",
        "#80530 landed",
    ];
    let note = |text: &str| MagnitudeNote {
        text: text.to_string(),
        percent: None,
        build: None,
        comparison_link: None,
    };

    log.entries.push(TriageEntry {
        issue_ref: 8,
        issue_link: issue_link(&links, 8),
        title: "Tweak inlining".to_string(),
        category: Category::Regression,
        magnitude_notes: awkward.iter().map(|t| note(t)).collect(),
        narrative: String::new(),
    });
    for category in [Category::Improvement, Category::Mixed] {
        for text in awkward {
            log.section_notes.push(SectionNote {
                category,
                text: text.to_string(),
            });
        }
    }
    log.nags = awkward.iter().map(|t| t.to_string()).collect();

    let rendered = render_markdown(&log);
    let reparsed = parse(&rendered).unwrap();
    assert_eq!(reparsed, log);
    assert_eq!(render_markdown(&reparsed), rendered);
}
