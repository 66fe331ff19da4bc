//! Hyperlink conventions used by triage logs.
//!
//! Logs carry their links verbatim; these helpers derive the canonical form
//! from configuration so that new logs can be scaffolded and existing links
//! checked against the hashes and issue numbers they display.

use super::schema::RevisionRange;
use crate::config::LinkConfig;

/// Revision-range comparison link: `<perf_base>/?start=..&end=..&absolute=false&stat=..`
pub fn comparison_link(links: &LinkConfig, range: &RevisionRange) -> String {
    format!(
        "{}/?start={}&end={}&absolute=false&stat={}",
        links.perf_base.trim_end_matches('/'),
        range.start,
        range.end,
        links.stat
    )
}

/// Per-entry comparison link: `<perf_base>/compare.html?start=..&end=..&stat=..`
pub fn compare_link(links: &LinkConfig, start: &str, end: &str) -> String {
    format!(
        "{}/compare.html?start={}&end={}&stat={}",
        links.perf_base.trim_end_matches('/'),
        start,
        end,
        links.stat
    )
}

/// Issue link: `<issues_base>/<project>/issues/<number>`
pub fn issue_link(links: &LinkConfig, number: u64) -> String {
    format!(
        "{}/{}/issues/{}",
        links.issues_base.trim_end_matches('/'),
        links.project,
        number
    )
}

/// Value of a query parameter, if present.
pub fn query_param<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then_some(v)
    })
}

/// Issue number at the end of an issue/PR link.
pub fn trailing_number(url: &str) -> Option<u64> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}
