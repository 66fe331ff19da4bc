//! CLI command handler for `render`.

use std::path::PathBuf;

use crate::parse::parse;
use crate::render::render_markdown;
use crate::{TriageError, TriageResult, write_text};

/// Run the `render` command: parse a document and print its canonical form.
pub fn run(file: PathBuf, output: Option<PathBuf>) -> TriageResult<String> {
    let text = std::fs::read_to_string(&file).map_err(|e| {
        TriageError::Message(format!("failed to read {}: {e}", file.display()))
    })?;

    let log = parse(&text)?;
    let markdown = render_markdown(&log);

    match output {
        Some(path) => {
            write_text(&path, &markdown)?;
            eprintln!("Wrote canonical log to {}", path.display());
        }
        None => print!("{}", markdown),
    }

    Ok(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_stable_on_its_own_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.md");
        let first = dir.path().join("first.md");
        std::fs::write(
            &input,
            "2021-02-02 Triage Log\n\n\
             Triage done by **@tester**.\n\
             Revision range: [1111111111111111111111111111111111111111..2222222222222222222222222222222222222222](https://perf.example/?start=1111111111111111111111111111111111111111&end=2222222222222222222222222222222222222222&absolute=false&stat=instructions:u)\n\n\
             0 Regressions, 0 Improvements, 0 Mixed\n",
        )
        .unwrap();

        let rendered = run(input, Some(first.clone())).unwrap();
        assert!(rendered.starts_with("# 2021-02-02 Triage Log\n"));
        let again = run(first, None).unwrap();
        assert_eq!(rendered, again);
    }
}
