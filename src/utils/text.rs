use std::sync::LazyLock;

use regex::Regex;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(\x07|\x1b\\)|\x1b[@-Z\\-_]")
        .expect("valid escape pattern")
});

/// Strip terminal control sequences from text that came from the network.
///
/// Quiz titles, questions and grader feedback are printed straight to the
/// terminal. Escape sequences and other control characters are removed;
/// newlines and tabs are kept.
pub fn sanitize(input: &str) -> String {
    let without_escapes = ANSI_ESCAPE.replace_all(input, "");
    without_escapes
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Collapse text to a single line, for list rows.
pub fn one_line(input: &str) -> String {
    sanitize(input).split_whitespace().collect::<Vec<_>>().join(" ")
}
