use once_cell::sync::Lazy;
use regex::Regex;

// `.` does not cross newlines, so each marker is removed within a single line.
static SECTION_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"==+.*?==+").unwrap());
static BRACKETED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());
static TEMPLATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{.*?\}\}").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+").unwrap());
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Normalize CRLF/CR line endings to LF.
pub fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Strip wiki markup from a scraped page and tidy its whitespace.
///
/// Removes `== section ==` markers, `[edit]`-style bracketed annotations,
/// `{{template}}` blocks and bare `http…` URLs, then caps blank-line runs at
/// one empty line and collapses horizontal whitespace.
pub fn clean_text(text: &str) -> String {
    let text = normalize_newlines(text);
    let text = SECTION_MARKER_RE.replace_all(&text, "");
    let text = BRACKETED_RE.replace_all(&text, "");
    let text = TEMPLATE_RE.replace_all(&text, "");
    let text = URL_RE.replace_all(&text, "");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    let text = HSPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_markup_and_urls() {
        let raw = "== Sutra Sthana ==\nVata is dry [edit] and light {{cite web}} see https://example.org/x now";
        assert_eq!(clean_text(raw), "Vata is dry and light see now");
    }

    #[test]
    fn collapses_blank_lines_and_spaces() {
        let raw = "  first\t\tline\n\n\n\n\nsecond   line  ";
        assert_eq!(clean_text(raw), "first line\n\nsecond line");
    }

    #[test]
    fn section_marker_does_not_span_lines() {
        let raw = "a == b\nc == d";
        assert_eq!(clean_text(raw), "a == b\nc == d");
    }

    #[test]
    fn crlf_is_normalized_before_cleaning() {
        assert_eq!(clean_text("one\r\n\r\n\r\n\r\ntwo"), "one\n\ntwo");
    }
}
