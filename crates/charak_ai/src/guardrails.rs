use std::collections::BTreeSet;

use charak_core::error::AppError;

use crate::prompts::REFUSAL_PHRASE;

/// Check that a generated answer cites at least one retrieved source title,
/// or uses the refusal phrase.
pub fn check_citations(answer: &str, sources: &BTreeSet<String>) -> Result<(), AppError> {
    let lowered = answer.to_lowercase();
    if lowered.contains(&REFUSAL_PHRASE.to_lowercase()) {
        return Ok(());
    }
    if sources.iter().any(|t| lowered.contains(&t.to_lowercase())) {
        return Ok(());
    }
    Err(AppError::new(
        "LLM_CITATION_MISSING",
        "Answer does not cite any retrieved source",
    )
    .with_details(format!(
        "sources={}",
        sources.iter().cloned().collect::<Vec<_>>().join(",")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(titles: &[&str]) -> BTreeSet<String> {
        titles.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn accepts_cited_title_case_insensitively() {
        let s = sources(&["Vata Kalakaliya Adhyaya"]);
        assert!(check_citations("As described in vata kalakaliya adhyaya, ...", &s).is_ok());
    }

    #[test]
    fn accepts_refusal_phrase() {
        assert!(check_citations(REFUSAL_PHRASE, &sources(&["Anything"])).is_ok());
    }

    #[test]
    fn rejects_uncited_answer() {
        let err = check_citations("Vata is dry.", &sources(&["Sutra Sthana"])).expect_err("uncited");
        assert_eq!(err.code, "LLM_CITATION_MISSING");
    }
}
