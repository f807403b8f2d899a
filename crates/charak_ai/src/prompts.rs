use crate::llm::Prompt;

/// Exact sentence the model must use when the passages do not cover a question.
pub const REFUSAL_PHRASE: &str =
    "This specific topic is not covered in the provided sections of Charak Samhita.";

pub fn system_prompt() -> String {
    format!(
        r#"You are an expert Ayurvedic scholar specializing in Charak Samhita, one of the foundational texts of Ayurveda.

Rules (non-negotiable):
1) Answer ONLY from the passages of Charak Samhita provided to you.
2) Be accurate and detailed, and cite the source title of every passage you rely on (the text after "From:").
3) Never invent or hallucinate information that the passages do not support.
4) If the passages do not cover the question, answer exactly: "{REFUSAL_PHRASE}"
5) Use proper Ayurvedic terminology (Sanskrit terms with an explanation).
6) Always remind the reader that Ayurvedic treatments should be supervised by a qualified Vaidya (Ayurvedic physician)."#
    )
}

pub fn user_prompt(question: &str, context: &str) -> String {
    format!(
        r#"Here are relevant passages from Charak Samhita:

{context}

---

Question: {question}

Please answer based on the above context from Charak Samhita."#
    )
}

pub fn answer_prompt(question: &str, context: &str) -> Prompt {
    Prompt {
        system: system_prompt(),
        user: user_prompt(question, context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_rules_question_and_context() {
        let p = answer_prompt("What is Vata?", "[From: Vata]\ndry and light");
        assert!(p.system.contains(REFUSAL_PHRASE));
        assert!(p.system.contains("Vaidya"));
        assert!(p.system.contains("ONLY"));
        assert!(p.user.contains("Question: What is Vata?"));
        assert!(p.user.contains("[From: Vata]\ndry and light"));
    }
}
