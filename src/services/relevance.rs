use std::collections::HashSet;

/// Whitespace-token overlap check between a question and the document text.
///
/// Tokens are compared verbatim: no case folding, no punctuation stripping. Any shared
/// token, including short common words, is enough to count as relevant.
pub fn is_question_relevant(question: &str, document_text: &str) -> bool {
    let keywords: HashSet<&str> = document_text.split_whitespace().collect();
    if keywords.is_empty() {
        return false;
    }
    question.split_whitespace().any(|word| keywords.contains(word))
}
