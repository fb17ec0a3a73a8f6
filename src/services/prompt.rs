/// Renders the prompt sent to the LLM. The document is inserted as-is, without
/// escaping or truncation.
pub fn build_prompt(document_text: &str, question: &str) -> String {
    format!(
        "Answer the question based on the following document:\n\n{document_text}\n\nQuestion:\n{question}"
    )
}
