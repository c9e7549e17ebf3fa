/// Approximate token count: whitespace-delimited words.
///
/// Only feeds usage telemetry, so no tokenizer is involved.
pub fn estimate_tokens(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}
