//! Tokenizers for body-line payloads. Only `tokenize_delimited` is wired
//! into the Mover; the others are exposed for completeness, matching
//! spec.md's note that the source codebase exposes several tokenizer
//! variants even though only one is active.

const DELIMITERS: &[char] = &['?', ':', '(', ')', '+', '*', '-', '=', '<', '>'];

/// The delimiter-driven tokenizer: splits on whitespace and around the
/// delimiter set, keeping delimiters as their own tokens. Deterministic,
/// order-preserving, drops empty runs.
pub fn tokenize_delimited(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in s.chars() {
        if c.is_whitespace() {
            flush(&mut current, &mut tokens);
        } else if DELIMITERS.contains(&c) {
            flush(&mut current, &mut tokens);
            tokens.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    flush(&mut current, &mut tokens);

    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// Latent variant: one token per codepoint.
pub fn tokenize_chars(s: &str) -> Vec<String> {
    s.chars().map(|c| c.to_string()).collect()
}

/// Latent variant: whitespace-only splitting.
pub fn tokenize_words(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}
