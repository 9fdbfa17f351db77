//! Turkish-aware text normalization for matching keys.
//!
//! Display names keep their diacritics; matching happens on folded keys so
//! that "Cankaya" finds "Çankaya" and dotted/dotless I variants collide
//! ("İstanbul", "ISPARTA" and their lowercase forms all fold the same way).

use deunicode::deunicode_char;

/// Folds a raw string into its matching key: Turkish-aware lowercasing,
/// diacritics stripped, punctuation dropped, whitespace squashed.
///
/// Folding is idempotent: applying it to an already-folded key is a no-op.
pub fn fold_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            // Turkish casing: both dotted and dotless I fold to plain "i"
            // so the two variants are equivalent matching keys.
            'İ' | 'I' | 'ı' => out.push('i'),
            'Ç' | 'ç' => out.push('c'),
            'Ğ' | 'ğ' => out.push('g'),
            'Ö' | 'ö' => out.push('o'),
            'Ş' | 'ş' => out.push('s'),
            'Ü' | 'ü' => out.push('u'),
            c if c.is_ascii_alphanumeric() => out.push(c.to_ascii_lowercase()),
            c if c.is_whitespace() => out.push(' '),
            c if c.is_ascii() => {} // punctuation
            // Residual diacritics, e.g. the circumflex in "Hakkâri".
            c => {
                if let Some(folded) = deunicode_char(c) {
                    for f in folded.chars().filter(|f| f.is_ascii_alphanumeric()) {
                        out.push(f.to_ascii_lowercase());
                    }
                }
            }
        }
    }
    squash_whitespace(&out)
}

/// Splits a raw query into candidate name tokens: commas and the standalone
/// connector words "ve"/"and" separate names, multi-word names stay intact.
/// Order is preserved and repeated names are not de-duplicated.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for part in raw.split(',') {
        let mut words: Vec<&str> = Vec::new();
        for word in part.split_whitespace() {
            if is_connector(word) {
                push_token(&mut tokens, &words);
                words.clear();
            } else {
                words.push(word);
            }
        }
        push_token(&mut tokens, &words);
    }
    tokens
}

fn push_token(tokens: &mut Vec<String>, words: &[&str]) {
    if !words.is_empty() {
        tokens.push(words.join(" "));
    }
}

fn is_connector(word: &str) -> bool {
    matches!(fold_key(word).as_str(), "ve" | "and")
}

fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
