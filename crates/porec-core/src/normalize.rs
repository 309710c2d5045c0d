//! Text normalization shared by every matching stage.
//!
//! All comparisons in the engine are diacritic- and case-insensitive:
//! catalog names, aliases, branch names, and PDF text all pass through
//! [`normalize`] before being compared.

use std::collections::HashSet;

/// Canonicalize free text: lowercase, strip diacritics (NFD decompose and
/// drop combining marks), collapse internal whitespace, trim.
///
/// Total function: empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.trim().to_lowercase().chars() {
        for d in decompose(c) {
            if is_combining_mark(d) {
                continue;
            }
            if d.is_whitespace() {
                pending_space = !out.is_empty();
            } else {
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                out.push(d);
            }
        }
    }

    out
}

/// Set of normalized tokens of a string.
pub fn token_set(text: &str) -> HashSet<String> {
    normalize(text)
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// Jaccard token overlap between two strings, in 0.0..=1.0.
///
/// Used only by the branch-alias similarity fallback; product matching is
/// exact-only and never consults this.
pub fn token_overlap(a: &str, b: &str) -> f32 {
    let ta = token_set(a);
    let tb = token_set(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let inter = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        0.0
    } else {
        inter as f32 / union as f32
    }
}

/// NFD decomposition for the Latin-1 range seen in order PDFs.
///
/// Covers the accented letters that occur in Spanish/Portuguese documents;
/// anything else passes through unchanged.
fn decompose(c: char) -> impl Iterator<Item = char> {
    let (base, mark): (char, Option<char>) = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => ('a', Some('\u{0301}')),
        'é' | 'è' | 'ê' | 'ë' => ('e', Some('\u{0301}')),
        'í' | 'ì' | 'î' | 'ï' => ('i', Some('\u{0301}')),
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => ('o', Some('\u{0301}')),
        'ú' | 'ù' | 'û' | 'ü' => ('u', Some('\u{0301}')),
        'ñ' => ('n', Some('\u{0303}')),
        'ç' => ('c', Some('\u{0327}')),
        _ => (c, None),
    };
    std::iter::once(base).chain(mark.into_iter())
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036f}')
}
