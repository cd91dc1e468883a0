//! Text normalisation shared by slugs, search documents and text queries.

use std::collections::BTreeSet;

/// Lowercase, strip diacritics and collapse whitespace.
pub fn fold(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let mut folded = String::with_capacity(cleaned.len());
    for ch in cleaned.chars().flat_map(char::to_lowercase) {
        match fold_char(ch) {
            Some(mapped) => folded.push_str(mapped),
            None => folded.push(ch),
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_char(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'œ' => "oe",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        '’' | '‘' => "'",
        _ => return None,
    };
    Some(mapped)
}

/// URL-safe slug: folded ascii alphanumerics joined by single dashes.
pub fn slugify(value: &str) -> String {
    let folded = fold(value);
    let mut slug = String::with_capacity(folded.len());
    let mut pending_dash = false;
    for ch in folded.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Truncate on a char boundary without leaving a trailing dash.
pub fn truncate_slug(slug: &str, max_chars: usize) -> String {
    let truncated: String = slug.chars().take(max_chars).collect();
    truncated.trim_end_matches('-').to_string()
}

/// Four random hex characters used to disambiguate a taken slug.
pub fn random_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string().chars().take(4).collect()
}

/// Keep only the digits of an identifier query, or `None` if it holds anything else.
pub fn digits_only(value: &str) -> Option<String> {
    let compact: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();
    if !compact.is_empty() && compact.chars().all(|ch| ch.is_ascii_digit()) {
        Some(compact)
    } else {
        None
    }
}

fn trigrams(value: &str) -> BTreeSet<[char; 3]> {
    let mut set = BTreeSet::new();
    for word in value
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

/// Jaccard similarity over padded word trigrams of two folded strings.
pub fn similarity(left: &str, right: &str) -> f32 {
    let left = trigrams(left);
    let right = trigrams(right);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;
    shared as f32 / union as f32
}

/// Best similarity between the query and any run of consecutive words in the target.
pub fn word_similarity(query: &str, target: &str) -> f32 {
    let words: Vec<&str> = target.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let width = query.split_whitespace().count().clamp(1, words.len());
    let mut best = similarity(query, target);
    for window in words.windows(width) {
        best = best.max(similarity(query, &window.join(" ")));
    }
    best
}
