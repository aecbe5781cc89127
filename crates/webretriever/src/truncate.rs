//! Character budgets
//!
//! All lengths are counted in Unicode scalar values, never bytes, so a cut
//! always lands on a character boundary.

/// Separator placed between text fragments when they are joined
pub const FRAGMENT_SEPARATOR: &str = " ";

/// Greedy single-stop truncation of ordered fragments
///
/// Fragments are kept whole while they fit. The first fragment that would
/// overflow contributes only the prefix that still fits, and nothing after
/// it is considered, even if a later fragment is short enough.
pub fn truncate_fragments<S: AsRef<str>>(fragments: &[S], budget: usize) -> Vec<String> {
    let mut kept = Vec::new();
    let mut used = 0;

    for fragment in fragments {
        let fragment = fragment.as_ref();
        let len = char_len(fragment);
        if used + len <= budget {
            kept.push(fragment.to_string());
            used += len;
        } else {
            let prefix = take_chars(fragment, budget - used);
            if !prefix.is_empty() {
                kept.push(prefix.to_string());
            }
            break;
        }
    }

    kept
}

/// Join fragments and clamp the result to the budget
///
/// The clamp catches separators pushing an exactly-full selection over the
/// limit, as well as single oversized fragments.
pub fn join_within(fragments: &[String], budget: usize) -> String {
    let joined = fragments.join(FRAGMENT_SEPARATOR);
    clamp(&joined, budget).to_string()
}

/// Greedy image selection against a character budget
///
/// `cost` measures one entry as it will be serialized. The walk stops at the
/// first entry that does not fit; URLs are never cut.
pub fn truncate_images<F>(urls: &[String], budget: usize, cost: F) -> Vec<String>
where
    F: Fn(&str) -> usize,
{
    let mut kept = Vec::new();
    let mut used = 0;

    for url in urls {
        let len = cost(url.as_str());
        if used + len > budget {
            break;
        }
        kept.push(url.clone());
        used += len;
    }

    kept
}

/// Keep at most `max` images, regardless of their length
pub fn cap_images(urls: &[String], max: usize) -> Vec<String> {
    urls.iter().take(max).cloned().collect()
}

/// Longest prefix of `s` with at most `max_chars` characters
pub fn clamp(s: &str, max_chars: usize) -> &str {
    take_chars(s, max_chars)
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
