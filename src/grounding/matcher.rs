//! Segment matching for citation annotation
//!
//! Locates every occurrence of a support segment inside one fragment of the
//! answer and splits the fragment into matched/unmatched runs.
//!
//! # Design Decisions
//!
//! - **Literal match only**: the segment is a literal substring, never a
//!   pattern. Characters that look like regex metacharacters match
//!   themselves.
//! - **Case-insensitive**: comparison folds both sides through
//!   `char::to_lowercase`. Matched runs keep the fragment's original casing.
//! - **Char boundaries**: a match must start and end on a char boundary of
//!   the fragment; a casefold expansion that would end mid-char is rejected.
//! - **Non-overlapping, left to right**: scanning resumes after the end of
//!   each match, so matches within a single call never overlap.

/// One run of a split fragment: either a matched occurrence of the segment
/// (with the fragment's original casing) or the unmatched text between
/// occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRun {
    /// The run's text, sliced verbatim from the fragment
    pub text: String,
    /// Whether this run matched the segment
    pub is_match: bool,
}

/// Split `fragment` into matched/unmatched runs against `segment`.
///
/// Concatenating the runs' text in order always reproduces `fragment`
/// exactly. Empty unmatched runs are omitted. An empty `segment` never
/// matches: the fragment comes back as a single unmatched run.
pub fn split_matches(fragment: &str, segment: &str) -> Vec<MatchRun> {
    let ranges = find_case_insensitive(fragment, segment);

    if ranges.is_empty() {
        return vec![MatchRun {
            text: fragment.to_string(),
            is_match: false,
        }];
    }

    let mut runs = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0;

    for (start, end) in ranges {
        if start > cursor {
            runs.push(MatchRun {
                text: fragment[cursor..start].to_string(),
                is_match: false,
            });
        }
        runs.push(MatchRun {
            text: fragment[start..end].to_string(),
            is_match: true,
        });
        cursor = end;
    }

    if cursor < fragment.len() {
        runs.push(MatchRun {
            text: fragment[cursor..].to_string(),
            is_match: false,
        });
    }

    runs
}

/// Find all non-overlapping case-insensitive occurrences of `needle` in
/// `haystack`, left to right.
///
/// Returns (start, end) byte offset pairs into `haystack`. An empty needle
/// yields no matches. Linear scan over candidate start positions, O(n*m)
/// worst case.
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }

    let folded_needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();

    let mut matches = Vec::new();
    let mut pos = 0;

    while pos < haystack.len() {
        match match_at(haystack, pos, &folded_needle) {
            Some(end) => {
                matches.push((pos, end));
                pos = end;
            }
            None => {
                // Advance one char and retry
                pos += haystack[pos..]
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1);
            }
        }
    }

    matches
}

/// Try to match the folded needle starting at byte offset `start`.
///
/// Returns the end byte offset when every needle char is consumed and the
/// match lands on a char boundary of the haystack.
fn match_at(haystack: &str, start: usize, folded_needle: &[char]) -> Option<usize> {
    let mut consumed = 0;

    for (offset, ch) in haystack[start..].char_indices() {
        for folded in ch.to_lowercase() {
            if consumed >= folded_needle.len() {
                // Needle ends inside this char's casefold expansion; no
                // clean boundary exists
                return None;
            }
            if folded_needle[consumed] != folded {
                return None;
            }
            consumed += 1;
        }
        if consumed == folded_needle.len() {
            return Some(start + offset + ch.len_utf8());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat(runs: &[MatchRun]) -> String {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_find_single_occurrence() {
        let ranges = find_case_insensitive("Hello world, this is a test.", "this is");
        assert_eq!(ranges, vec![(13, 20)]);
    }

    #[test]
    fn test_find_multiple_occurrences() {
        let ranges = find_case_insensitive("foo bar foo baz foo", "foo");
        assert_eq!(ranges, vec![(0, 3), (8, 11), (16, 19)]);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let ranges = find_case_insensitive("The Sky is Blue.", "sky is blue");
        assert_eq!(ranges, vec![(4, 15)]);
    }

    #[test]
    fn test_matches_do_not_overlap() {
        // "aaa" contains "aa" at 0 and 1, but the scan resumes after the
        // first match
        let ranges = find_case_insensitive("aaaa", "aa");
        assert_eq!(ranges, vec![(0, 2), (2, 4)]);
    }

    #[test]
    fn test_empty_needle_never_matches() {
        assert!(find_case_insensitive("anything", "").is_empty());
        let runs = split_matches("anything", "");
        assert_eq!(
            runs,
            vec![MatchRun {
                text: "anything".to_string(),
                is_match: false
            }]
        );
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let runs = split_matches("costs $5.00 (net)", "$5.00 (net)");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].text, "$5.00 (net)");
        assert!(runs[1].is_match);
        // A dot must not match arbitrary chars
        assert!(find_case_insensitive("costs $5x00", "$5.00").is_empty());
    }

    #[test]
    fn test_split_preserves_original_casing() {
        let runs = split_matches("The Sky is Blue.", "sky is blue");
        assert_eq!(
            runs,
            vec![
                MatchRun {
                    text: "The ".to_string(),
                    is_match: false
                },
                MatchRun {
                    text: "Sky is Blue".to_string(),
                    is_match: true
                },
                MatchRun {
                    text: ".".to_string(),
                    is_match: false
                },
            ]
        );
    }

    #[test]
    fn test_split_omits_empty_unmatched_runs() {
        let runs = split_matches("abcabc", "abc");
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| r.is_match));
    }

    #[test]
    fn test_split_reconstructs_fragment() {
        let fragment = "Rust is fast. rust is safe. RUST is fun.";
        let runs = split_matches(fragment, "rust");
        assert_eq!(concat(&runs), fragment);
        assert_eq!(runs.iter().filter(|r| r.is_match).count(), 3);
    }

    #[test]
    fn test_unicode_case_folding() {
        let runs = split_matches("Καλημέρα κόσμε", "καλημέρα");
        assert_eq!(runs[0].text, "Καλημέρα");
        assert!(runs[0].is_match);
        assert_eq!(concat(&runs), "Καλημέρα κόσμε");
    }

    #[test]
    fn test_multibyte_boundaries() {
        // Matching must not split the surrounding multi-byte chars
        let fragment = "日本語のtextです";
        let runs = split_matches(fragment, "TEXT");
        assert_eq!(concat(&runs), fragment);
        let matched: Vec<_> = runs.iter().filter(|r| r.is_match).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].text, "text");
    }

    #[test]
    fn test_needle_longer_than_haystack() {
        assert!(find_case_insensitive("ab", "abc").is_empty());
        assert!(find_case_insensitive("", "abc").is_empty());
    }
}
