/// Literal keyword search over codepoint slices.
///
/// Positions are indices into the haystack's `char`s, never byte offsets.
/// Case-insensitive comparison folds each codepoint on its own, so folded and
/// original text always have the same length and positions carry over.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    needle: Vec<char>,
    case_sensitive: bool,
}

impl KeywordMatcher {
    pub fn new(keyword: &str, case_sensitive: bool) -> Self {
        let needle = if case_sensitive {
            keyword.chars().collect()
        } else {
            keyword.chars().map(fold_char).collect()
        };
        Self {
            needle,
            case_sensitive,
        }
    }

    /// Length of the keyword in codepoints.
    pub fn len(&self) -> usize {
        self.needle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Start indices of every non-overlapping occurrence, left to right.
    pub fn find_all(&self, haystack: &[char]) -> Vec<usize> {
        let n = self.needle.len();
        let mut hits = Vec::new();
        if n == 0 || haystack.len() < n {
            return hits;
        }

        let folded: Vec<char>;
        let hay: &[char] = if self.case_sensitive {
            haystack
        } else {
            folded = haystack.iter().copied().map(fold_char).collect();
            &folded
        };

        let mut i = 0;
        while i + n <= hay.len() {
            if hay[i] == self.needle[0] && hay[i..i + n] == self.needle[..] {
                hits.push(i);
                i += n;
            } else {
                i += 1;
            }
        }
        hits
    }
}

/// Lowercases a codepoint when its lowercase form is a single codepoint;
/// otherwise returns it unchanged.
pub fn fold_char(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_case_insensitive_hits() {
        let m = KeywordMatcher::new("Test", false);
        assert_eq!(m.find_all(&chars("test TEST Test teSt")), vec![0, 5, 10, 15]);
    }

    #[test]
    fn test_case_sensitive_hits() {
        let m = KeywordMatcher::new("Test", true);
        assert_eq!(m.find_all(&chars("test TEST Test teSt")), vec![10]);
    }

    #[test]
    fn test_no_overlap() {
        let m = KeywordMatcher::new("aa", true);
        assert_eq!(m.find_all(&chars("aaaaa")), vec![0, 2]);
    }

    #[test]
    fn test_positions_are_codepoints() {
        let m = KeywordMatcher::new("kw", false);
        assert_eq!(m.find_all(&chars("中文kw")), vec![2]);
    }

    #[test]
    fn test_multi_codepoint_lowercase_keeps_length() {
        // U+0130 lowercases to two codepoints; it must fold to itself.
        assert_eq!(fold_char('\u{130}'), '\u{130}');
        let m = KeywordMatcher::new("x", false);
        assert_eq!(m.find_all(&chars("\u{130}X")), vec![1]);
    }

    #[test]
    fn test_non_ascii_case_folding() {
        let m = KeywordMatcher::new("ÄPFEL", false);
        assert_eq!(m.find_all(&chars("rote äpfel")), vec![5]);
    }

    #[test]
    fn test_empty_and_short_inputs() {
        assert!(KeywordMatcher::new("", false).find_all(&chars("abc")).is_empty());
        assert!(KeywordMatcher::new("abcd", false).find_all(&chars("abc")).is_empty());
    }
}
