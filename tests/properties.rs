use proptest::prelude::*;
use std::path::Path;
use supersearch::scanner::{scan_text, DEFAULT_CONTEXT_WIDTH};
use supersearch::{KeywordMatcher, ScanMode};

proptest! {
    #[test]
    fn column_counts_codepoints_not_bytes(
        prefix in "[a-j]{0,8}",
        wide in prop::sample::select(vec!['é', '中', '𝄞', 'ж']),
    ) {
        let matcher = KeywordMatcher::new("kw", false);
        let narrow_line = format!("{prefix}x kw");
        let wide_line = format!("{prefix}{wide} kw");

        let (narrow, _) = scan_text(Path::new("n.txt"), &narrow_line, &matcher, ScanMode::FreeText, DEFAULT_CONTEXT_WIDTH);
        let (wide, _) = scan_text(Path::new("w.txt"), &wide_line, &matcher, ScanMode::FreeText, DEFAULT_CONTEXT_WIDTH);

        prop_assert_eq!(narrow.len(), 1);
        prop_assert_eq!(wide.len(), 1);
        prop_assert_eq!(narrow[0].column, wide[0].column);
        prop_assert_eq!(wide[0].column, prefix.chars().count() + 3);
    }

    #[test]
    fn reported_text_equals_keyword_when_case_sensitive(
        lines in prop::collection::vec("[a-c ]{0,12}", 1..6),
        keyword in "[a-c]{1,3}",
    ) {
        let text = lines.join("\n");
        let matcher = KeywordMatcher::new(&keyword, true);
        let (matches, _) = scan_text(Path::new("p.txt"), &text, &matcher, ScanMode::FreeText, DEFAULT_CONTEXT_WIDTH);

        for m in &matches {
            prop_assert_eq!(&m.matched_text, &keyword);
            let line: Vec<char> = lines[m.line - 1].chars().collect();
            let found: String = line[m.column - 1..m.column - 1 + keyword.chars().count()].iter().collect();
            prop_assert_eq!(found, keyword.clone());
        }
    }
}
