mod common;

use common::TestTree;
use encoding_rs::{BIG5, GB18030};
use supersearch::{
    search, DetectionStage, FieldPosition, ResultSet, SearchEngine, SearchRequest,
    SupersearchError,
};

fn run(tree: &TestTree, keyword: &str) -> ResultSet {
    let request = SearchRequest::new(tree.root(), keyword).unwrap();
    search(&request).unwrap()
}

#[test]
fn test_chinese_text_file_position() {
    let tree = TestTree::new();
    tree.file("a.txt", "第一行\nkeyword在这里\n");

    let results = run(&tree, "keyword");
    assert_eq!(results.len(), 1);
    let group = &results.groups()[0];
    assert_eq!(group.index, 1);
    assert!(group.path.ends_with("a.txt"));
    assert_eq!(group.matches.len(), 1);
    assert_eq!((group.matches[0].line, group.matches[0].column), (2, 1));
    assert_eq!(group.matches[0].field, None);
}

#[test]
fn test_csv_quoted_field_position() {
    let tree = TestTree::new();
    tree.file("b.csv", "name,note\nAlice,\"hello, keyword\"\n");

    let results = run(&tree, "keyword");
    let m = &results.groups()[0].matches[0];
    assert_eq!(m.line, 2);
    assert_eq!(m.field, Some(FieldPosition { record: 1, field: 1 }));
    let line: Vec<char> = "Alice,\"hello, keyword\"".chars().collect();
    let offset = line
        .windows(7)
        .position(|w| w.iter().collect::<String>() == "keyword")
        .unwrap();
    assert_eq!(m.column, offset + 1);
}

#[test]
fn test_empty_directory_is_not_an_error() {
    let tree = TestTree::new();
    let results = run(&tree, "keyword");
    assert!(results.is_empty());
    assert_eq!(results.total_matches(), 0);
    assert!(!results.was_cancelled());
}

#[test]
fn test_undecodable_bytes_fall_back() {
    let tree = TestTree::new();
    tree.bytes("odd.txt", b"\x81\x20keyword \xFF\xFF\n");

    let results = run(&tree, "keyword");
    let group = &results.groups()[0];
    let encoding = group.encoding.unwrap();
    assert!(encoding.fallback_used);
    assert_eq!(encoding.stage, DetectionStage::Fallback);
    assert_eq!(group.matches.len(), 1);
    assert_eq!(group.matches[0].column, 3);
}

#[test]
fn test_legacy_encodings_round_trip() {
    let tree = TestTree::new();
    let keyword = "关键词";
    let (gb_bytes, _, _) = GB18030.encode("第一行\n这是关键词所在\n");
    tree.bytes("gb.txt", &gb_bytes);
    let (big5_bytes, _, _) = BIG5.encode("一個檔案\n關鍵詞在此\n");
    tree.bytes("tw.txt", &big5_bytes);

    let results = run(&tree, keyword);
    assert_eq!(results.len(), 1);
    let gb = &results.groups()[0];
    assert_eq!(gb.encoding.unwrap().encoding, GB18030);
    let m = &gb.matches[0];
    assert_eq!((m.line, m.column), (2, 3));
    let (reencoded, _, _) = GB18030.encode(&m.matched_text);
    assert_eq!(&reencoded[..], &GB18030.encode(keyword).0[..]);

    let results = run(&tree, "關鍵詞");
    let tw = &results.groups()[0];
    assert!(tw.path.ends_with("tw.txt"));
    assert_eq!(tw.encoding.unwrap().encoding, BIG5);
    let (reencoded, _, _) = BIG5.encode(&tw.matches[0].matched_text);
    assert_eq!(&reencoded[..], &BIG5.encode("關鍵詞").0[..]);
}

#[test]
fn test_utf16_with_bom() {
    let tree = TestTree::new();
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "x\r\n  Keyword".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    tree.bytes("wide.txt", &bytes);

    let results = run(&tree, "keyword");
    let group = &results.groups()[0];
    assert_eq!(group.encoding.unwrap().stage, DetectionStage::Bom);
    assert_eq!((group.matches[0].line, group.matches[0].column), (2, 3));
}

#[test]
fn test_case_sensitivity_counts() {
    let tree = TestTree::new();
    tree.file("mix.txt", "Apple apple\nAPPLE pineapple\n");

    let insensitive = run(&tree, "apple");
    assert_eq!(insensitive.total_matches(), 4);

    let request = SearchRequest::new(tree.root(), "apple")
        .unwrap()
        .with_case_sensitive(true);
    let sensitive = search(&request).unwrap();
    assert_eq!(sensitive.total_matches(), 2);
}

#[test]
fn test_search_is_idempotent_and_ordered() {
    let tree = TestTree::new();
    tree.file("z.txt", "kw\n");
    tree.file("b/inner.csv", "h\nkw\n");
    tree.file("a/deep/x.TXT", "kw kw\n");
    tree.file("a/skip.md", "kw\n");

    let first = run(&tree, "kw");
    let second = SearchEngine::default()
        .with_jobs(3)
        .run(&SearchRequest::new(tree.root(), "kw").unwrap())
        .unwrap();
    assert_eq!(first, second);

    let names: Vec<String> = first
        .groups()
        .iter()
        .map(|g| {
            g.path
                .strip_prefix(tree.root().canonicalize().unwrap())
                .unwrap()
                .display()
                .to_string()
        })
        .collect();
    assert_eq!(
        names,
        vec![
            format!("a{}deep{}x.TXT", std::path::MAIN_SEPARATOR, std::path::MAIN_SEPARATOR),
            format!("b{}inner.csv", std::path::MAIN_SEPARATOR),
            "z.txt".to_string(),
        ]
    );
    let indices: Vec<usize> = first.groups().iter().map(|g| g.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[test]
fn test_custom_extensions() {
    let tree = TestTree::new();
    tree.file("notes.log", "kw\n");
    tree.file("data.tsv", "a\tb\nx\tkw\n");
    tree.file("plain.txt", "kw\n");

    let request = SearchRequest::new(tree.root(), "kw")
        .unwrap()
        .with_extensions(["log", ".TSV"]);
    let results = search(&request).unwrap();
    assert_eq!(results.len(), 2);
    let tsv = results
        .groups()
        .iter()
        .find(|g| g.path.ends_with("data.tsv"))
        .unwrap();
    assert_eq!(
        tsv.matches[0].field,
        Some(FieldPosition { record: 1, field: 1 })
    );
    assert_eq!(tsv.matches[0].column, 3);
}

#[test]
fn test_fatal_request_errors() {
    let tree = TestTree::new();
    let file = tree.file("a.txt", "x");
    assert!(matches!(
        SearchRequest::new(tree.root().join("missing"), "kw"),
        Err(SupersearchError::RootNotFound(_))
    ));
    assert!(matches!(
        SearchRequest::new(&file, "kw"),
        Err(SupersearchError::NotADirectory(_))
    ));
    assert!(matches!(
        SearchRequest::new(tree.root(), ""),
        Err(SupersearchError::EmptyKeyword)
    ));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_reported_as_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let tree = TestTree::new();
    let locked = tree.file("locked.txt", "kw\n");
    tree.file("open.txt", "kw\n");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Running as root ignores permission bits.
    if std::fs::read(&locked).is_ok() {
        return;
    }

    let results = run(&tree, "kw");
    assert_eq!(results.len(), 2);
    let group = &results.groups()[0];
    assert!(group.path.ends_with("locked.txt"));
    assert_eq!(group.skipped.as_deref(), Some("permission denied"));
    assert!(group.matches.is_empty());
    assert!(matches!(
        results.resolve(1),
        Err(SupersearchError::SelectionSkipped { .. })
    ));
    assert!(results.resolve(2).is_ok());
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_does_not_abort() {
    let tree = TestTree::new();
    let sub = tree.dir("sub");
    tree.file("sub/hit.txt", "kw\n");
    std::os::unix::fs::symlink(tree.root(), sub.join("back")).unwrap();

    let results = run(&tree, "kw");
    assert_eq!(results.len(), 1);
    assert_eq!(results.warnings().len(), 1);
    assert!(results.warnings()[0].reason.contains("cycle"));
}

#[test]
fn test_binary_file_is_skipped() {
    let tree = TestTree::new();
    tree.bytes("blob.txt", b"kw\x00\x01\x02kw");
    tree.file("text.txt", "kw\n");

    let results = run(&tree, "kw");
    assert_eq!(results.len(), 2);
    assert_eq!(results.groups()[0].skipped.as_deref(), Some("binary content"));
    assert_eq!(results.stats().files_skipped, 1);
    assert_eq!(results.total_matches(), 1);
}

#[test]
fn test_legacy_bytes_after_long_ascii_prefix() {
    let tree = TestTree::new();
    let mut text = String::from("id,value\n");
    while text.len() < 70 * 1024 {
        text.push_str("7,0123456789\n");
    }
    text.push_str("99,关键词\n");
    let (bytes, _, _) = GB18030.encode(&text);
    tree.bytes("late.csv", &bytes);

    let results = run(&tree, "关键词");
    assert_eq!(results.len(), 1);
    let group = &results.groups()[0];
    assert_eq!(group.encoding.unwrap().encoding, GB18030);
    assert!(!group.lossy);
    assert_eq!(group.matches.len(), 1);
    let m = &group.matches[0];
    assert_eq!(m.line, text.lines().count());
    assert_eq!(m.column, 4);
    assert_eq!(m.matched_text, "关键词");
}
