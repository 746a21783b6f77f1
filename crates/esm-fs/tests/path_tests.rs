use esm_fs::RelativePath;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("foo/bar/baz", &["foo", "bar", "baz"])]
#[case("foo\\bar\\baz", &["foo", "bar", "baz"])]
#[case("./foo/../bar", &[".", "foo", "..", "bar"])]
#[case("/es-module-repo/x/a.mjs", &["es-module-repo", "x", "a.mjs"])]
#[case("", &[])]
#[case("///", &[])]
fn test_parse_segments(#[case] input: &str, #[case] expected: &[&str]) {
    let path = RelativePath::parse(input);
    assert_eq!(path.segments(), expected);
}

#[rstest]
#[case("a/./b", "a/b")]
#[case("a/../b", "b")]
#[case("./a/b/../c", "a/c")]
#[case("a/b/../../c", "c")]
#[case("..", "")]
#[case("../a", "a")]
#[case("../../a/b", "a/b")]
#[case("a/../../b", "b")]
fn test_canonicalize(#[case] input: &str, #[case] expected: &str) {
    let canonical = RelativePath::parse(input).canonicalize();
    assert_eq!(canonical.to_string(), expected);
}

#[test]
fn test_prefix_is_segment_wise() {
    let path = RelativePath::parse("abc/d");
    assert!(!path.starts_with(&RelativePath::parse("ab/c")));
    assert!(!path.starts_with(&RelativePath::parse("ab")));
    assert!(path.starts_with(&RelativePath::parse("abc")));
    assert!(path.starts_with(&RelativePath::empty()));
}

#[test]
fn test_subrange_bounds() {
    let path = RelativePath::parse("a/b/c/d");
    assert_eq!(path.subrange(1, 3).unwrap().to_string(), "b/c");
    assert_eq!(path.subrange(4, 4).unwrap(), RelativePath::empty());
    assert!(path.subrange(3, 5).is_none());
    assert!(path.subrange(3, 2).is_none());
}

#[test]
fn test_strip_prefix() {
    let path = RelativePath::parse("es-module-repo/id/lib/x.js");
    let prefix = RelativePath::parse("es-module-repo/id");
    assert_eq!(path.strip_prefix(&prefix).unwrap().to_string(), "lib/x.js");
    assert!(path.strip_prefix(&RelativePath::parse("other")).is_none());
}

#[test]
fn test_segment_and_file_name() {
    let path = RelativePath::parse("lib/util/strings.mjs");
    assert_eq!(path.segment(0), Some("lib"));
    assert_eq!(path.segment(3), None);
    assert_eq!(path.file_name(), Some("strings.mjs"));
    assert_eq!(path.len(), 3);
}

#[test]
fn test_parent() {
    let path = RelativePath::parse("foo/bar/baz");
    assert_eq!(path.parent().unwrap().to_string(), "foo/bar");
    assert_eq!(RelativePath::parse("foo").parent().unwrap(), RelativePath::empty());
    assert!(RelativePath::empty().parent().is_none());
}

#[test]
fn test_resolve_against_directory_context() {
    let base = RelativePath::parse("lib/util");
    let resolved = RelativePath::parse("../shared/./log").resolve_against_directory_context(&base);
    assert_eq!(resolved.to_string(), "lib/shared/log");
}

#[test]
fn test_resolve_marked_path_is_unchanged() {
    let marked = RelativePath::parse("es-module-repo/6a1f6c8e-5f0a-4c43-9b1e-2d2f0c1e9a77/../x");
    let resolved = marked.resolve_against_directory_context(&RelativePath::parse("lib"));
    assert_eq!(resolved, marked);
}

#[test]
fn test_resolve_against_file_context() {
    let importer = RelativePath::parse("lib/util/strings.mjs");
    let resolved = RelativePath::parse("./format").resolve_against_file_context(&importer);
    assert_eq!(resolved.to_string(), "lib/util/format");

    let top_level = RelativePath::parse("main.mjs");
    let resolved = RelativePath::parse("./lib/a").resolve_against_file_context(&top_level);
    assert_eq!(resolved.to_string(), "lib/a");
}

#[test]
fn test_join_validates_segment() {
    let base = RelativePath::parse("lib");
    assert_eq!(base.join("a.mjs").unwrap().to_string(), "lib/a.mjs");
    assert!(base.join("a/b").is_err());
    assert!(base.join("").is_err());
}

#[test]
fn test_native_round_trip() {
    let root = std::path::Path::new("repo-root");
    let path = RelativePath::parse("a/b/c.mjs");
    let native = path.to_native(root);
    let back = RelativePath::from_native(native.strip_prefix(root).unwrap()).unwrap();
    assert_eq!(back, path);
}

#[test]
fn test_display_and_absolute_string() {
    let path = RelativePath::parse("es-module-repo/id/a.mjs");
    assert_eq!(path.to_string(), "es-module-repo/id/a.mjs");
    assert_eq!(path.to_absolute_string(), "/es-module-repo/id/a.mjs");
}
