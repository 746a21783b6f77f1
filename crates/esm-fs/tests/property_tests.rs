use esm_fs::RelativePath;
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(".".to_string()),
        Just("..".to_string()),
        "[a-z]{1,4}(\\.m?js)?",
    ]
}

fn relative_path() -> impl Strategy<Value = RelativePath> {
    prop::collection::vec(segment(), 0..12)
        .prop_map(|segments| RelativePath::from_segments(segments).unwrap())
}

proptest! {
    #[test]
    fn test_canonicalize_is_idempotent(path in relative_path()) {
        let once = path.canonicalize();
        prop_assert_eq!(once.canonicalize(), once);
    }

    #[test]
    fn test_canonicalize_never_grows(path in relative_path()) {
        prop_assert!(path.canonicalize().len() <= path.len());
    }

    #[test]
    fn test_canonical_has_no_dot_segments(path in relative_path()) {
        let canonical = path.canonicalize();
        prop_assert!(canonical.segments().iter().all(|s| s != "." && s != ".."));
    }

    #[test]
    fn test_canonicalize_within_agrees_when_contained(path in relative_path()) {
        // When nothing escapes, both canonicalizations produce the same path
        if let Some(within) = path.canonicalize_within() {
            prop_assert_eq!(within, path.canonicalize());
        }
    }

    #[test]
    fn test_parse_display_round_trip(path in relative_path()) {
        prop_assert_eq!(RelativePath::parse(&path.to_string()), path);
    }

    #[test]
    fn test_append_preserves_prefix(a in relative_path(), b in relative_path()) {
        let joined = a.append(&b);
        prop_assert!(joined.starts_with(&a));
        prop_assert_eq!(joined.len(), a.len() + b.len());
        prop_assert_eq!(joined.strip_prefix(&a), Some(b));
    }
}
