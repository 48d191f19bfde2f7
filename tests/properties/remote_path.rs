//! Property tests for remote path normalization.

use proptest::prelude::*;
use rdeploy::RemotePath;

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._-]{1,12}".prop_filter("not a dot segment", |s| s != "." && s != "..")
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: `RemotePath::new` never panics on arbitrary input.
    #[test]
    fn property_remote_path_never_panics(raw in "(?s).{0,128}") {
        let _ = RemotePath::new(&raw);
    }

    /// PROPERTY: normalization is idempotent.
    #[test]
    fn property_normalization_is_idempotent(raw in "[/a-z]{1,32}") {
        if let Ok(path) = RemotePath::new(&raw) {
            let again = RemotePath::new(path.as_str()).unwrap();
            prop_assert_eq!(again, path);
        }
    }

    /// PROPERTY: joining a segment and taking the parent returns the original.
    #[test]
    fn property_join_then_parent(
        segments in proptest::collection::vec(segment(), 1..5),
        child in segment(),
    ) {
        let base = RemotePath::new(format!("/{}", segments.join("/"))).unwrap();
        let joined = base.join(&child);

        prop_assert_eq!(joined.parent(), Some(base.clone()));
        prop_assert_eq!(joined.file_name(), Some(child.as_str()));
        prop_assert!(joined.starts_with(&base));
    }
}
