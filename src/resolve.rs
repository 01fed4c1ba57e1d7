use crate::errors::{Error, Result};
use crate::index::{IndexClient, IndexKind, ReleaseIndex};
use std::cmp::Ordering;
use std::fmt;

/// A requested release. `master` is the floating alias for the latest
/// unstable build; everything else is a concrete tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionToken {
    Master,
    Concrete(String),
}

impl VersionToken {
    /// Normalize user input: trim, strip one leading `v` from concrete
    /// tags. The `master` alias is matched before stripping so `vmaster`
    /// stays a (bogus) concrete tag. Empty input has no token.
    pub fn parse(raw: &str) -> Option<Self> {
        let tag = raw.trim();
        if tag == "master" {
            return Some(VersionToken::Master);
        }
        match tag.strip_prefix('v').unwrap_or(tag) {
            "" => None,
            tag => Some(VersionToken::Concrete(tag.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VersionToken::Master => "master",
            VersionToken::Concrete(tag) => tag,
        }
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seam between the resolver and the network. Tests substitute a counting
/// fake; production code hands in an [`IndexClient`].
pub trait ReleaseSource {
    fn fetch(&self, kind: IndexKind) -> Result<ReleaseIndex>;
}

impl ReleaseSource for IndexClient {
    fn fetch(&self, kind: IndexKind) -> Result<ReleaseIndex> {
        IndexClient::fetch(self, kind)
    }
}

/// `master` is built from source tip and always downloadable, so it is
/// valid without consulting the index. Concrete tags must be present in
/// the Zig version map.
pub fn validate(source: &dyn ReleaseSource, token: &VersionToken) -> Result<()> {
    match token {
        VersionToken::Master => Ok(()),
        VersionToken::Concrete(tag) => {
            let index = source.fetch(IndexKind::Zig)?;
            if index.contains(tag) {
                Ok(())
            } else {
                Err(Error::UnsupportedVersion(tag.clone()))
            }
        }
    }
}

/// ZLS releases lag Zig releases, so a tag valid for Zig may have no ZLS
/// build. The distinct error kind lets callers ignore this when ZLS was
/// not requested.
pub fn validate_zls(source: &dyn ReleaseSource, token: &VersionToken) -> Result<()> {
    match token {
        VersionToken::Master => Ok(()),
        VersionToken::Concrete(tag) => {
            let index = source.fetch(IndexKind::Zls)?;
            if index.contains(tag) {
                Ok(())
            } else {
                Err(Error::UnsupportedZlsVersion(tag.clone()))
            }
        }
    }
}

/// Zig first, short-circuiting: the ZLS index is only consulted once the
/// primary check has passed.
pub fn validate_with_zls(source: &dyn ReleaseSource, token: &VersionToken) -> Result<()> {
    validate(source, token)?;
    validate_zls(source, token)
}

/// Display order for version tokens: `master` (source tip) first, then
/// semver newest to oldest, then anything unparsable, alphabetically.
pub fn compare_tokens(a: &str, b: &str) -> Ordering {
    match (a == "master", b == "master") {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => match (semver::Version::parse(a), semver::Version::parse(b)) {
            (Ok(va), Ok(vb)) => vb.cmp(&va),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{parse_index, IndexKind};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned indexes plus a per-kind fetch counter.
    struct FakeSource {
        zig: ReleaseIndex,
        zls: ReleaseIndex,
        fetches: RefCell<HashMap<IndexKind, usize>>,
    }

    impl FakeSource {
        fn new() -> Self {
            let zig = parse_index(
                IndexKind::Zig,
                r#"{
                    "0.11.0": {"x86_64-linux": {"tarball": "https://x/zig-0.11.0.tar.gz"}},
                    "master": {"x86_64-linux": {"tarball": "https://x/zig-master.tar.gz"}}
                }"#,
            )
            .unwrap();
            let zls = parse_index(
                IndexKind::Zls,
                r#"{"versions": {"0.11.0": {"x86_64-linux": {"tarball": "https://x/zls.tar.gz"}}}}"#,
            )
            .unwrap();
            Self {
                zig,
                zls,
                fetches: RefCell::new(HashMap::new()),
            }
        }

        fn fetch_count(&self, kind: IndexKind) -> usize {
            self.fetches.borrow().get(&kind).copied().unwrap_or(0)
        }
    }

    impl ReleaseSource for FakeSource {
        fn fetch(&self, kind: IndexKind) -> Result<ReleaseIndex> {
            *self.fetches.borrow_mut().entry(kind).or_insert(0) += 1;
            Ok(match kind {
                IndexKind::Zig => self.zig.clone(),
                IndexKind::Zls => self.zls.clone(),
            })
        }
    }

    #[test]
    fn parse_strips_version_prefix() {
        assert_eq!(
            VersionToken::parse("v0.11.0"),
            Some(VersionToken::Concrete("0.11.0".to_string()))
        );
        assert_eq!(VersionToken::parse("master"), Some(VersionToken::Master));
        assert_eq!(VersionToken::parse(""), None);
        assert_eq!(VersionToken::parse("v"), None);
    }

    #[test]
    fn prefix_stripping_never_produces_the_master_alias() {
        assert_eq!(
            VersionToken::parse("vmaster"),
            Some(VersionToken::Concrete("master".to_string()))
        );
    }

    #[test]
    fn master_is_valid_without_a_network_call() {
        let source = FakeSource::new();
        validate(&source, &VersionToken::Master).unwrap();
        validate_zls(&source, &VersionToken::Master).unwrap();
        assert_eq!(source.fetch_count(IndexKind::Zig), 0);
        assert_eq!(source.fetch_count(IndexKind::Zls), 0);
    }

    #[test]
    fn tokens_in_the_index_validate() {
        let source = FakeSource::new();
        let token = VersionToken::parse("0.11.0").unwrap();
        validate(&source, &token).unwrap();
        assert_eq!(source.fetch_count(IndexKind::Zig), 1);
    }

    #[test]
    fn absent_tokens_are_unsupported() {
        let source = FakeSource::new();
        let token = VersionToken::parse("0.9.9").unwrap();
        let err = validate(&source, &token).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(t) if t == "0.9.9"));
    }

    #[test]
    fn zls_failures_are_a_distinct_kind() {
        // a token the zig index has but the zls index lacks
        let mut source = FakeSource::new();
        source.zig = parse_index(
            IndexKind::Zig,
            r#"{"0.12.0": {"x86_64-linux": {"tarball": "https://x/zig.tar.gz"}}}"#,
        )
        .unwrap();
        let token = VersionToken::parse("0.12.0").unwrap();
        validate(&source, &token).unwrap();
        let err = validate_zls(&source, &token).unwrap_err();
        assert!(matches!(err, Error::UnsupportedZlsVersion(t) if t == "0.12.0"));
    }

    #[test]
    fn combined_validation_short_circuits_on_primary_failure() {
        let source = FakeSource::new();
        let token = VersionToken::parse("0.9.9").unwrap();
        let err = validate_with_zls(&source, &token).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(_)));
        assert_eq!(source.fetch_count(IndexKind::Zls), 0);
    }

    #[test]
    fn combined_validation_checks_zls_after_primary_passes() {
        let source = FakeSource::new();
        let token = VersionToken::parse("0.11.0").unwrap();
        validate_with_zls(&source, &token).unwrap();
        assert_eq!(source.fetch_count(IndexKind::Zig), 1);
        assert_eq!(source.fetch_count(IndexKind::Zls), 1);
    }

    #[test]
    fn token_ordering_is_newest_first() {
        let mut tokens = vec!["0.10.1", "weird-tag", "master", "0.11.0", "0.9.1"];
        tokens.sort_by(|a, b| compare_tokens(a, b));
        assert_eq!(
            tokens,
            vec!["master", "0.11.0", "0.10.1", "0.9.1", "weird-tag"]
        );
    }
}
