//! Semantic version parsing for `use name from "x.y.z"`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

const SEMVER_PATTERN: &str =
    r"^(\d+)\.(\d+)\.(\d+)(?:-([0-9A-Za-z\-\.]+))?(?:\+([0-9A-Za-z\-\.]+))?$";

fn semver_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::unwrap_used, reason = "the pattern is a checked constant")]
        Regex::new(SEMVER_PATTERN).unwrap()
    })
}

/// A parsed semantic version, with optional pre-release and build metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SemVer {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre_release: Option<String>,
    pub build_metadata: Option<String>,
}

impl SemVer {
    /// Is `version` a well-formed semantic version?
    pub fn validate(version: &str) -> bool {
        semver_regex().is_match(version)
    }

    /// Parse `version`, returning `None` when malformed.
    pub fn parse(version: &str) -> Option<SemVer> {
        let captures = semver_regex().captures(version)?;

        let component = |i: usize| captures.get(i)?.as_str().parse::<u32>().ok();
        Some(SemVer {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            pre_release: captures.get(4).map(|m| m.as_str().to_string()),
            build_metadata: captures.get(5).map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{pre}")?;
        }
        if let Some(build) = &self.build_metadata {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_versions_validate() {
        assert!(SemVer::validate("1.0.0"));
        assert!(SemVer::validate("0.19.10"));
        assert!(!SemVer::validate("1.0"));
        assert!(!SemVer::validate("1.0.0.0"));
        assert!(!SemVer::validate("v1.0.0"));
        assert!(!SemVer::validate("latest"));
    }

    #[test]
    fn pre_release_and_build_metadata() {
        let version = SemVer::parse("2.1.3-alpha.8+build.11");
        assert_eq!(
            version,
            Some(SemVer {
                major: 2,
                minor: 1,
                patch: 3,
                pre_release: Some("alpha.8".to_string()),
                build_metadata: Some("build.11".to_string()),
            })
        );
    }

    #[test]
    fn display_round_trips() {
        for text in ["1.2.3", "1.2.3-rc.1", "1.2.3+sha.5114f85", "1.2.3-rc.1+sha.5114f85"] {
            #[allow(clippy::unwrap_used, reason = "inputs are valid versions")]
            let parsed = SemVer::parse(text).unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }
}
