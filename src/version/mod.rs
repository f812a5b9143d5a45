//! Release version derivation.
//!
//! Versions are date based: `YYYY.MM.DD.<epoch-seconds>`, optionally followed
//! by a numeric revision. When the freshly derived version matches the one
//! already stored, the last component is bumped so repeated stamps stay
//! distinct.

use chrono::{DateTime, Utc};
use std::io;

/// A computed version together with its numeric build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// Final version string, including any revision suffix.
    pub version: String,
    /// Build time reported to CI, usually UNIX epoch seconds.
    ///
    /// On a collision this is the bumped sequence number instead.
    pub build_time: String,
}

/// Error type for version derivation.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    /// The supplied revision contains something other than digits.
    #[error("Revision must be a number, got '{0}'")]
    InvalidRevision(String),
    /// A version component could not be read as an integer.
    #[error("Version component '{component}' of '{version}' is not an integer")]
    InvalidComponent {
        /// The offending component.
        component: String,
        /// The whole version it came from.
        version: String,
    },
    /// The previously stored version could not be read.
    #[error("Failed to read previous version: {0}")]
    PriorVersion(#[from] io::Error),
}

/// Resolve the version for this run from the positional CLI argument.
///
/// A value containing a `.` is taken verbatim and paired with the current
/// time. Anything else is treated as a revision for a date-derived version.
///
/// `prior` is only called when a collision check is needed.
pub fn resolve<F>(
    explicit: Option<&str>,
    now: DateTime<Utc>,
    prior: F,
) -> Result<Stamp, VersionError>
where
    F: FnOnce() -> io::Result<Option<String>>,
{
    let explicit = explicit.filter(|v| !v.is_empty());

    match explicit {
        Some(version) if version.contains('.') => Ok(Stamp {
            version: version.to_string(),
            build_time: epoch_seconds(now),
        }),
        revision => new_version(None, revision, now, prior),
    }
}

/// Derive a new version, appending `revision` if given.
///
/// Without a revision, the derived version is compared against the stored one
/// and its fourth component is bumped past the stored value on a match.
pub fn new_version<F>(
    version: Option<&str>,
    revision: Option<&str>,
    now: DateTime<Utc>,
    prior: F,
) -> Result<Stamp, VersionError>
where
    F: FnOnce() -> io::Result<Option<String>>,
{
    let mut build_time = epoch_seconds(now);
    let mut version = match version.filter(|v| !v.is_empty()) {
        Some(v) => v.to_string(),
        None => format!("{}.{}", now.format("%Y.%m.%d"), build_time),
    };

    match revision.filter(|r| !r.is_empty()) {
        Some(revision) => {
            if !revision.chars().all(|c| c.is_ascii_digit()) {
                return Err(VersionError::InvalidRevision(revision.to_string()));
            }
            version = format!("{version}.{revision}");
        }
        None => {
            if let Some(old_version) = prior()? {
                if let Some(bumped) = bump_on_collision(&version, &old_version)? {
                    build_time = bumped.build_time;
                    version = bumped.version;
                }
            }
        }
    }

    Ok(Stamp {
        version,
        build_time,
    })
}

/// Bump `version` past `old_version` when the two are identical.
///
/// The stored fourth component (0 if absent) plus one replaces the new
/// version's trailing component, keeping the three date components.
fn bump_on_collision(version: &str, old_version: &str) -> Result<Option<Stamp>, VersionError> {
    let parts: Vec<&str> = version.split('.').collect();
    let old_parts: Vec<&str> = old_version.split('.').collect();

    if parts != old_parts {
        return Ok(None);
    }

    let sequence = match old_parts.get(3) {
        Some(component) => parse_component(component, old_version)?,
        None => "0",
    };
    let build_time = increment(sequence);

    let mut bumped: Vec<&str> = parts.iter().take(3).copied().collect();
    bumped.push(&build_time);

    Ok(Some(Stamp {
        version: bumped.join("."),
        build_time,
    }))
}

/// Rewrite every component as its minimal integer form.
///
/// `2023.11.02.5` becomes `2023.11.2.5`.
pub fn normalize(version: &str) -> Result<String, VersionError> {
    let components = version
        .split('.')
        .map(|c| parse_component(c, version))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(components.join("."))
}

/// Read a component as an unbounded non-negative integer.
///
/// Returns the digits without leading zeros, `"0"` for all zeros.
fn parse_component<'a>(component: &'a str, version: &str) -> Result<&'a str, VersionError> {
    let digits = component.trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(VersionError::InvalidComponent {
            component: component.to_string(),
            version: version.to_string(),
        });
    }

    let minimal = digits.trim_start_matches('0');
    Ok(if minimal.is_empty() { "0" } else { minimal })
}

/// Add one to a string of ASCII digits without a width limit.
fn increment(digits: &str) -> String {
    let mut out: Vec<u8> = digits.bytes().collect();
    let mut carry = true;
    for i in (0..out.len()).rev() {
        if out[i] == b'9' {
            out[i] = b'0';
        } else {
            out[i] += 1;
            carry = false;
            break;
        }
    }
    if carry {
        out.insert(0, b'1');
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn epoch_seconds(now: DateTime<Utc>) -> String {
    now.timestamp().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// 2023-11-02T04:20:34Z.
    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1698898834, 0).unwrap()
    }

    fn no_prior() -> io::Result<Option<String>> {
        Ok(None)
    }

    #[test]
    fn test_new_version_is_date_plus_epoch() {
        let stamp = new_version(None, None, fixed_now(), no_prior).unwrap();
        assert_eq!(stamp.version, "2023.11.02.1698898834");
        assert_eq!(stamp.build_time, "1698898834");
    }

    #[test]
    fn test_new_version_no_collision_with_different_prior() {
        let stamp = new_version(None, None, fixed_now(), || {
            Ok(Some("2023.11.02.5".to_string()))
        })
        .unwrap();
        assert_eq!(stamp.version, "2023.11.02.1698898834");
        assert_eq!(stamp.build_time, "1698898834");
    }

    #[test]
    fn test_new_version_collision_bumps_sequence() {
        let stamp = new_version(Some("2023.11.02.5"), None, fixed_now(), || {
            Ok(Some("2023.11.02.5".to_string()))
        })
        .unwrap();
        assert_eq!(stamp.version, "2023.11.02.6");
        assert_eq!(stamp.build_time, "6");
    }

    #[test]
    fn test_collision_with_same_second_prior() {
        let stamp = new_version(None, None, fixed_now(), || {
            Ok(Some("2023.11.02.1698898834".to_string()))
        })
        .unwrap();
        assert_eq!(stamp.version, "2023.11.02.1698898835");
        assert_eq!(stamp.build_time, "1698898835");
    }

    #[test]
    fn test_collision_without_fourth_component_starts_at_one() {
        let stamp = new_version(Some("2023.11.02"), None, fixed_now(), || {
            Ok(Some("2023.11.02".to_string()))
        })
        .unwrap();
        assert_eq!(stamp.version, "2023.11.02.1");
        assert_eq!(stamp.build_time, "1");
    }

    #[test]
    fn test_collision_with_non_numeric_sequence_fails() {
        let result = new_version(Some("2023.11.02.x"), None, fixed_now(), || {
            Ok(Some("2023.11.02.x".to_string()))
        });
        assert!(matches!(result, Err(VersionError::InvalidComponent { .. })));
    }

    #[test]
    fn test_revision_is_appended() {
        let stamp = new_version(None, Some("42"), fixed_now(), no_prior).unwrap();
        assert_eq!(stamp.version, "2023.11.02.1698898834.42");
        assert_eq!(stamp.build_time, "1698898834");

        let prefix: Vec<&str> = stamp.version.split('.').take(3).collect();
        for part in prefix {
            assert!(part.parse::<u32>().is_ok());
        }
    }

    #[test]
    fn test_revision_skips_prior_lookup() {
        let stamp = new_version(None, Some("7"), fixed_now(), || {
            panic!("prior version should not be read when a revision is given")
        })
        .unwrap();
        assert!(stamp.version.ends_with(".7"));
    }

    #[test]
    fn test_non_numeric_revision_fails() {
        let result = new_version(None, Some("12a"), fixed_now(), no_prior);
        match result {
            Err(VersionError::InvalidRevision(r)) => assert_eq!(r, "12a"),
            other => panic!("Expected InvalidRevision, got {other:?}"),
        }
    }

    #[test]
    fn test_unicode_digit_revision_fails() {
        let result = new_version(None, Some("\u{0663}"), fixed_now(), no_prior);
        assert!(matches!(result, Err(VersionError::InvalidRevision(_))));
    }

    #[test]
    fn test_invalid_revision_message() {
        let err = VersionError::InvalidRevision("abc".to_string());
        assert!(err.to_string().contains("Revision must be a number"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_prior_read_error_propagates() {
        let result = new_version(None, None, fixed_now(), || {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        });
        assert!(matches!(result, Err(VersionError::PriorVersion(_))));
    }

    #[test]
    fn test_resolve_explicit_version_used_verbatim() {
        let stamp = resolve(Some("2023.12.01.7"), fixed_now(), || {
            panic!("explicit versions never check the prior version")
        })
        .unwrap();
        assert_eq!(stamp.version, "2023.12.01.7");
        assert_eq!(stamp.build_time, "1698898834");
    }

    #[test]
    fn test_resolve_bare_number_is_revision() {
        let stamp = resolve(Some("3"), fixed_now(), no_prior).unwrap();
        assert_eq!(stamp.version, "2023.11.02.1698898834.3");
    }

    #[test]
    fn test_resolve_empty_is_absent() {
        let stamp = resolve(Some(""), fixed_now(), no_prior).unwrap();
        assert_eq!(stamp.version, "2023.11.02.1698898834");
    }

    #[test]
    fn test_resolve_twice_yields_distinct_versions() {
        let first = resolve(None, fixed_now(), no_prior).unwrap();
        let stored = first.version.clone();
        let second = resolve(None, fixed_now(), move || Ok(Some(stored))).unwrap();

        assert_ne!(first.version, second.version);
        let first_seq: u64 = first.version.split('.').nth(3).unwrap().parse().unwrap();
        let second_seq: u64 = second.version.split('.').nth(3).unwrap().parse().unwrap();
        assert_eq!(second_seq, first_seq + 1);
    }

    #[test]
    fn test_long_revision_survives_normalize() {
        let revision = "1234567890123456789012345";
        let stamp = resolve(Some(revision), fixed_now(), no_prior).unwrap();
        assert!(stamp.version.ends_with(&format!(".{revision}")));
        assert_eq!(
            normalize(&stamp.version).unwrap(),
            format!("2023.11.2.1698898834.{revision}")
        );
    }

    #[test]
    fn test_collision_past_u64_max_carries() {
        let old = "2023.11.02.18446744073709551615";
        let stamp =
            new_version(Some(old), None, fixed_now(), || Ok(Some(old.to_string()))).unwrap();
        assert_eq!(stamp.version, "2023.11.02.18446744073709551616");
        assert_eq!(stamp.build_time, "18446744073709551616");
    }

    #[test]
    fn test_collision_with_leading_zero_sequence() {
        let old = "2023.11.02.0099";
        let stamp =
            new_version(Some(old), None, fixed_now(), || Ok(Some(old.to_string()))).unwrap();
        assert_eq!(stamp.version, "2023.11.02.100");
    }

    #[test]
    fn test_increment() {
        assert_eq!(increment("0"), "1");
        assert_eq!(increment("41"), "42");
        assert_eq!(increment("199"), "200");
        assert_eq!(increment("999"), "1000");
    }

    #[test]
    fn test_normalize_strips_leading_zeros() {
        assert_eq!(normalize("2023.11.02.5").unwrap(), "2023.11.2.5");
        assert_eq!(normalize("2024.01.09.0042").unwrap(), "2024.1.9.42");
        assert_eq!(normalize("2024.000.1").unwrap(), "2024.0.1");
    }

    #[test]
    fn test_normalize_keeps_minimal_versions() {
        assert_eq!(normalize("9.9.9.9").unwrap(), "9.9.9.9");
        assert_eq!(normalize("2023.12.1.7").unwrap(), "2023.12.1.7");
        assert_eq!(
            normalize("2023.12.1.99999999999999999999999").unwrap(),
            "2023.12.1.99999999999999999999999"
        );
    }

    #[test]
    fn test_normalize_rejects_non_integer_component() {
        let err = normalize("2023.11.beta").unwrap_err();
        match err {
            VersionError::InvalidComponent { component, version } => {
                assert_eq!(component, "beta");
                assert_eq!(version, "2023.11.beta");
            }
            other => panic!("Expected InvalidComponent, got {other:?}"),
        }
    }
}
