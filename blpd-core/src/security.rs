//! Canonical security strings.
//!
//! A security is addressed either by its native ticker, used unchanged, or by
//! an identifier in one of the provider's namespaces, written
//! `/<namespace>/<identifier>`.

use blpd_types::{BlpError, Prefix};
use serde::{Deserialize, Serialize};

/// Format one identifier for a known namespace.
#[must_use]
pub fn format_security(identifier: &str, prefix: Prefix) -> String {
    if prefix.is_native() {
        identifier.to_string()
    } else {
        format!("/{}/{identifier}", prefix.as_str())
    }
}

/// Format one identifier for a namespace given by name.
///
/// # Errors
/// Returns `InvalidPrefix` if `prefix` names no supported namespace.
pub fn format_security_str(identifier: &str, prefix: &str) -> Result<String, BlpError> {
    let prefix: Prefix = prefix.parse()?;
    Ok(format_security(identifier, prefix))
}

/// Format a list of identifiers.
///
/// A single prefix applies to every identifier; a per-security list is paired
/// positionally and must have exactly one entry per identifier.
///
/// # Errors
/// Returns `InvalidPrefix` for an unknown namespace name and `LengthMismatch`
/// when a per-security list does not line up with `identifiers`.
pub fn format_securities<S: AsRef<str>>(
    identifiers: &[S],
    prefix: impl Into<PrefixSpec>,
) -> Result<Vec<String>, BlpError> {
    let prefixes = prefix.into().resolve(identifiers.len())?;
    Ok(identifiers
        .iter()
        .zip(prefixes)
        .map(|(id, p)| format_security(id.as_ref(), p))
        .collect())
}

/// Namespace selection for a list of securities.
///
/// Names are kept as given and validated when the list is formatted, so a
/// builder can accept them without failing early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixSpec {
    /// One namespace for every security.
    Single(String),
    /// One namespace per security, in security order.
    PerSecurity(Vec<String>),
}

impl Default for PrefixSpec {
    fn default() -> Self {
        Self::Single(Prefix::Ticker.as_str().to_string())
    }
}

impl PrefixSpec {
    /// Validate the names and expand them to one prefix per security.
    ///
    /// # Errors
    /// Returns `InvalidPrefix` or `LengthMismatch`.
    pub fn resolve(&self, securities: usize) -> Result<Vec<Prefix>, BlpError> {
        match self {
            Self::Single(name) => {
                let p: Prefix = name.parse()?;
                Ok(vec![p; securities])
            }
            Self::PerSecurity(names) => {
                if names.len() != securities {
                    return Err(BlpError::LengthMismatch {
                        expected: securities,
                        actual: names.len(),
                    });
                }
                names.iter().map(|n| n.parse()).collect()
            }
        }
    }
}

impl From<Prefix> for PrefixSpec {
    fn from(p: Prefix) -> Self {
        Self::Single(p.as_str().to_string())
    }
}

impl From<&str> for PrefixSpec {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

impl From<String> for PrefixSpec {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<Vec<Prefix>> for PrefixSpec {
    fn from(v: Vec<Prefix>) -> Self {
        Self::PerSecurity(v.iter().map(|p| p.as_str().to_string()).collect())
    }
}

impl From<&[Prefix]> for PrefixSpec {
    fn from(v: &[Prefix]) -> Self {
        Self::PerSecurity(v.iter().map(|p| p.as_str().to_string()).collect())
    }
}

impl<const N: usize> From<[Prefix; N]> for PrefixSpec {
    fn from(v: [Prefix; N]) -> Self {
        Self::PerSecurity(v.iter().map(|p| p.as_str().to_string()).collect())
    }
}

impl From<Vec<&str>> for PrefixSpec {
    fn from(v: Vec<&str>) -> Self {
        Self::PerSecurity(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for PrefixSpec {
    fn from(v: &[&str]) -> Self {
        Self::PerSecurity(v.iter().map(|s| (*s).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PrefixSpec {
    fn from(v: [&str; N]) -> Self {
        Self::PerSecurity(v.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<Vec<String>> for PrefixSpec {
    fn from(v: Vec<String>) -> Self {
        Self::PerSecurity(v)
    }
}

/// An ordered list of strings that also accepts a single string.
///
/// Used for security and field arguments: `"NAME"` and `["NAME"]` are the same list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringList(Vec<String>);

impl StringList {
    /// Borrow the items.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Take the items.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// True when the list has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for StringList {
    fn from(s: &str) -> Self {
        Self(vec![s.to_string()])
    }
}

impl From<String> for StringList {
    fn from(s: String) -> Self {
        Self(vec![s])
    }
}

impl From<&String> for StringList {
    fn from(s: &String) -> Self {
        Self(vec![s.clone()])
    }
}

impl From<Vec<String>> for StringList {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl From<Vec<&str>> for StringList {
    fn from(v: Vec<&str>) -> Self {
        Self(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for StringList {
    fn from(v: &[&str]) -> Self {
        Self(v.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<&[String]> for StringList {
    fn from(v: &[String]) -> Self {
        Self(v.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for StringList {
    fn from(v: [&str; N]) -> Self {
        Self(v.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<StringList> for Vec<String> {
    fn from(l: StringList) -> Self {
        l.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_is_used_unchanged() {
        assert_eq!(format_security("UCG IM Equity", Prefix::Ticker), "UCG IM Equity");
        assert_eq!(
            format_security_str("UCG IM Equity", "native-ticker").unwrap(),
            "UCG IM Equity"
        );
    }

    #[test]
    fn namespaced_identifiers_get_a_topic_prefix() {
        assert_eq!(
            format_security_str("IT0005239360", "ISIN").unwrap(),
            "/isin/IT0005239360"
        );
        assert_eq!(format_security("BBG000BBJQV0", Prefix::Bbgid), "/bbgid/BBG000BBJQV0");
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        let err = format_security_str("X", "not-a-prefix").unwrap_err();
        assert!(matches!(err, BlpError::InvalidPrefix { .. }));
    }

    #[test]
    fn per_security_prefixes_pair_positionally() {
        let out = format_securities(
            &["UCG IM Equity", "IT0005239360"],
            vec![Prefix::Ticker, Prefix::Isin],
        )
        .unwrap();
        assert_eq!(out, vec!["UCG IM Equity", "/isin/IT0005239360"]);
    }

    #[test]
    fn per_security_prefixes_must_match_length() {
        let err = format_securities(&["A", "B"], ["isin"]).unwrap_err();
        assert_eq!(
            err,
            BlpError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn single_string_is_a_one_item_list() {
        let l: StringList = "NAME".into();
        assert_eq!(l.into_vec(), vec!["NAME".to_string()]);
    }
}
