use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::BlpError;

/// Topic namespace a security identifier belongs to.
///
/// `Ticker` is the provider's native addressing; every other namespace is
/// addressed as `/<prefix>/<identifier>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prefix {
    /// Native ticker, e.g. `UCG IM Equity`.
    #[default]
    Ticker,
    /// CUSIP number.
    Cusip,
    /// German WPK number.
    Wpk,
    /// ISIN.
    Isin,
    /// Bloomberg unique id.
    Buid,
    /// SEDOL, first listing.
    Sedol1,
    /// SEDOL, second listing.
    Sedol2,
    /// French SICOVAM code.
    Sicovam,
    /// Common code.
    Common,
    /// Bloomberg security id.
    Bsid,
    /// SVM code.
    Svm,
    /// CINS number.
    Cins,
    /// CATS code.
    Cats,
    /// Bloomberg global id (FIGI).
    Bbgid,
}

impl Prefix {
    /// All supported namespaces.
    pub const ALL: [Self; 14] = [
        Self::Ticker,
        Self::Cusip,
        Self::Wpk,
        Self::Isin,
        Self::Buid,
        Self::Sedol1,
        Self::Sedol2,
        Self::Sicovam,
        Self::Common,
        Self::Bsid,
        Self::Svm,
        Self::Cins,
        Self::Cats,
        Self::Bbgid,
    ];

    /// Lowercase tag as it appears in a canonical security string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticker => "ticker",
            Self::Cusip => "cusip",
            Self::Wpk => "wpk",
            Self::Isin => "isin",
            Self::Buid => "buid",
            Self::Sedol1 => "sedol1",
            Self::Sedol2 => "sedol2",
            Self::Sicovam => "sicovam",
            Self::Common => "common",
            Self::Bsid => "bsid",
            Self::Svm => "svm",
            Self::Cins => "cins",
            Self::Cats => "cats",
            Self::Bbgid => "bbgid",
        }
    }

    /// Whether identifiers in this namespace are used unchanged.
    #[must_use]
    pub const fn is_native(self) -> bool {
        matches!(self, Self::Ticker)
    }
}

impl FromStr for Prefix {
    type Err = BlpError;

    /// Case-insensitive; `native-ticker` is accepted as an alias of `ticker`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "native-ticker" {
            return Ok(Self::Ticker);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| BlpError::InvalidPrefix {
                prefix: s.to_string(),
            })
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
