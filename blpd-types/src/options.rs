//! Historical request option groups.
//!
//! Each group is addressed by a one-letter short code at the user surface and
//! by an enumeration name on the wire. Parsing is exhaustive: an unknown code
//! is rejected with [`BlpError::InvalidOption`] naming the group, never mapped
//! to a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::BlpError;

/// Common surface of every short-code option group.
pub trait ShortCode: Sized + Copy + 'static {
    /// Group label used in `InvalidOption` errors.
    const GROUP: &'static str;

    /// Every member of the group, in declaration order.
    fn all() -> &'static [Self];

    /// One-letter code accepted from users.
    fn code(self) -> char;

    /// Enumeration name sent to the provider.
    fn wire_name(self) -> &'static str;

    /// Parse a short code (case-insensitive, surrounding whitespace ignored).
    ///
    /// # Errors
    /// Returns `InvalidOption` naming [`Self::GROUP`] if the code is unknown.
    fn from_code(code: &str) -> Result<Self, BlpError> {
        let mut chars = code.trim().chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            let c = c.to_ascii_uppercase();
            if let Some(found) = Self::all().iter().copied().find(|v| v.code() == c) {
                return Ok(found);
            }
        }
        Err(BlpError::invalid_option(Self::GROUP, code))
    }
}

macro_rules! short_code_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $group:literal {
            $( $(#[$vmeta:meta])* $variant:ident => ($code:literal, $wire:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl ShortCode for $name {
            const GROUP: &'static str = $group;

            fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }

            fn code(self) -> char {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            fn wire_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = BlpError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_code(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.wire_name())
            }
        }
    };
}

short_code_enum! {
    /// How non-trading days are filled in a historical series.
    NonTradingDayFill, "non-trading day fill" {
        /// Include every calendar day.
        AllCalendarDays => ('A', "ALL_CALENDAR_DAYS"),
        /// Only days the security traded.
        ActiveDaysOnly => ('T', "ACTIVE_DAYS_ONLY"),
        /// Weekdays are returned even when the market was closed.
        NonTradingWeekdays => ('W', "NON_TRADING_WEEKDAYS"),
    }
}

short_code_enum! {
    /// Value used for filled (non-trading) dates.
    FillMethod, "fill method" {
        /// Leave the value empty.
        NilValue => ('N', "NIL_VALUE"),
        /// Carry the previous value forward.
        PreviousValue => ('P', "PREVIOUS_VALUE"),
    }
}

short_code_enum! {
    /// Calendar the periodicity is anchored to.
    PeriodicityAdjustment, "periodicity adjustment" {
        /// Anchored to the end date.
        Actual => ('A', "ACTUAL"),
        /// Calendar periods.
        Calendar => ('C', "CALENDAR"),
        /// Fiscal periods of the issuer.
        Fiscal => ('F', "FISCAL"),
    }
}

short_code_enum! {
    /// Sampling frequency of a historical series.
    PeriodicitySelection, "periodicity selection" {
        /// One point per day.
        Daily => ('D', "DAILY"),
        /// One point per week.
        Weekly => ('W', "WEEKLY"),
        /// One point per month.
        Monthly => ('M', "MONTHLY"),
        /// One point per quarter.
        Quarterly => ('Q', "QUARTERLY"),
        /// One point per half year.
        SemiAnnually => ('S', "SEMI_ANNUALLY"),
        /// One point per year.
        Yearly => ('Y', "YEARLY"),
    }
}

short_code_enum! {
    /// Whether fixed income securities are priced or yielded.
    PricingOption, "pricing option" {
        /// Return prices.
        Price => ('P', "PRICING_OPTION_PRICE"),
        /// Return yields.
        Yield => ('Y', "PRICING_OPTION_YIELD"),
    }
}

short_code_enum! {
    /// Which price the historical overrides apply to.
    OverrideOption, "override option" {
        /// Closing price.
        Close => ('C', "OVERRIDE_OPTION_CLOSE"),
        /// Global pricing average.
        Gpa => ('G', "OVERRIDE_OPTION_GPA"),
    }
}

/// Periodicity of a historical series: adjustment paired with a sampling frequency.
///
/// Written as a two-letter code, adjustment first (`"FY"` is fiscal yearly,
/// `"CD"` calendar daily).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Periodicity {
    /// Calendar the periods follow.
    pub adjustment: PeriodicityAdjustment,
    /// Sampling frequency.
    pub selection: PeriodicitySelection,
}

impl Periodicity {
    /// Pair an adjustment with a selection.
    #[must_use]
    pub const fn new(adjustment: PeriodicityAdjustment, selection: PeriodicitySelection) -> Self {
        Self {
            adjustment,
            selection,
        }
    }

    /// Parse a two-letter periodicity code.
    ///
    /// Both halves are validated independently; the error names the half that failed.
    ///
    /// # Errors
    /// Returns `InvalidOption` for the "periodicity" group when the code is not two
    /// letters long, or for the adjustment/selection group that was not recognized.
    pub fn from_code(code: &str) -> Result<Self, BlpError> {
        let trimmed = code.trim();
        let mut chars = trimmed.chars();
        let (Some(adj), Some(sel), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(BlpError::invalid_option("periodicity", code));
        };
        let adjustment = PeriodicityAdjustment::from_code(&adj.to_string())?;
        let selection = PeriodicitySelection::from_code(&sel.to_string())?;
        Ok(Self::new(adjustment, selection))
    }

    /// Two-letter code, adjustment first.
    #[must_use]
    pub fn code(self) -> String {
        [self.adjustment.code(), self.selection.code()]
            .iter()
            .collect()
    }
}

impl FromStr for Periodicity {
    type Err = BlpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}
