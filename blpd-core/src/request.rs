//! Provider requests built from user-level arguments.
//!
//! A [`Request`] is an immutable value produced by one of the two builders.
//! Every argument is validated in `build()`, before anything reaches a
//! session: securities are formatted, dates parsed, and short-code options
//! resolved to their enumerations. Nothing falls back to a default silently.

use std::fmt;
use std::str::FromStr;

use blpd_types::{
    BlpError, FillMethod, NonTradingDayFill, OverrideOption, Periodicity, PricingOption, ShortCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::security::{PrefixSpec, StringList, format_securities};

/// Ordered field-id to value overrides applied to every security of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overrides(Vec<(String, String)>);

impl Overrides {
    /// An empty override set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Set `field` to `value`; an existing entry keeps its position.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let (field, value) = (field.into(), value.into());
        match self.0.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.0.push((field, value)),
        }
    }

    /// Value currently set for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build overrides from a loosely typed JSON document.
    ///
    /// The document must be an object whose values are strings, numbers, or
    /// booleans. Entries follow the document map's key order.
    ///
    /// # Errors
    /// Returns `InvalidOverrides` for anything else, or for an empty field id.
    pub fn from_json(doc: &serde_json::Value) -> Result<Self, BlpError> {
        let serde_json::Value::Object(map) = doc else {
            return Err(BlpError::InvalidOverrides(format!(
                "expected an object of field ids to values, got {doc}"
            )));
        };
        let mut out = Self::new();
        for (field, value) in map {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(BlpError::InvalidOverrides(format!(
                        "value of '{field}' is not a scalar: {other}"
                    )));
                }
            };
            out.insert(field.as_str(), value);
        }
        out.validate()?;
        Ok(out)
    }

    fn validate(&self) -> Result<(), BlpError> {
        if self.0.iter().any(|(f, _)| f.trim().is_empty()) {
            return Err(BlpError::InvalidOverrides("empty field id".into()));
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

/// One end of a historical date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateBound {
    /// A calendar date.
    Date(NaiveDate),
    /// A fiscal year of the issuer, written `FYyyyy`.
    FiscalYear(i32),
    /// A calendar year, written `CYyyyy`.
    CalendarYear(i32),
}

impl DateBound {
    /// Parse `YYYYMMDD`, `YYYY-MM-DD`, `FYyyyy`, or `CYyyyy`.
    ///
    /// # Errors
    /// Returns `InvalidDate` for anything else.
    pub fn parse(input: &str) -> Result<Self, BlpError> {
        let s = input.trim();
        let upper = s.to_ascii_uppercase();
        for (tag, make) in [
            ("FY", Self::FiscalYear as fn(i32) -> Self),
            ("CY", Self::CalendarYear as fn(i32) -> Self),
        ] {
            if let Some(year) = upper.strip_prefix(tag) {
                if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(y) = year.parse() {
                        return Ok(make(y));
                    }
                }
                return Err(BlpError::InvalidDate(input.to_string()));
            }
        }
        let format = if s.len() == 8 { "%Y%m%d" } else { "%Y-%m-%d" };
        if s.len() != 8 && s.len() != 10 {
            return Err(BlpError::InvalidDate(input.to_string()));
        }
        NaiveDate::parse_from_str(s, format)
            .map(Self::Date)
            .map_err(|_| BlpError::InvalidDate(input.to_string()))
    }

    /// The form sent to the provider: `YYYYMMDD` or the year token.
    #[must_use]
    pub fn wire(&self) -> String {
        match self {
            Self::Date(d) => d.format("%Y%m%d").to_string(),
            Self::FiscalYear(y) => format!("FY{y}"),
            Self::CalendarYear(y) => format!("CY{y}"),
        }
    }

    /// First calendar day covered by this bound.
    ///
    /// Year tokens are read as calendar years.
    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        match self {
            Self::Date(d) => *d,
            Self::FiscalYear(y) | Self::CalendarYear(y) => {
                NaiveDate::from_ymd_opt(*y, 1, 1).unwrap_or(NaiveDate::MIN)
            }
        }
    }

    /// Last calendar day covered by this bound.
    ///
    /// Year tokens are read as calendar years.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        match self {
            Self::Date(d) => *d,
            Self::FiscalYear(y) | Self::CalendarYear(y) => {
                NaiveDate::from_ymd_opt(*y, 12, 31).unwrap_or(NaiveDate::MAX)
            }
        }
    }
}

impl FromStr for DateBound {
    type Err = BlpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire())
    }
}

impl From<NaiveDate> for DateBound {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

/// Formatting flags of a point-in-time request. Unset flags are not sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOptions {
    /// Return entitlement ids alongside values.
    pub return_eids: Option<bool>,
    /// Return every value as its formatted string.
    pub return_formatted_value: Option<bool>,
    /// Return times in UTC.
    pub use_utc_time: Option<bool>,
    /// Force delayed exchange data.
    pub forced_delay: Option<bool>,
}

/// Options of a historical request. Unset options are left to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalOptions {
    /// First date of the series.
    pub start: DateBound,
    /// Last date of the series; the latest available when unset.
    pub end: Option<DateBound>,
    /// Sampling of the series.
    pub periodicity: Option<Periodicity>,
    /// Which non-trading days appear.
    pub fill_days: Option<NonTradingDayFill>,
    /// Value used on filled days.
    pub fill_method: Option<FillMethod>,
    /// Price or yield for fixed income.
    pub pricing: Option<PricingOption>,
    /// Price the overrides refer to.
    pub override_option: Option<OverrideOption>,
    /// Calendar code override, e.g. `US`.
    pub calendar: Option<String>,
    /// Currency the values are converted to.
    pub currency: Option<String>,
    /// Cap on the number of points per security.
    pub max_data_points: Option<u32>,
    /// Adjust for abnormal cash dividends.
    pub adjustment_abnormal: Option<bool>,
    /// Adjust for splits.
    pub adjustment_split: Option<bool>,
    /// Adjust for normal cash dividends.
    pub adjustment_normal: Option<bool>,
    /// Follow the terminal's default adjustment settings.
    pub adjustment_follow_dpdf: Option<bool>,
    /// Return relative dates (e.g. `2017 Q4`) alongside values.
    pub return_relative_date: Option<bool>,
}

impl HistoricalOptions {
    /// Options with only a start date set.
    #[must_use]
    pub const fn starting(start: DateBound) -> Self {
        Self {
            start,
            end: None,
            periodicity: None,
            fill_days: None,
            fill_method: None,
            pricing: None,
            override_option: None,
            calendar: None,
            currency: None,
            max_data_points: None,
            adjustment_abnormal: None,
            adjustment_split: None,
            adjustment_normal: None,
            adjustment_follow_dpdf: None,
            return_relative_date: None,
        }
    }
}

/// What a request asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// Current values of each field.
    Reference(ReferenceOptions),
    /// A dated series of each field.
    Historical(HistoricalOptions),
}

/// A validated request ready to be sent on a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    kind: RequestKind,
    securities: Vec<String>,
    fields: Vec<String>,
    overrides: Overrides,
}

impl Request {
    /// Start a point-in-time request.
    pub fn reference(
        securities: impl Into<StringList>,
        fields: impl Into<StringList>,
    ) -> ReferenceRequestBuilder {
        ReferenceRequestBuilder::new(securities, fields)
    }

    /// Start a historical request from `start`.
    pub fn historical(
        securities: impl Into<StringList>,
        fields: impl Into<StringList>,
        start: impl Into<String>,
    ) -> HistoricalRequestBuilder {
        HistoricalRequestBuilder::new(securities, fields, start)
    }

    /// Request kind with its options.
    #[must_use]
    pub const fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Canonical security strings, in input order.
    #[must_use]
    pub fn securities(&self) -> &[String] {
        &self.securities
    }

    /// Field mnemonics, in input order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Overrides applied to every security.
    #[must_use]
    pub const fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    /// True for historical requests.
    #[must_use]
    pub const fn is_historical(&self) -> bool {
        matches!(self.kind, RequestKind::Historical(_))
    }

    /// Provider operation name.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self.kind {
            RequestKind::Reference(_) => "ReferenceDataRequest",
            RequestKind::Historical(_) => "HistoricalDataRequest",
        }
    }

    /// Reference flags, for point-in-time requests.
    #[must_use]
    pub const fn reference_options(&self) -> Option<&ReferenceOptions> {
        match &self.kind {
            RequestKind::Reference(o) => Some(o),
            RequestKind::Historical(_) => None,
        }
    }

    /// Historical options, for historical requests.
    #[must_use]
    pub const fn historical_options(&self) -> Option<&HistoricalOptions> {
        match &self.kind {
            RequestKind::Historical(o) => Some(o),
            RequestKind::Reference(_) => None,
        }
    }
}

fn non_empty(list: StringList, what: &str) -> Result<Vec<String>, BlpError> {
    let items = list.into_vec();
    if items.is_empty() {
        return Err(BlpError::InvalidArg(format!("at least one {what} is required")));
    }
    Ok(items)
}

fn parse_code<T: ShortCode>(code: Option<&str>) -> Result<Option<T>, BlpError> {
    code.map(T::from_code).transpose()
}

/// Builder for point-in-time requests.
#[derive(Debug, Clone)]
pub struct ReferenceRequestBuilder {
    securities: StringList,
    fields: StringList,
    prefix: PrefixSpec,
    overrides: Overrides,
    options: ReferenceOptions,
}

impl ReferenceRequestBuilder {
    /// Start a builder for `securities` and `fields`.
    pub fn new(securities: impl Into<StringList>, fields: impl Into<StringList>) -> Self {
        Self {
            securities: securities.into(),
            fields: fields.into(),
            prefix: PrefixSpec::default(),
            overrides: Overrides::new(),
            options: ReferenceOptions::default(),
        }
    }

    /// Namespace of the security identifiers (default: native ticker).
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<PrefixSpec>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Replace the override set.
    #[must_use]
    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Add or replace one override.
    #[must_use]
    pub fn override_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(field, value);
        self
    }

    /// Return entitlement ids alongside values.
    #[must_use]
    pub const fn return_eids(mut self, on: bool) -> Self {
        self.options.return_eids = Some(on);
        self
    }

    /// Return every value as its formatted string.
    #[must_use]
    pub const fn return_formatted_value(mut self, on: bool) -> Self {
        self.options.return_formatted_value = Some(on);
        self
    }

    /// Return times in UTC.
    #[must_use]
    pub const fn use_utc_time(mut self, on: bool) -> Self {
        self.options.use_utc_time = Some(on);
        self
    }

    /// Force delayed exchange data.
    #[must_use]
    pub const fn forced_delay(mut self, on: bool) -> Self {
        self.options.forced_delay = Some(on);
        self
    }

    /// Validate and freeze the request.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty security or field list,
    /// `InvalidPrefix`/`LengthMismatch` from formatting, and
    /// `InvalidOverrides` for an empty override field id.
    pub fn build(self) -> Result<Request, BlpError> {
        let securities = non_empty(self.securities, "security")?;
        let fields = non_empty(self.fields, "field")?;
        let securities = format_securities(&securities, self.prefix)?;
        self.overrides.validate()?;
        Ok(Request {
            kind: RequestKind::Reference(self.options),
            securities,
            fields,
            overrides: self.overrides,
        })
    }
}

/// Builder for historical requests.
///
/// Options are given as the provider's short codes and resolved in `build()`.
#[derive(Debug, Clone)]
pub struct HistoricalRequestBuilder {
    securities: StringList,
    fields: StringList,
    prefix: PrefixSpec,
    overrides: Overrides,
    start: String,
    end: Option<String>,
    periodicity: Option<String>,
    fill_days: Option<String>,
    fill_method: Option<String>,
    pricing: Option<String>,
    override_option: Option<String>,
    calendar: Option<String>,
    currency: Option<String>,
    max_data_points: Option<u32>,
    adjustment_abnormal: Option<bool>,
    adjustment_split: Option<bool>,
    adjustment_normal: Option<bool>,
    adjustment_follow_dpdf: Option<bool>,
    return_relative_date: Option<bool>,
}

impl HistoricalRequestBuilder {
    /// Start a builder for `securities` and `fields` from `start`.
    pub fn new(
        securities: impl Into<StringList>,
        fields: impl Into<StringList>,
        start: impl Into<String>,
    ) -> Self {
        Self {
            securities: securities.into(),
            fields: fields.into(),
            prefix: PrefixSpec::default(),
            overrides: Overrides::new(),
            start: start.into(),
            end: None,
            periodicity: None,
            fill_days: None,
            fill_method: None,
            pricing: None,
            override_option: None,
            calendar: None,
            currency: None,
            max_data_points: None,
            adjustment_abnormal: None,
            adjustment_split: None,
            adjustment_normal: None,
            adjustment_follow_dpdf: None,
            return_relative_date: None,
        }
    }

    /// Last date of the series.
    #[must_use]
    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Namespace of the security identifiers (default: native ticker).
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<PrefixSpec>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Replace the override set.
    #[must_use]
    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Add or replace one override.
    #[must_use]
    pub fn override_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(field, value);
        self
    }

    /// Two-letter periodicity code, adjustment then selection (`"CD"`, `"FY"`).
    #[must_use]
    pub fn periodicity(mut self, code: impl Into<String>) -> Self {
        self.periodicity = Some(code.into());
        self
    }

    /// Non-trading day fill: `A`, `T`, or `W`.
    #[must_use]
    pub fn fill_days(mut self, code: impl Into<String>) -> Self {
        self.fill_days = Some(code.into());
        self
    }

    /// Fill method: `N` or `P`.
    #[must_use]
    pub fn fill_method(mut self, code: impl Into<String>) -> Self {
        self.fill_method = Some(code.into());
        self
    }

    /// Pricing option: `P` or `Y`.
    #[must_use]
    pub fn pricing(mut self, code: impl Into<String>) -> Self {
        self.pricing = Some(code.into());
        self
    }

    /// Override option: `C` or `G`.
    #[must_use]
    pub fn override_option(mut self, code: impl Into<String>) -> Self {
        self.override_option = Some(code.into());
        self
    }

    /// Calendar code override.
    #[must_use]
    pub fn calendar(mut self, code: impl Into<String>) -> Self {
        self.calendar = Some(code.into());
        self
    }

    /// Currency the values are converted to.
    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Cap on the number of points per security.
    #[must_use]
    pub const fn max_data_points(mut self, n: u32) -> Self {
        self.max_data_points = Some(n);
        self
    }

    /// Adjust for abnormal cash dividends.
    #[must_use]
    pub const fn adjustment_abnormal(mut self, on: bool) -> Self {
        self.adjustment_abnormal = Some(on);
        self
    }

    /// Adjust for splits.
    #[must_use]
    pub const fn adjustment_split(mut self, on: bool) -> Self {
        self.adjustment_split = Some(on);
        self
    }

    /// Adjust for normal cash dividends.
    #[must_use]
    pub const fn adjustment_normal(mut self, on: bool) -> Self {
        self.adjustment_normal = Some(on);
        self
    }

    /// Follow the terminal's default adjustment settings.
    #[must_use]
    pub const fn adjustment_follow_dpdf(mut self, on: bool) -> Self {
        self.adjustment_follow_dpdf = Some(on);
        self
    }

    /// Return relative dates alongside values.
    #[must_use]
    pub const fn return_relative_date(mut self, on: bool) -> Self {
        self.return_relative_date = Some(on);
        self
    }

    /// Validate and freeze the request.
    ///
    /// # Errors
    /// Besides the checks of [`ReferenceRequestBuilder::build`], returns
    /// `InvalidDate` for unparseable or inverted bounds and `InvalidOption`
    /// naming the first option group whose code was not recognized.
    pub fn build(self) -> Result<Request, BlpError> {
        let securities = non_empty(self.securities, "security")?;
        let fields = non_empty(self.fields, "field")?;
        let securities = format_securities(&securities, self.prefix)?;

        let start = DateBound::parse(&self.start)?;
        let end = self.end.as_deref().map(DateBound::parse).transpose()?;
        if let Some(end) = end {
            check_range(start, end)?;
        }

        let periodicity = self
            .periodicity
            .as_deref()
            .map(Periodicity::from_code)
            .transpose()?;
        let options = HistoricalOptions {
            start,
            end,
            periodicity,
            fill_days: parse_code(self.fill_days.as_deref())?,
            fill_method: parse_code(self.fill_method.as_deref())?,
            pricing: parse_code(self.pricing.as_deref())?,
            override_option: parse_code(self.override_option.as_deref())?,
            calendar: self.calendar,
            currency: self.currency,
            max_data_points: self.max_data_points,
            adjustment_abnormal: self.adjustment_abnormal,
            adjustment_split: self.adjustment_split,
            adjustment_normal: self.adjustment_normal,
            adjustment_follow_dpdf: self.adjustment_follow_dpdf,
            return_relative_date: self.return_relative_date,
        };
        self.overrides.validate()?;

        Ok(Request {
            kind: RequestKind::Historical(options),
            securities,
            fields,
            overrides: self.overrides,
        })
    }
}

fn check_range(start: DateBound, end: DateBound) -> Result<(), BlpError> {
    let inverted = match (start, end) {
        (DateBound::Date(s), DateBound::Date(e)) => s > e,
        (DateBound::FiscalYear(s), DateBound::FiscalYear(e))
        | (DateBound::CalendarYear(s), DateBound::CalendarYear(e)) => s > e,
        _ => false,
    };
    if inverted {
        return Err(BlpError::InvalidDate(format!(
            "start {start} is after end {end}"
        )));
    }
    Ok(())
}
