use chrono::NaiveDate;

use super::reference::canonical;

/// Dated values of `field` for `security` within `[from, to]`, ascending.
///
/// Returns `None` when the universe has no series for the pair.
pub fn series(
    security: &str,
    field: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Option<Vec<(NaiveDate, f64)>> {
    let rows: &[(&str, f64)] = match (canonical(security)?, field) {
        ("UCG IM Equity", "PX_LAST") => &[
            ("2018-04-10", 17.448),
            ("2018-04-11", 17.246),
            ("2018-04-12", 17.588),
            ("2018-04-13", 17.494),
        ],
        ("UCG IM Equity", "CUR_MKT_CAP") => &[
            ("2018-04-10", 38_906.71),
            ("2018-04-11", 38_456.27),
            ("2018-04-12", 39_218.43),
            ("2018-04-13", 39_008.88),
        ],
        ("UCG IM Equity", "NET_REV") => &[("2016-12-31", 19_484.224), ("2017-12-31", 20_130.646)],
        ("UCG IM Equity", "NET_INCOME") => &[("2016-12-31", -11_790.0), ("2017-12-31", 5_473.0)],
        ("ISP IM Equity", "PX_LAST") => &[
            ("2018-04-10", 3.125),
            ("2018-04-11", 3.097),
            ("2018-04-12", 3.135),
            ("2018-04-13", 3.118),
        ],
        ("ISP IM Equity", "CUR_MKT_CAP") => &[
            ("2018-04-10", 52_535.88),
            ("2018-04-11", 52_065.17),
            ("2018-04-12", 52_703.99),
            ("2018-04-13", 52_418.19),
        ],
        ("ISP IM Equity", "NET_REV") => &[("2016-12-31", 17_107.0), ("2017-12-31", 18_958.0)],
        ("ISP IM Equity", "NET_INCOME") => &[("2016-12-31", 3_111.0), ("2017-12-31", 7_316.0)],
        _ => return None,
    };
    Some(
        rows.iter()
            .filter_map(|(d, v)| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .ok()
                    .map(|d| (d, *v))
            })
            .filter(|(d, _)| *d >= from && *d <= to)
            .collect(),
    )
}

/// Euro-denominated conversion rate into `currency`.
pub fn fx_rate(currency: &str) -> Option<f64> {
    match currency.to_ascii_uppercase().as_str() {
        "EUR" => Some(1.0),
        "USD" => Some(1.2336),
        "GBP" => Some(0.8682),
        "CHF" => Some(1.1843),
        _ => None,
    }
}

/// Fields whose values are amounts in the security's currency.
pub fn is_monetary(field: &str) -> bool {
    matches!(field, "PX_LAST" | "CUR_MKT_CAP" | "NET_REV" | "NET_INCOME")
}

/// Trading calendars the universe recognizes.
pub fn is_known_calendar(code: &str) -> bool {
    matches!(code.to_ascii_uppercase().as_str(), "IT" | "US" | "GB" | "DE" | "FR")
}
