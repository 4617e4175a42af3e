use blpd_core::{Overrides, Value};

/// Current value of `field` for `security`, if the universe holds one.
pub fn value(security: &str, field: &str, overrides: &Overrides) -> Option<Value> {
    let v = match (canonical(security)?, field) {
        ("UCG IM Equity", "NAME") => Value::from("UNICREDIT SPA"),
        ("UCG IM Equity", "COUNTRY_FULL_NAME") => Value::from("ITALY"),
        ("UCG IM Equity", "BETA_ADJ_OVERRIDABLE") => {
            match overrides.get("BETA_OVERRIDE_REL_INDEX") {
                Some("ITSMBANC") => Value::Float(1.043_852),
                _ => Value::Float(1.219_874),
            }
        }
        ("UCG IM Equity", "PX_LAST") => Value::Float(17.448),
        ("ISP IM Equity", "NAME") => Value::from("INTESA SANPAOLO"),
        ("ISP IM Equity", "COUNTRY_FULL_NAME") => Value::from("ITALY"),
        ("ISP IM Equity", "BETA_ADJ_OVERRIDABLE") => {
            match overrides.get("BETA_OVERRIDE_REL_INDEX") {
                Some("ITSMBANC") => Value::Float(0.982_117),
                _ => Value::Float(1.102_536),
            }
        }
        ("ISP IM Equity", "PX_LAST") => Value::Float(3.125),
        ("EI643289@BGN Corp", "NAME") => Value::from("UNICREDIT SPA"),
        ("EI643289@BGN Corp", "CPN") => Value::Float(6.125),
        ("EI643289@BGN Corp", "COUNTRY_FULL_NAME") => Value::from("ITALY"),
        _ => return None,
    };
    Some(v)
}

/// Fixture key of a canonical security string, or `None` for unknown securities.
pub fn canonical(security: &str) -> Option<&'static str> {
    match security {
        "UCG IM Equity" | "/isin/IT0005239360" => Some("UCG IM Equity"),
        "ISP IM Equity" | "/isin/IT0000072618" => Some("ISP IM Equity"),
        "EI643289@BGN Corp" => Some("EI643289@BGN Corp"),
        _ => None,
    }
}
