pub mod history;
pub mod reference;

use blpd_core::ErrorInfo;

/// Every field the fixture universe knows about.
pub const KNOWN_FIELDS: &[&str] = &[
    "NAME",
    "COUNTRY_FULL_NAME",
    "CPN",
    "BETA_ADJ_OVERRIDABLE",
    "PX_LAST",
    "CUR_MKT_CAP",
    "NET_REV",
    "NET_INCOME",
];

pub fn invalid_security() -> ErrorInfo {
    ErrorInfo::new("BAD_SEC", "INVALID_SECURITY", "Unknown/Invalid security")
}

pub fn invalid_field() -> ErrorInfo {
    ErrorInfo::new("BAD_FLD", "INVALID_FIELD", "Field not valid")
}

pub fn not_applicable() -> ErrorInfo {
    ErrorInfo::new(
        "BAD_FLD",
        "NOT_APPLICABLE_TO_REF_DATA",
        "Field not applicable to security",
    )
}

pub fn is_known_field(field: &str) -> bool {
    KNOWN_FIELDS.contains(&field)
}
