//! String format checkers for the `format` keyword
//!
//! Checks are syntactic only. A date such as `2019-02-31` has a valid
//! shape and passes.

use std::sync::OnceLock;

use regex::Regex;

use super::types::Format;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$";
// `\d` is Unicode-aware in `regex`; dates take ASCII digits only.
const DATE_PATTERN: &str = r"^[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$";

static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
static DATE: OnceLock<Option<Regex>> = OnceLock::new();

/// Returns true if `s` satisfies `format`. Unrecognised formats never match.
pub fn check_format(format: &Format, s: &str) -> bool {
    match format {
        Format::Email => is_email(s),
        Format::Date => is_date(s),
        Format::Other(_) => false,
    }
}

/// `local@domain.tld` shape, no whitespace, exactly one `@`.
pub fn is_email(s: &str) -> bool {
    matches(&EMAIL, EMAIL_PATTERN, s)
}

/// `YYYY-MM-DD` with month 01-12 and day 01-31.
pub fn is_date(s: &str) -> bool {
    matches(&DATE, DATE_PATTERN, s)
}

fn matches(cell: &OnceLock<Option<Regex>>, pattern: &str, s: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .map_or(false, |re| re.is_match(s))
}
