// Format checks shared by builders and document validation.

use crate::error::{DefinitionError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

const RFC1123_LABEL_PATTERN: &str = "^[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$";
const SEMVER_PATTERN: &str = r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$";

// ISO 8601 duration without the lookaheads the `regex` crate lacks; the
// "at least one component" rule is checked separately.
const ISO8601_DURATION_PATTERN: &str = r"^P(\d+(?:\.\d+)?Y)?(\d+(?:\.\d+)?M)?(\d+(?:\.\d+)?W)?(\d+(?:\.\d+)?D)?(T(\d+(?:\.\d+)?H)?(\d+(?:\.\d+)?M)?(\d+(?:\.\d+)?S)?)?$";

static RFC1123_LABEL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(RFC1123_LABEL_PATTERN)
        .inspect_err(|e| tracing::error!("invalid RFC1123 pattern: {:?}", e))
        .ok()
});
static SEMVER: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(SEMVER_PATTERN)
        .inspect_err(|e| tracing::error!("invalid semver pattern: {:?}", e))
        .ok()
});

static ISO8601_DURATION: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(ISO8601_DURATION_PATTERN)
        .inspect_err(|e| tracing::error!("invalid duration pattern: {:?}", e))
        .ok()
});

fn matches(re: &Lazy<Option<Regex>>, value: &str) -> bool {
    (**re).as_ref().is_some_and(|re| re.is_match(value))
}

/// RFC1123 label: alphanumerics and '-', 1 to 63 characters, no leading or
/// trailing '-'. Used for `document.name` and `document.namespace`.
pub fn validate_name(field: &str, value: &str) -> Result<()> {
    if matches(&RFC1123_LABEL, value) {
        Ok(())
    } else {
        Err(DefinitionError::invalid_format(
            field,
            value,
            "must be a RFC1123 label",
        ))
    }
}

/// Strict SemVer 2.0 (`1.0.0`, `1.0.0-alpha.1+build.5`).
pub fn validate_semver(field: &str, value: &str) -> Result<()> {
    if matches(&SEMVER, value) {
        Ok(())
    } else {
        Err(DefinitionError::invalid_format(
            field,
            value,
            "must be a semantic version (SemVer 2.0)",
        ))
    }
}

/// `PT5S`, `P1DT12H`, or a runtime expression evaluated later.
pub fn validate_duration_expression(field: &str, value: &str) -> Result<()> {
    if is_runtime_expression(value) {
        return Ok(());
    }
    let has_component = value.len() > 1 && !value.ends_with('T');
    if has_component && matches(&ISO8601_DURATION, value) {
        Ok(())
    } else {
        Err(DefinitionError::invalid_format(
            field,
            value,
            "must be an ISO 8601 duration",
        ))
    }
}

fn has_invalid_uri_chars(value: &str) -> bool {
    value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Absolute URI (scheme required).
pub fn validate_uri(field: &str, value: &str) -> Result<Url> {
    if has_invalid_uri_chars(value) {
        return Err(DefinitionError::invalid_format(
            field,
            value,
            "must be a well-formed URI",
        ));
    }
    Url::parse(value).map_err(|e| {
        DefinitionError::invalid_format(field, value, format!("must be an absolute URI: {e}"))
    })
}

/// Absolute or relative URI reference; URI templates (`/users/{id}`) are accepted.
pub fn validate_uri_reference(field: &str, value: &str) -> Result<()> {
    if has_invalid_uri_chars(value) {
        return Err(DefinitionError::invalid_format(
            field,
            value,
            "must be a well-formed URI reference",
        ));
    }
    match Url::parse(value) {
        Ok(_) => Ok(()),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(()),
        Err(e) => Err(DefinitionError::invalid_format(
            field,
            value,
            format!("must be a well-formed URI reference: {e}"),
        )),
    }
}

pub fn is_absolute_uri(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Runtime expressions are written as `${ ... }`.
pub fn is_runtime_expression(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.starts_with("${") && trimmed.ends_with('}')
}
