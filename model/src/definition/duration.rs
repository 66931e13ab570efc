use serde::{Deserialize, Serialize};
use swdsl_base::error::Result;
use swdsl_base::validation::{is_runtime_expression, validate_duration_expression};

/// Duration written either as inline components or as an ISO 8601
/// expression (`PT5S`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Duration {
    Inline {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        days: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hours: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minutes: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seconds: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        milliseconds: Option<u64>,
    },
    Expression(String),
}

impl From<&str> for Duration {
    fn from(value: &str) -> Self {
        Duration::Expression(value.to_string())
    }
}

impl From<std::time::Duration> for Duration {
    fn from(value: std::time::Duration) -> Self {
        Duration::from_millis(value.as_millis().min(u64::MAX as u128) as u64)
    }
}

impl Duration {
    pub fn from_millis(milliseconds: u64) -> Self {
        let r = milliseconds;
        let ms = r % 1000;
        let r = r / 1000;
        let seconds = r % 60;
        let r = r / 60;
        let minutes = r % 60;
        let r = r / 60;
        let hours = r % 24;
        let days = r / 24;

        let non_zero = |v: u64| if v == 0 { None } else { Some(v) };
        Duration::Inline {
            days: non_zero(days),
            hours: non_zero(hours),
            minutes: non_zero(minutes),
            seconds: non_zero(seconds),
            milliseconds: if milliseconds == 0 { Some(0) } else { non_zero(ms) },
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, Duration::Expression(_))
    }

    /// Total length in milliseconds. `None` for runtime expressions, which
    /// are only known at execution time.
    pub fn to_millis(&self) -> Option<u64> {
        match self {
            Duration::Inline {
                days,
                hours,
                minutes,
                seconds,
                milliseconds,
            } => {
                let parts = [
                    (days, 24 * 60 * 60 * 1000),
                    (hours, 60 * 60 * 1000),
                    (minutes, 60 * 1000),
                    (seconds, 1000),
                    (milliseconds, 1),
                ];
                Some(parts.iter().fold(0u64, |total, (value, unit)| {
                    value.map_or(total, |v| total.saturating_add(v.saturating_mul(*unit)))
                }))
            }
            Duration::Expression(expr) if is_runtime_expression(expr) => None,
            Duration::Expression(expr) => Some(iso8601_to_millis(expr)),
        }
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        match self {
            Duration::Inline { .. } => Ok(()),
            Duration::Expression(expr) => validate_duration_expression(field, expr),
        }
    }
}

// P[n]Y[n]M[n]W[n]DT[n]H[n]M[n]S; years and months are approximated.
fn iso8601_to_millis(expr: &str) -> u64 {
    let (date_part, time_part) = match expr.split_once('T') {
        Some((date, time)) => (date, time),
        None => (expr, ""),
    };
    let date_part = date_part.strip_prefix('P').unwrap_or(date_part);

    let sum = |part: &str, unit_of: fn(char) -> f64| {
        let mut total = 0f64;
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
            } else if !number.is_empty() {
                total += number.parse::<f64>().unwrap_or(0.0) * unit_of(c);
                number.clear();
            }
        }
        total
    };
    const DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;
    let date = sum(date_part, |c| match c {
        'Y' => 365.25 * DAY,
        'M' => 30.44 * DAY,
        'W' => 7.0 * DAY,
        'D' => DAY,
        _ => 0.0,
    });
    let time = sum(time_part, |c| match c {
        'H' => 60.0 * 60.0 * 1000.0,
        'M' => 60.0 * 1000.0,
        'S' => 1000.0,
        _ => 0.0,
    });
    (date + time) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_millis_splits_components() {
        let d = Duration::from_millis(90_061_001);
        assert_eq!(
            d,
            Duration::Inline {
                days: Some(1),
                hours: Some(1),
                minutes: Some(1),
                seconds: Some(1),
                milliseconds: Some(1),
            }
        );
        assert_eq!(d.to_millis(), Some(90_061_001));
        assert_eq!(Duration::from_millis(0).to_millis(), Some(0));
    }

    #[test]
    fn test_to_millis_saturates() {
        let huge = Duration::Inline {
            days: Some(u64::MAX),
            hours: None,
            minutes: None,
            seconds: Some(1),
            milliseconds: None,
        };
        assert_eq!(huge.to_millis(), Some(u64::MAX));
    }

    #[test]
    fn test_expression_to_millis() {
        assert_eq!(Duration::from("PT5S").to_millis(), Some(5_000));
        assert_eq!(Duration::from("PT1M30S").to_millis(), Some(90_000));
        assert_eq!(Duration::from("P1DT1H").to_millis(), Some(90_000_000));
        assert_eq!(Duration::from("PT0.5S").to_millis(), Some(500));
        assert_eq!(Duration::from("${ .delay }").to_millis(), None);
    }

    #[test]
    fn test_wire_shapes() {
        let inline: Duration = serde_json::from_value(json!({"seconds": 10})).unwrap();
        assert_eq!(inline.to_millis(), Some(10_000));
        assert_eq!(serde_json::to_value(&inline).unwrap(), json!({"seconds": 10}));

        let expr: Duration = serde_json::from_value(json!("PT10S")).unwrap();
        assert!(expr.is_expression());
        assert_eq!(serde_json::to_value(&expr).unwrap(), json!("PT10S"));
    }

    #[test]
    fn test_validate() {
        assert!(Duration::from("PT10S").validate("wait").is_ok());
        assert!(Duration::from("ten seconds").validate("wait").is_err());
        assert!(Duration::from_millis(1).validate("wait").is_ok());
    }
}
