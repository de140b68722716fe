use crate::store::InvoiceStatus;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Typed access to a function call's argument object. Every accessor reports
/// problems as a message the model can read back to the user.
pub struct ArgReader<'a> {
    args: &'a Map<String, Value>,
}

impl<'a> ArgReader<'a> {
    pub fn new(args: &'a Map<String, Value>) -> Self {
        Self { args }
    }

    fn value(&self, key: &str) -> Option<&'a Value> {
        self.args.get(key).filter(|v| !v.is_null())
    }

    pub fn optional_string(&self, key: &str) -> Result<Option<String>, String> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(format!("{} must be a string, got {}", key, kind_of(other))),
        }
    }

    pub fn required_string(&self, key: &str) -> Result<String, String> {
        match self.optional_string(key)? {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(format!("{} is required", key)),
        }
    }

    /// Non-negative amount given as a number or a numeric string ("1,250.50", "$100").
    pub fn optional_amount(&self, key: &str) -> Result<Option<f64>, String> {
        let amount = match self.value(key) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => {
                let cleaned: String = s
                    .trim()
                    .trim_start_matches('$')
                    .chars()
                    .filter(|c| *c != ',')
                    .collect();
                cleaned.trim().parse::<f64>().ok()
            }
            Some(other) => {
                return Err(format!("{} must be a number, got {}", key, kind_of(other)));
            }
        };

        match amount {
            Some(a) if a.is_finite() && a >= 0.0 => Ok(Some(a)),
            Some(_) => Err(format!("{} must be a non-negative number", key)),
            None => Err(format!("{} is not a valid number", key)),
        }
    }

    pub fn required_amount(&self, key: &str) -> Result<f64, String> {
        self.optional_amount(key)?
            .ok_or_else(|| format!("{} is required", key))
    }

    pub fn optional_date(&self, key: &str) -> Result<Option<NaiveDate>, String> {
        match self.optional_string(key)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse_date(&s)
                .map(Some)
                .ok_or_else(|| format!("{} must be an ISO date (YYYY-MM-DD), got '{}'", key, s)),
        }
    }

    pub fn required_date(&self, key: &str) -> Result<NaiveDate, String> {
        self.optional_date(key)?
            .ok_or_else(|| format!("{} is required", key))
    }

    pub fn optional_status(&self, key: &str) -> Result<Option<InvoiceStatus>, String> {
        match self.optional_string(key)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => InvoiceStatus::parse(&s).map(Some).ok_or_else(|| {
                format!("{} must be one of Pending, Paid, Overdue, got '{}'", key, s)
            }),
        }
    }
}

/// Parse `YYYY-MM-DD`, truncating any time component (`2099-01-01T10:00:00Z`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    let (date, rest) = s.split_at_checked(10)?;
    if !(rest.starts_with('T') || rest.starts_with(' ')) {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn dates_accept_datetimes_and_truncate_time() {
        let expected = NaiveDate::from_ymd_opt(2099, 1, 1);
        assert_eq!(parse_date("2099-01-01"), expected);
        assert_eq!(parse_date("2099-01-01T23:59:00Z"), expected);
        assert_eq!(parse_date("2099-01-01 08:00"), expected);
        assert_eq!(parse_date("01/01/2099"), None);
        assert_eq!(parse_date("2099-01-01garbage"), None);
    }

    #[test]
    fn amounts_accept_numeric_strings_but_not_negatives() {
        let args = map(json!({"a": "$1,250.50", "b": 100, "c": -3, "d": "lots", "e": true}));
        let reader = ArgReader::new(&args);
        assert_eq!(reader.optional_amount("a").unwrap(), Some(1250.5));
        assert_eq!(reader.required_amount("b").unwrap(), 100.0);
        assert!(reader.optional_amount("c").is_err());
        assert!(reader.optional_amount("d").is_err());
        assert!(reader.optional_amount("e").is_err());
        assert_eq!(reader.optional_amount("missing").unwrap(), None);
    }

    #[test]
    fn null_and_blank_values_count_as_missing() {
        let args = map(json!({"clientName": "  ", "dueDate": null}));
        let reader = ArgReader::new(&args);
        assert_eq!(reader.required_string("clientName").unwrap_err(), "clientName is required");
        assert_eq!(reader.optional_date("dueDate").unwrap(), None);
    }
}
