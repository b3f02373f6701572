use sea_orm::Value;

use crate::models::FilterOperator;

/// A filter value after coercion from its query-string form.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    Json(serde_json::Value),
}

/// `^-?\d+(\.\d+)?$`
fn looks_numeric(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && fraction.is_none_or(all_digits)
}

/// Starts with `[` or `{` and ends with `]` or `}`.
fn looks_like_json(raw: &str) -> bool {
    raw.len() >= 2 && raw.starts_with(['[', '{']) && raw.ends_with([']', '}'])
}

impl FilterValue {
    /// Coerce a raw value for `operator`.
    ///
    /// `in` splits on commas (trimmed, empties removed); `is` understands `null`,
    /// `true` and `false`; everything else goes through [`FilterValue::scalar`].
    #[must_use]
    pub fn coerce(raw: &str, operator: FilterOperator) -> Self {
        match operator {
            FilterOperator::In => Self::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            FilterOperator::Is => match raw {
                "null" => Self::Null,
                "true" => Self::Bool(true),
                "false" => Self::Bool(false),
                other => Self::Text(other.to_string()),
            },
            _ => Self::scalar(raw),
        }
    }

    /// Numbers become numbers, bracketed values are tried as JSON, anything that fails
    /// to parse stays text.
    #[must_use]
    pub fn scalar(raw: &str) -> Self {
        if looks_numeric(raw) {
            if raw.contains('.') {
                if let Ok(number) = raw.parse() {
                    return Self::Float(number);
                }
            } else if let Ok(number) = raw.parse() {
                return Self::Int(number);
            }
        }
        if looks_like_json(raw) {
            if let Ok(json) = serde_json::from_str(raw) {
                return Self::Json(json);
            }
        }
        Self::Text(raw.to_string())
    }

    /// Textual form, used for pattern and full-text matching.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(flag) => flag.to_string(),
            Self::Int(number) => number.to_string(),
            Self::Float(number) => number.to_string(),
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(","),
            Self::Json(json) => json.to_string(),
        }
    }

    /// Bind value for scalar comparisons.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Option::<String>::None.into(),
            Self::Bool(flag) => (*flag).into(),
            Self::Int(number) => (*number).into(),
            Self::Float(number) => (*number).into(),
            Self::Text(text) => text.clone().into(),
            Self::List(items) => items.join(",").into(),
            Self::Json(json) => json.clone().into(),
        }
    }

    /// Bind values for `IN`. Numeric-looking items are bound as numbers.
    #[must_use]
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            Self::List(items) => items
                .iter()
                .map(|item| match Self::scalar(item) {
                    number @ (Self::Int(_) | Self::Float(_)) => number.to_value(),
                    _ => item.clone().into(),
                })
                .collect(),
            other => vec![other.to_value()],
        }
    }
}
