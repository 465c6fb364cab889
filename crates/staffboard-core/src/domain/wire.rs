//! Wire helpers - フォーム由来の値を受け付ける serde 補助
//!
//! フォームの初期値は空文字列なので、`""` を `None` として読む。

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(i32),
    Text(String),
}

/// `""` / `null` を `None` にする日付 deserializer（`YYYY-MM-DD`）
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(de::Error::custom),
    }
}

/// `""` / `null` を `None` にする整数 deserializer（数値文字列も可）
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawNumber::Number(value)) => Ok(Some(value)),
        Some(RawNumber::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawNumber::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "optional_date")]
        due_date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "optional_number")]
        priority: Option<i32>,
    }

    #[test]
    fn empty_form_values_are_none() {
        let form: Form = serde_json::from_value(json!({ "due_date": "", "priority": "" })).unwrap();
        assert_eq!(form.due_date, None);
        assert_eq!(form.priority, None);
    }

    #[test]
    fn filled_form_values_parse() {
        let form: Form =
            serde_json::from_value(json!({ "due_date": "2024-03-09", "priority": "2" })).unwrap();
        assert_eq!(form.due_date, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(form.priority, Some(2));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let result = serde_json::from_value::<Form>(json!({ "due_date": "09/03/2024" }));
        assert!(result.is_err());
    }
}
