use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Accepts a UUID, an empty string (treated as absent) or a missing field.
/// Query-string filters arrive as strings, so `?class_id=` must not 400.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Same treatment for optional RFC 3339 timestamps passed as query strings.
pub fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s
            .parse::<chrono::DateTime<chrono::Utc>>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Same treatment for optional booleans passed as query strings.
pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref() {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid boolean value: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        active: Option<bool>,
        #[serde(default, deserialize_with = "deserialize_optional_datetime")]
        after: Option<chrono::DateTime<chrono::Utc>>,
    }

    #[test]
    fn parses_valid_uuid() {
        let p: Params =
            serde_json::from_str(r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8"}"#).unwrap();
        assert!(p.id.is_some());
    }

    #[test]
    fn empty_string_means_none() {
        let p: Params = serde_json::from_str(r#"{"id":"","active":""}"#).unwrap();
        assert!(p.id.is_none());
        assert!(p.active.is_none());
    }

    #[test]
    fn missing_fields_mean_none() {
        let p: Params = serde_json::from_str("{}").unwrap();
        assert!(p.id.is_none());
        assert!(p.active.is_none());
    }

    #[test]
    fn bool_accepts_numeric_forms() {
        let p: Params = serde_json::from_str(r#"{"active":"1"}"#).unwrap();
        assert_eq!(p.active, Some(true));
        let p: Params = serde_json::from_str(r#"{"active":"false"}"#).unwrap();
        assert_eq!(p.active, Some(false));
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Params>(r#"{"id":"not-a-uuid"}"#).is_err());
        assert!(serde_json::from_str::<Params>(r#"{"active":"maybe"}"#).is_err());
        assert!(serde_json::from_str::<Params>(r#"{"after":"yesterday"}"#).is_err());
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        let p: Params = serde_json::from_str(r#"{"after":"2026-03-01T09:00:00Z"}"#).unwrap();
        assert!(p.after.is_some());
        let p: Params = serde_json::from_str(r#"{"after":""}"#).unwrap();
        assert!(p.after.is_none());
    }
}
