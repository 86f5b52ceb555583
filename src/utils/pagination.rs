use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

// Query parameters arrive as strings; empty values mean "use the default".
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_LIMIT),
            offset: Some(0),
            page: None,
        }
    }
}

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Page takes precedence over an explicit offset when both are given.
    pub fn offset(&self) -> i64 {
        match self.page {
            Some(page) => (page.max(1) - 1) * self.limit(),
            None => self.offset.unwrap_or(0).max(0),
        }
    }

    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }

    pub fn meta(&self, total: i64) -> PaginationMeta {
        PaginationMeta {
            total,
            limit: self.limit(),
            offset: Some(self.offset()),
            page: self.page(),
            has_more: self.offset() + self.limit() < total,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub total: i64,
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_given() {
        let params = PaginationParams {
            limit: None,
            offset: None,
            page: None,
        };
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.page(), None);
    }

    #[test]
    fn limit_is_clamped_to_bounds() {
        for (input, expected) in [(0, 1), (-5, 1), (1, 1), (50, 50), (100, 100), (500, 100)] {
            let params = PaginationParams {
                limit: Some(input),
                offset: None,
                page: None,
            };
            assert_eq!(params.limit(), expected, "limit {}", input);
        }
    }

    #[test]
    fn negative_offset_is_floored() {
        let params = PaginationParams {
            limit: Some(10),
            offset: Some(-20),
            page: None,
        };
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn page_overrides_offset() {
        let params = PaginationParams {
            limit: Some(25),
            offset: Some(999),
            page: Some(3),
        };
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn page_below_one_becomes_first_page() {
        let params = PaginationParams {
            limit: Some(10),
            offset: None,
            page: Some(0),
        };
        assert_eq!(params.offset(), 0);
        assert_eq!(params.page(), Some(1));
    }

    #[test]
    fn meta_reports_has_more_correctly() {
        let params = PaginationParams {
            limit: Some(10),
            offset: Some(0),
            page: None,
        };
        assert!(params.meta(11).has_more);
        assert!(!params.meta(10).has_more);
        assert!(!params.meta(0).has_more);
    }

    #[test]
    fn meta_carries_page_through() {
        let params = PaginationParams {
            limit: Some(10),
            offset: None,
            page: Some(2),
        };
        let meta = params.meta(35);
        assert_eq!(meta.page, Some(2));
        assert_eq!(meta.offset, Some(10));
        assert!(meta.has_more);
    }

    #[test]
    fn deserializes_string_query_values() {
        let params: PaginationParams = serde_json::from_str(r#"{"limit":"25","offset":"50"}"#)
            .expect("string values should parse");
        assert_eq!(params.limit(), 25);
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn empty_strings_fall_back_to_defaults() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"limit":"","offset":""}"#).expect("empty strings are valid");
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn rejects_non_numeric_strings() {
        let result: Result<PaginationParams, _> = serde_json::from_str(r#"{"limit":"abc"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn meta_omits_absent_page_when_serialized() {
        let params = PaginationParams {
            limit: Some(10),
            offset: Some(0),
            page: None,
        };
        let json = serde_json::to_string(&params.meta(3)).unwrap();
        assert!(json.contains(r#""total":3"#));
        assert!(!json.contains(r#""page""#));
    }
}
