use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{CooperationFormat, OpennessLevel, ProfileId, ProfileKind, ReviewId};

/// Body of the model / photographer registration functions.
///
/// Model-only and photographer-only fields are optional and omitted from the
/// JSON when unset so each endpoint only sees the columns it stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub experience_years: u32,
    pub specializations: Vec<String>,
    pub equipment: String,
    pub portfolio_links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    pub about_me: String,
    pub price_range: String,
    pub cooperation_format: CooperationFormat,
    pub is_blocked: bool,
    /// `data:<mime>;base64,<payload>` of the chosen cover photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openness_level: Option<OpennessLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messenger: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub working_formats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProfile {
    pub id: ProfileId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Query string of the search function. Unset predicates are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProfileId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openness_level: Option<OpennessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooperation_format: Option<CooperationFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

impl ListingQuery {
    pub fn new(kind: ProfileKind, page: u32) -> Self {
        Self {
            kind: kind.as_query_value(),
            page,
            id: None,
            name: None,
            city: None,
            gender: None,
            min_height: None,
            max_height: None,
            min_age: None,
            max_age: None,
            openness_level: None,
            cooperation_format: None,
            specialization: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingResponse {
    pub profiles: Vec<RawProfile>,
    #[serde(default)]
    pub pagination: Option<PaginationInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// One search hit as returned by either profile kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfile {
    pub id: ProfileId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub specializations: Option<Vec<String>>,
    #[serde(default)]
    pub openness_level: Option<String>,
    #[serde(default)]
    pub cooperation_format: Option<String>,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub model_id: ProfileId,
    pub author_name: String,
    pub author_phone: String,
    pub rating: u8,
    pub review_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: ReviewId,
    pub model_id: ProfileId,
    pub author_name: String,
    pub rating: u8,
    pub review_text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Accepts RFC 3339 as well as the offset-less ISO form the search function
/// emits for `timestamp without time zone` columns (read as UTC).
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_query_omits_unset_predicates() {
        let mut query = ListingQuery::new(ProfileKind::Model, 2);
        query.min_height = Some(170);
        query.openness_level = Some(OpennessLevel::Lingerie);

        let value = serde_json::to_value(&query).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "type": "model",
                "page": 2,
                "minHeight": 170,
                "opennessLevel": "Бельё",
            })
        );
    }

    #[test]
    fn raw_profile_accepts_naive_and_null_timestamps() {
        let naive: RawProfile = serde_json::from_str(
            r#"{"id": 4, "fullName": "A", "lastLogin": "2024-03-01T10:20:30.123456"}"#,
        )
        .expect("naive timestamp");
        assert_eq!(
            naive.last_login.map(|ts| ts.to_rfc3339()),
            Some("2024-03-01T10:20:30.123456+00:00".to_string())
        );

        let missing: RawProfile =
            serde_json::from_str(r#"{"id": 5, "lastLogin": null}"#).expect("null timestamp");
        assert_eq!(missing.last_login, None);
    }

    #[test]
    fn listing_response_requires_profiles_array() {
        assert!(serde_json::from_str::<ListingResponse>(r#"{"pagination": null}"#).is_err());
    }
}
