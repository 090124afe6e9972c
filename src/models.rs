use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub important: bool,
    // Wire name kept for compatibility with the JSON API shape
    #[serde(rename = "privateTask", default)]
    pub private: bool,
    #[serde(
        default,
        with = "deadline_format",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl Task {
    pub fn new(description: String) -> Self {
        Self {
            id: None,
            description,
            important: false,
            private: false,
            deadline: None,
            project: None,
        }
    }
}

/// Serde adapter for the `deadline` field: serialized as an RFC 3339 string,
/// accepted in the looser formats the clients send (see `utils::parse_deadline`).
mod deadline_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::utils::parse_deadline;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_deadline(s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn private_flag_uses_wire_name() {
        let task: Task =
            serde_json::from_str(r#"{"description":"Buy milk","privateTask":true}"#).unwrap();
        assert!(task.private);
        assert!(!task.important);
        assert_eq!(task.id, None);

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"privateTask\":true"));
        assert!(!json.contains("\"private\":"));
    }

    #[test]
    fn date_only_deadline_normalizes_to_midnight_utc() {
        let task: Task =
            serde_json::from_str(r#"{"description":"x","deadline":"2026-03-14"}"#).unwrap();
        assert_eq!(
            task.deadline,
            Some(Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn datetime_deadline_is_parsed() {
        let task: Task =
            serde_json::from_str(r#"{"description":"x","deadline":"2026-03-14T15:30"}"#).unwrap();
        assert_eq!(
            task.deadline,
            Some(Utc.with_ymd_and_hms(2026, 3, 14, 15, 30, 0).unwrap())
        );
    }

    #[test]
    fn time_without_date_is_rejected() {
        let result = serde_json::from_str::<Task>(r#"{"description":"x","deadline":"15:30"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn null_and_missing_deadline_are_none() {
        let with_null: Task =
            serde_json::from_str(r#"{"description":"x","deadline":null}"#).unwrap();
        assert_eq!(with_null.deadline, None);

        let missing: Task = serde_json::from_str(r#"{"description":"x"}"#).unwrap();
        assert_eq!(missing.deadline, None);
    }
}
