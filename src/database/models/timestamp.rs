//! `createdAt`/`updatedAt` as RFC 3339 strings with microsecond precision.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true)),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Stamped {
        #[serde(default, with = "super", skip_serializing_if = "Option::is_none")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn keeps_microsecond_precision() {
        let parsed: Stamped = serde_json::from_str(r#"{"at":"2024-05-01T10:00:00.123456Z"}"#).unwrap();
        let out = serde_json::to_string(&parsed).unwrap();
        assert_eq!(out, r#"{"at":"2024-05-01T10:00:00.123456Z"}"#);

        let empty: Stamped = serde_json::from_str("{}").unwrap();
        assert!(empty.at.is_none());
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
    }
}
