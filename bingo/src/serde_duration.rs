//! `Duration` as whole milliseconds, for `#[serde(with = "crate::serde_duration")]` fields.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super")]
        d: Duration,
    }

    #[test]
    fn writes_whole_milliseconds() {
        let w = Wrapper {
            d: Duration::from_micros(70_900),
        };
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"d":70}"#);
        let back: Wrapper = serde_json::from_str(r#"{"d":4000}"#).unwrap();
        assert_eq!(back.d, Duration::from_secs(4));
    }
}
