//! `serde(with = ...)` adapter for human-readable durations.
//!
//! Accepts `"15m"`, `"1h 30m"`, `"30s"` and also a bare integer number of
//! seconds. Serializes back to the humantime form.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer, de};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Seconds(u64),
    Text(String),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match Raw::deserialize(deserializer)? {
        Raw::Seconds(0) => {
            Err(de::Error::custom("duration 0 must be greater than zero"))
        }
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse(&text).map_err(de::Error::custom),
    }
}

pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*value))
}

pub fn parse(text: &str) -> anyhow::Result<Duration> {
    let duration = humantime::parse_duration(text.trim()).map_err(|err| {
        anyhow::anyhow!("invalid duration {text:?}: {err}")
    })?;
    if duration.is_zero() {
        anyhow::bail!("duration {text:?} must be greater than zero");
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_human_and_rejects_zero() {
        assert_eq!(parse("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse(" 1h 30m ").unwrap(), Duration::from_secs(5400));
        assert!(parse("0s").is_err());
        assert!(parse("soon").is_err());

        #[derive(Debug, serde::Deserialize)]
        struct Holder {
            #[serde(with = "super")]
            every: Duration,
        }
        let holder: Holder = serde_json::from_str(r#"{"every":90}"#).unwrap();
        assert_eq!(holder.every, Duration::from_secs(90));
        assert!(serde_json::from_str::<Holder>(r#"{"every":0}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"every":"0s"}"#).is_err());
    }
}
