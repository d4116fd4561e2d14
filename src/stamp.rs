use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Source of fresh identifiers and of the current time.
///
/// These are the only non-deterministic inputs of an import; tests pass a fixed
/// implementation.
pub trait Stamp: Send + Sync {
    fn uuid(&self) -> String;

    fn now(&self) -> DateTime<Utc>;

    /// `now()` at second precision, e.g. `2025-03-01T12:00:00Z`.
    fn timestamp(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemStamp;

impl Stamp for SystemStamp {
    fn uuid(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    struct Fixed;

    impl Stamp for Fixed {
        fn uuid(&self) -> String {
            "fixed".to_string()
        }

        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).single().expect("valid time")
        }
    }

    #[rstest::rstest]
    fn test_timestamp_is_second_precision_zulu() {
        assert_eq!(Fixed.timestamp(), "2025-03-01T12:00:00Z");
    }

    #[rstest::rstest]
    fn test_system_uuid_is_canonical_v4() {
        let first = SystemStamp.uuid();
        let parsed = Uuid::parse_str(&first).expect("uuid");
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(first.len(), 36);
        assert_ne!(first, SystemStamp.uuid());
    }
}
