#![forbid(unsafe_code)]

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::PmError;

pub fn parse_date(input: &str) -> Result<Date, PmError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        PmError::InvalidDate {
            input: input.to_owned(),
        }
    })
}

/// Calendar date of a `YYYY-MM-DD` string or of an RFC 3339 timestamp, whose
/// time of day is dropped.
pub fn parse_day(input: &str) -> Result<Date, PmError> {
    parse_date(input).or_else(|err| {
        OffsetDateTime::parse(input.trim(), &Rfc3339)
            .map(|ts| ts.date())
            .map_err(|_| err)
    })
}

#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Accepts RFC 3339 timestamps, or a bare `YYYY-MM-DD` read as midnight UTC.
pub fn parse_timestamp(input: &str) -> Result<OffsetDateTime, PmError> {
    let trimmed = input.trim();
    if let Ok(ts) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(ts);
    }
    parse_date(trimmed)
        .map(|d| d.midnight().assume_utc())
        .map_err(|_| PmError::Other(format!("invalid timestamp '{input}'")))
}

#[must_use]
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

#[must_use]
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// `d M` label used on chart axes, e.g. `18/11`.
#[must_use]
pub fn short_label(date: Date) -> String {
    format!("{:02}/{:02}", date.day(), u8::from(date.month()))
}

pub(crate) mod date {
    use serde::{Deserialize as _, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_day(&raw).map_err(serde::de::Error::custom)
    }
}

pub(crate) mod opt_date {
    use serde::{Deserialize as _, Deserializer, Serializer};
    use time::Date;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_some(&super::format_date(*d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_day(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

pub(crate) mod opt_timestamp {
    use serde::{Deserialize as _, Deserializer, Serializer};
    use time::OffsetDateTime;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(ts: &Option<OffsetDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(t) => s.serialize_some(&super::format_timestamp(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<OffsetDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_timestamp(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn parses_plain_dates() {
        assert_eq!(parse_date("2023-11-20").unwrap(), date!(2023 - 11 - 20));
        assert_eq!(parse_date(" 2023-11-20 ").unwrap(), date!(2023 - 11 - 20));
        assert!(parse_date("20/11/2023").is_err());
        assert!(parse_date("2023-02-30").is_err());
    }

    #[test]
    fn timestamps_keep_their_own_offset() {
        let ts = parse_timestamp("2023-11-18T23:30:00-05:00").unwrap();
        assert_eq!(ts.date(), date!(2023 - 11 - 18));

        let midnight = parse_timestamp("2023-11-18").unwrap();
        assert_eq!(midnight, datetime!(2023-11-18 0:00 UTC));
    }

    #[test]
    fn day_drops_time_of_day() {
        assert_eq!(parse_day("2023-11-20").unwrap(), date!(2023 - 11 - 20));
        assert_eq!(parse_day("2023-11-20T23:59:00Z").unwrap(), date!(2023 - 11 - 20));
        assert_eq!(parse_day("2023-11-20T00:00:00+02:00").unwrap(), date!(2023 - 11 - 20));
        assert!(matches!(parse_day("tomorrow"), Err(PmError::InvalidDate { .. })));
    }

    #[test]
    fn short_label_is_day_then_month() {
        assert_eq!(short_label(date!(2023 - 11 - 05)), "05/11");
    }
}
