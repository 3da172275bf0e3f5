use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text form of [`Stamp`], also the `LAST-MODIFIED` property format.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock instant with whole-second precision.
///
/// Modification times are compared with `<`/`==`, so both sides must carry
/// the same precision as the text they round-trip through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(NaiveDateTime);

impl Stamp {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at.with_nanosecond(0).unwrap_or(at))
    }

    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    pub fn parse(text: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(text.trim(), STAMP_FORMAT)
            .ok()
            .map(Self::new)
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(STAMP_FORMAT))
    }
}

impl Serialize for Stamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Stamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Stamp::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {text}")))
    }
}

/// The fixed textual formats an [`OrgDate`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// Active timestamp, `<2025-03-10 Mon 09:00>`
    Scheduled,
    /// Inactive timestamp, `[2025-03-10 Mon 09:00]`
    Closed,
    Other,
}

impl DateFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::Scheduled => "<%Y-%m-%d %a %H:%M>",
            DateFormat::Closed => "[%Y-%m-%d %a %H:%M]",
            DateFormat::Other => STAMP_FORMAT,
        }
    }

    fn date_only_pattern(self) -> Option<&'static str> {
        match self {
            DateFormat::Scheduled => Some("<%Y-%m-%d %a>"),
            DateFormat::Closed => Some("[%Y-%m-%d %a]"),
            DateFormat::Other => None,
        }
    }

    /// Drop whatever the pattern cannot express.
    fn truncate(self, at: NaiveDateTime) -> NaiveDateTime {
        let at = at.with_nanosecond(0).unwrap_or(at);
        match self {
            DateFormat::Scheduled | DateFormat::Closed => at.with_second(0).unwrap_or(at),
            DateFormat::Other => at,
        }
    }
}

/// A date together with its canonical text in one [`DateFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgDate {
    value: NaiveDateTime,
    text: String,
    format: DateFormat,
}

impl OrgDate {
    pub fn from_datetime(at: NaiveDateTime, format: DateFormat) -> Self {
        let value = format.truncate(at);
        Self {
            text: value.format(format.pattern()).to_string(),
            value,
            format,
        }
    }

    /// Parse `text` in `format`. Unparseable text is logged and yields `None`.
    pub fn parse(text: &str, format: DateFormat) -> Option<Self> {
        let text = text.trim();
        let parsed = NaiveDateTime::parse_from_str(text, format.pattern())
            .ok()
            .or_else(|| {
                let pattern = format.date_only_pattern()?;
                NaiveDate::parse_from_str(text, pattern)
                    .ok()?
                    .and_hms_opt(0, 0, 0)
            });

        match parsed {
            Some(value) => Some(Self::from_datetime(value, format)),
            None => {
                log::warn!("Ignoring unparseable {format:?} date {text:?}");
                None
            }
        }
    }

    pub fn value(&self) -> NaiveDateTime {
        self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> DateFormat {
        self.format
    }
}

impl Serialize for OrgDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}
