use crate::{Result, SnapshotError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// chrono accepts one- or two-digit month/day fields, so these also cover
// the un-padded savegame spelling (2027-7-14, 14/7/2027).
const ACCEPTED_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Logical in-game date identifying one snapshot.
///
/// Two spellings of the same date are in use and both are fixed by external
/// formats: savegames name it un-padded (`2027-7-14`), while the snapshot
/// store and verdict directories use the zero-padded ISO form (`2027-07-14`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GameDate(NaiveDate);

impl GameDate {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        ACCEPTED_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
            .map(Self)
            .ok_or_else(|| SnapshotError::InvalidDate(input.to_string()))
    }

    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Zero-padded ISO spelling used for store and output file names.
    #[must_use]
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Un-padded spelling embedded in savegame file names.
    #[must_use]
    pub fn savegame_token(&self) -> String {
        format!("{}-{}-{}", self.0.year(), self.0.month(), self.0.day())
    }

    #[must_use]
    pub const fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso())
    }
}

impl FromStr for GameDate {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for GameDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.iso())
    }
}

impl<'de> Deserialize<'de> for GameDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
