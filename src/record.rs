use crate::error::{Result, StoreError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Campus buildings a strike can be reported against.
pub const BUILDINGS: &[&str] = &[
    "Egan Library",
    "Egan Classroom Wing",
    "Mourant",
    "Novatney",
    "Whitehead",
    "Hendrickson Annex",
    "Soboleff",
    "Hendrickson Main Building",
    "John R. Pugh Residence Hall",
    "Facilities Services",
    "USFS Pacific Northwest Research Station",
    "Student Housing",
    "Other",
];

/// Species offered to reporters. The first two entries are sentinels and never charted.
pub const COMMON_SPECIES: &[&str] = &[
    "Unknown",
    "Other",
    "Common Raven",
    "Northwestern Crow",
    "Steller's Jay",
    "Dark-eyed Junco",
    "Song Sparrow",
    "Golden-crowned Sparrow",
    "White-crowned Sparrow",
    "American Robin",
    "Varied Thrush",
    "Hermit Thrush",
    "Ruby-crowned Kinglet",
    "Golden-crowned Kinglet",
    "Chestnut-backed Chickadee",
    "Red-breasted Nuthatch",
    "Brown Creeper",
    "Winter Wren",
    "Pacific Wren",
    "American Dipper",
    "Cedar Waxwing",
    "Orange-crowned Warbler",
    "Yellow Warbler",
    "Yellow-rumped Warbler",
    "Townsend's Warbler",
    "Wilson's Warbler",
    "Common Yellowthroat",
    "Pine Siskin",
    "American Goldfinch",
    "Red Crossbill",
    "Bald Eagle",
    "Sharp-shinned Hawk",
    "Red-tailed Hawk",
    "Merlin",
    "Belted Kingfisher",
    "Downy Woodpecker",
    "Hairy Woodpecker",
    "Northern Flicker",
    "Red-breasted Sapsucker",
    "Mallard",
    "Common Goldeneye",
    "Bufflehead",
    "Common Merganser",
    "Red-breasted Merganser",
    "Harlequin Duck",
    "Surf Scoter",
    "Great Blue Heron",
    "Sandhill Crane",
    "Killdeer",
    "Spotted Sandpiper",
    "Common Snipe",
    "Mew Gull",
    "Herring Gull",
    "Glaucous-winged Gull",
];

/// Species values that mean "not identified" rather than naming a bird.
pub const SPECIES_SENTINELS: &[&str] = &["Unknown", "Other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BirdCondition {
    Deceased,
    Injured,
    Stunned,
    #[default]
    Unknown,
}

impl BirdCondition {
    pub const ALL: [BirdCondition; 4] = [
        BirdCondition::Deceased,
        BirdCondition::Injured,
        BirdCondition::Stunned,
        BirdCondition::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BirdCondition::Deceased => "deceased",
            BirdCondition::Injured => "injured",
            BirdCondition::Stunned => "stunned",
            BirdCondition::Unknown => "unknown",
        }
    }

    /// Display label with the first letter capitalized, e.g. `Deceased`.
    pub fn label(&self) -> String {
        capitalize(self.as_str())
    }
}

impl fmt::Display for BirdCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BirdCondition {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        BirdCondition::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| StoreError::Validation(format!("unknown bird condition '{}'", s)))
    }
}

/// One reported bird-window collision, as stored in the `bird_strikes` table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrikeReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: NaiveDate,
    #[serde(default, with = "clock_time")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub location: Option<String>,
    pub building: String,
    pub bird_condition: BirdCondition,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub reporter_email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl StrikeReport {
    pub fn new(date: NaiveDate, building: &str, bird_condition: BirdCondition) -> Self {
        Self {
            date,
            building: building.to_string(),
            bird_condition,
            ..Self::default()
        }
    }

    /// Checks the fields a report must carry before it is inserted.
    pub fn validate(&self) -> Result<()> {
        if self.building.trim().is_empty() {
            return Err(StoreError::Validation("building is required".to_string()));
        }
        if !BUILDINGS.contains(&self.building.as_str()) {
            return Err(StoreError::Validation(format!(
                "'{}' is not a known building; use \"Other\" and describe it in location",
                self.building
            )));
        }
        Ok(())
    }

    /// Species name if it identifies a bird, i.e. is present, non-empty and not a sentinel.
    pub fn identified_species(&self) -> Option<&str> {
        self.species
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !SPECIES_SENTINELS.contains(s))
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parses a time of day written as `HH:MM` or `HH:MM:SS`.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

// The store returns `HH:MM:SS`; the form submits `HH:MM`.
mod clock_time {
    use super::parse_clock_time;
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer, de};

    // seconds are written only when present
    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) if t.second() != 0 => s.serialize_some(&t.format("%H:%M:%S").to_string()),
            Some(t) => s.serialize_some(&t.format("%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => parse_clock_time(v)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid time of day '{}'", v))),
        }
    }
}
