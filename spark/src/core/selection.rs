//! Closed option sets and the validator that maps raw caller strings onto them.
//!
//! Every selection field is checked against its enumeration before anything
//! touches the network. Matching is exact: no trimming, no case folding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mood {
    Eerie,
    Hopeful,
    Melancholy,
    Joyful,
    Tense,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Genre {
    SciFi,
    Fantasy,
    Horror,
    Romance,
    Thriller,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum CharacterArchetype {
    #[serde(rename = "reluctant hero")]
    #[strum(serialize = "reluctant hero")]
    ReluctantHero,
    #[serde(rename = "cunning villain")]
    #[strum(serialize = "cunning villain")]
    CunningVillain,
    #[serde(rename = "tragic hero")]
    #[strum(serialize = "tragic hero")]
    TragicHero,
    #[serde(rename = "wise mentor")]
    #[strum(serialize = "wise mentor")]
    WiseMentor,
    #[serde(rename = "innocent")]
    #[strum(serialize = "innocent")]
    Innocent,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Setting {
    #[serde(rename = "dystopian city")]
    #[strum(serialize = "dystopian city")]
    DystopianCity,
    #[serde(rename = "enchanted forest")]
    #[strum(serialize = "enchanted forest")]
    EnchantedForest,
    #[serde(rename = "space station")]
    #[strum(serialize = "space station")]
    SpaceStation,
    #[serde(rename = "haunted mansion")]
    #[strum(serialize = "haunted mansion")]
    HauntedMansion,
    #[serde(rename = "desert island")]
    #[strum(serialize = "desert island")]
    DesertIsland,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl Genre {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl CharacterArchetype {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl Setting {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Number of starters requested from a single generation, in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StarterCount(u8);

impl StarterCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const DEFAULT: StarterCount = StarterCount(3);
    pub const ONE: StarterCount = StarterCount(Self::MIN);

    /// Returns `None` when `value` falls outside `MIN..=MAX`.
    pub fn new(value: i64) -> Option<Self> {
        let value = u8::try_from(value).ok()?;
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(StarterCount(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }
}

impl Default for StarterCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for StarterCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Untyped selection as received from a caller (form post, CLI flags).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSelection {
    pub mood: String,
    pub genre: String,
    pub character_archetype: String,
    pub setting: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_starters: Option<i64>,
}

/// Why a [`RawSelection`] was rejected.
///
/// Callers only surface a single generic message; the variants exist for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSelection {
    #[error("{field} '{value}' is not one of the available options")]
    UnknownOption { field: &'static str, value: String },
    #[error("number of starters must be between 1 and 5, got {0}")]
    CountOutOfRange(i64),
}

/// A selection whose every field belongs to its enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub mood: Mood,
    pub genre: Genre,
    pub character_archetype: CharacterArchetype,
    pub setting: Setting,
    pub number_of_starters: StarterCount,
}

impl Selection {
    /// Validate a raw selection. A missing count resolves to
    /// [`StarterCount::DEFAULT`].
    pub fn parse(raw: &RawSelection) -> Result<Self, InvalidSelection> {
        let number_of_starters = match raw.number_of_starters {
            None => StarterCount::DEFAULT,
            Some(n) => StarterCount::new(n).ok_or(InvalidSelection::CountOutOfRange(n))?,
        };
        Ok(Self {
            mood: parse_option("mood", &raw.mood)?,
            genre: parse_option("genre", &raw.genre)?,
            character_archetype: parse_option("characterArchetype", &raw.character_archetype)?,
            setting: parse_option("setting", &raw.setting)?,
            number_of_starters,
        })
    }
}

/// Whether every field of `raw` belongs to its enumeration.
pub fn is_valid_selection(raw: &RawSelection) -> bool {
    Selection::parse(raw).is_ok()
}

fn parse_option<T: FromStr>(field: &'static str, value: &str) -> Result<T, InvalidSelection> {
    value.parse().map_err(|_| InvalidSelection::UnknownOption {
        field,
        value: value.to_string(),
    })
}

/// Every option of every field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOptions {
    pub moods: Vec<&'static str>,
    pub genres: Vec<&'static str>,
    pub character_archetypes: Vec<&'static str>,
    pub settings: Vec<&'static str>,
    pub min_starters: u8,
    pub max_starters: u8,
    pub default_starters: u8,
}

impl SelectionOptions {
    pub fn all() -> Self {
        Self::with_default(StarterCount::DEFAULT)
    }

    /// Every option, advertising `default_starters` as the count used when a
    /// request omits one.
    pub fn with_default(default_starters: StarterCount) -> Self {
        Self {
            moods: Mood::iter().map(Mood::as_str).collect(),
            genres: Genre::iter().map(Genre::as_str).collect(),
            character_archetypes: CharacterArchetype::iter()
                .map(CharacterArchetype::as_str)
                .collect(),
            settings: Setting::iter().map(Setting::as_str).collect(),
            min_starters: StarterCount::MIN,
            max_starters: StarterCount::MAX,
            default_starters: default_starters.get(),
        }
    }
}
