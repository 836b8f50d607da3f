//! Venue classification shared by every provider.
//!
//! OSM-tagged records classify by their `amenity` tag. Records without one
//! (database rows, commercial API results) classify by drink keywords found
//! in their folded name or category.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::text::fold;

/// OSM amenities treated as food venues.
pub const FOOD_AMENITIES: [&str; 2] = ["restaurant", "fast_food"];

/// OSM amenities treated as drink venues.
pub const DRINK_AMENITIES: [&str; 3] = ["cafe", "bar", "pub"];

/// OSM amenities included in unfiltered and bounds queries.
pub const ALL_AMENITIES: [&str; 5] = ["restaurant", "cafe", "fast_food", "bar", "pub"];

/// Folded words and phrases marking an untagged record as a drink venue.
const DRINK_KEYWORDS: [&str; 10] = [
    "cafe", "coffee", "ca phe", "tra", "tea", "bar", "pub", "lounge", "sinh to", "nuoc ep",
];

const DEFAULT_EMOJI: &str = "🍴";

const EMOJI_TABLE: [(&str, &str); 19] = [
    ("restaurant", "🍽️"),
    ("cafe", "☕"),
    ("fast_food", "🍔"),
    ("vietnamese", "🍜"),
    ("chinese", "🥢"),
    ("japanese", "🍣"),
    ("korean", "🍲"),
    ("italian", "🍕"),
    ("mexican", "🌮"),
    ("indian", "🍛"),
    ("thai", "🥘"),
    ("seafood", "🦐"),
    ("pizza", "🍕"),
    ("burger", "🍔"),
    ("coffee", "☕"),
    ("bakery", "🥐"),
    ("dessert", "🍰"),
    ("ice_cream", "🍦"),
    ("bar", "🍺"),
];

/// Which kind of venue a search wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VenueFilter {
    /// Restaurants and fast food.
    Food,
    /// Cafes, bars and pubs.
    Drink,
    /// Anything to eat or drink.
    #[default]
    All,
}

impl VenueFilter {
    /// Whether a venue of `kind` passes this filter.
    #[must_use]
    pub const fn accepts(self, kind: VenueKind) -> bool {
        matches!(
            (self, kind),
            (Self::All, _) | (Self::Food, VenueKind::Food) | (Self::Drink, VenueKind::Drink)
        )
    }

    /// OSM amenity values selected by this filter.
    #[must_use]
    pub const fn amenities(self) -> &'static [&'static str] {
        match self {
            Self::Food => &FOOD_AMENITIES,
            Self::Drink => &DRINK_AMENITIES,
            Self::All => &ALL_AMENITIES,
        }
    }
}

/// Error returned when parsing an unknown filter name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown venue filter {0:?} (expected \"food\", \"drink\" or \"all\")")]
pub struct ParseFilterError(pub String);

impl FromStr for VenueFilter {
    type Err = ParseFilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "drink" => Ok(Self::Drink),
            "all" => Ok(Self::All),
            _ => Err(ParseFilterError(value.to_owned())),
        }
    }
}

impl fmt::Display for VenueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Food => "food",
            Self::Drink => "drink",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// The classification of a single venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VenueKind {
    /// Somewhere to eat.
    Food,
    /// Somewhere to drink.
    Drink,
}

impl VenueKind {
    /// Classify an OSM `amenity` value; `None` for non-venue amenities.
    #[must_use]
    pub fn from_amenity(amenity: &str) -> Option<Self> {
        if FOOD_AMENITIES.contains(&amenity) {
            Some(Self::Food)
        } else if DRINK_AMENITIES.contains(&amenity) {
            Some(Self::Drink)
        } else {
            None
        }
    }

    /// Classify an untagged record from its name and optional category.
    ///
    /// # Examples
    ///
    /// ```
    /// use nearbite_core::VenueKind;
    ///
    /// assert_eq!(VenueKind::from_text("Cà Phê Muối", None), VenueKind::Drink);
    /// assert_eq!(VenueKind::from_text("Cơm Tấm Ba Ghiền", None), VenueKind::Food);
    /// ```
    #[must_use]
    pub fn from_text(name: &str, category: Option<&str>) -> Self {
        let mut haystack = fold(name);
        if let Some(label) = category {
            haystack.push(' ');
            haystack.push_str(&fold(label));
        }
        let words: Vec<&str> = haystack
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();
        if DRINK_KEYWORDS.iter().any(|kw| contains_phrase(&words, kw)) {
            Self::Drink
        } else {
            Self::Food
        }
    }

    /// An OSM amenity representative of this kind.
    #[must_use]
    pub const fn amenity(self) -> &'static str {
        match self {
            Self::Food => "restaurant",
            Self::Drink => "cafe",
        }
    }
}

/// Whether `phrase` occurs in `words` as a run of whole words, so folded
/// `tran` (Trần) never matches `tra`.
fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let wanted: Vec<&str> = phrase.split(' ').collect();
    words.windows(wanted.len()).any(|window| window == wanted.as_slice())
}

/// Display emoji for a venue.
///
/// The category is consulted when present, otherwise the amenity. The first
/// table entry contained in that key wins, so `vietnamese;noodle` maps to the
/// Vietnamese bowl.
#[must_use]
pub fn emoji_for(category: Option<&str>, amenity: Option<&str>) -> &'static str {
    let key = category.or(amenity).unwrap_or_default().to_lowercase();
    EMOJI_TABLE
        .iter()
        .find(|(name, _)| key.contains(name))
        .map_or(DEFAULT_EMOJI, |(_, emoji)| *emoji)
}
