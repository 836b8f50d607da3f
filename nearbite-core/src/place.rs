//! The venue record returned by every provider.

use std::collections::HashMap;

use crate::Location;

/// OpenStreetMap-style key/value tags carried by raw provider records.
pub type Tags = HashMap<String, String>;

/// A venue suggested to the caller.
///
/// `id` is stable for the same physical venue within one provider so
/// exclusion lists keep working across repeated calls. Uniqueness across
/// providers is not guaranteed.
///
/// # Examples
///
/// ```
/// use nearbite_core::{Location, Place};
///
/// # fn main() -> Result<(), nearbite_core::LocationError> {
/// let place = Place::new("osm-node-42", Location::new(10.77, 106.70)?, "Phở Hòa")
///     .with_category("vietnamese")
///     .with_emoji("🍜");
/// assert_eq!(place.category.as_deref(), Some("vietnamese"));
/// assert!(place.distance_km.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Place {
    /// Provider-defined identifier.
    pub id: String,
    /// Where the venue is.
    pub location: Location,
    /// Display name.
    pub name: String,
    /// Human-readable address, when one could be composed.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub address: Option<String>,
    /// Cuisine or amenity label.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub category: Option<String>,
    /// Display emoji derived from the category.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub emoji: Option<String>,
    /// Average rating reported by the source.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub rating: Option<f64>,
    /// Number of reviews behind `rating`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub review_count: Option<u32>,
    /// Great-circle distance from the search origin in kilometres.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub distance_km: Option<f64>,
    /// Identifier or URL in the upstream system.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub external_ref: Option<String>,
}

impl Place {
    /// Construct a place with only the required fields set.
    pub fn new(id: impl Into<String>, location: Location, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location,
            name: name.into(),
            address: None,
            category: None,
            emoji: None,
            rating: None,
            review_count: None,
            distance_km: None,
            external_ref: None,
        }
    }

    /// Set the address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the emoji.
    #[must_use]
    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    /// Set the rating and its review count.
    #[must_use]
    pub fn with_rating(mut self, rating: Option<f64>, review_count: Option<u32>) -> Self {
        self.rating = rating;
        self.review_count = review_count;
        self
    }

    /// Set the upstream reference.
    #[must_use]
    pub fn with_external_ref(mut self, external_ref: impl Into<String>) -> Self {
        self.external_ref = Some(external_ref.into());
        self
    }

    /// Record the distance from `origin`.
    #[must_use]
    pub fn measured_from(mut self, origin: Location) -> Self {
        self.distance_km = Some(origin.distance_km(self.location));
        self
    }
}
