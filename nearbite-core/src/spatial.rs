//! Great-circle distance and bounding-box helpers.
//!
//! [`Location`] is the validated WGS84 coordinate used across the engine.
//! [`Bounds`] wraps a [`geo::Rect`] with `x = longitude`, `y = latitude` and
//! treats boundary points as inside, as the POI stores do.

use geo::{Coord, Distance, Haversine, Intersects, Point, Rect};
use thiserror::Error;

/// Lower bound on the metres spanned by one degree of latitude. Slightly
/// under the true value so radius envelopes err on the large side.
const METRES_PER_DEGREE: f64 = 110_000.0;

/// A validated latitude/longitude pair in degrees.
///
/// # Examples
///
/// ```
/// use nearbite_core::Location;
///
/// # fn main() -> Result<(), nearbite_core::LocationError> {
/// let origin = Location::new(10.77, 106.70)?;
/// assert_eq!(origin.lat(), 10.77);
/// assert!(Location::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawLocation"))]
pub struct Location {
    lat: f64,
    lng: f64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawLocation> for Location {
    type Error = LocationError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

/// Errors returned by [`Location::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LocationError {
    /// Latitude was outside `[-90, 90]` or not finite.
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    /// Longitude was outside `[-180, 180]` or not finite.
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

impl Location {
    /// Validate and construct a [`Location`].
    pub fn new(lat: f64, lng: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(LocationError::Latitude(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(LocationError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lng(self) -> f64 {
        self.lng
    }

    /// The same position as a `geo` coordinate (`x = lng`, `y = lat`).
    #[must_use]
    pub const fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }

    /// Haversine distance to `other` in metres.
    #[must_use]
    pub fn distance_m(self, other: Self) -> f64 {
        Haversine.distance(Point::from(self.to_coord()), Point::from(other.to_coord()))
    }

    /// Haversine distance to `other` in kilometres.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "unit conversion")]
    pub fn distance_km(self, other: Self) -> f64 {
        self.distance_m(other) / 1_000.0
    }
}

/// Errors returned by [`Bounds::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BoundsError {
    /// A corner was not a valid coordinate.
    #[error(transparent)]
    Corner(#[from] LocationError),
    /// `min_lat` exceeded `max_lat`.
    #[error("minimum latitude {min} exceeds maximum latitude {max}")]
    InvertedLatitude {
        /// Supplied lower latitude.
        min: f64,
        /// Supplied upper latitude.
        max: f64,
    },
    /// `min_lng` exceeded `max_lng`.
    #[error("minimum longitude {min} exceeds maximum longitude {max}")]
    InvertedLongitude {
        /// Supplied lower longitude.
        min: f64,
        /// Supplied upper longitude.
        max: f64,
    },
}

/// An axis-aligned latitude/longitude rectangle.
///
/// Regions crossing the antimeridian are not modelled; split them into two
/// rectangles instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    rect: Rect<f64>,
}

impl Bounds {
    /// Validate and construct a rectangle from its edges.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError`] when a corner is out of range or an edge pair
    /// is inverted. Equal edges are allowed.
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Result<Self, BoundsError> {
        let south_west = Location::new(min_lat, min_lng)?;
        let north_east = Location::new(max_lat, max_lng)?;
        if min_lat > max_lat {
            return Err(BoundsError::InvertedLatitude {
                min: min_lat,
                max: max_lat,
            });
        }
        if min_lng > max_lng {
            return Err(BoundsError::InvertedLongitude {
                min: min_lng,
                max: max_lng,
            });
        }
        Ok(Self {
            rect: Rect::new(south_west.to_coord(), north_east.to_coord()),
        })
    }

    /// The smallest rectangle enclosing a circle of `radius_m` around
    /// `origin`, clamped to valid coordinates.
    ///
    /// Used as a cheap prefilter before exact haversine checks.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "degree offsets derive from metre radii"
    )]
    pub fn around(origin: Location, radius_m: u32) -> Self {
        let radius = f64::from(radius_m);
        let lat_delta = radius / METRES_PER_DEGREE;
        let cos_lat = origin.lat().to_radians().cos().max(1.0e-6);
        let lng_delta = (radius / (METRES_PER_DEGREE * cos_lat)).min(180.0);

        let south_west = Coord {
            x: (origin.lng() - lng_delta).max(-180.0),
            y: (origin.lat() - lat_delta).max(-90.0),
        };
        let north_east = Coord {
            x: (origin.lng() + lng_delta).min(180.0),
            y: (origin.lat() + lat_delta).min(90.0),
        };
        Self {
            rect: Rect::new(south_west, north_east),
        }
    }

    /// Southern edge.
    #[must_use]
    pub fn min_lat(&self) -> f64 {
        self.rect.min().y
    }

    /// Northern edge.
    #[must_use]
    pub fn max_lat(&self) -> f64 {
        self.rect.max().y
    }

    /// Western edge.
    #[must_use]
    pub fn min_lng(&self) -> f64 {
        self.rect.min().x
    }

    /// Eastern edge.
    #[must_use]
    pub fn max_lng(&self) -> f64 {
        self.rect.max().x
    }

    /// The underlying `geo` rectangle.
    #[must_use]
    pub const fn rect(&self) -> &Rect<f64> {
        &self.rect
    }

    /// Whether `location` lies inside or on the edge of the rectangle.
    #[must_use]
    pub fn contains(&self, location: Location) -> bool {
        self.rect.intersects(&location.to_coord())
    }
}
