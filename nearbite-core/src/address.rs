//! Best-effort address composition.
//!
//! A reverse geocoder is asked first. When it fails or returns nothing
//! useful, structured `addr:*` tags from the raw record are used instead.
//! Neither source succeeding leaves the address unset; that is not an error.

use async_trait::async_trait;
use log::debug;
use thiserror::Error;

use crate::{Location, Tags};

/// Tag keys used for the fallback address, most specific first.
const ADDRESS_TAGS: [&str; 3] = ["addr:housenumber", "addr:street", "addr:city"];

/// Administrative parts returned by a reverse geocoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    /// Neighbourhood or ward.
    pub locality: Option<String>,
    /// City or district.
    pub city: Option<String>,
    /// Province or state.
    pub region: Option<String>,
}

impl AddressParts {
    /// Join the non-empty parts, most specific first.
    ///
    /// # Examples
    ///
    /// ```
    /// use nearbite_core::AddressParts;
    ///
    /// let parts = AddressParts {
    ///     locality: Some("Bến Nghé".into()),
    ///     city: Some(String::new()),
    ///     region: Some("Hồ Chí Minh".into()),
    /// };
    /// assert_eq!(parts.compose().as_deref(), Some("Bến Nghé, Hồ Chí Minh"));
    /// ```
    #[must_use]
    pub fn compose(&self) -> Option<String> {
        join_parts([
            self.locality.as_deref(),
            self.city.as_deref(),
            self.region.as_deref(),
        ])
    }
}

/// Errors raised by a [`ReverseGeocoder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The lookup could not be completed.
    #[error("reverse geocoding via {url} failed: {message}")]
    Unavailable {
        /// Requested URL.
        url: String,
        /// Error description.
        message: String,
    },
    /// The response could not be decoded.
    #[error("reverse geocoding response was malformed: {message}")]
    Malformed {
        /// Decoder error description.
        message: String,
    },
}

/// Turn coordinates into administrative address parts.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Look up the address parts for `location`.
    async fn reverse(&self, location: Location) -> Result<AddressParts, GeocodeError>;
}

/// Compose an address from `addr:*` tags.
#[must_use]
pub fn address_from_tags(tags: &Tags) -> Option<String> {
    join_parts(ADDRESS_TAGS.map(|key| tags.get(key).map(String::as_str)))
}

/// Resolve an address for `location`, preferring `geocoder` and falling
/// back to `tags`.
pub async fn enrich_address(
    geocoder: Option<&dyn ReverseGeocoder>,
    location: Location,
    tags: &Tags,
) -> Option<String> {
    if let Some(service) = geocoder {
        match service.reverse(location).await {
            Ok(parts) => {
                if let Some(address) = parts.compose() {
                    return Some(address);
                }
                debug!("reverse geocoder returned no address parts");
            }
            Err(err) => debug!("falling back to address tags: {err}"),
        }
    }
    address_from_tags(tags)
}

fn join_parts<'a, I>(parts: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let joined = parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubReverseGeocoder;
    use rstest::{fixture, rstest};

    #[fixture]
    fn location() -> Location {
        Location::new(10.77, 106.70).expect("valid location")
    }

    #[fixture]
    fn tags() -> Tags {
        [
            ("addr:housenumber", "12"),
            ("addr:street", "Lý Tự Trọng"),
            ("addr:city", "Hồ Chí Minh"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
    }

    #[rstest]
    fn tags_compose_in_specificity_order(tags: Tags) {
        assert_eq!(
            address_from_tags(&tags).as_deref(),
            Some("12, Lý Tự Trọng, Hồ Chí Minh")
        );
    }

    #[rstest]
    fn empty_tags_give_no_address() {
        assert!(address_from_tags(&Tags::new()).is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn geocoder_wins_when_it_answers(location: Location, tags: Tags) {
        let geocoder = StubReverseGeocoder::answering(AddressParts {
            locality: Some("Bến Thành".into()),
            city: Some("Quận 1".into()),
            region: None,
        });
        let address = enrich_address(Some(&geocoder), location, &tags).await;
        assert_eq!(address.as_deref(), Some("Bến Thành, Quận 1"));
    }

    #[rstest]
    #[tokio::test]
    async fn failures_fall_back_to_tags(location: Location, tags: Tags) {
        let geocoder = StubReverseGeocoder::failing();
        let address = enrich_address(Some(&geocoder), location, &tags).await;
        assert_eq!(address.as_deref(), Some("12, Lý Tự Trọng, Hồ Chí Minh"));
    }

    #[rstest]
    #[tokio::test]
    async fn blank_geocoder_answers_fall_back_to_tags(location: Location, tags: Tags) {
        let geocoder = StubReverseGeocoder::answering(AddressParts::default());
        let address = enrich_address(Some(&geocoder), location, &tags).await;
        assert!(address.is_some_and(|text| text.starts_with("12")));
    }

    #[rstest]
    #[tokio::test]
    async fn nothing_available_leaves_the_address_unset(location: Location) {
        assert!(enrich_address(None, location, &Tags::new()).await.is_none());
    }
}
