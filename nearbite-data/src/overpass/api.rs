//! Overpass JSON response types and their mapping onto [`Place`].

use nearbite_core::{Location, Place, Tags, VenueKind, address_from_tags, emoji_for};
use serde::Deserialize;

const OSM_NODE_URL: &str = "https://www.openstreetmap.org/node";

/// Top-level interpreter response.
#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Set by the interpreter when the query failed at runtime.
    #[serde(default)]
    pub remark: Option<String>,
}

/// One OSM element. Only nodes carry `lat`/`lon` at the top level.
#[derive(Debug, Deserialize)]
pub(super) struct Element {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: Tags,
}

/// A classified element ready for candidate filtering.
#[derive(Debug, Clone)]
pub(super) struct OsmRecord {
    pub place: Place,
    pub kind: VenueKind,
    pub tags: Tags,
}

impl OsmRecord {
    /// The place with its address composed from `addr:*` tags.
    pub fn into_tagged_place(self) -> Place {
        match address_from_tags(&self.tags) {
            Some(address) => self.place.with_address(address),
            None => self.place,
        }
    }
}

impl Element {
    /// Map a named, positioned venue node to a record.
    ///
    /// Returns `None` for unnamed elements, elements without valid
    /// coordinates and amenities outside the venue vocabulary.
    pub fn into_record(self) -> Option<OsmRecord> {
        let name = self
            .tags
            .get("name")
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())?
            .to_owned();
        let location = Location::new(self.lat?, self.lon?).ok()?;
        let amenity = self.tags.get("amenity").map(String::as_str);
        let kind = amenity.and_then(VenueKind::from_amenity)?;
        let cuisine = self.tags.get("cuisine").map(String::as_str);

        let mut place = Place::new(format!("osm-{}-{}", self.kind, self.id), location, name)
            .with_emoji(emoji_for(cuisine, amenity))
            .with_external_ref(format!("{OSM_NODE_URL}/{}", self.id));
        if let Some(category) = cuisine.or(amenity) {
            place = place.with_category(category);
        }
        Some(OsmRecord {
            place,
            kind,
            tags: self.tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn decode(body: &str) -> Vec<OsmRecord> {
        let response: OverpassResponse = serde_json::from_str(body).expect("decode");
        response
            .elements
            .into_iter()
            .filter_map(Element::into_record)
            .collect()
    }

    #[rstest]
    fn maps_named_restaurant_node() {
        let records = decode(
            r#"{"elements":[{"type":"node","id":42,"lat":10.78,"lon":106.70,
                "tags":{"amenity":"restaurant","name":"Phở Lệ","cuisine":"vietnamese;noodle",
                        "addr:street":"Nguyễn Trãi","addr:city":"Hồ Chí Minh"}}]}"#,
        );
        let [record] = records.as_slice() else {
            panic!("expected one record, got {}", records.len());
        };
        assert_eq!(record.place.id, "osm-node-42");
        assert_eq!(record.place.category.as_deref(), Some("vietnamese;noodle"));
        assert_eq!(record.place.emoji.as_deref(), Some("🍜"));
        assert_eq!(record.kind, VenueKind::Food);
        assert_eq!(
            record.clone().into_tagged_place().address.as_deref(),
            Some("Nguyễn Trãi, Hồ Chí Minh")
        );
    }

    #[rstest]
    fn category_falls_back_to_amenity() {
        let records = decode(
            r#"{"elements":[{"type":"node","id":7,"lat":10.78,"lon":106.70,
                "tags":{"amenity":"pub","name":"Saigon Pub"}}]}"#,
        );
        let record = records.first().expect("one record");
        assert_eq!(record.place.category.as_deref(), Some("pub"));
        assert_eq!(record.kind, VenueKind::Drink);
    }

    #[rstest]
    #[case::unnamed(r#"{"type":"node","id":1,"lat":10.0,"lon":106.0,"tags":{"amenity":"cafe"}}"#)]
    #[case::blank_name(
        r#"{"type":"node","id":1,"lat":10.0,"lon":106.0,"tags":{"amenity":"cafe","name":" "}}"#
    )]
    #[case::no_position(r#"{"type":"way","id":1,"tags":{"amenity":"cafe","name":"Cà phê"}}"#)]
    #[case::other_amenity(
        r#"{"type":"node","id":1,"lat":10.0,"lon":106.0,"tags":{"amenity":"bank","name":"ACB"}}"#
    )]
    fn skips_unusable_elements(#[case] element: &str) {
        let body = format!(r#"{{"elements":[{element}]}}"#);
        assert!(decode(&body).is_empty());
    }

    #[rstest]
    fn runtime_remark_is_decoded() {
        let response: OverpassResponse = serde_json::from_str(
            r#"{"elements":[],"remark":"runtime error: Query timed out in \"query\""}"#,
        )
        .expect("decode");
        assert!(response.remark.is_some());
    }
}
