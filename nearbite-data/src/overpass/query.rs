//! Overpass QL builders.

use nearbite_core::{Bounds, Location};

/// Named nodes tagged with any of `amenities` within `radius_m` of `origin`.
pub(super) fn around_query(
    origin: Location,
    radius_m: u32,
    amenities: &[&str],
    server_timeout_secs: u32,
) -> String {
    let statements: String = amenities
        .iter()
        .map(|amenity| {
            format!(
                r#"node["amenity"="{amenity}"]["name"](around:{radius_m},{},{});"#,
                origin.lat(),
                origin.lng()
            )
        })
        .collect();
    format!("[out:json][timeout:{server_timeout_secs}];({statements});out body;")
}

/// Named nodes tagged with any of `amenities` inside `bounds`.
///
/// Overpass orders bounding boxes as south, west, north, east.
pub(super) fn bounds_query(bounds: &Bounds, amenities: &[&str], server_timeout_secs: u32) -> String {
    format!(
        r#"[out:json][timeout:{server_timeout_secs}];(node["amenity"~"^({})$"]["name"]({},{},{},{}););out body;"#,
        amenities.join("|"),
        bounds.min_lat(),
        bounds.min_lng(),
        bounds.max_lat(),
        bounds.max_lng()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearbite_core::{ALL_AMENITIES, DRINK_AMENITIES, FOOD_AMENITIES};
    use rstest::rstest;

    #[rstest]
    fn around_query_has_one_statement_per_amenity() {
        let origin = Location::new(10.77, 106.7).expect("origin");
        let query = around_query(origin, 1_500, &FOOD_AMENITIES, 25);
        assert_eq!(
            query,
            concat!(
                "[out:json][timeout:25];(",
                r#"node["amenity"="restaurant"]["name"](around:1500,10.77,106.7);"#,
                r#"node["amenity"="fast_food"]["name"](around:1500,10.77,106.7);"#,
                ");out body;"
            )
        );
    }

    #[rstest]
    fn drink_query_includes_pubs() {
        let origin = Location::new(10.77, 106.7).expect("origin");
        let query = around_query(origin, 500, &DRINK_AMENITIES, 25);
        assert!(query.contains(r#""amenity"="pub""#));
        assert!(!query.contains("restaurant"));
    }

    #[rstest]
    fn bounds_query_orders_south_west_north_east() {
        let bounds = Bounds::new(10.7, 10.8, 106.6, 106.7).expect("bounds");
        let query = bounds_query(&bounds, &ALL_AMENITIES, 25);
        assert!(query.contains(r#"["amenity"~"^(restaurant|cafe|fast_food|bar|pub)$"]"#));
        assert!(query.contains("(10.7,106.6,10.8,106.7)"));
    }
}
