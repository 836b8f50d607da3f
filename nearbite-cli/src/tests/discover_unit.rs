//! Focused unit tests covering `random` and `keyword` configuration.

use super::*;
use crate::discover::{DiscoverConfig, KeywordArgs, RandomArgs, random_config_from_layers_for_test};
use nearbite_core::{DistanceTier, LocationError, SearchError, VenueFilter};
use rstest::rstest;

fn random_at(lat: f64, lng: f64) -> RandomArgs {
    RandomArgs {
        lat: Some(lat),
        lng: Some(lng),
        ..RandomArgs::default()
    }
}

#[rstest]
#[case(None, Some(106.69), ARG_LAT, ENV_RANDOM_LAT)]
#[case(Some(10.77), None, ARG_LNG, ENV_RANDOM_LNG)]
fn converting_random_without_coordinates_errors(
    #[case] lat: Option<f64>,
    #[case] lng: Option<f64>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = RandomArgs {
        lat,
        lng,
        ..RandomArgs::default()
    };
    let err = DiscoverConfig::try_from(args).expect_err("missing coordinate should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_keyword_without_text_errors() {
    let args = KeywordArgs {
        lat: Some(10.77),
        lng: Some(106.69),
        ..KeywordArgs::default()
    };
    let err = DiscoverConfig::try_from(args).expect_err("missing keyword should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_KEYWORD);
            assert_eq!(env, ENV_KEYWORD_TEXT);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn random_config_applies_search_options() {
    let args = RandomArgs {
        filter: Some("drink".to_owned()),
        tier: Some("far".to_owned()),
        exclude: Some(vec!["osm-node-1".to_owned(), "goong-2".to_owned()]),
        min_distance_m: Some(6_000),
        ..random_at(10.77, 106.69)
    };

    let config = DiscoverConfig::try_from(args).expect("config should build");

    let options = config.request.options();
    assert_eq!(options.filter, VenueFilter::Drink);
    assert_eq!(options.tier, DistanceTier::Far);
    assert!(options.is_excluded("osm-node-1"));
    assert!(options.is_excluded("goong-2"));
    assert_eq!(options.min_distance_m, Some(6_000));
    assert!(config.keyword.is_none());
}

#[rstest]
fn keyword_config_keeps_the_text() {
    let args = KeywordArgs {
        keyword: Some("bánh mì".to_owned()),
        lat: Some(10.77),
        lng: Some(106.69),
        ..KeywordArgs::default()
    };

    let config = DiscoverConfig::try_from(args).expect("config should build");

    assert_eq!(config.keyword.as_deref(), Some("bánh mì"));
    assert_eq!(config.request.options().filter, VenueFilter::All);
}

#[rstest]
fn unknown_filter_is_rejected() {
    let args = RandomArgs {
        filter: Some("dessert".to_owned()),
        ..random_at(10.77, 106.69)
    };
    let err = DiscoverConfig::try_from(args).expect_err("unknown filter");
    match err {
        CliError::InvalidFilter(source) => assert_eq!(source.0, "dessert"),
        other => panic!("expected InvalidFilter, found {other:?}"),
    }
}

#[rstest]
fn unknown_tier_is_rejected() {
    let args = RandomArgs {
        tier: Some("walking".to_owned()),
        ..random_at(10.77, 106.69)
    };
    let err = DiscoverConfig::try_from(args).expect_err("unknown tier");
    assert!(matches!(err, CliError::InvalidTier(_)), "unexpected {err:?}");
}

#[rstest]
fn out_of_range_origin_is_invalid_input() {
    let err = DiscoverConfig::try_from(random_at(95.0, 106.69)).expect_err("bad latitude");
    match err {
        CliError::InvalidInput(SearchError::InvalidLocation(LocationError::Latitude(lat))) => {
            assert_eq!(lat.to_bits(), 95.0_f64.to_bits());
        }
        other => panic!("expected InvalidInput, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "lat": "north" }));

    let err = random_config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "lat": 10.5,
            "lng": 106.5,
            "filter": "food",
            "providers": "sqlite,overpass",
        }),
        None,
    );
    composer.push_environment(json!({
        "lng": 106.6,
        "tier": "far",
    }));
    composer.push_cli(json!({
        "filter": "drink",
    }));

    let config =
        random_config_from_layers_for_test(composer.layers()).expect("merged config should build");
    let origin = config.request.origin();
    assert_eq!(origin.lat().to_bits(), 10.5_f64.to_bits());
    assert_eq!(origin.lng().to_bits(), 106.6_f64.to_bits());
    assert_eq!(config.request.options().filter, VenueFilter::Drink);
    assert_eq!(config.request.options().tier, DistanceTier::Far);
    assert_eq!(config.chain.chain.providers.len(), 2);
}
