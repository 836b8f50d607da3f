//! Goong Place API response types.

use serde::Deserialize;

/// Statuses that carry a usable (possibly empty) payload.
const SUCCESS_STATUSES: [&str; 2] = ["OK", "ZERO_RESULTS"];

/// Response envelope from `/Place/AutoComplete`.
#[derive(Debug, Deserialize)]
pub(super) struct AutoCompleteResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// A single autocomplete suggestion.
#[derive(Debug, Deserialize)]
pub(super) struct Prediction {
    pub place_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub structured_formatting: Option<StructuredFormatting>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StructuredFormatting {
    #[serde(default)]
    pub main_text: Option<String>,
}

/// Response envelope from `/Place/Detail`.
#[derive(Debug, Deserialize)]
pub(super) struct DetailResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result: Option<DetailResult>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DetailResult {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Failure reported inside a response body.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct ServiceFailure {
    pub code: String,
    pub message: String,
}

fn check_status(
    status: Option<&String>,
    error_message: Option<&String>,
) -> Result<(), ServiceFailure> {
    match status {
        Some(code) if !SUCCESS_STATUSES.contains(&code.as_str()) => Err(ServiceFailure {
            code: code.clone(),
            message: error_message.cloned().unwrap_or_default(),
        }),
        _ => Ok(()),
    }
}

impl AutoCompleteResponse {
    pub fn check(&self) -> Result<(), ServiceFailure> {
        check_status(self.status.as_ref(), self.error_message.as_ref())
    }
}

impl DetailResponse {
    pub fn check(&self) -> Result<(), ServiceFailure> {
        check_status(self.status.as_ref(), self.error_message.as_ref())
    }
}

impl Prediction {
    /// Display name: the structured main text, else the full description.
    pub fn display_name(&self) -> &str {
        self.structured_formatting
            .as_ref()
            .and_then(|formatting| formatting.main_text.as_deref())
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn decodes_autocomplete_predictions() {
        let body = r#"{
            "status": "OK",
            "predictions": [
                {
                    "place_id": "goong-1",
                    "description": "Phở Hòa, Pasteur, Quận 3",
                    "structured_formatting": { "main_text": "Phở Hòa" }
                },
                { "place_id": "goong-2", "description": "Bún chả Hà Nội" }
            ]
        }"#;
        let response: AutoCompleteResponse = serde_json::from_str(body).expect("decode");
        assert!(response.check().is_ok());
        let names: Vec<_> = response.predictions.iter().map(Prediction::display_name).collect();
        assert_eq!(names, ["Phở Hòa", "Bún chả Hà Nội"]);
    }

    #[rstest]
    fn missing_predictions_decode_as_empty() {
        let response: AutoCompleteResponse =
            serde_json::from_str(r#"{"status":"ZERO_RESULTS"}"#).expect("decode");
        assert!(response.check().is_ok());
        assert!(response.predictions.is_empty());
    }

    #[rstest]
    fn rejected_key_is_a_service_failure() {
        let response: AutoCompleteResponse = serde_json::from_str(
            r#"{"status":"REQUEST_DENIED","error_message":"invalid api key"}"#,
        )
        .expect("decode");
        assert_eq!(
            response.check(),
            Err(ServiceFailure {
                code: "REQUEST_DENIED".to_owned(),
                message: "invalid api key".to_owned(),
            })
        );
    }

    #[rstest]
    fn decodes_detail_geometry() {
        let body = r#"{
            "status": "OK",
            "result": {
                "name": "Phở Hòa",
                "formatted_address": "260C Pasteur, Quận 3",
                "geometry": { "location": { "lat": 10.7865, "lng": 106.6903 } }
            }
        }"#;
        let response: DetailResponse = serde_json::from_str(body).expect("decode");
        let location = response
            .result
            .and_then(|result| result.geometry)
            .map(|geometry| geometry.location)
            .expect("geometry");
        assert_eq!(location.lat.to_bits(), 10.7865_f64.to_bits());
        assert_eq!(location.lng.to_bits(), 106.6903_f64.to_bits());
    }
}
