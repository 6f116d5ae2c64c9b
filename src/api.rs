// API client module: a small blocking HTTP client for the Computer Vision
// "analyze" endpoint. One request per run, no retries; every failure is
// mapped onto `VisionError` so the caller only sees two kinds.

use crate::error::VisionError;
use crate::model::{
    AnalysisRequest, AnalysisResult, BoundingBox, Caption, ColorInfo, Credentials, Description,
    DetectedObject, Tag,
};
use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const ANALYZE_PATH: &str = "vision/v3.2/analyze";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Anything that can run an image analysis. The real implementation is
/// `ComputerVisionClient`; tests plug in canned results.
pub trait ImageAnalyzer {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, VisionError>;
}

/// Client bound to one key/endpoint pair. Construction never talks to the
/// service, so bad credentials only show up on the first `analyze`.
#[derive(Clone)]
pub struct ComputerVisionClient {
    client: Client,
    credentials: Credentials,
}

/// Body of the analyze request: the service fetches the image itself.
#[derive(Serialize, Debug)]
struct AnalyzeBody<'a> {
    url: &'a str,
}

impl ComputerVisionClient {
    /// Bind a client to `credentials`. Only fails if the HTTP stack itself
    /// cannot be initialised.
    pub fn authenticate(credentials: Credentials) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ComputerVisionClient {
            client,
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl ImageAnalyzer for ComputerVisionClient {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, VisionError> {
        let url = analyze_url(&self.credentials.endpoint);
        let features = request.features_param();
        tracing::debug!(%url, %features, image_url = %request.image_url, "sending analyze request");

        let res = self
            .client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.credentials.key)
            .query(&[("visualFeatures", features.as_str())])
            .json(&AnalyzeBody {
                url: &request.image_url,
            })
            .send()
            .map_err(send_error)?;

        let status = res.status();
        tracing::debug!(status = status.as_u16(), "analyze response received");
        let body = res.text().map_err(|e| {
            VisionError::remote_with_source(Some(status.as_u16()), "Failed to read response body", e)
        })?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }
        decode_analysis(&body).map_err(|e| {
            VisionError::remote_with_source(
                Some(status.as_u16()),
                "Parsing analysis response json",
                e,
            )
        })
    }
}

/// Full URL of the analyze operation for a resource endpoint.
pub fn analyze_url(endpoint: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), ANALYZE_PATH)
}

// A builder error means the endpoint or key could not be used to form a
// request at all, which is a credentials problem.
fn send_error(e: reqwest::Error) -> VisionError {
    if e.is_builder() {
        return VisionError::authentication(format!(
            "Cannot build a request from the configured endpoint and key: {}",
            e
        ));
    }
    let status = e.status().map(|s| s.as_u16());
    VisionError::remote_with_source(status, "Failed to send analyze request", e)
}

/// Map a non-success response onto the matching error kind.
pub fn classify_failure(status: StatusCode, body: &str) -> VisionError {
    let detail = service_message(body).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status.to_string()
        } else {
            trimmed.to_string()
        }
    });
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VisionError::authentication(detail),
        _ => VisionError::remote(Some(status.as_u16()), format!("{} - {}", status, detail)),
    }
}

/// Error bodies come either as `{"error": {"code", "message"}}` or with
/// `code`/`message` at the top level. `code` is sometimes a number, so it
/// stays a `serde_json::Value`.
#[derive(Deserialize, Debug, Default)]
struct ErrorEnvelope {
    error: Option<ServiceError>,
    #[serde(flatten)]
    top_level: ServiceError,
}

#[derive(Deserialize, Debug, Default)]
struct ServiceError {
    code: Option<serde_json::Value>,
    message: Option<String>,
}

fn service_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let err = envelope.error.unwrap_or(envelope.top_level);
    let code = err.code.map(|c| match c {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    });
    match (code, err.message) {
        (Some(code), Some(message)) => Some(format!("{}: {}", code, message)),
        (None, Some(message)) => Some(message),
        (Some(code), None) => Some(code),
        (None, None) => None,
    }
}

// Wire shapes of a successful analyze response. Fields we do not render
// (categories, metadata, requestId, ...) are ignored by serde.

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct WireAnalysis {
    description: Option<WireDescription>,
    tags: Option<Vec<WireTag>>,
    objects: Option<Vec<WireObject>>,
    color: Option<WireColor>,
}

#[derive(Deserialize, Debug)]
struct WireDescription {
    #[serde(default)]
    captions: Vec<WireCaption>,
}

#[derive(Deserialize, Debug)]
struct WireCaption {
    text: String,
    confidence: f64,
}

#[derive(Deserialize, Debug)]
struct WireTag {
    name: String,
    confidence: f64,
}

#[derive(Deserialize, Debug)]
struct WireObject {
    object: String,
    confidence: f64,
    rectangle: WireRectangle,
}

#[derive(Deserialize, Debug)]
struct WireRectangle {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireColor {
    dominant_color_foreground: Option<String>,
    dominant_color_background: Option<String>,
    #[serde(default)]
    dominant_colors: Vec<String>,
    #[serde(rename = "isBWImg", default)]
    is_bw_img: bool,
}

fn decode_analysis(body: &str) -> serde_json::Result<AnalysisResult> {
    let wire: WireAnalysis = serde_json::from_str(body)?;
    Ok(AnalysisResult {
        description: wire.description.map(|d| Description {
            captions: d
                .captions
                .into_iter()
                .map(|c| Caption {
                    text: c.text,
                    confidence: c.confidence,
                })
                .collect(),
        }),
        tags: wire.tags.map(|tags| {
            tags.into_iter()
                .map(|t| Tag {
                    name: t.name,
                    confidence: t.confidence,
                })
                .collect()
        }),
        objects: wire.objects.map(|objects| {
            objects
                .into_iter()
                .map(|o| DetectedObject {
                    label: o.object,
                    confidence: o.confidence,
                    bounding_box: BoundingBox {
                        x: o.rectangle.x,
                        y: o.rectangle.y,
                        w: o.rectangle.w,
                        h: o.rectangle.h,
                    },
                })
                .collect()
        }),
        color: wire.color.map(|c| ColorInfo {
            dominant_background: c.dominant_color_background.unwrap_or_default(),
            dominant_foreground: c.dominant_color_foreground.unwrap_or_default(),
            dominant_colors: c.dominant_colors,
            is_black_and_white: c.is_bw_img,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = r#"{
        "categories": [{"name": "animal_cat", "score": 0.99}],
        "tags": [
            {"name": "cat", "confidence": 0.97},
            {"name": "animal", "confidence": 0.88}
        ],
        "description": {
            "tags": ["cat", "indoor"],
            "captions": [{"text": "a cat sitting on a couch", "confidence": 0.873}]
        },
        "objects": [
            {"rectangle": {"x": 10, "y": 20, "w": 30, "h": 40}, "object": "dog", "confidence": 0.91,
             "parent": {"object": "mammal", "confidence": 0.95}}
        ],
        "color": {
            "dominantColorForeground": "Black",
            "dominantColorBackground": "White",
            "dominantColors": ["White", "Black"],
            "accentColor": "19A4B2",
            "isBWImg": true
        },
        "requestId": "0dbec5ad-a3d3-4f7e-96b4-dfd57efe967d",
        "metadata": {"height": 600, "width": 800, "format": "Jpeg"},
        "modelVersion": "2021-05-01"
    }"#;

    #[test]
    fn analyze_url_joins_endpoint_and_path() {
        assert_eq!(
            analyze_url("https://westus.api.cognitive.microsoft.com/"),
            "https://westus.api.cognitive.microsoft.com/vision/v3.2/analyze"
        );
        assert_eq!(
            analyze_url("https://westus.api.cognitive.microsoft.com"),
            "https://westus.api.cognitive.microsoft.com/vision/v3.2/analyze"
        );
    }

    #[test]
    fn decodes_every_section() {
        let result = decode_analysis(FULL_RESPONSE).unwrap();

        let captions = &result.description.as_ref().unwrap().captions;
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].text, "a cat sitting on a couch");

        let tags = result.tags.as_ref().unwrap();
        assert_eq!(tags[0].name, "cat");
        assert_eq!(tags[1].name, "animal");

        let objects = result.objects.as_ref().unwrap();
        assert_eq!(objects[0].label, "dog");
        assert_eq!(
            objects[0].bounding_box,
            BoundingBox {
                x: 10,
                y: 20,
                w: 30,
                h: 40
            }
        );

        let color = result.color.as_ref().unwrap();
        assert_eq!(color.dominant_background, "White");
        assert_eq!(color.dominant_foreground, "Black");
        assert_eq!(color.dominant_colors, vec!["White", "Black"]);
        assert!(color.is_black_and_white);
    }

    #[test]
    fn missing_sections_decode_as_absent() {
        let result = decode_analysis(r#"{"tags": [], "requestId": "abc"}"#).unwrap();
        assert_eq!(result.tags, Some(vec![]));
        assert!(result.description.is_none());
        assert!(result.objects.is_none());
        assert!(result.color.is_none());
    }

    #[test]
    fn unauthorized_is_an_authentication_error() {
        let body = r#"{"error":{"code":"401","message":"Access denied due to invalid subscription key or wrong API endpoint."}}"#;
        match classify_failure(StatusCode::UNAUTHORIZED, body) {
            VisionError::Authentication { message } => {
                assert_eq!(
                    message,
                    "401: Access denied due to invalid subscription key or wrong API endpoint."
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, ""),
            VisionError::Authentication { .. }
        ));
    }

    #[test]
    fn bad_request_is_a_remote_analysis_error() {
        let body = r#"{"error":{"code":"InvalidRequest","innererror":{"code":"InvalidImageUrl"},"message":"Image URL is badly formatted."}}"#;
        match classify_failure(StatusCode::BAD_REQUEST, body) {
            VisionError::RemoteAnalysis {
                status, message, ..
            } => {
                assert_eq!(status, Some(400));
                assert_eq!(
                    message,
                    "400 Bad Request - InvalidRequest: Image URL is badly formatted."
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn legacy_and_unstructured_error_bodies() {
        let legacy = r#"{"code":"InvalidImageUrl","requestId":"x","message":"Input image URL is invalid."}"#;
        assert_eq!(
            classify_failure(StatusCode::BAD_REQUEST, legacy).to_string(),
            "Image analysis failed: 400 Bad Request - InvalidImageUrl: Input image URL is invalid."
        );

        assert_eq!(
            classify_failure(StatusCode::BAD_GATEWAY, "upstream timed out\n").to_string(),
            "Image analysis failed: 502 Bad Gateway - upstream timed out"
        );

        assert_eq!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "").to_string(),
            "Image analysis failed: 500 Internal Server Error - 500 Internal Server Error"
        );
    }

    #[test]
    fn empty_credentials_build_a_client() {
        let client = ComputerVisionClient::authenticate(Credentials::new("", "")).unwrap();
        assert_eq!(client.credentials(), &Credentials::default());
    }

    #[test]
    fn empty_endpoint_fails_at_analyze_time() {
        let client = ComputerVisionClient::authenticate(Credentials::new("", "")).unwrap();
        let err = client
            .analyze(&AnalysisRequest::new("https://example.com/cat.jpg"))
            .unwrap_err();
        assert!(matches!(err, VisionError::Authentication { .. }));
    }
}
