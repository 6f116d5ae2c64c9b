// Data shapes for one run: the credentials, what we ask the service for,
// and what it answers. Nothing here outlives the process.

use std::fmt;

/// Key and endpoint for the Computer Vision resource. Both are opaque;
/// no validation happens before the service is contacted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub endpoint: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Credentials {
            key: key.into(),
            endpoint: endpoint.into(),
        }
    }
}

// The key is a secret, keep it out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Credentials")
            .field("key", &key)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// A category of visual analysis the service can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Tags,
    Categories,
    Description,
    Objects,
    Color,
}

impl FeatureKind {
    /// The feature set requested on every run.
    pub const DEFAULT_SET: [FeatureKind; 5] = [
        FeatureKind::Tags,
        FeatureKind::Categories,
        FeatureKind::Description,
        FeatureKind::Objects,
        FeatureKind::Color,
    ];

    /// Name used in the `visualFeatures` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Tags => "Tags",
            FeatureKind::Categories => "Categories",
            FeatureKind::Description => "Description",
            FeatureKind::Objects => "Objects",
            FeatureKind::Color => "Color",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub image_url: String,
    pub features: Vec<FeatureKind>,
}

impl AnalysisRequest {
    /// Request for `image_url` with the default feature set.
    pub fn new(image_url: impl Into<String>) -> Self {
        AnalysisRequest {
            image_url: image_url.into(),
            features: FeatureKind::DEFAULT_SET.to_vec(),
        }
    }

    /// Comma separated feature list, duplicates dropped, order kept.
    pub fn features_param(&self) -> String {
        let mut seen = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            if !seen.contains(feature) {
                seen.push(*feature);
            }
        }
        seen.iter()
            .map(FeatureKind::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Result of one analysis. Each sub-record is `None` when the service did
/// not return it; an empty list means it was returned with no entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    pub description: Option<Description>,
    pub tags: Option<Vec<Tag>>,
    pub objects: Option<Vec<DetectedObject>>,
    pub color: Option<ColorInfo>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    pub captions: Vec<Caption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
}

/// Pixel rectangle of a detected object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorInfo {
    pub dominant_background: String,
    pub dominant_foreground: String,
    pub dominant_colors: Vec<String>,
    pub is_black_and_white: bool,
}
