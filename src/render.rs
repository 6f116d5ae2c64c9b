// Console rendering of an analysis result. Sections appear in a fixed
// order and only when the service returned the matching sub-record.

use crate::model::{AnalysisResult, ColorInfo, Description, DetectedObject, Tag};
use std::fmt::Write;

/// Render `result` as human-readable text. Absent sub-records produce no
/// output at all; a present but empty list still gets its heading.
pub fn render(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if let Some(description) = &result.description {
        render_description(&mut out, description);
    }
    if let Some(tags) = &result.tags {
        render_tags(&mut out, tags);
    }
    if let Some(objects) = &result.objects {
        render_objects(&mut out, objects);
    }
    if let Some(color) = &result.color {
        render_color(&mut out, color);
    }
    out
}

/// Confidence with two decimals, rounded to nearest by `format!`.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}", confidence)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

// Writing into a String cannot fail, so the fmt results are dropped.

fn render_description(out: &mut String, description: &Description) {
    let _ = writeln!(out, "Captions:");
    for caption in &description.captions {
        let _ = writeln!(
            out,
            "  '{}' with confidence {}",
            caption.text,
            format_confidence(caption.confidence)
        );
    }
}

fn render_tags(out: &mut String, tags: &[Tag]) {
    let _ = writeln!(out, "Tags:");
    for tag in tags {
        let _ = writeln!(
            out,
            "  '{}' with confidence {}",
            tag.name,
            format_confidence(tag.confidence)
        );
    }
}

fn render_objects(out: &mut String, objects: &[DetectedObject]) {
    let _ = writeln!(out, "Objects:");
    for object in objects {
        let b = object.bounding_box;
        let _ = writeln!(
            out,
            "  '{}' with confidence {} at location x={}, y={}, w={}, h={}",
            object.label,
            format_confidence(object.confidence),
            b.x,
            b.y,
            b.w,
            b.h
        );
    }
}

fn render_color(out: &mut String, color: &ColorInfo) {
    let _ = writeln!(out, "Color scheme:");
    let _ = writeln!(
        out,
        "  Is black and white: {}",
        yes_no(color.is_black_and_white)
    );
    let _ = writeln!(
        out,
        "  Dominant background color: {}",
        color.dominant_background
    );
    let _ = writeln!(
        out,
        "  Dominant foreground color: {}",
        color.dominant_foreground
    );
    let _ = writeln!(
        out,
        "  Dominant colors: {}",
        color.dominant_colors.join(", ")
    );
}
