// Library root
// -----------
// This crate exposes the pieces of the quickstart as a library so the
// binary (`main.rs`) stays a thin driver and the flow can be tested
// without a terminal or a network.
//
// Module responsibilities:
// - `model`: credentials, the analysis request and the analysis result.
// - `error`: the two service error kinds surfaced to the top level.
// - `api`: the blocking HTTP client for the Computer Vision service and
//   the `ImageAnalyzer` seam it implements.
// - `config`: command-line flags and the optional JSON config file.
// - `render`: turns an analysis result into console text.
// - `ui`: prompting for the image URL and driving one analysis.
pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod ui;
