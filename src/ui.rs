// UI layer: asks for the image URL, shows a spinner while the single
// blocking call runs, and prints the rendered result.

use crate::api::ImageAnalyzer;
use crate::model::AnalysisRequest;
use crate::render::render;
use anyhow::Result;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

pub const BANNER: &str = "Computer Vision - Rust Quickstart Sample";
const PROMPT: &str = "Enter an image URL";

/// Ask for one image URL on stdin. A terminal gets a `dialoguer` prompt;
/// piped input is read line-wise. The URL is not checked in any way.
pub fn prompt_image_url() -> Result<String> {
    if io::stdin().is_terminal() {
        let url = Input::<String>::new()
            .with_prompt(PROMPT)
            .allow_empty(true)
            .interact_text()?;
        return Ok(url.trim().to_string());
    }

    // The lock is held only for this read and released on return, even
    // when the read fails.
    let stdin = io::stdin();
    let mut input = stdin.lock();
    read_image_url(&mut input, &mut io::stdout())
}

/// Print the prompt to `out` and read a single line from `input`. A closed
/// stream yields an empty string.
pub fn read_image_url<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<String> {
    write!(out, "{}: ", PROMPT)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Run one analysis of `image_url` with the default feature set and write
/// the rendered result to `out`. A `VisionError` from the analyzer is
/// returned untouched inside the `anyhow::Error`.
pub fn analyze_remote_image<A, W>(analyzer: &A, image_url: &str, out: &mut W) -> Result<()>
where
    A: ImageAnalyzer + ?Sized,
    W: Write,
{
    writeln!(out, "\nAnalyzing an image from a URL ...")?;
    out.flush()?;

    let request = AnalysisRequest::new(image_url);
    tracing::info!(image_url = %request.image_url, features = %request.features_param(), "analyzing image");

    // indicatif hides the spinner on its own when stderr is not a terminal.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("Waiting for the service...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = analyzer.analyze(&request);
    spinner.finish_and_clear();

    let result = outcome?;
    write!(out, "\n{}", render(&result))?;
    Ok(())
}
