use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::env::{core::NoColor, EnvVar};
use crate::translation::error::TranslationError;

/// Represents errors that can occur while running livedict
///
/// This error type is what the command surface reports; per-node failures
/// inside the engine never surface as errors.
#[derive(Debug)]
pub struct LivedictError {
    details: String,
}

impl LivedictError {
    /// Creates a new LivedictError with the given message
    pub fn new(msg: &str) -> LivedictError {
        LivedictError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for LivedictError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for LivedictError {}

impl From<TranslationError> for LivedictError {
    fn from(error: TranslationError) -> Self {
        LivedictError::new(&error.to_string())
    }
}

impl From<std::io::Error> for LivedictError {
    fn from(error: std::io::Error) -> Self {
        LivedictError::new(&format!("I/O error: {}", error))
    }
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Prints an error line to stderr, in red when stderr is a terminal
pub fn print_error_message(text: &str) {
    let use_color = atty::is(atty::Stream::Stderr) && !NoColor::get_or_default(false);

    if use_color {
        eprintln!("{}{}{}", ANSI_COLOR_RED, text, ANSI_COLOR_RESET);
    } else {
        eprintln!("{}", text);
    }
}

/// Reads a whole input document, `-` meaning stdin
pub fn read_document(target: &str) -> Result<Vec<u8>, LivedictError> {
    if target == "-" {
        let mut buf = Vec::new();
        std::io::Read::read_to_end(&mut std::io::stdin(), &mut buf)?;
        return Ok(buf);
    }

    let path = Path::new(target);
    if !path.is_file() {
        return Err(LivedictError::new(&format!(
            "input '{}' is not a readable file",
            target
        )));
    }

    Ok(fs::read(path)?)
}

/// Reads an input document from an http(s) URL, or falls back to [`read_document`]
pub fn read_input(target: &str, timeout: Duration) -> Result<Vec<u8>, LivedictError> {
    match Url::parse(target) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => fetch_document(&url, timeout),
        _ => read_document(target),
    }
}

fn fetch_document(url: &Url, timeout: Duration) -> Result<Vec<u8>, LivedictError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(TranslationError::from)?;
    let response = client
        .get(url.as_str())
        .send()
        .map_err(TranslationError::from)?;

    let status = response.status();
    if !status.is_success() {
        return Err(LivedictError::new(&format!(
            "failed to fetch '{}': HTTP {}",
            url, status
        )));
    }

    let body = response.bytes().map_err(TranslationError::from)?;
    Ok(body.to_vec())
}

/// Writes output bytes to a file, or to stdout when no path (or `-`) is given
pub fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), LivedictError> {
    match path {
        Some(path) if path != "-" => {
            fs::write(path, data)?;
        }
        _ => {
            use std::io::Write;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(data)?;
            handle.flush()?;
        }
    }

    Ok(())
}
