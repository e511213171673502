//! Terminal output
//!
//! Human mode prints short status lines; JSON mode prints one pretty JSON
//! document per command on stdout and nothing else.

use serde_json::Value;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Writes command results in the selected format
#[derive(Debug, Clone, Copy)]
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// A completed action (human mode only)
    pub fn success(&self, message: &str) {
        if !self.is_json() {
            println!("\u{2713} {message}");
        }
    }

    /// A non-fatal problem; always on stderr
    pub fn warn(&self, message: &str) {
        if self.is_json() {
            eprintln!("{}", serde_json::json!({ "level": "warning", "message": message }));
        } else {
            eprintln!("\u{26a0} Warning: {message}");
        }
    }

    /// A detail line (human mode only)
    pub fn line(&self, message: &str) {
        if !self.is_json() {
            println!("  {message}");
        }
    }

    /// The command's JSON result (JSON mode only)
    pub fn json(&self, value: &Value) {
        if self.is_json() {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_default()
            );
        }
    }
}
