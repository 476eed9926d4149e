//! Response model for the `/process-audio` endpoint.
//!
//! The service answers with a small JSON object; the client only needs to read it
//! once, render it, and drop it.

use serde::Deserialize;
use serde_json::Value;

/// A song the service matched against the detected interval signature.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SongMatch {
    /// Song title
    #[serde(default)]
    pub title: String,
    /// Link to a playable version of the song, if any
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl SongMatch {
    /// One display line for the matches region.
    pub fn display_line(&self) -> String {
        match self.audio_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => format!("{} ({url})", self.title),
            None => self.title.clone(),
        }
    }
}

/// Parsed result of one analysis request.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RequestOutcome {
    pub success: bool,
    /// Detected tone intervals; opaque display tokens
    #[serde(default)]
    pub tone_intervals: Vec<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub songs: Vec<SongMatch>,
}

/// Renders one interval token in its plain text form.
///
/// Numbers print in shortest round-trip form: integral values drop the fractional
/// part (`2.0` prints as `2`), and magnitudes below `1e-6` or from `1e21` up use
/// exponent notation (`1e-7`, `1e+21`). Strings print unquoted, `null` prints as
/// nothing and nested arrays join with `,`.
pub fn token_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(float_text).unwrap_or_else(|| n.to_string())
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(token_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn float_text(f: f64) -> String {
    if f == 0.0 {
        // covers -0.0
        return "0".to_string();
    }
    if !f.is_finite() {
        return format!("{f}");
    }

    let magnitude = f.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let exp = format!("{f:e}");
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        };
    }

    if f.fract() == 0.0 {
        format!("{f:.0}")
    } else {
        format!("{f}")
    }
}
