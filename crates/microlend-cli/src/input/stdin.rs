use serde::de::DeserializeOwned;
use std::io::{self, Read};
use tracing::debug;

/// Deserialise an input document piped on stdin.
///
/// An interactive terminal or an empty pipe yields `None`, leaving the
/// command to fall back to its flags.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin().lock().read_to_string(&mut piped)?;
    parse_piped(&piped)
}

/// Documents opening with `{` are JSON, anything else is YAML.
fn parse_piped<T: DeserializeOwned>(piped: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let doc = piped.trim();
    if doc.is_empty() {
        return Ok(None);
    }

    let is_json = doc.starts_with('{');
    debug!(bytes = doc.len(), json = is_json, "reading input from stdin");

    let value: T = if is_json {
        serde_json::from_str(doc).map_err(|e| format!("Failed to parse stdin as JSON: {e}"))?
    } else {
        serde_yaml::from_str(doc).map_err(|e| format!("Failed to parse stdin as YAML: {e}"))?
    };
    Ok(Some(value))
}
