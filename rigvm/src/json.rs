//! JSON description of compiled rigs.
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "name": "flip_test",
//!   "hierarchy_id": "0x5c97c207",
//!   "segments": [
//!     { "commands": [ { "op": "parenting", "elements": [ { "child": 16, "parent": 1 } ] } ] }
//!   ]
//! }
//! ```
//!
//! Locations and ids are written as numbers or `"0x..."` strings; `"invalid"` is an unconnected
//! location.

use crate::{CompiledRig, Error, Location, RIG_FORMAT_MAJOR, Segment};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawWord {
    Number(u32),
    Text(String),
}

impl RawWord {
    fn value(&self) -> Result<u32, String> {
        match self {
            RawWord::Number(n) => Ok(*n),
            RawWord::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("invalid") {
                    return Ok(Location::INVALID.raw());
                }
                let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    Some(hex) => u32::from_str_radix(hex, 16),
                    None => text.parse(),
                };
                parsed.map_err(|_| format!("invalid number or hex string '{text}'"))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawWord::deserialize(deserializer)?;
        raw.value()
            .map(Location::from_raw)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Deserialize)]
struct Root {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    name: String,
    hierarchy_id: RawWord,
    segments: Vec<Segment>,
}

impl CompiledRig {
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let root: Root = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;
        if let Some(v) = root.version.as_deref() {
            validate_format_version(v)?;
        }
        let hierarchy_id = root
            .hierarchy_id
            .value()
            .map_err(|message| Error::JsonParse { message })?;
        CompiledRig::new(root.name, hierarchy_id, root.segments)
    }
}

fn validate_format_version(value: &str) -> Result<(), Error> {
    let major = value
        .split('.')
        .next()
        .and_then(|major| major.trim().parse::<u32>().ok())
        .ok_or_else(|| Error::JsonFormatVersion {
            value: value.to_string(),
        })?;
    if major != RIG_FORMAT_MAJOR {
        return Err(Error::JsonFormatVersion {
            value: value.to_string(),
        });
    }
    Ok(())
}
