//! Test-vector generator for the Nova protocol object codec.
//!
//! Prints Markdown blocks (JSON, binary and identifier) for a fixed set of
//! protocol objects. Fixtures draw from a seeded ChaCha20 stream so a run can
//! be reproduced with `--seed`.

#![forbid(unsafe_code)]

pub mod address_text;
pub mod cli;
pub mod fixtures;
pub mod print;

use std::path::Path;

use anyhow::{Context, Result};
use nova_codec::{Api, ProtocolParameters};

/// Parameters from a JSON file, or the TestJungle defaults.
pub fn load_api(path: Option<&Path>) -> Result<Api> {
    let Some(path) = path else {
        return Ok(Api::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let params: ProtocolParameters = Api::default()
        .json_decode_validated(&text)
        .with_context(|| format!("parsing protocol parameters from {}", path.display()))?;
    Ok(Api::new(params))
}
