//! Markdown rendering of test vectors.

use nova_codec::{Api, CodecError, Packable};
use serde::Serialize;

/// Accumulates the Markdown written to stdout.
#[derive(Debug, Default)]
pub struct Report {
    out: String,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `<name> (json-encoded):` followed by a fenced JSON block.
    pub fn json<T: Serialize>(&mut self, api: &Api, name: &str, value: &T) -> Result<(), CodecError> {
        let text = api.json_encode(value)?;
        self.out.push_str(&format!("{name} (json-encoded):\n\n```json\n{text}\n```\n\n"));
        Ok(())
    }

    /// `<name> (binary-encoded):` followed by the `0x`-hex bytes.
    pub fn binary<T: Packable>(&mut self, api: &Api, name: &str, value: &T) -> Result<(), CodecError> {
        let bytes = api.encode(value)?;
        self.out.push_str(&format!("{name} (binary-encoded):\n\n```\n0x{}\n```\n\n", hex::encode(bytes)));
        Ok(())
    }

    pub fn id(&mut self, name: &str, id: &str) {
        self.out.push_str(&format!("{name} ID:\n\n```\n{id}\n```\n\n"));
    }

    /// JSON, binary and identifier of one object.
    pub fn vector<T: Serialize + Packable>(
        &mut self,
        api: &Api,
        name: &str,
        value: &T,
        id: &str,
    ) -> Result<(), CodecError> {
        self.json(api, name, value)?;
        self.binary(api, name, value)?;
        self.id(name, id);
        Ok(())
    }

    pub fn heading(&mut self, title: &str) {
        self.out.push_str(&format!("============================ {title} ==============================\n\n"));
    }

    pub fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }
}
