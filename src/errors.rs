use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed {ty}: {reason}")]
    MalformedEncoding { ty: &'static str, reason: String },

    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },

    #[error("trailing data: {0} unconsumed bytes")]
    TrailingData(usize),

    #[error("schema violation in {ty}: {reason}")]
    SchemaViolation { ty: &'static str, reason: String },

    #[error("index out of range: {index} not in [0, {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid signature")]
    InvalidSignature,
}

impl CodecError {
    pub fn malformed(ty: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedEncoding { ty, reason: reason.into() }
    }

    pub fn schema(ty: &'static str, reason: impl Into<String>) -> Self {
        Self::SchemaViolation { ty, reason: reason.into() }
    }

    pub(crate) fn unknown_kind(ty: &'static str, kind: u8) -> Self {
        Self::malformed(ty, format!("unknown type {kind}"))
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match e.classify() {
            Category::Data => Self::schema("json", e.to_string()),
            Category::Syntax | Category::Eof | Category::Io => Self::malformed("json", e.to_string()),
        }
    }
}
