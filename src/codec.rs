//! Encode/decode configuration messages as JSON or YAML.
//!
//! Decoding goes through the serde wire form of a message and then through
//! [`Message::from_wire`], which resolves every choice on the way. Resolution diagnostics and
//! the validation pass that follows share one [`ValidationContext`], so a [`Decoded`] carries a
//! single report for both.

use crate::config::ValidationOptions;
use crate::validate::{ValidationContext, ValidationReport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// A message of the configuration model with a serde wire form.
pub trait Message: Sized {
    type Wire: Serialize + DeserializeOwned;

    /// Builds the resolved message, reconciling every decoded choice.
    fn from_wire(wire: Self::Wire, ctx: &mut ValidationContext) -> Self;

    fn to_wire(&self) -> Self::Wire;

    /// Appends range, format, required and status diagnostics.
    fn validate(&self, ctx: &mut ValidationContext);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Yaml,
}

impl Encoding {
    /// Encoding implied by a file extension (`.json`, `.yaml`, `.yml`).
    pub fn from_path(path: &Path) -> Result<Self, CodecError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Encoding::Json),
            "yaml" | "yml" => Ok(Encoding::Yaml),
            _ => Err(CodecError::UnknownFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Unknown format: {0}")]
    UnknownFormat(String),
}

/// A decoded message together with the diagnostics of its resolution and validation.
#[derive(Debug, Clone)]
pub struct Decoded<M> {
    pub message: M,
    pub report: ValidationReport,
}

impl<M> Decoded<M> {
    pub fn is_ok(&self) -> bool {
        self.report.is_ok()
    }
}

/// Parses `source` into the wire form and resolves it; no validation pass.
pub fn decode<M: Message>(source: &str, encoding: Encoding, ctx: &mut ValidationContext) -> Result<M, CodecError> {
    let wire: M::Wire = match encoding {
        Encoding::Json => serde_json::from_str(source)?,
        Encoding::Yaml => serde_yaml::from_str(source)?,
    };
    Ok(M::from_wire(wire, ctx))
}

/// Decode, resolve and validate in one pass.
pub fn decode_validated<M: Message>(
    source: &str,
    encoding: Encoding,
    options: ValidationOptions,
) -> Result<Decoded<M>, CodecError> {
    let mut ctx = ValidationContext::new(options);
    let message: M = decode(source, encoding, &mut ctx)?;
    ctx.mark_choices_resolved();
    message.validate(&mut ctx);
    log::debug!(
        "decoded {:?} message: {} error(s), {} warning(s)",
        encoding,
        ctx.errors().len(),
        ctx.warnings().len()
    );
    Ok(Decoded {
        message,
        report: ctx.finish(),
    })
}

pub fn from_json<M: Message>(source: &str, options: ValidationOptions) -> Result<Decoded<M>, CodecError> {
    decode_validated(source, Encoding::Json, options)
}

pub fn from_yaml<M: Message>(source: &str, options: ValidationOptions) -> Result<Decoded<M>, CodecError> {
    decode_validated(source, Encoding::Yaml, options)
}

/// Reads and decodes a file, picking the encoding from its extension.
pub fn load<M: Message>(path: impl AsRef<Path>, options: ValidationOptions) -> Result<Decoded<M>, CodecError> {
    let path = path.as_ref();
    let encoding = Encoding::from_path(path)?;
    let source = std::fs::read_to_string(path)?;
    decode_validated(&source, encoding, options)
}

/// Standalone validation pass over a message built in code.
pub fn validate<M: Message>(message: &M, options: ValidationOptions) -> ValidationReport {
    let mut ctx = ValidationContext::new(options);
    message.validate(&mut ctx);
    ctx.finish()
}

pub fn encode<M: Message>(message: &M, encoding: Encoding) -> Result<String, CodecError> {
    let wire = message.to_wire();
    Ok(match encoding {
        Encoding::Json => serde_json::to_string_pretty(&wire)?,
        Encoding::Yaml => serde_yaml::to_string(&wire)?,
    })
}

pub fn to_json<M: Message>(message: &M) -> Result<String, CodecError> {
    encode(message, Encoding::Json)
}

pub fn to_yaml<M: Message>(message: &M) -> Result<String, CodecError> {
    encode(message, Encoding::Yaml)
}
