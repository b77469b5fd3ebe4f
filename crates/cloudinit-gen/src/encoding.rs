//! Encoding utilities for rendered user-data.
//!
//! Base64 for API submission and deterministic gzip for payloads that exceed
//! the user-data size ceiling.

use crate::error::Result;
use crate::options::{GZIP_FIXED_MTIME, GZIP_LEVEL};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::{Compression, GzBuilder};
use std::io::Write as _;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Compresses data with gzip at maximum compression.
///
/// The header carries [`GZIP_FIXED_MTIME`] instead of the current time and no
/// file name, so identical input always yields identical output.
///
/// # Errors
///
/// Returns an error if the compressor fails to write.
pub fn gzip_deterministic(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .mtime(GZIP_FIXED_MTIME)
        .write(Vec::with_capacity(data.len() / 2), Compression::new(GZIP_LEVEL));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
