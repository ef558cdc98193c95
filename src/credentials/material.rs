// src/credentials/material.rs
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use log::debug;
use std::fs;

use crate::error::{KubeConfigError, Result};

/// Standard alphabet, padding optional, trailing bits ignored.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Loads credential bytes from a file path or an inline base64 payload.
///
/// The file wins when both are set. Neither set is not an error: clusters
/// without a CA override and users without client certificates are valid.
pub fn material_for(
    field: &'static str,
    file: Option<&str>,
    data: Option<&str>,
) -> Result<Option<Vec<u8>>> {
    if let Some(file) = file.filter(|f| !f.is_empty()) {
        let path = shellexpand::tilde(file).to_string();
        debug!("Reading {} from {}", field, path);
        return fs::read(&path)
            .map(Some)
            .map_err(|e| KubeConfigError::io(path, e));
    }

    if let Some(data) = data.filter(|d| !d.is_empty()) {
        debug!("Decoding inline {}", field);
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        return LENIENT
            .decode(compact)
            .map(Some)
            .map_err(|source| KubeConfigError::InvalidMaterial { field, source });
    }

    Ok(None)
}
