//! Frame decoding: text payload → base64 bytes → RGB raster.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use image::RgbImage;
use thiserror::Error;

/// Marker that turns a message into a describe command.
pub const DESCRIBE_MARKER: &str = "DESCRIBE:";

const DATA_URI_BASE64: &str = "base64,";

/// Standard alphabet, padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unrecognized image data: {0}")]
    Image(#[from] image::ImageError),
}

/// Payload of a describe command: leading marker removed, whitespace trimmed,
/// data-URI header dropped.
///
/// Only a marker at the very start is stripped, so text that already follows
/// the first marker is never split again.
pub fn describe_payload(message: &str) -> &str {
    let stripped = message.strip_prefix(DESCRIBE_MARKER).unwrap_or(message).trim();
    stripped
        .split_once(DATA_URI_BASE64)
        .map_or(stripped, |(_, data)| data)
}

/// Payload of a tracking frame: everything after the first comma, if any.
pub fn frame_payload(message: &str) -> &str {
    message.split_once(',').map_or(message, |(_, data)| data)
}

/// Base64-decode a payload, ignoring embedded ASCII whitespace.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(LENIENT_BASE64.decode(compact.as_bytes())?)
}

/// Decode raw bytes (JPEG, PNG, ...) into an 8-bit RGB raster.
///
/// Truncated or corrupt streams come back as `DecodeError::Image`.
pub fn decode_raster(bytes: &[u8]) -> Result<RgbImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Full decode of a tracking frame message.
pub fn decode_frame(message: &str) -> Result<RgbImage, DecodeError> {
    let bytes = decode_base64(frame_payload(message))?;
    decode_raster(&bytes)
}
