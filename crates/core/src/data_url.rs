//! `data:` URLs carrying image payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use folio_engine::ImageFormat;

#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a base64 data URL")]
    Malformed,
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Split a `data:<mime>;base64,<payload>` URL into format and raw bytes.
///
/// The format comes from the header tag only: `image/png` is PNG,
/// `image/jpeg` and `image/jpg` are JPEG.
pub fn decode_image_data_url(url: &str) -> Result<ImagePayload, DataUrlError> {
    let (header, payload) = url
        .trim()
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(DataUrlError::Malformed)?;

    let format = image_format_from_header(header)
        .ok_or_else(|| DataUrlError::UnsupportedType(header.to_owned()))?;
    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned)?;

    Ok(ImagePayload { format, bytes })
}

fn image_format_from_header(header: &str) -> Option<ImageFormat> {
    let header = header.to_ascii_lowercase();
    if header.contains("image/png") {
        Some(ImageFormat::Png)
    } else if header.contains("image/jpeg") || header.contains("image/jpg") {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

/// Wrap raw image bytes, sniffing PNG or JPEG from their content.
pub fn encode_image_data_url(bytes: &[u8]) -> Result<String, DataUrlError> {
    let mime = match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => "image/png",
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(other) => return Err(DataUrlError::UnsupportedType(format!("{other:?}"))),
        Err(_) => return Err(DataUrlError::UnsupportedType("unknown".to_owned())),
    };
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}
