//! Data URI and form encoding of mask images
//!
//! The process endpoint takes the mask as a single form field whose value is
//! a percent-encoded `data:image/png;base64,...` URI. Every byte outside the
//! unreserved set (`A-Z a-z 0-9 - . _ ~`) is escaped, including `/`, `+` and
//! `=` from the base64 alphabet, so the field value is unambiguous.

use crate::error::{InpaintError, Result};
use base64::{engine::general_purpose, Engine};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Media type declared in the mask data URI
pub const MASK_MEDIA_TYPE: &str = "image/png";

/// Form field carrying the mask
pub const MASK_FIELD: &str = "mask";

/// Everything but RFC 3986 unreserved characters
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Build a base64 data URI for `bytes`
#[must_use]
pub fn to_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        media_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Split a base64 data URI into its media type and decoded bytes
///
/// # Errors
/// - Missing `data:` prefix or `;base64,` marker
/// - Payload is not valid base64
pub fn from_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| InpaintError::encoding("data URI must start with 'data:'"))?;
    let (media_type, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| InpaintError::encoding("data URI is not base64 encoded"))?;

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| InpaintError::encoding(format!("invalid base64 payload: {}", e)))?;
    Ok((media_type.to_string(), bytes))
}

/// Percent-encode a form component with no characters treated as safe
#[must_use]
pub fn percent_encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Form body for the process endpoint: `mask=<percent-encoded data URI>`
#[must_use]
pub fn mask_form_body(mask_png: &[u8]) -> String {
    let uri = to_data_uri(MASK_MEDIA_TYPE, mask_png);
    format!("{}={}", MASK_FIELD, percent_encode_component(&uri))
}

/// Recover the mask bytes from a process form body
///
/// # Errors
/// - No `mask` field
/// - Field value is not percent-encoded UTF-8 or not a base64 data URI
pub fn decode_mask_form_body(body: &str) -> Result<Vec<u8>> {
    let encoded = body
        .split('&')
        .find_map(|pair| {
            pair.split_once('=')
                .filter(|(name, _)| *name == MASK_FIELD)
                .map(|(_, value)| value)
        })
        .ok_or_else(|| InpaintError::encoding("form body has no 'mask' field"))?;

    let uri = percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|e| InpaintError::encoding(format!("mask field is not UTF-8: {}", e)))?;

    let (_, bytes) = from_data_uri(&uri)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_prefix() {
        assert_eq!(to_data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_component_escapes_reserved_characters() {
        assert_eq!(
            percent_encode_component("data:image/png;base64,a+b/c=="),
            "data%3Aimage%2Fpng%3Bbase64%2Ca%2Bb%2Fc%3D%3D"
        );
        assert_eq!(percent_encode_component("A-z_0.9~"), "A-z_0.9~");
        assert_eq!(percent_encode_component("a b&c"), "a%20b%26c");
    }

    #[test]
    fn test_form_body_escapes_base64_alphabet() {
        // 0xfb 0xff encodes to "+/8=" in standard base64
        let body = mask_form_body(&[0xfb, 0xff]);
        assert_eq!(body, "mask=data%3Aimage%2Fpng%3Bbase64%2C%2B%2F8%3D");

        let value = body.strip_prefix("mask=").unwrap();
        assert!(!value.contains('/'));
        assert!(!value.contains('+'));
        assert!(!value.contains('='));
        assert!(!value.contains('&'));
    }

    #[test]
    fn test_form_body_reproduces_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let body = mask_form_body(&bytes);
        assert_eq!(decode_mask_form_body(&body).unwrap(), bytes);
    }

    #[test]
    fn test_decoding_errors() {
        assert!(decode_mask_form_body("other=1").is_err());
        assert!(decode_mask_form_body("mask=plain-text").is_err());
        assert!(from_data_uri("data:image/png,raw").is_err());
        assert!(from_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_from_data_uri_media_type() {
        let (media, bytes) = from_data_uri("data:image/png;base64,YWJj").unwrap();
        assert_eq!(media, "image/png");
        assert_eq!(bytes, b"abc");
    }
}
