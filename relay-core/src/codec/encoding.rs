//! Payload encoding applied before DNS assembly and after DNS disassembly
//! (spec.md §4.3, SPEC_FULL.md §4.3).

use base64::Engine as _;
use bytes::Bytes;
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, CONTROLS};

use super::base85;
use crate::config::Encoding;

/// Bytes that must be percent-encoded in the base85 wire form so the result
/// stays within the ASCII range DNS labels can carry. `base85` only ever
/// emits printable ASCII, but a handful of those characters (`%`, space,
/// and the label delimiters) still need escaping.
const BASE85_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'%')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`');

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid base85 payload: {0}")]
    Base85(#[from] base85::Error),
    #[error("percent-decoded base85 payload is not valid UTF-8")]
    NotUtf8,
}

/// Encode a raw frame prior to DNS assembly.
pub fn encode(encoding: Encoding, data: &[u8]) -> Bytes {
    match encoding {
        Encoding::None => Bytes::copy_from_slice(data),
        Encoding::Base64 => Bytes::from(
            base64::engine::general_purpose::URL_SAFE_NO_PAD
                .encode(data)
                .into_bytes(),
        ),
        Encoding::Base85 => {
            let encoded = base85::encode(data);
            let percent_encoded = percent_encode(encoded.as_bytes(), BASE85_ESCAPE).to_string();
            Bytes::from(percent_encoded.into_bytes())
        }
    }
}

/// Decode a frame recovered from DNS disassembly. Errors are per-frame
/// (spec.md §7): the caller logs at ERROR and drops the frame.
pub fn decode(encoding: Encoding, data: &[u8]) -> Result<Bytes, DecodeError> {
    match encoding {
        Encoding::None => Ok(Bytes::copy_from_slice(data)),
        Encoding::Base64 => {
            let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(data)?;
            Ok(Bytes::from(decoded))
        }
        Encoding::Base85 => {
            let percent_decoded = percent_decode_str(
                std::str::from_utf8(data).map_err(|_| DecodeError::NotUtf8)?,
            )
            .decode_utf8()
            .map_err(|_| DecodeError::NotUtf8)?;

            let decoded = base85::decode(&percent_decoded)?;
            Ok(Bytes::from(decoded))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_round_trips() {
        let data = b"hello world";
        let encoded = encode(Encoding::None, data);
        assert_eq!(decode(Encoding::None, &encoded).unwrap(), Bytes::from_static(data));
    }

    #[test]
    fn base64_round_trips() {
        let data = b"\x00\x01\xff hello";
        let encoded = encode(Encoding::Base64, data);
        assert_eq!(decode(Encoding::Base64, &encoded).unwrap(), Bytes::from_static(data));
    }

    #[test]
    fn base85_round_trips() {
        let data = b"\x00\x01\xff some binary blob \xfe\xfd";
        let encoded = encode(Encoding::Base85, data);
        assert_eq!(decode(Encoding::Base85, &encoded).unwrap(), Bytes::from_static(data));
    }

    #[test]
    fn base64_decode_rejects_garbage() {
        assert!(decode(Encoding::Base64, b"not valid base64!!").is_err());
    }
}
