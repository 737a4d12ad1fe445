//! A minimal Ascii85 (btoa-style) codec.
//!
//! No crate in the reference corpus pulls in a base85 implementation, and
//! the transform is small enough to own directly rather than guess at a
//! third-party API (see DESIGN.md). `percent_encoding`'s well-known API is
//! still used for the URL-safety wrapping step around this.

const ALPHABET_OFFSET: u8 = b'!'; // base85 digits map onto '!'..='u'

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("byte {0:#04x} is outside the ascii85 alphabet")]
    OutOfRange(u8),
    #[error("truncated ascii85 group")]
    Truncated,
}

/// Encode `data` as a run of Ascii85 groups (no `<~ ~>` framing).
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 5 / 4 + 5);

    for chunk in data.chunks(4) {
        let mut buf = [0u8; 4];
        buf[..chunk.len()].copy_from_slice(chunk);
        let value = u32::from_be_bytes(buf);

        let mut digits = [0u8; 5];
        let mut v = value;
        for digit in digits.iter_mut().rev() {
            *digit = (v % 85) as u8;
            v /= 85;
        }

        let keep = chunk.len() + 1;
        for digit in &digits[..keep] {
            out.push((digit + ALPHABET_OFFSET) as char);
        }
    }

    out
}

/// Decode a run of Ascii85 groups produced by [`encode`].
pub fn decode(text: &str) -> Result<Vec<u8>, Error> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 4 / 5 + 4);

    for group in bytes.chunks(5) {
        if group.len() < 2 {
            return Err(Error::Truncated);
        }

        let mut digits = [84u8; 5];
        for (i, &b) in group.iter().enumerate() {
            if !(b'!'..=b'u').contains(&b) {
                return Err(Error::OutOfRange(b));
            }
            digits[i] = b - ALPHABET_OFFSET;
        }

        let mut value: u32 = 0;
        for digit in digits {
            value = value
                .checked_mul(85)
                .and_then(|v| v.checked_add(digit as u32))
                .ok_or(Error::Truncated)?;
        }

        let bytes_out = value.to_be_bytes();
        out.extend_from_slice(&bytes_out[..group.len() - 1]);
    }

    Ok(out)
}
