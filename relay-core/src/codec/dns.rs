//! The DNS disguise: frame arbitrary bytes as a synthetic DNS query packet and
//! recover them, per spec.md §4.3 and §6.

use bytes::{BufMut, Bytes, BytesMut};
use rand::Rng;

/// Payload bytes carried per synthetic question record.
pub const MAX_RECORD_LENGTH: usize = 60;

/// Default record type (`A`) and class (`IN`); the disassembler ignores both.
const QTYPE_A: u16 = 1;
const QCLASS_IN: u16 = 1;

const HEADER_LEN: usize = 12;

/// TLD labels appended to each synthetic question so the wire form resembles
/// a plausible lookup. Discarded on disassembly.
pub const DOMAIN_LIST: &[&str] = &[
    "com", "org", "net", "edu", "gov", "us", "uk", "ca", "de", "fr", "au", "jp", "in",
];

fn random_tld() -> &'static str {
    let idx = rand::thread_rng().gen_range(0..DOMAIN_LIST.len());
    DOMAIN_LIST[idx]
}

/// Build a synthetic DNS query wire buffer carrying `payload`.
///
/// `payload` is split into chunks of at most [`MAX_RECORD_LENGTH`] bytes,
/// each becoming one question record. An empty payload produces a bare
/// 12-byte header with `qdcount = 0`.
pub fn assemble(payload: &[u8]) -> Bytes {
    let chunks: Vec<&[u8]> = if payload.is_empty() {
        Vec::new()
    } else {
        payload.chunks(MAX_RECORD_LENGTH).collect()
    };

    let mut out = BytesMut::with_capacity(HEADER_LEN + payload.len() + chunks.len() * 16);

    let transaction_id: u16 = rand::thread_rng().gen_range(1..=65535);
    out.put_u16(transaction_id);
    out.put_u16(0x0000); // flags: query, opcode 0, all bits zero
    out.put_u16(chunks.len() as u16); // qdcount
    out.put_u16(0); // ancount
    out.put_u16(0); // nscount
    out.put_u16(0); // arcount

    for chunk in chunks {
        let tld = random_tld();

        out.put_u8(chunk.len() as u8);
        out.put_slice(chunk);
        out.put_u8(tld.len() as u8);
        out.put_slice(tld.as_bytes());
        out.put_u8(0x00); // QNAME terminator

        out.put_u16(QTYPE_A);
        out.put_u16(QCLASS_IN);
    }

    out.freeze()
}

/// Recover the payload from a DNS wire buffer produced by [`assemble`].
///
/// Tolerates malformed input by returning `None` instead of panicking; see
/// spec.md §4.3 and the end-to-end "malformed wire" scenario in spec.md §8.
pub fn disassemble(wire: &[u8]) -> Option<Bytes> {
    if wire.len() < HEADER_LEN {
        return None;
    }

    let mut payload = BytesMut::new();
    let mut cursor = HEADER_LEN;

    while cursor < wire.len() {
        let mut labels: Vec<&[u8]> = Vec::new();

        loop {
            let len = *wire.get(cursor)? as usize;
            cursor += 1;

            if len == 0 {
                break;
            }

            let label = wire.get(cursor..cursor + len)?;
            cursor += len;
            labels.push(label);
        }

        // Last label is the synthetic TLD; everything before it is payload.
        if let Some((_tld, data_labels)) = labels.split_last() {
            for label in data_labels {
                payload.put_slice(label);
            }
        }

        // Skip qtype + qclass.
        if cursor + 4 > wire.len() {
            return None;
        }
        cursor += 4;
    }

    Some(payload.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_round_trips() {
        let wire = assemble(b"");
        assert_eq!(wire.len(), HEADER_LEN);
        assert_eq!(wire[4], 0);
        assert_eq!(wire[5], 0); // qdcount = 0
        assert_eq!(disassemble(&wire).unwrap(), Bytes::from_static(b""));
    }

    #[test]
    fn boundary_chunk_of_exactly_max_record_length_is_one_question() {
        let payload = vec![b'A'; MAX_RECORD_LENGTH];
        let wire = assemble(&payload);

        let qdcount = u16::from_be_bytes([wire[4], wire[5]]);
        assert_eq!(qdcount, 1);
        assert_eq!(disassemble(&wire).unwrap(), Bytes::from(payload));
    }

    #[test]
    fn multi_chunk_payload_recovers_all_bytes() {
        let payload = vec![b'X'; 181];
        let wire = assemble(&payload);

        let qdcount = u16::from_be_bytes([wire[4], wire[5]]);
        assert_eq!(qdcount, 4); // 60 + 60 + 60 + 1

        assert_eq!(disassemble(&wire).unwrap(), Bytes::from(payload));
    }

    #[test]
    fn malformed_wire_returns_none_without_panicking() {
        assert_eq!(disassemble(&[0u8; 4]), None);
    }

    #[test]
    fn transaction_id_is_never_zero() {
        for _ in 0..1000 {
            let wire = assemble(b"hello");
            let id = u16::from_be_bytes([wire[0], wire[1]]);
            assert_ne!(id, 0);
        }
    }

    #[test]
    fn round_trip_for_arbitrary_lengths() {
        for len in [0, 1, 59, 60, 61, 120, 121, 9000 - HEADER_LEN] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let wire = assemble(&payload);
            assert_eq!(disassemble(&wire).unwrap(), Bytes::from(payload));
        }
    }
}
