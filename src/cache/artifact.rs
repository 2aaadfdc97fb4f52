//! Binary framing of a cached relation graph
//!
//! ```text
//! +------------------+
//! | Magic "LXRG"     | (4 bytes)
//! +------------------+
//! | Format Version   | (u16 LE)
//! +------------------+
//! | Body Length      | (u32 LE)
//! +------------------+
//! | Body             | (JSON-encoded RelationGraph)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32 of all preceding bytes)
//! +------------------+
//! ```
//!
//! A decoded artifact is structurally equal to the graph that was encoded.

use crc32fast::Hasher;

use crate::errors::{LexiconError, LexiconResult};

use super::graph::RelationGraph;

pub const ARTIFACT_MAGIC: &[u8; 4] = b"LXRG";
pub const ARTIFACT_FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = 4 + 2 + 4;
const CHECKSUM_LEN: usize = 4;

fn checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Encode a graph into artifact bytes.
pub fn encode(graph: &RelationGraph) -> LexiconResult<Vec<u8>> {
    let body = serde_json::to_vec(graph)
        .map_err(|e| LexiconError::Corruption(format!("cannot encode relation graph: {}", e)))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len() + CHECKSUM_LEN);
    bytes.extend_from_slice(ARTIFACT_MAGIC);
    bytes.extend_from_slice(&ARTIFACT_FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&body);

    let crc = checksum(&bytes);
    bytes.extend_from_slice(&crc.to_le_bytes());
    Ok(bytes)
}

/// Decode and verify artifact bytes.
///
/// # Errors
///
/// Returns `Corruption` on a bad magic, unknown format version, length
/// mismatch, checksum mismatch or undecodable body.
pub fn decode(bytes: &[u8]) -> LexiconResult<RelationGraph> {
    if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(LexiconError::Corruption("graph artifact truncated".to_string()));
    }
    if &bytes[0..4] != ARTIFACT_MAGIC {
        return Err(LexiconError::Corruption("graph artifact has bad magic".to_string()));
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if format_version != ARTIFACT_FORMAT_VERSION {
        return Err(LexiconError::Corruption(format!(
            "unsupported graph artifact format {}",
            format_version
        )));
    }

    let body_len = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    if bytes.len() != HEADER_LEN + body_len + CHECKSUM_LEN {
        return Err(LexiconError::Corruption(format!(
            "graph artifact length mismatch: header says {} body bytes, file has {}",
            body_len,
            bytes.len().saturating_sub(HEADER_LEN + CHECKSUM_LEN)
        )));
    }

    let (framed, stored) = bytes.split_at(HEADER_LEN + body_len);
    let stored = u32::from_le_bytes([stored[0], stored[1], stored[2], stored[3]]);
    let computed = checksum(framed);
    if stored != computed {
        return Err(LexiconError::Corruption(format!(
            "graph artifact checksum mismatch: stored {:08x}, computed {:08x}",
            stored, computed
        )));
    }

    serde_json::from_slice(&framed[HEADER_LEN..])
        .map_err(|e| LexiconError::Corruption(format!("graph artifact body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionId;

    fn sample() -> RelationGraph {
        let mut graph = RelationGraph::new(VersionId::parse("2020-01-01_00:00:00").unwrap());
        graph.relate("A", "contains", "B");
        graph.relate("A", "father", "C");
        graph
    }

    #[test]
    fn test_decode_restores_graph() {
        let graph = sample();
        let bytes = encode(&graph).unwrap();
        assert_eq!(&bytes[0..4], ARTIFACT_MAGIC);
        assert_eq!(decode(&bytes).unwrap(), graph);
    }

    #[test]
    fn test_flipped_byte_detected() {
        let mut bytes = encode(&sample()).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.code(), "LEX_CORRUPTION");
    }

    #[test]
    fn test_truncation_detected() {
        let bytes = encode(&sample()).unwrap();
        assert!(decode(&bytes[..bytes.len() - 1]).is_err());
        assert!(decode(&bytes[..3]).is_err());
    }

    #[test]
    fn test_unknown_format_version() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[4] = 9;
        let err = decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }
}
