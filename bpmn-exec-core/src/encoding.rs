//! Binary encoding of task headers.
//!
//! Service tasks hand their custom headers to the runtime as an opaque blob:
//! a u32-LE entry count followed by u32-LE length-prefixed UTF-8 key and
//! value bytes per entry, in declaration order.

/// Encode an ordered key/value list into the header blob.
pub fn encode_headers(entries: &[(String, String)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for (key, value) in entries {
        for field in [key, value] {
            out.extend_from_slice(&(field.len() as u32).to_le_bytes());
            out.extend_from_slice(field.as_bytes());
        }
    }
    out
}

/// Decode a header blob back into its key/value list.
pub fn decode_headers(blob: &[u8]) -> Option<Vec<(String, String)>> {
    let mut cursor = 0usize;
    let count = read_u32(blob, &mut cursor)? as usize;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let key = read_field(blob, &mut cursor)?;
        let value = read_field(blob, &mut cursor)?;
        entries.push((key, value));
    }
    if cursor == blob.len() {
        Some(entries)
    } else {
        None
    }
}

fn read_u32(blob: &[u8], cursor: &mut usize) -> Option<u32> {
    let bytes = blob.get(*cursor..*cursor + 4)?;
    *cursor += 4;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_field(blob: &[u8], cursor: &mut usize) -> Option<String> {
    let len = read_u32(blob, cursor)? as usize;
    let bytes = blob.get(*cursor..*cursor + len)?;
    *cursor += len;
    String::from_utf8(bytes.to_vec()).ok()
}
