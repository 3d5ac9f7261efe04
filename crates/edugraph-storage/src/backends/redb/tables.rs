//! Physical table layout for the redb backend.

use redb::TableDefinition;

/// The single physical table holding every logical table.
pub const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> =
    TableDefinition::new("edugraph_data");

/// Separator between the logical table name and the user key.
pub const KEY_SEPARATOR: u8 = 0x00;

/// Encode a logical key as `[table name][0x00][key]`.
#[must_use]
pub fn encode_key(table: &str, key: &[u8]) -> Vec<u8> {
    let mut encoded = table_start_key(table);
    encoded.reserve(key.len());
    encoded.extend_from_slice(key);
    encoded
}

/// Split a physical key into its logical table name and user key.
#[must_use]
pub fn decode_key(encoded: &[u8]) -> Option<(&str, &[u8])> {
    let sep_pos = encoded.iter().position(|&b| b == KEY_SEPARATOR)?;
    let table = std::str::from_utf8(&encoded[..sep_pos]).ok()?;
    Some((table, &encoded[sep_pos + 1..]))
}

/// The smallest physical key of a logical table.
#[must_use]
pub fn table_start_key(table: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(table.len() + 1);
    key.extend_from_slice(table.as_bytes());
    key.push(KEY_SEPARATOR);
    key
}

/// The exclusive upper bound of a logical table's physical keys.
#[must_use]
pub fn table_end_key(table: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(table.len() + 1);
    key.extend_from_slice(table.as_bytes());
    key.push(KEY_SEPARATOR + 1);
    key
}
