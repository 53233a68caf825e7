//! Identity tokens for cells.

use compact_str::CompactString;

use super::{Cell, Payload};

/// Token for a null cell.
pub const NULL_UID: &str = "cnull";
/// Token for a `true` boolean cell.
pub const TRUE_UID: &str = "ctrue";
/// Token for a `false` boolean cell.
pub const FALSE_UID: &str = "cfalse";

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Base-36 rendering of a 64-bit pattern.
fn base36(mut bits: u64) -> CompactString {
    if bits == 0 {
        return CompactString::const_new("0");
    }
    // u64::MAX needs 13 base-36 digits
    let mut buf = [0u8; 13];
    let mut at = buf.len();
    while bits > 0 {
        at -= 1;
        buf[at] = DIGITS[(bits % 36) as usize];
        bits /= 36;
    }
    buf[at..].iter().map(|&b| b as char).collect()
}

impl Cell {
    /// Identity token for this value.
    ///
    /// Equal logical values share a token regardless of the width they were
    /// scanned at; timestamps are reduced to epoch seconds.
    pub fn uid(&self) -> CompactString {
        match &self.payload {
            Payload::Null => CompactString::const_new(NULL_UID),
            Payload::Bool(true) => CompactString::const_new(TRUE_UID),
            Payload::Bool(false) => CompactString::const_new(FALSE_UID),
            Payload::Text(s) => s.clone(),
            Payload::Int(i) => base36(*i as u64),
            Payload::Float(f) => base36(f.to_bits()),
            Payload::Time(t) => base36(t.timestamp() as u64),
        }
    }
}
