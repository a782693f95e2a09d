use serde::{Deserialize, Serialize};

/// One row of the vendor-specific ATA SMART attribute table. Immutable;
/// the whole table is replaced on every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute id, unique per device and stable across refreshes.
    pub id: u8,
    pub name: String,
    /// Attribute flag bitmask as reported (hex column).
    pub flags: u16,
    /// Current normalized value.
    pub value: u8,
    /// Worst normalized value ever recorded.
    pub worst: u8,
    /// Failure threshold for the normalized value.
    pub thresh: u8,
    /// True for "Pre-fail" attributes, false for "Old_age".
    pub prefail: bool,
    /// Update policy column: "Always" or "Offline".
    pub updated: String,
    /// Failure status column: "-" when the attribute never failed,
    /// otherwise "FAILING_NOW", "In_the_past", or a vendor string.
    pub when_failed: String,
    /// Raw value column, verbatim.
    pub raw: String,
}

impl Attribute {
    /// Parse one attribute-table row. Rows are recognized by the hex flag
    /// token plus an underscore-bearing name; anything malformed yields
    /// `None` and is skipped by the caller.
    pub fn parse_row(line: &str) -> Option<Attribute> {
        if !(line.contains("0x0") && line.contains('_')) {
            return None;
        }
        let t: Vec<&str> = line.split_whitespace().collect();
        if t.len() < 10 {
            return None;
        }
        Some(Attribute {
            id: t[0].parse().ok()?,
            name: t[1].to_string(),
            flags: u16::from_str_radix(t[2].trim_start_matches("0x"), 16).ok()?,
            value: t[3].parse().ok()?,
            worst: t[4].parse().ok()?,
            thresh: t[5].parse().ok()?,
            prefail: t[6] == "Pre-fail",
            updated: t[7].to_string(),
            when_failed: t[8].to_string(),
            raw: t[9..].join(" "),
        })
    }

    /// Leading integer of the raw column ("33 (Min/Max 18/42)" -> 33).
    /// Vendor raw encodings without a leading number yield `None`.
    pub fn raw_value(&self) -> Option<u64> {
        let digits: String = self.raw.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }
}
