use crate::parse::lines::LineCursor;
use serde::{Deserialize, Serialize};

/// The NVMe SMART/Health Information log (NVMe Log 0x02), an unordered
/// key:value block bounded by a blank line, plus the parsed rows of the
/// Error Information log (NVMe Log 0x01).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NvmeAttributes {
    pub critical_warning: Option<u8>,
    /// Always stored in Celsius; Fahrenheit readings are converted.
    pub temperature: Option<i32>,
    pub available_spare: Option<u8>,
    pub available_spare_threshold: Option<u8>,
    pub percentage_used: Option<u8>,
    /// Data units of 512,000 bytes each; see `bytes_read`.
    pub data_units_read: Option<u64>,
    pub data_units_written: Option<u64>,
    pub host_read_commands: Option<u64>,
    pub host_write_commands: Option<u64>,
    /// Minutes the controller spent busy with I/O.
    pub controller_busy_time: Option<u64>,
    pub power_cycles: Option<u64>,
    pub power_on_hours: Option<u64>,
    pub unsafe_shutdowns: Option<u64>,
    pub integrity_errors: Option<u64>,
    pub error_entries: Option<u64>,
    /// Minutes spent at or above the warning temperature.
    pub warning_temperature_time: Option<u64>,
    pub critical_temperature_time: Option<u64>,

    pub errors: Vec<NvmeError>,
}

/// One row of the NVMe Error Information log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NvmeError {
    pub num: u32,
    pub err_count: u64,
    pub sq_id: u32,
    pub cmd_id: u32,
    pub status: u32,
    pub pe_loc: u32,
    pub lba: Option<u64>,
    pub nsid: Option<u32>,
    pub vs: Option<u32>,
}

impl NvmeAttributes {
    /// One data unit is 1000 sectors of 512 bytes.
    pub fn bytes_read(&self) -> Option<u64> {
        self.data_units_read.map(|u| u * 512 * 1000)
    }

    pub fn bytes_written(&self) -> Option<u64> {
        self.data_units_written.map(|u| u * 512 * 1000)
    }

    /// Consume the NVMe log sections from a normalized dump. Lines outside
    /// the recognized sections are passed over, so this can run ahead of
    /// the generic scan on the same cursor.
    pub fn parse(cursor: &mut LineCursor) -> NvmeAttributes {
        let mut out = NvmeAttributes::default();
        while let Some(line) = cursor.next() {
            if line.starts_with("SMART/Health Information (NVMe Log 0x02)") {
                out.parse_health_block(cursor);
            } else if line.starts_with("Error Information (NVMe Log 0x01,") {
                let header_ok = cursor
                    .peek()
                    .map(is_error_table_header)
                    .unwrap_or(false);
                if header_ok {
                    cursor.next();
                    out.parse_error_table(cursor);
                }
            }
        }
        out
    }

    fn parse_health_block(&mut self, cursor: &mut LineCursor) {
        while let Some(line) = cursor.next() {
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            let (key, value) = match line.split_once(':') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => continue,
            };
            match key {
                "Critical Warning" => {
                    self.critical_warning =
                        u8::from_str_radix(value.trim_start_matches("0x"), 16).ok()
                }
                "Temperature" => self.temperature = parse_temperature(value),
                "Available Spare" => self.available_spare = parse_percent(value),
                "Available Spare Threshold" => self.available_spare_threshold = parse_percent(value),
                "Percentage Used" => self.percentage_used = parse_percent(value),
                "Data Units Read" => self.data_units_read = parse_count(value),
                "Data Units Written" => self.data_units_written = parse_count(value),
                "Host Read Commands" => self.host_read_commands = parse_count(value),
                "Host Write Commands" => self.host_write_commands = parse_count(value),
                "Controller Busy Time" => self.controller_busy_time = parse_count(value),
                "Power Cycles" => self.power_cycles = parse_count(value),
                "Power On Hours" => self.power_on_hours = parse_count(value),
                "Unsafe Shutdowns" => self.unsafe_shutdowns = parse_count(value),
                "Media and Data Integrity Errors" => self.integrity_errors = parse_count(value),
                "Error Information Log Entries" => self.error_entries = parse_count(value),
                "Warning Comp. Temperature Time" => {
                    self.warning_temperature_time = parse_count(value)
                }
                "Critical Comp. Temperature Time" => {
                    self.critical_temperature_time = parse_count(value)
                }
                _ => {}
            }
        }
    }

    fn parse_error_table(&mut self, cursor: &mut LineCursor) {
        while let Some(line) = cursor.next() {
            if line.trim().is_empty() {
                break;
            }
            if let Some(err) = NvmeError::parse_row(line) {
                self.errors.push(err);
            }
        }
    }
}

impl NvmeError {
    /// Row shape: `Num  ErrCount  SQId  CmdId  Status  PELoc  LBA  NSID  VS`
    /// with CmdId/Status/PELoc in hex and `-` for undefined fields.
    fn parse_row(line: &str) -> Option<NvmeError> {
        let t: Vec<&str> = line.split_whitespace().collect();
        if t.len() != 9 {
            return None;
        }
        Some(NvmeError {
            num: t[0].parse().ok()?,
            err_count: t[1].parse().ok()?,
            sq_id: t[2].parse().ok()?,
            cmd_id: parse_hex(t[3])?,
            status: parse_hex(t[4])?,
            pe_loc: parse_hex(t[5])?,
            lba: dash_or(t[6], |s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok())?,
            nsid: dash_or(t[7], |s| s.parse().ok())?,
            vs: dash_or(t[8], |s| parse_hex(s))?,
        })
    }
}

fn is_error_table_header(line: &str) -> bool {
    let t: Vec<&str> = line.split_whitespace().collect();
    t == ["Num", "ErrCount", "SQId", "CmdId", "Status", "PELoc", "LBA", "NSID", "VS"]
}

fn parse_hex(s: &str) -> Option<u32> {
    u32::from_str_radix(s.trim_start_matches("0x"), 16).ok()
}

/// `-` means the field is undefined, which is fine; an unparsable value
/// means the row is malformed, which rejects the whole row.
fn dash_or<T>(s: &str, f: impl Fn(&str) -> Option<T>) -> Option<Option<T>> {
    if s == "-" {
        Some(None)
    } else {
        f(s).map(Some)
    }
}

/// "40 Celsius" or "104 Fahrenheit", converted to Celsius.
fn parse_temperature(value: &str) -> Option<i32> {
    let t: i32 = value.split_whitespace().next()?.parse().ok()?;
    if value.contains("Fahrenheit") {
        Some((t - 32) * 5 / 9)
    } else {
        Some(t)
    }
}

/// "26%" -> 26
fn parse_percent(value: &str) -> Option<u8> {
    value.trim_end_matches('%').trim().parse().ok()
}

/// Locale-punctuated counter, optionally followed by a bracketed size:
/// "1,234,567 [632 GB]" -> 1234567. Periods are thousands separators in
/// some locales and are stripped the same way.
fn parse_count(value: &str) -> Option<u64> {
    let first = value.split_whitespace().next()?;
    first.replace(',', "").replace('.', "").parse().ok()
}
