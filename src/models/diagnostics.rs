use serde::{Deserialize, Serialize};

/// Counters scraped from the free-text portion of a SCSI/SAS dump (plus
/// the generic power-on/life fields some SATA drives report there).
///
/// Every field is optional: absence means the drive does not report the
/// counter, which is not the same as zero. Percent-left and byte figures
/// are derived on read, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Elements in the grown defect list.
    pub reallocated_sector_ct: Option<u64>,

    /// Specified lifetime start-stop cycle count.
    pub start_stop_spec: Option<u64>,
    /// Accumulated start-stop cycles so far.
    pub start_stop_cycles: Option<u64>,

    /// Specified lifetime load-unload cycle count.
    pub load_cycle_spec: Option<u64>,
    /// Accumulated load-unload cycles so far.
    pub load_cycle_count: Option<u64>,

    pub power_on_hours: Option<u64>,
    /// Percent of rated endurance left (100 - used endurance indicator).
    pub life_left: Option<u8>,

    pub corrected_reads: Option<u64>,
    pub corrected_writes: Option<u64>,
    pub corrected_verifies: Option<u64>,
    pub uncorrected_reads: Option<u64>,
    pub uncorrected_writes: Option<u64>,
    pub uncorrected_verifies: Option<u64>,

    /// Gigabytes processed, as printed in the error counter log.
    pub reads_gb: Option<f64>,
    pub writes_gb: Option<f64>,
    pub verifies_gb: Option<f64>,

    /// Errors not caused by the disk itself.
    pub non_medium_errors: Option<u64>,
}

impl Diagnostics {
    pub fn start_stop_pct_left(&self) -> Option<i32> {
        pct_left(self.start_stop_cycles, self.start_stop_spec)
    }

    pub fn load_cycle_pct_left(&self) -> Option<i32> {
        pct_left(self.load_cycle_count, self.load_cycle_spec)
    }

    pub fn bytes_read(&self) -> Option<u64> {
        self.reads_gb.map(gb_to_bytes)
    }

    pub fn bytes_written(&self) -> Option<u64> {
        self.writes_gb.map(gb_to_bytes)
    }

    pub fn bytes_verified(&self) -> Option<u64> {
        self.verifies_gb.map(gb_to_bytes)
    }
}

fn pct_left(count: Option<u64>, spec: Option<u64>) -> Option<i32> {
    let count = count?;
    let spec = spec?;
    if spec == 0 {
        return None;
    }
    Some(100 - (100.0 * count as f64 / spec as f64).round() as i32)
}

fn gb_to_bytes(gb: f64) -> u64 {
    (gb * 1_000_000_000.0).round() as u64
}

/// Parse one row of the SCSI "Error counter log" table:
///
/// ```text
///            Errors Corrected by           Total   Correction     Gigabytes    Total
///                ECC          rereads/    errors   algorithm      processed    uncorrected
///            fast | delayed   rewrites  corrected  invocations   [10^9 bytes]  errors
/// read:          0        0         0         0          0        33124.521           0
/// ```
///
/// Returns (corrected, gigabytes, uncorrected), or `None` for rows that do
/// not have the expected eight columns.
pub(crate) fn parse_rwv_line(line: &str) -> Option<(u64, f64, u64)> {
    let t: Vec<&str> = line.split_whitespace().collect();
    if t.len() != 8 {
        return None;
    }
    let fast: u64 = t[1].parse().ok()?;
    let delayed: u64 = t[2].parse().ok()?;
    let rewrites: u64 = t[3].parse().ok()?;
    let total: u64 = t[4].parse().ok()?;
    // Some firmware leaves the total column at zero while still counting
    // the per-mechanism columns.
    let corrected = if total != 0 { total } else { fast + delayed + rewrites };
    let gb: f64 = t[6].replace(',', ".").parse().ok()?;
    let uncorrected: u64 = t[7].parse().ok()?;
    Some((corrected, gb, uncorrected))
}
