use serde::{Deserialize, Serialize};

/// Which self-test log layout an entry was parsed from. The layouts carry
/// different failure detail: ATA logs report percent-remaining, SCSI logs
/// report segment/sense codes, NVMe logs report namespace/status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestFormat {
    Ata,
    Scsi,
    Nvme,
}

/// One entry of a device's SMART self-test log, most-recent-first.
/// ATA logs keep the last 21 entries, SCSI logs the last 20.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEntry {
    pub format: TestFormat,
    /// The entry number printed in the log itself (1 = most recent for
    /// ATA/SCSI). Position in `DeviceState::tests` is authoritative.
    pub num: Option<u8>,
    /// Test description, e.g. "Extended offline" or "Background short".
    pub test_type: String,
    /// Status message, e.g. "Completed without error".
    pub status: String,
    /// Device power-on hours when the test was started. `None` when the
    /// log printed something unparsable; unknown is not zero.
    pub hours: Option<u32>,
    /// First LBA with an error, as printed (decimal for ATA, hex for SCSI).
    pub lba: Option<String>,

    // ATA only
    /// Percent of the test left to perform; 0 means it ran to the end.
    pub remain_pct: Option<u8>,

    // SCSI only
    pub segment: Option<String>,
    pub sense: Option<String>,
    pub asc: Option<String>,
    pub ascq: Option<String>,

    // NVMe only
    pub nsid: Option<String>,
    pub sct: Option<String>,
    pub code: Option<String>,
}

impl TestEntry {
    pub fn new(format: TestFormat, num: Option<u8>, test_type: &str, status: &str) -> Self {
        Self {
            format,
            num,
            test_type: test_type.to_string(),
            status: status.to_string(),
            hours: None,
            lba: None,
            remain_pct: None,
            segment: None,
            sense: None,
            asc: None,
            ascq: None,
            nsid: None,
            sct: None,
            code: None,
        }
    }

    /// Comparison key for freshness detection across refreshes: there is no
    /// stable test-run identifier, so (type, power-on-hours) is the closest
    /// thing to one.
    pub fn identity(&self) -> (String, Option<u32>) {
        (self.test_type.clone(), self.hours)
    }
}
