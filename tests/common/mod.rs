use anyhow::Result;
use smartpoll::SmartctlInvoker;
use std::collections::HashMap;
use std::sync::Mutex;

/// Canned smartctl. Responses are keyed by the joined argument list and
/// played in the order they were stubbed; the last one for a key replays
/// forever, so a device can be refreshed repeatedly against one dump and
/// later stubs model the device changing state. Unknown queries answer
/// with no output and exit code 1, which reads as a negative probe.
#[derive(Default)]
pub struct MockInvoker {
    responses: Mutex<HashMap<String, (Vec<(Vec<String>, i32)>, usize)>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stub(&self, args: &[&str], lines: Vec<String>, code: i32) {
        self.responses
            .lock()
            .unwrap()
            .entry(args.join(" "))
            .or_default()
            .0
            .push((lines, code));
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.contains(needle)).count()
    }
}

impl SmartctlInvoker for MockInvoker {
    fn invoke(&self, args: &[&str]) -> Result<(Vec<String>, i32)> {
        let key = args.join(" ");
        self.calls.lock().unwrap().push(key.clone());
        let mut map = self.responses.lock().unwrap();
        match map.get_mut(&key) {
            Some((seq, next)) if !seq.is_empty() => {
                let resp = seq[(*next).min(seq.len() - 1)].clone();
                *next += 1;
                Ok(resp)
            }
            _ => Ok((Vec::new(), 1)),
        }
    }
}

/// Wrap a dump body in the version/copyright banner every smartctl run
/// prints (and the parser skips).
pub fn dump(body: &str) -> Vec<String> {
    let mut lines = vec![
        "smartctl 7.4 2023-08-01 r5530 [x86_64-linux-6.8.0] (local build)".to_string(),
        "Copyright (C) 2002-23, Bruce Allen, Christian Franke, www.smartmontools.org".to_string(),
        String::new(),
        String::new(),
    ];
    lines.extend(body.lines().map(str::to_string));
    lines
}

pub const ATA_BODY: &str = "\
=== START OF INFORMATION SECTION ===
Model Family:     Western Digital Red
Device Model:     WDC WD40EFRX-68N32N0
Serial Number:    WD-WCC7K1234567
LU WWN Device Id: 5 0014ee 2b9a1c3d8
Firmware Version: 82.00A82
User Capacity:    4,000,787,030,016 bytes [4.00 TB]
Sector Sizes:     512 bytes logical, 4096 bytes physical
Rotation Rate:    5400 rpm
SMART support is: Available - device has SMART capability.
SMART support is: Enabled

=== START OF READ SMART DATA SECTION ===
SMART overall-health self-assessment test result: PASSED

Offline data collection capabilities: (0x7b) SMART execute Offline immediate.
Offline surface scan supported.
Self-test supported.
Conveyance Self-test supported.
Selective Self-test supported.
Self-test execution status:      (   0) The previous self-test routine completed
                                        without error or no self-test has ever
                                        been run.

SMART Attributes Data Structure revision number: 16
Vendor Specific SMART Attributes with Thresholds:
ID# ATTRIBUTE_NAME          FLAG     VALUE WORST THRESH TYPE      UPDATED  WHEN_FAILED RAW_VALUE
  1 Raw_Read_Error_Rate     0x002f   200   200   051    Pre-fail  Always       -       0
  5 Reallocated_Sector_Ct   0x0033   200   200   140    Pre-fail  Always       -       0
  9 Power_On_Hours          0x0032   056   056   000    Old_age   Always       -       32023
 12 Power_Cycle_Count       0x0032   100   100   000    Old_age   Always       -       88
194 Temperature_Celsius     0x0022   115   103   000    Old_age   Always       -       35
197 Current_Pending_Sector  0x0032   200   200   000    Old_age   Always       -       0

SMART Self-test log structure revision number 1
Num  Test_Description    Status                  Remaining  LifeTime(hours)  LBA_of_first_error
# 1  Short offline       Completed without error       00%     32023         -
# 2  Extended offline    Completed without error       00%     31480         -
";

pub const SCSI_BODY: &str = "\
=== START OF INFORMATION SECTION ===
Vendor:               SEAGATE
Product:              ST4000NM0023
Revision:             0004
User Capacity:        4,000,787,030,016 bytes [4.00 TB]
Logical block size:   512 bytes
Physical block size:  4096 bytes
Rotation Rate:        7200 rpm
Serial number:        Z1Z12345
SMART support is:     Available - device has SMART capability.
SMART support is:     Enabled

=== START OF READ SMART DATA SECTION ===
SMART Health Status: OK

Percentage used endurance indicator: 12%
Current Drive Temperature:     34 C
Drive Trip Temperature:        60 C

Accumulated power on time, hours:minutes 33124:15
Specified cycle count over device lifetime:  1000
Accumulated start-stop cycles:  120
Specified load-unload count over device lifetime:  300000
Accumulated load-unload cycles:  4213
Elements in grown defect list: 0

Error counter log:
           Errors Corrected by           Total   Correction     Gigabytes    Total
               ECC          rereads/    errors   algorithm      processed    uncorrected
           fast | delayed   rewrites  corrected  invocations   [10^9 bytes]  errors
read:   2897965        0         0   2897965          0     104859.336           0
write:        0        0         0         0          0      87650.886           0
verify: 17116340        0         0  17116340          0      10034.231           0

Non-medium error count:        0

SMART Self-test log
Num  Test              Status                 segment  LifeTime  LBA_first_err [SK ASC ASQ]
     Description                              number   (hours)
# 1  Background short  Completed                   -   33124                 - [-   -    -]
# 2  Background long   Completed                   -   32006                 - [-   -    -]
";

pub const NVME_BODY: &str = "\
=== START OF INFORMATION SECTION ===
Model Number:                       Samsung SSD 970 EVO 1TB
Serial Number:                      S467NX0K123456
Firmware Version:                   2B2QEXE7
Total NVM Capacity:                 1,000,204,886,016 [1.00 TB]
Namespace 1 Formatted LBA Size:     512

=== START OF SMART DATA SECTION ===
SMART overall-health self-assessment test result: PASSED

SMART/Health Information (NVMe Log 0x02)
Critical Warning:                   0x00
Temperature:                        104 Fahrenheit
Available Spare:                    100%
Available Spare Threshold:          10%
Percentage Used:                    1%
Data Units Read:                    9,511,859 [4.87 TB]
Data Units Written:                 14,973,776 [7.66 TB]
Host Read Commands:                 153,697,715
Host Write Commands:                161,915,610
Controller Busy Time:               721
Power Cycles:                       78
Power On Hours:                     1,268
Unsafe Shutdowns:                   33
Media and Data Integrity Errors:    0
Error Information Log Entries:      134

Error Information (NVMe Log 0x01, 16 of 64 entries)
Num   ErrCount  SQId   CmdId  Status  PELoc          LBA  NSID    VS
  0        134     0  0x001c  0x4004  0x028            0     0     -
";
