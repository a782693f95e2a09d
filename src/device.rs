use crate::interface::{classify, Interface, ModelClassifier, NoopClassifier};
use crate::invoker::SmartctlInvoker;
use crate::models::attribute::Attribute;
use crate::models::diagnostics::{parse_rwv_line, Diagnostics};
use crate::models::nvme::NvmeAttributes;
use crate::models::test_entry::TestEntry;
use crate::parse::lines::{normalize, LineCursor};
use crate::parse::selftest_log;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Overall health self-assessment. Within one parse pass the value only
/// escalates (PASS → WARN → FAIL); every refresh recomputes it from
/// scratch, so passes never inherit each other's verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Assessment {
    Unknown,
    Pass,
    Warn,
    Fail,
}

impl Assessment {
    pub fn escalate(&mut self, to: Assessment) {
        if to > *self {
            *self = to;
        }
    }
}

/// Self-test types a device may support. Conveyance, selective and
/// offline are ATA-only; SCSI devices advertise nothing and run short and
/// long tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Offline,
    Short,
    Long,
    Conveyance,
    Selective,
}

impl TestType {
    pub fn as_str(self) -> &'static str {
        match self {
            TestType::Offline => "offline",
            TestType::Short => "short",
            TestType::Long => "long",
            TestType::Conveyance => "conveyance",
            TestType::Selective => "selective",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "offline" => Ok(TestType::Offline),
            "short" => Ok(TestType::Short),
            "long" => Ok(TestType::Long),
            "conveyance" => Ok(TestType::Conveyance),
            "selective" => Ok(TestType::Selective),
            _ => Err(()),
        }
    }
}

/// Which self-tests the device advertises support for. Defaults are
/// overridden by the capability lines of each dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCapabilities {
    pub offline: bool,
    pub short: bool,
    pub long: bool,
    pub conveyance: bool,
    pub selective: bool,
}

impl TestCapabilities {
    pub fn defaults_for(interface: Option<Interface>) -> Self {
        // NVMe dumps carry no capability advertisement; ATA/SCSI devices
        // can be assumed to run short and long tests until told otherwise.
        let ata_like = !matches!(interface, Some(Interface::Nvme));
        Self { offline: false, short: ata_like, long: ata_like, conveyance: false, selective: false }
    }

    pub fn supports(&self, t: TestType) -> bool {
        match t {
            TestType::Offline => self.offline,
            TestType::Short => self.short,
            TestType::Long => self.long,
            TestType::Conveyance => self.conveyance,
            TestType::Selective => self.selective,
        }
    }
}

/// Live self-test state inferred from the latest refresh. Progress and
/// ETA are populated only while a test is running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeState {
    pub running: bool,
    /// Percent complete (100 - remaining), when the dump made it parsable.
    pub progress: Option<u8>,
    /// Raw "complete after" timestamp from the start response, ATA only.
    pub eta: Option<String>,
}

/// The full parsed state of one device: everything §`smartctl --all`
/// reports, typed. Serializes to a mapping of primitive values and
/// reconstructs from it losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// Hardware id without the /dev/ prefix (e.g. "sda", "nvme0").
    pub name: String,
    pub interface: Option<Interface>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub firmware: Option<String>,
    pub vendor: Option<String>,
    pub capacity_bytes: Option<u64>,
    /// Capacity as printed by the tool, e.g. "4.00 TB".
    pub capacity_human: Option<String>,
    pub logical_sector_size: Option<u32>,
    pub physical_sector_size: Option<u32>,
    /// Spindle speed in RPM; `None` for SSDs and unreported drives.
    pub rotation_rate: Option<u32>,
    pub is_ssd: bool,
    pub smart_capable: bool,
    pub smart_enabled: bool,
    pub assessment: Assessment,
    /// Warning messages generated during the pass, in attribute-table /
    /// dump order.
    pub messages: Vec<String>,
    pub test_capabilities: TestCapabilities,
    /// Attribute table keyed by id. Ids not present in the dump are
    /// absent; the key type bounds ids to 0-255.
    pub attributes: BTreeMap<u8, Attribute>,
    /// Self-test log, most-recent-first.
    pub tests: Vec<TestEntry>,
    pub diagnostics: Diagnostics,
    pub nvme: Option<NvmeAttributes>,
    /// Headline temperature in Celsius, from whichever source the dump
    /// offered (SCSI line, NVMe log, or ATA attribute 194/190).
    pub temperature: Option<i32>,
    /// Per-sensor temperatures, NVMe mostly.
    pub temperatures: BTreeMap<u8, i32>,
    pub runtime: RuntimeState,
}

impl DeviceState {
    fn new(name: String, interface: Option<Interface>) -> Self {
        let nvme = name.contains("nvme");
        Self {
            name,
            interface,
            model: None,
            serial: None,
            firmware: None,
            vendor: None,
            capacity_bytes: None,
            capacity_human: None,
            logical_sector_size: None,
            physical_sector_size: None,
            rotation_rate: None,
            is_ssd: nvme,
            smart_capable: nvme,
            smart_enabled: nvme,
            assessment: Assessment::Unknown,
            messages: Vec::new(),
            test_capabilities: TestCapabilities::defaults_for(interface),
            attributes: BTreeMap::new(),
            tests: Vec::new(),
            diagnostics: Diagnostics::default(),
            nvme: None,
            temperature: None,
            temperatures: BTreeMap::new(),
            runtime: RuntimeState::default(),
        }
    }

    /// Logical sector size, falling back to physical, then the 512-byte
    /// default every transport shares.
    pub fn sector_size(&self) -> u32 {
        self.logical_sector_size.or(self.physical_sector_size).unwrap_or(512)
    }
}

/// A single storage device seen through smartctl. Owns its state
/// exclusively; refreshes wholesale-replace the attribute table, self-test
/// log, diagnostics and runtime state. Callers must serialize access.
pub struct Device {
    pub(crate) invoker: Arc<dyn SmartctlInvoker>,
    classifier: Box<dyn ModelClassifier>,
    pub(crate) state: DeviceState,
}

impl Device {
    /// Open a device and populate it with a first refresh. When no
    /// interface is given it is probed with `-d test` and then
    /// disambiguated via the PHY logs.
    ///
    /// The invoker is an explicit dependency: build one `Smartctl` and
    /// pass it to every device that should share it.
    pub fn new(
        name: &str,
        interface: Option<Interface>,
        invoker: Arc<dyn SmartctlInvoker>,
    ) -> Result<Device> {
        let name = name.trim_start_matches("/dev/").replace("nvd", "nvme");
        let mut dev = Device {
            invoker,
            classifier: Box::new(NoopClassifier),
            state: DeviceState::new(name, interface),
        };
        if dev.state.interface.is_none() {
            dev.state.interface = dev.detect_interface()?;
        }
        if let Some(guess) = dev.state.interface {
            let fine = classify(dev.invoker.as_ref(), &dev.dev_reference(), guess);
            dev.state.interface = Some(fine);
        }
        dev.refresh()?;
        Ok(dev)
    }

    /// Replace the no-op model-family hook with a vendor-aware one.
    /// Takes effect on the next refresh.
    pub fn with_classifier(mut self, classifier: Box<dyn ModelClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn interface(&self) -> Option<Interface> {
        self.state.interface
    }

    pub fn assessment(&self) -> Assessment {
        self.state.assessment
    }

    pub fn attributes(&self) -> &BTreeMap<u8, Attribute> {
        &self.state.attributes
    }

    pub fn tests(&self) -> &[TestEntry] {
        &self.state.tests
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.state.diagnostics
    }

    pub fn runtime(&self) -> &RuntimeState {
        &self.state.runtime
    }

    /// The device reference handed to smartctl: a /dev path on unix-likes,
    /// the raw name for macOS IOService handles.
    pub fn dev_reference(&self) -> String {
        if self.state.name.contains("IOService") {
            self.state.name.clone()
        } else {
            format!("/dev/{}", self.state.name)
        }
    }

    /// Probe the interface family with `-d test`. The answer lands on the
    /// last non-empty line: "/dev/sda: Device of type 'sat' [ATA] opened".
    fn detect_interface(&self) -> Result<Option<Interface>> {
        let dev = self.dev_reference();
        let (raw, _rc) = self.invoker.invoke(&["-d", "test", &dev])?;
        let detected = raw
            .iter()
            .rev()
            .find(|l| !l.trim().is_empty())
            .and_then(|l| l.split('\'').nth(1))
            .and_then(|t| t.parse().ok());
        Ok(detected)
    }

    /// Re-query the device and rebuild the whole state from the dump.
    /// Identity fields are overwritten as encountered; the attribute
    /// table, self-test log, diagnostics, messages and runtime state are
    /// replaced outright (no incremental merge).
    pub fn refresh(&mut self) -> Result<()> {
        let dev = self.dev_reference();
        let iface = self.state.interface;
        // The tool sets informational exit bits even on success, so the
        // dump is parsed regardless of the exit code.
        let (raw, _rc) = match iface {
            Some(i) => self.invoker.invoke(&["-d", i.smartctl_type(), "--all", &dev])?,
            None => self.invoker.invoke(&["--all", &dev])?,
        };
        let mut cursor = LineCursor::new(normalize(&raw));

        self.state.assessment = Assessment::Unknown;
        self.state.messages.clear();
        self.state.attributes.clear();
        self.state.tests.clear();
        self.state.diagnostics = Diagnostics::default();
        self.state.temperature = None;
        self.state.temperatures.clear();
        self.state.test_capabilities = TestCapabilities::defaults_for(iface);
        self.state.runtime.running = false;
        self.state.runtime.progress = None;

        // Interface-specific block first, then the generic scan over the
        // same lines.
        if iface == Some(Interface::Nvme) {
            self.state.nvme = Some(NvmeAttributes::parse(&mut cursor));
            cursor.restart();
        } else {
            self.state.nvme = None;
        }

        self.scan_dump(&mut cursor);

        let scsi_family = iface.map(|i| i.is_scsi_family()).unwrap_or(false);
        if scsi_family {
            if self.state.diagnostics.power_on_hours.is_none() {
                self.scan_background_log(&dev)?;
            }
        } else {
            self.make_smart_warnings();
        }

        // ATA drives report temperature through attribute 194, some
        // through 190 (Airflow_Temperature_Cel).
        if self.state.temperature.is_none() {
            let attr = self.state.attributes.get(&194).or_else(|| self.state.attributes.get(&190));
            self.state.temperature = attr.and_then(|a| a.raw_value()).map(|v| v as i32);
        }

        if !self.state.runtime.running {
            self.state.runtime.progress = None;
            self.state.runtime.eta = None;
        }

        tracing::debug!(
            "refreshed {}: {:?}, {} attributes, {} log entries",
            self.state.name,
            self.state.assessment,
            self.state.attributes.len(),
            self.state.tests.len()
        );
        Ok(())
    }

    /// The single pass over a normalized dump. Lines that match nothing
    /// are ignored; missing sections simply leave their fields unset.
    fn scan_dump(&mut self, cursor: &mut LineCursor) {
        let iface = self.state.interface;
        let nvme = iface == Some(Interface::Nvme);

        let mut in_selftest_block = false;
        let mut expect_progress_line = false;
        let mut in_ascq = false;
        let mut ascq_message = String::new();

        while let Some(line) = cursor.next() {
            if line.trim().is_empty() {
                // Blank lines end the sub-captures.
                in_selftest_block = false;
                if in_ascq {
                    in_ascq = false;
                    self.state.messages.push(std::mem::take(&mut ascq_message));
                }
                continue;
            }

            if in_ascq {
                ascq_message.push(' ');
                ascq_message.push_str(line.trim());
                continue;
            }

            if in_selftest_block {
                if !line.get(0..3).map(|s| s.contains('#')).unwrap_or(false) {
                    continue;
                }
                if let Some(entry) = selftest_log::parse_row(line) {
                    self.state.tests.push(entry);
                }
                continue;
            }

            if expect_progress_line {
                // ATA prints "NN% of test remaining" on the line after the
                // execution-status header.
                self.state.runtime.progress = progress_from(line);
                expect_progress_line = false;
                continue;
            }

            // ── Identity ──────────────────────────────────────────────
            if line.contains("Device Model") || line.contains("Product") || line.contains("Model Number")
            {
                self.state.model = value_after_colon(line);
                self.apply_hook(line);
                continue;
            }
            if line.contains("Model Family") || line.contains("LU WWN") {
                self.apply_hook(line);
                continue;
            }
            if line.contains("Serial Number") || line.contains("Serial number") {
                self.state.serial = value_after_colon(line)
                    .and_then(|v| v.split_whitespace().next().map(str::to_string));
                continue;
            }
            if let Some(rest) = line.strip_prefix("Vendor:") {
                if let Some(v) = rest.split_whitespace().next() {
                    self.state.vendor = Some(v.to_string());
                }
                continue;
            }
            if line.contains("Firmware Version") || line.contains("Revision") {
                self.state.firmware = value_after_colon(line);
                continue;
            }
            if line.contains("User Capacity")
                || line.contains("Total NVM Capacity")
                || line.contains("Namespace 1 Size/Capacity")
            {
                self.parse_capacity(line);
                continue;
            }
            if line.contains("SMART support") {
                // The line appears twice (capability, then enabled state);
                // token checks keep both readings robust.
                if line.contains("Unavailable") || line.contains("device lacks SMART capability") {
                    self.state.smart_capable = false;
                    self.state.smart_enabled = false;
                } else if line.contains("Enabled") {
                    self.state.smart_enabled = true;
                } else if line.contains("Disabled") {
                    self.state.smart_enabled = false;
                } else if line.contains("Available") || line.contains("device has SMART capability")
                {
                    self.state.smart_capable = true;
                }
                continue;
            }
            if line.contains("does not support SMART") {
                self.state.smart_capable = false;
                self.state.smart_enabled = false;
                continue;
            }
            if line.contains("Rotation Rate") {
                if line.contains("Solid State Device") {
                    self.state.is_ssd = true;
                } else if line.contains("rpm") {
                    self.state.is_ssd = false;
                    self.state.rotation_rate = value_after_colon(line)
                        .and_then(|v| v.trim_end_matches("rpm").trim().parse().ok());
                }
                continue;
            }

            // ── Assessment ────────────────────────────────────────────
            if line.contains("SMART overall-health self-assessment") {
                let verdict = value_after_colon(line);
                if verdict.as_deref() == Some("PASSED") {
                    self.state.assessment.escalate(Assessment::Pass);
                } else {
                    self.state.assessment.escalate(Assessment::Fail);
                }
                continue;
            }
            if line.contains("SMART Health Status") {
                let verdict = value_after_colon(line);
                if verdict.as_deref() == Some("OK") {
                    self.state.assessment.escalate(Assessment::Pass);
                } else {
                    self.state.assessment.escalate(Assessment::Fail);
                    // The indented lines that follow describe the failure;
                    // collect them into one message until the blank line.
                    in_ascq = true;
                    ascq_message = verdict.unwrap_or_default();
                }
                continue;
            }

            // ── Test capabilities (ATA advertisement lines) ───────────
            if line.contains("SMART execute Offline immediate") {
                self.state.test_capabilities.offline = !line.contains("No");
                continue;
            }
            if line.contains("Conveyance Self-test supported") {
                self.state.test_capabilities.conveyance = !line.contains("No");
                continue;
            }
            if line.contains("Selective Self-test supported") {
                self.state.test_capabilities.selective = !line.contains("No");
                continue;
            }
            if line.contains("Self-test supported") {
                let yes = !line.contains("No");
                self.state.test_capabilities.short = yes;
                self.state.test_capabilities.long = yes;
                continue;
            }

            // ── Attribute table ───────────────────────────────────────
            if line.contains("0x0") && line.contains('_') && !nvme {
                if let Some(attr) = Attribute::parse_row(line) {
                    self.state.attributes.insert(attr.id, attr);
                }
                continue;
            }

            // ── Running self-test ─────────────────────────────────────
            if line.contains("Self-test execution status") {
                if line.contains("progress") {
                    self.state.runtime.running = true;
                    expect_progress_line = true;
                } else if line.contains('%') {
                    self.state.runtime.running = true;
                    self.state.runtime.progress = progress_from(line);
                }
                continue;
            }

            if line.contains("Description") && line.contains("(hours)") {
                in_selftest_block = true;
                continue;
            }

            // ── SCSI diagnostics ──────────────────────────────────────
            if line.contains("used endurance") {
                let pct: Option<u8> = value_after_colon(line)
                    .and_then(|v| v.trim_end_matches('%').parse().ok());
                self.state.diagnostics.life_left = pct.filter(|p| *p <= 100).map(|p| 100 - p);
                continue;
            }
            if line.contains("Specified cycle count") {
                self.state.diagnostics.start_stop_spec = int_after_colon(line);
                continue;
            }
            if line.contains("Accumulated start-stop cycles") {
                self.state.diagnostics.start_stop_cycles = int_after_colon(line);
                continue;
            }
            if line.contains("Specified load-unload count") {
                self.state.diagnostics.load_cycle_spec = int_after_colon(line);
                continue;
            }
            if line.contains("Accumulated load-unload cycles") {
                self.state.diagnostics.load_cycle_count = int_after_colon(line);
                continue;
            }
            if line.contains("Elements in grown defect list") {
                self.state.diagnostics.reallocated_sector_ct = int_after_colon(line);
                continue;
            }
            if line.trim_start().starts_with("read:") {
                if let Some((corrected, gb, uncorrected)) = parse_rwv_line(line) {
                    self.state.diagnostics.corrected_reads = Some(corrected);
                    self.state.diagnostics.reads_gb = Some(gb);
                    self.state.diagnostics.uncorrected_reads = Some(uncorrected);
                }
                continue;
            }
            if line.trim_start().starts_with("write:") {
                if let Some((corrected, gb, uncorrected)) = parse_rwv_line(line) {
                    self.state.diagnostics.corrected_writes = Some(corrected);
                    self.state.diagnostics.writes_gb = Some(gb);
                    self.state.diagnostics.uncorrected_writes = Some(uncorrected);
                }
                continue;
            }
            if line.trim_start().starts_with("verify:") {
                if let Some((corrected, gb, uncorrected)) = parse_rwv_line(line) {
                    self.state.diagnostics.corrected_verifies = Some(corrected);
                    self.state.diagnostics.verifies_gb = Some(gb);
                    self.state.diagnostics.uncorrected_verifies = Some(uncorrected);
                }
                continue;
            }
            if line.to_lowercase().contains("non-medium error count") {
                self.state.diagnostics.non_medium_errors = int_after_colon(line);
                continue;
            }
            if line.contains("Accumulated power on time") {
                // "Accumulated power on time, hours:minutes 33124:15"
                self.state.diagnostics.power_on_hours = power_on_hours_from(line);
                continue;
            }

            // ── Temperature ───────────────────────────────────────────
            if line.contains("Current Drive Temperature") || (line.contains("Temperature:") && nvme)
            {
                self.state.temperature = temperature_from(line);
                continue;
            }
            if let Some(rest) = line.trim_start().strip_prefix("Temperature Sensor ") {
                if let Some((sensor, _)) = rest.split_once(':') {
                    let sensor: Option<u8> = sensor.trim().parse().ok();
                    if let (Some(sensor), Some(temp)) = (sensor, temperature_from(line)) {
                        self.state.temperatures.insert(sensor, temp);
                        if self.state.temperature.is_none() || sensor == 0 {
                            self.state.temperature = Some(temp);
                        }
                    }
                }
                continue;
            }

            // ── Sector sizes ──────────────────────────────────────────
            if line.contains("Sector Sizes") {
                // "Sector Sizes:     512 bytes logical, 4096 bytes physical"
                let t: Vec<&str> = line.split_whitespace().collect();
                for w in t.windows(3) {
                    if w[1] == "bytes" {
                        match w[2].trim_end_matches(',') {
                            "logical" => self.state.logical_sector_size = w[0].parse().ok(),
                            "physical" => self.state.physical_sector_size = w[0].parse().ok(),
                            _ => {}
                        }
                    }
                }
                continue;
            }
            if line.contains("Logical block size:") {
                self.state.logical_sector_size = first_int_after_colon(line);
                continue;
            }
            if line.contains("Physical block size:") {
                self.state.physical_sector_size = first_int_after_colon(line);
                continue;
            }
            if line.contains("Namespace 1 Formatted LBA Size") {
                self.state.logical_sector_size = first_int_after_colon(line);
                continue;
            }
        }

        // A dump can end inside the failure description.
        if in_ascq {
            self.state.messages.push(ascq_message);
        }
    }

    fn apply_hook(&mut self, line: &str) {
        if let Some(interface) = self.classifier.classify(&line.to_lowercase()) {
            self.state.interface = Some(interface);
        }
    }

    /// "User Capacity:  4,000,787,030,016 bytes [4.00 TB]"
    fn parse_capacity(&mut self, line: &str) {
        let rest = match line.split_once(':') {
            Some((_, r)) => r.trim(),
            None => return,
        };
        let number: String = rest
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
            .collect();
        if let Ok(v) = number.replace(',', "").replace('.', "").parse() {
            self.state.capacity_bytes = Some(v);
        }
        if let (Some(open), Some(close)) = (rest.find('['), rest.rfind(']')) {
            if open < close {
                self.state.capacity_human = Some(rest[open + 1..close].replace(',', "."));
            }
        }
    }

    /// Scan the attribute table for non-neutral failure statuses and turn
    /// them into warning messages, escalating the assessment as it goes.
    /// FAIL, once reached, is never downgraded by a later attribute.
    fn make_smart_warnings(&mut self) {
        let before = self.state.messages.len();
        for attr in self.state.attributes.values() {
            match attr.when_failed.as_str() {
                "-" => {}
                "In_the_past" => {
                    self.state.messages.push(format!(
                        "{} failed in the past with value {}. [Threshold: {}]",
                        attr.name, attr.worst, attr.thresh
                    ));
                    self.state.assessment.escalate(Assessment::Warn);
                }
                "FAILING_NOW" => {
                    self.state.messages.push(format!(
                        "{} is failing now with value {}. [Threshold: {}]",
                        attr.name, attr.value, attr.thresh
                    ));
                    self.state.assessment.escalate(Assessment::Fail);
                }
                other => {
                    self.state.messages.push(format!(
                        "{} says it failed '{}'. [V={},W={},T={}]",
                        attr.name, other, attr.value, attr.worst, attr.thresh
                    ));
                    self.state.assessment.escalate(Assessment::Warn);
                }
            }
        }
        for msg in &self.state.messages[before..] {
            tracing::warn!("{}: {}", self.state.name, msg);
        }
    }

    /// Some SCSI drives only expose power-on hours through the background
    /// scan results log.
    fn scan_background_log(&mut self, dev: &str) -> Result<()> {
        let (raw, rc) = self.invoker.invoke(&["-d", "scsi", "-l", "background", dev])?;
        if rc != 0 {
            return Ok(());
        }
        for line in &raw {
            if line.contains("power on time") {
                self.state.diagnostics.power_on_hours = power_on_hours_from(line);
            }
        }
        Ok(())
    }

    /// Toggle the SMART feature set. NVMe controllers have it always on.
    pub fn smart_toggle(&mut self, enable: bool) -> Result<()> {
        if self.state.interface == Some(Interface::Nvme) {
            anyhow::bail!("NVMe devices do not support toggling SMART");
        }
        if self.state.smart_enabled == enable {
            return Ok(());
        }
        let dev = self.dev_reference();
        let action = if enable { "on" } else { "off" };
        let (raw, rc) = match self.state.interface {
            Some(i) => self.invoker.invoke(&["-s", action, "-d", i.smartctl_type(), &dev])?,
            None => self.invoker.invoke(&["-s", action, &dev])?,
        };
        if rc != 0 {
            anyhow::bail!("smartctl -s {} failed: {}", action, raw.join(" "));
        }
        self.refresh()?;
        if self.state.smart_enabled != enable {
            anyhow::bail!("failed to turn SMART {}", action);
        }
        Ok(())
    }
}

// ── Line value helpers ────────────────────────────────────────────────

fn value_after_colon(line: &str) -> Option<String> {
    line.split_once(':').map(|(_, v)| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn int_after_colon(line: &str) -> Option<u64> {
    value_after_colon(line)?.parse().ok()
}

/// First integer token of the value: "512 bytes" -> 512.
fn first_int_after_colon<T: FromStr>(line: &str) -> Option<T> {
    line.split_once(':')?.1.split_whitespace().next()?.parse().ok()
}

/// "Accumulated power on time, hours:minutes 33124:15 [...]" -> 33124.
fn power_on_hours_from(line: &str) -> Option<u64> {
    line.split(':').nth(1)?.split_whitespace().nth(1)?.parse().ok()
}

/// Temperature value after the last colon, Fahrenheit converted.
/// "Current Drive Temperature:     34 C" -> 34.
fn temperature_from(line: &str) -> Option<i32> {
    let value = line.rsplit(':').next()?.trim();
    let t: i32 = value.split_whitespace().next()?.parse().ok()?;
    if line.to_lowercase().contains("fahrenheit") {
        Some((t - 32) * 5 / 9)
    } else {
        Some(t)
    }
}

/// Percent of the test already done, from "NN% of test remaining" text.
/// Anything unparsable is unknown, never a guess.
pub(crate) fn progress_from(line: &str) -> Option<u8> {
    let before = line.split('%').next()?;
    let remaining: u8 = before
        .split_whitespace()
        .last()?
        .trim_start_matches('(')
        .parse()
        .ok()?;
    if remaining > 100 {
        return None;
    }
    Some(100 - remaining)
}
