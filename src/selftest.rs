//! Self-test lifecycle: start, poll, wait, abort.
//!
//! The firmware keeps a bounded result log (21 entries on ATA, 20 on
//! SCSI) with newest entries first. "Is there a new result" is decided by
//! comparing the log against the snapshot taken before the refresh; when
//! the log is already full, rotation is detected by the first and last
//! entries changing while the length stays put.

use crate::device::{progress_from, Device, TestType};
use crate::invoker::SmartctlInvoker;
use crate::models::test_entry::TestEntry;
use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

const ATA_MAX_LOG: usize = 21;
const SCSI_MAX_LOG: usize = 20;

/// Answer to "what did the last self-test do": the codes mirror the
/// classic 0/1/2/3 convention (completed / running / nothing new /
/// aborted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelfTestResult {
    Completed(TestEntry),
    Running { progress: Option<u8> },
    NoNewResults,
    Aborted(TestEntry),
}

impl SelfTestResult {
    pub fn code(&self) -> u8 {
        match self {
            SelfTestResult::Completed(_) => 0,
            SelfTestResult::Running { .. } => 1,
            SelfTestResult::NoNewResults => 2,
            SelfTestResult::Aborted(_) => 3,
        }
    }
}

/// Completion estimate for a freshly started test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Eta {
    /// The timestamp exactly as the tool printed it.
    Timestamp(String),
    /// Seconds between now and the printed timestamp.
    SecondsRemaining(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtaFormat {
    Date,
    Seconds,
}

/// Outcome of asking the device to start a self-test.
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    Started { eta: Option<Eta> },
    AlreadyRunning { eta: Option<Eta> },
    Unsupported(String),
    Failed(String),
}

impl StartOutcome {
    pub fn code(&self) -> u8 {
        match self {
            StartOutcome::Started { .. } => 0,
            StartOutcome::AlreadyRunning { .. } => 1,
            StartOutcome::Unsupported(_) => 2,
            StartOutcome::Failed(_) => 3,
        }
    }
}

/// Result of starting a test and waiting it out.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    Finished(SelfTestResult),
    /// The test never started; the start outcome says why.
    NotStarted(StartOutcome),
}

impl Device {
    /// Check whether the most recent self-test produced a new result.
    /// Refreshes the device; the pre-refresh log snapshot decides
    /// freshness.
    pub fn selftest_result(&mut self) -> Result<SelfTestResult> {
        let maxlog = match self.state.interface {
            Some(i) if i.is_scsi_family() => SCSI_MAX_LOG,
            _ => ATA_MAX_LOG,
        };
        let prev_len = self.state.tests.len();
        let prev_first = self.state.tests.first().map(TestEntry::identity);
        let prev_last = self.state.tests.last().map(TestEntry::identity);

        self.refresh()?;

        if self.state.runtime.running {
            return Ok(SelfTestResult::Running { progress: self.state.runtime.progress });
        }

        // A full log cannot grow; rotation shows up as the endpoints
        // changing under a constant length.
        let rotated = prev_len == maxlog
            && (self.state.tests.first().map(TestEntry::identity) != prev_first
                || self.state.tests.last().map(TestEntry::identity) != prev_last);
        if self.state.tests.len() == prev_len && !rotated {
            return Ok(SelfTestResult::NoNewResults);
        }

        match self.state.tests.first() {
            Some(e) if e.status.contains("Aborted") => Ok(SelfTestResult::Aborted(e.clone())),
            Some(e) => Ok(SelfTestResult::Completed(e.clone())),
            None => Ok(SelfTestResult::NoNewResults),
        }
    }

    /// Ask the device to start a self-test. A test already in progress is
    /// reported, not aborted; a test type the device does not advertise is
    /// rejected without touching the tool.
    pub fn run_selftest(&mut self, test: TestType, eta_format: EtaFormat) -> Result<StartOutcome> {
        if let SelfTestResult::Running { .. } = self.selftest_result()? {
            let eta = self.state.runtime.eta.as_deref().and_then(|e| eta_value(e, eta_format));
            return Ok(StartOutcome::AlreadyRunning { eta });
        }
        if !self.state.test_capabilities.supports(test) {
            return Ok(StartOutcome::Unsupported(format!(
                "device does not support the '{}' self-test",
                test
            )));
        }

        let dev = self.dev_reference();
        let (raw, _rc) = match self.state.interface {
            Some(i) => {
                self.invoker.invoke(&["-d", i.smartctl_type(), "-t", test.as_str(), &dev])?
            }
            None => self.invoker.invoke(&["-t", test.as_str(), &dev])?,
        };

        let mut started = false;
        let mut eta_raw: Option<String> = None;
        for line in &raw {
            if line.contains("has begun") {
                started = true;
            }
            if line.contains("aborting current test") {
                // Raced with a test something else started. Salvage its
                // progress if the message carries one.
                self.state.runtime.running = true;
                self.state.runtime.progress = progress_from(line);
                let eta =
                    self.state.runtime.eta.as_deref().and_then(|e| eta_value(e, eta_format));
                return Ok(StartOutcome::AlreadyRunning { eta });
            }
            if started {
                if let Some((_, tail)) = line.split_once("complete after ") {
                    eta_raw = Some(tail.trim().to_string());
                }
            }
        }

        if !started {
            return Ok(StartOutcome::Failed(raw.join(" ").trim().to_string()));
        }

        self.state.runtime.running = true;
        self.state.runtime.progress = Some(0);
        self.state.runtime.eta = eta_raw.clone();
        let eta = eta_raw.as_deref().and_then(|e| eta_value(e, eta_format));
        Ok(StartOutcome::Started { eta })
    }

    /// Start a self-test and block until it finishes. `progress_handler`
    /// is called once per poll with the best-known progress (50 when the
    /// dump does not expose one). Offline tests run in the drive's
    /// background and cannot be polled; they return right after starting.
    pub fn run_selftest_and_wait(
        &mut self,
        test: TestType,
        eta_format: EtaFormat,
        poll: Duration,
        mut progress_handler: Option<&mut dyn FnMut(u8)>,
    ) -> Result<WaitOutcome> {
        let start = self.run_selftest(test, eta_format)?;
        if !matches!(start, StartOutcome::Started { .. }) {
            return Ok(WaitOutcome::NotStarted(start));
        }

        if test == TestType::Offline {
            self.state.runtime.running = false;
            self.state.runtime.progress = None;
            self.state.runtime.eta = None;
            return Ok(WaitOutcome::Finished(self.selftest_result()?));
        }

        loop {
            match self.selftest_result()? {
                SelfTestResult::Running { progress } => {
                    if let Some(cb) = progress_handler.as_mut() {
                        cb(progress.unwrap_or(50));
                    }
                    thread::sleep(poll);
                }
                SelfTestResult::NoNewResults => {
                    // The log endpoints can coincide across a rotation;
                    // the newest entry is still the one we ran.
                    let outcome = match self.state.tests.first() {
                        Some(e) if e.status.contains("Aborted") => {
                            SelfTestResult::Aborted(e.clone())
                        }
                        Some(e) => SelfTestResult::Completed(e.clone()),
                        None => SelfTestResult::NoNewResults,
                    };
                    return Ok(WaitOutcome::Finished(outcome));
                }
                done => return Ok(WaitOutcome::Finished(done)),
            }
        }
    }

    /// Abort the running self-test. Returns the tool's exit code verbatim
    /// and leaves the cached state alone; the next refresh picks up the
    /// aborted log entry.
    pub fn abort_selftest(&mut self) -> Result<i32> {
        let dev = self.dev_reference();
        let (_, code) = match self.state.interface {
            Some(i) => self.invoker.invoke(&["-d", i.smartctl_type(), "-X", &dev])?,
            None => self.invoker.invoke(&["-X", &dev])?,
        };
        Ok(code)
    }
}

/// Parse "Sun Aug 24 14:32:01 2025" (optionally with a trailing zone
/// name) into the requested shape. Unparsable input yields no estimate.
fn eta_value(raw: &str, format: EtaFormat) -> Option<Eta> {
    match format {
        EtaFormat::Date => Some(Eta::Timestamp(raw.to_string())),
        EtaFormat::Seconds => {
            let when = parse_completion_time(raw)?;
            let now = chrono::Local::now().naive_local();
            Some(Eta::SecondsRemaining((when - now).num_seconds() as f64))
        }
    }
}

fn parse_completion_time(raw: &str) -> Option<NaiveDateTime> {
    const FMT: &str = "%a %b %e %H:%M:%S %Y";
    if let Ok(t) = NaiveDateTime::parse_from_str(raw.trim(), FMT) {
        return Some(t);
    }
    // Newer tool versions append the timezone name.
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() > 5 {
        return NaiveDateTime::parse_from_str(&tokens[..5].join(" "), FMT).ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_time_parses_with_and_without_zone() {
        assert!(parse_completion_time("Sun Aug 24 14:32:01 2025").is_some());
        assert!(parse_completion_time("Sun Aug 24 14:32:01 2025 CEST").is_some());
        assert!(parse_completion_time("not a date").is_none());
    }

    #[test]
    fn eta_date_format_is_verbatim() {
        assert_eq!(
            eta_value("Sun Aug 24 14:32:01 2025", EtaFormat::Date),
            Some(Eta::Timestamp("Sun Aug 24 14:32:01 2025".into()))
        );
    }

    #[test]
    fn result_codes() {
        assert_eq!(SelfTestResult::NoNewResults.code(), 2);
        assert_eq!(SelfTestResult::Running { progress: Some(40) }.code(), 1);
        assert_eq!(StartOutcome::Unsupported("x".into()).code(), 2);
        assert_eq!(StartOutcome::Failed("x".into()).code(), 3);
    }
}
