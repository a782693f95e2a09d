//! Device health querying over the smartmontools CLI.
//!
//! Wraps `smartctl` text output in a typed model: open a [`Device`],
//! inspect its [`DeviceState`] (identity, SMART attribute table,
//! self-test log, SCSI diagnostic counters, NVMe health log), and drive
//! self-tests through [`Device::run_selftest`] and friends.
//!
//! The tool is reached through the [`SmartctlInvoker`] trait. Production
//! code builds one [`Smartctl`] and shares it across devices; tests
//! substitute a canned implementation and never touch real hardware.
//!
//! ```no_run
//! use smartpoll::{Device, Smartctl};
//! use std::sync::Arc;
//!
//! let invoker = Arc::new(Smartctl::new());
//! let dev = Device::new("/dev/sda", None, invoker)?;
//! println!("{}: {:?}", dev.name(), dev.assessment());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod device;
pub mod interface;
pub mod invoker;
pub mod models;
pub mod parse;
pub mod selftest;

pub use config::Config;
pub use device::{Assessment, Device, DeviceState, RuntimeState, TestCapabilities, TestType};
pub use interface::{Interface, ModelClassifier, NoopClassifier};
pub use invoker::{Smartctl, SmartctlInvoker};
pub use models::attribute::Attribute;
pub use models::diagnostics::Diagnostics;
pub use models::nvme::{NvmeAttributes, NvmeError};
pub use models::test_entry::{TestEntry, TestFormat};
pub use selftest::{Eta, EtaFormat, SelfTestResult, StartOutcome, WaitOutcome};
