mod common;

use common::{dump, MockInvoker, ATA_BODY};
use smartpoll::{Assessment, Device, DeviceState, Interface, TestType};
use std::sync::Arc;

fn ata_device(body: &str) -> (Arc<MockInvoker>, Device) {
    let mock = Arc::new(MockInvoker::new());
    mock.stub(&["-d", "ata", "--all", "/dev/sda"], dump(body), 0);
    let dev = Device::new("/dev/sda", Some(Interface::Ata), mock.clone()).unwrap();
    (mock, dev)
}

#[test]
fn parses_identity_section() {
    let (_, dev) = ata_device(ATA_BODY);
    let s = dev.state();
    assert_eq!(s.name, "sda");
    assert_eq!(s.interface, Some(Interface::Ata));
    assert_eq!(s.model.as_deref(), Some("WDC WD40EFRX-68N32N0"));
    assert_eq!(s.serial.as_deref(), Some("WD-WCC7K1234567"));
    assert_eq!(s.firmware.as_deref(), Some("82.00A82"));
    assert_eq!(s.capacity_bytes, Some(4_000_787_030_016));
    assert_eq!(s.capacity_human.as_deref(), Some("4.00 TB"));
    assert_eq!(s.logical_sector_size, Some(512));
    assert_eq!(s.physical_sector_size, Some(4096));
    assert_eq!(s.sector_size(), 512);
    assert_eq!(s.rotation_rate, Some(5400));
    assert!(!s.is_ssd);
    assert!(s.smart_capable);
    assert!(s.smart_enabled);
    assert_eq!(s.assessment, Assessment::Pass);
    assert!(s.messages.is_empty());
}

#[test]
fn parses_attribute_table() {
    let (_, dev) = ata_device(ATA_BODY);
    let attrs = dev.attributes();
    assert_eq!(attrs.len(), 6);
    let poh = &attrs[&9];
    assert_eq!(poh.name, "Power_On_Hours");
    assert_eq!(poh.value, 56);
    assert_eq!(poh.raw_value(), Some(32023));
    assert!(!poh.prefail);
    assert!(attrs[&5].prefail);
    // Rows the dump does not carry stay absent, never zero-filled.
    assert!(!attrs.contains_key(&0));
    assert!(!attrs.contains_key(&196));
}

#[test]
fn temperature_falls_back_to_attribute_194() {
    let (_, dev) = ata_device(ATA_BODY);
    assert_eq!(dev.state().temperature, Some(35));
}

#[test]
fn parses_test_capabilities() {
    let (_, dev) = ata_device(ATA_BODY);
    let caps = dev.state().test_capabilities;
    assert!(caps.offline);
    assert!(caps.short);
    assert!(caps.long);
    assert!(caps.conveyance);
    assert!(caps.selective);
    assert!(caps.supports(TestType::Conveyance));
}

#[test]
fn selftest_log_is_newest_first() {
    let (_, dev) = ata_device(ATA_BODY);
    let tests = dev.tests();
    assert_eq!(tests.len(), 2);
    assert_eq!(tests[0].test_type, "Short offline");
    assert_eq!(tests[0].hours, Some(32023));
    assert_eq!(tests[1].hours, Some(31480));
    assert!(tests[0].hours >= tests[1].hours);
}

#[test]
fn failed_attributes_become_ordered_warnings() {
    let body = ATA_BODY
        .replace(
            "  5 Reallocated_Sector_Ct   0x0033   200   200   140    Pre-fail  Always       -       0",
            "  5 Reallocated_Sector_Ct   0x0033   132   121   140    Pre-fail  Always   FAILING_NOW  1213",
        )
        .replace(
            "197 Current_Pending_Sector  0x0032   200   200   000    Old_age   Always       -       0",
            "197 Current_Pending_Sector  0x0032   200   121   140    Old_age   Always   In_the_past  12",
        );
    let (_, dev) = ata_device(&body);
    // The overall verdict said PASSED but a threshold is tripped right now.
    assert_eq!(dev.assessment(), Assessment::Fail);
    assert_eq!(
        dev.state().messages,
        vec![
            "Reallocated_Sector_Ct is failing now with value 132. [Threshold: 140]".to_string(),
            "Current_Pending_Sector failed in the past with value 121. [Threshold: 140]".to_string(),
        ]
    );
}

#[test]
fn in_the_past_alone_is_a_warning_not_a_failure() {
    let body = ATA_BODY.replace(
        "197 Current_Pending_Sector  0x0032   200   200   000    Old_age   Always       -       0",
        "197 Current_Pending_Sector  0x0032   200   121   140    Old_age   Always   In_the_past  12",
    );
    let (_, dev) = ata_device(&body);
    assert_eq!(dev.assessment(), Assessment::Warn);
    assert_eq!(dev.state().messages.len(), 1);
}

#[test]
fn running_test_exposes_progress() {
    let body = ATA_BODY
        .replace(
            "(   0) The previous self-test routine completed",
            "( 249) Self-test routine in progress...",
        )
        .replace("without error or no self-test has ever", "90% of test remaining.");
    let (_, dev) = ata_device(&body);
    assert!(dev.runtime().running);
    assert_eq!(dev.runtime().progress, Some(10));
}

#[test]
fn smart_toggle_turns_the_feature_off() {
    let (mock, mut dev) = ata_device(ATA_BODY);
    assert!(dev.state().smart_enabled);
    mock.stub(
        &["-s", "off", "-d", "ata", "/dev/sda"],
        vec!["SMART Disabled. Use option -s with argument 'on' to enable it.".to_string()],
        0,
    );
    mock.stub(
        &["-d", "ata", "--all", "/dev/sda"],
        dump(&ATA_BODY.replace("SMART support is: Enabled", "SMART support is: Disabled")),
        0,
    );
    dev.smart_toggle(false).unwrap();
    assert!(!dev.state().smart_enabled);
    assert!(dev.state().smart_capable);
}

#[test]
fn smart_toggle_to_the_current_state_is_a_no_op() {
    let (mock, mut dev) = ata_device(ATA_BODY);
    dev.smart_toggle(true).unwrap();
    assert_eq!(mock.calls_matching("-s on"), 0);
}

#[test]
fn smart_toggle_fails_when_the_flag_does_not_change() {
    let (mock, mut dev) = ata_device(ATA_BODY);
    // The tool reports success but the follow-up dump still says Enabled.
    mock.stub(
        &["-s", "off", "-d", "ata", "/dev/sda"],
        vec!["SMART Disabled. Use option -s with argument 'on' to enable it.".to_string()],
        0,
    );
    assert!(dev.smart_toggle(false).is_err());
    assert!(dev.state().smart_enabled);
}

#[test]
fn refresh_is_idempotent() {
    let (_, mut dev) = ata_device(ATA_BODY);
    let before = dev.state().clone();
    dev.refresh().unwrap();
    dev.refresh().unwrap();
    assert_eq!(dev.state(), &before);
}

#[test]
fn state_round_trips_through_json() {
    let (_, dev) = ata_device(ATA_BODY);
    let json = serde_json::to_string(dev.state()).unwrap();
    let back: DeviceState = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, dev.state());
}

#[test]
fn sataphy_probe_refines_ata_to_sata() {
    let mock = Arc::new(MockInvoker::new());
    mock.stub(
        &["-d", "ata", "-l", "sataphy", "/dev/sda"],
        vec![
            "smartctl 7.4".to_string(),
            "Copyright".to_string(),
            String::new(),
            "SATA Phy Event Counters (GP Log 0x11)".to_string(),
        ],
        0,
    );
    mock.stub(&["-d", "ata", "--all", "/dev/sda"], dump(ATA_BODY), 0);
    let dev = Device::new("sda", Some(Interface::Ata), mock).unwrap();
    assert_eq!(dev.interface(), Some(Interface::Sata));
}

#[test]
fn interface_detection_reads_the_probe_answer() {
    let mock = Arc::new(MockInvoker::new());
    mock.stub(
        &["-d", "test", "/dev/sda"],
        vec![
            "smartctl 7.4".to_string(),
            String::new(),
            "/dev/sda: Device of type 'sat' [ATA] opened".to_string(),
        ],
        0,
    );
    mock.stub(&["-d", "sat", "--all", "/dev/sda"], dump(ATA_BODY), 0);
    let dev = Device::new("sda", None, mock).unwrap();
    assert_eq!(dev.interface(), Some(Interface::Sat));
}
