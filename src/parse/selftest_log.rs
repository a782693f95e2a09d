use crate::models::test_entry::{TestEntry, TestFormat};

/// Split a log row into its fields: columns are separated by runs of two
/// or more spaces, single spaces stay inside a field ("Extended offline").
fn fields(line: &str) -> Vec<&str> {
    line.split("  ")
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}

fn dash_opt(s: &str) -> Option<String> {
    if s == "-" {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parse one self-test log row in either layout. The two patterns are
/// mutually exclusive: SCSI rows end in a `[sense asc ascq]` bracket that
/// ATA rows never carry. Rows matching neither yield `None`.
pub fn parse_row(line: &str) -> Option<TestEntry> {
    parse_scsi_row(line).or_else(|| parse_ata_row(line))
}

/// ATA layout:
///
/// ```text
/// Num  Test_Description    Status                  Remaining  LifeTime(hours)  LBA_of_first_error
/// # 1  Extended offline    Completed without error       00%     46660         -
/// ```
pub fn parse_ata_row(line: &str) -> Option<TestEntry> {
    let body = line.trim_start().strip_prefix('#')?.trim_start();
    let mut f = fields(body);
    // Long status texts can leave only a single space before the
    // percent-remaining column; peel it back off the status field.
    if f.len() == 5 {
        let status_field = f[2];
        if let Some((status, remain)) = status_field.rsplit_once(' ') {
            if remain.ends_with('%') {
                let status = status.trim_end();
                f.splice(2..3, [status, remain]);
            }
        }
    }
    if f.len() != 6 {
        return None;
    }
    let mut entry = TestEntry::new(TestFormat::Ata, f[0].parse().ok(), f[1], f[2]);
    entry.remain_pct = f[3].trim_end_matches('%').parse().ok();
    entry.hours = f[4].parse().ok();
    entry.lba = dash_opt(f[5]);
    Some(entry)
}

/// SCSI layout:
///
/// ```text
/// Num  Test              Status                 segment  LifeTime  LBA_first_err [SK ASC ASQ]
///      Description                              number   (hours)
/// # 1  Background short  Completed                   -   33124                 - [-   -    -]
/// ```
pub fn parse_scsi_row(line: &str) -> Option<TestEntry> {
    let line = line.trim_end();
    if !line.ends_with(']') {
        return None;
    }
    let open = line.rfind('[')?;
    let codes: Vec<&str> = line[open + 1..line.len() - 1].split_whitespace().collect();
    if codes.len() != 3 {
        return None;
    }
    let body = line[..open].trim_start().strip_prefix('#')?.trim_start();
    let f = fields(body);
    if f.len() != 6 {
        return None;
    }
    let mut entry = TestEntry::new(TestFormat::Scsi, f[0].parse().ok(), f[1], f[2]);
    entry.segment = dash_opt(f[3]);
    entry.hours = f[4].parse().ok();
    entry.lba = dash_opt(f[5]);
    entry.sense = dash_opt(codes[0]);
    entry.asc = dash_opt(codes[1]);
    entry.ascq = dash_opt(codes[2]);
    Some(entry)
}
