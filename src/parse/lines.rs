/// Number of leading boilerplate lines smartctl always prints (version
/// banner, copyright, blank). They carry no device data and are skipped
/// unconditionally.
const BOILERPLATE_LINES: usize = 4;

/// Strip the version boilerplate and stray narrow no-break spaces (U+202F)
/// that some smartctl builds emit in numeric fields.
pub fn normalize(raw: &[String]) -> Vec<String> {
    raw.iter()
        .skip(BOILERPLATE_LINES)
        .map(|line| line.replace('\u{202f}', ""))
        .collect()
}

/// A restartable cursor over normalized dump lines.
///
/// The dump is consumed twice: once by the interface-specific block parser
/// (NVMe health log) and once by the generic single-pass scan. `restart()`
/// rewinds between the two.
pub struct LineCursor {
    lines: Vec<String>,
    pos:   usize,
}

impl LineCursor {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines, pos: 0 }
    }

    pub fn next(&mut self) -> Option<&str> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line)
    }

    /// The line the next `next()` call would return, without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.lines.get(self.pos).map(|s| s.as_str())
    }

    pub fn restart(&mut self) {
        self.pos = 0;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
