use std::fmt;

/// Failure raised by the platform copy primitive (unsupported platform or
/// denied permission). The copy buttons catch this locally and fall back to
/// the "Select All" hint; it never propagates further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardError {
    message: String,
}

impl ClipboardError {
    pub(crate) fn unsupported() -> Self {
        Self {
            message: "copy command is not supported".to_string(),
        }
    }
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ClipboardError {}

/// Deterministic stand-in for the host clipboard: stores the last written
/// text for assertions and can be switched into a failing mode to exercise
/// the copy fallback path.
#[derive(Debug, Default)]
pub(crate) struct MockClipboard {
    text: String,
    failing: bool,
    write_count: usize,
}

impl MockClipboard {
    pub(crate) fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.failing {
            return Err(ClipboardError::unsupported());
        }
        self.text = text.to_string();
        self.write_count += 1;
        Ok(())
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub(crate) fn write_count(&self) -> usize {
        self.write_count
    }
}
