//! Output capture buffer.
//!
//! Executors append the combined output of a run; the runner inspects it and then clears it before the next variant
//! starts. A buffer is either clean (empty) or dirty.

/// Captured textual output of the current variant.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, chunk: &str) {
        self.text.push_str(chunk);
    }

    /// Append raw process output, replacing invalid UTF-8.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.text.push_str(&String::from_utf8_lossy(bytes));
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Move the captured text out, leaving the buffer clean.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_clean() {
        assert!(OutputBuffer::new().is_empty());
    }

    #[test]
    fn test_push_and_contains() {
        let mut buffer = OutputBuffer::new();
        buffer.push_str("ERROR: Invalid options: ");
        buffer.push_str("foo\n");
        assert!(buffer.contains("Invalid options: foo"));
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_push_bytes_is_lossy() {
        let mut buffer = OutputBuffer::new();
        buffer.push_bytes(b"ok \xff done");
        assert!(buffer.contains("ok"));
        assert!(buffer.contains("done"));
    }

    #[test]
    fn test_take_leaves_buffer_clean() {
        let mut buffer = OutputBuffer::new();
        buffer.push_str("abc");
        assert_eq!(buffer.take(), "abc");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buffer = OutputBuffer::new();
        buffer.push_str("abc");
        buffer.clear();
        assert_eq!(buffer.as_str(), "");
    }
}
