//! Scoped log capture around a single task invocation.
//!
//! The sink is acquired by the executor immediately before invoking an entry
//! point and consumed on every exit path, including the faulting one, so
//! captured lines never leak across unrelated invocations.

/// Ordered capture of log lines emitted during one invocation.
#[derive(Debug, Default)]
pub struct LogSink {
    lines: Vec<String>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single log line, preserving emission order.
    pub fn log(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Record each line of a block of text.
    pub fn log_block(&mut self, text: &str) {
        for line in text.lines() {
            self.lines.push(line.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_keep_emission_order() {
        let mut sink = LogSink::new();
        sink.log("first");
        sink.log_block("second\nthird");
        sink.log("fourth");
        assert_eq!(sink.into_lines(), vec!["first", "second", "third", "fourth"]);
    }
}
