use std::time::Duration;

/// Default upper bound on a reply wait.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on finishing a partially received line during a poll.
pub const DEFAULT_LINE_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Default notification queue depth.
pub const DEFAULT_MAX_PENDING_NOTIFICATIONS: usize = 1024;

/// Multiplexer tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// How long `send_and_wait` waits for an `R:` line.
    pub reply_timeout: Duration,
    /// How long `poll_notification` waits for the rest of a line once bytes
    /// are available.
    pub line_read_timeout: Duration,
    /// Queue depth before the oldest buffered line is dropped.
    pub max_pending_notifications: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            line_read_timeout: DEFAULT_LINE_READ_TIMEOUT,
            max_pending_notifications: DEFAULT_MAX_PENDING_NOTIFICATIONS,
        }
    }
}

impl LinkConfig {
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn with_line_read_timeout(mut self, timeout: Duration) -> Self {
        self.line_read_timeout = timeout;
        self
    }

    pub fn with_max_pending_notifications(mut self, max: usize) -> Self {
        self.max_pending_notifications = max.max(1);
        self
    }
}
