use std::time::{Duration, Instant};

/// How long a success status stays up before it clears itself.
pub const TRANSIENT_STATUS_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Progress,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
    pub set_at: Instant,
}

impl Status {
    pub fn progress(text: &str) -> Self {
        Self::new(StatusKind::Progress, text)
    }

    pub fn success(text: &str) -> Self {
        Self::new(StatusKind::Success, text)
    }

    pub fn error(text: &str) -> Self {
        Self::new(StatusKind::Error, text)
    }

    fn new(kind: StatusKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            set_at: Instant::now(),
        }
    }

    /// Only success statuses expire. Progress and errors stay until
    /// something replaces them.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.kind == StatusKind::Success
            && now.saturating_duration_since(self.set_at) >= TRANSIENT_STATUS_DURATION
    }
}
