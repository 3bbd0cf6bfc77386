//! Frame coalescing and resize debouncing.
//!
//! Both are driven by the host's clock: the host calls in with a
//! millisecond timestamp from its frame callback or timer.

/// Coalesces redraw requests into at most one render per frame.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: bool,
    requests: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending request. Returns whether a render is due.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Total requests since creation, coalesced or not.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

/// Holds the latest container size until a quiet period has passed.
#[derive(Debug)]
pub struct ResizeDebouncer {
    quiet_ms: f64,
    pending: Option<(f32, f32)>,
    deadline: f64,
}

impl ResizeDebouncer {
    pub fn new(quiet_ms: f64) -> Self {
        Self {
            quiet_ms,
            pending: None,
            deadline: 0.0,
        }
    }

    /// Record a resize; restarts the quiet period.
    pub fn schedule(&mut self, width: f32, height: f32, now_ms: f64) {
        self.pending = Some((width, height));
        self.deadline = now_ms + self.quiet_ms;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The coalesced size, once the quiet period has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> Option<(f32, f32)> {
        if self.pending.is_some() && now_ms >= self.deadline {
            self.pending.take()
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
