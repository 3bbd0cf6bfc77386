//! User-facing notices.
//!
//! Short leveled messages for the host's log panel. Every notice is also
//! forwarded to the `log` facade at the matching level.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Pending notices, drained by the host.
#[derive(Debug, Default)]
pub struct NoticeLog {
    pending: Vec<Notice>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => log::info!("{}", notice.text),
            NoticeLevel::Warning => log::warn!("{}", notice.text),
            NoticeLevel::Error => log::error!("{}", notice.text),
        }
        self.pending.push(notice);
    }

    pub fn extend(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for n in notices {
            self.push(n);
        }
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    pub fn peek(&self) -> &[Notice] {
        &self.pending
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drain_empties_log() {
        let mut log = NoticeLog::new();
        log.push(Notice::info("a"));
        log.push(Notice::warning("b"));
        assert_eq!(log.peek().len(), 2);
        let drained = log.drain();
        assert_eq!(drained[1], Notice::warning("b"));
        assert!(log.peek().is_empty());
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_string(&Notice::success("done")).unwrap();
        assert_eq!(json, r#"{"level":"success","text":"done"}"#);
    }
}
