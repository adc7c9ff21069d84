//! Per-file dispatch with bounded retry.
//!
//! Each eligible file moves through `pending -> sent` or
//! `pending -> failed`, one file at a time, one recipient at a time. A
//! failed attempt pauses for the backoff interval and tries again; after
//! the attempt budget is spent the file is recorded as failed with the
//! last error seen, and the run moves on. One slow chat never blocks a
//! different recipient for longer than its own files take.

use crate::recipient::Recipient;
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// A send failure. Both kinds are retried the same way; the split keeps
/// the provider's own words apart from transport noise.
#[derive(Debug, Error)]
pub enum SendError {
    /// The API answered and refused
    #[error("{0}")]
    Rejected(String),
    /// The request never completed
    #[error("{0}")]
    Transport(String),
}

/// One outgoing document, ready for the wire.
#[derive(Debug, Clone)]
pub struct OutboundDocument {
    pub path: PathBuf,
    pub file_name: String,
    pub chat_id: String,
    pub caption: String,
}

/// Delivery backend seam. Production talks to the Telegram Bot API;
/// tests use an in-memory mock.
pub trait DocumentTransport {
    fn send_document(&self, doc: &OutboundDocument) -> Result<(), SendError>;
}

/// Retry policy: total attempts per file and the pause between them.
/// The backoff is flat; there is no growth and no budget shared across
/// files.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(2),
        }
    }
}

/// Sleep seam so retry timing is testable without real delay.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Production sleeper; blocks the single worker thread.
#[derive(Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// One file that could not be delivered.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub name: String,
    pub error: String,
}

/// Per-recipient delivery record, in dispatch order.
#[derive(Debug, Clone, Serialize)]
pub struct RecipientOutcome {
    pub name: String,
    pub chat_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub sent: Vec<String>,
    pub failed: Vec<FailedFile>,
}

/// Caption attached to every document: the file name and the send time.
pub fn caption_for(file_name: &str, when: &chrono::DateTime<Local>) -> String {
    format!("{file_name}\n{}", when.format("%Y-%m-%d %H:%M"))
}

/// Send one document, retrying on any failure.
///
/// Attempts are strictly sequential. A failed attempt sleeps one backoff
/// interval before the next; no sleep follows the last attempt. The error
/// returned is the last one captured.
pub fn send_with_retry(
    transport: &dyn DocumentTransport,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
    doc: &OutboundDocument,
) -> Result<(), SendError> {
    let mut last_error = None;
    for attempt in 1..=policy.max_attempts {
        match transport.send_document(doc) {
            Ok(()) => return Ok(()),
            Err(e) => {
                debug!(
                    "attempt {attempt}/{} failed for {}: {e}",
                    policy.max_attempts, doc.file_name
                );
                last_error = Some(e);
                if attempt < policy.max_attempts {
                    sleeper.sleep(policy.backoff);
                }
            }
        }
    }
    Err(last_error.unwrap_or_else(|| SendError::Transport("Max retries exceeded".to_string())))
}

/// Sequential dispatcher over one recipient at a time.
pub struct Dispatcher<'a> {
    pub transport: &'a dyn DocumentTransport,
    pub sleeper: &'a dyn Sleeper,
    pub policy: RetryPolicy,
}

impl Dispatcher<'_> {
    /// Send every file to the recipient's chat and record the outcome.
    ///
    /// Files go out in the order given. A file that exhausts its attempts
    /// lands in `failed` and the next file proceeds; nothing here aborts
    /// the recipient or the run.
    pub fn dispatch_recipient(&self, recipient: &Recipient, files: &[PathBuf]) -> RecipientOutcome {
        let mut outcome = RecipientOutcome {
            name: recipient.display_name(),
            chat_id: recipient.chat_id.clone(),
            role: recipient.role.clone(),
            sent: Vec::new(),
            failed: Vec::new(),
        };

        for path in files {
            let Some(file_name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
            else {
                continue;
            };
            let doc = OutboundDocument {
                path: path.clone(),
                file_name: file_name.clone(),
                chat_id: recipient.chat_id.clone(),
                caption: caption_for(&file_name, &Local::now()),
            };
            match send_with_retry(self.transport, self.sleeper, &self.policy, &doc) {
                Ok(()) => outcome.sent.push(file_name),
                Err(e) => {
                    warn!("giving up on {file_name} for chat {}: {e}", doc.chat_id);
                    outcome.failed.push(FailedFile {
                        name: file_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockState {
        calls: Vec<String>,
        fail_first: usize,
        fail_all: bool,
    }

    /// In-memory transport with failure injection.
    #[derive(Default)]
    struct MockTransport {
        state: Mutex<MockState>,
    }

    impl MockTransport {
        fn failing_first(n: usize) -> Self {
            Self {
                state: Mutex::new(MockState {
                    fail_first: n,
                    ..Default::default()
                }),
            }
        }

        fn failing_all() -> Self {
            Self {
                state: Mutex::new(MockState {
                    fail_all: true,
                    ..Default::default()
                }),
            }
        }

        fn call_count(&self) -> usize {
            self.state.lock().unwrap().calls.len()
        }
    }

    impl DocumentTransport for MockTransport {
        fn send_document(&self, doc: &OutboundDocument) -> Result<(), SendError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(doc.file_name.clone());
            let n = state.calls.len();
            if state.fail_all || n <= state.fail_first {
                Err(SendError::Rejected("Bad Request: chat not found".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        naps: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn nap_count(&self) -> usize {
            self.naps.lock().unwrap().len()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.naps.lock().unwrap().push(duration);
        }
    }

    fn doc(name: &str) -> OutboundDocument {
        OutboundDocument {
            path: PathBuf::from(name),
            file_name: name.to_string(),
            chat_id: "123".to_string(),
            caption: format!("{name}\n2026-08-22 10:30"),
        }
    }

    fn recipient() -> Recipient {
        Recipient {
            path: PathBuf::from("A04_SE_123_Naro/20260822"),
            folder_name: "A04_SE_123_Naro".to_string(),
            name: "Naro".to_string(),
            chat_id: "123".to_string(),
            role: Some("SE".to_string()),
            area: Some("A04".to_string()),
        }
    }

    #[test]
    fn test_first_attempt_success_never_sleeps() {
        let transport = MockTransport::default();
        let sleeper = RecordingSleeper::default();

        let result = send_with_retry(&transport, &sleeper, &RetryPolicy::default(), &doc("a.xlsx"));
        assert!(result.is_ok());
        assert_eq!(transport.call_count(), 1);
        assert_eq!(sleeper.nap_count(), 0);
    }

    #[test]
    fn test_fail_once_then_succeed() {
        let transport = MockTransport::failing_first(1);
        let sleeper = RecordingSleeper::default();

        let result = send_with_retry(&transport, &sleeper, &RetryPolicy::default(), &doc("a.xlsx"));
        assert!(result.is_ok());
        assert_eq!(transport.call_count(), 2);

        let naps = sleeper.naps.lock().unwrap().clone();
        assert_eq!(naps, vec![Duration::from_secs(2)]);
    }

    #[test]
    fn test_persistent_failure_stops_after_budget() {
        let transport = MockTransport::failing_all();
        let sleeper = RecordingSleeper::default();

        let result = send_with_retry(&transport, &sleeper, &RetryPolicy::default(), &doc("a.xlsx"));
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Bad Request: chat not found");
        // Two attempts, one pause between them, none after the last.
        assert_eq!(transport.call_count(), 2);
        assert_eq!(sleeper.nap_count(), 1);
    }

    #[test]
    fn test_zero_attempt_policy_reports_exhaustion() {
        let transport = MockTransport::default();
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy {
            max_attempts: 0,
            backoff: Duration::from_secs(2),
        };

        let err = send_with_retry(&transport, &sleeper, &policy, &doc("a.xlsx")).unwrap_err();
        assert_eq!(err.to_string(), "Max retries exceeded");
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_dispatch_recipient_mixed_results() {
        // First file fails both attempts (2 calls), second file succeeds
        // on its first (call 3).
        let transport = MockTransport::failing_first(2);
        let sleeper = RecordingSleeper::default();
        let dispatcher = Dispatcher {
            transport: &transport,
            sleeper: &sleeper,
            policy: RetryPolicy::default(),
        };

        let files = vec![PathBuf::from("a.xlsx"), PathBuf::from("b.xlsx")];
        let outcome = dispatcher.dispatch_recipient(&recipient(), &files);

        assert_eq!(outcome.name, "Naro (SE)");
        assert_eq!(outcome.chat_id, "123");
        assert_eq!(outcome.sent, vec!["b.xlsx"]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].name, "a.xlsx");
        assert_eq!(outcome.failed[0].error, "Bad Request: chat not found");
        assert_eq!(transport.call_count(), 3);
    }

    #[test]
    fn test_dispatch_recipient_no_files() {
        let transport = MockTransport::default();
        let sleeper = RecordingSleeper::default();
        let dispatcher = Dispatcher {
            transport: &transport,
            sleeper: &sleeper,
            policy: RetryPolicy::default(),
        };

        let outcome = dispatcher.dispatch_recipient(&recipient(), &[]);
        assert!(outcome.sent.is_empty());
        assert!(outcome.failed.is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_caption_format() {
        let when = Local.with_ymd_and_hms(2026, 8, 22, 10, 30, 0).unwrap();
        assert_eq!(
            caption_for("report.xlsx", &when),
            "report.xlsx\n2026-08-22 10:30"
        );
    }
}
