use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use common::events::{CoreEvent, EventKind, EventSink};
use executor::types::{CancelIntent, ExecutionError, OrderIntent, OrderRouter};

/// Order router that records every intent and can be told to fail the
/// next N submissions.
#[derive(Default)]
pub struct RecordingRouter {
    /// Accepted submissions only.
    pub submissions: Mutex<Vec<OrderIntent>>,
    /// Every submit call, accepted or refused.
    pub attempts: Mutex<Vec<OrderIntent>>,
    pub cancels: Mutex<Vec<CancelIntent>>,
    pub fail_next_submits: AtomicU32,
}

impl RecordingRouter {
    pub fn fail_submissions(&self, n: u32) {
        self.fail_next_submits.store(n, Ordering::SeqCst);
    }

    pub fn submission(&self, index: usize) -> OrderIntent {
        self.submissions.lock().unwrap()[index].clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderRouter for RecordingRouter {
    async fn submit(&self, intent: &OrderIntent) -> Result<(), ExecutionError> {
        self.attempts.lock().unwrap().push(intent.clone());
        let remaining = self.fail_next_submits.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next_submits.store(remaining - 1, Ordering::SeqCst);
            return Err(ExecutionError::Transport("connection refused".into()));
        }
        self.submissions.lock().unwrap().push(intent.clone());
        Ok(())
    }

    async fn cancel(&self, cancel: &CancelIntent) -> Result<(), ExecutionError> {
        self.cancels.lock().unwrap().push(cancel.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<CoreEvent>>,
}

impl RecordingSink {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    pub fn has(&self, kind: EventKind) -> bool {
        self.kinds().contains(&kind)
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: CoreEvent) {
        self.events.lock().unwrap().push(event);
    }
}
