//! Test utilities for the audit.
//!
//! This module is only available when the `testing` feature is enabled or during tests:
//!
//! ```toml
//! [dev-dependencies]
//! audit = { path = "../audit", features = ["testing"] }
//! ```

use crate::checker::{CheckFailed, ExistenceChecker};
use crate::progress::ProgressReporter;
use std::cell::RefCell;
use std::collections::HashMap;

/// Existence checker answering from a fixed table.
///
/// Pairs that are not in the table fail the check. Every call is recorded.
#[derive(Debug, Default)]
pub struct StaticChecker {
    answers: HashMap<(String, String), Result<bool, CheckFailed>>,
    calls: RefCell<Vec<(String, String)>>,
}

impl StaticChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The media package exists
    pub fn alive(self, tenant: &str, media_package: &str) -> Self {
        self.answer(tenant, media_package, Ok(true))
    }

    /// The media package is gone
    pub fn dead(self, tenant: &str, media_package: &str) -> Self {
        self.answer(tenant, media_package, Ok(false))
    }

    /// The check fails with the given cause
    pub fn failing(self, tenant: &str, media_package: &str, cause: &str) -> Self {
        self.answer(tenant, media_package, Err(CheckFailed::new(cause)))
    }

    fn answer(mut self, tenant: &str, media_package: &str, answer: Result<bool, CheckFailed>) -> Self {
        self.answers
            .insert((tenant.to_string(), media_package.to_string()), answer);
        self
    }

    /// All (tenant, media package) pairs checked so far, in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }
}

impl ExistenceChecker for StaticChecker {
    fn exists(&self, tenant: &str, media_package: &str) -> Result<bool, CheckFailed> {
        let key = (tenant.to_string(), media_package.to_string());
        self.calls.borrow_mut().push(key.clone());
        self.answers.get(&key).cloned().unwrap_or_else(|| {
            Err(CheckFailed::new(format!(
                "no answer configured for {tenant}/{media_package}"
            )))
        })
    }
}

/// One call received by a [`RecordingProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Message(String),
    Progress {
        done: usize,
        total: usize,
        message: Option<String>,
    },
    Notice(String),
}

/// Progress reporter that keeps every call for later assertions.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Vec<ProgressEvent>,
}

impl RecordingProgress {
    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    /// Progress updates as (done, total, message)
    pub fn progress_updates(&self) -> Vec<(usize, usize, Option<String>)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::Progress {
                    done,
                    total,
                    message,
                } => Some((*done, *total, message.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn last_progress(&self) -> Option<(usize, usize, Option<String>)> {
        self.progress_updates().pop()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::Notice(notice) => Some(notice.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn message(&mut self, message: &str) {
        self.events.push(ProgressEvent::Message(message.to_string()));
    }

    fn progress(&mut self, done: usize, total: usize, message: Option<&str>) {
        self.events.push(ProgressEvent::Progress {
            done,
            total,
            message: message.map(str::to_string),
        });
    }

    fn notice(&mut self, message: &str) {
        self.events.push(ProgressEvent::Notice(message.to_string()));
    }
}
