//! engine::mock
//!
//! In-memory collaborators for deterministic testing.
//!
//! # Design
//!
//! [`MockBackend`] behaves like a tiny repository: mutations move a fake
//! HEAD and prepend reflog entries the way git would, so ledger growth after
//! an undo step can be observed. Every call is recorded, and any primitive
//! can be made to fail via [`FailOn`].
//!
//! # Example
//!
//! ```
//! use rewind::engine::mock::{MockBackend, MockOperation};
//! use rewind::engine::traits::{Backend, HistorySource};
//!
//! let mut backend = MockBackend::with_history(&["commit: b", "commit: a"]);
//! backend.checkout("main").unwrap();
//!
//! assert_eq!(backend.fetch_history().unwrap().len(), 3);
//! assert_eq!(
//!     backend.operations(),
//!     &[MockOperation::Checkout { target: "main".into() }]
//! );
//! ```

use std::collections::HashMap;

use crate::core::types::{HistoryEntry, Oid, ResetMode};
use crate::engine::ledger::UndoContext;
use crate::engine::traits::{Backend, Host, HistorySource, PreviewSlot, Previewer};
use crate::git::GitError;

/// Which primitive should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    FetchHistory,
    Checkout,
    Reset,
    StashSave,
    StashPop,
    Status,
}

/// Recorded mutation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Checkout { target: String },
    Reset { target: Oid, mode: ResetMode },
    StashSave { label: String },
    StashPop { index: usize },
}

/// Fake repository.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    history: Vec<HistoryEntry>,
    head: Option<Oid>,
    dirty: bool,
    stashes: Vec<String>,
    fail_on: Vec<FailOn>,
    operations: Vec<MockOperation>,
    next_oid: u64,
}

impl MockBackend {
    /// Empty repository with a clean tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository whose reflog holds `messages`, newest first. Entry ids are
    /// synthetic and distinct; HEAD points at the newest one.
    pub fn with_history(messages: &[&str]) -> Self {
        let mut backend = Self::new();
        let count = messages.len();
        backend.history = messages
            .iter()
            .enumerate()
            .map(|(n, message)| HistoryEntry::new(synthetic_oid((count - n) as u64), *message))
            .collect();
        backend.next_oid = count as u64 + 1;
        backend.head = backend.history.first().map(|e| e.id.clone());
        backend
    }

    /// Mark the working tree dirty or clean.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Make `primitive` fail from now on.
    pub fn fail_on(&mut self, primitive: FailOn) {
        self.fail_on.push(primitive);
    }

    /// Append a user-made entry at the top of the reflog.
    pub fn record(&mut self, message: &str) -> Oid {
        let id = self.fresh_oid();
        self.push(id.clone(), message);
        id
    }

    /// Mutations performed so far, in order.
    pub fn operations(&self) -> &[MockOperation] {
        &self.operations
    }

    /// Current fake HEAD.
    pub fn head(&self) -> Option<&Oid> {
        self.head.as_ref()
    }

    /// Whether the fake tree is dirty.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Stash labels, newest first.
    pub fn stashes(&self) -> &[String] {
        &self.stashes
    }

    fn check(&self, primitive: FailOn) -> Result<(), GitError> {
        if self.fail_on.contains(&primitive) {
            return Err(GitError::Internal {
                message: format!("injected {:?} failure", primitive),
            });
        }
        Ok(())
    }

    fn fresh_oid(&mut self) -> Oid {
        self.next_oid += 1;
        synthetic_oid(self.next_oid + 1000)
    }

    fn push(&mut self, id: Oid, message: &str) {
        self.head = Some(id.clone());
        self.history.insert(0, HistoryEntry::new(id, message));
    }
}

fn synthetic_oid(n: u64) -> Oid {
    Oid::from_counter(n)
}

impl HistorySource for MockBackend {
    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, GitError> {
        self.check(FailOn::FetchHistory)?;
        Ok(self.history.clone())
    }
}

impl Backend for MockBackend {
    fn checkout(&mut self, target: &str) -> Result<(), GitError> {
        self.operations.push(MockOperation::Checkout {
            target: target.to_string(),
        });
        self.check(FailOn::Checkout)?;
        let from = self
            .head
            .as_ref()
            .map(|h| h.short(7).to_string())
            .unwrap_or_default();
        let id = self.fresh_oid();
        self.push(id, &format!("checkout: moving from {} to {}", from, target));
        Ok(())
    }

    fn reset(&mut self, target: &Oid, mode: ResetMode) -> Result<(), GitError> {
        self.operations.push(MockOperation::Reset {
            target: target.clone(),
            mode,
        });
        self.check(FailOn::Reset)?;
        if mode == ResetMode::Hard {
            self.dirty = false;
        }
        self.push(target.clone(), &format!("reset: moving to {}", target));
        Ok(())
    }

    fn stash_save(&mut self, label: &str) -> Result<(), GitError> {
        self.operations.push(MockOperation::StashSave {
            label: label.to_string(),
        });
        self.check(FailOn::StashSave)?;
        if !self.dirty {
            return Err(GitError::NothingToStash);
        }
        self.dirty = false;
        self.stashes.insert(0, label.to_string());
        Ok(())
    }

    fn stash_pop(&mut self, index: usize) -> Result<(), GitError> {
        self.operations.push(MockOperation::StashPop { index });
        self.check(FailOn::StashPop)?;
        if index >= self.stashes.len() {
            return Err(GitError::RefNotFound {
                refname: format!("stash@{{{}}}", index),
            });
        }
        self.stashes.remove(index);
        self.dirty = true;
        Ok(())
    }

    fn any_tracked_file_dirty(&self) -> Result<bool, GitError> {
        self.check(FailOn::Status)?;
        Ok(self.dirty)
    }
}

/// What a [`RecordingHost`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Error(String),
    Refresh,
}

/// Host that records calls and refreshes a ledger like the real panels do.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub ledger: crate::engine::ledger::Ledger,
    events: Vec<HostEvent>,
}

impl RecordingHost {
    /// Fresh host with an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything the host was asked to do.
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Reported error messages.
    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Error(m) => Some(m.as_str()),
                HostEvent::Refresh => None,
            })
            .collect()
    }

    /// Number of panel refreshes.
    pub fn refreshes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HostEvent::Refresh))
            .count()
    }
}

impl Host for RecordingHost {
    fn report_error(&mut self, message: &str) {
        self.events.push(HostEvent::Error(message.to_string()));
    }

    fn refresh_side_panels(&mut self, source: &dyn HistorySource, ctx: &UndoContext) {
        self.events.push(HostEvent::Refresh);
        match source.fetch_history() {
            Ok(entries) => {
                self.ledger.refresh(entries, ctx);
            }
            Err(e) => self.events.push(HostEvent::Error(e.to_string())),
        }
    }
}

/// A preview request seen by [`MockPreviewer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewRequest {
    Show(Oid, PreviewSlot),
    Message(String, PreviewSlot),
}

/// Previewer that records requests and remembers the live one per slot.
#[derive(Debug, Default)]
pub struct MockPreviewer {
    requests: Vec<PreviewRequest>,
    live: HashMap<PreviewSlot, PreviewRequest>,
}

impl MockPreviewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All requests in order.
    pub fn requests(&self) -> &[PreviewRequest] {
        &self.requests
    }

    /// The request currently owning `slot`.
    pub fn live(&self, slot: PreviewSlot) -> Option<&PreviewRequest> {
        self.live.get(&slot)
    }

    fn push(&mut self, request: PreviewRequest, slot: PreviewSlot) {
        self.live.insert(slot, request.clone());
        self.requests.push(request);
    }
}

impl Previewer for MockPreviewer {
    fn stream_show(&mut self, id: &Oid, slot: PreviewSlot) {
        self.push(PreviewRequest::Show(id.clone(), slot), slot);
    }

    fn show_message(&mut self, message: &str, slot: PreviewSlot) {
        self.push(PreviewRequest::Message(message.to_string(), slot), slot);
    }
}
