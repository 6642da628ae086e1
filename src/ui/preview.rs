//! ui::preview
//!
//! Background preview of reflog entries.
//!
//! # Design
//!
//! Each [`PreviewSlot`] shows at most one thing. Starting a new preview in a
//! slot aborts the task still streaming there and bumps the slot's
//! generation; a task only publishes its result if its generation is still
//! current, so a superseded render never overwrites a newer one even when it
//! finishes later (the blocking git work itself cannot be interrupted).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::core::types::Oid;
use crate::engine::traits::{PreviewSlot, Previewer};
use crate::git::{Git, GitError};

/// What a slot currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    /// A render is in flight.
    Loading(Oid),
    /// Rendered commit.
    Lines(Vec<String>),
    /// Fixed text.
    Message(String),
    /// The render failed.
    Failed(String),
}

/// Renders one commit. Runs on the blocking pool.
pub type Loader = Arc<dyn Fn(&Oid) -> Result<Vec<String>, GitError> + Send + Sync>;

/// Loader that opens the repository at `work_dir` and renders like `git show`.
pub fn git_loader(work_dir: PathBuf, context_lines: u32) -> Loader {
    Arc::new(move |oid: &Oid| {
        let git = Git::open(&work_dir)?;
        git.show(oid, context_lines)
    })
}

#[derive(Debug)]
struct SlotState {
    generation: u64,
    content: PreviewContent,
}

type Board = Arc<Mutex<HashMap<PreviewSlot, SlotState>>>;

fn lock(board: &Board) -> MutexGuard<'_, HashMap<PreviewSlot, SlotState>> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}

/// [`Previewer`] backed by tokio tasks.
pub struct TaskPreviewer {
    handle: Handle,
    loader: Loader,
    board: Board,
    tasks: HashMap<PreviewSlot, JoinHandle<()>>,
    generation: u64,
}

impl std::fmt::Debug for TaskPreviewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPreviewer")
            .field("generation", &self.generation)
            .field("live_tasks", &self.tasks.len())
            .finish()
    }
}

impl TaskPreviewer {
    /// Create a previewer spawning onto `handle`.
    pub fn new(handle: Handle, loader: Loader) -> Self {
        Self {
            handle,
            loader,
            board: Arc::new(Mutex::new(HashMap::new())),
            tasks: HashMap::new(),
            generation: 0,
        }
    }

    /// Current content of `slot`.
    pub fn content(&self, slot: PreviewSlot) -> Option<PreviewContent> {
        lock(&self.board).get(&slot).map(|s| s.content.clone())
    }

    /// Wait for every live task to finish.
    pub async fn flush(&mut self) {
        for (_, task) in self.tasks.drain() {
            // Aborted tasks report cancellation; nothing to do about it
            let _ = task.await;
        }
    }

    /// Claim `slot` for a new render and return its generation.
    fn supersede(&mut self, slot: PreviewSlot, content: PreviewContent) -> u64 {
        if let Some(task) = self.tasks.remove(&slot) {
            if !task.is_finished() {
                tracing::debug!(slot = slot.as_str(), "preview superseded");
            }
            task.abort();
        }
        self.generation += 1;
        lock(&self.board).insert(
            slot,
            SlotState {
                generation: self.generation,
                content,
            },
        );
        self.generation
    }
}

impl Previewer for TaskPreviewer {
    fn stream_show(&mut self, id: &Oid, slot: PreviewSlot) {
        let generation = self.supersede(slot, PreviewContent::Loading(id.clone()));
        let board = Arc::clone(&self.board);
        let loader = Arc::clone(&self.loader);
        let oid = id.clone();

        let task = self.handle.spawn(async move {
            let rendered = tokio::task::spawn_blocking(move || loader(&oid)).await;
            let content = match rendered {
                Ok(Ok(lines)) => PreviewContent::Lines(lines),
                Ok(Err(e)) => PreviewContent::Failed(e.to_string()),
                Err(e) => PreviewContent::Failed(e.to_string()),
            };

            let mut board = lock(&board);
            match board.get_mut(&slot) {
                Some(state) if state.generation == generation => state.content = content,
                _ => tracing::debug!(slot = slot.as_str(), generation, "stale preview dropped"),
            }
        });
        self.tasks.insert(slot, task);
    }

    fn show_message(&mut self, message: &str, slot: PreviewSlot) {
        self.supersede(slot, PreviewContent::Message(message.to_string()));
    }
}
