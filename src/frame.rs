//! Work deferred to the next rendering frame.
//!
//! Every request is stamped with the generation of its kind at scheduling
//! time. A later request of the same kind, or an explicit cancellation, bumps
//! the generation, and stale requests are skipped when the frame runs.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    ScrollIntoView,
    FitPopper,
    FilterCursor,
    AfterLeave,
}

impl TaskKind {
    const ALL: [TaskKind; 4] = [
        TaskKind::ScrollIntoView,
        TaskKind::FitPopper,
        TaskKind::FilterCursor,
        TaskKind::AfterLeave,
    ];

    fn slot(self) -> usize {
        match self {
            TaskKind::ScrollIntoView => 0,
            TaskKind::FitPopper => 1,
            TaskKind::FilterCursor => 2,
            TaskKind::AfterLeave => 3,
        }
    }
}

/// A deferred request with the state it captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameTask {
    /// Bring a row of the total-options sequence into the viewport.
    ScrollIntoView { index: usize },
    /// Size the popup against the anchor control.
    FitPopper,
    /// Settle the cursor after filter text input.
    FilterCursor { target: Option<usize>, filter: String },
    /// The popup finished closing.
    AfterLeave,
}

impl FrameTask {
    pub fn kind(&self) -> TaskKind {
        match self {
            FrameTask::ScrollIntoView { .. } => TaskKind::ScrollIntoView,
            FrameTask::FitPopper => TaskKind::FitPopper,
            FrameTask::FilterCursor { .. } => TaskKind::FilterCursor,
            FrameTask::AfterLeave => TaskKind::AfterLeave,
        }
    }
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    generations: [u64; 4],
    pending: VecDeque<(u64, FrameTask)>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task`, superseding any queued task of the same kind.
    pub fn schedule(&mut self, task: FrameTask) {
        let slot = task.kind().slot();
        self.generations[slot] += 1;
        self.pending.push_back((self.generations[slot], task));
    }

    /// Invalidate queued tasks of `kind`.
    pub fn cancel(&mut self, kind: TaskKind) {
        self.generations[kind.slot()] += 1;
    }

    pub fn cancel_all(&mut self) {
        for kind in TaskKind::ALL {
            self.cancel(kind);
        }
    }

    /// Pop the next task that is still current, discarding stale ones.
    pub fn next_current(&mut self) -> Option<FrameTask> {
        while let Some((generation, task)) = self.pending.pop_front() {
            if generation == self.generations[task.kind().slot()] {
                return Some(task);
            }
            tracing::trace!(?task, "skipping superseded frame task");
        }
        None
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .iter()
            .any(|(generation, task)| *generation == self.generations[task.kind().slot()])
    }
}
