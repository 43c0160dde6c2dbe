use std::time::{Duration, Instant};

/// Debounced editor buffer for a task description.
///
/// Every edit pushes the save deadline back by `delay`; [`DescriptionAutosave::poll`]
/// hands out the text once the user has been idle long enough.
#[derive(Debug, Clone)]
pub struct DescriptionAutosave {
    task_id: u64,
    delay: Duration,
    saved: String,
    draft: String,
    deadline: Option<Instant>,
}

impl DescriptionAutosave {
    pub fn new(task_id: u64, initial: impl Into<String>, delay: Duration) -> Self {
        let initial = initial.into();
        Self {
            task_id,
            delay,
            saved: initial.clone(),
            draft: initial,
            deadline: None,
        }
    }

    pub fn task_id(&self) -> u64 {
        self.task_id
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.saved
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.draft.push(c);
        self.deadline = Some(now + self.delay);
    }

    pub fn backspace(&mut self, now: Instant) {
        self.draft.pop();
        self.deadline = Some(now + self.delay);
    }

    /// Returns the draft to save if the quiet period is over and something changed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.is_dirty().then(|| self.draft.clone())
            }
            _ => None,
        }
    }

    /// Closing the editor saves immediately instead of waiting out the timer.
    pub fn flush(&mut self) -> Option<String> {
        self.deadline = None;
        self.is_dirty().then(|| self.draft.clone())
    }

    pub fn mark_saved(&mut self, text: &str) {
        self.saved = text.to_string();
    }

    /// Server sent a fresh copy; adopt it unless the user has unsaved edits.
    pub fn reset(&mut self, text: &str) {
        if !self.is_dirty() && self.deadline.is_none() {
            self.draft = text.to_string();
        }
        self.saved = text.to_string();
    }
}
