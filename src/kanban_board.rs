use std::collections::HashMap;

use crate::task::{Task, TaskStatus};

/// A column move applied locally and waiting for the server to confirm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub task_id: u64,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingMove {
    /// Last status the server is known to hold.
    from: TaskStatus,
    to: TaskStatus,
}

/// Client-side task list split into status columns.
///
/// Moves are optimistic: the card changes column immediately and the previous status is
/// remembered until [`KanbanBoard::confirm`] or [`KanbanBoard::reject`] settles it.
#[derive(Debug, Default)]
pub struct KanbanBoard {
    pub project_id: Option<u64>,
    tasks: Vec<Task>,
    pending: HashMap<u64, PendingMove>,
    pub selected_status: usize,
    pub selected_task: usize,
}

impl KanbanBoard {
    pub fn new(project_id: Option<u64>) -> Self {
        Self {
            project_id,
            tasks: Vec::new(),
            pending: HashMap::new(),
            selected_status: 0,
            selected_task: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn get_tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn is_pending(&self, task_id: u64) -> bool {
        self.pending.contains_key(&task_id)
    }

    /// Swap in a fresh server snapshot. Moves still in flight are re-applied on top so
    /// a refresh that raced the update does not visually undo it.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.pending
            .retain(|id, _| self.tasks.iter().any(|t| t.id == *id));
        for task in &mut self.tasks {
            if let Some(pending) = self.pending.get(&task.id) {
                task.status = pending.to;
            }
        }
        self.clamp_selection();
    }

    /// Insert or replace a single task with the server's copy.
    pub fn upsert(&mut self, mut task: Task) {
        if let Some(pending) = self.pending.get(&task.id) {
            task.status = pending.to;
        }
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
        self.clamp_selection();
    }

    /// Like [`KanbanBoard::upsert`] but ignores tasks that are not on this board.
    pub fn upsert_if_present(&mut self, task: Task) {
        if self.task(task.id).is_some() {
            self.upsert(task);
        }
    }

    pub fn remove_task(&mut self, task_id: u64) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == task_id)?;
        self.pending.remove(&task_id);
        let removed = self.tasks.remove(index);
        self.clamp_selection();
        Some(removed)
    }

    /// Optimistically move a task to `target`. Returns `None` if the task is unknown or
    /// already there, in which case no request should be sent.
    pub fn move_task(&mut self, task_id: u64, target: TaskStatus) -> Option<StatusChange> {
        let task = self.tasks.iter_mut().find(|t| t.id == task_id)?;
        if task.status == target {
            return None;
        }
        let from = task.status;
        task.status = target;

        self.pending
            .entry(task_id)
            .and_modify(|pending| pending.to = target)
            .or_insert(PendingMove { from, to: target });

        Some(StatusChange {
            task_id,
            from,
            to: target,
        })
    }

    /// Server accepted a move. A confirmation for a move that has since been superseded
    /// by another one is ignored.
    pub fn confirm(&mut self, task_id: u64, status: TaskStatus) {
        if let Some(pending) = self.pending.get(&task_id).copied() {
            if pending.to == status {
                self.pending.remove(&task_id);
            } else {
                self.pending.insert(
                    task_id,
                    PendingMove {
                        from: status,
                        to: pending.to,
                    },
                );
            }
        }
    }

    /// Server refused a move: put the card back where the server has it. Returns the
    /// restored status, or `None` when a later move already replaced this one.
    pub fn reject(&mut self, task_id: u64, attempted: TaskStatus) -> Option<TaskStatus> {
        let pending = *self.pending.get(&task_id)?;
        if pending.to != attempted {
            return None;
        }
        self.pending.remove(&task_id);
        let task = self.tasks.iter_mut().find(|t| t.id == task_id)?;
        task.status = pending.from;
        self.clamp_selection();
        Some(pending.from)
    }

    pub fn selected_column(&self) -> TaskStatus {
        TaskStatus::from_index(self.selected_status).unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&Task> {
        self.get_tasks_by_status(self.selected_column())
            .get(self.selected_task)
            .copied()
    }

    /// Keyboard stand-in for dragging the selected card one column left or right.
    pub fn move_selected(&mut self, direction: isize) -> Option<StatusChange> {
        let target = self.selected_column().offset(direction);
        self.move_selected_to(target)
    }

    pub fn move_selected_to(&mut self, target: TaskStatus) -> Option<StatusChange> {
        let task_id = self.selected()?.id;
        let change = self.move_task(task_id, target)?;
        self.follow(task_id);
        Some(change)
    }

    pub fn select_prev_column(&mut self) {
        if self.selected_status > 0 {
            self.selected_status -= 1;
        }
        self.clamp_selection();
    }

    pub fn select_next_column(&mut self) {
        if self.selected_status < TaskStatus::ALL.len() - 1 {
            self.selected_status += 1;
        }
        self.clamp_selection();
    }

    pub fn select_prev_task(&mut self) {
        self.selected_task = self.selected_task.saturating_sub(1);
    }

    pub fn select_next_task(&mut self) {
        let max_tasks = self.get_tasks_by_status(self.selected_column()).len();
        if self.selected_task + 1 < max_tasks {
            self.selected_task += 1;
        }
    }

    fn follow(&mut self, task_id: u64) {
        if let Some(task) = self.task(task_id) {
            let status = task.status;
            self.selected_status = status.index();
            self.selected_task = self
                .get_tasks_by_status(status)
                .iter()
                .position(|t| t.id == task_id)
                .unwrap_or(0);
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.get_tasks_by_status(self.selected_column()).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }
}
