use std::collections::VecDeque;

use super::Task;

/// FIFO queue for the deferral tier settlement and handler runs go through.
#[derive(Default)]
pub struct MicrotaskQueue {
    queue: VecDeque<Task>,
}

impl MicrotaskQueue {
    pub fn enqueue(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    pub fn pop(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
