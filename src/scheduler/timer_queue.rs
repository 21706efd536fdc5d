use super::Task;

pub struct TimerTask {
    pub id: u64,
    pub due_at: u64,
    pub task: Task,
}

/// One-shot timer tasks keyed by virtual due time.
#[derive(Default)]
pub struct TimerQueue {
    timers: Vec<TimerTask>,
}

impl TimerQueue {
    pub fn add(&mut self, timer: TimerTask) {
        self.timers.push(timer);
    }

    /// Ids are unique, so a cleared timer is dropped outright.
    pub fn clear(&mut self, id: u64) {
        self.timers.retain(|timer| timer.id != id);
    }

    pub fn next_ready_index(&self, now_ms: u64) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (idx, timer) in self.timers.iter().enumerate() {
            if timer.due_at > now_ms {
                continue;
            }
            match best {
                Some((_, best_due)) if timer.due_at >= best_due => {}
                _ => best = Some((idx, timer.due_at)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub fn next_due_time(&self) -> Option<u64> {
        self.timers.iter().map(|timer| timer.due_at).min()
    }

    pub fn take(&mut self, idx: usize) -> TimerTask {
        self.timers.remove(idx)
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
