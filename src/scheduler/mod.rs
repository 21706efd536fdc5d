mod microtask_queue;
mod timer_queue;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub use microtask_queue::MicrotaskQueue;
pub use timer_queue::{TimerQueue, TimerTask};

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// The "run later" capability the deferred core depends on.
///
/// Contract: the task runs strictly after the current call stack unwinds,
/// and tasks scheduled through the same handle run in FIFO order.
pub trait Schedule {
    fn schedule(&self, task: Task);
}

/// Two-tier event loop: a microtask queue (the tier all deferred-value work
/// goes through) and a one-shot timer queue over a virtual millisecond
/// clock. With realtime enabled the loop sleeps until the next due timer;
/// otherwise the clock jumps, which is what the tests drive.
#[derive(Clone)]
pub struct EventLoop {
    inner: Rc<RefCell<LoopState>>,
}

struct LoopState {
    now_ms: u64,
    next_timer_id: u64,
    realtime: bool,
    runtime: Option<tokio::runtime::Runtime>,
    microtasks: MicrotaskQueue,
    timers: TimerQueue,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::new_with_realtime(false)
    }

    pub fn new_with_realtime(realtime: bool) -> Self {
        let runtime = if realtime {
            tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .ok()
        } else {
            None
        };

        Self {
            inner: Rc::new(RefCell::new(LoopState {
                now_ms: 0,
                next_timer_id: 1,
                realtime,
                runtime,
                microtasks: MicrotaskQueue::default(),
                timers: TimerQueue::default(),
            })),
        }
    }

    /// Handle to hand out as the scheduling capability.
    pub fn scheduler(&self) -> Rc<dyn Schedule> {
        Rc::new(self.clone())
    }

    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    pub fn schedule_timer(&self, delay_ms: u64, task: Task) -> u64 {
        let mut state = self.inner.borrow_mut();
        let id = state.next_timer_id;
        state.next_timer_id += 1;
        let due_at = state.now_ms.saturating_add(delay_ms);
        state.timers.add(TimerTask { id, due_at, task });
        id
    }

    pub fn clear_timer(&self, id: u64) {
        self.inner.borrow_mut().timers.clear(id);
    }

    pub fn has_microtasks(&self) -> bool {
        !self.inner.borrow().microtasks.is_empty()
    }

    pub fn has_timers(&self) -> bool {
        !self.inner.borrow().timers.is_empty()
    }

    /// Drain the microtask tier only. Tasks scheduled while draining run in
    /// the same pass.
    pub fn run_microtasks(&self) {
        loop {
            let task = self.inner.borrow_mut().microtasks.pop();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Drive both tiers until nothing is queued: microtasks drain fully
    /// before each timer task fires.
    pub fn run_until_idle(&self) {
        loop {
            self.run_microtasks();
            self.advance_to_next_timer();
            match self.pop_ready_timer() {
                Some(timer) => (timer.task)(),
                None => break,
            }
        }
    }

    fn advance_to_next_timer(&self) {
        let mut state = self.inner.borrow_mut();
        if let Some(next_due) = state.timers.next_due_time() {
            if state.realtime && next_due > state.now_ms {
                let sleep_for = Duration::from_millis(next_due - state.now_ms);
                match &state.runtime {
                    Some(rt) => rt.block_on(async {
                        tokio::time::sleep(sleep_for).await;
                    }),
                    None => std::thread::sleep(sleep_for),
                }
            }
            state.now_ms = next_due;
        }
    }

    fn pop_ready_timer(&self) -> Option<TimerTask> {
        let mut state = self.inner.borrow_mut();
        let now_ms = state.now_ms;
        let idx = state.timers.next_ready_index(now_ms)?;
        Some(state.timers.take(idx))
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Schedule for EventLoop {
    fn schedule(&self, task: Task) {
        self.inner.borrow_mut().microtasks.enqueue(task);
    }
}
