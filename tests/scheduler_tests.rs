use std::cell::RefCell;
use std::rc::Rc;

use promissory::{EventLoop, Schedule};

fn log_task(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Box<dyn FnOnce()> {
    let log = log.clone();
    Box::new(move || log.borrow_mut().push(name))
}

#[test]
fn microtasks_run_in_fifo_order() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    event_loop.schedule(log_task(&log, "a"));
    event_loop.schedule(log_task(&log, "b"));
    event_loop.schedule(log_task(&log, "c"));

    event_loop.run_until_idle();
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
}

#[test]
fn tasks_scheduled_while_draining_run_after_the_queue() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let nested = log_task(&log, "nested");
    let inner_loop = event_loop.clone();
    let log_clone = log.clone();
    event_loop.schedule(Box::new(move || {
        log_clone.borrow_mut().push("outer");
        inner_loop.schedule(nested);
    }));
    event_loop.schedule(log_task(&log, "queued"));

    event_loop.run_until_idle();
    assert_eq!(*log.borrow(), vec!["outer", "queued", "nested"]);
}

#[test]
fn microtasks_run_before_timers() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    event_loop.schedule_timer(0, log_task(&log, "macro"));
    event_loop.schedule(log_task(&log, "micro"));

    event_loop.run_until_idle();
    assert_eq!(*log.borrow(), vec!["micro", "macro"]);
}

#[test]
fn timers_fire_in_due_time_order() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    event_loop.schedule_timer(20, log_task(&log, "later"));
    event_loop.schedule_timer(5, log_task(&log, "soon"));

    event_loop.run_until_idle();
    assert_eq!(*log.borrow(), vec!["soon", "later"]);
}

#[test]
fn cleared_timers_never_fire() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let doomed = event_loop.schedule_timer(5, log_task(&log, "doomed"));
    event_loop.schedule_timer(10, log_task(&log, "kept"));
    event_loop.clear_timer(doomed);

    event_loop.run_until_idle();
    assert_eq!(*log.borrow(), vec!["kept"]);
}

#[test]
fn clearing_the_only_timer_empties_the_queue() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let id = event_loop.schedule_timer(5, log_task(&log, "gone"));
    assert!(event_loop.has_timers());

    event_loop.clear_timer(id);
    assert!(!event_loop.has_timers());

    event_loop.run_until_idle();
    assert!(log.borrow().is_empty());
}

#[test]
fn virtual_clock_advances_to_the_fired_timer() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    event_loop.schedule_timer(20, log_task(&log, "tick"));
    assert_eq!(event_loop.now_ms(), 0);

    event_loop.run_until_idle();
    assert_eq!(event_loop.now_ms(), 20);
    assert_eq!(*log.borrow(), vec!["tick"]);
}

#[test]
fn run_microtasks_leaves_timers_queued() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    event_loop.schedule_timer(5, log_task(&log, "timer"));
    event_loop.schedule(log_task(&log, "micro"));

    event_loop.run_microtasks();
    assert_eq!(*log.borrow(), vec!["micro"]);
    assert!(event_loop.has_timers());

    event_loop.run_until_idle();
    assert_eq!(*log.borrow(), vec!["micro", "timer"]);
}
