//! Blocking multi-producer multi-consumer task queue.
//!
//! Workers loop on [`TaskQueue::next`], which blocks while the queue is
//! running and empty. After [`TaskQueue::stop`] the remaining tasks are
//! drained and `next` returns `None`, letting workers exit.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    Draining,
}

struct Inner<T> {
    fifo: VecDeque<T>,
    state: State,
}

pub struct TaskQueue<T> {
    inner: Mutex<Inner<T>>,
    task_available: Condvar,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> TaskQueue<T> {
        TaskQueue::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> TaskQueue<T> {
        TaskQueue {
            inner: Mutex::new(Inner {
                fifo: VecDeque::new(),
                state: State::Idle,
            }),
            task_available: Condvar::new(),
        }
    }

    pub fn state(&self) -> State {
        self.inner.lock().unwrap().state
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().fifo.is_empty()
    }

    /// Begin accepting tasks. Calling this on a running queue is a
    /// programmer error and panics.
    pub fn start(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            State::Running => panic!("TaskQueue started twice!"),
            // A finished drain may be restarted for a new batch
            State::Idle | State::Draining => {
                assert!(
                    inner.fifo.is_empty(),
                    "TaskQueue restarted with undrained tasks!"
                );
                inner.state = State::Running;
            }
        }
    }

    /// Enqueue a task and wake one waiting worker.
    /// Panics if the queue is not running.
    pub fn push(&self, task: T) {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != State::Running {
            panic!("Task pushed to a queue that is not running!");
        }
        inner.fifo.push_back(task);
        drop(inner);
        self.task_available.notify_one();
    }

    /// Take the next task. Blocks while the queue is running and empty,
    /// returns `None` once the queue is draining and exhausted.
    pub fn next(&self) -> Option<T> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(task) = inner.fifo.pop_front() {
                return Some(task);
            }
            match inner.state {
                State::Running => inner = self.task_available.wait(inner).unwrap(),
                State::Draining | State::Idle => return None,
            }
        }
    }

    /// Stop accepting new tasks. Queued tasks are still handed out,
    /// and blocked workers are woken so that they can observe the drain.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == State::Running {
            inner.state = State::Draining;
        }
        drop(inner);
        self.task_available.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn delivers_each_task_exactly_once() {
        let n_tasks = 1000;
        let n_threads = 4;
        let queue = Arc::new(TaskQueue::new());
        queue.start();
        let (tx, rx) = mpsc::channel();

        let mut handles = Vec::new();
        for _ in 0..n_threads {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            handles.push(thread::spawn(move || {
                while let Some(task) = queue.next() {
                    tx.send(task).unwrap();
                }
            }));
        }
        drop(tx);

        for i in 0..n_tasks {
            queue.push(i);
        }
        queue.stop();
        for handle in handles {
            handle.join().unwrap();
        }

        let seen: HashSet<u32> = rx.iter().collect();
        assert_eq!(seen.len() as u32, n_tasks);
        assert!(queue.is_empty());
    }

    #[test]
    fn drains_queued_tasks_after_stop() {
        let queue = TaskQueue::new();
        queue.start();
        queue.push(1);
        queue.push(2);
        queue.stop();
        assert_eq!(queue.next(), Some(1));
        assert_eq!(queue.next(), Some(2));
        assert_eq!(queue.next(), None);
        assert_eq!(queue.state(), State::Draining);
    }

    #[test]
    fn can_restart_after_drain() {
        let queue = TaskQueue::new();
        queue.start();
        queue.push(1);
        queue.stop();
        assert_eq!(queue.next(), Some(1));
        queue.start();
        queue.push(2);
        assert_eq!(queue.next(), Some(2));
    }

    #[test]
    #[should_panic(expected = "started twice")]
    fn double_start_panics() {
        let queue: TaskQueue<u32> = TaskQueue::new();
        queue.start();
        queue.start();
    }

    #[test]
    #[should_panic(expected = "not running")]
    fn push_before_start_panics() {
        let queue = TaskQueue::new();
        queue.push(1);
    }

    #[test]
    #[should_panic(expected = "not running")]
    fn push_after_stop_panics() {
        let queue = TaskQueue::new();
        queue.start();
        queue.stop();
        queue.push(1);
    }
}
