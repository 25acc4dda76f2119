use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc::Sender, Arc};

use crate::color::Color;
use crate::model::Model;
use crate::queue::TaskQueue;

use super::tracer;
use super::{PixelResult, RayTask, RenderConfig};

pub struct RenderWorker {
    model: Arc<Model>,
    queue: Arc<TaskQueue<RayTask>>,
    config: RenderConfig,
    result_tx: Sender<PixelResult>,
}

impl RenderWorker {
    pub(super) fn new(
        model: Arc<Model>,
        queue: Arc<TaskQueue<RayTask>>,
        config: RenderConfig,
        result_tx: Sender<PixelResult>,
    ) -> RenderWorker {
        RenderWorker {
            model,
            queue,
            config,
            result_tx,
        }
    }

    /// Pull tasks until the queue drains. A panicking task only loses
    /// its own pixel, the worker keeps going.
    pub fn run(&self) {
        let mut node_stack = Vec::new();
        while let Some(task) = self.queue.next() {
            let traced = panic::catch_unwind(AssertUnwindSafe(|| {
                tracer::trace(&task.ray, &self.model, &self.config, 0, &mut node_stack)
            }));
            let color = match traced {
                Ok(color) => color,
                Err(_) => {
                    eprintln!("Trace of pixel ({}, {}) panicked", task.col, task.row);
                    // The unwind may have left a partial traversal behind
                    node_stack.clear();
                    Color::new(1.0, 0.0, 1.0)
                }
            };
            self.result_tx
                .send(PixelResult {
                    col: task.col,
                    row: task.row,
                    color,
                })
                .expect("Receiver closed!");
        }
    }
}
