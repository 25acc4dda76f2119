//! Multithreaded render driver.
//!
//! [`render`] turns a camera's pixel grid into one task per pixel, feeds
//! them through a shared [`TaskQueue`] to a pool of workers and collects
//! the traced colors into a [`TracedImage`]. Workers send results over a
//! channel, so each destination slot has exactly one writer.

mod config;
mod render_worker;
mod traced_image;
mod tracer;

use std::sync::{mpsc, Arc};
use std::thread;

use crate::camera::Camera;
use crate::color::Color;
use crate::intersect::Ray;
use crate::model::Model;
use crate::queue::TaskQueue;
use crate::stats;

pub use self::config::RenderConfig;
pub use self::traced_image::TracedImage;

use self::render_worker::RenderWorker;

/// One primary ray and the image slot its color belongs to
pub struct RayTask {
    pub ray: Ray,
    pub col: u32,
    pub row: u32,
}

struct PixelResult {
    col: u32,
    row: u32,
    color: Color,
}

/// Render the full frame and block until every pixel has been traced.
///
/// Every object index must be built before calling this.
pub fn render(model: &Arc<Model>, camera: &Camera, config: &RenderConfig) -> TracedImage {
    for object in model.objects() {
        assert!(
            object.index().is_some(),
            "Object index not built before rendering!"
        );
    }
    let _t = stats::time("Render");
    stats::reset_rays();

    let queue = Arc::new(TaskQueue::new());
    queue.start();
    let (result_tx, result_rx) = mpsc::channel();
    let mut handles = Vec::new();
    for _ in 0..config.n_threads() {
        let worker = RenderWorker::new(
            Arc::clone(model),
            Arc::clone(&queue),
            config.clone(),
            result_tx.clone(),
        );
        handles.push(thread::spawn(move || worker.run()));
    }
    // Workers hold the remaining senders, so the receiver can tell
    // when the last of them has exited
    drop(result_tx);

    for x in camera.umin()..=camera.umax() {
        for y in camera.vmin()..=camera.vmax() {
            let col = (x - camera.umin()) as u32;
            let row = (camera.vmax() - y) as u32;
            queue.push(RayTask {
                ray: camera.ray_through(x, y),
                col,
                row,
            });
        }
    }
    queue.stop();
    for handle in handles {
        handle.join().expect("Render worker panicked!");
    }

    let mut image = TracedImage::empty(camera.width, camera.height);
    for result in result_rx.iter() {
        image.write(result.col, result.row, result.color);
    }
    image
}
