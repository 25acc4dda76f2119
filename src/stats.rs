use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use prettytable::{cell, Row, Table};

use crate::Float;

// Helper trait to print out Float type used
trait FloatName {
    fn float_name() -> String;
}

impl FloatName for f32 {
    fn float_name() -> String {
        "f32".to_string()
    }
}

impl FloatName for f64 {
    fn float_name() -> String {
        "f64".to_string()
    }
}

lazy_static::lazy_static! {
    static ref STATS: Mutex<Statistics> = Mutex::new(Statistics::new());
}

static RAY_COUNT: AtomicUsize = AtomicUsize::new(0);

macro_rules! stats {
    () => {
        STATS.lock().unwrap()
    };
}

pub fn count_ray() {
    RAY_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn ray_count() -> usize {
    RAY_COUNT.load(Ordering::Relaxed)
}

pub fn reset_rays() {
    RAY_COUNT.store(0, Ordering::Relaxed);
}

pub fn time(name: &str) -> TimerHandle {
    stats!().start_timer(name)
}

fn stop_timer(name: &str) {
    stats!().stop_timer(name);
}

pub fn record_index(n_tris: usize, n_nodes: usize) {
    let mut stats = stats!();
    stats.n_tris += n_tris;
    stats.index_size += n_nodes;
}

pub fn print_and_save(path: &Path) {
    let table = stats!().table();
    table.printstd();
    let mut stats_file = File::create(path).unwrap();
    table.print(&mut stats_file).unwrap();
}

struct Statistics {
    timers: Vec<(Timer, usize)>,
    active_timers: Vec<usize>,
    n_tris: usize,
    index_size: usize,
}

impl Statistics {
    fn new() -> Statistics {
        Statistics {
            timers: Vec::new(),
            active_timers: Vec::new(),
            n_tris: 0,
            index_size: 0,
        }
    }

    fn start_timer(&mut self, name: &str) -> TimerHandle {
        let timer = Timer::new(name);
        let handle = timer.handle();
        self.timers.push((timer, self.active_timers.len()));
        self.active_timers.push(self.timers.len() - 1);
        handle
    }

    fn stop_timer(&mut self, name: &str) {
        if let Some(i) = self.active_timers.pop() {
            let (timer, _) = &mut self.timers[i];
            if timer.name == name {
                timer.stop();
            } else {
                panic!("Timer '{}' not on top of timer stack", name);
            }
        } else {
            panic!(
                "Tried to stop timer '{}' when there are no active timers",
                name
            );
        }
    }

    fn get_timer(&self, name: &str) -> Option<&Timer> {
        for (timer, _) in &self.timers {
            if timer.name == name {
                return Some(timer);
            }
        }
        None
    }

    fn mrps(&self) -> String {
        if let Some(render_timer) = self.get_timer("Render") {
            if let Some(duration) = render_timer.duration {
                let mrps = ray_count() as f64 / duration.as_secs_f64() / 1_000_000.0;
                return format!("{:#.2?}", mrps);
            }
        }
        "-".to_string()
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![cell!("Precision"), cell!(Float::float_name())]));
        for (timer, l) in &self.timers {
            table.add_row(Row::new(vec![
                cell!(format!("{}{}", "| ".repeat(*l), timer.name)),
                cell!(timer.pretty_duration()),
            ]));
        }
        table.add_row(Row::new(vec![cell!("Mrays/s"), cell!(self.mrps())]));
        table.add_row(Row::new(vec![cell!("Rays"), cell!(ray_count())]));
        table.add_row(Row::new(vec![cell!("Triangles"), cell!(self.n_tris)]));
        table.add_row(Row::new(vec![cell!("Index nodes"), cell!(self.index_size)]));
        table
    }
}

#[derive(Clone, Debug)]
pub struct Timer {
    name: String,
    start: Instant,
    duration: Option<Duration>,
}

impl Timer {
    fn new(name: &str) -> Timer {
        Timer {
            name: name.to_string(),
            start: Instant::now(),
            duration: None,
        }
    }

    fn stop(&mut self) {
        assert!(
            self.duration.is_none(),
            "Tried to stop already stopped timer!"
        );
        self.duration = Some(self.start.elapsed());
    }

    fn pretty_duration(&self) -> String {
        if let Some(duration) = &self.duration {
            format!("{:#.2?}", duration)
        } else {
            format!("{:#.2?}", self.start.elapsed())
        }
    }

    fn handle(&self) -> TimerHandle {
        TimerHandle {
            name: self.name.clone(),
            active: true,
        }
    }
}

pub struct TimerHandle {
    name: String,
    active: bool,
}

impl TimerHandle {
    pub fn stop(&mut self) {
        stop_timer(&self.name);
        self.deactivate();
    }

    // Prevent handle from stopping the timer when dropped
    fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if self.active {
            self.stop()
        }
    }
}
