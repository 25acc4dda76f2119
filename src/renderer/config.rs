use crate::color::Color;

#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Number of render threads. `None` picks a count from the hardware.
    pub max_threads: Option<usize>,
    /// Recursion limit for reflected and transmitted rays
    pub max_depth: usize,
    /// Color returned for rays that leave the scene
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            max_threads: None,
            max_depth: 4,
            background: Color::black(),
        }
    }
}

impl RenderConfig {
    /// One thread stays free for the coordinator, but always use at
    /// least three workers so small machines still overlap work.
    pub fn n_threads(&self) -> usize {
        self.max_threads
            .unwrap_or_else(|| (num_cpus::get().saturating_sub(1)).max(3))
    }
}
