//! Fixed-tick frame loop for headless runs.

use anyhow::{bail, Result};

/// Configuration for deterministic headless frame execution.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessRunConfig {
    /// Container width the run starts with.
    pub width: u32,
    /// Container height the run starts with.
    pub height: u32,
    /// Number of frames to execute.
    pub max_frames: u32,
    /// Logical milliseconds between frames.
    pub tick_ms: u64,
    /// Mount the stage before the first step.
    pub attach_on_start: bool,
}

impl Default for HeadlessRunConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            max_frames: 1,
            tick_ms: 16,
            attach_on_start: true,
        }
    }
}

impl HeadlessRunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("headless dimensions must be non-zero");
        }
        if self.tick_ms == 0 {
            bail!("headless tick_ms must be > 0");
        }
        Ok(())
    }
}

/// Frame context passed to headless frame callbacks.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessContext {
    pub frame_index: u32,
    /// Milliseconds elapsed before this frame within the run.
    pub elapsed_ms: u64,
}

/// Deterministic headless runtime loop.
pub struct HeadlessRuntime;

impl HeadlessRuntime {
    /// Run a fixed frame budget in headless mode.
    pub fn run<F>(cfg: HeadlessRunConfig, mut on_frame: F) -> Result<()>
    where
        F: FnMut(&HeadlessContext),
    {
        cfg.validate()?;
        if cfg.max_frames == 0 {
            bail!("headless max_frames must be > 0");
        }

        for frame in 0..cfg.max_frames {
            on_frame(&HeadlessContext {
                frame_index: frame,
                elapsed_ms: cfg.tick_ms.saturating_mul(frame as u64),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_exact_frame_budget() {
        let cfg = HeadlessRunConfig {
            max_frames: 5,
            tick_ms: 20,
            ..HeadlessRunConfig::default()
        };
        let mut seen = Vec::new();
        HeadlessRuntime::run(cfg, |ctx| seen.push(ctx.elapsed_ms)).unwrap();
        assert_eq!(seen, vec![0, 20, 40, 60, 80]);
    }

    #[test]
    fn test_rejects_degenerate_config() {
        let zero_tick = HeadlessRunConfig {
            tick_ms: 0,
            ..HeadlessRunConfig::default()
        };
        assert!(HeadlessRuntime::run(zero_tick, |_| {}).is_err());

        let no_frames = HeadlessRunConfig {
            max_frames: 0,
            ..HeadlessRunConfig::default()
        };
        assert!(HeadlessRuntime::run(no_frames, |_| {}).is_err());
    }
}
