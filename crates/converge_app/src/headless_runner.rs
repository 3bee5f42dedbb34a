//! Scenario runner that drives a stage against a recording target.

use crate::assets::{AssetSource, BundledAssets};
use crate::config::StageConfig;
use crate::headless_assert::{
    evaluate_assert_hidden, evaluate_assert_position, evaluate_assert_state,
    evaluate_assert_visible, state_name, AssertionResult,
};
use crate::headless_report::{HeadlessReport, RunStats};
use crate::headless_runtime::{HeadlessRunConfig, HeadlessRuntime};
use crate::headless_scenario::{HeadlessScenario, ScenarioStep};
use crate::recording::RecordingTarget;
use crate::stage::Stage;
use anyhow::Result;
use converge_core::{ElementId, HostEvent, Size};

/// Final outcome of a scenario run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Passed { report: HeadlessReport },
    Failed { report: HeadlessReport },
}

impl RunOutcome {
    pub fn report(&self) -> &HeadlessReport {
        match self {
            RunOutcome::Passed { report } => report,
            RunOutcome::Failed { report } => report,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// A stage wired to an in-memory target with every configured element attached.
pub struct HeadlessSession<A> {
    pub stage: Stage<A>,
    pub target: RecordingTarget,
    elapsed_frames: u64,
    elapsed_ms: u64,
}

impl<A: AssetSource> HeadlessSession<A> {
    pub fn new(config: StageConfig, assets: A, bounds: Size) -> Self {
        let target = RecordingTarget::with_elements(bounds, element_ids(&config));
        Self {
            stage: Stage::new(config, assets),
            target,
            elapsed_frames: 0,
            elapsed_ms: 0,
        }
    }

    pub fn dispatch(&mut self, event: HostEvent) {
        if let HostEvent::Resize(size) = event {
            self.target.set_bounds(size);
        }
        self.stage.dispatch(event, &mut self.target);
    }

    /// Run `frames` frames of `tick_ms` each
    pub fn run_frames(&mut self, cfg: HeadlessRunConfig, frames: u32) -> Result<()> {
        self.run_timed_frames(cfg, frames, || cfg.tick_ms)
    }

    /// Advance `ms` of logical time in frames of at most `tick_ms`
    pub fn wait(&mut self, cfg: HeadlessRunConfig, ms: u64) -> Result<()> {
        let frames = wait_frames(ms, cfg.tick_ms);
        let mut remaining_ms = ms;
        self.run_timed_frames(cfg, frames, || {
            let step_ms = remaining_ms.min(cfg.tick_ms);
            remaining_ms = remaining_ms.saturating_sub(step_ms);
            step_ms
        })
    }

    fn run_timed_frames<T>(&mut self, cfg: HeadlessRunConfig, frames: u32, mut advance_ms: T) -> Result<()>
    where
        T: FnMut() -> u64,
    {
        if frames == 0 {
            return Ok(());
        }

        let mut run_cfg = cfg;
        run_cfg.max_frames = frames;
        let Self {
            stage,
            target,
            elapsed_frames,
            elapsed_ms,
        } = self;

        HeadlessRuntime::run(run_cfg, |_| {
            let dt = advance_ms();
            stage.frame(dt as f64, target);
            *elapsed_frames = elapsed_frames.saturating_add(1);
            *elapsed_ms = elapsed_ms.saturating_add(dt);
        })
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            elapsed_frames: self.elapsed_frames,
            elapsed_ms: self.elapsed_ms,
            writes: self.target.total_writes(),
            non_finite_writes: self.target.total_non_finite_writes(),
        }
    }
}

/// Every element id the stage may write to
pub fn element_ids(config: &StageConfig) -> Vec<ElementId> {
    let ids = &config.elements;
    let mut out = vec![
        ids.logo.clone(),
        ids.morph.clone(),
        ids.morph_image.clone(),
        ids.fan.clone(),
    ];
    let scene = &config.scene;
    out.extend(scene.left_rays.iter().filter_map(|ray| ray.element.clone()));
    out.extend(scene.right_rays.iter().filter_map(|ray| ray.element.clone()));
    out.extend(scene.balls().map(|ball| ball.id.clone()));
    out
}

/// Execute scenario JSON against the stock stage configuration.
pub fn run_scenario(input: &str) -> Result<RunOutcome> {
    let scenario = HeadlessScenario::from_json(input)?;
    run_loaded_scenario(&scenario, HeadlessRunConfig::default(), StageConfig::default())
}

/// Execute scenario JSON with explicit runtime and stage configuration.
pub fn run_scenario_with_config(
    input: &str,
    runtime_cfg: HeadlessRunConfig,
    stage_config: StageConfig,
) -> Result<RunOutcome> {
    let scenario = HeadlessScenario::from_json(input)?;
    run_loaded_scenario(&scenario, runtime_cfg, stage_config)
}

/// Execute a pre-loaded scenario.
pub fn run_loaded_scenario(
    scenario: &HeadlessScenario,
    runtime_cfg: HeadlessRunConfig,
    stage_config: StageConfig,
) -> Result<RunOutcome> {
    runtime_cfg.validate()?;
    stage_config.validate()?;

    let bounds = Size::new(f64::from(runtime_cfg.width), f64::from(runtime_cfg.height));
    let mut session = HeadlessSession::new(stage_config, BundledAssets::default(), bounds);
    if runtime_cfg.attach_on_start {
        session.dispatch(HostEvent::Mount);
    }

    for (step_index, step) in scenario.steps.iter().enumerate() {
        let (assertion, result) = match step {
            ScenarioStep::Wait { ms } => {
                session.wait(runtime_cfg, *ms)?;
                continue;
            }
            ScenarioStep::Tick { frames } => {
                session.run_frames(runtime_cfg, *frames)?;
                continue;
            }
            ScenarioStep::Resize { width, height } => {
                session.dispatch(HostEvent::Resize(Size::new(*width, *height)));
                continue;
            }
            ScenarioStep::Attach => {
                session.dispatch(HostEvent::Mount);
                continue;
            }
            ScenarioStep::Detach => {
                session.dispatch(HostEvent::Unmount);
                continue;
            }
            ScenarioStep::AssertVisible { id } => {
                ("assert_visible", evaluate_assert_visible(id, &session.target))
            }
            ScenarioStep::AssertHidden { id } => {
                ("assert_hidden", evaluate_assert_hidden(id, &session.target))
            }
            ScenarioStep::AssertPosition {
                id,
                x,
                y,
                tolerance,
            } => (
                "assert_position",
                evaluate_assert_position(id, *x, *y, *tolerance, &session.target),
            ),
            ScenarioStep::AssertState { state } => (
                "assert_state",
                evaluate_assert_state(state, session.stage.state()),
            ),
        };

        if let AssertionResult::Failed { message, .. } = result {
            tracing::debug!(step_index, assertion, %message, "scenario assertion failed");
            let report = HeadlessReport::failed(
                assertion,
                step_index,
                message,
                state_name(session.stage.state()),
                session.stats(),
            );
            return Ok(RunOutcome::Failed { report });
        }
    }

    Ok(RunOutcome::Passed {
        report: HeadlessReport::passed(state_name(session.stage.state()), session.stats()),
    })
}

fn wait_frames(wait_ms: u64, tick_ms: u64) -> u32 {
    if wait_ms == 0 {
        return 0;
    }
    let tick = tick_ms.max(1);
    let frames = wait_ms.saturating_add(tick.saturating_sub(1)) / tick;
    frames.min(u32::MAX as u64) as u32
}
