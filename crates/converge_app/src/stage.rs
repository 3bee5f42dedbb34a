//! Host-facing lifecycle
//!
//! The stage ties layout, choreography and sequencing to the host's mount,
//! resize and frame callbacks. Every (re)start follows the same order:
//! cancel the running cycle, recompute layout, place elements statically,
//! build timelines, start a new cycle.

use crate::assets::AssetSource;
use crate::choreography::{build_plan, FAN_ANGLES, FAN_CLIP};
use crate::config::StageConfig;
use crate::sequencer::{CycleHandle, CycleState, Sequencer};
use converge_animation::{Attribute, RenderTarget, Value, Write};
use converge_core::{ElementId, HostEvent};
use converge_layout::{FocalSpec, LayoutEngine, LayoutInput, RaySide, SceneLayout};

/// The animation as the host sees it
pub struct Stage<A> {
    config: StageConfig,
    assets: A,
    sequencer: Sequencer,
    layout: Option<SceneLayout>,
    handle: Option<CycleHandle>,
    attached: bool,
}

impl<A: AssetSource> Stage<A> {
    pub fn new(config: StageConfig, assets: A) -> Self {
        Self {
            config,
            assets,
            sequencer: Sequencer::new(),
            layout: None,
            handle: None,
            attached: false,
        }
    }

    /// The render tree is ready; start the animation
    pub fn attach(&mut self, target: &mut dyn RenderTarget) {
        tracing::debug!("stage attached");
        self.attached = true;
        self.restart(target);
    }

    /// The render tree is going away. No write happens until the next attach.
    pub fn detach(&mut self) {
        tracing::debug!("stage detached");
        self.cancel_cycle();
        self.attached = false;
        self.layout = None;
        self.sequencer.reset_values();
    }

    /// Container bounds changed; rebuild everything from the new size
    pub fn on_resize(&mut self, target: &mut dyn RenderTarget) {
        if !self.attached {
            return;
        }
        tracing::debug!(
            width = target.bounds().width,
            height = target.bounds().height,
            "stage resized"
        );
        self.restart(target);
    }

    /// Route a host lifecycle event
    pub fn dispatch(&mut self, event: HostEvent, target: &mut dyn RenderTarget) {
        match event {
            HostEvent::Mount => self.attach(target),
            HostEvent::Unmount => self.detach(),
            HostEvent::Resize(_) => self.on_resize(target),
        }
    }

    /// Advance the animation by one host frame
    pub fn frame(&mut self, dt_ms: f64, target: &mut dyn RenderTarget) {
        if !self.attached {
            return;
        }
        if self.layout.is_none() {
            self.restart(target);
            if self.layout.is_none() {
                return;
            }
        }
        self.sequencer.tick(dt_ms, target);
    }

    pub fn state(&self) -> CycleState {
        self.sequencer.state()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn layout(&self) -> Option<&SceneLayout> {
        self.layout.as_ref()
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    fn cancel_cycle(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.sequencer.cancel(handle);
        }
    }

    fn restart(&mut self, target: &mut dyn RenderTarget) {
        self.cancel_cycle();
        self.layout = None;

        let mut input = LayoutInput::new(target.bounds());
        if let FocalSpec::Anchor { element, .. } = &self.config.scene.focal {
            input.anchor_rect = target.element_rect(element);
        }

        let layout = match LayoutEngine::compute(&self.config.scene, input) {
            Ok(layout) => layout,
            Err(err) => {
                tracing::debug!(%err, "layout skipped");
                return;
            }
        };

        self.place(target, &layout);
        let plan = build_plan(&self.config, &layout, &self.assets);
        self.handle = Some(self.sequencer.start(plan));
        self.layout = Some(layout);

        // Intro entries at time zero hide what `place` just showed
        self.sequencer.tick(0.0, target);
    }

    /// Resting placement of every element, applied before any timeline runs
    fn place(&mut self, target: &mut dyn RenderTarget, layout: &SceneLayout) {
        let ids = &self.config.elements;
        let mut writes: Vec<(ElementId, Write)> = Vec::new();

        for id in [&ids.logo, &ids.fan, &ids.morph] {
            writes.push((id.clone(), position(layout.focal)));
        }
        writes.push((
            ids.morph_image.clone(),
            Write::Image(self.assets.asset_for(1)),
        ));
        writes.push((
            ids.fan.clone(),
            Write::Attribute(Attribute::Custom(FAN_CLIP), Value::Scalar(100.0)),
        ));
        for (name, angle) in FAN_ANGLES.into_iter().zip(self.config.fan.rest_angles) {
            writes.push((
                ids.fan.clone(),
                Write::Attribute(Attribute::Custom(name), Value::Scalar(angle)),
            ));
        }

        for ray in layout.rays_on(RaySide::Left) {
            let Some(line) = &ray.element else {
                continue;
            };
            writes.push((line.clone(), position(ray.origin)));
            writes.push((line.clone(), scalar(Attribute::Rotation, ray.angle_deg)));
            writes.push((line.clone(), scalar(Attribute::Width, ray.length)));
        }

        for ball in &layout.balls {
            let id = &ball.id;
            writes.push((id.clone(), position(ball.position)));
            writes.push((id.clone(), scalar(Attribute::Width, ball.size)));
            writes.push((id.clone(), scalar(Attribute::Height, ball.size)));
            writes.push((id.clone(), scalar(Attribute::Scale, 1.0)));
            writes.push((id.clone(), scalar(Attribute::Opacity, 1.0)));
            writes.push((id.clone(), Write::Image(self.assets.asset_for(ball.asset_index))));
        }

        let mut missed = 0usize;
        for (id, write) in writes {
            if self.sequencer.apply(target, &id, write).is_err() {
                missed += 1;
            }
        }
        if missed > 0 {
            tracing::trace!(missed, "static placement skipped unattached elements");
        }
    }
}

fn position(point: converge_core::Point) -> Write {
    Write::Attribute(Attribute::Position, Value::Point(point))
}

fn scalar(attribute: Attribute, value: f64) -> Write {
    Write::Attribute(attribute, Value::Scalar(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::BundledAssets;
    use crate::recording::RecordingTarget;
    use converge_core::{Point, Rect, Size};

    fn ids() -> Vec<String> {
        let mut ids: Vec<String> = [
            "center-logo",
            "morph-element",
            "morph-image",
            "new-conic-rays",
            "line-1",
            "line-2",
            "line-3",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        ids.extend((1..=10).map(|n| format!("ball-{n}")));
        ids
    }

    fn stage() -> Stage<BundledAssets> {
        Stage::new(StageConfig::default(), BundledAssets::default())
    }

    #[test]
    fn test_attach_places_and_starts() {
        let mut target = RecordingTarget::with_elements(Size::new(1000.0, 800.0), ids());
        let mut stage = stage();
        stage.attach(&mut target);

        assert_eq!(stage.state(), CycleState::Intro);
        let line = target.get("line-1").unwrap();
        assert_eq!(line.position, Some(Point::new(0.0, 80.0)));
        assert!((line.rotation.unwrap() - 43.83).abs() < 0.01);
        let ball = target.get("ball-4").unwrap();
        assert_eq!(ball.width, Some(30.0));
        assert_eq!(ball.image.as_ref().map(|a| a.as_str()), Some("/images/B4.svg"));
        assert_eq!(target.get("center-logo").unwrap().position, Some(Point::new(500.0, 560.0)));
    }

    #[test]
    fn test_attach_starts_hidden_before_first_frame() {
        let mut target = RecordingTarget::with_elements(Size::new(1000.0, 800.0), ids());
        let mut stage = stage();
        stage.attach(&mut target);

        let ball = target.get("ball-1").unwrap();
        assert_eq!((ball.scale, ball.opacity), (Some(0.0), Some(0.0)));
        assert!(!ball.is_visible());
        assert_eq!(target.get("line-3").unwrap().width, Some(0.0));
        assert_eq!(target.get("new-conic-rays").unwrap().custom.get(FAN_CLIP), Some(&0.0));
        assert!(!target.get("morph-element").unwrap().is_visible());
        let logo_scale = target.get("center-logo").and_then(|e| e.scale).unwrap();
        assert!(logo_scale.abs() < 1e-9);

        // Positions from static placement survive
        assert_eq!(target.get("ball-1").unwrap().position, stage.layout().map(|l| l.balls[0].position));
    }

    #[test]
    fn test_frames_before_attach_do_nothing() {
        let mut target = RecordingTarget::with_elements(Size::new(1000.0, 800.0), ids());
        let mut stage = stage();
        stage.frame(16.0, &mut target);
        assert_eq!(target.total_writes(), 0);
        assert_eq!(stage.state(), CycleState::Idle);
    }

    #[test]
    fn test_anchored_focal_waits_for_rect() {
        let mut config = StageConfig::default();
        config.scene.focal = FocalSpec::Anchor {
            element: ElementId::new("center-logo"),
            x: 20.0,
            y: 50.0,
        };
        let mut stage = Stage::new(config, BundledAssets::default());
        let mut target = RecordingTarget::with_elements(Size::new(1000.0, 800.0), ids());

        stage.attach(&mut target);
        assert!(stage.layout().is_none());
        assert_eq!(target.total_writes(), 0);

        target.set_rect("center-logo", Rect::new(450.0, 500.0, 100.0, 100.0));
        stage.frame(16.0, &mut target);
        assert_eq!(stage.layout().map(|l| l.focal), Some(Point::new(470.0, 550.0)));
        assert_eq!(stage.state(), CycleState::Intro);
    }

    #[test]
    fn test_dispatch_routes_events() {
        let mut target = RecordingTarget::with_elements(Size::new(1000.0, 800.0), ids());
        let mut stage = stage();

        stage.dispatch(HostEvent::Mount, &mut target);
        assert!(stage.is_attached());

        stage.dispatch(HostEvent::Unmount, &mut target);
        assert!(!stage.is_attached());
        assert_eq!(stage.state(), CycleState::Cancelled);
    }
}
