//! Intro and loop timelines built from a computed layout
//!
//! Every ray runs the same chain shift: each ball moves one slot outward,
//! the outermost ball exits and comes back into the first slot. Which ball
//! sits in which slot rotates with every appearance of the ray, so the loop
//! timeline is unrolled until every ray is back to its starting order.

use crate::assets::AssetSource;
use crate::config::{ElementIds, StageConfig, TimingConfig};
use converge_animation::{AnimationPreset, Attribute, Easing, Timeline};
use converge_core::{AssetRef, Point};
use converge_layout::{BallPlacement, RayGeometry, RaySide, SceneLayout};
use rustc_hash::FxHashMap;

/// Percent radius the fan's gradient is clipped to
pub const FAN_CLIP: &str = "clip";

/// Stop angles of the fan's conic gradient, in stop order
pub const FAN_ANGLES: [&str; 6] = [
    "angle-1", "angle-2", "angle-3", "angle-3a", "angle-4", "angle-5",
];

// Morph beats, relative to the morph start
const MORPH_GROW_AT: u32 = 100;
const MORPH_GROW_MS: u32 = 300;
const IMAGE_COLLAPSE_AT: u32 = 200;
const IMAGE_COLLAPSE_MS: u32 = 300;
const IMAGE_SWAP_AT: u32 = 500;
const IMAGE_SPRING_MS: u32 = 300;
const MORPH_SPIN_AT: u32 = 800;
const MORPH_SPIN_MS: u32 = 200;
const MORPH_HIDE_AT: u32 = 1000;
const MORPH_HIDE_MS: u32 = 100;

const MORPH_SCALE: f64 = 1.8;

/// Timelines for one cycle
#[derive(Clone, Debug)]
pub struct CyclePlan {
    /// Plays once
    pub intro: Timeline,
    /// Loops forever once the intro completes
    pub cycle: Timeline,
    /// Loop iterations unrolled into `cycle`
    pub iterations: u32,
    /// Start-to-start distance of unrolled iterations
    pub iteration_ms: u32,
}

/// Build the intro and loop timelines for a layout
pub fn build_plan(config: &StageConfig, layout: &SceneLayout, assets: &dyn AssetSource) -> CyclePlan {
    let intro = build_intro(config, layout);
    let (cycle, iterations, iteration_ms) = build_cycle(config, layout, assets);

    for (name, timeline) in [("intro", &intro), ("cycle", &cycle)] {
        if let Some((a, b)) = timeline.find_overlap() {
            let first = timeline.entry(a);
            let second = timeline.entry(b);
            tracing::warn!(
                timeline = name,
                first = ?first.map(|e| (e.element.as_str(), e.offset_ms)),
                second = ?second.map(|e| (e.element.as_str(), e.offset_ms)),
                "overlapping mutations on one attribute"
            );
        }
    }

    CyclePlan {
        intro,
        cycle,
        iterations,
        iteration_ms,
    }
}

/// Logo pop, staggered line growth, fan burst and ball entrance
pub fn build_intro(config: &StageConfig, layout: &SceneLayout) -> Timeline {
    let timing = &config.timing;
    let ids = &config.elements;
    let mut tl = Timeline::new();

    AnimationPreset::pop_in(&mut tl, &ids.logo, 0, timing.logo_pop_ms);
    AnimationPreset::hide(&mut tl, &ids.morph, 0);

    let mut stagger = 0u32;
    for ray in layout.rays_on(RaySide::Left) {
        if let Some(line) = &ray.element {
            AnimationPreset::grow_width(
                &mut tl,
                line,
                ray.length,
                stagger,
                timing.line_grow_ms,
                Easing::POWER2_OUT,
            );
        }
        stagger = stagger.saturating_add(timing.line_stagger_ms);
    }

    fan_intro(&mut tl, config);

    for ball in &layout.balls {
        tl.set(&ball.id, Attribute::Position, ball.position, 0);
        AnimationPreset::hide(&mut tl, &ball.id, 0);
    }
    AnimationPreset::stagger_scale_in(
        &mut tl,
        layout.balls.iter().map(|ball| &ball.id),
        timing.balls_in_at_ms,
        timing.balls_in_ms,
        timing.balls_stagger_ms,
        Easing::EaseOutExpo,
    );

    tl
}

fn fan_intro(tl: &mut Timeline, config: &StageConfig) {
    let timing = &config.timing;
    let fan = &config.elements.fan;
    let rest = config.fan.rest_angles;
    let burst = config.fan.burst_angles;

    tl.set(fan, Attribute::Custom(FAN_CLIP), 0.0, 0);
    tl.from_to(
        fan,
        Attribute::Custom(FAN_CLIP),
        0.0,
        100.0,
        timing.fan_open_at_ms,
        timing.fan_open_ms,
        Easing::EaseOutExpo,
    );

    for (i, name) in FAN_ANGLES.into_iter().enumerate() {
        let attribute = Attribute::Custom(name);
        tl.set(fan, attribute, rest[i], 0);
        tl.from_to(
            fan,
            attribute,
            rest[i],
            burst[i],
            timing.fan_open_at_ms,
            timing.fan_open_ms,
            Easing::EaseOutExpo,
        );
        tl.from_to(
            fan,
            attribute,
            burst[i],
            rest[i],
            timing.fan_settle_at_ms,
            timing.fan_settle_ms,
            Easing::POWER2_OUT,
        );
    }
}

/// Slot bookkeeping for one ray
struct RayTrack<'a> {
    ray: &'a RayGeometry,
    /// Balls ordered by resting position; index = home slot
    balls: Vec<&'a BallPlacement>,
    rotation: usize,
}

impl<'a> RayTrack<'a> {
    fn new(ray: &'a RayGeometry, layout: &'a SceneLayout) -> Self {
        let mut balls: Vec<_> = layout.balls_on(&ray.id).collect();
        balls.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self {
            ray,
            balls,
            rotation: 0,
        }
    }

    fn len(&self) -> usize {
        self.balls.len()
    }

    fn slot(&self, slot: usize) -> Point {
        self.ray.point_at(self.balls[slot].start)
    }

    /// Ball currently sitting in `slot`
    fn occupant(&self, slot: usize) -> &'a BallPlacement {
        let n = self.len();
        self.balls[(slot + n - self.rotation % n) % n]
    }

    /// Ball that leaves on the next shift
    fn exiting(&self) -> &'a BallPlacement {
        self.occupant(self.len() - 1)
    }

    fn advance(&mut self) {
        self.rotation = (self.rotation + 1) % self.len();
    }
}

/// Build the unrolled loop timeline. Returns the timeline, the number of
/// unrolled iterations and the iteration period.
pub fn build_cycle(
    config: &StageConfig,
    layout: &SceneLayout,
    assets: &dyn AssetSource,
) -> (Timeline, u32, u32) {
    let timing = &config.timing;
    let ids = &config.elements;

    let mut tracks: FxHashMap<&str, RayTrack<'_>> = layout
        .rays
        .iter()
        .map(|ray| (ray.id.as_str(), RayTrack::new(ray, layout)))
        .filter(|(_, track)| !track.balls.is_empty())
        .collect();

    let pairing_count = config.pairings.len() as u32;
    let per_iteration = pairing_count.saturating_mul(timing.cycle_ms);
    let iteration_ms = per_iteration.saturating_add(timing.repeat_delay_ms);
    let iterations = unroll_count(config, &tracks);

    let mut tl = Timeline::new();
    for k in 0..iterations {
        let iteration_start = k.saturating_mul(iteration_ms);
        for (p, pairing) in config.pairings.iter().enumerate() {
            let base = iteration_start.saturating_add((p as u32).saturating_mul(timing.cycle_ms));

            AnimationPreset::pulse(&mut tl, &ids.logo, base, timing.pulse_scale, timing.pulse_half_ms);

            let right_asset = match tracks.get_mut(pairing.right.as_str()) {
                Some(track) => {
                    let asset = assets.asset_for(track.exiting().asset_index);
                    chain_shift(&mut tl, track, base, timing, assets);
                    track.advance();
                    Some(asset)
                }
                None => {
                    tracing::debug!(ray = %pairing.right, "pairing names a ray with no balls");
                    None
                }
            };

            match tracks.get_mut(pairing.left.as_str()) {
                Some(track) => {
                    let left_asset = assets.asset_for(track.exiting().asset_index);
                    chain_shift(&mut tl, track, base, timing, assets);
                    track.advance();
                    let incoming = right_asset.unwrap_or_else(|| left_asset.clone());
                    morph(&mut tl, ids, base.saturating_add(timing.morph_at_ms), left_asset, incoming);
                }
                None => {
                    tracing::debug!(ray = %pairing.left, "pairing names a ray with no balls");
                }
            }
        }
    }

    let unrolled = iterations
        .saturating_sub(1)
        .saturating_mul(iteration_ms)
        .saturating_add(per_iteration);
    tl.extend_to(unrolled);
    tl.set_loop(-1);
    tl.set_repeat_delay(timing.repeat_delay_ms);

    (tl, iterations, iteration_ms)
}

/// Iterations after which every ray's slot rotation is back home
fn unroll_count(config: &StageConfig, tracks: &FxHashMap<&str, RayTrack<'_>>) -> u32 {
    let mut count: u64 = 1;
    for (id, track) in tracks {
        let appearances = config
            .pairings
            .iter()
            .filter(|p| p.left == *id || p.right == *id)
            .count() as u64;
        if appearances == 0 {
            continue;
        }
        let n = track.len() as u64;
        count = lcm(count, n / gcd(n, appearances));
    }

    let cap = u64::from(config.timing.max_unrolled_iterations.max(1));
    if count > cap {
        tracing::debug!(needed = count, cap, "loop unroll capped; ball order will jump on repeat");
        count = cap;
    }
    count as u32
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}

fn chain_shift(
    tl: &mut Timeline,
    track: &RayTrack<'_>,
    base: u32,
    timing: &TimingConfig,
    assets: &dyn AssetSource,
) {
    let n = track.len();
    let shift = timing.shift_ms;
    let ease = Easing::POWER2_IN_OUT;

    for slot in 0..n - 1 {
        let ball = track.occupant(slot);
        tl.from_to(&ball.id, Attribute::Position, track.slot(slot), track.slot(slot + 1), base, shift, ease);
    }

    let exiting = track.exiting();
    let id = &exiting.id;
    let last = track.slot(n - 1);
    let home = track.slot(0);
    let ray = track.ray;

    match ray.side {
        RaySide::Left => {
            tl.from_to(id, Attribute::Position, last, ray.point_at(1.0), base, shift, ease);
            tl.from_to(id, Attribute::Scale, 1.0, 0.0, base, shift, ease);

            let at = base.saturating_add(timing.left_respawn_at_ms);
            let duration = timing.left_respawn_ms;
            tl.from_to(id, Attribute::Position, ray.point_at(0.0), home, at, duration, Easing::POWER2_OUT);
            tl.from_to(id, Attribute::Scale, 0.0, 1.0, at, duration, Easing::POWER2_OUT);
        }
        RaySide::Right => {
            let beyond = ray.point_at(timing.right_overshoot);
            tl.from_to(id, Attribute::Position, last, beyond, base, shift, ease);
            tl.from_to(id, Attribute::Scale, 1.0, 0.0, base, shift, ease);
            tl.from_to(id, Attribute::Opacity, 1.0, 0.0, base, shift, ease);

            let at = base.saturating_add(timing.right_respawn_at_ms);
            tl.set(id, Attribute::Scale, 1.0, at);
            tl.set(id, Attribute::Opacity, 1.0, at);
            tl.set_image(id, assets.asset_for(exiting.asset_index), at);
            tl.from_to(
                id,
                Attribute::Position,
                ray.point_at(0.0),
                home,
                at,
                timing.right_respawn_ms,
                Easing::POWER2_OUT,
            );
        }
    }
}

/// The morph element takes the exiting left ball's image, spins, swaps to
/// the image of the ball about to appear on the right ray and collapses.
fn morph(tl: &mut Timeline, ids: &ElementIds, at: u32, outgoing: AssetRef, incoming: AssetRef) {
    let element = &ids.morph;
    let image = &ids.morph_image;
    let in_out = Easing::POWER2_IN_OUT;

    tl.set_image(image, outgoing, at);
    tl.set(element, Attribute::Opacity, 1.0, at);
    tl.set(element, Attribute::Scale, 1.0, at);
    tl.set(element, Attribute::Rotation, 0.0, at);
    tl.set(image, Attribute::Scale, 1.0, at);
    tl.set(image, Attribute::Rotation, 0.0, at);

    let grow = at.saturating_add(MORPH_GROW_AT);
    tl.from_to(element, Attribute::Scale, 1.0, MORPH_SCALE, grow, MORPH_GROW_MS, in_out);
    tl.from_to(element, Attribute::Rotation, 0.0, 180.0, grow, MORPH_GROW_MS, in_out);

    let collapse = at.saturating_add(IMAGE_COLLAPSE_AT);
    tl.from_to(image, Attribute::Scale, 1.0, 0.0, collapse, IMAGE_COLLAPSE_MS, in_out);
    tl.from_to(image, Attribute::Rotation, 0.0, 720.0, collapse, IMAGE_COLLAPSE_MS, in_out);

    let swap = at.saturating_add(IMAGE_SWAP_AT);
    let spring = Easing::EaseOutBack(1.7);
    tl.set_image(image, incoming, swap);
    tl.from_to(image, Attribute::Scale, 0.0, 1.0, swap, IMAGE_SPRING_MS, spring);
    tl.from_to(image, Attribute::Rotation, 720.0, 0.0, swap, IMAGE_SPRING_MS, spring);

    let spin = at.saturating_add(MORPH_SPIN_AT);
    tl.from_to(element, Attribute::Scale, MORPH_SCALE, 1.0, spin, MORPH_SPIN_MS, Easing::POWER2_OUT);
    tl.from_to(element, Attribute::Rotation, 180.0, 360.0, spin, MORPH_SPIN_MS, Easing::POWER2_OUT);

    let hide = at.saturating_add(MORPH_HIDE_AT);
    tl.from_to(element, Attribute::Opacity, 1.0, 0.0, hide, MORPH_HIDE_MS, Easing::POWER2_IN);
    tl.from_to(element, Attribute::Scale, 1.0, 0.0, hide, MORPH_HIDE_MS, Easing::POWER2_IN);
    tl.from_to(element, Attribute::Rotation, 360.0, 0.0, hide, MORPH_HIDE_MS, Easing::POWER2_IN);
}
