//! Layout computation
//!
//! Turns container bounds plus a [`SceneConfig`] into absolute ray and ball
//! geometry. The result is a fresh value on every call; nothing is cached or
//! mutated in place, so a resize simply produces a new [`SceneLayout`].

use crate::config::{BallConfig, FocalSpec, SceneConfig};
use crate::ray::{RayGeometry, RaySide};
use converge_core::{AnimationError, ElementId, Point, Rect, Size};

/// Host measurements a layout pass depends on
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutInput {
    pub bounds: Size,
    /// Rectangle of the focal anchor element, when the focal point is anchored
    pub anchor_rect: Option<Rect>,
}

impl LayoutInput {
    pub fn new(bounds: Size) -> Self {
        Self {
            bounds,
            anchor_rect: None,
        }
    }

    pub fn with_anchor_rect(mut self, rect: Rect) -> Self {
        self.anchor_rect = Some(rect);
        self
    }
}

/// A ball at its resting slot
#[derive(Clone, Debug, PartialEq)]
pub struct BallPlacement {
    pub id: ElementId,
    /// Id of the ray the ball rides on
    pub ray: String,
    pub side: RaySide,
    pub size: f64,
    pub start: f64,
    pub asset_index: u32,
    pub position: Point,
}

/// Geometry of the whole scene for one bounds snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLayout {
    pub bounds: Size,
    pub focal: Point,
    pub rays: Vec<RayGeometry>,
    pub balls: Vec<BallPlacement>,
}

impl SceneLayout {
    pub fn ray(&self, id: &str) -> Option<&RayGeometry> {
        self.rays.iter().find(|ray| ray.id == id)
    }

    pub fn ball(&self, id: &ElementId) -> Option<&BallPlacement> {
        self.balls.iter().find(|ball| &ball.id == id)
    }

    /// Balls on a ray in declaration order
    pub fn balls_on<'a>(&'a self, ray: &'a str) -> impl Iterator<Item = &'a BallPlacement> + 'a {
        self.balls.iter().filter(move |ball| ball.ray == ray)
    }

    pub fn rays_on(&self, side: RaySide) -> impl Iterator<Item = &RayGeometry> + '_ {
        self.rays.iter().filter(move |ray| ray.side == side)
    }
}

/// Computes scene geometry
pub struct LayoutEngine;

impl LayoutEngine {
    /// Compute the layout for the given bounds.
    ///
    /// Fails with `InvalidBounds` before producing any coordinate when the
    /// container is degenerate, and with `UnattachedTarget` when an anchored
    /// focal point has no rectangle yet.
    pub fn compute(config: &SceneConfig, input: LayoutInput) -> Result<SceneLayout, AnimationError> {
        let bounds = input.bounds;
        if !bounds.is_valid() {
            return Err(AnimationError::InvalidBounds {
                width: bounds.width,
                height: bounds.height,
            });
        }

        let focal = Self::focal_point(&config.focal, input)?;

        let mut rays = Vec::with_capacity(config.left_rays.len() + config.right_rays.len());
        let mut balls = Vec::new();

        for ray_config in &config.left_rays {
            let origin = Point::new(0.0, bounds.height * ray_config.start_y_percent / 100.0);
            let dx = focal.x - origin.x;
            let dy = focal.y - origin.y;

            let ray = RayGeometry {
                id: ray_config.id.clone(),
                side: RaySide::Left,
                element: ray_config.element.clone(),
                origin,
                angle_deg: dy.atan2(dx).to_degrees(),
                length: dx.hypot(dy),
            };
            check_ray(&ray)?;
            place_balls(&ray, &ray_config.balls, &mut balls);
            rays.push(ray);
        }

        let right_length = bounds.max_side() * config.right_length_factor;
        for ray_config in &config.right_rays {
            let ray = RayGeometry {
                id: ray_config.id.clone(),
                side: RaySide::Right,
                element: ray_config.element.clone(),
                origin: focal,
                angle_deg: ray_config.angle_deg,
                length: right_length,
            };
            check_ray(&ray)?;
            place_balls(&ray, &ray_config.balls, &mut balls);
            rays.push(ray);
        }

        if let Some(ball) = balls.iter().find(|ball| !ball.position.is_finite()) {
            return Err(AnimationError::NonFiniteGeometry(ball.id.to_string()));
        }

        tracing::trace!(
            width = bounds.width,
            height = bounds.height,
            focal_x = focal.x,
            focal_y = focal.y,
            rays = rays.len(),
            "layout computed"
        );

        Ok(SceneLayout {
            bounds,
            focal,
            rays,
            balls,
        })
    }

    fn focal_point(spec: &FocalSpec, input: LayoutInput) -> Result<Point, AnimationError> {
        match spec {
            FocalSpec::Percent { x, y } => {
                let point = input.bounds.at_percent(*x, *y);
                if !point.is_finite() {
                    return Err(AnimationError::NonFiniteGeometry("focal".to_string()));
                }
                Ok(point)
            }
            FocalSpec::Anchor { element, x, y } => {
                let rect = input
                    .anchor_rect
                    .ok_or_else(|| AnimationError::UnattachedTarget(element.clone()))?;
                let point = rect.at_percent(*x, *y);
                if !point.is_finite() {
                    return Err(AnimationError::InvalidBounds {
                        width: rect.width(),
                        height: rect.height(),
                    });
                }
                Ok(point)
            }
        }
    }
}

fn check_ray(ray: &RayGeometry) -> Result<(), AnimationError> {
    if ray.origin.is_finite() && ray.angle_deg.is_finite() && ray.length.is_finite() {
        Ok(())
    } else {
        Err(AnimationError::NonFiniteGeometry(ray.id.clone()))
    }
}

fn place_balls(ray: &RayGeometry, configs: &[BallConfig], out: &mut Vec<BallPlacement>) {
    out.extend(configs.iter().map(|ball| BallPlacement {
        id: ball.id.clone(),
        ray: ray.id.clone(),
        side: ray.side,
        size: ball.size,
        start: ball.start,
        asset_index: ball.asset_index,
        position: ray.point_at(ball.start),
    }));
}
