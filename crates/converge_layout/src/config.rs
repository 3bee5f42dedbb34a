//! Declarative scene configuration
//!
//! Describes where the rays start, where they converge and which balls ride
//! on each of them. Every field has a default matching the stock animation,
//! so a TOML file only needs to name what it changes.

use converge_core::ElementId;
use serde::{Deserialize, Serialize};

/// Where the rays converge
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FocalSpec {
    /// Percentages of the container bounds
    Percent { x: f64, y: f64 },
    /// Percentages of a host element's rectangle
    Anchor { element: ElementId, x: f64, y: f64 },
}

impl Default for FocalSpec {
    fn default() -> Self {
        FocalSpec::Percent { x: 50.0, y: 70.0 }
    }
}

/// A ball riding on a ray
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BallConfig {
    pub id: ElementId,
    /// Diameter in pixels
    pub size: f64,
    /// Normalized resting position along the ray
    pub start: f64,
    /// Index handed to the asset source
    pub asset_index: u32,
}

impl BallConfig {
    pub fn new(id: &str, size: f64, start: f64, asset_index: u32) -> Self {
        Self {
            id: ElementId::new(id),
            size,
            start,
            asset_index,
        }
    }
}

/// A ray running from the left edge into the focal point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeftRayConfig {
    pub id: String,
    /// Line element drawn along the ray
    #[serde(default)]
    pub element: Option<ElementId>,
    /// Vertical start on the left edge, percent of container height
    pub start_y_percent: f64,
    pub balls: Vec<BallConfig>,
}

/// A ray leaving the focal point at a fixed angle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RightRayConfig {
    pub id: String,
    #[serde(default)]
    pub element: Option<ElementId>,
    /// Direction in degrees (screen coordinates, negative points up)
    pub angle_deg: f64,
    pub balls: Vec<BallConfig>,
}

/// Ray and ball layout of the whole scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub focal: FocalSpec,
    #[serde(default = "default_left_rays")]
    pub left_rays: Vec<LeftRayConfig>,
    #[serde(default = "default_right_rays")]
    pub right_rays: Vec<RightRayConfig>,
    /// Right ray length as a fraction of the container's longer side
    #[serde(default = "default_right_length_factor")]
    pub right_length_factor: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            focal: FocalSpec::default(),
            left_rays: default_left_rays(),
            right_rays: default_right_rays(),
            right_length_factor: default_right_length_factor(),
        }
    }
}

impl SceneConfig {
    /// Every ball in declaration order: left rays first, then right rays
    pub fn balls(&self) -> impl Iterator<Item = &BallConfig> + '_ {
        self.left_rays
            .iter()
            .flat_map(|ray| ray.balls.iter())
            .chain(self.right_rays.iter().flat_map(|ray| ray.balls.iter()))
    }

    pub fn left_ray(&self, id: &str) -> Option<&LeftRayConfig> {
        self.left_rays.iter().find(|ray| ray.id == id)
    }

    pub fn right_ray(&self, id: &str) -> Option<&RightRayConfig> {
        self.right_rays.iter().find(|ray| ray.id == id)
    }
}

fn default_left_rays() -> Vec<LeftRayConfig> {
    vec![
        LeftRayConfig {
            id: "line1".to_string(),
            element: Some(ElementId::new("line-1")),
            start_y_percent: 10.0,
            balls: vec![
                BallConfig::new("ball-1", 24.0, 0.2, 1),
                BallConfig::new("ball-2", 24.0, 0.45, 2),
                BallConfig::new("ball-3", 24.0, 0.7, 3),
            ],
        },
        LeftRayConfig {
            id: "line2".to_string(),
            element: Some(ElementId::new("line-2")),
            start_y_percent: 25.0,
            balls: vec![BallConfig::new("ball-4", 30.0, 0.3, 4)],
        },
        LeftRayConfig {
            id: "line3".to_string(),
            element: Some(ElementId::new("line-3")),
            start_y_percent: 40.0,
            balls: vec![BallConfig::new("ball-5", 36.0, 0.5, 5)],
        },
    ]
}

fn default_right_rays() -> Vec<RightRayConfig> {
    vec![
        RightRayConfig {
            id: "right-line1".to_string(),
            element: None,
            angle_deg: -18.0,
            balls: vec![
                BallConfig::new("ball-6", 30.0, 0.3, 6),
                BallConfig::new("ball-7", 36.0, 0.5, 7),
            ],
        },
        RightRayConfig {
            id: "right-line2".to_string(),
            element: None,
            angle_deg: -28.0,
            balls: vec![
                BallConfig::new("ball-8", 24.0, 0.2, 8),
                BallConfig::new("ball-9", 24.0, 0.45, 9),
                BallConfig::new("ball-10", 24.0, 0.7, 10),
            ],
        },
    ]
}

fn default_right_length_factor() -> f64 {
    0.9
}
