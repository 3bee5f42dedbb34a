//! In-memory render target
//!
//! Records the latest value of every attribute written to each registered
//! element. Used by the headless runner and by tests in place of a real
//! render tree.

use converge_animation::{ElementHandle, RenderTarget};
use converge_core::{AssetRef, ElementId, Point, Rect, Size};
use std::collections::BTreeMap;

/// Everything written to one element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordedElement {
    pub position: Option<Point>,
    pub scale: Option<f64>,
    pub opacity: Option<f64>,
    pub rotation: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub custom: BTreeMap<String, f64>,
    pub image: Option<AssetRef>,
    /// Total writes received
    pub writes: u64,
    /// Writes that carried NaN or infinite values
    pub non_finite_writes: u64,
}

impl RecordedElement {
    /// Unwritten scale and opacity count as fully shown
    pub fn is_visible(&self) -> bool {
        self.scale.unwrap_or(1.0) > 0.0 && self.opacity.unwrap_or(1.0) > 0.0
    }

    fn note(&mut self, finite: bool) {
        self.writes += 1;
        if !finite {
            self.non_finite_writes += 1;
        }
    }
}

impl ElementHandle for RecordedElement {
    fn set_position(&mut self, position: Point) {
        self.note(position.is_finite());
        self.position = Some(position);
    }

    fn set_scale(&mut self, scale: f64) {
        self.note(scale.is_finite());
        self.scale = Some(scale);
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.note(opacity.is_finite());
        self.opacity = Some(opacity);
    }

    fn set_rotation(&mut self, degrees: f64) {
        self.note(degrees.is_finite());
        self.rotation = Some(degrees);
    }

    fn set_width(&mut self, width: f64) {
        self.note(width.is_finite());
        self.width = Some(width);
    }

    fn set_height(&mut self, height: f64) {
        self.note(height.is_finite());
        self.height = Some(height);
    }

    fn set_custom(&mut self, name: &str, value: f64) {
        self.note(value.is_finite());
        self.custom.insert(name.to_string(), value);
    }

    fn set_image(&mut self, asset: &AssetRef) {
        self.note(true);
        self.image = Some(asset.clone());
    }
}

/// A render tree that only remembers
#[derive(Clone, Debug, Default)]
pub struct RecordingTarget {
    bounds: Size,
    elements: BTreeMap<ElementId, RecordedElement>,
    rects: BTreeMap<ElementId, Rect>,
}

impl RecordingTarget {
    pub fn new(bounds: Size) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// A target with the given elements attached
    pub fn with_elements<I, T>(bounds: Size, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ElementId>,
    {
        let mut target = Self::new(bounds);
        for id in ids {
            target.attach(id);
        }
        target
    }

    /// Attach an element so writes to it are accepted
    pub fn attach(&mut self, id: impl Into<ElementId>) {
        self.elements.entry(id.into()).or_default();
    }

    /// Remove an element; writes to it become misses
    pub fn detach(&mut self, id: &ElementId) -> Option<RecordedElement> {
        self.elements.remove(id)
    }

    pub fn set_bounds(&mut self, bounds: Size) {
        self.bounds = bounds;
    }

    pub fn set_rect(&mut self, id: impl Into<ElementId>, rect: Rect) {
        self.rects.insert(id.into(), rect);
    }

    pub fn get(&self, id: &str) -> Option<&RecordedElement> {
        self.elements.get(&ElementId::new(id))
    }

    pub fn elements(&self) -> impl Iterator<Item = (&ElementId, &RecordedElement)> {
        self.elements.iter()
    }

    /// Writes received across all elements
    pub fn total_writes(&self) -> u64 {
        self.elements.values().map(|e| e.writes).sum()
    }

    pub fn total_non_finite_writes(&self) -> u64 {
        self.elements.values().map(|e| e.non_finite_writes).sum()
    }
}

impl RenderTarget for RecordingTarget {
    fn bounds(&self) -> Size {
        self.bounds
    }

    fn element(&mut self, id: &ElementId) -> Option<&mut dyn ElementHandle> {
        self.elements
            .get_mut(id)
            .map(|element| element as &mut dyn ElementHandle)
    }

    fn element_rect(&self, id: &ElementId) -> Option<Rect> {
        self.rects.get(id).copied()
    }
}
