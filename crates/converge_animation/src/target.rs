//! Render-target boundary
//!
//! The scheduler never knows what draws the elements. Hosts implement
//! [`RenderTarget`] to hand out capability-typed [`ElementHandle`]s by id;
//! a lookup miss means the element is not attached yet.

use crate::property::{Attribute, Value};
use converge_core::{AnimationError, AssetRef, ElementId, Rect, Size};

/// Mutable visual attributes of one element
pub trait ElementHandle {
    fn set_position(&mut self, position: converge_core::Point);
    fn set_scale(&mut self, scale: f64);
    fn set_opacity(&mut self, opacity: f64);
    fn set_rotation(&mut self, degrees: f64);
    fn set_width(&mut self, width: f64);

    fn set_height(&mut self, _height: f64) {}

    /// Renderer-specific scalar (e.g. a CSS custom property)
    fn set_custom(&mut self, _name: &str, _value: f64) {}

    fn set_image(&mut self, _asset: &AssetRef) {}
}

/// The live render tree as seen by the engine
pub trait RenderTarget {
    /// Current container bounds
    fn bounds(&self) -> Size;

    /// Look up an element by id
    fn element(&mut self, id: &ElementId) -> Option<&mut dyn ElementHandle>;

    /// Bounding rectangle of an element in container coordinates, if known
    fn element_rect(&self, _id: &ElementId) -> Option<Rect> {
        None
    }
}

/// A single write to an element
#[derive(Clone, Debug, PartialEq)]
pub enum Write {
    Attribute(Attribute, Value),
    Image(AssetRef),
}

/// Apply one write to the target.
///
/// Returns `UnattachedTarget` on a lookup miss; the caller decides whether
/// that matters (the scheduler just skips).
pub fn apply_write(
    target: &mut dyn RenderTarget,
    id: &ElementId,
    write: &Write,
) -> Result<(), AnimationError> {
    let Some(handle) = target.element(id) else {
        return Err(AnimationError::UnattachedTarget(id.clone()));
    };

    match write {
        Write::Attribute(attribute, value) => match (attribute, value) {
            (Attribute::Position, Value::Point(p)) => handle.set_position(*p),
            (Attribute::Scale, Value::Scalar(v)) => handle.set_scale(*v),
            (Attribute::Opacity, Value::Scalar(v)) => handle.set_opacity(*v),
            (Attribute::Rotation, Value::Scalar(v)) => handle.set_rotation(*v),
            (Attribute::Width, Value::Scalar(v)) => handle.set_width(*v),
            (Attribute::Height, Value::Scalar(v)) => handle.set_height(*v),
            (Attribute::Custom(name), Value::Scalar(v)) => handle.set_custom(name, *v),
            (attribute, value) => {
                tracing::trace!(
                    element = %id,
                    ?attribute,
                    ?value,
                    "ignoring write with mismatched value kind"
                );
            }
        },
        Write::Image(asset) => handle.set_image(asset),
    }

    Ok(())
}
