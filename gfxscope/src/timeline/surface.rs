//! Drawing surface abstraction.
//!
//! The timeline core never renders directly; it emits shapes against a
//! [`Surface`]. [`RecordingSurface`] keeps the emitted shapes in order so a
//! front-end can rasterize them and tests can inspect them.

use gfxscope_common::Rgb;

/// Handle of a drawn shape, used to remove it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u64);

/// Drawing primitives consumed by the timeline core.
pub trait Surface {
    fn draw_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
        opacity: Option<f64>,
    ) -> ShapeId;

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Rgb, width: f64)
        -> ShapeId;

    fn draw_circle(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        stroke_width: f64,
        fill: Rgb,
        stroke: Rgb,
    ) -> ShapeId;

    fn draw_text(&mut self, x: f64, y: f64, font_size: f64, content: &str) -> ShapeId;

    /// Remove a previously drawn shape. Unknown ids are ignored.
    fn remove(&mut self, id: ShapeId);
}

/// A recorded drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect { x: f64, y: f64, width: f64, height: f64, color: Rgb, opacity: Option<f64> },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, color: Rgb, width: f64 },
    Circle { cx: f64, cy: f64, radius: f64, stroke_width: f64, fill: Rgb, stroke: Rgb },
    Text { x: f64, y: f64, font_size: f64, content: String },
}

/// Surface that records shapes in drawing order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    shapes: Vec<(ShapeId, Shape)>,
    next_id: u64,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shapes in drawing order (later shapes paint over earlier ones).
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().map(|(_, shape)| shape)
    }

    #[must_use]
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|(sid, _)| *sid == id).map(|(_, shape)| shape)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// All text content, in drawing order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.shapes()
            .filter_map(|shape| match shape {
                Shape::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, shape: Shape) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        self.shapes.push((id, shape));
        id
    }
}

impl Surface for RecordingSurface {
    fn draw_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
        opacity: Option<f64>,
    ) -> ShapeId {
        self.push(Shape::Rect { x, y, width, height, color, opacity })
    }

    fn draw_line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Rgb,
        width: f64,
    ) -> ShapeId {
        self.push(Shape::Line { x1, y1, x2, y2, color, width })
    }

    fn draw_circle(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        stroke_width: f64,
        fill: Rgb,
        stroke: Rgb,
    ) -> ShapeId {
        self.push(Shape::Circle { cx, cy, radius, stroke_width, fill, stroke })
    }

    fn draw_text(&mut self, x: f64, y: f64, font_size: f64, content: &str) -> ShapeId {
        self.push(Shape::Text { x, y, font_size, content: content.to_string() })
    }

    fn remove(&mut self, id: ShapeId) {
        self.shapes.retain(|(sid, _)| *sid != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gfxscope_common::{BAND_COLOR, BLACK};

    #[test]
    fn test_shapes_keep_drawing_order() {
        let mut surface = RecordingSurface::new();
        surface.draw_rect(0.0, 0.0, 10.0, 5.0, BAND_COLOR, None);
        surface.draw_text(1.0, 2.0, 12.0, "label");
        assert_eq!(surface.len(), 2);
        assert!(matches!(surface.shapes().next(), Some(Shape::Rect { .. })));
        assert_eq!(surface.texts(), vec!["label"]);
    }

    #[test]
    fn test_remove_only_affects_target_shape() {
        let mut surface = RecordingSurface::new();
        let keep = surface.draw_line(0.0, 0.0, 0.0, 10.0, BLACK, 1.0);
        let drop = surface.draw_rect(0.0, 0.0, 10.0, 10.0, BLACK, Some(0.1));
        surface.remove(drop);
        surface.remove(drop);
        assert_eq!(surface.len(), 1);
        assert!(surface.get(keep).is_some());
        assert!(surface.get(drop).is_none());
    }
}
