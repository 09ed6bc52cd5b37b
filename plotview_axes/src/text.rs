// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};

use kurbo::{Affine, Point, Rect};
use peniko::Color;
use plotview_imaging::{DrawOp, FontProps, RenderError, Renderer};

use crate::artist::forward_artist_base;
use crate::{Artist, ArtistBase, TransformHandle};

/// A string anchored at a data point.
///
/// The anchor is the start of the baseline. Rotation is counter-clockwise
/// in degrees, as seen on screen.
#[derive(Debug)]
pub struct Text {
    base: ArtistBase,
    position: Cell<Point>,
    text: RefCell<String>,
    font: RefCell<FontProps>,
    rotation: Cell<f64>,
    color: Cell<Color>,
}

impl Text {
    /// Default stacking order for text.
    pub const ZORDER: f64 = 3.0;

    /// Text `s` anchored at `position`.
    pub fn new(position: Point, s: impl Into<String>, transform: TransformHandle) -> Self {
        Self {
            base: ArtistBase::new(transform, Self::ZORDER),
            position: Cell::new(position),
            text: RefCell::new(s.into()),
            font: RefCell::new(FontProps::default()),
            rotation: Cell::new(0.0),
            color: Cell::new(Color::BLACK),
        }
    }

    /// The string.
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Replace the string.
    pub fn set_text(&self, s: impl Into<String>) {
        *self.text.borrow_mut() = s.into();
    }

    /// Font description.
    pub fn font(&self) -> FontProps {
        self.font.borrow().clone()
    }

    /// Replace the font.
    pub fn set_font(&self, font: FontProps) {
        *self.font.borrow_mut() = font;
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation.get()
    }

    /// Set the rotation in degrees.
    pub fn set_rotation(&self, degrees: f64) {
        self.rotation.set(degrees);
    }

    /// Text colour.
    pub fn set_color(&self, color: Color) {
        self.color.set(color);
    }

    fn anchor(&self) -> Point {
        self.base.transform().get() * self.position.get()
    }
}

impl Artist for Text {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let text = self.text();
        if !self.is_visible() || text.is_empty() {
            return Ok(());
        }
        let gc = self.base.gc().with_color(self.color.get());
        renderer.draw(
            &gc,
            DrawOp::Text {
                position: self.anchor(),
                text,
                font: self.font(),
                angle: self.rotation(),
            },
        )
    }

    fn window_extent(&self, renderer: &dyn Renderer) -> Result<Rect, RenderError> {
        let anchor = self.anchor();
        let text = self.text();
        if text.is_empty() {
            return Ok(Rect::from_points(anchor, anchor));
        }
        let m = renderer.text_metrics(&text, &self.font.borrow())?;
        let local = Rect::new(0.0, m.descent - m.height, m.width, m.descent);
        // Screen space is y-down, so a counter-clockwise turn is a negative angle.
        let placement =
            Affine::translate(anchor.to_vec2()) * Affine::rotate(-self.rotation().to_radians());
        Ok(placement.transform_rect_bbox(local))
    }

    forward_artist_base!(base);
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotview_imaging_ref::RecordingRenderer;

    #[test]
    fn extent_uses_renderer_metrics() {
        let text = Text::new(
            Point::new(1.0, 1.0),
            "abcd",
            TransformHandle::new(Affine::scale(10.0)),
        );
        let r = RecordingRenderer::default().with_dpi(72.0);
        let extent = text.window_extent(&r).unwrap();
        assert!((extent.x0 - 10.0).abs() < 1e-9);
        assert!((extent.width() - 24.0).abs() < 1e-9);
        assert!((extent.y0 - 2.0).abs() < 1e-9);
        assert!((extent.y1 - 12.0).abs() < 1e-9);
    }

    #[test]
    fn quarter_turn_stands_the_box_up() {
        let text = Text::new(Point::ZERO, "abcd", TransformHandle::default());
        text.set_rotation(90.0);
        let r = RecordingRenderer::default().with_dpi(72.0);
        let extent = text.window_extent(&r).unwrap();
        assert!((extent.height() - 24.0).abs() < 1e-9);
        assert!((extent.width() - 10.0).abs() < 1e-9);
        // Rotated text runs upwards from the anchor.
        assert!(extent.y1 <= 2.0 + 1e-9);
    }

    #[test]
    fn missing_metrics_are_an_error() {
        let text = Text::new(Point::ZERO, "x", TransformHandle::default());
        let r = RecordingRenderer::default().without_text_metrics();
        assert!(matches!(
            text.window_extent(&r),
            Err(RenderError::TextMetricsUnavailable)
        ));
    }

    #[test]
    fn empty_text_is_not_drawn() {
        let text = Text::new(Point::ZERO, "", TransformHandle::default());
        let mut r = RecordingRenderer::default();
        text.draw(&mut r).unwrap();
        assert!(r.events().is_empty());
    }
}
