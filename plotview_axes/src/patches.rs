// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};

use kurbo::{BezPath, Circle, Point, Rect, Shape};
use peniko::Color;
use plotview_imaging::{RenderError, Renderer, RendererExt};

use crate::artist::forward_artist_base;
use crate::{Artist, ArtistBase, TransformHandle};

/// A filled and/or outlined shape in data coordinates.
#[derive(Debug)]
pub struct Patch {
    base: ArtistBase,
    path: RefCell<BezPath>,
    face: Cell<Option<Color>>,
    edge: Cell<Option<Color>>,
    line_width: Cell<f64>,
}

impl Patch {
    /// Default stacking order for patches.
    pub const ZORDER: f64 = 1.0;

    /// A patch outlining `path`.
    pub fn new(path: BezPath, transform: TransformHandle) -> Self {
        Self {
            base: ArtistBase::new(transform, Self::ZORDER),
            path: RefCell::new(path),
            face: Cell::new(Some(Color::from_rgba8(0x1f, 0x77, 0xb4, 0xff))),
            edge: Cell::new(Some(Color::BLACK)),
            line_width: Cell::new(1.0),
        }
    }

    /// A circle of `radius` data units around `center`.
    pub fn circle(center: Point, radius: f64, transform: TransformHandle) -> Self {
        let tolerance = (radius.abs() * 1e-4).max(1e-9);
        Self::new(Circle::new(center, radius).to_path(tolerance), transform)
    }

    /// An axis-aligned rectangle in data units.
    pub fn rectangle(rect: Rect, transform: TransformHandle) -> Self {
        Self::new(rect.to_path(0.0), transform)
    }

    /// A closed polygon through `points`.
    pub fn polygon(points: &[Point], transform: TransformHandle) -> Self {
        let mut path = BezPath::new();
        if let Some((first, rest)) = points.split_first() {
            path.move_to(*first);
            for p in rest {
                path.line_to(*p);
            }
            path.close_path();
        }
        Self::new(path, transform)
    }

    /// Outline in data coordinates.
    pub fn path(&self) -> BezPath {
        self.path.borrow().clone()
    }

    /// Fill colour, or `None` for an unfilled patch.
    pub fn face_color(&self) -> Option<Color> {
        self.face.get()
    }

    /// Set the fill colour.
    pub fn set_face_color(&self, color: Option<Color>) {
        self.face.set(color);
    }

    /// Edge colour, or `None` for no outline.
    pub fn edge_color(&self) -> Option<Color> {
        self.edge.get()
    }

    /// Set the edge colour.
    pub fn set_edge_color(&self, color: Option<Color>) {
        self.edge.set(color);
    }

    /// Edge width in points.
    pub fn line_width(&self) -> f64 {
        self.line_width.get()
    }

    /// Set the edge width in points.
    pub fn set_line_width(&self, width: f64) {
        self.line_width.set(width);
    }

    fn edge_width(&self) -> f64 {
        if self.edge_color().is_some() {
            self.line_width()
        } else {
            0.0
        }
    }
}

impl Artist for Patch {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        if !self.is_visible() || (self.face_color().is_none() && self.edge_color().is_none()) {
            return Ok(());
        }
        let gc = self
            .base
            .gc()
            .with_color(self.edge_color().unwrap_or(Color::TRANSPARENT))
            .with_line_width(self.edge_width());
        renderer.draw_path(
            &gc,
            self.path(),
            self.base.transform().get(),
            self.face_color(),
        )
    }

    fn window_extent(&self, renderer: &dyn Renderer) -> Result<Rect, RenderError> {
        let mut path = self.path();
        path.apply_affine(self.base.transform().get());
        let pad = renderer.points_to_pixels(self.edge_width()) / 2.0;
        Ok(path.bounding_box().inflate(pad, pad))
    }

    forward_artist_base!(base);
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Affine;
    use plotview_imaging::DrawOp;
    use plotview_imaging_ref::RecordingRenderer;

    #[test]
    fn circle_extent_matches_radius() {
        let patch = Patch::circle(
            Point::new(3.0, 3.0),
            1.0,
            TransformHandle::new(Affine::scale(10.0)),
        );
        patch.set_edge_color(None);
        let extent = patch.window_extent(&RecordingRenderer::default()).unwrap();
        assert!((extent.x0 - 20.0).abs() < 1e-3);
        assert!((extent.y1 - 40.0).abs() < 1e-3);
    }

    #[test]
    fn fill_and_edge_reach_the_renderer() {
        let patch = Patch::rectangle(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            TransformHandle::default(),
        );
        patch.set_face_color(Some(Color::WHITE));
        let clip = Rect::new(0.0, 0.0, 100.0, 100.0);
        patch.set_clip_box(Some(clip));

        let mut r = RecordingRenderer::default();
        patch.draw(&mut r).unwrap();
        let (op, gc) = r.draws().next().expect("one draw");
        assert!(matches!(op, DrawOp::Path { fill: Some(c), .. } if *c == Color::WHITE));
        assert_eq!(gc.color, Color::BLACK);
        assert_eq!(gc.clip_rect, Some(clip));
    }

    #[test]
    fn invisible_patch_draws_nothing() {
        let patch = Patch::polygon(
            &[Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
            TransformHandle::default(),
        );
        patch.set_face_color(None);
        patch.set_edge_color(None);
        let mut r = RecordingRenderer::default();
        patch.draw(&mut r).unwrap();
        assert!(r.events().is_empty());
    }
}
