// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};

use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape};
use peniko::Color;
use plotview_imaging::{DrawOp, RenderError, Renderer, RendererExt};

use crate::artist::{bbox_of, forward_artist_base};
use crate::{Artist, ArtistBase, TransformHandle};

/// Marker glyph stamped at each vertex of a [`Line2D`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Filled disc.
    Circle,
    /// Filled square.
    Square,
    /// Diagonal cross.
    Cross,
}

impl Marker {
    /// Unit shape centred on the origin, spanning `[-1, 1]` on both axes.
    pub fn path(self) -> BezPath {
        match self {
            Self::Circle => Circle::new(Point::ZERO, 1.0).to_path(1e-3),
            Self::Square => Rect::new(-1.0, -1.0, 1.0, 1.0).to_path(0.0),
            Self::Cross => {
                let mut p = BezPath::new();
                p.move_to((-1.0, -1.0));
                p.line_to((1.0, 1.0));
                p.move_to((-1.0, 1.0));
                p.line_to((1.0, -1.0));
                p
            }
        }
    }
}

/// A polyline through data points, with optional markers.
#[derive(Debug)]
pub struct Line2D {
    base: ArtistBase,
    points: RefCell<Vec<Point>>,
    color: Cell<Color>,
    /// Points.
    line_width: Cell<f64>,
    marker: Cell<Option<Marker>>,
    /// Marker diameter in points.
    marker_size: Cell<f64>,
}

impl Line2D {
    /// Default stacking order for lines.
    pub const ZORDER: f64 = 2.0;

    /// A line through `points`, drawn through `transform`.
    pub fn new(points: Vec<Point>, transform: TransformHandle) -> Self {
        Self {
            base: ArtistBase::new(transform, Self::ZORDER),
            points: RefCell::new(points),
            color: Cell::new(Color::from_rgba8(0x1f, 0x77, 0xb4, 0xff)),
            line_width: Cell::new(1.5),
            marker: Cell::new(None),
            marker_size: Cell::new(6.0),
        }
    }

    /// Data points.
    pub fn points(&self) -> Vec<Point> {
        self.points.borrow().clone()
    }

    /// Replace the data points.
    pub fn set_points(&self, points: Vec<Point>) {
        *self.points.borrow_mut() = points;
    }

    /// Stroke colour.
    pub fn color(&self) -> Color {
        self.color.get()
    }

    /// Set the stroke colour.
    pub fn set_color(&self, color: Color) {
        self.color.set(color);
    }

    /// Stroke width in points.
    pub fn line_width(&self) -> f64 {
        self.line_width.get()
    }

    /// Set the stroke width in points.
    pub fn set_line_width(&self, width: f64) {
        self.line_width.set(width);
    }

    /// Marker glyph, if any.
    pub fn marker(&self) -> Option<Marker> {
        self.marker.get()
    }

    /// Set the marker glyph and its diameter in points.
    pub fn set_marker(&self, marker: Option<Marker>, size: f64) {
        self.marker.set(marker);
        self.marker_size.set(size);
    }
}

impl Artist for Line2D {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let points = self.points.borrow().clone();
        if !self.is_visible() || points.is_empty() {
            return Ok(());
        }
        let transform = self.base.transform().get();
        let gc = self
            .base
            .gc()
            .with_color(self.color())
            .with_line_width(self.line_width());

        if points.len() > 1 {
            let mut path = BezPath::new();
            path.move_to(points[0]);
            for p in &points[1..] {
                path.line_to(*p);
            }
            renderer.draw_path(&gc, path, transform, None)?;
        }
        if let Some(marker) = self.marker() {
            let radius = renderer.points_to_pixels(self.marker_size.get()) / 2.0;
            renderer.draw(
                &gc,
                DrawOp::Markers {
                    marker: marker.path(),
                    marker_transform: Affine::scale(radius),
                    positions: points,
                    transform,
                    fill: (marker != Marker::Cross).then_some(self.color()),
                },
            )?;
        }
        Ok(())
    }

    fn window_extent(&self, renderer: &dyn Renderer) -> Result<Rect, RenderError> {
        let transform = self.base.transform().get();
        let points = self.points.borrow();
        let Some(bbox) = bbox_of(points.iter().map(|p| transform * *p)) else {
            return Ok(Rect::ZERO);
        };
        let mut pad = renderer.points_to_pixels(self.line_width()) / 2.0;
        if self.marker().is_some() {
            pad = pad.max(renderer.points_to_pixels(self.marker_size.get()) / 2.0);
        }
        Ok(bbox.inflate(pad, pad))
    }

    forward_artist_base!(base);
}
