// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::RefCell;

use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;
use plotview_imaging::{DrawOp, PathCollection, RenderError, Renderer};

use crate::artist::{bbox_of, forward_artist_base};
use crate::{Artist, ArtistBase, TransformHandle};

/// Many independent polylines drawn in one call.
#[derive(Debug)]
pub struct LineCollection {
    base: ArtistBase,
    segments: RefCell<Vec<Vec<Point>>>,
    colors: RefCell<Vec<Color>>,
    line_widths: RefCell<Vec<f64>>,
}

impl LineCollection {
    /// Default stacking order for collections.
    pub const ZORDER: f64 = 2.0;

    /// A collection of `segments`, each a polyline in data coordinates.
    pub fn new(segments: Vec<Vec<Point>>, transform: TransformHandle) -> Self {
        Self {
            base: ArtistBase::new(transform, Self::ZORDER),
            segments: RefCell::new(segments),
            colors: RefCell::new(vec![Color::BLACK]),
            line_widths: RefCell::new(vec![1.0]),
        }
    }

    /// Per-segment colours, cycled.
    pub fn set_colors(&self, colors: Vec<Color>) {
        *self.colors.borrow_mut() = colors;
    }

    /// Per-segment widths in points, cycled.
    pub fn set_line_widths(&self, widths: Vec<f64>) {
        *self.line_widths.borrow_mut() = widths;
    }

    fn max_width(&self) -> f64 {
        self.line_widths.borrow().iter().copied().fold(0.0, f64::max)
    }
}

impl Artist for LineCollection {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        if !self.is_visible() {
            return Ok(());
        }
        let paths: Vec<BezPath> = self
            .segments
            .borrow()
            .iter()
            .filter(|seg| seg.len() > 1)
            .map(|seg| {
                let mut path = BezPath::new();
                path.move_to(seg[0]);
                for p in &seg[1..] {
                    path.line_to(*p);
                }
                path
            })
            .collect();
        if paths.is_empty() {
            return Ok(());
        }
        let collection = PathCollection {
            paths,
            transform: self.base.transform().get(),
            offsets: Vec::new(),
            offset_transform: Affine::IDENTITY,
            fills: Vec::new(),
            strokes: self.colors.borrow().iter().copied().map(Some).collect(),
            line_widths: self.line_widths.borrow().clone(),
        };
        renderer.draw(&self.base.gc(), DrawOp::PathCollection(collection))
    }

    fn window_extent(&self, renderer: &dyn Renderer) -> Result<Rect, RenderError> {
        let t = self.base.transform().get();
        let segments = self.segments.borrow();
        let Some(bbox) = bbox_of(segments.iter().flatten().map(|p| t * *p)) else {
            return Ok(Rect::ZERO);
        };
        let pad = renderer.points_to_pixels(self.max_width()) / 2.0;
        Ok(bbox.inflate(pad, pad))
    }

    forward_artist_base!(base);
}

/// A triangle mesh with per-vertex colours, shaded smoothly.
#[derive(Debug)]
pub struct TriMesh {
    base: ArtistBase,
    triangles: RefCell<Vec<[Point; 3]>>,
    colors: RefCell<Vec<[Color; 3]>>,
}

impl TriMesh {
    /// Default stacking order for meshes.
    pub const ZORDER: f64 = 1.0;

    /// A mesh of `triangles` in data coordinates, coloured per vertex.
    ///
    /// Triangles beyond the end of `colors` are not drawn.
    pub fn new(
        triangles: Vec<[Point; 3]>,
        colors: Vec<[Color; 3]>,
        transform: TransformHandle,
    ) -> Self {
        Self {
            base: ArtistBase::new(transform, Self::ZORDER),
            triangles: RefCell::new(triangles),
            colors: RefCell::new(colors),
        }
    }
}

impl Artist for TriMesh {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let colors = self.colors.borrow().clone();
        let mut triangles = self.triangles.borrow().clone();
        triangles.truncate(colors.len());
        if !self.is_visible() || triangles.is_empty() {
            return Ok(());
        }
        renderer.draw(
            &self.base.gc(),
            DrawOp::GouraudTriangles {
                colors: colors[..triangles.len()].to_vec(),
                triangles,
                transform: self.base.transform().get(),
            },
        )
    }

    fn window_extent(&self, _renderer: &dyn Renderer) -> Result<Rect, RenderError> {
        let t = self.base.transform().get();
        let triangles = self.triangles.borrow();
        Ok(bbox_of(triangles.iter().flatten().map(|p| t * *p)).unwrap_or(Rect::ZERO))
    }

    forward_artist_base!(base);
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotview_imaging_ref::RecordingRenderer;

    #[test]
    fn line_collection_skips_degenerate_segments() {
        let coll = LineCollection::new(
            vec![
                vec![Point::ZERO, Point::new(1.0, 1.0)],
                vec![Point::new(5.0, 5.0)],
                vec![Point::new(2.0, 0.0), Point::new(3.0, 0.0), Point::new(3.0, 1.0)],
            ],
            TransformHandle::default(),
        );
        coll.set_colors(vec![Color::WHITE, Color::BLACK]);
        let mut r = RecordingRenderer::default();
        coll.draw(&mut r).unwrap();

        let (DrawOp::PathCollection(pc), _) = r.draws().next().expect("collection") else {
            panic!("expected a path collection");
        };
        assert_eq!(pc.len(), 2);
        assert_eq!(pc.stroke(1), Some(Color::BLACK));
        assert_eq!(pc.line_width(0), Some(1.0));
    }

    #[test]
    fn trimesh_extent_and_draw() {
        let mesh = TriMesh::new(
            vec![[Point::ZERO, Point::new(4.0, 0.0), Point::new(0.0, 3.0)]],
            vec![[Color::WHITE, Color::BLACK, Color::WHITE]],
            TransformHandle::new(Affine::scale(2.0)),
        );
        let mut r = RecordingRenderer::default();
        assert_eq!(
            mesh.window_extent(&r).unwrap(),
            Rect::new(0.0, 0.0, 8.0, 6.0)
        );
        mesh.draw(&mut r).unwrap();
        assert!(matches!(
            r.draws().next(),
            Some((DrawOp::GouraudTriangles { triangles, .. }, _)) if triangles.len() == 1
        ));
    }
}
