// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A renderer adapter that moves primitives from one canvas into another.

use std::fmt;
use std::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect, Shape, Size};
use peniko::Color;
use plotview_imaging::{
    DrawOp, FontProps, GraphicsContext, Interpolation, PathCollection, RenderError, Renderer,
    RgbaImage, StateOp, TextMetrics, ceil_to_pixels, rect_overlaps, resample,
};

/// How primitives issued against one canvas are carried into another.
///
/// `transfer` maps source display space to destination display space: it
/// undoes the source's data transform and applies the destination's. The
/// snapshot is taken once per view draw call and shared by every proxy.
#[derive(Clone, Debug, PartialEq)]
pub struct Remapping {
    source: Affine,
    dest: Affine,
    transfer: Affine,
    bounds: Rect,
    clip_path: Option<BezPath>,
    interpolation: Interpolation,
    scale_lines: bool,
}

impl Remapping {
    /// Build a remapping from the source and destination data transforms.
    ///
    /// `bounds` is the destination's display box; everything forwarded is
    /// clipped to it. Returns `None` when the source transform cannot be
    /// inverted.
    pub fn new(
        source: Affine,
        dest: Affine,
        bounds: Rect,
        interpolation: Interpolation,
        scale_lines: bool,
    ) -> Option<Self> {
        let det = source.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let transfer = dest * source.inverse();
        transfer.is_finite().then_some(Self {
            source,
            dest,
            transfer,
            bounds: bounds.abs(),
            clip_path: None,
            interpolation,
            scale_lines,
        })
    }

    /// Additionally clip every forwarded primitive to `clip_path`.
    #[must_use]
    pub fn with_clip_path(mut self, clip_path: Option<BezPath>) -> Self {
        self.clip_path = clip_path;
        self
    }

    /// Source data-to-display transform.
    pub fn source(&self) -> Affine {
        self.source
    }

    /// Destination data-to-display transform.
    pub fn dest(&self) -> Affine {
        self.dest
    }

    /// Source display to destination display.
    pub fn transfer(&self) -> Affine {
        self.transfer
    }

    /// Destination display box.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Destination clip outline, for non-rectangular canvases.
    pub fn clip_path(&self) -> Option<&BezPath> {
        self.clip_path.as_ref()
    }

    /// Interpolation used when resampling images.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Whether stroke widths follow the zoom.
    pub fn scale_lines(&self) -> bool {
        self.scale_lines
    }

    /// Global scale of `transfer`: the geometric mean of the unit square's
    /// image width and height.
    pub fn line_scale(&self) -> f64 {
        let unit = self
            .transfer
            .transform_rect_bbox(Rect::new(0.0, 0.0, 1.0, 1.0));
        (unit.width() * unit.height()).sqrt()
    }

    /// Factor applied to stroke widths, font sizes, and marker sizes.
    fn width_factor(&self) -> f64 {
        if self.scale_lines {
            self.line_scale()
        } else {
            1.0
        }
    }
}

/// Wraps a real renderer and rewrites every primitive through a [`Remapping`].
///
/// Queries are answered by the wrapped renderer, so artists measure
/// themselves exactly as they would when drawn natively; only what reaches
/// the output is moved, rescaled, and clipped.
pub struct TransformRenderer<'a> {
    base: &'a mut dyn Renderer,
    remap: &'a Remapping,
}

impl fmt::Debug for TransformRenderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRenderer")
            .field("remap", self.remap)
            .finish_non_exhaustive()
    }
}

impl<'a> TransformRenderer<'a> {
    /// Wrap `base`.
    pub fn new(base: &'a mut dyn Renderer, remap: &'a Remapping) -> Self {
        Self { base, remap }
    }

    /// The remapping in force.
    pub fn remapping(&self) -> &Remapping {
        self.remap
    }

    fn remap_gc(&self, gc: &GraphicsContext) -> GraphicsContext {
        let mut gc = gc.clone();
        let factor = self.remap.width_factor();
        gc.set_line_width(gc.line_width() * factor);
        gc.hatch_line_width *= factor;
        gc.clip_rect = Some(self.remap.bounds);
        gc.clip_path = self.remap.clip_path.clone();
        gc
    }

    /// Half a stroke of `width` points, in display pixels.
    fn half_stroke(&self, width: f64) -> f64 {
        self.base.points_to_pixels(width).abs() / 2.0
    }

    fn visible(&self, bbox: Rect, pad: f64) -> bool {
        rect_overlaps(bbox.inflate(pad, pad), self.remap.bounds)
    }

    fn forward_path(
        &mut self,
        gc: &GraphicsContext,
        mut path: BezPath,
        transform: Affine,
        fill: Option<Color>,
    ) -> Result<(), RenderError> {
        path.apply_affine(self.remap.transfer * transform);
        if !self.visible(path.bounding_box(), self.half_stroke(gc.line_width())) {
            return Ok(());
        }
        self.base.draw(
            gc,
            DrawOp::Path {
                path,
                transform: Affine::IDENTITY,
                fill,
            },
        )
    }

    fn forward_markers(
        &mut self,
        gc: &GraphicsContext,
        marker: BezPath,
        marker_transform: Affine,
        positions: Vec<Point>,
        transform: Affine,
        fill: Option<Color>,
    ) -> Result<(), RenderError> {
        let marker_transform = Affine::scale(self.remap.width_factor()) * marker_transform;
        let pad = self.half_stroke(gc.line_width());
        let stamp = marker_transform
            .transform_rect_bbox(marker.bounding_box())
            .inflate(pad, pad);
        let t = self.remap.transfer * transform;
        let positions: Vec<Point> = positions
            .into_iter()
            .map(|p| t * p)
            .filter(|p| rect_overlaps(stamp + p.to_vec2(), self.remap.bounds))
            .collect();
        if positions.is_empty() {
            return Ok(());
        }
        self.base.draw(
            gc,
            DrawOp::Markers {
                marker,
                marker_transform,
                positions,
                transform: Affine::IDENTITY,
                fill,
            },
        )
    }

    fn forward_path_collection(
        &mut self,
        gc: &GraphicsContext,
        collection: PathCollection,
    ) -> Result<(), RenderError> {
        let factor = self.remap.width_factor();
        let mut out = PathCollection {
            transform: Affine::IDENTITY,
            offset_transform: Affine::IDENTITY,
            ..PathCollection::default()
        };
        for i in 0..collection.len() {
            let width = collection.line_width(i).map(|w| w * factor);
            let mut path = collection.item_path(i).clone();
            path.apply_affine(self.remap.transfer * collection.item_transform(i));
            let pad = self.half_stroke(width.unwrap_or(gc.line_width()));
            if !self.visible(path.bounding_box(), pad) {
                continue;
            }
            out.paths.push(path);
            if !collection.fills.is_empty() {
                out.fills.push(collection.fill(i));
            }
            if !collection.strokes.is_empty() {
                out.strokes.push(collection.stroke(i));
            }
            if let Some(width) = width {
                out.line_widths.push(width);
            }
        }
        if out.is_empty() {
            return Ok(());
        }
        self.base.draw(gc, DrawOp::PathCollection(out))
    }

    fn forward_gouraud_triangles(
        &mut self,
        gc: &GraphicsContext,
        triangles: Vec<[Point; 3]>,
        colors: Vec<[Color; 3]>,
        transform: Affine,
    ) -> Result<(), RenderError> {
        let t = self.remap.transfer * transform;
        let (triangles, colors): (Vec<_>, Vec<_>) = triangles
            .into_iter()
            .zip(colors)
            .map(|(tri, color)| (tri.map(|p| t * p), color))
            .filter(|(tri, _)| {
                let bbox = Rect::from_points(tri[0], tri[1]).union_pt(tri[2]);
                rect_overlaps(bbox, self.remap.bounds)
            })
            .unzip();
        if triangles.is_empty() {
            return Ok(());
        }
        self.base.draw(
            gc,
            DrawOp::GouraudTriangles {
                triangles,
                colors,
                transform: Affine::IDENTITY,
            },
        )
    }

    fn forward_image(
        &mut self,
        gc: &GraphicsContext,
        origin: Point,
        image: &RgbaImage,
        transform: Option<Affine>,
    ) -> Result<(), RenderError> {
        if image.is_empty() {
            return Ok(());
        }
        let mag = self.base.image_magnification();
        if mag <= 0.0 || !mag.is_finite() {
            return Err(RenderError::Backend(format!(
                "invalid image magnification {mag}"
            )));
        }
        // Image pixels to source display space.
        let placed = transform.unwrap_or_else(|| {
            Affine::translate(origin.to_vec2()) * Affine::scale(1.0 / mag)
        });
        let to_dest = self.remap.transfer * placed;
        let pixels = Rect::new(
            0.0,
            0.0,
            f64::from(image.width()),
            f64::from(image.height()),
        );
        let clipped = to_dest
            .transform_rect_bbox(pixels)
            .intersect(self.remap.bounds);
        if clipped.width() <= 0.0 || clipped.height() <= 0.0 {
            return Ok(());
        }
        let width = ceil_to_pixels(clipped.width() * mag);
        let height = ceil_to_pixels(clipped.height() * mag);
        if width == 0 || height == 0 {
            return Ok(());
        }
        let to_output =
            Affine::scale(mag) * Affine::translate((-clipped.x0, -clipped.y0)) * to_dest;
        let resampled = resample(image, width, height, to_output, self.remap.interpolation);

        let mut gc = gc.clone();
        gc.clip_rect = Some(clipped);
        self.base.draw(
            &gc,
            DrawOp::Image {
                origin: Point::new(clipped.x0, clipped.y0),
                image: Arc::new(resampled),
                transform: None,
            },
        )
    }

    fn forward_text(
        &mut self,
        gc: &GraphicsContext,
        position: Point,
        text: String,
        mut font: FontProps,
        angle: f64,
    ) -> Result<(), RenderError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let position = self.remap.transfer * position;
        font.size *= self.remap.width_factor();
        self.base.draw(
            gc,
            DrawOp::Text {
                position,
                text,
                font,
                angle: self.remap_angle(angle),
            },
        )
    }

    /// Screen-space rotation after the transfer's linear part.
    fn remap_angle(&self, degrees: f64) -> f64 {
        let [a, b, c, d, _, _] = self.remap.transfer.as_coeffs();
        let theta = degrees.to_radians();
        // y-down display: counter-clockwise on screen is negative y.
        let (x, y) = (theta.cos(), -theta.sin());
        let (x, y) = (a * x + c * y, b * x + d * y);
        (-y).atan2(x).to_degrees()
    }
}

impl Renderer for TransformRenderer<'_> {
    fn canvas_size(&self) -> Size {
        self.base.canvas_size()
    }

    fn points_to_pixels(&self, points: f64) -> f64 {
        self.base.points_to_pixels(points)
    }

    fn image_magnification(&self) -> f64 {
        self.base.image_magnification()
    }

    fn option_scale_image(&self) -> bool {
        false
    }

    fn text_metrics(&self, text: &str, font: &FontProps) -> Result<TextMetrics, RenderError> {
        self.base.text_metrics(text, font)
    }

    fn state(&mut self, op: StateOp) -> Result<(), RenderError> {
        self.base.state(op)
    }

    fn draw(&mut self, gc: &GraphicsContext, op: DrawOp) -> Result<(), RenderError> {
        let gc = self.remap_gc(gc);
        match op {
            DrawOp::Path {
                path,
                transform,
                fill,
            } => self.forward_path(&gc, path, transform, fill),
            DrawOp::Markers {
                marker,
                marker_transform,
                positions,
                transform,
                fill,
            } => self.forward_markers(&gc, marker, marker_transform, positions, transform, fill),
            DrawOp::PathCollection(collection) => self.forward_path_collection(&gc, collection),
            DrawOp::GouraudTriangles {
                triangles,
                colors,
                transform,
            } => self.forward_gouraud_triangles(&gc, triangles, colors, transform),
            DrawOp::Image {
                origin,
                image,
                transform,
            } => self.forward_image(&gc, origin, &image, transform),
            DrawOp::Text {
                position,
                text,
                font,
                angle,
            } => self.forward_text(&gc, position, text, font, angle),
            other => Err(RenderError::UnsupportedPrimitive(other.name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Circle, Line};
    use plotview_imaging::RendererExt;
    use plotview_imaging_ref::{Event, RecordingRenderer};

    use super::*;

    const BOUNDS: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    /// Doubles everything: source display (x, y) lands at (2x, 2y).
    fn doubling(scale_lines: bool) -> Remapping {
        Remapping::new(
            Affine::IDENTITY,
            Affine::scale(2.0),
            BOUNDS,
            Interpolation::Nearest,
            scale_lines,
        )
        .unwrap()
    }

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        Line::new((x0, y0), (x1, y1)).to_path(0.1)
    }

    fn only_draw(r: &RecordingRenderer) -> (&DrawOp, &GraphicsContext) {
        let draws: Vec<_> = r.draws().collect();
        assert_eq!(draws.len(), 1, "expected exactly one draw, got {draws:?}");
        draws[0]
    }

    #[test]
    fn singular_source_has_no_remapping() {
        let flat = Affine::scale_non_uniform(1.0, 0.0);
        assert!(
            Remapping::new(flat, Affine::IDENTITY, BOUNDS, Interpolation::Nearest, true).is_none()
        );
    }

    #[test]
    fn line_scale_is_the_geometric_mean() {
        let remap = Remapping::new(
            Affine::IDENTITY,
            Affine::scale_non_uniform(2.0, 8.0),
            BOUNDS,
            Interpolation::Nearest,
            true,
        )
        .unwrap();
        assert!((remap.line_scale() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn paths_are_remapped_and_clipped_to_the_destination() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw_path(
                &GraphicsContext::default(),
                line(0.0, 0.0, 10.0, 10.0),
                Affine::IDENTITY,
                None,
            )
            .unwrap();

        let (op, gc) = only_draw(&r);
        let DrawOp::Path {
            path, transform, ..
        } = op
        else {
            panic!("expected a path, got {op:?}");
        };
        assert_eq!(*transform, Affine::IDENTITY);
        assert_eq!(path.bounding_box(), Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(gc.clip_rect, Some(BOUNDS));
        assert_eq!(gc.line_width(), 2.0);
    }

    #[test]
    fn path_transform_is_folded_in() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw_path(
                &GraphicsContext::default(),
                line(0.0, 0.0, 1.0, 1.0),
                Affine::translate((5.0, 5.0)),
                None,
            )
            .unwrap();
        let (DrawOp::Path { path, .. }, _) = only_draw(&r) else {
            panic!("expected a path");
        };
        assert_eq!(path.bounding_box(), Rect::new(10.0, 10.0, 12.0, 12.0));
    }

    #[test]
    fn line_widths_stay_put_without_scaling() {
        let remap = doubling(false);
        let mut r = RecordingRenderer::default();
        let gc = GraphicsContext::default().with_line_width(1.5);
        TransformRenderer::new(&mut r, &remap)
            .draw_path(&gc, line(0.0, 0.0, 10.0, 10.0), Affine::IDENTITY, None)
            .unwrap();
        let (_, gc) = only_draw(&r);
        assert_eq!(gc.line_width(), 1.5);
        assert_eq!(gc.hatch_line_width, 1.0);
    }

    #[test]
    fn paths_outside_the_destination_are_culled() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw_path(
                &GraphicsContext::default(),
                line(60.0, 60.0, 70.0, 70.0),
                Affine::IDENTITY,
                None,
            )
            .unwrap();
        assert_eq!(r.draws().count(), 0);
    }

    #[test]
    fn a_thick_stroke_can_reach_in_from_outside() {
        let remap = doubling(false);
        let mut r = RecordingRenderer::default();
        // Two display pixels past the right edge once doubled.
        let path = line(51.0, 10.0, 51.0, 20.0);
        let thin = GraphicsContext::default();
        let thick = GraphicsContext::default().with_line_width(4.0);
        let mut mapped = TransformRenderer::new(&mut r, &remap);
        mapped
            .draw_path(&thin, path.clone(), Affine::IDENTITY, None)
            .unwrap();
        mapped
            .draw_path(&thick, path, Affine::IDENTITY, None)
            .unwrap();
        let (_, gc) = only_draw(&r);
        assert_eq!(gc.line_width(), 4.0);
    }

    #[test]
    fn markers_keep_only_visible_positions_and_scale_their_stamp() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::Markers {
                    marker: Circle::new(Point::ZERO, 1.0).to_path(0.1),
                    marker_transform: Affine::IDENTITY,
                    positions: vec![Point::new(5.0, 5.0), Point::new(80.0, 80.0)],
                    transform: Affine::IDENTITY,
                    fill: Some(Color::BLACK),
                },
            )
            .unwrap();
        let (
            DrawOp::Markers {
                marker_transform,
                positions,
                transform,
                ..
            },
            _,
        ) = only_draw(&r)
        else {
            panic!("expected markers");
        };
        assert_eq!(*positions, vec![Point::new(10.0, 10.0)]);
        assert_eq!(*marker_transform, Affine::scale(2.0));
        assert_eq!(*transform, Affine::IDENTITY);
    }

    #[test]
    fn markers_all_outside_draw_nothing() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::Markers {
                    marker: Circle::new(Point::ZERO, 1.0).to_path(0.1),
                    marker_transform: Affine::IDENTITY,
                    positions: vec![Point::new(90.0, 90.0)],
                    transform: Affine::IDENTITY,
                    fill: None,
                },
            )
            .unwrap();
        assert_eq!(r.draws().count(), 0);
    }

    #[test]
    fn path_collections_drop_hidden_items_and_keep_styles_aligned() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        let collection = PathCollection {
            paths: vec![
                line(0.0, 0.0, 5.0, 5.0),
                line(90.0, 90.0, 95.0, 95.0),
                line(10.0, 0.0, 15.0, 5.0),
            ],
            fills: vec![Some(Color::BLACK), Some(Color::WHITE), None],
            line_widths: vec![1.0, 3.0],
            ..PathCollection::default()
        };
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::PathCollection(collection),
            )
            .unwrap();
        let (DrawOp::PathCollection(out), _) = only_draw(&r) else {
            panic!("expected a path collection");
        };
        assert_eq!(out.len(), 2);
        assert_eq!(out.paths[1].bounding_box(), Rect::new(20.0, 0.0, 30.0, 10.0));
        assert_eq!(out.fills, vec![Some(Color::BLACK), None]);
        // Item three cycles back to the first width.
        assert_eq!(out.line_widths, vec![2.0, 2.0]);
        assert!(out.strokes.is_empty());
        assert_eq!(out.transform, Affine::IDENTITY);
    }

    #[test]
    fn gouraud_triangles_are_mapped_and_culled() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        let inside = [Point::ZERO, Point::new(10.0, 0.0), Point::new(0.0, 10.0)];
        let outside = [
            Point::new(60.0, 60.0),
            Point::new(70.0, 60.0),
            Point::new(60.0, 70.0),
        ];
        let colors = [Color::BLACK; 3];
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::GouraudTriangles {
                    triangles: vec![inside, outside],
                    colors: vec![colors, [Color::WHITE; 3]],
                    transform: Affine::IDENTITY,
                },
            )
            .unwrap();
        let (
            DrawOp::GouraudTriangles {
                triangles, colors, ..
            },
            _,
        ) = only_draw(&r)
        else {
            panic!("expected triangles");
        };
        assert_eq!(
            *triangles,
            vec![[Point::ZERO, Point::new(20.0, 0.0), Point::new(0.0, 20.0)]]
        );
        assert_eq!(colors.len(), 1);
    }

    fn checker(n: u32) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_fn(n, n, |x, y| {
            if (x + y) % 2 == 0 {
                [255, 255, 255, 255]
            } else {
                [0, 0, 0, 255]
            }
        }))
    }

    fn drawn_image(r: &RecordingRenderer) -> (Point, Arc<RgbaImage>, Option<Rect>) {
        match only_draw(r) {
            (
                DrawOp::Image {
                    origin,
                    image,
                    transform,
                },
                gc,
            ) => {
                assert_eq!(*transform, None);
                (*origin, image.clone(), gc.clip_rect)
            }
            (op, _) => panic!("expected an image, got {op:?}"),
        }
    }

    #[test]
    fn images_are_resampled_to_the_destination_scale() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::Image {
                    origin: Point::new(5.0, 5.0),
                    image: checker(4),
                    transform: None,
                },
            )
            .unwrap();
        let (origin, image, clip) = drawn_image(&r);
        assert_eq!(origin, Point::new(10.0, 10.0));
        assert_eq!((image.width(), image.height()), (8, 8));
        assert_eq!(clip, Some(Rect::new(10.0, 10.0, 18.0, 18.0)));
        // Nearest: each source pixel becomes a 2x2 block.
        assert_eq!(image.pixel(0, 0), image.pixel(1, 1));
        assert_eq!(image.pixel(2, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn images_are_cut_at_the_destination_edge() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::Image {
                    origin: Point::new(40.0, 40.0),
                    image: checker(20),
                    transform: None,
                },
            )
            .unwrap();
        let (origin, image, clip) = drawn_image(&r);
        assert_eq!(origin, Point::new(80.0, 80.0));
        assert_eq!((image.width(), image.height()), (20, 20));
        assert_eq!(clip, Some(Rect::new(80.0, 80.0, 100.0, 100.0)));
    }

    #[test]
    fn images_outside_the_destination_are_culled() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::Image {
                    origin: Point::new(60.0, 0.0),
                    image: checker(4),
                    transform: None,
                },
            )
            .unwrap();
        assert_eq!(r.draws().count(), 0);
    }

    #[test]
    fn interpolation_changes_the_resampled_pixels() {
        let render = |interpolation| {
            let remap = Remapping::new(
                Affine::IDENTITY,
                Affine::scale(4.0),
                BOUNDS,
                interpolation,
                true,
            )
            .unwrap();
            let mut r = RecordingRenderer::default();
            TransformRenderer::new(&mut r, &remap)
                .draw(
                    &GraphicsContext::default(),
                    DrawOp::Image {
                        origin: Point::ZERO,
                        image: checker(4),
                        transform: None,
                    },
                )
                .unwrap();
            drawn_image(&r).1
        };
        let nearest = render(Interpolation::Nearest);
        let bilinear = render(Interpolation::Bilinear);
        assert_ne!(nearest.as_bytes(), bilinear.as_bytes());
        assert!(
            nearest.as_bytes().iter().all(|&c| c == 0 || c == 255),
            "nearest must not blend"
        );
        assert!(
            bilinear.as_bytes().iter().any(|&c| c != 0 && c != 255),
            "bilinear should blend across pixel edges"
        );
    }

    #[test]
    fn image_magnification_sets_the_output_resolution() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default().with_image_magnification(2.0);
        // At magnification 2, a 4 pixel image covers 2 display pixels.
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::Image {
                    origin: Point::ZERO,
                    image: checker(4),
                    transform: None,
                },
            )
            .unwrap();
        let (origin, image, clip) = drawn_image(&r);
        assert_eq!(origin, Point::ZERO);
        assert_eq!(clip, Some(Rect::new(0.0, 0.0, 4.0, 4.0)));
        assert_eq!((image.width(), image.height()), (8, 8));
    }

    #[test]
    fn text_moves_and_grows_with_the_zoom() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::Text {
                    position: Point::new(3.0, 4.0),
                    text: "label".into(),
                    font: FontProps::new(10.0),
                    angle: 30.0,
                },
            )
            .unwrap();
        let (
            DrawOp::Text {
                position,
                font,
                angle,
                ..
            },
            _,
        ) = only_draw(&r)
        else {
            panic!("expected text");
        };
        assert_eq!(*position, Point::new(6.0, 8.0));
        assert!((font.size - 20.0).abs() < 1e-9);
        assert!((angle - 30.0).abs() < 1e-9);
    }

    #[test]
    fn mirrored_transfer_mirrors_the_text_angle() {
        let remap = Remapping::new(
            Affine::IDENTITY,
            Affine::scale_non_uniform(1.0, -1.0),
            BOUNDS,
            Interpolation::Nearest,
            true,
        )
        .unwrap();
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::Text {
                    position: Point::ZERO,
                    text: "tilt".into(),
                    font: FontProps::default(),
                    angle: 30.0,
                },
            )
            .unwrap();
        let (DrawOp::Text { angle, .. }, _) = only_draw(&r) else {
            panic!("expected text");
        };
        assert!((angle + 30.0).abs() < 1e-9, "got {angle}");
    }

    #[test]
    fn blank_text_is_skipped() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::Text {
                    position: Point::ZERO,
                    text: "  ".into(),
                    font: FontProps::default(),
                    angle: 0.0,
                },
            )
            .unwrap();
        assert_eq!(r.draws().count(), 0);
    }

    #[test]
    fn state_and_queries_reach_the_base_renderer() {
        let remap = doubling(true);
        let mut r = RecordingRenderer::new(300.0, 200.0).with_dpi(72.0);
        {
            let mut mapped = TransformRenderer::new(&mut r, &remap);
            assert_eq!(mapped.canvas_size(), Size::new(300.0, 200.0));
            assert_eq!(mapped.points_to_pixels(3.0), 3.0);
            assert!(!mapped.option_scale_image());
            mapped.with_group("inner", |_| Ok(())).unwrap();
        }
        assert!(matches!(
            r.events(),
            [
                Event::State {
                    op: StateOp::OpenGroup(name),
                    group_depth: 1
                },
                Event::State {
                    op: StateOp::CloseGroup,
                    group_depth: 0
                },
            ] if name == "inner"
        ));
    }

    #[test]
    fn destination_clip_path_is_attached() {
        let outline = Circle::new((50.0, 50.0), 50.0).to_path(0.1);
        let remap = doubling(true).with_clip_path(Some(outline.clone()));
        let mut r = RecordingRenderer::default();
        TransformRenderer::new(&mut r, &remap)
            .draw(
                &GraphicsContext::default(),
                DrawOp::Path {
                    path: line(0.0, 0.0, 10.0, 10.0),
                    transform: Affine::IDENTITY,
                    fill: None,
                },
            )
            .unwrap();
        let (_, gc) = only_draw(&r);
        assert_eq!(gc.clip_path.as_ref(), Some(&outline));
    }
}
