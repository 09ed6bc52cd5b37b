// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=plotview_imaging --heading-base-level=0

//! Plotview Imaging: the drawing-primitive protocol shared by artists and renderers.
//!
//! This crate defines the small vocabulary that plot objects use to produce
//! output and that renderers consume. It sits between the figure/axes object
//! model and concrete output backends (raster, vector, recording).
//!
//! # Core concepts
//!
//! - **Graphics context**: [`GraphicsContext`] carries per-primitive styling
//!   (stroke, colour, alpha, clip rectangle and clip path). It travels with
//!   each draw call rather than living in ambient renderer state.
//! - **Operations**: [`StateOp`] (grouping, no geometry) and [`DrawOp`]
//!   (position-bearing primitives: paths, markers, path collections, Gouraud
//!   triangles, images, text).
//! - **Renderers**: [`Renderer`] accepts operations and answers the few
//!   queries artists need while laying themselves out (canvas size, point
//!   to pixel conversion, image magnification, text metrics).
//! - **Images**: [`RgbaImage`] pixel buffers and [`resample`], which maps
//!   an image through an affine transform using an [`Interpolation`] filter.
//!
//! Both op enums are `#[non_exhaustive]`. Renderers that rewrite geometry
//! must refuse primitives they do not understand rather than pass them
//! through with stale coordinates; see [`RenderError::UnsupportedPrimitive`].
//!
//! # Coordinates
//!
//! Display space is measured in device pixels with the origin at the top-left
//! corner and `y` growing downwards. Each `DrawOp` carries the transform that
//! maps its own coordinates into display space; renderers apply it.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Affine, BezPath};
//! use plotview_imaging::{DrawOp, GraphicsContext, Renderer, RendererExt};
//!
//! fn draw_diagonal(renderer: &mut dyn Renderer) -> Result<(), plotview_imaging::RenderError> {
//!     let mut path = BezPath::new();
//!     path.move_to((0.0, 0.0));
//!     path.line_to((10.0, 10.0));
//!     renderer.with_group("diagonal", |r| {
//!         r.draw(&GraphicsContext::default(), DrawOp::Path {
//!             path,
//!             transform: Affine::IDENTITY,
//!             fill: None,
//!         })
//!     })
//! }
//! ```

mod image;
mod resample;

use std::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect, Size};
use peniko::Color;
use thiserror::Error;

pub use image::{RgbaImage, ceil_to_pixels};
pub use resample::{Interpolation, ParseInterpolationError, resample};

/// Stroke style carried by a [`GraphicsContext`].
///
/// This is a re-export of [`kurbo::Stroke`]. The `width` is expressed in
/// points; renderers convert with [`Renderer::points_to_pixels`].
pub type StrokeStyle = kurbo::Stroke;

/// Errors raised while producing output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A drawing primitive reached a renderer that has no rule for it.
    #[error("no rule to render the `{0}` primitive")]
    UnsupportedPrimitive(&'static str),
    /// An artist's window extent could not be computed.
    #[error("window extent could not be resolved")]
    ExtentResolution(#[source] Box<RenderError>),
    /// The renderer cannot measure text.
    #[error("text metrics are not available from this renderer")]
    TextMetricsUnavailable,
    /// Pixel data does not match its declared dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
    /// Failure reported by an output backend.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Font description used by text primitives.
#[derive(Clone, Debug, PartialEq)]
pub struct FontProps {
    /// Family name, e.g. `"sans-serif"`.
    pub family: String,
    /// Size in points.
    pub size: f64,
    /// Weight on the CSS 100–900 scale.
    pub weight: u16,
}

impl FontProps {
    /// Create a regular-weight sans-serif font of the given size in points.
    pub fn new(size: f64) -> Self {
        Self {
            family: "sans-serif".into(),
            size,
            weight: 400,
        }
    }
}

impl Default for FontProps {
    fn default() -> Self {
        Self::new(10.0)
    }
}

/// Measured extent of a string, in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextMetrics {
    /// Advance width.
    pub width: f64,
    /// Total height including descent.
    pub height: f64,
    /// Distance from the baseline to the bottom of the text.
    pub descent: f64,
}

/// Per-primitive styling and clipping.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphicsContext {
    /// Stroke parameters; the width is in points.
    pub stroke: StrokeStyle,
    /// Stroke (and text) colour.
    pub color: Color,
    /// Global alpha multiplier in `[0, 1]`.
    pub alpha: f32,
    /// Optional clip rectangle in display space.
    pub clip_rect: Option<Rect>,
    /// Optional clip path in display space.
    pub clip_path: Option<BezPath>,
    /// Hatch stroke width in points.
    pub hatch_line_width: f64,
    /// Whether edges should be antialiased.
    pub antialiased: bool,
}

impl GraphicsContext {
    /// Returns the stroke width in points.
    #[inline]
    pub fn line_width(&self) -> f64 {
        self.stroke.width
    }

    /// Sets the stroke width in points.
    #[inline]
    pub fn set_line_width(&mut self, width: f64) {
        self.stroke.width = width;
    }

    /// Builder-style variant of [`GraphicsContext::set_line_width`].
    #[must_use]
    pub fn with_line_width(mut self, width: f64) -> Self {
        self.set_line_width(width);
        self
    }

    /// Builder-style setter for the stroke colour.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Builder-style setter for the clip rectangle.
    #[must_use]
    pub fn with_clip_rect(mut self, clip: Option<Rect>) -> Self {
        self.clip_rect = clip;
        self
    }
}

impl Default for GraphicsContext {
    fn default() -> Self {
        Self {
            stroke: StrokeStyle::new(1.0),
            color: Color::BLACK,
            alpha: 1.0,
            clip_rect: None,
            clip_path: None,
            hatch_line_width: 1.0,
            antialiased: true,
        }
    }
}

/// A batch of paths sharing one draw call.
///
/// Item `i` draws `paths[i % paths.len()]` through [`PathCollection::transform`],
/// translated by `offset_transform * offsets[i]` when offsets are present.
/// Styling vectors are cycled the same way; an empty vector means "unset".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathCollection {
    /// Path prototypes.
    pub paths: Vec<BezPath>,
    /// Transform applied to every path.
    pub transform: Affine,
    /// Per-item offsets, in the space of `offset_transform`.
    pub offsets: Vec<Point>,
    /// Maps offsets into display space.
    pub offset_transform: Affine,
    /// Per-item fill colours.
    pub fills: Vec<Option<Color>>,
    /// Per-item stroke colours.
    pub strokes: Vec<Option<Color>>,
    /// Per-item stroke widths in points.
    pub line_widths: Vec<f64>,
}

impl PathCollection {
    /// Number of items drawn by this collection.
    pub fn len(&self) -> usize {
        if self.paths.is_empty() {
            0
        } else {
            self.paths.len().max(self.offsets.len())
        }
    }

    /// Returns `true` if the collection draws nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path prototype used by item `i`.
    pub fn item_path(&self, i: usize) -> &BezPath {
        &self.paths[i % self.paths.len()]
    }

    /// Full transform mapping item `i`'s path into display space.
    pub fn item_transform(&self, i: usize) -> Affine {
        if self.offsets.is_empty() {
            return self.transform;
        }
        let offset = self.offset_transform * self.offsets[i % self.offsets.len()];
        Affine::translate(offset.to_vec2()) * self.transform
    }

    /// Fill colour of item `i`.
    pub fn fill(&self, i: usize) -> Option<Color> {
        cycle(&self.fills, i).copied().flatten()
    }

    /// Stroke colour of item `i`.
    pub fn stroke(&self, i: usize) -> Option<Color> {
        cycle(&self.strokes, i).copied().flatten()
    }

    /// Stroke width of item `i`, if set.
    pub fn line_width(&self, i: usize) -> Option<f64> {
        cycle(&self.line_widths, i).copied()
    }
}

fn cycle<T>(items: &[T], i: usize) -> Option<&T> {
    if items.is_empty() {
        None
    } else {
        items.get(i % items.len())
    }
}

/// State operations. These carry no geometry.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum StateOp {
    /// Open a named group (e.g. an SVG `<g>`). Groups must be well-nested.
    OpenGroup(String),
    /// Close the most recently opened group.
    CloseGroup,
}

/// Position-bearing drawing primitives.
///
/// More variants may be added. Renderers that rewrite coordinates match with
/// a wildcard arm that fails with [`RenderError::UnsupportedPrimitive`], so a
/// primitive they cannot map is reported instead of drawn in the wrong place.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum DrawOp {
    /// Stroke (and optionally fill) a path.
    Path {
        /// Path geometry in its own coordinates.
        path: BezPath,
        /// Maps `path` into display space.
        transform: Affine,
        /// Fill colour, if the path is filled.
        fill: Option<Color>,
    },
    /// Stamp a marker at each position.
    Markers {
        /// Marker shape, in marker units.
        marker: BezPath,
        /// Maps the marker shape into device units relative to each position.
        marker_transform: Affine,
        /// Marker positions in their own coordinates.
        positions: Vec<Point>,
        /// Maps `positions` into display space.
        transform: Affine,
        /// Fill colour for the marker body.
        fill: Option<Color>,
    },
    /// Draw a batch of paths.
    PathCollection(PathCollection),
    /// Draw smoothly shaded triangles.
    GouraudTriangles {
        /// Triangle vertices in their own coordinates.
        triangles: Vec<[Point; 3]>,
        /// One colour per vertex.
        colors: Vec<[Color; 3]>,
        /// Maps `triangles` into display space.
        transform: Affine,
    },
    /// Blit an image.
    ///
    /// With `transform` unset the image is placed unrotated with its top-left
    /// pixel at `origin`, covering `width / magnification` by
    /// `height / magnification` display pixels. With `transform` set it maps
    /// image pixel coordinates into display space and `origin` is ignored.
    Image {
        /// Top-left corner in display space.
        origin: Point,
        /// Pixel data.
        image: Arc<RgbaImage>,
        /// Optional image-to-display transform.
        transform: Option<Affine>,
    },
    /// Draw a string anchored at its baseline start.
    Text {
        /// Anchor in display space.
        position: Point,
        /// The string.
        text: String,
        /// Font description.
        font: FontProps,
        /// Counter-clockwise rotation in degrees.
        angle: f64,
    },
}

impl DrawOp {
    /// Short name of the primitive kind, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Path { .. } => "path",
            Self::Markers { .. } => "markers",
            Self::PathCollection(_) => "path_collection",
            Self::GouraudTriangles { .. } => "gouraud_triangles",
            Self::Image { .. } => "image",
            Self::Text { .. } => "text",
        }
    }
}

/// Output sink for drawing primitives.
///
/// Query methods take `&self` so artists can measure themselves against a
/// shared renderer; drawing takes `&mut self`.
pub trait Renderer {
    /// Size of the output surface in display pixels.
    fn canvas_size(&self) -> Size;

    /// Convert a length in points to display pixels.
    fn points_to_pixels(&self, points: f64) -> f64;

    /// Factor by which images should be supersampled before being handed to
    /// [`DrawOp::Image`].
    #[inline]
    fn image_magnification(&self) -> f64 {
        1.0
    }

    /// Whether the renderer accepts arbitrary image transforms
    /// (`DrawOp::Image { transform: Some(..), .. }`).
    #[inline]
    fn option_scale_image(&self) -> bool {
        false
    }

    /// Measure `text` set in `font`.
    fn text_metrics(&self, text: &str, font: &FontProps) -> Result<TextMetrics, RenderError>;

    /// Apply a state operation.
    fn state(&mut self, op: StateOp) -> Result<(), RenderError>;

    /// Apply a draw operation with the given graphics context.
    fn draw(&mut self, gc: &GraphicsContext, op: DrawOp) -> Result<(), RenderError>;
}

/// Convenience helpers for [`Renderer`] implementations and callers.
///
/// Separate from [`Renderer`] so that methods can accept closures without
/// complicating trait object usage (`&mut dyn Renderer`).
pub trait RendererExt: Renderer {
    /// Run `f` inside a named group, closing it afterwards even if `f` fails.
    fn with_group<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Self) -> Result<R, RenderError>,
    ) -> Result<R, RenderError> {
        self.state(StateOp::OpenGroup(name.into()))?;
        let out = f(self);
        let closed = self.state(StateOp::CloseGroup);
        let value = out?;
        closed?;
        Ok(value)
    }

    /// Draw `path` through `transform`, optionally filled.
    #[inline]
    fn draw_path(
        &mut self,
        gc: &GraphicsContext,
        path: BezPath,
        transform: Affine,
        fill: Option<Color>,
    ) -> Result<(), RenderError> {
        self.draw(
            gc,
            DrawOp::Path {
                path,
                transform,
                fill,
            },
        )
    }
}

impl<R: Renderer + ?Sized> RendererExt for R {}

/// Returns `true` if two rectangles intersect or touch.
///
/// Unlike [`Rect::overlaps`]-style tests, sharing only an edge counts.
#[inline]
pub fn rect_overlaps(a: Rect, b: Rect) -> bool {
    let (a, b) = (a.abs(), b.abs());
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
