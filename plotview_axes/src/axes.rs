// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Affine, BezPath, Ellipse, Point, Rect, Shape};
use peniko::Color;
use plotview_imaging::{GraphicsContext, RenderError, Renderer, RendererExt, RgbaImage};

use crate::artist::forward_artist_base;
use crate::transform::data_to_display;
use crate::{Artist, ArtistBase, AxesImage, Canvas, Line2D, Patch, Text, TransformHandle};

/// Outline of an [`Axes`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AxesShape {
    /// The usual box.
    #[default]
    Rectangular,
    /// An ellipse inscribed in the box; contents are clipped to it.
    Elliptical,
}

/// A rectangular plotting region with its own data limits.
#[derive(Debug)]
pub struct Axes {
    base: ArtistBase,
    bounds: Cell<Rect>,
    xlim: Cell<(f64, f64)>,
    ylim: Cell<(f64, f64)>,
    trans_data: TransformHandle,
    shape: Cell<AxesShape>,
    face: Cell<Option<Color>>,
    frame: Cell<Option<Color>>,
    artists: RefCell<Vec<Rc<dyn Artist>>>,
    child_canvases: RefCell<Vec<Rc<dyn Canvas>>>,
}

impl Axes {
    /// Default stacking order for axes.
    pub const ZORDER: f64 = 0.0;

    /// An axes occupying `bounds` in display space, showing `[0, 1]` on both axes.
    pub fn new(bounds: Rect) -> Self {
        let bounds = bounds.abs();
        let (xlim, ylim) = ((0.0, 1.0), (0.0, 1.0));
        Self {
            base: ArtistBase::new(TransformHandle::default(), Self::ZORDER),
            bounds: Cell::new(bounds),
            xlim: Cell::new(xlim),
            ylim: Cell::new(ylim),
            trans_data: TransformHandle::new(data_to_display(bounds, xlim, ylim)),
            shape: Cell::new(AxesShape::Rectangular),
            face: Cell::new(Some(Color::WHITE)),
            frame: Cell::new(Some(Color::BLACK)),
            artists: RefCell::new(Vec::new()),
            child_canvases: RefCell::new(Vec::new()),
        }
    }

    /// Builder-style setter for the outline shape.
    #[must_use]
    pub fn with_shape(self, shape: AxesShape) -> Self {
        self.shape.set(shape);
        self
    }

    /// Outline shape.
    pub fn shape(&self) -> AxesShape {
        self.shape.get()
    }

    /// Move or resize the axes.
    ///
    /// Artists still clipped to the old box are re-clipped to the new one.
    pub fn set_bounds(&self, bounds: Rect) {
        let old = self.bounds.replace(bounds.abs());
        for artist in self.artists.borrow().iter() {
            if artist.clip_box() == Some(old) {
                artist.set_clip_box(Some(bounds.abs()));
            }
        }
        self.update_trans_data();
    }

    /// Background colour, or `None` for a transparent background.
    pub fn set_face_color(&self, color: Option<Color>) {
        self.face.set(color);
    }

    /// Frame colour, or `None` for no frame.
    pub fn set_frame_color(&self, color: Option<Color>) {
        self.frame.set(color);
    }

    /// Take ownership of `artist`, clipping it to the axes box.
    pub fn add_artist<A: Artist + 'static>(&self, artist: Rc<A>) -> Rc<A> {
        artist.set_clip_box(Some(self.bounds.get()));
        self.artists.borrow_mut().push(artist.clone());
        artist
    }

    /// Remove `artist`. Returns `true` if it was present.
    pub fn remove_artist<A: Artist + ?Sized>(&self, artist: &Rc<A>) -> bool {
        let mut artists = self.artists.borrow_mut();
        let before = artists.len();
        artists.retain(|a| !std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(artist)));
        artists.len() != before
    }

    /// Draw a line through `points`.
    pub fn plot(&self, points: Vec<Point>) -> Rc<Line2D> {
        self.add_artist(Rc::new(Line2D::new(points, self.trans_data.clone())))
    }

    /// Add a circle of `radius` data units around `center`.
    pub fn add_circle(&self, center: Point, radius: f64) -> Rc<Patch> {
        self.add_artist(Rc::new(Patch::circle(
            center,
            radius,
            self.trans_data.clone(),
        )))
    }

    /// Show `image` over the data rectangle `extent`.
    pub fn imshow(&self, image: RgbaImage, extent: Rect) -> Rc<AxesImage> {
        self.add_artist(Rc::new(AxesImage::new(
            image,
            extent,
            self.trans_data.clone(),
        )))
    }

    /// Place `s` at the data point `position`.
    pub fn text(&self, position: Point, s: impl Into<String>) -> Rc<Text> {
        self.add_artist(Rc::new(Text::new(position, s, self.trans_data.clone())))
    }

    /// Display box for an inset given as `[left, bottom, width, height]`
    /// fractions of this axes, measured from its lower-left corner.
    pub fn inset_bounds(&self, fraction: [f64; 4]) -> Rect {
        let b = self.bounds.get();
        let [left, bottom, width, height] = fraction;
        let x0 = b.x0 + left * b.width();
        let y1 = b.y1 - bottom * b.height();
        Rect::new(x0, y1 - height * b.height(), x0 + width * b.width(), y1)
    }

    fn update_trans_data(&self) {
        self.trans_data.set(data_to_display(
            self.bounds.get(),
            self.xlim.get(),
            self.ylim.get(),
        ));
    }

    fn outline(&self) -> BezPath {
        let bounds = self.bounds.get();
        match self.shape() {
            AxesShape::Rectangular => bounds.to_path(0.0),
            AxesShape::Elliptical => Ellipse::from_rect(bounds).to_path(0.1),
        }
    }
}

impl Artist for Axes {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        if !self.is_visible() {
            return Ok(());
        }
        self.draw_children(renderer, &self.children())
    }

    fn window_extent(&self, _renderer: &dyn Renderer) -> Result<Rect, RenderError> {
        Ok(self.bounds.get())
    }

    forward_artist_base!(base);
}

impl Canvas for Axes {
    fn artists(&self) -> Vec<Rc<dyn Artist>> {
        self.artists.borrow().clone()
    }

    fn child_canvases(&self) -> Vec<Rc<dyn Canvas>> {
        self.child_canvases.borrow().clone()
    }

    fn add_child_canvas(&self, child: Rc<dyn Canvas>) {
        self.child_canvases.borrow_mut().push(child);
    }

    fn xlim(&self) -> (f64, f64) {
        self.xlim.get()
    }

    fn ylim(&self) -> (f64, f64) {
        self.ylim.get()
    }

    fn set_xlim(&self, lim: (f64, f64)) {
        self.xlim.set(lim);
        self.update_trans_data();
    }

    fn set_ylim(&self, lim: (f64, f64)) {
        self.ylim.set(lim);
        self.update_trans_data();
    }

    fn trans_data(&self) -> TransformHandle {
        self.trans_data.clone()
    }

    fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    fn clip_path(&self) -> Option<BezPath> {
        match self.shape() {
            AxesShape::Rectangular => None,
            AxesShape::Elliptical => Some(self.outline()),
        }
    }

    fn draw_children(
        &self,
        renderer: &mut dyn Renderer,
        children: &[Rc<dyn Artist>],
    ) -> Result<(), RenderError> {
        let mut ordered = children.to_vec();
        // Stable, so equal z-orders keep insertion order.
        ordered.sort_by(|a, b| a.zorder().total_cmp(&b.zorder()));

        renderer.with_group("axes", |r| {
            let gc = GraphicsContext::default().with_clip_rect(self.clip_box());
            if let Some(face) = self.face.get() {
                let fill_gc = gc.clone().with_line_width(0.0);
                r.draw_path(&fill_gc, self.outline(), Affine::IDENTITY, Some(face))?;
            }
            for child in &ordered {
                if child.is_visible() {
                    child.draw(r)?;
                }
            }
            if let Some(frame) = self.frame.get() {
                let frame_gc = gc.with_color(frame);
                r.draw_path(&frame_gc, self.outline(), Affine::IDENTITY, None)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotview_imaging::DrawOp;
    use plotview_imaging_ref::RecordingRenderer;

    #[test]
    fn limits_drive_the_data_transform() {
        let axes = Axes::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let handle = axes.trans_data();
        axes.set_xlim((0.0, 10.0));
        axes.set_ylim((0.0, 10.0));
        assert_eq!(handle.get() * Point::new(5.0, 5.0), Point::new(50.0, 50.0));
        assert_eq!(handle.get() * Point::new(10.0, 10.0), Point::new(100.0, 0.0));
    }

    #[test]
    fn artists_are_clipped_to_the_box_and_follow_resizes() {
        let axes = Axes::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let line = axes.plot(vec![Point::ZERO, Point::new(1.0, 1.0)]);
        assert_eq!(line.clip_box(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        axes.set_bounds(Rect::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(line.clip_box(), Some(Rect::new(10.0, 10.0, 50.0, 50.0)));
    }

    #[test]
    fn children_draw_in_zorder_inside_a_group() {
        let axes = Axes::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        axes.set_face_color(None);
        axes.set_frame_color(None);
        let line = axes.plot(vec![Point::ZERO, Point::new(1.0, 1.0)]);
        let _label = axes.text(Point::ZERO, "label");
        let _circle = axes.add_circle(Point::new(0.5, 0.5), 0.1);
        line.set_zorder(10.0);

        let mut r = RecordingRenderer::default();
        axes.draw(&mut r).unwrap();

        let kinds: Vec<_> = r.draws().map(|(op, _)| op.name()).collect();
        assert_eq!(kinds, ["path", "text", "path"]);
        assert_eq!(r.group_depth(), 0);
        assert_eq!(r.events().len(), 5);
    }

    #[test]
    fn remove_artist_by_identity() {
        let axes = Axes::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let a = axes.plot(vec![Point::ZERO]);
        let b = axes.plot(vec![Point::ZERO]);
        assert!(axes.remove_artist(&a));
        assert!(!axes.remove_artist(&a));
        assert_eq!(axes.artists().len(), 1);
        assert!(std::ptr::addr_eq(
            Rc::as_ptr(&axes.artists()[0]),
            Rc::as_ptr(&b)
        ));
    }

    #[test]
    fn elliptical_axes_expose_a_clip_path() {
        let axes =
            Axes::new(Rect::new(0.0, 0.0, 20.0, 10.0)).with_shape(AxesShape::Elliptical);
        let path = axes.clip_path().expect("elliptical axes clip");
        let bbox = path.bounding_box();
        assert!((bbox.width() - 20.0).abs() < 1e-6);
        assert!(Axes::new(Rect::ZERO).clip_path().is_none());

        let mut r = RecordingRenderer::default();
        axes.draw(&mut r).unwrap();
        assert!(matches!(
            r.draws().next(),
            Some((DrawOp::Path { fill: Some(_), .. }, _))
        ));
    }

    #[test]
    fn inset_bounds_measure_from_lower_left() {
        let axes = Axes::new(Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(
            axes.inset_bounds([0.5, 0.5, 0.25, 0.5]),
            Rect::new(100.0, 0.0, 150.0, 50.0)
        );
    }
}
