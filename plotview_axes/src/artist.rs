// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::Cell;
use std::fmt::Debug;
use std::rc::Rc;

use kurbo::{BezPath, Point, Rect};
use plotview_imaging::{GraphicsContext, RenderError, Renderer};

use crate::TransformHandle;

/// Anything that can draw itself onto a [`Renderer`].
///
/// All methods take `&self`: artists are shared through `Rc` and mutate
/// their small amount of state through cells, so a draw pass may re-enter
/// an artist that is already being drawn elsewhere up the stack.
pub trait Artist: Debug {
    /// Emit primitives for this artist.
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError>;

    /// Display-space bounding box of what [`Artist::draw`] would emit.
    fn window_extent(&self, renderer: &dyn Renderer) -> Result<Rect, RenderError>;

    /// Current clip box in display space.
    fn clip_box(&self) -> Option<Rect>;

    /// Replace the clip box.
    fn set_clip_box(&self, clip: Option<Rect>);

    /// Stacking order; higher draws later.
    fn zorder(&self) -> f64;

    /// Change the stacking order.
    fn set_zorder(&self, zorder: f64);

    /// Whether the artist draws at all.
    fn is_visible(&self) -> bool;

    /// Show or hide the artist.
    fn set_visible(&self, visible: bool);
}

/// A drawable region that owns artists and nested canvases.
pub trait Canvas: Artist {
    /// Artists owned by this canvas, in insertion order.
    fn artists(&self) -> Vec<Rc<dyn Artist>>;

    /// Nested canvases (insets), in insertion order.
    fn child_canvases(&self) -> Vec<Rc<dyn Canvas>>;

    /// Attach a nested canvas.
    fn add_child_canvas(&self, child: Rc<dyn Canvas>);

    /// Everything drawn by the native draw loop: artists, then child canvases.
    fn children(&self) -> Vec<Rc<dyn Artist>> {
        let mut out = self.artists();
        out.extend(
            self.child_canvases()
                .into_iter()
                .map(|c| c as Rc<dyn Artist>),
        );
        out
    }

    /// Visible data range along x.
    fn xlim(&self) -> (f64, f64);

    /// Visible data range along y.
    fn ylim(&self) -> (f64, f64);

    /// Change the visible x range; the data transform follows.
    fn set_xlim(&self, lim: (f64, f64));

    /// Change the visible y range; the data transform follows.
    fn set_ylim(&self, lim: (f64, f64));

    /// Live data-to-display transform.
    fn trans_data(&self) -> TransformHandle;

    /// Display-space box of the canvas.
    fn bounds(&self) -> Rect;

    /// Outline used to clip contents when the canvas is not rectangular.
    fn clip_path(&self) -> Option<BezPath> {
        None
    }

    /// The native draw loop: background, `children` in z-order, decorations.
    fn draw_children(
        &self,
        renderer: &mut dyn Renderer,
        children: &[Rc<dyn Artist>],
    ) -> Result<(), RenderError>;
}

/// Identity of a shared artist, usable as a set or map key.
///
/// Keys compare allocation addresses, so a key taken from an `Rc<Line2D>`
/// equals the key of the same value seen as `Rc<dyn Artist>`.
///
/// [`Line2D`]: crate::Line2D
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtistKey(usize);

impl ArtistKey {
    /// Key for the value behind `artist`.
    pub fn of<A: ?Sized>(artist: &Rc<A>) -> Self {
        Self(Rc::as_ptr(artist).cast::<()>().addr())
    }
}

/// State shared by every concrete artist.
#[derive(Debug)]
pub struct ArtistBase {
    transform: TransformHandle,
    clip_box: Cell<Option<Rect>>,
    zorder: Cell<f64>,
    visible: Cell<bool>,
}

impl ArtistBase {
    /// Create base state drawing through `transform`.
    pub fn new(transform: TransformHandle, zorder: f64) -> Self {
        Self {
            transform,
            clip_box: Cell::new(None),
            zorder: Cell::new(zorder),
            visible: Cell::new(true),
        }
    }

    /// The artist's data transform.
    pub fn transform(&self) -> &TransformHandle {
        &self.transform
    }

    /// See [`Artist::clip_box`].
    pub fn clip_box(&self) -> Option<Rect> {
        self.clip_box.get()
    }

    /// See [`Artist::set_clip_box`].
    pub fn set_clip_box(&self, clip: Option<Rect>) {
        self.clip_box.set(clip);
    }

    /// See [`Artist::zorder`].
    pub fn zorder(&self) -> f64 {
        self.zorder.get()
    }

    /// See [`Artist::set_zorder`].
    pub fn set_zorder(&self, zorder: f64) {
        self.zorder.set(zorder);
    }

    /// See [`Artist::is_visible`].
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// See [`Artist::set_visible`].
    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    /// A graphics context clipped to the current clip box.
    pub fn gc(&self) -> GraphicsContext {
        GraphicsContext::default().with_clip_rect(self.clip_box())
    }
}

/// Implements the [`Artist`] members that delegate to an `ArtistBase` field.
macro_rules! forward_artist_base {
    ($field:ident) => {
        fn clip_box(&self) -> Option<kurbo::Rect> {
            self.$field.clip_box()
        }

        fn set_clip_box(&self, clip: Option<kurbo::Rect>) {
            self.$field.set_clip_box(clip);
        }

        fn zorder(&self) -> f64 {
            self.$field.zorder()
        }

        fn set_zorder(&self, zorder: f64) {
            self.$field.set_zorder(zorder);
        }

        fn is_visible(&self) -> bool {
            self.$field.is_visible()
        }

        fn set_visible(&self, visible: bool) {
            self.$field.set_visible(visible);
        }
    };
}

pub(crate) use forward_artist_base;

/// Bounding box of `points`, or `None` when empty.
pub(crate) fn bbox_of(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    points
        .into_iter()
        .map(|p| Rect::from_points(p, p))
        .reduce(|a, b| a.union(b))
}
