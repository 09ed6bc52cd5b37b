// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use hashbrown::HashSet;
use kurbo::{BezPath, Rect};
use log::{debug, trace};
use plotview_axes::{Artist, ArtistKey, Canvas, TransformHandle};
use plotview_imaging::{Interpolation, RenderError, Renderer};

use crate::{ClippedProxyArtist, Remapping};

/// How deep views may nest inside each other's draw passes by default.
pub const DEFAULT_RENDER_DEPTH: u32 = 5;

/// Per-source view settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewSpecification {
    /// Interpolation used when source images are resampled into the view.
    pub image_interpolation: Interpolation,
    /// Source artists to mirror; `None` mirrors everything.
    pub filter_set: Option<HashSet<ArtistKey>>,
    /// Whether stroke widths, marker sizes, and font sizes follow the zoom.
    pub scale_lines: bool,
}

impl Default for ViewSpecification {
    fn default() -> Self {
        Self::new(Interpolation::default())
    }
}

impl ViewSpecification {
    /// Mirror everything, scaling lines, with the given interpolation.
    pub fn new(image_interpolation: Interpolation) -> Self {
        Self {
            image_interpolation,
            filter_set: None,
            scale_lines: true,
        }
    }

    /// Mirror only the listed artists.
    #[must_use]
    pub fn with_filter(mut self, artists: impl IntoIterator<Item = ArtistKey>) -> Self {
        self.filter_set = Some(artists.into_iter().collect());
        self
    }

    /// Builder-style setter for [`ViewSpecification::scale_lines`].
    #[must_use]
    pub fn with_scale_lines(mut self, scale_lines: bool) -> Self {
        self.scale_lines = scale_lines;
        self
    }

    /// Whether the artist with `key` is mirrored.
    pub fn admits(&self, key: ArtistKey) -> bool {
        self.filter_set
            .as_ref()
            .is_none_or(|set| set.contains(&key))
    }
}

#[derive(Clone, Debug)]
struct SourceBinding {
    source: Weak<dyn Canvas>,
    spec: ViewSpecification,
}

impl SourceBinding {
    fn is<S: ?Sized>(&self, source: &Rc<S>) -> bool {
        std::ptr::addr_eq(self.source.as_ptr(), Rc::as_ptr(source))
    }
}

fn downgrade_source<S: Canvas + 'static>(source: &Rc<S>) -> Weak<dyn Canvas> {
    let weak: Weak<S> = Rc::downgrade(source);
    weak
}

/// Counts one level of view nesting for as long as it lives.
struct RenderDepthGuard<'a>(&'a Cell<u32>);

impl<'a> RenderDepthGuard<'a> {
    fn enter(depth: &'a Cell<u32>, max: u32) -> Option<Self> {
        let current = depth.get();
        if current >= max {
            return None;
        }
        depth.set(current + 1);
        Some(Self(depth))
    }
}

impl Drop for RenderDepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// A canvas that also shows, live, what one or more source canvases draw.
///
/// `ViewAxes` wraps an ordinary canvas `C` and behaves exactly like it,
/// except that while it is being drawn its children are extended with a
/// [`ClippedProxyArtist`] for every artist and nested canvas of each bound
/// source. The proxies replay the source's drawing through a
/// [`TransformRenderer`](crate::TransformRenderer), so the view needs no
/// copies of the source's data and follows every later change to it.
///
/// Views may show each other, directly or through insets. Each view stops
/// contributing once it is nested [`max_render_depth`](Self::max_render_depth)
/// draw passes deep.
#[derive(Debug)]
pub struct ViewAxes<C> {
    inner: C,
    bindings: RefCell<Vec<SourceBinding>>,
    render_depth: Cell<u32>,
    max_render_depth: Cell<u32>,
}

impl<C: Canvas> ViewAxes<C> {
    /// Wrap `inner` without any source; it draws like `inner` until one is bound.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            bindings: RefCell::new(Vec::new()),
            render_depth: Cell::new(0),
            max_render_depth: Cell::new(DEFAULT_RENDER_DEPTH),
        }
    }

    /// Turn an already configured canvas into a view of `source`.
    ///
    /// Bounds, limits, and children of `inner` are kept as they are.
    pub fn from_existing<S: Canvas + 'static>(
        inner: C,
        source: &Rc<S>,
        interpolation: Interpolation,
    ) -> Self {
        let view = Self::new(inner);
        view.bind_source(source, interpolation);
        view
    }

    /// The wrapped canvas.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap, dropping every source binding.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Make `source` the only source, mirrored in full with line scaling on.
    ///
    /// The view's own limits are left untouched.
    pub fn bind_source<S: Canvas + 'static>(&self, source: &Rc<S>, interpolation: Interpolation) {
        *self.bindings.borrow_mut() = vec![SourceBinding {
            source: downgrade_source(source),
            spec: ViewSpecification::new(interpolation),
        }];
    }

    /// Add `source` with its own settings, or replace the settings of an
    /// already bound source. Returns the replaced settings.
    pub fn add_source<S: Canvas + 'static>(
        &self,
        source: &Rc<S>,
        spec: ViewSpecification,
    ) -> Option<ViewSpecification> {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(binding) = bindings.iter_mut().find(|b| b.is(source)) {
            return Some(std::mem::replace(&mut binding.spec, spec));
        }
        bindings.push(SourceBinding {
            source: downgrade_source(source),
            spec,
        });
        None
    }

    /// Stop showing `source`. Returns its settings if it was bound.
    pub fn remove_source<S: ?Sized>(&self, source: &Rc<S>) -> Option<ViewSpecification> {
        let mut bindings = self.bindings.borrow_mut();
        let index = bindings.iter().position(|b| b.is(source))?;
        Some(bindings.remove(index).spec)
    }

    /// Settings for `source`, if it is bound.
    pub fn view_specification<S: ?Sized>(&self, source: &Rc<S>) -> Option<ViewSpecification> {
        self.bindings
            .borrow()
            .iter()
            .find(|b| b.is(source))
            .map(|b| b.spec.clone())
    }

    /// Live sources, in binding order.
    pub fn sources(&self) -> Vec<Rc<dyn Canvas>> {
        self.bindings
            .borrow()
            .iter()
            .filter_map(|b| b.source.upgrade())
            .collect()
    }

    /// Whether stroke widths follow the zoom. Reads the first binding.
    pub fn line_scaling(&self) -> bool {
        self.bindings
            .borrow()
            .first()
            .is_none_or(|b| b.spec.scale_lines)
    }

    /// Turn line scaling on or off for every source.
    pub fn set_line_scaling(&self, scale_lines: bool) {
        for binding in self.bindings.borrow_mut().iter_mut() {
            binding.spec.scale_lines = scale_lines;
        }
    }

    /// Image interpolation. Reads the first binding.
    pub fn image_interpolation(&self) -> Interpolation {
        self.bindings
            .borrow()
            .first()
            .map(|b| b.spec.image_interpolation)
            .unwrap_or_default()
    }

    /// Set the image interpolation for every source.
    pub fn set_image_interpolation(&self, interpolation: Interpolation) {
        for binding in self.bindings.borrow_mut().iter_mut() {
            binding.spec.image_interpolation = interpolation;
        }
    }

    /// Nesting limit for this view's draw passes.
    pub fn max_render_depth(&self) -> u32 {
        self.max_render_depth.get()
    }

    /// Change the nesting limit. Zero disables drawing entirely.
    pub fn set_max_render_depth(&self, depth: u32) {
        self.max_render_depth.set(depth);
    }

    /// How many draw passes of this view are currently on the stack.
    pub fn render_depth(&self) -> u32 {
        self.render_depth.get()
    }

    /// Children for the next draw.
    ///
    /// Without an active renderer this is just the wrapped canvas's own
    /// children. During a draw pass (`active` is `Some`) it also holds one
    /// proxy per admitted artist and nested canvas of every live source,
    /// never including this view itself.
    pub fn enumerate_children(&self, active: Option<&dyn Renderer>) -> Vec<Rc<dyn Artist>> {
        let mut children = self.inner.children();
        if active.is_none() {
            return children;
        }
        let bindings = self.bindings.borrow().clone();
        for binding in &bindings {
            let Some(source) = binding.source.upgrade() else {
                debug!("view source was dropped; skipping it");
                continue;
            };
            children.extend(self.proxied_children(&*source, &binding.spec));
        }
        children
    }

    fn proxied_children(
        &self,
        source: &dyn Canvas,
        spec: &ViewSpecification,
    ) -> Vec<Rc<dyn Artist>> {
        let source_data = source.trans_data().get();
        let Some(remap) = Remapping::new(
            source_data,
            self.inner.trans_data().get(),
            self.inner.bounds(),
            spec.image_interpolation,
            spec.scale_lines,
        ) else {
            debug!("source data transform is not invertible; nothing to show");
            return Vec::new();
        };
        let remap = Rc::new(remap.with_clip_path(self.inner.clip_path()));

        // The view window, expressed where the source's artists report extents.
        let (x0, x1) = self.inner.xlim();
        let (y0, y1) = self.inner.ylim();
        let clip_region = source_data.transform_rect_bbox(Rect::new(x0, y0, x1, y1));

        let this: *const Self = self;
        source
            .children()
            .into_iter()
            .filter(|child| !std::ptr::addr_eq(Rc::as_ptr(child), this))
            .filter(|child| spec.admits(ArtistKey::of(child)))
            .map(|child| {
                Rc::new(ClippedProxyArtist::new(child, remap.clone(), clip_region))
                    as Rc<dyn Artist>
            })
            .collect()
    }
}

impl<C: Canvas> Artist for ViewAxes<C> {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        if !self.is_visible() {
            return Ok(());
        }
        let Some(_depth) = RenderDepthGuard::enter(&self.render_depth, self.max_render_depth())
        else {
            trace!(
                "view render depth limit {} reached; not drawing",
                self.max_render_depth()
            );
            return Ok(());
        };
        let children = self.enumerate_children(Some(&*renderer));
        self.inner.draw_children(renderer, &children)
    }

    fn window_extent(&self, renderer: &dyn Renderer) -> Result<Rect, RenderError> {
        self.inner.window_extent(renderer)
    }

    fn clip_box(&self) -> Option<Rect> {
        self.inner.clip_box()
    }

    fn set_clip_box(&self, clip: Option<Rect>) {
        self.inner.set_clip_box(clip);
    }

    fn zorder(&self) -> f64 {
        self.inner.zorder()
    }

    fn set_zorder(&self, zorder: f64) {
        self.inner.set_zorder(zorder);
    }

    fn is_visible(&self) -> bool {
        self.inner.is_visible()
    }

    fn set_visible(&self, visible: bool) {
        self.inner.set_visible(visible);
    }
}

impl<C: Canvas> Canvas for ViewAxes<C> {
    fn artists(&self) -> Vec<Rc<dyn Artist>> {
        self.inner.artists()
    }

    fn child_canvases(&self) -> Vec<Rc<dyn Canvas>> {
        self.inner.child_canvases()
    }

    fn add_child_canvas(&self, child: Rc<dyn Canvas>) {
        self.inner.add_child_canvas(child);
    }

    fn children(&self) -> Vec<Rc<dyn Artist>> {
        self.enumerate_children(None)
    }

    fn xlim(&self) -> (f64, f64) {
        self.inner.xlim()
    }

    fn ylim(&self) -> (f64, f64) {
        self.inner.ylim()
    }

    fn set_xlim(&self, lim: (f64, f64)) {
        self.inner.set_xlim(lim);
    }

    fn set_ylim(&self, lim: (f64, f64)) {
        self.inner.set_ylim(lim);
    }

    fn trans_data(&self) -> TransformHandle {
        self.inner.trans_data()
    }

    fn bounds(&self) -> Rect {
        self.inner.bounds()
    }

    fn clip_path(&self) -> Option<BezPath> {
        self.inner.clip_path()
    }

    fn draw_children(
        &self,
        renderer: &mut dyn Renderer,
        children: &[Rc<dyn Artist>],
    ) -> Result<(), RenderError> {
        self.inner.draw_children(renderer, children)
    }
}
