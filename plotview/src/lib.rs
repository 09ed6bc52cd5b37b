// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=plotview --heading-base-level=0

//! Plotview: live views of one canvas drawn inside another.
//!
//! A [`ViewAxes`] is an ordinary canvas that, each time it is drawn, also
//! draws everything a *source* canvas contains, mapped from the source's
//! data space into its own. Because it replays the source's artists rather
//! than copying them, the view always shows the source's current state and
//! can pan and zoom independently of it. Typical uses are zoom insets and
//! side-by-side panels of the same data at different scales.
//!
//! The pieces:
//!
//! - [`TransformRenderer`] wraps the real [`Renderer`](plotview_imaging::Renderer)
//!   and rewrites every primitive from source display space into view display
//!   space, clipping to the view and culling what cannot reach it.
//! - [`ClippedProxyArtist`] stands in for one source artist inside the view.
//! - [`ViewAxes`] owns the source bindings, builds proxies during drawing,
//!   and bounds how deeply views may nest through each other.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Point;
//! use plotview::inset_zoom_axes;
//! use plotview_axes::{Canvas, Figure};
//! use plotview_imaging::Interpolation;
//! use plotview_imaging_ref::RecordingRenderer;
//!
//! let fig = Figure::new(400.0, 400.0);
//! let ax = fig.add_axes([0.1, 0.1, 0.8, 0.8]);
//! ax.set_xlim((0.0, 10.0));
//! ax.set_ylim((0.0, 10.0));
//! ax.plot(vec![Point::new(0.0, 0.0), Point::new(9.0, 9.0)]);
//!
//! let inset = inset_zoom_axes(&ax, [0.6, 0.6, 0.35, 0.35], Interpolation::Nearest);
//! inset.set_xlim((1.0, 5.0));
//! inset.set_ylim((1.0, 5.0));
//!
//! let mut renderer = RecordingRenderer::new(400.0, 400.0);
//! fig.draw(&mut renderer).unwrap();
//! assert_eq!(inset.render_depth(), 0);
//! ```

mod proxy;
mod transform_renderer;
mod view_axes;

use std::rc::Rc;

use plotview_axes::{Artist, Axes, Canvas, Figure};
use plotview_imaging::Interpolation;

pub use proxy::ClippedProxyArtist;
pub use transform_renderer::{Remapping, TransformRenderer};
pub use view_axes::{DEFAULT_RENDER_DEPTH, ViewAxes, ViewSpecification};

/// Stacking order given to insets so they draw above their parent's artists.
pub const INSET_ZORDER: f64 = 5.0;

/// Add a view of `source` to `figure` at `[left, bottom, width, height]`
/// figure fractions.
///
/// The new view starts with the default `[0, 1]` limits; set them to choose
/// what part of the source it shows.
pub fn view<S: Canvas + 'static>(
    figure: &Figure,
    fraction: [f64; 4],
    source: &Rc<S>,
    interpolation: Interpolation,
) -> Rc<ViewAxes<Axes>> {
    let inner = Axes::new(figure.fraction_rect(fraction));
    let view = Rc::new(ViewAxes::from_existing(inner, source, interpolation));
    figure.add_canvas(view.clone());
    view
}

/// Create a zoom inset inside `parent` that shows `parent` itself.
///
/// `bounds` are `[left, bottom, width, height]` fractions of the parent's
/// box, measured from its lower-left corner. The inset is a child canvas of
/// the parent and never draws itself. It sits at [`INSET_ZORDER`]; use
/// [`inset_zoom_axes_at`] to choose another stacking order.
pub fn inset_zoom_axes(
    parent: &Rc<Axes>,
    bounds: [f64; 4],
    interpolation: Interpolation,
) -> Rc<ViewAxes<Axes>> {
    inset_zoom_axes_at(parent, bounds, interpolation, INSET_ZORDER)
}

/// Like [`inset_zoom_axes`], with the inset placed at `zorder` among the
/// parent's artists.
pub fn inset_zoom_axes_at(
    parent: &Rc<Axes>,
    bounds: [f64; 4],
    interpolation: Interpolation,
    zorder: f64,
) -> Rc<ViewAxes<Axes>> {
    let inner = Axes::new(parent.inset_bounds(bounds));
    inner.set_zorder(zorder);
    let view = Rc::new(ViewAxes::from_existing(inner, parent, interpolation));
    parent.add_child_canvas(view.clone());
    view
}
