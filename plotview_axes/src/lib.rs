// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=plotview_axes --heading-base-level=0

//! Plotview Axes: the figure, axes, and artist object model.
//!
//! This crate provides the retained plotting objects that Plotview views
//! read from and draw into:
//!
//! - [`Artist`]: anything that draws itself onto a
//!   [`Renderer`](plotview_imaging::Renderer), reports its display extent,
//!   and carries a clip box, z-order, and visibility.
//! - [`Canvas`]: an artist that owns other artists and nested canvases and
//!   exposes data limits plus a live data-to-display transform
//!   ([`TransformHandle`]).
//! - [`Axes`] and [`Figure`]: the concrete canvas and its top-level container.
//! - Concrete artists: [`Line2D`], [`Patch`], [`AxesImage`], [`Text`],
//!   [`LineCollection`], [`TriMesh`].
//!
//! Objects are shared through `Rc` and mutated through `&self` with cells,
//! so the draw pass can be re-entered: a canvas being drawn may be asked to
//! draw again further down the stack. Nothing here is `Send` or `Sync`.
//!
//! # Coordinates
//!
//! Data coordinates are y-up. Display coordinates are device pixels, y-down,
//! with the origin at the top-left corner of the figure.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Point;
//! use plotview_axes::{Canvas, Figure};
//! use plotview_imaging_ref::RecordingRenderer;
//!
//! let fig = Figure::new(640.0, 480.0);
//! let ax = fig.add_axes([0.1, 0.1, 0.8, 0.8]);
//! ax.set_xlim((0.0, 10.0));
//! ax.set_ylim((0.0, 10.0));
//! ax.plot(vec![Point::new(0.0, 0.0), Point::new(9.0, 9.0)]);
//!
//! let mut renderer = RecordingRenderer::new(640.0, 480.0);
//! fig.draw(&mut renderer).unwrap();
//! assert!(renderer.draws().count() > 0);
//! ```

mod artist;
mod axes;
mod collections;
mod figure;
mod image;
mod lines;
mod patches;
mod text;
mod transform;

pub use artist::{Artist, ArtistBase, ArtistKey, Canvas};
pub use axes::{Axes, AxesShape};
pub use collections::{LineCollection, TriMesh};
pub use figure::Figure;
pub use image::{AxesImage, ImageOrigin};
pub use lines::{Line2D, Marker};
pub use patches::Patch;
pub use text::Text;
pub use transform::TransformHandle;
