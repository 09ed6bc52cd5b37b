// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use kurbo::Rect;
use log::trace;
use plotview_axes::Artist;
use plotview_imaging::{RenderError, Renderer, rect_overlaps};

use crate::{Remapping, TransformRenderer};

/// Draws a borrowed artist into a view instead of its own canvas.
///
/// The proxy never owns the artist's semantics: every [`Artist`] member other
/// than [`Artist::draw`] is answered by the wrapped artist. Drawing goes
/// through a [`TransformRenderer`], with the artist's clip box temporarily
/// widened to its full extent so that the source canvas does not clip what
/// the view should show.
#[derive(Debug)]
pub struct ClippedProxyArtist {
    artist: Rc<dyn Artist>,
    remap: Rc<Remapping>,
    clip_region: Rect,
}

impl ClippedProxyArtist {
    /// Wrap `artist`.
    ///
    /// `clip_region` is the view window in the source's display space; the
    /// artist is skipped when its extent does not reach it.
    pub fn new(artist: Rc<dyn Artist>, remap: Rc<Remapping>, clip_region: Rect) -> Self {
        Self {
            artist,
            remap,
            clip_region,
        }
    }

    /// The wrapped artist.
    pub fn artist(&self) -> &Rc<dyn Artist> {
        &self.artist
    }

    /// The remapping shared with the other proxies of one draw call.
    pub fn remapping(&self) -> &Rc<Remapping> {
        &self.remap
    }

    /// The view window in source display space.
    pub fn clip_region(&self) -> Rect {
        self.clip_region
    }
}

/// Puts a clip box back when dropped.
struct ClipBoxRestore<'a> {
    artist: &'a dyn Artist,
    saved: Option<Rect>,
}

impl<'a> ClipBoxRestore<'a> {
    fn replace(artist: &'a dyn Artist, clip: Option<Rect>) -> Self {
        let saved = artist.clip_box();
        artist.set_clip_box(clip);
        Self { artist, saved }
    }
}

impl Drop for ClipBoxRestore<'_> {
    fn drop(&mut self) {
        self.artist.set_clip_box(self.saved);
    }
}

impl Artist for ClippedProxyArtist {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let mut mapped = TransformRenderer::new(renderer, &self.remap);
        let extent = self
            .artist
            .window_extent(&mapped)
            .map_err(|err| RenderError::ExtentResolution(Box::new(err)))?;

        let _restore = ClipBoxRestore::replace(&*self.artist, Some(extent));
        if !rect_overlaps(extent, self.clip_region) {
            trace!(
                "proxy culled: extent {extent:?} misses view window {:?}",
                self.clip_region
            );
            return Ok(());
        }
        self.artist.draw(&mut mapped)
    }

    fn window_extent(&self, renderer: &dyn Renderer) -> Result<Rect, RenderError> {
        self.artist.window_extent(renderer)
    }

    fn clip_box(&self) -> Option<Rect> {
        self.artist.clip_box()
    }

    fn set_clip_box(&self, clip: Option<Rect>) {
        self.artist.set_clip_box(clip);
    }

    fn zorder(&self) -> f64 {
        self.artist.zorder()
    }

    fn set_zorder(&self, zorder: f64) {
        self.artist.set_zorder(zorder);
    }

    fn is_visible(&self) -> bool {
        self.artist.is_visible()
    }

    fn set_visible(&self, visible: bool) {
        self.artist.set_visible(visible);
    }
}
