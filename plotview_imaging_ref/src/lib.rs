// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=plotview_imaging_ref --heading-base-level=0

//! Plotview Imaging Reference Renderer.
//!
//! This crate provides [`RecordingRenderer`], a small implementation of
//! [`Renderer`] for **primitive recording and state tracing**.
//!
//! It is intentionally *not* a rasterizer:
//! - It does **not** produce pixels.
//! - It does **not** define "golden" rendering behaviour.
//! - It is intended for tests and debugging that want to assert on emitted
//!   primitives and the graphics context in force when each was issued.
//!
//! Text metrics are synthesized from the font size so that artists which
//! measure text can lay themselves out; they can be switched off to exercise
//! extent-resolution failures.

use kurbo::Size;
use plotview_imaging::{
    DrawOp, FontProps, GraphicsContext, RenderError, Renderer, StateOp, TextMetrics,
};

/// Event recorded by the reference renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// State operation, with the group depth after applying it.
    State {
        /// State operation that was applied.
        op: StateOp,
        /// Number of open groups after the operation.
        group_depth: u32,
    },
    /// Draw operation and the graphics context used for it.
    Draw {
        /// Draw operation that was applied.
        op: DrawOp,
        /// Graphics context passed with the operation.
        gc: GraphicsContext,
    },
}

/// Renderer that records everything it is asked to do.
#[derive(Clone, Debug)]
pub struct RecordingRenderer {
    size: Size,
    dpi: f64,
    magnification: f64,
    text_metrics: bool,
    /// Log of events in the order they were applied.
    events: Vec<Event>,
    group_depth: u32,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new(640.0, 480.0)
    }
}

impl RecordingRenderer {
    /// Create a recorder for a canvas of `width` by `height` display pixels at 100 dpi.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            dpi: 100.0,
            magnification: 1.0,
            text_metrics: true,
            events: Vec::new(),
            group_depth: 0,
        }
    }

    /// Set the resolution used for point-to-pixel conversion.
    #[must_use]
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the image magnification reported to artists.
    #[must_use]
    pub fn with_image_magnification(mut self, magnification: f64) -> Self {
        self.magnification = magnification;
        self
    }

    /// Make [`Renderer::text_metrics`] fail with
    /// [`RenderError::TextMetricsUnavailable`].
    #[must_use]
    pub fn without_text_metrics(mut self) -> Self {
        self.text_metrics = false;
        self
    }

    /// Returns a slice of recorded events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterate over recorded draw operations with their graphics contexts.
    pub fn draws(&self) -> impl Iterator<Item = (&DrawOp, &GraphicsContext)> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Draw { op, gc } => Some((op, gc)),
            Event::State { .. } => None,
        })
    }

    /// Clears all recorded events.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Number of currently open groups.
    pub fn group_depth(&self) -> u32 {
        self.group_depth
    }
}

impl Renderer for RecordingRenderer {
    fn canvas_size(&self) -> Size {
        self.size
    }

    fn points_to_pixels(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }

    fn image_magnification(&self) -> f64 {
        self.magnification
    }

    fn text_metrics(&self, text: &str, font: &FontProps) -> Result<TextMetrics, RenderError> {
        if !self.text_metrics {
            return Err(RenderError::TextMetricsUnavailable);
        }
        let size = self.points_to_pixels(font.size);
        let chars = text.chars().count();
        #[allow(clippy::cast_precision_loss, reason = "string lengths are small")]
        let width = 0.6 * size * chars as f64;
        Ok(TextMetrics {
            width,
            height: size,
            descent: 0.2 * size,
        })
    }

    fn state(&mut self, op: StateOp) -> Result<(), RenderError> {
        match &op {
            StateOp::OpenGroup(_) => self.group_depth += 1,
            StateOp::CloseGroup => {
                self.group_depth = self.group_depth.checked_sub(1).ok_or_else(|| {
                    RenderError::Backend("close_group without a matching open_group".into())
                })?;
            }
            _ => {}
        }
        self.events.push(Event::State {
            op,
            group_depth: self.group_depth,
        });
        Ok(())
    }

    fn draw(&mut self, gc: &GraphicsContext, op: DrawOp) -> Result<(), RenderError> {
        self.events.push(Event::Draw { op, gc: gc.clone() });
        Ok(())
    }
}
