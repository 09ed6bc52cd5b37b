// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Affine, Rect, Shape, Size};
use peniko::Color;
use plotview_imaging::{GraphicsContext, RenderError, Renderer, RendererExt};

use crate::{Axes, Canvas};

/// Top-level container: a sized surface holding canvases.
#[derive(Debug)]
pub struct Figure {
    size: Size,
    face: Option<Color>,
    canvases: RefCell<Vec<Rc<dyn Canvas>>>,
}

impl Figure {
    /// A figure of `width` by `height` display pixels.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            face: Some(Color::WHITE),
            canvases: RefCell::new(Vec::new()),
        }
    }

    /// Size in display pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Display box for `[left, bottom, width, height]` figure fractions,
    /// measured from the lower-left corner.
    pub fn fraction_rect(&self, fraction: [f64; 4]) -> Rect {
        let [left, bottom, width, height] = fraction;
        let (w, h) = (self.size.width, self.size.height);
        let y1 = (1.0 - bottom) * h;
        Rect::new(left * w, y1 - height * h, (left + width) * w, y1)
    }

    /// Add a plain [`Axes`] at figure fractions `[left, bottom, width, height]`.
    pub fn add_axes(&self, fraction: [f64; 4]) -> Rc<Axes> {
        let axes = Rc::new(Axes::new(self.fraction_rect(fraction)));
        self.add_canvas(axes.clone());
        axes
    }

    /// Add an already constructed canvas.
    pub fn add_canvas(&self, canvas: Rc<dyn Canvas>) {
        self.canvases.borrow_mut().push(canvas);
    }

    /// A `rows` by `cols` grid of axes, row-major from the top-left.
    pub fn subplots(&self, rows: usize, cols: usize) -> Vec<Rc<Axes>> {
        const LEFT: f64 = 0.125;
        const RIGHT: f64 = 0.9;
        const BOTTOM: f64 = 0.11;
        const TOP: f64 = 0.88;
        const SPACE: f64 = 0.2;

        if rows == 0 || cols == 0 {
            return Vec::new();
        }
        #[allow(clippy::cast_precision_loss, reason = "grid sizes are small")]
        let (nr, nc) = (rows as f64, cols as f64);
        let cell_w = (RIGHT - LEFT) / (nc + SPACE * (nc - 1.0));
        let cell_h = (TOP - BOTTOM) / (nr + SPACE * (nr - 1.0));

        let mut out = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                #[allow(clippy::cast_precision_loss, reason = "grid sizes are small")]
                let (r, c) = (row as f64, col as f64);
                let left = LEFT + c * cell_w * (1.0 + SPACE);
                let bottom = TOP - cell_h - r * cell_h * (1.0 + SPACE);
                out.push(self.add_axes([left, bottom, cell_w, cell_h]));
            }
        }
        out
    }

    /// Canvases in insertion order.
    pub fn canvases(&self) -> Vec<Rc<dyn Canvas>> {
        self.canvases.borrow().clone()
    }

    /// Draw the background and every visible canvas in z-order.
    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let mut canvases = self.canvases();
        canvases.sort_by(|a, b| a.zorder().total_cmp(&b.zorder()));
        renderer.with_group("figure", |r| {
            if let Some(face) = self.face {
                let page = self.size.to_rect().to_path(0.0);
                let gc = GraphicsContext::default().with_line_width(0.0);
                r.draw_path(&gc, page, Affine::IDENTITY, Some(face))?;
            }
            for canvas in &canvases {
                if canvas.is_visible() {
                    canvas.draw(r)?;
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotview_imaging_ref::RecordingRenderer;

    #[test]
    fn fractions_measure_from_lower_left() {
        let fig = Figure::new(200.0, 100.0);
        assert_eq!(
            fig.fraction_rect([0.0, 0.0, 0.5, 0.25]),
            Rect::new(0.0, 75.0, 100.0, 100.0)
        );
    }

    #[test]
    fn subplots_tile_without_overlap() {
        let fig = Figure::new(800.0, 600.0);
        let axes = fig.subplots(1, 2);
        assert_eq!(axes.len(), 2);
        assert_eq!(fig.canvases().len(), 2);
        let (a, b) = (axes[0].bounds(), axes[1].bounds());
        assert!(a.x1 < b.x0);
        assert!((a.width() - b.width()).abs() < 1e-9);
        assert!((a.y0 - b.y0).abs() < 1e-9);
    }

    #[test]
    fn draw_wraps_everything_in_a_group() {
        let fig = Figure::new(100.0, 100.0);
        fig.add_axes([0.1, 0.1, 0.8, 0.8]);
        let mut r = RecordingRenderer::new(100.0, 100.0);
        fig.draw(&mut r).unwrap();
        assert_eq!(r.group_depth(), 0);
        // Page, axes face, axes frame.
        assert_eq!(r.draws().count(), 3);
    }
}
