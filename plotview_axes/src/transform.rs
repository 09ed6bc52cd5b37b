// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{Affine, Rect};

/// A shared, live affine transform.
///
/// Cloning the handle shares the underlying value: an artist holding a
/// clone of its axes' data transform sees every later pan or zoom without
/// being told.
#[derive(Clone, Debug, Default)]
pub struct TransformHandle(Rc<Cell<Affine>>);

impl TransformHandle {
    /// Create a new handle holding `transform`.
    pub fn new(transform: Affine) -> Self {
        Self(Rc::new(Cell::new(transform)))
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> Affine {
        self.0.get()
    }

    /// Replace the value for every holder of this handle.
    #[inline]
    pub fn set(&self, transform: Affine) {
        self.0.set(transform);
    }

    /// Returns `true` if both handles share one value.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Data-to-display transform for a box showing `xlim` by `ylim`.
///
/// Display space is y-down, so increasing data `y` moves up the box.
/// Degenerate limits are widened to a unit span.
pub(crate) fn data_to_display(bounds: Rect, xlim: (f64, f64), ylim: (f64, f64)) -> Affine {
    let span = |(lo, hi): (f64, f64)| {
        let d = hi - lo;
        if d.abs() < f64::EPSILON || !d.is_finite() {
            1.0
        } else {
            d
        }
    };
    let sx = bounds.width() / span(xlim);
    let sy = bounds.height() / span(ylim);
    Affine::new([
        sx,
        0.0,
        0.0,
        -sy,
        bounds.x0 - xlim.0 * sx,
        bounds.y1 + ylim.0 * sy,
    ])
}
