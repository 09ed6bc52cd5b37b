// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine image resampling with a selectable reconstruction filter.
//!
//! The filter family and kernel shapes follow the classic AGG image filter
//! set. Filtered modes widen the kernel when minifying so that downsampled
//! output is smoothed rather than aliased.

use core::f64::consts::PI;
use core::fmt;
use core::str::FromStr;

use kurbo::{Affine, Point};
use thiserror::Error;

use crate::RgbaImage;

/// Image interpolation mode used when an image is resampled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Hanning when upsampling by less than 3x, nearest otherwise.
    Antialiased,
    /// Nearest-neighbour sampling.
    #[default]
    Nearest,
    /// No interpolation requested; sampled as nearest.
    None,
    /// Linear tent filter.
    Bilinear,
    /// Cubic B-spline.
    Bicubic,
    /// 16-tap spline.
    Spline16,
    /// 36-tap spline.
    Spline36,
    /// Hanning window.
    Hanning,
    /// Hamming window.
    Hamming,
    /// Hermite cubic.
    Hermite,
    /// Kaiser-Bessel window.
    Kaiser,
    /// Quadratic B-spline.
    Quadric,
    /// Catmull-Rom spline.
    Catrom,
    /// Gaussian.
    Gaussian,
    /// Bessel (Airy) kernel.
    Bessel,
    /// Mitchell-Netravali with `B = C = 1/3`.
    Mitchell,
    /// Windowed sinc, radius 4.
    Sinc,
    /// Lanczos, radius 4.
    Lanczos,
}

impl Interpolation {
    /// Every interpolation mode, in canonical order.
    pub const ALL: [Self; 18] = [
        Self::Antialiased,
        Self::Nearest,
        Self::None,
        Self::Bilinear,
        Self::Bicubic,
        Self::Spline16,
        Self::Spline36,
        Self::Hanning,
        Self::Hamming,
        Self::Hermite,
        Self::Kaiser,
        Self::Quadric,
        Self::Catrom,
        Self::Gaussian,
        Self::Bessel,
        Self::Mitchell,
        Self::Sinc,
        Self::Lanczos,
    ];

    /// Lower-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Antialiased => "antialiased",
            Self::Nearest => "nearest",
            Self::None => "none",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
            Self::Spline16 => "spline16",
            Self::Spline36 => "spline36",
            Self::Hanning => "hanning",
            Self::Hamming => "hamming",
            Self::Hermite => "hermite",
            Self::Kaiser => "kaiser",
            Self::Quadric => "quadric",
            Self::Catrom => "catrom",
            Self::Gaussian => "gaussian",
            Self::Bessel => "bessel",
            Self::Mitchell => "mitchell",
            Self::Sinc => "sinc",
            Self::Lanczos => "lanczos",
        }
    }

    /// Resolve to a concrete kernel for the given upsampling factor.
    ///
    /// `None` means nearest-neighbour sampling.
    fn kernel(self, upsampling: f64) -> Option<Kernel> {
        Some(match self {
            Self::Nearest | Self::None => return None,
            Self::Antialiased => {
                if upsampling < 3.0 {
                    Kernel::Hanning
                } else {
                    return None;
                }
            }
            Self::Bilinear => Kernel::Bilinear,
            Self::Bicubic => Kernel::Bicubic,
            Self::Spline16 => Kernel::Spline16,
            Self::Spline36 => Kernel::Spline36,
            Self::Hanning => Kernel::Hanning,
            Self::Hamming => Kernel::Hamming,
            Self::Hermite => Kernel::Hermite,
            Self::Kaiser => Kernel::Kaiser,
            Self::Quadric => Kernel::Quadric,
            Self::Catrom => Kernel::Catrom,
            Self::Gaussian => Kernel::Gaussian,
            Self::Bessel => Kernel::Bessel,
            Self::Mitchell => Kernel::Mitchell,
            Self::Sinc => Kernel::Sinc,
            Self::Lanczos => Kernel::Lanczos,
        })
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no known [`Interpolation`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown image interpolation `{0}`")]
pub struct ParseInterpolationError(pub String);

impl FromStr for Interpolation {
    type Err = ParseInterpolationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseInterpolationError(s.to_owned()))
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Kernel {
    Bilinear,
    Bicubic,
    Spline16,
    Spline36,
    Hanning,
    Hamming,
    Hermite,
    Kaiser,
    Quadric,
    Catrom,
    Gaussian,
    Bessel,
    Mitchell,
    Sinc,
    Lanczos,
}

const KAISER_ALPHA: f64 = 6.33;
const WINDOWED_RADIUS: f64 = 4.0;

impl Kernel {
    fn radius(self) -> f64 {
        match self {
            Self::Bilinear
            | Self::Hanning
            | Self::Hamming
            | Self::Hermite
            | Self::Kaiser => 1.0,
            Self::Quadric => 1.5,
            Self::Bicubic | Self::Spline16 | Self::Catrom | Self::Gaussian | Self::Mitchell => {
                2.0
            }
            Self::Spline36 => 3.0,
            Self::Bessel => 3.2383,
            Self::Sinc | Self::Lanczos => WINDOWED_RADIUS,
        }
    }

    /// Weight at distance `x` (in source pixels) from the sample centre.
    fn weight(self, x: f64) -> f64 {
        let x = x.abs();
        if x >= self.radius() {
            return 0.0;
        }
        match self {
            Self::Bilinear => 1.0 - x,
            Self::Bicubic => {
                let p = |t: f64| if t <= 0.0 { 0.0 } else { t * t * t };
                (p(x + 2.0) - 4.0 * p(x + 1.0) + 6.0 * p(x) - 4.0 * p(x - 1.0)) / 6.0
            }
            Self::Spline16 => {
                if x < 1.0 {
                    ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
                } else {
                    let u = x - 1.0;
                    ((-1.0 / 3.0 * u + 4.0 / 5.0) * u - 7.0 / 15.0) * u
                }
            }
            Self::Spline36 => {
                if x < 1.0 {
                    ((13.0 / 11.0 * x - 453.0 / 209.0) * x - 3.0 / 209.0) * x + 1.0
                } else if x < 2.0 {
                    let u = x - 1.0;
                    ((-6.0 / 11.0 * u + 270.0 / 209.0) * u - 156.0 / 209.0) * u
                } else {
                    let u = x - 2.0;
                    ((1.0 / 11.0 * u - 45.0 / 209.0) * u + 26.0 / 209.0) * u
                }
            }
            Self::Hanning => 0.5 + 0.5 * (PI * x).cos(),
            Self::Hamming => 0.54 + 0.46 * (PI * x).cos(),
            Self::Hermite => (2.0 * x - 3.0) * x * x + 1.0,
            Self::Kaiser => {
                bessel_i0(KAISER_ALPHA * (1.0 - x * x).sqrt()) / bessel_i0(KAISER_ALPHA)
            }
            Self::Quadric => {
                if x < 0.5 {
                    0.75 - x * x
                } else {
                    let t = x - 1.5;
                    0.5 * t * t
                }
            }
            Self::Catrom => {
                if x < 1.0 {
                    0.5 * (2.0 + x * x * (-5.0 + x * 3.0))
                } else {
                    0.5 * (4.0 + x * (-8.0 + x * (5.0 - x)))
                }
            }
            Self::Gaussian => (-2.0 * x * x).exp() * (2.0 / PI).sqrt(),
            Self::Bessel => {
                if x == 0.0 {
                    PI / 4.0
                } else {
                    bessel_j1(PI * x) / (2.0 * x)
                }
            }
            Self::Mitchell => {
                const B: f64 = 1.0 / 3.0;
                const C: f64 = 1.0 / 3.0;
                if x < 1.0 {
                    let p0 = (6.0 - 2.0 * B) / 6.0;
                    let p2 = (-18.0 + 12.0 * B + 6.0 * C) / 6.0;
                    let p3 = (12.0 - 9.0 * B - 6.0 * C) / 6.0;
                    p0 + x * x * (p2 + x * p3)
                } else {
                    let q0 = (8.0 * B + 24.0 * C) / 6.0;
                    let q1 = (-12.0 * B - 48.0 * C) / 6.0;
                    let q2 = (6.0 * B + 30.0 * C) / 6.0;
                    let q3 = (-B - 6.0 * C) / 6.0;
                    q0 + x * (q1 + x * (q2 + x * q3))
                }
            }
            Self::Sinc => sinc(x),
            Self::Lanczos => sinc(x) * sinc(x / WINDOWED_RADIUS),
        }
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Modified Bessel function of the first kind, order zero.
fn bessel_i0(x: f64) -> f64 {
    let y = x * x / 4.0;
    let mut sum = 1.0;
    let mut term = 1.0;
    for k in 1..50 {
        let k = f64::from(k);
        term *= y / (k * k);
        sum += term;
        if term < sum * 1e-16 {
            break;
        }
    }
    sum
}

/// Bessel function of the first kind, order one.
fn bessel_j1(x: f64) -> f64 {
    let half = x / 2.0;
    let y = -half * half;
    let mut term = half;
    let mut sum = term;
    for k in 1..60 {
        let k = f64::from(k);
        term *= y / (k * (k + 1.0));
        sum += term;
        if term.abs() < 1e-17 {
            break;
        }
    }
    sum
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "value is rounded and clamped to the u8 range first"
)]
fn to_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "callers pass finite coordinates bounded by the image size plus the kernel support"
)]
fn floor_index(v: f64) -> i64 {
    v.floor() as i64
}

fn clamp_index(i: i64, len: u32) -> u32 {
    u32::try_from(i.clamp(0, i64::from(len) - 1)).unwrap_or(0)
}

/// Resample `src` into a `width` x `height` image.
///
/// `src_to_dst` maps source pixel coordinates (origin at the top-left corner
/// of the first pixel) to output pixel coordinates. Output pixels whose
/// centre maps outside the source are transparent. A singular or non-finite
/// transform produces a fully transparent image.
pub fn resample(
    src: &RgbaImage,
    width: u32,
    height: u32,
    src_to_dst: Affine,
    interpolation: Interpolation,
) -> RgbaImage {
    let mut out = RgbaImage::transparent(width, height);
    let det = src_to_dst.determinant();
    if src.is_empty() || out.is_empty() || det == 0.0 || !det.is_finite() {
        return out;
    }
    let inv = src_to_dst.inverse();
    if !inv.is_finite() {
        return out;
    }

    let [a, b, c, d, _, _] = inv.as_coeffs();
    // Source pixels covered by one output pixel step along each axis.
    let step_x = a.hypot(b);
    let step_y = c.hypot(d);
    let upsampling = det.abs().sqrt();
    let kernel = interpolation.kernel(upsampling);

    let (sw, sh) = (f64::from(src.width()), f64::from(src.height()));
    for y in 0..height {
        for x in 0..width {
            let p = inv * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if !(p.x >= 0.0 && p.x < sw && p.y >= 0.0 && p.y < sh) {
                continue;
            }
            let px = match kernel {
                None => src.pixel(
                    clamp_index(floor_index(p.x), src.width()),
                    clamp_index(floor_index(p.y), src.height()),
                ),
                Some(k) => filtered(src, p, k, step_x.max(1.0), step_y.max(1.0)),
            };
            if let Some(px) = px {
                out.put_pixel(x, y, px);
            }
        }
    }
    out
}

fn taps(center: f64, kernel: Kernel, scale: f64) -> Vec<(i64, f64)> {
    let support = kernel.radius() * scale;
    let first = floor_index(center - support) + 1;
    let last = floor_index(center + support);
    (first..=last)
        .filter_map(|i| {
            #[allow(clippy::cast_precision_loss, reason = "pixel indices are small")]
            let dist = (i as f64 - center) / scale;
            let w = kernel.weight(dist);
            (w != 0.0).then_some((i, w))
        })
        .collect()
}

fn filtered(
    src: &RgbaImage,
    p: Point,
    kernel: Kernel,
    scale_x: f64,
    scale_y: f64,
) -> Option<[u8; 4]> {
    // Kernel centres sit on pixel centres.
    let xs = taps(p.x - 0.5, kernel, scale_x);
    let ys = taps(p.y - 0.5, kernel, scale_y);

    let mut acc = [0.0_f64; 4];
    let mut total = 0.0;
    for &(sy, wy) in &ys {
        let row = clamp_index(sy, src.height());
        for &(sx, wx) in &xs {
            let w = wx * wy;
            let [r, g, b, alpha] = src.pixel(clamp_index(sx, src.width()), row)?;
            let alpha = f64::from(alpha);
            let premul = alpha / 255.0;
            acc[0] += w * f64::from(r) * premul;
            acc[1] += w * f64::from(g) * premul;
            acc[2] += w * f64::from(b) * premul;
            acc[3] += w * alpha;
            total += w;
        }
    }
    if total.abs() < 1e-12 {
        return Some([0; 4]);
    }

    let alpha = (acc[3] / total).clamp(0.0, 255.0);
    if alpha <= 0.0 {
        return Some([0; 4]);
    }
    let unpremul = 255.0 / alpha;
    Some([
        to_channel(acc[0] / total * unpremul),
        to_channel(acc[1] / total * unpremul),
        to_channel(acc[2] / total * unpremul),
        to_channel(alpha),
    ])
}
