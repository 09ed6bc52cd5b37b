// Copyright 2025 the Plotview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use kurbo::{Affine, Point, Rect};
use plotview_imaging::{
    DrawOp, Interpolation, RenderError, Renderer, RgbaImage, ceil_to_pixels, resample,
};

use crate::artist::forward_artist_base;
use crate::{Artist, ArtistBase, TransformHandle};

/// Which data corner the first image row is placed at.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ImageOrigin {
    /// Row 0 at the top (largest data `y`).
    #[default]
    Upper,
    /// Row 0 at the bottom (smallest data `y`).
    Lower,
}

/// A raster image stretched over a data-space rectangle.
#[derive(Debug)]
pub struct AxesImage {
    base: ArtistBase,
    image: RefCell<Arc<RgbaImage>>,
    extent: Cell<Rect>,
    origin: Cell<ImageOrigin>,
    interpolation: Cell<Interpolation>,
}

impl AxesImage {
    /// Default stacking order for images.
    pub const ZORDER: f64 = 0.0;

    /// Place `image` over the data rectangle `extent`.
    pub fn new(image: RgbaImage, extent: Rect, transform: TransformHandle) -> Self {
        Self {
            base: ArtistBase::new(transform, Self::ZORDER),
            image: RefCell::new(Arc::new(image)),
            extent: Cell::new(extent),
            origin: Cell::new(ImageOrigin::default()),
            interpolation: Cell::new(Interpolation::default()),
        }
    }

    /// Pixel data.
    pub fn image(&self) -> Arc<RgbaImage> {
        self.image.borrow().clone()
    }

    /// Replace the pixel data.
    pub fn set_image(&self, image: RgbaImage) {
        *self.image.borrow_mut() = Arc::new(image);
    }

    /// Data rectangle covered by the image.
    pub fn extent(&self) -> Rect {
        self.extent.get()
    }

    /// Row placement.
    pub fn origin(&self) -> ImageOrigin {
        self.origin.get()
    }

    /// Set the row placement.
    pub fn set_origin(&self, origin: ImageOrigin) {
        self.origin.set(origin);
    }

    /// Interpolation used when the image is resampled for display.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation.get()
    }

    /// Set the interpolation.
    pub fn set_interpolation(&self, interpolation: Interpolation) {
        self.interpolation.set(interpolation);
    }

    /// Maps image pixel coordinates to display space.
    fn pixel_to_display(&self, image: &RgbaImage) -> Affine {
        let e = self.extent();
        let sx = e.width() / f64::from(image.width().max(1));
        let sy = e.height() / f64::from(image.height().max(1));
        let pixel_to_data = match self.origin() {
            ImageOrigin::Upper => Affine::new([sx, 0.0, 0.0, -sy, e.x0, e.y1]),
            ImageOrigin::Lower => Affine::new([sx, 0.0, 0.0, sy, e.x0, e.y0]),
        };
        self.base.transform().get() * pixel_to_data
    }

    fn full_extent(&self, image: &RgbaImage) -> Rect {
        let bounds = Rect::new(
            0.0,
            0.0,
            f64::from(image.width()),
            f64::from(image.height()),
        );
        self.pixel_to_display(image).transform_rect_bbox(bounds)
    }
}

impl Artist for AxesImage {
    fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let image = self.image();
        if !self.is_visible() || image.is_empty() {
            return Ok(());
        }
        let mut visible = self.full_extent(&image);
        if let Some(clip) = self.clip_box() {
            visible = visible.intersect(clip);
        }
        if visible.width() <= 0.0 || visible.height() <= 0.0 {
            return Ok(());
        }
        // Snap to whole display pixels.
        let footprint = Rect::new(
            visible.x0.floor(),
            visible.y0.floor(),
            visible.x1.ceil(),
            visible.y1.ceil(),
        );
        let mag = renderer.image_magnification();
        let width = ceil_to_pixels(footprint.width() * mag);
        let height = ceil_to_pixels(footprint.height() * mag);
        if width == 0 || height == 0 {
            return Ok(());
        }
        let to_output = Affine::scale(mag)
            * Affine::translate((-footprint.x0, -footprint.y0))
            * self.pixel_to_display(&image);
        let pixels = resample(&image, width, height, to_output, self.interpolation());
        renderer.draw(
            &self.base.gc(),
            DrawOp::Image {
                origin: Point::new(footprint.x0, footprint.y0),
                image: Arc::new(pixels),
                transform: None,
            },
        )
    }

    fn window_extent(&self, _renderer: &dyn Renderer) -> Result<Rect, RenderError> {
        Ok(self.full_extent(&self.image()))
    }

    forward_artist_base!(base);
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotview_imaging_ref::RecordingRenderer;

    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(2, 2, |x, y| [(x * 200) as u8, (y * 200) as u8, 0, 255])
    }

    #[test]
    fn upper_origin_puts_first_row_on_top() {
        let img = AxesImage::new(
            gradient(),
            Rect::new(0.0, 0.0, 2.0, 2.0),
            TransformHandle::new(Affine::new([10.0, 0.0, 0.0, -10.0, 0.0, 20.0])),
        );
        let mut r = RecordingRenderer::default();
        img.draw(&mut r).unwrap();

        let (DrawOp::Image { origin, image, .. }, _) = r.draws().next().expect("image") else {
            panic!("expected an image");
        };
        assert_eq!(*origin, Point::ZERO);
        assert_eq!((image.width(), image.height()), (20, 20));
        assert_eq!(image.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(image.pixel(0, 19), Some([0, 200, 0, 255]));
    }

    #[test]
    fn lower_origin_flips_rows() {
        let img = AxesImage::new(
            gradient(),
            Rect::new(0.0, 0.0, 2.0, 2.0),
            TransformHandle::new(Affine::new([10.0, 0.0, 0.0, -10.0, 0.0, 20.0])),
        );
        img.set_origin(ImageOrigin::Lower);
        let mut r = RecordingRenderer::default();
        img.draw(&mut r).unwrap();

        let (DrawOp::Image { image, .. }, _) = r.draws().next().expect("image") else {
            panic!("expected an image");
        };
        assert_eq!(image.pixel(0, 0), Some([0, 200, 0, 255]));
    }

    #[test]
    fn clip_box_limits_the_footprint() {
        let img = AxesImage::new(
            gradient(),
            Rect::new(0.0, 0.0, 2.0, 2.0),
            TransformHandle::new(Affine::scale(10.0)),
        );
        img.set_clip_box(Some(Rect::new(5.0, 5.0, 12.5, 30.0)));
        let mut r = RecordingRenderer::default().with_image_magnification(2.0);
        img.draw(&mut r).unwrap();

        let (DrawOp::Image { origin, image, .. }, gc) = r.draws().next().expect("image") else {
            panic!("expected an image");
        };
        assert_eq!(*origin, Point::new(5.0, 5.0));
        assert_eq!((image.width(), image.height()), (16, 30));
        assert_eq!(gc.clip_rect, Some(Rect::new(5.0, 5.0, 12.5, 30.0)));
        assert_eq!(
            img.window_extent(&r).unwrap(),
            Rect::new(0.0, 0.0, 20.0, 20.0)
        );
    }

    #[test]
    fn fully_clipped_image_is_skipped() {
        let img = AxesImage::new(
            gradient(),
            Rect::new(0.0, 0.0, 2.0, 2.0),
            TransformHandle::default(),
        );
        img.set_clip_box(Some(Rect::new(50.0, 50.0, 60.0, 60.0)));
        let mut r = RecordingRenderer::default();
        img.draw(&mut r).unwrap();
        assert!(r.events().is_empty());
    }
}
