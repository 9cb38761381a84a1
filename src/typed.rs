//! Typed views of 8-bit descriptor buffers as `rgb` pixels.

use rgb::AsPixels as _;

use crate::error::ImageError;
use crate::format::PixelFormat;
use crate::image::Image;

/// An `rgb` pixel type whose memory order matches a [`PixelFormat`].
pub trait FormatPixel: Copy + 'static {
    const FORMAT: PixelFormat;
}

impl FormatPixel for rgb::Gray<u8> {
    const FORMAT: PixelFormat = PixelFormat::Gray8;
}

/// Memory R,G,B.
impl FormatPixel for rgb::Rgb<u8> {
    const FORMAT: PixelFormat = PixelFormat::B8G8R8;
}

/// Memory B,G,R.
impl FormatPixel for rgb::alt::BGR<u8> {
    const FORMAT: PixelFormat = PixelFormat::R8G8B8;
}

/// Memory R,G,B,A.
impl FormatPixel for rgb::Rgba<u8> {
    const FORMAT: PixelFormat = PixelFormat::A8B8G8R8;
}

/// Memory B,G,R,A.
impl FormatPixel for rgb::alt::BGRA<u8> {
    const FORMAT: PixelFormat = PixelFormat::A8R8G8B8;
}

impl Image<'_> {
    /// Reinterpret the buffer as typed pixels, row padding and any further
    /// mip levels included.
    ///
    /// Returns [`ImageError::FormatMismatch`] if the format doesn't match `P`.
    pub fn as_pixels<P: FormatPixel>(&self) -> Result<&[P], ImageError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let actual = self.format().ok_or(ImageError::NoFormat)?;
        if actual != P::FORMAT {
            return Err(ImageError::FormatMismatch {
                expected: P::FORMAT,
                actual,
            });
        }
        Ok(self.data().as_pixels())
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of typed pixels.
    ///
    /// The view borrows the descriptor's buffer; its stride is the line
    /// width in pixels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P: FormatPixel>(&self) -> Result<imgref::ImgRef<'_, P>, ImageError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        let needed = self.data_size();
        if self.data().len() < needed {
            return Err(ImageError::BufferTooSmall {
                needed,
                actual: self.data().len(),
            });
        }
        let stride = self.line_width() / P::FORMAT.stride_bytes();
        Ok(imgref::ImgRef::new_stride(
            pixels,
            self.width() as usize,
            self.height() as usize,
            stride,
        ))
    }
}
