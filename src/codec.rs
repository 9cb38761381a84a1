//! Read/write contract every concrete format codec satisfies.
//!
//! A codec drives an [`Image`]: `read_header` fills in geometry from the
//! attached stream, `read_data` streams the current level into a caller
//! buffer in the caller's format. Writing mirrors this. Picking a codec for
//! a file name or magic number is left to the caller.

use alloc::format;

use crate::convert;
use crate::error::ImageError;
use crate::format::PixelFormat;
use crate::image::Image;

/// Plug-in image codec.
///
/// `pixel_stride` is bytes per pixel in the caller buffer and `line_width`
/// bytes per row. When the caller's format differs from the stored one the
/// codec re-expresses pixels with the format converter, so compressed
/// pairings fail with [`ImageError::UnsupportedConversion`].
pub trait Codec {
    /// Populate width, height, format and level count from the stream.
    /// Does not allocate pixel storage.
    fn read_header(&mut self, image: &mut Image<'_>) -> Result<(), ImageError>;

    /// Stream the current level into `dst` and advance the level cursor.
    fn read_data(
        &mut self,
        image: &mut Image<'_>,
        dst: &mut [u8],
        format: PixelFormat,
        pixel_stride: usize,
        line_width: usize,
    ) -> Result<(), ImageError>;

    /// Record the geometry of the image about to be written.
    fn write_header(
        &mut self,
        image: &mut Image<'_>,
        format: PixelFormat,
        width: u32,
        height: u32,
        num_levels: u8,
    ) -> Result<(), ImageError> {
        image.reset(width, height, format, num_levels, false)
    }

    /// Stream the current level from `src` and advance the level cursor.
    fn write_data(
        &mut self,
        image: &mut Image<'_>,
        src: &[u8],
        format: PixelFormat,
        pixel_stride: usize,
        line_width: usize,
    ) -> Result<(), ImageError>;
}

/// Read the header and level 0 into the image's own buffer, in the stored
/// format.
pub fn read_image<C: Codec + ?Sized>(codec: &mut C, image: &mut Image<'_>) -> Result<(), ImageError> {
    codec.read_header(image)?;
    let format = image.format().ok_or(ImageError::NoFormat)?;
    let line_width = image.line_width();
    image.allocate()?;
    let mut data = image.take_data();
    let result = codec.read_data(image, &mut data, format, format.stride_bytes(), line_width);
    image.set_data(data)?;
    result
}

/// Write `source`'s level-0 buffer through `codec` into the stream bound to
/// `target`.
pub fn write_image<C: Codec + ?Sized>(
    codec: &mut C,
    source: &Image<'_>,
    target: &mut Image<'_>,
) -> Result<(), ImageError> {
    let format = source.format().ok_or(ImageError::NoFormat)?;
    codec.write_header(target, format, source.width(), source.height(), 1)?;
    codec.write_data(
        target,
        source.data(),
        format,
        format.stride_bytes(),
        source.line_width(),
    )
}

/// Fail with [`ImageError::UnsupportedConversion`] unless rows stored as
/// `stored` can be delivered as `requested` (or the reverse).
pub fn check_conversion(stored: PixelFormat, requested: PixelFormat) -> Result<(), ImageError> {
    convert::check_pair(stored, requested)
}

/// Validate a caller buffer of `len` bytes holding `height` rows of `width`
/// pixels in `format`, `pixel_stride` and `line_width` bytes apart.
pub fn check_layout(
    len: usize,
    format: PixelFormat,
    pixel_stride: usize,
    line_width: usize,
    width: u32,
    height: u32,
) -> Result<(), ImageError> {
    if format.is_compressed() {
        return Err(ImageError::UnsupportedVariant(format!(
            "{format:?} rows cannot be addressed per pixel"
        )));
    }
    let bpp = format.stride_bytes();
    if pixel_stride < bpp {
        return Err(ImageError::InvalidGeometry(format!(
            "pixel stride {pixel_stride} below {bpp} bytes of {format:?}"
        )));
    }
    let too_large = || ImageError::InvalidGeometry(format!("{width}x{height} overflows"));
    let row = (width as usize)
        .checked_sub(1)
        .and_then(|n| n.checked_mul(pixel_stride))
        .and_then(|n| n.checked_add(bpp))
        .ok_or_else(too_large)?;
    if line_width < row {
        return Err(ImageError::InvalidGeometry(format!(
            "line width {line_width} below row span {row}"
        )));
    }
    let needed = (height as usize)
        .checked_sub(1)
        .and_then(|n| n.checked_mul(line_width))
        .and_then(|n| n.checked_add(row))
        .ok_or_else(too_large)?;
    if len < needed {
        return Err(ImageError::BufferTooSmall { needed, actual: len });
    }
    Ok(())
}
