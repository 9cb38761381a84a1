//! BMP encoder: uncompressed 24-bit and 32-bit, bottom-up.

use alloc::format;

use super::BmpHeader;
use crate::codec::{check_conversion, check_layout};
use crate::convert::transcode_row;
use crate::error::ImageError;
use crate::format::PixelFormat;
use crate::image::{Image, alloc_zeroed};

/// Pick 32-bit storage for formats with alpha, 24-bit otherwise.
pub(crate) fn plan(
    format: PixelFormat,
    width: u32,
    height: u32,
    num_levels: u8,
) -> Result<BmpHeader, ImageError> {
    if num_levels > 1 {
        return Err(ImageError::UnsupportedVariant(format!(
            "BMP holds a single level, asked for {num_levels}"
        )));
    }
    let bits = if format.has_alpha() { 32 } else { 24 };
    let header = BmpHeader {
        width,
        height,
        bits,
        top_down: false,
    };
    check_conversion(format, header.stored())?;
    if width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(ImageError::InvalidGeometry(format!(
            "{width}x{height} does not fit a BMP header"
        )));
    }
    Ok(header)
}

pub(crate) fn write_header(image: &mut Image<'_>, header: &BmpHeader) -> Result<(), ImageError> {
    let too_large = || ImageError::InvalidGeometry("BMP larger than 4 GiB".into());
    let pixel_data_size = header
        .row_stride()
        .checked_mul(header.height as usize)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(too_large)?;
    let file_size = pixel_data_size.checked_add(54).ok_or_else(too_large)?;

    let mut out = [0u8; 54];
    // File header (14 bytes)
    out[0..2].copy_from_slice(b"BM");
    out[2..6].copy_from_slice(&file_size.to_le_bytes());
    out[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset

    // DIB header (BITMAPINFOHEADER, 40 bytes)
    out[14..18].copy_from_slice(&40u32.to_le_bytes());
    out[18..22].copy_from_slice(&header.width.to_le_bytes());
    out[22..26].copy_from_slice(&header.height.to_le_bytes()); // positive = bottom-up
    out[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    out[28..30].copy_from_slice(&header.bits.to_le_bytes());
    // compression 0 = BI_RGB
    out[34..38].copy_from_slice(&pixel_data_size.to_le_bytes());
    out[38..42].copy_from_slice(&2835u32.to_le_bytes()); // h resolution (72 DPI)
    out[42..46].copy_from_slice(&2835u32.to_le_bytes()); // v resolution

    tracing::debug!(
        width = header.width,
        height = header.height,
        bits = header.bits,
        file_size,
        "writing BMP header"
    );
    image.write_bytes(&out)
}

/// Encode every row of `src` (in `format`) to the stream, bottom row first.
pub(crate) fn write_pixels(
    image: &mut Image<'_>,
    header: &BmpHeader,
    src: &[u8],
    format: PixelFormat,
    pixel_stride: usize,
    line_width: usize,
) -> Result<(), ImageError> {
    let stored = header.stored();
    check_conversion(format, stored)?;
    check_layout(
        src.len(),
        format,
        pixel_stride,
        line_width,
        header.width,
        header.height,
    )?;

    // Padding bytes stay zero.
    let mut row = alloc_zeroed(header.row_stride())?;
    for i in 0..header.height as usize {
        let y = header.image_row(i);
        transcode_row(
            &mut row,
            stored,
            stored.stride_bytes(),
            &src[y * line_width..],
            format,
            pixel_stride,
            header.width as usize,
        )?;
        image.write_bytes(&row)?;
    }
    tracing::trace!(rows = header.height, ?format, ?stored, "encoded BMP rows");
    Ok(())
}
