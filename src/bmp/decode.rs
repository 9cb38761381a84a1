//! BMP header parsing and row decoding from an image stream.

use alloc::format;

use super::BmpHeader;
use crate::codec::{check_conversion, check_layout};
use crate::convert::transcode_row;
use crate::error::ImageError;
use crate::format::PixelFormat;
use crate::image::{Image, alloc_zeroed};

const FILE_HEADER_SIZE: usize = 14;
/// BITMAPINFOHEADER; later versions only append fields.
const INFO_HEADER_SIZE: usize = 40;
/// BITMAPV5HEADER, the largest defined.
const MAX_INFO_HEADER_SIZE: usize = 124;

const BI_RGB: u32 = 0;

fn u16_at(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

pub(crate) fn read_header(image: &mut Image<'_>) -> Result<BmpHeader, ImageError> {
    let mut file = [0u8; FILE_HEADER_SIZE];
    image.read_bytes(&mut file)?;
    if &file[..2] != b"BM" {
        return Err(ImageError::InvalidHeader("missing BM signature".into()));
    }
    let data_offset = u32_at(&file, 10) as usize;

    let mut info = [0u8; MAX_INFO_HEADER_SIZE];
    image.read_bytes(&mut info[..4])?;
    let info_size = u32_at(&info, 0) as usize;
    if info_size < INFO_HEADER_SIZE {
        return Err(ImageError::UnsupportedVariant(format!(
            "BMP info header of {info_size} bytes"
        )));
    }
    if info_size > MAX_INFO_HEADER_SIZE {
        return Err(ImageError::InvalidHeader(format!(
            "BMP info header of {info_size} bytes"
        )));
    }
    image.read_bytes(&mut info[4..info_size])?;

    let width = u32_at(&info, 4) as i32;
    let height = u32_at(&info, 8) as i32;
    let planes = u16_at(&info, 12);
    let bits = u16_at(&info, 14);
    let compression = u32_at(&info, 16);

    if width <= 0 || height == 0 {
        return Err(ImageError::InvalidHeader(format!(
            "dimensions {width}x{height}"
        )));
    }
    if planes != 1 {
        return Err(ImageError::InvalidHeader(format!("{planes} planes")));
    }
    if bits != 24 && bits != 32 {
        return Err(ImageError::UnsupportedVariant(format!(
            "{bits}-bit BMP"
        )));
    }
    if compression != BI_RGB {
        return Err(ImageError::UnsupportedVariant(format!(
            "BMP compression {compression}"
        )));
    }

    let consumed = FILE_HEADER_SIZE + info_size;
    let gap = data_offset.checked_sub(consumed).ok_or_else(|| {
        ImageError::InvalidHeader(format!("pixel data offset {data_offset} inside header"))
    })?;
    image.skip_bytes(gap)?;

    let header = BmpHeader {
        width: width.unsigned_abs(),
        height: height.unsigned_abs(),
        bits,
        top_down: height < 0,
    };
    tracing::debug!(
        width = header.width,
        height = header.height,
        bits,
        top_down = header.top_down,
        "parsed BMP header"
    );
    Ok(header)
}

/// Decode every row of the stream into `dst`, re-expressed as `format`.
pub(crate) fn read_pixels(
    image: &mut Image<'_>,
    header: &BmpHeader,
    dst: &mut [u8],
    format: PixelFormat,
    pixel_stride: usize,
    line_width: usize,
) -> Result<(), ImageError> {
    let stored = header.stored();
    check_conversion(stored, format)?;
    check_layout(
        dst.len(),
        format,
        pixel_stride,
        line_width,
        header.width,
        header.height,
    )?;

    let mut row = alloc_zeroed(header.row_stride())?;
    let pixels = header.pixel_bytes();
    for i in 0..header.height as usize {
        image.read_bytes(&mut row)?;
        let y = header.image_row(i);
        transcode_row(
            &mut dst[y * line_width..],
            format,
            pixel_stride,
            &row[..pixels],
            stored,
            stored.stride_bytes(),
            header.width as usize,
        )?;
    }
    tracing::trace!(rows = header.height, ?stored, ?format, "decoded BMP rows");
    Ok(())
}
