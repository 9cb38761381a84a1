//! Mip-chain geometry.
//!
//! Each level halves the previous one (floor, never below 1). Block-compressed
//! formats store whole blocks, so their storage size is rounded up to the
//! block edge while the logical size stays exact.

use alloc::format;

use crate::error::ImageError;
use crate::format::PixelFormat;

/// Size and byte layout of one mip level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelGeometry {
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
    /// Stored width in pixels (block multiple for compressed formats).
    pub data_width: u32,
    /// Stored height in pixels (block multiple for compressed formats).
    pub data_height: u32,
    /// Bytes per stored pixel row. For compressed formats this is a block
    /// row's bytes divided by the block edge.
    pub line_stride: usize,
    /// Bytes occupied by the whole level.
    pub size: usize,
}

impl LevelGeometry {
    /// Bytes from one row of blocks to the next (the line stride for
    /// uncompressed formats).
    pub fn block_row_stride(&self, format: PixelFormat) -> usize {
        self.line_stride * format.block_edge() as usize
    }
}

/// Logical size of `level`, halving `width` and `height` once per level.
pub fn level_size(width: u32, height: u32, level: u32) -> (u32, u32) {
    (halve(width, level), halve(height, level))
}

fn halve(v: u32, level: u32) -> u32 {
    v.checked_shr(level).unwrap_or(0).max(1)
}

/// Storage size of a `width` x `height` image in `format`.
///
/// Rounds up to the block edge for compressed formats; identity otherwise.
pub fn storage_size(width: u32, height: u32, format: PixelFormat) -> Option<(u32, u32)> {
    let edge = format.block_edge();
    Some((
        width.div_ceil(edge).checked_mul(edge)?,
        height.div_ceil(edge).checked_mul(edge)?,
    ))
}

/// Bytes per stored pixel row for a stored width of `data_width` pixels.
///
/// For compressed formats `data_width` must be a block multiple; the result
/// is the block row size spread over the block edge.
pub fn line_stride(data_width: u32, format: PixelFormat) -> Option<usize> {
    if format.is_compressed() {
        let edge = format.block_edge() as usize;
        let blocks = data_width as usize / edge;
        Some(blocks.checked_mul(format.stride_bytes())? / edge)
    } else {
        let bits = (data_width as usize).checked_mul(format.stride_bits() as usize)?;
        Some(bits.div_ceil(8))
    }
}

/// Compute logical and stored geometry of `level` for a base image of
/// `width` x `height` in `format`.
pub fn level_geometry(
    width: u32,
    height: u32,
    level: u32,
    format: PixelFormat,
) -> Result<LevelGeometry, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidGeometry(format!(
            "zero dimension {width}x{height}"
        )));
    }
    let (lw, lh) = level_size(width, height, level);
    let too_large = || ImageError::InvalidGeometry(format!("{lw}x{lh} {format:?} overflows"));
    let (data_width, data_height) = storage_size(lw, lh, format).ok_or_else(too_large)?;
    let stride = line_stride(data_width, format).ok_or_else(too_large)?;
    let size = stride
        .checked_mul(data_height as usize)
        .ok_or_else(too_large)?;
    Ok(LevelGeometry {
        width: lw,
        height: lh,
        data_width,
        data_height,
        line_stride: stride,
        size,
    })
}

/// Byte offset of `level` within a mip chain stored level after level.
pub fn level_offset(
    width: u32,
    height: u32,
    level: u32,
    format: PixelFormat,
) -> Result<usize, ImageError> {
    let mut offset = 0usize;
    for l in 0..level {
        let geometry = level_geometry(width, height, l, format)?;
        offset = offset.checked_add(geometry.size).ok_or_else(|| {
            ImageError::InvalidGeometry(format!("mip chain of {width}x{height} overflows"))
        })?;
    }
    Ok(offset)
}

/// Total bytes of a chain of `levels` mip levels.
pub fn chain_size(
    width: u32,
    height: u32,
    levels: u32,
    format: PixelFormat,
) -> Result<usize, ImageError> {
    level_offset(width, height, levels, format)
}
