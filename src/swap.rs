//! Red/blue flip for 24-bit pixels.
//!
//! Pixels are addressed by a per-pixel byte stride of at least 3. Only the
//! first three bytes of each pixel are touched: byte 0 and byte 2 trade
//! places, byte 1 stays.

use alloc::format;

use crate::error::ImageError;

/// Swap bytes 0 and 2 of `count` pixels placed `stride` bytes apart, in place.
///
/// Applying it twice restores the original buffer.
pub fn flip_rb24(buf: &mut [u8], count: usize, stride: usize) -> Result<(), ImageError> {
    let needed = span(count, stride)?;
    if count == 0 {
        return Ok(());
    }
    if buf.len() < needed {
        return Err(ImageError::BufferTooSmall {
            needed,
            actual: buf.len(),
        });
    }

    #[cfg(feature = "simd")]
    if stride == 3 {
        return garb::bytes::rgb_to_bgr_inplace(&mut buf[..needed]).map_err(size_error);
    }

    for px in buf.chunks_mut(stride).take(count) {
        px.swap(0, 2);
    }
    Ok(())
}

/// Copy `count` pixels from `src` (`src_stride` apart) to `dst` (`dst_stride`
/// apart), swapping bytes 0 and 2 of each.
///
/// Bytes past the first three of each destination pixel are not written.
pub fn copy_flip_rb24(
    dst: &mut [u8],
    src: &[u8],
    count: usize,
    dst_stride: usize,
    src_stride: usize,
) -> Result<(), ImageError> {
    let dst_needed = span(count, dst_stride)?;
    let src_needed = span(count, src_stride)?;
    if count == 0 {
        return Ok(());
    }
    if src.len() < src_needed {
        return Err(ImageError::BufferTooSmall {
            needed: src_needed,
            actual: src.len(),
        });
    }
    if dst.len() < dst_needed {
        return Err(ImageError::BufferTooSmall {
            needed: dst_needed,
            actual: dst.len(),
        });
    }

    #[cfg(feature = "simd")]
    if src_stride == 3 && dst_stride == 3 {
        return garb::bytes::rgb_to_bgr(&src[..src_needed], &mut dst[..dst_needed])
            .map_err(size_error);
    }

    for (d, s) in dst
        .chunks_mut(dst_stride)
        .zip(src.chunks(src_stride))
        .take(count)
    {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
    }
    Ok(())
}

/// Bytes covered by `count` pixels, validating the stride.
fn span(count: usize, stride: usize) -> Result<usize, ImageError> {
    if stride < 3 {
        return Err(ImageError::InvalidGeometry(format!(
            "pixel stride {stride} is shorter than a 24-bit pixel"
        )));
    }
    if count == 0 {
        return Ok(0);
    }
    (count - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(3))
        .ok_or_else(|| ImageError::InvalidGeometry(format!("{count} pixels overflow")))
}

#[cfg(feature = "simd")]
fn size_error(e: garb::SizeError) -> ImageError {
    ImageError::InvalidGeometry(format!("{e:?}"))
}
