//! Pixel-by-pixel conversion between uncompressed formats.
//!
//! Every source pixel is unpacked into a canonical [`Rgba<f32>`] (integer
//! channels normalized to `0.0..=1.0`, float gray passed through), then
//! packed into the destination layout. Missing alpha unpacks as opaque,
//! gray replicates into R, G and B, and alpha is dropped when the
//! destination has none.
//!
//! Block-compressed formats cannot be addressed per pixel; the only
//! accepted pairing involving one is a copy between identical formats.

use alloc::format;
use rgb::Rgba;

use crate::error::ImageError;
use crate::format::{Channel, PixelFormat};
use crate::geometry;
use crate::swap;

/// Unpack one pixel from `src` into the canonical intermediate.
///
/// `src` must hold at least `format.stride_bytes()` bytes.
pub fn read_rgba(src: &[u8], format: PixelFormat) -> Result<Rgba<f32>, ImageError> {
    if format.is_compressed() {
        return Err(unsupported(format, format));
    }
    check_len(src.len(), format.stride_bytes())?;
    Ok(unpack(src, format))
}

/// Pack one canonical pixel into `dst` using `format`.
///
/// Only the first `format.stride_bytes()` bytes of `dst` are written.
pub fn write_rgba(px: Rgba<f32>, dst: &mut [u8], format: PixelFormat) -> Result<(), ImageError> {
    if format.is_compressed() {
        return Err(unsupported(format, format));
    }
    check_len(dst.len(), format.stride_bytes())?;
    pack(px, dst, format);
    Ok(())
}

/// Rewrite `count` pixels from `src` (in `src_format`, `src_stride` bytes
/// apart) into `dst` (in `dst_format`, `dst_stride` bytes apart).
///
/// Bytes between pixels (`stride - bytes per pixel`) are never read or
/// written. When both formats are the same the pixels are copied verbatim;
/// for a compressed format the units are blocks instead of pixels.
pub fn convert_pixels(
    dst: &mut [u8],
    dst_format: PixelFormat,
    dst_stride: usize,
    src: &[u8],
    src_format: PixelFormat,
    src_stride: usize,
    count: usize,
) -> Result<(), ImageError> {
    check_pair(src_format, dst_format)?;
    let src_bpp = src_format.stride_bytes();
    let dst_bpp = dst_format.stride_bytes();
    if src_stride < src_bpp || dst_stride < dst_bpp {
        return Err(ImageError::InvalidGeometry(format!(
            "pixel stride {src_stride}/{dst_stride} smaller than {src_format:?}/{dst_format:?}"
        )));
    }
    if count == 0 {
        return Ok(());
    }
    check_len(src.len(), span(count, src_stride, src_bpp)?)?;
    check_len(dst.len(), span(count, dst_stride, dst_bpp)?)?;

    if src_format == dst_format {
        if src_stride == src_bpp && dst_stride == dst_bpp {
            let n = count * src_bpp;
            dst[..n].copy_from_slice(&src[..n]);
        } else {
            for i in 0..count {
                let s = &src[i * src_stride..i * src_stride + src_bpp];
                dst[i * dst_stride..i * dst_stride + dst_bpp].copy_from_slice(s);
            }
        }
        return Ok(());
    }

    for i in 0..count {
        let px = unpack(&src[i * src_stride..], src_format);
        pack(px, &mut dst[i * dst_stride..], dst_format);
    }
    Ok(())
}

/// Convert a `width` x `height` image between two row-strided buffers.
///
/// `src_line` and `dst_line` are bytes per pixel row. Row padding in `dst`
/// is left untouched. Identical compressed formats are copied one block row
/// (`line * block edge` bytes apart) at a time.
#[allow(clippy::too_many_arguments)]
pub fn convert_rows(
    dst: &mut [u8],
    dst_format: PixelFormat,
    dst_line: usize,
    src: &[u8],
    src_format: PixelFormat,
    src_line: usize,
    width: u32,
    height: u32,
) -> Result<(), ImageError> {
    check_pair(src_format, dst_format)?;
    let overflow = || ImageError::InvalidGeometry(format!("{width}x{height} overflows"));
    let (data_width, data_height) =
        geometry::storage_size(width, height, src_format).ok_or_else(overflow)?;
    let edge = src_format.block_edge() as usize;
    let rows = data_height as usize / edge;
    let units = data_width as usize / edge;
    let src_row = units.checked_mul(src_format.stride_bytes()).ok_or_else(overflow)?;
    let dst_row = units.checked_mul(dst_format.stride_bytes()).ok_or_else(overflow)?;
    let src_pitch = src_line.checked_mul(edge).ok_or_else(overflow)?;
    let dst_pitch = dst_line.checked_mul(edge).ok_or_else(overflow)?;
    if src_pitch < src_row || dst_pitch < dst_row {
        return Err(ImageError::InvalidGeometry(format!(
            "line stride {src_line}/{dst_line} shorter than row {src_row}/{dst_row}"
        )));
    }
    if rows == 0 {
        return Ok(());
    }
    check_len(src.len(), span(rows, src_pitch, src_row)?)?;
    check_len(dst.len(), span(rows, dst_pitch, dst_row)?)?;

    for y in 0..rows {
        let s = &src[y * src_pitch..y * src_pitch + src_row];
        let d = &mut dst[y * dst_pitch..y * dst_pitch + dst_row];
        convert_pixels(
            d,
            dst_format,
            dst_format.stride_bytes(),
            s,
            src_format,
            src_format.stride_bytes(),
            units,
        )?;
    }
    Ok(())
}

/// Codec entry point for moving one row between a stored and a requested
/// layout.
///
/// Same contract as [`convert_pixels`]; a plain 24-bit red/blue reorder is
/// handed to the channel swapper instead of going through the intermediate.
#[allow(clippy::too_many_arguments)]
pub fn transcode_row(
    dst: &mut [u8],
    dst_format: PixelFormat,
    dst_stride: usize,
    src: &[u8],
    src_format: PixelFormat,
    src_stride: usize,
    count: usize,
) -> Result<(), ImageError> {
    use PixelFormat::{B8G8R8, R8G8B8};
    if matches!((src_format, dst_format), (R8G8B8, B8G8R8) | (B8G8R8, R8G8B8)) {
        return swap::copy_flip_rb24(dst, src, count, dst_stride, src_stride);
    }
    convert_pixels(
        dst, dst_format, dst_stride, src, src_format, src_stride, count,
    )
}

/// Whether `convert_pixels` accepts this pair of formats.
pub fn is_supported(src: PixelFormat, dst: PixelFormat) -> bool {
    src == dst || !(src.is_compressed() || dst.is_compressed())
}

pub(crate) fn check_pair(src: PixelFormat, dst: PixelFormat) -> Result<(), ImageError> {
    if is_supported(src, dst) {
        Ok(())
    } else {
        tracing::warn!(?src, ?dst, "rejected conversion involving a compressed format");
        Err(unsupported(src, dst))
    }
}

fn unsupported(from: PixelFormat, to: PixelFormat) -> ImageError {
    ImageError::UnsupportedConversion { from, to }
}

fn check_len(actual: usize, needed: usize) -> Result<(), ImageError> {
    if actual < needed {
        Err(ImageError::BufferTooSmall { needed, actual })
    } else {
        Ok(())
    }
}

/// Bytes spanned by `count` elements of `bpp` bytes placed `stride` apart.
fn span(count: usize, stride: usize, bpp: usize) -> Result<usize, ImageError> {
    (count - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(bpp))
        .ok_or_else(|| ImageError::InvalidGeometry(format!("{count} elements overflow")))
}

fn mask(bits: u8) -> u32 {
    (1u32 << bits) - 1
}

fn load(src: &[u8], n: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw[..n].copy_from_slice(&src[..n]);
    u32::from_le_bytes(raw)
}

fn unpack(src: &[u8], format: PixelFormat) -> Rgba<f32> {
    let info = format.info();
    let mut px = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    if info.float {
        let v = f32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        px.r = v;
        px.g = v;
        px.b = v;
        return px;
    }

    let raw = load(src, format.stride_bytes());
    let mut shift = info.stride_bits;
    for spec in info.channels {
        shift -= u32::from(spec.bits);
        let m = mask(spec.bits);
        let v = ((raw >> shift) & m) as f32 / m as f32;
        match spec.channel {
            Channel::Red => px.r = v,
            Channel::Green => px.g = v,
            Channel::Blue => px.b = v,
            Channel::Alpha => px.a = v,
            Channel::Gray => {
                px.r = v;
                px.g = v;
                px.b = v;
            }
        }
    }
    px
}

fn pack(px: Rgba<f32>, dst: &mut [u8], format: PixelFormat) {
    let info = format.info();
    if info.float {
        dst[..4].copy_from_slice(&luma(px).to_le_bytes());
        return;
    }

    let mut raw = 0u32;
    let mut shift = info.stride_bits;
    for spec in info.channels {
        shift -= u32::from(spec.bits);
        let v = match spec.channel {
            Channel::Red => px.r,
            Channel::Green => px.g,
            Channel::Blue => px.b,
            Channel::Alpha => px.a,
            Channel::Gray => luma(px),
        };
        raw |= quantize(v, mask(spec.bits)) << shift;
    }
    let n = format.stride_bytes();
    dst[..n].copy_from_slice(&raw.to_le_bytes()[..n]);
}

/// Rec.601 luma; exact for pixels that are already gray.
fn luma(px: Rgba<f32>) -> f32 {
    if px.r == px.g && px.g == px.b {
        px.r
    } else {
        0.299 * px.r + 0.587 * px.g + 0.114 * px.b
    }
}

fn quantize(v: f32, max: u32) -> u32 {
    // NaN saturates to 0 through the cast.
    (v.clamp(0.0, 1.0) * max as f32 + 0.5) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use approx::assert_relative_eq;

    fn noise(len: usize) -> Vec<u8> {
        let mut state: u32 = 0xDEAD_BEEF;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect()
    }

    #[test]
    fn memory_order_follows_channel_list() {
        // R8G8B8 stores B, G, R
        let px = read_rgba(&[10, 20, 30], PixelFormat::R8G8B8).unwrap();
        assert_relative_eq!(px.r, 30.0 / 255.0);
        assert_relative_eq!(px.g, 20.0 / 255.0);
        assert_relative_eq!(px.b, 10.0 / 255.0);
        assert_eq!(px.a, 1.0);

        // A8R8G8B8 stores B, G, R, A
        let px = read_rgba(&[0, 0, 255, 128], PixelFormat::A8R8G8B8).unwrap();
        assert_eq!(px.r, 1.0);
        assert_relative_eq!(px.a, 128.0 / 255.0);
    }

    #[test]
    fn rgb_to_bgr_reverses_bytes() {
        let src = [1u8, 2, 3, 4, 5, 6];
        let mut dst = [0u8; 6];
        convert_pixels(
            &mut dst,
            PixelFormat::B8G8R8,
            3,
            &src,
            PixelFormat::R8G8B8,
            3,
            2,
        )
        .unwrap();
        assert_eq!(dst, [3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn transcode_row_matches_generic_path() {
        let src = noise(3 * 17);
        let mut fast = vec![0xAAu8; 4 * 17];
        let mut slow = fast.clone();
        transcode_row(
            &mut fast,
            PixelFormat::B8G8R8,
            4,
            &src,
            PixelFormat::R8G8B8,
            3,
            17,
        )
        .unwrap();
        convert_pixels(
            &mut slow,
            PixelFormat::B8G8R8,
            4,
            &src,
            PixelFormat::R8G8B8,
            3,
            17,
        )
        .unwrap();
        assert_eq!(fast, slow);

        let mut gray = vec![0u8; 17];
        transcode_row(
            &mut gray,
            PixelFormat::Gray8,
            1,
            &src,
            PixelFormat::R8G8B8,
            3,
            17,
        )
        .unwrap();
        assert!(matches!(
            transcode_row(&mut gray, PixelFormat::Dxt1, 8, &src, PixelFormat::R8G8B8, 3, 1),
            Err(ImageError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn alpha_add_then_drop_is_lossless() {
        let src = noise(3 * 64);
        let mut rgba = vec![0u8; 4 * 64];
        let mut back = vec![0u8; 3 * 64];
        convert_pixels(
            &mut rgba,
            PixelFormat::A8R8G8B8,
            4,
            &src,
            PixelFormat::R8G8B8,
            3,
            64,
        )
        .unwrap();
        for px in rgba.chunks_exact(4) {
            assert_eq!(px[3], 255, "missing alpha must become opaque");
        }
        convert_pixels(
            &mut back,
            PixelFormat::R8G8B8,
            3,
            &rgba,
            PixelFormat::A8R8G8B8,
            4,
            64,
        )
        .unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn gray_replicates_into_color() {
        let src = [0u8, 77, 255];
        let mut dst = [0u8; 12];
        convert_pixels(
            &mut dst,
            PixelFormat::A8B8G8R8,
            4,
            &src,
            PixelFormat::Gray8,
            1,
            3,
        )
        .unwrap();
        assert_eq!(dst, [0, 0, 0, 255, 77, 77, 77, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn gray8_to_gray16_and_back() {
        let src: Vec<u8> = (0..=255).collect();
        let mut wide = vec![0u8; 512];
        convert_pixels(
            &mut wide,
            PixelFormat::GrayU16,
            2,
            &src,
            PixelFormat::Gray8,
            1,
            256,
        )
        .unwrap();
        assert_eq!(u16::from_le_bytes([wide[2], wide[3]]), 257);
        assert_eq!(u16::from_le_bytes([wide[510], wide[511]]), 65535);

        let mut narrow = vec![0u8; 256];
        convert_pixels(
            &mut narrow,
            PixelFormat::Gray8,
            1,
            &wide,
            PixelFormat::GrayU16,
            2,
            256,
        )
        .unwrap();
        assert_eq!(narrow, src);
    }

    #[test]
    fn float_gray_clamps_into_integers() {
        let mut src = Vec::new();
        for v in [-1.0f32, 0.5, 2.0] {
            src.extend_from_slice(&v.to_le_bytes());
        }
        let mut dst = [0u8; 3];
        convert_pixels(
            &mut dst,
            PixelFormat::Gray8,
            1,
            &src,
            PixelFormat::GrayF32,
            4,
            3,
        )
        .unwrap();
        assert_eq!(dst, [0, 128, 255]);
    }

    #[test]
    fn rgb565_packing() {
        let white = [255u8, 255, 255];
        let mut dst = [0u8; 2];
        convert_pixels(
            &mut dst,
            PixelFormat::R5G6B5,
            2,
            &white,
            PixelFormat::B8G8R8,
            3,
            1,
        )
        .unwrap();
        assert_eq!(dst, [0xFF, 0xFF]);

        // Pure red in B8G8R8 is memory R, G, B = 255, 0, 0 and lands in bits 15..11.
        convert_pixels(
            &mut dst,
            PixelFormat::R5G6B5,
            2,
            &[255, 0, 0],
            PixelFormat::B8G8R8,
            3,
            1,
        )
        .unwrap();
        assert_eq!(u16::from_le_bytes(dst), 0xF800);
    }

    #[test]
    fn rgb565_unpacking() {
        let px = read_rgba(&0xF800u16.to_le_bytes(), PixelFormat::R5G6B5).unwrap();
        assert_eq!((px.r, px.g, px.b, px.a), (1.0, 0.0, 0.0, 1.0));
        let px = read_rgba(&0x07E0u16.to_le_bytes(), PixelFormat::R5G6B5).unwrap();
        assert_eq!((px.r, px.g, px.b), (0.0, 1.0, 0.0));
        let px = read_rgba(&0xFFFFu16.to_le_bytes(), PixelFormat::R5G6B5).unwrap();
        assert_eq!((px.r, px.g, px.b, px.a), (1.0, 1.0, 1.0, 1.0));
        // 16 of 31 in the blue field, 32 of 63 in green.
        let px = read_rgba(&0x0410u16.to_le_bytes(), PixelFormat::R5G6B5).unwrap();
        assert_relative_eq!(px.b, 16.0 / 31.0);
        assert_relative_eq!(px.g, 32.0 / 63.0);
        assert_eq!(px.r, 0.0);

        let mut dst = [0u8; 3];
        convert_pixels(
            &mut dst,
            PixelFormat::B8G8R8,
            3,
            &0xF81Fu16.to_le_bytes(),
            PixelFormat::R5G6B5,
            2,
            1,
        )
        .unwrap();
        assert_eq!(dst, [255, 0, 255]);
    }

    #[test]
    fn color_to_gray_uses_luma() {
        let mut dst = [0u8; 1];
        // Pure green, memory R, G, B
        convert_pixels(
            &mut dst,
            PixelFormat::Gray8,
            1,
            &[0, 255, 0],
            PixelFormat::B8G8R8,
            3,
            1,
        )
        .unwrap();
        assert_eq!(dst[0], 150);
    }

    #[test]
    fn padding_between_pixels_is_untouched() {
        let src = [1u8, 2, 3, 9, 4, 5, 6, 9];
        let mut dst = [0xAAu8; 8];
        convert_pixels(
            &mut dst,
            PixelFormat::R8G8B8,
            4,
            &src,
            PixelFormat::B8G8R8,
            4,
            2,
        )
        .unwrap();
        assert_eq!(dst, [3, 2, 1, 0xAA, 6, 5, 4, 0xAA]);
    }

    #[test]
    fn row_padding_is_preserved() {
        // 2x2 Gray8 with 3-byte source rows into RGB with 8-byte rows
        let src = [10u8, 20, 0, 30, 40, 0];
        let mut dst = [0x55u8; 16];
        convert_rows(
            &mut dst,
            PixelFormat::B8G8R8,
            8,
            &src,
            PixelFormat::Gray8,
            3,
            2,
            2,
        )
        .unwrap();
        assert_eq!(&dst[..8], &[10, 10, 10, 20, 20, 20, 0x55, 0x55]);
        assert_eq!(&dst[8..], &[30, 30, 30, 40, 40, 40, 0x55, 0x55]);
    }

    #[test]
    fn compressed_pairs_are_rejected() {
        let src = [0u8; 16];
        let mut dst = [0u8; 64];
        for (from, to) in [
            (PixelFormat::Dxt1, PixelFormat::A8R8G8B8),
            (PixelFormat::R8G8B8, PixelFormat::Dxt5),
            (PixelFormat::Dxt1, PixelFormat::Dxt5),
        ] {
            match convert_pixels(&mut dst, to, 16, &src, from, 16, 1) {
                Err(ImageError::UnsupportedConversion { from: f, to: t }) => {
                    assert_eq!((f, t), (from, to));
                }
                other => panic!("expected UnsupportedConversion, got {other:?}"),
            }
        }
        assert!(read_rgba(&src, PixelFormat::Dxt3).is_err());
    }

    #[test]
    fn identical_compressed_rows_copy_blocks() {
        // 8x4 DXT1: one row of two 8-byte blocks, 4 bytes per pixel row
        let src = noise(16);
        let mut dst = vec![0u8; 24];
        convert_rows(
            &mut dst,
            PixelFormat::Dxt1,
            6,
            &src,
            PixelFormat::Dxt1,
            4,
            8,
            4,
        )
        .unwrap();
        assert_eq!(&dst[..16], &src[..]);
        assert_eq!(&dst[16..], &[0u8; 8]);
    }

    #[test]
    fn short_buffers_are_reported() {
        let mut dst = [0u8; 5];
        let err = convert_pixels(
            &mut dst,
            PixelFormat::B8G8R8,
            3,
            &[0u8; 6],
            PixelFormat::R8G8B8,
            3,
            2,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ImageError::BufferTooSmall {
                needed: 6,
                actual: 5
            }
        ));
    }
}
