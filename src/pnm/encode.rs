//! PNM encoder: P5, P6 and grayscale PFM, streamed row by row.

use alloc::format;

use super::{PnmFormat, PnmHeader};
use crate::codec::{check_conversion, check_layout};
use crate::convert::transcode_row;
use crate::error::ImageError;
use crate::format::PixelFormat;
use crate::image::{Image, alloc_zeroed};

/// Choose the PNM layout for pixels supplied as `format`.
///
/// Gray formats keep their depth; any other uncompressed color format is
/// written as 8-bit P6, dropping alpha.
pub(crate) fn plan(
    format: PixelFormat,
    width: u32,
    height: u32,
    num_levels: u8,
) -> Result<PnmHeader, ImageError> {
    if num_levels > 1 {
        return Err(ImageError::UnsupportedVariant(format!(
            "PNM holds a single level, asked for {num_levels}"
        )));
    }
    let (pnm, maxval) = match format {
        PixelFormat::Gray8 => (PnmFormat::Pgm, 255),
        PixelFormat::GrayU16 => (PnmFormat::Pgm, 65535),
        PixelFormat::GrayF32 => (PnmFormat::Pfm, 0),
        PixelFormat::A8 => {
            return Err(ImageError::UnsupportedVariant(
                "cannot encode alpha-only pixels as PNM".into(),
            ));
        }
        f if f.is_compressed() => {
            return Err(ImageError::UnsupportedConversion {
                from: f,
                to: PixelFormat::B8G8R8,
            });
        }
        _ => (PnmFormat::Ppm, 255),
    };
    Ok(PnmHeader {
        format: pnm,
        width,
        height,
        maxval,
        little_endian: true,
    })
}

pub(crate) fn write_header(image: &mut Image<'_>, header: &PnmHeader) -> Result<(), ImageError> {
    let PnmHeader {
        width,
        height,
        maxval,
        ..
    } = *header;
    let text = match header.format {
        PnmFormat::Pgm => format!("P5\n{width} {height}\n{maxval}\n"),
        PnmFormat::Ppm => format!("P6\n{width} {height}\n{maxval}\n"),
        // Negative scale marks little-endian samples.
        PnmFormat::Pfm => format!("Pf\n{width} {height}\n-1.0\n"),
    };
    tracing::debug!(format = ?header.format, width, height, maxval, "writing PNM header");
    image.write_bytes(text.as_bytes())
}

/// Encode every row of `src` (in `format`) to the stream.
pub(crate) fn write_pixels(
    image: &mut Image<'_>,
    header: &PnmHeader,
    src: &[u8],
    format: PixelFormat,
    pixel_stride: usize,
    line_width: usize,
) -> Result<(), ImageError> {
    let stored = header.stored()?;
    check_conversion(format, stored)?;
    check_layout(
        src.len(),
        format,
        pixel_stride,
        line_width,
        header.width,
        header.height,
    )?;

    let w = header.width as usize;
    let h = header.height as usize;
    let mut row = alloc_zeroed(w * stored.stride_bytes())?;

    for i in 0..h {
        // PFM stores bottom-to-top
        let y = if header.bottom_up() { h - 1 - i } else { i };
        transcode_row(
            &mut row,
            stored,
            stored.stride_bytes(),
            &src[y * line_width..],
            format,
            pixel_stride,
            w,
        )?;
        if header.sample_bytes() == 2 {
            for px in row.chunks_exact_mut(2) {
                px.swap(0, 1);
            }
        }
        image.write_bytes(&row)?;
    }
    tracing::trace!(rows = h, ?format, ?stored, "encoded PNM rows");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn plan_picks_layout() {
        let p = plan(PixelFormat::GrayU16, 2, 2, 1).unwrap();
        assert_eq!((p.format, p.maxval), (PnmFormat::Pgm, 65535));
        let p = plan(PixelFormat::A8B8G8R8, 2, 2, 0).unwrap();
        assert_eq!(p.format, PnmFormat::Ppm);
        assert_eq!(p.stored().unwrap(), PixelFormat::B8G8R8);
        assert!(matches!(
            plan(PixelFormat::Gray8, 2, 2, 3),
            Err(ImageError::UnsupportedVariant(_))
        ));
        assert!(matches!(
            plan(PixelFormat::Dxt5, 4, 4, 1),
            Err(ImageError::UnsupportedConversion { .. })
        ));
        assert!(plan(PixelFormat::A8, 2, 2, 1).is_err());
    }

    #[test]
    fn sixteen_bit_samples_are_big_endian() {
        let header = plan(PixelFormat::GrayU16, 2, 1, 1).unwrap();
        let mut out: Vec<u8> = Vec::new();
        {
            let mut image = Image::new();
            image.attach(&mut out);
            let src = [0x34u8, 0x12, 0xCD, 0xAB];
            write_pixels(&mut image, &header, &src, PixelFormat::GrayU16, 2, 4).unwrap();
        }
        assert_eq!(out, [0x12, 0x34, 0xAB, 0xCD]);
    }
}
