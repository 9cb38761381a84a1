//! PNM header parsing and row decoding from an image stream.

use alloc::format;
use alloc::vec::Vec;

use super::{PnmFormat, PnmHeader};
use crate::codec::{check_conversion, check_layout};
use crate::convert::transcode_row;
use crate::error::ImageError;
use crate::format::PixelFormat;
use crate::image::{Image, alloc_zeroed};

/// Longest header token accepted; real ones are a handful of digits.
const MAX_TOKEN: usize = 32;

pub(crate) fn read_header(image: &mut Image<'_>) -> Result<PnmHeader, ImageError> {
    let mut magic = [0u8; 2];
    image.read_bytes(&mut magic)?;
    let format = match &magic {
        b"P5" => PnmFormat::Pgm,
        b"P6" => PnmFormat::Ppm,
        b"Pf" => PnmFormat::Pfm,
        b"PF" => {
            return Err(ImageError::UnsupportedVariant(
                "color PFM is not supported".into(),
            ));
        }
        [b'P', b'1'..=b'4' | b'7'] => {
            return Err(ImageError::UnsupportedVariant(format!(
                "PNM variant P{}",
                char::from(magic[1])
            )));
        }
        _ => return Err(ImageError::InvalidHeader("not a PNM stream".into())),
    };

    let width = parse_u32(&next_token(image)?, "width")?;
    let height = parse_u32(&next_token(image)?, "height")?;
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidHeader(format!(
            "zero dimensions {width}x{height}"
        )));
    }

    let (maxval, little_endian) = match format {
        PnmFormat::Pfm => {
            let token = next_token(image)?;
            let scale: f32 = core::str::from_utf8(&token)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| ImageError::InvalidHeader("unreadable PFM scale".into()))?;
            if scale == 0.0 || !scale.is_finite() {
                return Err(ImageError::InvalidHeader(format!("PFM scale {scale}")));
            }
            (0, scale < 0.0)
        }
        _ => {
            let maxval = parse_u32(&next_token(image)?, "maxval")?;
            if maxval == 0 || maxval > 65535 {
                return Err(ImageError::InvalidHeader(format!("maxval {maxval}")));
            }
            (maxval, false)
        }
    };

    tracing::debug!(?format, width, height, maxval, little_endian, "parsed PNM header");
    Ok(PnmHeader {
        format,
        width,
        height,
        maxval,
        little_endian,
    })
}

fn read_byte(image: &mut Image<'_>) -> Result<u8, ImageError> {
    let mut b = [0u8; 1];
    image.read_bytes(&mut b)?;
    Ok(b[0])
}

/// Next whitespace-delimited header token, skipping `#` comments. Consumes
/// exactly one whitespace byte after the token.
fn next_token(image: &mut Image<'_>) -> Result<Vec<u8>, ImageError> {
    let mut token = Vec::new();
    loop {
        match read_byte(image)? {
            b'#' if token.is_empty() => loop {
                if matches!(read_byte(image)?, b'\n' | b'\r') {
                    break;
                }
            },
            b if b.is_ascii_whitespace() => {
                if !token.is_empty() {
                    return Ok(token);
                }
            }
            b => {
                if token.len() == MAX_TOKEN {
                    return Err(ImageError::InvalidHeader("header token too long".into()));
                }
                token.push(b);
            }
        }
    }
}

fn parse_u32(token: &[u8], what: &str) -> Result<u32, ImageError> {
    core::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ImageError::InvalidHeader(format!("unreadable {what}")))
}

/// Decode every row of the stream into `dst`, re-expressed as `format`.
pub(crate) fn read_pixels(
    image: &mut Image<'_>,
    header: &PnmHeader,
    dst: &mut [u8],
    format: PixelFormat,
    pixel_stride: usize,
    line_width: usize,
) -> Result<(), ImageError> {
    let stored = header.stored()?;
    check_conversion(stored, format)?;
    check_layout(
        dst.len(),
        format,
        pixel_stride,
        line_width,
        header.width,
        header.height,
    )?;

    let w = header.width as usize;
    let h = header.height as usize;
    let mut raw = alloc_zeroed(w * header.channels() * header.sample_bytes())?;
    let mut native = alloc_zeroed(w * stored.stride_bytes())?;

    for i in 0..h {
        image.read_bytes(&mut raw)?;
        to_native(header, &raw, &mut native);
        let y = if header.bottom_up() { h - 1 - i } else { i };
        transcode_row(
            &mut dst[y * line_width..],
            format,
            pixel_stride,
            &native,
            stored,
            stored.stride_bytes(),
            w,
        )?;
    }
    tracing::trace!(rows = h, ?stored, ?format, "decoded PNM rows");
    Ok(())
}

/// Rewrite one disk row as the stored pixel format: little-endian, full range.
fn to_native(header: &PnmHeader, raw: &[u8], native: &mut [u8]) {
    match header.sample_bytes() {
        1 if header.maxval == 255 => native.copy_from_slice(raw),
        1 => {
            for (d, &s) in native.iter_mut().zip(raw) {
                *d = rescale(u32::from(s), header.maxval, 255) as u8;
            }
        }
        2 => {
            for (d, s) in native.chunks_exact_mut(2).zip(raw.chunks_exact(2)) {
                let v = u32::from(u16::from_be_bytes([s[0], s[1]]));
                let v = if header.maxval == 65535 {
                    v
                } else {
                    rescale(v, header.maxval, 65535)
                };
                d.copy_from_slice(&(v as u16).to_le_bytes());
            }
        }
        _ => {
            for (d, s) in native.chunks_exact_mut(4).zip(raw.chunks_exact(4)) {
                let bytes = [s[0], s[1], s[2], s[3]];
                let v = if header.little_endian {
                    f32::from_le_bytes(bytes)
                } else {
                    f32::from_be_bytes(bytes)
                };
                d.copy_from_slice(&v.to_le_bytes());
            }
        }
    }
}

/// Scale `v` from `0..=maxval` to `0..=full`, rounding; out-of-range
/// samples saturate.
fn rescale(v: u32, maxval: u32, full: u32) -> u32 {
    ((v * full + maxval / 2) / maxval).min(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_of(bytes: &[u8]) -> Result<PnmHeader, ImageError> {
        let mut stream = bytes;
        let mut image = Image::new();
        image.attach(&mut stream);
        read_header(&mut image)
    }

    #[test]
    fn parses_comments_and_whitespace() {
        let h = header_of(b"P5 # made by hand\n  3\t2\r\n# depth\n4095\n").unwrap();
        assert_eq!(h.format, PnmFormat::Pgm);
        assert_eq!((h.width, h.height, h.maxval), (3, 2, 4095));
    }

    #[test]
    fn header_consumes_one_whitespace_byte() {
        let data = b"P6\n1 1\n255\n\n\x01\x02";
        let mut stream: &[u8] = data;
        let mut image = Image::new();
        image.attach(&mut stream);
        read_header(&mut image).unwrap();
        let mut rest = [0u8; 3];
        image.read_bytes(&mut rest).unwrap();
        assert_eq!(rest, [b'\n', 1, 2]);
    }

    #[test]
    fn pfm_scale_sign_picks_byte_order() {
        let h = header_of(b"Pf\n2 2\n-1.0\n").unwrap();
        assert!(h.little_endian);
        let h = header_of(b"Pf\n2 2\n1.0\n").unwrap();
        assert!(!h.little_endian);
        assert!(matches!(
            header_of(b"Pf\n2 2\n0\n"),
            Err(ImageError::InvalidHeader(_))
        ));
    }

    #[test]
    fn rejects_bad_headers() {
        assert!(matches!(header_of(b"GIF89a"), Err(ImageError::InvalidHeader(_))));
        assert!(matches!(header_of(b"P3\n"), Err(ImageError::UnsupportedVariant(_))));
        assert!(matches!(header_of(b"PF\n"), Err(ImageError::UnsupportedVariant(_))));
        assert!(matches!(
            header_of(b"P5\n0 3\n255\n"),
            Err(ImageError::InvalidHeader(_))
        ));
        assert!(matches!(
            header_of(b"P5\n3 3\n70000\n"),
            Err(ImageError::InvalidHeader(_))
        ));
        assert!(matches!(
            header_of(b"P5\n3 x\n255\n"),
            Err(ImageError::InvalidHeader(_))
        ));
        assert!(matches!(
            header_of(b"P5\n3"),
            Err(ImageError::Stream(crate::StreamError::UnexpectedEof))
        ));
        let long = [b'9'; 40];
        let mut data = b"P5\n".to_vec();
        data.extend_from_slice(&long);
        assert!(matches!(header_of(&data), Err(ImageError::InvalidHeader(_))));
    }

    #[test]
    fn low_maxval_is_rescaled() {
        assert_eq!(rescale(15, 15, 255), 255);
        assert_eq!(rescale(0, 15, 255), 0);
        assert_eq!(rescale(7, 15, 255), 119);
        assert_eq!(rescale(20, 15, 255), 255);
        assert_eq!(rescale(1023, 1023, 65535), 65535);
    }
}
