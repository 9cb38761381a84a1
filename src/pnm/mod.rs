//! PNM family: P5 (PGM), P6 (PPM) and grayscale PFM.
//!
//! Samples are stored as `Gray8`/`GrayU16` (P5), `B8G8R8` (P6, memory R,G,B)
//! or `GrayF32` (PFM). Rows are streamed one at a time through the image's
//! attached stream.

mod decode;
mod encode;

use crate::codec::Codec;
use crate::error::ImageError;
use crate::format::PixelFormat;
use crate::image::Image;

/// Which PNM sub-format a stream holds.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PnmFormat {
    /// P5, binary grayscale.
    Pgm,
    /// P6, binary RGB.
    Ppm,
    /// `Pf`, single-channel 32-bit float, rows bottom to top.
    Pfm,
}

/// Parsed PNM header (internal).
#[derive(Clone, Debug)]
pub(crate) struct PnmHeader {
    pub format: PnmFormat,
    pub width: u32,
    pub height: u32,
    /// Largest sample value; 0 for PFM.
    pub maxval: u32,
    /// PFM byte order, taken from the sign of the scale.
    pub little_endian: bool,
}

impl PnmHeader {
    /// Pixel format rows are delivered from and accepted in.
    pub fn stored(&self) -> Result<PixelFormat, ImageError> {
        match (self.format, self.maxval > 255) {
            (PnmFormat::Pgm, false) => Ok(PixelFormat::Gray8),
            (PnmFormat::Pgm, true) => Ok(PixelFormat::GrayU16),
            (PnmFormat::Ppm, false) => Ok(PixelFormat::B8G8R8),
            (PnmFormat::Ppm, true) => Err(ImageError::UnsupportedVariant(
                "16-bit PPM has no matching pixel format".into(),
            )),
            (PnmFormat::Pfm, _) => Ok(PixelFormat::GrayF32),
        }
    }

    /// Bytes per sample on disk.
    fn sample_bytes(&self) -> usize {
        match self.format {
            PnmFormat::Pfm => 4,
            _ if self.maxval > 255 => 2,
            _ => 1,
        }
    }

    fn channels(&self) -> usize {
        match self.format {
            PnmFormat::Ppm => 3,
            PnmFormat::Pgm | PnmFormat::Pfm => 1,
        }
    }

    fn bottom_up(&self) -> bool {
        self.format == PnmFormat::Pfm
    }
}

/// Codec for binary PGM/PPM and grayscale PFM.
#[derive(Debug, Default)]
pub struct PnmCodec {
    header: Option<PnmHeader>,
}

impl PnmCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `head` starts with a PNM magic this codec reads.
    pub fn probe(head: &[u8]) -> bool {
        matches!(head, [b'P', b'5' | b'6' | b'f', ..])
    }

    /// Sub-format of the last header read or written.
    pub fn pnm_format(&self) -> Option<PnmFormat> {
        self.header.as_ref().map(|h| h.format)
    }

    fn header(&self) -> Result<&PnmHeader, ImageError> {
        self.header
            .as_ref()
            .ok_or_else(|| ImageError::InvalidHeader("no PNM header read or written".into()))
    }
}

impl Codec for PnmCodec {
    fn read_header(&mut self, image: &mut Image<'_>) -> Result<(), ImageError> {
        self.header = None;
        let header = decode::read_header(image)?;
        image.reset(header.width, header.height, header.stored()?, 1, false)?;
        self.header = Some(header);
        Ok(())
    }

    fn read_data(
        &mut self,
        image: &mut Image<'_>,
        dst: &mut [u8],
        format: PixelFormat,
        pixel_stride: usize,
        line_width: usize,
    ) -> Result<(), ImageError> {
        let header = self.header()?;
        decode::read_pixels(image, header, dst, format, pixel_stride, line_width)?;
        image.advance_level();
        Ok(())
    }

    fn write_header(
        &mut self,
        image: &mut Image<'_>,
        format: PixelFormat,
        width: u32,
        height: u32,
        num_levels: u8,
    ) -> Result<(), ImageError> {
        self.header = None;
        let header = encode::plan(format, width, height, num_levels)?;
        image.reset(width, height, header.stored()?, 1, false)?;
        encode::write_header(image, &header)?;
        self.header = Some(header);
        Ok(())
    }

    fn write_data(
        &mut self,
        image: &mut Image<'_>,
        src: &[u8],
        format: PixelFormat,
        pixel_stride: usize,
        line_width: usize,
    ) -> Result<(), ImageError> {
        let header = self.header()?;
        encode::write_pixels(image, header, src, format, pixel_stride, line_width)?;
        image.advance_level();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_magic() {
        assert!(PnmCodec::probe(b"P5\n1 1\n255\n"));
        assert!(PnmCodec::probe(b"P6"));
        assert!(PnmCodec::probe(b"Pf\n"));
        assert!(!PnmCodec::probe(b"PF\n"));
        assert!(!PnmCodec::probe(b"P3"));
        assert!(!PnmCodec::probe(b"BM"));
        assert!(!PnmCodec::probe(b"P"));
    }

    #[test]
    fn stored_formats() {
        let header = |format, maxval| PnmHeader {
            format,
            width: 1,
            height: 1,
            maxval,
            little_endian: false,
        };
        assert_eq!(header(PnmFormat::Pgm, 255).stored().unwrap(), PixelFormat::Gray8);
        assert_eq!(header(PnmFormat::Pgm, 15).stored().unwrap(), PixelFormat::Gray8);
        assert_eq!(header(PnmFormat::Pgm, 4095).stored().unwrap(), PixelFormat::GrayU16);
        assert_eq!(header(PnmFormat::Ppm, 255).stored().unwrap(), PixelFormat::B8G8R8);
        assert!(header(PnmFormat::Ppm, 65535).stored().is_err());
        assert_eq!(header(PnmFormat::Pfm, 0).stored().unwrap(), PixelFormat::GrayF32);
    }
}
