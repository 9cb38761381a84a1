//! Uncompressed BMP: 24-bit (`R8G8B8`, memory B,G,R) and 32-bit
//! (`A8R8G8B8`, memory B,G,R,A).
//!
//! Rows are padded to 4 bytes and stored bottom-up unless the header height
//! is negative.

mod decode;
mod encode;

use crate::codec::Codec;
use crate::error::ImageError;
use crate::format::PixelFormat;
use crate::image::Image;

/// Parsed BMP header (internal).
#[derive(Clone, Debug)]
pub(crate) struct BmpHeader {
    pub width: u32,
    pub height: u32,
    pub bits: u16,
    pub top_down: bool,
}

impl BmpHeader {
    pub fn stored(&self) -> PixelFormat {
        if self.bits == 32 {
            PixelFormat::A8R8G8B8
        } else {
            PixelFormat::R8G8B8
        }
    }

    /// Bytes of pixel data per row, before padding.
    fn pixel_bytes(&self) -> usize {
        self.width as usize * usize::from(self.bits / 8)
    }

    /// Bytes per row on disk, padded to 4.
    fn row_stride(&self) -> usize {
        (self.pixel_bytes() + 3) & !3
    }

    /// Row index in the image for the `i`th row in the stream.
    fn image_row(&self, i: usize) -> usize {
        if self.top_down {
            i
        } else {
            self.height as usize - 1 - i
        }
    }
}

/// Codec for uncompressed 24/32-bit BMP.
#[derive(Debug, Default)]
pub struct BmpCodec {
    header: Option<BmpHeader>,
}

impl BmpCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `head` starts with the BMP signature.
    pub fn probe(head: &[u8]) -> bool {
        head.starts_with(b"BM")
    }

    fn header(&self) -> Result<&BmpHeader, ImageError> {
        self.header
            .as_ref()
            .ok_or_else(|| ImageError::InvalidHeader("no BMP header read or written".into()))
    }
}

impl Codec for BmpCodec {
    fn read_header(&mut self, image: &mut Image<'_>) -> Result<(), ImageError> {
        self.header = None;
        let header = decode::read_header(image)?;
        image.reset(header.width, header.height, header.stored(), 1, false)?;
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
        image.reset(width, height, header.stored(), 1, false)?;
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
