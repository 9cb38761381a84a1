//! The image descriptor: geometry, format, owned pixel buffer, mip cursor
//! and a borrowed stream that codecs read from or write to.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use crate::convert;
use crate::error::ImageError;
use crate::format::PixelFormat;
use crate::geometry::{self, LevelGeometry};
use crate::limits::Limits;
use crate::percentile::{self, Sample};
use crate::stream::ImageStream;

/// Live image state driven by a [`Codec`](crate::Codec) or by the caller.
///
/// A fresh descriptor is empty: no format, no buffer, no stream. [`reset`]
/// fixes geometry and optionally allocates storage for every stored level.
/// The buffer is owned exclusively and freed on reset, [`close`] and drop.
///
/// [`reset`]: Image::reset
/// [`close`]: Image::close
pub struct Image<'s> {
    stream: Option<&'s mut dyn ImageStream>,
    data: Vec<u8>,
    width: u32,
    height: u32,
    data_width: u32,
    data_height: u32,
    line_width: usize,
    format: Option<PixelFormat>,
    num_levels: u8,
    level: u8,
    file_name: String,
    limits: Option<Limits>,
}

impl Default for Image<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> Image<'s> {
    pub fn new() -> Self {
        Self {
            stream: None,
            data: Vec::new(),
            width: 0,
            height: 0,
            data_width: 0,
            data_height: 0,
            line_width: 0,
            format: None,
            num_levels: 0,
            level: 0,
            file_name: String::new(),
            limits: None,
        }
    }

    /// Apply resource limits to subsequent resets and header reads.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn limits(&self) -> Option<&Limits> {
        self.limits.as_ref()
    }

    /// Fix geometry for a `width` x `height` image in `format` with
    /// `num_levels` mip levels, releasing any previous buffer.
    ///
    /// Levels are stored one after another below level 0, so with more than
    /// one level [`data_height`](Image::data_height) counts the rows of the
    /// whole chain. `num_levels == 0` means the chain length is decided
    /// elsewhere and only level 0 is sized. When `allocate` is set a zeroed
    /// buffer is reserved.
    ///
    /// On failure the descriptor is left empty.
    pub fn reset(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        num_levels: u8,
        allocate: bool,
    ) -> Result<(), ImageError> {
        self.clear();

        if let Some(limits) = &self.limits {
            limits.check(width, height)?;
        }
        let geometry = geometry::level_geometry(width, height, 0, format)?;
        let data_height = if num_levels > 1 {
            chain_rows(width, height, num_levels, format, geometry.line_stride)?
        } else {
            geometry.data_height
        };

        self.width = width;
        self.height = height;
        self.data_width = geometry.data_width;
        self.data_height = data_height;
        self.line_width = geometry.line_stride;
        self.format = Some(format);
        self.num_levels = num_levels;

        tracing::debug!(
            width,
            height,
            ?format,
            num_levels,
            bytes = self.data_size(),
            allocate,
            file = %self.file_name,
            "image reset"
        );

        if allocate {
            if let Err(err) = self.allocate() {
                self.clear();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Reserve a zeroed buffer of [`data_size`](Image::data_size) bytes,
    /// replacing any existing one.
    pub fn allocate(&mut self) -> Result<(), ImageError> {
        self.format.ok_or(ImageError::NoFormat)?;
        self.data = Vec::new();
        self.data = self.alloc_zeroed(self.data_size())?;
        Ok(())
    }

    /// Bind the stream codecs relay through.
    pub fn attach(&mut self, stream: &'s mut dyn ImageStream) {
        self.stream = Some(stream);
    }

    /// Release the buffer and detach the stream. Geometry is cleared; the
    /// file name and limits stay.
    pub fn close(&mut self) {
        tracing::debug!(file = %self.file_name, bytes = self.data.len(), "image closed");
        self.stream = None;
        self.clear();
    }

    /// Drop the buffer and all geometry.
    fn clear(&mut self) {
        self.data = Vec::new();
        self.width = 0;
        self.height = 0;
        self.data_width = 0;
        self.data_height = 0;
        self.line_width = 0;
        self.format = None;
        self.num_levels = 0;
        self.level = 0;
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Logical level-0 width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical level-0 height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Stored level-0 width (block multiple for compressed formats).
    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    /// Stored rows: level 0 rounded to the block edge, or the whole mip
    /// chain when there is more than one level.
    pub fn data_height(&self) -> u32 {
        self.data_height
    }

    /// Bytes per pixel, or per block for compressed formats.
    pub fn stride(&self) -> usize {
        self.format.map_or(0, PixelFormat::stride_bytes)
    }

    /// Bytes per stored pixel row of level 0.
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    /// Bytes of the buffer: `line_width * data_height`.
    pub fn data_size(&self) -> usize {
        self.line_width * self.data_height as usize
    }

    pub fn format(&self) -> Option<PixelFormat> {
        self.format
    }

    pub fn has_alpha(&self) -> bool {
        self.format.is_some_and(PixelFormat::has_alpha)
    }

    pub fn num_levels(&self) -> u8 {
        self.num_levels
    }

    /// Index of the mip level currently being streamed.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Move the level cursor.
    pub fn set_level(&mut self, level: u8) -> Result<(), ImageError> {
        self.check_level(u32::from(level))?;
        self.level = level;
        Ok(())
    }

    /// Step the cursor to the next level if there is one. Returns whether it
    /// moved.
    pub fn advance_level(&mut self) -> bool {
        if self.level.saturating_add(1) < self.num_levels {
            self.level += 1;
            tracing::trace!(level = self.level, "advanced mip cursor");
            true
        } else {
            false
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = name.into();
    }

    /// Logical and stored geometry of `level`.
    pub fn level_geometry(&self, level: u32) -> Result<LevelGeometry, ImageError> {
        let format = self.format.ok_or(ImageError::NoFormat)?;
        self.check_level(level)?;
        geometry::level_geometry(self.width, self.height, level, format)
    }

    fn check_level(&self, level: u32) -> Result<(), ImageError> {
        let levels = u32::from(self.num_levels);
        if levels > 0 && level >= levels {
            return Err(ImageError::LevelOutOfRange { level, levels });
        }
        Ok(())
    }

    /// Stored bytes of `level` within the buffer.
    pub fn level_data(&self, level: u32) -> Result<&[u8], ImageError> {
        let range = self.level_range(level)?;
        Ok(&self.data[range])
    }

    pub fn level_data_mut(&mut self, level: u32) -> Result<&mut [u8], ImageError> {
        let range = self.level_range(level)?;
        Ok(&mut self.data[range])
    }

    fn level_range(&self, level: u32) -> Result<Range<usize>, ImageError> {
        let format = self.format.ok_or(ImageError::NoFormat)?;
        self.check_level(level)?;
        let offset = geometry::level_offset(self.width, self.height, level, format)?;
        let size = geometry::level_geometry(self.width, self.height, level, format)?.size;
        let end = offset.saturating_add(size);
        if end > self.data.len() {
            return Err(ImageError::BufferTooSmall {
                needed: end,
                actual: self.data.len(),
            });
        }
        Ok(offset..end)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Move the buffer out, leaving the descriptor without storage.
    pub fn take_data(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.data)
    }

    /// Hand a buffer to the descriptor. Its length must equal
    /// [`data_size`](Image::data_size).
    pub fn set_data(&mut self, data: Vec<u8>) -> Result<(), ImageError> {
        self.format.ok_or(ImageError::NoFormat)?;
        if data.len() != self.data_size() {
            return Err(ImageError::InvalidGeometry(format!(
                "buffer of {} bytes for a {} byte image",
                data.len(),
                self.data_size()
            )));
        }
        self.data = data;
        Ok(())
    }

    /// Read exactly `buf.len()` bytes from the attached stream.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), ImageError> {
        let stream = self.stream.as_mut().ok_or(ImageError::NoStream)?;
        Ok(stream.read_exact(buf)?)
    }

    /// Write all of `buf` to the attached stream.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<(), ImageError> {
        let stream = self.stream.as_mut().ok_or(ImageError::NoStream)?;
        Ok(stream.write_all(buf)?)
    }

    /// Discard `n` bytes of the attached stream.
    pub fn skip_bytes(&mut self, n: usize) -> Result<(), ImageError> {
        let stream = self.stream.as_mut().ok_or(ImageError::NoStream)?;
        Ok(stream.skip(n)?)
    }

    /// Re-express every stored level in `format` as a new, unattached image
    /// with the same level count.
    ///
    /// Both formats must be uncompressed unless they are identical.
    pub fn convert_into(&self, format: PixelFormat) -> Result<Image<'static>, ImageError> {
        let from = self.format.ok_or(ImageError::NoFormat)?;
        let mut out = Image::new();
        out.limits = self.limits.clone();
        out.file_name = self.file_name.clone();
        out.reset(self.width, self.height, format, self.num_levels, true)?;
        for level in 0..u32::from(self.num_levels.max(1)) {
            let src = self.level_geometry(level)?;
            let dst_line = out.level_geometry(level)?.line_stride;
            convert::convert_rows(
                out.level_data_mut(level)?,
                format,
                dst_line,
                self.level_data(level)?,
                from,
                src.line_stride,
                src.width,
                src.height,
            )?;
        }
        Ok(out)
    }

    /// Samples nearest the 10th and 90th percentile positions of a
    /// single-channel high-precision buffer, as `f64`.
    ///
    /// Accepts `Gray8`, `GrayU16` and `GrayF32`. Row padding is skipped.
    pub fn percentile_range(&self) -> Result<(f64, f64), ImageError> {
        match self.format.ok_or(ImageError::NoFormat)? {
            PixelFormat::Gray8 => Ok(widen(percentile::percentile_range(&self.samples(
                PixelFormat::Gray8,
                |b| b[0],
            )?))),
            PixelFormat::GrayU16 => Ok(widen(percentile::percentile_range(&self.samples(
                PixelFormat::GrayU16,
                |b| u16::from_le_bytes([b[0], b[1]]),
            )?))),
            PixelFormat::GrayF32 => Ok(widen(percentile::percentile_range(&self.samples(
                PixelFormat::GrayF32,
                |b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            )?))),
            other => Err(ImageError::UnsupportedVariant(format!(
                "percentile window needs a single-channel format, got {other:?}"
            ))),
        }
    }

    /// Map a gray buffer through its percentile window into a new `Gray8`
    /// image suitable for display.
    pub fn to_display_gray8(&self) -> Result<Image<'static>, ImageError> {
        let pixels = match self.format.ok_or(ImageError::NoFormat)? {
            PixelFormat::Gray8 => window(self.samples(PixelFormat::Gray8, |b| b[0])?),
            PixelFormat::GrayU16 => window(self.samples(PixelFormat::GrayU16, |b| {
                u16::from_le_bytes([b[0], b[1]])
            })?),
            PixelFormat::GrayF32 => window(self.samples(PixelFormat::GrayF32, |b| {
                f32::from_le_bytes([b[0], b[1], b[2], b[3]])
            })?),
            other => {
                return Err(ImageError::UnsupportedVariant(format!(
                    "display window needs a single-channel format, got {other:?}"
                )));
            }
        };
        let mut out = Image::new();
        out.file_name = self.file_name.clone();
        out.reset(self.width, self.height, PixelFormat::Gray8, 1, false)?;
        out.set_data(pixels)?;
        Ok(out)
    }

    /// Collect the visible samples of level 0, row by row.
    fn samples<T>(&self, format: PixelFormat, read: impl Fn(&[u8]) -> T) -> Result<Vec<T>, ImageError> {
        let bpp = format.stride_bytes();
        let row = self.width as usize * bpp;
        let needed = self.data_size();
        if self.data.len() < needed {
            return Err(ImageError::BufferTooSmall {
                needed,
                actual: self.data.len(),
            });
        }
        let count = self.width as usize * self.height as usize;
        let mut out = Vec::new();
        out.try_reserve_exact(count)
            .map_err(|_| ImageError::AllocationFailed {
                bytes: count * core::mem::size_of::<T>(),
            })?;
        for line in self.data.chunks(self.line_width).take(self.height as usize) {
            out.extend(line[..row].chunks_exact(bpp).map(&read));
        }
        Ok(out)
    }

    fn alloc_zeroed(&self, bytes: usize) -> Result<Vec<u8>, ImageError> {
        if let Some(limits) = &self.limits {
            limits.check_memory(bytes)?;
        }
        alloc_zeroed(bytes)
    }
}

/// Rows of `line_stride` bytes covering a chain of `num_levels` levels,
/// rounded up to whole block rows.
fn chain_rows(
    width: u32,
    height: u32,
    num_levels: u8,
    format: PixelFormat,
    line_stride: usize,
) -> Result<u32, ImageError> {
    let bytes = geometry::chain_size(width, height, u32::from(num_levels), format)?;
    let edge = format.block_edge() as usize;
    let rows = bytes.div_ceil(line_stride.max(1)).div_ceil(edge) * edge;
    u32::try_from(rows).map_err(|_| {
        ImageError::InvalidGeometry(format!(
            "mip chain of {num_levels} levels for {width}x{height} overflows"
        ))
    })
}

fn widen<T: Sample>((lo, hi): (T, T)) -> (f64, f64) {
    (lo.into(), hi.into())
}

fn window<T: Sample>(samples: Vec<T>) -> Vec<u8> {
    let (lo, hi) = percentile::percentile_range(&samples);
    percentile::normalize_to_gray8(&samples, lo, hi)
}

/// Allocate `bytes` zeroed bytes without aborting on failure.
pub(crate) fn alloc_zeroed(bytes: usize) -> Result<Vec<u8>, ImageError> {
    let mut data = Vec::new();
    data.try_reserve_exact(bytes)
        .map_err(|_| ImageError::AllocationFailed { bytes })?;
    data.resize(bytes, 0);
    Ok(data)
}

impl fmt::Debug for Image<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("file_name", &self.file_name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_width", &self.data_width)
            .field("data_height", &self.data_height)
            .field("line_width", &self.line_width)
            .field("format", &self.format)
            .field("num_levels", &self.num_levels)
            .field("level", &self.level)
            .field("data_len", &self.data.len())
            .field("has_stream", &self.stream.is_some())
            .finish()
    }
}
