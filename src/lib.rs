//! # zenraster
//!
//! Pixel format registry, mip-chain geometry and cross-format pixel
//! conversion shared by image codecs.
//!
//! ## What's here
//!
//! - [`PixelFormat`]: the closed catalog of pixel encodings, with per-format
//!   stride, channel order, alpha and block-compression facts.
//! - [`geometry`]: per-level logical and stored sizes of a mip chain.
//! - [`Image`]: the descriptor a codec drives. It owns the pixel buffer and
//!   borrows the stream.
//! - [`convert`]: pixel-by-pixel conversion between uncompressed formats.
//! - [`swap`]: 24-bit red/blue flips, in place or between strided buffers.
//! - [`percentile`]: nearest-sample 10th/90th percentile window for
//!   displaying 16-bit and float gray data.
//! - [`Codec`]: the read/write contract, with built-in PNM (`pnm` feature)
//!   and BMP (`bmp` feature) codecs.
//!
//! ## Byte layout
//!
//! An uncompressed pixel is a little-endian integer of
//! [`PixelFormat::stride_bits`] bits whose channels are listed most
//! significant first. `R8G8B8` is therefore stored B, G, R in memory and
//! `B8G8R8` is stored R, G, B.
//!
//! ## Usage
//!
//! ```
//! # #[cfg(feature = "pnm")]
//! # {
//! use zenraster::{Image, PixelFormat, pnm::PnmCodec, read_image};
//!
//! let data: &[u8] = b"P6\n2 1\n255\n\x10\x20\x30\x40\x50\x60";
//! let mut stream = data;
//! let mut image = Image::new();
//! image.attach(&mut stream);
//! read_image(&mut PnmCodec::new(), &mut image)?;
//! assert_eq!(image.format(), Some(PixelFormat::B8G8R8));
//!
//! let bgra = image.convert_into(PixelFormat::A8R8G8B8)?;
//! assert_eq!(&bgra.data()[..4], &[0x30, 0x20, 0x10, 0xFF]);
//! # }
//! # Ok::<(), zenraster::ImageError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod codec;
mod error;
mod format;
mod image;
mod limits;
mod stream;
mod typed;

pub mod convert;
pub mod geometry;
pub mod percentile;
pub mod swap;

#[cfg(feature = "pnm")]
pub mod pnm;

#[cfg(feature = "bmp")]
pub mod bmp;

// Re-exports
pub use codec::{Codec, check_conversion, check_layout, read_image, write_image};
pub use error::{ImageError, StreamError};
pub use format::{Channel, ChannelSpec, FormatInfo, PixelFormat};
pub use geometry::LevelGeometry;
pub use image::Image;
pub use limits::Limits;
#[cfg(feature = "std")]
pub use stream::{IoStream, Reader, Writer};
pub use stream::ImageStream;
pub use typed::FormatPixel;
