//! Pixel format registry.
//!
//! Every format tag maps to one immutable [`FormatInfo`] entry in a static
//! table. Channel lists run from the most-significant to the
//! least-significant bit of the pixel, and an uncompressed pixel is stored
//! as a little-endian integer of `stride_bits`. So [`PixelFormat::A8R8G8B8`]
//! lays out in memory as B, G, R, A and [`PixelFormat::B8G8R8`] as R, G, B.

/// Pixel format tag.
///
/// Discriminants are stable and match the on-disk tag values, with
/// block-compressed formats in a disjoint range starting at 128.
#[non_exhaustive]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit alpha only.
    A8 = 1,
    /// 8-bit grayscale.
    Gray8,
    /// 16-bit unsigned grayscale (little endian).
    GrayU16,
    /// 32-bit float grayscale (little endian).
    GrayF32,
    /// 16-bit packed RGB, 5-6-5.
    R5G6B5,
    /// 24-bit RGB, memory order B, G, R.
    R8G8B8,
    /// 32-bit RGBA, memory order A, B, G, R.
    R8G8B8A8,
    /// 32-bit ARGB, memory order B, G, R, A.
    A8R8G8B8,
    /// 24-bit BGR, memory order R, G, B.
    B8G8R8,
    /// 32-bit BGRA, memory order A, R, G, B.
    B8G8R8A8,
    /// 32-bit ABGR, memory order R, G, B, A.
    A8B8G8R8,
    /// BC1: 4x4 blocks of 64 bits.
    Dxt1 = 128,
    /// BC2 with premultiplied alpha.
    Dxt2,
    /// BC2: explicit 4-bit alpha.
    Dxt3,
    /// BC3 with premultiplied alpha.
    Dxt4,
    /// BC3: interpolated alpha.
    Dxt5,
    /// BC5 / ATI2: two-channel normal maps.
    Ati3dc,
}

/// Role of a channel within a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
    Gray,
}

/// One channel of a pixel: its role and width in bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelSpec {
    pub channel: Channel,
    pub bits: u8,
}

/// Registry entry describing one pixel format.
#[derive(Debug)]
pub struct FormatInfo {
    pub format: PixelFormat,
    /// Bits per pixel, or bits per block for compressed formats.
    pub stride_bits: u32,
    /// Channels from most- to least-significant bit. Empty for compressed formats.
    pub channels: &'static [ChannelSpec],
    pub has_alpha: bool,
    pub compressed: bool,
    /// Edge length of a compression block in pixels (1 for uncompressed).
    pub block_edge: u32,
    /// Channel values are IEEE floats rather than unsigned normalized integers.
    pub float: bool,
}

const fn ch(channel: Channel, bits: u8) -> ChannelSpec {
    ChannelSpec { channel, bits }
}

const R8: ChannelSpec = ch(Channel::Red, 8);
const G8: ChannelSpec = ch(Channel::Green, 8);
const B8: ChannelSpec = ch(Channel::Blue, 8);
const A8: ChannelSpec = ch(Channel::Alpha, 8);

const ALPHA: [ChannelSpec; 1] = [A8];
const GRAY_8: [ChannelSpec; 1] = [ch(Channel::Gray, 8)];
const GRAY_16: [ChannelSpec; 1] = [ch(Channel::Gray, 16)];
const GRAY_32: [ChannelSpec; 1] = [ch(Channel::Gray, 32)];
const RGB_565: [ChannelSpec; 3] = [
    ch(Channel::Red, 5),
    ch(Channel::Green, 6),
    ch(Channel::Blue, 5),
];
const RGB: [ChannelSpec; 3] = [R8, G8, B8];
const RGBA: [ChannelSpec; 4] = [R8, G8, B8, A8];
const ARGB: [ChannelSpec; 4] = [A8, R8, G8, B8];
const BGR: [ChannelSpec; 3] = [B8, G8, R8];
const BGRA: [ChannelSpec; 4] = [B8, G8, R8, A8];
const ABGR: [ChannelSpec; 4] = [A8, B8, G8, R8];

const fn plain(
    format: PixelFormat,
    stride_bits: u32,
    channels: &'static [ChannelSpec],
    has_alpha: bool,
) -> FormatInfo {
    FormatInfo {
        format,
        stride_bits,
        channels,
        has_alpha,
        compressed: false,
        block_edge: 1,
        float: false,
    }
}

const fn block(format: PixelFormat, stride_bits: u32, has_alpha: bool) -> FormatInfo {
    FormatInfo {
        format,
        stride_bits,
        channels: &[],
        has_alpha,
        compressed: true,
        block_edge: 4,
        float: false,
    }
}

static REGISTRY: [FormatInfo; 17] = [
    plain(PixelFormat::A8, 8, &ALPHA, true),
    plain(PixelFormat::Gray8, 8, &GRAY_8, false),
    plain(PixelFormat::GrayU16, 16, &GRAY_16, false),
    FormatInfo {
        float: true,
        ..plain(PixelFormat::GrayF32, 32, &GRAY_32, false)
    },
    plain(PixelFormat::R5G6B5, 16, &RGB_565, false),
    plain(PixelFormat::R8G8B8, 24, &RGB, false),
    plain(PixelFormat::R8G8B8A8, 32, &RGBA, true),
    plain(PixelFormat::A8R8G8B8, 32, &ARGB, true),
    plain(PixelFormat::B8G8R8, 24, &BGR, false),
    plain(PixelFormat::B8G8R8A8, 32, &BGRA, true),
    plain(PixelFormat::A8B8G8R8, 32, &ABGR, true),
    block(PixelFormat::Dxt1, 64, false),
    block(PixelFormat::Dxt2, 128, true),
    block(PixelFormat::Dxt3, 128, true),
    block(PixelFormat::Dxt4, 128, true),
    block(PixelFormat::Dxt5, 128, true),
    block(PixelFormat::Ati3dc, 128, false),
];

impl PixelFormat {
    /// Every format tag, in registry order.
    pub const ALL: [PixelFormat; 17] = [
        Self::A8,
        Self::Gray8,
        Self::GrayU16,
        Self::GrayF32,
        Self::R5G6B5,
        Self::R8G8B8,
        Self::R8G8B8A8,
        Self::A8R8G8B8,
        Self::B8G8R8,
        Self::B8G8R8A8,
        Self::A8B8G8R8,
        Self::Dxt1,
        Self::Dxt2,
        Self::Dxt3,
        Self::Dxt4,
        Self::Dxt5,
        Self::Ati3dc,
    ];

    const fn index(self) -> usize {
        let tag = self as usize;
        if tag >= Self::Dxt1 as usize {
            tag - Self::Dxt1 as usize + 11
        } else {
            tag - 1
        }
    }

    /// Registry entry for this format.
    #[inline]
    pub fn info(self) -> &'static FormatInfo {
        &REGISTRY[self.index()]
    }

    /// Look up a format by its numeric tag.
    ///
    /// Returns `None` for tags outside the closed set (including 0, "unknown").
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| *f as u8 == tag)
    }

    /// Numeric tag of this format.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Bits per pixel, or bits per block for compressed formats.
    pub fn stride_bits(self) -> u32 {
        self.info().stride_bits
    }

    pub fn has_alpha(self) -> bool {
        self.info().has_alpha
    }

    pub fn is_compressed(self) -> bool {
        self.info().compressed
    }

    /// Edge length of a compression block (1 for uncompressed formats).
    pub fn block_edge(self) -> u32 {
        self.info().block_edge
    }

    /// Bytes per pixel for uncompressed formats, bytes per block otherwise.
    pub fn stride_bytes(self) -> usize {
        (self.info().stride_bits / 8) as usize
    }

    /// Channels from most- to least-significant bit.
    pub fn channels(self) -> &'static [ChannelSpec] {
        self.info().channels
    }

    /// Whether the only channel is gray.
    pub fn is_gray(self) -> bool {
        matches!(self, Self::Gray8 | Self::GrayU16 | Self::GrayF32)
    }
}
