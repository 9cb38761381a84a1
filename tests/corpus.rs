//! Test corpus: codec round trips at awkward sizes, and delivery into every
//! uncompressed format.

#![cfg(all(feature = "pnm", feature = "bmp"))]

use zenraster::bmp::BmpCodec;
use zenraster::pnm::PnmCodec;
use zenraster::*;

const SIZES: [(u32, u32); 5] = [(1, 1), (3, 5), (17, 9), (64, 2), (2, 33)];

fn noise_pattern(len: usize, seed: u32) -> Vec<u8> {
    let mut state: u32 = 0xDEAD_BEEF ^ seed;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

fn noise_image(width: u32, height: u32, format: PixelFormat) -> Image<'static> {
    let mut image = Image::new();
    image.reset(width, height, format, 1, true).unwrap();
    let mut pixels = noise_pattern(image.data_size(), width * 31 + height);
    if format == PixelFormat::GrayF32 {
        // Keep floats finite so the comparison is bytewise.
        for (i, px) in pixels.chunks_exact_mut(4).enumerate() {
            px.copy_from_slice(&(i as f32 * 0.5 - 3.0).to_le_bytes());
        }
    }
    image.set_data(pixels).unwrap();
    image
}

fn encode(codec: &mut dyn Codec, src: &Image<'_>) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    {
        let mut target = Image::new();
        target.attach(&mut out);
        write_image(codec, src, &mut target).unwrap();
    }
    out
}

fn decode_as(
    codec: &mut dyn Codec,
    bytes: &[u8],
    format: PixelFormat,
    pad: usize,
) -> (Vec<u8>, usize) {
    let mut stream = bytes;
    let mut image = Image::new();
    image.attach(&mut stream);
    codec.read_header(&mut image).unwrap();
    let line = image.width() as usize * format.stride_bytes() + pad;
    let mut dst = vec![0u8; line * image.height() as usize];
    codec
        .read_data(&mut image, &mut dst, format, format.stride_bytes(), line)
        .unwrap();
    (dst, line)
}

fn pnm() -> Box<dyn Codec> {
    Box::new(PnmCodec::new())
}

fn bmp() -> Box<dyn Codec> {
    Box::new(BmpCodec::new())
}

fn strip_padding(buf: &[u8], line: usize, row: usize) -> Vec<u8> {
    buf.chunks(line).flat_map(|r| r[..row].to_vec()).collect()
}

#[test]
fn stored_formats_roundtrip_at_all_sizes() {
    let cases: [(PixelFormat, fn() -> Box<dyn Codec>); 6] = [
        (PixelFormat::Gray8, pnm),
        (PixelFormat::GrayU16, pnm),
        (PixelFormat::GrayF32, pnm),
        (PixelFormat::B8G8R8, pnm),
        (PixelFormat::R8G8B8, bmp),
        (PixelFormat::A8R8G8B8, bmp),
    ];
    for (format, make) in cases {
        for (w, h) in SIZES {
            let src = noise_image(w, h, format);
            let encoded = encode(make().as_mut(), &src);
            let (decoded, _) = decode_as(make().as_mut(), &encoded, format, 0);
            assert_eq!(decoded, src.data(), "{format:?} {w}x{h}");
        }
    }
}

#[test]
fn delivery_matches_descriptor_conversion() {
    let targets = PixelFormat::ALL
        .into_iter()
        .filter(|f| !f.is_compressed())
        .collect::<Vec<_>>();
    for (w, h) in SIZES {
        let src = noise_image(w, h, PixelFormat::R8G8B8);
        let encoded = encode(&mut BmpCodec::new(), &src);
        for &format in &targets {
            let expected = src.convert_into(format).unwrap();
            let (decoded, line) = decode_as(&mut BmpCodec::new(), &encoded, format, 3);
            let row = w as usize * format.stride_bytes();
            assert_eq!(
                strip_padding(&decoded, line, row),
                expected.data(),
                "{format:?} {w}x{h}"
            );
        }
    }
}

#[test]
fn gray16_window_survives_pnm() {
    let mut src = Image::new();
    src.reset(16, 16, PixelFormat::GrayU16, 1, true).unwrap();
    for (i, px) in src.data_mut().chunks_exact_mut(2).enumerate() {
        px.copy_from_slice(&((i as u16) * 37).to_le_bytes());
    }
    let encoded = encode(&mut PnmCodec::new(), &src);

    let mut stream: &[u8] = &encoded;
    let mut image = Image::new();
    image.attach(&mut stream);
    read_image(&mut PnmCodec::new(), &mut image).unwrap();
    assert_eq!(image.percentile_range().unwrap(), src.percentile_range().unwrap());

    let display = image.to_display_gray8().unwrap();
    assert_eq!(display.data().len(), 256);
    assert!(display.data().windows(2).all(|w| w[0] <= w[1]));
}
