#![no_main]
use libfuzzer_sys::fuzz_target;
use zenraster::bmp::BmpCodec;
use zenraster::pnm::PnmCodec;
use zenraster::*;

fn decode(codec: &mut dyn Codec, data: &[u8]) -> Option<(u32, u32, Option<PixelFormat>, Vec<u8>)> {
    let mut stream = data;
    let mut image = Image::new().with_limits(Limits {
        max_pixels: Some(1 << 22),
        max_memory_bytes: Some(1 << 26),
        ..Default::default()
    });
    image.attach(&mut stream);
    read_image(codec, &mut image).ok()?;
    Some((image.width(), image.height(), image.format(), image.take_data()))
}

fuzz_target!(|data: &[u8]| {
    // If we can decode it, re-encoding and decoding again must produce identical pixels
    let codec: fn() -> Box<dyn Codec> = if PnmCodec::probe(data) {
        || Box::new(PnmCodec::new())
    } else if BmpCodec::probe(data) {
        || Box::new(BmpCodec::new())
    } else {
        return;
    };
    let Some((width, height, format, pixels)) = decode(codec().as_mut(), data) else {
        return;
    };
    let Some(format) = format else { return };

    let mut source = Image::new();
    source.reset(width, height, format, 1, false).unwrap();
    source.set_data(pixels).unwrap();

    let mut reencoded: Vec<u8> = Vec::new();
    {
        let mut target = Image::new();
        target.attach(&mut reencoded);
        write_image(codec().as_mut(), &source, &mut target).expect("re-encode failed");
    }

    let Some((w2, h2, f2, pixels2)) = decode(codec().as_mut(), &reencoded) else {
        panic!("re-encoded data failed to decode");
    };
    assert_eq!((width, height, Some(format)), (w2, h2, f2));
    assert_eq!(source.data(), &pixels2[..], "roundtrip pixel mismatch");
});
