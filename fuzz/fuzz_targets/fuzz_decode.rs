#![no_main]
use libfuzzer_sys::fuzz_target;
use zenraster::bmp::BmpCodec;
use zenraster::pnm::PnmCodec;
use zenraster::{Codec, Image, Limits, read_image};

fn limits() -> Limits {
    Limits {
        max_pixels: Some(1 << 22),
        max_memory_bytes: Some(1 << 26),
        ..Default::default()
    }
}

fn try_decode(codec: &mut dyn Codec, data: &[u8]) {
    let mut stream = data;
    let mut image = Image::new().with_limits(limits());
    image.attach(&mut stream);
    let _ = read_image(codec, &mut image);
}

fuzz_target!(|data: &[u8]| {
    // Each codec must reject or decode arbitrary bytes without panicking
    try_decode(&mut PnmCodec::new(), data);
    try_decode(&mut BmpCodec::new(), data);
});
