#![no_main]
use libfuzzer_sys::fuzz_target;
use zenraster::PixelFormat;
use zenraster::convert::{convert_pixels, convert_rows};
use zenraster::swap::{copy_flip_rb24, flip_rb24};

fuzz_target!(|data: &[u8]| {
    // Arbitrary formats, strides and counts must be rejected or handled, never panic
    let [from, to, src_stride, dst_stride, count, rest @ ..] = data else {
        return;
    };
    let (Some(from), Some(to)) = (PixelFormat::from_tag(*from), PixelFormat::from_tag(*to)) else {
        return;
    };
    let (src_stride, dst_stride, count) =
        (*src_stride as usize, *dst_stride as usize, *count as usize);

    let mut dst = vec![0u8; rest.len()];
    let _ = convert_pixels(&mut dst, to, dst_stride, rest, from, src_stride, count);
    let _ = convert_rows(
        &mut dst,
        to,
        dst_stride,
        rest,
        from,
        src_stride,
        count as u32 % 17,
        count as u32 / 17,
    );

    let mut buf = rest.to_vec();
    let _ = flip_rb24(&mut buf, count, src_stride);
    let _ = copy_flip_rb24(&mut dst, rest, count, dst_stride, src_stride);
});
