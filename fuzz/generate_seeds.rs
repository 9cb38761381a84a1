#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // PPM 2x2
    let ppm = b"P6\n2 2\n255\n\xff\x00\x00\x00\xff\x00\x00\x00\xff\x80\x80\x80";
    fs::write(format!("{dir}/ppm_2x2.ppm"), ppm).unwrap();

    // PGM 3x2
    let pgm = b"P5\n3 2\n255\n\x00\x40\x80\xc0\xff\x64";
    fs::write(format!("{dir}/pgm_3x2.pgm"), pgm).unwrap();

    // PGM 16-bit 2x1, with a comment in the header
    let pgm16 = b"P5\n# two samples\n2 1\n65535\n\x12\x34\xab\xcd";
    fs::write(format!("{dir}/pgm16_2x1.pgm"), pgm16).unwrap();

    // PPM with maxval 15
    let ppm15 = b"P6 1 1 15\n\x0f\x08\x00";
    fs::write(format!("{dir}/ppm_maxval15.ppm"), ppm15).unwrap();

    // PFM gray 1x1
    let mut pfm = b"Pf\n1 1\n-1.0\n".to_vec();
    pfm.extend_from_slice(&1.0f32.to_le_bytes());
    fs::write(format!("{dir}/pfm_gray_1x1.pfm"), pfm).unwrap();

    // PFM gray 2x1, big-endian
    let mut pfm_be = b"Pf\n2 1\n1.0\n".to_vec();
    pfm_be.extend_from_slice(&0.5f32.to_be_bytes());
    pfm_be.extend_from_slice(&(-2.0f32).to_be_bytes());
    fs::write(format!("{dir}/pfm_be_2x1.pfm"), pfm_be).unwrap();

    // Minimal BMP 1x1 24-bit
    let mut bmp = vec![0u8; 58]; // 54 header + 4 pixel (3 + 1 padding)
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&58u32.to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&1i32.to_le_bytes()); // width
    bmp[22..26].copy_from_slice(&1i32.to_le_bytes()); // height
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
    bmp[54] = 0xff; bmp[55] = 0x00; bmp[56] = 0x00; // BGR
    fs::write(format!("{dir}/bmp_1x1.bmp"), &bmp).unwrap();

    // Same image as 32-bit top-down
    let mut bmp32 = bmp.clone();
    bmp32[22..26].copy_from_slice(&(-1i32).to_le_bytes());
    bmp32[28..30].copy_from_slice(&32u16.to_le_bytes());
    bmp32[57] = 0x80;
    fs::write(format!("{dir}/bmp32_topdown_1x1.bmp"), bmp32).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/just_p6.bin"), b"P6").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    fs::write(format!("{dir}/p5_huge.bin"), b"P5\n99999999 99999999\n255\n").unwrap();
    fs::write(format!("{dir}/p5_maxval0.bin"), b"P5\n1 1\n0\n\x00").unwrap();

    println!("Generated seed corpus in {dir}/");
}
