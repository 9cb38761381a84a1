//! Rejected conversions are reported through `tracing`, whichever entry
//! point rejects them.

use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::util::SubscriberInitExt;
use zenraster::convert::convert_pixels;
use zenraster::*;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

const REJECTED: &str = "rejected conversion involving a compressed format";

// Single test in this binary: the subscriber is installed for the thread
// and callsite interest is cached process-wide.
#[test]
fn every_rejection_site_warns() {
    let captured = Captured::default();
    let sink = captured.clone();
    let _guard = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .finish()
        .set_default();

    assert!(matches!(
        check_conversion(PixelFormat::Gray8, PixelFormat::Dxt1),
        Err(ImageError::UnsupportedConversion { .. })
    ));
    assert_eq!(captured.text().matches(REJECTED).count(), 1);

    let mut dst = [0u8; 16];
    let rejected = convert_pixels(
        &mut dst,
        PixelFormat::Dxt5,
        16,
        &[0u8; 4],
        PixelFormat::A8R8G8B8,
        4,
        1,
    );
    assert!(rejected.is_err());
    assert_eq!(captured.text().matches(REJECTED).count(), 2);

    // Accepted pairs stay quiet.
    check_conversion(PixelFormat::Dxt3, PixelFormat::Dxt3).unwrap();
    check_conversion(PixelFormat::R8G8B8, PixelFormat::GrayU16).unwrap();
    assert_eq!(captured.text().matches(REJECTED).count(), 2);

    #[cfg(feature = "pnm")]
    {
        let data: &[u8] = b"P5\n4 4\n255\n";
        let mut stream = data;
        let mut image = Image::new();
        image.attach(&mut stream);
        let mut codec = pnm::PnmCodec::new();
        codec.read_header(&mut image).unwrap();
        let mut buf = [0u8; 64];
        assert!(matches!(
            codec.read_data(&mut image, &mut buf, PixelFormat::Dxt1, 8, 8),
            Err(ImageError::UnsupportedConversion { .. })
        ));
        assert_eq!(captured.text().matches(REJECTED).count(), 3);
    }
}
