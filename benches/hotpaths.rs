use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ledring_decoder::calibration::HexagonLayout;
use ledring_decoder::capture::RingGeometry;
use ledring_decoder::decoding::FrameDecoder;
use ledring_decoder::detection::BrightSpotDetector;

fn bench_detect(c: &mut Criterion) {
    let geometry = RingGeometry::default();
    let frame = geometry.render(&[0xff; 6], 0);
    let detector = BrightSpotDetector::default();

    c.bench_function("detect_all_on_ring", |b| {
        b.iter(|| detector.detect(black_box(&frame)))
    });
}

fn bench_decode(c: &mut Criterion) {
    let geometry = RingGeometry::default();
    let layout = HexagonLayout::assign(&geometry.led_positions());
    let decoder = FrameDecoder::new(&layout, 220);
    let frame = geometry.render(b"Hello!", 0);

    c.bench_function("decode_frame", |b| {
        b.iter(|| decoder.decode(black_box(&frame)))
    });
}

criterion_group!(benches, bench_detect, bench_decode);
criterion_main!(benches);
