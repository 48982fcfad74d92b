//! End-to-end encode-then-decode, exercising both crates together rather
//! than either in isolation.
use jpeg_core::options::{DecoderOptions, EncoderOptions};
use jpeg_codec::errors::EncodeErrors;
use jpeg_codec::RawImage;

fn flat_rgba(width: u16, height: u16, rgb: (u8, u8, u8)) -> Vec<u8> {
    let mut data = Vec::with_capacity(usize::from(width) * usize::from(height) * 4);
    for _ in 0..(u32::from(width) * u32::from(height)) {
        data.extend_from_slice(&[rgb.0, rgb.1, rgb.2, 255]);
    }
    data
}

#[test]
fn flat_color_survives_a_round_trip_within_tolerance() {
    let (width, height) = (16u16, 16u16);
    let rgba = flat_rgba(width, height, (200, 90, 40));
    let raw_image = RawImage {
        width,
        height,
        data: &rgba,
        comments: &[],
        exif_buffer: None,
    };
    let encoded = jpeg_codec::encode(&raw_image, &EncoderOptions::new().set_quality(95)).unwrap();
    assert_eq!(&encoded.data[0..2], &[0xFF, 0xD8]);
    assert_eq!(&encoded.data[encoded.data.len() - 2..], &[0xFF, 0xD9]);

    let decoded = jpeg_codec::decode(&encoded.data, &DecoderOptions::new()).unwrap();
    assert_eq!((decoded.width, decoded.height), (width, height));
    assert_eq!(decoded.pixel_data.len(), usize::from(width) * usize::from(height) * 4);

    for px in decoded.pixel_data.chunks_exact(4) {
        assert!(px[0].abs_diff(200) <= 4, "red channel drifted: {px:?}");
        assert!(px[1].abs_diff(90) <= 4, "green channel drifted: {px:?}");
        assert!(px[2].abs_diff(40) <= 4, "blue channel drifted: {px:?}");
        assert_eq!(px[3], 255);
    }
}

#[test]
fn restart_intervals_round_trip_too() {
    let (width, height) = (32u16, 16u16);
    let rgba = flat_rgba(width, height, (128, 128, 128));
    let raw_image = RawImage {
        width,
        height,
        data: &rgba,
        comments: &[],
        exif_buffer: None,
    };
    let options = EncoderOptions::new().set_quality(80).set_restart_interval(2);
    let encoded = jpeg_codec::encode(&raw_image, &options).unwrap();

    let decoded = jpeg_codec::decode(&encoded.data, &DecoderOptions::new()).unwrap();
    assert_eq!((decoded.width, decoded.height), (width, height));
    assert!(decoded.pixel_data.chunks_exact(4).all(|px| px[0].abs_diff(128) <= 4));
}

#[test]
fn mid_gray_does_not_drift_towards_white() {
    let (width, height) = (8u16, 8u16);
    let rgba = flat_rgba(width, height, (128, 128, 128));
    let raw_image = RawImage {
        width,
        height,
        data: &rgba,
        comments: &[],
        exif_buffer: None,
    };
    let encoded = jpeg_codec::encode(&raw_image, &EncoderOptions::new().set_quality(90)).unwrap();
    let decoded = jpeg_codec::decode(&encoded.data, &DecoderOptions::new()).unwrap();
    for px in decoded.pixel_data.chunks_exact(4) {
        assert!(px[0].abs_diff(128) <= 4, "gray drifted towards white/black: {px:?}");
    }
}

#[test]
fn an_already_wrapped_exif_buffer_is_not_double_prefixed() {
    let (width, height) = (8u16, 8u16);
    let rgba = flat_rgba(width, height, (10, 20, 30));
    let mut exif_buffer = b"Exif\0\0".to_vec();
    exif_buffer.extend_from_slice(&[1, 2, 3, 4]);
    let raw_image = RawImage {
        width,
        height,
        data: &rgba,
        comments: &[],
        exif_buffer: Some(&exif_buffer),
    };
    let encoded = jpeg_codec::encode(&raw_image, &EncoderOptions::new()).unwrap();
    let decoded = jpeg_codec::decode(&encoded.data, &DecoderOptions::new()).unwrap();
    assert_eq!(decoded.exif_bytes.as_deref(), Some(&[1u8, 2, 3, 4][..]));
}

#[test]
fn rejects_a_buffer_of_the_wrong_size() {
    let raw_image = RawImage {
        width: 8,
        height: 8,
        data: &[0u8; 10],
        comments: &[],
        exif_buffer: None,
    };
    let err = jpeg_codec::encode(&raw_image, &EncoderOptions::new());
    assert!(matches!(err, Err(EncodeErrors::ImageBufferWrongSize { .. })));
}
