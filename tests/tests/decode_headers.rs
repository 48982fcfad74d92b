//! Marker-parsing edge cases exercised through the public `decode` entry
//! point, with hand-assembled byte streams rather than fixture files.
use jpeg_core::options::DecoderOptions;
use jpeg_codec::errors::DecodeErrors;

#[test]
fn rejects_missing_soi() {
    let err = jpeg_codec::decode(&[0x00, 0x01, 0x02], &DecoderOptions::new());
    assert!(matches!(err, Err(DecodeErrors::IllegalMagicBytes(_))));
}

#[test]
fn rejects_empty_input() {
    let err = jpeg_codec::decode(&[], &DecoderOptions::new());
    assert!(matches!(err, Err(DecodeErrors::IllegalMagicBytes(_))));
}

#[test]
fn rejects_eoi_with_no_frame() {
    let data = [0xFF, 0xD8, 0xFF, 0xD9];
    let err = jpeg_codec::decode(&data, &DecoderOptions::new());
    assert!(matches!(err, Err(DecodeErrors::FormatStatic(_))));
}

#[test]
fn rejects_sos_before_any_sof() {
    let data = [0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, 0xFF, 0xD9];
    let err = jpeg_codec::decode(&data, &DecoderOptions::new());
    assert!(matches!(err, Err(DecodeErrors::FormatStatic(_))));
}

#[test]
fn rejects_sof_with_zero_sampling_factor() {
    // SOF0, 8x8, 1 component with h=0 (top nibble of the hv byte).
    let mut data = vec![0xFFu8, 0xD8];
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x01, 0x00]);
    let err = jpeg_codec::decode(&data, &DecoderOptions::new());
    assert!(matches!(err, Err(DecodeErrors::InvalidSamplingFactor)));
}

#[test]
fn rejects_a_second_sof_segment() {
    let mut data = vec![0xFFu8, 0xD8];
    let sof = [0xFFu8, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00];
    data.extend_from_slice(&sof);
    data.extend_from_slice(&sof);
    let err = jpeg_codec::decode(&data, &DecoderOptions::new());
    assert!(matches!(err, Err(DecodeErrors::MultipleFramesUnsupported)));
}

#[test]
fn rejects_unsupported_lossless_sof() {
    // SOF3 (lossless), otherwise identical header shape to SOF0.
    let mut data = vec![0xFFu8, 0xD8];
    data.extend_from_slice(&[0xFF, 0xC3, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00]);
    let err = jpeg_codec::decode(&data, &DecoderOptions::new());
    assert!(matches!(err, Err(DecodeErrors::Unsupported(_))));
}

#[test]
fn rejects_sos_selecting_an_undefined_quantization_table() {
    // SOF0 declares quantization index 2, but no DQT ever defines it.
    let mut data = vec![0xFFu8, 0xD8];
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x02]);
    data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    let err = jpeg_codec::decode(&data, &DecoderOptions::new());
    assert!(matches!(err, Err(DecodeErrors::FormatStatic(_))));
}

#[test]
fn rejects_sos_selecting_an_out_of_range_huffman_table() {
    let mut data = vec![0xFFu8, 0xD8];
    data.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
    data.extend_from_slice(&[1u8; 64]);
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00]);
    // Component selects DC table 9 / AC table 9, both out of the 0..4 range.
    data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x99, 0x00, 0x3F, 0x00]);
    let err = jpeg_codec::decode(&data, &DecoderOptions::new());
    assert!(matches!(err, Err(DecodeErrors::SosError(_))));
}

#[test]
fn rejects_sof_width_past_max_width() {
    let mut data = vec![0xFFu8, 0xD8];
    // SOF0, 8x64 (width 64), 1 component.
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x40, 0x01, 0x01, 0x11, 0x00]);
    let options = DecoderOptions::new().set_max_width(32);
    let err = jpeg_codec::decode(&data, &options);
    assert!(matches!(
        err,
        Err(DecodeErrors::DimensionExceeded { field: "width", limit: 32, actual: 64 })
    ));
}

#[test]
fn rejects_sof_height_past_max_height() {
    let mut data = vec![0xFFu8, 0xD8];
    // SOF0, 64x8 (height 64), 1 component.
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x40, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00]);
    let options = DecoderOptions::new().set_max_height(32);
    let err = jpeg_codec::decode(&data, &options);
    assert!(matches!(
        err,
        Err(DecodeErrors::DimensionExceeded { field: "height", limit: 32, actual: 64 })
    ));
}

#[test]
fn rejects_more_scans_than_max_scans_allows() {
    let mut data = vec![0xFFu8, 0xD8];
    data.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
    data.extend_from_slice(&[1u8; 64]);
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00]);
    data.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x00]);
    data.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    data.push(0);
    data.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x10]);
    data.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    data.push(0x00);
    // Two baseline scans over the same single component — only valid for a
    // non-progressive frame in the sense that the decoder doesn't forbid
    // it structurally, but `max_scans` should cut it off regardless.
    for _ in 0..2 {
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        data.push(0b0011_1111);
    }
    data.extend_from_slice(&[0xFF, 0xD9]);
    let options = DecoderOptions::new().set_max_scans(1);
    let err = jpeg_codec::decode(&data, &options);
    assert!(matches!(err, Err(DecodeErrors::TooManyScans { max_scans: 1 })));
}

#[test]
fn strict_mode_rejects_truncated_marker_rewind_recovery() {
    // A COM segment whose declared length runs two bytes too long,
    // swallowing the `FF C0` marker prefix of the SOF segment that
    // follows it as if it were comment payload. The tolerant parser
    // would rewind 2 bytes and reprocess `FF C0` as a real marker;
    // `strict_mode` should refuse that recovery instead.
    let data: Vec<u8> = vec![
        0xFF, 0xD8, // SOI
        0xFF, 0xFE, 0x00, 0x06, 0x41, 0x42, 0xFF, 0xC0, // COM, payload "AB" + eaten "FF C0"
        0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00, // SOF0 body
        0xFF, 0xD9, // EOI
    ];
    let options = DecoderOptions::new().set_strict_mode(true);
    let err = jpeg_codec::decode(&data, &options);
    assert!(matches!(err, Err(DecodeErrors::StrictModeViolation(_))));

    // Without strict mode the same bytes decode fine via the rewind
    // recovery.
    let tolerant = jpeg_codec::decode(&data, &DecoderOptions::new()).unwrap();
    assert_eq!((tolerant.width, tolerant.height), (8, 8));
}

#[test]
fn strict_mode_rejects_misaligned_app_segment_recovery() {
    // APP0 declares a length that's 5 bytes too short for its own "JFIF\0"
    // payload check, leaving a non-0xFF byte where the next marker should
    // start.
    let data: Vec<u8> = vec![
        0xFF, 0xD8, // SOI
        0xFF, 0xE0, 0x00, 0x07, 0x4A, 0x46, 0x49, 0x46, 0x00, // APP0 "JFIF\0"
        0x41, // stray non-marker byte right after the declared segment end
    ];
    let options = DecoderOptions::new().set_strict_mode(true);
    let err = jpeg_codec::decode(&data, &options);
    assert!(matches!(err, Err(DecodeErrors::StrictModeViolation(_))));
}
