//! Restart-marker handling across MCU boundaries, via a hand-assembled
//! two-MCU grayscale stream with a restart interval of one MCU.
use jpeg_core::options::DecoderOptions;
use jpeg_codec::errors::DecodeErrors;

/// 16x8 single-component baseline image: two 8x8 blocks in a row, each
/// DC-only (flat gray), restart interval of 1 MCU. Both blocks use the
/// same trivial Huffman tables as the single-block fixtures elsewhere in
/// this crate: DC symbol 0 (category 0, no magnitude bits) at a 1-bit
/// code, AC symbol 0x00 (EOB) at a 1-bit code.
fn two_mcu_stream(include_restart_marker: bool) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&[0xFF, 0xD8]); // SOI

    data.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
    data.extend_from_slice(&[1u8; 64]);

    // SOF0: 16 wide x 8 tall, 1 component.
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x10, 0x01, 0x01, 0x11, 0x00]);

    data.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x00]);
    data.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    data.push(0);

    data.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x10]);
    data.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    data.push(0x00);

    // DRI: one MCU per restart interval.
    data.extend_from_slice(&[0xFF, 0xDD, 0x00, 0x04, 0x00, 0x01]);

    data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);

    // MCU 0: DC code "0", AC code "0" (EOB), padded with 1s to a byte.
    data.push(0b0011_1111);
    if include_restart_marker {
        data.extend_from_slice(&[0xFF, 0xD0]); // RST0
    }
    // MCU 1: identical, predictor reset by the restart.
    data.push(0b0011_1111);

    data.extend_from_slice(&[0xFF, 0xD9]); // EOI
    data
}

#[test]
fn decodes_across_a_restart_boundary() {
    let data = two_mcu_stream(true);
    let options = DecoderOptions::new().set_format_as_rgba(false);
    let image = jpeg_codec::decode(&data, &options).unwrap();
    assert_eq!((image.width, image.height), (16, 8));
    assert_eq!(image.pixel_data.len(), 16 * 8);
    assert!(image.pixel_data.iter().all(|&s| s == 128));
}

#[test]
fn missing_restart_marker_is_an_error() {
    let data = two_mcu_stream(false);
    let options = DecoderOptions::new().set_format_as_rgba(false);
    let err = jpeg_codec::decode(&data, &options);
    assert!(matches!(err, Err(DecodeErrors::MarkerNotFound)));
}
