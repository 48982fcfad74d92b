//! The resolution and cumulative-memory ceilings, both checked once at
//! SOF before any scan is decoded.
use jpeg_core::options::DecoderOptions;
use jpeg_codec::errors::DecodeErrors;

fn sof0_header(width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0xFFu8, 0xD8]; // SOI
    let mut sof = vec![0xFFu8, 0xC0, 0x00, 0x0B, 0x08];
    sof.extend_from_slice(&height.to_be_bytes());
    sof.extend_from_slice(&width.to_be_bytes());
    sof.extend_from_slice(&[0x01, 0x01, 0x11, 0x00]);
    data.extend_from_slice(&sof);
    data
}

#[test]
fn rejects_resolution_past_the_configured_ceiling() {
    let data = sof0_header(60_000, 60_000);
    let options = DecoderOptions::new().set_max_resolution_mp(100);
    let err = jpeg_codec::decode(&data, &options);
    assert!(matches!(err, Err(DecodeErrors::ResolutionExceeded { .. })));
}

#[test]
fn a_tighter_resolution_ceiling_rejects_an_otherwise_fine_image() {
    let data = sof0_header(8, 8);
    let options = DecoderOptions::new().set_max_resolution_mp(0);
    let err = jpeg_codec::decode(&data, &options);
    assert!(matches!(err, Err(DecodeErrors::ResolutionExceeded { .. })));
}

#[test]
fn rejects_allocations_past_the_memory_ceiling() {
    let data = sof0_header(8, 8);
    let options = DecoderOptions::new().set_max_memory_usage_mb(0);
    let err = jpeg_codec::decode(&data, &options);
    assert!(matches!(err, Err(DecodeErrors::MemoryLimitExceeded { .. })));
}

#[test]
fn a_generous_memory_ceiling_allows_a_small_image_through_sof() {
    // Not a full decode (no DHT/SOS supplied); just confirms the SOF-time
    // allocation itself succeeds under the default ceiling, i.e. the
    // failure above is really about the ceiling and not the frame shape.
    let mut data = sof0_header(8, 8);
    data.extend_from_slice(&[0xFF, 0xD9]);
    let options = DecoderOptions::new().set_max_memory_usage_mb(1);
    let err = jpeg_codec::decode(&data, &options);
    assert!(!matches!(err, Err(DecodeErrors::MemoryLimitExceeded { .. })));
}
