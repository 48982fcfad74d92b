//! A progressive two-scan stream (DC-first, then AC-first covering the
//! rest of the spectrum) must reconstruct the same pixels as the
//! equivalent single-scan baseline stream for a flat image.
use jpeg_core::options::DecoderOptions;

fn shared_tables_and_frame(sof_marker: u8) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&[0xFF, 0xD8]); // SOI

    data.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
    data.extend_from_slice(&[1u8; 64]);

    data.extend_from_slice(&[0xFF, sof_marker, 0x00, 0x0B, 0x08, 0x00, 0x08, 0x00, 0x08, 0x01, 0x01, 0x11, 0x00]);

    data.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x00]);
    data.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    data.push(0);

    data.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, 0x10]);
    data.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    data.push(0x00);
    data
}

fn baseline_stream() -> Vec<u8> {
    let mut data = shared_tables_and_frame(0xC0);
    data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    data.push(0b0011_1111); // DC code "0", AC code "0" (EOB)
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

fn progressive_stream() -> Vec<u8> {
    let mut data = shared_tables_and_frame(0xC2);

    // Scan 1: DC first, Ss=Se=0, Ah=Al=0. A single "0" code leaves the
    // coefficient at its initial zero (category 0 carries no magnitude
    // bits), so the DC value stays 0.
    data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00]);
    data.push(0b0111_1111);

    // Scan 2: AC first, Ss=1, Se=63, Ah=Al=0. An immediate EOB (r=0, s=0)
    // leaves every AC coefficient at zero.
    data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x01, 0x3F, 0x00]);
    data.push(0b0111_1111);

    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

#[test]
fn progressive_and_baseline_agree_on_a_flat_block() {
    let options = DecoderOptions::new().set_format_as_rgba(false);

    let baseline = jpeg_codec::decode(&baseline_stream(), &options).unwrap();
    let progressive = jpeg_codec::decode(&progressive_stream(), &options).unwrap();

    assert_eq!((baseline.width, baseline.height), (8, 8));
    assert_eq!((progressive.width, progressive.height), (8, 8));
    assert_eq!(baseline.pixel_data, progressive.pixel_data);
    assert!(progressive.pixel_data.iter().all(|&s| s == 128));
}
