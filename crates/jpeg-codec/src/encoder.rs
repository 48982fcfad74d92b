//! The baseline sequential encoder: YCbCr 4:4:4, one DC/AC Huffman table
//! pair for luma and one shared by both chroma channels, quality-scaled
//! Annex K quantization tables.
use jpeg_core::options::EncoderOptions;
use log::debug;

use crate::errors::EncodeErrors;
use crate::fdct::{build_fdtbl, forward_dct, quantize_block, scale_quant_table, RgbYuvTables};
use crate::huffman::EncoderHuffmanTable;
use crate::marker::Marker;
use crate::quant::ZIGZAG;
use crate::tables;

/// The image an encode call consumes: interleaved RGBA bytes, one Adobe
/// convention for a pixel buffer the rest of this workspace also uses.
pub struct RawImage<'a> {
    pub width: u16,
    pub height: u16,
    pub data: &'a [u8],
    pub comments: &'a [String],
    pub exif_buffer: Option<&'a [u8]>,
}

/// The bytes an encode call produces, plus the dimensions they describe.
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u16,
    pub height: u16,
}

/// Accumulates bits MSB-first into whole bytes, byte-stuffing `0xFF`
/// with a trailing `0x00` as it goes out, per §4.8 step 11.
struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    bits_in_acc: u8,
}

impl BitWriter {
    fn new() -> Self {
        BitWriter { out: Vec::new(), acc: 0, bits_in_acc: 0 }
    }

    fn write_bits(&mut self, value: u16, size: u8) {
        if size == 0 {
            return;
        }
        self.acc = (self.acc << size) | u32::from(value);
        self.bits_in_acc += size;
        while self.bits_in_acc >= 8 {
            self.bits_in_acc -= 8;
            let byte = ((self.acc >> self.bits_in_acc) & 0xFF) as u8;
            self.out.push(byte);
            if byte == 0xFF {
                self.out.push(0x00);
            }
        }
    }

    /// Pad the final partial byte with 1-bits and flush it.
    fn finish(mut self) -> Vec<u8> {
        if self.bits_in_acc > 0 {
            let pad = 8 - self.bits_in_acc;
            self.write_bits((1u16 << pad) - 1, pad);
        }
        self.out
    }
}

/// Huffman-coded DC/AC table pair for one component class (luma or
/// chroma), built once from the Annex K defaults.
struct HuffmanPair {
    dc: EncoderHuffmanTable,
    ac: EncoderHuffmanTable,
}

impl HuffmanPair {
    fn luma() -> Result<Self, EncodeErrors> {
        Ok(HuffmanPair {
            dc: EncoderHuffmanTable::from_bits_and_values(&tables::LUMA_DC_BITS, &tables::LUMA_DC_VALUES)
                .map_err(|_| EncodeErrors::WriteFailed("invalid luma DC table"))?,
            ac: EncoderHuffmanTable::from_bits_and_values(&tables::LUMA_AC_BITS, &tables::LUMA_AC_VALUES)
                .map_err(|_| EncodeErrors::WriteFailed("invalid luma AC table"))?,
        })
    }

    fn chroma() -> Result<Self, EncodeErrors> {
        Ok(HuffmanPair {
            dc: EncoderHuffmanTable::from_bits_and_values(&tables::CHROMA_DC_BITS, &tables::CHROMA_DC_VALUES)
                .map_err(|_| EncodeErrors::WriteFailed("invalid chroma DC table"))?,
            ac: EncoderHuffmanTable::from_bits_and_values(&tables::CHROMA_AC_BITS, &tables::CHROMA_AC_VALUES)
                .map_err(|_| EncodeErrors::WriteFailed("invalid chroma AC table"))?,
        })
    }
}

/// Category (bit length) and magnitude bits for a signed DC/AC
/// coefficient, per the standard JPEG encoding of "value" in Annex F.
fn magnitude_category(value: i32) -> (u8, u16) {
    if value == 0 {
        return (0, 0);
    }
    let abs = value.unsigned_abs();
    let category = (32 - abs.leading_zeros()) as u8;
    let bits = if value > 0 {
        abs
    } else {
        (value + (1i32 << category) - 1) as u32
    };
    (category, bits as u16)
}

fn write_block(
    writer: &mut BitWriter,
    block_zigzag: &[i32; 64],
    prev_dc: i32,
    huff: &HuffmanPair,
) -> i32 {
    let dc = block_zigzag[0];
    let (size, bits) = magnitude_category(dc - prev_dc);
    let (code_len, code) = huff.dc.code_for(size);
    writer.write_bits(code, code_len);
    writer.write_bits(bits, size);

    let mut zero_run = 0u8;
    for &coeff in &block_zigzag[1..64] {
        if coeff == 0 {
            zero_run += 1;
            continue;
        }
        while zero_run > 15 {
            let (len, code) = huff.ac.code_for(0xF0); // ZRL
            writer.write_bits(code, len);
            zero_run -= 16;
        }
        let (size, bits) = magnitude_category(coeff);
        let symbol = (zero_run << 4) | size;
        let (len, code) = huff.ac.code_for(symbol);
        writer.write_bits(code, len);
        writer.write_bits(bits, size);
        zero_run = 0;
    }
    if zero_run > 0 {
        let (len, code) = huff.ac.code_for(0x00); // EOB
        writer.write_bits(code, len);
    }
    dc
}

fn zigzag_order(natural: &[i32; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    for (scan_pos, entry) in out.iter_mut().enumerate() {
        *entry = natural[ZIGZAG[scan_pos]];
    }
    out
}

fn write_marker(out: &mut Vec<u8>, marker: Marker) {
    out.push(0xFF);
    out.push(marker.code());
}

fn write_segment(out: &mut Vec<u8>, marker: Marker, payload: &[u8]) {
    write_marker(out, marker);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
}

fn write_jfif_header(out: &mut Vec<u8>) {
    let mut payload = Vec::with_capacity(14);
    payload.extend_from_slice(b"JFIF\0");
    payload.extend_from_slice(&[1, 1]); // version 1.1
    payload.push(0); // density units: none
    payload.extend_from_slice(&1u16.to_be_bytes()); // x density
    payload.extend_from_slice(&1u16.to_be_bytes()); // y density
    payload.push(0); // no thumbnail
    payload.push(0);
    write_segment(out, Marker::APP(0), &payload);
}

fn write_exif_segment(out: &mut Vec<u8>, exif: &[u8]) {
    if exif.starts_with(b"Exif") {
        write_segment(out, Marker::APP(1), exif);
        return;
    }
    let mut payload = Vec::with_capacity(6 + exif.len());
    payload.extend_from_slice(b"Exif\0\0");
    payload.extend_from_slice(exif);
    write_segment(out, Marker::APP(1), &payload);
}

fn write_comment(out: &mut Vec<u8>, comment: &str) {
    write_segment(out, Marker::COM, comment.as_bytes());
}

fn write_quant_segment(out: &mut Vec<u8>, dest_id: u8, table_natural: &[i32; 64]) {
    let mut payload = Vec::with_capacity(65);
    payload.push(dest_id);
    for &scan_pos in &ZIGZAG {
        payload.push(table_natural[scan_pos].clamp(0, 255) as u8);
    }
    write_segment(out, Marker::DQT, &payload);
}

fn write_sof0(out: &mut Vec<u8>, width: u16, height: u16) {
    let mut payload = Vec::with_capacity(17);
    payload.push(8); // precision
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&width.to_be_bytes());
    payload.push(3);
    for (id, quant_dest) in [(1u8, 0u8), (2, 1), (3, 1)] {
        payload.push(id);
        payload.push(0x11); // h=1, v=1
        payload.push(quant_dest);
    }
    write_segment(out, Marker::SOF(0), &payload);
}

fn write_dht(out: &mut Vec<u8>, class: u8, dest_id: u8, bits: &[u8; 16], values: &[u8]) {
    let mut payload = Vec::with_capacity(17 + values.len());
    payload.push((class << 4) | dest_id);
    payload.extend_from_slice(bits);
    payload.extend_from_slice(values);
    write_segment(out, Marker::DHT, &payload);
}

fn write_sos(out: &mut Vec<u8>) {
    let mut payload = Vec::with_capacity(10);
    payload.push(3);
    for (id, tables) in [(1u8, 0x00u8), (2, 0x11), (3, 0x11)] {
        payload.push(id);
        payload.push(tables);
    }
    payload.push(0); // Ss
    payload.push(63); // Se
    payload.push(0); // Ah/Al
    write_segment(out, Marker::SOS, &payload);
}

/// Encode `raw_image` (RGBA, 4 bytes/pixel) into a baseline sequential
/// YCbCr JPEG.
///
/// # Errors
/// Returns `EncodeErrors` if the pixel buffer's length doesn't match
/// `4 * width * height`, if `options.quality()` is outside `[1, 100]`,
/// or if the image is empty.
pub fn encode(raw_image: &RawImage, options: &EncoderOptions) -> Result<EncodedImage, EncodeErrors> {
    let quality = options.quality();
    if quality == 0 || quality > 100 {
        return Err(EncodeErrors::InvalidQuality { given: quality });
    }

    let width = usize::from(raw_image.width);
    let height = usize::from(raw_image.height);
    if width == 0 || height == 0 {
        return Err(EncodeErrors::EmptyImage);
    }

    let expected = width * height * 4;
    if raw_image.data.len() != expected {
        return Err(EncodeErrors::ImageBufferWrongSize {
            expected,
            found: raw_image.data.len(),
        });
    }

    let luma_quant = scale_quant_table(&tables::BASE_LUMA_QUANT, quality);
    let chroma_quant = scale_quant_table(&tables::BASE_CHROMA_QUANT, quality);
    let luma_fdtbl = build_fdtbl(&luma_quant);
    let chroma_fdtbl = build_fdtbl(&chroma_quant);
    debug!("encoding {width}x{height} at quality {quality}");

    let luma_huff = HuffmanPair::luma()?;
    let chroma_huff = HuffmanPair::chroma()?;
    let yuv = RgbYuvTables::build();

    let mut out = Vec::new();
    write_marker(&mut out, Marker::SOI);
    write_jfif_header(&mut out);
    if let Some(exif) = raw_image.exif_buffer {
        write_exif_segment(&mut out, exif);
    }
    for comment in raw_image.comments {
        write_comment(&mut out, comment);
    }
    write_quant_segment(&mut out, 0, &luma_quant);
    write_quant_segment(&mut out, 1, &chroma_quant);
    write_sof0(&mut out, raw_image.width, raw_image.height);
    write_dht(&mut out, 0, 0, &tables::LUMA_DC_BITS, &tables::LUMA_DC_VALUES);
    write_dht(&mut out, 1, 0, &tables::LUMA_AC_BITS, &tables::LUMA_AC_VALUES);
    write_dht(&mut out, 0, 1, &tables::CHROMA_DC_BITS, &tables::CHROMA_DC_VALUES);
    write_dht(&mut out, 1, 1, &tables::CHROMA_AC_BITS, &tables::CHROMA_AC_VALUES);
    if options.restart_interval() != 0 {
        let mut payload = Vec::with_capacity(2);
        payload.extend_from_slice(&options.restart_interval().to_be_bytes());
        write_segment(&mut out, Marker::DRI, &payload);
    }
    write_sos(&mut out);

    let blocks_wide = width.div_ceil(8);
    let blocks_high = height.div_ceil(8);
    let restart_interval = options.restart_interval();

    let mut writer = BitWriter::new();
    let (mut prev_y, mut prev_cb, mut prev_cr) = (0i32, 0i32, 0i32);
    let mut mcus_since_restart: u16 = 0;
    let mut restart_index: u8 = 0;

    for by in 0..blocks_high {
        for bx in 0..blocks_wide {
            let (y_block, cb_block, cr_block) =
                sample_block(raw_image.data, width, height, bx, by, &yuv);

            let mut y_dct = y_block;
            forward_dct(&mut y_dct);
            let y_q = zigzag_order(&quantize_block(&y_dct, &luma_fdtbl));

            let mut cb_dct = cb_block;
            forward_dct(&mut cb_dct);
            let cb_q = zigzag_order(&quantize_block(&cb_dct, &chroma_fdtbl));

            let mut cr_dct = cr_block;
            forward_dct(&mut cr_dct);
            let cr_q = zigzag_order(&quantize_block(&cr_dct, &chroma_fdtbl));

            prev_y = write_block(&mut writer, &y_q, prev_y, &luma_huff);
            prev_cb = write_block(&mut writer, &cb_q, prev_cb, &chroma_huff);
            prev_cr = write_block(&mut writer, &cr_q, prev_cr, &chroma_huff);

            if restart_interval != 0 {
                mcus_since_restart += 1;
                if mcus_since_restart == restart_interval {
                    let flushed = std::mem::replace(&mut writer, BitWriter::new());
                    out.extend_from_slice(&flushed.finish());
                    write_marker(&mut out, Marker::RST(restart_index % 8));
                    restart_index = restart_index.wrapping_add(1);
                    mcus_since_restart = 0;
                    prev_y = 0;
                    prev_cb = 0;
                    prev_cr = 0;
                }
            }
        }
    }

    out.extend_from_slice(&writer.finish());
    write_marker(&mut out, Marker::EOI);

    Ok(EncodedImage { data: out, width: raw_image.width, height: raw_image.height })
}

/// Sample one 8x8 block of the padded image (edges replicate the last
/// valid pixel) and convert it to three zero-centered YCbCr blocks.
fn sample_block(
    rgba: &[u8],
    width: usize,
    height: usize,
    bx: usize,
    by: usize,
    yuv: &RgbYuvTables,
) -> ([f32; 64], [f32; 64], [f32; 64]) {
    let mut y = [0f32; 64];
    let mut cb = [0f32; 64];
    let mut cr = [0f32; 64];

    for row in 0..8 {
        let src_y = (by * 8 + row).min(height - 1);
        for col in 0..8 {
            let src_x = (bx * 8 + col).min(width - 1);
            let idx = (src_y * width + src_x) * 4;
            let (r, g, b) = (rgba[idx], rgba[idx + 1], rgba[idx + 2]);
            let (yv, cbv, crv) = yuv.convert(r, g, b);
            let out_idx = row * 8 + col;
            y[out_idx] = yv;
            cb[out_idx] = cbv;
            cr[out_idx] = crv;
        }
    }
    (y, cb, cr)
}
