//! The marker-driven stream parser: walks a JPEG byte stream, dispatches
//! on segment markers, and populates frame/table/scan state.
use jpeg_core::bytestream::ZByteReader;
use jpeg_core::options::DecoderOptions;
use log::{debug, trace, warn};

use crate::components::Frame;
use crate::errors::{DecodeErrors, UnsupportedSchemes};
use crate::huffman::HuffmanTable;
use crate::marker::Marker;
use crate::memory::MemoryBudget;
use crate::quant::QuantTable;
use crate::scan::{ScanComponent, ScanDecoder};

/// Parsed `APP0` "JFIF\0" payload.
#[derive(Clone, Debug)]
pub struct Jfif {
    pub version: (u8, u8),
    pub density_units: u8,
    pub x_density: u16,
    pub y_density: u16,
    pub thumb_width: u8,
    pub thumb_height: u8,
    pub thumb_data: Vec<u8>,
}

/// Parsed `APP14` "Adobe\0" payload.
#[derive(Copy, Clone, Debug)]
pub struct Adobe {
    pub version: u16,
    pub flags0: u16,
    pub flags1: u16,
    pub transform_code: u8,
}

/// Everything the marker parser accumulates by the time it reaches EOI:
/// the frame, the four quantization/Huffman table slots, restart
/// interval, and whatever application metadata was present.
pub struct ParsedImage {
    pub frame: Frame,
    pub quant_tables: [QuantTable; 4],
    pub huffman_dc: [Option<HuffmanTable>; 4],
    pub huffman_ac: [Option<HuffmanTable>; 4],
    pub restart_interval: u32,
    pub jfif: Option<Jfif>,
    pub adobe: Option<Adobe>,
    pub exif_bytes: Option<Vec<u8>>,
    pub comments: Vec<String>,
}

/// Walk `data` from SOI to EOI, dispatching on every marker in between
/// and invoking [`ScanDecoder`] for each SOS. Returns the fully parsed
/// image state once EOI is reached.
pub fn parse(
    data: &[u8],
    options: &DecoderOptions,
    budget: &mut MemoryBudget,
) -> Result<ParsedImage, DecodeErrors> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        let bytes = if data.len() >= 2 {
            u16::from_be_bytes([data[0], data[1]])
        } else {
            0
        };
        return Err(DecodeErrors::IllegalMagicBytes(bytes));
    }

    let mut reader = ZByteReader::new(data);
    reader.skip(2);

    let mut frame: Option<Frame> = None;
    let mut quant_tables = [QuantTable::zero(); 4];
    let mut quant_defined = [false; 4];
    let mut huffman_dc: [Option<HuffmanTable>; 4] = [None, None, None, None];
    let mut huffman_ac: [Option<HuffmanTable>; 4] = [None, None, None, None];
    let mut restart_interval: u32 = 0;
    let mut jfif = None;
    let mut adobe = None;
    let mut exif_bytes = None;
    let mut comments = Vec::new();
    let mut malformed_recovery_used: Option<usize> = None;
    let mut scan_count: usize = 0;

    loop {
        let marker_start = reader.position();
        let mut byte = reader.read_u8()?;

        if byte != 0xFF {
            // Not aligned on a marker. Check whether the two bytes just
            // before this position form a valid marker prefix that a
            // broken encoder escaped with a spurious extra byte; if so,
            // rewind and let the dispatch loop reread it.
            if marker_start >= 2 && data[marker_start - 2] == 0xFF {
                let prefix_code = data[marker_start - 1];
                if (0xC0..=0xFE).contains(&prefix_code) {
                    if options.strict_mode() {
                        return Err(DecodeErrors::StrictModeViolation(
                            "truncated-marker rewind recovery used",
                        ));
                    }
                    reader.seek(marker_start - 2);
                    continue;
                }
            }
            return Err(DecodeErrors::UnknownMarker {
                offset: marker_start,
                marker: u16::from(byte),
            });
        }

        // Fill bytes: a run of extra 0xFF before the real marker code.
        let mut code = reader.read_u8()?;
        while code == 0xFF {
            code = reader.read_u8()?;
        }
        byte = code;
        let marker_val = u16::from_be_bytes([0xFF, byte]);

        let Some(marker) = Marker::from_u8(byte) else {
            return Err(DecodeErrors::UnknownMarker {
                offset: marker_start,
                marker: marker_val,
            });
        };
        trace!("dispatching marker 0x{marker_val:04X} at offset {marker_start}");

        match marker {
            Marker::SOI => {
                // A stray second SOI; ignore and continue, matching the
                // tolerant posture of the rest of this parser.
            }
            Marker::EOI => break,
            Marker::APP(n) => {
                parse_app_segment(
                    n,
                    marker_start,
                    marker_val,
                    &mut reader,
                    &mut jfif,
                    &mut adobe,
                    &mut exif_bytes,
                    &mut malformed_recovery_used,
                    options.strict_mode(),
                )?;
            }
            Marker::COM => {
                let len = reader.read_u16_be()? as usize;
                let payload = reader.read_exact_bytes(len.saturating_sub(2))?;
                comments.push(payload.iter().map(|&b| b as char).collect());
            }
            Marker::DQT => parse_dqt(&mut reader, &mut quant_tables, &mut quant_defined, budget)?,
            Marker::DHT => parse_dht(&mut reader, &mut huffman_dc, &mut huffman_ac, budget)?,
            Marker::DAC => {
                // Arithmetic-coding conditioning: not supported, but the
                // segment is well-formed framing we can skip.
                let len = reader.read_u16_be()? as usize;
                reader.skip(len.saturating_sub(2));
            }
            Marker::SOF(n) => {
                if frame.is_some() {
                    return Err(DecodeErrors::MultipleFramesUnsupported);
                }
                frame = Some(parse_start_of_frame(n, &mut reader, options, budget)?);
                debug!(
                    "parsed SOF{n}: {}x{} progressive={}",
                    frame.as_ref().unwrap().samples_per_line,
                    frame.as_ref().unwrap().scan_lines,
                    frame.as_ref().unwrap().progressive
                );
            }
            Marker::DRI => {
                let _len = reader.read_u16_be()?;
                restart_interval = u32::from(reader.read_u16_be()?);
            }
            Marker::DNL => {
                let len = reader.read_u16_be()? as usize;
                reader.skip(len.saturating_sub(2));
            }
            Marker::RST(_) => {
                // A restart marker outside any scan; nothing to do.
            }
            Marker::SOS => {
                scan_count += 1;
                if scan_count > options.max_scans() {
                    return Err(DecodeErrors::TooManyScans { max_scans: options.max_scans() });
                }
                let frame_ref = frame.as_mut().ok_or_else(|| {
                    DecodeErrors::FormatStatic("SOS encountered before any SOF")
                })?;
                let scan = parse_sos(&mut reader, frame_ref, &quant_defined)?;
                let start_offset = reader.position();
                let decoder = ScanDecoder::new(
                    data,
                    scan.components,
                    restart_interval,
                    scan.ss,
                    scan.se,
                    scan.ah,
                    scan.al,
                    options.tolerant_decoding(),
                );
                let next_offset =
                    decoder.decode(frame_ref, &huffman_dc, &huffman_ac, start_offset)?;
                reader.seek(next_offset);
            }
        }
    }

    let frame = frame.ok_or(DecodeErrors::FormatStatic("no SOF segment before EOI"))?;

    Ok(ParsedImage {
        frame,
        quant_tables,
        huffman_dc,
        huffman_ac,
        restart_interval,
        jfif,
        adobe,
        exif_bytes,
        comments,
    })
}

#[allow(clippy::too_many_arguments)]
fn parse_app_segment(
    n: u8,
    marker_start: usize,
    marker_val: u16,
    reader: &mut ZByteReader,
    jfif: &mut Option<Jfif>,
    adobe: &mut Option<Adobe>,
    exif_bytes: &mut Option<Vec<u8>>,
    malformed_recovery_used: &mut Option<usize>,
    strict_mode: bool,
) -> Result<(), DecodeErrors> {
    let len = reader.read_u16_be()? as usize;
    let payload_len = len.saturating_sub(2);
    let payload_start = reader.position();
    let payload = reader.read_exact_bytes(payload_len)?;

    // Misalignment check: if the byte right after this segment isn't a
    // marker prefix, the declared length likely lied (a known encoder
    // bug on APP0/APP1). Recoverable once per file.
    let expected_next = payload_start + payload_len;
    if expected_next < reader.len() && reader.data()[expected_next] != 0xFF {
        if strict_mode {
            return Err(DecodeErrors::StrictModeViolation(
                "misaligned APPn segment recovery used",
            ));
        }
        if let Some(first) = *malformed_recovery_used {
            return Err(DecodeErrors::DualMalformedMarker {
                first_offset: first,
                second_offset: marker_start,
                marker: marker_val,
            });
        }
        warn!("misaligned APP{n} at offset {marker_start}; recovering once");
        *malformed_recovery_used = Some(marker_start);
    }

    match n {
        0 if payload.starts_with(b"JFIF\0") => {
            if payload.len() >= 14 {
                *jfif = Some(Jfif {
                    version: (payload[5], payload[6]),
                    density_units: payload[7],
                    x_density: u16::from_be_bytes([payload[8], payload[9]]),
                    y_density: u16::from_be_bytes([payload[10], payload[11]]),
                    thumb_width: payload[12],
                    thumb_height: payload[13],
                    thumb_data: payload[14..].to_vec(),
                });
            }
        }
        1 if payload.starts_with(b"Exif\0") => {
            *exif_bytes = Some(payload[6.min(payload.len())..].to_vec());
        }
        14 if payload.starts_with(b"Adobe\0") => {
            if payload.len() >= 12 {
                *adobe = Some(Adobe {
                    version: u16::from_be_bytes([payload[5], payload[6]]),
                    flags0: u16::from_be_bytes([payload[7], payload[8]]),
                    flags1: u16::from_be_bytes([payload[9], payload[10]]),
                    transform_code: payload[11],
                });
            }
        }
        _ => {
            // Unrecognized APPn payload; skipped.
        }
    }
    Ok(())
}

fn parse_dqt(
    reader: &mut ZByteReader,
    quant_tables: &mut [QuantTable; 4],
    quant_defined: &mut [bool; 4],
    budget: &mut MemoryBudget,
) -> Result<(), DecodeErrors> {
    let len = reader.read_u16_be()? as usize;
    let end = reader.position() + len - 2;

    while reader.position() < end {
        let spec = reader.read_u8()?;
        let precision = spec >> 4;
        let dest_id = usize::from(spec & 0x0F);
        if precision > 1 || dest_id >= 4 {
            return Err(DecodeErrors::InvalidQuantSpec { precision });
        }

        let mut entries = [0u16; 64];
        if precision == 0 {
            for entry in &mut entries {
                *entry = u16::from(reader.read_u8()?);
            }
        } else {
            reader.read_u16_be_into(&mut entries)?;
        }

        QuantTable::request_memory(budget)?;
        quant_tables[dest_id] = QuantTable::from_zigzag_order(&entries);
        quant_defined[dest_id] = true;
    }
    Ok(())
}

fn parse_dht(
    reader: &mut ZByteReader,
    huffman_dc: &mut [Option<HuffmanTable>; 4],
    huffman_ac: &mut [Option<HuffmanTable>; 4],
    budget: &mut MemoryBudget,
) -> Result<(), DecodeErrors> {
    let len = reader.read_u16_be()? as usize;
    let end = reader.position() + len - 2;

    while reader.position() < end {
        let spec = reader.read_u8()?;
        let class = spec >> 4;
        let dest_id = usize::from(spec & 0x0F);
        if dest_id >= 4 {
            return Err(DecodeErrors::HuffmanDecode(format!(
                "DHT destination id {dest_id} out of range"
            )));
        }

        let mut bits = [0u8; 16];
        for count in &mut bits {
            *count = reader.read_u8()?;
        }
        let num_values: usize = bits.iter().map(|&c| c as usize).sum();
        let huffval = reader.read_exact_bytes(num_values)?.to_vec();

        HuffmanTable::request_memory(budget, num_values)?;
        let table = HuffmanTable::from_bits_and_values(&bits, &huffval)?;
        if class == 0 {
            huffman_dc[dest_id] = Some(table);
        } else {
            huffman_ac[dest_id] = Some(table);
        }
    }
    Ok(())
}

fn parse_start_of_frame(
    sof_n: u8,
    reader: &mut ZByteReader,
    options: &DecoderOptions,
    budget: &mut MemoryBudget,
) -> Result<Frame, DecodeErrors> {
    let (progressive, extended) = match sof_n {
        0 => (false, false),
        1 => (false, true),
        2 => (true, false),
        other => {
            return Err(DecodeErrors::Unsupported(
                UnsupportedSchemes::from_int(0xC0 + other).unwrap(),
            ));
        }
    };

    let _len = reader.read_u16_be()?;
    let precision = reader.read_u8()?;
    let scan_lines = reader.read_u16_be()?;
    let samples_per_line = reader.read_u16_be()?;
    if scan_lines == 0 || samples_per_line == 0 {
        return Err(DecodeErrors::ZeroError);
    }
    if samples_per_line as usize > options.max_width() {
        return Err(DecodeErrors::DimensionExceeded {
            field: "width",
            limit: options.max_width(),
            actual: samples_per_line as usize,
        });
    }
    if scan_lines as usize > options.max_height() {
        return Err(DecodeErrors::DimensionExceeded {
            field: "height",
            limit: options.max_height(),
            actual: scan_lines as usize,
        });
    }

    let pixels = f64::from(scan_lines) * f64::from(samples_per_line);
    let ceiling = options.max_resolution_mp() as f64 * 1.0e6;
    if pixels > ceiling {
        return Err(DecodeErrors::ResolutionExceeded {
            excess_mp: (pixels - ceiling) / 1.0e6,
        });
    }

    let component_count = reader.read_u8()? as usize;
    let mut components_in = Vec::with_capacity(component_count);
    for _ in 0..component_count {
        let id = reader.read_u8()?;
        let hv = reader.read_u8()?;
        let quantization_idx = reader.read_u8()?;
        components_in.push((id, hv >> 4, hv & 0x0F, quantization_idx));
    }

    Frame::from_sof(
        progressive,
        extended,
        precision,
        scan_lines,
        samples_per_line,
        &components_in,
        budget,
    )
}

/// The four fields a SOS segment carries beyond its component selector
/// list: spectral selection and successive-approximation bounds.
struct ParsedScan {
    components: Vec<ScanComponent>,
    ss: u8,
    se: u8,
    ah: u8,
    al: u8,
}

fn parse_sos(
    reader: &mut ZByteReader,
    frame: &Frame,
    quant_defined: &[bool; 4],
) -> Result<ParsedScan, DecodeErrors> {
    let _len = reader.read_u16_be()?;
    let component_count = reader.read_u8()? as usize;

    let mut components = Vec::with_capacity(component_count);
    for _ in 0..component_count {
        let id = reader.read_u8()?;
        let tables = reader.read_u8()?;
        let component = frame.component(id)?;
        let defined = quant_defined
            .get(component.quantization_idx as usize)
            .copied()
            .unwrap_or(false);
        if !defined {
            return Err(DecodeErrors::FormatStatic(
                "component references a quantization table never defined by DQT",
            ));
        }
        let (dc_table, ac_table) = (tables >> 4, tables & 0x0F);
        if dc_table >= 4 || ac_table >= 4 {
            return Err(DecodeErrors::SosError(format!(
                "component {id} selects out-of-range Huffman table ({dc_table}, {ac_table})"
            )));
        }
        components.push(ScanComponent { id, dc_table, ac_table });
    }

    let ss = reader.read_u8()?;
    let se = reader.read_u8()?;
    let ah_al = reader.read_u8()?;

    Ok(ParsedScan {
        components,
        ss,
        se,
        ah: ah_al >> 4,
        al: ah_al & 0x0F,
    })
}
