//! The top-level decode entry point: wires the marker parser, per-block
//! IDCT, component assembler, and color converter together.
use jpeg_core::colorspace::ColorSpace;
use jpeg_core::options::DecoderOptions;

use crate::assembler::{assemble_component, get_data};
use crate::color_convert;
use crate::errors::DecodeErrors;
use crate::headers;
use crate::memory::MemoryBudget;

/// A fully decoded image: interleaved pixel bytes plus whatever metadata
/// the source JPEG carried.
pub struct DecodedImage {
    pub width: u16,
    pub height: u16,
    pub pixel_data: Vec<u8>,
    pub color_space: ColorSpace,
    pub exif_bytes: Option<Vec<u8>>,
    pub comments: Vec<String>,
}

/// Decode a complete JPEG byte stream into pixels.
///
/// # Errors
/// Returns `DecodeErrors` for any malformed marker sequence, unsupported
/// SOF variant, resolution/memory ceiling breach, or entropy-decode
/// failure. See [`crate::errors::DecodeErrors`] for the full list.
pub fn decode(data: &[u8], options: &DecoderOptions) -> Result<DecodedImage, DecodeErrors> {
    let mut budget = MemoryBudget::new((options.max_memory_usage_mb() as u64) * 1024 * 1024);
    let parsed = headers::parse(data, options, &mut budget)?;

    let width = parsed.frame.samples_per_line as usize;
    let height = parsed.frame.scan_lines as usize;
    let pixel_count = width * height;

    let mut planes = Vec::with_capacity(parsed.frame.components_order.len());
    for &id in &parsed.frame.components_order {
        let component = parsed.frame.component(id)?;
        let quant_table = parsed
            .quant_tables
            .get(component.quantization_idx as usize)
            .copied()
            .ok_or(DecodeErrors::FormatStatic("component quantization index out of range"))?;

        let plane = assemble_component(component, &quant_table);
        let resampled = get_data(&parsed.frame, component, &plane, width, height);
        planes.push(resampled);
    }

    let adobe_transform_code = parsed.adobe.map(|a| a.transform_code);
    let (pixel_data, color_space) = color_convert::interleave(
        &planes,
        pixel_count,
        options.color_transform(),
        adobe_transform_code,
        parsed.adobe.is_some(),
        options.format_as_rgba(),
        options.out_colorspace(),
    )?;

    Ok(DecodedImage {
        width: parsed.frame.samples_per_line,
        height: parsed.frame.scan_lines,
        pixel_data,
        color_space,
        exif_bytes: parsed.exif_bytes,
        comments: parsed.comments,
    })
}
