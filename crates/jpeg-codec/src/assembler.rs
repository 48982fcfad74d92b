//! Turns decoded coefficient blocks into full-resolution sample planes.
//!
//! This lineage's bilinear "fancy" upsampler is gone; every component is
//! resampled to the frame's full resolution with plain nearest-neighbor,
//! per component scale factors derived from its sampling geometry.
use crate::components::{Component, Frame};
use crate::idct::dequantize_and_idct;
use crate::quant::QuantTable;

/// One component's samples at its own (possibly subsampled) resolution:
/// `blocks_per_column * 8` scan lines of `blocks_per_line * 8` samples.
pub struct Plane {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Dequantize and IDCT every block of `component`, writing the result into
/// a single contiguous plane at the component's native resolution.
#[must_use]
pub fn assemble_component(component: &Component, quant_table: &QuantTable) -> Plane {
    let width = component.blocks_per_line * 8;
    let height = component.blocks_per_column * 8;
    let mut data = vec![0u8; width * height];
    let mut block_out = [0u8; 64];

    for by in 0..component.blocks_per_column {
        for bx in 0..component.blocks_per_line {
            let Some(block) = component.block(by, bx) else {
                continue;
            };
            let block: [i32; 64] = block.try_into().expect("component blocks are always 64 i32s");
            dequantize_and_idct(&block, &quant_table.values, &mut block_out);

            for row in 0..8 {
                let dst_start = (by * 8 + row) * width + bx * 8;
                data[dst_start..dst_start + 8].copy_from_slice(&block_out[row * 8..row * 8 + 8]);
            }
        }
    }

    Plane { data, width, height }
}

/// Resample `plane` to `out_width * out_height` samples using
/// nearest-neighbor, combining the component's own subsampling factor
/// with any additional output-size scaling the caller asked for.
#[must_use]
pub fn get_data(frame: &Frame, component: &Component, plane: &Plane, out_width: usize, out_height: usize) -> Vec<u8> {
    let frame_width = frame.samples_per_line as usize;
    let frame_height = frame.scan_lines as usize;

    let comp_scale_x = f64::from(component.h) / f64::from(frame.max_h);
    let comp_scale_y = f64::from(component.v) / f64::from(frame.max_v);
    let scale_x = frame_width as f64 / out_width as f64;
    let scale_y = frame_height as f64 / out_height as f64;

    let mut out = vec![0u8; out_width * out_height];
    for y in 0..out_height {
        let src_y = ((y as f64 * comp_scale_y * scale_y) as usize).min(plane.height.saturating_sub(1));
        let row_start = src_y * plane.width;
        for x in 0..out_width {
            let src_x = ((x as f64 * comp_scale_x * scale_x) as usize).min(plane.width.saturating_sub(1));
            out[y * out_width + x] = plane.data[row_start + src_x];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBudget;

    #[test]
    fn full_resolution_component_round_trips_identically_through_get_data() {
        let mut budget = MemoryBudget::new(1 << 30);
        let frame = Frame::from_sof(false, false, 8, 16, 16, &[(1, 1, 1, 0)], &mut budget).unwrap();
        let component = frame.component(1).unwrap();
        let quant = QuantTable::from_zigzag_order(&[1u16; 64]);
        let plane = assemble_component(component, &quant);
        let resampled = get_data(&frame, component, &plane, 16, 16);
        assert_eq!(resampled, plane.data);
    }

    #[test]
    fn subsampled_chroma_upsamples_to_full_frame_size() {
        let mut budget = MemoryBudget::new(1 << 30);
        let components = [(1u8, 2u8, 2u8, 0u8), (2, 1, 1, 1)];
        let frame = Frame::from_sof(false, false, 8, 16, 16, &components, &mut budget).unwrap();
        let chroma = frame.component(2).unwrap();
        let quant = QuantTable::from_zigzag_order(&[1u16; 64]);
        let plane = assemble_component(chroma, &quant);
        assert_eq!((plane.width, plane.height), (8, 8));
        let upsampled = get_data(&frame, chroma, &plane, 16, 16);
        assert_eq!(upsampled.len(), 16 * 16);
    }
}
