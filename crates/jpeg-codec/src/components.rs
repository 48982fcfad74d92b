//! The `Frame`/`Component` data model populated while parsing SOF and
//! consumed by the scan decoder and component assembler.
use std::collections::BTreeMap;

use crate::errors::DecodeErrors;
use crate::memory::MemoryBudget;
use crate::quant::QuantTable;

fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// One color component declared in SOF, with its sampling geometry and the
/// coefficient storage filled in by the scan decoder.
pub struct Component {
    pub id: u8,
    pub h: u8,
    pub v: u8,
    /// DQT destination slot, resolved once all tables are known.
    pub quantization_idx: u8,
    pub blocks_per_line: usize,
    pub blocks_per_column: usize,
    /// Huffman table destinations selected by the scan(s) that touch this
    /// component; `None` until a SOS binds them.
    pub huffman_table_dc: Option<u8>,
    pub huffman_table_ac: Option<u8>,
    /// DC predictor, reset to 0 at scan start and at every restart.
    pub pred: i32,
    /// Flat coefficient storage: `blocks_per_mcu_column * blocks_per_mcu_line`
    /// blocks of 64 `i32`s each, in raster order.
    pub blocks: Vec<i32>,
    /// Stride (in blocks) of one row of `blocks`, i.e. the MCU-grid width in
    /// blocks for this component — distinct from `blocks_per_line` when the
    /// image width is not a multiple of the MCU width.
    pub blocks_per_mcu_line: usize,
    pub blocks_per_mcu_column: usize,
}

impl Component {
    /// Coefficient block at `(row, col)` in the padded MCU grid, or `None`
    /// if out of range.
    #[must_use]
    pub fn block(&self, row: usize, col: usize) -> Option<&[i32]> {
        if row >= self.blocks_per_mcu_column || col >= self.blocks_per_mcu_line {
            return None;
        }
        let start = (row * self.blocks_per_mcu_line + col) * 64;
        self.blocks.get(start..start + 64)
    }

    #[must_use]
    pub fn block_mut(&mut self, row: usize, col: usize) -> Option<&mut [i32]> {
        if row >= self.blocks_per_mcu_column || col >= self.blocks_per_mcu_line {
            return None;
        }
        let start = (row * self.blocks_per_mcu_line + col) * 64;
        self.blocks.get_mut(start..start + 64)
    }
}

/// Parsed SOF state, immutable after `Frame::from_sof` returns except for
/// the per-component predictors and bound Huffman tables, which the scan
/// decoder updates per scan.
pub struct Frame {
    pub precision: u8,
    pub scan_lines: u16,
    pub samples_per_line: u16,
    pub progressive: bool,
    pub extended: bool,
    pub components: BTreeMap<u8, Component>,
    pub components_order: Vec<u8>,
    pub max_h: u8,
    pub max_v: u8,
    pub mcus_per_line: usize,
    pub mcus_per_column: usize,
}

impl Frame {
    /// Build a `Frame` from the fields of an already-parsed SOF segment.
    ///
    /// `components_in` is `(id, h, v, quantization_idx)` in wire order.
    /// Allocates every component's block storage up front, per the
    /// "allocated once per component at SOF time" invariant.
    pub fn from_sof(
        frame_kind_progressive: bool,
        frame_kind_extended: bool,
        precision: u8,
        scan_lines: u16,
        samples_per_line: u16,
        components_in: &[(u8, u8, u8, u8)],
        budget: &mut MemoryBudget,
    ) -> Result<Self, DecodeErrors> {
        if components_in
            .iter()
            .any(|&(_, h, v, _)| h == 0 || v == 0)
        {
            return Err(DecodeErrors::InvalidSamplingFactor);
        }

        let max_h = components_in.iter().map(|&(_, h, _, _)| h).max().unwrap_or(1);
        let max_v = components_in.iter().map(|&(_, _, v, _)| v).max().unwrap_or(1);

        let width = samples_per_line as usize;
        let height = scan_lines as usize;
        let mcus_per_line = ceil_div(ceil_div(width, 8), max_h as usize);
        let mcus_per_column = ceil_div(ceil_div(height, 8), max_v as usize);

        let mut components = BTreeMap::new();
        let mut components_order = Vec::with_capacity(components_in.len());

        for &(id, h, v, quantization_idx) in components_in {
            let blocks_per_line = ceil_div(ceil_div(width, 8) * h as usize, max_h as usize);
            let blocks_per_column = ceil_div(ceil_div(height, 8) * v as usize, max_v as usize);
            let blocks_per_mcu_line = mcus_per_line * h as usize;
            let blocks_per_mcu_column = mcus_per_column * v as usize;
            let block_count = blocks_per_mcu_line * blocks_per_mcu_column;

            QuantTable::request_memory(budget)?;
            budget.request((block_count * 64 * core::mem::size_of::<i32>()) as u64)?;

            components.insert(
                id,
                Component {
                    id,
                    h,
                    v,
                    quantization_idx,
                    blocks_per_line,
                    blocks_per_column,
                    huffman_table_dc: None,
                    huffman_table_ac: None,
                    pred: 0,
                    blocks: vec![0i32; block_count * 64],
                    blocks_per_mcu_line,
                    blocks_per_mcu_column,
                },
            );
            components_order.push(id);
        }

        Ok(Frame {
            precision,
            scan_lines,
            samples_per_line,
            progressive: frame_kind_progressive,
            extended: frame_kind_extended,
            components,
            components_order,
            max_h,
            max_v,
            mcus_per_line,
            mcus_per_column,
        })
    }

    /// Reset every component's DC predictor to 0, as happens at scan start
    /// and at every restart interval boundary.
    pub fn reset_predictors(&mut self) {
        for component in self.components.values_mut() {
            component.pred = 0;
        }
    }

    pub fn component(&self, id: u8) -> Result<&Component, DecodeErrors> {
        self.components
            .get(&id)
            .ok_or(DecodeErrors::UnknownComponentId { id })
    }

    pub fn component_mut(&mut self, id: u8) -> Result<&mut Component, DecodeErrors> {
        self.components
            .get_mut(&id)
            .ok_or(DecodeErrors::UnknownComponentId { id })
    }
}
