//! Entropy-coded scan decoding: baseline and progressive MCU Huffman
//! decoding, restart interval handling, and the progressive AC
//! successive-approximation state machine.
use log::{trace, warn};

use crate::bitstream::BitReader;
use crate::components::Frame;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::quant::ZIGZAG;

/// One `(component, dc_table, ac_table)` binding from a SOS segment's
/// component selector list.
#[derive(Copy, Clone, Debug)]
pub struct ScanComponent {
    pub id: u8,
    pub dc_table: u8,
    pub ac_table: u8,
}

/// The four progressive-AC successive-approximation states from §4.5 /
/// §9 ("Progressive AC state machine"), spelled out as an explicit enum
/// rather than numbered state ids.
enum AcState {
    Initial,
    /// Skipping `remaining` zero-valued coefficients (refining any
    /// nonzero ones passed along the way). `then_place` carries the
    /// value to place once skipping finishes, for the `s == 1` case;
    /// `None` for a ZRL (`r == 15`) run, which returns to `Initial`.
    Skipping {
        remaining: i32,
        then_place: Option<i32>,
    },
    /// Write `value << Al` into the next zero coefficient encountered,
    /// refining nonzero ones passed along the way.
    Placing { value: i32 },
    /// Refine nonzero coefficients until `eobrun` is exhausted.
    Eob,
}

/// Per-scan decode state threaded across every MCU: each component's DC
/// predictor (owned by `Frame`) plus the scan-wide `eobrun` used by the
/// two progressive AC modes.
pub struct ScanDecoder<'a> {
    data: &'a [u8],
    components: Vec<ScanComponent>,
    restart_interval: u32,
    ss: u8,
    se: u8,
    ah: u8,
    al: u8,
    tolerant: bool,
}

/// Which per-block routine a scan uses, resolved once from `(progressive,
/// Ss, Ah)` per the §4.5 mode-selection table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ScanMode {
    Baseline,
    DcFirst,
    DcSuccessive,
    AcFirst,
    AcSuccessive,
}

impl<'a> ScanDecoder<'a> {
    #[must_use]
    pub fn new(
        data: &'a [u8],
        components: Vec<ScanComponent>,
        restart_interval: u32,
        ss: u8,
        se: u8,
        ah: u8,
        al: u8,
        tolerant: bool,
    ) -> Self {
        ScanDecoder {
            data,
            components,
            restart_interval,
            ss,
            se,
            ah,
            al,
            tolerant,
        }
    }

    fn mode(&self, progressive: bool) -> ScanMode {
        if !progressive {
            return ScanMode::Baseline;
        }
        if self.ss == 0 {
            if self.ah == 0 {
                ScanMode::DcFirst
            } else {
                ScanMode::DcSuccessive
            }
        } else if self.ah == 0 {
            ScanMode::AcFirst
        } else {
            ScanMode::AcSuccessive
        }
    }

    /// Decode one scan's entropy-coded data, filling in coefficient
    /// blocks on `frame`. Returns the absolute byte offset of the next
    /// marker (not consumed): the caller's `MarkerParser` resumes
    /// dispatch from there.
    pub fn decode(
        &self,
        frame: &mut Frame,
        dc_tables: &[Option<HuffmanTable>; 4],
        ac_tables: &[Option<HuffmanTable>; 4],
        start_offset: usize,
    ) -> Result<usize, DecodeErrors> {
        let mode = self.mode(frame.progressive);

        // Validate every referenced component exists and has bound
        // Huffman tables before starting the bit-level walk.
        for sc in &self.components {
            frame.component(sc.id)?;
        }

        frame.reset_predictors();
        let mut eobrun: i32 = 0;

        let single_component = self.components.len() == 1;
        let mcu_count = if single_component {
            let comp = frame.component(self.components[0].id)?;
            comp.blocks_per_line * comp.blocks_per_column
        } else {
            frame.mcus_per_line * frame.mcus_per_column
        };

        let mut reader = BitReader::new(self.data, start_offset);
        let interval = if self.restart_interval == 0 {
            mcu_count as u32
        } else {
            self.restart_interval
        };

        let mut mcus_since_restart: u32 = 0;

        for mcu_index in 0..mcu_count {
            if single_component {
                let sc = self.components[0];
                let comp = frame.component(sc.id)?;
                let row = mcu_index / comp.blocks_per_line;
                let col = mcu_index % comp.blocks_per_line;
                self.decode_one_block(
                    &mut reader, frame, &sc, dc_tables, ac_tables, mode, row, col, &mut eobrun,
                )?;
            } else {
                let mcu_row = mcu_index / frame.mcus_per_line;
                let mcu_col = mcu_index % frame.mcus_per_line;
                for sc in self.components.clone() {
                    let (h, v) = {
                        let comp = frame.component(sc.id)?;
                        (comp.h as usize, comp.v as usize)
                    };
                    for dy in 0..v {
                        for dx in 0..h {
                            let row = mcu_row * v + dy;
                            let col = mcu_col * h + dx;
                            self.decode_one_block(
                                &mut reader, frame, &sc, dc_tables, ac_tables, mode, row, col,
                                &mut eobrun,
                            )?;
                        }
                    }
                }
            }

            mcus_since_restart += 1;

            let is_last_mcu = mcu_index + 1 == mcu_count;
            if !is_last_mcu && mcus_since_restart == interval {
                reader.align_to_byte();
                frame.reset_predictors();
                eobrun = 0;
                mcus_since_restart = 0;

                let rst = expect_restart_marker(self.data, &mut reader)?;
                trace!("consumed restart marker RST{rst}");
            }
        }

        Ok(skip_to_next_marker(self.data, reader.offset()))
    }

    #[allow(clippy::too_many_arguments)]
    fn decode_one_block(
        &self,
        reader: &mut BitReader,
        frame: &mut Frame,
        sc: &ScanComponent,
        dc_tables: &[Option<HuffmanTable>; 4],
        ac_tables: &[Option<HuffmanTable>; 4],
        mode: ScanMode,
        row: usize,
        col: usize,
        eobrun: &mut i32,
    ) -> Result<(), DecodeErrors> {
        let comp = frame.component_mut(sc.id)?;
        if comp.block(row, col).is_none() {
            return if self.tolerant {
                warn!("tolerant_decoding: dropping block ({row}, {col}) past allocated grid");
                Ok(())
            } else {
                Err(DecodeErrors::BlockIndexOutOfRange)
            };
        }

        match mode {
            ScanMode::Baseline => {
                let dc_table = dc_tables[sc.dc_table as usize]
                    .as_ref()
                    .ok_or(DecodeErrors::InvalidHuffmanTable)?;
                let ac_table = ac_tables[sc.ac_table as usize]
                    .as_ref()
                    .ok_or(DecodeErrors::InvalidHuffmanTable)?;
                let mut pred = comp.pred;
                let block = comp.block_mut(row, col).unwrap();
                decode_baseline(reader, dc_table, ac_table, block, &mut pred)?;
                comp.pred = pred;
            }
            ScanMode::DcFirst => {
                let dc_table = dc_tables[sc.dc_table as usize]
                    .as_ref()
                    .ok_or(DecodeErrors::InvalidHuffmanTable)?;
                let mut pred = comp.pred;
                let block = comp.block_mut(row, col).unwrap();
                decode_dc_first(reader, dc_table, block, &mut pred, self.al)?;
                comp.pred = pred;
            }
            ScanMode::DcSuccessive => {
                let block = comp.block_mut(row, col).unwrap();
                decode_dc_successive(reader, block, self.al)?;
            }
            ScanMode::AcFirst => {
                let ac_table = ac_tables[sc.ac_table as usize]
                    .as_ref()
                    .ok_or(DecodeErrors::InvalidHuffmanTable)?;
                let block = comp.block_mut(row, col).unwrap();
                decode_ac_first(reader, ac_table, block, self.ss, self.se, self.al, eobrun)?;
            }
            ScanMode::AcSuccessive => {
                let ac_table = ac_tables[sc.ac_table as usize]
                    .as_ref()
                    .ok_or(DecodeErrors::InvalidHuffmanTable)?;
                let block = comp.block_mut(row, col).unwrap();
                decode_ac_successive(reader, ac_table, block, self.ss, self.se, self.al, eobrun)?;
            }
        }
        Ok(())
    }
}

/// Pull raw bytes (bypassing the bit buffer, which is already
/// byte-aligned after a restart) looking for `RST0..RST7`. Fails with
/// `MarkerNotFound` if the next two bytes aren't a marker at all.
fn expect_restart_marker(data: &[u8], reader: &mut BitReader) -> Result<u8, DecodeErrors> {
    let offset = reader.offset();
    let marker_byte = *data.get(offset).ok_or(DecodeErrors::MarkerNotFound)?;
    let code_byte = *data.get(offset + 1).ok_or(DecodeErrors::MarkerNotFound)?;
    if marker_byte != 0xFF || !(0xD0..=0xD7).contains(&code_byte) {
        return Err(DecodeErrors::MarkerNotFound);
    }
    reader.force_offset(offset + 2);
    Ok(code_byte - 0xD0)
}

/// After a scan's last MCU, walk forward over any trailing stuffed/fill
/// bytes up to (but not including) the next real marker.
fn skip_to_next_marker(data: &[u8], mut pos: usize) -> usize {
    while pos + 1 < data.len() {
        if data[pos] == 0xFF {
            let next = data[pos + 1];
            if next == 0x00 {
                pos += 2;
                continue;
            }
            if next == 0xFF {
                // fill byte: keep scanning past it.
                pos += 1;
                continue;
            }
            // A genuine marker prefix; stop here without consuming it.
            break;
        }
        pos += 1;
    }
    pos
}

/// `decode_baseline`: DC via Huffman category + `receive_and_extend`,
/// then AC run-length coded to end-of-block or index 63.
fn decode_baseline(
    reader: &mut BitReader,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    block: &mut [i32],
    pred: &mut i32,
) -> Result<(), DecodeErrors> {
    let t = dc_table.decode(reader)?;
    let diff = if t == 0 { 0 } else { reader.receive_and_extend(t)? };
    *pred += diff;
    block[0] = *pred;

    let mut k: usize = 1;
    while k <= 63 {
        let rs = ac_table.decode(reader)?;
        let s = rs & 0x0F;
        let r = rs >> 4;
        if s == 0 {
            if r < 15 {
                break;
            }
            k += 16;
        } else {
            k += r as usize;
            if k > 63 {
                return Err(DecodeErrors::InvalidHuffmanSequence);
            }
            block[ZIGZAG[k]] = reader.receive_and_extend(s)?;
            k += 1;
        }
    }
    Ok(())
}

fn decode_dc_first(
    reader: &mut BitReader,
    dc_table: &HuffmanTable,
    block: &mut [i32],
    pred: &mut i32,
    al: u8,
) -> Result<(), DecodeErrors> {
    let t = dc_table.decode(reader)?;
    let diff = reader.receive_and_extend(t)?;
    *pred += diff << al;
    block[0] = *pred;
    Ok(())
}

fn decode_dc_successive(
    reader: &mut BitReader,
    block: &mut [i32],
    al: u8,
) -> Result<(), DecodeErrors> {
    let bit = reader.read_bit()?;
    block[0] |= i32::from(bit) << al;
    Ok(())
}

fn decode_ac_first(
    reader: &mut BitReader,
    ac_table: &HuffmanTable,
    block: &mut [i32],
    ss: u8,
    se: u8,
    al: u8,
    eobrun: &mut i32,
) -> Result<(), DecodeErrors> {
    if *eobrun > 0 {
        *eobrun -= 1;
        return Ok(());
    }

    let mut k = ss as usize;
    let se = se as usize;
    while k <= se {
        let rs = ac_table.decode(reader)?;
        let s = rs & 0x0F;
        let r = rs >> 4;
        if s == 0 {
            if r < 15 {
                *eobrun = (1i32 << r) + reader.receive(r)? - 1;
                break;
            }
            k += 16;
        } else {
            k += r as usize;
            if k > se {
                return Err(DecodeErrors::InvalidHuffmanSequence);
            }
            block[ZIGZAG[k]] = reader.receive_and_extend(s)? << al;
            k += 1;
        }
    }
    Ok(())
}

/// `coeff += (read_bit() << Al) * sign(coeff)`, replicating the source's
/// sign-handling exactly (§9, "Open question" on AC successive
/// refinement) rather than simplifying it.
fn refine_nonzero(reader: &mut BitReader, coeff: &mut i32, al: u8) -> Result<(), DecodeErrors> {
    let bit = reader.read_bit()?;
    if bit != 0 {
        let direction = if *coeff < 0 { -1 } else { 1 };
        *coeff += direction * (1i32 << al);
    }
    Ok(())
}

fn decode_ac_successive(
    reader: &mut BitReader,
    ac_table: &HuffmanTable,
    block: &mut [i32],
    ss: u8,
    se: u8,
    al: u8,
    eobrun: &mut i32,
) -> Result<(), DecodeErrors> {
    let se = se as i32;
    let mut k = ss as i32;
    let mut state = if *eobrun > 0 {
        AcState::Eob
    } else {
        AcState::Initial
    };

    while k <= se {
        state = match state {
            AcState::Initial => {
                let rs = ac_table.decode(reader)?;
                let s = rs & 0x0F;
                let r = i32::from(rs >> 4);
                if s == 0 {
                    if r < 15 {
                        *eobrun = (1i32 << r) + reader.receive(r as u8)?;
                        AcState::Eob
                    } else {
                        AcState::Skipping {
                            remaining: 16,
                            then_place: None,
                        }
                    }
                } else {
                    if s != 1 {
                        return Err(DecodeErrors::InvalidAcEncoding);
                    }
                    let next_value = reader.receive_and_extend(1)?;
                    if r > 0 {
                        AcState::Skipping {
                            remaining: r,
                            then_place: Some(next_value),
                        }
                    } else {
                        AcState::Placing { value: next_value }
                    }
                }
            }
            AcState::Skipping {
                mut remaining,
                then_place,
            } => {
                let pos = ZIGZAG[k as usize];
                if block[pos] != 0 {
                    refine_nonzero(reader, &mut block[pos], al)?;
                    k += 1;
                    AcState::Skipping {
                        remaining,
                        then_place,
                    }
                } else {
                    remaining -= 1;
                    k += 1;
                    if remaining == 0 {
                        match then_place {
                            Some(v) => AcState::Placing { value: v },
                            None => AcState::Initial,
                        }
                    } else {
                        AcState::Skipping {
                            remaining,
                            then_place,
                        }
                    }
                }
            }
            AcState::Placing { value } => {
                let pos = ZIGZAG[k as usize];
                if block[pos] == 0 {
                    block[pos] = value << al;
                    k += 1;
                    AcState::Initial
                } else {
                    refine_nonzero(reader, &mut block[pos], al)?;
                    k += 1;
                    AcState::Placing { value }
                }
            }
            AcState::Eob => {
                let pos = ZIGZAG[k as usize];
                if block[pos] != 0 {
                    refine_nonzero(reader, &mut block[pos], al)?;
                }
                k += 1;
                AcState::Eob
            }
        };
    }

    if matches!(state, AcState::Eob) {
        *eobrun -= 1;
    }
    Ok(())
}
