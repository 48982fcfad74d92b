//! Canonical Huffman table construction and decoding.
//!
//! Represented as a flat vector of two-child nodes with leaves flagged by
//! a high bit on the child slot, per the re-architecture this lineage's
//! original backtracking-array construction is replaced with: a single
//! linear pass over BITS/HUFFVAL builds the tree, and decoding walks one
//! bit at a time until a leaf is reached.
use crate::bitstream::BitReader;
use crate::errors::DecodeErrors;
use crate::memory::MemoryBudget;

/// Sentinel marking a child slot that has not been allocated yet.
const EMPTY: u16 = 0xFFFF;
/// High bit set on a child slot means "this holds a leaf symbol", stored
/// in the low byte.
const LEAF_BIT: u16 = 0x8000;

#[derive(Copy, Clone)]
struct Node {
    left: u16,
    right: u16,
}

impl Node {
    const fn empty() -> Self {
        Node {
            left: EMPTY,
            right: EMPTY,
        }
    }
}

/// A symbol's canonical `(length, code)` pair, produced by
/// [`canonical_codes`].
#[derive(Copy, Clone, Debug)]
pub struct CanonicalCode {
    pub symbol: u8,
    pub length: u8,
    pub code: u16,
}

/// Build canonical Huffman codes from the 16 code-length counts (`bits`,
/// `bits[i]` = number of codes of length `i + 1`) and the concatenated
/// symbol list (`huffval`), per ITU-T T.81 Annex C.
///
/// `code` starts at 0 before length 1; at each length `len`, the next
/// `bits[len - 1]` symbols consume consecutive codes, then the running
/// code is shifted left (and incremented) to move to the next length.
pub fn canonical_codes(bits: &[u8; 16], huffval: &[u8]) -> Result<Vec<CanonicalCode>, DecodeErrors> {
    let mut out = Vec::with_capacity(huffval.len());
    let mut code: u32 = 0;
    let mut symbol_iter = huffval.iter();

    for (len_idx, &count) in bits.iter().enumerate() {
        let length = (len_idx + 1) as u8;
        for _ in 0..count {
            let &symbol = symbol_iter
                .next()
                .ok_or(DecodeErrors::InvalidHuffmanTable)?;
            if code > u32::from(u16::MAX) {
                return Err(DecodeErrors::InvalidHuffmanTable);
            }
            out.push(CanonicalCode {
                symbol,
                length,
                code: code as u16,
            });
            code += 1;
        }
        code <<= 1;
    }

    if symbol_iter.next().is_some() {
        // huffval had more symbols than bits accounted for.
        return Err(DecodeErrors::InvalidHuffmanTable);
    }

    Ok(out)
}

/// A canonical Huffman table in the decode direction: one bit-walk per
/// call to [`HuffmanTable::decode`].
pub struct HuffmanTable {
    nodes: Vec<Node>,
}

impl HuffmanTable {
    /// Build a decode tree from the 16 length counts and concatenated
    /// symbol list transmitted in a DHT segment.
    pub fn from_bits_and_values(bits: &[u8; 16], huffval: &[u8]) -> Result<Self, DecodeErrors> {
        let codes = canonical_codes(bits, huffval)?;
        let mut nodes = vec![Node::empty()];

        for entry in &codes {
            let mut cur = 0usize;
            for bit_pos in (0..entry.length).rev() {
                let bit = (entry.code >> bit_pos) & 1;
                let is_final_bit = bit_pos == 0;
                let child = if bit == 0 {
                    nodes[cur].left
                } else {
                    nodes[cur].right
                };

                if is_final_bit {
                    if child != EMPTY {
                        // A shorter code already claimed this slot: the
                        // table is not prefix-free.
                        return Err(DecodeErrors::InvalidHuffmanTable);
                    }
                    let leaf = LEAF_BIT | u16::from(entry.symbol);
                    if bit == 0 {
                        nodes[cur].left = leaf;
                    } else {
                        nodes[cur].right = leaf;
                    }
                } else {
                    if child & LEAF_BIT != 0 {
                        // A previously-terminated shorter code occupies
                        // this prefix: code space overflow.
                        return Err(DecodeErrors::InvalidHuffmanTable);
                    }
                    let next = if child == EMPTY {
                        nodes.push(Node::empty());
                        let idx = (nodes.len() - 1) as u16;
                        if bit == 0 {
                            nodes[cur].left = idx;
                        } else {
                            nodes[cur].right = idx;
                        }
                        idx
                    } else {
                        child
                    };
                    cur = next as usize;
                }
            }
        }

        Ok(HuffmanTable { nodes })
    }

    /// Decode one symbol, walking bits until a leaf is reached.
    pub fn decode(&self, reader: &mut BitReader) -> Result<u8, DecodeErrors> {
        let mut cur = 0usize;
        // A canonical code is never longer than 16 bits.
        for _ in 0..16 {
            let bit = reader.read_bit()?;
            let child = if bit == 0 {
                self.nodes[cur].left
            } else {
                self.nodes[cur].right
            };
            if child & LEAF_BIT != 0 {
                return Ok((child & 0xFF) as u8);
            }
            if child == EMPTY {
                return Err(DecodeErrors::InvalidHuffmanSequence);
            }
            cur = child as usize;
        }
        Err(DecodeErrors::InvalidHuffmanSequence)
    }

    pub fn request_memory(budget: &mut MemoryBudget, num_values: usize) -> Result<(), DecodeErrors> {
        budget.request((16 + num_values) as u64)
    }
}

/// A canonical Huffman table in the encode direction: a flat, symbol
/// indexed `(length, code)` lookup instead of a decode tree.
pub struct EncoderHuffmanTable {
    codes: [(u8, u16); 256],
}

impl EncoderHuffmanTable {
    /// Build from the same BITS/HUFFVAL shape a DHT segment carries.
    pub fn from_bits_and_values(bits: &[u8; 16], huffval: &[u8]) -> Result<Self, DecodeErrors> {
        let entries = canonical_codes(bits, huffval)?;
        let mut codes = [(0u8, 0u16); 256];
        for entry in entries {
            codes[entry.symbol as usize] = (entry.length, entry.code);
        }
        Ok(EncoderHuffmanTable { codes })
    }

    /// The `(bit length, code)` pair for `symbol`.
    #[must_use]
    pub fn code_for(&self, symbol: u8) -> (u8, u16) {
        self.codes[symbol as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The standard JPEG luma DC table (Annex K, Table K.3) as a sanity
    /// check that canonical construction matches the well-known table.
    fn luma_dc() -> ([u8; 16], Vec<u8>) {
        let bits: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
        let huffval: Vec<u8> = vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
        (bits, huffval)
    }

    #[test]
    fn canonical_codes_assigns_shortest_codes_first() {
        let (bits, huffval) = luma_dc();
        let codes = canonical_codes(&bits, &huffval).unwrap();
        // Symbol 0 is the sole length-2 code; it must be the first 2-bit
        // code, i.e. 0b00.
        assert_eq!(codes[0].symbol, 0);
        assert_eq!(codes[0].length, 2);
        assert_eq!(codes[0].code, 0b00);
        // Symbols 1..5 share length 3, consecutive codes starting at 0b010.
        assert_eq!(codes[1].length, 3);
        assert_eq!(codes[1].code, 0b010);
        assert_eq!(codes[5].length, 3);
        assert_eq!(codes[5].code, 0b111);
    }

    #[test]
    fn round_trips_every_symbol_through_the_tree() {
        let (bits, huffval) = luma_dc();
        let codes = canonical_codes(&bits, &huffval).unwrap();
        let table = HuffmanTable::from_bits_and_values(&bits, &huffval).unwrap();

        for entry in &codes {
            // Render this code's bits into a byte-aligned buffer padded
            // with 1-bits (a plausible follow-up stream), then decode.
            let mut byte: u16 = 0;
            let pad = 16 - entry.length;
            byte = (byte | u16::from(entry.code)) << pad;
            byte |= (1u16 << pad) - 1;
            let bytes = byte.to_be_bytes();
            let mut reader = BitReader::new(&bytes, 0);
            let decoded = table.decode(&mut reader).unwrap();
            assert_eq!(decoded, entry.symbol);
        }
    }

    #[test]
    fn truncated_huffval_is_rejected() {
        let bits: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
        let huffval: Vec<u8> = vec![0, 1, 2]; // too few symbols
        assert!(matches!(
            canonical_codes(&bits, &huffval),
            Err(DecodeErrors::InvalidHuffmanTable)
        ));
    }
}
