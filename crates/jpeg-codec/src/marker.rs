//! JPEG marker codes (ITU-T T.81 Table B.1).
//!
//! A marker is the byte following a `0xFF` marker-prefix byte; this enum
//! names every code the parser dispatches on.

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Marker {
    /// Start of image, `0xD8`.
    SOI,
    /// End of image, `0xD9`.
    EOI,
    /// Start of frame, `0xC0..0xCF` except `0xC4`/`0xC8`/`0xCC`, carrying
    /// the `n` in `SOFn`. Only `SOF(0)`/`SOF(1)`/`SOF(2)` (baseline,
    /// extended sequential, progressive) are decoded; the others are
    /// rejected as unsupported once parsed.
    SOF(u8),
    /// Define Huffman Table(s), `0xC4`.
    DHT,
    /// Define Arithmetic Coding conditioning, `0xCC`.
    DAC,
    /// Define Quantization Table(s), `0xDB`.
    DQT,
    /// Define Restart Interval, `0xDD`.
    DRI,
    /// Define Number of Lines, `0xDC`.
    DNL,
    /// Start of Scan, `0xDA`.
    SOS,
    /// Restart marker `RST0..RST7`, `0xD0..0xD7`, with the 0..7 index.
    RST(u8),
    /// Application segment `APP0..APP15`, `0xE0..0xEF`, with the 0..15 index.
    APP(u8),
    /// Comment, `0xFE`.
    COM,
}

impl Marker {
    /// Parse the byte following a `0xFF` prefix. Returns `None` for a code
    /// this parser has no name for at all (reserved/unused codes).
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Marker> {
        match byte {
            0xD8 => Some(Marker::SOI),
            0xD9 => Some(Marker::EOI),
            0xC4 => Some(Marker::DHT),
            0xCC => Some(Marker::DAC),
            0xC0..=0xCF => Some(Marker::SOF(byte - 0xC0)),
            0xDB => Some(Marker::DQT),
            0xDD => Some(Marker::DRI),
            0xDC => Some(Marker::DNL),
            0xDA => Some(Marker::SOS),
            0xD0..=0xD7 => Some(Marker::RST(byte - 0xD0)),
            0xE0..=0xEF => Some(Marker::APP(byte - 0xE0)),
            0xFE => Some(Marker::COM),
            _ => None,
        }
    }

    /// True for SOI/EOI/RSTn: markers with no following length field.
    #[must_use]
    pub const fn is_standalone(self) -> bool {
        matches!(self, Marker::SOI | Marker::EOI | Marker::RST(_))
    }

    /// The byte that follows the `0xFF` prefix on the wire; the inverse of
    /// [`Marker::from_u8`]. Used by the encoder.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Marker::SOI => 0xD8,
            Marker::EOI => 0xD9,
            Marker::DHT => 0xC4,
            Marker::DAC => 0xCC,
            Marker::SOF(n) => 0xC0 + n,
            Marker::DQT => 0xDB,
            Marker::DRI => 0xDD,
            Marker::DNL => 0xDC,
            Marker::SOS => 0xDA,
            Marker::RST(n) => 0xD0 + n,
            Marker::APP(n) => 0xE0 + n,
            Marker::COM => 0xFE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_standard_markers() {
        assert_eq!(Marker::from_u8(0xD8), Some(Marker::SOI));
        assert_eq!(Marker::from_u8(0xDA), Some(Marker::SOS));
        assert_eq!(Marker::from_u8(0xC2), Some(Marker::SOF(2)));
    }

    #[test]
    fn decodes_ranged_markers() {
        assert_eq!(Marker::from_u8(0xD0), Some(Marker::RST(0)));
        assert_eq!(Marker::from_u8(0xD7), Some(Marker::RST(7)));
        assert_eq!(Marker::from_u8(0xE0), Some(Marker::APP(0)));
        assert_eq!(Marker::from_u8(0xEE), Some(Marker::APP(14)));
    }

    #[test]
    fn code_is_the_inverse_of_from_u8() {
        for byte in [0xD8u8, 0xD9, 0xC4, 0xDB, 0xDA, 0xDD, 0xD3, 0xE5] {
            let marker = Marker::from_u8(byte).unwrap();
            assert_eq!(marker.code(), byte);
        }
    }

    #[test]
    fn standalone_markers_have_no_length_field() {
        assert!(Marker::SOI.is_standalone());
        assert!(Marker::EOI.is_standalone());
        assert!(Marker::RST(3).is_standalone());
        assert!(!Marker::SOF(0).is_standalone());
        assert!(!Marker::APP(0).is_standalone());
    }
}
