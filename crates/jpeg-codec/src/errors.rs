//! Error types returned by decoding and encoding.
use core::fmt::{Debug, Display, Formatter};

/// Errors that can abort a `decode` call.
pub enum DecodeErrors {
    /// The first two bytes were not `FF D8`.
    IllegalMagicBytes(u16),
    /// A DQT segment was malformed.
    DqtError(String),
    /// A SOF segment was malformed or declared an unsupported layout.
    SofError(String),
    /// A SOS segment was malformed.
    SosError(String),
    /// BITS/HUFFVAL could not produce a valid canonical Huffman table, or
    /// a DHT segment was malformed.
    HuffmanDecode(String),
    /// Entropy decoding ran out of bits or walked off the Huffman tree.
    InvalidHuffmanSequence,
    /// A requested allocation would push the running total past the
    /// configured memory ceiling.
    MemoryLimitExceeded { excess_mb: f64 },
    /// A component declared `h == 0` or `v == 0` in SOF.
    InvalidSamplingFactor,
    /// A scan referenced a component id not declared in SOF.
    UnknownComponentId { id: u8 },
    /// BITS/HUFFVAL describe an over-subscribed or incomplete code space.
    InvalidHuffmanTable,
    /// Something went wrong decoding MCUs/entropy coded data.
    MCUError(String),
    /// A marker turned up where entropy-coded data was expected.
    UnexpectedMarker { marker: u16 },
    /// A restart interval boundary was not followed by `RST0..RST7`.
    MarkerNotFound,
    /// Width or height in the SOF segment was zero.
    ZeroError,
    /// A start-of-frame marker this decoder cannot handle (lossless,
    /// arithmetic-coded, hierarchical, ...).
    Unsupported(UnsupportedSchemes),
    /// The compressed stream ended before a field could be fully read.
    UnexpectedEof,
    /// An unrecognized marker with no available recovery path.
    UnknownMarker { offset: usize, marker: u16 },
    /// The truncated-marker rewind recovery had already been used once
    /// when a second malformed marker was encountered.
    DualMalformedMarker {
        first_offset: usize,
        second_offset: usize,
        marker: u16,
    },
    /// A DQT segment's precision nibble was not `0` or `1`.
    InvalidQuantSpec { precision: u8 },
    /// Progressive AC successive approximation received a magnitude
    /// category other than 0 or 1.
    InvalidAcEncoding,
    /// More than one SOF segment appeared in the stream.
    MultipleFramesUnsupported,
    /// SOF declared `width * height` past `max_resolution_mp`.
    ResolutionExceeded { excess_mp: f64 },
    /// SOF declared a width or height past `max_width`/`max_height`.
    DimensionExceeded { field: &'static str, limit: usize, actual: usize },
    /// A progressive image carried more scans than `max_scans` allows.
    TooManyScans { max_scans: usize },
    /// `strict_mode` is enabled and a normally-recoverable condition (a
    /// truncated-marker rewind, a misaligned APPn segment) was hit.
    StrictModeViolation(&'static str),
    /// Component count outside `{1, 2, 3, 4}`, or 4 components with no
    /// Adobe APP14 marker present.
    UnsupportedColorMode,
    /// A scan addressed a block index past the allocated grid while
    /// `tolerant_decoding` was disabled.
    BlockIndexOutOfRange,
    /// Catch-all for a short, situational message that owns its string.
    Format(String),
    /// Catch-all for a short, situational `&'static str` message.
    FormatStatic(&'static str),
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::IllegalMagicBytes(bytes) => {
                write!(f, "Illegal starting bytes, expected `0xffd8` but got `{bytes:X}`")
            }
            Self::DqtError(reason) => write!(f, "Problems with parsing DQT segment: {reason}"),
            Self::SofError(reason) => write!(f, "Problems with parsing SOF segment: {reason}"),
            Self::SosError(reason) => write!(f, "Problems with parsing SOS segment: {reason}"),
            Self::HuffmanDecode(reason) => write!(f, "Error decoding Huffman table: {reason}"),
            Self::InvalidHuffmanSequence => {
                write!(f, "entropy decoder ran out of bits or left the Huffman tree")
            }
            Self::MemoryLimitExceeded { excess_mb } => write!(
                f,
                "decode would allocate {excess_mb:.2} MB past the configured memory ceiling"
            ),
            Self::InvalidSamplingFactor => {
                write!(f, "component sampling factor h or v was 0")
            }
            Self::UnknownComponentId { id } => {
                write!(f, "scan referenced component id {id} not declared in SOF")
            }
            Self::InvalidHuffmanTable => {
                write!(f, "BITS/HUFFVAL do not describe a valid canonical Huffman table")
            }
            Self::MCUError(reason) => write!(f, "Error decoding MCUs: {reason}"),
            Self::UnexpectedMarker { marker } => {
                write!(f, "unexpected marker 0x{marker:04X} inside entropy-coded data")
            }
            Self::MarkerNotFound => {
                write!(f, "expected a restart marker (RST0..RST7) but found something else")
            }
            Self::ZeroError => write!(f, "Image width or height is zero"),
            Self::Unsupported(feature) => write!(f, "Unsupported feature: {feature:?}"),
            Self::UnexpectedEof => write!(f, "input ended before a field could be fully read"),
            Self::UnknownMarker { offset, marker } => write!(
                f,
                "unknown marker 0x{marker:04X} at offset {offset} with no recovery path"
            ),
            Self::DualMalformedMarker {
                first_offset,
                second_offset,
                marker,
            } => write!(
                f,
                "malformed marker 0x{marker:04X} at offset {second_offset}, after the one \
                 truncated-marker recovery already used at offset {first_offset}"
            ),
            Self::InvalidQuantSpec { precision } => {
                write!(f, "DQT precision nibble {precision} is not 0 or 1")
            }
            Self::InvalidAcEncoding => write!(
                f,
                "progressive AC successive approximation received a magnitude category \
                 other than 0 or 1"
            ),
            Self::MultipleFramesUnsupported => write!(f, "more than one SOF segment in stream"),
            Self::ResolutionExceeded { excess_mp } => write!(
                f,
                "image resolution exceeds the configured ceiling by {excess_mp:.2} megapixels"
            ),
            Self::DimensionExceeded { field, limit, actual } => write!(
                f,
                "{field} {actual} exceeds the configured ceiling of {limit}"
            ),
            Self::TooManyScans { max_scans } => {
                write!(f, "progressive image carried more than {max_scans} scans")
            }
            Self::StrictModeViolation(reason) => {
                write!(f, "strict_mode rejected a recoverable condition: {reason}")
            }
            Self::UnsupportedColorMode => write!(
                f,
                "component count is outside {{1, 2, 3, 4}}, or 4 components with no Adobe marker"
            ),
            Self::BlockIndexOutOfRange => {
                write!(f, "scan addressed a block index past the allocated grid")
            }
            Self::Format(reason) => write!(f, "{reason}"),
            Self::FormatStatic(reason) => write!(f, "{reason}"),
        }
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for DecodeErrors {}

impl From<&'static str> for DecodeErrors {
    fn from(value: &'static str) -> Self {
        Self::FormatStatic(value)
    }
}

impl From<String> for DecodeErrors {
    fn from(value: String) -> Self {
        Self::Format(value)
    }
}

impl From<jpeg_core::bytestream::ZByteReaderError> for DecodeErrors {
    fn from(_: jpeg_core::bytestream::ZByteReaderError) -> Self {
        Self::UnexpectedEof
    }
}

/// A start-of-frame encoding this decoder does not implement.
///
/// Covers lossless (SOF3, SOF7, SOF11), differential (SOF5, SOF6, SOF9,
/// SOF10, SOF13, SOF14) and arithmetic-coded (SOF9..15) markers, none of
/// which baseline/extended/progressive Huffman decoding can produce
/// meaningful output for.
pub struct UnsupportedSchemes(u8);

impl UnsupportedSchemes {
    #[must_use]
    pub fn from_int(marker: u8) -> Option<Self> {
        Some(UnsupportedSchemes(marker))
    }
}

impl Debug for UnsupportedSchemes {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "SOF{} (lossless, differential or arithmetic-coded frame)", self.0)
    }
}

/// Errors that can abort an `encode` call.
pub enum EncodeErrors {
    /// `quality` was outside `[1, 100]`.
    InvalidQuality { given: u8 },
    /// `data.len()` did not match `components * width * height`.
    ImageBufferWrongSize { expected: usize, found: usize },
    /// The supplied image had zero width or height.
    EmptyImage,
    /// Writing to the output sink failed.
    WriteFailed(&'static str),
}

impl Debug for EncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidQuality { given } => {
                write!(f, "quality {given} is outside the valid range [1, 100]")
            }
            Self::ImageBufferWrongSize { expected, found } => write!(
                f,
                "image buffer has {found} bytes, expected {expected} (components * width * height)"
            ),
            Self::EmptyImage => write!(f, "image has zero width or height"),
            Self::WriteFailed(msg) => write!(f, "write failed: {msg}"),
        }
    }
}

impl Display for EncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for EncodeErrors {}
