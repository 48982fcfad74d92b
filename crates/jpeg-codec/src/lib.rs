//! A baseline, extended-sequential, and progressive JPEG (ITU-T T.81)
//! decoder, plus a baseline sequential encoder.
//!
//! # Features
//!  - Baseline (SOF0), extended sequential (SOF1), and progressive
//!    (SOF2) decoding, including restart intervals and the full
//!    spectral-selection / successive-approximation state machine.
//!  - A single portable scalar IDCT; no SSE/AVX2/NEON dispatch.
//!  - Grayscale, RGB(A), and CMYK color conversion with nearest-neighbor
//!    chroma upsampling.
//!  - A baseline sequential encoder (YCbCr 4:4:4) with quality-scaled
//!    Annex K quantization and Huffman tables.
//!
//! # Usage
//!
//! ```no_run
//! use jpeg_codec::decode;
//! use jpeg_core::options::DecoderOptions;
//!
//! let bytes = std::fs::read("image.jpg").unwrap();
//! let image = decode(&bytes, &DecoderOptions::new()).unwrap();
//! println!("{}x{}", image.width, image.height);
//! ```

#![warn(
    clippy::correctness,
    clippy::perf,
    clippy::pedantic,
    clippy::inline_always,
    clippy::missing_errors_doc,
    clippy::panic
)]
#![allow(
    clippy::needless_return,
    clippy::similar_names,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::too_many_arguments
)]
#![forbid(unsafe_code)]

pub mod assembler;
pub mod bitstream;
pub mod color_convert;
pub mod components;
pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod fdct;
pub mod headers;
pub mod huffman;
pub mod idct;
pub mod marker;
pub mod memory;
pub mod quant;
pub mod scan;
pub mod tables;

pub use decoder::{decode, DecodedImage};
pub use encoder::{encode, EncodedImage, RawImage};

#[must_use]
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
