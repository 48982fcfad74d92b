//! Core routines shared by the jpeg codec.
//!
//! This crate holds the format-agnostic pieces that a JPEG decoder and
//! encoder both need:
//!
//! - A byte-slice cursor with endian-aware reads (`bytestream`).
//! - A colorspace tag describing the shape of decoded pixel data
//!   (`colorspace`).
//! - Builder-style decoder/encoder option structs (`options`).
//!
//! Unlike the wider image-format family this crate is descended from,
//! there is no `no_std` target here: the spec this codec implements has
//! no embedded/no-alloc requirement, so the crate depends on `std`
//! directly instead of carrying a `core`/`alloc` split.
#![cfg_attr(not(feature = "std"), no_std)]

pub mod bytestream;
pub mod colorspace;
pub mod options;

pub use bytestream::ZByteReader;
pub use colorspace::ColorSpace;
pub use options::{DecoderOptions, EncoderOptions};
