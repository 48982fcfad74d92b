//! Builder-style option structs passed into a decode or encode call.
//!
//! Every field is private; callers build an options value by chaining
//! `set_*` calls off `DecoderOptions::new()` / `EncoderOptions::new()`,
//! each of which consumes and returns `Self`.

mod decoder;
mod encoder;

pub use decoder::DecoderOptions;
pub use encoder::EncoderOptions;
