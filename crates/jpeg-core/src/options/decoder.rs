//! Decoder options.

use crate::colorspace::ColorSpace;

/// Options that influence how a JPEG is decoded.
///
/// Not every field is respected by every code path (e.g. `color_transform`
/// only matters for 3- and 4-component images) — see each field's doc
/// comment for which part of the decoder reads it.
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// `None` lets the decoder infer the YCbCr/CMYK transform from the
    /// Adobe APP14 marker (or default to "transform") as described in the
    /// component-assembly step. `Some(true)`/`Some(false)` forces it.
    ///
    /// - Default: `None`
    color_transform: Option<bool>,
    /// When true, `decode` always returns 4 bytes/pixel with alpha fixed
    /// at 255; when false, 3 bytes/pixel (or 1 for grayscale).
    ///
    /// - Default: `true`
    format_as_rgba: bool,
    /// When true, a scan that references a block index past the
    /// allocated grid silently drops that block instead of failing.
    ///
    /// - Default: `true`
    tolerant_decoding: bool,
    /// Upper bound on `width * height`, in megapixels. Checked once, at
    /// SOF, before any scan is decoded.
    ///
    /// - Default: `100`
    max_resolution_mp: usize,
    /// Upper bound on cumulative bytes the decoder may allocate over the
    /// course of one `decode` call.
    ///
    /// - Default: `512`
    max_memory_usage_mb: usize,
    /// Output colorspace requested by the caller; `None` defers to the
    /// component count (1 => Luma, 3 => RGB, 4 => CMYK).
    out_colorspace: Option<ColorSpace>,
    /// Treat recoverable conditions (malformed marker recovery, DNL,
    /// etc.) as hard errors instead of logging and continuing.
    ///
    /// - Default: `false`
    strict_mode: bool,
    /// Upper bound on image width/height, in pixels, checked independently
    /// of `max_resolution_mp` at SOF.
    ///
    /// - Default: `1 << 16`
    max_width: usize,
    max_height: usize,
    /// Upper bound on the number of scans a progressive image may contain.
    ///
    /// - Default: `100`
    max_scans: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            color_transform: None,
            format_as_rgba: true,
            tolerant_decoding: true,
            max_resolution_mp: 100,
            max_memory_usage_mb: 512,
            out_colorspace: None,
            strict_mode: false,
            max_width: 1 << 16,
            max_height: 1 << 16,
            max_scans: 100,
        }
    }
}

impl DecoderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn color_transform(&self) -> Option<bool> {
        self.color_transform
    }

    #[must_use]
    pub fn set_color_transform(mut self, transform: Option<bool>) -> Self {
        self.color_transform = transform;
        self
    }

    #[must_use]
    pub const fn format_as_rgba(&self) -> bool {
        self.format_as_rgba
    }

    #[must_use]
    pub fn set_format_as_rgba(mut self, yes: bool) -> Self {
        self.format_as_rgba = yes;
        self
    }

    #[must_use]
    pub const fn tolerant_decoding(&self) -> bool {
        self.tolerant_decoding
    }

    #[must_use]
    pub fn set_tolerant_decoding(mut self, yes: bool) -> Self {
        self.tolerant_decoding = yes;
        self
    }

    #[must_use]
    pub const fn max_resolution_mp(&self) -> usize {
        self.max_resolution_mp
    }

    #[must_use]
    pub fn set_max_resolution_mp(mut self, mp: usize) -> Self {
        self.max_resolution_mp = mp;
        self
    }

    #[must_use]
    pub const fn max_memory_usage_mb(&self) -> usize {
        self.max_memory_usage_mb
    }

    #[must_use]
    pub fn set_max_memory_usage_mb(mut self, mb: usize) -> Self {
        self.max_memory_usage_mb = mb;
        self
    }

    #[must_use]
    pub const fn out_colorspace(&self) -> Option<ColorSpace> {
        self.out_colorspace
    }

    #[must_use]
    pub fn set_out_colorspace(mut self, colorspace: ColorSpace) -> Self {
        self.out_colorspace = Some(colorspace);
        self
    }

    #[must_use]
    pub const fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    #[must_use]
    pub fn set_strict_mode(mut self, yes: bool) -> Self {
        self.strict_mode = yes;
        self
    }

    /// Resolve the requested output colorspace, defaulting to RGB when the
    /// caller hasn't asked for anything in particular.
    #[must_use]
    pub fn jpeg_get_out_colorspace(&self) -> ColorSpace {
        self.out_colorspace.unwrap_or(ColorSpace::RGB)
    }

    /// Override the resolved output colorspace in place, without
    /// consuming `self`. A caller holding a long-lived `DecoderOptions`
    /// across several `decode` calls can use this instead of the
    /// consuming `set_out_colorspace` builder step.
    pub fn set_out_colorspace_mut(&mut self, colorspace: ColorSpace) {
        self.out_colorspace = Some(colorspace);
    }

    #[must_use]
    pub const fn max_width(&self) -> usize {
        self.max_width
    }

    #[must_use]
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    #[must_use]
    pub const fn max_height(&self) -> usize {
        self.max_height
    }

    #[must_use]
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    #[must_use]
    pub const fn max_scans(&self) -> usize {
        self.max_scans
    }

    #[must_use]
    pub fn set_max_scans(mut self, scans: usize) -> Self {
        self.max_scans = scans;
        self
    }
}
