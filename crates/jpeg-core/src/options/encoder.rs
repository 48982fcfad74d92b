//! Encoder options.

/// Options that influence how a baseline JPEG is written.
#[derive(Debug, Copy, Clone)]
pub struct EncoderOptions {
    /// Quality factor in `[1, 100]`; higher is less lossy and produces a
    /// larger file. Values outside the range are rejected rather than
    /// silently clamped (see `EncodeErrors::InvalidQuality`).
    ///
    /// - Default: `50`
    quality: u8,
    /// `0` disables restart markers. A nonzero value emits a DRI segment
    /// with this MCU interval and an RSTn marker at each boundary,
    /// matching the decoder's restart handling.
    ///
    /// - Default: `0`
    restart_interval: u16,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            quality: 50,
            restart_interval: 0,
        }
    }
}

impl EncoderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn quality(&self) -> u8 {
        self.quality
    }

    #[must_use]
    pub fn set_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    #[must_use]
    pub const fn restart_interval(&self) -> u16 {
        self.restart_interval
    }

    #[must_use]
    pub fn set_restart_interval(mut self, interval: u16) -> Self {
        self.restart_interval = interval;
        self
    }
}
