//! The colorspace a decoded (or to-be-encoded) pixel buffer is in.

#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ColorSpace {
    RGB,
    RGBA,
    /// RGB with an unused, uninitialized 4th byte per pixel. Lets a color
    /// converter write 4-byte lanes even when the caller asked for 3.
    RGBX,
    BGR,
    BGRA,
    YCbCr,
    Luma,
    LumaA,
    YCCK,
    CMYK,
    Unknown,
}

impl ColorSpace {
    pub const fn num_components(&self) -> usize {
        match self {
            Self::RGB | Self::YCbCr | Self::BGR => 3,
            Self::RGBA | Self::RGBX | Self::BGRA | Self::YCCK | Self::CMYK => 4,
            Self::Luma => 1,
            Self::LumaA => 2,
            Self::Unknown => 0,
        }
    }

    pub const fn has_alpha(&self) -> bool {
        matches!(self, Self::RGBA | Self::BGRA | Self::LumaA)
    }

    pub const fn is_grayscale(&self) -> bool {
        matches!(self, Self::LumaA | Self::Luma)
    }
}

/// All colorspaces a decode call may resolve to, depending on the source
/// image's component count and markers.
pub static ALL_COLORSPACES: [ColorSpace; 6] = [
    ColorSpace::RGB,
    ColorSpace::RGBA,
    ColorSpace::LumaA,
    ColorSpace::Luma,
    ColorSpace::CMYK,
    ColorSpace::YCbCr,
];
