//! Maps assembled component planes to an interleaved output pixel buffer.
//!
//! One scalar code path, no AVX2/SSE/NEON dispatch — see the crate's IDCT
//! module for why.
use jpeg_core::colorspace::ColorSpace;

use crate::errors::DecodeErrors;

const CR_TO_R: f32 = 1.402;
const CB_TO_G: f32 = 0.344_136_3;
const CR_TO_G: f32 = 0.714_136_36;
const CB_TO_B: f32 = 1.772;

/// YCbCr -> RGB for a single pixel, per the conversion this decoder uses.
#[must_use]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> (u8, u8, u8) {
    let y = f32::from(y);
    let cb = f32::from(cb) - 128.0;
    let cr = f32::from(cr) - 128.0;
    let r = y + CR_TO_R * cr;
    let g = y - CB_TO_G * cb - CR_TO_G * cr;
    let b = y + CB_TO_B * cb;
    (clamp(r), clamp(g), clamp(b))
}

fn clamp(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// Whether a 3- or 4-component image should run the YCbCr transform,
/// resolved from the Adobe marker and any caller override.
#[must_use]
pub fn resolve_color_transform(default: bool, adobe_transform_code: Option<u8>, override_: Option<bool>) -> bool {
    let mut transform = default;
    if let Some(code) = adobe_transform_code {
        if code != 0 {
            transform = true;
        }
    }
    if let Some(forced) = override_ {
        transform = forced;
    }
    transform
}

/// Interleave `planes` (already resampled to the output resolution, one
/// per component in SOF order) into a pixel buffer in `out_colorspace`.
///
/// `color_transform` and `adobe_present` drive the 3/4-component decision
/// table; `format_as_rgba` controls whether the result is expanded to 4
/// bytes/pixel with alpha forced to 255. `requested_colorspace` lets a
/// caller override the natural output: requesting `Luma` out of a 3- or
/// 4-component source skips straight to the Y plane (no RGB conversion
/// work spent on channels that will be discarded), and requesting `RGB`
/// or `RGBA` out of a single-component source replicates the Y plane into
/// three color channels.
pub fn interleave(
    planes: &[Vec<u8>],
    pixel_count: usize,
    color_transform: Option<bool>,
    adobe_transform_code: Option<u8>,
    adobe_present: bool,
    format_as_rgba: bool,
    requested_colorspace: Option<ColorSpace>,
) -> Result<(Vec<u8>, ColorSpace), DecodeErrors> {
    if matches!(requested_colorspace, Some(ColorSpace::Luma)) && planes.len() >= 3 {
        return interleave(&planes[..1], pixel_count, None, None, false, format_as_rgba, None);
    }
    if planes.len() == 1 && matches!(requested_colorspace, Some(ColorSpace::RGB | ColorSpace::RGBA)) {
        let luma = &planes[0];
        let channels = if format_as_rgba { 4 } else { 3 };
        let mut out = vec![0u8; pixel_count * channels];
        for i in 0..pixel_count {
            let y = luma[i];
            out[i * channels] = y;
            out[i * channels + 1] = y;
            out[i * channels + 2] = y;
            if channels == 4 {
                out[i * channels + 3] = 255;
            }
        }
        let colorspace = if format_as_rgba { ColorSpace::RGBA } else { ColorSpace::RGB };
        return Ok((out, colorspace));
    }

    match planes.len() {
        1 => {
            let luma = &planes[0];
            if format_as_rgba {
                let mut out = vec![0u8; pixel_count * 4];
                for i in 0..pixel_count {
                    let y = luma[i];
                    out[i * 4] = y;
                    out[i * 4 + 1] = y;
                    out[i * 4 + 2] = y;
                    out[i * 4 + 3] = 255;
                }
                Ok((out, ColorSpace::RGBA))
            } else {
                Ok((luma.clone(), ColorSpace::Luma))
            }
        }
        2 => {
            let mut out = vec![0u8; pixel_count * 2];
            for i in 0..pixel_count {
                out[i * 2] = planes[0][i];
                out[i * 2 + 1] = planes[1][i];
            }
            Ok((out, ColorSpace::LumaA))
        }
        3 => {
            let transform = resolve_color_transform(true, adobe_transform_code, color_transform);
            let channels = if format_as_rgba { 4 } else { 3 };
            let mut out = vec![0u8; pixel_count * channels];
            for i in 0..pixel_count {
                let (r, g, b) = if transform {
                    ycbcr_to_rgb(planes[0][i], planes[1][i], planes[2][i])
                } else {
                    (planes[0][i], planes[1][i], planes[2][i])
                };
                out[i * channels] = r;
                out[i * channels + 1] = g;
                out[i * channels + 2] = b;
                if channels == 4 {
                    out[i * channels + 3] = 255;
                }
            }
            let colorspace = if format_as_rgba { ColorSpace::RGBA } else { ColorSpace::RGB };
            Ok((out, colorspace))
        }
        4 => {
            if !adobe_present {
                return Err(DecodeErrors::UnsupportedColorMode);
            }
            let transform = resolve_color_transform(false, adobe_transform_code, color_transform);
            let mut cmyk = vec![0u8; pixel_count * 4];
            for i in 0..pixel_count {
                let (c, m, y, k) = if transform {
                    let (r, g, b) = ycbcr_to_rgb(planes[0][i], planes[1][i], planes[2][i]);
                    (r, g, b, 255 - planes[3][i])
                } else {
                    (
                        255 - planes[0][i],
                        255 - planes[1][i],
                        255 - planes[2][i],
                        255 - planes[3][i],
                    )
                };
                cmyk[i * 4] = c;
                cmyk[i * 4 + 1] = m;
                cmyk[i * 4 + 2] = y;
                cmyk[i * 4 + 3] = k;
            }

            if format_as_rgba {
                let mut out = vec![0u8; pixel_count * 4];
                for i in 0..pixel_count {
                    let (c, m, y, k) = (
                        u32::from(cmyk[i * 4]),
                        u32::from(cmyk[i * 4 + 1]),
                        u32::from(cmyk[i * 4 + 2]),
                        u32::from(cmyk[i * 4 + 3]),
                    );
                    out[i * 4] = cmyk_to_rgb_channel(c, k);
                    out[i * 4 + 1] = cmyk_to_rgb_channel(m, k);
                    out[i * 4 + 2] = cmyk_to_rgb_channel(y, k);
                    out[i * 4 + 3] = 255;
                }
                Ok((out, ColorSpace::RGBA))
            } else {
                Ok((cmyk, ColorSpace::CMYK))
            }
        }
        _ => Err(DecodeErrors::UnsupportedColorMode),
    }
}

fn cmyk_to_rgb_channel(ink: u32, k: u32) -> u8 {
    let composite = (ink * (255 - k)) / 255 + k;
    255u32.saturating_sub(composite.min(255)) as u8
}
