//! The encoder's forward DCT, quantization-table scaling, and RGB→YCbCr
//! color conversion lookups.
use crate::tables::AASF;

/// One 9-way split lookup table (3 channels, each driven by one of
/// R/G/B) used to convert a pixel to zero-centered YCbCr without a
/// floating-point multiply per channel per pixel.
pub struct RgbYuvTables {
    y: [i32; 768],
    cb: [i32; 768],
    cr: [i32; 768],
}

/// Fixed-point scale applied to every table entry; looked-up sums are
/// shifted right by this amount to recover the result.
const SCALE_BITS: u32 = 16;
const HALF: i32 = 1 << (SCALE_BITS - 1);

impl RgbYuvTables {
    /// Build the three 768-entry tables (`[0..256)` from `r`, `[256..512)`
    /// from `g`, `[512..768)` from `b`) for each of Y, Cb, Cr. Cb/Cr land
    /// already zero-centered (the `+128` in the textbook formulas cancels
    /// against the `-128` level shift FDCT input needs); Y comes out of
    /// the table in `[0, 255]` and `convert` applies the level shift.
    #[must_use]
    pub fn build() -> Self {
        let mut y = [0i32; 768];
        let mut cb = [0i32; 768];
        let mut cr = [0i32; 768];

        let scale = f64::from(1u32 << SCALE_BITS);
        for v in 0..256 {
            let f = v as f64;
            y[v] = (0.299 * f * scale).round() as i32;
            y[256 + v] = (0.587 * f * scale).round() as i32;
            y[512 + v] = (0.114 * f * scale).round() as i32;

            cb[v] = (-0.168_736 * f * scale).round() as i32;
            cb[256 + v] = (-0.331_264 * f * scale).round() as i32;
            cb[512 + v] = (0.5 * f * scale).round() as i32;

            cr[v] = (0.5 * f * scale).round() as i32;
            cr[256 + v] = (-0.418_688 * f * scale).round() as i32;
            cr[512 + v] = (-0.081_312 * f * scale).round() as i32;
        }

        RgbYuvTables { y, cb, cr }
    }

    /// Convert one RGB pixel to zero-centered `(Y, Cb, Cr)`, i.e. already
    /// shifted into `[-128, 127]` and ready for the forward DCT.
    #[must_use]
    pub fn convert(&self, r: u8, g: u8, b: u8) -> (f32, f32, f32) {
        let (r, g, b) = (usize::from(r), usize::from(g), usize::from(b));
        let y = ((self.y[r] + self.y[256 + g] + self.y[512 + b] + HALF) >> SCALE_BITS) - 128;
        let cb = (self.cb[r] + self.cb[256 + g] + self.cb[512 + b] + HALF) >> SCALE_BITS;
        let cr = (self.cr[r] + self.cr[256 + g] + self.cr[512 + b] + HALF) >> SCALE_BITS;
        (y as f32, cb as f32, cr as f32)
    }
}

/// Scale a base Annex K quantization table (natural order) by `quality`
/// per the standard IJG formula.
#[must_use]
pub fn scale_quant_table(base: &[u16; 64], quality: u8) -> [i32; 64] {
    let quality = quality.clamp(1, 100);
    let sf = if quality < 50 {
        5000 / u32::from(quality)
    } else {
        200 - u32::from(quality) * 2
    };

    let mut out = [0i32; 64];
    for (entry, &b) in out.iter_mut().zip(base.iter()) {
        let t = (u32::from(b) * sf + 50) / 100;
        *entry = t.clamp(1, 255) as i32;
    }
    out
}

/// Precompute the per-coefficient reciprocal `fdtbl[k] = 1 / (table[k] *
/// aasf[row] * aasf[col] * 8)`, `table` and `k` both in natural order.
#[must_use]
pub fn build_fdtbl(table: &[i32; 64]) -> [f32; 64] {
    let mut fdtbl = [0f32; 64];
    for k in 0..64 {
        let row = k / 8;
        let col = k % 8;
        fdtbl[k] = 1.0 / (table[k] as f32 * AASF[row] * AASF[col] * 8.0);
    }
    fdtbl
}

/// In-place AAN forward DCT (IJG `jpeg_fdct_float` factorization): pass 1
/// over rows, pass 2 over columns, five multiplies per 1-D pass.
pub fn forward_dct(data: &mut [f32; 64]) {
    for row in 0..8 {
        fdct_1d(data, row * 8, 1);
    }
    for col in 0..8 {
        fdct_1d(data, col, 8);
    }
}

fn fdct_1d(data: &mut [f32; 64], base: usize, stride: usize) {
    let at = |i: usize| data[base + i * stride];

    let tmp0 = at(0) + at(7);
    let tmp7 = at(0) - at(7);
    let tmp1 = at(1) + at(6);
    let tmp6 = at(1) - at(6);
    let tmp2 = at(2) + at(5);
    let tmp5 = at(2) - at(5);
    let tmp3 = at(3) + at(4);
    let tmp4 = at(3) - at(4);

    // even part
    let tmp10 = tmp0 + tmp3;
    let tmp13 = tmp0 - tmp3;
    let tmp11 = tmp1 + tmp2;
    let tmp12 = tmp1 - tmp2;

    data[base] = tmp10 + tmp11;
    data[base + 4 * stride] = tmp10 - tmp11;

    let z1 = (tmp12 + tmp13) * 0.707_106_781;
    data[base + 2 * stride] = tmp13 + z1;
    data[base + 6 * stride] = tmp13 - z1;

    // odd part
    let tmp10 = tmp4 + tmp5;
    let tmp11 = tmp5 + tmp6;
    let tmp12 = tmp6 + tmp7;

    let z5 = (tmp10 - tmp12) * 0.382_683_433;
    let z2 = 0.541_196_100 * tmp10 + z5;
    let z4 = 1.306_562_965 * tmp12 + z5;
    let z3 = tmp11 * 0.707_106_781;

    let z11 = tmp7 + z3;
    let z13 = tmp7 - z3;

    data[base + 5 * stride] = z13 + z2;
    data[base + 3 * stride] = z13 - z2;
    data[base + stride] = z11 + z4;
    data[base + 7 * stride] = z11 - z4;
}

/// Multiply each DCT coefficient by its `fdtbl` reciprocal and round
/// half-away-from-zero to the nearest integer.
#[must_use]
pub fn quantize_block(dct: &[f32; 64], fdtbl: &[f32; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    for i in 0..64 {
        let scaled = dct[i] * fdtbl[i];
        out[i] = if scaled < 0.0 {
            (scaled - 0.5) as i32
        } else {
            (scaled + 0.5) as i32
        };
    }
    out
}
