#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]
#![cfg_attr(not(test), no_std)]

use itertools::Itertools;

/// `out[i] = in1[i] + in2[i]` over `i64` columns, with two's-complement
/// wrap-around on overflow.
///
/// Panics if the slices differ in length.
pub fn plus_lll(in1: &[i64], in2: &[i64], out: &mut [i64]) {
    for (x_out, (a, b)) in out.iter_mut().zip_eq(in1.iter().zip_eq(in2)) {
        *x_out = a.wrapping_add(*b);
    }
}

/// `i64 + f64 -> f64`; the integer operand is promoted to binary64 with
/// round-to-nearest-even.
pub fn plus_ldd(in1: &[i64], in2: &[f64], out: &mut [f64]) {
    for (x_out, (a, b)) in out.iter_mut().zip_eq(in1.iter().zip_eq(in2)) {
        *x_out = *a as f64 + b;
    }
}

/// `f64 + i64 -> f64`; the integer operand is promoted to binary64 with
/// round-to-nearest-even.
pub fn plus_dld(in1: &[f64], in2: &[i64], out: &mut [f64]) {
    for (x_out, (a, b)) in out.iter_mut().zip_eq(in1.iter().zip_eq(in2)) {
        *x_out = a + *b as f64;
    }
}

/// `out[i] = in1[i] + in2[i]` over `f64` columns, IEEE-754 binary64
/// addition.
pub fn plus_ddd(in1: &[f64], in2: &[f64], out: &mut [f64]) {
    for (x_out, (a, b)) in out.iter_mut().zip_eq(in1.iter().zip_eq(in2)) {
        *x_out = a + b;
    }
}
