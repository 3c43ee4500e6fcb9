/// Round to `decimals` places, ties to even (matches numpy/pandas `round`)
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}
