//! Synthetic backscatter profiles for unit tests.
use metfor::Meters;

const BACKGROUND: f64 = 1.0e-7;

pub fn approx_equal(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Gates every 100 m starting at the instrument.
pub fn altitude_grid(num_gates: usize) -> Vec<Meters> {
    (0..num_gates).map(|i| Meters(100.0 * i as f64)).collect()
}

/// Clear air with the same backscatter everywhere.
pub fn uniform_profile(value: f64) -> Vec<f64> {
    vec![value; 50]
}

/// 50 gates of clear air with a thin, optically thick layer at gates 20 to 22.
pub fn thin_cloud_profile() -> Vec<f64> {
    let mut bsc = vec![BACKGROUND; 50];
    bsc[20..=22].iter_mut().for_each(|b| *b = 1.0e-5);
    bsc
}

/// Backscatter jumps up at gate 20 and stays high to the end of the profile, so there is a base
/// but nothing that looks like a top.
pub fn ramp_profile() -> Vec<f64> {
    let mut bsc = vec![BACKGROUND; 20];
    bsc.push(2.0e-6);
    bsc.extend_from_slice(&[1.0e-5; 29]);
    bsc
}

/// 60 gates with a thin layer at gates 10 to 12 and a weaker one at gates 35 to 38.
pub fn two_cloud_profile() -> Vec<f64> {
    let mut bsc = vec![BACKGROUND; 60];
    bsc[10..=12].iter_mut().for_each(|b| *b = 1.0e-5);
    bsc[35..=38].iter_mut().for_each(|b| *b = 3.0e-6);
    bsc
}
