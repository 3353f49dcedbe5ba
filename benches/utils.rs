use cloud_layers::{Dataset, Grid};
use metfor::Meters;

pub const NUM_GATES: usize = 200;
pub const NUM_TIMES: usize = 288;

/// A day of five minute profiles with a layer drifting up through the lower half of the profile,
/// and every tenth profile missing.
pub fn synthetic_day() -> Dataset {
    let altitude: Vec<Meters> = (0..NUM_GATES).map(|i| Meters(30.0 * i as f64)).collect();

    let rows: Vec<Vec<f64>> = (0..NUM_TIMES)
        .map(|t| {
            if t % 10 == 9 {
                return vec![std::f64::NAN; NUM_GATES];
            }

            let base = 20 + (t * 80) / NUM_TIMES;
            (0..NUM_GATES)
                .map(|g| {
                    let noise = 1.0 + 0.05 * ((g * 7 + t * 13) % 11) as f64 / 11.0;
                    if g >= base && g < base + 4 {
                        1.0e-5 * noise
                    } else {
                        1.0e-7 * noise
                    }
                })
                .collect()
        })
        .collect();

    Dataset::new()
        .with_altitude_profile(altitude)
        .with_backscatter(Grid::from_rows(rows).expect("oops"))
}
