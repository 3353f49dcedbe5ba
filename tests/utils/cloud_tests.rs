use cloud_layers::{
    detect_clouds, detect_clouds_parallel, CloudDetectionConfig, CloudField, CloudProduct,
    Dataset, Grid,
};
use metfor::Meters;
use std::collections::HashMap;

type Expected = HashMap<String, Vec<f64>>;

fn run(ds: &Dataset, cfg: &CloudDetectionConfig) -> CloudProduct {
    detect_clouds(ds, cfg).expect("detection failed")
}

fn flagged<T: Copy + Default + PartialEq>(row: &[T]) -> Vec<f64> {
    row.iter()
        .enumerate()
        .filter(|(_, v)| **v != T::default())
        .map(|(i, _)| i as f64)
        .collect()
}

fn check_every_row<T: Copy + Default + PartialEq>(grid: &Grid<T>, expected: &[f64], key: &str) {
    for (t, row) in grid.rows().enumerate() {
        assert_eq!(flagged(row), expected, "{} in profile {}", key, t);
    }
}

pub fn test_cloud_base(ds: &Dataset, cfg: &CloudDetectionConfig, expected: &Expected) {
    let clouds = run(ds, cfg);
    check_every_row(clouds.cloud_base(), &expected["cloud_base"], "cloud_base");
}

pub fn test_cloud_top(ds: &Dataset, cfg: &CloudDetectionConfig, expected: &Expected) {
    let clouds = run(ds, cfg);
    check_every_row(clouds.cloud_top(), &expected["cloud_top"], "cloud_top");
}

pub fn test_cloud_mask(ds: &Dataset, cfg: &CloudDetectionConfig, expected: &Expected) {
    let clouds = run(ds, cfg);
    check_every_row(clouds.cloud_mask(), &expected["cloud_mask"], "cloud_mask");
}

pub fn test_discarded(ds: &Dataset, cfg: &CloudDetectionConfig, expected: &Expected) {
    let clouds = run(ds, cfg);
    let expected = &expected["discarded"];

    for t in 0..ds.num_times() {
        let gates: Vec<f64> = clouds
            .discarded()
            .iter()
            .filter(|d| d.time_index == t)
            .map(|d| d.gate as f64)
            .collect();
        assert_eq!(&gates, expected, "discarded in profile {}", t);
    }

    for d in clouds.discarded() {
        assert_eq!(d.altitude, ds.altitude_profile()[d.gate]);
        if let Some(max_gradient) = d.max_gradient {
            assert!(max_gradient < cfg.vg_thres_top);
        }
    }
}

pub fn test_heights(ds: &Dataset, cfg: &CloudDetectionConfig) {
    let clouds = run(ds, cfg);
    let altitude = ds.altitude_profile();
    let (num_times, num_gates) = clouds.shape();

    for t in 0..num_times {
        for g in 0..num_gates {
            let base = clouds.value(CloudField::CloudBaseHeight, t, g);
            if clouds.cloud_base().get(t, g) == Some(&1) {
                assert_eq!(Meters(base.unpack()), altitude[g]);
            } else {
                assert!(base.is_none());
            }

            let top = clouds.value(CloudField::CloudTopHeight, t, g);
            if clouds.cloud_top().get(t, g) == Some(&1) {
                assert_eq!(Meters(top.unpack()), altitude[g]);
            } else {
                assert!(top.is_none());
            }
        }
    }
}

pub fn test_invariants(ds: &Dataset, cfg: &CloudDetectionConfig) {
    let clouds = run(ds, cfg);
    let (num_times, num_gates) = clouds.shape();
    assert_eq!((num_times, num_gates), ds.backscatter().shape());

    for t in 0..num_times {
        // Boundary gates are never edges.
        for g in [0, num_gates - 1].iter().copied() {
            assert_eq!(clouds.cloud_base().get(t, g), Some(&0));
            assert_eq!(clouds.cloud_top().get(t, g), Some(&0));
        }

        // Cloud only where there is a base below and a top above.
        for g in 0..num_gates {
            if clouds.cloud_mask().get(t, g) == Some(&1) {
                assert!(clouds.above_cloud_base().get(t, g).unwrap() > &0);
                assert!(clouds.below_cloud_top().get(t, g).unwrap() > &0);
            }
        }
    }

    // Same input, same output.
    assert_eq!(clouds, run(ds, cfg));
}

pub fn test_parallel_matches_serial(ds: &Dataset, cfg: &CloudDetectionConfig) {
    let serial = run(ds, cfg);
    for threads in [Some(1), Some(2), None].iter() {
        let parallel = detect_clouds_parallel(ds, cfg, *threads).expect("detection failed");
        assert_eq!(serial, parallel);
    }
}
