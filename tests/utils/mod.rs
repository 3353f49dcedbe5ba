use chrono::NaiveDateTime;
use cloud_layers::{CloudDetectionConfig, Dataset, Grid};
use metfor::Meters;
use std::{collections::HashMap, fs::File, io::Read, path::PathBuf};

pub mod cloud_tests;

#[allow(unused_macros)] // False alarm
macro_rules! test_file {
    ($test_mod_name:ident, $fname:expr) => {
        mod $test_mod_name {
            use crate::utils::{self, cloud_tests};
            use cloud_layers::CloudDetectionConfig;
            use cloud_layers::Dataset;
            use std::collections::HashMap;

            fn load_data() -> (Dataset, CloudDetectionConfig, HashMap<String, Vec<f64>>) {
                utils::load_test_file($fname)
            }

            #[test]
            fn cloud_base() {
                let (ds, cfg, expected) = load_data();
                cloud_tests::test_cloud_base(&ds, &cfg, &expected);
            }

            #[test]
            fn cloud_top() {
                let (ds, cfg, expected) = load_data();
                cloud_tests::test_cloud_top(&ds, &cfg, &expected);
            }

            #[test]
            fn cloud_mask() {
                let (ds, cfg, expected) = load_data();
                cloud_tests::test_cloud_mask(&ds, &cfg, &expected);
            }

            #[test]
            fn discarded() {
                let (ds, cfg, expected) = load_data();
                cloud_tests::test_discarded(&ds, &cfg, &expected);
            }

            #[test]
            fn heights() {
                let (ds, cfg, _) = load_data();
                cloud_tests::test_heights(&ds, &cfg);
            }

            #[test]
            fn invariants() {
                let (ds, cfg, _) = load_data();
                cloud_tests::test_invariants(&ds, &cfg);
            }

            #[test]
            fn parallel() {
                let (ds, cfg, _) = load_data();
                cloud_tests::test_parallel_matches_serial(&ds, &cfg);
            }
        }
    };
}

pub fn load_test_file(fname: &str) -> (Dataset, CloudDetectionConfig, HashMap<String, Vec<f64>>) {
    let mut test_path = PathBuf::new();
    test_path.push("test_data");
    test_path.push(fname);

    let mut f = File::open(&test_path).expect(&format!("Error opening file: {:#?}", test_path));

    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .expect(&format!("Error reading file: {:#?}", test_path));

    let mut expected: HashMap<String, Vec<f64>> = HashMap::new();
    let mut altitude: Vec<Meters> = vec![];
    let mut times: Vec<NaiveDateTime> = vec![];
    let mut rows: Vec<Vec<f64>> = vec![];

    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        //
        // Expected values are in the comments
        //
        if let Some(comment) = line.strip_prefix('#') {
            if let Some((key, vals)) = comment.split_once(':') {
                let vals = vals
                    .split_whitespace()
                    .map(|v| {
                        v.parse::<f64>()
                            .expect(&format!("Bad expected value: {}", v))
                    })
                    .collect();
                expected.insert(key.trim().to_owned(), vals);
            }
            continue;
        }

        let mut fields = line.split(',');
        let label = fields.next().unwrap();
        let vals = fields.map(|v| v.trim().parse::<f64>().unwrap_or(std::f64::NAN));

        if label == "altitude" {
            altitude = vals.map(Meters).collect();
        } else {
            times.push(NaiveDateTime::parse_from_str(label, "%Y-%m-%dT%H:%M:%S").unwrap());
            rows.push(vals.collect());
        }
    }

    let ds = Dataset::new()
        .with_source_description(fname.to_owned())
        .with_valid_times(times)
        .with_altitude_profile(altitude)
        .with_backscatter(Grid::from_rows(rows).unwrap());
    ds.validate().unwrap();

    let vg = &expected["vg_thres"];
    let cfg = CloudDetectionConfig::default().with_gradient_thresholds(vg[0], vg[1]);

    (ds, cfg, expected)
}
