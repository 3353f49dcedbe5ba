#[macro_use]
mod utils;

test_file!(thin_cloud, "thin_cloud.txt");
test_file!(thin_cloud_ringing, "thin_cloud_ringing.txt");
test_file!(two_layers, "two_layers.txt");
test_file!(two_layers_default, "two_layers_default.txt");
test_file!(unpaired_base, "unpaired_base.txt");
test_file!(clear_sky, "clear_sky.txt");
test_file!(missing_data, "missing_data.txt");
