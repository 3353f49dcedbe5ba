use chrono::NaiveDateTime;
use clap::Parser;
use cloud_layers::{
    detect_clouds_parallel, CloudDetectionConfig, CloudField, CloudProduct, Dataset, Grid,
    StationInfo,
};
use log::{info, warn, LevelFilter};
use metfor::Meters;
use simple_logger::SimpleLogger;
use std::{
    error::Error,
    fmt::{self, Display},
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use strum::IntoEnumIterator;

type CloudMaskResult<T> = Result<T, Box<dyn Error>>;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/*-------------------------------------------------------------------------------------------------
 *                               Parse Command Line Arguments
 *-----------------------------------------------------------------------------------------------*/
///
/// Detect cloud layers in a time series of lidar backscatter profiles.
///
/// The input is a text file with an "altitude" line followed by one line per profile, each line
/// being a comma separated label and list of values. The output has one line per profile for
/// every field of the cloud product.
///
#[derive(Debug, Parser)]
#[clap(bin_name = "cloudmask")]
#[clap(author, version, about)]
struct CloudMaskOptionsInit {
    /// The path to the backscatter file.
    ///
    /// If this is not specified, then the program will check for it in the "CLOUDMASK_INPUT"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "CLOUDMASK_INPUT")]
    input: PathBuf,

    /// The path to the output file.
    ///
    /// If this is not specified, then the program will create one automatically by replacing the
    /// file extension on the input file with "clouds.csv".
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Number of gates in the smoothing window, must be odd.
    #[clap(short, long, default_value_t = 5)]
    window: usize,

    /// Degree of the smoothing polynomial.
    #[clap(short, long, default_value_t = 3)]
    degree: usize,

    /// Smallest smoothed backscatter (m-1 sr-1) that can be part of a cloud edge.
    #[clap(long, default_value_t = 1.0e-8)]
    bsc_thres: f64,

    /// Smallest vertical gradient of log backscatter for a cloud base.
    #[clap(long, default_value_t = 0.3)]
    vg_base: f64,

    /// Smallest vertical gradient of log backscatter for a cloud top.
    #[clap(long, default_value_t = 0.3)]
    vg_top: f64,

    /// Number of gates near the instrument to leave out of the cloud mask.
    #[clap(long, default_value_t = 0)]
    remove_below: usize,

    /// Number of worker threads, defaults to one per CPU.
    #[clap(short, long)]
    threads: Option<usize>,

    /// Station latitude.
    #[clap(long)]
    latitude: Option<f64>,

    /// Station longitude.
    #[clap(long)]
    longitude: Option<f64>,

    /// Station elevation in meters.
    #[clap(long)]
    elevation: Option<f64>,

    /// WIGOS identifier of the station.
    #[clap(long)]
    station: Option<String>,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct CloudMaskOptionsChecked {
    /// The path to the backscatter file.
    input: PathBuf,

    /// The path to the output file.
    output: PathBuf,

    /// Detection parameters.
    cfg: CloudDetectionConfig,

    /// Number of worker threads.
    threads: Option<usize>,

    /// Where the profiles were measured.
    station: StationInfo,

    /// Verbose output
    verbose: bool,
}

impl Display for CloudMaskOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?;
        writeln!(f, "       Input: {}", self.input.display())?;
        writeln!(f, "      Output: {}", self.output.display())?;
        writeln!(
            f,
            "   Smoothing: window {} degree {}",
            self.cfg.smoothing.window, self.cfg.smoothing.degree
        )?;
        writeln!(f, " Bsc. floor: {:e}", self.cfg.bsc_thres)?;
        writeln!(
            f,
            "  Gradients: base {} top {}",
            self.cfg.vg_thres_base, self.cfg.vg_thres_top
        )?;
        writeln!(f, "Remove below: {}", self.cfg.remove_below)?;
        match self.threads {
            Some(n) => writeln!(f, "     Threads: {}", n)?,
            None => writeln!(f, "     Threads: {}", num_cpus::get())?,
        }
        if let Some(id) = self.station.wigos_id() {
            writeln!(f, "     Station: {}", id)?;
        }
        writeln!(f, "\n")?;

        Ok(())
    }
}

/// Get the command line arguments and check them.
fn parse_args() -> CloudMaskResult<CloudMaskOptionsChecked> {
    let CloudMaskOptionsInit {
        input,
        output,
        window,
        degree,
        bsc_thres,
        vg_base,
        vg_top,
        remove_below,
        threads,
        latitude,
        longitude,
        elevation,
        station,
        verbose,
    } = CloudMaskOptionsInit::parse();

    let output = match output {
        Some(v) => v,
        None => {
            let mut clone = input.clone();
            clone.set_extension("clouds.csv");
            clone
        }
    };

    let cfg = CloudDetectionConfig::default()
        .with_smoothing(window, degree)
        .with_backscatter_threshold(bsc_thres)
        .with_gradient_thresholds(vg_base, vg_top)
        .with_remove_below(remove_below);
    cfg.validate()?;

    let station_info = StationInfo::new()
        .with_wigos_id(station)
        .with_lat_lon(latitude.zip(longitude));
    let station_info = match elevation {
        Some(elev) => station_info.with_elevation(Meters(elev)),
        None => station_info,
    };

    let checked = CloudMaskOptionsChecked {
        input,
        output,
        cfg,
        threads,
        station: station_info,
        verbose,
    };

    Ok(checked)
}

/*-------------------------------------------------------------------------------------------------
 *                                      Reading and Writing
 *-----------------------------------------------------------------------------------------------*/
fn parse_value(val: &str) -> f64 {
    val.trim().parse().unwrap_or(std::f64::NAN)
}

fn read_dataset(path: &Path, station: StationInfo) -> CloudMaskResult<Dataset> {
    let text = std::fs::read_to_string(path)?;

    let mut altitude: Option<Vec<Meters>> = None;
    let mut times = vec![];
    let mut rows = vec![];

    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));

    for line in lines {
        let mut fields = line.split(',');
        let label = fields.next().unwrap_or("").trim();

        if label == "altitude" {
            altitude = Some(fields.map(parse_value).map(Meters).collect());
        } else {
            let time = NaiveDateTime::parse_from_str(label, TIME_FORMAT)
                .map_err(|err| format!("bad valid time '{}': {}", label, err))?;
            times.push(time);
            rows.push(fields.map(parse_value).collect::<Vec<f64>>());
        }
    }

    let altitude = altitude.ok_or("no altitude line in input")?;
    let backscatter = Grid::from_rows(rows)?;

    let ds = Dataset::new()
        .with_source_description(path.display().to_string())
        .with_station_info(station)
        .with_valid_times(times)
        .with_altitude_profile(altitude)
        .with_backscatter(backscatter);
    ds.validate()?;

    Ok(ds)
}

fn write_product(path: &Path, ds: &Dataset, clouds: &CloudProduct) -> CloudMaskResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    let (num_times, num_gates) = clouds.shape();

    for field in CloudField::iter() {
        for (t, time) in ds.valid_times().iter().enumerate().take(num_times) {
            write!(out, "{},{}", field, time.format(TIME_FORMAT))?;
            for g in 0..num_gates {
                match clouds.value(field, t, g).into_option() {
                    Some(v) if field.is_height() => write!(out, ",{:.1}", v)?,
                    Some(v) => write!(out, ",{}", v)?,
                    None => write!(out, ",nan")?,
                }
            }
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> CloudMaskResult<()> {
    let opts = parse_args()?;

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()?;

    if opts.verbose {
        info!("{}", opts);
    }

    let ds = read_dataset(&opts.input, opts.station.clone())?;
    info!(
        "read {} profiles with {} gates from {}",
        ds.num_times(),
        ds.num_gates(),
        opts.input.display()
    );

    let clouds = detect_clouds_parallel(&ds, &opts.cfg, opts.threads)?;

    let num_discarded = clouds.discarded().len();
    if num_discarded > 0 {
        warn!("removed {} cloud bases without a top", num_discarded);
    }

    write_product(&opts.output, &ds, &clouds)?;
    info!("wrote {}", opts.output.display());

    Ok(())
}
