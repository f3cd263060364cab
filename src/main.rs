use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use cfa_sensor_sim::color::{DemosaicAlgo, DemosaicPrecision, WeightUpdateReport};
use cfa_sensor_sim::image_io;
use cfa_sensor_sim::pipeline::{self, IspParams, SimulationOutput, SimulationParams};
use cfa_sensor_sim::scene::ScenePattern;

#[derive(Clone, Copy, ValueEnum)]
enum AlgoArg {
    Bilinear,
    Mhc,
}

#[derive(Parser)]
#[command(name = "sensor_sim")]
#[command(about = "Image sensor simulation: capture, blur, noise, color filter and demosaic", long_about = None)]
struct Cli {
    /// Sensor width in pixels
    #[arg(short, long, default_value_t = 640)]
    width: usize,

    /// Sensor height in pixels
    #[arg(short = 'j', long, default_value_t = 480)]
    height: usize,

    /// Bit depth of the sensor (8, 10, 12, 14, 16, 32, 64)
    #[arg(short, long = "bitdepth", default_value_t = 16)]
    bit_depth: u32,

    /// Noise level (standard deviation of Gaussian noise)
    #[arg(short, long, default_value_t = 0.5)]
    noise: f64,

    /// CFA tile, e.g. RCCB
    #[arg(short, long = "cfapattern", default_value = "RCCB")]
    cfa_pattern: String,

    /// Change a color weight, e.g. R:0.25 (repeatable)
    #[arg(long = "color-weight", value_name = "CHANNEL:VALUE")]
    color_weights: Vec<String>,

    /// Scene pattern (gradient, checkerboard, slanted-edge, radial-lines)
    #[arg(short, long, default_value = "gradient")]
    pattern: String,

    /// Use an image file as the scene instead of a generated pattern
    #[arg(short, long, value_name = "IMAGE")]
    input: Option<PathBuf>,

    /// Seed for reproducible noise
    #[arg(long)]
    seed: Option<u64>,

    /// Demosaic orientation; defaults to the CFA tile
    #[arg(long)]
    orientation: Option<String>,

    /// Demosaic algorithm
    #[arg(long, value_enum, default_value_t = AlgoArg::Bilinear)]
    algo: AlgoArg,

    /// Interpolate at sensor precision instead of an 8-bit intermediate
    #[arg(long)]
    native_precision: bool,

    /// PSF kernel size (odd; 1 disables blur)
    #[arg(long, default_value_t = 7)]
    psf_size: usize,

    /// PSF Gaussian sigma
    #[arg(long, default_value_t = 1.5)]
    psf_sigma: f64,

    /// Black level to subtract after demosaicing
    #[arg(long, default_value_t = 0.0)]
    black_level: f64,

    /// Median-filter the reconstructed image
    #[arg(long)]
    denoise: bool,

    /// Auto white balance with the given percentile tail
    #[arg(long, value_name = "PERCENT")]
    white_balance: Option<f64>,

    /// Run one sensor per listed bit depth in parallel, e.g. 8,12,16
    #[arg(long, value_delimiter = ',')]
    compare_depths: Vec<u32>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

impl Cli {
    fn params(&self) -> Result<SimulationParams> {
        let Some(scene) = ScenePattern::from_name(&self.pattern) else {
            bail!("Unknown pattern type: {}", self.pattern);
        };
        Ok(SimulationParams {
            width: self.width,
            height: self.height,
            bit_depth: self.bit_depth,
            scene,
            psf_size: self.psf_size,
            psf_sigma: self.psf_sigma,
            noise_sigma: self.noise,
            seed: self.seed,
            cfa_tile: self.cfa_pattern.clone(),
            color_weights: self.color_weights.clone(),
            orientation: self.orientation.clone(),
            demosaic_algo: match self.algo {
                AlgoArg::Bilinear => DemosaicAlgo::Bilinear,
                AlgoArg::Mhc => DemosaicAlgo::MalvarHeCutler,
            },
            precision: if self.native_precision {
                DemosaicPrecision::Native
            } else {
                DemosaicPrecision::Rescale8
            },
            isp: IspParams {
                black_level: self.black_level,
                lens_shading: None,
                denoise: self.denoise,
                auto_white_balance: self.white_balance,
            },
        })
    }
}

fn report_skipped_weights(report: &WeightUpdateReport) {
    if !report.is_clean() {
        log::warn!("{} color weight entries were skipped", report.rejected.len());
    }
}

fn save_output(cli: &Cli, output: &SimulationOutput, suffix: &str) -> Result<()> {
    let raw_path = cli.out_dir.join(format!("sensor_raw{suffix}.png"));
    image_io::save_raw(&output.raw, cli.width, cli.height, output.bit_depth, &raw_path)
        .with_context(|| format!("writing {}", raw_path.display()))?;

    let out_path = cli.out_dir.join(format!("sensor_output{suffix}.png"));
    image_io::save_color_image(&output.image, &out_path)
        .with_context(|| format!("writing {}", out_path.display()))?;

    log::info!("Saved {} and {}", raw_path.display(), out_path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let params = cli.params()?;

    let scene = match &cli.input {
        Some(path) => {
            let img = image_io::load_image(path)
                .with_context(|| format!("loading {}", path.display()))?;
            image_io::scene_from_image(&img, cli.width, cli.height)
        }
        None => params.scene.generate(cli.width, cli.height),
    };

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;
    image_io::save_scene(&scene, &cli.out_dir.join("scene.png"))?;

    if cli.compare_depths.is_empty() {
        let output = pipeline::simulate_scene(&params, &scene)?;
        report_skipped_weights(&output.weight_report);
        save_output(&cli, &output, "")?;
    } else {
        let outputs = pipeline::simulate_bit_depths(&params, &scene, &cli.compare_depths)?;
        if let Some(first) = outputs.first() {
            report_skipped_weights(&first.weight_report);
        }
        for output in &outputs {
            save_output(&cli, output, &format!("_{}", output.bit_depth.bits()))?;
        }
    }

    Ok(())
}
