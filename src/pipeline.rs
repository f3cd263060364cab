use std::sync::Arc;

use rayon::prelude::*;

use crate::color::{
    ColorFilterArray, ColorImage, DemosaicAlgo, DemosaicPrecision, Orientation, WeightUpdateReport,
};
use crate::error::Result;
use crate::isp;
use crate::scene::{Scene, ScenePattern};
use crate::sensor::adc::PixelBuffer;
use crate::sensor::noise::NoiseSource;
use crate::sensor::optics::Kernel;
use crate::sensor::{BitDepth, ReconstructOptions, Sensor};

/// Optional corrections run on the reconstructed image, in field order.
#[derive(Debug, Clone, Default)]
pub struct IspParams {
    pub black_level: f64,
    pub lens_shading: Option<Scene>,
    pub denoise: bool,
    /// Percentile tail for auto white balance; `None` skips it.
    pub auto_white_balance: Option<f64>,
}

/// All simulation parameters.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    // Sensor
    pub width: usize,
    pub height: usize,
    pub bit_depth: u32,

    // Scene
    pub scene: ScenePattern,

    // Optics
    pub psf_size: usize,
    pub psf_sigma: f64,

    // Noise
    pub noise_sigma: f64,
    pub seed: Option<u64>,

    // Color filter
    pub cfa_tile: String,
    pub color_weights: Vec<String>,

    // Reconstruction
    /// Defaults to the CFA tile when unset.
    pub orientation: Option<String>,
    pub demosaic_algo: DemosaicAlgo,
    pub precision: DemosaicPrecision,

    pub isp: IspParams,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            bit_depth: 16,

            scene: ScenePattern::Gradient,

            psf_size: 7,
            psf_sigma: 1.5,

            noise_sigma: 0.5,
            seed: None,

            cfa_tile: "RCCB".to_string(),
            color_weights: Vec::new(),

            orientation: None,
            demosaic_algo: DemosaicAlgo::Bilinear,
            precision: DemosaicPrecision::Rescale8,

            isp: IspParams::default(),
        }
    }
}

impl SimulationParams {
    pub fn orientation_name(&self) -> &str {
        self.orientation.as_deref().unwrap_or(&self.cfa_tile)
    }
}

#[derive(Debug)]
pub struct SimulationOutput {
    pub bit_depth: BitDepth,
    pub scene: Scene,
    /// Filtered mosaic as it stood before reconstruction.
    pub raw: PixelBuffer,
    pub image: ColorImage,
    /// Outcome of the weight overrides. Shared by every output of one run.
    pub weight_report: Arc<WeightUpdateReport>,
}

/// Build the CFA for `params`, applying weight overrides. Malformed
/// overrides are skipped and returned in the report.
pub fn build_cfa(params: &SimulationParams) -> Result<(ColorFilterArray, WeightUpdateReport)> {
    let mut cfa = ColorFilterArray::new(&params.cfa_tile, params.width, params.height)?;
    let report = cfa.update_weights(&params.color_weights);
    Ok((cfa, report))
}

/// Run the full chain on the configured synthetic scene.
pub fn simulate(params: &SimulationParams) -> Result<SimulationOutput> {
    let scene = params.scene.generate(params.width, params.height);
    simulate_scene(params, &scene)
}

/// Run capture, blur, noise, filter, reconstruct and ISP on `scene`.
pub fn simulate_scene(params: &SimulationParams, scene: &Scene) -> Result<SimulationOutput> {
    let depth = BitDepth::try_from(params.bit_depth)?;
    let (cfa, report) = build_cfa(params)?;
    run_sensor(params, depth, &cfa, &Arc::new(report), scene)
}

/// Simulate `scene` on one sensor per bit depth, in parallel.
///
/// The CFA is built once and shared read-only with the scene; each sensor
/// owns its grid. With a seed, every sensor draws the same noise sequence.
pub fn simulate_bit_depths(
    params: &SimulationParams,
    scene: &Scene,
    bit_depths: &[u32],
) -> Result<Vec<SimulationOutput>> {
    let depths = bit_depths
        .iter()
        .map(|&bits| BitDepth::try_from(bits))
        .collect::<Result<Vec<_>>>()?;
    let (cfa, report) = build_cfa(params)?;
    let report = Arc::new(report);

    log::info!("Simulating {} bit depths in parallel", depths.len());
    depths
        .par_iter()
        .map(|&depth| run_sensor(params, depth, &cfa, &report, scene))
        .collect()
}

fn run_sensor(
    params: &SimulationParams,
    depth: BitDepth,
    cfa: &ColorFilterArray,
    weight_report: &Arc<WeightUpdateReport>,
    scene: &Scene,
) -> Result<SimulationOutput> {
    let noise = match params.seed {
        Some(seed) => NoiseSource::seeded(seed),
        None => NoiseSource::from_os(),
    };
    let mut sensor = Sensor::with_depth(depth, params.width, params.height, noise);

    // Step 1: Capture
    sensor.capture(scene)?;

    // Step 2: Optical blur
    let psf = if params.psf_size <= 1 {
        Kernel::identity()
    } else {
        Kernel::gaussian(params.psf_size, params.psf_sigma)?
    };
    sensor.blur(&psf)?;

    // Step 3: Read noise
    sensor.add_noise(params.noise_sigma)?;

    // Step 4: Color filter
    sensor.apply_filter_array(cfa)?;

    // Step 5: Demosaic
    let options = ReconstructOptions {
        orientation: Orientation::parse_lenient(params.orientation_name()),
        algo: params.demosaic_algo,
        precision: params.precision,
    };
    let mut image = sensor.reconstruct_with(&options)?;

    // Step 6: ISP
    let isp_params = &params.isp;
    if isp_params.black_level > 0.0 {
        image = isp::black_level_compensation(&image, isp_params.black_level)?;
    }
    if let Some(shading) = &isp_params.lens_shading {
        image = isp::lens_shading_correction(&image, shading)?;
    }
    if isp_params.denoise {
        image = isp::denoise(&image)?;
    }
    if let Some(percent) = isp_params.auto_white_balance {
        image = isp::auto_white_balance(&image, percent)?;
    }

    log::info!(
        "{} simulation done: {}x{}, CFA {}, {}",
        depth,
        params.width,
        params.height,
        cfa.tile_string(),
        options.orientation
    );

    Ok(SimulationOutput {
        bit_depth: depth,
        scene: scene.clone(),
        raw: sensor.grid().clone(),
        image,
        weight_report: Arc::clone(weight_report),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SimulationParams {
        SimulationParams {
            width: 16,
            height: 12,
            seed: Some(5),
            ..SimulationParams::default()
        }
    }

    #[test]
    fn defaults_match_reference_setup() {
        let p = SimulationParams::default();
        assert_eq!((p.width, p.height, p.bit_depth), (640, 480, 16));
        assert_eq!(p.cfa_tile, "RCCB");
        assert_eq!(p.orientation_name(), "RCCB");
        assert_eq!(p.noise_sigma, 0.5);
    }

    #[test]
    fn seeded_simulation_is_deterministic() {
        let a = simulate(&small()).unwrap();
        let b = simulate(&small()).unwrap();
        assert_eq!(a.raw, b.raw);
        assert_eq!(a.image, b.image);
        assert_eq!((a.image.width(), a.image.height()), (16, 12));
    }

    #[test]
    fn bad_weights_do_not_abort() {
        let params = SimulationParams {
            color_weights: vec!["R:0.5".into(), "Q:2".into()],
            ..small()
        };
        let out = simulate(&params).unwrap();
        assert_eq!(out.weight_report.applied.len(), 1);
        assert_eq!(out.weight_report.rejected.len(), 1);
    }

    #[test]
    fn bad_tile_and_depth_are_fatal() {
        let params = SimulationParams {
            cfa_tile: "RGB".into(),
            ..small()
        };
        assert!(simulate(&params).is_err());
        let params = SimulationParams {
            bit_depth: 9,
            ..small()
        };
        assert!(simulate(&params).is_err());
    }

    #[test]
    fn parallel_depths_share_one_cfa() {
        let scene = ScenePattern::Gradient.generate(16, 12);
        let params = SimulationParams {
            color_weights: vec!["G:0.4".into(), "G=0.4".into()],
            ..small()
        };
        let outputs = simulate_bit_depths(&params, &scene, &[8, 12, 32]).unwrap();
        let depths: Vec<u32> = outputs.iter().map(|o| o.bit_depth.bits()).collect();
        assert_eq!(depths, vec![8, 12, 32]);
        for out in &outputs {
            assert_eq!(out.image.bit_depth(), out.bit_depth);
            assert_eq!(out.raw.len(), 16 * 12);
            assert_eq!(out.weight_report.applied.len(), 1);
            assert_eq!(out.weight_report.rejected.len(), 1);
            assert!(Arc::ptr_eq(&out.weight_report, &outputs[0].weight_report));
        }
        assert!(simulate_bit_depths(&small(), &scene, &[8, 7]).is_err());
    }

    #[test]
    fn external_scene_must_match_sensor() {
        assert!(simulate_scene(&small(), &Scene::uniform(16, 12, 0.5)).is_ok());
        assert!(simulate_scene(&small(), &Scene::uniform(8, 8, 0.5)).is_err());
    }

    #[test]
    fn isp_stages_run() {
        let params = SimulationParams {
            noise_sigma: 0.0,
            isp: IspParams {
                black_level: 64.0,
                lens_shading: Some(Scene::uniform(16, 12, 1.0)),
                denoise: true,
                auto_white_balance: Some(1.0),
            },
            ..small()
        };
        let out = simulate(&params).unwrap();
        assert_eq!(out.image.to_rgb_f64().len(), 16 * 12);
    }
}
