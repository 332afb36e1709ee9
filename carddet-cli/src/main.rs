use carddet::{
    Detection, Detector, DetectorConfig, FeatureMapSpec, ImageSize, PriorBank, PriorConfig,
    Variances,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "carddet CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ImageSizeJson {
    width: u32,
    height: u32,
}

impl Default for ImageSizeJson {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeatureMapJson {
    size: usize,
    shrinkage: u32,
    box_min: f32,
    box_max: f32,
    aspect_ratios: Vec<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PriorConfigJson {
    image_width: u32,
    image_height: u32,
    feature_maps: Vec<FeatureMapJson>,
}

impl Default for PriorConfigJson {
    fn default() -> Self {
        let cfg = PriorConfig::default();
        Self {
            image_width: cfg.image_width,
            image_height: cfg.image_height,
            feature_maps: cfg
                .feature_maps
                .into_iter()
                .map(|map| FeatureMapJson {
                    size: map.size,
                    shrinkage: map.shrinkage,
                    box_min: map.box_min,
                    box_max: map.box_max,
                    aspect_ratios: map.aspect_ratios,
                })
                .collect(),
        }
    }
}

impl From<PriorConfigJson> for PriorConfig {
    fn from(value: PriorConfigJson) -> Self {
        Self {
            image_width: value.image_width,
            image_height: value.image_height,
            feature_maps: value
                .feature_maps
                .into_iter()
                .map(|map| FeatureMapSpec {
                    size: map.size,
                    shrinkage: map.shrinkage,
                    box_min: map.box_min,
                    box_max: map.box_max,
                    aspect_ratios: map.aspect_ratios,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectorConfigJson {
    center_variance: f32,
    size_variance: f32,
    prob_threshold: f32,
    iou_threshold: f32,
    candidate_size: usize,
    top_k: usize,
    parallel: bool,
}

impl Default for DetectorConfigJson {
    fn default() -> Self {
        let cfg = DetectorConfig::default();
        Self {
            center_variance: cfg.variances.center,
            size_variance: cfg.variances.size,
            prob_threshold: cfg.prob_threshold,
            iou_threshold: cfg.iou_threshold,
            candidate_size: cfg.candidate_size,
            top_k: cfg.top_k,
            parallel: cfg.parallel,
        }
    }
}

impl From<DetectorConfigJson> for DetectorConfig {
    fn from(value: DetectorConfigJson) -> Self {
        Self {
            variances: Variances {
                center: value.center_variance,
                size: value.size_variance,
            },
            prob_threshold: value.prob_threshold,
            iou_threshold: value.iou_threshold,
            candidate_size: value.candidate_size,
            top_k: value.top_k,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    regressions_path: String,
    scores_path: String,
    output_path: Option<String>,
    image: ImageSizeJson,
    priors: PriorConfigJson,
    detector: DetectorConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regressions_path: String::new(),
            scores_path: String::new(),
            output_path: None,
            image: ImageSizeJson::default(),
            priors: PriorConfigJson::default(),
            detector: DetectorConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    label: usize,
    confidence: f32,
    xmin: f32,
    ymin: f32,
    xmax: f32,
    ymax: f32,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        Self {
            label: value.label,
            confidence: value.confidence,
            xmin: value.bbox.xmin,
            ymin: value.bbox.ymin,
            xmax: value.bbox.xmax,
            ymax: value.bbox.ymax,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    detections: Vec<DetectionRecord>,
}

fn load_tensor(path: &str) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("carddet=debug".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.regressions_path.is_empty() || config.scores_path.is_empty() {
        return Err("regressions_path and scores_path must be set in the config".into());
    }

    let regressions = load_tensor(&config.regressions_path)?;
    let scores = load_tensor(&config.scores_path)?;

    let bank = PriorBank::new(config.priors.into())?;
    let detector = Detector::new(bank).with_config(config.detector.into());
    detector.warm_up();

    let image = ImageSize {
        width: config.image.width,
        height: config.image.height,
    };
    let detections = detector.detect(&regressions, &scores, image)?;

    let output = Output {
        detections: detections.into_iter().map(DetectionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
