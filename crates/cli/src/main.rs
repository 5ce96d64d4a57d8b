use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use bgs_core::pipeline::evaluate_algorithm_use_case::{EvaluateAlgorithmUseCase, EvaluationReport};
use bgs_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use bgs_core::pipeline::subtract_sequence_use_case::SubtractSequenceUseCase;
use bgs_core::shared::constants::{
    DEFAULT_ALGORITHM, DEFAULT_EXTENSION, DEFAULT_FRAMES_DIR, DEFAULT_GROUNDTRUTH_DIR,
    IMAGE_EXTENSIONS,
};
use bgs_core::shared::params::ParameterMap;
use bgs_core::subtraction::domain::background_subtractor::BackgroundSubtractor;
use bgs_core::subtraction::domain::registry::Registry;
use bgs_core::video::infrastructure::image_file_writer::ImageFileWriter;
use bgs_core::video::infrastructure::image_sequence_reader::{ColorMode, ImageSequenceReader};

/// Background subtraction for image sequences.
#[derive(Parser)]
#[command(name = "bgs", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered algorithm names.
    List,

    /// Print an algorithm's parameters, after applying any --param overrides.
    Params {
        /// Algorithm name.
        algorithm: String,

        /// Parameter override as key=value (repeatable).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Score an algorithm against ground-truth masks.
    Evaluate {
        #[arg(long, default_value = DEFAULT_ALGORITHM)]
        algorithm: String,

        /// Dataset root holding the frames and ground-truth directories.
        #[arg(long)]
        dataset: PathBuf,

        /// Frames directory, relative to the dataset root.
        #[arg(long, default_value = DEFAULT_FRAMES_DIR)]
        frames: PathBuf,

        /// Ground-truth directory, relative to the dataset root.
        #[arg(long, default_value = DEFAULT_GROUNDTRUTH_DIR)]
        groundtruth: PathBuf,

        /// Image file extension of frames and masks.
        #[arg(long, default_value = DEFAULT_EXTENSION)]
        extension: String,

        #[arg(long, value_enum, default_value_t = ColorArg::Gray)]
        color: ColorArg,

        /// Parameter override as key=value (repeatable).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write the foreground mask of every frame in a directory.
    Subtract {
        #[arg(long, default_value = DEFAULT_ALGORITHM)]
        algorithm: String,

        /// Directory of input frames.
        #[arg(long)]
        input: PathBuf,

        /// Directory for masks and background models.
        #[arg(long)]
        output: PathBuf,

        /// Image file extension of input frames.
        #[arg(long, default_value = DEFAULT_EXTENSION)]
        extension: String,

        #[arg(long, value_enum, default_value_t = ColorArg::Rgb)]
        color: ColorArg,

        /// Parameter override as key=value (repeatable).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Also write each frame's background model.
        #[arg(long)]
        save_background: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
    Gray,
    Rgb,
}

impl From<ColorArg> for ColorMode {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Gray => ColorMode::Gray,
            ColorArg::Rgb => ColorMode::Rgb,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let registry = Registry::with_builtin();

    match cli.command {
        Command::List => {
            for name in registry.names() {
                println!("{name}");
            }
        }
        Command::Params { algorithm, params } => {
            let subtractor = build_subtractor(&registry, &algorithm, params)?;
            for (key, value) in subtractor.params() {
                println!("{key}={value}");
            }
        }
        Command::Evaluate {
            algorithm,
            dataset,
            frames,
            groundtruth,
            extension,
            color,
            params,
            json,
        } => {
            validate_extension(&extension)?;
            let subtractor = build_subtractor(&registry, &algorithm, params)?;
            let report = run_evaluation(
                subtractor,
                &dataset.join(frames),
                &dataset.join(groundtruth),
                &extension,
                color.into(),
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Subtract {
            algorithm,
            input,
            output,
            extension,
            color,
            params,
            save_background,
        } => {
            validate_extension(&extension)?;
            if !input.is_dir() {
                return Err(format!("Input directory not found: {}", input.display()).into());
            }
            let subtractor = build_subtractor(&registry, &algorithm, params)?;
            let mut use_case = SubtractSequenceUseCase::new(
                Box::new(ImageSequenceReader::new(&extension, color.into())),
                Box::new(ImageFileWriter::new()),
                subtractor,
                Box::new(StdoutPipelineLogger::default()),
                save_background,
            );
            let summary = use_case.execute(&input, &output)?;
            log::info!(
                "Output written to {} ({} frames)",
                output.display(),
                summary.frames
            );
        }
    }

    Ok(())
}

fn build_subtractor(
    registry: &Registry,
    algorithm: &str,
    params: Vec<(String, String)>,
) -> Result<Box<dyn BackgroundSubtractor>, Box<dyn std::error::Error>> {
    let mut subtractor = registry.create(algorithm)?;
    if !params.is_empty() {
        let map: ParameterMap = params.into_iter().collect();
        subtractor.set_params(&map)?;
    }
    Ok(subtractor)
}

fn run_evaluation(
    subtractor: Box<dyn BackgroundSubtractor>,
    frames_dir: &Path,
    groundtruth_dir: &Path,
    extension: &str,
    color: ColorMode,
) -> Result<EvaluationReport, Box<dyn std::error::Error>> {
    for dir in [frames_dir, groundtruth_dir] {
        if !dir.is_dir() {
            return Err(format!("Directory not found: {}", dir.display()).into());
        }
    }
    let mut use_case = EvaluateAlgorithmUseCase::new(
        Box::new(ImageSequenceReader::new(extension, color)),
        Box::new(ImageSequenceReader::new(extension, ColorMode::Gray)),
        subtractor,
        Box::new(StdoutPipelineLogger::default()),
    );
    use_case.execute(frames_dir, groundtruth_dir)
}

fn print_report(report: &EvaluationReport) {
    let m = &report.matrix;
    println!("Algorithm: {}", report.algorithm);
    println!("Frames:    {}", report.frames);
    println!("TP: {}  FP: {}  TN: {}  FN: {}", m.tp, m.fp, m.tn, m.fn_);
    println!("Recall:    {}", format_ratio(report.recall));
    println!("Precision: {}", format_ratio(report.precision));
    println!("F-score:   {}", format_ratio(report.f_score));
}

fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

fn validate_extension(extension: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ext = extension.trim_start_matches('.').to_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(format!(
            "Unsupported image extension '{extension}', expected one of: {}",
            IMAGE_EXTENSIONS.join(", ")
        )
        .into())
    }
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
