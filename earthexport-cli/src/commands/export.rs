//! Export command - download imagery for every coordinate in a CSV file.

use clap::Args;
use earthexport::config::{ConfigFile, ACCESS_TOKEN_ENV};
use earthexport::dataset::{DatasetId, DatasetRegistry};
use earthexport::driver::BatchRunner;
use earthexport::earthengine::EarthEngineSettings;
use earthexport::export::{DateRange, ExportSettings, Exporter};
use earthexport::output::OutputMode;
use std::path::PathBuf;
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the export command.
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Path to the coordinates CSV file (longitude, latitude after a header row)
    #[arg(short = 'f', long = "filepath", default_value = "coordinates.csv")]
    pub filepath: PathBuf,

    /// Dataset to pull images from (sentinel, landsat or naip)
    #[arg(short, long, default_value = "sentinel")]
    pub dataset: DatasetId,

    /// Start date for getting images (YYYY-MM-DD)
    #[arg(short = 's', long = "start-date", default_value = "2022-03-21")]
    pub start_date: String,

    /// End date for getting images (YYYY-MM-DD, exclusive)
    #[arg(short = 'e', long = "end-date", default_value = "2022-06-20")]
    pub end_date: String,

    /// Height of output images in pixels [default: 512]
    #[arg(long)]
    pub height: Option<u32>,

    /// Width of output images in pixels [default: 512]
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Output directory
    #[arg(short, long = "output-dir", default_value = "output_images/")]
    pub output_dir: PathBuf,

    /// Also download a pan-sharpened image (Landsat only)
    #[arg(long)]
    pub sharpened: bool,

    /// Request parallel export (accepted, export always runs sequentially)
    #[arg(long, overrides_with = "no_parallel")]
    pub parallel: bool,

    /// Disable parallel export
    #[arg(long, overrides_with = "parallel")]
    pub no_parallel: bool,

    /// Number of parallel workers, if parallel export were active
    #[arg(long, default_value_t = 10)]
    pub parallel_number: usize,

    /// Download every coordinate again; the output directory must be empty
    #[arg(long)]
    pub redownload: bool,

    /// Target projection [default: EPSG:3857]
    #[arg(long)]
    pub crs: Option<String>,

    /// Earth Engine cloud project
    #[arg(long)]
    pub project: Option<String>,

    /// OAuth2 access token for Earth Engine
    #[arg(long)]
    pub access_token: Option<String>,

    /// Mirror log output to the terminal
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the export command.
pub fn run(args: ExportArgs, config_path: Option<PathBuf>) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path.as_deref(), args.dataset, args.verbose)?;
    runner.log_startup();
    let config = runner.config();

    let settings = export_settings(&args, config)?;
    let engine = engine_settings(&args, config, std::env::var(ACCESS_TOKEN_ENV).ok())?;
    info!(
        input = %args.filepath.display(),
        dataset = %args.dataset,
        dates = %settings.dates,
        height = settings.height,
        width = settings.width,
        crs = %settings.crs,
        output_dir = %settings.output_dir.display(),
        sharpen = settings.sharpen,
        redownload = args.redownload,
        "Export requested"
    );

    let mode = if args.redownload {
        OutputMode::Redownload
    } else {
        OutputMode::Resume
    };
    let driver_config = config
        .driver
        .driver_config()
        .with_parallel(args.parallel || !args.no_parallel, args.parallel_number);

    println!("Exporting {} imagery from {}", args.dataset, args.filepath.display());
    println!("  Dates: {}", settings.dates);
    println!("  Size: {}x{} px ({})", settings.width, settings.height, settings.crs);
    println!("  Output: {}", settings.output_dir.display());
    println!();

    let service = runner.create_service(engine)?;
    let exporter = Exporter::new(service, DatasetRegistry::standard(), config.retry.policy());
    let batch = BatchRunner::new(exporter, settings, driver_config);

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    let summary = runtime.block_on(batch.run(&args.filepath, mode))?;

    if summary.resumed > 0 {
        println!("Skipped {} coordinates already downloaded", summary.resumed);
    }
    println!(
        "Exported {}, no coverage {}, failed {}",
        summary.outcomes.exported, summary.outcomes.missing_bands, summary.outcomes.failed
    );
    println!("{}", summary);
    Ok(())
}

/// Combines arguments with config defaults into the per-run export settings.
fn export_settings(args: &ExportArgs, config: &ConfigFile) -> Result<ExportSettings, CliError> {
    let dates = DateRange::parse(&args.start_date, &args.end_date)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let height = args.height.unwrap_or(config.export.height);
    let width = args.width.unwrap_or(config.export.width);
    if height == 0 || width == 0 {
        return Err(CliError::InvalidArgument(
            "height and width must be positive".to_string(),
        ));
    }

    Ok(ExportSettings {
        dataset: args.dataset,
        height,
        width,
        crs: args.crs.clone().unwrap_or_else(|| config.export.crs.clone()),
        dates,
        output_dir: args.output_dir.clone(),
        sharpen: args.sharpened,
    })
}

/// Resolves project and token: flag, then environment (token only), then config.
fn engine_settings(
    args: &ExportArgs,
    config: &ConfigFile,
    env_token: Option<String>,
) -> Result<EarthEngineSettings, CliError> {
    let project = args
        .project
        .clone()
        .or_else(|| config.earthengine.project.clone())
        .ok_or_else(|| CliError::Config("no Earth Engine project configured".to_string()))?;

    let access_token = args
        .access_token
        .clone()
        .or(env_token.filter(|t| !t.trim().is_empty()))
        .or_else(|| config.earthengine.access_token.clone())
        .ok_or_else(|| CliError::Config("no Earth Engine access token available".to_string()))?;

    Ok(EarthEngineSettings {
        base_url: config.earthengine.base_url.clone(),
        project,
        access_token,
    })
}
