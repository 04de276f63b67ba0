use clap::{Parser, Subcommand};
use cli::TraceConfig;
use color_eyre::eyre::{Result, eyre};
use contour::{
    Bitmap, ComputedContours, ContourTracer, PixelOrigin, Simplification, raster::open_luma,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace the class boundaries of a label image into GeoJSON
    Trace {
        /// Path to a TOML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Label image; luma values are class ids
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// GeoJSON output path (standard output when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Number of classes to trace
        #[arg(long)]
        classes: Option<usize>,
        /// Binarize at this luma level and trace a single class
        #[arg(long)]
        threshold: Option<u8>,
        /// Vertex policy: none, simple or rdp
        #[arg(long)]
        simplification: Option<Simplification>,
        /// Maximum deviation of dropped vertices with rdp simplification
        #[arg(long)]
        rdp_max_error: Option<f32>,
        /// Output coordinate origin: corner or center
        #[arg(long)]
        pixel_origin: Option<PixelOrigin>,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Trace {
            config,
            input,
            output,
            classes,
            threshold,
            simplification,
            rdp_max_error,
            pixel_origin,
        } => {
            let mut job = match config {
                Some(path) => TraceConfig::from_file(&path)?,
                None => TraceConfig::default(),
            };
            // command line flags override the file
            job.input = input.or(job.input);
            job.output = output.or(job.output);
            job.classes = classes.or(job.classes);
            job.threshold = threshold.or(job.threshold);
            if let Some(simplification) = simplification {
                job.contour.simplification = simplification;
            }
            if let Some(max_error) = rdp_max_error {
                job.contour.rdp_max_error = max_error;
            }
            if let Some(origin) = pixel_origin {
                job.contour.pixel_origin = origin;
            }
            run_trace(&job)?;
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(TraceConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn run_trace(job: &TraceConfig) -> Result<()> {
    let input = job.input_path()?;
    let tracer = ContourTracer::new(job.contour.clone())?;
    info!(
        "Tracing {:?} with {} simplification",
        input, job.contour.simplification
    );

    let image = open_luma(input)?;
    let result = match job.threshold {
        Some(threshold) => {
            if job.classes.is_some() {
                warn!("--classes is ignored when --threshold is set");
            }
            let bitmap = Bitmap::from_luma_threshold(&image, threshold);
            let contour = tracer.trace_bitmap(&bitmap)?;
            ComputedContours {
                contours: vec![contour],
                image_width: bitmap.width(),
                image_height: bitmap.height(),
            }
        }
        None => {
            let class_count = match job.classes {
                Some(count) => count,
                None => image
                    .pixels()
                    .map(|p| usize::from(p[0]) + 1)
                    .max()
                    .ok_or_else(|| eyre!("Input image {:?} has no pixels", input))?,
            };
            tracer.trace(&image, class_count)?
        }
    };

    info!(
        "Found {} rings across {} classes",
        result.ring_count(),
        result.class_count()
    );

    match &job.output {
        Some(path) => {
            result.save_geojson(path)?;
            info!("GeoJSON saved to: {:?}", path);
        }
        None => println!("{}", result.to_geojson_string()?),
    }
    Ok(())
}
