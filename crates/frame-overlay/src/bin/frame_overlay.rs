use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use frame_overlay::io::OverlayJob;
use frame_overlay::raster::run_job;
use frame_overlay::{BoxForm, CategoryPalette, OverlayOptions};

#[derive(Parser, Debug)]
#[command(name = "frame-overlay", version, about = "Draw detection boxes over letterboxed frames")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one frame with its detections.
    Render(RenderArgs),
    /// Run a JSON job file.
    Job {
        config: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    #[arg(long)]
    image: PathBuf,
    #[arg(long)]
    detections: PathBuf,
    /// Container width; defaults to the image width.
    #[arg(long, requires = "height")]
    width: Option<u32>,
    /// Container height; defaults to the image height.
    #[arg(long, requires = "width")]
    height: Option<u32>,
    #[arg(long, value_enum, default_value_t = Preset::Comparison)]
    preset: Preset,
    /// Override the preset's box form.
    #[arg(long, value_enum)]
    box_form: Option<FormArg>,
    #[arg(long)]
    hide_labels: bool,
    /// Only draw these categories (repeatable).
    #[arg(long = "only")]
    only: Vec<String>,
    /// JSON palette file: `{"colors": {...}, "fallback": "#rrggbb"}`.
    #[arg(long)]
    palette: Option<PathBuf>,
    /// Also write a JSON report here.
    #[arg(long)]
    report: Option<PathBuf>,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    Comparison,
    Video,
    Sidebar,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormArg {
    Percentage,
    Absolute,
}

impl From<FormArg> for BoxForm {
    fn from(f: FormArg) -> Self {
        match f {
            FormArg::Percentage => BoxForm::Percentage,
            FormArg::Absolute => BoxForm::Absolute,
        }
    }
}

fn job_from_args(args: RenderArgs) -> Result<OverlayJob, Box<dyn std::error::Error>> {
    let mut options = match args.preset {
        Preset::Comparison => OverlayOptions::comparison_popup(),
        Preset::Video => OverlayOptions::video_marker(),
        Preset::Sidebar => OverlayOptions::detail_sidebar(),
    };
    if let Some(form) = args.box_form {
        options.box_form = form.into();
    }
    if args.hide_labels {
        options.show_labels = false;
    }
    if !args.only.is_empty() {
        options = options.only(args.only);
    }

    let palette = match args.palette {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Some(serde_json::from_str::<CategoryPalette>(&raw)?)
        }
        None => None,
    };

    let mut job = OverlayJob::new(
        args.image.to_string_lossy(),
        args.detections.to_string_lossy(),
    );
    job.container = args.width.zip(args.height).map(|(w, h)| [w, h]);
    job.output_path = Some(args.out.to_string_lossy().into_owned());
    job.report_path = args.report.map(|p| p.to_string_lossy().into_owned());
    job.options = options;
    job.palette = palette;
    Ok(job)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    #[cfg(feature = "tracing")]
    {
        frame_overlay::core::init_tracing(false);
        // No-op when the subscriber already bridged `log` records.
        let _ = tracing_log::LogTracer::builder().with_max_level(level).init();
    }
    #[cfg(not(feature = "tracing"))]
    frame_overlay::core::init_with_level(level)?;

    let job = match cli.command {
        Command::Render(args) => job_from_args(args)?,
        Command::Job { config } => {
            let mut job = OverlayJob::load_json(&config)?;
            if let Some(base) = config.parent() {
                job.resolve_paths(base);
            }
            job
        }
    };

    let report = run_job(&job)?;
    println!(
        "{}: drawn {}, filtered {}, skipped {}",
        report.output_path,
        report.summary.drawn,
        report.summary.filtered,
        report.skipped_records + report.summary.malformed
    );
    Ok(())
}
