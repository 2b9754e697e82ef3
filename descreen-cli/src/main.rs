mod styles;

use anyhow::{Context, Result};
use clap::Parser;
use descreen::PostprocessConfig;
use std::{path::PathBuf, time::Instant};
use styles::StyleBook;

/// An fft-based descreen filter
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Image to read
    input: PathBuf,

    /// Where to write the result, the format follows the extension
    output: PathBuf,

    /// Do not apply FFT filter
    #[arg(long)]
    nofft: bool,

    /// Threshold level for normalized magnitude spectrum [default: 92]
    #[arg(short, long)]
    thresh: Option<f64>,

    /// Radius to expand the area of mask pixels [default: 6]
    #[arg(short, long)]
    radius: Option<u32>,

    /// Ratio for middle preservation [default: 4]
    #[arg(short, long)]
    middle: Option<u32>,

    /// Contrast adjustment, 1.0 for none [default: 1.05]
    #[arg(short, long)]
    contrast: Option<f64>,

    /// Output length of image, <= 0 for no resize [default: 1024]
    #[arg(short, long, allow_negative_numbers = true)]
    length: Option<f64>,

    /// TOML file with per-style overrides
    #[arg(long, requires = "style")]
    styles: Option<PathBuf>,

    /// Style to take overrides from
    #[arg(long, requires = "styles")]
    style: Option<String>,
}

impl Args {
    /// Defaults, then the selected style, then flags given on the command line.
    fn resolve_config(&self) -> Result<PostprocessConfig> {
        let mut config = PostprocessConfig::new();

        if let (Some(path), Some(name)) = (&self.styles, &self.style) {
            let book = StyleBook::load(path)?;
            config = book.get(name)?.merge(config);
            log::info!("using style `{name}` from {}", path.display());
        }

        if self.nofft {
            config = config.with_apply_filter(false);
        }
        if let Some(v) = self.thresh {
            config = config.with_threshold(v);
        }
        if let Some(v) = self.radius {
            config = config.with_dilation_radius(v);
        }
        if let Some(v) = self.middle {
            config = config.with_middle_ratio(v);
        }
        if let Some(v) = self.contrast {
            config = config.with_contrast_factor(v);
        }
        if let Some(v) = self.length {
            config = config.with_target_length(v);
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    log::info!("{config:?}");

    let img = image::open(&args.input)
        .with_context(|| format!("decode {} failed", args.input.display()))?;
    log::info!(
        "loaded {} ({}x{}, {:?})",
        args.input.display(),
        img.width(),
        img.height(),
        img.color()
    );

    let now = Instant::now();
    let img = descreen::postprocess(img, &config)
        .with_context(|| format!("process {} failed", args.input.display()))?;
    log::info!(
        "postprocess: {}ms, output {}x{}",
        now.elapsed().as_millis(),
        img.width(),
        img.height()
    );

    img.save(&args.output)
        .with_context(|| format!("save {} failed", args.output.display()))?;
    log::info!("saved {}", args.output.display());

    Ok(())
}
