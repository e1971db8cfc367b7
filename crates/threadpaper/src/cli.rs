use std::path::PathBuf;

use clap::Parser;
use threadconfig::MAX_LINE_COUNT;

#[derive(Parser, Debug)]
#[command(
    name = "threadpaper",
    author,
    version,
    about = "Animated thread field background",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Configuration file; defaults to `threadpaper.toml` in the user config directory.
    #[arg(long, value_name = "FILE", env = "THREADPAPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Vertical wander of the threads (0 draws straight lines).
    #[arg(long, value_name = "AMOUNT", allow_negative_numbers = true)]
    pub amplitude: Option<f32>,

    /// How far apart the threads fan out vertically.
    #[arg(long, value_name = "AMOUNT", allow_negative_numbers = true)]
    pub distance_skew: Option<f32>,

    /// Let the pointer bend the field.
    #[arg(long, overrides_with = "no_pointer")]
    pub pointer: bool,

    /// Keep the field still under the pointer, even if the config enables it.
    #[arg(long, overrides_with = "pointer")]
    pub no_pointer: bool,

    /// Number of threads to draw (1-128).
    #[arg(
        long,
        value_name = "COUNT",
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_LINE_COUNT))
    )]
    pub lines: Option<u32>,

    /// Window or export size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Render one still frame on the CPU to the provided PNG path, then exit.
    #[arg(long, value_name = "PATH", value_parser = parse_export_path)]
    pub export: Option<PathBuf>,

    /// Animation time (seconds) to evaluate for `--export`.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0, value_parser = parse_time)]
    pub time: f32,
}

impl Cli {
    /// `Some` when `--pointer` or `--no-pointer` was given; the last one wins.
    pub fn pointer_override(&self) -> Option<bool> {
        match (self.pointer, self.no_pointer) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("size must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_export_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => Ok(path),
        None => Err("export path has no extension; expected .png".to_string()),
        Some(other) => Err(format!(
            "unsupported export format '.{other}'; expected .png"
        )),
    }
}

fn parse_time(value: &str) -> Result<f32, String> {
    let seconds: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid time '{value}'"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err("time must be a non-negative number of seconds".into());
    }
    Ok(seconds)
}
