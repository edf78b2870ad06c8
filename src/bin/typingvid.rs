use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "typingvid",
    version,
    about = "Render a typing animation on an on-screen keyboard (MP4 or GIF)"
)]
struct Cli {
    /// Text to type.
    #[arg(
        short,
        long,
        required_unless_present_any = ["list_layouts", "list_themes"]
    )]
    text: Option<String>,

    /// Keyboard layout: built-in name or path to a layout JSON file.
    #[arg(short, long, default_value = "en")]
    layout: String,

    /// Output file; `.mp4` (requires `ffmpeg` on PATH) or `.gif`.
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Theme: built-in name or path to a theme JSON file.
    #[arg(long, default_value = "light")]
    theme: String,

    /// Keystroke events per second.
    #[arg(short, long, default_value_t = 5.0)]
    speed: f64,

    /// Frame rate of MP4 output.
    #[arg(long, default_value_t = 24)]
    fps: u32,

    /// What to do with characters the layout cannot type.
    #[arg(long, value_enum, default_value_t = Unsupported::Fail)]
    unsupported: Unsupported,

    /// Hide the typed-text display above the keyboard.
    #[arg(long)]
    no_display: bool,

    /// Invert the colors of the rendered frames.
    #[arg(long)]
    invert_colors: bool,

    /// Lowercase the text before typing it.
    #[arg(long)]
    force_lowercase: bool,

    /// Seconds the last frame stays on screen after the final keystroke.
    #[arg(long, default_value_t = 0.0)]
    end_hold: f64,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Fail instead of replacing an existing output file.
    #[arg(long)]
    no_overwrite: bool,

    /// List the built-in layouts and exit.
    #[arg(long)]
    list_layouts: bool,

    /// List the built-in themes and exit.
    #[arg(long)]
    list_themes: bool,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Unsupported {
    /// Abort on the first character the layout cannot type.
    Fail,
    /// Drop such characters and keep going.
    Skip,
}

impl From<Unsupported> for typingvid::UnsupportedPolicy {
    fn from(v: Unsupported) -> Self {
        match v {
            Unsupported::Fail => Self::Fail,
            Unsupported::Skip => Self::Skip,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_layouts || cli.list_themes {
        if cli.list_layouts {
            cmd_list_layouts()?;
        }
        if cli.list_themes {
            cmd_list_themes();
        }
        return Ok(());
    }

    cmd_render(cli)
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn cmd_list_layouts() -> anyhow::Result<()> {
    for name in typingvid::builtin_layout_names() {
        let layout = typingvid::Layout::builtin(name)
            .with_context(|| format!("load built-in layout '{name}'"))?;
        println!(
            "{name:<6} {} ({} characters)",
            layout.description(),
            layout.supported_chars().len()
        );
    }
    Ok(())
}

fn cmd_list_themes() {
    for name in typingvid::builtin_theme_names() {
        println!("{name}");
    }
}

fn cmd_render(cli: Cli) -> anyhow::Result<()> {
    if !cli.end_hold.is_finite() || cli.end_hold < 0.0 {
        anyhow::bail!("--end-hold must be a non-negative number of seconds");
    }
    let end_hold = Duration::try_from_secs_f64(cli.end_hold).context("--end-hold")?;

    let req = typingvid::RenderRequest {
        text: cli.text.unwrap_or_default(),
        out_path: cli.output.clone(),
        layout: cli.layout,
        theme: cli.theme,
        speed: cli.speed,
        fps: cli.fps,
        policy: cli.unsupported.into(),
        display: !cli.no_display,
        invert_colors: cli.invert_colors,
        force_lowercase: cli.force_lowercase,
        end_hold,
        font_dirs: cli.font_dirs,
        overwrite: !cli.no_overwrite,
    };

    let stats = typingvid::render_video(&req)
        .with_context(|| format!("render '{}'", cli.output.display()))?;
    tracing::info!(
        frames = stats.frames,
        rasterized = stats.rasterized,
        seconds = stats.duration.as_secs_f64(),
        "done"
    );
    if stats.skipped > 0 {
        eprintln!("skipped {} unsupported character(s)", stats.skipped);
    }

    eprintln!("wrote {}", cli.output.display());
    Ok(())
}
