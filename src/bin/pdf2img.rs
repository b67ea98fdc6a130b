//! CLI binary for pdf2img-client.
//!
//! A terminal display surface over the library: flags become the option
//! controls, the spinner is the loading indicator, stderr is the error
//! banner, and the page cards are printed to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2img_client::theme::detect_system_theme;
use pdf2img_client::{
    App, ClientConfig, ConversionOptions, HttpApi, OutputFormat, ResultItem, ResultsModel,
    SelectedFile, Theme, View,
};
use prefs_store::{FileStore, KeyValueStore, MemoryStore};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

/// Colour roles, resolved to an SGR code per theme.
#[derive(Clone, Copy)]
enum Role {
    Accent,
    Ok,
    Err,
    Muted,
}

fn sgr(theme: Theme, role: Role) -> &'static str {
    match (theme, role) {
        (Theme::Dark, Role::Accent) => "96",
        (Theme::Dark, Role::Ok) => "92",
        (Theme::Dark, Role::Err) => "91",
        (Theme::Dark, Role::Muted) => "37",
        (Theme::Light, Role::Accent) => "34",
        (Theme::Light, Role::Ok) => "32",
        (Theme::Light, Role::Err) => "31",
        (Theme::Light, Role::Muted) => "2",
    }
}

fn paint(theme: Theme, role: Role, s: &str) -> String {
    format!("\x1b[{}m{s}\x1b[0m", sgr(theme, role))
}

fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

fn human_size(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    if bytes as f64 >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

// ── Terminal view ────────────────────────────────────────────────────────────

/// Terminal display surface: stderr for status, stdout for the page list.
struct TerminalView {
    /// Option controls, fixed by the command-line flags.
    options: ConversionOptions,
    theme: Mutex<Theme>,
    spinner: Mutex<Option<ProgressBar>>,
    quiet: bool,
    /// Page cards go to the JSON document instead of the terminal.
    json: bool,
}

impl TerminalView {
    fn new(options: ConversionOptions, quiet: bool, json: bool) -> Self {
        Self {
            options,
            theme: Mutex::new(Theme::default()),
            spinner: Mutex::new(None),
            quiet,
            json,
        }
    }

    fn theme(&self) -> Theme {
        *self.theme.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn status(&self, line: String) {
        if self.quiet {
            return;
        }
        match self.spinner.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl View for TerminalView {
    fn apply_theme(&self, theme: Theme) {
        *self.theme.lock().unwrap_or_else(|e| e.into_inner()) = theme;
    }

    fn show_file_preview(&self, file: &SelectedFile) {
        let t = self.theme();
        self.status(format!(
            "{} {}  {}",
            paint(t, Role::Accent, "◆"),
            bold(file.name()),
            paint(t, Role::Muted, &human_size(file.size())),
        ));
    }

    fn hide_file_preview(&self) {}

    fn set_options_visible(&self, visible: bool) {
        if visible {
            let t = self.theme();
            self.status(format!(
                "  {}",
                paint(
                    t,
                    Role::Muted,
                    &format!(
                        "format {} · {} DPI · archive {}",
                        self.options.format(),
                        self.options.dpi(),
                        if self.options.zip() { "on" } else { "off" }
                    )
                )
            ));
        }
    }

    fn read_options(&self) -> ConversionOptions {
        self.options
    }

    fn set_loading(&self, loading: bool) {
        let mut slot = self.spinner.lock().unwrap_or_else(|e| e.into_inner());
        if loading {
            if self.quiet || slot.is_some() {
                return;
            }
            let bar = ProgressBar::new_spinner();
            let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
            bar.set_style(style);
            bar.set_prefix("Converting");
            bar.set_message("uploading and rasterising…");
            bar.enable_steady_tick(Duration::from_millis(80));
            *slot = Some(bar);
        } else if let Some(bar) = slot.take() {
            bar.finish_and_clear();
        }
    }

    fn clear_results(&self) {}

    fn set_archive_control(&self, archive: Option<&str>) {
        if self.json {
            return;
        }
        if let Some(name) = archive {
            let t = self.theme();
            println!("{}  {}", paint(t, Role::Accent, "All pages"), name);
        }
    }

    fn append_result_item(&self, item: &ResultItem) {
        if self.json {
            return;
        }
        let t = self.theme();
        println!(
            "{:<9}  {}  {}",
            paint(t, Role::Ok, &item.label()),
            item.filename,
            paint(t, Role::Muted, &item.download_path),
        );
    }

    fn set_results_visible(&self, _visible: bool) {}

    fn show_error(&self, message: &str) {
        let t = self.theme();
        let line = format!("{} {}", paint(t, Role::Err, "✗"), paint(t, Role::Err, message));
        // The banner is never suppressed, even with --quiet.
        match self.spinner.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn hide_error(&self) {}
}

// ── CLI ──────────────────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert to PNG at 150 DPI and save every page into ./pages
  pdf2img document.pdf -o pages

  # JPEG at 300 DPI, one zip archive instead of separate pages
  pdf2img --format jpeg --dpi 300 --zip scan.pdf

  # Only list the produced files, do not download them
  pdf2img --no-download --json report.pdf

  # Talk to a remote server and purge its storage afterwards
  pdf2img --server https://convert.example.com report.pdf --cleanup

  # Switch between light and dark terminal colours (remembered)
  pdf2img --toggle-theme

LIMITS:
  Only PDF files up to 20 MB are accepted.

ENVIRONMENT VARIABLES:
  PDF2IMG_SERVER      Conversion server root URL
  PDF2IMG_PREFS_DIR   Directory holding prefs.json (theme preference)
  PDF2IMG_THEME       Force the detected system theme (dark, light)
  COLORFGBG           Terminal colours, used to detect a dark background
"#;

/// Convert PDF files to images through a pdf2img conversion server.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert PDF files to PNG/JPEG images through a conversion server",
    long_about = "Upload a PDF to a pdf2img conversion server, rasterise every page to PNG or \
JPEG at the chosen DPI, and download the pages (or a single zip archive of them).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    input: Option<PathBuf>,

    /// Conversion server root URL.
    #[arg(long, env = "PDF2IMG_SERVER", default_value = pdf2img_client::config::DEFAULT_BASE_URL)]
    server: String,

    /// Output image format.
    #[arg(short, long, env = "PDF2IMG_FORMAT", value_enum, default_value = "png")]
    format: FormatArg,

    /// Rendering resolution in DPI.
    #[arg(long, env = "PDF2IMG_DPI", default_value_t = pdf2img_client::config::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// Ask the server to package all pages into one zip archive.
    #[arg(long, env = "PDF2IMG_ZIP")]
    zip: bool,

    /// Directory downloads are saved into.
    #[arg(short, long, env = "PDF2IMG_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Convert and list the results without downloading anything.
    #[arg(long, env = "PDF2IMG_NO_DOWNLOAD")]
    no_download: bool,

    /// Purge uploads and outputs on the server when done.
    #[arg(long)]
    cleanup: bool,

    /// Flip the remembered light/dark preference.
    #[arg(long)]
    toggle_theme: bool,

    /// Print the result list as JSON on stdout.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Per-request timeout in seconds (default: none).
    #[arg(long, env = "PDF2IMG_TIMEOUT")]
    timeout: Option<u64>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpeg => OutputFormat::Jpeg,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and the page list carry the user-facing feedback; library
    // INFO logs only show up on request.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Preferences ──────────────────────────────────────────────────────
    let prefs: Arc<dyn KeyValueStore> = match FileStore::open_default() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Preferences unavailable, theme will not be remembered: {}", e);
            Arc::new(MemoryStore::new())
        }
    };

    // ── Build config ─────────────────────────────────────────────────────
    let options = ConversionOptions::new(cli.format.clone().into(), cli.dpi, cli.zip)
        .context("Invalid conversion options")?;

    let mut builder = ClientConfig::builder()
        .base_url(cli.server.clone())
        .download_dir(cli.output.clone());
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    let config = builder.build().context("Invalid configuration")?;
    let api = HttpApi::new(&config).context("Failed to build HTTP client")?;

    let view = Arc::new(TerminalView::new(options, cli.quiet, cli.json));
    let app = App::new(config, api, Arc::clone(&view), prefs);

    app.init_theme(detect_system_theme(|key| std::env::var(key).ok()));

    if cli.toggle_theme {
        let theme = app.toggle_theme();
        view.status(format!("Theme: {}", bold(theme.as_str())));
    }

    // ── Select & convert ─────────────────────────────────────────────────
    let Some(input) = cli.input.as_ref() else {
        if cli.cleanup && app.cleanup().await.is_err() {
            return Ok(ExitCode::FAILURE);
        }
        return Ok(ExitCode::SUCCESS);
    };

    let file = SelectedFile::from_path(input)
        .await
        .with_context(|| format!("Failed to open {}", input.display()))?;

    // Rejections and conversion failures were already shown on the banner.
    if app.select_file(file).is_err() {
        return Ok(ExitCode::FAILURE);
    }
    let Ok(result) = app.convert().await else {
        return Ok(ExitCode::FAILURE);
    };

    if cli.json {
        let model = ResultsModel::from_result(&result);
        println!(
            "{}",
            serde_json::to_string_pretty(&model).context("Failed to serialise results")?
        );
    }

    // ── Download ─────────────────────────────────────────────────────────
    if !cli.no_download {
        let saved = if result.archive.is_some() {
            app.download_all()
                .await
                .context("Download failed")?
                .into_iter()
                .collect::<Vec<_>>()
        } else {
            app.download_pages().await.context("Download failed")?
        };

        let t = view.theme();
        for path in &saved {
            view.status(format!(
                "  {} {}",
                paint(t, Role::Ok, "✓"),
                path.display()
            ));
        }
        view.status(format!(
            "{} {} page(s) converted, {} file(s) saved to {}",
            paint(t, Role::Ok, "✔"),
            bold(&result.page_count().to_string()),
            saved.len(),
            bold(&app.config().download_dir.display().to_string()),
        ));
    }

    if cli.cleanup && app.cleanup().await.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
