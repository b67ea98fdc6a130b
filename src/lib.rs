//! # pdf2img-client
//!
//! Client for a PDF-to-image conversion service. The server does the
//! rasterising; this crate does everything around it: validate the chosen
//! file, upload it, request the conversion, render the page list, and fetch
//! the images (or one archive of all of them).
//!
//! ## Flow
//!
//! ```text
//! select file ─▶ validate (type, ≤ 20 MiB)
//!                   │
//! convert ─────▶ POST /upload ─▶ POST /convert ─▶ render page cards
//!                   │                 │
//!                   └── error ────────┴──▶ banner (auto-hides after 5 s)
//!
//! download ────▶ GET /download/{filename} ─▶ file on disk
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img_client::{App, ClientConfig, HttpApi, SelectedFile};
//! # use pdf2img_client::{ConversionOptions, ResultItem, Theme, View};
//! # use std::sync::Arc;
//! # struct Silent;
//! # impl View for Silent {
//! #     fn apply_theme(&self, _: Theme) {}
//! #     fn show_file_preview(&self, _: &SelectedFile) {}
//! #     fn hide_file_preview(&self) {}
//! #     fn set_options_visible(&self, _: bool) {}
//! #     fn read_options(&self) -> ConversionOptions { ConversionOptions::default() }
//! #     fn set_loading(&self, _: bool) {}
//! #     fn clear_results(&self) {}
//! #     fn set_archive_control(&self, _: Option<&str>) {}
//! #     fn append_result_item(&self, _: &ResultItem) {}
//! #     fn set_results_visible(&self, _: bool) {}
//! #     fn show_error(&self, _: &str) {}
//! #     fn hide_error(&self) {}
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://127.0.0.1:5000")
//!         .download_dir("pages")
//!         .build()?;
//!     let api = HttpApi::new(&config)?;
//!     let prefs = Arc::new(prefs_store::MemoryStore::new());
//!     let app = App::new(config, api, Arc::new(Silent), prefs);
//!
//!     app.select_file(SelectedFile::from_path("document.pdf").await?)?;
//!     let result = app.convert().await?;
//!     println!("{} pages", result.page_count());
//!     app.download_pages().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod app;
pub mod config;
pub mod convert;
pub mod download;
pub mod error;
pub mod intake;
pub mod notifier;
pub mod results;
pub mod session;
pub mod theme;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::{download_path, ConversionApi, HttpApi};
pub use app::App;
pub use config::{ClientConfig, ClientConfigBuilder, ConversionOptions, OutputFormat};
pub use error::{ApiError, ClientError};
pub use intake::{validate_file, FileContent, SelectedFile};
pub use notifier::ErrorNotifier;
pub use results::{display_results, ResultItem, ResultsModel};
pub use session::{ConversionResult, Phase, UiState};
pub use theme::Theme;
pub use view::{UiEvent, View};
