use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rayon::prelude::*;

use sprite_atlas::atlas::{AtlasObserver, DecodeWorker, Images, SpriteAtlas};
use sprite_atlas::cli::{CliArgs, Command, CommonArgs, ExtractArgs};
use sprite_atlas::config::{AtlasConfig, LoadedConfig, save_config, validate};
use sprite_atlas::error::SpriteError;
use sprite_atlas::output::{INDEX_FILENAME, save_sprite_image, sprite_png_filenames, write_index};
use sprite_atlas::sprite::{SpriteSheetDecoder, StyleImage};
use sprite_atlas::storage::LocalFileSource;

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        // (e.g., config loading fails before logger init)
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let (args, extract) = match &cli.command {
        Command::Init { path } => {
            init_logging(false);
            return init_config(path);
        }
        Command::Inspect(args) => (args, None),
        Command::Extract(extract) => (&extract.common, Some(extract)),
    };

    // Load config if specified and merge with CLI args
    let merged = merge_config_with_args(args)?;

    init_logging(merged.verbose);
    info!("sprite-atlas v{}", env!("CARGO_PKG_VERSION"));

    let images = load_sprite(&merged)?;
    info!("Loaded {} sprites", images.len());

    match extract {
        None => list_sprites(&images),
        Some(extract) => extract_sprites(&images, extract)?,
    }

    info!("Done!");

    Ok(())
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("refusing to overwrite existing file: {}", path.display());
    }
    save_config(&AtlasConfig::default(), path)?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Collects the single outcome of a load
#[derive(Default)]
struct LoadObserver {
    outcome: Mutex<Option<Result<Images, String>>>,
}

impl LoadObserver {
    fn take(&self) -> Option<Result<Images, String>> {
        self.outcome.lock().ok().and_then(|mut outcome| outcome.take())
    }

    fn set(&self, outcome: Result<Images, String>) {
        if let Ok(mut slot) = self.outcome.lock() {
            *slot = Some(outcome);
        }
    }
}

impl AtlasObserver for LoadObserver {
    fn on_sprite_loaded(&self, images: &Images) {
        self.set(Ok(images.clone()));
    }

    fn on_sprite_error(&self, error: &SpriteError) {
        self.set(Err(error.to_string()));
    }
}

/// Run a load to completion on this thread
fn load_sprite(merged: &MergedConfig) -> Result<Images> {
    let worker = DecodeWorker::with_threads(
        SpriteSheetDecoder::new(merged.pixel_ratio),
        merged.threads,
    )?;
    let mut atlas = SpriteAtlas::with_worker(merged.pixel_ratio, worker);
    let observer = Arc::new(LoadObserver::default());
    atlas.set_observer(&observer);

    if merged.url.is_empty() {
        info!("No sprite URL given; loading an empty sprite");
    } else {
        info!("Loading sprite {} at {}x", merged.url, merged.pixel_ratio);
    }
    atlas.load(&merged.url, &LocalFileSource::new());

    let deadline = Instant::now() + Duration::from_secs(merged.timeout_secs);
    loop {
        if let Some(outcome) = observer.take() {
            atlas.dump_debug_logs();
            return outcome
                .map_err(|message| anyhow::anyhow!(message))
                .with_context(|| format!("failed to load sprite '{}'", merged.url));
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(SpriteError::Timeout(merged.timeout_secs).into());
        }
        atlas.wait(deadline - now);
    }
}

fn sorted(images: &Images) -> Vec<(&String, &Arc<StyleImage>)> {
    let mut sorted: Vec<_> = images.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
}

fn list_sprites(images: &Images) {
    for (id, sprite) in sorted(images) {
        info!(
            "{}: {}x{} @{}x{}",
            id,
            sprite.width(),
            sprite.height(),
            sprite.pixel_ratio,
            if sprite.sdf { " (sdf)" } else { "" }
        );
    }
}

fn extract_sprites(images: &Images, args: &ExtractArgs) -> Result<()> {
    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("."));

    // Create output directory if it doesn't exist
    if !output.exists() {
        fs::create_dir_all(&output)?;
    }

    // Distinct ids may sanitize to the same name; never let two writes share a file
    let filenames = sprite_png_filenames(images.keys().map(String::as_str));
    images
        .par_iter()
        .map(|(id, sprite)| {
            save_sprite_image(sprite, &output.join(&filenames[id.as_str()]), args.compress)
        })
        .collect::<Result<Vec<_>>>()?;
    info!("Saved {} sprites to {}", images.len(), output.display());

    write_index(images, &output)?;
    info!("Generated {}", output.join(INDEX_FILENAME).display());

    Ok(())
}

/// Merged configuration from CLI args and optional config file.
struct MergedConfig {
    url: String,
    pixel_ratio: f32,
    threads: usize,
    timeout_secs: u64,
    verbose: bool,
}

/// Merge config file values with CLI arguments.
/// CLI arguments always take precedence over config values.
fn merge_config_with_args(args: &CommonArgs) -> Result<MergedConfig> {
    let loaded_config = if let Some(config_path) = &args.config {
        Some(
            LoadedConfig::load(config_path)
                .with_context(|| format!("failed to load config: {}", config_path.display()))?,
        )
    } else {
        None
    };
    let defaults = AtlasConfig::default();

    // URL: CLI > config; clap requires one of them
    let url = match (&args.url, &loaded_config) {
        (Some(url), _) => url.clone(),
        (None, Some(lc)) => lc.resolve_url(),
        (None, None) => String::new(),
    };

    let pixel_ratio = args.pixel_ratio.unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.config.pixel_ratio)
            .unwrap_or(defaults.pixel_ratio)
    });

    let threads = args.threads.unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.config.decode_threads)
            .unwrap_or(defaults.decode_threads)
    });

    let timeout_secs = args.timeout.unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.config.timeout_secs)
            .unwrap_or(defaults.timeout_secs)
    });

    // CLI overrides are checked with the same rules as config files
    validate(&AtlasConfig {
        url: url.clone(),
        pixel_ratio,
        decode_threads: threads,
        timeout_secs,
        ..defaults
    })?;

    Ok(MergedConfig {
        url,
        pixel_ratio,
        threads,
        timeout_secs,
        verbose: args.verbose,
    })
}
