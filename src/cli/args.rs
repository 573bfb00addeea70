use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sprite-atlas")]
#[command(version, about = "Sprite sheet loader", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load a sprite and list its images
    Inspect(CommonArgs),
    /// Load a sprite and write every image as a PNG
    Extract(ExtractArgs),
    /// Write a default config file
    Init {
        /// Path of the config file to create
        path: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Sprite base URL or path, without the .json/.png suffix
    #[arg(required_unless_present = "config")]
    pub url: Option<String>,

    /// Load settings from a config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Screen pixel ratio; values above 1 select the @2x sprite [default: 1]
    #[arg(long, value_name = "RATIO")]
    pub pixel_ratio: Option<f32>,

    /// Number of decode threads [default: 1]
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Seconds to wait for the sprite to load [default: 30]
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output directory for extracted sprites [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(CompressionLevel::Max)
        } else {
            s.parse::<u8>()
                .map_err(|_e| format!("invalid compression level: {}", s))
                .and_then(|n| {
                    if n <= 6 {
                        Ok(CompressionLevel::Level(n))
                    } else {
                        Err(format!("compression level must be 0-6 or 'max', got {}", n))
                    }
                })
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel::Level(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_level_parse() {
        assert_eq!("max".parse(), Ok(CompressionLevel::Max));
        assert_eq!("MAX".parse(), Ok(CompressionLevel::Max));
        assert_eq!("4".parse(), Ok(CompressionLevel::Level(4)));
        assert!("7".parse::<CompressionLevel>().is_err());
        assert!("fast".parse::<CompressionLevel>().is_err());
    }

    #[test]
    fn test_extract_args_parse() {
        let cli = CliArgs::parse_from([
            "sprite-atlas",
            "extract",
            "sprites/sprite",
            "--pixel-ratio",
            "2",
            "-o",
            "out",
            "--compress",
        ]);
        let Command::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.common.url.as_deref(), Some("sprites/sprite"));
        assert_eq!(args.common.pixel_ratio, Some(2.0));
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert_eq!(args.compress, Some(CompressionLevel::Level(2)));
    }

    #[test]
    fn test_url_or_config_required() {
        assert!(CliArgs::try_parse_from(["sprite-atlas", "inspect"]).is_err());
        assert!(CliArgs::try_parse_from(["sprite-atlas", "inspect", "-c", "atlas.json"]).is_ok());
    }
}
