//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vitrine::{BrowserKind, ConfigLayer, DriverBackend, LogFormat};

/// Vitrine: end-to-end scenario runner for the Sauce Demo storefront
#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// YAML configuration file (falls back to $VITRINE_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run tests
    Test(TestArgs),

    /// List the scenarios a selection would run
    List(ListArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),
}

/// Scenario selection flags
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Marker expression, e.g. "smoke and not negative"
    #[arg(short = 'm', long = "markers", value_name = "EXPR")]
    pub markers: Option<String>,

    /// Only scenarios whose name contains TEXT (case-insensitive)
    #[arg(short = 'k', long = "filter", value_name = "TEXT")]
    pub filter: Option<String>,
}

/// Flags that override file and environment configuration
#[derive(Args, Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct OverrideArgs {
    /// Storefront base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long, value_name = "KIND")]
    pub browser: Option<BrowserKind>,

    /// Run without a visible window
    #[arg(long, conflicts_with = "headed")]
    pub headless: bool,

    /// Run with a visible window
    #[arg(long)]
    pub headed: bool,

    /// Element wait timeout in milliseconds
    #[arg(long, value_name = "N")]
    pub timeout_ms: Option<u64>,

    /// Browser backend (cdp, simulated)
    #[arg(long, value_name = "DRIVER")]
    pub driver: Option<DriverBackend>,

    /// Seed for generated test data
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Number of parallel workers
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Retries per failed test
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Output directory for reports, screenshots and logs
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl OverrideArgs {
    /// Configuration layer holding only the flags that were given
    #[must_use]
    pub fn to_layer(&self) -> ConfigLayer {
        let headless = if self.headless {
            Some(true)
        } else if self.headed {
            Some(false)
        } else {
            None
        };
        ConfigLayer {
            base_url: self.base_url.clone(),
            browser: self.browser,
            headless,
            default_timeout_ms: self.timeout_ms,
            driver: self.driver,
            data_seed: self.seed,
            parallelism: self.workers,
            retries: self.retries,
            report_dir: self.output.clone(),
            screenshot_dir: self.output.as_ref().map(|dir| dir.join("screenshots")),
            log_dir: self.output.as_ref().map(|dir| dir.join("logs")),
            ..ConfigLayer::default()
        }
    }
}

/// Arguments for the test command
#[derive(Parser, Debug)]
pub struct TestArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Stop starting new tests after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Report formats, comma separated (json, junit, html)
    #[arg(long, default_value = "json,junit,html", value_name = "LIST")]
    pub format: String,

    /// Log line format on stderr (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub log_format: LogFormat,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub select: SelectArgs,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Output format
    #[arg(long, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Output format of the config command
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML document
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn test_parse_test_command() {
            let cli = Cli::try_parse_from([
                "vitrine",
                "-vv",
                "test",
                "-m",
                "smoke and not negative",
                "-k",
                "cart",
                "--driver",
                "simulated",
                "-j",
                "2",
                "--headless",
                "--fail-fast",
                "--format",
                "json,junit",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            let Commands::Test(args) = cli.command else {
                panic!("expected test command");
            };
            assert_eq!(args.select.markers.as_deref(), Some("smoke and not negative"));
            assert_eq!(args.select.filter.as_deref(), Some("cart"));
            assert_eq!(args.overrides.driver, Some(DriverBackend::Simulated));
            assert_eq!(args.overrides.workers, Some(2));
            assert!(args.fail_fast);
            assert_eq!(args.format, "json,junit");
            assert_eq!(args.log_format, LogFormat::Text);
        }

        #[test]
        fn test_headless_conflicts_with_headed() {
            assert!(Cli::try_parse_from(["vitrine", "test", "--headless", "--headed"]).is_err());
        }

        #[test]
        fn test_unknown_browser_rejected() {
            assert!(Cli::try_parse_from(["vitrine", "test", "--browser", "netscape"]).is_err());
        }

        #[test]
        fn test_global_config_after_subcommand() {
            let cli =
                Cli::try_parse_from(["vitrine", "config", "--config", "run.yaml", "--format", "json"])
                    .unwrap();
            assert_eq!(cli.config, Some(PathBuf::from("run.yaml")));
            let Commands::Config(args) = cli.command else {
                panic!("expected config command");
            };
            assert_eq!(args.format, ConfigFormat::Json);
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["vitrine"]).is_err());
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_empty_overrides_leave_layer_empty() {
            assert_eq!(OverrideArgs::default().to_layer(), ConfigLayer::default());
        }

        #[test]
        fn test_output_dir_fans_out() {
            let args = OverrideArgs {
                output: Some(PathBuf::from("out")),
                headed: true,
                ..OverrideArgs::default()
            };
            let layer = args.to_layer();
            assert_eq!(layer.report_dir, Some(PathBuf::from("out")));
            assert_eq!(layer.screenshot_dir, Some(PathBuf::from("out/screenshots")));
            assert_eq!(layer.log_dir, Some(PathBuf::from("out/logs")));
            assert_eq!(layer.headless, Some(false));
        }
    }

    mod color_tests {
        use super::*;

        #[test]
        fn test_color_arg_conversion() {
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
            assert_eq!(ColorChoice::from(ColorArg::Auto), ColorChoice::Auto);
        }
    }
}
