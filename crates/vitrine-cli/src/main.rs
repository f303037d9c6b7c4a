//! Vitrine CLI: run the Sauce Demo end-to-end scenario catalog
//!
//! ## Usage
//!
//! ```bash
//! vitrine test                          # Run every scenario
//! vitrine test -m "smoke and not slow"  # Select by markers
//! vitrine test -k checkout -j 2         # Filter by name, two workers
//! vitrine list -m negative              # Show what a selection runs
//! vitrine config --format json          # Show the resolved configuration
//! ```

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use vitrine::{
    init_logging, scenarios, LoggingConfig, ProcessEnv, ReportFormat, RunConfig, Scenario,
    Selection,
};
use vitrine_cli::{
    Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, ConfigArgs, ConfigFormat,
    ListArgs, SelectArgs, TestArgs, TestRunner, Verbosity, EXIT_PASSED,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(EXIT_PASSED),
        Err(e @ CliError::TestsFailed { .. }) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    match &cli.command {
        Commands::Test(args) => run_tests(config, &cli, args),
        Commands::List(args) => run_list(args),
        Commands::Config(args) => run_config(&cli, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn selection(args: &SelectArgs) -> CliResult<Selection> {
    let mut selection = Selection::all();
    if let Some(expr) = &args.markers {
        selection = selection.with_markers(expr)?;
    }
    if let Some(text) = &args.filter {
        selection = selection.with_filter(text);
    }
    Ok(selection)
}

fn selected_scenarios(args: &SelectArgs) -> CliResult<Vec<Scenario>> {
    let selected = scenarios::select(&selection(args)?);
    if selected.is_empty() {
        return Err(CliError::config("no scenarios match the selection"));
    }
    Ok(selected)
}

fn run_tests(config: CliConfig, cli: &Cli, args: &TestArgs) -> CliResult<()> {
    let config = config.with_fail_fast(args.fail_fast);
    let run_config = RunConfig::resolve(cli.config.as_deref(), &ProcessEnv, args.overrides.to_layer())?;
    let formats = ReportFormat::parse_list(&args.format)?;
    let selected = selected_scenarios(&args.select)?;

    let mut logging = LoggingConfig::for_run(&run_config)
        .with_format(args.log_format)
        .with_ansi(config.color.should_color());
    if let Some(level) = config.verbosity.log_level() {
        logging.level = level;
    }
    let _ = init_logging(&logging)?;
    tracing::debug!(config = ?run_config.redacted(), "configuration resolved");

    let runtime = tokio::runtime::Runtime::new()?;
    let mut runner = TestRunner::new(config);
    let reporter = runtime.block_on(runner.run(Arc::new(run_config), &selected, &formats))?;

    if reporter.failed_count() > 0 {
        return Err(CliError::TestsFailed {
            failed: reporter.failed_count(),
            total: reporter.total_count(),
        });
    }
    Ok(())
}

fn run_list(args: &ListArgs) -> CliResult<()> {
    let selected = selected_scenarios(&args.select)?;
    for scenario in &selected {
        println!("{} [{}]", scenario.name(), scenario.markers().join(", "));
    }
    println!();
    println!("{} scenarios selected", selected.len());
    Ok(())
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> CliResult<()> {
    let run_config = RunConfig::resolve(cli.config.as_deref(), &ProcessEnv, args.overrides.to_layer())?;
    let redacted = run_config.redacted();
    let rendered = match args.format {
        ConfigFormat::Yaml => serde_yaml_ng::to_string(&redacted)
            .map_err(|e| CliError::serialization(e.to_string()))?,
        ConfigFormat::Json => serde_json::to_string_pretty(&redacted)
            .map_err(|e| CliError::serialization(e.to_string()))?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
