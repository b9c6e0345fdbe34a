use composerify::advise::advise;
use composerify::cli::commands::{AdviseArgs, CliArgs, Commands, ConvertArgs, ScanArgs};
use composerify::cli::output::OutputFormatter;
use composerify::config::ConversionConfig;
use composerify::fs::RealFileSystem;
use composerify::git::ProcessGit;
use composerify::progress::LoggingHandler;
use composerify::scanner::ProjectScanner;
use composerify::util::logging::{init_logging, parse_level, LoggingConfig};
use composerify::workflow::{ConversionWorkflow, ProcessRunner};
use composerify::VERSION;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{debug, error, info, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("composerify v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Convert(convert_args) => handle_convert(convert_args),
        Commands::Scan(scan_args) => handle_scan(scan_args),
        Commands::Advise(advise_args) => handle_advise(advise_args),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str).unwrap_or_else(|| {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        });
    } else if args.verbose {
        config = LoggingConfig {
            use_json: config.use_json,
            ..LoggingConfig::verbose()
        };
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    init_logging(config);
}

fn resolve_site_path(path: &Path) -> Option<PathBuf> {
    if !path.is_dir() {
        error!("Site path is not a directory: {}", path.display());
        return None;
    }

    match path.canonicalize() {
        Ok(path) => {
            debug!("Canonicalized site path: {}", path.display());
            Some(path)
        }
        Err(e) => {
            error!("Failed to canonicalize site path: {}", e);
            None
        }
    }
}

fn print_or_fail(output: anyhow::Result<String>) -> bool {
    match output {
        Ok(output) => {
            println!("{}", output);
            true
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            false
        }
    }
}

fn handle_convert(args: &ConvertArgs) -> i32 {
    let Some(site_path) = resolve_site_path(&args.site_path) else {
        return 1;
    };

    let defaults = ConversionConfig::default();
    let config = ConversionConfig {
        branch: args.branch.clone().unwrap_or_else(|| defaults.branch.clone()),
        upstream_url: args
            .upstream_url
            .clone()
            .unwrap_or_else(|| defaults.upstream_url.clone()),
        dry_run: args.dry_run || defaults.dry_run,
        post_deploy_commands: args.post_deploy_commands(),
        ..defaults
    };

    debug!(
        upstream = %config.upstream_url,
        dry_run = config.dry_run,
        post_deploy = config.post_deploy_commands.len(),
        "Resolved conversion config"
    );

    let workflow = ConversionWorkflow::new(
        Arc::new(RealFileSystem::new()),
        Arc::new(ProcessGit::default()),
        Arc::new(ProcessRunner),
        config,
    )
    .with_progress(Arc::new(LoggingHandler));

    let report = match workflow.run(&site_path) {
        Ok(report) => report,
        Err(e) => {
            error!("Conversion failed: {}", e);
            eprintln!("\nNo changes were made to the repository.");
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    if !print_or_fail(formatter.format_report(&report)) {
        return 1;
    }

    report.exit_code()
}

fn handle_scan(args: &ScanArgs) -> i32 {
    let Some(site_path) = resolve_site_path(&args.site_path) else {
        return 1;
    };

    let fs = RealFileSystem::new();
    let scan = ProjectScanner::new(&fs).scan(&site_path);
    info!(
        contrib = scan.contrib.len(),
        custom = scan.custom.len(),
        libraries = scan.libraries.len(),
        "Scan complete"
    );

    let formatter = OutputFormatter::new(args.format.into());
    if print_or_fail(formatter.format_scan(&scan)) {
        0
    } else {
        1
    }
}

fn handle_advise(args: &AdviseArgs) -> i32 {
    let Some(site_path) = resolve_site_path(&args.site_path) else {
        return 1;
    };

    let fs = RealFileSystem::new();
    let advice = advise(&fs, &site_path);

    let formatter = OutputFormatter::new(args.format.into());
    if print_or_fail(formatter.format_advice(&advice)) {
        0
    } else {
        1
    }
}
