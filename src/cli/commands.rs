use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Converts a non-Composer Drupal site into a Composer-managed one
#[derive(Parser, Debug)]
#[command(
    name = "composerify",
    about = "Converts a non-Composer Drupal site into a Composer-managed one",
    version,
    author,
    long_about = "composerify inspects a local Drupal checkout, classifies its modules, themes \
                  and libraries, rewrites composer.json for a Composer-managed upstream and \
                  replays the conversion as one commit per step on a separate git branch."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only errors are logged"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Convert a site checkout on a new branch",
        long_about = "Creates the conversion branch from the Composer-managed upstream and \
                      copies configuration, pantheon.yml, custom code and settings.php onto it, \
                      then commits the migrated composer.json.\n\n\
                      Exit codes: 0 completed, 2 completed with warnings, 1 aborted.\n\n\
                      Examples:\n  \
                      composerify convert /srv/site\n  \
                      composerify convert /srv/site --dry-run --format json\n  \
                      composerify convert /srv/site --run-updb --run-cr --drush-alias @site.conversion"
    )]
    Convert(ConvertArgs),

    #[command(about = "List the projects detected in a site checkout")]
    Scan(ScanArgs),

    #[command(about = "Recommend a conversion path for a site checkout")]
    Advise(AdviseArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ConvertArgs {
    #[arg(value_name = "PATH", help = "Path to the site checkout")]
    pub site_path: PathBuf,

    #[arg(short = 'b', long, value_name = "BRANCH", help = "Conversion branch name")]
    pub branch: Option<String>,

    #[arg(long, value_name = "URL", help = "Git URL of the target upstream")]
    pub upstream_url: Option<String>,

    #[arg(
        long,
        help = "Perform and commit local steps only; skip push and post-deploy commands"
    )]
    pub dry_run: bool,

    #[arg(long, help = "Run `drush updb -y` after pushing")]
    pub run_updb: bool,

    #[arg(long, help = "Run `drush cr` after pushing")]
    pub run_cr: bool,

    #[arg(long, value_name = "ALIAS", help = "Drush site alias for post-deploy commands")]
    pub drush_alias: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

impl ConvertArgs {
    /// Drush invocations requested on the command line, in run order.
    pub fn post_deploy_commands(&self) -> Vec<String> {
        let drush = match &self.drush_alias {
            Some(alias) => format!("drush {}", alias),
            None => "drush".to_string(),
        };

        let mut commands = Vec::new();
        if self.run_updb {
            commands.push(format!("{} updb -y", drush));
        }
        if self.run_cr {
            commands.push(format!("{} cr", drush));
        }
        commands
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    #[arg(value_name = "PATH", help = "Path to the site checkout")]
    pub site_path: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct AdviseArgs {
    #[arg(value_name = "PATH", help = "Path to the site checkout")]
    pub site_path: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_convert_defaults() {
        let args = CliArgs::parse_from(["composerify", "convert", "/srv/site"]);
        match args.command {
            Commands::Convert(convert) => {
                assert_eq!(convert.site_path, PathBuf::from("/srv/site"));
                assert_eq!(convert.format, OutputFormatArg::Human);
                assert!(convert.branch.is_none());
                assert!(!convert.dry_run);
                assert!(convert.post_deploy_commands().is_empty());
            }
            _ => panic!("Expected Convert command"),
        }
    }

    #[test]
    fn test_convert_post_deploy_commands() {
        let args = CliArgs::parse_from([
            "composerify",
            "convert",
            "/srv/site",
            "--run-updb",
            "--run-cr",
            "--drush-alias",
            "@site.conversion",
        ]);
        let Commands::Convert(convert) = args.command else {
            panic!("Expected Convert command");
        };
        assert_eq!(
            convert.post_deploy_commands(),
            vec![
                "drush @site.conversion updb -y".to_string(),
                "drush @site.conversion cr".to_string(),
            ]
        );
    }

    #[test]
    fn test_scan_json_with_global_flags() {
        let args = CliArgs::parse_from(["composerify", "-v", "scan", "/srv/site", "-f", "json"]);
        assert!(args.verbose);
        match args.command {
            Commands::Scan(scan) => assert_eq!(scan.format, OutputFormatArg::Json),
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = CliArgs::try_parse_from(["composerify", "-v", "-q", "advise", "/srv/site"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_path_is_required() {
        assert!(CliArgs::try_parse_from(["composerify", "convert"]).is_err());
    }
}
