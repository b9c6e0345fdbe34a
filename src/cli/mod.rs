pub mod commands;
pub mod output;

pub use commands::{AdviseArgs, CliArgs, Commands, ConvertArgs, OutputFormatArg, ScanArgs};
pub use output::{OutputFormat, OutputFormatter};
