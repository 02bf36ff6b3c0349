use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fos",
    about = "fostore protocol tools: inspect captured frames and protocol settings",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Protocol settings file (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode a captured reply frame (or request batch) from a file
    Inspect(InspectArgs),
    /// Print the effective protocol settings as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    pub path: PathBuf,
    /// Treat the file as a request batch instead of a reply frame
    #[arg(long)]
    pub batch: bool,
    /// Also dump the raw bytes as hex
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Settings file to load; overrides the global --config
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inspect() {
        let cli = Cli::try_parse_from(["fos", "inspect", "reply.bin"]).unwrap();
        if let Command::Inspect(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("reply.bin"));
            assert!(!args.batch);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_inspect_batch_json() {
        let argv = ["fos", "inspect", "--batch", "--format", "json", "b.bin"];
        let cli = Cli::try_parse_from(argv).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        if let Command::Inspect(args) = cli.command {
            assert!(args.batch);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::try_parse_from(["fos", "config", "--path", "fos.toml"]).unwrap();
        if let Command::Config(args) = cli.command {
            assert_eq!(args.path, Some(PathBuf::from("fos.toml")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_config() {
        let cli = Cli::try_parse_from(["fos", "--config", "c.toml", "inspect", "x"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["fos", "--verbose", "config"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn inspect_requires_path() {
        assert!(Cli::try_parse_from(["fos", "inspect"]).is_err());
    }
}
