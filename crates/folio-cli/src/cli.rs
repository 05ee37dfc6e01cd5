use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio - ingest files into works and stage them for processing",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the working-directory path a file would be staged at
    StagePath(StagePathArgs),
    /// Create a work and attach each file to it
    Ingest(IngestArgs),
    /// List jobs recovered from the durable spool
    Jobs(JobsArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct StagePathArgs {
    pub id: String,
    pub name: String,
}

#[derive(Args)]
pub struct IngestArgs {
    #[arg(long)]
    pub work_title: String,
    /// Acting user key recorded as depositor
    #[arg(long, default_value = "folio@localhost")]
    pub user: String,
    /// Visibility of the new work; files inherit it
    #[arg(long, default_value = "restricted")]
    pub visibility: String,
    /// Run the dispatched jobs in-process before exiting
    #[arg(long)]
    pub run_jobs: bool,
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct JobsArgs {
    /// Spool file; defaults to `jobs.spool_path` from the configuration
    #[arg(long)]
    pub spool: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stage_path() {
        let cli = Cli::try_parse_from(["folio", "stage-path", "abcd1234", "photo.jpg"]).unwrap();
        if let Command::StagePath(args) = cli.command {
            assert_eq!(args.id, "abcd1234");
            assert_eq!(args.name, "photo.jpg");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_ingest() {
        let cli = Cli::try_parse_from([
            "folio", "ingest", "--work-title", "Letters", "--visibility", "open", "a.pdf", "b.pdf",
        ])
        .unwrap();
        if let Command::Ingest(args) = cli.command {
            assert_eq!(args.work_title, "Letters");
            assert_eq!(args.visibility, "open");
            assert_eq!(args.user, "folio@localhost");
            assert_eq!(args.files, vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]);
            assert!(!args.run_jobs);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn ingest_requires_files() {
        assert!(Cli::try_parse_from(["folio", "ingest", "--work-title", "Letters"]).is_err());
    }

    #[test]
    fn parse_jobs_with_spool() {
        let cli = Cli::try_parse_from(["folio", "jobs", "--spool", "/srv/jobs.log"]).unwrap();
        if let Command::Jobs(args) = cli.command {
            assert_eq!(args.spool, Some(PathBuf::from("/srv/jobs.log")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from(["folio", "--format", "json", "-c", "folio.toml", "config"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.config, Some(PathBuf::from("folio.toml")));
        assert!(matches!(cli.command, Command::Config(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["folio", "--verbose", "config"]).unwrap();
        assert!(cli.verbose);
    }
}
