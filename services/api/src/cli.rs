use crate::demo::{run_catalog_check, run_demo, CatalogCheckArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use pawhaven::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "PawHaven",
    about = "Run and demonstrate the PawHaven pet adoption platform from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect pet catalog CSV files before importing them
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Walk through an adoption from application to completion on the sample data
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Parse and validate a catalog without loading it
    Check(CatalogCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Load the bundled shelters, adopters and pets before serving
    #[arg(long)]
    pub(crate) seed: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Catalog {
            command: CatalogCommand::Check(args),
        } => run_catalog_check(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_and_accepts_overrides() {
        let cli = Cli::try_parse_from(["pawhaven"]).expect("parses");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["pawhaven", "serve", "--port", "8088", "--seed"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8088));
                assert!(args.seed);
                assert!(args.host.is_none());
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn catalog_check_requires_a_path() {
        assert!(Cli::try_parse_from(["pawhaven", "catalog", "check"]).is_err());
        let cli = Cli::try_parse_from(["pawhaven", "catalog", "check", "pets.csv", "--json"])
            .expect("parses");
        assert!(matches!(
            cli.command,
            Some(Command::Catalog {
                command: CatalogCommand::Check(CatalogCheckArgs { json: true, .. })
            })
        ));
    }
}
