use crate::commands::{run_partner_sample, run_score, PartnerSampleArgs, ScoreArgs};
use crate::server;
use aura_insight::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Aura Insight",
    about = "Run the Aura Insight intake service or exercise its scoring from the command line",
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
    /// Score questionnaire answers without submitting a lead
    Score(ScoreArgs),
    /// Inspect the partner agency directory
    Partners {
        #[command(subcommand)]
        command: PartnersCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PartnersCommand {
    /// Draw a weighted recommendation sample from a directory file or URL
    Sample(PartnerSampleArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Partners {
            command: PartnersCommand::Sample(args),
        } => run_partner_sample(args).await,
    }
}
