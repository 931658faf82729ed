use crate::interview::{run_questions, run_screen};
use crate::server;
use clap::{Args, Parser, Subcommand};
use spectrum_screen::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Spectrum Screen",
    about = "Collect a screening questionnaire and present the scoring service's verdict",
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
    /// Print every questionnaire section with its answer options
    Questions,
    /// Run a screening in the terminal and submit it to the scoring service
    Screen(ScreenArgs),
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

#[derive(Args, Debug, Default)]
pub(crate) struct ScreenArgs {
    /// CSV file with `field,value` rows used to pre-fill answers
    #[arg(long)]
    pub(crate) answers: Option<PathBuf>,
    /// Override the configured scoring service base URL
    #[arg(long)]
    pub(crate) scoring_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Questions => run_questions(),
        Command::Screen(args) => run_screen(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_accepts_answer_sheet_and_url_override() {
        let cli = Cli::try_parse_from([
            "spectrum-screen",
            "screen",
            "--answers",
            "answers.csv",
            "--scoring-url",
            "http://scoring.internal:9000",
        ])
        .expect("valid arguments");

        match cli.command {
            Some(Command::Screen(args)) => {
                assert_eq!(args.answers, Some(PathBuf::from("answers.csv")));
                assert_eq!(
                    args.scoring_url.as_deref(),
                    Some("http://scoring.internal:9000")
                );
            }
            other => panic!("expected screen command, got {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["spectrum-screen"]).expect("valid arguments");
        assert!(cli.command.is_none());
    }
}
