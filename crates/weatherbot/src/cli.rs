use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "weatherbot")]
#[command(author, version, about = "Telegram weather bot served over a webhook", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Register the webhook and serve updates (default)
    Run,

    /// Validate the bot token and the weather API key, then exit
    Check,

    /// Apply database migrations, then exit
    Migrate,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["weatherbot"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["weatherbot", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
        assert!(Cli::try_parse_from(["weatherbot", "serve"]).is_err());
    }
}
