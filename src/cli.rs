use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "leadrelay")]
#[command(author, version, about = "NovinHub webhook receiver with IPPanel pattern-SMS dispatch", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook server and the Telegram control panel
    Run,

    /// Show the IPPanel account credit and exit
    Credit,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
