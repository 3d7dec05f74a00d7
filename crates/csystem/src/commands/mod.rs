pub mod archive;
pub mod config;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle index and content archives
    Archive {
        #[command(subcommand)]
        command: archive::ArchiveCommands,
    },
    /// Handle config resources
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Archive { command } => command.handle(),
            Commands::Config { command } => command.handle(),
        }
    }
}
