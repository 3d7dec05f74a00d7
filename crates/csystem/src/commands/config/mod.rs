pub mod export;
pub mod import;

#[derive(clap::Subcommand)]
pub enum ConfigCommands {
    /// Convert a config resource into an editable XML tree
    Export(export::ExportArgs),
    /// Convert an XML tree back into a config resource
    Import(import::ImportArgs),
}

impl ConfigCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            ConfigCommands::Export(export) => export.handle(),
            ConfigCommands::Import(import) => import.handle(),
        }
    }
}
