use std::path::PathBuf;

use clap::Args;
use csystem_config::{ConfigResource, ConfigTree, SchemaVersion};
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;

#[derive(Args)]
pub struct ImportArgs {
    /// An input XML tree
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The config resource to write
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

impl ImportArgs {
    pub fn handle(&self) -> Result<()> {
        let content = std::fs::read_to_string(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let tree = ConfigTree::from_xml(&content).context(format!("parsing {}", self.file.display()))?;

        // node types alone decide the encoding, so the version is irrelevant here
        let bytes = ConfigResource::from_tree(&tree, SchemaVersion::default())?.to_bytes()?;
        info!("writing {}", self.output.display());
        std::fs::write(&self.output, bytes)
            .into_diagnostic()
            .context(format!("writing {}", self.output.display()))?;
        Ok(())
    }
}
