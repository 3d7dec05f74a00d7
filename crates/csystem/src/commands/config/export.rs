use std::{fs::File, path::PathBuf};

use clap::Args;
use csystem_config::{ConfigResource, SchemaVersion};
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;

#[derive(Args)]
pub struct ExportArgs {
    /// An input config resource
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The XML file to write
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Schema version of the resource
    #[arg(long, default_value_t = 23, value_parser = clap::value_parser!(u32).range(1..))]
    schema: u32,
}

impl ExportArgs {
    pub fn handle(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let resource = ConfigResource::read(f, SchemaVersion(self.schema))
            .context(format!("reading {}", self.file.display()))?;

        let xml = resource.to_tree()?.to_xml()?;
        info!("writing {}", self.output.display());
        std::fs::write(&self.output, xml)
            .into_diagnostic()
            .context(format!("writing {}", self.output.display()))?;
        Ok(())
    }
}
