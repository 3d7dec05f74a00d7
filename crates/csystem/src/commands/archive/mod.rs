use std::{fs::File, path::PathBuf};

use clap::Args;
use csystem_arc::ArchiveReader;
use miette::{Context, Result};

pub mod extract;
pub mod list;

#[derive(clap::Subcommand)]
pub enum ArchiveCommands {
    /// List the entries of an archive
    List(list::ListArgs),
    /// Extract every entry of an archive into a directory
    Extract(extract::ExtractArgs),
}

impl ArchiveCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            ArchiveCommands::List(list) => list.handle(),
            ArchiveCommands::Extract(extract) => extract.handle(),
        }
    }
}

/// Index file and the content files it refers to
#[derive(Args)]
pub struct ArchiveFiles {
    /// The index file
    #[arg(short, long, value_name = "FILE")]
    index: PathBuf,

    /// Content files, in the order the index numbers them
    #[arg(short, long, value_name = "FILE", num_args = 1.., required = true)]
    content: Vec<PathBuf>,
}

impl ArchiveFiles {
    pub fn open(&self) -> Result<ArchiveReader<File>> {
        ArchiveReader::open(&self.index, &self.content).context(format!("opening {}", self.index.display()))
    }
}
