use std::path::PathBuf;

use clap::Args;
use csystem_arc::EntryCache;
use itertools::Itertools;
use miette::{Context, Result};
use owo_colors::OwoColorize;

use super::ArchiveFiles;

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    files: ArchiveFiles,

    /// A directory holding a cache from an earlier extraction
    #[arg(long, value_name = "DIR")]
    cache: Option<PathBuf>,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let mut archive = self.files.open()?;

        if let Some(dir) = &self.cache {
            let cache = EntryCache::load(dir)
                .context(format!("loading cache from {}", dir.display()))?;
            archive
                .catalog_mut()
                .entries_mut()
                .for_each(|entry| cache.backfill(entry));
        }

        let catalog = archive.catalog();
        for kind in catalog.kinds() {
            let entries = catalog.entries_of(kind);
            println!("{} ({} entries)", kind.bold(), entries.len());

            for entry in entries {
                let mut details = vec![
                    format!("id {}", entry.id),
                    format!("offset {}", entry.offset),
                    format!("{} -> {} bytes", entry.compressed_size, entry.uncompressed_size),
                ];
                if entry.has_version() {
                    details.push(format!("version {}", entry.version));
                }
                if entry.pre_data_len() > 0 {
                    details.push(format!("{} bytes before", entry.pre_data_len()).yellow().to_string());
                }
                println!(
                    "  {}{} {} [{:?}]",
                    kind,
                    entry.index.cyan(),
                    details.iter().join(", "),
                    entry.compression
                );
            }
        }

        println!("{} entries", catalog.len().green());
        Ok(())
    }
}
