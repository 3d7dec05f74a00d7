use std::{fs::File, io::Write, path::PathBuf};

use clap::Args;
use csystem_arc::EntryCache;
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;

use super::ArchiveFiles;

#[derive(Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    files: ArchiveFiles,

    /// A target directory, also holding the cache
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// Directory name for a type tag. Tags that are not ASCII alphanumeric are written as hex, so a
/// tag like `/` never escapes the target directory
fn kind_dir_name(kind: char) -> String {
    if kind.is_ascii_alphanumeric() {
        kind.to_string()
    } else {
        format!("{:02X}", kind as u32)
    }
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let mut archive = self.files.open()?;

        std::fs::create_dir_all(&self.directory)
            .into_diagnostic()
            .context(format!("creating {}", self.directory.display()))?;
        let mut cache = EntryCache::load(&self.directory)?;

        let entries: Vec<_> = archive.entries().cloned().collect();
        for entry in entries {
            let extracted = archive
                .extract_into(&entry, &mut cache)
                .context(format!("extracting {}{}", entry.kind, entry.index))?;

            let dir = self.directory.join(kind_dir_name(entry.kind));
            std::fs::create_dir_all(&dir)
                .into_diagnostic()
                .context(format!("creating {}", dir.display()))?;

            let p = dir.join(entry.id.to_string());
            info!("writing {}", p.display());

            let mut out = if !self.overwrite {
                File::create_new(&p)
                    .into_diagnostic()
                    .context(format!("creating {}", &p.display()))?
            } else {
                File::create(&p)
                    .into_diagnostic()
                    .context(format!("creating {}", &p.display()))?
            };
            out.write_all(&extracted.data).into_diagnostic()?;
        }

        let path = cache.save(&self.directory)?;
        info!("{} entries extracted, cache at {}", archive.len(), path.display());
        Ok(())
    }
}
