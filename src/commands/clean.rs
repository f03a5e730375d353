//! Clean the output directory

use anyhow::Result;
use std::fs;

use crate::Eleventy;

/// Remove the output directory
pub fn run(site: &Eleventy) -> Result<()> {
    if site.output_dir.exists() {
        fs::remove_dir_all(&site.output_dir)?;
        tracing::info!("Deleted: {:?}", site.output_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", site.output_dir);
    }

    Ok(())
}
