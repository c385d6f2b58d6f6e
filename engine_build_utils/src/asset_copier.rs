use std::{fs, path::Path};

use fs_extra::dir::{self, CopyOptions};
use log::{debug, info};

use crate::{
    error::AssetCopyError,
    layout::{AssetCategory, AssetRoot, OutputRoot},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyReport {
    pub category: AssetCategory,
    pub files_copied: usize,
    pub bytes_copied: u64,
}

/// Merge-copies asset categories into the output root: same-named files are
/// overwritten, files that only exist in the destination are kept.
pub struct AssetCopier {
    asset_root: AssetRoot,
    output_root: OutputRoot,
}

impl AssetCopier {
    pub fn new(asset_root: AssetRoot, output_root: OutputRoot) -> Self {
        Self {
            asset_root,
            output_root,
        }
    }

    /// Copies every category in order, stopping at the first failure.
    pub fn copy_all(&self) -> Result<Vec<CopyReport>, AssetCopyError> {
        AssetCategory::ALL
            .iter()
            .map(|category| self.copy_category(*category))
            .collect()
    }

    pub fn copy_category(&self, category: AssetCategory) -> Result<CopyReport, AssetCopyError> {
        let source = self.asset_root.category_dir(category);
        let destination = self.output_root.category_dir(category);
        if !source.is_dir() {
            return Err(AssetCopyError::MissingSource {
                category,
                path: source,
            });
        }

        info!("Copying {} from {:?} to {:?}", category, source, destination);
        fs::create_dir_all(&destination).map_err(|error| AssetCopyError::CreateDir {
            path: destination.clone(),
            error,
        })?;
        let files_copied = count_files(&source)?;
        let bytes_copied = merge_copy(&source, &destination)?;
        debug!("{}: {} file(s), {} byte(s)", category, files_copied, bytes_copied);

        Ok(CopyReport {
            category,
            files_copied,
            bytes_copied,
        })
    }
}

fn count_files(source: &Path) -> Result<usize, AssetCopyError> {
    let content = dir::get_dir_content(source).map_err(|error| AssetCopyError::Read {
        path: source.to_path_buf(),
        error,
    })?;
    Ok(content.files.len())
}

/// Copies the contents of `source` into the existing `destination`,
/// returning the number of bytes written.
fn merge_copy(source: &Path, destination: &Path) -> Result<u64, AssetCopyError> {
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_options.content_only = true;
    dir::copy(source, destination, &copy_options).map_err(|error| AssetCopyError::Copy {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        error,
    })
}
