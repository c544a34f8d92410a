//! Persistence of generated site assets and lazy ZIP bundling for download.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::models::{GenerationResult, SiteMetadata};
use crate::{ForgeError, ForgeResult};

/// Writes generation output to per-ID directories and bundles them into
/// compressed archives on demand.
#[derive(Clone)]
pub struct SiteArchiver {
    sites_dir: PathBuf,
    archives_dir: PathBuf,
}

impl SiteArchiver {
    pub fn new(sites_dir: impl Into<PathBuf>, archives_dir: impl Into<PathBuf>) -> Self {
        Self {
            sites_dir: sites_dir.into(),
            archives_dir: archives_dir.into(),
        }
    }

    pub fn site_dir(&self, generation_id: &str) -> PathBuf {
        self.sites_dir.join(generation_id)
    }

    pub fn index_path(&self, generation_id: &str) -> PathBuf {
        self.site_dir(generation_id).join("index.html")
    }

    pub fn archive_path(&self, generation_id: &str) -> PathBuf {
        self.archives_dir.join(format!("{}.zip", generation_id))
    }

    /// Whether a directory exists for this generation at all
    pub async fn has_site_dir(&self, generation_id: &str) -> bool {
        fs::metadata(self.site_dir(generation_id)).await.is_ok()
    }

    /// Whether the generation's primary output file has been written
    pub async fn has_output(&self, generation_id: &str) -> bool {
        fs::metadata(self.index_path(generation_id)).await.is_ok()
    }

    /// Write the generation's assets plus the metadata sidecar.
    /// Empty payloads are skipped; prior content for the same ID is
    /// overwritten without warning.
    pub async fn persist(&self, generation_id: &str, result: &GenerationResult) -> ForgeResult<()> {
        let site_dir = self.site_dir(generation_id);
        fs::create_dir_all(&site_dir)
            .await
            .map_err(|e| persistence_error(e, &site_dir))?;

        if !result.html_content.is_empty() {
            let path = site_dir.join("index.html");
            fs::write(&path, &result.html_content)
                .await
                .map_err(|e| persistence_error(e, &path))?;
        }

        if !result.css_content.is_empty() {
            let path = site_dir.join("styles.css");
            fs::write(&path, &result.css_content)
                .await
                .map_err(|e| persistence_error(e, &path))?;
        }

        if !result.js_content.is_empty() {
            let path = site_dir.join("script.js");
            fs::write(&path, &result.js_content)
                .await
                .map_err(|e| persistence_error(e, &path))?;
        }

        let metadata = SiteMetadata::from_result(result);
        let meta_path = site_dir.join("meta.json");
        let meta_json = serde_json::to_string_pretty(&metadata)?;
        fs::write(&meta_path, meta_json)
            .await
            .map_err(|e| persistence_error(e, &meta_path))?;

        info!("Persisted generation {} to {:?}", generation_id, site_dir);
        Ok(())
    }

    /// Return the path to the generation's ZIP archive, building it on first
    /// request and rebuilding it when any source file is newer than the
    /// existing archive.
    pub async fn ensure_archive(&self, generation_id: &str) -> ForgeResult<PathBuf> {
        let site_dir = self.site_dir(generation_id);
        if fs::metadata(&site_dir).await.is_err() {
            return Err(ForgeError::not_found(format!(
                "generation {}",
                generation_id
            )));
        }

        fs::create_dir_all(&self.archives_dir)
            .await
            .map_err(|e| persistence_error(e, &self.archives_dir))?;

        let archive_path = self.archive_path(generation_id);
        let generation_id = generation_id.to_string();

        let rebuilt = tokio::task::spawn_blocking({
            let site_dir = site_dir.clone();
            let archive_path = archive_path.clone();
            move || -> ForgeResult<bool> {
                if archive_is_fresh(&site_dir, &archive_path)? {
                    return Ok(false);
                }
                build_archive(&site_dir, &archive_path)?;
                Ok(true)
            }
        })
        .await
        .map_err(|e| ForgeError::internal(format!("Archive task panicked: {}", e)))??;

        if rebuilt {
            info!("Built archive for generation {}", generation_id);
        } else {
            debug!("Reusing archive for generation {}", generation_id);
        }

        Ok(archive_path)
    }
}

fn persistence_error(source: std::io::Error, path: &Path) -> ForgeError {
    ForgeError::persistence(source.to_string(), Some(path.display().to_string()))
}

/// An archive is fresh when it exists and no file in the site directory has a
/// newer modification time.
fn archive_is_fresh(site_dir: &Path, archive_path: &Path) -> ForgeResult<bool> {
    let Ok(archive_meta) = std::fs::metadata(archive_path) else {
        return Ok(false);
    };
    let archive_mtime = archive_meta
        .modified()
        .map_err(|e| persistence_error(e, archive_path))?;

    let mut files = Vec::new();
    collect_files(site_dir, site_dir, &mut files)?;

    for (path, _) in &files {
        let mtime = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if mtime > archive_mtime {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Bundle every file under `site_dir` into a deflate-compressed ZIP, with
/// entry names relative to the directory.
fn build_archive(site_dir: &Path, archive_path: &Path) -> ForgeResult<()> {
    let mut files = Vec::new();
    collect_files(site_dir, site_dir, &mut files)?;

    let file =
        std::fs::File::create(archive_path).map_err(|e| persistence_error(e, archive_path))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, relative_name) in files {
        writer
            .start_file(relative_name, options)
            .map_err(|e| ForgeError::persistence(e.to_string(), Some(path.display().to_string())))?;
        let mut source = std::fs::File::open(&path).map_err(|e| persistence_error(e, &path))?;
        std::io::copy(&mut source, &mut writer).map_err(|e| persistence_error(e, &path))?;
    }

    writer
        .finish()
        .map_err(|e| ForgeError::persistence(e.to_string(), Some(archive_path.display().to_string())))?;

    Ok(())
}

fn collect_files(
    dir: &Path,
    base: &Path,
    files: &mut Vec<(PathBuf, String)>,
) -> ForgeResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| persistence_error(e, dir))?;

    for entry in entries {
        let entry = entry.map_err(|e| persistence_error(e, dir))?;
        let path = entry.path();

        if path.is_dir() {
            collect_files(&path, base, files)?;
        } else {
            let relative = path
                .strip_prefix(base)
                .map_err(|e| ForgeError::internal(format!("Path outside site dir: {}", e)))?
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, "/");
            files.push((path, relative));
        }
    }

    Ok(())
}
