//! Turning archive files into readable directories

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::ArchiveReader;
use crate::error::{Error, Result};

/// How the archive's root directory was obtained.
#[derive(Debug)]
enum Mount {
    /// A plain directory, read in place
    Directory,
    /// A `.zip` extracted into a temporary directory
    // Only held so the directory is removed on drop.
    #[allow(dead_code)]
    Extracted(TempDir),
    /// A `.dmg` attached read-only at a temporary mount point
    DiskImage(TempDir),
}

/// An archive made available as a directory.
///
/// Temporary extractions are removed and disk images detached when the
/// value is dropped.
#[derive(Debug)]
pub struct MountedArchive {
    source: PathBuf,
    root: PathBuf,
    mount: Mount,
}

impl MountedArchive {
    /// Mount a directory, `.zip` or `.dmg` archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveUnreadable`] if the path does not exist, is of
    /// an unsupported type or the zip cannot be extracted, and
    /// [`Error::Mount`] if attaching a disk image fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = path.as_ref().to_path_buf();
        let unreadable = |reason: String| Error::ArchiveUnreadable {
            path: source.clone(),
            reason,
        };

        let metadata = std::fs::metadata(&source).map_err(|e| unreadable(e.to_string()))?;
        if metadata.is_dir() {
            return Ok(Self {
                root: source.clone(),
                source,
                mount: Mount::Directory,
            });
        }

        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "zip" => {
                let dir = extract_zip(&source).map_err(|e| unreadable(e.to_string()))?;
                tracing::debug!("Extracted {} to {}", source.display(), dir.path().display());
                Ok(Self {
                    root: dir.path().to_path_buf(),
                    source,
                    mount: Mount::Extracted(dir),
                })
            }
            "dmg" => {
                let dir = temp_dir().map_err(|e| unreadable(e.to_string()))?;
                attach(&source, dir.path())?;
                tracing::debug!("Attached {} at {}", source.display(), dir.path().display());
                Ok(Self {
                    root: dir.path().to_path_buf(),
                    source,
                    mount: Mount::DiskImage(dir),
                })
            }
            _ => Err(unreadable("not a directory, .zip or .dmg".to_string())),
        }
    }

    /// The readable directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The archive path as given.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Archive name: the file stem of the source path.
    #[must_use]
    pub fn name(&self) -> String {
        self.source
            .file_stem()
            .map_or_else(|| "archive".to_string(), |s| s.to_string_lossy().into_owned())
    }

    /// A reader over the mounted root, named after the archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveUnreadable`] if the root cannot be listed.
    pub fn reader(&self) -> Result<ArchiveReader> {
        Ok(ArchiveReader::open(&self.root)?.with_name(self.name()))
    }
}

impl Drop for MountedArchive {
    fn drop(&mut self) {
        if let Mount::DiskImage(dir) = &self.mount
            && let Err(e) = detach(dir.path())
        {
            tracing::warn!("Failed to detach {}: {}", self.source.display(), e);
        }
    }
}

fn temp_dir() -> std::io::Result<TempDir> {
    tempfile::Builder::new().prefix("glosskit-").tempdir()
}

fn extract_zip(path: &Path) -> Result<TempDir> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let dir = temp_dir()?;
    archive.extract(dir.path())?;
    Ok(dir)
}

#[cfg(target_os = "macos")]
fn attach(image: &Path, mount_point: &Path) -> Result<()> {
    use std::process::Command;

    let mount_error = |message: String| Error::Mount {
        path: image.to_path_buf(),
        message,
    };
    let output = Command::new("hdiutil")
        .arg("attach")
        .arg(image)
        .args(["-readonly", "-noverify", "-noautoopen", "-nobrowse", "-quiet", "-mountpoint"])
        .arg(mount_point)
        .output()
        .map_err(|e| mount_error(e.to_string()))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(mount_error(String::from_utf8_lossy(&output.stderr).trim().to_string()))
    }
}

#[cfg(not(target_os = "macos"))]
fn attach(image: &Path, _mount_point: &Path) -> Result<()> {
    Err(Error::Mount {
        path: image.to_path_buf(),
        message: "disk images can only be attached on macOS".to_string(),
    })
}

#[cfg(target_os = "macos")]
fn detach(mount_point: &Path) -> Result<()> {
    use std::process::Command;

    let status = Command::new("hdiutil")
        .arg("detach")
        .arg(mount_point)
        .arg("-quiet")
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::Mount {
            path: mount_point.to_path_buf(),
            message: format!("hdiutil detach exited with {status}"),
        })
    }
}

#[cfg(not(target_os = "macos"))]
fn detach(_mount_point: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_directory_is_read_in_place() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("German");
        std::fs::create_dir(&root).unwrap();

        let mounted = MountedArchive::open(&root).unwrap();
        assert_eq!(mounted.root(), root.as_path());
        assert_eq!(mounted.name(), "German");
        assert_eq!(mounted.reader().unwrap().name(), "German");
    }

    #[test]
    fn test_missing_and_unsupported() {
        let temp = TempDir::new().unwrap();
        let missing = MountedArchive::open(temp.path().join("nope.zip")).unwrap_err();
        assert!(missing.is_archive_level());

        let text = temp.path().join("notes.txt");
        std::fs::write(&text, "hi").unwrap();
        let err = MountedArchive::open(&text).unwrap_err();
        assert!(matches!(err, Error::ArchiveUnreadable { .. }));
    }

    #[test]
    fn test_corrupt_zip() {
        let temp = TempDir::new().unwrap();
        let zip = temp.path().join("French.zip");
        std::fs::write(&zip, b"not a zip").unwrap();
        let err = MountedArchive::open(&zip).unwrap_err();
        assert!(matches!(err, Error::ArchiveUnreadable { .. }));
    }
}
