//! Wheel, zip and sdist extraction into a scratch directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::ParserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Wheel,
    Zip,
    TarGz,
}

impl ArchiveKind {
    #[must_use]
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".whl") {
            Some(Self::Wheel)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }

    const fn extension(self) -> &'static str {
        match self {
            Self::Wheel => ".whl",
            Self::Zip => ".zip",
            Self::TarGz => ".tar.gz",
        }
    }
}

/// Whether `path` names a supported package archive.
#[must_use]
pub fn is_archive(path: &Path) -> bool {
    ArchiveKind::detect(path).is_some()
}

/// Extract `archive` into `temp_dir/<stem>` and return that directory.
///
/// A previous extraction at the same location is removed first. A tarball that
/// unpacks into a single top-level folder has that folder's contents moved up.
pub fn extract(archive: &Path, temp_dir: &Path) -> Result<PathBuf, ParserError> {
    let kind = ArchiveKind::detect(archive)
        .ok_or_else(|| ParserError::UnsupportedArchive(archive.to_path_buf()))?;
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name
        .get(..file_name.len() - kind.extension().len())
        .unwrap_or(&file_name);
    let destination = temp_dir.join(stem);

    if destination.exists() {
        tracing::debug!(path = %destination.display(), "removing previous extraction");
        std::fs::remove_dir_all(&destination)?;
    }
    std::fs::create_dir_all(&destination)?;
    tracing::info!(archive = %archive.display(), to = %destination.display(), "extracting package");

    match kind {
        ArchiveKind::Wheel | ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
            zip.extract(&destination)?;
            Ok(destination)
        }
        ArchiveKind::TarGz => {
            let decoder = GzDecoder::new(File::open(archive)?);
            tar::Archive::new(decoder)
                .unpack(&destination)
                .map_err(|e| ParserError::Archive(format!("{}: {e}", archive.display())))?;
            flatten_single_folder(&destination)?;
            Ok(destination)
        }
    }
}

fn flatten_single_folder(dir: &Path) -> Result<(), ParserError> {
    let entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    let [only] = entries.as_slice() else {
        return Ok(());
    };
    if !only.is_dir() {
        return Ok(());
    }
    // The inner folder may contain an entry with its own name.
    let staging = dir.join(".apistub-flatten");
    std::fs::rename(only, &staging)?;
    for entry in std::fs::read_dir(&staging)? {
        let entry = entry?;
        std::fs::rename(entry.path(), dir.join(entry.file_name()))?;
    }
    std::fs::remove_dir(&staging)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn detects_archive_kinds() {
        assert_eq!(
            ArchiveKind::detect(Path::new("pkg-1.0-py3-none-any.whl")),
            Some(ArchiveKind::Wheel)
        );
        assert_eq!(
            ArchiveKind::detect(Path::new("pkg-1.0.tar.gz")),
            Some(ArchiveKind::TarGz)
        );
        assert!(is_archive(Path::new("pkg.ZIP")));
        assert!(!is_archive(Path::new("pkg-1.0")));
    }

    #[test]
    fn wheel_extracts_into_stem_dir() {
        let temp = tempfile::tempdir().unwrap();
        let wheel = temp.path().join("fake-1.0-py3-none-any.whl");
        {
            let mut zip = zip::ZipWriter::new(File::create(&wheel).unwrap());
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("fake/__init__.py", options).unwrap();
            zip.write_all(b"VALUE = 1\n").unwrap();
            zip.finish().unwrap();
        }
        let out = temp.path().join("out");
        let root = extract(&wheel, &out).unwrap();
        assert_eq!(root, out.join("fake-1.0-py3-none-any"));
        assert!(root.join("fake/__init__.py").exists());

        // A second run replaces the earlier extraction.
        std::fs::write(root.join("stale.txt"), "x").unwrap();
        let again = extract(&wheel, &out).unwrap();
        assert!(!again.join("stale.txt").exists());
    }

    #[test]
    fn tarball_single_folder_is_flattened() {
        let temp = tempfile::tempdir().unwrap();
        let tarball = temp.path().join("fake-1.0.tar.gz");
        {
            let encoder = GzEncoder::new(File::create(&tarball).unwrap(), Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let data = b"VALUE = 1\n";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, "fake-1.0/fake/__init__.py", &data[..])
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }
        let root = extract(&tarball, temp.path()).unwrap();
        assert_eq!(root, temp.path().join("fake-1.0"));
        assert!(root.join("fake/__init__.py").exists());
        assert!(!root.join("fake-1.0").exists());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let err = extract(Path::new("pkg.rar"), temp.path()).unwrap_err();
        assert!(matches!(err, ParserError::UnsupportedArchive(_)));
    }
}
