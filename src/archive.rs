//! # Archive Access
//!
//! Read-only access to zip containers behind the [`ArchiveReader`] trait.
//! Every call opens the archive afresh, so a reader is just a path and can be
//! moved into blocking tasks freely.

use crate::error::ToolError;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::result::ZipError;
use zip::{CompressionMethod, ZipArchive};

/// Metadata of one archive entry, as printed by `zipscope meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryMeta {
    pub name: String,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub method: String,
    pub crc32: String,
    pub is_directory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

pub trait ArchiveReader: Send + Sync {
    /// Entry names in central-directory order.
    fn list_entry_names(&self) -> Result<Vec<String>, ToolError>;

    fn read_entry_metadata(&self) -> Result<Vec<EntryMeta>, ToolError>;

    /// Whole entry decoded as UTF-8 (invalid sequences replaced).
    fn read_entry_text(&self, name: &str) -> Result<String, ToolError>;

    /// Write one entry to `dest`, creating parent directories. Directory
    /// entries create `dest` itself.
    fn extract_entry(&self, name: &str, dest: &Path) -> Result<(), ToolError>;
}

#[derive(Debug, Clone)]
pub struct ZipArchiveReader {
    path: PathBuf,
}

impl ZipArchiveReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<ZipArchive<File>, ToolError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ToolError::ArchiveNotFound {
                path: self.path.clone(),
            },
            _ => ToolError::ArchiveRead {
                detail: format!("{}: {e}", self.path.display()),
            },
        })?;
        ZipArchive::new(file).map_err(|e| self.zip_error(e, None))
    }

    fn zip_error(&self, err: ZipError, entry: Option<&str>) -> ToolError {
        match (err, entry) {
            (ZipError::FileNotFound, Some(name)) => ToolError::EntryNotFound {
                name: name.to_string(),
            },
            (err, _) => ToolError::ArchiveRead {
                detail: format!("{}: {err}", self.path.display()),
            },
        }
    }
}

pub fn is_directory_name(name: &str) -> bool {
    name.ends_with('/')
}

/// `store` and `deflate` by name, anything else as its numeric method code.
pub fn method_label(method: CompressionMethod) -> String {
    match method {
        CompressionMethod::Stored => "store".to_string(),
        CompressionMethod::Deflated => "deflate".to_string(),
        other => method_code(&format!("{other:?}")),
    }
}

/// zip exposes no stable accessor for the raw method id. Methods it cannot
/// decode debug-print as `Unsupported(N)`; named ones map to their APPNOTE
/// numbers.
fn method_code(debug: &str) -> String {
    if let Some(code) = debug
        .strip_prefix("Unsupported(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return code.to_string();
    }
    let code = match debug {
        "Deflate64" => 9,
        "Bzip2" => 12,
        "Lzma" => 14,
        "Zstd" => 93,
        "Xz" => 95,
        "Ppmd" => 98,
        "Aes" => 99,
        _ => return debug.to_lowercase(),
    };
    code.to_string()
}

/// Zip timestamps carry no zone; they are reported as-is with a `Z` suffix.
fn timestamp_label(dt: zip::DateTime) -> Option<String> {
    let date = chrono::NaiveDate::from_ymd_opt(
        i32::from(dt.year()),
        u32::from(dt.month()),
        u32::from(dt.day()),
    )?;
    let stamp = date.and_hms_opt(
        u32::from(dt.hour()),
        u32::from(dt.minute()),
        u32::from(dt.second()),
    )?;
    Some(stamp.format("%Y-%m-%dT%H:%M:%S.000Z").to_string())
}

impl ArchiveReader for ZipArchiveReader {
    fn list_entry_names(&self) -> Result<Vec<String>, ToolError> {
        let mut archive = self.open()?;
        (0..archive.len())
            .map(|index| {
                archive
                    .by_index_raw(index)
                    .map(|entry| entry.name().to_string())
                    .map_err(|e| self.zip_error(e, None))
            })
            .collect()
    }

    fn read_entry_metadata(&self) -> Result<Vec<EntryMeta>, ToolError> {
        let mut archive = self.open()?;
        let mut metas = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| self.zip_error(e, None))?;
            let name = entry.name().to_string();
            metas.push(EntryMeta {
                is_directory: is_directory_name(&name),
                name,
                compressed_size: entry.compressed_size(),
                uncompressed_size: entry.size(),
                method: method_label(entry.compression()),
                crc32: format!("{:08x}", entry.crc32()),
                last_modified: entry.last_modified().and_then(timestamp_label),
            });
        }
        tracing::debug!(path = %self.path.display(), entries = metas.len(), "read archive metadata");
        Ok(metas)
    }

    fn read_entry_text(&self, name: &str) -> Result<String, ToolError> {
        let mut archive = self.open()?;
        let mut entry = archive
            .by_name(name)
            .map_err(|e| self.zip_error(e, Some(name)))?;
        let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| ToolError::ArchiveRead {
                detail: format!("{name}: {e}"),
            })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn extract_entry(&self, name: &str, dest: &Path) -> Result<(), ToolError> {
        let mut archive = self.open()?;
        let mut entry = archive
            .by_name(name)
            .map_err(|e| self.zip_error(e, Some(name)))?;
        if is_directory_name(name) {
            return fs::create_dir_all(dest)
                .map_err(|e| ToolError::io(format!("create {}", dest.display()), e));
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ToolError::io(format!("create {}", parent.display()), e))?;
        }
        let mut out = File::create(dest)
            .map_err(|e| ToolError::io(format!("create {}", dest.display()), e))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| ToolError::io(format!("extract {name}"), e))?;
        tracing::debug!(entry = name, dest = %dest.display(), "extracted entry");
        Ok(())
    }
}

/// One entry extracted into its own temporary directory. The directory is
/// removed when this is dropped unless [`ScratchFile::keep`] is called.
#[derive(Debug)]
pub struct ScratchFile {
    dir: TempDir,
    file: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.file
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Leave the file on disk (an external viewer may still be reading it)
    /// and return its path.
    pub fn keep(self) -> PathBuf {
        let _ = self.dir.keep();
        self.file
    }
}

/// Extract `name` into a fresh scratch directory, keeping its base name.
pub fn extract_to_scratch(
    reader: &dyn ArchiveReader,
    name: &str,
) -> Result<ScratchFile, ToolError> {
    let dir = tempfile::Builder::new()
        .prefix("zipscope-")
        .tempdir()
        .map_err(|e| ToolError::io("create scratch directory", e))?;
    let base = Path::new(name.trim_end_matches('/'))
        .file_name()
        .map_or_else(|| "entry".into(), std::ffi::OsStr::to_os_string);
    let file = dir.path().join(base);
    reader.extract_entry(name, &file)?;
    Ok(ScratchFile { dir, file })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(dir: &Path) -> PathBuf {
        let path = dir.join("sample.zip");
        let file = File::create(&path).expect("create zip");
        let mut writer = zip::ZipWriter::new(file);
        let stamp = zip::DateTime::from_date_and_time(2024, 5, 6, 7, 8, 10).expect("date");
        let stored = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(stamp);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(stamp);

        writer.start_file("readme.txt", stored).expect("start");
        writer.write_all(b"hello zip").expect("write");
        writer.add_directory("data/", stored).expect("dir");
        writer.start_file("data/doc.json", deflated).expect("start");
        writer
            .write_all(br#"{"title":"doc","items":[1,2,3]}"#)
            .expect("write");
        writer.finish().expect("finish");
        path
    }

    #[test]
    fn test_list_entry_names_in_archive_order() {
        let tmp = TempDir::new().expect("tempdir");
        let reader = ZipArchiveReader::new(build_zip(tmp.path()));
        assert_eq!(
            reader.list_entry_names().expect("names"),
            vec!["readme.txt", "data/", "data/doc.json"]
        );
    }

    #[test]
    fn test_metadata_fields() {
        let tmp = TempDir::new().expect("tempdir");
        let reader = ZipArchiveReader::new(build_zip(tmp.path()));
        let metas = reader.read_entry_metadata().expect("metadata");
        assert_eq!(metas.len(), 3);

        let readme = &metas[0];
        assert_eq!(readme.method, "store");
        assert_eq!(readme.uncompressed_size, 9);
        assert_eq!(readme.compressed_size, 9);
        assert_eq!(readme.crc32.len(), 8);
        assert_eq!(readme.crc32, format!("{:08x}", crc_of(b"hello zip")));
        assert_eq!(readme.last_modified.as_deref(), Some("2024-05-06T07:08:10.000Z"));
        assert!(!readme.is_directory);

        assert!(metas[1].is_directory);
        assert_eq!(metas[2].method, "deflate");
    }

    fn crc_of(bytes: &[u8]) -> u32 {
        // Bitwise CRC-32 (IEEE), enough to cross-check the archive's value.
        let mut crc = 0xffff_ffffu32;
        for &b in bytes {
            crc ^= u32::from(b);
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xedb8_8320 & mask);
            }
        }
        !crc
    }

    #[test]
    fn test_read_entry_text_and_missing_entry() {
        let tmp = TempDir::new().expect("tempdir");
        let reader = ZipArchiveReader::new(build_zip(tmp.path()));
        assert_eq!(reader.read_entry_text("readme.txt").expect("text"), "hello zip");
        let err = reader.read_entry_text("nope.txt").expect_err("missing");
        assert_eq!(err.kind(), "ERR_ENTRY_NOT_FOUND");
    }

    #[test]
    fn test_missing_archive_and_corrupt_archive() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = ZipArchiveReader::new(tmp.path().join("missing.zip"));
        assert_eq!(
            missing.list_entry_names().expect_err("missing").kind(),
            "ERR_ZIP_NOT_FOUND"
        );

        let junk = tmp.path().join("junk.zip");
        fs::write(&junk, b"definitely not a zip").expect("write");
        let corrupt = ZipArchiveReader::new(junk);
        assert_eq!(corrupt.read_entry_metadata().expect_err("corrupt").kind(), "ERR_ZIP");
    }

    #[test]
    fn test_extract_entry_creates_parents() {
        let tmp = TempDir::new().expect("tempdir");
        let reader = ZipArchiveReader::new(build_zip(tmp.path()));
        let dest = tmp.path().join("out").join("nested").join("doc.json");
        reader.extract_entry("data/doc.json", &dest).expect("extract");
        let text = fs::read_to_string(&dest).expect("read back");
        assert!(text.contains("\"items\""));

        let dir_dest = tmp.path().join("out").join("data");
        reader.extract_entry("data/", &dir_dest).expect("extract dir");
        assert!(dir_dest.is_dir());
    }

    #[test]
    fn test_extract_to_scratch_cleans_up_unless_kept() {
        let tmp = TempDir::new().expect("tempdir");
        let reader = ZipArchiveReader::new(build_zip(tmp.path()));

        let scratch = extract_to_scratch(&reader, "data/doc.json").expect("scratch");
        assert_eq!(scratch.path().file_name().and_then(|n| n.to_str()), Some("doc.json"));
        let dir = scratch.dir().to_path_buf();
        assert!(scratch.path().is_file());
        drop(scratch);
        assert!(!dir.exists());

        let kept = extract_to_scratch(&reader, "readme.txt").expect("scratch").keep();
        assert!(kept.is_file());
        if let Some(parent) = kept.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn test_unknown_methods_print_their_code() {
        assert_eq!(method_label(CompressionMethod::Stored), "store");
        assert_eq!(method_label(CompressionMethod::Deflated), "deflate");
        assert_eq!(method_code("Unsupported(12)"), "12");
        assert_eq!(method_code("Bzip2"), "12");
        assert_eq!(method_code("Aes"), "99");
    }
}
