use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;

use super::format::{classify_entry, display_size, sanitize_filename, EntryKind};
use super::ArchiveError;
use crate::config::MAX_PDF_SIZE;
use crate::pipeline::error::{IntakeError, RejectionError};

/// Materialises an archive's PDFs into a per-archive temporary directory.
///
/// The directory lives only for the duration of one `extract_pdf_files` call.
#[derive(Debug, Clone)]
pub struct PdfStaging {
    download_root: PathBuf,
    max_file_size: u64,
}

impl PdfStaging {
    pub fn new(download_root: impl Into<PathBuf>) -> Self {
        Self {
            download_root: download_root.into(),
            max_file_size: MAX_PDF_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Write every PDF entry of `reader` to a fresh temp dir, check sizes,
    /// then hand the paths to `consumer`.
    ///
    /// The temp dir is removed afterwards whatever the outcome. A failed
    /// removal is logged and does not replace the result.
    pub fn extract_pdf_files<R, T, E, F>(
        &self,
        reader: R,
        zip_file_name: &str,
        consumer: F,
    ) -> Result<T, E>
    where
        R: Read + Seek,
        E: From<IntakeError>,
        F: FnOnce(&[PathBuf]) -> Result<T, E>,
    {
        std::fs::create_dir_all(&self.download_root)
            .map_err(|e| IntakeError::from(ArchiveError::from(e)))?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-", sanitize_filename(zip_file_name)))
            .tempdir_in(&self.download_root)
            .map_err(|e| IntakeError::from(ArchiveError::from(e)))?;

        let result = self
            .write_pdfs(reader, dir.path())
            .and_then(|files| {
                check_file_sizes_against_upload_limit(&files, self.max_file_size)?;
                Ok(files)
            })
            .map_err(E::from)
            .and_then(|files| consumer(&files));

        close_quietly(dir, zip_file_name);
        result
    }

    fn write_pdfs<R: Read + Seek>(
        &self,
        reader: R,
        target: &Path,
    ) -> Result<Vec<PathBuf>, IntakeError> {
        let mut archive = ZipArchive::new(reader).map_err(ArchiveError::from)?;
        let mut files = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(ArchiveError::from)?;
            if entry.is_dir() || classify_entry(entry.name()) != EntryKind::Pdf {
                continue;
            }
            let path = target.join(sanitize_filename(entry.name()));
            let mut out = File::create(&path).map_err(ArchiveError::from)?;
            let written = io::copy(&mut entry, &mut out).map_err(ArchiveError::from)?;

            tracing::debug!(
                file = %path.display(),
                size = %display_size(written),
                "PDF extracted"
            );
            files.push(path);
        }

        Ok(files)
    }
}

/// Reject the first file larger than `max_file_size`. Returns the total size.
pub fn check_file_sizes_against_upload_limit(
    files: &[PathBuf],
    max_file_size: u64,
) -> Result<u64, IntakeError> {
    let mut total = 0u64;
    for file in files {
        let size = std::fs::metadata(file).map_err(ArchiveError::from)?.len();
        if size > max_file_size {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(RejectionError::FileSizeExceeded {
                file_name,
                size,
                max: max_file_size,
            }
            .into());
        }
        total += size;
    }
    Ok(total)
}

fn close_quietly(dir: TempDir, zip_file_name: &str) {
    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        tracing::warn!(
            zip_file_name = %zip_file_name,
            dir = %path.display(),
            error = %e,
            "Failed to delete temporary directory"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{streamed_zip_bytes, zip_bytes};
    use std::io::Cursor;

    fn sample_archive() -> Vec<u8> {
        zip_bytes(&[
            ("metadata.json", b"{}"),
            ("1111001.pdf", b"%PDF-1.4 first"),
            ("nested/1111002.pdf", b"%PDF-1.4 second"),
        ])
    }

    fn remaining_entries(root: &Path) -> usize {
        std::fs::read_dir(root).unwrap().count()
    }

    #[test]
    fn consumer_sees_extracted_pdfs_by_base_name() {
        let root = tempfile::tempdir().unwrap();
        let staging = PdfStaging::new(root.path());
        let bytes = sample_archive();

        let names = staging
            .extract_pdf_files(&mut Cursor::new(bytes), "env.zip", |files| {
                for f in files {
                    assert!(f.exists());
                }
                Ok::<_, IntakeError>(
                    files
                        .iter()
                        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
                        .collect::<Vec<_>>(),
                )
            })
            .unwrap();

        assert_eq!(names, vec!["1111001.pdf", "1111002.pdf"]);
        assert_eq!(remaining_entries(root.path()), 0);
    }

    #[test]
    fn content_is_written_verbatim() {
        let root = tempfile::tempdir().unwrap();
        let staging = PdfStaging::new(root.path());
        let content = staging
            .extract_pdf_files(&mut Cursor::new(sample_archive()), "env.zip", |files| {
                Ok::<_, IntakeError>(std::fs::read(&files[0]).unwrap())
            })
            .unwrap();
        assert_eq!(content, b"%PDF-1.4 first");
    }

    #[test]
    fn extracts_from_archives_with_data_descriptors() {
        let root = tempfile::tempdir().unwrap();
        let staging = PdfStaging::new(root.path());
        let bytes = streamed_zip_bytes(&[
            ("metadata.json", b"{}"),
            ("1111001.pdf", b"%PDF-1.4 streamed"),
        ]);

        let content = staging
            .extract_pdf_files(Cursor::new(bytes), "env.zip", |files| {
                assert_eq!(files.len(), 1);
                Ok::<_, IntakeError>(std::fs::read(&files[0]).unwrap())
            })
            .unwrap();
        assert_eq!(content, b"%PDF-1.4 streamed");
        assert_eq!(remaining_entries(root.path()), 0);
    }

    #[test]
    fn temp_dir_removed_when_consumer_fails() {
        let root = tempfile::tempdir().unwrap();
        let staging = PdfStaging::new(root.path());

        let result: Result<(), IntakeError> =
            staging.extract_pdf_files(&mut Cursor::new(sample_archive()), "env.zip", |_| {
                Err(RejectionError::MetadataNotFound.into())
            });

        assert!(result.is_err());
        assert_eq!(remaining_entries(root.path()), 0);
    }

    #[test]
    fn oversized_pdf_is_rejected_before_consumer_runs() {
        let root = tempfile::tempdir().unwrap();
        let staging = PdfStaging::new(root.path()).with_max_file_size(5);
        let mut called = false;

        let result: Result<(), IntakeError> =
            staging.extract_pdf_files(&mut Cursor::new(sample_archive()), "env.zip", |_| {
                called = true;
                Ok(())
            });

        assert!(!called);
        let err = result.unwrap_err();
        match err.as_rejection() {
            Some(RejectionError::FileSizeExceeded { file_name, size, max }) => {
                assert_eq!(file_name, "1111001.pdf");
                assert_eq!(*size, 14);
                assert_eq!(*max, 5);
            }
            other => panic!("expected FileSizeExceeded, got {other:?}"),
        }
        assert_eq!(remaining_entries(root.path()), 0);
    }

    #[test]
    fn size_check_sums_accepted_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, b"12345").unwrap();
        std::fs::write(&b, b"123").unwrap();

        assert_eq!(check_file_sizes_against_upload_limit(&[a.clone(), b], 5).unwrap(), 8);
        std::fs::write(&a, b"123456").unwrap();
        assert!(check_file_sizes_against_upload_limit(&[a], 5).is_err());
    }

    #[test]
    fn default_limit_is_300_mib() {
        let staging = PdfStaging::new("/tmp");
        assert_eq!(staging.max_file_size, 300 * 1024 * 1024);
    }
}
