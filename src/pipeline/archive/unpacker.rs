use std::io::{Read, Seek};

use zip::ZipArchive;

use super::format::{classify_entry, display_size, EntryKind};
use super::ArchiveError;
use crate::pipeline::error::{IntakeError, RejectionError};

/// What an envelope archive contains: the raw metafile and the PDF names.
///
/// The metadata buffer is owned exclusively by this value; readers always get
/// an independent copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipContentDetail {
    metadata: Option<Vec<u8>>,
    pdf_file_names: Vec<String>,
}

impl ZipContentDetail {
    pub fn new(metadata: Option<Vec<u8>>, pdf_file_names: Vec<String>) -> Self {
        Self {
            metadata,
            pdf_file_names,
        }
    }

    /// Copy of the metafile bytes, if the archive had one.
    pub fn metadata(&self) -> Option<Vec<u8>> {
        self.metadata.clone()
    }

    /// Attachment entry names in archive order.
    pub fn pdf_file_names(&self) -> &[String] {
        &self.pdf_file_names
    }
}

/// Scan an envelope archive entry by entry, in archive order.
///
/// `.json` entries are buffered as the metafile, `.pdf` entries are recorded
/// by name only. Any other file stops the scan with a rejection naming the
/// entry. A second metafile is rejected as well.
///
/// Entry sizes come from the central directory, so archives written by
/// streaming writers (sizes in a trailing data descriptor) are read too.
pub fn read_zip_content_detail<R: Read + Seek>(
    reader: R,
    zip_file_name: &str,
) -> Result<ZipContentDetail, IntakeError> {
    let mut archive = ZipArchive::new(reader).map_err(ArchiveError::from)?;
    let mut metadata: Option<(String, Vec<u8>)> = None;
    let mut pdfs = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(ArchiveError::from)?;
        if entry.is_dir() {
            continue;
        }
        let entry_name = entry.name().to_string();

        match classify_entry(&entry_name) {
            EntryKind::Metadata => {
                if let Some((first, _)) = &metadata {
                    return Err(RejectionError::MultipleMetadataFiles {
                        zip_file_name: zip_file_name.to_string(),
                        first: first.clone(),
                        second: entry_name,
                    }
                    .into());
                }
                let mut buffer = Vec::new();
                entry
                    .read_to_end(&mut buffer)
                    .map_err(ArchiveError::from)?;
                tracing::info!(
                    zip_file_name = %zip_file_name,
                    size = %display_size(buffer.len() as u64),
                    "Metadata read from archive"
                );
                metadata = Some((entry_name, buffer));
            }
            EntryKind::Pdf => pdfs.push(entry_name),
            EntryKind::Unsupported => {
                return Err(RejectionError::NonPdfFile {
                    zip_file_name: zip_file_name.to_string(),
                    entry_name,
                }
                .into());
            }
        }
    }

    tracing::info!(
        zip_file_name = %zip_file_name,
        pdf_count = pdfs.len(),
        "PDFs found in archive"
    );

    Ok(ZipContentDetail::new(metadata.map(|(_, bytes)| bytes), pdfs))
}
