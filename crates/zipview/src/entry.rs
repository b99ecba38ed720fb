//! Archive members as viewer entries

use std::sync::Arc;

use remotezip::{Member, RemoteArchive};
use tracing::debug;
use zipcache::{Entry, LoadError, LoadFuture, Sequence};

use crate::picture::Picture;

/// One file member of an opened archive
pub struct ArchiveImage {
    archive: Arc<RemoteArchive>,
    member: Member,
}

impl ArchiveImage {
    pub fn new(archive: Arc<RemoteArchive>, member: Member) -> Self {
        Self { archive, member }
    }

    pub fn member(&self) -> &Member {
        &self.member
    }
}

impl Entry for ArchiveImage {
    type Image = Picture;

    fn filename(&self) -> &str {
        &self.member.name
    }

    fn load(&self) -> LoadFuture<Picture> {
        let archive = Arc::clone(&self.archive);
        let zip_index = self.member.zip_index;

        Box::pin(async move {
            // Range reads and decoding are both blocking work
            tokio::task::spawn_blocking(move || {
                let data = archive.read(zip_index).map_err(LoadError::new)?;
                debug!(zip_index, bytes = data.len(), "decoding member");
                Picture::decode(data).map_err(LoadError::new)
            })
            .await
            .map_err(LoadError::new)?
        })
    }
}

/// Naturally ordered sequence over every file member of `archive`
pub fn sequence(archive: Arc<RemoteArchive>) -> Sequence<ArchiveImage> {
    let entries = archive
        .members()
        .iter()
        .cloned()
        .map(|member| ArchiveImage::new(Arc::clone(&archive), member))
        .collect();
    Sequence::from_unordered(entries)
}

/// In-memory archive holding `files`
#[cfg(test)]
pub(crate) fn test_archive(files: &[(&str, Vec<u8>)]) -> Arc<RemoteArchive> {
    use bytes::Bytes;
    use remotezip::ArchiveOptions;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    let bytes = writer.finish().unwrap().into_inner();

    let source = Box::new(Bytes::from(bytes));
    Arc::new(RemoteArchive::from_source("test.zip", source, ArchiveOptions::default()).unwrap())
}
