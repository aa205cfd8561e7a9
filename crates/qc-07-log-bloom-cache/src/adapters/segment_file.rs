//! # File Segment Store
//!
//! One file per segment, `logBloom-{index}.index`, holding a flat array of
//! 256-byte digest slots with no header, footer or checksum.
//!
//! Uses `fs2` advisory locks so a reader never sees a half-written slot:
//! writers hold an exclusive lock across write + `sync_data`, readers hold
//! a shared lock for one slot read. Readers never block each other.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use shared_types::BlockNumber;
use tracing::{debug, warn};

use crate::domain::{
    parse_segment_file_name, segment_file_name, BloomDigest, CacheConfig, SegmentIndex,
    SegmentLayout, SlotState, DIGEST_BYTES,
};
use crate::error::{CacheError, ConfigError};
use crate::ports::SegmentStore;

/// Segment store backed by files under a root directory.
#[derive(Clone, Debug)]
pub struct FileSegmentStore {
    root: PathBuf,
    layout: SegmentLayout,
}

impl FileSegmentStore {
    /// Create a store over `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>, layout: SegmentLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    /// Store for `config`, or `None` when caching is disabled.
    pub fn from_config(config: &CacheConfig) -> Result<Option<Self>, ConfigError> {
        let layout = config.layout()?;
        Ok(config
            .cache_dir
            .as_ref()
            .map(|root| Self::new(root.clone(), layout)))
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `segment`'s file.
    pub fn segment_path(&self, segment: SegmentIndex) -> PathBuf {
        self.root.join(segment_file_name(segment))
    }

    /// Indices of every segment file under the root, ascending.
    pub fn segments(&self) -> Result<Vec<SegmentIndex>, CacheError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(&self.root, e)),
        };

        let mut segments = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io(&self.root, e))?;
            if let Some(segment) = entry.file_name().to_str().and_then(parse_segment_file_name) {
                segments.push(segment);
            }
        }
        segments.sort_unstable();
        Ok(segments)
    }

    fn read_slot(
        &self,
        file: &mut File,
        path: &Path,
        block: BlockNumber,
    ) -> Result<Option<BloomDigest>, CacheError> {
        let len = file.metadata().map_err(|e| CacheError::io(path, e))?.len();
        match self.layout.slot_state(block, len) {
            SlotState::Unwritten => Ok(None),
            SlotState::Torn => Err(CacheError::Truncated {
                segment: self.layout.segment_index(block),
                slot: self.layout.slot(block),
                file_len: len,
            }),
            SlotState::Present => {
                let mut bytes = [0u8; DIGEST_BYTES];
                file.seek(SeekFrom::Start(self.layout.slot_offset(block)))
                    .map_err(|e| CacheError::io(path, e))?;
                file.read_exact(&mut bytes)
                    .map_err(|e| CacheError::io(path, e))?;
                Ok(Some(BloomDigest::from_bytes(bytes)))
            }
        }
    }

    fn release(file: &File, path: &Path) {
        if let Err(e) = FileExt::unlock(file) {
            warn!(path = %path.display(), error = %e, "Segment unlock failed, lock drops on close");
        }
    }

    fn open_for_write(&self, segment: SegmentIndex) -> Result<(File, PathBuf), CacheError> {
        fs::create_dir_all(&self.root).map_err(|e| CacheError::io(&self.root, e))?;
        let path = self.segment_path(segment);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| CacheError::io(&path, e))?;
        Ok((file, path))
    }

    fn write_run(
        &self,
        file: &mut File,
        path: &Path,
        first_block: BlockNumber,
        digests: &[BloomDigest],
    ) -> Result<(), CacheError> {
        let len = file.metadata().map_err(|e| CacheError::io(path, e))?.len();
        if let Some(torn) = self.layout.torn_tail_overrun(first_block, len) {
            warn!(
                path = %path.display(),
                len,
                slot = torn,
                "Refusing to extend segment past a torn slot; rewrite that block first"
            );
            return Err(CacheError::Truncated {
                segment: self.layout.segment_index(first_block),
                slot: torn,
                file_len: len,
            });
        }

        let mut bytes = Vec::with_capacity(digests.len() * DIGEST_BYTES);
        for digest in digests {
            bytes.extend_from_slice(digest.as_bytes());
        }
        file.seek(SeekFrom::Start(self.layout.slot_offset(first_block)))
            .map_err(|e| CacheError::io(path, e))?;
        file.write_all(&bytes).map_err(|e| CacheError::io(path, e))?;
        file.sync_data().map_err(|e| CacheError::io(path, e))
    }
}

impl SegmentStore for FileSegmentStore {
    fn layout(&self) -> SegmentLayout {
        self.layout
    }

    fn segment_exists(&self, segment: SegmentIndex) -> bool {
        let path = self.segment_path(segment);
        match fs::metadata(&path) {
            Ok(metadata) => metadata.is_file(),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Segment metadata check failed, treating as absent");
                false
            }
        }
    }

    fn read_digest(&self, block: BlockNumber) -> Result<Option<BloomDigest>, CacheError> {
        let segment = self.layout.segment_index(block);
        let path = self.segment_path(segment);
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CacheError::SegmentMissing { segment })
            }
            Err(e) => return Err(CacheError::io(&path, e)),
        };

        FileExt::lock_shared(&file).map_err(|e| CacheError::io(&path, e))?;
        let result = self.read_slot(&mut file, &path, block);
        Self::release(&file, &path);
        result
    }

    fn write_digest(&self, block: BlockNumber, digest: &BloomDigest) -> Result<(), CacheError> {
        let segment = self.layout.segment_index(block);
        let (mut file, path) = self.open_for_write(segment)?;

        FileExt::lock_exclusive(&file).map_err(|e| CacheError::io(&path, e))?;
        let result = self.write_run(&mut file, &path, block, std::slice::from_ref(digest));
        Self::release(&file, &path);
        result
    }

    fn write_segment(
        &self,
        segment: SegmentIndex,
        digests: &[BloomDigest],
    ) -> Result<(), CacheError> {
        if digests.len() as u64 > self.layout.capacity() {
            return Err(CacheError::SegmentOverflow {
                segment,
                capacity: self.layout.capacity(),
                count: digests.len() as u64,
            });
        }
        let (mut file, path) = self.open_for_write(segment)?;

        FileExt::lock_exclusive(&file).map_err(|e| CacheError::io(&path, e))?;
        let result = self.write_run(&mut file, &path, self.layout.first_block(segment), digests);
        Self::release(&file, &path);

        debug!(segment, slots = digests.len(), "Wrote segment run");
        result
    }
}
