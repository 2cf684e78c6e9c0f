/*!
 * Shared Region
 * Named, file-backed memory mapping shared between two processes
 */

use crate::core::types::{LinkError, LinkResult};
use log::{debug, info};
use memmap2::MmapMut;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Named shared-memory region backed by a mapped file
///
/// Creation is published atomically: the creating process initializes a
/// private temp file and hard-links it into place, so an attaching process
/// never observes a partially initialized region. Reopening an existing
/// name attaches to the same region. The region outlives its processes and
/// is removed only by an explicit [`SharedRegion::unlink`].
#[derive(Debug)]
pub struct SharedRegion {
    path: PathBuf,
    map: MmapMut,
    created: bool,
}

impl SharedRegion {
    /// Create-or-attach to the region named `name`, sized `len` bytes
    ///
    /// `init` runs exactly once, on the process that creates the region,
    /// before the region becomes visible under `name`.
    pub fn open_with<F>(name: &str, len: usize, init: F) -> LinkResult<Self>
    where
        F: FnOnce(&mut MmapMut),
    {
        if name.is_empty() {
            return Err(LinkError::InvalidConfig("queue name is empty".to_string()));
        }
        let path = Self::resolve(name);
        let mut init = Some(init);

        loop {
            match OpenOptions::new().read(true).write(true).open(&path) {
                Ok(file) => {
                    // Attach to the published region
                    let file_len = file
                        .metadata()
                        .map_err(|e| Self::region_err("stat", &path, &e))?
                        .len() as usize;
                    if file_len < len {
                        return Err(LinkError::IncompatibleQueue {
                            name: name.to_string(),
                            reason: format!(
                                "backing file is {} bytes, expected at least {}",
                                file_len, len
                            ),
                        });
                    }
                    // SAFETY: the file is open read/write and at least `len`
                    // bytes long; the mapping's lifetime is tied to `self`.
                    let map = unsafe {
                        MmapMut::map_mut(&file).map_err(|e| Self::region_err("map", &path, &e))?
                    };
                    debug!("Attached to shared region '{}' ({} bytes)", name, file_len);
                    return Ok(Self {
                        path,
                        map,
                        created: false,
                    });
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    // Initialize privately, then publish via hard link; the
                    // link fails if a peer published first, in which case we
                    // discard our copy and attach to theirs.
                    let mut tmp_name = path.clone().into_os_string();
                    tmp_name.push(format!(".init.{}", std::process::id()));
                    let tmp = PathBuf::from(tmp_name);
                    let file = OpenOptions::new()
                        .read(true)
                        .write(true)
                        .create(true)
                        .truncate(true)
                        .open(&tmp)
                        .map_err(|e| Self::region_err("create", &tmp, &e))?;
                    file.set_len(len as u64)
                        .map_err(|e| Self::region_err("size", &tmp, &e))?;
                    // SAFETY: freshly created file of exactly `len` bytes,
                    // open read/write; mapping lifetime is tied to `self`.
                    let mut map = unsafe {
                        MmapMut::map_mut(&file).map_err(|e| Self::region_err("map", &tmp, &e))?
                    };
                    (init.take().expect("region init runs at most once"))(&mut map);

                    match fs::hard_link(&tmp, &path) {
                        Ok(()) => {
                            let _ = fs::remove_file(&tmp);
                            info!("Created shared region '{}' ({} bytes)", name, len);
                            return Ok(Self {
                                path,
                                map,
                                created: true,
                            });
                        }
                        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                            // Lost the creation race
                            let _ = fs::remove_file(&tmp);
                            continue;
                        }
                        Err(e) => {
                            let _ = fs::remove_file(&tmp);
                            return Err(Self::region_err("publish", &path, &e));
                        }
                    }
                }
                Err(e) => return Err(Self::region_err("open", &path, &e)),
            }
        }
    }

    /// Remove the backing store for `name`; no-op if it does not exist
    pub fn unlink(name: &str) -> LinkResult<()> {
        let path = Self::resolve(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Unlinked shared region '{}'", name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::region_err("unlink", &path, &e)),
        }
    }

    /// Base pointer of the mapping
    ///
    /// Consumed by downstream transport collaborators that program the
    /// region's address into a remote device.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.map.as_ptr()
    }

    /// Mutable base pointer of the mapping
    #[inline]
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.map.as_mut_ptr()
    }

    /// Mapped length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.len() == 0
    }

    /// Whether this handle created (rather than attached to) the region
    #[inline]
    #[must_use]
    pub fn is_creator(&self) -> bool {
        self.created
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a queue name to its backing file path
    ///
    /// Absolute names are used as-is; bare names land in the system temp
    /// directory so unrelated processes agree on the location.
    fn resolve(name: &str) -> PathBuf {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            std::env::temp_dir().join(name)
        }
    }

    fn region_err(op: &str, path: &Path, err: &std::io::Error) -> LinkError {
        LinkError::Region(format!("{} '{}': {}", op, path.display(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch_name(dir: &TempDir) -> String {
        dir.path().join("region").to_string_lossy().into_owned()
    }

    #[test]
    fn test_create_then_attach() {
        let dir = tempfile::tempdir().unwrap();
        let name = scratch_name(&dir);
        let first = SharedRegion::open_with(&name, 128, |map| {
            map[0] = 0xAB;
        })
        .unwrap();
        assert!(first.is_creator());
        first.map.flush().unwrap();

        let second = SharedRegion::open_with(&name, 128, |_| {
            panic!("init must not run for an attaching process");
        })
        .unwrap();
        assert!(!second.is_creator());
        assert_eq!(second.map[0], 0xAB);

        SharedRegion::unlink(&name).unwrap();
    }

    #[test]
    fn test_unlink_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let name = scratch_name(&dir);
        SharedRegion::unlink(&name).unwrap();
        SharedRegion::unlink(&name).unwrap();
    }

    #[test]
    fn test_attach_too_small_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let name = scratch_name(&dir);
        let _region = SharedRegion::open_with(&name, 64, |_| {}).unwrap();
        let err = SharedRegion::open_with(&name, 4096, |_| {}).unwrap_err();
        assert!(matches!(err, LinkError::IncompatibleQueue { .. }));
        SharedRegion::unlink(&name).unwrap();
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = SharedRegion::open_with("", 64, |_| {}).unwrap_err();
        assert!(matches!(err, LinkError::InvalidConfig(_)));
    }
}
