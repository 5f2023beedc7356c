use std::collections::HashSet;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, instrument};

use crate::digest::VertexDigest;
use crate::error::ResolveError;

/// Called once per resolved import, after it's been fetched (or read back
/// from the vendor tree) and parsed. Generic, never `dyn` (§9) — a caller
/// with nothing to do passes `VendorVisitor`'s no-marking sibling or composes
/// its own.
pub trait Visitor: Send + Sync {
    fn visit(
        &self,
        digest: &VertexDigest,
        source: &str,
    ) -> impl Future<Output = Result<(), ResolveError>> + Send;
}

fn vendor_path(vendor_root: &Path, digest: &VertexDigest, filename: &str) -> PathBuf {
    let (algo, head, tail) = digest.path_parts();
    vendor_root.join(algo).join(head).join(tail).join(filename)
}

/// Writes the vendored copy of an imported module if it isn't already on
/// disk. Append/overwrite-only (§4.8) — an existing file is left untouched
/// rather than re-derived, since the digest already guarantees its content
/// matches.
pub struct VendorVisitor {
    vendor_root: PathBuf,
    filename: String,
}

impl VendorVisitor {
    pub fn new(vendor_root: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            vendor_root: vendor_root.into(),
            filename: filename.into(),
        }
    }

    pub fn path_for(&self, digest: &VertexDigest) -> PathBuf {
        vendor_path(&self.vendor_root, digest, &self.filename)
    }
}

impl Visitor for VendorVisitor {
    #[instrument(skip(self, source), fields(digest = %digest))]
    async fn visit(&self, digest: &VertexDigest, source: &str) -> Result<(), ResolveError> {
        let path = self.path_for(digest);
        if path.exists() {
            debug!(path = %path.display(), "already vendored");
            return Ok(());
        }
        let dir = path.parent().expect("vendor path always has a parent");
        fs::create_dir_all(dir).map_err(|e| ResolveError::ImportFailed {
            name: digest.to_string(),
            cause: e.to_string(),
            pos: None,
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
        }
        fs::write(&path, source).map_err(|e| ResolveError::ImportFailed {
            name: digest.to_string(),
            cause: e.to_string(),
            pos: None,
        })?;
        debug!(path = %path.display(), "vendored");
        Ok(())
    }
}

/// Wraps a `VendorVisitor`, recording every digest actually visited during a
/// traversal so a caller can sweep the vendor tree of anything no longer
/// reachable (§4.8 tidy / mark-and-sweep).
pub struct TidyVisitor {
    inner: VendorVisitor,
    marked: Mutex<HashSet<PathBuf>>,
}

impl TidyVisitor {
    pub fn new(vendor_root: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            inner: VendorVisitor::new(vendor_root, filename),
            marked: Mutex::new(HashSet::new()),
        }
    }

    /// Removes every file under the vendor root whose directory wasn't
    /// marked during the traversal this `TidyVisitor` just drove.
    pub fn sweep(&self, vendor_root: &Path) -> std::io::Result<usize> {
        let marked = self.marked.lock().unwrap();
        let mut removed = 0;
        if !vendor_root.exists() {
            return Ok(0);
        }
        for algo_dir in fs::read_dir(vendor_root)? {
            let algo_dir = algo_dir?.path();
            for head_dir in fs::read_dir(&algo_dir)? {
                let head_dir = head_dir?.path();
                for tail_dir in fs::read_dir(&head_dir)? {
                    let tail_dir = tail_dir?.path();
                    if !marked.contains(&tail_dir) {
                        fs::remove_dir_all(&tail_dir)?;
                        removed += 1;
                    }
                }
            }
        }
        Ok(removed)
    }
}

impl Visitor for TidyVisitor {
    async fn visit(&self, digest: &VertexDigest, source: &str) -> Result<(), ResolveError> {
        let path = self.inner.path_for(digest);
        let dir = path.parent().expect("vendor path always has a parent").to_path_buf();
        self.marked.lock().unwrap().insert(dir);
        self.inner.visit(digest, source).await
    }
}
