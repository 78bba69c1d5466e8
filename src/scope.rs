//! Scope identity
//!
//! The namespace this adapter instance serves. Requests for any other
//! namespace are answered with an empty list.

use std::fmt;
use std::path::Path;

use crate::error::ScopeLoadError;
use tracing::{info, warn};

/// Default location of the pod's namespace file
pub const DEFAULT_NAMESPACE_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// The single namespace this adapter is allowed to serve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeIdentity {
    namespace: String,
}

impl ScopeIdentity {
    /// Create a scope identity from a namespace string
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Load the namespace from a file
    ///
    /// The file contents are kept byte for byte; surrounding whitespace is not
    /// trimmed, so a trailing newline becomes part of the namespace.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScopeLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ScopeLoadError::Unreadable {
            path: path.display().to_string(),
            source: e,
        })?;

        let namespace = String::from_utf8(bytes).map_err(|_| ScopeLoadError::NotUtf8 {
            path: path.display().to_string(),
        })?;

        if namespace.trim_end() != namespace {
            warn!(
                namespace_path = %path.display(),
                namespace = ?namespace,
                "Namespace file has trailing whitespace; requests must match it exactly"
            );
        }

        info!(
            namespace_path = %path.display(),
            namespace = %namespace,
            "Loaded namespace"
        );

        Ok(Self { namespace })
    }

    /// Namespace string
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether a request for `namespace` falls inside this scope
    pub fn admits(&self, namespace: &str) -> bool {
        self.namespace == namespace
    }
}

impl fmt::Display for ScopeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_preserves_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("namespace");
        std::fs::write(&path, "testing.xyz\n").unwrap();

        let scope = ScopeIdentity::load(&path).unwrap();
        assert_eq!(scope.namespace(), "testing.xyz\n");
        assert!(!scope.admits("testing.xyz"));
        assert!(scope.admits("testing.xyz\n"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = ScopeIdentity::load(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, ScopeLoadError::Unreadable { .. }));
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("namespace");
        std::fs::write(&path, [0xff, 0xfe]).unwrap();

        let err = ScopeIdentity::load(&path).unwrap_err();
        assert!(matches!(err, ScopeLoadError::NotUtf8 { .. }));
    }
}
