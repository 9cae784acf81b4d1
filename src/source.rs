//! Source locators and how they resolve to readable byte streams.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::interfaces::SourceResolver;
use crate::utils::path_utils::expand_tilde;

const FILE_SCHEME: &str = "file://";
const LOCAL_SCHEME: &str = "local://";

/// Extension used when the locator does not carry one.
pub const DEFAULT_EXTENSION: &str = "pdf";

/// An opaque reference to a file the caller wants uploaded.
///
/// Accepted forms are `file:///abs/path`, `local:///path` and bare paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocator(String);

impl SourceLocator {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path component of the locator, with the scheme removed.
    ///
    /// Returns `None` for schemes this crate cannot resolve (e.g. `content://`).
    pub fn path_part(&self) -> Option<&str> {
        if let Some(rest) = self.0.strip_prefix(FILE_SCHEME) {
            Some(rest)
        } else if let Some(rest) = self.0.strip_prefix(LOCAL_SCHEME) {
            Some(rest)
        } else if self.0.contains("://") {
            None
        } else {
            Some(self.0.as_str())
        }
    }

    /// Lowercased file extension of the last path segment, if any.
    pub fn extension(&self) -> Option<String> {
        let last = self.0.rsplit('/').next()?;
        let (stem, ext) = last.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Extension for generated object names, falling back to `pdf`.
    pub fn extension_or_default(&self) -> String {
        self.extension()
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    }

    pub fn content_type(&self) -> &'static str {
        content_type_for(self.extension().as_deref())
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceLocator {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for SourceLocator {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&Path> for SourceLocator {
    fn from(path: &Path) -> Self {
        Self::new(path.to_string_lossy().into_owned())
    }
}

/// MIME type sent with the object body.
pub fn content_type_for(ext: Option<&str>) -> &'static str {
    match ext {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Resolves locators against the local filesystem.
///
/// With a root set, `local:///cert.jpg` and relative paths resolve under it.
#[derive(Debug, Clone, Default)]
pub struct FsResolver {
    root: Option<PathBuf>,
}

impl FsResolver {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Filesystem path a locator points at.
    pub fn resolve_path(&self, locator: &SourceLocator) -> io::Result<PathBuf> {
        let raw = locator.path_part().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported locator scheme: {locator}"),
            )
        })?;
        if raw.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "locator has an empty path",
            ));
        }

        let expanded = expand_tilde(Path::new(raw))
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;

        Ok(match &self.root {
            Some(root) if locator.as_str().starts_with(LOCAL_SCHEME) || expanded.is_relative() => {
                root.join(expanded.strip_prefix("/").unwrap_or(&expanded))
            }
            _ => expanded,
        })
    }
}

impl SourceResolver for FsResolver {
    fn open(&self, locator: &SourceLocator) -> io::Result<Box<dyn Read + Send>> {
        let path = self.resolve_path(locator)?;
        let file = File::open(path)?;
        Ok(Box::new(file))
    }
}

/// Open the locator and read it until exhausted.
pub fn read_all(resolver: &dyn SourceResolver, locator: &SourceLocator) -> io::Result<Vec<u8>> {
    let mut reader = resolver.open(locator)?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn strips_known_schemes() {
        assert_eq!(SourceLocator::new("file:///tmp/a.jpg").path_part(), Some("/tmp/a.jpg"));
        assert_eq!(SourceLocator::new("local:///cert.jpg").path_part(), Some("/cert.jpg"));
        assert_eq!(SourceLocator::new("photos/a.png").path_part(), Some("photos/a.png"));
        assert_eq!(SourceLocator::new("content://media/42").path_part(), None);
    }

    #[test]
    fn extension_falls_back_to_pdf() {
        assert_eq!(SourceLocator::new("local:///cert.JPG").extension().as_deref(), Some("jpg"));
        assert_eq!(SourceLocator::new("local:///scan").extension_or_default(), "pdf");
        assert_eq!(SourceLocator::new("local:///.hidden").extension(), None);
        assert_eq!(SourceLocator::new("a/b.c/scan").extension(), None);
    }

    #[test]
    fn content_types() {
        assert_eq!(SourceLocator::new("x.jpeg").content_type(), "image/jpeg");
        assert_eq!(SourceLocator::new("x.pdf").content_type(), "application/pdf");
        assert_eq!(SourceLocator::new("x.bin").content_type(), "application/octet-stream");
    }

    #[test]
    fn local_scheme_resolves_under_root() {
        let resolver = FsResolver::with_root("/data");
        let path = resolver
            .resolve_path(&SourceLocator::new("local:///cert.jpg"))
            .unwrap();
        assert_eq!(path, PathBuf::from("/data/cert.jpg"));

        let abs = resolver
            .resolve_path(&SourceLocator::new("file:///etc/hosts"))
            .unwrap();
        assert_eq!(abs, PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn unsupported_scheme_is_an_io_error() {
        let err = FsResolver::new()
            .resolve_path(&SourceLocator::new("content://media/1"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn read_all_returns_every_byte() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let payload: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        file.write_all(&payload).unwrap();

        let locator = SourceLocator::from(file.path());
        let bytes = read_all(&FsResolver::new(), &locator).unwrap();
        assert_eq!(bytes, payload);
    }
}
