/// Root resolution: turning a [`PathSpec`] into an absolute path.
///
/// The engine only consumes the [`PathResolver`] capability. The default
/// [`BaseDirResolver`] anchors relative specs at a base directory, accepts
/// local `file:` URIs, and normalises the result lexically (no filesystem
/// access, so a root that does not exist still resolves).
use crate::error::ResolveError;
use crate::model::PathSpec;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Capability that resolves one root specification.
pub trait PathResolver: Send + Sync {
    fn resolve(&self, spec: &PathSpec) -> Result<PathBuf, ResolveError>;
}

/// Resolves relative specs against a fixed base directory.
#[derive(Debug, Clone)]
pub struct BaseDirResolver {
    base: PathBuf,
}

impl BaseDirResolver {
    /// `base` should be absolute; a relative base is normalised as-is.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: normalise(&base.into()),
        }
    }

    /// Anchor at the process working directory.
    pub fn current_dir() -> Result<Self, ResolveError> {
        let cwd = std::env::current_dir().map_err(ResolveError::CurrentDir)?;
        Ok(Self::new(cwd))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl PathResolver for BaseDirResolver {
    fn resolve(&self, spec: &PathSpec) -> Result<PathBuf, ResolveError> {
        if spec.is_empty() {
            return Err(ResolveError::Empty);
        }

        let path = match spec.as_os_str().to_str() {
            Some(s) => match uri_scheme(s) {
                Some(scheme) if scheme.eq_ignore_ascii_case("file") => file_uri_path(s)?,
                Some(scheme) => {
                    return Err(ResolveError::UnsupportedScheme {
                        spec: s.to_owned(),
                        scheme: scheme.to_owned(),
                    })
                }
                None => PathBuf::from(s),
            },
            // Non-UTF-8 specs cannot be URIs.
            None => spec.as_path().to_path_buf(),
        };

        if path.is_absolute() {
            Ok(normalise(&path))
        } else {
            Ok(normalise(&self.base.join(path)))
        }
    }
}

/// Scheme of a URI-looking spec.
///
/// Requires at least two scheme characters so Windows drive prefixes
/// (`C:\...`) are never mistaken for a scheme.
fn uri_scheme(s: &str) -> Option<&str> {
    let (scheme, _) = s.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if scheme.len() < 2 || !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}

/// Local path named by a `file:` URI. Percent escapes are decoded; any
/// host other than `localhost` (or none) is refused.
fn file_uri_path(s: &str) -> Result<PathBuf, ResolveError> {
    let url = Url::parse(s).map_err(|source| ResolveError::InvalidUri {
        spec: s.to_owned(),
        source,
    })?;
    // `to_file_path` turns a host into a UNC share on Windows.
    if let Some(host) = url.host_str().filter(|h| !h.is_empty()) {
        return Err(ResolveError::NonLocalFileUri {
            spec: s.to_owned(),
            host: host.to_owned(),
        });
    }
    url.to_file_path()
        .map_err(|()| ResolveError::NotAFilePath { spec: s.to_owned() })
}

/// Lexically remove `.` and resolve `..` against preceding components.
/// `..` at the root stays at the root.
fn normalise(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> BaseDirResolver {
        if cfg!(windows) {
            BaseDirResolver::new("C:\\work\\project")
        } else {
            BaseDirResolver::new("/work/project")
        }
    }

    #[test]
    fn test_empty_spec_is_rejected() {
        let err = resolver().resolve(&PathSpec::from("")).unwrap_err();
        assert!(matches!(err, ResolveError::Empty));
    }

    #[test]
    fn test_relative_joined_onto_base() {
        let got = resolver().resolve(&PathSpec::from("build/out")).unwrap();
        assert_eq!(got, resolver().base().join("build").join("out"));
        assert!(got.is_absolute());
    }

    #[test]
    fn test_dot_components_are_normalised() {
        let got = resolver()
            .resolve(&PathSpec::from("./build/../cache/./x"))
            .unwrap();
        assert_eq!(got, resolver().base().join("cache").join("x"));
    }

    #[test]
    fn test_parent_at_root_stays_at_root() {
        assert_eq!(normalise(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_spec_ignores_base() {
        let got = resolver().resolve(&PathSpec::from("/tmp/x/")).unwrap();
        assert_eq!(got, PathBuf::from("/tmp/x"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_uri_forms() {
        let r = resolver();
        for spec in ["file:///tmp/a%20b", "file:/tmp/a%20b", "file://localhost/tmp/a%20b"] {
            assert_eq!(
                r.resolve(&PathSpec::from(spec)).unwrap(),
                PathBuf::from("/tmp/a b"),
                "spec {spec}"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_file_uri_escapes_fully_decoded() {
        let r = resolver();
        assert_eq!(
            r.resolve(&PathSpec::from("file:///tmp/caf%C3%A9")).unwrap(),
            PathBuf::from("/tmp/café")
        );
        assert_eq!(
            r.resolve(&PathSpec::from("file:///tmp/100%25")).unwrap(),
            PathBuf::from("/tmp/100%")
        );
    }

    /// A remote host must never fall back to a path under the base.
    #[test]
    fn test_file_uri_with_remote_host_rejected() {
        let r = resolver();
        for (spec, host) in [
            ("file://server/share", "server"),
            ("file://localhostserver/share", "localhostserver"),
        ] {
            match r.resolve(&PathSpec::from(spec)) {
                Err(ResolveError::NonLocalFileUri { host: got, .. }) => {
                    assert_eq!(got, host, "spec {spec}")
                }
                other => panic!("spec {spec}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_malformed_file_uri_rejected() {
        let err = resolver()
            .resolve(&PathSpec::from("file://[::1/x"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidUri { .. }), "{err:?}");
    }

    #[test]
    fn test_other_schemes_rejected() {
        let err = resolver()
            .resolve(&PathSpec::from("https://example.com/x"))
            .unwrap_err();
        match err {
            ResolveError::UnsupportedScheme { scheme, .. } => assert_eq!(scheme, "https"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_drive_letter_is_not_a_scheme() {
        assert_eq!(uri_scheme("C:\\dir"), None);
        assert_eq!(uri_scheme("c:/dir"), None);
        assert_eq!(uri_scheme("file:/x"), Some("file"));
    }
}
