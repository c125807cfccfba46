//! Identifiers for Databus artifacts and the WebDAV paths they map to.
//!
//! An artifact is addressed as `scheme://host/publisher/group/artifact`. Its
//! files live in the publisher's WebDAV space under
//! `group/artifact/version/file`.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Reasons an identifier or path could not be decomposed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MalformedPathError {
    /// The path contained no segments.
    #[error("path is empty")]
    Empty,
    /// A segment was empty, a relative component such as `..`, padded with
    /// whitespace, or contained a URL-reserved character.
    #[error("path `{path}` contains an invalid segment `{segment}`")]
    InvalidSegment {
        /// The offending path.
        path: String,
        /// The rejected segment.
        segment: String,
    },
    /// The input was not an absolute URL.
    #[error("`{input}` is not a valid URL: {source}")]
    InvalidUrl {
        /// Raw input.
        input: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// Only `http` and `https` identifiers are accepted.
    #[error("unsupported scheme `{scheme}` in `{input}`")]
    UnsupportedScheme {
        /// Raw input.
        input: String,
        /// Scheme found.
        scheme: String,
    },
    /// The URL had no host.
    #[error("`{input}` has no host")]
    MissingHost {
        /// Raw input.
        input: String,
    },
    /// The URL path did not have the expected number of segments.
    #[error("`{input}` must have {expected} path segments, found {found}")]
    SegmentCount {
        /// Raw input.
        input: String,
        /// Required number of segments.
        expected: usize,
        /// Number of segments present.
        found: usize,
    },
}

/// A relative, slash-delimited path inside a WebDAV space.
///
/// # Examples
/// ```
/// use databus_core::DavPath;
///
/// # fn main() -> Result<(), databus_core::MalformedPathError> {
/// let path = DavPath::parse("a/b/c/file.ttl")?;
/// assert_eq!(path.file_name(), Some("file.ttl"));
/// let dirs: Vec<String> = path.parent().map(|p| p.prefixes().collect()).unwrap_or_default();
/// assert_eq!(dirs, vec!["a", "a/b", "a/b/c"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DavPath {
    segments: Vec<String>,
}

impl DavPath {
    /// Parse a relative path, ignoring surrounding whitespace and leading
    /// and trailing slashes.
    ///
    /// Segments are kept verbatim: one that is empty, `.` or `..`, padded
    /// with whitespace, or contains `#`, `?`, `%`, a backslash or a control
    /// character is rejected.
    pub fn parse(raw: &str) -> Result<Self, MalformedPathError> {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(MalformedPathError::Empty);
        }
        let segments = trimmed
            .split('/')
            .map(|segment| validate_segment(raw, segment))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Build a path from individual segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, MalformedPathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let collected: Vec<String> = segments
            .into_iter()
            .map(|segment| segment.as_ref().to_owned())
            .collect();
        let joined = collected.join("/");
        let validated = collected
            .iter()
            .map(|segment| validate_segment(&joined, segment))
            .collect::<Result<Vec<_>, _>>()?;
        if validated.is_empty() {
            return Err(MalformedPathError::Empty);
        }
        Ok(Self {
            segments: validated,
        })
    }

    /// The individual segments, left to right.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Final segment.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Everything but the final segment, or `None` for a single segment.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        if rest.is_empty() {
            None
        } else {
            Some(Self {
                segments: rest.to_vec(),
            })
        }
    }

    /// Accumulated prefixes: `a`, `a/b`, `a/b/c`.
    pub fn prefixes(&self) -> impl Iterator<Item = String> + '_ {
        self.segments.iter().scan(String::new(), |acc, segment| {
            if !acc.is_empty() {
                acc.push('/');
            }
            acc.push_str(segment);
            Some(acc.clone())
        })
    }

    /// Append one segment.
    pub fn join(&self, segment: &str) -> Result<Self, MalformedPathError> {
        let mut segments = self.segments.clone();
        segments.push(validate_segment(&self.to_string(), segment)?);
        Ok(Self { segments })
    }
}

impl fmt::Display for DavPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Characters that change the meaning of a URL path when left unescaped.
pub(crate) fn is_reserved(c: char) -> bool {
    matches!(c, '#' | '?' | '%' | '\\') || c.is_control()
}

fn validate_segment(path: &str, segment: &str) -> Result<String, MalformedPathError> {
    let padded = segment.trim() != segment;
    if segment.is_empty()
        || padded
        || segment == "."
        || segment == ".."
        || segment.contains(is_reserved)
    {
        return Err(MalformedPathError::InvalidSegment {
            path: path.to_owned(),
            segment: segment.to_owned(),
        });
    }
    Ok(segment.to_owned())
}

/// A Databus artifact identifier.
///
/// # Examples
/// ```
/// use databus_core::ArtifactUri;
///
/// # fn main() -> Result<(), databus_core::MalformedPathError> {
/// let uri = ArtifactUri::parse("https://databus.example.org/alice/animals/cats/")?;
/// assert_eq!(uri.base(), "https://databus.example.org");
/// assert_eq!(uri.publisher(), "alice");
/// assert_eq!(uri.group(), "animals");
/// assert_eq!(uri.artifact(), "cats");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactUri {
    base: String,
    publisher: String,
    group: String,
    artifact: String,
}

impl ArtifactUri {
    /// Parse `http(s)://host/publisher/group/artifact`, with an optional
    /// trailing slash.
    pub fn parse(raw: &str) -> Result<Self, MalformedPathError> {
        let input = raw.trim();
        let url = Url::parse(input).map_err(|source| MalformedPathError::InvalidUrl {
            input: input.to_owned(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MalformedPathError::UnsupportedScheme {
                input: input.to_owned(),
                scheme: url.scheme().to_owned(),
            });
        }
        if url.host_str().is_none() {
            return Err(MalformedPathError::MissingHost {
                input: input.to_owned(),
            });
        }
        let mut segments: Vec<&str> = url
            .path_segments()
            .map(|parts| parts.collect())
            .unwrap_or_default();
        if segments.last().is_some_and(|last| last.is_empty()) {
            segments.pop();
        }
        for segment in &segments {
            validate_segment(input, segment)?;
        }
        let [publisher, group, artifact] = segments.as_slice() else {
            return Err(MalformedPathError::SegmentCount {
                input: input.to_owned(),
                expected: 3,
                found: segments.len(),
            });
        };
        Ok(Self {
            base: url.origin().ascii_serialization(),
            publisher: (*publisher).to_owned(),
            group: (*group).to_owned(),
            artifact: (*artifact).to_owned(),
        })
    }

    /// `scheme://host[:port]` of the Databus instance.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Publisher (account) name.
    #[must_use]
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// Group name.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Artifact name.
    #[must_use]
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// The Databus identifier of `version` of this artifact.
    #[must_use]
    pub fn version_id(&self, version: &str) -> String {
        format!(
            "{}/{}/{}/{}/{version}",
            self.base, self.publisher, self.group, self.artifact
        )
    }

    /// Where `file_name` of `version` lives in the publisher's WebDAV space.
    pub fn remote_path(
        &self,
        version: &str,
        file_name: &str,
    ) -> Result<RemotePath, MalformedPathError> {
        let dav_path =
            DavPath::from_segments([self.group.as_str(), &self.artifact, version, file_name])?;
        Ok(RemotePath {
            artifact: self.clone(),
            version: version.trim().to_owned(),
            dav_path,
        })
    }
}

impl fmt::Display for ArtifactUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.base, self.publisher, self.group, self.artifact
        )
    }
}

/// Location of a single published file: publisher, group, artifact, version
/// and file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath {
    artifact: ArtifactUri,
    version: String,
    dav_path: DavPath,
}

impl RemotePath {
    /// The artifact this file belongs to.
    #[must_use]
    pub const fn artifact(&self) -> &ArtifactUri {
        &self.artifact
    }

    /// Publisher owning the WebDAV space.
    #[must_use]
    pub fn publisher(&self) -> &str {
        self.artifact.publisher()
    }

    /// Version segment.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// `group/artifact/version/file` relative to the publisher's space.
    #[must_use]
    pub const fn dav_path(&self) -> &DavPath {
        &self.dav_path
    }

    /// The Databus version identifier this file is published under.
    #[must_use]
    pub fn version_id(&self) -> String {
        self.artifact.version_id(&self.version)
    }
}
