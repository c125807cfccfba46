//! Metadata and naming rules for publishing a dataset version.
//!
//! A published version consists of a single DataID document describing the
//! dataset and the files (distributions) it is made of. File names are
//! derived from the artifact name, its content variants and the format.

use std::fmt;

use chrono::NaiveDate;
use log::warn;
use thiserror::Error;

use crate::path::is_reserved;

/// JSON-LD context used by Databus DataID documents.
pub const DATAID_CONTEXT: &str = "https://downloads.dbpedia.org/databus/context.jsonld";

/// File format used when none is configured.
pub const DEFAULT_FORMAT: &str = "ttl";

const LICENSE_NS: &str = "http://dalicc.net/licenselibrary/";

/// Licence identifiers offered to publishers, paired with display labels.
pub const KNOWN_LICENSES: [(&str, &str); 10] = [
    ("AcademicFreeLicense30", "Academic Free License 3.0"),
    ("AdaptivePublicLicense10", "Adaptive Public License 1.0"),
    ("ApplePublicSourceLicense20", "Apple Public Source License 2.0"),
    ("ArtisticLicense20", "Artistic License 2.0"),
    ("AttributionAssuranceLicense", "Attribution Assurance License"),
    ("BoostSoftwareLicense10", "Boost Software License 1.0"),
    (
        "CeaCnrsInriaLogicielLibreLicenseVersion21",
        "Cea Cnrs Inria Logiciel Libre License, version 2.1",
    ),
    (
        "CommonDevelopmentAndDistributionLicense10",
        "Common Development and Distribution License 1.0",
    ),
    (
        "CommonPublicAttributionLicenseVersion10",
        "Common Public Attribution License Version 1.0",
    ),
    (
        "ComputerAssociatesTrustedOpenSourceLicense11",
        "Computer Associates Trusted Open Source License 1.1",
    ),
];

/// Full URIs of [`KNOWN_LICENSES`] with their labels.
pub fn known_licenses() -> impl Iterator<Item = (String, &'static str)> {
    KNOWN_LICENSES
        .iter()
        .map(|(name, label)| (format!("{LICENSE_NS}{name}"), *label))
}

/// Errors raised while parsing content variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentVariantError {
    /// A pair was not of the form `key=value`.
    #[error("content variant `{pair}` is not of the form key=value")]
    Malformed {
        /// The offending pair.
        pair: String,
    },
    /// A key or value contained `/` or a URL-reserved character, which would
    /// split or truncate the published file's URL.
    #[error("content variant `{pair}` contains a character not allowed in a file name")]
    ReservedCharacter {
        /// The offending pair.
        pair: String,
    },
    /// The same key appeared twice.
    #[error("content variant key `{key}` is repeated")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },
}

/// Ordered key/value pairs distinguishing the files of one version.
///
/// # Examples
/// ```
/// use databus_core::ContentVariants;
///
/// # fn main() -> Result<(), databus_core::ContentVariantError> {
/// let cvs = ContentVariants::parse("lang=en,type=full")?;
/// assert_eq!(cvs.to_string(), "lang=en_type=full");
/// assert!(ContentVariants::parse("")?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContentVariants {
    pairs: Vec<(String, String)>,
}

impl ContentVariants {
    /// Parse a comma-separated list of `key=value` pairs.
    pub fn parse(raw: &str) -> Result<Self, ContentVariantError> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for pair in raw.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
            let mut parts = pair.split('=');
            let (Some(raw_key), Some(raw_value), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(ContentVariantError::Malformed {
                    pair: pair.to_owned(),
                });
            };
            let (key, value) = (raw_key.trim(), raw_value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(ContentVariantError::Malformed {
                    pair: pair.to_owned(),
                });
            }
            if pair.contains(|c: char| c == '/' || is_reserved(c)) {
                return Err(ContentVariantError::ReservedCharacter {
                    pair: pair.to_owned(),
                });
            }
            if pairs.iter().any(|(existing, _)| existing == key) {
                return Err(ContentVariantError::DuplicateKey {
                    key: key.to_owned(),
                });
            }
            pairs.push((key.to_owned(), value.to_owned()));
        }
        Ok(Self { pairs })
    }

    /// Whether no variants were given.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl fmt::Display for ContentVariants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str("_")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Name of the published file: `{artifact}_{cvs}.{format}`, or
/// `{artifact}.{format}` when there are no variants.
#[must_use]
pub fn target_file_name(artifact: &str, cvs: &ContentVariants, format: &str) -> String {
    if cvs.is_empty() {
        format!("{artifact}.{format}")
    } else {
        format!("{artifact}_{cvs}.{format}")
    }
}

/// A dataset version label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetVersion(String);

impl DatasetVersion {
    /// Use `raw` when it is non-blank, otherwise `today` as `YYYY.MM.DD`.
    ///
    /// Falling back to the date logs a warning because the resulting version
    /// may overwrite one already published on the same day.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use databus_core::DatasetVersion;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap_or_default();
    /// assert_eq!(DatasetVersion::resolve(None, today).as_str(), "2024.03.07");
    /// assert_eq!(DatasetVersion::resolve(Some(" 1.0 "), today).as_str(), "1.0");
    /// ```
    #[must_use]
    pub fn resolve(raw: Option<&str>, today: NaiveDate) -> Self {
        match raw.map(str::trim).filter(|version| !version.is_empty()) {
            Some(version) => Self(version.to_owned()),
            None => {
                let version = today.format("%Y.%m.%d").to_string();
                warn!("Version not hardcoded, automatically set to {version}");
                Self(version)
            }
        }
    }

    /// Resolve against the local calendar date.
    #[must_use]
    pub fn resolve_today(raw: Option<&str>) -> Self {
        Self::resolve(raw, chrono::Local::now().date_naive())
    }

    /// The version label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised while validating dataset metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// A required field was missing or blank.
    #[error("missing metadata field `{field}`")]
    Missing {
        /// Name of the field.
        field: &'static str,
    },
}

/// The first sentence of `description`, including its full stop.
///
/// # Examples
/// ```
/// use databus_core::abstract_from_description;
///
/// assert_eq!(abstract_from_description("Cats. And dogs."), "Cats.");
/// assert_eq!(abstract_from_description("No stop"), "No stop");
/// ```
#[must_use]
pub fn abstract_from_description(description: &str) -> &str {
    description.split_inclusive('.').next().unwrap_or(description)
}

/// Human-facing metadata of a dataset version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetMetadata {
    title: String,
    description: String,
    license: String,
}

impl DatasetMetadata {
    /// Validate that title, description and licence are non-blank.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        license: impl Into<String>,
    ) -> Result<Self, MetadataError> {
        Ok(Self {
            title: required("title", title.into())?,
            description: required("description", description.into())?,
            license: required("license", license.into())?,
        })
    }

    /// Dataset title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Full description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// First sentence of the description.
    #[must_use]
    pub fn abstract_text(&self) -> &str {
        abstract_from_description(&self.description)
    }

    /// Licence URI.
    #[must_use]
    pub fn license(&self) -> &str {
        &self.license
    }
}

fn required(field: &'static str, value: String) -> Result<String, MetadataError> {
    if value.trim().is_empty() {
        Err(MetadataError::Missing { field })
    } else {
        Ok(value)
    }
}

/// One file of a published version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// Where the file can be downloaded.
    pub download_url: String,
    /// File extension, e.g. `ttl`.
    pub format: String,
    /// Variants distinguishing this file.
    pub content_variants: ContentVariants,
    /// Hex-encoded SHA-256 of the file contents.
    pub sha256sum: String,
    /// File length in bytes.
    pub byte_size: u64,
}

impl Distribution {
    /// Compression applied to published files.
    pub const COMPRESSION: &'static str = "none";
}

/// A complete DataID description of one dataset version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDocument {
    /// `{base}/{publisher}/{group}/{artifact}/{version}`.
    pub version_id: String,
    /// Title, description and licence.
    pub metadata: DatasetMetadata,
    /// Files belonging to the version.
    pub distributions: Vec<Distribution>,
}

#[cfg(feature = "serde")]
impl DatasetDocument {
    /// Render as a DataID JSON-LD document.
    ///
    /// # Examples
    /// ```
    /// use databus_core::{DatasetDocument, DatasetMetadata};
    ///
    /// # fn main() -> Result<(), databus_core::MetadataError> {
    /// let doc = DatasetDocument {
    ///     version_id: "https://databus.example.org/alice/animals/cats/1.0".into(),
    ///     metadata: DatasetMetadata::new("Cats", "All cats. Really.", "http://example.org/l")?,
    ///     distributions: Vec::new(),
    /// };
    /// let json = doc.to_jsonld();
    /// assert_eq!(json["@graph"][0]["abstract"], "All cats.");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn to_jsonld(&self) -> serde_json::Value {
        use serde_json::{Map, Value, json};

        let distributions: Vec<Value> = self
            .distributions
            .iter()
            .map(|distribution| {
                let mut part = Map::new();
                part.insert("@type".to_owned(), json!("Part"));
                part.insert("downloadURL".to_owned(), json!(distribution.download_url));
                part.insert("formatExtension".to_owned(), json!(distribution.format));
                part.insert("compression".to_owned(), json!(Distribution::COMPRESSION));
                part.insert("sha256sum".to_owned(), json!(distribution.sha256sum));
                part.insert("byteSize".to_owned(), json!(distribution.byte_size));
                for (key, value) in distribution.content_variants.iter() {
                    part.insert(format!("dcv:{key}"), json!(value));
                }
                Value::Object(part)
            })
            .collect();

        json!({
            "@context": DATAID_CONTEXT,
            "@graph": [{
                "@type": ["Version", "Dataset"],
                "@id": self.version_id,
                "title": self.metadata.title(),
                "abstract": self.metadata.abstract_text(),
                "description": self.metadata.description(),
                "license": self.metadata.license(),
                "distribution": distributions,
            }],
        })
    }
}
