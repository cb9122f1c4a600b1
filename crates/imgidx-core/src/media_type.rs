//! # Media Types
//!
//! The closed set of document media types with a built-in schema.
//! Each variant maps to one schema in `imgidx-schema`'s registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MEDIA_TYPE_DESCRIPTOR: &str = "application/vnd.oci.descriptor.v1+json";
pub const MEDIA_TYPE_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
pub const MEDIA_TYPE_MANIFEST_LIST: &str = "application/vnd.oci.image.manifest.list.v1+json";
pub const MEDIA_TYPE_IMAGE_LAYOUT: &str = "application/vnd.oci.layout.header.v1+json";

/// A media type with a built-in schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaType {
    /// A content descriptor pointing at a blob.
    #[serde(rename = "application/vnd.oci.descriptor.v1+json")]
    Descriptor,
    /// A single-platform image manifest.
    #[serde(rename = "application/vnd.oci.image.manifest.v1+json")]
    Manifest,
    /// A multi-platform index of manifests.
    #[serde(rename = "application/vnd.oci.image.manifest.list.v1+json")]
    ManifestList,
    /// The `oci-layout` marker file of an image layout directory.
    #[serde(rename = "application/vnd.oci.layout.header.v1+json")]
    ImageLayout,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [
        MediaType::Descriptor,
        MediaType::Manifest,
        MediaType::ManifestList,
        MediaType::ImageLayout,
    ];

    /// Returns the full media type identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Descriptor => MEDIA_TYPE_DESCRIPTOR,
            Self::Manifest => MEDIA_TYPE_MANIFEST,
            Self::ManifestList => MEDIA_TYPE_MANIFEST_LIST,
            Self::ImageLayout => MEDIA_TYPE_IMAGE_LAYOUT,
        }
    }

    /// Returns the short name accepted on the command line.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Descriptor => "descriptor",
            Self::Manifest => "manifest",
            Self::ManifestList => "manifest-list",
            Self::ImageLayout => "layout",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string names no known media type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown media type {0:?}")]
pub struct UnknownMediaType(pub String);

impl FromStr for MediaType {
    type Err = UnknownMediaType;

    /// Accepts full identifiers, short names, and `index` for the manifest list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "index" {
            return Ok(Self::ManifestList);
        }
        Self::ALL
            .into_iter()
            .find(|mt| mt.as_str() == s || mt.short_name() == s)
            .ok_or_else(|| UnknownMediaType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_identifier() {
        assert_eq!(
            MEDIA_TYPE_MANIFEST_LIST.parse::<MediaType>().unwrap(),
            MediaType::ManifestList
        );
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("manifest-list".parse::<MediaType>().unwrap(), MediaType::ManifestList);
        assert_eq!("index".parse::<MediaType>().unwrap(), MediaType::ManifestList);
        assert_eq!("layout".parse::<MediaType>().unwrap(), MediaType::ImageLayout);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "application/json".parse::<MediaType>().unwrap_err();
        assert_eq!(err, UnknownMediaType("application/json".to_string()));
    }

    #[test]
    fn test_serde_uses_identifier() {
        let json = serde_json::to_string(&MediaType::Manifest).unwrap();
        assert_eq!(json, format!("\"{MEDIA_TYPE_MANIFEST}\""));
        let back: MediaType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MediaType::Manifest);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mt in MediaType::ALL {
            assert_eq!(mt.to_string().parse::<MediaType>().unwrap(), mt);
        }
    }
}
