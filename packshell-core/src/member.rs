/*!
Structured values parsed out of archiver output.

Nothing in this module touches the filesystem or spawns processes. A
[`Member`] describes one entry of an archive exactly as the backend's
listing reported it; a [`VersionInfo`] is the identity a binary printed
when probed. Both are produced by the output parsers and never
constructed from scratch by callers.
*/

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single file or directory entry inside an archive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Entry path exactly as the backend listing printed it
    pub name: String,

    /// Uncompressed size in bytes
    pub size: u64,

    /// Stored (compressed) size in bytes, when the listing reports one
    pub compressed_size: Option<u64>,

    /// Modification timestamp, when the listing carries an unambiguous one.
    /// Listings that omit the year (bsdtar's recent-file form) leave this unset
    /// rather than guessing.
    pub modified: Option<NaiveDateTime>,

    /// Entry checksum (CRC-32 for zip), when the listing reports one
    pub checksum: Option<String>,

    /// Whether the entry denotes a directory
    pub directory: bool,
}

impl Member {
    /// Whether this entry is a directory rather than a regular file.
    pub fn is_directory(&self) -> bool {
        self.directory
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size)
    }
}

/// Identity of an archiver binary as reported by its version or help output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Program token as printed by the binary (e.g. "Zip", "UnZip", "tar", "bsdtar")
    pub program: String,

    /// Dotted version string (e.g. "3.0", "1.34")
    pub version: String,
}

impl VersionInfo {
    /// Create version info from a program token and version string.
    pub fn new<S1: Into<String>, S2: Into<String>>(program: S1, version: S2) -> Self {
        Self {
            program: program.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.program, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn sample_member() -> Member {
        Member {
            name: "docs/readme.txt".to_string(),
            size: 1204,
            compressed_size: Some(512),
            modified: NaiveDate::from_ymd_opt(2024, 3, 15)
                .map(|d| NaiveDateTime::new(d, NaiveTime::from_hms_opt(9, 42, 0).unwrap())),
            checksum: Some("a1b2c3d4".to_string()),
            directory: false,
        }
    }

    #[test]
    fn test_member_display() {
        let member = sample_member();
        assert_eq!(member.to_string(), "docs/readme.txt (1204 bytes)");
        assert!(!member.is_directory());
    }

    #[test]
    fn test_member_serialization_round_trip() {
        let member = sample_member();
        let json = serde_json::to_string(&member).unwrap();
        let restored: Member = serde_json::from_str(&json).unwrap();
        assert_eq!(member, restored);
    }

    #[test]
    fn test_version_info_display() {
        let version = VersionInfo::new("UnZip", "6.00");
        assert_eq!(version.to_string(), "UnZip 6.00");
    }
}
