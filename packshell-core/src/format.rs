/*!
Archive format identification from file paths.

Dispatch between backends keys off the destination file name alone, so
format detection never opens the file. Compound extensions are matched
before simple ones (`.tar.gz` wins over `.gz`).
*/

use std::path::Path;

/// Compression codec wrapped around a tar stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TarCompression {
    /// Plain uncompressed tar
    #[default]
    None,
    /// gzip (`.tar.gz`, `.tgz`)
    Gzip,
    /// bzip2 (`.tar.bz2`, `.tbz2`)
    Bzip2,
    /// xz (`.tar.xz`, `.txz`)
    Xz,
}

impl TarCompression {
    /// Long-form flag understood by GNU tar, if the codec needs one.
    pub fn gnu_flag(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Gzip => Some("--gzip"),
            Self::Bzip2 => Some("--bzip2"),
            Self::Xz => Some("--xz"),
        }
    }

    /// Short flag understood by bsdtar, if the codec needs one.
    pub fn bsd_flag(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Gzip => Some("-z"),
            Self::Bzip2 => Some("-j"),
            Self::Xz => Some("-J"),
        }
    }

    /// Whether a compression codec is applied at all.
    pub fn is_compressed(self) -> bool {
        self != Self::None
    }
}

/// Family of archive formats the adapters can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// PKZIP-style archive handled by the zip/unzip pair
    Zip,
    /// Tar stream, optionally compressed, handled by the tar backends
    Tar(TarCompression),
}

impl ArchiveFormat {
    /// Infer the archive format from a file name, by extension.
    ///
    /// Returns `None` when the extension is missing or unrecognized; the
    /// registry turns that into a dispatch failure rather than guessing.
    pub fn from_path(path: &Path) -> Option<ArchiveFormat> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::Tar(TarCompression::Gzip))
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(Self::Tar(TarCompression::Bzip2))
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::Tar(TarCompression::Xz))
        } else if name.ends_with(".tar") {
            Some(Self::Tar(TarCompression::None))
        } else {
            None
        }
    }

    /// Whether this format is a tar stream of any compression.
    pub fn is_tar(self) -> bool {
        matches!(self, Self::Tar(_))
    }

    /// The tar compression codec, for tar formats.
    pub fn tar_compression(self) -> Option<TarCompression> {
        match self {
            Self::Tar(compression) => Some(compression),
            Self::Zip => None,
        }
    }
}
