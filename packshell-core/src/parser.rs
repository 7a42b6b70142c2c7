/*!
Parsers for archiver listings and version banners.

Each backend family prints its own listing grammar: Info-ZIP's `unzip -lv`
table, GNU tar's `--list --verbose` rows, and bsdtar's ls-style `-tv`
rows. A parser is stateless and is owned by the adapter that knows which
grammar its binary speaks; it only ever sees raw text.

Parsing is strict. A row that does not match the expected grammar fails
the whole parse, so a truncated or garbled listing surfaces as an error
instead of silently shrinking the archive.
*/

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PackshellError, Result};
use crate::member::{Member, VersionInfo};

/// Turns raw tool output into structured values.
pub trait OutputParser {
    /// Parse a member listing (the output of the backend's list command).
    fn parse_file_listing(&self, raw: &str) -> Result<Vec<Member>>;

    /// Parse a version banner (the output of the backend's version probe).
    fn parse_version(&self, raw: &str) -> Result<VersionInfo>;
}

static ZIP_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<size>\d+)\s+(?P<method>\S+)\s+(?P<compressed>\d+)\s+(?P<ratio>-?\d+%)\s+(?P<date>\S+)\s+(?P<time>\d{1,2}:\d{2})\s+(?P<crc>[0-9a-fA-F]{8})\s+(?P<name>.+?)\s*$",
    )
    .unwrap()
});

static ZIP_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?P<program>Zip|UnZip)\s+(?P<version>\d+(?:\.\d+)+)").unwrap());

static GNU_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<mode>[bcdhlpsCDMV-][rwxXsStT-]{9}[.+]?)\s+(?P<owner>\S+)\s+(?P<size>\d+(?:,\s*\d+)?)\s+(?P<date>\d{4}-\d{2}-\d{2})\s+(?P<time>\d{1,2}:\d{2}(?::\d{2})?)\s+(?P<name>.+?)\s*$",
    )
    .unwrap()
});

static GNU_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<program>tar)\s+\(GNU tar\)\s+(?P<version>\d+(?:\.\d+)+)").unwrap()
});

static BSD_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<mode>[bcdhlpsCDMV-][rwxXsStT-]{9}[.+]?)\s+(?P<links>\d+)\s+(?P<owner>\S+)\s+(?P<group>\S+)\s+(?P<size>\d+(?:,\s*\d+)?)\s+(?P<month>[A-Za-z]{3})\s+(?P<day>\d{1,2})\s+(?P<when>\d{4}|\d{1,2}:\d{2})\s+(?P<name>.+?)\s*$",
    )
    .unwrap()
});

static BSD_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?P<program>bsdtar)\s+(?P<version>\d+(?:\.\d+)+)").unwrap());

/// Parser for the Info-ZIP `unzip -lv` table and `zip`/`unzip` banners.
pub struct ZipParser;

impl OutputParser for ZipParser {
    /// The table carries a separator line under its header and another
    /// above its totals row; only the rows between them are entries.
    fn parse_file_listing(&self, raw: &str) -> Result<Vec<Member>> {
        let lines: Vec<&str> = raw.lines().collect();
        let separators: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| is_separator(line))
            .map(|(idx, _)| idx)
            .collect();
        if separators.len() < 2 {
            return Err(PackshellError::parse(
                "zip listing is missing its column separators",
                raw,
            ));
        }

        let first = separators[0];
        let last = separators[separators.len() - 1];
        let mut members = Vec::new();
        for line in &lines[first + 1..last] {
            if line.trim().is_empty() {
                continue;
            }
            let caps = ZIP_ENTRY.captures(line).ok_or_else(|| {
                PackshellError::parse("unrecognized zip listing row", *line)
            })?;
            let name = caps["name"].to_string();
            let directory = name.ends_with('/');
            members.push(Member {
                size: parse_u64(&caps["size"], line)?,
                compressed_size: Some(parse_u64(&caps["compressed"], line)?),
                modified: Some(zip_timestamp(&caps["date"], &caps["time"], line)?),
                checksum: Some(caps["crc"].to_ascii_lowercase()),
                name,
                directory,
            });
        }
        Ok(members)
    }

    fn parse_version(&self, raw: &str) -> Result<VersionInfo> {
        let caps = ZIP_VERSION
            .captures(raw)
            .ok_or_else(|| PackshellError::parse("unrecognized zip version banner", raw))?;
        Ok(VersionInfo::new(&caps["program"], &caps["version"]))
    }
}

/// Which tar dialect's listing grammar to expect.
enum TarFlavor {
    Gnu,
    Bsd,
}

/// Parser for verbose tar listings and tar version banners.
///
/// Symlink and hard-link rows keep the full `name -> target` or
/// `name link to target` text as the member name, exactly as the tool
/// printed it.
pub struct TarParser {
    flavor: TarFlavor,
}

impl TarParser {
    /// Parser for GNU tar's `--list --verbose` rows and version banner.
    pub fn gnu() -> Self {
        Self {
            flavor: TarFlavor::Gnu,
        }
    }

    /// Parser for bsdtar's `-tv` rows and version banner.
    pub fn bsd() -> Self {
        Self {
            flavor: TarFlavor::Bsd,
        }
    }

    fn parse_gnu_row(line: &str) -> Result<Member> {
        let caps = GNU_ENTRY
            .captures(line)
            .ok_or_else(|| PackshellError::parse("unrecognized tar listing row", line))?;
        let date = NaiveDate::parse_from_str(&caps["date"], "%Y-%m-%d")
            .map_err(|_| PackshellError::parse("unrecognized date in tar listing row", line))?;
        let time = &caps["time"];
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .map_err(|_| PackshellError::parse("unrecognized time in tar listing row", line))?;
        Ok(Member {
            name: caps["name"].to_string(),
            size: tar_size(&caps["size"], line)?,
            compressed_size: None,
            modified: Some(NaiveDateTime::new(date, time)),
            checksum: None,
            directory: caps["mode"].starts_with('d'),
        })
    }

    fn parse_bsd_row(line: &str) -> Result<Member> {
        let caps = BSD_ENTRY
            .captures(line)
            .ok_or_else(|| PackshellError::parse("unrecognized tar listing row", line))?;
        let when = &caps["when"];
        let modified = if when.contains(':') {
            // Recent entries are printed with a clock time and no year,
            // which cannot be mapped to a calendar date without guessing.
            None
        } else {
            let month = month_number(&caps["month"])
                .ok_or_else(|| PackshellError::parse("unrecognized month in tar listing row", line))?;
            let day: u32 = caps["day"]
                .parse()
                .map_err(|_| PackshellError::parse("unrecognized day in tar listing row", line))?;
            let year: i32 = when
                .parse()
                .map_err(|_| PackshellError::parse("unrecognized year in tar listing row", line))?;
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| PackshellError::parse("impossible date in tar listing row", line))?;
            Some(date.and_time(NaiveTime::MIN))
        };
        Ok(Member {
            name: caps["name"].to_string(),
            size: tar_size(&caps["size"], line)?,
            compressed_size: None,
            modified,
            checksum: None,
            directory: caps["mode"].starts_with('d'),
        })
    }
}

impl OutputParser for TarParser {
    /// Tar prints one row per member and nothing else, so an archive with
    /// no members yields an empty listing rather than a parse failure.
    fn parse_file_listing(&self, raw: &str) -> Result<Vec<Member>> {
        let mut members = Vec::new();
        for line in raw.lines() {
            if line.trim().is_empty() {
                continue;
            }
            members.push(match self.flavor {
                TarFlavor::Gnu => Self::parse_gnu_row(line)?,
                TarFlavor::Bsd => Self::parse_bsd_row(line)?,
            });
        }
        Ok(members)
    }

    fn parse_version(&self, raw: &str) -> Result<VersionInfo> {
        let regex = match self.flavor {
            TarFlavor::Gnu => &*GNU_VERSION,
            TarFlavor::Bsd => &*BSD_VERSION,
        };
        let caps = regex
            .captures(raw)
            .ok_or_else(|| PackshellError::parse("unrecognized tar version banner", raw))?;
        Ok(VersionInfo::new(&caps["program"], &caps["version"]))
    }
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '-' || c == ' ')
}

fn parse_u64(text: &str, line: &str) -> Result<u64> {
    text.parse()
        .map_err(|_| PackshellError::parse(format!("unparseable size {text:?}"), line))
}

fn tar_size(text: &str, line: &str) -> Result<u64> {
    // Device rows carry major,minor numbers in the size column; a device
    // node has no byte length and lists as zero.
    if text.contains(',') {
        return Ok(0);
    }
    parse_u64(text, line)
}

fn zip_timestamp(date: &str, time: &str, line: &str) -> Result<NaiveDateTime> {
    // Info-ZIP builds disagree on the date column: modern Linux packages
    // print ISO dates, older ones US-style with two or four digit years.
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date, "%m-%d-%Y"))
        .or_else(|_| NaiveDate::parse_from_str(date, "%m-%d-%y"))
        .map_err(|_| PackshellError::parse("unrecognized date in zip listing row", line))?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| PackshellError::parse("unrecognized time in zip listing row", line))?;
    Ok(NaiveDateTime::new(date, time))
}

fn month_number(token: &str) -> Option<u32> {
    match token.to_ascii_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const UNZIP_LISTING: &str = "\
Archive:  fixtures.zip
 Length   Method    Size  Cmpr    Date    Time   CRC-32   Name
--------  ------  ------- ---- ---------- ----- --------  ----
     120  Defl:N       95  21% 2020-01-01 10:30 A1B2C3D4  notes.txt
       0  Stored        0   0% 2020-01-02 11:00 00000000  sub/
     340  Defl:N      210  38% 2020-01-02 11:05 0badf00d  sub/report with spaces.txt
--------          -------  ---                            -------
     460               305  34%                            3 files
";

    #[test]
    fn test_zip_listing_preserves_order_and_fields() {
        let members = ZipParser.parse_file_listing(UNZIP_LISTING).unwrap();
        assert_eq!(members.len(), 3);

        assert_eq!(members[0].name, "notes.txt");
        assert_eq!(members[0].size, 120);
        assert_eq!(members[0].compressed_size, Some(95));
        assert_eq!(members[0].checksum.as_deref(), Some("a1b2c3d4"));
        assert!(!members[0].directory);
        let modified = members[0].modified.unwrap();
        assert_eq!(
            (modified.year(), modified.month(), modified.day()),
            (2020, 1, 1)
        );
        assert_eq!((modified.hour(), modified.minute()), (10, 30));

        assert!(members[1].directory);
        assert_eq!(members[2].name, "sub/report with spaces.txt");
    }

    #[test]
    fn test_zip_listing_accepts_us_style_dates() {
        let listing = "\
Archive:  old.zip
 Length   Method    Size  Cmpr    Date    Time   CRC-32   Name
--------  ------  ------- ---- ---------- ----- --------  ----
      10  Stored       10   0% 06-24-2015 17:08 1c2d3e4f  a.txt
--------          -------  ---                            -------
      10                10   0%                            1 file
";
        let members = ZipParser.parse_file_listing(listing).unwrap();
        let modified = members[0].modified.unwrap();
        assert_eq!(
            (modified.year(), modified.month(), modified.day()),
            (2015, 6, 24)
        );
    }

    #[test]
    fn test_zip_listing_without_separators_fails() {
        let err = ZipParser.parse_file_listing("caution: zipfile comment truncated\n").unwrap_err();
        assert!(matches!(err, PackshellError::Parse { .. }));
    }

    #[test]
    fn test_zip_listing_garbled_row_fails() {
        let listing = "\
Archive:  bad.zip
 Length   Method    Size  Cmpr    Date    Time   CRC-32   Name
--------  ------  ------- ---- ---------- ----- --------  ----
   not a listing row at all
--------          -------  ---                            -------
";
        let err = ZipParser.parse_file_listing(listing).unwrap_err();
        match err {
            PackshellError::Parse { raw, .. } => assert!(raw.contains("not a listing row")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zip_version_banners() {
        let zip = "Copyright (c) 1990-2008 Info-ZIP - Type 'zip \"-L\"' for software license.\nZip 3.0 (July 5th 2008). Usage:\nzip [-options] [-b path]\n";
        let version = ZipParser.parse_version(zip).unwrap();
        assert_eq!(version.program, "Zip");
        assert_eq!(version.version, "3.0");

        let unzip = "UnZip 6.00 of 20 April 2009, by Debian. Original by Info-ZIP.\n\nUsage: unzip [-Z] file[.zip]\n";
        let version = ZipParser.parse_version(unzip).unwrap();
        assert_eq!(version.program, "UnZip");
        assert_eq!(version.version, "6.00");
    }

    #[test]
    fn test_zip_version_garbage_fails() {
        let err = ZipParser.parse_version("command not found\n").unwrap_err();
        assert!(matches!(err, PackshellError::Parse { .. }));
    }

    const GNU_LISTING: &str = "\
drwxr-xr-x alice/users       0 2020-01-02 11:00 sub/
-rw-r--r-- alice/users     120 2020-01-01 10:30 notes.txt
-rw-r--r-- alice/users     340 2020-01-02 11:05:59 sub/report with spaces.txt
lrwxrwxrwx alice/users       0 2020-01-03 09:00 link -> notes.txt
";

    #[test]
    fn test_gnu_listing_rows() {
        let members = TarParser::gnu().parse_file_listing(GNU_LISTING).unwrap();
        assert_eq!(members.len(), 4);
        assert!(members[0].directory);
        assert_eq!(members[0].name, "sub/");
        assert_eq!(members[1].size, 120);
        assert_eq!(members[1].compressed_size, None);
        assert_eq!(members[1].checksum, None);
        let modified = members[2].modified.unwrap();
        assert_eq!((modified.minute(), modified.second()), (5, 59));
        assert_eq!(members[3].name, "link -> notes.txt");
        assert!(!members[3].directory);
    }

    #[test]
    fn test_gnu_hard_link_and_device_rows() {
        let listing = "\
hrw-r--r-- alice/users       0 2020-01-04 12:38 copy.txt link to notes.txt
crw-rw-rw- root/root       1,3 2020-01-04 12:39 dev/null
brw-rw---- root/disk       8,0 2020-01-04 12:40 dev/sda
";
        let members = TarParser::gnu().parse_file_listing(listing).unwrap();
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].name, "copy.txt link to notes.txt");
        assert_eq!(members[0].size, 0);
        assert_eq!(members[1].name, "dev/null");
        assert_eq!(members[1].size, 0);
        assert_eq!(members[2].name, "dev/sda");
        assert!(!members[2].directory);
    }

    #[test]
    fn test_gnu_empty_listing_is_empty_archive() {
        let members = TarParser::gnu().parse_file_listing("").unwrap();
        assert!(members.is_empty());
    }

    #[test]
    fn test_gnu_garbled_row_fails() {
        let err = TarParser::gnu()
            .parse_file_listing("tar: Unexpected EOF in archive\n")
            .unwrap_err();
        assert!(matches!(err, PackshellError::Parse { .. }));
    }

    #[test]
    fn test_gnu_version_banner() {
        let banner = "tar (GNU tar) 1.34\nCopyright (C) 2021 Free Software Foundation, Inc.\n";
        let version = TarParser::gnu().parse_version(banner).unwrap();
        assert_eq!(version.program, "tar");
        assert_eq!(version.version, "1.34");
    }

    const BSD_LISTING: &str = "\
-rw-r--r--  0 alice  users     120 Jan  1  2020 notes.txt
drwxr-xr-x  0 alice  users       0 Aug 22 10:30 sub/
";

    #[test]
    fn test_bsd_listing_rows() {
        let members = TarParser::bsd().parse_file_listing(BSD_LISTING).unwrap();
        assert_eq!(members.len(), 2);

        let dated = members[0].modified.unwrap();
        assert_eq!((dated.year(), dated.month(), dated.day()), (2020, 1, 1));
        assert_eq!((dated.hour(), dated.minute()), (0, 0));

        // Clock-time form omits the year; no timestamp is better than a
        // wrong one.
        assert!(members[1].modified.is_none());
        assert!(members[1].directory);
    }

    #[test]
    fn test_bsd_hard_link_and_device_rows() {
        let listing = "\
hrw-r--r--  2 alice  users       0 Aug 22 12:38 copy.txt link to notes.txt
crw-rw-rw-  0 root   wheel     1,3 Feb  4  2020 dev/null
";
        let members = TarParser::bsd().parse_file_listing(listing).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "copy.txt link to notes.txt");
        assert_eq!(members[0].size, 0);
        assert!(members[0].modified.is_none());
        assert_eq!(members[1].name, "dev/null");
        assert_eq!(members[1].size, 0);
        let dated = members[1].modified.unwrap();
        assert_eq!((dated.year(), dated.month(), dated.day()), (2020, 2, 4));
    }

    #[test]
    fn test_bsd_version_banner() {
        let banner = "bsdtar 3.7.2 - libarchive 3.7.2 zlib/1.3.1 liblzma/5.4.5 bz2lib/1.0.8\n";
        let version = TarParser::bsd().parse_version(banner).unwrap();
        assert_eq!(version.program, "bsdtar");
        assert_eq!(version.version, "3.7.2");
    }

    #[test]
    fn test_gnu_banner_is_not_a_bsd_banner() {
        let banner = "tar (GNU tar) 1.34\n";
        let err = TarParser::bsd().parse_version(banner).unwrap_err();
        assert!(matches!(err, PackshellError::Parse { .. }));
    }
}
