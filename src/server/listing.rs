//! Renders directory entries for LIST and STAT.

use crate::{options::ListFormat, storage::Metadata};
use chrono::{DateTime, Datelike, Utc};

/// Formats one entry the way the server is configured to.
pub(crate) fn format_entry(format: &ListFormat, name: &str, meta: &dyn Metadata) -> String {
    match format {
        ListFormat::Ls => ls(name, meta, Utc::now()),
        ListFormat::Eplf => eplf(name, meta),
        ListFormat::Custom(formatter) => formatter(name, meta),
    }
}

fn modified(meta: &dyn Metadata) -> Option<DateTime<Utc>> {
    meta.modified().ok().map(DateTime::<Utc>::from)
}

// Whole months from `earlier` to `later`, negative when `earlier` lies in the future.
fn months_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let mut months = (i64::from(later.year()) - i64::from(earlier.year())) * 12 + i64::from(later.month()) - i64::from(earlier.month());
    if months > 0 && (later.day(), later.time()) < (earlier.day(), earlier.time()) {
        months -= 1;
    }
    months
}

fn mode_string(meta: &dyn Metadata) -> String {
    let Some(mode) = meta.mode().filter(|m| *m != 0) else {
        return if meta.is_dir() { "drwxr-xr-x" } else { "-rwxr-xr-x" }.to_string();
    };
    let mut s = String::with_capacity(10);
    s.push(if meta.is_dir() { 'd' } else { '-' });
    for (bit, c) in [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ] {
        s.push(if mode & bit != 0 { c } else { '-' });
    }
    s
}

/// `ls -l` style. Entries younger than six months show the time of day, older ones the year.
fn ls(name: &str, meta: &dyn Metadata, now: DateTime<Utc>) -> String {
    let date = match modified(meta) {
        Some(mtime) if months_between(mtime, now) < 6 => mtime.format("%b %d %H:%M").to_string(),
        Some(mtime) => mtime.format("%b %d  %Y").to_string(),
        None => String::new(),
    };
    format!(
        "{} 1 {} {} {:>12} {:>12} {}",
        mode_string(meta),
        meta.uid(),
        meta.gid(),
        meta.len(),
        date,
        name
    )
}

/// See <https://cr.yp.to/ftp/list/eplf.html>
fn eplf(name: &str, meta: &dyn Metadata) -> String {
    let mut facts: Vec<String> = Vec::with_capacity(5);
    if let Some((dev, ino)) = meta.device_and_inode().filter(|(dev, ino)| *dev != 0 && *ino != 0) {
        facts.push(format!("i{:x}.{:x}", dev, ino));
    }
    if meta.len() != 0 {
        facts.push(format!("s{}", meta.len()));
    }
    if let Some(mtime) = modified(meta) {
        facts.push(format!("m{}", mtime.timestamp()));
    }
    if let Some(mode) = meta.mode().filter(|m| *m != 0) {
        facts.push(format!("up{:o}", mode & 0o7777));
    }
    facts.push(if meta.is_dir() { "/" } else { "r" }.to_string());
    format!("+{}\t{}", facts.join(","), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::{
        sync::Arc,
        time::{Duration, SystemTime},
    };

    struct Meta {
        dir: bool,
        len: u64,
        mode: Option<u32>,
        modified: SystemTime,
    }

    impl Metadata for Meta {
        fn len(&self) -> u64 {
            self.len
        }
        fn is_dir(&self) -> bool {
            self.dir
        }
        fn is_file(&self) -> bool {
            !self.dir
        }
        fn modified(&self) -> storage::Result<SystemTime> {
            Ok(self.modified)
        }
        fn gid(&self) -> u32 {
            100
        }
        fn uid(&self) -> u32 {
            1000
        }
        fn mode(&self) -> Option<u32> {
            self.mode
        }
        fn device_and_inode(&self) -> Option<(u64, u64)> {
            Some((0x801, 0x2a))
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
    }

    #[test]
    fn ls_recent_file_shows_time() {
        let meta = Meta {
            dir: false,
            len: 1234,
            mode: Some(0o100644),
            modified: at(2024, 3, 5, 14, 7).into(),
        };
        assert_eq!(
            ls("notes.txt", &meta, at(2024, 4, 1, 0, 0)),
            "-rw-r--r-- 1 1000 100         1234 Mar 05 14:07 notes.txt"
        );
    }

    #[test]
    fn ls_old_directory_shows_year_and_default_mode() {
        let meta = Meta {
            dir: true,
            len: 4096,
            mode: None,
            modified: at(2020, 1, 2, 3, 4).into(),
        };
        assert_eq!(ls("src", &meta, at(2024, 4, 1, 0, 0)), "drwxr-xr-x 1 1000 100         4096 Jan 02  2020 src");
    }

    #[test]
    fn six_month_boundary() {
        assert_eq!(months_between(at(2024, 1, 15, 0, 0), at(2024, 7, 14, 0, 0)), 5);
        assert_eq!(months_between(at(2024, 1, 15, 0, 0), at(2024, 7, 15, 0, 0)), 6);
        assert_eq!(months_between(at(2025, 1, 1, 0, 0), at(2024, 7, 15, 0, 0)), -6);
    }

    #[test]
    fn eplf_facts() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let file = Meta {
            dir: false,
            len: 10,
            mode: Some(0o100640),
            modified,
        };
        assert_eq!(eplf("a.bin", &file), "+i801.2a,s10,m1700000000,up640,r\ta.bin");

        let dir = Meta {
            dir: true,
            len: 0,
            mode: None,
            modified,
        };
        assert_eq!(eplf("d", &dir), "+i801.2a,m1700000000,/\td");
    }

    #[test]
    fn custom_formatter_is_used() {
        let format = ListFormat::Custom(Arc::new(|name, meta| format!("{}:{}", name, meta.len())));
        let meta = Meta {
            dir: false,
            len: 7,
            mode: None,
            modified: SystemTime::UNIX_EPOCH,
        };
        assert_eq!(format_entry(&format, "x", &meta), "x:7");
    }
}
