//! UTC modification times for archive entries.
//!
//! The ZIP container's native timestamp is a local-civil DOS field with
//! two-second resolution and no zone, so a plain round trip shifts times
//! whenever the clock context changes (DST transitions, different zones,
//! FAT media). Every entry written here also carries an extended-timestamp
//! extra field (header `0x5455`) holding true UTC seconds; reads prefer
//! that field and fall back to interpreting the DOS stamp in the host's
//! local zone for archives made by other tools.

use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use chrono::Datelike;
use chrono::Local;
use chrono::TimeZone;
use chrono::Timelike;
use filetime::FileTime;
use zip::extra_fields::ExtraField;
use zip::read::ZipFile;

use crate::platform;

/// Header id of the extended-timestamp extra field.
pub const EXTENDED_TIMESTAMP_ID: u16 = 0x5455;

/// DOS timestamps cover 1980 through 2107.
const DOS_YEAR_MIN: u16 = 1980;
const DOS_YEAR_MAX: u16 = 2107;

/// Returns seconds since the Unix epoch for a filesystem timestamp,
/// negative for times before it.
#[must_use]
pub fn epoch_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(forward) => i64::try_from(forward.as_secs()).unwrap_or(i64::MAX),
        Err(backward) => 0i64
            .saturating_sub(i64::try_from(backward.duration().as_secs()).unwrap_or(i64::MAX)),
    }
}

/// Encodes the extended-timestamp payload for one entry: a flags byte with
/// the modification-time bit set, then the time as little-endian seconds.
///
/// Seconds outside the field's unsigned 32-bit range are clamped.
#[must_use]
pub fn encode_extended_timestamp(epoch_secs: i64) -> Box<[u8]> {
    let clamped = u32::try_from(epoch_secs.clamp(0, i64::from(u32::MAX))).unwrap_or(u32::MAX);
    let mut payload = Vec::with_capacity(5);
    payload.push(0x01);
    payload.extend_from_slice(&clamped.to_le_bytes());
    payload.into_boxed_slice()
}

/// Converts epoch seconds to the DOS timestamp stored alongside the extra
/// field, using the host's local civil time as ZIP convention dictates.
///
/// Times outside the representable DOS range fall back to the container
/// default (1980-01-01); the extra field still carries the real time.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn dos_time_from_epoch(epoch_secs: i64) -> zip::DateTime {
    let Some(local) = Local.timestamp_opt(epoch_secs, 0).earliest() else {
        return zip::DateTime::default();
    };
    let Ok(year) = u16::try_from(local.year()) else {
        return zip::DateTime::default();
    };
    if !(DOS_YEAR_MIN..=DOS_YEAR_MAX).contains(&year) {
        return zip::DateTime::default();
    }
    zip::DateTime::from_date_and_time(
        year,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .unwrap_or_default()
}

/// Interprets a DOS timestamp as local civil time and returns epoch
/// seconds, or `None` for fields no local calendar moment matches.
fn epoch_from_dos(stamp: &zip::DateTime) -> Option<i64> {
    Local
        .with_ymd_and_hms(
            i32::from(stamp.year()),
            u32::from(stamp.month()),
            u32::from(stamp.day()),
            u32::from(stamp.hour()),
            u32::from(stamp.minute()),
            u32::from(stamp.second()),
        )
        .earliest()
        .map(|local| local.timestamp())
}

/// Returns the modification time recorded for an entry, in epoch seconds.
///
/// Prefers the extended-timestamp extra field; entries without one (from
/// other tools) yield their DOS stamp read as host-local civil time, and
/// entries with no usable stamp at all yield `None`.
pub fn stored_mtime<R: Read + Seek>(entry: &ZipFile<'_, R>) -> Option<i64> {
    for field in entry.extra_data_fields() {
        if let ExtraField::ExtendedTimestamp(stamp) = field
            && let Some(secs) = stamp.mod_time()
        {
            return Some(i64::from(secs));
        }
    }
    entry.last_modified().as_ref().and_then(epoch_from_dos)
}

/// Sets the modification time of a file or directory.
///
/// The access time is set to the same moment. On macOS the write is applied
/// twice; the first one can land rounded on exFAT volumes.
///
/// # Errors
///
/// Propagates the underlying timestamp update failure.
pub fn restore_mtime(path: &Path, epoch_secs: i64) -> std::io::Result<()> {
    let stamp = FileTime::from_unix_time(epoch_secs, 0);
    let host = platform::host_path(path);
    filetime::set_file_times(&host, stamp, stamp)?;
    if cfg!(target_os = "macos") {
        filetime::set_file_times(&host, stamp, stamp)?;
    }
    Ok(())
}

/// Sets the modification time of a symlink itself, not its target.
///
/// # Errors
///
/// Propagates the underlying timestamp update failure.
pub fn restore_link_mtime(path: &Path, epoch_secs: i64) -> std::io::Result<()> {
    let stamp = FileTime::from_unix_time(epoch_secs, 0);
    let host = platform::host_path(path);
    filetime::set_symlink_file_times(&host, stamp, stamp)?;
    if cfg!(target_os = "macos") {
        filetime::set_symlink_file_times(&host, stamp, stamp)?;
    }
    Ok(())
}
