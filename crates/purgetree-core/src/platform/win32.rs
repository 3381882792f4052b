/// Reparse point detection using the Windows API.
///
/// `std`'s `is_symlink` misses some name-surrogate reparse points, so the
/// raw attribute bits are read instead.
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use windows::Win32::Storage::FileSystem::{GetFileAttributesW, FILE_ATTRIBUTE_REPARSE_POINT};

// INVALID_FILE_ATTRIBUTES from the Windows API.
const INVALID_FILE_ATTRIBUTES_VAL: u32 = u32::MAX;

/// `true` if `path` exists and carries `FILE_ATTRIBUTE_REPARSE_POINT`.
pub(super) fn is_reparse_point(path: &Path) -> bool {
    let wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();
    let attrs = unsafe { GetFileAttributesW(windows::core::PCWSTR(wide.as_ptr())) };
    attrs != INVALID_FILE_ATTRIBUTES_VAL && attrs & FILE_ATTRIBUTE_REPARSE_POINT.0 != 0
}
