//! Descriptor acquisition and advisory hints.
//!
//! Opening tries an OS-level cache bypass first and falls back to a plain
//! descriptor when the filesystem refuses. All advisory calls are best
//! effort; their results are never allowed to fail an operation.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::OpenOptions;

/// Open `path`, preferring a cache-bypassing descriptor.
///
/// Returns the file plus a flag reporting whether the bypass engaged. On
/// Linux the first attempt carries `O_DIRECT`; `EINVAL`/`EOPNOTSUPP` from
/// that attempt (tmpfs, some network filesystems) demotes to a plain open.
/// On macOS the plain descriptor is followed by an `F_NOCACHE` fcntl.
pub(crate) fn open_raw(
    path: &Path,
    opts: &OpenOptions,
    attempt_direct: bool,
) -> io::Result<(File, bool)> {
    #[cfg(target_os = "linux")]
    if attempt_direct {
        use std::os::unix::fs::OpenOptionsExt;

        let mut direct = opts.to_std();
        direct.custom_flags(libc::O_DIRECT);
        match direct.open(path) {
            Ok(file) => return Ok((file, true)),
            Err(err)
                if err.raw_os_error() != Some(libc::EINVAL)
                    && err.raw_os_error() != Some(libc::EOPNOTSUPP) =>
            {
                return Err(err);
            }
            Err(_) => {}
        }
    }

    let file = opts.to_std().open(path)?;
    let direct_io = set_no_cache(&file, attempt_direct);
    Ok((file, direct_io))
}

#[cfg(target_os = "macos")]
fn set_no_cache(file: &File, attempt: bool) -> bool {
    use std::os::fd::AsRawFd;

    attempt && unsafe { libc::fcntl(file.as_raw_fd(), libc::F_NOCACHE, 1) } == 0
}

#[cfg(not(target_os = "macos"))]
fn set_no_cache(_file: &File, _attempt: bool) -> bool {
    false
}

/// Tell the kernel a byte range will not be re-read through its own cache.
#[cfg(target_os = "linux")]
pub(crate) fn advise_dontneed(file: &File, offset: u64, len: u64) {
    use std::os::fd::AsRawFd;

    unsafe {
        libc::posix_fadvise(
            file.as_raw_fd(),
            offset as libc::off_t,
            len as libc::off_t,
            libc::POSIX_FADV_DONTNEED,
        );
    }
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn advise_dontneed(_file: &File, _offset: u64, _len: u64) {}

/// Query the OS page size, falling back when sysconf misbehaves.
pub(crate) fn os_page_size() -> usize {
    let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page <= 0 {
        common::FALLBACK_PAGE_SIZE
    } else {
        page as usize
    }
}
