//! Memory-mapped window over the GPIO register block

use std::fs::OpenOptions;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::ptr::{read_volatile, write_volatile};
use std::sync::OnceLock;

use super::{GPIO_MEM_DEVICE, GPIO_MEM_LEN, GPIO_MEM_WORDS};

/// Handle to the GPIO register block mapped into the process.
///
/// The handle is a bare base pointer and is freely copyable; every access
/// goes through a volatile read or write so the compiler can neither
/// reorder nor elide register traffic.
#[derive(Clone, Copy)]
pub struct GpioMem {
    base: *mut u32,
}

impl GpioMem {
    /// Map the GPIO register block from the memory device.
    ///
    /// The device is opened read/write with `O_SYNC` and its first
    /// [`GPIO_MEM_LEN`](super::GPIO_MEM_LEN) bytes are mapped shared. The
    /// file descriptor is closed once the mapping exists; the mapping
    /// itself lives for the rest of the process.
    fn map() -> io::Result<Self> {
        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(GPIO_MEM_DEVICE)?;

        // SAFETY: fresh anonymous placement, shared mapping of a device fd
        // that stays open for the duration of the call.
        let base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                GPIO_MEM_LEN,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                device.as_raw_fd(),
                0,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            base: base.cast::<u32>(),
        })
    }

    /// Wrap a caller-owned word buffer, for exercising register users
    /// against plain memory. The buffer must stay alive and in place for
    /// as long as any copy of the handle.
    #[cfg(test)]
    pub(crate) fn from_ptr(base: *mut u32) -> Self {
        Self { base }
    }

    /// Volatile read of the 32-bit word at `offset` (in words).
    pub fn read_word(&self, offset: usize) -> u32 {
        debug_assert!(offset < GPIO_MEM_WORDS);
        // SAFETY: `base` points at a mapping of at least GPIO_MEM_WORDS
        // words; the offset is within it.
        unsafe { read_volatile(self.base.add(offset)) }
    }

    /// Volatile write of the 32-bit word at `offset` (in words).
    pub fn write_word(&self, offset: usize, value: u32) {
        debug_assert!(offset < GPIO_MEM_WORDS);
        // SAFETY: as for `read_word`.
        unsafe { write_volatile(self.base.add(offset), value) }
    }
}

// SAFETY: the handle is a pointer into a shared device mapping; the
// hardware tolerates word access from any thread and callers serialise
// transfers themselves.
unsafe impl Send for GpioMem {}
unsafe impl Sync for GpioMem {}

static GPIO_MEM: OnceLock<GpioMem> = OnceLock::new();

/// Map the GPIO register block, or return the existing process-wide
/// mapping.
///
/// The first successful call creates the mapping; it is never unmapped.
/// Concurrent first calls converge on a single handle.
///
/// # Errors
///
/// Propagates the error when the memory device cannot be opened or the
/// mapping fails; a later call may still succeed.
pub fn gpio_mem() -> io::Result<GpioMem> {
    if let Some(mem) = GPIO_MEM.get() {
        return Ok(*mem);
    }
    let mem = GpioMem::map()?;
    // A concurrent caller may have won the race; its mapping becomes the
    // singleton and ours stays mapped alongside it, unused.
    Ok(*GPIO_MEM.get_or_init(|| mem))
}
