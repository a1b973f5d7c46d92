//! Wipeable byte buffers for key material and decrypted plaintext.
//!
//! [`SecureBytes`] owns a copy of sensitive bytes and guarantees they are
//! destroyed deterministically: an explicit [`SecureBytes::wipe`] or the
//! `Drop` impl overwrites the buffer before the memory is released. Pages
//! can be pinned against swap with a best-effort [`SecureBytes::lock`].

use rand::RngCore;
use zeroize::Zeroize;

/// A byte buffer that is wiped on drop.
pub struct SecureBytes {
    data: Vec<u8>,
    locked: bool,
    wiped: bool,
}

impl SecureBytes {
    /// Copy `bytes` into a new owned buffer.
    ///
    /// The caller remains responsible for discarding its own copy.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
            locked: false,
            wiped: false,
        }
    }

    /// Copy a string's bytes into a new owned buffer.
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// The buffer contents. Empty after [`wipe`](Self::wipe).
    pub fn bytes(&self) -> &[u8] {
        if self.wiped {
            &[]
        } else {
            &self.data
        }
    }

    /// Buffer length; zero after wipe.
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Whether the buffer is empty (or already wiped).
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// Pin the buffer's pages so they are never written to swap.
    ///
    /// Best effort: failure is reported but callers are expected to treat
    /// it as non-fatal. On platforms without page-locking support this is
    /// a no-op that reports success.
    pub fn lock(&mut self) -> std::io::Result<()> {
        if self.data.is_empty() || self.locked {
            return Ok(());
        }
        lock_pages(&self.data)?;
        self.locked = true;
        Ok(())
    }

    /// Overwrite the buffer (zeros, random bytes, zeros), unpin any locked
    /// pages, and mark the handle inert. Idempotent.
    pub fn wipe(&mut self) {
        if self.wiped {
            return;
        }

        if self.locked {
            let _ = unlock_pages(&self.data);
            self.locked = false;
        }

        self.data.zeroize();
        rand::rngs::OsRng.fill_bytes(&mut self.data);
        self.data.zeroize();
        self.wiped = true;
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the contents.
        f.debug_struct("SecureBytes")
            .field("len", &self.data.len())
            .field("locked", &self.locked)
            .field("wiped", &self.wiped)
            .finish()
    }
}

/// Constant-time equality over byte slices.
///
/// Returns false immediately on a length mismatch, then XOR-accumulates
/// over every byte without short-circuiting.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut acc: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        acc |= x ^ y;
    }
    acc == 0
}

#[cfg(unix)]
fn lock_pages(buf: &[u8]) -> std::io::Result<()> {
    // SAFETY: the pointer/length pair comes from a live Vec we own.
    let rc = unsafe { libc::mlock(buf.as_ptr() as *const libc::c_void, buf.len()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(unix)]
fn unlock_pages(buf: &[u8]) -> std::io::Result<()> {
    // SAFETY: same pointer/length pair that was passed to mlock.
    let rc = unsafe { libc::munlock(buf.as_ptr() as *const libc::c_void, buf.len()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn lock_pages(_buf: &[u8]) -> std::io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
fn unlock_pages(_buf: &[u8]) -> std::io::Result<()> {
    Ok(())
}
