// SPDX-License-Identifier: MIT
//
// Terminal mode control: raw mode, bracketed paste, panic-safe restore.
//
// Safety: termios (tcgetattr, tcsetattr), isatty and the raw fd write in
// the panic hook have no safe std equivalent. Each unsafe block is one
// libc call.
#![allow(unsafe_code)]
//
// Raw mode is only entered if the terminal is not already raw, and only
// restored by whoever entered it. An embedding application that set raw
// mode itself keeps it after we unmount.
//
// The panic hook writes its restore bytes straight to fd 1, bypassing the
// stdout lock, so a panic raised while that lock is held cannot deadlock.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use tracing::{debug, info};

/// DEC private mode 2004 on: frame pastes with `CSI 200~` / `CSI 201~`.
pub const BRACKETED_PASTE_ON: &[u8] = b"\x1b[?2004h";
/// DEC private mode 2004 off.
pub const BRACKETED_PASTE_OFF: &[u8] = b"\x1b[?2004l";

/// Check whether stdin is connected to a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

#[cfg(unix)]
fn current_termios() -> Option<libc::termios> {
    if !is_tty() {
        return None;
    }
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        (libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) == 0).then_some(termios)
    }
}

/// Ask the terminal to frame pastes.
#[inline]
pub fn enable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(BRACKETED_PASTE_ON)?;
    w.flush()
}

/// Stop framing pastes.
#[inline]
pub fn disable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(BRACKETED_PASTE_OFF)?;
    w.flush()
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// Termios to restore if we panic while raw. Set only while a [`RawMode`]
/// guard that changed the terminal is alive.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

static PANIC_HOOK_INSTALLED: Once = Once::new();

#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Install, once per process, a panic hook that turns off bracketed
/// paste and restores the saved termios before the previous hook prints.
pub fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    {
        unsafe {
            let _ = libc::write(
                libc::STDOUT_FILENO,
                BRACKETED_PASTE_OFF.as_ptr().cast::<libc::c_void>(),
                BRACKETED_PASTE_OFF.len(),
            );
        }
        restore_termios_from_backup();
    }

    #[cfg(not(unix))]
    {
        let _ = disable_bracketed_paste(&mut io::stdout());
    }
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Raw-mode guard.
///
/// [`enable`](Self::enable) switches stdin to raw mode unless it is not a
/// terminal or is already raw. The guard remembers whether it made the
/// change, and [`restore`](Self::restore) (or drop) undoes only that.
#[derive(Debug)]
pub struct RawMode {
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// Enter raw mode if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the terminal attributes fails.
    #[cfg(unix)]
    pub fn enable() -> io::Result<Self> {
        let Some(original) = current_termios() else {
            debug!("stdin is not a terminal, raw mode skipped");
            return Ok(Self { original: None });
        };
        if original.c_lflag & (libc::ICANON | libc::ECHO) == 0 {
            debug!("terminal already raw, leaving it alone");
            return Ok(Self { original: None });
        }

        let mut raw = original;
        raw.c_iflag &= !(libc::IGNBRK
            | libc::BRKINT
            | libc::PARMRK
            | libc::ISTRIP
            | libc::INLCR
            | libc::IGNCR
            | libc::ICRNL
            | libc::IXON);
        raw.c_oflag &= !libc::OPOST;
        raw.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
        raw.c_cflag &= !(libc::CSIZE | libc::PARENB);
        raw.c_cflag |= libc::CS8;
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        unsafe {
            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const raw) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original);
        }
        info!("raw mode enabled");
        Ok(Self {
            original: Some(original),
        })
    }

    #[cfg(not(unix))]
    pub fn enable() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Whether this guard switched the terminal into raw mode.
    #[cfg(unix)]
    #[must_use]
    pub const fn changed_terminal(&self) -> bool {
        self.original.is_some()
    }

    #[cfg(not(unix))]
    #[must_use]
    pub const fn changed_terminal(&self) -> bool {
        false
    }

    /// Put back the attributes saved by [`enable`](Self::enable).
    /// Idempotent, and a no-op if the guard changed nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if `tcsetattr` fails.
    #[cfg(unix)]
    pub fn restore(&mut self) -> io::Result<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };
        unsafe {
            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }
        info!("raw mode restored");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn restore(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
