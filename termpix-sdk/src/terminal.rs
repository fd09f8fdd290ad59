// ABOUTME: Terminal pixel size query behind an injectable capability trait
// ABOUTME: Real /dev/tty ioctl implementation plus a fixed-size stand-in

use crate::constants::terminal::TTY_PATH;
use crate::error::{Result, TermpixError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Narrow each axis to the given cap, leaving uncapped axes alone
    pub fn capped(self, max_width: Option<u32>, max_height: Option<u32>) -> Self {
        Self {
            width: max_width.map_or(self.width, |w| self.width.min(w)),
            height: max_height.map_or(self.height, |h| self.height.min(h)),
        }
    }

    /// Number of bytes in an RGBA plane of this size
    pub fn rgba_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// `rgba_len`, or `None` when it does not fit in `usize`
    pub fn checked_rgba_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(4)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `1280x720`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;

        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{}'", w))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{}'", h))?;

        if width == 0 || height == 0 {
            return Err(format!("dimensions must be positive, got {}x{}", width, height));
        }

        Ok(Self { width, height })
    }
}

/// Source of the terminal's drawable area in pixels
pub trait TerminalSize {
    /// Current pixel size. Each call is a fresh point-in-time query.
    fn pixel_size(&self) -> Result<Dimensions>;
}

impl<T: TerminalSize + ?Sized> TerminalSize for &T {
    fn pixel_size(&self) -> Result<Dimensions> {
        (**self).pixel_size()
    }
}

/// Queries the controlling terminal device directly, so redirected stdout
/// does not hide the size.
#[derive(Debug, Clone)]
pub struct TtyDevice {
    path: PathBuf,
}

impl Default for TtyDevice {
    fn default() -> Self {
        Self {
            path: PathBuf::from(TTY_PATH),
        }
    }
}

impl TtyDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
impl TerminalSize for TtyDevice {
    fn pixel_size(&self) -> Result<Dimensions> {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;
        use std::os::unix::io::AsRawFd;

        let tty = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK | libc::O_CLOEXEC)
            .open(&self.path)
            .map_err(|e| {
                TermpixError::TerminalUnavailable(format!(
                    "cannot open {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        let mut ws = libc::winsize {
            ws_row: 0,
            ws_col: 0,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };

        // SAFETY: the fd is open for the lifetime of `tty` and `ws` is a valid
        // winsize the kernel writes into.
        let rc = unsafe { libc::ioctl(tty.as_raw_fd(), libc::TIOCGWINSZ, &mut ws) };
        if rc != 0 {
            let err = std::io::Error::last_os_error();
            return Err(TermpixError::TerminalUnavailable(format!(
                "window size query refused: {}",
                err
            )));
        }

        let dims = Dimensions::new(u32::from(ws.ws_xpixel), u32::from(ws.ws_ypixel));
        if dims.is_empty() {
            return Err(TermpixError::TerminalUnavailable(format!(
                "terminal reported no pixel size ({} columns x {} rows)",
                ws.ws_col, ws.ws_row
            )));
        }

        log::debug!("Terminal pixel size from {}: {}", self.path.display(), dims);
        Ok(dims)
    }
}

#[cfg(not(unix))]
impl TerminalSize for TtyDevice {
    fn pixel_size(&self) -> Result<Dimensions> {
        Err(TermpixError::TerminalUnavailable(
            "pixel size queries are only supported on unix terminals".to_string(),
        ))
    }
}

/// A terminal that always reports the same size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSize(pub Dimensions);

impl FixedSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self(Dimensions::new(width, height))
    }
}

impl TerminalSize for FixedSize {
    fn pixel_size(&self) -> Result<Dimensions> {
        if self.0.is_empty() {
            return Err(TermpixError::TerminalUnavailable(format!(
                "fixed terminal size {} has no pixels",
                self.0
            )));
        }
        Ok(self.0)
    }
}
