//! # Bluetooth RFCOMM Link
//!
//! Talks to a paired printer through a Linux RFCOMM serial device
//! (Bluetooth Serial Port Profile).
//!
//! ## Bluetooth Setup (Linux)
//!
//! ```bash
//! $ bluetoothctl
//! [bluetooth]# pair 66:22:XX:XX:XX:XX
//! $ sudo rfcomm bind 0 66:22:XX:XX:XX:XX
//! # This creates /dev/rfcomm0
//! ```
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so binary data passes unmodified:
//! 8-bit characters, no parity, no CR/LF translation, no echo, no
//! canonical mode and no XON/XOFF flow control.
//!
//! ## Disconnect Detection
//!
//! When the remote end goes away the kernel fails writes with `EPIPE`,
//! `ENOTCONN`, `ECONNRESET`, `ECONNABORTED`, `ENODEV` or `EIO`. Those are
//! reported as [`LinkError::Disconnected`]; anything else is a plain write
//! failure.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{Connector, Link, LinkError};

/// Default RFCOMM device path
pub const DEFAULT_DEVICE: &str = "/dev/rfcomm0";

/// Opens [`RfcommLink`]s on one device path.
#[derive(Debug, Clone)]
pub struct RfcommConnector {
    device: PathBuf,
}

impl RfcommConnector {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }

    pub fn device(&self) -> &Path {
        &self.device
    }
}

impl Default for RfcommConnector {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE)
    }
}

#[async_trait]
impl Connector for RfcommConnector {
    type Link = RfcommLink;

    async fn connect(&self) -> Result<RfcommLink, LinkError> {
        let path = self.device.clone();
        let file = tokio::task::spawn_blocking(move || open_raw(&path))
            .await
            .map_err(|e| LinkError::Other(format!("open task failed: {}", e)))?
            .map_err(|e| {
                LinkError::Other(format!("failed to open {}: {}", self.device.display(), e))
            })?;

        info!(device = %self.device.display(), "Opened RFCOMM device");
        Ok(RfcommLink {
            file: Some(Arc::new(file)),
        })
    }
}

/// Open RFCOMM device. Writes run on the blocking pool.
pub struct RfcommLink {
    file: Option<Arc<File>>,
}

#[async_trait]
impl Link for RfcommLink {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), LinkError> {
        let Some(file) = self.file.as_ref().map(Arc::clone) else {
            return Err(LinkError::Disconnected("link closed".into()));
        };
        let chunk = chunk.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut out: &File = &file;
            out.write_all(&chunk)?;
            out.flush()
        })
        .await
        .map_err(|e| LinkError::Other(format!("write task failed: {}", e)))?
        .map_err(classify)
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        if self.file.take().is_some() {
            debug!("Closed RFCOMM device");
        }
        Ok(())
    }
}

fn open_raw(path: &Path) -> io::Result<File> {
    let file = OpenOptions::new().write(true).open(path)?;
    configure_tty_raw(&file)?;
    Ok(file)
}

/// Map an I/O error onto the disconnect / other split.
pub fn classify(error: io::Error) -> LinkError {
    if is_disconnect(&error) {
        LinkError::Disconnected(error.to_string())
    } else {
        LinkError::Other(error.to_string())
    }
}

fn is_disconnect(error: &io::Error) -> bool {
    use io::ErrorKind::*;

    if matches!(
        error.kind(),
        BrokenPipe | NotConnected | ConnectionReset | ConnectionAborted
    ) {
        return true;
    }
    matches!(error.raw_os_error(), Some(libc::ENODEV) | Some(libc::EIO))
}

/// Put the device in raw TTY mode.
///
/// IXON/IXOFF/IXANY matter: 0x11 and 0x13 show up in raster data and
/// would otherwise be swallowed as flow control.
#[cfg(unix)]
fn configure_tty_raw(file: &File) -> io::Result<()> {
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    let mut termios = MaybeUninit::uninit();
    if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &File) -> io::Result<()> {
    Ok(())
}

// ============================================================================
// DEVICE LOOKUP
// ============================================================================

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Find the RFCOMM device bound to `mac` via `/proc/net/rfcomm`.
///
/// Lines look like `rfcomm0: 66:22:AA:BB:CC:DD channel 1 clean`.
pub fn find_rfcomm_for_mac(mac: &str) -> Option<PathBuf> {
    let contents = fs::read_to_string("/proc/net/rfcomm").ok()?;
    device_for_mac(&contents, mac)
        .map(|name| PathBuf::from(format!("/dev/{}", name)))
        .filter(|path| path.exists())
}

fn device_for_mac<'a>(table: &'a str, mac: &str) -> Option<&'a str> {
    let mac = mac.to_uppercase();
    table
        .lines()
        .filter(|line| line.to_uppercase().contains(&mac))
        .find_map(|line| line.split(':').next())
        .map(str::trim)
}

// ============================================================================
// TESTS
// ============================================================================
