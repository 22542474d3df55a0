//! Socket pair endpoints.
//!
//! Two implementations drive the same `socketpair(AF_UNIX, SOCK_STREAM)`
//! channel:
//! - [`RawEndpoint`] issues `write(2)`/`read(2)` directly through libc
//! - [`UnixStream`] goes through `std::io::{Read, Write}`

use callcost_common::error::{CallcostError, CallcostResult};
use nix::sys::socket::{
    setsockopt, socketpair, sockopt, AddressFamily, SockFlag, SockProtocol, SockType,
};
use nix::sys::time::TimeVal;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::net::UnixStream;
use std::time::Duration;
use tracing::debug;

/// One end of a connected byte stream.
pub trait Endpoint {
    /// Issue a single write call.
    ///
    /// # Errors
    ///
    /// Returns the OS error reported by the call.
    fn write_some(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Issue a single read call.
    ///
    /// # Errors
    ///
    /// Returns the OS error reported by the call.
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Set or clear the receive timeout. `None` blocks forever.
    ///
    /// # Errors
    ///
    /// Returns the OS error reported by `setsockopt`.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

/// Socket descriptor driven by raw `write(2)`/`read(2)` calls.
#[derive(Debug)]
pub struct RawEndpoint {
    fd: OwnedFd,
}

impl RawEndpoint {
    /// Wrap an owned socket descriptor.
    #[must_use]
    pub fn new(fd: OwnedFd) -> Self {
        Self { fd }
    }
}

impl Endpoint for RawEndpoint {
    #[inline]
    fn write_some(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: `buf` is a live slice and `fd` stays open for the lifetime of `self`.
        let written = unsafe { libc::write(self.fd.as_raw_fd(), buf.as_ptr().cast(), buf.len()) };
        usize::try_from(written).map_err(|_| io::Error::last_os_error())
    }

    #[inline]
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: `buf` is a live, writable slice and `fd` stays open for the lifetime of `self`.
        let read = unsafe { libc::read(self.fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len()) };
        usize::try_from(read).map_err(|_| io::Error::last_os_error())
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        setsockopt(&self.fd, sockopt::ReceiveTimeout, &timeval(timeout)?)
            .map_err(io::Error::from)
    }
}

impl Endpoint for UnixStream {
    #[inline]
    fn write_some(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(self, buf)
    }

    #[inline]
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        UnixStream::set_read_timeout(self, timeout)
    }
}

/// `SO_RCVTIMEO` value; all-zero means no timeout.
///
/// Fails with [`io::ErrorKind::InvalidInput`] if the seconds do not fit in `time_t`.
fn timeval(timeout: Option<Duration>) -> io::Result<TimeVal> {
    let Some(d) = timeout else {
        return Ok(TimeVal::new(0, 0));
    };
    let out_of_range =
        || io::Error::new(io::ErrorKind::InvalidInput, format!("timeout {d:?} out of range"));
    let secs = libc::time_t::try_from(d.as_secs()).map_err(|_| out_of_range())?;
    // Round sub-microsecond timeouts up so they don't turn into "block forever".
    let micros = d.subsec_micros().max(u32::from(d.as_secs() == 0));
    let micros = libc::suseconds_t::try_from(micros).map_err(|_| out_of_range())?;
    Ok(TimeVal::new(secs, micros))
}

/// Connected socket pair: `sender` writes, `receiver` reads.
#[derive(Debug)]
pub struct SocketPair<E> {
    /// Writing end.
    pub sender: E,
    /// Reading end.
    pub receiver: E,
}

/// Create a connected `AF_UNIX` stream socket pair.
///
/// # Errors
///
/// Returns [`CallcostError::ChannelSetup`] if `socketpair(2)` fails.
pub fn open_socket_pair() -> CallcostResult<(OwnedFd, OwnedFd)> {
    let (a, b) = socketpair(
        AddressFamily::Unix,
        SockType::Stream,
        Option::<SockProtocol>::None,
        SockFlag::empty(),
    )
    .map_err(|e| CallcostError::ChannelSetup(format!("socketpair failed: {e}")))?;
    debug!(sender = a.as_raw_fd(), receiver = b.as_raw_fd(), "Socket pair created");
    Ok((a, b))
}

impl SocketPair<RawEndpoint> {
    /// Socket pair driven by raw syscalls.
    ///
    /// # Errors
    ///
    /// Returns [`CallcostError::ChannelSetup`] if the pair cannot be created.
    pub fn open_raw() -> CallcostResult<Self> {
        let (a, b) = open_socket_pair()?;
        Ok(Self {
            sender: RawEndpoint::new(a),
            receiver: RawEndpoint::new(b),
        })
    }
}

impl SocketPair<UnixStream> {
    /// Socket pair driven through `std::io`.
    ///
    /// # Errors
    ///
    /// Returns [`CallcostError::ChannelSetup`] if the pair cannot be created.
    pub fn open_std() -> CallcostResult<Self> {
        let (a, b) = open_socket_pair()?;
        Ok(Self {
            sender: UnixStream::from(a),
            receiver: UnixStream::from(b),
        })
    }
}
