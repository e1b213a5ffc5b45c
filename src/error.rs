//! Error types for the display driver.

use core::fmt;

/// The broad category of an [`Error`], independent of the transport error type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// The transport failed to complete a write.
    IoFailure,
    /// The bus could not be acquired within the configured number of attempts.
    BusUnavailable,
    /// A scale, register value, font geometry or transfer limit is out of range.
    InvalidConfiguration,
    /// The operation needs an initialized controller.
    NotInitialized,
}

/// Errors that can occur while driving the display. `E` is the error type of the underlying
/// [`DisplayInterface`](crate::interface::DisplayInterface).
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// Underlying bus error. There is no partial-write recovery, so the controller state is
    /// unknown after this.
    Io(E),
    /// `open` kept reporting the bus as busy.
    BusUnavailable,
    /// Rejected configuration value.
    InvalidConfiguration,
    /// `init` has not completed successfully yet.
    NotInitialized,
}

impl<E> Error<E> {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::IoFailure,
            Error::BusUnavailable => ErrorKind::BusUnavailable,
            Error::InvalidConfiguration => ErrorKind::InvalidConfiguration,
            Error::NotInitialized => ErrorKind::NotInitialized,
        }
    }
}

/// A value that does not encode a valid controller setting, e.g. a raw scale code above 2 or
/// a multiplex ratio below 16.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidValue;

impl<E> From<InvalidValue> for Error<E> {
    fn from(_: InvalidValue) -> Self {
        Error::InvalidConfiguration
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "bus write failed: {:?}", e),
            Error::BusUnavailable => write!(f, "bus did not become available"),
            Error::InvalidConfiguration => write!(f, "invalid display configuration"),
            Error::NotInitialized => write!(f, "display not initialized"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Io(e) => defmt::write!(f, "bus write failed: {}", e),
            Error::BusUnavailable => defmt::write!(f, "bus did not become available"),
            Error::InvalidConfiguration => defmt::write!(f, "invalid display configuration"),
            Error::NotInitialized => defmt::write!(f, "display not initialized"),
        }
    }
}
