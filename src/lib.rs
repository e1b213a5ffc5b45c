//! Driver library for the Solomon Systech SSD1306 dot matrix OLED display driver, for 128x64
//! panels on an I2C bus.
//!
//! The driver keeps no framebuffer. Every drawing call is turned directly into page-addressed
//! command and data transactions, so text and bitmaps land in display RAM at the cursor.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate embedded_hal as hal;

pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod font;
pub mod interface;

// Re-exports for primary API.
pub use command::{consts, ComPinLayout, Command};
pub use config::Config;
pub use display::{Cursor, Display, Scale};
pub use error::{Error, ErrorKind, InvalidValue};
pub use font::{ByteStore, Font, FontLayout, FONT_6X8};
pub use interface::i2c::I2cInterface;
pub use interface::DisplayInterface;
