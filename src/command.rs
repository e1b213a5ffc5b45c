//! The command set for the SSD1306, and the framing of bus transactions.
//!
//! Note 1: The display RAM of the SSD1306 is arranged in 8 pages of 128 columns. Each column of a
//! page is one byte driving 8 vertically adjacent pixels, least significant bit on top. In page
//! addressing mode, which is the only mode this driver uses, the column pointer advances after
//! each data byte and wraps within the current page, so anywhere there is a "page" address it
//! refers to a horizontal band of 8 pixel rows.
//!
//! Note 2: On the two-wire bus every transaction starts with a control byte (the `Tag`) that
//! tells the controller whether the rest of the transaction is command bytes or display RAM
//! data.

use crate::error::InvalidValue;

pub mod consts {
    pub const NUM_COLUMNS: u8 = 128;
    pub const NUM_PAGES: u8 = 8;
    pub const PAGE_HEIGHT: u8 = 8;
    pub const NUM_PIXEL_ROWS: u8 = NUM_PAGES * PAGE_HEIGHT;
    pub const COLUMN_MAX: u8 = NUM_COLUMNS - 1;
    pub const PAGE_MAX: u8 = NUM_PAGES - 1;
    /// Largest payload of a single transaction: one full page of columns.
    pub const MAX_PAYLOAD: usize = NUM_COLUMNS as usize;
}

use self::consts::*;

/// The control byte leading every bus transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tag {
    /// The remaining bytes are commands and their arguments.
    Command = 0x00,
    /// The remaining bytes are written to display RAM at the column/page pointer.
    Data = 0x40,
}

/// How the RAM address pointer moves after each data byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressingMode {
    Horizontal,
    Vertical,
    /// The column pointer advances within the current page only. (Note 1)
    Page,
}

/// Setting of the COM output scan direction. Changing it flips the image vertically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComScanDirection {
    /// COM0 is scanned first, so RAM row 0 is the top row of the panel.
    RowZeroFirst,
    /// COM63 is scanned first, so RAM row 0 is the bottom row of the panel.
    RowZeroLast,
}

/// How the COM pins are wired to the panel rows. Dictated by the display module; 128x64 modules
/// use `Alternative`, 128x32 modules use `Sequential`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComPinLayout {
    Sequential,
    Alternative,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Turn the panel on (`true`) or off into sleep mode (`false`).
    DisplayOn(bool),
    /// Set the display clock divide ratio (1-16) and the oscillator frequency setting (0-15).
    SetClockDivide(u8, u8),
    /// Set the multiplex ratio, the number of active COM lines. Range 16-64.
    SetMuxRatio(u8),
    /// Set the vertical shift of the COM lines. Range 0-63.
    SetDisplayOffset(u8),
    /// Set the RAM row that is displayed on the first COM line. Range 0-63.
    SetStartLine(u8),
    /// Enable or disable the internal charge pump. The panel stays dark without it unless an
    /// external VCC supply is fitted.
    SetChargePump(bool),
    SetAddressingMode(AddressingMode),
    /// When `true`, column address 127 is mapped to SEG0, mirroring the image horizontally
    /// relative to the POR default.
    SetSegmentRemap(bool),
    SetComScanDirection(ComScanDirection),
    SetComPinLayout(ComPinLayout),
    /// Set the contrast current. Range 0-255.
    SetContrast(u8),
    /// Set the pre-charge phase 1 and phase 2 periods in DCLKs, each in range 1-15.
    SetPreChargePeriod(u8, u8),
    /// Set the VCOMH deselect level register value. Only bits 4-6 are significant.
    SetVcomhDeselectLevel(u8),
    /// `true` lights every pixel regardless of RAM contents, `false` resumes showing RAM.
    EntireDisplayOn(bool),
    /// Inverse (`true`) or normal (`false`) display polarity.
    SetInverted(bool),
    DeactivateScroll,
    /// No operation. Harmless to send at any time, so it doubles as a presence check.
    Nop,
    /// Set the page of the RAM pointer in page addressing mode. Masked to 0-7.
    SetPageStart(u8),
    /// Set the column of the RAM pointer in page addressing mode, as a high nibble command
    /// followed by a low nibble command. No range check: the nibbles are masked.
    SetColumn(u8),
}

macro_rules! ok_command {
    ($buf:ident,[$arg0:expr]) => {{
        $buf[0] = $arg0;
        Ok(&$buf[..1])
    }};
    ($buf:ident,[$arg0:expr, $arg1:expr]) => {{
        $buf[0] = $arg0;
        $buf[1] = $arg1;
        Ok(&$buf[..2])
    }};
}

impl Command {
    /// Encode the command into `buf`, returning the slice of it that holds the command bytes.
    pub fn encode(self, buf: &mut [u8; 2]) -> Result<&[u8], InvalidValue> {
        match self {
            Command::DisplayOn(on) => ok_command!(buf, [if on { 0xAF } else { 0xAE }]),
            Command::SetClockDivide(divide, freq) => match (divide, freq) {
                (1..=16, 0..=15) => ok_command!(buf, [0xD5, freq << 4 | (divide - 1)]),
                _ => Err(InvalidValue),
            },
            Command::SetMuxRatio(ratio) => match ratio {
                16..=NUM_PIXEL_ROWS => ok_command!(buf, [0xA8, ratio - 1]),
                _ => Err(InvalidValue),
            },
            Command::SetDisplayOffset(offset) => match offset {
                0..=63 => ok_command!(buf, [0xD3, offset]),
                _ => Err(InvalidValue),
            },
            Command::SetStartLine(line) => match line {
                0..=63 => ok_command!(buf, [0x40 | line]),
                _ => Err(InvalidValue),
            },
            Command::SetChargePump(ena) => {
                ok_command!(buf, [0x8D, if ena { 0x14 } else { 0x10 }])
            }
            Command::SetAddressingMode(mode) => {
                let m = match mode {
                    AddressingMode::Horizontal => 0x00,
                    AddressingMode::Vertical => 0x01,
                    AddressingMode::Page => 0x02,
                };
                ok_command!(buf, [0x20, m])
            }
            Command::SetSegmentRemap(remap) => ok_command!(buf, [if remap { 0xA1 } else { 0xA0 }]),
            Command::SetComScanDirection(dir) => ok_command!(
                buf,
                [match dir {
                    ComScanDirection::RowZeroFirst => 0xC0,
                    ComScanDirection::RowZeroLast => 0xC8,
                }]
            ),
            Command::SetComPinLayout(layout) => ok_command!(
                buf,
                [
                    0xDA,
                    match layout {
                        ComPinLayout::Sequential => 0x02,
                        ComPinLayout::Alternative => 0x12,
                    }
                ]
            ),
            Command::SetContrast(contrast) => ok_command!(buf, [0x81, contrast]),
            Command::SetPreChargePeriod(phase_1, phase_2) => match (phase_1, phase_2) {
                (1..=15, 1..=15) => ok_command!(buf, [0xD9, phase_2 << 4 | phase_1]),
                _ => Err(InvalidValue),
            },
            Command::SetVcomhDeselectLevel(level) => match level & 0x8F {
                0 => ok_command!(buf, [0xDB, level]),
                _ => Err(InvalidValue),
            },
            Command::EntireDisplayOn(ena) => ok_command!(buf, [if ena { 0xA5 } else { 0xA4 }]),
            Command::SetInverted(inv) => ok_command!(buf, [if inv { 0xA7 } else { 0xA6 }]),
            Command::DeactivateScroll => ok_command!(buf, [0x2E]),
            Command::Nop => ok_command!(buf, [0xE3]),
            Command::SetPageStart(page) => ok_command!(buf, [0xB0 | (page & PAGE_MAX)]),
            Command::SetColumn(column) => {
                ok_command!(buf, [0x10 | ((column >> 4) & 0x0F), column & 0x0F])
            }
        }
    }
}

/// A reusable buffer holding one bus transaction: the tag byte followed by at most
/// `MAX_PAYLOAD` bytes. Every write into it is bounds checked.
pub struct Transaction {
    buf: [u8; MAX_PAYLOAD + 1],
    len: usize,
}

impl Transaction {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; MAX_PAYLOAD + 1],
            len: 0,
        }
    }

    /// Discard the current contents and start a new transaction of kind `tag`.
    pub fn begin(&mut self, tag: Tag) {
        self.buf[0] = tag as u8;
        self.len = 1;
    }

    pub fn push(&mut self, byte: u8) -> Result<(), InvalidValue> {
        let slot = self.buf.get_mut(self.len).ok_or(InvalidValue)?;
        *slot = byte;
        self.len += 1;
        Ok(())
    }

    /// Append `count` copies of `byte`.
    pub fn push_repeated(&mut self, byte: u8, count: usize) -> Result<(), InvalidValue> {
        let end = self.len + count;
        if end > self.buf.len() {
            return Err(InvalidValue);
        }
        for slot in self.buf[self.len..end].iter_mut() {
            *slot = byte;
        }
        self.len = end;
        Ok(())
    }

    pub fn push_command(&mut self, cmd: Command) -> Result<(), InvalidValue> {
        let mut arg_buf = [0u8; 2];
        for &b in cmd.encode(&mut arg_buf)? {
            self.push(b)?;
        }
        Ok(())
    }

    /// Number of bytes after the tag.
    pub fn payload_len(&self) -> usize {
        self.len.saturating_sub(1)
    }

    /// The complete transaction, tag included, as it goes on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}
