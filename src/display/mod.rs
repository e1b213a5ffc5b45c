//! The main API to the display driver. A `Display` is one controller session: it owns the bus
//! interface, the font, the RAM pointer position (the cursor) and the active text scale, and
//! turns drawing requests into command and data transactions.


pub mod bitmap;
pub mod text;

use core::cmp;
use core::convert::TryFrom;

use crate::command::consts::*;
use crate::command::{Command, Tag, Transaction};
use crate::config::{self, Config};
use crate::error::{Error, InvalidValue};
use crate::font::{ByteStore, Font};
use crate::interface;

/// Position of the display RAM pointer: a column (0-127) and a page (0-7, each 8 pixel rows).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub column: u8,
    pub page: u8,
}

/// Magnification applied to glyphs. Raw codes 0, 1 and 2 convert with `Scale::try_from`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scale {
    #[default]
    X1 = 0,
    X2 = 1,
    X4 = 2,
}

impl Scale {
    /// The pixel replication factor.
    pub fn factor(self) -> u8 {
        match self {
            Scale::X1 => 1,
            Scale::X2 => 2,
            Scale::X4 => 4,
        }
    }

    /// Bit offsets of the source rows each output page is expanded from, top to bottom. At 2x a
    /// page holds 4 source rows, at 4x it holds 2.
    pub(crate) fn row_shifts(self) -> &'static [u8] {
        match self {
            Scale::X1 => &[0],
            Scale::X2 => &[0, 4],
            Scale::X4 => &[0, 2, 4, 6],
        }
    }
}

impl TryFrom<u8> for Scale {
    type Error = InvalidValue;

    fn try_from(code: u8) -> Result<Self, InvalidValue> {
        match code {
            0 => Ok(Scale::X1),
            1 => Ok(Scale::X2),
            2 => Ok(Scale::X4),
            _ => Err(InvalidValue),
        }
    }
}

/// A driver for an SSD1306 display.
pub struct Display<DI, S> {
    iface: DI,
    address: u8,
    font: Font<S>,
    cursor: Cursor,
    scale: Scale,
    max_transfer: usize,
    initialized: bool,
    /// Whether the controller RAM pointer is known to be at `cursor`. Data writes move it.
    pointer_synced: bool,
    tx: Transaction,
}

impl<DI, S> Display<DI, S>
where
    DI: interface::DisplayInterface,
    S: ByteStore,
{
    /// Construct a new display driver for the controller at bus `address` (typically `0x3C` or
    /// `0x3D`), connected to the interface `iface`, rendering text with `font`. No bus traffic
    /// happens until `init`.
    pub fn new(iface: DI, address: u8, font: Font<S>) -> Self {
        Display {
            iface,
            address,
            font,
            cursor: Cursor::default(),
            scale: Scale::default(),
            max_transfer: Config::default().max_transfer,
            initialized: false,
            pointer_synced: false,
            tx: Transaction::new(),
        }
    }

    /// Acquire the bus, send the init sequence encoded by `config`, and blank the screen.
    ///
    /// The bus is polled up to `1 + config.open_retries` times; if it never becomes available
    /// this returns `Error::BusUnavailable` without having sent anything.
    pub fn init(&mut self, config: Config) -> Result<(), Error<DI::Error>> {
        if !self.font.is_valid() || !config.max_transfer_is_valid() {
            #[cfg(feature = "defmt")]
            defmt::error!(
                "rejecting display config: font width {}, max transfer {}",
                self.font.width(),
                config.max_transfer
            );
            return Err(Error::InvalidConfiguration);
        }

        // Encode everything before touching the bus so that bad register values are reported
        // without side effects.
        self.tx.begin(Tag::Command);
        for cmd in config.init_sequence().iter() {
            self.tx.push_command(*cmd)?;
        }

        self.acquire_bus(config.open_retries)?;
        self.flush()?;

        self.max_transfer = config.max_transfer;
        self.scale = config.default_scale;
        self.initialized = true;
        #[cfg(feature = "defmt")]
        defmt::debug!("display at {=u8:#x} initialized", self.address);

        self.fill_screen(0)
    }

    fn acquire_bus(&mut self, retries: u32) -> Result<(), Error<DI::Error>> {
        let mut attempts = 0u32;
        loop {
            match self.iface.open(self.address) {
                Ok(()) => return Ok(()),
                Err(nb::Error::Other(e)) => return Err(Error::Io(e)),
                Err(nb::Error::WouldBlock) => {
                    if attempts >= retries {
                        #[cfg(feature = "defmt")]
                        defmt::warn!(
                            "bus for {=u8:#x} still busy after {} attempts",
                            self.address,
                            attempts + 1
                        );
                        return Err(Error::BusUnavailable);
                    }
                    attempts += 1;
                }
            }
        }
    }

    /// Give back the interface, ending the session.
    pub fn release(self) -> DI {
        self.iface
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Where the next glyph will be drawn.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Set the magnification of subsequently rendered characters.
    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    pub fn font(&self) -> &Font<S> {
        &self.font
    }

    /// Move the RAM pointer to column `x` and page `y`. Nothing is range checked: `y` is masked
    /// to 0-7, and `x` is sent as two nibbles the same way the controller would receive it from
    /// any other source.
    pub fn set_position(&mut self, x: u8, y: u8) -> Result<(), Error<DI::Error>> {
        self.send_commands(&[Command::SetPageStart(y), Command::SetColumn(x)])?;
        self.cursor = Cursor {
            column: x,
            page: y & PAGE_MAX,
        };
        self.pointer_synced = true;
        Ok(())
    }

    /// Overwrite every byte of display RAM with `fill`. Each page is written in transactions of
    /// at most the configured transfer size. Leaves the cursor at the start of the last page.
    pub fn fill_screen(&mut self, fill: u8) -> Result<(), Error<DI::Error>> {
        for page in 0..NUM_PAGES {
            self.set_position(0, page)?;
            let mut remaining = NUM_COLUMNS as usize;
            while remaining > 0 {
                let chunk_len = cmp::min(remaining, self.max_transfer);
                self.tx.begin(Tag::Data);
                self.tx.push_repeated(fill, chunk_len)?;
                self.flush_data()?;
                remaining -= chunk_len;
            }
        }
        // The pointer wrapped around to column 0 of the last page.
        self.pointer_synced = true;
        Ok(())
    }

    /// Rotate the visible image by 180 degrees (`true`) or restore the upright orientation.
    /// Display RAM and the cursor are unaffected.
    pub fn flip_screen(&mut self, flipped: bool) -> Result<(), Error<DI::Error>> {
        let (segment_remap, com_scan) = config::orientation(flipped);
        self.send_commands(&[segment_remap, com_scan])
    }

    /// Show the image with inverse (`true`) or normal polarity.
    pub fn invert(&mut self, inverted: bool) -> Result<(), Error<DI::Error>> {
        self.send_commands(&[Command::SetInverted(inverted)])
    }

    /// Control the contrast current.
    pub fn contrast(&mut self, contrast: u8) -> Result<(), Error<DI::Error>> {
        self.send_commands(&[Command::SetContrast(contrast)])
    }

    /// Enter sleep mode (display off, then charge pump off) or leave it (charge pump on, then
    /// display on). Display RAM and the cursor survive sleep.
    pub fn sleep(&mut self, enabled: bool) -> Result<(), Error<DI::Error>> {
        if enabled {
            self.send_commands(&[Command::DisplayOn(false), Command::SetChargePump(false)])
        } else {
            self.send_commands(&[Command::SetChargePump(true), Command::DisplayOn(true)])
        }
    }

    fn ensure_initialized(&self) -> Result<(), Error<DI::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Send `cmds` as a single command transaction.
    fn send_commands(&mut self, cmds: &[Command]) -> Result<(), Error<DI::Error>> {
        self.ensure_initialized()?;
        self.tx.begin(Tag::Command);
        for cmd in cmds {
            self.tx.push_command(*cmd)?;
        }
        self.flush()
    }

    /// Send the data transaction in the scratch buffer, noting that the RAM pointer moved.
    fn flush_data(&mut self) -> Result<(), Error<DI::Error>> {
        self.pointer_synced = false;
        self.flush()
    }

    fn flush(&mut self) -> Result<(), Error<DI::Error>> {
        self.iface
            .write_block(self.address, self.tx.as_bytes())
            .map_err(Error::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::init_display;
    use super::*;
    use crate::font::FontLayout;
    use crate::interface::test_spy::{Sent, SpyError, TestSpyInterface};


    #[test]
    fn init_defaults() {
        let di = TestSpyInterface::new();
        let mut disp = Display::new(di.split(), 0x3C, Font::<&[u8]>::default());
        disp.init(Config::default()).unwrap();
        assert!(disp.is_initialized());
        assert_eq!(disp.scale(), Scale::X1);

        let sent = di.sent();
        #[cfg_attr(rustfmt, rustfmt_skip)]
        assert_eq!(sent[0], send!(cmd [
            0xAE, 0xD5, 0x80, 0xA8, 0x3F, 0xD3, 0x00, 0x40, 0x8D, 0x14, 0x20, 0x02, 0xA1, 0xC8,
            0xDA, 0x12, 0x81, 0xCF, 0xD9, 0xF1, 0xDB, 0x40, 0x2E, 0xA4, 0xA6, 0xAF
        ]));
        // Then the blank fill: per page one position command and four 32 byte data writes.
        assert_eq!(sent.len(), 1 + 8 * 5);
        assert_eq!(sent[1], send!(cmd [0xB0, 0x10, 0x00]));
        assert_eq!(sent[2], Sent::Data(vec![0; 32]));
        assert_eq!(sent[36], send!(cmd [0xB7, 0x10, 0x00]));

        assert!(di.addresses().iter().all(|&a| a == 0x3C));
        let ctl = di.controller();
        assert!(ctl.display_on);
        assert!(ctl.charge_pump);
        assert_eq!(disp.cursor(), Cursor { column: 0, page: 7 });
    }

    #[test]
    fn init_default_scale() {
        let di = TestSpyInterface::new();
        let mut disp = Display::new(di.split(), 0x3D, Font::<&[u8]>::default());
        disp.init(Config::new().default_scale(Scale::X4)).unwrap();
        assert_eq!(disp.scale(), Scale::X4);
        assert!(di.addresses().iter().all(|&a| a == 0x3D));
    }

    #[test]
    fn init_waits_for_bus() {
        let di = TestSpyInterface::new();
        di.set_busy_polls(5);
        let mut disp = Display::new(di.split(), 0x3C, Font::<&[u8]>::default());
        disp.init(Config::new().open_retries(5)).unwrap();
        assert_eq!(di.opens(), 6);
    }

    #[test]
    fn init_gives_up_on_busy_bus() {
        let di = TestSpyInterface::new();
        di.set_busy_polls(10);
        let mut disp = Display::new(di.split(), 0x3C, Font::<&[u8]>::default());
        assert_eq!(
            disp.init(Config::new().open_retries(3)),
            Err(Error::BusUnavailable)
        );
        assert_eq!(di.opens(), 4);
        assert!(di.sent().is_empty());
        assert!(!disp.is_initialized());
    }

    #[test]
    fn init_rejects_bad_config() {
        let di = TestSpyInterface::new();
        let mut disp = Display::new(di.split(), 0x3C, Font::<&[u8]>::default());
        assert_eq!(
            disp.init(Config::new().max_transfer(0)),
            Err(Error::InvalidConfiguration)
        );
        assert_eq!(
            disp.init(Config::new().pre_charge_period(0, 0)),
            Err(Error::InvalidConfiguration)
        );
        assert_eq!(di.opens(), 0);

        let table = [0u8; 4];
        let wide_font = Font::new(&table[..], 33, FontLayout::Single);
        let mut wide = Display::new(di.split(), 0x3C, wide_font);
        assert_eq!(wide.init(Config::default()), Err(Error::InvalidConfiguration));
        assert!(di.sent().is_empty());
    }

    #[test]
    fn write_failure_propagates() {
        let di = TestSpyInterface::new();
        let mut disp = init_display(&di);
        di.set_fail_writes(true);
        let err = disp.set_position(0, 0).unwrap_err();
        assert_eq!(err, Error::Io(SpyError));
        assert_eq!(err.kind(), crate::error::ErrorKind::IoFailure);
    }

    #[test]
    fn uninitialized_session() {
        let di = TestSpyInterface::new();
        let mut disp = Display::new(di.split(), 0x3C, Font::<&[u8]>::default());
        assert_eq!(disp.sleep(true), Err(Error::NotInitialized));
        assert_eq!(disp.set_position(1, 1), Err(Error::NotInitialized));
        assert_eq!(disp.render_character('A'), Err(Error::NotInitialized));
        assert!(di.sent().is_empty());
    }

    #[test]
    fn set_position() {
        let di = TestSpyInterface::new();
        let mut disp = init_display(&di);
        disp.set_position(0x5A, 3).unwrap();
        di.check_multi(sends!(cmd [0xB3, 0x15, 0x0A]));
        assert_eq!(disp.cursor(), Cursor { column: 0x5A, page: 3 });
        let ctl = di.controller();
        assert_eq!((ctl.column, ctl.page), (0x5A, 3));
    }

    #[test]
    fn set_position_masks_page() {
        let di = TestSpyInterface::new();
        let mut disp = init_display(&di);
        disp.set_position(200, 13).unwrap();
        di.check_multi(sends!(cmd [0xB5, 0x1C, 0x08]));
        assert_eq!(disp.cursor(), Cursor { column: 200, page: 5 });
    }

    #[test]
    fn scale_codes() {
        assert_eq!(Scale::try_from(0), Ok(Scale::X1));
        assert_eq!(Scale::try_from(1), Ok(Scale::X2));
        assert_eq!(Scale::try_from(2), Ok(Scale::X4));
        assert_eq!(Scale::try_from(3), Err(InvalidValue));
        let err: Error<()> = Scale::try_from(7).unwrap_err().into();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn fill_screen_every_byte() {
        for &max_transfer in [1usize, 7, 32, 100, 128].iter() {
            let di = TestSpyInterface::new();
            let mut disp = Display::new(di.split(), 0x3C, Font::<&[u8]>::default());
            disp.init(Config::new().max_transfer(max_transfer)).unwrap();
            disp.fill_screen(0xA5).unwrap();
            for page in di.controller().ram.iter() {
                assert!(page.iter().all(|&b| b == 0xA5), "max transfer {}", max_transfer);
            }
            for sent in di.sent() {
                if let Sent::Data(d) = sent {
                    assert!(d.len() <= max_transfer);
                }
            }
        }
    }

    #[test]
    fn fill_screen_page_wide_transfers() {
        let di = TestSpyInterface::new();
        let mut disp = Display::new(di.split(), 0x3C, Font::<&[u8]>::default());
        disp.init(Config::new().max_transfer(128)).unwrap();
        di.clear();
        disp.fill_screen(0xFF).unwrap();
        let sent = di.sent();
        assert_eq!(sent.len(), 16);
        for (page, pair) in sent.chunks(2).enumerate() {
            assert_eq!(pair[0], send!(cmd [0xB0 | page as u8, 0x10, 0x00]));
            assert_eq!(pair[1], Sent::Data(vec![0xFF; 128]));
        }
    }

    #[test]
    fn flip_screen() {
        let di = TestSpyInterface::new();
        let mut disp = init_display(&di);
        disp.set_position(9, 2).unwrap();
        disp.flip_screen(true).unwrap();
        disp.flip_screen(true).unwrap();
        disp.flip_screen(false).unwrap();
        di.check_multi(sends!(
            cmd [0xB2, 0x10, 0x09],
            cmd [0xA0, 0xC0],
            cmd [0xA0, 0xC0],
            cmd [0xA1, 0xC8]
        ));
        assert_eq!(disp.cursor(), Cursor { column: 9, page: 2 });
    }

    #[test]
    fn invert_round_trip() {
        let di = TestSpyInterface::new();
        let mut disp = init_display(&di);
        let before = di.controller();
        disp.invert(true).unwrap();
        assert!(di.controller().inverted);
        disp.invert(false).unwrap();
        assert_eq!(di.controller(), before);
        di.check_multi(sends!(cmd [0xA7], cmd [0xA6]));
    }

    #[test]
    fn contrast() {
        let di = TestSpyInterface::new();
        let mut disp = init_display(&di);
        disp.contrast(0x42).unwrap();
        di.check_multi(sends!(cmd [0x81, 0x42]));
        assert_eq!(di.controller().contrast, 0x42);
    }

    #[test]
    fn sleep_preserves_ram_and_cursor() {
        let di = TestSpyInterface::new();
        let mut disp = init_display(&di);
        disp.fill_screen(0x3C).unwrap();
        disp.set_position(17, 4).unwrap();
        let ram = di.controller().ram;
        di.clear();

        disp.sleep(true).unwrap();
        assert!(!di.controller().display_on);
        assert!(!di.controller().charge_pump);
        disp.sleep(false).unwrap();
        di.check_multi(sends!(cmd [0xAE, 0x8D, 0x10], cmd [0x8D, 0x14, 0xAF]));
        assert!(di.controller().display_on);
        assert_eq!(di.controller().ram[..], ram[..]);
        assert_eq!(disp.cursor(), Cursor { column: 17, page: 4 });
    }

    #[test]
    fn independent_sessions() {
        let di_a = TestSpyInterface::new();
        let di_b = TestSpyInterface::new();
        let mut a = init_display(&di_a);
        let mut b = init_display(&di_b);
        a.set_position(10, 1).unwrap();
        b.set_scale(Scale::X2);
        assert_eq!(b.cursor(), Cursor { column: 0, page: 7 });
        assert_eq!(a.scale(), Scale::X1);
        assert!(di_b.sent().is_empty());
    }

    mod positioning {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn three_masked_command_bytes(x in 0u8..=255, y in 0u8..=255) {
                let di = TestSpyInterface::new();
                let mut disp = init_display(&di);
                disp.set_position(x, y).unwrap();
                prop_assert_eq!(
                    di.sent(),
                    vec![send!(cmd [0xB0 | (y & 0x07), 0x10 | ((x >> 4) & 0x0F), x & 0x0F])]
                );
                prop_assert_eq!(disp.cursor(), Cursor { column: x, page: y & 0x07 });
            }
        }
    }
}
