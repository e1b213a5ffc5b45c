/// The bus transport the display driver talks through. Every call is blocking, and a transaction
/// is always written whole: the first byte of `block` is the command/data tag (see
/// `command::Tag`), the rest its payload.
pub trait DisplayInterface {
    type Error;

    /// Try to acquire the bus for the device at `address`. `nb::Error::WouldBlock` means the bus
    /// or device is not ready yet and the caller may poll again.
    fn open(&mut self, address: u8) -> nb::Result<(), Self::Error>;

    /// Write one transaction to the device at `address`.
    fn write_block(&mut self, address: u8, block: &[u8]) -> Result<(), Self::Error>;
}

pub mod i2c {
    //! The I2C interface. The SSD1306 distinguishes commands from display data by the control
    //! byte leading each write, so no extra GPIO is needed.

    use super::DisplayInterface;
    use crate::command::Tag;

    /// A transaction holding a single NOP command, written to see whether the device answers.
    /// Some I2C masters refuse zero-length writes, so the address alone cannot be used.
    const PRESENCE_CHECK: [u8; 2] = [Tag::Command as u8, 0xE3];

    pub struct I2cInterface<I2C> {
        /// The I2C master the SSD1306 is connected to.
        i2c: I2C,
    }

    impl<I2C> I2cInterface<I2C>
    where
        I2C: hal::blocking::i2c::Write,
    {
        /// Create a new I2C interface to communicate with the display driver.
        pub fn new(i2c: I2C) -> Self {
            Self { i2c }
        }

        /// Give back the I2C master.
        pub fn release(self) -> I2C {
            self.i2c
        }
    }

    impl<I2C> DisplayInterface for I2cInterface<I2C>
    where
        I2C: hal::blocking::i2c::Write,
    {
        type Error = I2C::Error;

        /// Probe the device with a NOP command. A missing acknowledge is reported as "not ready
        /// yet", since blocking I2C masters do not tell arbitration loss and NACK apart.
        fn open(&mut self, address: u8) -> nb::Result<(), I2C::Error> {
            self.i2c
                .write(address, &PRESENCE_CHECK)
                .map_err(|_| nb::Error::WouldBlock)
        }

        fn write_block(&mut self, address: u8, block: &[u8]) -> Result<(), I2C::Error> {
            self.i2c.write(address, block)
        }
    }
}

#[cfg(test)]
pub mod test_spy {
    //! An interface for use in unit tests to spy on whatever was sent to it. It also models the
    //! controller registers and display RAM the driver touches, so tests can check the picture
    //! as well as the bus traffic.

    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use super::DisplayInterface;
    use crate::command::consts::*;

    /// One transaction as seen on the bus, tag stripped.
    #[derive(Clone, Debug, PartialEq)]
    pub enum Sent {
        Command(Vec<u8>),
        Data(Vec<u8>),
    }

    /// The controller state the spy tracks.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Controller {
        pub ram: [[u8; NUM_COLUMNS as usize]; NUM_PAGES as usize],
        pub page: u8,
        pub column: u8,
        pub display_on: bool,
        pub charge_pump: bool,
        pub inverted: bool,
        pub segment_remap: bool,
        pub com_scan_reversed: bool,
        pub contrast: u8,
    }

    impl Controller {
        fn new() -> Self {
            Controller {
                ram: [[0; NUM_COLUMNS as usize]; NUM_PAGES as usize],
                page: 0,
                column: 0,
                display_on: false,
                charge_pump: false,
                inverted: false,
                segment_remap: false,
                com_scan_reversed: false,
                contrast: 0x7F,
            }
        }

        fn command(&mut self, bytes: &[u8]) {
            let mut iter = bytes.iter().cloned();
            while let Some(op) = iter.next() {
                match op {
                    0x00..=0x0F => self.column = (self.column & 0xF0) | op,
                    0x10..=0x1F => self.column = (self.column & 0x0F) | ((op & 0x0F) << 4),
                    0xB0..=0xB7 => self.page = op & 0x07,
                    0x8D => self.charge_pump = iter.next() == Some(0x14),
                    0x81 => self.contrast = iter.next().unwrap_or(0),
                    0xAE | 0xAF => self.display_on = op == 0xAF,
                    0xA6 | 0xA7 => self.inverted = op == 0xA7,
                    0xA0 | 0xA1 => self.segment_remap = op == 0xA1,
                    0xC0 | 0xC8 => self.com_scan_reversed = op == 0xC8,
                    // Opcodes with a single argument byte.
                    0x20 | 0xA8 | 0xD3 | 0xD5 | 0xD9 | 0xDA | 0xDB => {
                        iter.next();
                    }
                    _ => (),
                }
            }
        }

        fn data(&mut self, bytes: &[u8]) {
            for &b in bytes {
                // Page addressing mode: the column pointer wraps within the page.
                let column = (self.column & COLUMN_MAX) as usize;
                self.ram[self.page as usize][column] = b;
                self.column = ((column + 1) % NUM_COLUMNS as usize) as u8;
            }
        }
    }

    struct SpyState {
        sent: Vec<Sent>,
        addresses: Vec<u8>,
        controller: Controller,
        busy_polls: u32,
        opens: u32,
        fail_writes: bool,
    }

    pub struct TestSpyInterface {
        state: Rc<RefCell<SpyState>>,
    }

    impl TestSpyInterface {
        pub fn new() -> Self {
            TestSpyInterface {
                state: Rc::new(RefCell::new(SpyState {
                    sent: Vec::new(),
                    addresses: Vec::new(),
                    controller: Controller::new(),
                    busy_polls: 0,
                    opens: 0,
                    fail_writes: false,
                })),
            }
        }

        /// Another handle onto the same spy, to hand to the display while the test keeps this
        /// one for checking.
        pub fn split(&self) -> Self {
            TestSpyInterface {
                state: self.state.clone(),
            }
        }

        /// Report the bus as busy for the next `polls` calls to `open`.
        pub fn set_busy_polls(&self, polls: u32) {
            self.state.borrow_mut().busy_polls = polls;
        }

        pub fn set_fail_writes(&self, fail: bool) {
            self.state.borrow_mut().fail_writes = fail;
        }

        pub fn opens(&self) -> u32 {
            self.state.borrow().opens
        }

        pub fn sent(&self) -> Vec<Sent> {
            self.state.borrow().sent.clone()
        }

        /// Every address a block was written to.
        pub fn addresses(&self) -> Vec<u8> {
            self.state.borrow().addresses.clone()
        }

        pub fn controller(&self) -> Controller {
            self.state.borrow().controller.clone()
        }

        pub fn check_multi(&self, expected: &[Sent]) {
            assert_eq!(self.state.borrow().sent, expected);
        }

        /// Forget the recorded traffic. The modelled controller state is kept.
        pub fn clear(&self) {
            self.state.borrow_mut().sent.clear();
            self.state.borrow_mut().addresses.clear();
        }
    }

    #[derive(Debug, PartialEq)]
    pub struct SpyError;

    impl DisplayInterface for TestSpyInterface {
        type Error = SpyError;

        fn open(&mut self, _address: u8) -> nb::Result<(), SpyError> {
            let mut state = self.state.borrow_mut();
            state.opens += 1;
            if state.busy_polls > 0 {
                state.busy_polls -= 1;
                return Err(nb::Error::WouldBlock);
            }
            Ok(())
        }

        fn write_block(&mut self, address: u8, block: &[u8]) -> Result<(), SpyError> {
            let mut state = self.state.borrow_mut();
            if state.fail_writes {
                return Err(SpyError);
            }
            state.addresses.push(address);
            match block.split_first() {
                Some((&0x00, commands)) => {
                    state.controller.command(commands);
                    state.sent.push(Sent::Command(commands.to_vec()));
                }
                Some((&0x40, data)) => {
                    state.controller.data(data);
                    state.sent.push(Sent::Data(data.to_vec()));
                }
                _ => panic!("transaction without a valid tag: {:?}", block),
            }
            Ok(())
        }
    }
}
