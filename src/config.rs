//! Configuration applied when the display is initialized: the register values of the init
//! sequence, plus the driver-side limits that persist inside the `Display` afterwards.

use crate::command::consts::*;
use crate::command::*;
use crate::display::Scale;

/// Number of init commands, see `Config::init_sequence`.
pub(crate) const INIT_SEQUENCE_LEN: usize = 17;

/// A configuration for the display. `Config::default()` reproduces the usual init sequence for
/// 128x64 modules with an internal charge pump; the builder methods override single values.
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) default_scale: Scale,
    pub(crate) open_retries: u32,
    pub(crate) max_transfer: usize,
    clock_divide: (u8, u8),
    contrast: u8,
    pre_charge_period: (u8, u8),
    vcomh_deselect_level: u8,
    com_pin_layout: ComPinLayout,
    flipped: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_scale: Scale::X1,
            open_retries: 1000,
            max_transfer: 32,
            clock_divide: (1, 8),
            contrast: 0xCF,
            pre_charge_period: (1, 15),
            vcomh_deselect_level: 0x40,
            com_pin_layout: ComPinLayout::Alternative,
            flipped: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend this `Config` with the magnification text is rendered at after init.
    pub fn default_scale(self, scale: Scale) -> Self {
        Self {
            default_scale: scale,
            ..self
        }
    }

    /// Extend this `Config` with the number of extra attempts made to acquire the bus when the
    /// first one reports it busy. `0` gives up after a single attempt.
    pub fn open_retries(self, retries: u32) -> Self {
        Self {
            open_retries: retries,
            ..self
        }
    }

    /// Extend this `Config` with the largest number of display RAM bytes sent in one
    /// transaction by screen fills and bitmap blits. Range 1-128.
    pub fn max_transfer(self, bytes: usize) -> Self {
        Self {
            max_transfer: bytes,
            ..self
        }
    }

    /// Extend this `Config` to explicitly configure the display clock divide ratio and
    /// oscillator frequency. See `Command::SetClockDivide`.
    pub fn clock_divide(self, divide: u8, freq: u8) -> Self {
        Self {
            clock_divide: (divide, freq),
            ..self
        }
    }

    /// Extend this `Config` to explicitly configure the contrast current. See
    /// `Command::SetContrast`.
    pub fn contrast(self, contrast: u8) -> Self {
        Self { contrast, ..self }
    }

    /// Extend this `Config` to explicitly configure the pre-charge periods. See
    /// `Command::SetPreChargePeriod`.
    pub fn pre_charge_period(self, phase_1: u8, phase_2: u8) -> Self {
        Self {
            pre_charge_period: (phase_1, phase_2),
            ..self
        }
    }

    /// Extend this `Config` to explicitly configure the VCOMH deselect level. See
    /// `Command::SetVcomhDeselectLevel`.
    pub fn vcomh_deselect_level(self, level: u8) -> Self {
        Self {
            vcomh_deselect_level: level,
            ..self
        }
    }

    /// Extend this `Config` with the COM pin wiring of the module. See `ComPinLayout`.
    pub fn com_pin_layout(self, layout: ComPinLayout) -> Self {
        Self {
            com_pin_layout: layout,
            ..self
        }
    }

    /// Extend this `Config` to start with the image rotated 180 degrees. See
    /// `Display::flip_screen`.
    pub fn flipped(self, flipped: bool) -> Self {
        Self { flipped, ..self }
    }

    pub(crate) fn max_transfer_is_valid(&self) -> bool {
        self.max_transfer >= 1 && self.max_transfer <= MAX_PAYLOAD
    }

    /// The commands that put the controller into the configuration encoded in `self`, in the
    /// order they are sent: display off, timing and geometry, charge pump, page addressing,
    /// orientation, analog levels, then display on.
    pub(crate) fn init_sequence(&self) -> [Command; INIT_SEQUENCE_LEN] {
        let (segment_remap, com_scan) = orientation(self.flipped);
        [
            Command::DisplayOn(false),
            Command::SetClockDivide(self.clock_divide.0, self.clock_divide.1),
            Command::SetMuxRatio(NUM_PIXEL_ROWS),
            Command::SetDisplayOffset(0),
            Command::SetStartLine(0),
            Command::SetChargePump(true),
            Command::SetAddressingMode(AddressingMode::Page),
            segment_remap,
            com_scan,
            Command::SetComPinLayout(self.com_pin_layout),
            Command::SetContrast(self.contrast),
            Command::SetPreChargePeriod(self.pre_charge_period.0, self.pre_charge_period.1),
            Command::SetVcomhDeselectLevel(self.vcomh_deselect_level),
            Command::DeactivateScroll,
            Command::EntireDisplayOn(false),
            Command::SetInverted(false),
            Command::DisplayOn(true),
        ]
    }
}

/// Segment remap and COM scan direction commands for the upright (`false`) or the rotated
/// (`true`) orientation.
pub(crate) fn orientation(flipped: bool) -> (Command, Command) {
    if flipped {
        (
            Command::SetSegmentRemap(false),
            Command::SetComScanDirection(ComScanDirection::RowZeroFirst),
        )
    } else {
        (
            Command::SetSegmentRemap(true),
            Command::SetComScanDirection(ComScanDirection::RowZeroLast),
        )
    }
}
