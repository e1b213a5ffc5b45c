//! Full example code for setting up an SSD1306 display. This runs on an STM32F303RE, using a
//! common 0.96" 128x64 module with an internal charge pump connected to I2C1 on PB6 (SCL) and
//! PB7 (SDA).

#![deny(unsafe_code)]
#![no_main]
#![no_std]

extern crate cortex_m;
extern crate stm32f30x;
extern crate stm32f30x_hal as hal;
#[macro_use]
extern crate cortex_m_rt;
extern crate panic_abort;
extern crate ssd1306_pager;

use core::convert::TryFrom;
use cortex_m::asm;
use cortex_m_rt::ExceptionFrame;
use hal::i2c::I2c;
use hal::prelude::*;
use ssd1306_pager as oled;

entry!(main);

exception!(*, default_handler);
exception!(HardFault, hard_fault);

fn hard_fault(_ef: &ExceptionFrame) -> ! {
    asm::bkpt();
    loop {}
}

fn default_handler(_irqn: i16) {
    loop {}
}

// 16x16 checkerboard, two pages of 16 columns.
const CHECKER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

fn main() -> ! {
    let dp = stm32f30x::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze(&mut flash.acr);

    // I2C1 is Alternate Function 4 for GPIOs PB6,7.
    let mut gpiob = dp.GPIOB.split(&mut rcc.ahb);
    let scl = gpiob.pb6.into_af4(&mut gpiob.moder, &mut gpiob.afrl);
    let sda = gpiob.pb7.into_af4(&mut gpiob.moder, &mut gpiob.afrl);
    let i2c = I2c::i2c1(dp.I2C1, (scl, sda), 400.khz(), clocks, &mut rcc.apb1);

    // Create the I2cInterface and Display. Most modules answer at 0x3C.
    let mut disp = oled::Display::new(
        oled::I2cInterface::new(i2c),
        0x3C,
        oled::Font::default(),
    );

    // Initialize the display, which also blanks it.
    disp.init(oled::Config::new().contrast(0x8F)).unwrap();

    disp.render_string_at(0, 0, "SSD1306").unwrap();
    disp.set_scale(oled::Scale::try_from(1).unwrap());
    disp.render_string_at(0, 2, "page mode").unwrap();
    disp.render_bitmap(96, 48, 112, 64, CHECKER.iter().cloned())
        .unwrap();

    loop {
        asm::wfi();
    }
}
