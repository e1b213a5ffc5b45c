//! Glyph data and the tables used to magnify it.
//!
//! A font is a flat table of column bytes addressed as `(codepoint - 32) * width + column`, each
//! byte being 8 vertical pixels with the least significant bit on top, exactly the layout of one
//! display RAM byte. Tall fonts keep the lower 8 pixel rows of every glyph in a second half of
//! the same table, `table_offset` bytes after the upper half.

use core::iter;

/// Each bit of a nibble doubled into two adjacent bits, used to render glyphs at 2x.
pub const NIBBLE_DOUBLE: [u8; 16] = [
    0x00, 0x03, 0x0C, 0x0F, 0x30, 0x33, 0x3C, 0x3F, 0xC0, 0xC3, 0xCC, 0xCF, 0xF0, 0xF3, 0xFC, 0xFF,
];

/// Each bit of a 2-bit pair quadrupled into four adjacent bits, used to render glyphs at 4x.
pub const DIBIT_QUAD: [u8; 4] = [0x00, 0x0F, 0xF0, 0xFF];

/// Addressable read-only byte storage holding font or bitmap data. Implemented for byte slices
/// and arrays; implement it for external memory such as an EEPROM to render from there.
pub trait ByteStore {
    /// Read the byte at `index`, or `None` past the end of the store.
    fn read_byte(&self, index: usize) -> Option<u8>;

    /// Iterate the store sequentially starting at `offset`, e.g. to feed
    /// [`Display::render_bitmap`](crate::Display::render_bitmap).
    fn bytes_from(&self, offset: usize) -> Bytes<'_, Self> {
        Bytes {
            store: self,
            offset,
        }
    }
}

impl ByteStore for [u8] {
    fn read_byte(&self, index: usize) -> Option<u8> {
        self.get(index).cloned()
    }
}

impl<const N: usize> ByteStore for [u8; N] {
    fn read_byte(&self, index: usize) -> Option<u8> {
        self.get(index).cloned()
    }
}

impl<'a, S> ByteStore for &'a S
where
    S: ByteStore + ?Sized,
{
    fn read_byte(&self, index: usize) -> Option<u8> {
        (**self).read_byte(index)
    }
}

/// Sequential reader over a `ByteStore`, ending at the end of the store.
pub struct Bytes<'s, S: ?Sized> {
    store: &'s S,
    offset: usize,
}

impl<'s, S> Iterator for Bytes<'s, S>
where
    S: ByteStore + ?Sized,
{
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let byte = self.store.read_byte(self.offset)?;
        self.offset += 1;
        Some(byte)
    }
}

/// How the glyphs of a font are laid out in its table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontLayout {
    /// One 8 pixel tall table.
    Single,
    /// 16 pixel tall glyphs: the upper halves start at index 0 and the lower halves at
    /// `table_offset`.
    Split { table_offset: usize },
}

/// Widest glyph that still fits one page-wide transaction at 4x.
pub const MAX_GLYPH_WIDTH: u8 = 32;

/// A fixed-width bitmap font covering the codepoints `' '` to `'\x7F'`.
#[derive(Clone, Copy, Debug)]
pub struct Font<S> {
    glyphs: S,
    width: u8,
    layout: FontLayout,
}

impl<S> Font<S> {
    pub const fn new(glyphs: S, width: u8, layout: FontLayout) -> Self {
        Self {
            glyphs,
            width,
            layout,
        }
    }

    /// Width of every glyph in pixel columns.
    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn layout(&self) -> FontLayout {
        self.layout
    }

    /// The table offsets of the 8 pixel tall strips each glyph is made of, top to bottom.
    pub(crate) fn halves(&self) -> impl Iterator<Item = usize> + Clone {
        let lower = match self.layout {
            FontLayout::Single => None,
            FontLayout::Split { table_offset } => Some(table_offset),
        };
        iter::once(0).chain(lower)
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.width >= 1 && self.width <= MAX_GLYPH_WIDTH
    }
}

impl<S: ByteStore> Font<S> {
    /// Fetch source column `column` of the glyph for `ch` from the table half at
    /// `table_offset`. Characters the font does not cover render as a space, and bytes missing
    /// from a short table read as blank.
    pub fn column(&self, ch: char, column: u8, table_offset: usize) -> u8 {
        let index = glyph_index(ch) * self.width as usize + column as usize + table_offset;
        self.glyphs.read_byte(index).unwrap_or(0)
    }
}

impl Default for Font<&'static [u8]> {
    /// The built-in 6x8 font.
    fn default() -> Self {
        Font::new(&FONT_6X8[..], 6, FontLayout::Single)
    }
}

fn glyph_index(ch: char) -> usize {
    match ch {
        ' '..='\x7F' => ch as usize - 32,
        _ => 0,
    }
}

/// 6x8 ASCII font: a blank spacing column followed by a 5x7 glyph.
#[cfg_attr(rustfmt, rustfmt_skip)]
pub static FONT_6X8: [u8; 576] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ' '
    0x00, 0x00, 0x00, 0x5F, 0x00, 0x00, // '!'
    0x00, 0x00, 0x07, 0x00, 0x07, 0x00, // '"'
    0x00, 0x14, 0x7F, 0x14, 0x7F, 0x14, // '#'
    0x00, 0x24, 0x2A, 0x7F, 0x2A, 0x12, // '$'
    0x00, 0x23, 0x13, 0x08, 0x64, 0x62, // '%'
    0x00, 0x36, 0x49, 0x55, 0x22, 0x50, // '&'
    0x00, 0x00, 0x05, 0x03, 0x00, 0x00, // '''
    0x00, 0x00, 0x1C, 0x22, 0x41, 0x00, // '('
    0x00, 0x00, 0x41, 0x22, 0x1C, 0x00, // ')'
    0x00, 0x08, 0x2A, 0x1C, 0x2A, 0x08, // '*'
    0x00, 0x08, 0x08, 0x3E, 0x08, 0x08, // '+'
    0x00, 0x00, 0x50, 0x30, 0x00, 0x00, // ','
    0x00, 0x08, 0x08, 0x08, 0x08, 0x08, // '-'
    0x00, 0x00, 0x60, 0x60, 0x00, 0x00, // '.'
    0x00, 0x20, 0x10, 0x08, 0x04, 0x02, // '/'
    0x00, 0x3E, 0x51, 0x49, 0x45, 0x3E, // '0'
    0x00, 0x00, 0x42, 0x7F, 0x40, 0x00, // '1'
    0x00, 0x42, 0x61, 0x51, 0x49, 0x46, // '2'
    0x00, 0x21, 0x41, 0x45, 0x4B, 0x31, // '3'
    0x00, 0x18, 0x14, 0x12, 0x7F, 0x10, // '4'
    0x00, 0x27, 0x45, 0x45, 0x45, 0x39, // '5'
    0x00, 0x3C, 0x4A, 0x49, 0x49, 0x30, // '6'
    0x00, 0x01, 0x71, 0x09, 0x05, 0x03, // '7'
    0x00, 0x36, 0x49, 0x49, 0x49, 0x36, // '8'
    0x00, 0x06, 0x49, 0x49, 0x29, 0x1E, // '9'
    0x00, 0x00, 0x36, 0x36, 0x00, 0x00, // ':'
    0x00, 0x00, 0x56, 0x36, 0x00, 0x00, // ';'
    0x00, 0x08, 0x14, 0x22, 0x41, 0x00, // '<'
    0x00, 0x14, 0x14, 0x14, 0x14, 0x14, // '='
    0x00, 0x00, 0x41, 0x22, 0x14, 0x08, // '>'
    0x00, 0x02, 0x01, 0x51, 0x09, 0x06, // '?'
    0x00, 0x32, 0x49, 0x79, 0x41, 0x3E, // '@'
    0x00, 0x7E, 0x11, 0x11, 0x11, 0x7E, // 'A'
    0x00, 0x7F, 0x49, 0x49, 0x49, 0x36, // 'B'
    0x00, 0x3E, 0x41, 0x41, 0x41, 0x22, // 'C'
    0x00, 0x7F, 0x41, 0x41, 0x22, 0x1C, // 'D'
    0x00, 0x7F, 0x49, 0x49, 0x49, 0x41, // 'E'
    0x00, 0x7F, 0x09, 0x09, 0x09, 0x01, // 'F'
    0x00, 0x3E, 0x41, 0x49, 0x49, 0x7A, // 'G'
    0x00, 0x7F, 0x08, 0x08, 0x08, 0x7F, // 'H'
    0x00, 0x00, 0x41, 0x7F, 0x41, 0x00, // 'I'
    0x00, 0x20, 0x40, 0x41, 0x3F, 0x01, // 'J'
    0x00, 0x7F, 0x08, 0x14, 0x22, 0x41, // 'K'
    0x00, 0x7F, 0x40, 0x40, 0x40, 0x40, // 'L'
    0x00, 0x7F, 0x02, 0x0C, 0x02, 0x7F, // 'M'
    0x00, 0x7F, 0x04, 0x08, 0x10, 0x7F, // 'N'
    0x00, 0x3E, 0x41, 0x41, 0x41, 0x3E, // 'O'
    0x00, 0x7F, 0x09, 0x09, 0x09, 0x06, // 'P'
    0x00, 0x3E, 0x41, 0x51, 0x21, 0x5E, // 'Q'
    0x00, 0x7F, 0x09, 0x19, 0x29, 0x46, // 'R'
    0x00, 0x46, 0x49, 0x49, 0x49, 0x31, // 'S'
    0x00, 0x01, 0x01, 0x7F, 0x01, 0x01, // 'T'
    0x00, 0x3F, 0x40, 0x40, 0x40, 0x3F, // 'U'
    0x00, 0x1F, 0x20, 0x40, 0x20, 0x1F, // 'V'
    0x00, 0x7F, 0x20, 0x18, 0x20, 0x7F, // 'W'
    0x00, 0x63, 0x14, 0x08, 0x14, 0x63, // 'X'
    0x00, 0x03, 0x04, 0x78, 0x04, 0x03, // 'Y'
    0x00, 0x61, 0x51, 0x49, 0x45, 0x43, // 'Z'
    0x00, 0x00, 0x7F, 0x41, 0x41, 0x00, // '['
    0x00, 0x02, 0x04, 0x08, 0x10, 0x20, // '\'
    0x00, 0x00, 0x41, 0x41, 0x7F, 0x00, // ']'
    0x00, 0x04, 0x02, 0x01, 0x02, 0x04, // '^'
    0x00, 0x40, 0x40, 0x40, 0x40, 0x40, // '_'
    0x00, 0x00, 0x01, 0x02, 0x04, 0x00, // '`'
    0x00, 0x20, 0x54, 0x54, 0x54, 0x78, // 'a'
    0x00, 0x7F, 0x48, 0x44, 0x44, 0x38, // 'b'
    0x00, 0x38, 0x44, 0x44, 0x44, 0x20, // 'c'
    0x00, 0x38, 0x44, 0x44, 0x48, 0x7F, // 'd'
    0x00, 0x38, 0x54, 0x54, 0x54, 0x18, // 'e'
    0x00, 0x08, 0x7E, 0x09, 0x01, 0x02, // 'f'
    0x00, 0x08, 0x14, 0x54, 0x54, 0x3C, // 'g'
    0x00, 0x7F, 0x08, 0x04, 0x04, 0x78, // 'h'
    0x00, 0x00, 0x44, 0x7D, 0x40, 0x00, // 'i'
    0x00, 0x20, 0x40, 0x44, 0x3D, 0x00, // 'j'
    0x00, 0x7F, 0x10, 0x28, 0x44, 0x00, // 'k'
    0x00, 0x00, 0x41, 0x7F, 0x40, 0x00, // 'l'
    0x00, 0x7C, 0x04, 0x18, 0x04, 0x78, // 'm'
    0x00, 0x7C, 0x08, 0x04, 0x04, 0x78, // 'n'
    0x00, 0x38, 0x44, 0x44, 0x44, 0x38, // 'o'
    0x00, 0x7C, 0x14, 0x14, 0x14, 0x08, // 'p'
    0x00, 0x08, 0x14, 0x14, 0x18, 0x7C, // 'q'
    0x00, 0x7C, 0x08, 0x04, 0x04, 0x08, // 'r'
    0x00, 0x48, 0x54, 0x54, 0x54, 0x20, // 's'
    0x00, 0x04, 0x3F, 0x44, 0x40, 0x20, // 't'
    0x00, 0x3C, 0x40, 0x40, 0x20, 0x7C, // 'u'
    0x00, 0x1C, 0x20, 0x40, 0x20, 0x1C, // 'v'
    0x00, 0x3C, 0x40, 0x30, 0x40, 0x3C, // 'w'
    0x00, 0x44, 0x28, 0x10, 0x28, 0x44, // 'x'
    0x00, 0x0C, 0x50, 0x50, 0x50, 0x3C, // 'y'
    0x00, 0x44, 0x64, 0x54, 0x4C, 0x44, // 'z'
    0x00, 0x00, 0x08, 0x36, 0x41, 0x00, // '{'
    0x00, 0x00, 0x00, 0x7F, 0x00, 0x00, // '|'
    0x00, 0x00, 0x41, 0x36, 0x08, 0x00, // '}'
    0x00, 0x02, 0x01, 0x02, 0x04, 0x02, // '~'
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // DEL
];
