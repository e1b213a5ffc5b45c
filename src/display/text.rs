//! Glyph rendering. Characters are drawn straight into display RAM one page tall strip at a
//! time; magnified glyphs span several strips stacked downwards from the cursor.

use itertools::iproduct;

use super::{Display, Scale};
use crate::command::Tag;
use crate::error::Error;
use crate::font::{ByteStore, DIBIT_QUAD, NIBBLE_DOUBLE};
use crate::interface;

impl<DI, S> Display<DI, S>
where
    DI: interface::DisplayInterface,
    S: ByteStore,
{
    /// Write one 8 pixel tall strip of the glyph for `ch` at the RAM pointer, as a single data
    /// transaction. `row_shift` selects which source rows are magnified into the strip and
    /// `table_offset` which half of a split font they come from.
    pub fn render_glyph_strip(
        &mut self,
        ch: char,
        row_shift: u8,
        table_offset: usize,
    ) -> Result<(), Error<DI::Error>> {
        self.ensure_initialized()?;
        self.tx.begin(Tag::Data);
        for column in 0..self.font.width() {
            let bits = self
                .font
                .column(ch, column, table_offset)
                .checked_shr(row_shift as u32)
                .unwrap_or(0);
            match self.scale {
                Scale::X1 => self.tx.push(bits)?,
                Scale::X2 => self
                    .tx
                    .push_repeated(NIBBLE_DOUBLE[(bits & 0x0F) as usize], 2)?,
                Scale::X4 => self
                    .tx
                    .push_repeated(DIBIT_QUAD[(bits & 0x03) as usize], 4)?,
            }
        }
        self.flush_data()
    }

    /// Draw `ch` at the cursor with the active scale, then move the cursor to the next
    /// character cell on the same text line.
    pub fn render_character(&mut self, ch: char) -> Result<(), Error<DI::Error>> {
        self.ensure_initialized()?;
        let start = self.cursor;
        if !self.pointer_synced {
            self.set_position(start.column, start.page)?;
        }

        let scale = self.scale;
        let strips = iproduct!(self.font.halves(), scale.row_shifts().iter()).enumerate();
        for (row, (table_offset, &row_shift)) in strips {
            if row > 0 {
                self.set_position(start.column, start.page.wrapping_add(row as u8))?;
            }
            self.render_glyph_strip(ch, row_shift, table_offset)?;
        }

        let advance = self.font.width().wrapping_mul(scale.factor());
        self.set_position(start.column.wrapping_add(advance), start.page)
    }

    /// Move the cursor to column `x`, page `y` and draw `ch` there.
    pub fn render_character_at(
        &mut self,
        x: u8,
        y: u8,
        ch: char,
    ) -> Result<(), Error<DI::Error>> {
        self.set_position(x, y)?;
        self.render_character(ch)
    }

    /// Draw the characters of `text` left to right, up to the first NUL if there is one. Text
    /// running past the right edge is not wrapped.
    pub fn render_string(&mut self, text: &str) -> Result<(), Error<DI::Error>> {
        for ch in text.chars().take_while(|&c| c != '\0') {
            self.render_character(ch)?;
        }
        Ok(())
    }

    pub fn render_string_at(&mut self, x: u8, y: u8, text: &str) -> Result<(), Error<DI::Error>> {
        self.set_position(x, y)?;
        self.render_string(text)
    }
}
