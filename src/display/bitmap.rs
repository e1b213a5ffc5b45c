//! Blitting of page-aligned bitmaps into display RAM.

use core::cmp;

use super::Display;
use crate::command::consts::PAGE_HEIGHT;
use crate::command::Tag;
use crate::error::Error;
use crate::font::ByteStore;
use crate::interface;

impl<DI, S> Display<DI, S>
where
    DI: interface::DisplayInterface,
    S: ByteStore,
{
    /// Draw a bitmap into the rectangle from pixel `(x0, y0)` to `(x1, y1)`, exclusive. Vertical
    /// coordinates are page granular: the bitmap covers pages `y0 / 8` up to `y1 / 8` rounded
    /// up, so a partial page at the bottom is drawn whole.
    ///
    /// `source` supplies one byte per column, 8 vertical pixels with the least significant bit
    /// on top, page by page and left to right within a page. It is read strictly in order, never
    /// past the last byte the rectangle needs, and may run short, which ends the blit early. Use
    /// `ByteStore::bytes_from` to read a bitmap from a byte store.
    pub fn render_bitmap<I>(
        &mut self,
        x0: u8,
        y0: u8,
        x1: u8,
        y1: u8,
        source: I,
    ) -> Result<(), Error<DI::Error>>
    where
        I: IntoIterator<Item = u8>,
    {
        self.ensure_initialized()?;
        let columns = x1.saturating_sub(x0) as usize;
        if columns == 0 {
            return Ok(());
        }

        let mut source = source.into_iter().peekable();
        let first_page = y0 / PAGE_HEIGHT;
        let end_page = ((y1 as u16 + PAGE_HEIGHT as u16 - 1) / PAGE_HEIGHT as u16) as u8;
        for page in first_page..end_page {
            if source.peek().is_none() {
                break;
            }
            self.set_position(x0, page)?;

            // Alternately fill the scratch buffer from the source and write it out, so the
            // blit needs no more memory than one transaction.
            let mut remaining = columns;
            while remaining > 0 {
                let chunk_len = cmp::min(remaining, self.max_transfer);
                self.tx.begin(Tag::Data);
                for byte in source.by_ref().take(chunk_len) {
                    self.tx.push(byte)?;
                }

                let filled = self.tx.payload_len();
                if filled > 0 {
                    self.flush_data()?;
                }
                if filled < chunk_len {
                    return Ok(());
                }
                remaining -= chunk_len;
            }
        }
        Ok(())
    }
}
