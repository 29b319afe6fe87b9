use crate::common::ColorValue;

// Hardware color channels are 3 bits wide (0-7).
pub fn scale_color(c: u8) -> ColorValue {
    ((c.min(7) as u16) * 255 / 7) as ColorValue
}
