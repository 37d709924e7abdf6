use crate::{CodecError, FingerprintBitmap};

/// Renders `bitmap` as a dense string of `width * height` `'0'`/`'1'` characters.
///
/// Index `i` of the output is `'1'` exactly when `i` is an ON position. The
/// bitmap is only read, so expanding the same value twice gives the same string.
pub fn expand_to_binary_string(
    bitmap: &FingerprintBitmap,
    width: u32,
    height: u32,
) -> Result<String, CodecError> {
    let cells = width as usize * height as usize;
    bitmap.validate(cells)?;

    let mut sdr = String::with_capacity(cells);
    let mut next_on = bitmap.positions().iter().peekable();
    for index in 0..cells {
        if next_on.next_if(|&&position| position as usize == index).is_some() {
            sdr.push('1');
        } else {
            sdr.push('0');
        }
    }
    Ok(sdr)
}
