use crate::table::Cell;

/// Tab, line feed, carriage return and printable ASCII survive; everything
/// else is dropped.
fn is_kept(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | ' '..='~')
}

/// Strip a patch down to printable ASCII plus tab/LF/CR. Missing patches
/// become the empty string.
pub fn sanitize_patch(text: Option<&str>) -> String {
    match text {
        Some(t) => t.chars().filter(|&c| is_kept(c)).collect(),
        None => String::new(),
    }
}

/// Cell form of [`sanitize_patch`]: null and NaN map to `""`, other values are
/// rendered as text first. Always returns a text cell.
pub fn sanitize_cell(cell: &Cell) -> Cell {
    Cell::Text(sanitize_patch(cell.as_text().as_deref()))
}
