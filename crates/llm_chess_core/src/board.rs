//! Plain-text board rendering.

use crate::position::Position;

/// Renders the piece placement as an 8x8 grid, white at the bottom.
///
/// Uppercase letters are white pieces, lowercase black, `.` empty.
pub fn render_board(position: &Position) -> String {
    let mut result = String::new();

    for (i, rank) in position.placement().split('/').take(8).enumerate() {
        result.push_str(&format!("{} ", 8 - i));
        for c in rank.chars() {
            match c.to_digit(10) {
                Some(n) => (0..n).for_each(|_| result.push_str(" .")),
                None => {
                    result.push(' ');
                    result.push(c);
                }
            }
        }
        result.push('\n');
    }
    result.push_str("   a b c d e f g h");
    result
}
