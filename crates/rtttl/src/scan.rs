//! Tolerant character-scanning primitives.
//!
//! The cursor is a `&mut &str` (winnow's stream convention): the slice is the
//! unconsumed remainder of an immutable buffer, so advancing never copies.
//! None of these functions can fail. Each single-character advance also skips
//! any whitespace that follows, so whitespace is allowed between any two
//! tokens, even inside a digit run.

use winnow::prelude::*;
use winnow::stream::Stream;
use winnow::token::{take_till, take_while};

type PResult<T> = winnow::ModalResult<T>;

/// C `isspace` for ASCII: space, tab, LF, VT, FF, CR.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

/// Look at the current character without consuming it.
pub fn peek(input: &str) -> Option<char> {
    input.chars().next()
}

/// Skip whitespace at the cursor.
pub fn skip_space(input: &mut &str) {
    // take_while(0..) on complete input cannot fail
    let skipped: PResult<&str> = take_while(0.., is_space).parse_next(input);
    debug_assert!(skipped.is_ok());
}

/// Consume one character (if any), then any whitespace after it.
pub fn bump(input: &mut &str) {
    let _ = input.next_token();
    skip_space(input);
}

/// Skip up to and including the next `target`, or to end of input.
pub fn skip_past(input: &mut &str, target: char) {
    let skipped: PResult<&str> = take_till(0.., target).parse_next(input);
    debug_assert!(skipped.is_ok());
    bump(input);
}

/// Skip up to and including the next `after`, but never past any of `stops`.
///
/// Returns `true` if `after` was found and consumed. On `false` the cursor
/// rests on the stop character (or at end of input).
pub fn skip_past_until(input: &mut &str, after: char, stops: &[char]) -> bool {
    let skipped: PResult<&str> =
        take_till(0.., |c: char| c == after || stops.contains(&c)).parse_next(input);
    debug_assert!(skipped.is_ok());

    if peek(input) == Some(after) {
        bump(input);
        true
    } else {
        false
    }
}

/// Read a leading unsigned decimal integer.
///
/// Returns `None` when no digit is present, which lets callers tell an
/// absent field from an explicit `0`. Saturates instead of overflowing.
pub fn read_uint(input: &mut &str) -> Option<u32> {
    let mut value: Option<u32> = None;
    while let Some(digit) = peek(input).and_then(|c| c.to_digit(10)) {
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit));
        bump(input);
    }
    value
}

/// Consume a run of `c` characters and return how many there were.
pub fn count_run(input: &mut &str, c: char) -> u32 {
    let mut count = 0;
    while peek(input) == Some(c) {
        count += 1;
        bump(input);
    }
    count
}
