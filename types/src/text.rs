//! Text cleanup for catalog strings.
//!
//! Catalog records carry storefront HTML and arbitrary bytes from a remote
//! service. Nothing from the network reaches the terminal without passing
//! through [`sanitize_display`].

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static MARKUP: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Remove `<...>` tags, leaving the text between them.
#[must_use]
pub fn strip_markup(input: &str) -> Cow<'_, str> {
    if !input.contains('<') {
        return Cow::Borrowed(input);
    }
    match MARKUP.as_ref() {
        Some(re) => re.replace_all(input, ""),
        None => Cow::Borrowed(input),
    }
}

/// Strip escape sequences and control characters (keeping `\n` and `\t`).
///
/// Returns `Cow::Borrowed` when the input is already clean.
#[must_use]
pub fn sanitize_display(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_unwanted) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESC {
            match chars.peek() {
                // CSI: parameters then a final byte in @..~
                Some('[') => {
                    chars.next();
                    for next in chars.by_ref() {
                        if ('@'..='~').contains(&next) {
                            break;
                        }
                    }
                }
                // OSC: terminated by BEL or ESC \
                Some(']') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == BEL {
                            break;
                        }
                        if next == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            }
        } else if !is_unwanted(c) {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

fn is_unwanted(c: char) -> bool {
    match c {
        '\n' | '\t' => false,
        '\r' | '\x7f' => true,
        c if (c as u32) < 0x20 => true,
        c => (0x80..=0x9f).contains(&(c as u32)),
    }
}
