//! Reader for assembled IL listings.
//!
//! A listing is what the IL assembler prints: each line may start with the
//! address of its first byte, followed by the bytes as pairs of hex digits,
//! followed by the source line as a comment.
//!
//! ```text
//! 0000 243A91;
//! 0003 27;     7       SB
//! ```
//!
//! Only the bytes matter. Addresses are not checked; bytes are loaded in the
//! order they appear.

/// The original Tiny BASIC IL by Tom Pittman, as an assembled listing.
pub const DEFAULT_LISTING: &str = include_str!("default.il");

/// Collect the code bytes of a listing.
pub fn from_listing(text: &str) -> Vec<u8> {
    let mut code = Vec::new();
    for line in text.lines() {
        let mut rest = line.trim_start();
        if let Some(index) = rest.find(char::is_whitespace) {
            if !rest[..index].contains(';') {
                rest = rest[index..].trim_start();
            }
        }
        code.extend(hex_pairs(rest));
    }
    code
}

fn hex_pairs(s: &str) -> impl Iterator<Item = u8> + '_ {
    s.as_bytes()
        .chunks(2)
        .map_while(|pair| match pair {
            [hi, lo] => Some((hex_digit(*hi)? << 4) | hex_digit(*lo)?),
            _ => None,
        })
}

fn hex_digit(ch: u8) -> Option<u8> {
    (ch as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_listing_size() {
        let code = from_listing(DEFAULT_LISTING);
        assert_eq!(code.len(), 0x157);
        assert_eq!(&code[..3], &[0x24, 0x3A, 0x91]);
        assert_eq!(code[code.len() - 1], 0x2F);
    }

    #[test]
    fn test_comment_lines_contribute_nothing() {
        assert!(from_listing("0000 ;       1 .  COMMENT\n0003 ;  GL\n").is_empty());
        assert!(from_listing("").is_empty());
    }

    #[test]
    fn test_address_is_optional() {
        assert_eq!(from_listing("0009 56;  BR STRT"), vec![0x56]);
        assert_eq!(from_listing("2a1d;"), vec![0x2A, 0x1D]);
    }

    #[test]
    fn test_bytes_stop_at_first_non_hex() {
        assert_eq!(from_listing("0000 0A80 80; LN"), vec![0x0A, 0x80]);
        assert_eq!(from_listing("0000 0A8"), vec![0x0A]);
    }
}
