//! User codes travel on the wire as packed hex nibbles, right-padded with
//! `F` (a digit no PIN ever uses) rather than a length byte.

fn pad_with_f(code: &str, max_len_chars: usize) -> Vec<char> {
    let mut chars: Vec<char> = code.chars().take(max_len_chars).collect();
    while chars.len() < max_len_chars {
        chars.push('F');
    }
    chars
}

fn nibbles_to_bytes(chars: &[char]) -> Vec<u8> {
    chars
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].to_digit(16).unwrap_or(0xF) as u8;
            let lo = pair.get(1).and_then(|c| c.to_digit(16)).unwrap_or(0xF) as u8;
            (hi << 4) | lo
        })
        .collect()
}

/// Packs `code` (a digit string) into `max_len_chars / 2` bytes, right-padded
/// with `F` nibbles.
pub fn code_to_bytes(code: &str, max_len_chars: usize) -> Vec<u8> {
    nibbles_to_bytes(&pad_with_f(code, max_len_chars))
}

/// Packs a user code together with an optional installer prefix code into
/// the 8-byte field `EXEC_*`/`USER_*` commands expect: prefix then user,
/// each truncated to 8 characters, right-padded with `F`.
pub fn user_code_to_bytes(user_code: &str, prefix_code: &str) -> Vec<u8> {
    let prefix: String = prefix_code.chars().take(8).collect();
    let user: String = user_code.chars().take(8).collect();
    code_to_bytes(&format!("{prefix}{user}"), 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_codes_with_f_nibbles() {
        assert_eq!(code_to_bytes("1234", 8), vec![0x12, 0x34, 0xFF, 0xFF]);
    }

    #[test]
    fn combines_prefix_and_user_code() {
        let bytes = user_code_to_bytes("4321", "");
        assert_eq!(bytes, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x43, 0x21, 0xFF, 0xFF]);
    }
}
