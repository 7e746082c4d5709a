/// Replaces all but the last `tail_chars` characters with `*`.
///
/// Short secrets are masked completely so the visible tail never gives away
/// most of the value.
pub fn mask_secret(secret: &str, tail_chars: usize) -> String {
    let len = secret.chars().count();
    if len > tail_chars * 2 {
        let visible_start = len - tail_chars;
        let visible_tail: String = secret.chars().skip(visible_start).collect();
        format!("{}{}", "*".repeat(visible_start), visible_tail)
    } else {
        "*".repeat(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_only_the_tail() {
        assert_eq!(mask_secret("sk-1234567890", 4), "*********7890");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        assert_eq!(mask_secret("abcd", 4), "****");
        assert_eq!(mask_secret("abcdefgh", 4), "********");
        assert_eq!(mask_secret("", 4), "");
    }
}
