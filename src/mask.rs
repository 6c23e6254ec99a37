/// Fallback when the input is too short to reveal anything.
const MASK_SENTINEL: &str = "****";

/// Display-safe card representation: a fixed-width mask followed by the last
/// four characters of the input, unchanged. Inputs shorter than four
/// characters collapse to the sentinel mask.
pub fn mask_credit_card(card_number: &str) -> String {
    match card_number.char_indices().nth_back(3) {
        Some((idx, _)) => format!("****-****-****-{}", &card_number[idx..]),
        None => MASK_SENTINEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_last_four_digits() {
        assert_eq!(mask_credit_card("4111111111111111"), "****-****-****-1111");
    }

    #[test]
    fn short_input_collapses_to_sentinel() {
        assert_eq!(mask_credit_card("12"), "****");
        assert_eq!(mask_credit_card(""), "****");
    }

    #[test]
    fn four_digit_input_is_fully_revealed_after_the_mask() {
        assert_eq!(mask_credit_card("1234"), "****-****-****-1234");
    }
}
