/// Comparison key for free text: lower-cased, trimmed, with internal
/// whitespace runs collapsed to a single space. Never used for display.
#[must_use]
pub fn normalize_text(value: &str) -> String {
    value.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn collapses_case_and_whitespace() {
        assert_eq!(normalize_text("  Hello \t  World\n"), "hello world");
        assert_eq!(normalize_text("Flights  are CHEAPER"), "flights are cheaper");
    }

    #[test]
    fn blank_input_normalizes_to_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[test]
    fn handles_non_ascii_text() {
        assert_eq!(normalize_text("Café  SÃO Paulo"), "café são paulo");
    }

    proptest! {
        #[test]
        fn property_normalize_is_idempotent(value in ".{0,64}") {
            let once = normalize_text(&value);
            prop_assert_eq!(normalize_text(&once), once.clone());
            prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
            prop_assert!(!once.contains("  "));
        }
    }
}
