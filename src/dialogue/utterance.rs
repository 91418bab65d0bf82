//! Normalized user input and the keyword intents matched against it

const RESTART_PHRASES: &[&str] = &["reiniciar", "começar de novo"];
const YES_WORDS: &[&str] = &["sim"];
const NO_WORDS: &[&str] = &["não", "nao"];
const GREETING_WORDS: &[&str] = &["olá", "ola", "oi"];

/// User text, trimmed and lower-cased once per turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
}

impl Utterance {
    pub fn new(raw: &str) -> Self {
        Self {
            text: raw.trim().to_lowercase(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.contains(n))
    }

    pub fn is_restart(&self) -> bool {
        self.contains_any(RESTART_PHRASES)
    }

    pub fn is_yes(&self) -> bool {
        self.contains_any(YES_WORDS)
    }

    pub fn is_no(&self) -> bool {
        self.contains_any(NO_WORDS)
    }

    pub fn is_greeting(&self) -> bool {
        self.contains_any(GREETING_WORDS)
    }

    /// Pick an entry from an offered menu.
    ///
    /// All-digit input is a 1-based index and nothing else; an out-of-range
    /// number is no match. Any other non-empty input selects the first item
    /// containing it.
    pub fn select<'a>(&self, items: &'a [String]) -> Option<&'a String> {
        if self.text.is_empty() {
            return None;
        }

        if self.text.chars().all(|c| c.is_ascii_digit()) {
            return self
                .text
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| items.get(i));
        }

        items
            .iter()
            .find(|item| item.to_lowercase().contains(&self.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Vec<String> {
        vec![
            "elétricos".to_string(),
            "ferramentas".to_string(),
            "hidráulicos".to_string(),
        ]
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let utterance = Utterance::new("  Quero REINICIAR \n");
        assert_eq!(utterance.text, "quero reiniciar");
        assert!(utterance.is_restart());
    }

    #[test]
    fn test_restart_phrases() {
        assert!(Utterance::new("vamos começar de novo").is_restart());
        assert!(!Utterance::new("começar").is_restart());
    }

    #[test]
    fn test_yes_and_no() {
        assert!(Utterance::new("Sim!").is_yes());
        assert!(Utterance::new("NÃO, obrigado").is_no());
        assert!(Utterance::new("nao").is_no());
        assert!(!Utterance::new("talvez").is_yes());
        assert!(!Utterance::new("talvez").is_no());
    }

    #[test]
    fn test_select_by_index() {
        let items = menu();
        assert_eq!(Utterance::new("1").select(&items), Some(&items[0]));
        assert_eq!(Utterance::new(" 3 ").select(&items), Some(&items[2]));
    }

    #[test]
    fn test_select_index_out_of_range() {
        let items = menu();
        assert_eq!(Utterance::new("0").select(&items), None);
        assert_eq!(Utterance::new("4").select(&items), None);
        assert_eq!(
            Utterance::new("99999999999999999999999999").select(&items),
            None
        );
    }

    #[test]
    fn test_select_by_substring_takes_first_match() {
        let items = menu();
        assert_eq!(Utterance::new("Ferra").select(&items), Some(&items[1]));
        assert_eq!(Utterance::new("icos").select(&items), Some(&items[0]));
        assert_eq!(Utterance::new("madeira").select(&items), None);
    }

    #[test]
    fn test_index_and_name_agree() {
        let items = menu();
        assert_eq!(
            Utterance::new("1").select(&items),
            Utterance::new("Elétricos").select(&items)
        );
    }

    #[test]
    fn test_empty_input_never_selects() {
        assert_eq!(Utterance::new("   ").select(&menu()), None);
    }
}
