//! User-facing confirmation messages

use serde::{Deserialize, Serialize};

/// Language of the confirmation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

/// Prefix `noun` with `count`, adding `suffix` unless the count is exactly 1
pub fn pluralize(count: usize, noun: &str, suffix: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}{}", count, noun, suffix)
    }
}

fn dimensions(rows: usize, cols: usize, locale: Locale) -> String {
    match locale {
        Locale::Fr => format!(
            "{} et {}",
            pluralize(rows, "ligne", "s"),
            pluralize(cols, "colonne", "s")
        ),
        Locale::En => format!(
            "{} and {}",
            pluralize(rows, "row", "s"),
            pluralize(cols, "column", "s")
        ),
    }
}

/// Confirmation shown after a new table is inserted
pub fn inserted_message(rows: usize, cols: usize, locale: Locale) -> String {
    match locale {
        Locale::Fr => format!(
            "Tableau de {} inséré dans le document !",
            dimensions(rows, cols, locale)
        ),
        Locale::En => format!("Table of {} inserted.", dimensions(rows, cols, locale)),
    }
}

/// Confirmation shown after an existing table is regenerated
pub fn updated_message(rows: usize, cols: usize, locale: Locale) -> String {
    match locale {
        Locale::Fr => format!("Tableau de {} mis à jour !", dimensions(rows, cols, locale)),
        Locale::En => format!("Table of {} updated.", dimensions(rows, cols, locale)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "ligne", "s"), "1 ligne");
        assert_eq!(pluralize(0, "ligne", "s"), "0 lignes");
        assert_eq!(pluralize(3, "colonne", "s"), "3 colonnes");
    }

    #[test]
    fn test_inserted_message_fr() {
        assert_eq!(
            inserted_message(2, 1, Locale::Fr),
            "Tableau de 2 lignes et 1 colonne inséré dans le document !"
        );
    }

    #[test]
    fn test_inserted_message_en() {
        assert_eq!(
            inserted_message(1, 3, Locale::En),
            "Table of 1 row and 3 columns inserted."
        );
    }

    #[test]
    fn test_updated_message() {
        assert_eq!(
            updated_message(4, 4, Locale::Fr),
            "Tableau de 4 lignes et 4 colonnes mis à jour !"
        );
    }
}
