//! Digit grouping for the byte counts shown next to a staged image.

use std::sync::OnceLock;

use icu_decimal::DecimalFormatter;
use icu_decimal::input::Decimal;
use icu_decimal::options::DecimalFormatterOptions;
use icu_locale_core::Locale;

const FALLBACK_LOCALE: &str = "en-US";

fn formatter_for(tag: &str) -> Option<DecimalFormatter> {
    let locale: Locale = tag.parse().ok()?;
    DecimalFormatter::try_new(locale.into(), DecimalFormatterOptions::default()).ok()
}

fn system_formatter() -> Option<&'static DecimalFormatter> {
    static FORMATTER: OnceLock<Option<DecimalFormatter>> = OnceLock::new();
    FORMATTER
        .get_or_init(|| {
            sys_locale::get_locale()
                .and_then(|tag| formatter_for(&tag))
                .or_else(|| formatter_for(FALLBACK_LOCALE))
        })
        .as_ref()
}

/// Format a count with the system locale's digit separators (e.g. `5242880` -> `5,242,880` for
/// en-US). Falls back to plain digits when no formatter can be built.
pub fn format_with_separators(n: u64) -> String {
    match system_formatter() {
        Some(formatter) => formatter.format(&Decimal::from(n)).to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn en_us_groups_thousands() {
        let formatter = formatter_for("en-US").expect("en-US formatter");
        assert_eq!(
            formatter.format(&Decimal::from(5_242_880u64)).to_string(),
            "5,242,880"
        );
        assert_eq!(formatter.format(&Decimal::from(999u64)).to_string(), "999");
    }

    #[test]
    fn invalid_locale_tag_has_no_formatter() {
        assert!(formatter_for("not a locale").is_none());
    }

    #[test]
    fn small_counts_are_not_grouped() {
        assert_eq!(format_with_separators(512), "512");
    }
}
