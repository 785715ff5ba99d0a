//! CPF/CNPJ taxpayer document validation.
//!
//! Both documents carry two trailing check digits computed modulo 11 over
//! weighted digit sums. Values made of a single repeated digit satisfy the
//! check-digit equations but are not issued, so they are rejected too.

use agrobase_core::{DomainError, DomainResult};

/// Which taxpayer document a value is, decided by normalized length:
/// 11 digits is a CPF (individual), anything else is treated as a CNPJ
/// (corporate, valid only at 14 digits).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Cpf,
    Cnpj,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Cpf => "CPF",
            DocumentKind::Cnpj => "CNPJ",
        }
    }
}

impl core::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structurally valid CPF or CNPJ, held as its normalized digit string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxId {
    kind: DocumentKind,
    digits: String,
}

impl TaxId {
    /// Parse and validate a raw document value.
    ///
    /// Separators (`.`, `-`, `/`) are stripped before the length is measured.
    /// Returns `DomainError::InvalidDocument` with a formatted rendering of
    /// the value when the check digits (or the shape) don't hold.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let digits: String = raw
            .chars()
            .filter(|c| !matches!(c, '.' | '-' | '/'))
            .collect();

        let kind = if digits.len() == 11 {
            DocumentKind::Cpf
        } else {
            DocumentKind::Cnpj
        };

        let valid = match kind {
            DocumentKind::Cpf => is_valid_cpf(&digits),
            DocumentKind::Cnpj => is_valid_cnpj(&digits),
        };

        if !valid {
            return Err(DomainError::invalid_document(format!(
                "{} {} is not a valid document",
                kind.as_str(),
                format_digits(kind, &digits)
            )));
        }

        Ok(Self { kind, digits })
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Normalized digit string (11 or 14 digits). This is the stored form.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Human-readable mask: `000.000.000-00` or `00.000.000/0000-00`.
    pub fn formatted(&self) -> String {
        format_digits(self.kind, &self.digits)
    }
}

impl core::fmt::Display for TaxId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.digits)
    }
}

/// Render a digit string with the conventional mask for `kind`.
///
/// Values that don't have the expected length are returned as-is; they only
/// ever show up inside validation error messages.
pub fn format_digits(kind: DocumentKind, digits: &str) -> String {
    let b = digits.as_bytes();
    match kind {
        DocumentKind::Cpf if b.len() == 11 => format!(
            "{}.{}.{}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..11]
        ),
        DocumentKind::Cnpj if b.len() == 14 => format!(
            "{}.{}.{}/{}-{}",
            &digits[0..2],
            &digits[2..5],
            &digits[5..8],
            &digits[8..12],
            &digits[12..14]
        ),
        _ => digits.to_string(),
    }
}

fn digit_values(s: &str) -> Option<Vec<u32>> {
    s.chars().map(|c| c.to_digit(10)).collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// Modulo-11 check digit over a weighted digit sum.
fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

fn is_valid_cpf(s: &str) -> bool {
    if s.len() != 11 {
        return false;
    }
    let Some(d) = digit_values(s) else {
        return false;
    };
    if all_same(&d) {
        return false;
    }

    check_digit(&d[..9], &[10, 9, 8, 7, 6, 5, 4, 3, 2]) == d[9]
        && check_digit(&d[..10], &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]) == d[10]
}

fn is_valid_cnpj(s: &str) -> bool {
    if s.len() != 14 {
        return false;
    }
    let Some(d) = digit_values(s) else {
        return false;
    };
    if all_same(&d) {
        return false;
    }

    check_digit(&d[..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]) == d[12]
        && check_digit(&d[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]) == d[13]
}
