use std::fmt;

/// A code that passed the configured [`IsbnRule`].
///
/// Only [`IsbnRule::validate`] constructs one, so holding an `Isbn` means the
/// format check already happened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Isbn(String);

impl Isbn {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Isbn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Format predicate applied to confirmed codes.
///
/// The default accepts the EAN-13 "Bookland" form an EAN reader emits: 13
/// ASCII digits beginning with `978`. The 10-digit form is available by
/// configuring `length: 10` with a single-digit prefix, in which case the
/// last character may also be `X`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsbnRule {
    /// Accepted leading digits. Empty accepts any prefix.
    pub prefixes: Vec<String>,
    /// Exact code length in characters.
    pub length: usize,
    /// Also require a correct check digit.
    pub verify_checksum: bool,
}

impl Default for IsbnRule {
    fn default() -> Self {
        Self {
            prefixes: vec!["978".to_string()],
            length: 13,
            verify_checksum: false,
        }
    }
}

impl IsbnRule {
    pub fn validate(&self, code: &str) -> Option<Isbn> {
        if code.len() != self.length || !self.has_allowed_charset(code) {
            return None;
        }
        if !self.prefixes.is_empty() && !self.prefixes.iter().any(|p| code.starts_with(p.as_str()))
        {
            return None;
        }
        if self.verify_checksum && !checksum_ok(code) {
            return None;
        }
        Some(Isbn(code.to_string()))
    }

    /// Human readable description used in rejection messages.
    pub fn describe(&self) -> String {
        if self.prefixes.is_empty() {
            format!("a {}-digit code", self.length)
        } else {
            format!(
                "a {}-digit code starting with {}",
                self.length,
                self.prefixes.join(" or ")
            )
        }
    }

    fn has_allowed_charset(&self, code: &str) -> bool {
        let bytes = code.as_bytes();
        match bytes.split_last() {
            Some((last, head)) => {
                head.iter().all(u8::is_ascii_digit)
                    && (last.is_ascii_digit() || (self.length == 10 && *last == b'X'))
            }
            None => false,
        }
    }
}

fn checksum_ok(code: &str) -> bool {
    match code.len() {
        13 => ean13_checksum_ok(code),
        10 => isbn10_checksum_ok(code),
        // No check digit scheme for other lengths.
        _ => true,
    }
}

fn ean13_checksum_ok(code: &str) -> bool {
    let sum: u32 = code
        .bytes()
        .take(12)
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum();
    let expected = (10 - sum % 10) % 10;
    code.as_bytes()
        .get(12)
        .map(|b| u32::from(b - b'0') == expected)
        .unwrap_or(false)
}

fn isbn10_checksum_ok(code: &str) -> bool {
    let sum: u32 = code
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let value = if b == b'X' { 10 } else { u32::from(b - b'0') };
            value * (10 - i as u32)
        })
        .sum();
    sum % 11 == 0
}
