//! Value Normalizer
//!
//! Converts between the human-friendly ("pretty") form of a setting and a
//! comparable canonical form:
//! - [`to_canonical_bytes`] turns `4MB` into `4194304`
//! - [`canonicalize_user_shorthand`] turns `32mb` into `32MB`
//! - [`normalize_boolean`] maps `True`/`False` to `on`/`off`
//! - [`parameter_info`] scales catalog kB/MB settings to bytes

use crate::types::{CatalogRow, ParameterInfo, SettingValue, Unit};

/// Lowercase size suffixes the server rejects but users commonly type
pub const LOWERCASE_SIZE_UNITS: [&str; 3] = ["mb", "gb", "tb"];

/// Numeric literal without a unit suffix
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Integral literal
    Int(i64),
    /// Fractional or exponent literal
    Float(f64),
}

impl Number {
    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

/// Canonical, comparable form of a setting literal
///
/// Numeric variants compare by value across variants, so `Bytes(1024)`,
/// `Number(Int(1024))` and `Number(Float(1024.0))` are all equal. `Opaque`
/// only equals an identical `Opaque`.
#[derive(Debug, Clone)]
pub enum CanonicalValue {
    /// Size literal scaled to bytes
    Bytes(i64),
    /// Plain number
    Number(Number),
    /// Anything without a numeric interpretation, kept verbatim
    Opaque(String),
}

impl CanonicalValue {
    fn numeric(&self) -> Option<Number> {
        match self {
            Self::Bytes(bytes) => Some(Number::Int(*bytes)),
            Self::Number(number) => Some(*number),
            Self::Opaque(_) => None,
        }
    }
}

impl PartialEq for CanonicalValue {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Opaque(a), Self::Opaque(b)) => a == b,
            _ => match (self.numeric(), other.numeric()) {
                (Some(Number::Int(a)), Some(Number::Int(b))) => a == b,
                (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
                _ => false,
            },
        }
    }
}

/// Convert a pretty literal to canonical form
///
/// 1. Empty literal is `Opaque("")`.
/// 2. A literal not starting with a digit is opaque.
/// 3. A literal not ending in a letter is a plain number (integer first,
///    then float).
/// 4. Otherwise the leading digits are scaled by the `kB`/`MB`/`GB`/`TB`
///    found in the last two characters, or taken as bytes when the last
///    character is `B`.
/// 5. Anything left over is returned as-is.
///
/// Suffixes are case-sensitive and only the leading digit run is scaled,
/// so `1.5GB` reads as one gigabyte and `5mB` as five bytes.
#[must_use]
pub fn to_canonical_bytes(literal: &str) -> CanonicalValue {
    let opaque = || CanonicalValue::Opaque(literal.to_string());

    let (Some(first), Some(last)) = (literal.chars().next(), literal.chars().last()) else {
        return CanonicalValue::Opaque(String::new());
    };
    if !first.is_ascii_digit() {
        return opaque();
    }
    if !last.is_alphabetic() {
        return parse_number(literal).map_or_else(opaque, CanonicalValue::Number);
    }

    let digits: String = literal.chars().take_while(char::is_ascii_digit).collect();
    let Ok(amount) = digits.parse::<i64>() else {
        return opaque();
    };

    let tail: String = {
        let chars: Vec<char> = literal.chars().collect();
        chars[chars.len().saturating_sub(2)..].iter().collect()
    };
    let exponent = match tail.as_str() {
        "kB" => Some(1),
        "MB" => Some(2),
        "GB" => Some(3),
        "TB" => Some(4),
        _ => None,
    };

    match exponent {
        Some(exponent) => 1024_i64
            .checked_pow(exponent)
            .and_then(|factor| amount.checked_mul(factor))
            .map_or_else(opaque, CanonicalValue::Bytes),
        None if last == 'B' => CanonicalValue::Bytes(amount),
        None => opaque(),
    }
}

fn parse_number(literal: &str) -> Option<Number> {
    literal
        .parse::<i64>()
        .map(Number::Int)
        .or_else(|_| literal.parse::<f64>().map(Number::Float))
        .ok()
}

/// Uppercase a lowercase size suffix the server would reject
///
/// Only rewrites `<digits>mb`, `<digits>gb`, `<digits>tb` and `<digits>b`.
/// `kb` is left alone since the server spells it `kB`.
#[must_use]
pub fn canonicalize_user_shorthand(literal: &str) -> String {
    let chars: Vec<char> = literal.chars().collect();
    let len = chars.len();
    let all_digits = |prefix: &[char]| prefix.iter().all(char::is_ascii_digit);

    if len > 2 {
        let suffix: String = chars[len - 2..].iter().collect();
        if all_digits(&chars[..len - 2]) && LOWERCASE_SIZE_UNITS.contains(&suffix.as_str()) {
            return literal.to_uppercase();
        }
    }
    if len > 1 && chars[len - 1] == 'b' && all_digits(&chars[..len - 1]) {
        return literal.to_uppercase();
    }
    literal.to_string()
}

/// Map `True`/`False` to the server's `on`/`off`
#[must_use]
pub fn normalize_boolean(token: &str) -> String {
    match token {
        "True" => "on".to_string(),
        "False" => "off".to_string(),
        other => other.to_string(),
    }
}

/// Prepare a user-supplied literal for comparison and submission
#[must_use]
pub fn normalize_desired(literal: &str) -> String {
    normalize_boolean(&canonicalize_user_shorthand(literal))
}

/// Scale a catalog setting to bytes when its unit allows it
///
/// Only positive integers are scaled; `-1` and non-integral text stay raw.
#[must_use]
pub fn scale_setting(setting: &str, unit: &Unit) -> SettingValue {
    let raw = || SettingValue::Raw(setting.to_string());
    let Some(factor) = unit.byte_factor() else {
        return raw();
    };
    match setting.parse::<i64>() {
        Ok(amount) if amount > 0 => amount
            .checked_mul(factor)
            .map_or_else(raw, SettingValue::Bytes),
        _ => raw(),
    }
}

/// Build a normalized [`ParameterInfo`] from a catalog row and display token
///
/// kB and MB units are always rewritten to bytes.
#[must_use]
pub fn parameter_info(row: CatalogRow, display: &str) -> ParameterInfo {
    let catalog_unit = Unit::from_catalog(row.unit.as_deref());
    let raw_value = scale_setting(&row.setting, &catalog_unit);
    let boot_value = scale_setting(&row.boot_val, &catalog_unit);
    let unit = if catalog_unit.byte_factor().is_some() {
        Unit::Bytes
    } else {
        catalog_unit
    };

    ParameterInfo {
        name: row.name,
        current_value: normalize_boolean(display),
        raw_value,
        unit,
        context: row.context,
        boot_value,
        boot_literal: row.boot_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextClass;

    fn opaque(s: &str) -> CanonicalValue {
        CanonicalValue::Opaque(s.to_string())
    }

    #[test]
    fn size_suffixes() {
        assert_eq!(to_canonical_bytes("4MB"), CanonicalValue::Bytes(4 * 1024 * 1024));
        assert_eq!(to_canonical_bytes("1kB"), CanonicalValue::Bytes(1024));
        assert_eq!(to_canonical_bytes("2GB"), CanonicalValue::Bytes(2 << 30));
        assert_eq!(to_canonical_bytes("1TB"), CanonicalValue::Bytes(1 << 40));
        assert_eq!(to_canonical_bytes("1B"), CanonicalValue::Bytes(1));
    }

    #[test]
    fn non_numeric_literals_are_opaque() {
        assert_eq!(to_canonical_bytes(""), opaque(""));
        assert_eq!(to_canonical_bytes("on"), opaque("on"));
        assert_eq!(to_canonical_bytes("en_US.UTF-8"), opaque("en_US.UTF-8"));
        assert_ne!(to_canonical_bytes("on"), to_canonical_bytes("off"));
    }

    #[test]
    fn plain_numbers() {
        assert!(matches!(
            to_canonical_bytes("1024"),
            CanonicalValue::Number(Number::Int(1024))
        ));
        assert!(matches!(
            to_canonical_bytes("0.5"),
            CanonicalValue::Number(Number::Float(f)) if (f - 0.5).abs() < f64::EPSILON
        ));
        assert_eq!(to_canonical_bytes("12:30"), opaque("12:30"));
    }

    #[test]
    fn numeric_variants_compare_by_value() {
        assert_eq!(to_canonical_bytes("1024"), to_canonical_bytes("1kB"));
        assert_eq!(to_canonical_bytes("1GB"), to_canonical_bytes("1024MB"));
        assert_eq!(to_canonical_bytes("1024.0"), to_canonical_bytes("1024"));
        assert_ne!(to_canonical_bytes("1024"), opaque("1024"));
    }

    #[test]
    fn suffix_quirks_are_preserved() {
        // Only the leading digit run is scaled
        assert_eq!(to_canonical_bytes("1.5GB"), CanonicalValue::Bytes(1 << 30));
        // Case-sensitive: `mB` is not a unit but still ends in `B`
        assert_eq!(to_canonical_bytes("5mB"), CanonicalValue::Bytes(5));
        // Unknown suffixes fall through unchanged
        assert_eq!(to_canonical_bytes("1s"), opaque("1s"));
        assert_eq!(to_canonical_bytes("200ms"), opaque("200ms"));
        assert_eq!(to_canonical_bytes("32mb"), opaque("32mb"));
    }

    #[test]
    fn overflow_is_opaque() {
        assert_eq!(to_canonical_bytes("99999999999TB"), opaque("99999999999TB"));
    }

    #[test]
    fn shorthand_rewrite() {
        assert_eq!(canonicalize_user_shorthand("32mb"), "32MB");
        assert_eq!(canonicalize_user_shorthand("2gb"), "2GB");
        assert_eq!(canonicalize_user_shorthand("1tb"), "1TB");
        assert_eq!(canonicalize_user_shorthand("1b"), "1B");
        assert_eq!(canonicalize_user_shorthand("abcmb"), "abcmb");
        assert_eq!(canonicalize_user_shorthand("32kb"), "32kb");
        assert_eq!(canonicalize_user_shorthand("mb"), "mb");
        assert_eq!(canonicalize_user_shorthand("b"), "b");
        assert_eq!(canonicalize_user_shorthand("32MB"), "32MB");
        assert_eq!(canonicalize_user_shorthand("Europe/Paris"), "Europe/Paris");
    }

    #[test]
    fn boolean_aliases() {
        assert_eq!(normalize_boolean("True"), "on");
        assert_eq!(normalize_boolean("False"), "off");
        assert_eq!(normalize_boolean("true"), "true");
        assert_eq!(normalize_desired("False"), "off");
        assert_eq!(normalize_desired("64mb"), "64MB");
    }

    #[test]
    fn scaling_rules() {
        assert_eq!(scale_setting("4096", &Unit::Kilobyte), SettingValue::Bytes(4_194_304));
        assert_eq!(scale_setting("1024", &Unit::Megabyte), SettingValue::Bytes(1 << 30));
        assert_eq!(scale_setting("-1", &Unit::Kilobyte), SettingValue::Raw("-1".into()));
        assert_eq!(scale_setting("0", &Unit::Kilobyte), SettingValue::Raw("0".into()));
        assert_eq!(scale_setting("100", &Unit::None), SettingValue::Raw("100".into()));
        assert_eq!(
            scale_setting("16384", &Unit::Other("8kB".into())),
            SettingValue::Raw("16384".into())
        );
    }

    #[test]
    fn parameter_info_normalizes_units() {
        let row = CatalogRow {
            name: "work_mem".into(),
            setting: "4096".into(),
            unit: Some("kB".into()),
            context: ContextClass::User,
            boot_val: "4096".into(),
        };
        let info = parameter_info(row, "4MB");
        assert_eq!(info.unit, Unit::Bytes);
        assert_eq!(info.raw_value, SettingValue::Bytes(4_194_304));
        assert_eq!(info.boot_value, info.raw_value);
        assert_eq!(info.boot_literal, "4096");
        assert_eq!(info.current_value, "4MB");
    }

    #[test]
    fn parameter_info_normalizes_boolean_display() {
        let row = CatalogRow {
            name: "wal_log_hints".into(),
            setting: "off".into(),
            unit: None,
            context: ContextClass::Postmaster,
            boot_val: "off".into(),
        };
        let info = parameter_info(row, "False");
        assert_eq!(info.current_value, "off");
        assert_eq!(info.unit, Unit::None);
    }
}
