//! # Input Validation
//!
//! Checks that run before any business logic or SQL. Each function
//! rejects one field with a [`ValidationError`] naming that field, so
//! the till can point the cashier at the exact box to fix.
//!
//! The database repeats the non-negotiable rules as constraints
//! (UNIQUE email and product code, CHECK on stock and drawer counts).
//! This module exists to fail earlier and with a better message.
//!
//! ## Usage
//! ```rust
//! use kirana_core::validation::{validate_email, validate_quantity};
//!
//! let email = validate_email(" Asha@Example.com ").unwrap();
//! assert_eq!(email, "asha@example.com");
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_BILL_LINES, MAX_LINE_QUANTITY};

/// Alias every validator returns.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Text Fields
// =============================================================================

/// Checks a customer email and returns it trimmed and lowercased.
///
/// The shape test is deliberately shallow (one `@`, text on both
/// sides, 254 bytes at most): the email is a lookup key for purchase
/// history here, and the invoice sender is the collaborator that
/// actually talks to a mailbox.
///
/// ```rust
/// use kirana_core::validation::validate_email;
///
/// assert_eq!(validate_email(" Asha@Example.com ").unwrap(), "asha@example.com");
/// assert!(validate_email("no-at-sign").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {}
        _ => {
            return Err(ValidationError::InvalidFormat {
                field: "email".to_string(),
                reason: "must look like name@domain".to_string(),
            })
        }
    }

    Ok(email.to_lowercase())
}

/// Checks a product code: 1 to 50 characters from the set
/// `[A-Za-z0-9_-]` (alphanumeric in any script, plus hyphen and
/// underscore).
///
/// ```rust
/// use kirana_core::validation::validate_product_code;
///
/// assert!(validate_product_code("RICE-1KG").is_ok());
/// assert!(validate_product_code("has space").is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if let Some(bad) = code
        .chars()
        .find(|&c| !c.is_alphanumeric() && c != '-' && c != '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: format!("character {bad:?} is not allowed"),
        });
    }

    Ok(())
}

/// Checks a product display name: non-blank, 200 characters at most.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Amounts & Counts
// =============================================================================

/// Checks a bill-line quantity: at least 1, at most
/// [`MAX_LINE_QUANTITY`](crate::MAX_LINE_QUANTITY).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Checks a unit price in paise. Zero passes: samples and free items
/// are priced at nothing.
pub fn validate_price_paise(paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Checks tendered cash in paise. Zero passes: a fully discounted
/// bill can owe nothing.
pub fn validate_paid_amount(paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::OutOfRange {
            field: "paid amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Checks a tax rate in basis points: 0 to 10000, i.e. 0% to 100%.
/// GST slabs in practice are 0, 500, 1200, 1800 and 2800.
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Checks the number of distinct lines on one bill against
/// [`MAX_BILL_LINES`](crate::MAX_BILL_LINES).
pub fn validate_bill_size(line_count: usize) -> ValidationResult<()> {
    if line_count > MAX_BILL_LINES {
        return Err(ValidationError::OutOfRange {
            field: "bill lines".to_string(),
            min: 0,
            max: MAX_BILL_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Identifiers
// =============================================================================

/// Checks that a string parses as a UUID.
///
/// ```rust
/// use kirana_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalizes_case_and_whitespace() {
        assert_eq!(
            validate_email("Asha@Example.com").unwrap(),
            "asha@example.com"
        );
        assert_eq!(validate_email(" ravi@shop.in ").unwrap(), "ravi@shop.in");
    }

    #[test]
    fn test_email_shape_rejections() {
        assert!(matches!(
            validate_email(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_email("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_email("no-at-sign"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("name@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(matches!(
            validate_email(&format!("{}@x.com", "a".repeat(260))),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_product_code_character_set() {
        assert!(validate_product_code("RICE-1KG").is_ok());
        assert!(validate_product_code("atta_5kg").is_ok());
        assert!(validate_product_code("GHEE1L").is_ok());

        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("   ").is_err());
        assert!(matches!(
            validate_product_code("has space"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_product_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_product_name_length() {
        assert!(validate_product_name("Basmati Rice 1kg").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_quantity_window() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_quantity(-1),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_quantity(MAX_LINE_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_amounts_allow_zero_but_not_negative() {
        assert!(validate_price_paise(0).is_ok());
        assert!(validate_price_paise(9500).is_ok());
        assert!(validate_price_paise(-100).is_err());

        assert!(validate_paid_amount(0).is_ok());
        assert!(validate_paid_amount(22_800).is_ok());
        assert!(validate_paid_amount(-1).is_err());
    }

    #[test]
    fn test_tax_rate_cap() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1200).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_bill_size_cap() {
        assert!(validate_bill_size(0).is_ok());
        assert!(validate_bill_size(MAX_BILL_LINES).is_ok());
        assert!(validate_bill_size(MAX_BILL_LINES + 1).is_err());
    }

    #[test]
    fn test_uuid_shapes() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
