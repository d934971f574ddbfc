use crate::error::{AppError, AppResult};
use regex::Regex;

/// Validate a Senegalese mobile number (+221 followed by a 7X prefix).
pub fn validate_sn_phone(phone: &str) -> AppResult<()> {
    let phone_regex = Regex::new(r"^\+221(70|75|76|77|78)\d{7}$").unwrap();

    if !phone_regex.is_match(phone) {
        return Err(AppError::ValidationError(
            "Invalid phone number, expected a Senegalese mobile number (+2217XXXXXXXX)".to_string(),
        ));
    }

    Ok(())
}

/// Normalize a phone number to +221XXXXXXXXX form. The phone is the ledger
/// key, so "77 123 45 67" and "+221771234567" must land on the same entry.
pub fn format_sn_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 12 && digits.starts_with("221") {
        format!("+{}", digits)
    } else if digits.len() == 9 && digits.starts_with('7') {
        format!("+221{}", digits)
    } else {
        phone.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sn_phone() {
        assert!(validate_sn_phone("+221771234567").is_ok());
        assert!(validate_sn_phone("+221781234567").is_ok());
        assert!(validate_sn_phone("+22177123456").is_err());
        assert!(validate_sn_phone("771234567").is_err());
        assert!(validate_sn_phone("+221691234567").is_err());
        assert!(validate_sn_phone("+33612345678").is_err());
    }

    #[test]
    fn test_format_sn_phone() {
        assert_eq!(format_sn_phone("771234567"), "+221771234567");
        assert_eq!(format_sn_phone("221771234567"), "+221771234567");
        assert_eq!(format_sn_phone("+221771234567"), "+221771234567");
        assert_eq!(format_sn_phone("77 123 45 67"), "+221771234567");
    }
}
