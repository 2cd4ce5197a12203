use serde::Serialize;
use utoipa::ToSchema;

const SPECIAL_CHARS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("password must be at least {0} characters long")]
    TooShort(usize),
    #[error("password must contain at least one number")]
    MissingDigit,
    #[error("password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("password must contain at least one special character")]
    MissingSpecial,
}

/// Composition rules a password must satisfy before it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordPolicy {
    /// Reports the first rule the password breaks, in a fixed order.
    pub fn check(&self, password: &str) -> Result<(), PolicyViolation> {
        if password.chars().count() < self.min_length {
            return Err(PolicyViolation::TooShort(self.min_length));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PolicyViolation::MissingDigit);
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(PolicyViolation::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(PolicyViolation::MissingUppercase);
        }
        if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            return Err(PolicyViolation::MissingSpecial);
        }
        Ok(())
    }

    pub fn assess(&self, password: &str) -> PasswordAssessment {
        let strength = strength(password);
        match self.check(password) {
            Ok(()) => {
                PasswordAssessment { valid: true, message: "strong password".into(), strength }
            }
            Err(v) => PasswordAssessment { valid: false, message: v.to_string(), strength },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PasswordAssessment {
    pub valid: bool,
    pub message: String,
    /// Percentage 0-100.
    pub strength: u8,
}

/// Share of the six strength criteria met, as a whole percentage.
pub fn strength(password: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }
    let len = password.chars().count();
    let criteria = [
        len >= 8,
        len >= 12,
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let met = criteria.iter().filter(|&&c| c).count();
    (met * 100 / criteria.len()) as u8
}
