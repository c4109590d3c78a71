use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required(String),
    TooShort { field: String, min: usize, actual: usize },
    TooLong { field: String, max: usize, actual: usize },
    InvalidRange { field: String, min: String, max: String },
    InvalidValue { field: String, message: String },
    InvalidEmail(String),
    InvalidPhone(String),
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            Self::Required(field)
            | Self::InvalidEmail(field)
            | Self::InvalidPhone(field) => field,
            Self::TooShort { field, .. }
            | Self::TooLong { field, .. }
            | Self::InvalidRange { field, .. }
            | Self::InvalidValue { field, .. } => field,
        }
    }

    /// Message shown next to the offending field.
    pub fn message(&self) -> String {
        match self {
            Self::Required(_) => "is required".to_string(),
            Self::TooShort { min, .. } => format!("must be at least {} characters", min),
            Self::TooLong { max, .. } => format!("must be at most {} characters", max),
            Self::InvalidRange { min, max, .. } => match (min.as_str(), max.as_str()) {
                ("-∞", max) => format!("must be at most {}", max),
                (min, "∞") => format!("must be at least {}", min),
                (min, max) => format!("must be between {} and {}", min, max),
            },
            Self::InvalidValue { message, .. } => message.clone(),
            Self::InvalidEmail(_) => "must be a valid email address".to_string(),
            Self::InvalidPhone(_) => "must be a valid phone number".to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field '{}' {}", self.field(), self.message())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn single(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// One message per field; the first failing rule wins.
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.field().to_string())
                .or_insert_with(|| error.message());
        }
        map
    }
}

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    ).expect("Invalid email regex")
});

static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[1-9]\d{6,14}$").expect("Invalid phone regex")
});

pub fn validate_string_required(value: &str, field_name: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field_name.to_string()))
    } else {
        Ok(())
    }
}

/// Length in characters of the trimmed value.
pub fn validate_length(
    value: &str,
    field_name: &str,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();

    if let Some(min_len) = min {
        if len < min_len {
            return Err(ValidationError::TooShort {
                field: field_name.to_string(),
                min: min_len,
                actual: len,
            });
        }
    }

    if let Some(max_len) = max {
        if len > max_len {
            return Err(ValidationError::TooLong {
                field: field_name.to_string(),
                max: max_len,
                actual: len,
            });
        }
    }

    Ok(())
}

pub fn validate_email(email: &str, field_name: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(field_name.to_string()));
    }
    Ok(())
}

pub fn validate_phone(phone: &str, field_name: &str) -> Result<(), ValidationError> {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    let only_separators = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));

    if only_separators && PHONE_REGEX.is_match(&digits) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone(field_name.to_string()))
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    value: &T,
    field_name: &str,
    min: Option<T>,
    max: Option<T>,
) -> Result<(), ValidationError> {
    let min_str = min.as_ref().map(|m| m.to_string()).unwrap_or_else(|| "-∞".to_string());
    let max_str = max.as_ref().map(|m| m.to_string()).unwrap_or_else(|| "∞".to_string());

    let below = min.as_ref().is_some_and(|min_val| value < min_val);
    let above = max.as_ref().is_some_and(|max_val| value > max_val);
    if below || above {
        return Err(ValidationError::InvalidRange {
            field: field_name.to_string(),
            min: min_str,
            max: max_str,
        });
    }

    Ok(())
}

pub fn validate_positive_amount(value: &BigDecimal, field_name: &str) -> Result<(), ValidationError> {
    if *value > BigDecimal::from(0) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field_name.to_string(),
            message: "must be greater than 0".to_string(),
        })
    }
}

/// Fits the value into a `NUMERIC(precision, scale)` column without rounding.
pub fn validate_decimal(
    value: &BigDecimal,
    field_name: &str,
    precision: u32,
    scale: u32,
) -> Result<(), ValidationError> {
    let (_, exponent) = value.normalized().as_bigint_and_exponent();
    if exponent > i64::from(scale) {
        return Err(ValidationError::InvalidValue {
            field: field_name.to_string(),
            message: format!("must have at most {} decimal places", scale),
        });
    }
    let limit = BigDecimal::from(10u64.pow(precision.saturating_sub(scale)));
    if value.abs() >= limit {
        return Err(ValidationError::InvalidValue {
            field: field_name.to_string(),
            message: format!("must be less than {}", limit),
        });
    }
    Ok(())
}

pub fn validate_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    field_name: &str,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::InvalidValue {
            field: field_name.to_string(),
            message: "must not be before the start date".to_string(),
        }),
        _ => Ok(()),
    }
}

pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
            actual: password.len(),
        });
    }

    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
            actual: password.len(),
        });
    }

    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_uppercase && has_lowercase && has_digit) {
        return Err(ValidationError::InvalidValue {
            field: "password".to_string(),
            message: "must contain an uppercase letter, a lowercase letter and a digit".to_string(),
        });
    }

    Ok(())
}

pub struct Validator {
    result: ValidationResult,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    fn check(mut self, outcome: Result<(), ValidationError>) -> Self {
        if let Err(e) = outcome {
            self.result.add_error(e);
        }
        self
    }

    pub fn string_required(self, value: &str, field_name: &str) -> Self {
        self.check(validate_string_required(value, field_name))
    }

    pub fn length(self, value: &str, field_name: &str, min: Option<usize>, max: Option<usize>) -> Self {
        self.check(validate_length(value, field_name, min, max))
    }

    /// Length check that only applies when a value is present.
    pub fn optional_length(self, value: Option<&str>, field_name: &str, max: usize) -> Self {
        match value {
            Some(v) => self.check(validate_length(v, field_name, None, Some(max))),
            None => self,
        }
    }

    /// Presence check for non-string fields such as ids and dates.
    pub fn present<T>(self, value: Option<&T>, field_name: &str) -> Self {
        match value {
            Some(_) => self,
            None => self.check(Err(ValidationError::Required(field_name.to_string()))),
        }
    }

    pub fn email(self, value: &str, field_name: &str) -> Self {
        self.check(validate_email(value, field_name))
    }

    pub fn phone(self, value: Option<&str>, field_name: &str) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => self.check(validate_phone(v, field_name)),
            _ => self,
        }
    }

    pub fn password(self, value: &str) -> Self {
        self.check(validate_password_strength(value))
    }

    pub fn range<T: PartialOrd + std::fmt::Display>(
        self,
        value: &T,
        field_name: &str,
        min: Option<T>,
        max: Option<T>,
    ) -> Self {
        self.check(validate_range(value, field_name, min, max))
    }

    pub fn non_negative(self, value: &BigDecimal, field_name: &str) -> Self {
        self.check(validate_range(value, field_name, Some(BigDecimal::from(0)), None))
    }

    pub fn positive(self, value: &BigDecimal, field_name: &str) -> Self {
        self.check(validate_positive_amount(value, field_name))
    }

    pub fn decimal(self, value: &BigDecimal, field_name: &str, precision: u32, scale: u32) -> Self {
        self.check(validate_decimal(value, field_name, precision, scale))
    }

    pub fn date_order(self, start: Option<NaiveDate>, end: Option<NaiveDate>, field_name: &str) -> Self {
        self.check(validate_date_order(start, end, field_name))
    }

    pub fn custom<F>(mut self, validation_fn: F) -> Self
    where
        F: FnOnce() -> Option<ValidationError>,
    {
        if let Some(error) = validation_fn() {
            self.result.add_error(error);
        }
        self
    }

    pub fn validate(self) -> Result<(), ValidationResult> {
        if self.result.is_valid() {
            Ok(())
        } else {
            Err(self.result)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
