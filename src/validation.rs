//! Field rules applied by the gateway before any statement is issued.

use regex::Regex;

use crate::error::ValidationError;
use crate::models::Course;

/// Default cap on the number of characters in a student name.
pub const DEFAULT_NAME_MAX_LEN: usize = 100;
/// Default cap on the number of characters in a mobile number.
pub const DEFAULT_MOBILE_MAX_LEN: usize = 32;

/// Limits loaded from configuration. `mobile_pattern` only applies to a
/// non-empty mobile.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub name_max_len: usize,
    pub mobile_max_len: usize,
    pub mobile_pattern: Option<Regex>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            name_max_len: DEFAULT_NAME_MAX_LEN,
            mobile_max_len: DEFAULT_MOBILE_MAX_LEN,
            mobile_pattern: None,
        }
    }
}

impl ValidationRules {
    /// Check one record's worth of fields. Values are inspected, never
    /// rewritten.
    pub fn check(&self, name: &str, course: &str, mobile: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "Name" });
        }
        if name.chars().count() > self.name_max_len {
            return Err(ValidationError::TooLong {
                field: "Name",
                max: self.name_max_len,
            });
        }

        if course.trim().is_empty() {
            return Err(ValidationError::Empty { field: "Course" });
        }
        if course.parse::<Course>().is_err() {
            return Err(ValidationError::UnknownCourse(course.to_string()));
        }

        if mobile.chars().count() > self.mobile_max_len {
            return Err(ValidationError::TooLong {
                field: "Mobile",
                max: self.mobile_max_len,
            });
        }
        if let Some(pattern) = &self.mobile_pattern {
            if !mobile.is_empty() && !pattern.is_match(mobile) {
                return Err(ValidationError::MobilePattern {
                    pattern: pattern.as_str().to_string(),
                });
            }
        }

        Ok(())
    }
}
