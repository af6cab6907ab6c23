//! Outcome of one endpoint contract check.

use std::fmt;

use speckit_schema::ValidationResult;

/// Status and body verdict for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCheck {
    /// e.g. `GET /users`.
    pub endpoint: String,
    pub expected_status: u16,
    pub status: u16,
    pub result: ValidationResult,
}

impl ContractCheck {
    pub fn status_matches(&self) -> bool {
        self.status == self.expected_status
    }

    /// True iff the status matches and the body is valid.
    pub fn passed(&self) -> bool {
        self.status_matches() && self.result.is_valid()
    }
}

impl fmt::Display for ContractCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed() { "OK" } else { "FAIL" };
        write!(f, "{verdict}: {} -> {}", self.endpoint, self.status)?;
        if !self.status_matches() {
            write!(f, " (expected {})", self.expected_status)?;
        }
        if let ValidationResult::Invalid(violations) = &self.result {
            write!(f, "\n{violations}")?;
        }
        Ok(())
    }
}
