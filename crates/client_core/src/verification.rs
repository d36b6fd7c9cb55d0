//! Phone confirmation shared by the registration and review flows.
//!
//! Code delivery is simulated: an issuer hands back the code it would have
//! sent, and the gate compares what the user typed against it.

use tracing::debug;

use crate::error::FlowError;

pub const DEFAULT_TEST_CODE: &str = "1234";

pub trait CodeIssuer: Send + Sync {
    /// Dispatches a code to `phone` and returns the value to expect back.
    fn issue(&self, phone: &str) -> String;
}

/// Always issues the same code. Stands in for a one-time-code backend.
#[derive(Debug, Clone)]
pub struct FixedCodeIssuer {
    code: String,
}

impl FixedCodeIssuer {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl Default for FixedCodeIssuer {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_CODE)
    }
}

impl CodeIssuer for FixedCodeIssuer {
    fn issue(&self, phone: &str) -> String {
        debug!(phone, "simulated verification code dispatch");
        self.code.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationGate {
    phone: String,
    entered: String,
    expected: String,
}

impl VerificationGate {
    pub fn start(issuer: &dyn CodeIssuer, phone: &str) -> Self {
        Self {
            phone: phone.to_string(),
            entered: String::new(),
            expected: issuer.issue(phone),
        }
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn entered(&self) -> &str {
        &self.entered
    }

    pub fn enter(&mut self, code: impl Into<String>) {
        self.entered = code.into();
    }

    pub fn check(&self) -> Result<(), FlowError> {
        if self.entered == self.expected {
            Ok(())
        } else {
            Err(FlowError::CodeMismatch)
        }
    }
}
