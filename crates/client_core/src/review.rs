//! Leaving a star rating on a model's profile: fill the form, confirm the
//! phone, then post.

use std::{fmt, sync::Arc};

use shared::{
    domain::ProfileId,
    protocol::{ReviewRecord, ReviewRequest},
};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::{
    error::FlowError,
    verification::{CodeIssuer, FixedCodeIssuer, VerificationGate},
    FlowEvent, ProfileApi,
};

pub const MAX_RATING: u8 = 5;
pub const DEFAULT_RATING: u8 = MAX_RATING;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStep {
    Form,
    Verify,
    Closed,
}

impl ReviewStep {
    pub fn name(self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Verify => "verify",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ReviewStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub author_name: String,
    pub author_phone: String,
    pub text: String,
    pub rating: u8,
}

impl Default for ReviewDraft {
    fn default() -> Self {
        Self {
            author_name: String::new(),
            author_phone: String::new(),
            text: String::new(),
            rating: DEFAULT_RATING,
        }
    }
}

impl ReviewDraft {
    fn validate(&self) -> Result<(), FlowError> {
        let mut missing = Vec::new();
        if self.author_name.trim().is_empty() {
            missing.push("author_name");
        }
        if self.author_phone.trim().is_empty() {
            missing.push("author_phone");
        }
        if self.text.trim().is_empty() {
            missing.push("review_text");
        }
        if !missing.is_empty() {
            return Err(FlowError::MissingFields { fields: missing });
        }
        if !(1..=MAX_RATING).contains(&self.rating) {
            return Err(FlowError::RatingOutOfRange(self.rating));
        }
        Ok(())
    }
}

pub struct ReviewFlow {
    profile_id: ProfileId,
    api: Arc<dyn ProfileApi>,
    codes: Arc<dyn CodeIssuer>,
    step: ReviewStep,
    draft: ReviewDraft,
    verification: Option<VerificationGate>,
    events: broadcast::Sender<FlowEvent>,
}

impl ReviewFlow {
    pub fn new(profile_id: ProfileId, api: Arc<dyn ProfileApi>) -> Self {
        Self::new_with_dependencies(profile_id, api, Arc::new(FixedCodeIssuer::default()))
    }

    pub fn new_with_dependencies(
        profile_id: ProfileId,
        api: Arc<dyn ProfileApi>,
        codes: Arc<dyn CodeIssuer>,
    ) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            profile_id,
            api,
            codes,
            step: ReviewStep::Form,
            draft: ReviewDraft::default(),
            verification: None,
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub fn step(&self) -> ReviewStep {
        self.step
    }

    pub fn draft(&self) -> &ReviewDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ReviewDraft {
        &mut self.draft
    }

    pub fn submit_form(&mut self) -> Result<(), FlowError> {
        self.expect_step(ReviewStep::Form)?;
        if let Err(err) = self.draft.validate() {
            return Err(self.fail(err));
        }
        let phone = self.draft.author_phone.trim().to_string();
        self.verification = Some(VerificationGate::start(self.codes.as_ref(), &phone));
        self.step = ReviewStep::Verify;
        let _ = self.events.send(FlowEvent::CodeSent { phone });
        Ok(())
    }

    pub fn enter_code(&mut self, code: impl Into<String>) -> Result<(), FlowError> {
        self.expect_step(ReviewStep::Verify)?;
        if let Some(gate) = self.verification.as_mut() {
            gate.enter(code);
        }
        Ok(())
    }

    /// Checks the code and, on a match, posts the review. A failed post
    /// leaves the flow at the verify step with everything intact.
    pub async fn submit_code(&mut self) -> Result<ReviewRecord, FlowError> {
        self.expect_step(ReviewStep::Verify)?;
        let checked = match &self.verification {
            Some(gate) => gate.check(),
            None => Err(FlowError::CodeMismatch),
        };
        if let Err(err) = checked {
            return Err(self.fail(err));
        }

        let request = ReviewRequest {
            model_id: self.profile_id,
            author_name: self.draft.author_name.trim().to_string(),
            author_phone: self.draft.author_phone.trim().to_string(),
            rating: self.draft.rating,
            review_text: self.draft.text.trim().to_string(),
        };
        let record = match self.api.submit_review(&request).await {
            Ok(record) => record,
            Err(source) => {
                error!(profile = %self.profile_id, "review submission failed: {source:#}");
                return Err(self.fail(FlowError::Submission { source }));
            }
        };

        info!(profile = %self.profile_id, review = %record.id, "review published");
        let _ = self.events.send(FlowEvent::ReviewPublished { id: record.id });
        self.close();
        Ok(record)
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.draft = ReviewDraft::default();
        self.verification = None;
        self.step = ReviewStep::Closed;
        let _ = self.events.send(FlowEvent::Closed);
    }

    fn expect_step(&self, expected: ReviewStep) -> Result<(), FlowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(FlowError::InvalidStep {
                expected: expected.name(),
                actual: self.step.name(),
            })
        }
    }

    fn fail(&self, err: FlowError) -> FlowError {
        warn!(profile = %self.profile_id, step = %self.step, "review step rejected: {err}");
        let _ = self.events.send(FlowEvent::Failed {
            message: err.to_string(),
        });
        err
    }
}

#[cfg(test)]
#[path = "tests/review_tests.rs"]
mod tests;
