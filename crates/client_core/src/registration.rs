//! Three-step sign-up: credentials, phone confirmation, then the profile
//! itself. One controller serves both profile kinds; the kind's schema
//! decides required fields and photo capacity.

use std::{fmt, sync::Arc};

use shared::{domain::ProfileKind, protocol::CreatedProfile};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::{
    draft::{schema_for, ProfileSchema, RegistrationDraft},
    error::FlowError,
    photos::PhotoStaging,
    verification::{CodeIssuer, FixedCodeIssuer, VerificationGate},
    FlowEvent, ProfileApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationStep {
    Initial,
    Verify,
    Profile,
    Closed,
}

impl RegistrationStep {
    /// Steps shown in the progress indicator, in order.
    pub const ALL: [Self; 3] = [Self::Initial, Self::Verify, Self::Profile];

    pub fn index(self) -> Option<usize> {
        Self::ALL.iter().position(|step| *step == self)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Verify => "verify",
            Self::Profile => "profile",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type CompletionCallback = Box<dyn FnMut(&CreatedProfile) + Send>;

pub struct RegistrationFlow {
    schema: &'static ProfileSchema,
    api: Arc<dyn ProfileApi>,
    codes: Arc<dyn CodeIssuer>,
    step: RegistrationStep,
    draft: RegistrationDraft,
    verification: Option<VerificationGate>,
    photos: PhotoStaging,
    on_submitted: Option<CompletionCallback>,
    events: broadcast::Sender<FlowEvent>,
}

impl RegistrationFlow {
    pub fn new(kind: ProfileKind, api: Arc<dyn ProfileApi>) -> Self {
        Self::new_with_dependencies(kind, api, Arc::new(FixedCodeIssuer::default()))
    }

    /// Opens a flow at the credentials step with an empty draft.
    pub fn new_with_dependencies(
        kind: ProfileKind,
        api: Arc<dyn ProfileApi>,
        codes: Arc<dyn CodeIssuer>,
    ) -> Self {
        let schema = schema_for(kind);
        let (events, _) = broadcast::channel(64);
        Self {
            schema,
            api,
            codes,
            step: RegistrationStep::Initial,
            draft: RegistrationDraft::default(),
            verification: None,
            photos: PhotoStaging::new(schema.photo_capacity),
            on_submitted: None,
            events,
        }
    }

    /// Runs after every successful submission, before the flow resets.
    pub fn set_on_submitted(&mut self, callback: impl FnMut(&CreatedProfile) + Send + 'static) {
        self.on_submitted = Some(Box::new(callback));
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub fn kind(&self) -> ProfileKind {
        self.schema.kind
    }

    pub fn step(&self) -> RegistrationStep {
        self.step
    }

    pub fn is_open(&self) -> bool {
        self.step != RegistrationStep::Closed
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut RegistrationDraft {
        &mut self.draft
    }

    pub fn photos(&self) -> &PhotoStaging {
        &self.photos
    }

    pub fn photos_mut(&mut self) -> &mut PhotoStaging {
        &mut self.photos
    }

    pub fn verification(&self) -> Option<&VerificationGate> {
        self.verification.as_ref()
    }

    /// Reopens a closed flow at the credentials step. No-op while open.
    pub fn open(&mut self) {
        if self.step == RegistrationStep::Closed {
            self.reset();
            self.step = RegistrationStep::Initial;
        }
    }

    pub fn submit_initial(&mut self) -> Result<(), FlowError> {
        self.expect_step(RegistrationStep::Initial)?;
        if let Err(err) = self.schema.validate_credentials(&self.draft) {
            return Err(self.fail(err));
        }

        let phone = self.draft.phone.trim().to_string();
        self.verification = Some(VerificationGate::start(self.codes.as_ref(), &phone));
        self.step = RegistrationStep::Verify;
        info!(kind = %self.kind(), "verification code dispatched");
        let _ = self.events.send(FlowEvent::CodeSent { phone });
        Ok(())
    }

    pub fn enter_code(&mut self, code: impl Into<String>) -> Result<(), FlowError> {
        self.expect_step(RegistrationStep::Verify)?;
        if let Some(gate) = self.verification.as_mut() {
            gate.enter(code);
        }
        Ok(())
    }

    pub fn submit_code(&mut self) -> Result<(), FlowError> {
        self.expect_step(RegistrationStep::Verify)?;
        let checked = match &self.verification {
            Some(gate) => gate.check(),
            None => Err(FlowError::CodeMismatch),
        };
        if let Err(err) = checked {
            return Err(self.fail(err));
        }

        self.verification = None;
        self.step = RegistrationStep::Profile;
        info!(kind = %self.kind(), "phone verified");
        let _ = self.events.send(FlowEvent::PhoneVerified);
        Ok(())
    }

    /// Validates and posts the profile. On failure every field and photo is
    /// kept so the user can retry as is.
    pub async fn submit_profile(&mut self) -> Result<CreatedProfile, FlowError> {
        self.expect_step(RegistrationStep::Profile)?;
        if let Err(err) = self.schema.validate_profile(&self.draft) {
            return Err(self.fail(err));
        }
        let cover = match self.photos.encode_cover() {
            Ok(cover) => cover,
            Err(err) => return Err(self.fail(err)),
        };

        let kind = self.kind();
        let request = self.draft.to_request(kind, cover);
        let created = match self.api.create_profile(kind, &request).await {
            Ok(created) => created,
            Err(source) => {
                error!(%kind, "profile submission failed: {source:#}");
                return Err(self.fail(FlowError::Submission { source }));
            }
        };

        info!(%kind, id = %created.id, "profile created");
        if let Some(callback) = self.on_submitted.as_mut() {
            callback(&created);
        }
        let _ = self.events.send(FlowEvent::ProfileSubmitted {
            kind,
            id: created.id,
        });
        self.close();
        Ok(created)
    }

    /// Drops everything entered so far. Never touches the network.
    pub fn cancel(&mut self) {
        if self.step != RegistrationStep::Closed {
            info!(kind = %self.kind(), step = %self.step, "registration cancelled");
        }
        self.close();
    }

    fn close(&mut self) {
        self.reset();
        self.step = RegistrationStep::Closed;
        let _ = self.events.send(FlowEvent::Closed);
    }

    fn reset(&mut self) {
        self.draft = RegistrationDraft::default();
        self.verification = None;
        self.photos.clear();
    }

    fn expect_step(&self, expected: RegistrationStep) -> Result<(), FlowError> {
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
        warn!(kind = %self.kind(), step = %self.step, "registration step rejected: {err}");
        let _ = self.events.send(FlowEvent::Failed {
            message: err.to_string(),
        });
        err
    }
}

#[cfg(test)]
#[path = "tests/registration_tests.rs"]
mod tests;
