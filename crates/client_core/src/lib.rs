use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ProfileId, ProfileKind, ReviewId},
    error::ApiException,
    protocol::{
        CreateProfileRequest, CreatedProfile, ListingQuery, ListingResponse, ReviewRecord,
        ReviewRequest,
    },
};
use tracing::debug;

pub mod config;
pub mod draft;
pub mod error;
pub mod listing;
pub mod photos;
pub mod registration;
pub mod review;
pub mod verification;

pub use config::{load_settings, load_settings_from, ClientSettings};
pub use error::{FlowError, FlowErrorKind};
pub use listing::{ListingController, ListingFilter, LoadOutcome, ProfileSummary, PAGE_SIZE};
pub use registration::{RegistrationFlow, RegistrationStep};
pub use review::{ReviewFlow, ReviewStep};

/// Remote directory API. Everything durable lives behind it.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn create_profile(
        &self,
        kind: ProfileKind,
        request: &CreateProfileRequest,
    ) -> Result<CreatedProfile>;
    async fn search_profiles(&self, query: &ListingQuery) -> Result<ListingResponse>;
    async fn submit_review(&self, request: &ReviewRequest) -> Result<ReviewRecord>;
}

/// Notifications a flow raises for whoever renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    CodeSent { phone: String },
    PhoneVerified,
    ProfileSubmitted { kind: ProfileKind, id: ProfileId },
    ReviewPublished { id: ReviewId },
    Failed { message: String },
    Closed,
}

pub struct HttpProfileApi {
    http: Client,
    settings: ClientSettings,
}

impl HttpProfileApi {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        settings.validate()?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, settings })
    }
}

#[async_trait]
impl ProfileApi for HttpProfileApi {
    async fn create_profile(
        &self,
        kind: ProfileKind,
        request: &CreateProfileRequest,
    ) -> Result<CreatedProfile> {
        let url = self.settings.registration_url(kind);
        debug!(%kind, url, "posting profile registration");
        let res = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;
        read_json(res).await
    }

    async fn search_profiles(&self, query: &ListingQuery) -> Result<ListingResponse> {
        let url = &self.settings.listing_url;
        debug!(kind = query.kind, page = query.page, "fetching profile page");
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;
        read_json(res).await
    }

    async fn submit_review(&self, request: &ReviewRequest) -> Result<ReviewRecord> {
        let url = &self.settings.review_url;
        let res = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;
        read_json(res).await
    }
}

async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(ApiException::from_body(status.as_u16(), &body).into());
    }
    res.json::<T>()
        .await
        .with_context(|| format!("malformed response body (HTTP {status})"))
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
