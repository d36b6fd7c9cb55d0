//! In-memory `ProfileApi` used by the controller tests.

use std::collections::VecDeque;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{ProfileId, ProfileKind, ReviewId},
    protocol::{
        CreateProfileRequest, CreatedProfile, ListingQuery, ListingResponse, RawProfile,
        ReviewRecord, ReviewRequest,
    },
};
use tokio::sync::Mutex;

use crate::ProfileApi;

#[derive(Default)]
pub(crate) struct FakeProfileApi {
    pub created: Mutex<Vec<(ProfileKind, CreateProfileRequest)>>,
    pub searches: Mutex<Vec<ListingQuery>>,
    pub reviews: Mutex<Vec<ReviewRequest>>,
    pub fail_with: Mutex<Option<String>>,
    pub pages: Mutex<VecDeque<Result<ListingResponse, String>>>,
}

impl FakeProfileApi {
    /// The next create or review call fails with `message`; later calls succeed.
    pub async fn fail_next(&self, message: &str) {
        *self.fail_with.lock().await = Some(message.to_string());
    }

    pub async fn push_page(&self, page: Result<ListingResponse, String>) {
        self.pages.lock().await.push_back(page);
    }

    pub async fn created_count(&self) -> usize {
        self.created.lock().await.len()
    }
}

#[async_trait]
impl ProfileApi for FakeProfileApi {
    async fn create_profile(
        &self,
        kind: ProfileKind,
        request: &CreateProfileRequest,
    ) -> Result<CreatedProfile> {
        let mut created = self.created.lock().await;
        created.push((kind, request.clone()));
        if let Some(err) = self.fail_with.lock().await.take() {
            return Err(anyhow!(err));
        }
        Ok(CreatedProfile {
            id: ProfileId(100 + created.len() as i64),
            full_name: Some(request.full_name.clone()),
            phone: Some(request.phone.clone()),
            city: Some(request.city.clone()),
            created_at: Some("2024-05-01T12:00:00".to_string()),
        })
    }

    async fn search_profiles(&self, query: &ListingQuery) -> Result<ListingResponse> {
        self.searches.lock().await.push(query.clone());
        match self.pages.lock().await.pop_front() {
            Some(Ok(page)) => Ok(page),
            Some(Err(err)) => Err(anyhow!(err)),
            None => Ok(ListingResponse {
                profiles: Vec::new(),
                pagination: None,
            }),
        }
    }

    async fn submit_review(&self, request: &ReviewRequest) -> Result<ReviewRecord> {
        let mut reviews = self.reviews.lock().await;
        reviews.push(request.clone());
        if let Some(err) = self.fail_with.lock().await.take() {
            return Err(anyhow!(err));
        }
        Ok(ReviewRecord {
            id: ReviewId(reviews.len() as i64),
            model_id: request.model_id,
            author_name: request.author_name.clone(),
            rating: request.rating,
            review_text: request.review_text.clone(),
            created_at: None,
        })
    }
}

pub(crate) fn raw_profile(id: i64) -> RawProfile {
    RawProfile {
        id: ProfileId(id),
        full_name: Some(format!("Profile {id}")),
        city: Some("Москва".to_string()),
        age: None,
        height: None,
        gender: None,
        specializations: Some(vec!["Fashion".to_string(), "Beauty".to_string()]),
        openness_level: None,
        cooperation_format: None,
        price_range: None,
        experience_years: None,
        profile_photo_url: Some(format!("https://cdn.example.com/{id}.jpg")),
        last_login: None,
    }
}

/// A page holding `count` profiles numbered from `first_id`.
pub(crate) fn page_of(first_id: i64, count: usize) -> ListingResponse {
    ListingResponse {
        profiles: (0..count as i64).map(|i| raw_profile(first_id + i)).collect(),
        pagination: None,
    }
}
