//! Paginated, filterable directory listing.
//!
//! Every load is numbered. Only the completion matching the newest number may
//! touch the list or the loading flag, so a slow response to an older request
//! can never overwrite a newer one.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::{
    domain::{CooperationFormat, OpennessLevel, ProfileId, ProfileKind},
    protocol::{ListingQuery, ListingResponse, RawProfile},
};
use tracing::{debug, error, info};

use crate::ProfileApi;

pub const PAGE_SIZE: usize = 20;

/// Optional search predicates. `None` leaves a dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub id: Option<ProfileId>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub gender: Option<String>,
    pub min_height: Option<u32>,
    pub max_height: Option<u32>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub openness_level: Option<OpennessLevel>,
    pub cooperation_format: Option<CooperationFormat>,
    pub specialization: Option<String>,
}

impl ListingFilter {
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_query(&self, kind: ProfileKind, page: u32) -> ListingQuery {
        let mut query = ListingQuery::new(kind, page);
        query.id = self.id;
        query.name = text(&self.name);
        query.city = text(&self.city);
        query.gender = text(&self.gender);
        query.min_height = self.min_height;
        query.max_height = self.max_height;
        query.min_age = self.min_age;
        query.max_age = self.max_age;
        query.openness_level = self.openness_level;
        query.cooperation_format = self.cooperation_format;
        query.specialization = text(&self.specialization);
        query
    }
}

fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One card in the listing grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub id: ProfileId,
    pub display_name: String,
    pub city: String,
    pub tag_summary: String,
    pub cover_image_ref: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl From<RawProfile> for ProfileSummary {
    fn from(raw: RawProfile) -> Self {
        let tag_summary = match raw.specializations.filter(|tags| !tags.is_empty()) {
            Some(tags) => tags.join(", "),
            None => [raw.openness_level, raw.cooperation_format]
                .into_iter()
                .flatten()
                .filter(|value| !value.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };
        Self {
            id: raw.id,
            display_name: raw.full_name.unwrap_or_default(),
            city: raw.city.unwrap_or_default(),
            tag_summary,
            cover_image_ref: raw.profile_photo_url,
            last_activity: raw.last_login,
        }
    }
}

/// A load that has been started but whose response has not been applied.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    generation: u64,
    page: u32,
    replace: bool,
    query: ListingQuery,
}

impl PendingLoad {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn query(&self) -> &ListingQuery {
        &self.query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { received: usize },
    /// A newer load was started before this one finished.
    Stale,
    Failed,
}

pub struct ListingController {
    api: Arc<dyn ProfileApi>,
    kind: ProfileKind,
    filter: ListingFilter,
    profiles: Vec<ProfileSummary>,
    page: u32,
    has_more: bool,
    loading: bool,
    total: Option<u64>,
    generation: u64,
}

impl ListingController {
    pub fn new(kind: ProfileKind, api: Arc<dyn ProfileApi>) -> Self {
        Self {
            api,
            kind,
            filter: ListingFilter::default(),
            profiles: Vec::new(),
            page: 1,
            has_more: false,
            loading: false,
            total: None,
            generation: 0,
        }
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn filter(&self) -> &ListingFilter {
        &self.filter
    }

    pub fn profiles(&self) -> &[ProfileSummary] {
        &self.profiles
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Total hit count when the server reported one with the last page.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Marks a load as in flight. Any load started earlier becomes stale.
    pub fn prepare_load(&mut self, page: u32, replace: bool) -> PendingLoad {
        self.generation += 1;
        self.loading = true;
        PendingLoad {
            generation: self.generation,
            page,
            replace,
            query: self.filter.to_query(self.kind, page),
        }
    }

    pub fn apply_load(
        &mut self,
        pending: PendingLoad,
        result: Result<ListingResponse>,
    ) -> LoadOutcome {
        if pending.generation != self.generation {
            debug!(
                kind = %self.kind,
                page = pending.page,
                generation = pending.generation,
                current = self.generation,
                "discarding stale listing response"
            );
            return LoadOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(response) => {
                let received = response.profiles.len();
                let mapped = response.profiles.into_iter().map(ProfileSummary::from);
                if pending.replace {
                    self.profiles = mapped.collect();
                } else {
                    self.profiles.extend(mapped);
                }
                self.page = pending.page;
                self.has_more = received >= PAGE_SIZE;
                self.total = response.pagination.map(|p| p.total);
                debug!(kind = %self.kind, page = pending.page, received, "listing page applied");
                LoadOutcome::Applied { received }
            }
            Err(err) => {
                error!(kind = %self.kind, page = pending.page, "failed to load profiles: {err:#}");
                LoadOutcome::Failed
            }
        }
    }

    /// Fetches `page`. Dropping the returned future before it completes
    /// clears the loading flag and leaves the list as it was.
    pub async fn load_page(&mut self, page: u32, replace: bool) -> LoadOutcome {
        let pending = self.prepare_load(page, replace);
        let api = Arc::clone(&self.api);
        let in_flight = InFlight {
            controller: self,
            generation: pending.generation,
            settled: false,
        };
        let result = api.search_profiles(pending.query()).await;
        in_flight.settle(pending, result)
    }

    pub async fn reload(&mut self) -> LoadOutcome {
        self.load_page(1, true).await
    }

    /// Appends the next page. Does nothing while loading or at the end.
    pub async fn load_more(&mut self) -> Option<LoadOutcome> {
        if self.loading || !self.has_more {
            return None;
        }
        Some(self.load_page(self.page + 1, false).await)
    }

    pub async fn apply_filters(&mut self, filter: ListingFilter) -> LoadOutcome {
        info!(kind = %self.kind, "applying listing filters");
        self.filter = filter;
        self.reset_list();
        self.load_page(1, true).await
    }

    /// Unconstrains the filter. Reloading is left to the caller.
    pub fn clear_filters(&mut self) {
        self.filter = ListingFilter::default();
    }

    pub async fn switch_category(&mut self, kind: ProfileKind) -> LoadOutcome {
        info!(from = %self.kind, to = %kind, "switching listing category");
        self.kind = kind;
        self.filter = ListingFilter::default();
        self.reset_list();
        self.load_page(1, true).await
    }

    fn reset_list(&mut self) {
        self.profiles.clear();
        self.page = 1;
        self.has_more = false;
        self.total = None;
    }
}

/// Owns the controller while a load is awaited.
struct InFlight<'a> {
    controller: &'a mut ListingController,
    generation: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, pending: PendingLoad, result: Result<ListingResponse>) -> LoadOutcome {
        self.settled = true;
        self.controller.apply_load(pending, result)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled && self.controller.generation == self.generation {
            self.controller.loading = false;
            debug!(
                kind = %self.controller.kind,
                generation = self.generation,
                "listing load abandoned"
            );
        }
    }
}

#[cfg(test)]
#[path = "tests/listing_tests.rs"]
mod tests;
