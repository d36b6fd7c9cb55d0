//! Editable registration data and the per-kind schema that decides which of
//! its fields must be filled before a transition is allowed.

use serde::Deserialize;
use shared::{
    domain::{CooperationFormat, OpennessLevel, ProfileKind},
    protocol::CreateProfileRequest,
};

use crate::error::FlowError;

pub const DEFAULT_CITY: &str = "Хабаровск";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Login,
    Password,
    Phone,
    Name,
    BirthDate,
    Email,
    City,
    Height,
    CooperationFormat,
    OpennessLevel,
    Tags,
}

impl DraftField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Password => "password",
            Self::Phone => "phone",
            Self::Name => "name",
            Self::BirthDate => "birth_date",
            Self::Email => "email",
            Self::City => "city",
            Self::Height => "height",
            Self::CooperationFormat => "cooperation_format",
            Self::OpennessLevel => "openness_level",
            Self::Tags => "tags",
        }
    }

    fn is_filled(self, draft: &RegistrationDraft) -> bool {
        match self {
            Self::Login => filled(&draft.login),
            Self::Password => filled(&draft.password),
            Self::Phone => filled(&draft.phone),
            Self::Name => filled(&draft.name),
            Self::BirthDate => filled(&draft.birth_date),
            Self::Email => filled(&draft.email),
            Self::City => filled(&draft.city),
            Self::Height => filled(&draft.height),
            Self::CooperationFormat => draft.cooperation_format.is_some(),
            Self::OpennessLevel => draft.openness_level.is_some(),
            Self::Tags => !draft.tags.is_empty(),
        }
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

const CREDENTIAL_FIELDS: &[DraftField] =
    &[DraftField::Login, DraftField::Password, DraftField::Phone];

/// What a profile kind asks for on the profile step.
#[derive(Debug)]
pub struct ProfileSchema {
    pub kind: ProfileKind,
    pub required: &'static [DraftField],
    pub photo_capacity: usize,
    pub rate_required_when_paid: bool,
}

pub static MODEL_SCHEMA: ProfileSchema = ProfileSchema {
    kind: ProfileKind::Model,
    required: &[
        DraftField::Name,
        DraftField::BirthDate,
        DraftField::Email,
        DraftField::City,
        DraftField::Height,
        DraftField::CooperationFormat,
        DraftField::OpennessLevel,
    ],
    photo_capacity: 20,
    rate_required_when_paid: true,
};

pub static PHOTOGRAPHER_SCHEMA: ProfileSchema = ProfileSchema {
    kind: ProfileKind::Photographer,
    required: &[
        DraftField::Name,
        DraftField::BirthDate,
        DraftField::Email,
        DraftField::City,
        DraftField::Tags,
    ],
    photo_capacity: 40,
    rate_required_when_paid: false,
};

pub fn schema_for(kind: ProfileKind) -> &'static ProfileSchema {
    match kind {
        ProfileKind::Model => &MODEL_SCHEMA,
        ProfileKind::Photographer => &PHOTOGRAPHER_SCHEMA,
    }
}

impl ProfileSchema {
    pub fn validate_credentials(&self, draft: &RegistrationDraft) -> Result<(), FlowError> {
        missing(CREDENTIAL_FIELDS, draft)
    }

    pub fn validate_profile(&self, draft: &RegistrationDraft) -> Result<(), FlowError> {
        missing(self.required, draft)?;
        if self.required.contains(&DraftField::Height) && draft.height_cm().is_none() {
            return Err(FlowError::InvalidNumber {
                field: DraftField::Height.name(),
                value: draft.height.trim().to_string(),
            });
        }
        if self.rate_required_when_paid
            && draft.cooperation_format == Some(CooperationFormat::Paid)
            && !filled(&draft.rate)
        {
            return Err(FlowError::RateRequired);
        }
        Ok(())
    }
}

fn missing(fields: &[DraftField], draft: &RegistrationDraft) -> Result<(), FlowError> {
    let absent: Vec<&'static str> = fields
        .iter()
        .copied()
        .filter(|field| !field.is_filled(draft))
        .map(DraftField::name)
        .collect();
    if absent.is_empty() {
        Ok(())
    } else {
        Err(FlowError::MissingFields { fields: absent })
    }
}

/// Everything a candidate can type into either registration flow.
///
/// `tags` holds model styles or photographer specializations; the server
/// stores both as `specializations`. Deserializes from a partial JSON
/// document; absent keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistrationDraft {
    pub login: String,
    pub password: String,
    pub phone: String,
    pub name: String,
    pub birth_date: String,
    pub email: String,
    pub city: String,
    pub gender: String,
    pub height: String,
    pub cooperation_format: Option<CooperationFormat>,
    pub rate: String,
    pub openness_level: Option<OpennessLevel>,
    pub tags: Vec<String>,
    pub working_formats: Vec<String>,
    pub experience: String,
    pub equipment: String,
    pub price_range: String,
    pub messenger: String,
    pub portfolio: String,
    pub instagram: String,
    pub vk: String,
    pub telegram: String,
    pub about: String,
    pub physical_features: String,
    pub sensitive_topics: String,
}

impl Default for RegistrationDraft {
    fn default() -> Self {
        Self {
            login: String::new(),
            password: String::new(),
            phone: String::new(),
            name: String::new(),
            birth_date: String::new(),
            email: String::new(),
            city: DEFAULT_CITY.to_string(),
            gender: String::new(),
            height: String::new(),
            cooperation_format: None,
            rate: String::new(),
            openness_level: None,
            tags: Vec::new(),
            working_formats: Vec::new(),
            experience: String::new(),
            equipment: String::new(),
            price_range: String::new(),
            messenger: String::new(),
            portfolio: String::new(),
            instagram: String::new(),
            vk: String::new(),
            telegram: String::new(),
            about: String::new(),
            physical_features: String::new(),
            sensitive_topics: String::new(),
        }
    }
}

impl RegistrationDraft {
    /// Height as a positive whole number of centimetres.
    pub fn height_cm(&self) -> Option<u32> {
        self.height.trim().parse().ok().filter(|cm| *cm > 0)
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        toggle(&mut self.tags, tag);
    }

    pub fn toggle_working_format(&mut self, format: &str) {
        toggle(&mut self.working_formats, format);
    }

    /// Shapes the draft into the registration body for `kind`.
    pub fn to_request(
        &self,
        kind: ProfileKind,
        cover_photo: Option<String>,
    ) -> CreateProfileRequest {
        let is_model = kind == ProfileKind::Model;
        let about = match kind {
            ProfileKind::Model => join_paragraphs(&[
                &self.about,
                &self.physical_features,
                &self.sensitive_topics,
            ]),
            ProfileKind::Photographer => self.about.trim().to_string(),
        };

        CreateProfileRequest {
            full_name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            city: self.city.trim().to_string(),
            experience_years: parse_experience_years(&self.experience),
            specializations: self.tags.clone(),
            equipment: self.equipment.trim().to_string(),
            portfolio_links: non_empty(&self.portfolio).into_iter().collect(),
            instagram: non_empty(&self.instagram),
            vk: non_empty(&self.vk),
            telegram: non_empty(&self.telegram),
            about_me: about,
            price_range: self.price_range.trim().to_string(),
            cooperation_format: self.cooperation_format.unwrap_or(CooperationFormat::Tfp),
            is_blocked: false,
            cover_photo,
            birth_date: is_model.then(|| non_empty(&self.birth_date)).flatten(),
            gender: is_model.then(|| non_empty(&self.gender)).flatten(),
            height: is_model.then(|| self.height_cm()).flatten(),
            openness_level: if is_model { self.openness_level } else { None },
            rate: is_model.then(|| non_empty(&self.rate)).flatten(),
            messenger: is_model.then(|| non_empty(&self.messenger)).flatten(),
            working_formats: if is_model {
                Vec::new()
            } else {
                self.working_formats.clone()
            },
        }
    }
}

fn toggle(values: &mut Vec<String>, value: &str) {
    if let Some(pos) = values.iter().position(|existing| existing == value) {
        values.remove(pos);
    } else {
        values.push(value.to_string());
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn join_paragraphs(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Leading integer of a free-text answer like "5 лет" or "10+", else 0.
pub fn parse_experience_years(raw: &str) -> u32 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
#[path = "tests/draft_tests.rs"]
mod tests;
