use crate::error::ProfileError;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 120;

/// A matrimonial profile as stored and served over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub caste: String,
    pub sub_caste: String,
    pub location: String,
    pub education: String,
    pub occupation: String,
    pub avatar: String,
    pub interests: Vec<String>,
    pub phone: String,
    pub email: String,
}

/// Body of `POST /api/profiles`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProfile {
    pub name: String,
    pub age: Option<u32>,
    pub gender: String,
    pub caste: String,
    pub sub_caste: String,
    pub location: String,
    pub education: String,
    pub occupation: String,
    pub avatar: String,
    pub interests: Vec<String>,
    pub phone: String,
    pub email: String,
}

impl NewProfile {
    /// Validate and assign a fresh id.
    pub fn into_profile(self) -> Result<Profile, ProfileError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ProfileError::Validation("name is required".to_string()));
        }
        let age = self
            .age
            .ok_or_else(|| ProfileError::Validation("age is required".to_string()))?;
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(ProfileError::Validation(format!(
                "age must be between {MIN_AGE} and {MAX_AGE}"
            )));
        }

        Ok(Profile {
            id: Uuid::new_v4(),
            name,
            age,
            gender: self.gender,
            caste: self.caste,
            sub_caste: self.sub_caste,
            location: self.location,
            education: self.education,
            occupation: self.occupation,
            avatar: self.avatar,
            interests: self.interests,
            phone: self.phone,
            email: self.email,
        })
    }
}

/// Age bucket offered by the profile list filter.  `max: None` is open-ended ("36+").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: Option<u32>,
}

impl AgeRange {
    pub fn contains(&self, age: u32) -> bool {
        age >= self.min && self.max.map_or(true, |max| age <= max)
    }
}

impl FromStr for AgeRange {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProfileError::Validation(format!("invalid age range: {s:?}"));
        // An unescaped "36+" reaches us as "36 ", so a bare lower bound is open-ended too.
        let s = s.trim();
        let s = s.strip_suffix('+').unwrap_or(s);
        let (min, max) = match s.split_once('-') {
            Some((min, max)) => (min, Some(max)),
            None => (s, None),
        };
        let min: u32 = min.trim().parse().map_err(|_| invalid())?;
        let max: Option<u32> = match max {
            Some(max) => Some(max.trim().parse().map_err(|_| invalid())?),
            None => None,
        };
        if max.map_or(false, |max| max < min) {
            return Err(invalid());
        }
        Ok(Self { min, max })
    }
}

/// Query parameters of `GET /api/profiles`.  Missing fields and the literal `all` match everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileFilterParams {
    pub gender: Option<String>,
    pub caste: Option<String>,
    pub age_range: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFilter {
    pub gender: Option<String>,
    pub caste: Option<String>,
    pub age_range: Option<AgeRange>,
    /// Lowercased name fragment.
    pub search: Option<String>,
}

fn unless_all(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl TryFrom<ProfileFilterParams> for ProfileFilter {
    type Error = ProfileError;

    fn try_from(params: ProfileFilterParams) -> Result<Self, Self::Error> {
        let age_range = match unless_all(params.age_range) {
            Some(range) => Some(range.parse()?),
            None => None,
        };
        Ok(Self {
            gender: unless_all(params.gender),
            caste: unless_all(params.caste),
            age_range,
            search: params
                .q
                .map(|q| q.trim().to_lowercase())
                .filter(|q| !q.is_empty()),
        })
    }
}

impl ProfileFilter {
    pub fn matches(&self, profile: &Profile) -> bool {
        self.gender.as_ref().map_or(true, |g| &profile.gender == g)
            && self.caste.as_ref().map_or(true, |c| &profile.caste == c)
            && self.age_range.map_or(true, |r| r.contains(profile.age))
            && self
                .search
                .as_ref()
                .map_or(true, |q| profile.name.to_lowercase().contains(q.as_str()))
    }
}
