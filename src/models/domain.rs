use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Gender of a user, and the genders a user can be interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Lifecycle state of a user account. Only active accounts are matchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountState {
    Incomplete,
    Active,
    Banned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoking {
    Never,
    Sometimes,
    Regularly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Drinking {
    Never,
    Socially,
    Regularly,
}

/// Stance on having children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WantsKids {
    No,
    Open,
    Someday,
    HasKids,
}

/// Relationship goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookingFor {
    Casual,
    ShortTerm,
    LongTerm,
    Marriage,
    Unsure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    HighSchool,
    SomeCollege,
    Bachelors,
    Masters,
    Phd,
    TradeSchool,
    Other,
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Lifestyle attributes a user may fill in on their profile.
/// Every field is optional; an unset field never trips anyone's dealbreaker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lifestyle {
    pub smoking: Option<Smoking>,
    pub drinking: Option<Drinking>,
    pub wants_kids: Option<WantsKids>,
    pub looking_for: Option<LookingFor>,
    pub education: Option<Education>,
    pub height_cm: Option<u16>,
}

/// A user's hard filters. Candidates failing any set dealbreaker are
/// excluded from matching; an empty set means "no preference".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dealbreakers {
    pub acceptable_smoking: HashSet<Smoking>,
    pub acceptable_drinking: HashSet<Drinking>,
    pub acceptable_kids_stance: HashSet<WantsKids>,
    pub acceptable_looking_for: HashSet<LookingFor>,
    pub required_education: HashSet<Education>,
    pub min_height_cm: Option<u16>,
    pub max_height_cm: Option<u16>,
    pub max_age_difference: Option<u8>,
}

impl Dealbreakers {
    /// Accepts everyone.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has_any(&self) -> bool {
        !self.acceptable_smoking.is_empty()
            || !self.acceptable_drinking.is_empty()
            || !self.acceptable_kids_stance.is_empty()
            || !self.acceptable_looking_for.is_empty()
            || !self.required_education.is_empty()
            || self.min_height_cm.is_some()
            || self.max_height_cm.is_some()
            || self.max_age_difference.is_some()
    }
}

/// User profile with demographics, preferences, and hard filters.
///
/// Owned by the profile subsystem; this service only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub gender: Gender,
    pub interested_in: HashSet<Gender>,
    pub age: u8,
    /// Absent when the user never set a location; distance filtering is
    /// skipped for such users.
    pub location: Option<GeoPoint>,
    pub max_distance_km: u16,
    pub min_age: u8,
    pub max_age: u8,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(default)]
    pub dealbreakers: Dealbreakers,
    pub state: AccountState,
}

impl UserProfile {
    pub fn is_active(&self) -> bool {
        self.state == AccountState::Active
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dealbreakers_report_nothing_set() {
        assert!(!Dealbreakers::none().has_any());
    }

    #[test]
    fn single_dealbreaker_is_detected() {
        let db = Dealbreakers {
            max_age_difference: Some(5),
            ..Dealbreakers::none()
        };
        assert!(db.has_any());
    }

    #[test]
    fn profile_without_location_deserializes() {
        let json = serde_json::json!({
            "id": "6a38a0ea-0c0f-4c3e-8df0-5b6ba00a2c33",
            "name": "Sam",
            "gender": "other",
            "interestedIn": ["female"],
            "age": 29,
            "location": null,
            "maxDistanceKm": 50,
            "minAge": 21,
            "maxAge": 40,
            "state": "active"
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();
        assert!(!profile.has_location());
        assert!(profile.is_active());
        assert!(!profile.dealbreakers.has_any());
    }
}
