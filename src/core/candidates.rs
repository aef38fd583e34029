use std::collections::HashSet;
use uuid::Uuid;

use crate::core::distance::distance_between;
use crate::core::filters::{
    mutual_age_ok, mutual_dealbreakers_ok, mutual_gender_interest, within_mutual_distance,
};
use crate::models::UserProfile;
use serde::{Deserialize, Serialize};

/// An eligible candidate and their distance from the seeker
/// (`None` when either side has no location).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub profile: UserProfile,
    pub distance_km: Option<f64>,
}

/// True when the pair is viable in both directions: mutual gender interest,
/// mutual age ranges, mutual distance cap, and both users' dealbreakers.
pub fn is_eligible(seeker: &UserProfile, candidate: &UserProfile) -> bool {
    candidate.is_active()
        && mutual_gender_interest(seeker, candidate)
        && mutual_age_ok(seeker, candidate)
        && within_mutual_distance(seeker, candidate)
        && mutual_dealbreakers_ok(seeker, candidate)
}

/// Filter an active-user pool down to the seeker's viable candidates,
/// sorted nearest first (locationless pairs last).
///
/// `excluded` carries everyone the seeker must never see again:
/// already-swiped users and blocked users. The seeker is always excluded.
///
/// Callers may pre-trim `pool` with a bounding box for performance; that
/// prefilter is a conservative over-approximation and this function remains
/// the source of truth for eligibility.
pub fn find_candidates(
    seeker: &UserProfile,
    pool: &[UserProfile],
    excluded: &HashSet<Uuid>,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = pool
        .iter()
        .filter(|candidate| candidate.id != seeker.id)
        .filter(|candidate| !excluded.contains(&candidate.id))
        .filter(|candidate| is_eligible(seeker, candidate))
        .map(|candidate| Candidate {
            profile: candidate.clone(),
            distance_km: distance_between(seeker.location, candidate.location),
        })
        .collect();

    candidates.sort_by(|a, b| {
        let da = a.distance_km.unwrap_or(f64::INFINITY);
        let db = b.distance_km.unwrap_or(f64::INFINITY);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountState, Dealbreakers, Gender, GeoPoint, Smoking};

    fn profile(id: Uuid, gender: Gender, interested_in: Gender, age: u8) -> UserProfile {
        UserProfile {
            id,
            name: format!("User {id}"),
            gender,
            interested_in: HashSet::from([interested_in]),
            age,
            location: Some(GeoPoint {
                lat: 40.7128,
                lon: -74.0060,
            }),
            max_distance_km: 50,
            min_age: 20,
            max_age: 40,
            lifestyle: Default::default(),
            dealbreakers: Dealbreakers::none(),
            state: AccountState::Active,
        }
    }

    fn seeker() -> UserProfile {
        profile(Uuid::new_v4(), Gender::Male, Gender::Female, 30)
    }

    #[test]
    fn basic_filtering() {
        let seeker = seeker();
        let good = profile(Uuid::new_v4(), Gender::Female, Gender::Male, 28);
        let too_old = profile(Uuid::new_v4(), Gender::Female, Gender::Male, 45);
        let wrong_gender = profile(Uuid::new_v4(), Gender::Male, Gender::Male, 28);

        let pool = vec![good.clone(), too_old, wrong_gender];
        let found = find_candidates(&seeker, &pool, &HashSet::new());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].profile.id, good.id);
        assert!(found[0].distance_km.unwrap() < 0.1);
    }

    #[test]
    fn excluded_and_self_never_returned() {
        let seeker = seeker();
        let swiped = profile(Uuid::new_v4(), Gender::Female, Gender::Male, 28);

        let pool = vec![seeker.clone(), swiped.clone()];
        let excluded = HashSet::from([swiped.id]);

        assert!(find_candidates(&seeker, &pool, &excluded).is_empty());
    }

    #[test]
    fn inactive_accounts_are_filtered() {
        let seeker = seeker();
        let mut banned = profile(Uuid::new_v4(), Gender::Female, Gender::Male, 28);
        banned.state = AccountState::Banned;
        let mut incomplete = profile(Uuid::new_v4(), Gender::Female, Gender::Male, 28);
        incomplete.state = AccountState::Incomplete;

        let pool = vec![banned, incomplete];
        assert!(find_candidates(&seeker, &pool, &HashSet::new()).is_empty());
    }

    #[test]
    fn dealbreakers_filter_in_both_directions() {
        let mut seeker = seeker();
        seeker.lifestyle.smoking = Some(Smoking::Regularly);

        // Candidate accepts only non-smokers; the seeker smokes, so even
        // though the seeker has no dealbreakers the pair is not viable.
        let mut candidate = profile(Uuid::new_v4(), Gender::Female, Gender::Male, 28);
        candidate.dealbreakers.acceptable_smoking = HashSet::from([Smoking::Never]);

        let pool = vec![candidate];
        assert!(find_candidates(&seeker, &pool, &HashSet::new()).is_empty());
    }

    #[test]
    fn sorted_by_distance_closest_first() {
        let seeker = seeker();

        let mut near = profile(Uuid::new_v4(), Gender::Female, Gender::Male, 28);
        near.location = Some(GeoPoint {
            lat: 40.72,
            lon: -74.01,
        });
        let mut far = profile(Uuid::new_v4(), Gender::Female, Gender::Male, 28);
        far.location = Some(GeoPoint {
            lat: 40.95,
            lon: -74.01,
        });
        let mut nowhere = profile(Uuid::new_v4(), Gender::Female, Gender::Male, 28);
        nowhere.location = None;

        let pool = vec![far.clone(), nowhere.clone(), near.clone()];
        let found = find_candidates(&seeker, &pool, &HashSet::new());

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].profile.id, near.id);
        assert_eq!(found[1].profile.id, far.id);
        assert_eq!(found[2].profile.id, nowhere.id);
        assert!(found[2].distance_km.is_none());
    }

    #[test]
    fn mutual_distance_cap_applies() {
        let seeker = seeker(); // max 50km

        // ~26km away but the candidate only searches within 10km.
        let mut cautious = profile(Uuid::new_v4(), Gender::Female, Gender::Male, 28);
        cautious.location = Some(GeoPoint {
            lat: 40.95,
            lon: -74.0060,
        });
        cautious.max_distance_km = 10;

        let pool = vec![cautious];
        assert!(find_candidates(&seeker, &pool, &HashSet::new()).is_empty());
    }
}
