use crate::core::dealbreakers;
use crate::core::distance::distance_between;
use crate::models::UserProfile;

/// Gender interest must hold both ways: the seeker wants the candidate's
/// gender and the candidate wants the seeker's.
#[inline]
pub fn mutual_gender_interest(seeker: &UserProfile, candidate: &UserProfile) -> bool {
    seeker.interested_in.contains(&candidate.gender)
        && candidate.interested_in.contains(&seeker.gender)
}

/// Each side's age must fall inside the other's acceptable range.
#[inline]
pub fn mutual_age_ok(seeker: &UserProfile, candidate: &UserProfile) -> bool {
    if seeker.age == 0 || candidate.age == 0 {
        return false; // missing birth date
    }
    candidate.age >= seeker.min_age
        && candidate.age <= seeker.max_age
        && seeker.age >= candidate.min_age
        && seeker.age <= candidate.max_age
}

/// Distance must not exceed the smaller of the two users' search radii.
/// Skipped entirely when either side has no location set.
#[inline]
pub fn within_mutual_distance(seeker: &UserProfile, candidate: &UserProfile) -> bool {
    match distance_between(seeker.location, candidate.location) {
        Some(distance) => {
            distance <= f64::from(seeker.max_distance_km.min(candidate.max_distance_km))
        }
        None => true,
    }
}

/// Dealbreakers apply in both directions: the seeker's against the
/// candidate and the candidate's against the seeker.
#[inline]
pub fn mutual_dealbreakers_ok(seeker: &UserProfile, candidate: &UserProfile) -> bool {
    dealbreakers::passes(seeker, candidate) && dealbreakers::passes(candidate, seeker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountState, Dealbreakers, Gender, GeoPoint};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn profile(gender: Gender, interested_in: &[Gender], age: u8) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            gender,
            interested_in: interested_in.iter().copied().collect::<HashSet<_>>(),
            age,
            location: Some(GeoPoint {
                lat: 40.7128,
                lon: -74.0060,
            }),
            max_distance_km: 50,
            min_age: 18,
            max_age: 99,
            lifestyle: Default::default(),
            dealbreakers: Dealbreakers::none(),
            state: AccountState::Active,
        }
    }

    #[test]
    fn gender_interest_must_be_mutual() {
        let seeker = profile(Gender::Male, &[Gender::Female], 30);
        let interested_back = profile(Gender::Female, &[Gender::Male], 28);
        let not_interested_back = profile(Gender::Female, &[Gender::Female], 28);

        assert!(mutual_gender_interest(&seeker, &interested_back));
        assert!(!mutual_gender_interest(&seeker, &not_interested_back));
    }

    #[test]
    fn age_ranges_apply_both_ways() {
        let mut seeker = profile(Gender::Male, &[Gender::Female], 45);
        seeker.min_age = 30;
        seeker.max_age = 50;

        let mut candidate = profile(Gender::Female, &[Gender::Male], 35);
        candidate.min_age = 30;
        candidate.max_age = 40; // seeker's 45 is outside

        assert!(!mutual_age_ok(&seeker, &candidate));

        candidate.max_age = 50;
        assert!(mutual_age_ok(&seeker, &candidate));
    }

    #[test]
    fn distance_uses_smaller_radius() {
        let mut seeker = profile(Gender::Male, &[Gender::Female], 30);
        let mut candidate = profile(Gender::Female, &[Gender::Male], 30);
        // ~87km apart
        candidate.location = Some(GeoPoint {
            lat: 41.49,
            lon: -74.01,
        });

        seeker.max_distance_km = 100;
        candidate.max_distance_km = 100;
        assert!(within_mutual_distance(&seeker, &candidate));

        candidate.max_distance_km = 50;
        assert!(!within_mutual_distance(&seeker, &candidate));
    }

    #[test]
    fn missing_location_skips_distance_filter() {
        let seeker = profile(Gender::Male, &[Gender::Female], 30);
        let mut remote = profile(Gender::Female, &[Gender::Male], 30);
        remote.location = None;

        assert!(within_mutual_distance(&seeker, &remote));
    }
}
