use crate::models::{Dealbreakers, UserProfile};

/// Check whether `candidate` passes every dealbreaker `seeker` has set.
///
/// One-directional: the caller applies it both ways for mutual filtering.
/// A dealbreaker the seeker never set filters nothing, and an attribute the
/// candidate never filled in disqualifies nothing.
pub fn passes(seeker: &UserProfile, candidate: &UserProfile) -> bool {
    let db = &seeker.dealbreakers;

    if !db.has_any() {
        return true;
    }

    passes_smoking(db, candidate)
        && passes_drinking(db, candidate)
        && passes_kids(db, candidate)
        && passes_looking_for(db, candidate)
        && passes_education(db, candidate)
        && passes_height(db, candidate)
        && passes_age_difference(db, seeker, candidate)
}

#[inline]
fn passes_smoking(db: &Dealbreakers, candidate: &UserProfile) -> bool {
    if db.acceptable_smoking.is_empty() {
        return true;
    }
    match candidate.lifestyle.smoking {
        Some(value) => db.acceptable_smoking.contains(&value),
        None => true,
    }
}

#[inline]
fn passes_drinking(db: &Dealbreakers, candidate: &UserProfile) -> bool {
    if db.acceptable_drinking.is_empty() {
        return true;
    }
    match candidate.lifestyle.drinking {
        Some(value) => db.acceptable_drinking.contains(&value),
        None => true,
    }
}

#[inline]
fn passes_kids(db: &Dealbreakers, candidate: &UserProfile) -> bool {
    if db.acceptable_kids_stance.is_empty() {
        return true;
    }
    match candidate.lifestyle.wants_kids {
        Some(value) => db.acceptable_kids_stance.contains(&value),
        None => true,
    }
}

#[inline]
fn passes_looking_for(db: &Dealbreakers, candidate: &UserProfile) -> bool {
    if db.acceptable_looking_for.is_empty() {
        return true;
    }
    match candidate.lifestyle.looking_for {
        Some(value) => db.acceptable_looking_for.contains(&value),
        None => true,
    }
}

#[inline]
fn passes_education(db: &Dealbreakers, candidate: &UserProfile) -> bool {
    if db.required_education.is_empty() {
        return true;
    }
    match candidate.lifestyle.education {
        Some(value) => db.required_education.contains(&value),
        None => true,
    }
}

#[inline]
fn passes_height(db: &Dealbreakers, candidate: &UserProfile) -> bool {
    let Some(height) = candidate.lifestyle.height_cm else {
        return true;
    };
    if let Some(min) = db.min_height_cm {
        if height < min {
            return false;
        }
    }
    match db.max_height_cm {
        Some(max) => height <= max,
        None => true,
    }
}

#[inline]
fn passes_age_difference(db: &Dealbreakers, seeker: &UserProfile, candidate: &UserProfile) -> bool {
    let Some(max_diff) = db.max_age_difference else {
        return true;
    };
    // Age 0 means the birth date was never provided.
    if seeker.age == 0 || candidate.age == 0 {
        return true;
    }
    seeker.age.abs_diff(candidate.age) <= max_diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountState, Gender, Smoking, WantsKids};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            gender: Gender::Female,
            interested_in: HashSet::from([Gender::Male]),
            age: 30,
            location: None,
            max_distance_km: 50,
            min_age: 18,
            max_age: 99,
            lifestyle: Default::default(),
            dealbreakers: Dealbreakers::none(),
            state: AccountState::Active,
        }
    }

    #[test]
    fn no_dealbreakers_accepts_anyone() {
        assert!(passes(&profile(), &profile()));
    }

    #[test]
    fn smoking_dealbreaker_rejects_mismatch() {
        let mut seeker = profile();
        seeker.dealbreakers.acceptable_smoking = HashSet::from([Smoking::Never]);

        let mut smoker = profile();
        smoker.lifestyle.smoking = Some(Smoking::Regularly);
        assert!(!passes(&seeker, &smoker));

        let mut non_smoker = profile();
        non_smoker.lifestyle.smoking = Some(Smoking::Never);
        assert!(passes(&seeker, &non_smoker));
    }

    #[test]
    fn unset_attribute_never_disqualifies() {
        let mut seeker = profile();
        seeker.dealbreakers.acceptable_smoking = HashSet::from([Smoking::Never]);
        seeker.dealbreakers.acceptable_kids_stance = HashSet::from([WantsKids::Someday]);

        // Candidate with no lifestyle data at all still passes.
        assert!(passes(&seeker, &profile()));
    }

    #[test]
    fn height_range_is_inclusive() {
        let mut seeker = profile();
        seeker.dealbreakers.min_height_cm = Some(160);
        seeker.dealbreakers.max_height_cm = Some(180);

        let mut candidate = profile();
        candidate.lifestyle.height_cm = Some(180);
        assert!(passes(&seeker, &candidate));

        candidate.lifestyle.height_cm = Some(181);
        assert!(!passes(&seeker, &candidate));

        candidate.lifestyle.height_cm = None;
        assert!(passes(&seeker, &candidate));
    }

    #[test]
    fn age_difference_cap() {
        let mut seeker = profile();
        seeker.age = 30;
        seeker.dealbreakers.max_age_difference = Some(5);

        let mut candidate = profile();
        candidate.age = 36;
        assert!(!passes(&seeker, &candidate));

        candidate.age = 35;
        assert!(passes(&seeker, &candidate));

        // Unknown age is not penalized.
        candidate.age = 0;
        assert!(passes(&seeker, &candidate));
    }
}
