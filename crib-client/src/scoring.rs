use std::cmp::Reverse;
use std::collections::HashSet;

use crib_common::Profile;

/// Number of lifestyle tags plus professional tags the two profiles share.
pub fn affinity_score(candidate: &Profile, user: &Profile) -> usize {
    overlap(&candidate.lifestyle_tags, &user.lifestyle_tags)
        + overlap(&candidate.professional_tags, &user.professional_tags)
}

pub fn shares_any_tag(candidate: &Profile, user: &Profile) -> bool {
    candidate.lifestyle_tags.iter().any(|tag| user.lifestyle_tags.contains(tag))
        || candidate
            .professional_tags
            .iter()
            .any(|tag| user.professional_tags.contains(tag))
}

/// Orders candidates by descending affinity. Equal scores keep fetch order.
pub fn rank(mut candidates: Vec<Profile>, user: &Profile) -> Vec<Profile> {
    candidates.sort_by_key(|candidate| Reverse(affinity_score(candidate, user)));
    candidates
}

fn overlap(theirs: &[String], ours: &[String]) -> usize {
    let ours: HashSet<&str> = ours.iter().map(String::as_str).collect();
    let theirs: HashSet<&str> = theirs.iter().map(String::as_str).collect();
    theirs.intersection(&ours).count()
}
