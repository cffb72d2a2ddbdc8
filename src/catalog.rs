//! Fixed choices offered during registration.

pub const LIFESTYLE_TAGS: [&str; 12] = [
    "Early Bird", "Night Owl", "Clean Freak", "Social Butterfly",
    "Homebody", "Fitness Enthusiast", "Foodie", "Pet Lover",
    "Music Lover", "Gamer", "Bookworm", "Outdoorsy",
];

pub const PROFESSIONAL_TAGS: [&str; 12] = [
    "Tech", "Finance", "Marketing", "Design",
    "Engineering", "Healthcare", "Education", "Entrepreneur",
    "Research", "Consulting", "Startup", "Corporate",
];

pub const CITIES: [&str; 10] = [
    "San Francisco, CA",
    "New York City, NY",
    "Seattle, WA",
    "Los Angeles, CA",
    "Chicago, IL",
    "Boston, MA",
    "Austin, TX",
    "Denver, CO",
    "Washington, DC",
    "San Jose, CA",
];

/// `(avatar id, label)` pairs.
pub const AVATARS: [(&str, &str); 5] = [
    ("avatar1", "Professional"),
    ("avatar2", "Creative"),
    ("avatar3", "Adventurous"),
    ("avatar4", "Friendly"),
    ("avatar5", "Analytical"),
];

pub fn is_known_avatar(id: &str) -> bool {
    AVATARS.iter().any(|(known, _)| *known == id)
}
