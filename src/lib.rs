pub mod catalog;
pub mod patch;
pub mod query;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use patch::{FieldOp, Patch};
pub use query::{Filter, Query};

/// Collection names shared by every backend.
pub mod collections {
    pub const USERS: &str = "users";
    pub const MATCHES: &str = "matches";
    pub const MESSAGES: &str = "messages";
}

/// Raw document body, keyed by field name.
pub type Document = Map<String, Value>;

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Debug, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Url(pub String);

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Debug, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl ProfileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl AsRef<ProfileId> for ProfileId {
    fn as_ref(&self) -> &ProfileId {
        self
    }
}
impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Debug, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MatchId(pub String);

impl MatchId {
    /// Key of the match record for two participants. Both sides of a pair
    /// derive the same key regardless of who liked first.
    pub fn for_pair(a: &ProfileId, b: &ProfileId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{}_{}", first.0, second.0))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Debug, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MessageId(pub String);

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Socials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub avatar_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub bio: String,
    pub photos: Vec<Url>,
    pub internship_city: String,
    pub internship_company: String,
    pub school: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grad_year: Option<u16>,
    pub search_radius: u32,
    pub looking_for_roommate: bool,
    pub lifestyle_tags: Vec<String>,
    pub professional_tags: Vec<String>,
    pub likes: Vec<ProfileId>,
    pub dislikes: Vec<ProfileId>,
    pub socials: Socials,
    #[serde(rename = "optedIntoIG")]
    pub opted_into_ig: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ig_caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn likes(&self, other: &ProfileId) -> bool {
        self.likes.contains(other)
    }
    /// Whether `other` already sits in either swipe history.
    pub fn has_swiped(&self, other: &ProfileId) -> bool {
        self.likes.contains(other) || self.dislikes.contains(other)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: MessageId,
    pub match_id: MatchId,
    pub sender_id: ProfileId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(default)]
    pub id: MatchId,
    pub users: Vec<ProfileId>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
}

impl Match {
    /// `liker` is the participant whose like completed the pair.
    pub fn new(liker: &ProfileId, liked: &ProfileId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: MatchId::for_pair(liker, liked),
            users: vec![liker.clone(), liked.clone()],
            created_at,
            last_message: None,
        }
    }
    pub fn involves(&self, id: &ProfileId) -> bool {
        self.users.contains(id)
    }
    pub fn other(&self, me: &ProfileId) -> Option<&ProfileId> {
        self.users.iter().find(|id| *id != me)
    }
}

/// A stored document together with its id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Snapshot {
    pub id: String,
    pub data: Document,
}

impl Snapshot {
    pub fn new(id: impl Into<String>, data: Document) -> Self {
        Self { id: id.into(), data }
    }
    /// Decodes the body into `T`, exposing the snapshot id as its `id` field.
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        let mut data = self.data.clone();
        data.insert(String::from("id"), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(data))
    }
}

/// Serializes `value` into a document body. The `id` field is dropped, ids
/// live beside the body and never inside it.
pub fn encode<T: Serialize>(value: &T) -> serde_json::Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(serde::ser::Error::custom(format!(
            "documents must serialize to an object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn match_key_is_order_independent() {
        let a = ProfileId(String::from("alice"));
        let b = ProfileId(String::from("bob"));
        assert_eq!(MatchId::for_pair(&a, &b), MatchId::for_pair(&b, &a));
        assert_eq!(MatchId::for_pair(&b, &a).0, "alice_bob");
    }

    #[test]
    fn snapshot_decode_fills_defaults_and_id() {
        let data = json!({ "name": "Sam", "internshipCity": "Austin, TX", "lifestyleTags": ["Gamer"] });
        let Value::Object(data) = data else { unreachable!() };
        let profile: Profile = Snapshot::new("u1", data).decode().unwrap();
        assert_eq!(profile.id.0, "u1");
        assert_eq!(profile.internship_city, "Austin, TX");
        assert!(profile.likes.is_empty());
        assert_eq!(profile.age, None);
    }

    #[test]
    fn encode_strips_id_and_absent_fields() {
        let profile = Profile {
            id: ProfileId(String::from("u1")),
            name: String::from("Sam"),
            ..Default::default()
        };
        let doc = encode(&profile).unwrap();
        assert!(!doc.contains_key("id"));
        assert!(!doc.contains_key("age"));
        assert!(!doc.contains_key("igCaption"));
        assert_eq!(doc["optedIntoIG"], json!(false));
    }

    #[test]
    fn match_other_participant() {
        let a = ProfileId(String::from("a"));
        let b = ProfileId(String::from("b"));
        let m = Match::new(&a, &b, Utc::now());
        assert_eq!(m.other(&a), Some(&b));
        assert_eq!(m.other(&b), Some(&a));
        assert!(m.involves(&a));
        assert!(!m.involves(&ProfileId(String::from("c"))));
    }
}
