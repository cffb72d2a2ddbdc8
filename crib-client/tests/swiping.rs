use crib_client::backend::DocumentStore;
use crib_client::candidates::CandidateFetcher;
use crib_client::scoring::affinity_score;
use crib_client::screens::{HomeScreen, HomeView};
use crib_client::swipe::{SwipeController, SwipeOutcome};
use crib_client::{ClientError, MemoryBackend, Session};
use crib_common::collections::{MATCHES, USERS};
use crib_common::{encode, Match, MatchId, Patch, Profile, ProfileId};

const CITY: &str = "Boston, MA";

fn person(id: &str, city: &str, lifestyle: &[&str], professional: &[&str]) -> Profile {
    Profile {
        id: ProfileId(id.to_string()),
        name: id.to_uppercase(),
        email: format!("{id}@stanford.edu"),
        internship_city: city.to_string(),
        looking_for_roommate: true,
        lifestyle_tags: lifestyle.iter().map(|t| t.to_string()).collect(),
        professional_tags: professional.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}

async fn seed(backend: &MemoryBackend, profile: &Profile) {
    backend
        .set(USERS, profile.id.as_str(), &Patch::from(encode(profile).unwrap()))
        .await
        .unwrap();
}

fn session(profile: &Profile) -> Session {
    Session::new(profile.id.clone(), profile.email.clone())
}

async fn stored(backend: &MemoryBackend, id: &str) -> Profile {
    backend.get(USERS, id).await.unwrap().unwrap().decode().unwrap()
}

#[tokio::test]
async fn shared_lifestyle_tag_makes_a_candidate() {
    let backend = MemoryBackend::new();
    let me = person("u", CITY, &["Night Owl", "Foodie"], &[]);
    let them = person("c", CITY, &["Night Owl", "Gamer"], &[]);
    seed(&backend, &me).await;
    seed(&backend, &them).await;

    let found = CandidateFetcher::new(backend.clone()).fetch(&me).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, them.id);
    assert_eq!(affinity_score(&found[0], &me), 1);
}

#[tokio::test]
async fn fetch_filters_city_opt_in_and_history() {
    let backend = MemoryBackend::new();
    let mut me = person("u", CITY, &["Gamer"], &["Tech"]);
    me.likes.push(ProfileId("liked".into()));
    me.dislikes.push(ProfileId("passed".into()));
    seed(&backend, &me).await;

    seed(&backend, &person("liked", CITY, &["Gamer"], &[])).await;
    seed(&backend, &person("passed", CITY, &["Gamer"], &[])).await;
    seed(&backend, &person("elsewhere", "Denver, CO", &["Gamer"], &[])).await;
    seed(&backend, &person("nothing-shared", CITY, &["Foodie"], &["Finance"])).await;
    let mut not_looking = person("not-looking", CITY, &["Gamer"], &[]);
    not_looking.looking_for_roommate = false;
    seed(&backend, &not_looking).await;
    seed(&backend, &person("fresh", CITY, &[], &["Tech"])).await;

    let found = CandidateFetcher::new(backend.clone()).fetch(&me).await.unwrap();
    let ids: Vec<_> = found.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["fresh"]);
    assert!(found.iter().all(|p| p.id != me.id && !me.has_swiped(&p.id)));
}

#[tokio::test]
async fn fetch_without_city_is_a_precondition_failure() {
    let backend = MemoryBackend::new();
    let me = person("u", "", &["Gamer"], &[]);
    let err = CandidateFetcher::new(backend.clone()).fetch(&me).await.unwrap_err();
    assert!(matches!(err, ClientError::MissingCity));
    assert!(err.is_precondition());
    assert_eq!(backend.query_count(), 0);
}

#[tokio::test]
async fn like_with_reciprocal_like_creates_match() {
    let backend = MemoryBackend::new();
    let me = person("u", CITY, &["Gamer"], &[]);
    let mut them = person("c", CITY, &["Gamer"], &[]);
    them.likes.push(me.id.clone());
    seed(&backend, &me).await;
    seed(&backend, &them).await;

    let mut swipes = SwipeController::new(backend.clone(), session(&me), vec![them.clone()]);
    let outcome = swipes.like().await.unwrap();

    let SwipeOutcome::Matched(record) = outcome else {
        panic!("expected a match, got {outcome:?}");
    };
    assert_eq!(record.id, MatchId::for_pair(&me.id, &them.id));
    assert!(record.involves(&me.id) && record.involves(&them.id));
    assert_eq!(swipes.cursor(), 1);

    let saved: Match = backend
        .get(MATCHES, record.id.as_str())
        .await
        .unwrap()
        .expect("match stored")
        .decode()
        .unwrap();
    assert_eq!(saved.users, vec![me.id.clone(), them.id.clone()]);
    assert!(stored(&backend, "u").await.likes.contains(&them.id));
}

#[tokio::test]
async fn one_sided_like_waits_for_the_other_side() {
    let backend = MemoryBackend::new();
    let me = person("u", CITY, &["Gamer"], &[]);
    let them = person("c", CITY, &["Gamer"], &[]);
    seed(&backend, &me).await;
    seed(&backend, &them).await;

    let mut mine = SwipeController::new(backend.clone(), session(&me), vec![them.clone()]);
    assert_eq!(mine.like().await.unwrap(), SwipeOutcome::Liked);
    assert_eq!(backend.document_count(MATCHES).await, 0);

    let mut theirs = SwipeController::new(backend.clone(), session(&them), vec![me.clone()]);
    assert!(matches!(theirs.like().await.unwrap(), SwipeOutcome::Matched(_)));
    assert_eq!(backend.document_count(MATCHES).await, 1);
    assert!(backend
        .get(MATCHES, MatchId::for_pair(&me.id, &them.id).as_str())
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn repeated_mutual_detection_keeps_one_record() {
    let backend = MemoryBackend::new();
    let mut me = person("u", CITY, &["Gamer"], &[]);
    let mut them = person("c", CITY, &["Gamer"], &[]);
    me.likes.push(them.id.clone());
    them.likes.push(me.id.clone());
    seed(&backend, &me).await;
    seed(&backend, &them).await;

    let mut a = SwipeController::new(backend.clone(), session(&me), vec![them.clone()]);
    let mut b = SwipeController::new(backend.clone(), session(&them), vec![me.clone()]);
    let (SwipeOutcome::Matched(first), SwipeOutcome::Matched(second)) =
        (a.like().await.unwrap(), b.like().await.unwrap())
    else {
        panic!("both sides should see the match");
    };
    assert_eq!(first.id, second.id);
    assert_eq!(first.users, second.users);
    assert_eq!(backend.document_count(MATCHES).await, 1);
}

#[tokio::test]
async fn dislike_records_and_never_matches() {
    let backend = MemoryBackend::new();
    let me = person("u", CITY, &["Gamer"], &[]);
    let mut them = person("c", CITY, &["Gamer"], &[]);
    them.likes.push(me.id.clone());
    seed(&backend, &me).await;
    seed(&backend, &them).await;

    let mut swipes = SwipeController::new(backend.clone(), session(&me), vec![them.clone()]);
    assert_eq!(swipes.dislike().await.unwrap(), SwipeOutcome::Disliked);
    assert_eq!(swipes.cursor(), 1);
    assert_eq!(stored(&backend, "u").await.dislikes, vec![them.id.clone()]);
    assert_eq!(backend.document_count(MATCHES).await, 0);
}

#[tokio::test]
async fn cursor_counts_swipes_and_stops_at_the_end() {
    let backend = MemoryBackend::new();
    let me = person("u", CITY, &["Gamer"], &[]);
    seed(&backend, &me).await;
    let mut deck = Vec::new();
    for id in ["a", "b", "c"] {
        let p = person(id, CITY, &["Gamer"], &[]);
        seed(&backend, &p).await;
        deck.push(p);
    }

    let mut swipes = SwipeController::new(backend.clone(), session(&me), deck);
    swipes.like().await.unwrap();
    swipes.dislike().await.unwrap();
    assert_eq!(swipes.cursor(), 2);
    swipes.like().await.unwrap();
    assert_eq!(swipes.cursor(), 3);
    assert!(swipes.is_exhausted());

    assert_eq!(swipes.like().await.unwrap(), SwipeOutcome::Exhausted);
    assert_eq!(swipes.dislike().await.unwrap(), SwipeOutcome::Exhausted);
    assert_eq!(swipes.cursor(), 3);
}

#[tokio::test]
async fn failed_like_does_not_advance() {
    let backend = MemoryBackend::new();
    let me = person("u", CITY, &["Gamer"], &[]);
    let them = person("c", CITY, &["Gamer"], &[]);
    seed(&backend, &me).await;
    seed(&backend, &them).await;

    let mut swipes = SwipeController::new(backend.clone(), session(&me), vec![them]);
    backend.set_offline(true);
    assert!(swipes.like().await.is_err());
    assert!(swipes.dislike().await.is_err());
    assert_eq!(swipes.cursor(), 0);

    backend.set_offline(false);
    assert_eq!(swipes.like().await.unwrap(), SwipeOutcome::Liked);
    assert_eq!(swipes.cursor(), 1);
}

#[tokio::test]
async fn home_screen_ranks_and_announces_matches() {
    let backend = MemoryBackend::new();
    let me = person("u", CITY, &["Gamer", "Foodie"], &["Tech"]);
    let low = person("low", CITY, &["Gamer"], &[]);
    let mut high = person("high", CITY, &["Gamer", "Foodie"], &["Tech"]);
    high.likes.push(me.id.clone());
    seed(&backend, &me).await;
    seed(&backend, &low).await;
    seed(&backend, &high).await;

    let mut home = HomeScreen::mount(backend.clone(), session(&me)).await;
    assert!(home.alerts.is_empty());
    let HomeView::Card(first) = home.view() else { panic!("empty deck") };
    assert_eq!(first.id, high.id);

    home.like().await;
    let alert = home.alerts.last().expect("match alert");
    assert_eq!(alert.title, "It's a Match!");
    assert_eq!(alert.message, "You and HIGH are cribbed up!");

    home.dislike().await;
    assert_eq!(home.view(), HomeView::NoCandidates);
}

#[tokio::test]
async fn exhausted_home_screen_issues_no_more_fetches() {
    let backend = MemoryBackend::new();
    let me = person("u", CITY, &["Gamer"], &[]);
    let them = person("c", CITY, &["Gamer"], &[]);
    seed(&backend, &me).await;
    seed(&backend, &them).await;

    let mut home = HomeScreen::mount(backend.clone(), session(&me)).await;
    assert_eq!(home.empty_text(), None);
    home.dislike().await;
    assert_eq!(home.view(), HomeView::NoCandidates);
    assert_eq!(home.empty_text(), Some("No people found :("));

    let fetches = backend.query_count();
    home.like().await;
    home.dislike().await;
    assert_eq!(home.view(), HomeView::NoCandidates);
    assert_eq!(backend.query_count(), fetches);
    assert!(home.alerts.is_empty());
}

#[tokio::test]
async fn unreachable_backend_alerts_and_leaves_deck_empty() {
    let backend = MemoryBackend::new();
    let me = person("u", CITY, &["Gamer"], &[]);
    seed(&backend, &me).await;
    backend.set_offline(true);

    let home = HomeScreen::mount(backend.clone(), session(&me)).await;
    assert_eq!(home.view(), HomeView::NoCandidates);
    assert_eq!(home.alerts.len(), 1);
    assert_eq!(home.alerts.last().unwrap().message, "Failed to fetch potential matches");
}

#[tokio::test]
async fn failed_like_on_home_screen_alerts_and_stalls() {
    let backend = MemoryBackend::new();
    let me = person("u", CITY, &["Gamer"], &[]);
    let them = person("c", CITY, &["Gamer"], &[]);
    seed(&backend, &me).await;
    seed(&backend, &them).await;

    let mut home = HomeScreen::mount(backend.clone(), session(&me)).await;
    backend.set_offline(true);
    home.like().await;
    assert_eq!(home.alerts.last().unwrap().message, "Failed to process like");
    assert_eq!(home.swipes().cursor(), 0);
    assert!(matches!(home.view(), HomeView::Card(_)));
}

#[tokio::test]
async fn missing_own_profile_is_silent() {
    let backend = MemoryBackend::new();
    let ghost = Session::new(ProfileId("ghost".into()), "ghost@stanford.edu");
    let home = HomeScreen::mount(backend, ghost).await;
    assert_eq!(home.view(), HomeView::NoCandidates);
    assert!(home.alerts.is_empty());
}
