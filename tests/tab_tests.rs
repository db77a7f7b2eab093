use std::sync::Arc;
use std::time::Duration;

use bikeyard::application::Dashboard;
use bikeyard::domain::{ListingId, Tab};
use bikeyard::port::StoreChange;
use bikeyard::testkit::api::{Call, FakeMarketplace};
use bikeyard::testkit::confirm::ScriptedConfirmer;
use bikeyard::testkit::domain::{listing, session_for};
use bikeyard::testkit::observer::RecordingObserver;

fn dashboard(api: &Arc<FakeMarketplace>) -> (Dashboard, Arc<RecordingObserver>) {
    let dashboard = Dashboard::new(
        api.clone(),
        Arc::new(session_for("u1")),
        Arc::new(ScriptedConfirmer::always(true)),
        Duration::from_millis(1500),
    );
    let recorder = Arc::new(RecordingObserver::new());
    dashboard.subscribe(recorder.clone());
    (dashboard, recorder)
}

fn fetches(api: &FakeMarketplace) -> usize {
    api.calls()
        .into_iter()
        .filter(|c| matches!(c, Call::FetchListings(_)))
        .count()
}

#[tokio::test]
async fn dashboard_starts_on_profile_without_listing_request() {
    let api = Arc::new(FakeMarketplace::with_listings("u1", vec![listing("a1")]));
    let (dashboard, _) = dashboard(&api);

    assert_eq!(dashboard.tabs.current(), Tab::Profile);
    assert_eq!(fetches(&api), 0);
}

#[tokio::test]
async fn first_listing_tab_loads_once() {
    let api = Arc::new(FakeMarketplace::with_listings("u1", vec![listing("a1")]));
    let (dashboard, recorder) = dashboard(&api);

    dashboard.tabs.select(Tab::Listings).await.unwrap();
    dashboard.tabs.select(Tab::Customers).await.unwrap();
    dashboard.tabs.select(Tab::Listings).await.unwrap();

    assert_eq!(fetches(&api), 1);
    assert_eq!(dashboard.listings.len(), 1);
    assert!(recorder.contains(&StoreChange::TabSelected(Tab::Customers)));
}

#[tokio::test]
async fn switching_tabs_keeps_open_draft() {
    let api = Arc::new(FakeMarketplace::with_listings("u1", vec![listing("a1")]));
    let (dashboard, _) = dashboard(&api);
    dashboard.tabs.select(Tab::Listings).await.unwrap();

    let entry = dashboard.listings.get(&ListingId::new("a1")).unwrap();
    dashboard.editor.open(&entry);
    dashboard.tabs.select(Tab::Profile).await.unwrap();

    assert!(dashboard.editor.is_open());
}

#[tokio::test]
async fn reentering_a_tab_does_not_replay_old_banner() {
    let api = Arc::new(FakeMarketplace::with_listings("u1", vec![listing("a1")]));
    let (dashboard, _) = dashboard(&api);
    dashboard.tabs.select(Tab::Listings).await.unwrap();
    dashboard
        .listings
        .delete(&ListingId::new("a1"))
        .await
        .unwrap();
    assert!(dashboard.listings.notice().is_some());

    dashboard.tabs.select(Tab::Profile).await.unwrap();
    dashboard.tabs.select(Tab::Listings).await.unwrap();

    assert!(dashboard.listings.notice().is_none());
    assert!(dashboard.listings.is_empty());
}
