use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use tokio::sync::oneshot;

use bikeyard::adapter::outbound::session::StaticSession;
use bikeyard::application::{ListingCollection, Outcome, Reconciled};
use bikeyard::domain::{Listing, ListingDraft, ListingId, NoticeKind, UserId, UserProfile};
use bikeyard::error::Result;
use bikeyard::port::{MarketplaceApi, ObserverRegistry, StatusChange, StoreChange};
use bikeyard::testkit::api::{Call, FakeMarketplace};
use bikeyard::testkit::confirm::ScriptedConfirmer;
use bikeyard::testkit::domain::{buyer, listing, listing_with_buyers, session_for};
use bikeyard::testkit::observer::RecordingObserver;

struct Fixture {
    api: Arc<FakeMarketplace>,
    collection: ListingCollection,
    recorder: Arc<RecordingObserver>,
}

async fn loaded(listings: Vec<Listing>) -> Fixture {
    let api = Arc::new(FakeMarketplace::with_listings("u1", listings));
    let observers = Arc::new(ObserverRegistry::new());
    let recorder = Arc::new(RecordingObserver::new());
    observers.register(recorder.clone());
    let collection = ListingCollection::new(
        api.clone(),
        Arc::new(session_for("u1")),
        Arc::new(ScriptedConfirmer::always(true)),
        observers,
    );
    collection.load_owned().await.expect("initial load");
    Fixture {
        api,
        collection,
        recorder,
    }
}

fn ids(collection: &ListingCollection) -> Vec<String> {
    collection
        .listings()
        .into_iter()
        .map(|l| l.id.to_string())
        .collect()
}

#[tokio::test]
async fn ids_stay_unique_after_load() {
    let f = loaded(vec![listing("a1"), listing("a2"), listing("a1"), listing("a3")]).await;

    let all = ids(&f.collection);
    let unique: HashSet<_> = all.iter().collect();
    assert_eq!(all.len(), unique.len());
    assert_eq!(all, vec!["a1", "a2", "a3"]);
}

#[tokio::test]
async fn unresolved_owner_loads_nothing() {
    let api = Arc::new(FakeMarketplace::with_listings("u1", vec![listing("a1")]));
    let collection = ListingCollection::new(
        api.clone(),
        Arc::new(StaticSession::new(None, Some("token".into()))),
        Arc::new(ScriptedConfirmer::always(true)),
        Arc::new(ObserverRegistry::new()),
    );

    assert_eq!(collection.load_owned().await.unwrap(), None);
    assert!(collection.is_empty());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn toggling_twice_restores_sold_flag() {
    let f = loaded(vec![listing("a1")]).await;
    let id = ListingId::new("a1");

    f.collection.toggle_sold(&id).await.unwrap();
    assert!(f.collection.get(&id).unwrap().sold);
    f.collection.toggle_sold(&id).await.unwrap();

    assert!(!f.collection.get(&id).unwrap().sold);
    assert_eq!(
        f.api.calls()[1..],
        [
            Call::ChangeStatus(id.clone(), StatusChange::MarkSold),
            Call::ChangeStatus(id.clone(), StatusChange::MarkAvailable),
        ]
    );
}

#[tokio::test]
async fn marking_sold_issues_one_request_and_replaces_entry() {
    let f = loaded(vec![listing("a1")]).await;

    let updated = f.collection.toggle_sold(&ListingId::new("a1")).await.unwrap();

    assert!(updated.sold);
    let status_calls: Vec<_> = f
        .api
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::ChangeStatus(..)))
        .collect();
    assert_eq!(
        status_calls,
        vec![Call::ChangeStatus(ListingId::new("a1"), StatusChange::MarkSold)]
    );
    let notice = f.collection.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.text, "Listing marked as sold.");
    assert!(f
        .recorder
        .contains(&StoreChange::ListingReplaced(ListingId::new("a1"))));
}

#[tokio::test]
async fn delete_removes_exactly_that_entry() {
    let f = loaded(vec![listing("a1"), listing("a2"), listing("a3")]).await;

    let outcome = f.collection.delete(&ListingId::new("a2")).await.unwrap();

    assert_eq!(outcome, Outcome::Applied(ListingId::new("a2")));
    assert_eq!(ids(&f.collection), vec!["a1", "a3"]);
    assert_eq!(
        f.collection.notice().unwrap().text,
        "Listing deleted successfully."
    );
    assert!(f
        .recorder
        .contains(&StoreChange::ListingRemoved(ListingId::new("a2"))));
}

#[tokio::test]
async fn failed_status_change_surfaces_server_message() {
    let f = loaded(vec![listing("a1")]).await;
    f.api.fail_next(403, Some("Only the owner can do that"));

    assert!(f.collection.toggle_sold(&ListingId::new("a1")).await.is_err());

    assert!(!f.collection.get(&ListingId::new("a1")).unwrap().sold);
    let notice = f.collection.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::ValidationFailure);
    assert_eq!(notice.text, "Only the owner can do that");
}

#[tokio::test]
async fn removing_buyer_shrinks_roster_by_one() {
    let f = loaded(vec![listing_with_buyers(
        "a1",
        vec![buyer("u9", "kiran"), buyer("u7", "meera")],
    )])
    .await;
    let id = ListingId::new("a1");

    let outcome = f
        .collection
        .remove_buyer(&id, &UserId::new("u9"))
        .await
        .unwrap();

    let server_copy = f.api.stored("a1").unwrap();
    assert_eq!(outcome, Outcome::Applied(server_copy.clone()));
    let entry = f.collection.get(&id).unwrap();
    assert_eq!(entry, server_copy);
    assert_eq!(entry.booked_buyers.len(), 1);
    assert!(!entry.has_buyer(&UserId::new("u9")));
    assert_eq!(entry.booked_buyers[0].username, "meera");
    assert_eq!(
        f.collection.notice().unwrap().text,
        "Buyer removed successfully."
    );
}

#[tokio::test]
async fn buyer_removal_takes_every_field_from_server() {
    let f = loaded(vec![listing_with_buyers(
        "a1",
        vec![buyer("u9", "kiran"), buyer("u7", "meera")],
    )])
    .await;
    let id = ListingId::new("a1");
    let response = Listing {
        price: dec!(99000),
        sold: true,
        location: "Nashik".into(),
        ..listing_with_buyers("a1", vec![buyer("u7", "meera")])
    };
    f.api.respond_next(response.clone());

    f.collection
        .remove_buyer(&id, &UserId::new("u9"))
        .await
        .unwrap();

    assert_eq!(f.collection.get(&id).unwrap(), response);
}

#[tokio::test]
async fn marking_sold_keeps_server_side_buyer_clearing() {
    let f = loaded(vec![listing_with_buyers(
        "a1",
        vec![buyer("u9", "kiran")],
    )])
    .await;
    let id = ListingId::new("a1");
    let response = Listing {
        sold: true,
        images: Vec::new(),
        ..listing("a1")
    };
    f.api.respond_next(response.clone());

    let returned = f.collection.toggle_sold(&id).await.unwrap();

    assert_eq!(returned, response);
    assert_eq!(f.collection.get(&id).unwrap(), response);
    assert!(f.collection.roster(&id).unwrap().is_empty());
}

#[tokio::test]
async fn declined_buyer_removal_keeps_everything() {
    let api = Arc::new(FakeMarketplace::with_listings(
        "u1",
        vec![listing_with_buyers("a1", vec![buyer("u9", "kiran")])],
    ));
    let collection = ListingCollection::new(
        api.clone(),
        Arc::new(session_for("u1")),
        Arc::new(ScriptedConfirmer::always(false)),
        Arc::new(ObserverRegistry::new()),
    );
    collection.load_owned().await.unwrap();

    let outcome = collection
        .remove_buyer(&ListingId::new("a1"), &UserId::new("u9"))
        .await
        .unwrap();

    assert!(outcome.is_declined());
    assert_eq!(api.calls(), vec![Call::FetchListings(UserId::new("u1"))]);
    assert_eq!(
        collection.roster(&ListingId::new("a1")).unwrap().len(),
        1
    );
}

#[tokio::test]
async fn update_with_only_price_changes_only_price() {
    let f = loaded(vec![listing("a1")]).await;
    let id = ListingId::new("a1");
    let before = f.collection.get(&id).unwrap();
    let mut draft = before.draft();
    draft.price = dec!(50000);

    let updated = f.collection.update(&id, &draft).await.unwrap();

    assert_eq!(updated.reconciled, Reconciled::Replaced);
    let after = f.collection.get(&id).unwrap();
    assert_eq!(after.price, dec!(50000));
    assert_eq!(
        Listing {
            price: before.price,
            ..after
        },
        before
    );
    assert!(f.collection.notice().is_none());
}

#[tokio::test]
async fn rosters_follow_collection_order() {
    let f = loaded(vec![
        listing_with_buyers("a1", vec![buyer("u9", "kiran")]),
        listing("a2"),
    ])
    .await;

    let rosters = f.collection.rosters();
    assert_eq!(rosters.len(), 2);
    assert_eq!(rosters[0].entries()[0].index, 1);
    assert!(rosters[1].is_empty());
    assert!(rosters[1].empty_message().is_some());
}

/// Marketplace whose loads and status changes can be held until the test
/// releases them. Calls without an armed gate go straight to the fake.
struct GatedMarketplace {
    inner: FakeMarketplace,
    load_gates: Mutex<VecDeque<oneshot::Receiver<Vec<Listing>>>>,
    status_gates: Mutex<VecDeque<oneshot::Receiver<Listing>>>,
    issued: AtomicUsize,
}

impl GatedMarketplace {
    fn new(inner: FakeMarketplace) -> Self {
        Self {
            inner,
            load_gates: Mutex::new(VecDeque::new()),
            status_gates: Mutex::new(VecDeque::new()),
            issued: AtomicUsize::new(0),
        }
    }

    fn hold_load(&self) -> oneshot::Sender<Vec<Listing>> {
        let (tx, rx) = oneshot::channel();
        self.load_gates.lock().push_back(rx);
        tx
    }

    fn hold_status(&self) -> oneshot::Sender<Listing> {
        let (tx, rx) = oneshot::channel();
        self.status_gates.lock().push_back(rx);
        tx
    }
}

#[async_trait]
impl MarketplaceApi for GatedMarketplace {
    async fn fetch_profile(&self) -> Result<UserProfile> {
        self.inner.fetch_profile().await
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<UserProfile> {
        self.inner.save_profile(profile).await
    }

    async fn fetch_owned_listings(&self, owner: &UserId) -> Result<Vec<Listing>> {
        let gate = self.load_gates.lock().pop_front();
        match gate {
            Some(gate) => {
                self.issued.fetch_add(1, Ordering::SeqCst);
                Ok(gate.await.expect("load released"))
            }
            None => self.inner.fetch_owned_listings(owner).await,
        }
    }

    async fn delete_listing(&self, id: &ListingId) -> Result<()> {
        self.inner.delete_listing(id).await
    }

    async fn change_status(&self, id: &ListingId, change: StatusChange) -> Result<Listing> {
        let gate = self.status_gates.lock().pop_front();
        match gate {
            Some(gate) => {
                self.issued.fetch_add(1, Ordering::SeqCst);
                Ok(gate.await.expect("status change released"))
            }
            None => self.inner.change_status(id, change).await,
        }
    }

    async fn update_listing(&self, id: &ListingId, draft: &ListingDraft) -> Result<Listing> {
        self.inner.update_listing(id, draft).await
    }

    async fn remove_buyer(&self, listing_id: &ListingId, buyer_id: &UserId) -> Result<Listing> {
        self.inner.remove_buyer(listing_id, buyer_id).await
    }
}

async fn wait_for_requests(api: &GatedMarketplace, count: usize) {
    while api.issued.load(Ordering::SeqCst) < count {
        tokio::task::yield_now().await;
    }
}

async fn gated(listings: Vec<Listing>) -> (Arc<GatedMarketplace>, Arc<ListingCollection>, Arc<RecordingObserver>) {
    let api = Arc::new(GatedMarketplace::new(FakeMarketplace::with_listings(
        "u1", listings,
    )));
    let observers = Arc::new(ObserverRegistry::new());
    let recorder = Arc::new(RecordingObserver::new());
    observers.register(recorder.clone());
    let collection = Arc::new(ListingCollection::new(
        api.clone(),
        Arc::new(session_for("u1")),
        Arc::new(ScriptedConfirmer::always(true)),
        observers,
    ));
    collection.load_owned().await.unwrap();
    (api, collection, recorder)
}

fn spawn_reload(collection: &Arc<ListingCollection>) -> tokio::task::JoinHandle<Result<Option<usize>>> {
    let collection = collection.clone();
    tokio::spawn(async move { collection.load_owned().await })
}

#[tokio::test]
async fn out_of_order_responses_resolve_to_latest_request() {
    let (api, collection, recorder) = gated(vec![listing("a1")]).await;
    let first_tx = api.hold_status();
    let second_tx = api.hold_status();

    let first = tokio::spawn({
        let collection = collection.clone();
        async move { collection.toggle_sold(&ListingId::new("a1")).await }
    });
    wait_for_requests(&api, 1).await;
    let second = tokio::spawn({
        let collection = collection.clone();
        async move { collection.toggle_sold(&ListingId::new("a1")).await }
    });
    wait_for_requests(&api, 2).await;

    let mut newer = listing("a1");
    newer.sold = true;
    newer.price = dec!(2);
    second_tx.send(newer).unwrap();
    second.await.unwrap().unwrap();

    let mut older = listing("a1");
    older.sold = true;
    older.price = dec!(1);
    first_tx.send(older).unwrap();
    first.await.unwrap().unwrap();

    assert_eq!(
        collection.get(&ListingId::new("a1")).unwrap().price,
        dec!(2)
    );
    assert!(recorder.contains(&StoreChange::StaleResponseDropped(ListingId::new("a1"))));
}

#[tokio::test]
async fn slow_reload_keeps_toggle_issued_after_it() {
    let (api, collection, _) = gated(vec![listing("a1"), listing("a2")]).await;
    let before_toggle = vec![listing("a1"), listing("a2")];
    let reload_tx = api.hold_load();

    let reload = spawn_reload(&collection);
    wait_for_requests(&api, 1).await;
    let toggled = collection.toggle_sold(&ListingId::new("a1")).await.unwrap();
    assert!(toggled.sold);

    reload_tx.send(before_toggle).unwrap();
    assert_eq!(reload.await.unwrap().unwrap(), Some(2));

    assert_eq!(collection.get(&ListingId::new("a1")).unwrap(), toggled);
    assert_eq!(ids(&collection), vec!["a1", "a2"]);

    // A toggle issued after the reload resolved starts from the kept copy.
    collection.toggle_sold(&ListingId::new("a1")).await.unwrap();
    assert_eq!(
        api.inner.calls().last(),
        Some(&Call::ChangeStatus(ListingId::new("a1"), StatusChange::MarkAvailable))
    );
}

#[tokio::test]
async fn slow_reload_does_not_restore_deleted_listing() {
    let (api, collection, _) = gated(vec![listing("a1"), listing("a2")]).await;
    let reload_tx = api.hold_load();

    let reload = spawn_reload(&collection);
    wait_for_requests(&api, 1).await;
    collection.delete(&ListingId::new("a2")).await.unwrap();

    reload_tx.send(vec![listing("a1"), listing("a2")]).unwrap();
    reload.await.unwrap().unwrap();

    assert_eq!(ids(&collection), vec!["a1"]);
}

#[tokio::test]
async fn older_reload_answering_last_is_dropped() {
    let (api, collection, _) = gated(vec![listing("a1")]).await;
    let older_tx = api.hold_load();
    let newer_tx = api.hold_load();

    let older = spawn_reload(&collection);
    wait_for_requests(&api, 1).await;
    let newer = spawn_reload(&collection);
    wait_for_requests(&api, 2).await;

    newer_tx.send(vec![listing("a3")]).unwrap();
    newer.await.unwrap().unwrap();
    older_tx.send(vec![listing("a1"), listing("a2")]).unwrap();
    older.await.unwrap().unwrap();

    assert_eq!(ids(&collection), vec!["a3"]);
    assert!(!collection.is_loading());
}
