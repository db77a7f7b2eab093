//! Profile form state for the signed-in user.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::domain::{Notice, ProfileField, Role, UserProfile};
use crate::error::Result;
use crate::port::{MarketplaceApi, ObserverRegistry, SessionContext, StoreChange};

const LOAD_FAILED: &str = "Failed to load profile.";
const SAVE_OK: &str = "Profile updated successfully!";
const SAVE_FAILED: &str = "Failed to update profile.";

#[derive(Debug)]
struct ProfileState {
    profile: UserProfile,
    loading: bool,
    /// Saves in flight. Not capped: the form disables its trigger instead.
    saving: usize,
    notice: Option<Notice>,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            profile: UserProfile::default(),
            loading: true,
            saving: 0,
            notice: None,
        }
    }
}

/// Loads and saves the editable profile fields.
pub struct ProfileStore {
    api: Arc<dyn MarketplaceApi>,
    session: Arc<dyn SessionContext>,
    observers: Arc<ObserverRegistry>,
    state: RwLock<ProfileState>,
}

impl ProfileStore {
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        session: Arc<dyn SessionContext>,
        observers: Arc<ObserverRegistry>,
    ) -> Self {
        Self {
            api,
            session,
            observers,
            state: RwLock::new(ProfileState::default()),
        }
    }

    /// Fetch the profile. On failure the fields stay at their defaults.
    pub async fn load(&self) -> Result<UserProfile> {
        info!("Loading profile");
        let result = self.api.fetch_profile().await;

        let change = {
            let mut state = self.state.write();
            state.loading = false;
            match &result {
                Ok(profile) => {
                    state.profile = profile.clone();
                    StoreChange::ProfileLoaded
                }
                Err(err) => {
                    warn!(error = %err, "Failed to load profile");
                    state.notice = Some(Notice::load_failure(err, LOAD_FAILED));
                    StoreChange::ProfileLoadFailed
                }
            }
        };
        self.observers.notify_all(change);
        result
    }

    /// Edit one field locally. Dismisses any banner.
    pub fn change_field(&self, field: ProfileField, value: impl Into<String>) {
        {
            let mut state = self.state.write();
            state.profile.set(field, value);
            state.notice = None;
        }
        self.observers
            .notify_all(StoreChange::ProfileEdited(field));
    }

    /// Send the whole profile.
    ///
    /// A non-empty username is the input surface's responsibility and is
    /// not re-checked here.
    pub async fn save(&self) -> Result<UserProfile> {
        let profile = {
            let mut state = self.state.write();
            state.saving += 1;
            state.notice = None;
            state.profile.clone()
        };
        self.observers.notify_all(StoreChange::ProfileSaving);
        info!(username = %profile.username, "Saving profile");

        let result = self.api.save_profile(&profile).await;

        let success = {
            let mut state = self.state.write();
            state.saving = state.saving.saturating_sub(1);
            match &result {
                Ok(_) => {
                    state.notice = Some(Notice::success(SAVE_OK));
                    true
                }
                Err(err) => {
                    warn!(error = %err, "Failed to save profile");
                    state.notice = Some(Notice::mutation_failure(err, SAVE_FAILED));
                    false
                }
            }
        };
        self.observers
            .notify_all(StoreChange::ProfileSaved { success });
        result
    }

    #[must_use]
    pub fn profile(&self) -> UserProfile {
        self.state.read().profile.clone()
    }

    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.state.read().notice.clone()
    }

    /// True until the first load resolves either way.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// True while any save is outstanding.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.state.read().saving > 0
    }

    #[must_use]
    pub fn avatar_initial(&self) -> String {
        self.state.read().profile.avatar_initial()
    }

    /// "Administrator" or "Member", from the session role.
    #[must_use]
    pub fn role_label(&self) -> &'static str {
        self.session
            .identity()
            .map_or(Role::Member, |identity| identity.role)
            .label()
    }
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NoticeKind;
    use crate::testkit::api::{Call, FakeMarketplace};
    use crate::testkit::domain::{admin_session_for, session_for};

    fn store(api: &Arc<FakeMarketplace>) -> ProfileStore {
        ProfileStore::new(
            api.clone(),
            Arc::new(session_for("u1")),
            Arc::new(ObserverRegistry::new()),
        )
    }

    #[tokio::test]
    async fn starts_loading_with_empty_fields() {
        let api = Arc::new(FakeMarketplace::new("u1"));
        let profile = store(&api);
        assert!(profile.is_loading());
        assert_eq!(profile.profile(), UserProfile::default());
        assert_eq!(profile.avatar_initial(), "?");
    }

    #[tokio::test]
    async fn load_failure_keeps_defaults() {
        let api = Arc::new(FakeMarketplace::new("u1"));
        api.fail_next(500, None);
        let profile = store(&api);

        assert!(profile.load().await.is_err());

        assert!(!profile.is_loading());
        assert_eq!(profile.profile(), UserProfile::default());
        let notice = profile.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::LoadFailure);
        assert_eq!(notice.text, LOAD_FAILED);
    }

    #[tokio::test]
    async fn editing_clears_banner() {
        let api = Arc::new(FakeMarketplace::new("u1"));
        api.fail_next(500, None);
        let profile = store(&api);
        let _ = profile.load().await;
        assert!(profile.notice().is_some());

        profile.change_field(ProfileField::Location, "Kochi");

        assert!(profile.notice().is_none());
        assert_eq!(profile.profile().location, "Kochi");
    }

    #[tokio::test]
    async fn save_sends_full_profile_and_reports_success() {
        let api = Arc::new(FakeMarketplace::new("u1"));
        let profile = store(&api);
        profile.load().await.unwrap();
        profile.change_field(ProfileField::Username, "anil");
        profile.change_field(ProfileField::Phone, "555");

        profile.save().await.unwrap();

        assert!(!profile.is_saving());
        assert_eq!(profile.notice().unwrap(), Notice::success(SAVE_OK));
        let sent = match api.calls().last().unwrap() {
            Call::SaveProfile(sent) => sent.clone(),
            other => panic!("unexpected call {other:?}"),
        };
        assert_eq!(sent.username, "anil");
        assert_eq!(sent.phone, "555");
    }

    #[tokio::test]
    async fn save_failure_surfaces_server_message() {
        let api = Arc::new(FakeMarketplace::new("u1"));
        let profile = store(&api);
        profile.load().await.unwrap();

        api.fail_next(409, Some("Username already taken"));
        assert!(profile.save().await.is_err());
        let notice = profile.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::ValidationFailure);
        assert_eq!(notice.text, "Username already taken");

        api.fail_next(500, None);
        assert!(profile.save().await.is_err());
        assert_eq!(profile.notice().unwrap().text, SAVE_FAILED);
    }

    #[tokio::test]
    async fn role_label_follows_session() {
        let api = Arc::new(FakeMarketplace::new("u1"));
        let admin = ProfileStore::new(
            api.clone(),
            Arc::new(admin_session_for("u1")),
            Arc::new(ObserverRegistry::new()),
        );
        assert_eq!(admin.role_label(), "Administrator");
        assert_eq!(store(&api).role_label(), "Member");
    }
}
