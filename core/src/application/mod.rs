use std::sync::Arc;

use tokio::{sync::broadcast, task::JoinHandle};

use crate::{
    domain::{
        authentication::{entities::SessionEvent, ports::TokenStore, services::AuthService},
        common::{CaloscopeConfig, SessionConfig, entities::app_errors::CoreError},
        food_history::{HistoryController, HistoryScope, TimeScope, ports::DeleteConfirmation},
        refresh::{RefreshBus, RefreshReason, ScreenId},
        user_profile::services::ProfileService,
    },
    infrastructure::{
        authentication::repositories::auth_repository::HttpAuthRepository,
        food_history::repositories::food_history_repository::HttpFoodHistoryRepository,
        http::ApiClient,
        token_store::{FileTokenStore, MemoryTokenStore},
        user_profile::repositories::profile_repository::HttpProfileRepository,
    },
};

const SESSION_EVENT_CAPACITY: usize = 16;

pub type CaloscopeAuthService = AuthService<HttpAuthRepository>;
pub type CaloscopeProfileService = ProfileService<HttpProfileRepository>;
pub type CaloscopeHistoryController = HistoryController<HttpFoodHistoryRepository>;

/// Every service of the client wired to the HTTP backend.
#[derive(Clone)]
pub struct CaloscopeClient {
    pub auth: Arc<CaloscopeAuthService>,
    pub profile: Arc<CaloscopeProfileService>,
    pub refresh_bus: RefreshBus,
    history: HttpFoodHistoryRepository,
    config: CaloscopeConfig,
    events: broadcast::Sender<SessionEvent>,
}

impl CaloscopeClient {
    /// Builds a controller for one list view. The view's refresh screen is
    /// derived from its scope.
    pub fn history_controller(
        &self,
        confirmation: Arc<dyn DeleteConfirmation>,
        scope: HistoryScope,
    ) -> CaloscopeHistoryController {
        HistoryController::with_scope(
            self.history.clone(),
            confirmation,
            self.config.history.clone(),
            scope,
        )
    }

    /// Reloads `controller` whenever the screen of its current scope is
    /// signalled on the refresh bus.
    pub fn follow_refreshes(&self, controller: &CaloscopeHistoryController) -> JoinHandle<()> {
        let screen = screen_for_scope(&controller.snapshot().scope);
        controller.spawn_refresh_listener(self.refresh_bus.subscribe(screen))
    }

    pub fn sessions(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Asks every open history view to reload; returns how many were reached.
    pub fn notify_history_changed(&self, reason: RefreshReason) -> usize {
        ScreenId::HISTORY_SCREENS
            .iter()
            .map(|screen| self.refresh_bus.publish(screen, reason))
            .sum()
    }

    pub fn config(&self) -> &CaloscopeConfig {
        &self.config
    }
}

pub fn screen_for_scope(scope: &HistoryScope) -> ScreenId {
    match scope.kind() {
        None => ScreenId::HISTORY_ALL,
        Some(TimeScope::Day) => ScreenId::HISTORY_DAY,
        Some(TimeScope::Week) => ScreenId::HISTORY_WEEK,
        Some(TimeScope::Month) => ScreenId::HISTORY_MONTH,
    }
}

pub fn create_client(config: CaloscopeConfig) -> Result<CaloscopeClient, CoreError> {
    let tokens: Arc<dyn TokenStore> = match &config.session {
        SessionConfig::File { path } => Arc::new(FileTokenStore::new(path.clone())),
        SessionConfig::Ephemeral => Arc::new(MemoryTokenStore::new()),
    };
    create_client_with_store(config, tokens)
}

pub fn create_client_with_store(
    config: CaloscopeConfig,
    tokens: Arc<dyn TokenStore>,
) -> Result<CaloscopeClient, CoreError> {
    let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
    let api = ApiClient::new(&config.api, Arc::clone(&tokens), events.clone())?;

    let auth = AuthService::new(HttpAuthRepository::new(api.clone()), tokens, events.clone());
    let profile = ProfileService::new(HttpProfileRepository::new(api.clone()));

    Ok(CaloscopeClient {
        auth: Arc::new(auth),
        profile: Arc::new(profile),
        refresh_bus: RefreshBus::new(),
        history: HttpFoodHistoryRepository::new(api),
        config,
        events,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::common::{ApiConfig, HistoryConfig};

    fn config(base_url: &str) -> CaloscopeConfig {
        CaloscopeConfig {
            api: ApiConfig {
                base_url: base_url.to_string(),
                timeout: Duration::from_secs(5),
            },
            history: HistoryConfig::default(),
            session: SessionConfig::Ephemeral,
        }
    }

    #[test]
    fn test_invalid_base_url_is_a_config_error() {
        assert!(matches!(
            create_client(config("::nope::")),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_screen_for_scope() {
        let day = HistoryScope::Day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(screen_for_scope(&day), ScreenId::HISTORY_DAY);
        assert_eq!(screen_for_scope(&HistoryScope::All), ScreenId::HISTORY_ALL);
        assert_eq!(
            screen_for_scope(&HistoryScope::Week(-1)),
            ScreenId::HISTORY_WEEK
        );
    }

    #[test]
    fn test_history_change_reaches_every_history_screen() {
        let client = create_client(config("http://127.0.0.1:9/api")).unwrap();
        let _all = client.refresh_bus.subscribe(ScreenId::HISTORY_ALL);
        let _month = client.refresh_bus.subscribe(ScreenId::HISTORY_MONTH);
        let _profile = client.refresh_bus.subscribe(ScreenId::PROFILE);

        assert_eq!(client.notify_history_changed(RefreshReason::EntryDeleted), 2);
    }

    #[tokio::test]
    async fn test_followed_controller_reloads_on_history_change() {
        let client = create_client(config("http://127.0.0.1:9/api")).unwrap();
        let day = HistoryScope::Day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let controller = client.history_controller(Arc::new(NoConfirm), day);
        let mut snapshots = controller.subscribe();

        let _listener = client.follow_refreshes(&controller);
        assert_eq!(client.refresh_bus.subscriber_count(&ScreenId::HISTORY_DAY), 1);
        assert_eq!(client.notify_history_changed(RefreshReason::EntryEdited), 1);

        // Signed out, so the reload fails locally without touching the network.
        let snapshot = snapshots
            .wait_for(|snapshot| snapshot.last_error.is_some())
            .await
            .unwrap()
            .clone();
        assert!(!snapshot.is_loading());
    }

    struct NoConfirm;

    impl DeleteConfirmation for NoConfirm {
        fn confirm_delete(&self, _entry: &crate::domain::food_history::FoodEntry) -> bool {
            false
        }
    }
}
