use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::models::RefreshNotice;
use crate::services::ai::ChatProvider;
use crate::services::conversation::ConversationWindow;
use crate::store::ReservationStore;

pub struct AppState {
    pub config: AppConfig,
    pub store: Box<dyn ReservationStore>,
    pub chat: Box<dyn ChatProvider>,
    pub conversations: ConversationWindow,
    pub events: broadcast::Sender<RefreshNotice>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Box<dyn ReservationStore>,
        chat: Box<dyn ChatProvider>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            conversations: ConversationWindow::new(config.chat_history_turns),
            config,
            store,
            chat,
            events,
        }
    }
}
