use crate::{config::Config, services::archive::MessageArchive, websocket::PresenceRegistry};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: PresenceRegistry,
    pub archive: Arc<dyn MessageArchive>,
}
