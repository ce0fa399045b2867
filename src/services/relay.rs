use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::message::Message;
use crate::services::archive::MessageArchive;
use crate::websocket::message_types::WsOutboundEvent;
use crate::websocket::PresenceRegistry;

pub struct RelayService;

impl RelayService {
    /// Persist a message, then attempt best-effort live delivery.
    ///
    /// The append must succeed before delivery is attempted; if it fails the
    /// caller sees the persistence error and no deliver event is emitted. An
    /// offline recipient, or one whose connection dies between lookup and
    /// send, is not an error: the message is already durable and will be
    /// served by a later history query. At most one live delivery attempt is
    /// made, and the caller never learns whether the recipient was online.
    pub async fn relay(
        archive: &dyn MessageArchive,
        registry: &PresenceRegistry,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: &str,
    ) -> Result<Message, AppError> {
        let message = archive
            .append(sender_id, recipient_id, body, Utc::now())
            .await?;

        if let Some(handle) = registry.lookup(recipient_id).await {
            let event = WsOutboundEvent::Deliver {
                sender_id: message.sender_id,
                body: message.body.clone(),
                created_at: message.created_at,
            };
            match serde_json::to_string(&event) {
                Ok(payload) => {
                    // Send failure means the connection closed after lookup;
                    // the live path is forfeited, history still has the message.
                    let _ = handle.send(payload);
                }
                Err(e) => tracing::error!(error = %e, "failed to serialize deliver event"),
            }
        }

        Ok(message)
    }
}
