use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    #[serde(rename = "identify")]
    Identify { user_id: Uuid },
    #[serde(rename = "send")]
    Send { recipient_id: Uuid, body: String },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    #[serde(rename = "deliver")]
    Deliver {
        sender_id: Uuid,
        body: String,
        created_at: DateTime<Utc>,
    },
}
