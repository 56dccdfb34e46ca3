//! Message Queue trigger payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::HandlerError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageQueueEvent {
    #[serde(default)]
    pub messages: Vec<QueueMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    #[serde(default)]
    pub event_metadata: EventMetadata,
    pub details: MessageDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub cloud_id: String,
    #[serde(default)]
    pub folder_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDetails {
    #[serde(default)]
    pub queue_id: String,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub md5_of_body: String,
    pub body: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub message_attributes: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub md5_of_message_attributes: String,
}

impl MessageQueueEvent {
    pub fn from_json(raw: &str) -> Result<Self, HandlerError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Build an event around a single body, the way the trigger would deliver it.
    pub fn single(body: impl Into<String>) -> Self {
        Self {
            messages: vec![QueueMessage {
                event_metadata: EventMetadata::default(),
                details: MessageDetails {
                    queue_id: String::new(),
                    message: Message {
                        message_id: String::new(),
                        md5_of_body: String::new(),
                        body: body.into(),
                        attributes: HashMap::new(),
                        message_attributes: HashMap::new(),
                        md5_of_message_attributes: String::new(),
                    },
                },
            }],
        }
    }

    /// Only the first message is processed. An empty batch is a broken delivery.
    pub fn first_message(&self) -> Result<&QueueMessage, HandlerError> {
        self.messages.first().ok_or(HandlerError::EmptyEvent)
    }
}
