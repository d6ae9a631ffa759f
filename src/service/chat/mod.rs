pub mod infoflow;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::{
    base::types::Res,
    infoflow::{OutboundMessage, OutboundResponse},
};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines how replies reach a group chat. Implementing this trait allows the
/// dispatcher to be exercised without a live robot webhook.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Send a fully built outbound message.
    ///
    /// Returns the decoded platform response; a non-zero error code is an error.
    async fn send_message(&self, message: &OutboundMessage) -> Res<OutboundResponse>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
