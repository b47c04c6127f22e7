//! Allow-listed message bridge between page content and the shell.
//!
//! Content reaches the shell only through `send`, `invoke` and notification subscriptions.
//! Every entry point resolves the channel name against the fixed lists first and serializes the
//! payload before anything is forwarded; a rejection is logged here and reported to content as
//! nothing at all (`send`) or `null` (`invoke`).

use std::{
    collections::{BTreeMap, BTreeSet},
    future::Future,
    pin::Pin,
    sync::Mutex,
};

use serde::Serialize;
use serde_json::Value;

use crate::channel_registry::{InvokeChannel, NotifyChannel, SendChannel};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum BridgeRejection {
    #[error("channel '{0}' is not allowed")]
    UnknownChannel(String),
    #[error("payload for channel '{channel}' is not serializable: {reason}")]
    UnserializablePayload { channel: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum BridgeHandlerError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Platform(String),
    #[error("handler dropped its reply")]
    ReplyDropped,
}

pub(crate) type InvokeFuture =
    Pin<Box<dyn Future<Output = Result<Value, BridgeHandlerError>> + Send + 'static>>;

/// Privileged side of the bridge. Only ever called with channels that passed the allow-list.
pub(crate) trait BridgeHandler: Send + Sync {
    fn handle_send(
        &self,
        channel: SendChannel,
        data: Option<Value>,
    ) -> Result<(), BridgeHandlerError>;

    fn handle_invoke(&self, channel: InvokeChannel, data: Option<Value>) -> InvokeFuture;
}

/// Delivers notifications to one content surface.
pub(crate) trait NotificationSink {
    fn deliver(
        &self,
        surface: &str,
        channel: NotifyChannel,
        payload: &Value,
    ) -> Result<(), String>;
}

/// Serializes a payload the way it will cross the boundary. `None` and JSON `null` both mean
/// "no payload".
pub(crate) fn serialize_payload<T>(
    channel: &str,
    data: Option<&T>,
) -> Result<Option<Value>, BridgeRejection>
where
    T: Serialize + ?Sized,
{
    let Some(data) = data else {
        return Ok(None);
    };

    match serde_json::to_value(data) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(error) => Err(BridgeRejection::UnserializablePayload {
            channel: channel.to_string(),
            reason: error.to_string(),
        }),
    }
}

fn log_rejection(operation: &'static str, rejection: &BridgeRejection) {
    match rejection {
        BridgeRejection::UnknownChannel(channel) => {
            tracing::warn!(operation, channel = %channel, "blocked message on invalid channel");
        }
        BridgeRejection::UnserializablePayload { channel, reason } => {
            tracing::error!(
                operation,
                channel = %channel,
                error = %reason,
                "invalid data, not serializable"
            );
        }
    }
}

pub(crate) struct ChannelBridge<H> {
    handler: H,
}

impl<H: BridgeHandler> ChannelBridge<H> {
    pub(crate) fn new(handler: H) -> Self {
        Self { handler }
    }

    fn admit_send<T>(
        &self,
        channel: &str,
        data: Option<&T>,
    ) -> Result<(SendChannel, Option<Value>), BridgeRejection>
    where
        T: Serialize + ?Sized,
    {
        let payload = serialize_payload(channel, data);
        let channel = SendChannel::from_name(channel)
            .ok_or_else(|| BridgeRejection::UnknownChannel(channel.to_string()))?;
        Ok((channel, payload?))
    }

    fn admit_invoke<T>(
        &self,
        channel: &str,
        data: Option<&T>,
    ) -> Result<(InvokeChannel, Option<Value>), BridgeRejection>
    where
        T: Serialize + ?Sized,
    {
        let payload = serialize_payload(channel, data);
        let channel = InvokeChannel::from_name(channel)
            .ok_or_else(|| BridgeRejection::UnknownChannel(channel.to_string()))?;
        Ok((channel, payload?))
    }

    /// Fire-and-forget. Returns whether the message reached the handler; content never sees it.
    pub(crate) fn send<T>(&self, channel: &str, data: Option<&T>) -> bool
    where
        T: Serialize + ?Sized,
    {
        let (channel, payload) = match self.admit_send(channel, data) {
            Ok(admitted) => admitted,
            Err(rejection) => {
                log_rejection("send", &rejection);
                return false;
            }
        };

        if let Err(error) = self.handler.handle_send(channel, payload) {
            tracing::error!(channel = channel.as_str(), %error, "send handler failed");
        }
        true
    }

    /// Request/response. Any rejection, handler failure or timeout yields `None`, which content
    /// observes as `null`; error details stay on this side.
    pub(crate) async fn invoke<T>(&self, channel: &str, data: Option<&T>) -> Option<Value>
    where
        T: Serialize + ?Sized,
    {
        let (channel, payload) = match self.admit_invoke(channel, data) {
            Ok(admitted) => admitted,
            Err(rejection) => {
                log_rejection("invoke", &rejection);
                return None;
            }
        };

        let timeout = channel.timeout();
        match tokio::time::timeout(timeout, self.handler.handle_invoke(channel, payload)).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(error)) => {
                tracing::error!(channel = channel.as_str(), %error, "ipc invoke failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    channel = channel.as_str(),
                    timeout_ms = timeout.as_millis() as u64,
                    "ipc invoke timed out"
                );
                None
            }
        }
    }
}

/// Tracks which surfaces listen on which notification channel and fans notifications out to
/// them.
#[derive(Debug, Default)]
pub(crate) struct NotificationHub {
    subscriptions: Mutex<BTreeMap<NotifyChannel, BTreeSet<String>>>,
}

impl NotificationHub {
    pub(crate) fn subscribe(&self, surface: &str, channel: &str) -> bool {
        let Some(channel) = NotifyChannel::from_name(channel) else {
            log_rejection("subscribe", &BridgeRejection::UnknownChannel(channel.to_string()));
            return false;
        };

        let Ok(mut subscriptions) = self.subscriptions.lock() else {
            tracing::error!("notification subscriptions lock poisoned");
            return false;
        };
        subscriptions
            .entry(channel)
            .or_default()
            .insert(surface.to_string());
        true
    }

    pub(crate) fn unsubscribe(&self, surface: &str, channel: &str) -> bool {
        let Some(channel) = NotifyChannel::from_name(channel) else {
            log_rejection("unsubscribe", &BridgeRejection::UnknownChannel(channel.to_string()));
            return false;
        };

        let Ok(mut subscriptions) = self.subscriptions.lock() else {
            tracing::error!("notification subscriptions lock poisoned");
            return false;
        };
        let removed = subscriptions
            .get_mut(&channel)
            .is_some_and(|surfaces| surfaces.remove(surface));
        if subscriptions.get(&channel).is_some_and(BTreeSet::is_empty) {
            subscriptions.remove(&channel);
        }
        removed
    }

    /// Drops every subscription a destroyed surface held.
    pub(crate) fn forget_surface(&self, surface: &str) {
        let Ok(mut subscriptions) = self.subscriptions.lock() else {
            tracing::error!("notification subscriptions lock poisoned");
            return;
        };
        subscriptions.retain(|_, surfaces| {
            surfaces.remove(surface);
            !surfaces.is_empty()
        });
    }

    pub(crate) fn subscribers(&self, channel: NotifyChannel) -> Vec<String> {
        self.subscriptions
            .lock()
            .map(|subscriptions| {
                subscriptions
                    .get(&channel)
                    .map(|surfaces| surfaces.iter().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Sends a notification to every subscribed surface. Returns how many received it.
    pub(crate) fn notify<T>(&self, sink: &dyn NotificationSink, channel: &str, payload: &T) -> usize
    where
        T: Serialize + ?Sized,
    {
        let payload = serialize_payload(channel, Some(payload));
        let Some(notify_channel) = NotifyChannel::from_name(channel) else {
            log_rejection("notify", &BridgeRejection::UnknownChannel(channel.to_string()));
            return 0;
        };
        let payload = match payload {
            Ok(payload) => payload.unwrap_or(Value::Null),
            Err(rejection) => {
                log_rejection("notify", &rejection);
                return 0;
            }
        };

        let mut delivered = 0;
        for surface in self.subscribers(notify_channel) {
            match sink.deliver(&surface, notify_channel, &payload) {
                Ok(()) => delivered += 1,
                Err(error) => tracing::warn!(
                    surface = %surface,
                    channel = channel,
                    %error,
                    "failed to deliver notification"
                ),
            }
        }
        delivered
    }
}
