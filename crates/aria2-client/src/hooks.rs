//! Hook registry
//!
//! One slot per lifecycle event and one per notification. Setting a slot
//! replaces whatever was there. Handlers are cloned out before they run so
//! user code never executes under the registry lock.

use std::collections::HashMap;
use std::sync::Arc;

use aria2_protocol::{Event, Notification};
use parking_lot::RwLock;
use serde_json::Value;

pub type EnvelopeHook = Arc<dyn Fn(&Value) + Send + Sync>;
pub type LifecycleHook = Arc<dyn Fn() + Send + Sync>;
/// Receives the notification's positional parameters.
pub type NotificationHandler = Arc<dyn Fn(&[Value]) + Send + Sync>;

#[derive(Default)]
struct Slots {
    on_send: Option<EnvelopeHook>,
    on_message: Option<EnvelopeHook>,
    on_open: Option<LifecycleHook>,
    on_close: Option<LifecycleHook>,
    notifications: HashMap<Notification, NotificationHandler>,
}

#[derive(Default)]
pub(crate) struct Hooks {
    slots: RwLock<Slots>,
}

impl Hooks {
    pub(crate) fn set_send(&self, hook: EnvelopeHook) {
        self.slots.write().on_send = Some(hook);
    }

    pub(crate) fn set_message(&self, hook: EnvelopeHook) {
        self.slots.write().on_message = Some(hook);
    }

    pub(crate) fn set_open(&self, hook: LifecycleHook) {
        self.slots.write().on_open = Some(hook);
    }

    pub(crate) fn set_close(&self, hook: LifecycleHook) {
        self.slots.write().on_close = Some(hook);
    }

    pub(crate) fn clear(&self, event: Event) {
        let mut slots = self.slots.write();
        match event {
            Event::Send => slots.on_send = None,
            Event::Message => slots.on_message = None,
            Event::Open => slots.on_open = None,
            Event::Close => slots.on_close = None,
        }
    }

    pub(crate) fn set_notification(&self, notification: Notification, handler: NotificationHandler) {
        self.slots.write().notifications.insert(notification, handler);
    }

    pub(crate) fn clear_notification(&self, notification: Notification) {
        self.slots.write().notifications.remove(&notification);
    }

    pub(crate) fn notification(&self, notification: Notification) -> Option<NotificationHandler> {
        self.slots.read().notifications.get(&notification).cloned()
    }

    pub(crate) fn fire_send(&self, envelope: &Value) {
        let hook = self.slots.read().on_send.clone();
        if let Some(hook) = hook {
            hook(envelope);
        }
    }

    pub(crate) fn fire_message(&self, envelope: &Value) {
        let hook = self.slots.read().on_message.clone();
        if let Some(hook) = hook {
            hook(envelope);
        }
    }

    pub(crate) fn fire_open(&self) {
        let hook = self.slots.read().on_open.clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    pub(crate) fn fire_close(&self) {
        let hook = self.slots.read().on_close.clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}
