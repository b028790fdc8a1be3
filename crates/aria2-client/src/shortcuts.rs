//! Per-method shortcuts and per-notification setters, generated from the
//! protocol tables.

use aria2_protocol::{Method, Notification};
use serde_json::Value;

use crate::client::{Aria2Client, PendingCall};
use crate::error::Result;

macro_rules! define_shortcuts {
    ($($variant:ident => $full:literal, $shortcut:ident;)*) => {
        impl Aria2Client {
            $(
                #[doc = concat!("Call `", $full, "`.")]
                pub fn $shortcut(&self, params: Vec<Value>) -> Result<PendingCall> {
                    self.call_method(Method::$variant, params)
                }
            )*
        }
    };
}

macro_rules! define_notification_setters {
    ($($variant:ident => $bare:literal, $setter:ident;)*) => {
        impl Aria2Client {
            $(
                #[doc = concat!("Handle `aria2.", $bare, "`. Replaces any previous handler.")]
                pub fn $setter<F>(&self, handler: F)
                where
                    F: Fn(&[Value]) + Send + Sync + 'static,
                {
                    self.on_notification(Notification::$variant, handler);
                }
            )*
        }
    };
}

aria2_protocol::for_each_method!(define_shortcuts);
aria2_protocol::for_each_notification!(define_notification_setters);
