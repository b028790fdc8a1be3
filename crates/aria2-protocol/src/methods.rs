//! Method and notification tables
//!
//! Both tables are written once as macro lists so that other crates can
//! generate code from them (the client derives one shortcut per method and
//! one handler setter per notification).
//!
//! See <https://aria2.github.io/manual/en/html/aria2c.html#methods>.

use crate::envelope::PRIMARY_NAMESPACE;

/// Invoke `$callback! { Variant => "full.name", shortcut; ... }` with every
/// method the daemon exposes.
#[macro_export]
macro_rules! for_each_method {
    ($callback:ident) => {
        $callback! {
            AddUri => "aria2.addUri", add_uri;
            AddTorrent => "aria2.addTorrent", add_torrent;
            AddMetalink => "aria2.addMetalink", add_metalink;
            Remove => "aria2.remove", remove;
            ForceRemove => "aria2.forceRemove", force_remove;
            Pause => "aria2.pause", pause;
            PauseAll => "aria2.pauseAll", pause_all;
            ForcePause => "aria2.forcePause", force_pause;
            ForcePauseAll => "aria2.forcePauseAll", force_pause_all;
            Unpause => "aria2.unpause", unpause;
            UnpauseAll => "aria2.unpauseAll", unpause_all;
            TellStatus => "aria2.tellStatus", tell_status;
            GetUris => "aria2.getUris", get_uris;
            GetFiles => "aria2.getFiles", get_files;
            GetPeers => "aria2.getPeers", get_peers;
            GetServers => "aria2.getServers", get_servers;
            TellActive => "aria2.tellActive", tell_active;
            TellWaiting => "aria2.tellWaiting", tell_waiting;
            TellStopped => "aria2.tellStopped", tell_stopped;
            ChangePosition => "aria2.changePosition", change_position;
            ChangeUri => "aria2.changeUri", change_uri;
            GetOption => "aria2.getOption", get_option;
            ChangeOption => "aria2.changeOption", change_option;
            GetGlobalOption => "aria2.getGlobalOption", get_global_option;
            ChangeGlobalOption => "aria2.changeGlobalOption", change_global_option;
            GetGlobalStat => "aria2.getGlobalStat", get_global_stat;
            PurgeDownloadResult => "aria2.purgeDownloadResult", purge_download_result;
            RemoveDownloadResult => "aria2.removeDownloadResult", remove_download_result;
            GetVersion => "aria2.getVersion", get_version;
            GetSessionInfo => "aria2.getSessionInfo", get_session_info;
            Shutdown => "aria2.shutdown", shutdown;
            ForceShutdown => "aria2.forceShutdown", force_shutdown;
            SaveSession => "aria2.saveSession", save_session;
            Multicall => "system.multicall", multicall;
            ListMethods => "system.listMethods", list_methods;
            ListNotifications => "system.listNotifications", list_notifications;
        }
    };
}

/// Invoke `$callback! { Variant => "onName", setter; ... }` with every
/// notification the daemon pushes.
#[macro_export]
macro_rules! for_each_notification {
    ($callback:ident) => {
        $callback! {
            DownloadStart => "onDownloadStart", on_download_start;
            DownloadPause => "onDownloadPause", on_download_pause;
            DownloadStop => "onDownloadStop", on_download_stop;
            DownloadComplete => "onDownloadComplete", on_download_complete;
            DownloadError => "onDownloadError", on_download_error;
            BtDownloadComplete => "onBtDownloadComplete", on_bt_download_complete;
        }
    };
}

macro_rules! define_methods {
    ($($variant:ident => $full:literal, $shortcut:ident;)*) => {
        /// A daemon method.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Method {
            $(
                #[doc = concat!("`", $full, "`")]
                $variant,
            )*
        }

        impl Method {
            pub const ALL: &'static [Method] = &[$(Method::$variant),*];

            /// Fully namespaced name, as sent on the wire.
            pub const fn full_name(self) -> &'static str {
                match self {
                    $(Method::$variant => $full,)*
                }
            }

            /// Rust name of the generated client shortcut.
            pub const fn shortcut_ident(self) -> &'static str {
                match self {
                    $(Method::$variant => stringify!($shortcut),)*
                }
            }
        }
    };
}

macro_rules! define_notifications {
    ($($variant:ident => $bare:literal, $setter:ident;)*) => {
        /// A notification pushed by the daemon over the duplex transport.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Notification {
            $(
                #[doc = concat!("`aria2.", $bare, "`")]
                $variant,
            )*
        }

        impl Notification {
            pub const ALL: &'static [Notification] = &[$(Notification::$variant),*];

            /// Name without the namespace, e.g. `onDownloadStart`.
            pub const fn bare_name(self) -> &'static str {
                match self {
                    $(Notification::$variant => $bare,)*
                }
            }
        }
    };
}

for_each_method!(define_methods);
for_each_notification!(define_notifications);

impl Method {
    /// Last namespace segment, e.g. `addUri` or `listMethods`.
    pub fn shortcut_name(self) -> &'static str {
        let full = self.full_name();
        full.rsplit_once('.').map_or(full, |(_, name)| name)
    }

    pub fn is_system(self) -> bool {
        self.full_name().starts_with(crate::envelope::SYSTEM_NAMESPACE)
    }

    /// Look a method up by its full or shortcut name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.full_name() == name || m.shortcut_name() == name)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.full_name())
    }
}

impl Notification {
    pub fn from_bare_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|n| n.bare_name() == name)
    }

    /// Resolve a notification method such as `aria2.onDownloadComplete`.
    /// The primary namespace is stripped when present; any other prefix
    /// makes the name unrecognized.
    pub fn from_method(method: &str) -> Option<Self> {
        Self::from_bare_name(method.strip_prefix(PRIMARY_NAMESPACE).unwrap_or(method))
    }

    pub fn method_name(self) -> String {
        format!("{PRIMARY_NAMESPACE}{}", self.bare_name())
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.bare_name())
    }
}

/// Client lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Open,
    Close,
    Send,
    Message,
}

impl Event {
    pub const ALL: &'static [Event] = &[Event::Open, Event::Close, Event::Send, Event::Message];

    pub const fn name(self) -> &'static str {
        match self {
            Event::Open => "onopen",
            Event::Close => "onclose",
            Event::Send => "onsend",
            Event::Message => "onmessage",
        }
    }
}
