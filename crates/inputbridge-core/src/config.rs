use serde::{Deserialize, Serialize};
use std::fs;

use crate::dispatch::DispatchMode;
use crate::error::{BridgeError, BridgeResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Dispatch mode in effect until the first attach call overrides it.
    #[serde(default = "default_dispatch")]
    pub dispatch: DispatchMode,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Receiver of queued events inside the embedded runtime.
    #[serde(default = "default_receiver_class")]
    pub receiver_class: String,

    #[serde(default = "default_receiver_method")]
    pub receiver_method: String,

    /// Host-side clipboard accessor, a static method on `receiver_class`.
    #[serde(default = "default_clipboard_method")]
    pub clipboard_method: String,

    #[serde(default = "default_ui_class")]
    pub ui_class: String,

    #[serde(default)]
    pub ui_methods: UiMethodNames,
}

/// Static methods on `ui_class` that the UI relay calls on the host runtime.
///
/// These names are a contract with the host build, not something this crate can check. The
/// defaults follow the host's `callback_<Controller>_<action>` convention. Not every host build
/// exports `progress`; override it to match the host in use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiMethodNames {
    #[serde(default = "default_install_requested")]
    pub install_requested: String,

    #[serde(default = "default_launch_surface")]
    pub launch_surface: String,

    #[serde(default = "default_touch")]
    pub touch: String,

    #[serde(default = "default_progress")]
    pub progress: String,
}

fn default_dispatch() -> DispatchMode {
    DispatchMode::Queued
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_receiver_class() -> String {
    "org/lwjgl/glfw/CallbackBridge".to_string()
}
fn default_receiver_method() -> String {
    "receiveCallback".to_string()
}
fn default_clipboard_method() -> String {
    "accessAndroidClipboard".to_string()
}
fn default_ui_class() -> String {
    "net/kdt/pojavlaunch/uikit/UIKit".to_string()
}
fn default_install_requested() -> String {
    "callback_LauncherViewController_installMinecraft".to_string()
}
fn default_launch_surface() -> String {
    "callback_SurfaceViewController_launchMinecraft".to_string()
}
fn default_touch() -> String {
    "callback_SurfaceViewController_onTouch".to_string()
}
fn default_progress() -> String {
    "callback_ProgressViewController_updateProgress".to_string()
}

impl Default for UiMethodNames {
    fn default() -> Self {
        Self {
            install_requested: default_install_requested(),
            launch_surface: default_launch_surface(),
            touch: default_touch(),
            progress: default_progress(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            dispatch: default_dispatch(),
            log_level: default_log_level(),
            receiver_class: default_receiver_class(),
            receiver_method: default_receiver_method(),
            clipboard_method: default_clipboard_method(),
            ui_class: default_ui_class(),
            ui_methods: UiMethodNames::default(),
        }
    }
}

impl BridgeConfig {
    pub fn load_or_default(path: &str) -> BridgeResult<Self> {
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml(&s)
                .map_err(|e| BridgeError::Config(format!("parse {}: {}", path, e))),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_toml(src: &str) -> BridgeResult<Self> {
        toml::from_str(src).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// `log_level` parsed into a filter; unknown names fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = BridgeConfig::from_toml("").unwrap();
        assert_eq!(cfg.dispatch, DispatchMode::Queued);
        assert_eq!(cfg.receiver_class, "org/lwjgl/glfw/CallbackBridge");
        assert_eq!(cfg.receiver_method, "receiveCallback");
        assert_eq!(cfg.ui_methods.touch, "callback_SurfaceViewController_onTouch");
    }

    #[test]
    fn partial_document_overrides_fields() {
        let cfg = BridgeConfig::from_toml(
            r#"
            dispatch = "direct"
            log_level = "trace"

            [ui_methods]
            progress = "onProgress"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.dispatch, DispatchMode::Direct);
        assert_eq!(cfg.level_filter(), log::LevelFilter::Trace);
        assert_eq!(cfg.ui_methods.progress, "onProgress");
        assert_eq!(
            cfg.ui_methods.install_requested,
            "callback_LauncherViewController_installMinecraft"
        );
    }

    #[test]
    fn malformed_document_is_config_error() {
        let err = BridgeConfig::from_toml("dispatch = 3").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn missing_file_is_default() {
        let cfg = BridgeConfig::load_or_default("/nonexistent/inputbridge.toml").unwrap();
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let cfg = BridgeConfig {
            log_level: "loud".into(),
            ..BridgeConfig::default()
        };
        assert_eq!(cfg.level_filter(), log::LevelFilter::Info);
    }
}
