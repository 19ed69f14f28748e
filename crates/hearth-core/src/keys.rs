//! Storage key names shared by every backend.
//!
//! These strings are part of the persisted format; renaming one orphans the
//! data already stored under it.

/// Keys held by the durable store.
pub mod durable {
    pub const USER: &str = "user";
    pub const THEME_MODE: &str = "theme-mode";
    pub const LANGUAGE: &str = "language";
    pub const SCROLL_POSITION: &str = "scroll-position";
    pub const PREFERENCES: &str = "preferences";
    pub const DEVICE_SETTINGS: &str = "device-settings";
    pub const CUSTOM_MODELS: &str = "custom_models";
    pub const SELECTED_MODEL: &str = "selected_model";
}

/// Keys held by the short-lived cookie store.
pub mod cookie {
    pub const LOGGED_IN: &str = "logged-in";
    pub const USERNAME: &str = "username";
    pub const USER_EMAIL: &str = "user-email";
    pub const USER_ID: &str = "user-id";
    pub const LANGUAGE: &str = "language";
    pub const THEME: &str = "theme";

    /// Value written under [`LOGGED_IN`].
    pub const LOGGED_IN_VALUE: &str = "true";

    /// Every marker owned by the session lifecycle.
    pub const SESSION_MARKERS: [&str; 4] = [LOGGED_IN, USERNAME, USER_EMAIL, USER_ID];
}
