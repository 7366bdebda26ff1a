//! Credentials loaded from the `BitbucketExplorer` provider settings.

use repoforge_plugin_api::prelude::*;
use std::fmt;

/// Settings the plugin requires, checked in this order.
pub const SETTINGS_SCHEMA: &[SettingDescriptor] = &[
    SettingDescriptor::new("username", "Username"),
    SettingDescriptor::new("password", "Password"),
    SettingDescriptor::new("team_id", "Team ID"),
];

/// Basic-auth credentials and the team whose repositories are listed.
#[derive(Clone, PartialEq, Eq)]
pub struct BitbucketCredentials {
    pub username: String,
    pub password: String,
    pub team_id: String,
}

impl BitbucketCredentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        team_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            team_id: team_id.into(),
        }
    }
}

impl FromSettings for BitbucketCredentials {
    const SCHEMA: &'static [SettingDescriptor] = SETTINGS_SCHEMA;

    fn from_settings(settings: ResolvedSettings) -> Result<Self> {
        Ok(Self {
            username: settings.require("username")?,
            password: settings.require("password")?,
            team_id: settings.require("team_id")?,
        })
    }
}

// Keep the password out of logs.
impl fmt::Debug for BitbucketCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitbucketCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("team_id", &self.team_id)
            .finish()
    }
}
