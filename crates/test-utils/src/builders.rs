#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use collector_launcher::engine::{LaunchSettings, Launcher};
use collector_launcher::host::{AssetSource, FileStore};
use collector_launcher::payload::PermissionPolicy;
use collector_launcher::sink::MemorySink;

/// Builder for `LaunchSettings` to simplify test setup.
pub struct LaunchSettingsBuilder {
    settings: LaunchSettings,
}

impl LaunchSettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: LaunchSettings::default(),
        }
    }

    pub fn asset_name(mut self, name: &str) -> Self {
        self.settings.asset_name = name.to_string();
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.settings.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.settings.supervise.tag = tag.to_string();
        self
    }

    pub fn policy(mut self, policy: PermissionPolicy) -> Self {
        self.settings.permission_policy = policy;
        self
    }

    pub fn run_timeout(mut self, timeout: Duration) -> Self {
        self.settings.supervise.run_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> LaunchSettings {
        self.settings
    }

    /// Build a launcher that forwards into a fresh `MemorySink`.
    pub fn launcher(
        self,
        assets: Arc<dyn AssetSource>,
        store: Arc<dyn FileStore>,
    ) -> (Launcher, MemorySink) {
        let sink = MemorySink::new();
        let launcher = Launcher::new(self.build(), assets, store, Arc::new(sink.clone()));
        (launcher, sink)
    }
}

impl Default for LaunchSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
