//! Maintenance task vocabulary
//!
//! The small fixed set of post-deploy commands operators run after pushing
//! a backend: install dependencies, migrate the schema, drop framework caches.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaintenanceTask {
    NpmInstall,
    ComposerInstall,
    Migrate,
    ClearCache,
    ClearViewCache,
    ClearConfigCache,
}

impl MaintenanceTask {
    pub const ALL: [MaintenanceTask; 6] = [
        MaintenanceTask::NpmInstall,
        MaintenanceTask::ComposerInstall,
        MaintenanceTask::Migrate,
        MaintenanceTask::ClearCache,
        MaintenanceTask::ClearViewCache,
        MaintenanceTask::ClearConfigCache,
    ];

    /// The shell command line this task expands to
    pub fn command_line(&self) -> &'static str {
        match self {
            MaintenanceTask::NpmInstall => "npm install",
            MaintenanceTask::ComposerInstall => {
                "composer install --no-interaction --no-dev --optimize-autoloader"
            }
            MaintenanceTask::Migrate => "php artisan migrate --force",
            MaintenanceTask::ClearCache => "php artisan cache:clear",
            MaintenanceTask::ClearViewCache => "php artisan view:clear",
            MaintenanceTask::ClearConfigCache => "php artisan config:clear",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MaintenanceTask::NpmInstall => "npm-install",
            MaintenanceTask::ComposerInstall => "composer-install",
            MaintenanceTask::Migrate => "migrate",
            MaintenanceTask::ClearCache => "clear-cache",
            MaintenanceTask::ClearViewCache => "clear-view-cache",
            MaintenanceTask::ClearConfigCache => "clear-config-cache",
        }
    }

    /// Dependency installs can take minutes on shared hosts
    pub fn is_long_running(&self) -> bool {
        matches!(
            self,
            MaintenanceTask::NpmInstall | MaintenanceTask::ComposerInstall
        )
    }
}

impl fmt::Display for MaintenanceTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_serde() {
        for task in MaintenanceTask::ALL {
            let json = serde_json::to_string(&task).unwrap();
            assert_eq!(json, format!("\"{}\"", task.name()));
            let parsed: MaintenanceTask = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, task);
        }
    }

    #[test]
    fn cache_tasks_use_artisan() {
        assert_eq!(
            MaintenanceTask::ClearCache.command_line(),
            "php artisan cache:clear"
        );
        assert_eq!(
            MaintenanceTask::Migrate.command_line(),
            "php artisan migrate --force"
        );
        assert!(!MaintenanceTask::ClearCache.is_long_running());
        assert!(MaintenanceTask::NpmInstall.is_long_running());
    }
}
