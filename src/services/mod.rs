//! Business logic services

pub mod availability;
pub mod catalog;
pub mod cooldown;
pub mod lending;
pub mod popularity;
pub mod users;

#[cfg(test)]
pub(crate) mod fixtures;

use config::ConfigError;

use crate::{
    config::{AuthConfig, LendingConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub availability: availability::AvailabilityService,
    pub lending: lending::LendingService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        lending_config: &LendingConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            availability: availability::AvailabilityService::new(repository.clone()),
            lending: lending::LendingService::new(
                repository.clone(),
                cooldown::CooldownPolicy::new(lending_config)?,
            ),
            users: users::UsersService::new(repository, auth_config),
        })
    }
}
