//! Rule repository port — persistence for automation rules.

use std::future::Future;

use homeflux_domain::error::HomeFluxError;
use homeflux_domain::id::{HomeId, RuleId};
use homeflux_domain::rule::AutomationRule;

/// Repository for persisting and querying [`AutomationRule`]s.
pub trait RuleRepository {
    /// Create a new rule in storage.
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, HomeFluxError>> + Send;

    /// Get a rule by its unique identifier.
    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, HomeFluxError>> + Send;

    /// Get all rules belonging to a home.
    fn get_all(
        &self,
        home_id: HomeId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, HomeFluxError>> + Send;

    /// Get all enabled rules belonging to a home.
    fn get_enabled(
        &self,
        home_id: HomeId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, HomeFluxError>> + Send;

    /// Update an existing rule (also used by the engine for stats bumps).
    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, HomeFluxError>> + Send;

    /// Delete a rule by its unique identifier.
    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), HomeFluxError>> + Send;
}
