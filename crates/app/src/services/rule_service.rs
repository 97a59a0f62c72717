//! Rule service — use-cases for managing automation rules.

use homeflux_domain::error::{HomeFluxError, NotFoundError};
use homeflux_domain::id::{HomeId, RuleId};
use homeflux_domain::rule::AutomationRule;

use crate::ports::RuleRepository;

/// Application service for rule CRUD operations.
pub struct RuleService<R> {
    repo: R,
}

impl<R: RuleRepository> RuleService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new rule after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeFluxError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name))]
    pub async fn create_rule(&self, rule: AutomationRule) -> Result<AutomationRule, HomeFluxError> {
        rule.validate()?;
        self.repo.create(rule).await
    }

    /// Look up a rule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`HomeFluxError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, id: RuleId) -> Result<AutomationRule, HomeFluxError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Rule",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all rules of a home.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rules(&self, home_id: HomeId) -> Result<Vec<AutomationRule>, HomeFluxError> {
        self.repo.get_all(home_id).await
    }

    /// Delete a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`HomeFluxError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), HomeFluxError> {
        // Deleting an unknown id is surfaced, not silently ignored.
        self.get_rule(id).await?;
        self.repo.delete(id).await
    }
}
