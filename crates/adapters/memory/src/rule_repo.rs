//! In-memory rule repository.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use homeflux_app::ports::RuleRepository;
use homeflux_domain::error::HomeFluxError;
use homeflux_domain::id::{HomeId, RuleId};
use homeflux_domain::rule::AutomationRule;

/// Rule repository backed by a shared in-process map.
#[derive(Clone, Default)]
pub struct InMemoryRuleRepository {
    store: Arc<Mutex<HashMap<RuleId, AutomationRule>>>,
}

impl InMemoryRuleRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RuleId, AutomationRule>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RuleRepository for InMemoryRuleRepository {
    fn create(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, HomeFluxError>> + Send {
        self.lock().insert(rule.id, rule.clone());
        async { Ok(rule) }
    }

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, HomeFluxError>> + Send {
        let found = self.lock().get(&id).cloned();
        async { Ok(found) }
    }

    fn get_all(
        &self,
        home_id: HomeId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, HomeFluxError>> + Send {
        let mut rules: Vec<_> = self
            .lock()
            .values()
            .filter(|r| r.home_id == home_id)
            .cloned()
            .collect();
        rules.sort_by_key(|r| (r.created_at, r.id));
        async { Ok(rules) }
    }

    fn get_enabled(
        &self,
        home_id: HomeId,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, HomeFluxError>> + Send {
        let mut rules: Vec<_> = self
            .lock()
            .values()
            .filter(|r| r.home_id == home_id && r.enabled)
            .cloned()
            .collect();
        rules.sort_by_key(|r| (r.created_at, r.id));
        async { Ok(rules) }
    }

    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, HomeFluxError>> + Send {
        self.lock().insert(rule.id, rule.clone());
        async { Ok(rule) }
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), HomeFluxError>> + Send {
        self.lock().remove(&id);
        async { Ok(()) }
    }
}
