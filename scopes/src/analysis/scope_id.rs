//! Scope id assignment by name equality
//!
//! Two timers share a scope id if and only if they share their name and their
//! kind: a synchronous and an asynchronous scope called `"Load"` are distinct
//! scopes. Instrumented functions registered up front keep their function id
//! as scope id, and generated ids start above the largest of them.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::ScopeId;
use crate::reconstruction::{Timer, TimerKind};

/// What produced the timers of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    InstrumentedFunction,
    ApiScope,
    ApiScopeAsync,
}

impl From<TimerKind> for ScopeType {
    fn from(kind: TimerKind) -> Self {
        match kind {
            TimerKind::SyncScope => ScopeType::ApiScope,
            TimerKind::AsyncScope => ScopeType::ApiScopeAsync,
        }
    }
}

/// Identity of a scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeInfo {
    pub name: String,
    pub scope_type: ScopeType,
}

/// A function instrumented before the capture started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentedFunction {
    pub function_id: u64,
    pub name: String,
}

/// Hands out one [`ScopeId`] per distinct `(name, kind)`
#[derive(Debug)]
pub struct NameEqualityScopeIdProvider {
    next_id: u64,
    max_instrumented_function_id: u64,
    info_to_id: HashMap<ScopeInfo, ScopeId>,
    id_to_info: HashMap<ScopeId, ScopeInfo>,
}

impl Default for NameEqualityScopeIdProvider {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl NameEqualityScopeIdProvider {
    /// Create a provider seeded with the capture's instrumented functions
    ///
    /// Functions with the reserved id 0 are skipped, and so is `u64::MAX`,
    /// which leaves no id to generate above it.
    #[must_use]
    pub fn new(instrumented_functions: &[InstrumentedFunction]) -> Self {
        let mut info_to_id = HashMap::new();
        let mut id_to_info = HashMap::new();
        let mut max_instrumented_function_id = 0;

        for function in instrumented_functions {
            let scope_id = ScopeId(function.function_id);
            if !scope_id.is_valid() {
                warn!("Skipping instrumented function '{}' with reserved id 0", function.name);
                continue;
            }
            if function.function_id.checked_add(1).is_none() {
                warn!(
                    "Skipping instrumented function '{}' with id {}, no scope ids are left above it",
                    function.name, function.function_id
                );
                continue;
            }
            let info = ScopeInfo {
                name: function.name.clone(),
                scope_type: ScopeType::InstrumentedFunction,
            };
            info_to_id.insert(info.clone(), scope_id);
            id_to_info.insert(scope_id, info);
            max_instrumented_function_id = max_instrumented_function_id.max(function.function_id);
        }

        Self {
            next_id: max_instrumented_function_id + 1,
            max_instrumented_function_id,
            info_to_id,
            id_to_info,
        }
    }

    /// Scope id of an instrumented function, if it was registered
    #[must_use]
    pub fn function_id_to_scope_id(&self, function_id: u64) -> Option<ScopeId> {
        let scope_id = ScopeId(function_id);
        self.is_instrumented_function(scope_id).then_some(scope_id)
    }

    /// Function id behind a scope id, 0 if the scope is not a function
    #[must_use]
    pub fn scope_id_to_function_id(&self, scope_id: ScopeId) -> u64 {
        if self.is_instrumented_function(scope_id) {
            scope_id.0
        } else {
            0
        }
    }

    fn is_instrumented_function(&self, scope_id: ScopeId) -> bool {
        scope_id.0 <= self.max_instrumented_function_id && self.id_to_info.contains_key(&scope_id)
    }

    /// Scope id for `timer`, assigning a new one on first sight of its identity
    ///
    /// A timer carrying a registered function id gets that function's scope.
    /// Returns [`ScopeId::NONE`] once every id is taken.
    pub fn provide_id(&mut self, timer: &Timer) -> ScopeId {
        if let Some(scope_id) = self.function_id_to_scope_id(timer.function_id) {
            return scope_id;
        }

        let info = ScopeInfo { name: timer.name.clone(), scope_type: timer.kind.into() };
        if let Some(&scope_id) = self.info_to_id.get(&info) {
            return scope_id;
        }

        let Some(following) = self.next_id.checked_add(1) else {
            warn!("Scope ids exhausted, '{}' is not aggregated", info.name);
            return ScopeId::NONE;
        };
        let scope_id = ScopeId(self.next_id);
        self.next_id = following;
        self.id_to_info.insert(scope_id, info.clone());
        self.info_to_id.insert(info, scope_id);
        scope_id
    }

    /// Every id known to the provider, ascending
    #[must_use]
    pub fn all_provided_scope_ids(&self) -> Vec<ScopeId> {
        let mut ids: Vec<ScopeId> = self.id_to_info.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn scope_info(&self, scope_id: ScopeId) -> Option<&ScopeInfo> {
        self.id_to_info.get(&scope_id)
    }
}
