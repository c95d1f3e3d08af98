// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lifecycle hooks fired during resolution
//!
//! - `on_init` runs before an instance's children are resolved
//! - `on_first_load` runs exactly once, after the children
//! - `on_load` runs on every visit, cache hits included

use std::collections::HashMap;
use std::sync::Arc;

use crate::diagnostics::Diagnostics;
use crate::graph::InstanceGraph;
use crate::record::EntityId;
use crate::schema::EntityKind;

/// State threaded through resolution alongside the graph
pub trait HookContext {
    fn diagnostics(&mut self) -> &mut Diagnostics;
}

impl HookContext for Diagnostics {
    fn diagnostics(&mut self) -> &mut Diagnostics {
        self
    }
}

/// Per-kind lifecycle strategy
pub trait InstanceHook<C> {
    /// Kinds this hook is registered for
    fn supported_kinds(&self) -> Vec<EntityKind>;

    fn on_init(&self, _ctx: &mut C, _graph: &mut InstanceGraph, _id: EntityId) {}

    fn on_first_load(&self, _ctx: &mut C, _graph: &mut InstanceGraph, _id: EntityId) {}

    fn on_load(&self, _ctx: &mut C, _graph: &mut InstanceGraph, _id: EntityId) {}
}

/// Hook dispatch table keyed by entity kind
pub struct HookTable<C> {
    hooks: HashMap<EntityKind, Arc<dyn InstanceHook<C>>>,
}

impl<C> HookTable<C> {
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Register a hook for every kind it supports
    pub fn register(&mut self, hook: Arc<dyn InstanceHook<C>>) {
        for kind in hook.supported_kinds() {
            self.hooks.insert(kind, Arc::clone(&hook));
        }
    }

    #[inline]
    pub fn get(&self, kind: EntityKind) -> Option<&Arc<dyn InstanceHook<C>>> {
        self.hooks.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<C> Default for HookTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
