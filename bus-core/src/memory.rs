//! In-memory configuration store
//!
//! Backs tests and demos; the server uses the PostgreSQL store. Listings are
//! name-sorted so lookups that take "the first match" are deterministic.

use crate::model::*;
use crate::store::ConfigStore;
use crate::{Error, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory [`ConfigStore`]
#[derive(Default)]
pub struct MemoryStore {
    systems: DashMap<Uuid, System>,
    routes: DashMap<Uuid, Route>,
    threads: DashMap<Uuid, Thread>,
    groups: DashMap<Uuid, ThreadGroup>,
    settings: DashMap<Uuid, ConnectionSetting>,
    auths: DashMap<Uuid, ConnectionAuthentication>,
    // Bindings have a composite key; insertion order is preserved so
    // thread_route_by_route returns the earliest binding, matching the
    // relational store's LIMIT 1 reads.
    bindings: Mutex<Vec<ThreadRoute>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_name<T: Clone>(items: impl Iterator<Item = T>, name: impl Fn(&T) -> String) -> Vec<T> {
    let mut out: Vec<T> = items.collect();
    out.sort_by_key(&name);
    out
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn thread_with_group(&self, thread_id: Uuid) -> Result<(Thread, ThreadGroup)> {
        let thread = self
            .threads
            .get(&thread_id)
            .map(|t| t.value().clone())
            .ok_or_else(|| Error::not_found("thread", thread_id))?;
        let group = self
            .groups
            .get(&thread.group_id)
            .map(|g| g.value().clone())
            .ok_or_else(|| Error::not_found("thread group", thread.group_id))?;
        Ok((thread, group))
    }

    async fn thread_routes_by_direction(
        &self,
        thread_id: Uuid,
        direction: Direction,
    ) -> Result<Vec<ThreadRoute>> {
        let bindings = self.bindings.lock().expect("bindings lock");
        Ok(bindings
            .iter()
            .filter(|b| b.thread_id == thread_id && b.direction == direction)
            .cloned()
            .collect())
    }

    async fn thread_route_by_route(&self, route_id: Uuid) -> Result<ThreadRoute> {
        let bindings = self.bindings.lock().expect("bindings lock");
        bindings
            .iter()
            .find(|b| b.route_id == route_id)
            .cloned()
            .ok_or_else(|| Error::not_found("thread route", route_id))
    }

    async fn route(&self, route_id: Uuid) -> Result<Route> {
        self.routes
            .get(&route_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| Error::not_found("route", route_id))
    }

    async fn routes_by_system(&self, system_id: Uuid) -> Result<Vec<Route>> {
        Ok(sorted_by_name(
            self.routes
                .iter()
                .filter(|r| r.system_id == system_id)
                .map(|r| r.value().clone()),
            |r| r.name.clone(),
        ))
    }

    async fn connection_setting(&self, system_id: Uuid) -> Result<ConnectionSetting> {
        self.settings
            .iter()
            .find(|s| s.system_id == system_id)
            .map(|s| s.value().clone())
            .ok_or_else(|| Error::not_found("connection setting", system_id))
    }

    async fn connection_auth(&self, auth_id: Uuid) -> Result<ConnectionAuthentication> {
        self.auths
            .get(&auth_id)
            .map(|a| a.value().clone())
            .ok_or_else(|| Error::not_found("connection auth", auth_id))
    }

    async fn systems(&self) -> Result<Vec<System>> {
        Ok(sorted_by_name(
            self.systems.iter().map(|s| s.value().clone()),
            |s| s.name.clone(),
        ))
    }

    async fn create_system(&self, system: System) -> Result<System> {
        self.systems.insert(system.id, system.clone());
        Ok(system)
    }

    async fn delete_system(&self, id: Uuid) -> Result<()> {
        self.systems.remove(&id);
        Ok(())
    }

    async fn routes(&self) -> Result<Vec<Route>> {
        Ok(sorted_by_name(self.routes.iter().map(|r| r.value().clone()), |r| {
            r.name.clone()
        }))
    }

    async fn create_route(&self, route: Route) -> Result<Route> {
        if !self.systems.contains_key(&route.system_id) {
            return Err(Error::BrokenReference {
                entity: "route",
                referenced: "system",
                key: route.system_id.to_string(),
            });
        }
        self.routes.insert(route.id, route.clone());
        Ok(route)
    }

    async fn delete_route(&self, id: Uuid) -> Result<()> {
        self.routes.remove(&id);
        Ok(())
    }

    async fn thread_groups(&self) -> Result<Vec<ThreadGroup>> {
        Ok(sorted_by_name(self.groups.iter().map(|g| g.value().clone()), |g| {
            g.name.clone()
        }))
    }

    async fn create_thread_group(&self, group: ThreadGroup) -> Result<ThreadGroup> {
        self.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn delete_thread_group(&self, id: Uuid) -> Result<()> {
        self.groups.remove(&id);
        Ok(())
    }

    async fn threads(&self) -> Result<Vec<Thread>> {
        Ok(sorted_by_name(
            self.threads.iter().map(|t| t.value().clone()),
            |t| t.name.clone(),
        ))
    }

    async fn create_thread(&self, thread: Thread) -> Result<Thread> {
        if !self.groups.contains_key(&thread.group_id) {
            return Err(Error::BrokenReference {
                entity: "thread",
                referenced: "thread group",
                key: thread.group_id.to_string(),
            });
        }
        self.threads.insert(thread.id, thread.clone());
        Ok(thread)
    }

    async fn delete_thread(&self, id: Uuid) -> Result<()> {
        self.threads.remove(&id);
        Ok(())
    }

    async fn create_thread_route(&self, binding: ThreadRoute) -> Result<()> {
        let mut bindings = self.bindings.lock().expect("bindings lock");
        let exists = bindings.iter().any(|b| {
            b.thread_id == binding.thread_id
                && b.direction == binding.direction
                && b.route_id == binding.route_id
        });
        if !exists {
            bindings.push(binding);
        }
        Ok(())
    }

    async fn create_connection_setting(
        &self,
        setting: ConnectionSetting,
    ) -> Result<ConnectionSetting> {
        self.settings.insert(setting.id, setting.clone());
        Ok(setting)
    }

    async fn create_connection_auth(
        &self,
        auth: ConnectionAuthentication,
    ) -> Result<ConnectionAuthentication> {
        self.auths.insert(auth.id, auth.clone());
        Ok(auth)
    }
}
