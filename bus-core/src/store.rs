//! Configuration store contract

use crate::model::*;
use crate::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Read/write access to bus configuration.
///
/// The routing engine only calls the read accessors; the administrative
/// operations back the management API. Implementations must be safe for
/// concurrent use.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    // --- reads used at routing time ---

    /// Resolve a thread together with its group
    async fn thread_with_group(&self, thread_id: Uuid) -> Result<(Thread, ThreadGroup)>;

    /// All thread routes for (thread, direction)
    async fn thread_routes_by_direction(
        &self,
        thread_id: Uuid,
        direction: Direction,
    ) -> Result<Vec<ThreadRoute>>;

    /// First thread route referencing a route
    async fn thread_route_by_route(&self, route_id: Uuid) -> Result<ThreadRoute>;

    /// Route by ID
    async fn route(&self, route_id: Uuid) -> Result<Route>;

    /// Routes belonging to a system
    async fn routes_by_system(&self, system_id: Uuid) -> Result<Vec<Route>>;

    /// The system's connection setting (at most one active per system)
    async fn connection_setting(&self, system_id: Uuid) -> Result<ConnectionSetting>;

    /// Credential record by ID
    async fn connection_auth(&self, auth_id: Uuid) -> Result<ConnectionAuthentication>;

    /// All systems, name-sorted
    async fn systems(&self) -> Result<Vec<System>>;

    // --- administrative writes ---

    /// Register a system
    async fn create_system(&self, system: System) -> Result<System>;

    /// Delete a system
    async fn delete_system(&self, id: Uuid) -> Result<()>;

    /// All routes, name-sorted
    async fn routes(&self) -> Result<Vec<Route>>;

    /// Register a route; the referenced system must exist
    async fn create_route(&self, route: Route) -> Result<Route>;

    /// Delete a route
    async fn delete_route(&self, id: Uuid) -> Result<()>;

    /// All thread groups, name-sorted
    async fn thread_groups(&self) -> Result<Vec<ThreadGroup>>;

    /// Register a thread group
    async fn create_thread_group(&self, group: ThreadGroup) -> Result<ThreadGroup>;

    /// Delete a thread group
    async fn delete_thread_group(&self, id: Uuid) -> Result<()>;

    /// All threads, name-sorted
    async fn threads(&self) -> Result<Vec<Thread>>;

    /// Register a thread; the referenced group must exist
    async fn create_thread(&self, thread: Thread) -> Result<Thread>;

    /// Delete a thread
    async fn delete_thread(&self, id: Uuid) -> Result<()>;

    /// Bind a thread + direction to a route; no-op if the binding exists
    async fn create_thread_route(&self, binding: ThreadRoute) -> Result<()>;

    /// Register a connection setting
    async fn create_connection_setting(
        &self,
        setting: ConnectionSetting,
    ) -> Result<ConnectionSetting>;

    /// Register credential material
    async fn create_connection_auth(
        &self,
        auth: ConnectionAuthentication,
    ) -> Result<ConnectionAuthentication>;
}
