//! PostgreSQL configuration store
//!
//! Entities live in the relational schema under `migrations/`; enums are
//! stored as their wire text and parsed on read. Reads used at routing
//! time mirror the in-memory store's semantics: name-sorted listings,
//! `LIMIT 1` for the per-system connection setting and the first binding
//! of a route.

use async_trait::async_trait;
use bus_core::{
    ConfigStore, ConnectionAuthentication, ConnectionSetting, Direction, Error, Result, Route,
    System, Thread, ThreadGroup, ThreadRoute,
};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

/// Configuration store backed by PostgreSQL
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> Error {
    Error::Backend(e.to_string())
}

fn lookup(entity: &'static str, key: impl ToString) -> impl FnOnce(sqlx::Error) -> Error {
    let key = key.to_string();
    move |e| match e {
        sqlx::Error::RowNotFound => Error::NotFound { entity, key },
        other => Error::Backend(other.to_string()),
    }
}

fn system_from_row(row: &PgRow) -> Result<System> {
    Ok(System {
        id: row.try_get("ref").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
    })
}

fn route_from_row(row: &PgRow) -> Result<Route> {
    let method: String = row.try_get("method").map_err(backend)?;
    Ok(Route {
        id: row.try_get("ref").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
        path: row.try_get("path").map_err(backend)?,
        system_id: row.try_get("system").map_err(backend)?,
        method: method.parse()?,
    })
}

fn setting_from_row(row: &PgRow) -> Result<ConnectionSetting> {
    let port: i32 = row.try_get("port").map_err(backend)?;
    Ok(ConnectionSetting {
        id: row.try_get("ref").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
        system_id: row.try_get("system").map_err(backend)?,
        base_path: row.try_get("path").map_err(backend)?,
        port: port as u16,
        auth_id: row.try_get("auth").map_err(backend)?,
    })
}

fn auth_from_row(row: &PgRow) -> Result<ConnectionAuthentication> {
    let kind: String = row.try_get("type").map_err(backend)?;
    Ok(ConnectionAuthentication {
        id: row.try_get("ref").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
        system_id: row.try_get("system").map_err(backend)?,
        kind: kind.parse()?,
        username: row.try_get("username").map_err(backend)?,
        password: row.try_get("password").map_err(backend)?,
        token: row.try_get("token").map_err(backend)?,
    })
}

fn group_from_row(row: &PgRow) -> Result<ThreadGroup> {
    let protocol: String = row.try_get("protocol").map_err(backend)?;
    let broker: String = row.try_get("message_broker").map_err(backend)?;
    Ok(ThreadGroup {
        id: row.try_get("ref").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
        protocol: protocol.parse()?,
        parent_id: row.try_get("parent").map_err(backend)?,
        broker_type: broker.parse()?,
    })
}

fn thread_from_row(row: &PgRow) -> Result<Thread> {
    let convert_type: String = row.try_get("message_convert_type").map_err(backend)?;
    Ok(Thread {
        id: row.try_get("ref").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
        group_id: row.try_get("group").map_err(backend)?,
        convert_type: convert_type.parse()?,
    })
}

fn binding_from_row(row: &PgRow) -> Result<ThreadRoute> {
    let direction: String = row.try_get("direction").map_err(backend)?;
    let file_format: String = row.try_get("file_format").map_err(backend)?;
    Ok(ThreadRoute {
        thread_id: row.try_get("thread").map_err(backend)?,
        direction: direction.parse()?,
        route_id: row.try_get("route").map_err(backend)?,
        file_format: file_format.parse()?,
        object_id: row.try_get("object").map_err(backend)?,
        routine_id: row.try_get("routine").map_err(backend)?,
    })
}

#[async_trait]
impl ConfigStore for PgStore {
    async fn thread_with_group(&self, thread_id: Uuid) -> Result<(Thread, ThreadGroup)> {
        let row = sqlx::query(
            r#"SELECT ref, name, "group", message_convert_type FROM threads WHERE ref = $1"#,
        )
        .bind(thread_id)
        .fetch_one(&self.pool)
        .await
        .map_err(lookup("thread", thread_id))?;
        let thread = thread_from_row(&row)?;

        let row = sqlx::query(
            "SELECT ref, name, protocol, parent, message_broker FROM threads_groups WHERE ref = $1",
        )
        .bind(thread.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(lookup("thread group", thread.group_id))?;
        let group = group_from_row(&row)?;

        Ok((thread, group))
    }

    async fn thread_routes_by_direction(
        &self,
        thread_id: Uuid,
        direction: Direction,
    ) -> Result<Vec<ThreadRoute>> {
        let rows = sqlx::query(
            "SELECT thread, direction, route, file_format, object, routine \
             FROM thread_routes WHERE thread = $1 AND direction = $2",
        )
        .bind(thread_id)
        .bind(direction.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(binding_from_row).collect()
    }

    async fn thread_route_by_route(&self, route_id: Uuid) -> Result<ThreadRoute> {
        let row = sqlx::query(
            "SELECT thread, direction, route, file_format, object, routine \
             FROM thread_routes WHERE route = $1 LIMIT 1",
        )
        .bind(route_id)
        .fetch_one(&self.pool)
        .await
        .map_err(lookup("thread route", route_id))?;
        binding_from_row(&row)
    }

    async fn route(&self, route_id: Uuid) -> Result<Route> {
        let row = sqlx::query("SELECT ref, name, path, system, method FROM routes WHERE ref = $1")
            .bind(route_id)
            .fetch_one(&self.pool)
            .await
            .map_err(lookup("route", route_id))?;
        route_from_row(&row)
    }

    async fn routes_by_system(&self, system_id: Uuid) -> Result<Vec<Route>> {
        let rows = sqlx::query(
            "SELECT ref, name, path, system, method FROM routes WHERE system = $1 ORDER BY name",
        )
        .bind(system_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(route_from_row).collect()
    }

    async fn connection_setting(&self, system_id: Uuid) -> Result<ConnectionSetting> {
        let row = sqlx::query(
            "SELECT ref, name, system, path, port, auth \
             FROM connection_settings WHERE system = $1 LIMIT 1",
        )
        .bind(system_id)
        .fetch_one(&self.pool)
        .await
        .map_err(lookup("connection setting", system_id))?;
        setting_from_row(&row)
    }

    async fn connection_auth(&self, auth_id: Uuid) -> Result<ConnectionAuthentication> {
        let row = sqlx::query(
            "SELECT ref, name, system, type, username, password, token \
             FROM connection_authentications WHERE ref = $1",
        )
        .bind(auth_id)
        .fetch_one(&self.pool)
        .await
        .map_err(lookup("connection auth", auth_id))?;
        auth_from_row(&row)
    }

    async fn systems(&self) -> Result<Vec<System>> {
        let rows = sqlx::query("SELECT ref, name FROM systems ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(system_from_row).collect()
    }

    async fn create_system(&self, system: System) -> Result<System> {
        sqlx::query("INSERT INTO systems (ref, name) VALUES ($1, $2)")
            .bind(system.id)
            .bind(&system.name)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(system)
    }

    async fn delete_system(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM systems WHERE ref = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn routes(&self) -> Result<Vec<Route>> {
        let rows = sqlx::query("SELECT ref, name, path, system, method FROM routes ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(route_from_row).collect()
    }

    async fn create_route(&self, route: Route) -> Result<Route> {
        sqlx::query("INSERT INTO routes (ref, name, path, system, method) VALUES ($1, $2, $3, $4, $5)")
            .bind(route.id)
            .bind(&route.name)
            .bind(&route.path)
            .bind(route.system_id)
            .bind(route.method.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                // Surface the foreign-key invariant as a broken reference
                sqlx::Error::Database(db) if db.constraint().is_some() => Error::BrokenReference {
                    entity: "route",
                    referenced: "system",
                    key: route.system_id.to_string(),
                },
                _ => backend(e),
            })?;
        Ok(route)
    }

    async fn delete_route(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM routes WHERE ref = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn thread_groups(&self) -> Result<Vec<ThreadGroup>> {
        let rows = sqlx::query(
            "SELECT ref, name, protocol, parent, message_broker FROM threads_groups ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(group_from_row).collect()
    }

    async fn create_thread_group(&self, group: ThreadGroup) -> Result<ThreadGroup> {
        sqlx::query(
            "INSERT INTO threads_groups (ref, name, protocol, parent, message_broker) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(group.protocol.to_string())
        .bind(group.parent_id)
        .bind(group.broker_type.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(group)
    }

    async fn delete_thread_group(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM threads_groups WHERE ref = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn threads(&self) -> Result<Vec<Thread>> {
        let rows = sqlx::query(
            r#"SELECT ref, name, "group", message_convert_type FROM threads ORDER BY name"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(thread_from_row).collect()
    }

    async fn create_thread(&self, thread: Thread) -> Result<Thread> {
        sqlx::query(
            r#"INSERT INTO threads (ref, name, "group", message_convert_type) VALUES ($1, $2, $3, $4)"#,
        )
        .bind(thread.id)
        .bind(&thread.name)
        .bind(thread.group_id)
        .bind(thread.convert_type.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint().is_some() => Error::BrokenReference {
                entity: "thread",
                referenced: "thread group",
                key: thread.group_id.to_string(),
            },
            _ => backend(e),
        })?;
        Ok(thread)
    }

    async fn delete_thread(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM threads WHERE ref = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn create_thread_route(&self, binding: ThreadRoute) -> Result<()> {
        sqlx::query(
            "INSERT INTO thread_routes (thread, direction, route, file_format, object, routine) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (thread, direction, route) DO NOTHING",
        )
        .bind(binding.thread_id)
        .bind(binding.direction.to_string())
        .bind(binding.route_id)
        .bind(binding.file_format.to_string())
        .bind(binding.object_id)
        .bind(binding.routine_id)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn create_connection_setting(
        &self,
        setting: ConnectionSetting,
    ) -> Result<ConnectionSetting> {
        sqlx::query(
            "INSERT INTO connection_settings (ref, name, system, path, port, auth) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(setting.id)
        .bind(&setting.name)
        .bind(setting.system_id)
        .bind(&setting.base_path)
        .bind(setting.port as i32)
        .bind(setting.auth_id)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(setting)
    }

    async fn create_connection_auth(
        &self,
        auth: ConnectionAuthentication,
    ) -> Result<ConnectionAuthentication> {
        sqlx::query(
            "INSERT INTO connection_authentications (ref, name, system, type, username, password, token) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(auth.id)
        .bind(&auth.name)
        .bind(auth.system_id)
        .bind(auth.kind.to_string())
        .bind(&auth.username)
        .bind(&auth.password)
        .bind(&auth.token)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(auth)
    }
}
