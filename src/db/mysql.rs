use std::future::Future;

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, Row};
use tokio::runtime::{Builder, Runtime};

use super::schema::{
    MYSQL_CREATE_STUDENTS, MYSQL_DELETE, MYSQL_FIND_BY_NAME, MYSQL_INSERT, MYSQL_SELECT_ALL,
    MYSQL_TABLE_EXISTS, MYSQL_UPDATE,
};
use super::StudentBackend;
use crate::config::ServerConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::models::Student;

/// Networked MySQL store. The driver is async, so calls are driven to
/// completion on a private current-thread runtime and block the caller.
pub struct MySqlBackend {
    options: MySqlConnectOptions,
    label: String,
    runtime: Runtime,
}

impl MySqlBackend {
    pub fn new(server: &ServerConfig) -> GatewayResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| GatewayError::connection("failed to start database runtime", err))?;
        Ok(Self {
            options: connect_options(server),
            label: format!(
                "mysql://{}@{}:{}/{}",
                server.user, server.host, server.port, server.database
            ),
            runtime,
        })
    }

    /// Connect, run `work`, and close the connection whatever `work` returned.
    fn with_connection<T, F, Fut>(&self, work: F) -> GatewayResult<T>
    where
        F: FnOnce(MySqlConnection) -> Fut,
        Fut: Future<Output = (MySqlConnection, Result<T, sqlx::Error>)>,
    {
        self.runtime.block_on(async {
            let conn = MySqlConnection::connect_with(&self.options)
                .await
                .map_err(|err| {
                    GatewayError::connection(format!("failed to connect to {}", self.label), err)
                })?;
            let (conn, result) = work(conn).await;
            if let Err(err) = conn.close().await {
                tracing::warn!(backend = %self.label, error = %err, "closing connection failed");
            }
            result.map_err(map_sqlx_error)
        })
    }

    fn mutate(&self, sql: &'static str, binds: Binds) -> GatewayResult<u64> {
        self.with_connection(|mut conn| async move {
            let result = async {
                let mut tx = conn.begin().await?;
                let mut query = sqlx::query(sql);
                for text in binds.text {
                    query = query.bind(text);
                }
                if let Some(id) = binds.id {
                    query = query.bind(id);
                }
                let done = query.execute(&mut *tx).await?;
                tx.commit().await?;
                Ok::<u64, sqlx::Error>(done.rows_affected())
            }
            .await;
            (conn, result)
        })
    }

    fn query_students(&self, sql: &'static str, name: Option<String>) -> GatewayResult<Vec<Student>> {
        self.with_connection(|mut conn| async move {
            let mut query = sqlx::query(sql);
            if let Some(name) = name {
                query = query.bind(name);
            }
            let result = query
                .fetch_all(&mut conn)
                .await
                .and_then(|rows| {
                    rows.iter()
                        .map(student_from_row)
                        .collect::<Result<Vec<_>, _>>()
                });
            (conn, result)
        })
    }
}

/// Values bound to a mutating statement, in placeholder order: the text
/// columns first, then the id.
struct Binds {
    text: Vec<String>,
    id: Option<i64>,
}

impl StudentBackend for MySqlBackend {
    fn ensure_schema(&self) -> GatewayResult<()> {
        // Accounts without CREATE privilege are still usable against an
        // existing table, so only issue the DDL when the table is missing.
        self.with_connection(|mut conn| async move {
            let result = async {
                let existing: i64 = sqlx::query_scalar(MYSQL_TABLE_EXISTS)
                    .fetch_one(&mut conn)
                    .await?;
                if existing == 0 {
                    sqlx::query(MYSQL_CREATE_STUDENTS).execute(&mut conn).await?;
                }
                Ok::<(), sqlx::Error>(())
            }
            .await;
            (conn, result)
        })
    }

    fn list_all(&self) -> GatewayResult<Vec<Student>> {
        self.query_students(MYSQL_SELECT_ALL, None)
    }

    fn insert(&self, name: &str, course: &str, mobile: &str) -> GatewayResult<()> {
        let binds = Binds {
            text: vec![name.to_string(), course.to_string(), mobile.to_string()],
            id: None,
        };
        self.mutate(MYSQL_INSERT, binds).map(|_| ())
    }

    fn update(&self, id: i64, name: &str, course: &str, mobile: &str) -> GatewayResult<u64> {
        let binds = Binds {
            text: vec![name.to_string(), course.to_string(), mobile.to_string()],
            id: Some(id),
        };
        self.mutate(MYSQL_UPDATE, binds)
    }

    fn delete(&self, id: i64) -> GatewayResult<u64> {
        self.mutate(
            MYSQL_DELETE,
            Binds {
                text: Vec::new(),
                id: Some(id),
            },
        )
    }

    fn find_by_name(&self, name: &str) -> GatewayResult<Vec<Student>> {
        self.query_students(MYSQL_FIND_BY_NAME, Some(name.to_string()))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

fn connect_options(server: &ServerConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&server.host)
        .port(server.port)
        .username(&server.user)
        .password(&server.password)
        .database(&server.database)
}

fn student_from_row(row: &MySqlRow) -> Result<Student, sqlx::Error> {
    Ok(Student {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        course: row.try_get("course")?,
        mobile: row.try_get("mobile")?,
    })
}

/// Transport failures mean the server went away mid-call; anything the server
/// answered with is a statement error.
fn map_sqlx_error(err: sqlx::Error) -> GatewayError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => GatewayError::connection("MySQL connection failed", err),
        _ => GatewayError::statement("MySQL statement failed", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> ServerConfig {
        ServerConfig {
            host: "db.internal".into(),
            port: 3307,
            user: "school".into(),
            password: "secret".into(),
            database: "registry".into(),
        }
    }

    #[test]
    fn label_omits_the_password() {
        let backend = MySqlBackend::new(&server()).unwrap();
        assert_eq!(backend.describe(), "mysql://school@db.internal:3307/registry");
        assert!(!backend.describe().contains("secret"));
    }

    #[test]
    fn connect_options_carry_the_server_settings() {
        let options = connect_options(&server());
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 3307);
        assert_eq!(options.get_username(), "school");
        assert_eq!(options.get_database(), Some("registry"));
    }

    #[test]
    fn unreachable_server_is_a_connection_error() {
        let backend = MySqlBackend::new(&ServerConfig {
            host: "127.0.0.1".into(),
            port: 1,
            ..server()
        })
        .unwrap();
        let err = backend.list_all().unwrap_err();
        assert!(matches!(err, GatewayError::Connection { .. }), "{err:?}");
    }

    #[test]
    fn server_answers_map_to_statement_errors() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, GatewayError::Statement { .. }));
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = map_sqlx_error(sqlx::Error::Io(io));
        assert!(matches!(err, GatewayError::Connection { .. }));
    }
}
