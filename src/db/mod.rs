//! Persistence layer split across one gateway and two interchangeable
//! backends. Every operation opens its own connection, runs one statement and
//! releases the connection before returning.

mod mysql;
mod schema;
mod sqlite;

use tracing::{debug, error};

use crate::config::StoreConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::models::Student;
use crate::validation::ValidationRules;

pub use mysql::MySqlBackend;
pub use sqlite::SqliteBackend;

/// A concrete store behind the gateway. Implementations bind every value as a
/// parameter and never hold a connection between calls.
pub trait StudentBackend {
    /// Create the `students` table when it does not exist yet.
    fn ensure_schema(&self) -> GatewayResult<()>;
    fn list_all(&self) -> GatewayResult<Vec<Student>>;
    fn insert(&self, name: &str, course: &str, mobile: &str) -> GatewayResult<()>;
    /// Returns how many rows matched; zero is not an error.
    fn update(&self, id: i64, name: &str, course: &str, mobile: &str) -> GatewayResult<u64>;
    /// Returns how many rows were removed; zero is not an error.
    fn delete(&self, id: i64) -> GatewayResult<u64>;
    fn find_by_name(&self, name: &str) -> GatewayResult<Vec<Student>>;
    /// Log-safe label such as `sqlite:/path` or `mysql://user@host:3306/db`.
    fn describe(&self) -> String;
}

/// The only persistence type the controller talks to.
pub struct Gateway {
    backend: Box<dyn StudentBackend>,
    rules: ValidationRules,
}

impl Gateway {
    /// Pick the backend named by the configuration and make sure the table
    /// exists.
    pub fn open(store: &StoreConfig, rules: ValidationRules) -> GatewayResult<Self> {
        let backend: Box<dyn StudentBackend> = match store {
            StoreConfig::Sqlite { path } => Box::new(SqliteBackend::new(path)),
            StoreConfig::MySql(server) => Box::new(MySqlBackend::new(server)?),
        };
        Self::with_backend(backend, rules)
    }

    /// Wrap an already constructed backend.
    pub fn with_backend(
        backend: Box<dyn StudentBackend>,
        rules: ValidationRules,
    ) -> GatewayResult<Self> {
        let gateway = Self { backend, rules };
        gateway.observe("ensure_schema", None, gateway.backend.ensure_schema())?;
        Ok(gateway)
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    /// Every record in store-native order.
    pub fn list_all(&self) -> GatewayResult<Vec<Student>> {
        let students = self.observe("list_all", None, self.backend.list_all())?;
        debug!(rows = students.len(), "students listed");
        Ok(students)
    }

    /// Insert one record; the store assigns the id.
    pub fn insert(&self, name: &str, course: &str, mobile: &str) -> GatewayResult<()> {
        let checked = self.check(name, course, mobile);
        let result = checked.and_then(|()| self.backend.insert(name, course, mobile));
        self.observe("insert", None, result)
    }

    /// Rewrite name, course and mobile of the record with `id`. A stale id
    /// matches nothing and still succeeds.
    pub fn update(&self, id: i64, name: &str, course: &str, mobile: &str) -> GatewayResult<()> {
        let checked = self.check(name, course, mobile);
        let result = checked.and_then(|()| self.backend.update(id, name, course, mobile));
        let rows = self.observe("update", Some(id), result)?;
        debug!(id, rows, "update applied");
        Ok(())
    }

    /// Remove the record with `id`, if any.
    pub fn delete(&self, id: i64) -> GatewayResult<()> {
        let rows = self.observe("delete", Some(id), self.backend.delete(id))?;
        debug!(id, rows, "delete applied");
        Ok(())
    }

    /// Exact, case-sensitive match on the name column.
    pub fn find_by_name(&self, name: &str) -> GatewayResult<Vec<Student>> {
        let students = self.observe("find_by_name", None, self.backend.find_by_name(name))?;
        debug!(rows = students.len(), "name search finished");
        Ok(students)
    }

    fn check(&self, name: &str, course: &str, mobile: &str) -> GatewayResult<()> {
        self.rules
            .check(name, course, mobile)
            .map_err(GatewayError::from)
    }

    /// Emit one event per failed operation.
    fn observe<T>(
        &self,
        operation: &'static str,
        id: Option<i64>,
        result: GatewayResult<T>,
    ) -> GatewayResult<T> {
        if let Err(err) = &result {
            error!(
                operation,
                backend = %self.backend.describe(),
                id = ?id,
                kind = err.kind(),
                error = %err,
                "gateway operation failed"
            );
        } else {
            debug!(operation, backend = %self.backend.describe(), id = ?id, "gateway operation ok");
        }
        result
    }
}
