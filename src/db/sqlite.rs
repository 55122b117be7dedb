use std::fs;
use std::path::PathBuf;

use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OpenFlags, Row};

use super::schema::{
    SQLITE_CREATE_STUDENTS, SQLITE_DELETE, SQLITE_FIND_BY_NAME, SQLITE_INSERT, SQLITE_SELECT_ALL,
    SQLITE_UPDATE,
};
use super::StudentBackend;
use crate::error::{GatewayError, GatewayResult};
use crate::models::Student;

/// Embedded single-file store. Only the path is kept; connections live for
/// one call.
pub struct SqliteBackend {
    path: PathBuf,
}

impl SqliteBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open a connection, hand it to `work`, and drop it before returning on
    /// both the success and the error path. Only schema bootstrap may create
    /// the file; a store that vanished later is a connection failure.
    fn with_connection<T>(
        &self,
        flags: OpenFlags,
        work: impl FnOnce(&mut Connection) -> Result<T, SqlError>,
    ) -> GatewayResult<T> {
        let mut conn = Connection::open_with_flags(&self.path, flags).map_err(|err| {
            GatewayError::connection(
                format!("failed to open SQLite database {}", self.path.display()),
                err,
            )
        })?;
        let result = work(&mut conn).map_err(map_sqlite_error);
        drop(conn);
        result
    }

    /// Run one mutating statement inside its own transaction and report the
    /// affected row count.
    fn mutate<P>(&self, sql: &str, params: P) -> GatewayResult<u64>
    where
        P: rusqlite::Params,
    {
        self.with_connection(existing_file(), |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(sql, params)?;
            tx.commit()?;
            Ok(changed as u64)
        })
    }

    fn query_students<P>(&self, sql: &str, params: P) -> GatewayResult<Vec<Student>>
    where
        P: rusqlite::Params,
    {
        self.with_connection(existing_file(), |conn| {
            let mut stmt = conn.prepare(sql)?;
            let students = stmt
                .query_map(params, student_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(students)
        })
    }
}

impl StudentBackend for SqliteBackend {
    fn ensure_schema(&self) -> GatewayResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                GatewayError::connection(
                    format!("failed to create data directory {}", parent.display()),
                    err,
                )
            })?;
        }
        let flags = existing_file() | OpenFlags::SQLITE_OPEN_CREATE;
        self.with_connection(flags, |conn| {
            conn.execute(SQLITE_CREATE_STUDENTS, []).map(|_| ())
        })
    }

    fn list_all(&self) -> GatewayResult<Vec<Student>> {
        self.query_students(SQLITE_SELECT_ALL, [])
    }

    fn insert(&self, name: &str, course: &str, mobile: &str) -> GatewayResult<()> {
        self.mutate(SQLITE_INSERT, params![name, course, mobile])
            .map(|_| ())
    }

    fn update(&self, id: i64, name: &str, course: &str, mobile: &str) -> GatewayResult<u64> {
        self.mutate(SQLITE_UPDATE, params![name, course, mobile, id])
    }

    fn delete(&self, id: i64) -> GatewayResult<u64> {
        self.mutate(SQLITE_DELETE, params![id])
    }

    fn find_by_name(&self, name: &str) -> GatewayResult<Vec<Student>> {
        self.query_students(SQLITE_FIND_BY_NAME, params![name])
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

/// `Connection::open` defaults minus `SQLITE_OPEN_CREATE`.
fn existing_file() -> OpenFlags {
    OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI
}

fn student_from_row(row: &Row<'_>) -> Result<Student, SqlError> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        course: row.get(2)?,
        mobile: row.get(3)?,
    })
}

/// Failures that mean the file itself is unusable count as connection errors;
/// everything else is the statement's fault.
fn map_sqlite_error(err: SqlError) -> GatewayError {
    match err.sqlite_error_code() {
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::PermissionDenied
            | ErrorCode::SystemIoFailure
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked,
        ) => GatewayError::connection("SQLite database is unusable", err),
        _ => GatewayError::statement("SQLite statement failed", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_schema_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("students.sqlite");
        let backend = SqliteBackend::new(&path);
        backend.ensure_schema().unwrap();
        assert!(path.exists());
        assert!(backend.list_all().unwrap().is_empty());
    }

    #[test]
    fn vanished_file_is_a_connection_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("students.sqlite");
        let backend = SqliteBackend::new(&path);
        backend.ensure_schema().unwrap();
        backend.insert("Ada", "Physics", "555").unwrap();
        fs::remove_file(&path).unwrap();

        let err = backend.list_all().unwrap_err();
        assert!(matches!(err, GatewayError::Connection { .. }), "{err:?}");
        let err = backend.insert("Ada", "Physics", "555").unwrap_err();
        assert!(matches!(err, GatewayError::Connection { .. }), "{err:?}");
        assert!(!path.exists());
    }

    #[test]
    fn missing_table_is_a_statement_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bare.sqlite");
        Connection::open(&path).unwrap();
        let backend = SqliteBackend::new(&path);
        let err = backend.list_all().unwrap_err();
        assert!(matches!(err, GatewayError::Statement { .. }), "{err:?}");
    }

    #[test]
    fn affected_rows_are_reported() {
        let dir = tempdir().unwrap();
        let backend = SqliteBackend::new(dir.path().join("students.sqlite"));
        backend.ensure_schema().unwrap();
        backend.insert("Ada", "Physics", "555").unwrap();
        let id = backend.list_all().unwrap()[0].id;
        assert_eq!(backend.update(id, "Ada", "Biology", "555").unwrap(), 1);
        assert_eq!(backend.update(id + 100, "Ada", "Biology", "555").unwrap(), 0);
        assert_eq!(backend.delete(id).unwrap(), 1);
        assert_eq!(backend.delete(id).unwrap(), 0);
    }

    #[test]
    fn describe_names_the_file() {
        let backend = SqliteBackend::new("/tmp/x.sqlite");
        assert_eq!(backend.describe(), "sqlite:/tmp/x.sqlite");
    }
}
