//! DDL and DML text for both dialects. Placeholders differ (`?N` for SQLite,
//! bare `?` for MySQL); values are always bound, never formatted in.

pub(super) const SQLITE_CREATE_STUDENTS: &str = "CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    course TEXT NOT NULL,
    mobile TEXT NOT NULL
)";
pub(super) const SQLITE_SELECT_ALL: &str = "SELECT id, name, course, mobile FROM students";
pub(super) const SQLITE_INSERT: &str =
    "INSERT INTO students (name, course, mobile) VALUES (?1, ?2, ?3)";
pub(super) const SQLITE_UPDATE: &str =
    "UPDATE students SET name = ?1, course = ?2, mobile = ?3 WHERE id = ?4";
pub(super) const SQLITE_DELETE: &str = "DELETE FROM students WHERE id = ?1";
pub(super) const SQLITE_FIND_BY_NAME: &str =
    "SELECT id, name, course, mobile FROM students WHERE name = ?1";

pub(super) const MYSQL_CREATE_STUDENTS: &str = "CREATE TABLE IF NOT EXISTS students (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    course VARCHAR(64) NOT NULL,
    mobile VARCHAR(64) NOT NULL
)";
pub(super) const MYSQL_TABLE_EXISTS: &str = "SELECT COUNT(*) FROM information_schema.tables
    WHERE table_schema = DATABASE() AND table_name = 'students'";
pub(super) const MYSQL_SELECT_ALL: &str = "SELECT id, name, course, mobile FROM students";
pub(super) const MYSQL_INSERT: &str = "INSERT INTO students (name, course, mobile) VALUES (?, ?, ?)";
pub(super) const MYSQL_UPDATE: &str =
    "UPDATE students SET name = ?, course = ?, mobile = ? WHERE id = ?";
pub(super) const MYSQL_DELETE: &str = "DELETE FROM students WHERE id = ?";
// BINARY keeps the comparison case-sensitive under the default collations.
pub(super) const MYSQL_FIND_BY_NAME: &str =
    "SELECT id, name, course, mobile FROM students WHERE BINARY name = ?";
