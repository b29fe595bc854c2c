
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::data::{Department, Employee, EmployeeForm};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row does not exist, or vanished between fetch and save.
    #[error("record not found")]
    NotFound,

    #[error("department is still referenced by employees")]
    DepartmentInUse,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// CRUD over the two directory tables, borrowing one connection per request.
///
/// Every read hands back detached values; nothing is tracked after a call
/// returns. SQLite's per-statement transaction is the only concurrency
/// control: concurrent edits of a still-present row are last-write-wins,
/// and a row that vanished mid-update surfaces as [`StoreError::NotFound`].
pub struct EmployeeStore<'a> {
    conn: &'a Connection,
}

impl<'a> EmployeeStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create_tables(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS department (
                 id   INTEGER PRIMARY KEY AUTOINCREMENT,
                 name TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS employee (
                 id            INTEGER PRIMARY KEY AUTOINCREMENT,
                 last_name     TEXT NOT NULL,
                 first_name    TEXT NOT NULL,
                 patronymic    TEXT NOT NULL DEFAULT '',
                 department_id INTEGER NOT NULL REFERENCES department (id),
                 phone_number  TEXT,
                 profile_photo BLOB
             );
             CREATE INDEX IF NOT EXISTS idx_employee_department
                 ON employee (department_id);",
        )?;

        Ok(())
    }

    pub fn insert_employee(
        &self,
        form: &EmployeeForm,
        photo: Option<&[u8]>,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO employee
                 (last_name, first_name, patronymic, department_id, phone_number, profile_photo)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                form.last_name,
                form.first_name,
                form.patronymic,
                form.department_id,
                form.phone_number,
                photo,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_employee(&self, id: i64) -> Result<Employee, StoreError> {
        self.conn
            .query_row(
                "SELECT id, last_name, first_name, patronymic, department_id,
                        phone_number, profile_photo
                 FROM employee WHERE id = ?1",
                [id],
                |row| {
                    Ok(Employee {
                        id: row.get(0)?,
                        last_name: row.get(1)?,
                        first_name: row.get(2)?,
                        patronymic: row.get(3)?,
                        department_id: row.get(4)?,
                        phone_number: row.get(5)?,
                        profile_photo: row.get(6)?,
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::NotFound)
    }

    /// Overwrites the bound fields of an existing row. The photo column is
    /// only touched when a new upload accompanied the edit; otherwise the
    /// stored blob stays as-is. An update matching zero rows means the row
    /// vanished underneath the edit and collapses to [`StoreError::NotFound`].
    pub fn update_employee(
        &self,
        id: i64,
        form: &EmployeeForm,
        new_photo: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        let affected = match new_photo {
            Some(photo) => self.conn.execute(
                "UPDATE employee
                 SET last_name = ?1, first_name = ?2, patronymic = ?3,
                     department_id = ?4, phone_number = ?5, profile_photo = ?6
                 WHERE id = ?7",
                params![
                    form.last_name,
                    form.first_name,
                    form.patronymic,
                    form.department_id,
                    form.phone_number,
                    photo,
                    id,
                ],
            )?,
            None => self.conn.execute(
                "UPDATE employee
                 SET last_name = ?1, first_name = ?2, patronymic = ?3,
                     department_id = ?4, phone_number = ?5
                 WHERE id = ?6",
                params![
                    form.last_name,
                    form.first_name,
                    form.patronymic,
                    form.department_id,
                    form.phone_number,
                    id,
                ],
            )?,
        };

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    pub fn delete_employee(&self, id: i64) -> Result<(), StoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM employee WHERE id = ?1", [id])?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    pub fn get_photo(&self, id: i64) -> Result<Option<Vec<u8>>, StoreError> {
        self.conn
            .query_row(
                "SELECT profile_photo FROM employee WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound)
    }

    pub fn count_employees(&self) -> Result<u32, StoreError> {
        let count = self
            .conn
            .query_row("SELECT count(*) FROM employee", [], |row| row.get(0))?;

        Ok(count)
    }

    pub fn insert_department(&self, name: &str) -> Result<i64, StoreError> {
        self.conn
            .execute("INSERT INTO department (name) VALUES (?1)", [name])?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_department(&self, id: i64) -> Result<Department, StoreError> {
        self.conn
            .query_row(
                "SELECT id, name FROM department WHERE id = ?1",
                [id],
                |row| {
                    Ok(Department {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::NotFound)
    }

    pub fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM department ORDER BY name, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Department {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut departments = Vec::new();
        for department in rows {
            departments.push(department?);
        }

        Ok(departments)
    }

    /// Departments with how many employees each one holds, for the
    /// management page.
    pub fn list_departments_with_counts(&self) -> Result<Vec<(Department, u32)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT d.id, d.name, count(e.id)
             FROM department d LEFT JOIN employee e ON e.department_id = d.id
             GROUP BY d.id, d.name
             ORDER BY d.name, d.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                Department {
                    id: row.get(0)?,
                    name: row.get(1)?,
                },
                row.get(2)?,
            ))
        })?;

        let mut departments = Vec::new();
        for department in rows {
            departments.push(department?);
        }

        Ok(departments)
    }

    /// Refused while any employee still references the department; the
    /// foreign key turns that into [`StoreError::DepartmentInUse`].
    pub fn delete_department(&self, id: i64) -> Result<(), StoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM department WHERE id = ?1", [id])
            .map_err(|err| match err {
                rusqlite::Error::SqliteFailure(e, _)
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    StoreError::DepartmentInUse
                }
                other => StoreError::Sqlite(other),
            })?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
