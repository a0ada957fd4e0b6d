//! Project and project alias repository.
//!
//! Projects route a receiving address to a ticket queue. Aliases add
//! further receiving addresses to an existing project, optionally with
//! their own assignee.

use rusqlite::{params, Row};

use super::{now_timestamp, Database, DatabaseError};

/// A project row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub id: i64,
    pub title: String,
    pub email: String,
    pub default_assignee: Option<String>,
    pub created_at: String,
}

impl ProjectRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            email: row.get("email")?,
            default_assignee: row.get("default_assignee")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// A project alias row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectAliasRow {
    pub id: i64,
    pub project_id: i64,
    pub email: String,
    pub assignee: Option<String>,
    pub created_at: String,
}

impl ProjectAliasRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            email: row.get("email")?,
            assignee: row.get("assignee")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Inserts a project and returns its id.
pub fn insert_project(
    db: &Database,
    title: &str,
    email: &str,
    default_assignee: Option<&str>,
) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO projects (title, email, default_assignee, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![title, email, default_assignee, now_timestamp()],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Inserts an alias for a project and returns its id.
pub fn insert_alias(
    db: &Database,
    project_id: i64,
    email: &str,
    assignee: Option<&str>,
) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO project_aliases (project_id, email, assignee, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![project_id, email, assignee, now_timestamp()],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Lists all projects in creation order.
pub fn list_projects(db: &Database) -> Result<Vec<ProjectRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM projects ORDER BY id")?;
        let rows = stmt
            .query_map([], ProjectRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Finds a project by id.
pub fn find_project(db: &Database, id: i64) -> Result<Option<ProjectRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM projects WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], ProjectRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Lists all aliases in creation order, each paired with its project.
pub fn list_aliases_with_project(
    db: &Database,
) -> Result<Vec<(ProjectAliasRow, ProjectRow)>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT a.id, a.project_id, a.email, a.assignee, a.created_at,
                    p.id AS p_id, p.title AS p_title, p.email AS p_email,
                    p.default_assignee AS p_default_assignee, p.created_at AS p_created_at
             FROM project_aliases a
             JOIN projects p ON p.id = a.project_id
             ORDER BY a.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let alias = ProjectAliasRow::from_row(row)?;
                let project = ProjectRow {
                    id: row.get("p_id")?,
                    title: row.get("p_title")?,
                    email: row.get("p_email")?,
                    default_assignee: row.get("p_default_assignee")?,
                    created_at: row.get("p_created_at")?,
                };
                Ok((alias, project))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
