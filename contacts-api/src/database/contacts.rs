use crate::database::AsyncDbConnection;
use rusqlite::{OptionalExtension, Row, ToSql};
use shared_types::{Contact, NewContact, PaginationMeta, UpdateContactRequest};
use shared_types::{DEFAULT_LIMIT, DEFAULT_PAGE};

const CONTACT_COLUMNS: &str = "id, name, email, phone, address, company, job_title,
                               is_favorite, created_at, updated_at";

#[derive(Debug)]
pub enum ContactDbError {
    DuplicateEmail,
    Pool(String),
    DatabaseError(String),
}

impl std::fmt::Display for ContactDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactDbError::DuplicateEmail => {
                write!(f, "A contact with this email already exists")
            }
            ContactDbError::Pool(msg) => write!(f, "Connection pool error: {}", msg),
            ContactDbError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for ContactDbError {}

impl From<r2d2::Error> for ContactDbError {
    fn from(e: r2d2::Error) -> Self {
        ContactDbError::Pool(e.to_string())
    }
}

impl From<rusqlite::Error> for ContactDbError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                ContactDbError::DuplicateEmail
            }
            _ => ContactDbError::DatabaseError(e.to_string()),
        }
    }
}

/// Page and filter for [`list_contacts`]. Both numbers must be positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactListQuery {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl Default for ContactListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactsPage {
    pub data: Vec<Contact>,
    pub meta: PaginationMeta,
}

fn map_contact(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
        company: row.get(5)?,
        job_title: row.get(6)?,
        is_favorite: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Lowercased `%search%` with LIKE wildcards in the search text taken
/// literally. Compared against `unicode_lower(column)`.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub async fn insert_contact(
    conn: AsyncDbConnection,
    contact: &NewContact,
) -> Result<Contact, ContactDbError> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now();

    let created = conn.query_row(
        &format!(
            "INSERT INTO contacts
             (name, email, phone, address, company, job_title, is_favorite, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {CONTACT_COLUMNS}"
        ),
        rusqlite::params![
            &contact.name,
            &contact.email,
            &contact.phone,
            contact.address.as_ref(),
            contact.company.as_ref(),
            contact.job_title.as_ref(),
            contact.is_favorite,
            now,
            now
        ],
        map_contact,
    )?;

    tracing::debug!("Inserted contact {}", created.id);
    Ok(created)
}

/// Filtered page of contacts plus metadata. The count and the page come from
/// the same WHERE clause so `meta.total` always describes `data`.
pub async fn list_contacts(
    conn: AsyncDbConnection,
    query: &ContactListQuery,
) -> Result<ContactsPage, ContactDbError> {
    let conn = conn.lock().await?;

    let pattern = query
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(like_pattern);

    let where_clause = if pattern.is_some() {
        "WHERE unicode_lower(name) LIKE :pattern ESCAPE '\\'
         OR unicode_lower(company) LIKE :pattern ESCAPE '\\'"
    } else {
        ""
    };

    let mut filter_params: Vec<(&str, &dyn ToSql)> = Vec::new();
    if let Some(pattern) = &pattern {
        filter_params.push((":pattern", pattern));
    }

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM contacts {where_clause}"),
        filter_params.as_slice(),
        |row| row.get(0),
    )?;

    let offset = (query.page - 1).saturating_mul(query.limit);
    let mut page_params = filter_params.clone();
    page_params.push((":limit", &query.limit));
    page_params.push((":offset", &offset));

    let mut stmt = conn.prepare(&format!(
        "SELECT {CONTACT_COLUMNS}
         FROM contacts
         {where_clause}
         ORDER BY created_at ASC, id ASC
         LIMIT :limit OFFSET :offset"
    ))?;

    let data = stmt
        .query_map(page_params.as_slice(), map_contact)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ContactsPage {
        data,
        meta: PaginationMeta::new(total, query.page, query.limit),
    })
}

pub async fn get_contact(
    conn: AsyncDbConnection,
    id: i64,
) -> Result<Option<Contact>, ContactDbError> {
    let conn = conn.lock().await?;

    let contact = conn
        .query_row(
            &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?"),
            [id],
            map_contact,
        )
        .optional()?;

    Ok(contact)
}

/// Writes only the supplied fields and stamps `updated_at`.
pub async fn update_contact(
    conn: AsyncDbConnection,
    id: i64,
    changes: &UpdateContactRequest,
) -> Result<Option<Contact>, ContactDbError> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now();

    let mut assignments: Vec<&str> = Vec::new();
    let mut params: Vec<(&str, &dyn ToSql)> = Vec::new();
    params.push((":id", &id));
    params.push((":updated_at", &now));

    if let Some(name) = &changes.name {
        assignments.push("name = :name");
        params.push((":name", name));
    }
    if let Some(email) = &changes.email {
        assignments.push("email = :email");
        params.push((":email", email));
    }
    if let Some(phone) = &changes.phone {
        assignments.push("phone = :phone");
        params.push((":phone", phone));
    }
    if let Some(address) = &changes.address {
        assignments.push("address = :address");
        params.push((":address", address));
    }
    if let Some(company) = &changes.company {
        assignments.push("company = :company");
        params.push((":company", company));
    }
    if let Some(job_title) = &changes.job_title {
        assignments.push("job_title = :job_title");
        params.push((":job_title", job_title));
    }
    if let Some(is_favorite) = &changes.is_favorite {
        assignments.push("is_favorite = :is_favorite");
        params.push((":is_favorite", is_favorite));
    }
    assignments.push("updated_at = :updated_at");

    let updated = conn
        .query_row(
            &format!(
                "UPDATE contacts SET {} WHERE id = :id RETURNING {CONTACT_COLUMNS}",
                assignments.join(", ")
            ),
            params.as_slice(),
            map_contact,
        )
        .optional()?;

    if updated.is_some() {
        tracing::debug!("Updated contact {}", id);
    }
    Ok(updated)
}

/// Hard delete. Returns the removed row.
pub async fn delete_contact(
    conn: AsyncDbConnection,
    id: i64,
) -> Result<Option<Contact>, ContactDbError> {
    let conn = conn.lock().await?;

    let deleted = conn
        .query_row(
            &format!("DELETE FROM contacts WHERE id = ? RETURNING {CONTACT_COLUMNS}"),
            [id],
            map_contact,
        )
        .optional()?;

    if deleted.is_some() {
        tracing::debug!("Deleted contact {}", id);
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn new_contact(name: &str, email: &str, company: Option<&str>) -> NewContact {
        NewContact {
            name: name.to_string(),
            email: email.to_string(),
            phone: "555-1111".to_string(),
            address: None,
            company: company.map(str::to_string),
            job_title: None,
            is_favorite: false,
        }
    }

    fn conn() -> AsyncDbConnection {
        Database::in_memory().unwrap().async_connection
    }

    async fn seed(conn: &AsyncDbConnection, count: usize) -> Vec<Contact> {
        let mut created = Vec::new();
        for i in 0..count {
            let contact = new_contact(&format!("Person {i}"), &format!("p{i}@x.com"), None);
            created.push(insert_contact(conn.clone(), &contact).await.unwrap());
        }
        created
    }

    #[actix_web::test]
    async fn test_insert_then_get() {
        let conn = conn();
        let created = insert_contact(conn.clone(), &new_contact("Ann Lee", "ann@x.com", None))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert!(!created.is_favorite);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = get_contact(conn, created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[actix_web::test]
    async fn test_duplicate_email_is_distinguishable() {
        let conn = conn();
        insert_contact(conn.clone(), &new_contact("Ann", "ann@x.com", None))
            .await
            .unwrap();

        let err = insert_contact(conn.clone(), &new_contact("Other Ann", "ann@x.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ContactDbError::DuplicateEmail));

        let page = list_contacts(conn, &ContactListQuery::default()).await.unwrap();
        assert_eq!(page.meta.total, 1);
    }

    #[actix_web::test]
    async fn test_get_missing_is_absent() {
        assert_eq!(get_contact(conn(), 99999).await.unwrap(), None);
    }

    #[actix_web::test]
    async fn test_pages_cover_every_row_once() {
        let conn = conn();
        let created = seed(&conn, 23).await;
        let limit = 5;

        let mut seen = Vec::new();
        let mut page = 1;
        loop {
            let query = ContactListQuery {
                page,
                limit,
                search: None,
            };
            let result = list_contacts(conn.clone(), &query).await.unwrap();
            assert_eq!(result.meta.total, 23);
            assert_eq!(result.meta.total_pages, 5);
            if result.data.is_empty() {
                break;
            }
            seen.extend(result.data.into_iter().map(|c| c.id));
            page += 1;
        }

        let expected: Vec<i64> = created.iter().map(|c| c.id).collect();
        assert_eq!(seen, expected);
    }

    #[actix_web::test]
    async fn test_twelve_contacts_make_two_pages() {
        let conn = conn();
        seed(&conn, 12).await;

        let first = list_contacts(conn.clone(), &ContactListQuery::default())
            .await
            .unwrap();
        assert_eq!(first.meta.total_pages, 2);
        assert_eq!(first.data.len(), 10);

        let second = list_contacts(
            conn,
            &ContactListQuery {
                page: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(second.data.len(), 2);
        assert_eq!(second.meta.page, 2);
    }

    #[actix_web::test]
    async fn test_search_matches_company_case_insensitively() {
        let conn = conn();
        insert_contact(conn.clone(), &new_contact("Ann", "ann@x.com", Some("Initech")))
            .await
            .unwrap();
        insert_contact(conn.clone(), &new_contact("Bob", "bob@x.com", Some("Globex")))
            .await
            .unwrap();
        insert_contact(conn.clone(), &new_contact("Cara", "cara@x.com", None))
            .await
            .unwrap();
        insert_contact(conn.clone(), &new_contact("Dan", "dan@x.com", Some("INITECH Labs")))
            .await
            .unwrap();

        let query = ContactListQuery {
            search: Some("nitech".to_string()),
            ..Default::default()
        };
        let page = list_contacts(conn, &query).await.unwrap();

        let names: Vec<&str> = page.data.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Dan"]);
        assert_eq!(page.meta.total, 2);
        assert_eq!(page.meta.total_pages, 1);
    }

    #[actix_web::test]
    async fn test_search_folds_non_ascii_case() {
        let conn = conn();
        insert_contact(
            conn.clone(),
            &new_contact("Émile Zola", "emile@x.com", Some("Société Générale")),
        )
        .await
        .unwrap();
        insert_contact(conn.clone(), &new_contact("Bob", "bob@x.com", Some("Globex")))
            .await
            .unwrap();

        for search in ["émile", "ÉMILE", "socIÉté", "SOCI"] {
            let query = ContactListQuery {
                search: Some(search.to_string()),
                ..Default::default()
            };
            let page = list_contacts(conn.clone(), &query).await.unwrap();
            assert_eq!(page.meta.total, 1, "search {search:?}");
            assert_eq!(page.data[0].name, "Émile Zola");
        }
    }

    #[actix_web::test]
    async fn test_search_matches_name() {
        let conn = conn();
        insert_contact(conn.clone(), &new_contact("Ann Lee", "ann@x.com", None))
            .await
            .unwrap();
        insert_contact(conn.clone(), &new_contact("Bob", "bob@x.com", None))
            .await
            .unwrap();

        let query = ContactListQuery {
            search: Some("LEE".to_string()),
            ..Default::default()
        };
        let page = list_contacts(conn, &query).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].name, "Ann Lee");
    }

    #[actix_web::test]
    async fn test_search_treats_wildcards_literally() {
        let conn = conn();
        insert_contact(conn.clone(), &new_contact("Ann", "ann@x.com", Some("100% Cotton")))
            .await
            .unwrap();
        insert_contact(conn.clone(), &new_contact("Bob", "bob@x.com", Some("100 Cotton")))
            .await
            .unwrap();

        let query = ContactListQuery {
            search: Some("0%".to_string()),
            ..Default::default()
        };
        let page = list_contacts(conn, &query).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].name, "Ann");
    }

    #[actix_web::test]
    async fn test_empty_search_is_ignored() {
        let conn = conn();
        seed(&conn, 3).await;

        let query = ContactListQuery {
            search: Some(String::new()),
            ..Default::default()
        };
        let page = list_contacts(conn, &query).await.unwrap();
        assert_eq!(page.meta.total, 3);
    }

    #[actix_web::test]
    async fn test_partial_update_leaves_other_fields() {
        let conn = conn();
        let mut original = new_contact("Ann", "ann@x.com", Some("Acme"));
        original.address = Some("1 Main St".to_string());
        let created = insert_contact(conn.clone(), &original).await.unwrap();

        let changes = UpdateContactRequest {
            phone: Some("555-2222".to_string()),
            ..Default::default()
        };
        let updated = update_contact(conn.clone(), created.id, &changes)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.phone, "555-2222");
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.address, created.address);
        assert_eq!(updated.company, created.company);
        assert_eq!(updated.job_title, created.job_title);
        assert_eq!(updated.is_favorite, created.is_favorite);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[actix_web::test]
    async fn test_update_missing_is_absent_and_mutates_nothing() {
        let conn = conn();
        let created = seed(&conn, 1).await.remove(0);

        let changes = UpdateContactRequest {
            name: Some("Changed".to_string()),
            ..Default::default()
        };
        assert_eq!(update_contact(conn.clone(), 99999, &changes).await.unwrap(), None);

        let unchanged = get_contact(conn, created.id).await.unwrap();
        assert_eq!(unchanged, Some(created));
    }

    #[actix_web::test]
    async fn test_update_to_taken_email_conflicts() {
        let conn = conn();
        let created = seed(&conn, 2).await;

        let changes = UpdateContactRequest {
            email: Some(created[0].email.clone()),
            ..Default::default()
        };
        let err = update_contact(conn, created[1].id, &changes).await.unwrap_err();
        assert!(matches!(err, ContactDbError::DuplicateEmail));
    }

    #[actix_web::test]
    async fn test_delete_removes_row() {
        let conn = conn();
        let created = seed(&conn, 1).await.remove(0);

        let deleted = delete_contact(conn.clone(), created.id).await.unwrap();
        assert_eq!(deleted, Some(created.clone()));
        assert_eq!(get_contact(conn.clone(), created.id).await.unwrap(), None);
        assert_eq!(delete_contact(conn, created.id).await.unwrap(), None);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ann"), "%ann%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
