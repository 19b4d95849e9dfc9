use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::Query,
    FromRow, PgPool, Postgres, QueryBuilder,
};
use uuid::Uuid;

use super::{AccountStore, ContentStore, ListFilter, Page, StoreError};
use crate::content::{tags, ContentRecord};
use crate::database::models::{Blog, CaseStudy, User, UserType};

/// PostgreSQL-backed store. Tag and permission lists live in JSON text columns.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map constraint violations on writes to store errors
fn write_error(err: sqlx::Error, conflict: impl FnOnce() -> String) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => return StoreError::Conflict(conflict()),
            Some("23503") => return StoreError::Conflict(format!("referenced record constraint: {}", db.message())),
            _ => {}
        }
    }
    StoreError::Database(err)
}

fn decode_list(column: &str, id: Uuid, text: &str) -> Result<Vec<String>, StoreError> {
    tags::decode(text).map_err(|e| StoreError::Corrupt(format!("{} of {}: {}", column, id, e)))
}

#[derive(FromRow)]
pub struct BlogRow {
    id: Uuid,
    slug: String,
    title: String,
    excerpt: String,
    content: String,
    author: String,
    image_url: Option<String>,
    tags: String,
    publish_date: DateTime<Utc>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BlogRow> for Blog {
    type Error = StoreError;

    fn try_from(row: BlogRow) -> Result<Self, Self::Error> {
        Ok(Blog {
            tags: decode_list("tags", row.id, &row.tags)?,
            id: row.id,
            slug: row.slug,
            title: row.title,
            excerpt: row.excerpt,
            content: row.content,
            author: row.author,
            image_url: row.image_url,
            publish_date: row.publish_date,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
pub struct CaseStudyRow {
    id: Uuid,
    slug: String,
    title: String,
    client: String,
    summary: String,
    content: String,
    image_url: Option<String>,
    tags: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CaseStudyRow> for CaseStudy {
    type Error = StoreError;

    fn try_from(row: CaseStudyRow) -> Result<Self, Self::Error> {
        Ok(CaseStudy {
            tags: decode_list("tags", row.id, &row.tags)?,
            id: row.id,
            slug: row.slug,
            title: row.title,
            client: row.client,
            summary: row.summary,
            content: row.content,
            image_url: row.image_url,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct UserTypeRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    permissions: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserTypeRow> for UserType {
    type Error = StoreError;

    fn try_from(row: UserTypeRow) -> Result<Self, Self::Error> {
        Ok(UserType {
            permissions: decode_list("permissions", row.id, &row.permissions)?,
            id: row.id,
            name: row.name,
            description: row.description,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Table mapping for one content kind
pub trait PgContent: ContentRecord {
    const TABLE: &'static str;
    const COLUMNS: &'static str;
    const ORDER_BY: &'static str;

    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin + TryInto<Self, Error = StoreError>;

    fn insert_query(&self) -> Query<'_, Postgres, PgArguments>;
    fn update_query(&self) -> Query<'_, Postgres, PgArguments>;
}

impl PgContent for Blog {
    const TABLE: &'static str = "blogs";
    const COLUMNS: &'static str =
        "id, slug, title, excerpt, content, author, image_url, tags, publish_date, active, created_at, updated_at";
    const ORDER_BY: &'static str = "publish_date DESC, created_at DESC";

    type Row = BlogRow;

    fn insert_query(&self) -> Query<'_, Postgres, PgArguments> {
        sqlx::query(
            r#"
            INSERT INTO blogs (id, slug, title, excerpt, content, author, image_url, tags, publish_date, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(self.id)
        .bind(&self.slug)
        .bind(&self.title)
        .bind(&self.excerpt)
        .bind(&self.content)
        .bind(&self.author)
        .bind(&self.image_url)
        .bind(tags::encode(&self.tags))
        .bind(self.publish_date)
        .bind(self.active)
        .bind(self.created_at)
        .bind(self.updated_at)
    }

    fn update_query(&self) -> Query<'_, Postgres, PgArguments> {
        sqlx::query(
            r#"
            UPDATE blogs
            SET slug = $2, title = $3, excerpt = $4, content = $5, author = $6,
                image_url = $7, tags = $8, publish_date = $9, active = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(&self.slug)
        .bind(&self.title)
        .bind(&self.excerpt)
        .bind(&self.content)
        .bind(&self.author)
        .bind(&self.image_url)
        .bind(tags::encode(&self.tags))
        .bind(self.publish_date)
        .bind(self.active)
        .bind(self.updated_at)
    }
}

impl PgContent for CaseStudy {
    const TABLE: &'static str = "case_studies";
    const COLUMNS: &'static str =
        "id, slug, title, client, summary, content, image_url, tags, active, created_at, updated_at";
    const ORDER_BY: &'static str = "created_at DESC";

    type Row = CaseStudyRow;

    fn insert_query(&self) -> Query<'_, Postgres, PgArguments> {
        sqlx::query(
            r#"
            INSERT INTO case_studies (id, slug, title, client, summary, content, image_url, tags, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(self.id)
        .bind(&self.slug)
        .bind(&self.title)
        .bind(&self.client)
        .bind(&self.summary)
        .bind(&self.content)
        .bind(&self.image_url)
        .bind(tags::encode(&self.tags))
        .bind(self.active)
        .bind(self.created_at)
        .bind(self.updated_at)
    }

    fn update_query(&self) -> Query<'_, Postgres, PgArguments> {
        sqlx::query(
            r#"
            UPDATE case_studies
            SET slug = $2, title = $3, client = $4, summary = $5, content = $6,
                image_url = $7, tags = $8, active = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(&self.slug)
        .bind(&self.title)
        .bind(&self.client)
        .bind(&self.summary)
        .bind(&self.content)
        .bind(&self.image_url)
        .bind(tags::encode(&self.tags))
        .bind(self.active)
        .bind(self.updated_at)
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ListFilter) {
    if filter.active_only {
        qb.push(" AND active = TRUE");
    }
    if let Some(tag) = &filter.tag {
        // Legacy rows may hold '' or null, which tags::decode reads as no tags
        qb.push(r" AND (CASE WHEN tags ~ '^\s*\[' THEN tags::jsonb ELSE '[]'::jsonb END) @> jsonb_build_array(")
            .push_bind(tag.clone())
            .push("::text)");
    }
}

fn convert_rows<T: PgContent>(rows: Vec<T::Row>) -> Result<Vec<T>, StoreError> {
    rows.into_iter().map(TryInto::try_into).collect()
}

#[async_trait]
impl<T: PgContent> ContentStore<T> for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", T::COLUMNS, T::TABLE);
        let row = sqlx::query_as::<_, T::Row>(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<T>, StoreError> {
        let sql = format!("SELECT {} FROM {} WHERE slug = $1", T::COLUMNS, T::TABLE);
        let row = sqlx::query_as::<_, T::Row>(&sql).bind(slug).fetch_optional(&self.pool).await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, filter: &ListFilter) -> Result<Page<T>, StoreError> {
        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {} WHERE TRUE", T::TABLE));
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM {} WHERE TRUE", T::COLUMNS, T::TABLE));
        push_filter(&mut select, filter);
        select.push(format!(" ORDER BY {}", T::ORDER_BY));
        if let Some(limit) = filter.limit {
            select.push(" LIMIT ").push_bind(i64::from(limit));
        }
        select.push(" OFFSET ").push_bind(i64::from(filter.offset));

        let rows: Vec<T::Row> = select.build_query_as().fetch_all(&self.pool).await?;
        Ok(Page { items: convert_rows::<T>(rows)?, total: total.max(0) as u64 })
    }

    async fn list_active_except(&self, id: Uuid) -> Result<Vec<T>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE active = TRUE AND id <> $1 ORDER BY {}",
            T::COLUMNS,
            T::TABLE,
            T::ORDER_BY
        );
        let rows = sqlx::query_as::<_, T::Row>(&sql).bind(id).fetch_all(&self.pool).await?;
        convert_rows::<T>(rows)
    }

    async fn insert(&self, item: &T) -> Result<T, StoreError> {
        item.insert_query()
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, || format!("slug '{}' is already in use", item.slug())))?;
        Ok(item.clone())
    }

    async fn update(&self, item: &T) -> Result<T, StoreError> {
        let result = item
            .update_query()
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, || format!("slug '{}' is already in use", item.slug())))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("{} {}", T::KIND, item.id())));
        }
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, user_type_id, active, created_at, updated_at";
const USER_TYPE_COLUMNS: &str = "id, name, description, permissions, active, created_at, updated_at";

#[async_trait]
impl AccountStore for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {} FROM users ORDER BY name", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn insert_user(&self, user: &User) -> Result<User, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, user_type_id, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.user_type_id)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, || format!("email '{}' is already registered", user.email)))?;
        Ok(user.clone())
    }

    async fn update_user(&self, user: &User) -> Result<User, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, user_type_id = $5, active = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.user_type_id)
        .bind(user.active)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, || format!("email '{}' is already registered", user.email)))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_user_type(&self, id: Uuid) -> Result<Option<UserType>, StoreError> {
        let sql = format!("SELECT {} FROM user_types WHERE id = $1", USER_TYPE_COLUMNS);
        let row = sqlx::query_as::<_, UserTypeRow>(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(UserType::try_from).transpose()
    }

    async fn list_user_types(&self) -> Result<Vec<UserType>, StoreError> {
        let sql = format!("SELECT {} FROM user_types ORDER BY name", USER_TYPE_COLUMNS);
        let rows = sqlx::query_as::<_, UserTypeRow>(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(UserType::try_from).collect()
    }

    async fn insert_user_type(&self, user_type: &UserType) -> Result<UserType, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_types (id, name, description, permissions, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user_type.id)
        .bind(&user_type.name)
        .bind(&user_type.description)
        .bind(tags::encode(&user_type.permissions))
        .bind(user_type.active)
        .bind(user_type.created_at)
        .bind(user_type.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, || format!("user type '{}' already exists", user_type.name)))?;
        Ok(user_type.clone())
    }

    async fn update_user_type(&self, user_type: &UserType) -> Result<UserType, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE user_types
            SET name = $2, description = $3, permissions = $4, active = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user_type.id)
        .bind(&user_type.name)
        .bind(&user_type.description)
        .bind(tags::encode(&user_type.permissions))
        .bind(user_type.active)
        .bind(user_type.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, || format!("user type '{}' already exists", user_type.name)))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user type {}", user_type.id)));
        }
        Ok(user_type.clone())
    }

    async fn delete_user_type(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM user_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, || "user type is still assigned to users".to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_users_with_type(&self, user_type_id: Uuid) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_type_id = $1")
            .bind(user_type_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn permissions_for_user(&self, user_id: Uuid) -> Result<Option<Vec<String>>, StoreError> {
        let row: Option<(String, bool)> = sqlx::query_as(
            r#"
            SELECT ut.permissions, ut.active
            FROM users u
            JOIN user_types ut ON ut.id = u.user_type_id
            WHERE u.id = $1
            AND u.active = TRUE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some((_, false)) => Ok(Some(Vec::new())),
            Some((permissions, true)) => Ok(Some(decode_list("permissions", user_id, &permissions)?)),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
