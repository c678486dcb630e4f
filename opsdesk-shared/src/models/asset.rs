/// Asset model and database operations
///
/// Assets are the tracked infrastructure records (servers, network gear,
/// VOIP equipment). Only `name`, `ip_address`, and `kind` (wire name
/// `type`) are required; everything else is optional with declared
/// defaults.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE asset_status AS ENUM ('active', 'down', 'maintenance', 'decommissioned');
/// CREATE TYPE asset_department AS ENUM ('cloud', 'network', 'voip');
///
/// CREATE TABLE assets (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     ip_address VARCHAR(64) NOT NULL,
///     kind VARCHAR(100) NOT NULL,
///     status asset_status NOT NULL DEFAULT 'active',
///     cloud_model VARCHAR(100),
///     provider VARCHAR(100),
///     location VARCHAR(255),
///     department asset_department,
///     username VARCHAR(255),
///     password VARCHAR(255),
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     notes TEXT,
///     created_by UUID NOT NULL REFERENCES users(id),
///     last_updated TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Partial updates
///
/// [`UpdateAsset`] implements a merge, not a replace: a field absent from
/// the request body is left untouched, a present field is written, and for
/// nullable fields an explicit `null` clears the stored value. The stored
/// device credential (`password`) additionally treats an explicit empty
/// string as a clear, so a credential can be removed without knowing its
/// value. `last_updated` is refreshed on every successful update no matter
/// which fields changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Operational status of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "asset_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Active,
    Down,
    Maintenance,
    Decommissioned,
}

impl Default for AssetStatus {
    fn default() -> Self {
        AssetStatus::Active
    }
}

/// Department an asset is classified under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "asset_department", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetDepartment {
    Cloud,
    Network,
    Voip,
}

/// Asset model representing one tracked piece of infrastructure
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    /// Unique asset id (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Management address
    pub ip_address: String,

    /// Free-form asset type, e.g. "server" or "switch"
    #[serde(rename = "type")]
    pub kind: String,

    /// Operational status
    pub status: AssetStatus,

    /// Cloud service model, e.g. "IaaS"
    pub cloud_model: Option<String>,

    /// Hosting provider
    pub provider: Option<String>,

    /// Physical or logical location
    pub location: Option<String>,

    /// Owning department
    pub department: Option<AssetDepartment>,

    /// Stored device credential: login name
    pub username: Option<String>,

    /// Stored device credential: password (a recorded secret for reaching
    /// the device, not an account password, so no hashing)
    pub password: Option<String>,

    /// Free-form labels
    pub tags: Vec<String>,

    /// Free text
    pub notes: Option<String>,

    /// User who created the record; immutable
    pub created_by: Uuid,

    /// Refreshed on every update; listing orders by this, descending
    pub last_updated: DateTime<Utc>,
}

/// Input for creating a new asset
///
/// Doubles as the request body for the create route; required fields are
/// enforced by deserialization (missing key) and validation (empty value).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAsset {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,

    #[validate(length(min = 1, max = 64, message = "ip_address is required"))]
    pub ip_address: String,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100, message = "type is required"))]
    pub kind: String,

    /// Defaults to active when omitted
    pub status: Option<AssetStatus>,

    pub cloud_model: Option<String>,
    pub provider: Option<String>,
    pub location: Option<String>,
    pub department: Option<AssetDepartment>,
    pub username: Option<String>,
    pub password: Option<String>,

    /// Defaults to the empty set when omitted
    #[serde(default)]
    pub tags: Vec<String>,

    pub notes: Option<String>,
}

/// Input for partially updating an asset
///
/// Nullable fields use the double-`Option` pattern: the outer `Option` is
/// key presence (absent ⇒ leave untouched), the inner is the new value
/// (`null` ⇒ clear). [`double_option`] keeps `null` and "absent"
/// distinguishable through deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAsset {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 64, message = "ip_address must not be empty"))]
    pub ip_address: Option<String>,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100, message = "type must not be empty"))]
    pub kind: Option<String>,

    pub status: Option<AssetStatus>,

    #[serde(default, deserialize_with = "double_option")]
    pub cloud_model: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub provider: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub department: Option<Option<AssetDepartment>>,

    #[serde(default, deserialize_with = "double_option")]
    pub username: Option<Option<String>>,

    /// Written whenever the key is present in the request, including an
    /// explicit empty string, which clears the stored credential. Absent
    /// key ⇒ the stored credential is untouched.
    #[serde(default, deserialize_with = "double_option")]
    pub password: Option<Option<String>>,

    pub tags: Option<Vec<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// Deserializes a present-but-possibly-null field into `Some(inner)`.
///
/// Only invoked when the key exists in the input, so an absent key falls
/// back to the field default (`None`) and stays distinguishable from an
/// explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Creator details joined onto an asset listing
///
/// Exposes the creating user's name and email only, never the password
/// hash or any other account field.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CreatorRef {
    #[sqlx(rename = "creator_name")]
    pub name: String,

    #[sqlx(rename = "creator_email")]
    pub email: String,
}

/// Asset row with its creator expanded
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AssetWithCreator {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub asset: Asset,

    #[sqlx(flatten)]
    pub creator: CreatorRef,
}

const ASSET_COLUMNS: &str = "id, name, ip_address, kind, status, cloud_model, provider, \
     location, department, username, password, tags, notes, created_by, last_updated";

impl Asset {
    /// Creates a new asset owned by `created_by`
    ///
    /// Optional fields fall back to their declared defaults (status active,
    /// empty tag set); `last_updated` starts at now.
    pub async fn create(
        pool: &PgPool,
        data: CreateAsset,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO assets (name, ip_address, kind, status, cloud_model, provider,
                                location, department, username, password, tags, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {ASSET_COLUMNS}
            "#
        );

        let asset = sqlx::query_as::<_, Asset>(&query)
            .bind(data.name)
            .bind(data.ip_address)
            .bind(data.kind)
            .bind(data.status.unwrap_or_default())
            .bind(data.cloud_model)
            .bind(data.provider)
            .bind(data.location)
            .bind(data.department)
            .bind(data.username)
            .bind(data.password)
            .bind(data.tags)
            .bind(data.notes)
            .bind(created_by)
            .fetch_one(pool)
            .await?;

        Ok(asset)
    }

    /// Lists all assets, most recently touched first
    ///
    /// Full scan by design: no pagination, no filtering.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {ASSET_COLUMNS} FROM assets ORDER BY last_updated DESC"
        );

        sqlx::query_as::<_, Asset>(&query).fetch_all(pool).await
    }

    /// Lists all assets with the creating user expanded to `{name, email}`
    pub async fn list_with_creator(pool: &PgPool) -> Result<Vec<AssetWithCreator>, sqlx::Error> {
        let assets = sqlx::query_as::<_, AssetWithCreator>(
            r#"
            SELECT a.id, a.name, a.ip_address, a.kind, a.status, a.cloud_model, a.provider,
                   a.location, a.department, a.username, a.password, a.tags, a.notes,
                   a.created_by, a.last_updated,
                   u.name AS creator_name, u.email AS creator_email
            FROM assets a
            JOIN users u ON u.id = a.created_by
            ORDER BY a.last_updated DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(assets)
    }

    /// Partially updates an asset
    ///
    /// Merges only the fields present in `data` into the stored record and
    /// always refreshes `last_updated`, even when no other field is
    /// written. Returns `None` when the id does not resolve.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateAsset,
    ) -> Result<Option<Self>, sqlx::Error> {
        // An empty string for the credential means "clear", same as null
        let password = data.password.map(|p| p.filter(|s| !s.is_empty()));

        let mut query = String::from("UPDATE assets SET last_updated = NOW()");
        let mut bind_count = 1;

        let mut push_set = |column: &str, count: &mut i32| {
            *count += 1;
            query.push_str(&format!(", {} = ${}", column, count));
        };

        if data.name.is_some() {
            push_set("name", &mut bind_count);
        }
        if data.ip_address.is_some() {
            push_set("ip_address", &mut bind_count);
        }
        if data.kind.is_some() {
            push_set("kind", &mut bind_count);
        }
        if data.status.is_some() {
            push_set("status", &mut bind_count);
        }
        if data.cloud_model.is_some() {
            push_set("cloud_model", &mut bind_count);
        }
        if data.provider.is_some() {
            push_set("provider", &mut bind_count);
        }
        if data.location.is_some() {
            push_set("location", &mut bind_count);
        }
        if data.department.is_some() {
            push_set("department", &mut bind_count);
        }
        if data.username.is_some() {
            push_set("username", &mut bind_count);
        }
        if password.is_some() {
            push_set("password", &mut bind_count);
        }
        if data.tags.is_some() {
            push_set("tags", &mut bind_count);
        }
        if data.notes.is_some() {
            push_set("notes", &mut bind_count);
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {ASSET_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Asset>(&query).bind(id);

        // Bind order must mirror the push_set order above
        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(ip_address) = data.ip_address {
            q = q.bind(ip_address);
        }
        if let Some(kind) = data.kind {
            q = q.bind(kind);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(cloud_model) = data.cloud_model {
            q = q.bind(cloud_model);
        }
        if let Some(provider) = data.provider {
            q = q.bind(provider);
        }
        if let Some(location) = data.location {
            q = q.bind(location);
        }
        if let Some(department) = data.department {
            q = q.bind(department);
        }
        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(password) = password {
            q = q.bind(password);
        }
        if let Some(tags) = data.tags {
            q = q.bind(tags);
        }
        if let Some(notes) = data.notes {
            q = q.bind(notes);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes an asset outright
    ///
    /// No soft delete and no cascading cleanup of handoff references.
    /// Returns true if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
