use crate::config::DatabaseSettings;
use crate::core::{find_conflict, PropertyReader, StayRange};
use crate::models::{Booking, NewBooking, PreferenceProfile, PropertyRecord, User};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    /// Connection-level failures that may clear up on their own
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::SqlxError(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_))
        )
    }
}

const PROPERTY_COLUMNS: &str = r#"
    id, title, description, property_type, address, city, price, currency,
    price_period, bedrooms, bathrooms, area_sqft, amenities, source_website,
    source_url, external_id, image_urls, created_at, updated_at, last_scraped_at
"#;

const BOOKING_COLUMNS: &str = r#"
    id, property_id, user_id, booking_date, booking_time,
    checkout_date, checkout_time, created_at
"#;

/// PostgreSQL client for users, preferences, inventory and bookings
///
/// Owns the connection pool. Created once in `main` and shared through
/// `Arc`; nothing in the crate reaches for a global handle.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Connect, then run embedded migrations
    pub async fn new(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max {} connections)",
            settings.max_connections
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
            .test_before_acquire(true)
            .connect(&settings.url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool without running migrations
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create a user account; the email must be unused
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let query = r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, email, password_hash, created_at
        "#;

        let row = sqlx::query(query)
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::Conflict(format!("user {} already exists", email)))?;

        let user = user_from_row(&row)?;
        tracing::info!("Created user {}", user.id);

        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
        "#;

        let row = sqlx::query(query).bind(email).fetch_optional(&self.pool).await?;

        row.as_ref().map(user_from_row).transpose().map_err(Into::into)
    }

    /// Save a user's preferences, replacing any earlier profile
    pub async fn save_preferences(&self, profile: &PreferenceProfile) -> Result<(), StoreError> {
        let bedrooms = i32::try_from(profile.bedrooms)
            .map_err(|_| StoreError::InvalidInput(format!("bedrooms out of range: {}", profile.bedrooms)))?;

        let query = r#"
            INSERT INTO preferences (user_id, locations, budget, bedrooms, min_area_sqft, amenities)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id)
            DO UPDATE SET
                locations = EXCLUDED.locations,
                budget = EXCLUDED.budget,
                bedrooms = EXCLUDED.bedrooms,
                min_area_sqft = EXCLUDED.min_area_sqft,
                amenities = EXCLUDED.amenities,
                updated_at = NOW()
        "#;

        sqlx::query(query)
            .bind(profile.user_id)
            .bind(Json(&profile.locations))
            .bind(&profile.budget)
            .bind(bedrooms)
            .bind(profile.min_area_sqft)
            .bind(Json(&profile.amenities))
            .execute(&self.pool)
            .await?;

        tracing::debug!("Saved preferences for user {}", profile.user_id);

        Ok(())
    }

    pub async fn get_preferences(&self, user_id: i64) -> Result<PreferenceProfile, StoreError> {
        let query = r#"
            SELECT user_id, locations, budget, bedrooms, min_area_sqft, amenities
            FROM preferences
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("preferences for user {}", user_id)))?;

        Ok(PreferenceProfile {
            user_id: row.try_get("user_id")?,
            locations: row.try_get::<Json<Vec<String>>, _>("locations")?.0,
            budget: row.try_get("budget")?,
            bedrooms: to_count(row.try_get("bedrooms")?),
            min_area_sqft: row.try_get("min_area_sqft")?,
            amenities: row.try_get::<Json<Vec<String>>, _>("amenities")?.0,
        })
    }

    /// Snapshot of the full inventory, ordered by id
    pub async fn list_properties(&self) -> Result<Vec<PropertyRecord>, StoreError> {
        let query = format!("SELECT {} FROM properties ORDER BY id", PROPERTY_COLUMNS);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let properties = rows
            .iter()
            .map(property_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} properties", properties.len());

        Ok(properties)
    }

    /// Book a property if the stay does not overlap an existing booking
    ///
    /// The property row is locked for the duration of the check so two
    /// concurrent requests cannot both book the same days.
    pub async fn create_booking(&self, booking: &NewBooking) -> Result<Booking, StoreError> {
        let stay = StayRange::new(booking.booking_date, booking.checkout_date)
            .map_err(|e| StoreError::InvalidInput(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM properties WHERE id = $1 FOR UPDATE")
            .bind(booking.property_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("property {}", booking.property_id)))?;

        // Coarse window; exact overlap is decided by `find_conflict`
        let query = format!(
            "SELECT {} FROM bookings WHERE property_id = $1 AND checkout_date >= $2 AND booking_date <= $3",
            BOOKING_COLUMNS
        );

        let existing = sqlx::query(&query)
            .bind(booking.property_id)
            .bind(booking.booking_date)
            .bind(booking.checkout_date)
            .fetch_all(&mut *tx)
            .await?
            .iter()
            .map(booking_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(conflict) = find_conflict(&stay, &existing) {
            return Err(StoreError::Conflict(format!(
                "property {} is already booked from {} to {}",
                booking.property_id, conflict.booking_date, conflict.checkout_date
            )));
        }

        let query = format!(
            r#"
            INSERT INTO bookings (property_id, user_id, booking_date, booking_time, checkout_date, checkout_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(booking.property_id)
            .bind(booking.user_id)
            .bind(booking.booking_date)
            .bind(&booking.booking_time)
            .bind(booking.checkout_date)
            .bind(&booking.checkout_time)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let created = booking_from_row(&row)?;

        tracing::info!(
            "Created booking {} for property {} ({} -> {})",
            created.id,
            created.property_id,
            created.booking_date,
            created.checkout_date
        );

        Ok(created)
    }

    pub async fn list_bookings(&self, user_id: i64) -> Result<Vec<Booking>, StoreError> {
        let query = format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC, id DESC",
            BOOKING_COLUMNS
        );

        let rows = sqlx::query(&query).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(booking_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl PropertyReader for PostgresClient {
    async fn fetch_all_properties(&self) -> Result<Vec<PropertyRecord>, StoreError> {
        self.list_properties().await
    }

    async fn fetch_preferences(&self, user_id: i64) -> Result<PreferenceProfile, StoreError> {
        self.get_preferences(user_id).await
    }
}

#[inline]
fn to_count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn property_from_row(row: &PgRow) -> Result<PropertyRecord, sqlx::Error> {
    Ok(PropertyRecord {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        property_type: row.try_get("property_type")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        price: row.try_get("price")?,
        currency: row.try_get("currency")?,
        price_period: row.try_get("price_period")?,
        bedrooms: to_count(row.try_get("bedrooms")?),
        bathrooms: to_count(row.try_get("bathrooms")?),
        area_sqft: row.try_get("area_sqft")?,
        amenities: row.try_get::<Json<Vec<String>>, _>("amenities")?.0,
        source_website: row.try_get("source_website")?,
        source_url: row.try_get("source_url")?,
        external_id: row.try_get("external_id")?,
        image_urls: row.try_get::<Json<Vec<String>>, _>("image_urls")?.0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_scraped_at: row.try_get("last_scraped_at")?,
    })
}

fn booking_from_row(row: &PgRow) -> Result<Booking, sqlx::Error> {
    Ok(Booking {
        id: row.try_get("id")?,
        property_id: row.try_get("property_id")?,
        user_id: row.try_get("user_id")?,
        booking_date: row.try_get("booking_date")?,
        booking_time: row.try_get("booking_time")?,
        checkout_date: row.try_get("checkout_date")?,
        checkout_time: row.try_get("checkout_time")?,
        created_at: row.try_get("created_at")?,
    })
}
