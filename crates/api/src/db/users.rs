//! User repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::instrument;

use arvigo_core::{
    AddressId, Email, FaceShapeId, MerchantId, RoleId, UserId, parse_tag_ids,
};

use super::{RepositoryError, UserStore};
use crate::models::{
    LoginRecord, NewUser, ProfileRecord, RecommendationProfile, Subscription, UserUpdate,
};

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LoginRow {
    id: i64,
    role_id: i64,
    full_name: String,
    password: String,
}

impl From<LoginRow> for LoginRecord {
    fn from(row: LoginRow) -> Self {
        Self {
            id: UserId::new(row.id),
            role_id: RoleId::new(row.role_id),
            full_name: row.full_name,
            password_hash: row.password,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RecommendationRow {
    is_complete_face_test: bool,
    is_complete_personality_test: bool,
    face_shape_id: Option<i64>,
    tag_ids: Option<String>,
}

impl From<RecommendationRow> for RecommendationProfile {
    fn from(row: RecommendationRow) -> Self {
        Self {
            is_complete_face_test: row.is_complete_face_test,
            is_complete_personality_test: row.is_complete_personality_test,
            face_shape: FaceShapeId::from_column(row.face_shape_id),
            personality_tags: row.tag_ids.as_deref().map(parse_tag_ids).unwrap_or_default(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    email: String,
    role_id: i64,
    full_name: String,
    gender: String,
    date_of_birth: Option<NaiveDate>,
    place_of_birth: String,
    is_complete_personality_test: bool,
    is_complete_face_test: bool,
    face_shape_id: Option<i64>,
    personality_type: Option<String>,
    is_verified: bool,
    avatar: String,
    addresses_id: Option<i64>,
    merchant_id: Option<i64>,
}

impl TryFrom<ProfileRow> for ProfileRecord {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            role_id: RoleId::new(row.role_id),
            full_name: row.full_name,
            gender: row.gender,
            date_of_birth: row.date_of_birth,
            place_of_birth: row.place_of_birth,
            is_complete_personality_test: row.is_complete_personality_test,
            is_complete_face_test: row.is_complete_face_test,
            face_shape: FaceShapeId::from_column(row.face_shape_id),
            personality_type: row.personality_type,
            is_verified: row.is_verified,
            avatar: row.avatar,
            address_id: AddressId::from_column(row.addresses_id),
            merchant_id: MerchantId::from_column(row.merchant_id),
            subscriptions: Vec::new(),
        })
    }
}

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    subscription_start: DateTime<Utc>,
    subscription_end: DateTime<Utc>,
    is_verified: bool,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            start: row.subscription_start,
            end: row.subscription_end,
            is_verified: row.is_verified,
        }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[instrument(skip(self, email), fields(role_id = %role_id))]
    async fn find_for_login(
        &self,
        email: &Email,
        role_id: RoleId,
    ) -> Result<Option<LoginRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, LoginRow>(
            r"
            SELECT id, role_id, full_name, password
            FROM users
            WHERE email = $1 AND role_id = $2
            LIMIT 1
            ",
        )
        .bind(email.as_str())
        .bind(role_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LoginRecord::from))
    }

    #[instrument(skip(self, user), fields(role_id = %user.role_id))]
    async fn create(&self, user: &NewUser) -> Result<UserId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO users (email, password, full_name, role_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email"))?;

        Ok(UserId::new(id))
    }

    #[instrument(skip(self, user))]
    async fn create_partner(
        &self,
        merchant_name: &str,
        user: &NewUser,
    ) -> Result<(UserId, MerchantId), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let merchant_id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO merchants (name)
            VALUES ($1)
            RETURNING id
            ",
        )
        .bind(merchant_name)
        .fetch_one(&mut *tx)
        .await?;

        let user_id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO users (email, password, full_name, role_id, merchant_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role_id.as_i64())
        .bind(merchant_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email"))?;

        tx.commit().await?;

        Ok((UserId::new(user_id), MerchantId::new(merchant_id)))
    }

    #[instrument(skip(self, update), fields(user_id = %id))]
    async fn update(&self, id: UserId, update: &UserUpdate) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET full_name = $2,
                gender = COALESCE($3, gender),
                date_of_birth = COALESCE($4, date_of_birth),
                place_of_birth = COALESCE($5, place_of_birth),
                password = COALESCE($6, password),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i64())
        .bind(&update.full_name)
        .bind(update.gender.as_deref())
        .bind(update.date_of_birth)
        .bind(update.place_of_birth.as_deref())
        .bind(update.password_hash.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn recommendation_profile(
        &self,
        id: UserId,
    ) -> Result<Option<RecommendationProfile>, RepositoryError> {
        let row = sqlx::query_as::<_, RecommendationRow>(
            r"
            SELECT u.is_complete_face_test,
                   u.is_complete_personality_test,
                   u.face_shape_id,
                   up.tag_ids
            FROM users u
            LEFT JOIN user_personalities up ON up.id = u.personality_id
            WHERE u.id = $1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RecommendationProfile::from))
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn profile(&self, id: UserId) -> Result<Option<ProfileRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT u.id,
                   u.email,
                   u.role_id,
                   u.full_name,
                   COALESCE(u.gender, '') AS gender,
                   u.date_of_birth,
                   COALESCE(u.place_of_birth, '') AS place_of_birth,
                   u.is_complete_personality_test,
                   u.is_complete_face_test,
                   u.face_shape_id,
                   up.name AS personality_type,
                   u.is_verified,
                   COALESCE(u.avatar, '') AS avatar,
                   u.addresses_id,
                   u.merchant_id
            FROM users u
            LEFT JOIN user_personalities up ON up.id = u.personality_id
            WHERE u.id = $1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut record = ProfileRecord::try_from(row)?;

        let subscriptions = sqlx::query_as::<_, SubscriptionRow>(
            r"
            SELECT subscription_start, subscription_end, is_verified
            FROM detail_user_subscriptions
            WHERE user_id = $1
              AND subscription_start IS NOT NULL
              AND subscription_end IS NOT NULL
            ORDER BY subscription_end DESC
            ",
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        record.subscriptions = subscriptions.into_iter().map(Subscription::from).collect();
        Ok(Some(record))
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn merchant_of(&self, id: UserId) -> Result<Option<MerchantId>, RepositoryError> {
        let merchant_id: Option<Option<i64>> =
            sqlx::query_scalar("SELECT merchant_id FROM users WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await?;

        Ok(MerchantId::from_column(merchant_id.flatten()))
    }
}
