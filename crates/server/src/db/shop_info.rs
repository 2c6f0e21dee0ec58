//! Shop identity repository.
//!
//! One row, pinned to `id = 1`. Reads fall back to [`ShopInfo::default`]
//! until the settings page has been saved once.

use sqlx::SqlitePool;

use super::RepositoryError;
use crate::models::{ShopInfo, ShopInfoUpdate};

/// Internal row type for shop info queries.
#[derive(Debug, sqlx::FromRow)]
struct ShopInfoRow {
    shop_name: String,
    address: String,
    phone: String,
    gstin: String,
    logo_filename: String,
}

impl From<ShopInfoRow> for ShopInfo {
    fn from(row: ShopInfoRow) -> Self {
        Self {
            shop_name: row.shop_name,
            address: row.address,
            phone: row.phone,
            gstin: row.gstin,
            logo_filename: row.logo_filename,
        }
    }
}

/// Repository for the single shop identity row.
pub struct ShopInfoRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ShopInfoRepository<'a> {
    /// Create a new shop info repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// The current shop identity, or the built-in default before first save.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self) -> Result<ShopInfo, RepositoryError> {
        let row = sqlx::query_as::<_, ShopInfoRow>(
            "SELECT shop_name, address, phone, gstin, logo_filename
             FROM shop_info
             WHERE id = 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map_or_else(ShopInfo::default, Into::into))
    }

    /// Insert or update the shop identity row.
    ///
    /// A `None` logo keeps whatever logo is already stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert(&self, update: &ShopInfoUpdate) -> Result<ShopInfo, RepositoryError> {
        let default_logo = ShopInfo::default().logo_filename;
        let row = sqlx::query_as::<_, ShopInfoRow>(
            "INSERT INTO shop_info (id, shop_name, address, phone, gstin, logo_filename)
             VALUES (1, ?, ?, ?, ?, COALESCE(?, ?))
             ON CONFLICT (id) DO UPDATE SET
                 shop_name = excluded.shop_name,
                 address = excluded.address,
                 phone = excluded.phone,
                 gstin = excluded.gstin,
                 logo_filename = COALESCE(?, shop_info.logo_filename)
             RETURNING shop_name, address, phone, gstin, logo_filename",
        )
        .bind(&update.shop_name)
        .bind(&update.address)
        .bind(&update.phone)
        .bind(&update.gstin)
        .bind(&update.logo_filename)
        .bind(&default_logo)
        .bind(&update.logo_filename)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_support::test_pool;
    use super::*;

    fn update(logo: Option<&str>) -> ShopInfoUpdate {
        ShopInfoUpdate {
            shop_name: "Corner Store".to_owned(),
            address: "12 Main Road".to_owned(),
            phone: "9876543210".to_owned(),
            gstin: "GSTN123456".to_owned(),
            logo_filename: logo.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn test_default_before_first_save() {
        let pool = test_pool().await;
        let repo = ShopInfoRepository::new(&pool);

        let info = repo.get().await.unwrap();
        assert_eq!(info.shop_name, ShopInfo::default().shop_name);
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let pool = test_pool().await;
        let repo = ShopInfoRepository::new(&pool);

        repo.upsert(&update(Some("store.png"))).await.unwrap();
        let info = repo.get().await.unwrap();
        assert_eq!(info.shop_name, "Corner Store");
        assert_eq!(info.logo_filename, "store.png");
    }

    #[tokio::test]
    async fn test_missing_logo_keeps_stored_one() {
        let pool = test_pool().await;
        let repo = ShopInfoRepository::new(&pool);

        repo.upsert(&update(Some("store.png"))).await.unwrap();
        let mut second = update(None);
        second.shop_name = "Corner Store 2".to_owned();
        let info = repo.upsert(&second).await.unwrap();
        assert_eq!(info.shop_name, "Corner Store 2");
        assert_eq!(info.logo_filename, "store.png");
    }

    #[tokio::test]
    async fn test_first_save_without_logo_uses_default() {
        let pool = test_pool().await;
        let repo = ShopInfoRepository::new(&pool);

        let info = repo.upsert(&update(None)).await.unwrap();
        assert_eq!(info.logo_filename, ShopInfo::default().logo_filename);
    }
}
