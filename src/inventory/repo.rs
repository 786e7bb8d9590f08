//! Data-access operations for the ingredient catalog and per-user
//! inventory rows.
//!
//! Mutations run their existence check and write inside one
//! transaction on the single-connection pool, so the "already exists"
//! and "not found" error paths stay deterministic under concurrent
//! callers. The read-back that composes a full response happens after
//! commit and is reported as a server-side fault if it misses.

use sqlx::sqlite::SqliteConnection;

use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::schema;

use super::repo_types::{
    IngredientInsertion, IngredientItemInsertion, IngredientRef, InventoryInsertion,
    InventoryItemDetails, InventoryUpdate, MeasurementUnit,
};

const DETAILS_SELECT: &str = "\
    SELECT inv.ingredient_id, inv.id AS inventory_id, inv.user_id, \
           ing.name, ing.category, ing.unit_type, \
           inv.quantity, inv.minimum_threshold, inv.expiration_date, \
           inv.created_at, inv.updated_at \
    FROM inventory inv \
    JOIN ingredients ing ON ing.id = inv.ingredient_id";

impl Database {
    /// Catalog id for an exact name, `None` when the name is unknown.
    pub async fn ingredient_id_by_name(&self, name: &str) -> DbResult<Option<i64>> {
        let id = sqlx::query_scalar("SELECT id FROM ingredients WHERE name = ?1")
            .bind(name)
            .fetch_optional(self.pool()?)
            .await?;
        Ok(id)
    }

    /// Stored quantity for the user, `0.0` when the user never added
    /// the ingredient. Absence is not an error.
    pub async fn quantity_by_name(&self, name: &str, user_id: i64) -> DbResult<f64> {
        let quantity: Option<f64> = sqlx::query_scalar(
            "SELECT inv.quantity FROM inventory inv \
             JOIN ingredients ing ON ing.id = inv.ingredient_id \
             WHERE inv.user_id = ?1 AND ing.name = ?2",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(self.pool()?)
        .await?;
        Ok(quantity.unwrap_or(0.0))
    }

    pub async fn quantity_by_id(&self, ingredient_id: i64, user_id: i64) -> DbResult<f64> {
        let quantity: Option<f64> = sqlx::query_scalar(
            "SELECT quantity FROM inventory WHERE user_id = ?1 AND ingredient_id = ?2",
        )
        .bind(user_id)
        .bind(ingredient_id)
        .fetch_optional(self.pool()?)
        .await?;
        Ok(quantity.unwrap_or(0.0))
    }

    /// Catalog-level unit lookup, independent of any user's inventory.
    pub async fn measurement_unit_by_name(&self, name: &str) -> DbResult<MeasurementUnit> {
        let unit: Option<MeasurementUnit> =
            sqlx::query_scalar("SELECT unit_type FROM ingredients WHERE name = ?1")
                .bind(name)
                .fetch_optional(self.pool()?)
                .await?;
        unit.ok_or_else(|| DbError::IngredientNotFound(name.to_string()))
    }

    pub async fn measurement_unit_by_id(&self, ingredient_id: i64) -> DbResult<MeasurementUnit> {
        let unit: Option<MeasurementUnit> =
            sqlx::query_scalar("SELECT unit_type FROM ingredients WHERE id = ?1")
                .bind(ingredient_id)
                .fetch_optional(self.pool()?)
                .await?;
        unit.ok_or_else(|| DbError::IngredientNotFound(format!("#{ingredient_id}")))
    }

    pub async fn exists_in_ingredients(&self, ingredient: IngredientRef<'_>) -> DbResult<bool> {
        let exists = match ingredient {
            IngredientRef::Id(id) => {
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM ingredients WHERE id = ?1)")
                    .bind(id)
                    .fetch_one(self.pool()?)
                    .await?
            }
            IngredientRef::Name(name) => self.ingredient_id_by_name(name).await?.is_some(),
        };
        Ok(exists)
    }

    pub async fn exists_in_inventory(
        &self,
        ingredient: IngredientRef<'_>,
        user_id: i64,
    ) -> DbResult<bool> {
        let mut conn = self.pool()?.acquire().await?;
        let Some(ingredient_id) = catalog_id(&mut conn, ingredient).await? else {
            return Ok(false);
        };
        stock_exists(&mut conn, user_id, ingredient_id).await
    }

    /// Composed catalog + inventory record, `None` when the user has
    /// no such ingredient.
    pub async fn info_by_name(
        &self,
        name: &str,
        user_id: i64,
    ) -> DbResult<Option<InventoryItemDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE inv.user_id = ?1 AND ing.name = ?2");
        let details = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(name)
            .fetch_optional(self.pool()?)
            .await?;
        Ok(details)
    }

    pub async fn info_by_id(
        &self,
        ingredient_id: i64,
        user_id: i64,
    ) -> DbResult<Option<InventoryItemDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE inv.user_id = ?1 AND inv.ingredient_id = ?2");
        let details = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(ingredient_id)
            .fetch_optional(self.pool()?)
            .await?;
        Ok(details)
    }

    /// Every inventory row of the user joined with its catalog entry.
    pub async fn all_in_inventory(&self, user_id: i64) -> DbResult<Vec<InventoryItemDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE inv.user_id = ?1 ORDER BY ing.name");
        let rows = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(self.pool()?)
            .await?;
        Ok(rows)
    }

    /// Insert a new catalog entry and return its generated id. The
    /// name must not already exist; the duplicate check runs before
    /// the insert so the error stays distinguishable from a generic
    /// insertion failure.
    pub async fn add_ingredient_to_catalog(
        &self,
        insertion: &IngredientInsertion,
    ) -> DbResult<i64> {
        let mut tx = self.pool()?.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM ingredients WHERE name = ?1")
            .bind(&insertion.name)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Err(DbError::AlreadyInCatalog(insertion.name.clone()));
        }

        let res =
            sqlx::query("INSERT INTO ingredients (name, category, unit_type) VALUES (?1, ?2, ?3)")
                .bind(&insertion.name)
                .bind(insertion.category)
                .bind(insertion.unit_type)
                .execute(&mut *tx)
                .await?;

        let id = res.last_insert_rowid();
        if id == 0 {
            // dropping the transaction rolls the insert back
            return Err(DbError::Insertion(format!(
                "no id generated for catalog entry '{}'",
                insertion.name
            )));
        }

        tx.commit().await?;
        tracing::debug!(name = %insertion.name, id, "added catalog entry");
        Ok(id)
    }

    /// Insert one inventory row for the (user, ingredient) pair and
    /// return the composed record re-read after commit.
    pub async fn add_to_inventory(
        &self,
        user_id: i64,
        ingredient_id: i64,
        insertion: &InventoryInsertion,
    ) -> DbResult<InventoryItemDetails> {
        let mut tx = self.pool()?.begin().await?;

        if stock_exists(&mut tx, user_id, ingredient_id).await? {
            return Err(DbError::AlreadyInInventory {
                user_id,
                ingredient_id,
            });
        }

        sqlx::query(
            "INSERT INTO inventory \
             (user_id, ingredient_id, quantity, minimum_threshold, expiration_date) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(user_id)
        .bind(ingredient_id)
        .bind(insertion.quantity)
        .bind(insertion.minimum_threshold)
        .bind(&insertion.expiration_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        // the row is persisted at this point; a missing read-back is a
        // consistency fault, not a client error
        self.info_by_id(ingredient_id, user_id).await?.ok_or_else(|| {
            DbError::Insertion(format!(
                "inventory row for user {user_id} and ingredient {ingredient_id} \
                 missing after insert"
            ))
        })
    }

    /// Two-phase add: resolve the catalog id by name, creating the
    /// catalog entry lazily when the name is new, then insert the
    /// user's inventory row.
    pub async fn add_ingredient(
        &self,
        user_id: i64,
        item: &IngredientItemInsertion,
    ) -> DbResult<InventoryItemDetails> {
        let ingredient_id = match self.ingredient_id_by_name(&item.name).await? {
            Some(id) => id,
            None => self.add_ingredient_to_catalog(&item.catalog()).await?,
        };
        self.add_to_inventory(user_id, ingredient_id, &item.stock())
            .await
    }

    /// Delete the user's inventory row. The row must exist; `Ok(false)`
    /// signals that the delete affected nothing despite the check
    /// having passed.
    pub async fn delete_from_inventory(
        &self,
        ingredient: IngredientRef<'_>,
        user_id: i64,
    ) -> DbResult<bool> {
        let mut tx = self.pool()?.begin().await?;

        let not_in_inventory = || DbError::Deletion {
            user_id,
            ingredient: ingredient.to_string(),
        };

        let ingredient_id = catalog_id(&mut tx, ingredient)
            .await?
            .ok_or_else(not_in_inventory)?;
        if !stock_exists(&mut tx, user_id, ingredient_id).await? {
            return Err(not_in_inventory());
        }

        let res = sqlx::query("DELETE FROM inventory WHERE user_id = ?1 AND ingredient_id = ?2")
            .bind(user_id)
            .bind(ingredient_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(res.rows_affected() > 0)
    }

    /// Apply a sparse patch to the user's inventory row, restamping
    /// `updated_at` in the same statement, and return the re-read
    /// composed record.
    pub async fn update_in_inventory(
        &self,
        ingredient: IngredientRef<'_>,
        user_id: i64,
        patch: &InventoryUpdate,
    ) -> DbResult<InventoryItemDetails> {
        if patch.is_empty() {
            return Err(DbError::Update("no fields to update".into()));
        }

        let mut tx = self.pool()?.begin().await?;

        let not_in_inventory = || {
            DbError::Update(format!(
                "'{ingredient}' is not in the inventory of user {user_id}"
            ))
        };

        let ingredient_id = catalog_id(&mut tx, ingredient)
            .await?
            .ok_or_else(not_in_inventory)?;
        if !stock_exists(&mut tx, user_id, ingredient_id).await? {
            return Err(not_in_inventory());
        }

        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE inventory SET ");
        let mut fields = builder.separated(", ");
        if let Some(quantity) = patch.quantity {
            fields.push("quantity = ").push_bind_unseparated(quantity);
        }
        if let Some(minimum_threshold) = patch.minimum_threshold {
            fields
                .push("minimum_threshold = ")
                .push_bind_unseparated(minimum_threshold);
        }
        if let Some(expiration_date) = &patch.expiration_date {
            // binding None clears the stored date
            fields
                .push("expiration_date = ")
                .push_bind_unseparated(expiration_date.clone());
        }
        fields.push(format!("updated_at = ({})", schema::NOW));
        builder
            .push(" WHERE user_id = ")
            .push_bind(user_id)
            .push(" AND ingredient_id = ")
            .push_bind(ingredient_id);

        let res = builder.build().execute(&mut *tx).await?;
        if res.rows_affected() == 0 {
            return Err(DbError::Update(format!(
                "update of '{ingredient}' for user {user_id} affected no rows"
            )));
        }
        tx.commit().await?;

        self.info_by_id(ingredient_id, user_id)
            .await?
            .ok_or_else(|| {
                DbError::Update(format!(
                    "inventory row of '{ingredient}' for user {user_id} missing after update"
                ))
            })
    }
}

async fn catalog_id(
    conn: &mut SqliteConnection,
    ingredient: IngredientRef<'_>,
) -> DbResult<Option<i64>> {
    match ingredient {
        IngredientRef::Id(id) => Ok(Some(id)),
        IngredientRef::Name(name) => {
            let id = sqlx::query_scalar("SELECT id FROM ingredients WHERE name = ?1")
                .bind(name)
                .fetch_optional(&mut *conn)
                .await?;
            Ok(id)
        }
    }
}

async fn stock_exists(
    conn: &mut SqliteConnection,
    user_id: i64,
    ingredient_id: i64,
) -> DbResult<bool> {
    let exists = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM inventory WHERE user_id = ?1 AND ingredient_id = ?2)",
    )
    .bind(user_id)
    .bind(ingredient_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}
