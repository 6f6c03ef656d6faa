use crate::connection::DatabasePool;
use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{
    ChatId, InventoryEntry, Medicine, MedicineId, NewMedicine, NewPharmacy, Owner, Pharmacy,
    PharmacyId, StockHit,
};
use crate::repository::{CatalogAdmin, CatalogStore, SnapshotTx, WriteTx};
use crate::transaction::{begin_with, AccessMode, IsolationLevel};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medicine_normalizer::normalize;
use sqlx::{FromRow, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

/// PostgreSQL-backed catalog store
///
/// Search snapshots run at REPEATABLE READ so the aggregator observes the
/// same state as the resolver.
pub struct PgCatalogStore {
    pool: DatabasePool,
}

impl PgCatalogStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

#[derive(FromRow)]
struct MedicineRow {
    id: Uuid,
    name: String,
    aliases: Vec<String>,
}

impl From<MedicineRow> for Medicine {
    fn from(row: MedicineRow) -> Self {
        Medicine {
            id: MedicineId(row.id),
            name: row.name,
            aliases: row.aliases,
        }
    }
}

#[derive(FromRow)]
struct PharmacyRow {
    id: Uuid,
    name: String,
    address: String,
    phone: String,
    created_at: DateTime<Utc>,
}

impl From<PharmacyRow> for Pharmacy {
    fn from(row: PharmacyRow) -> Self {
        Pharmacy {
            id: PharmacyId(row.id),
            name: row.name,
            address: row.address,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct StockRow {
    #[sqlx(flatten)]
    pharmacy: PharmacyRow,
    medicine_id: Uuid,
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn begin_snapshot(&self) -> DatabaseResult<Box<dyn SnapshotTx>> {
        let tx = begin_with(&self.pool, IsolationLevel::RepeatableRead, AccessMode::ReadOnly).await?;
        Ok(Box::new(PgSnapshotTx { tx }))
    }

    async fn begin_write(&self) -> DatabaseResult<Box<dyn WriteTx>> {
        let tx = begin_with(&self.pool, IsolationLevel::ReadCommitted, AccessMode::ReadWrite).await?;
        Ok(Box::new(PgWriteTx { tx }))
    }
}

struct PgSnapshotTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SnapshotTx for PgSnapshotTx {
    async fn medicine_candidates(
        &mut self,
        key: &str,
        floor: f64,
        limit: usize,
    ) -> DatabaseResult<Vec<Medicine>> {
        // Scoped to this transaction; the `%` operator reads it.
        sqlx::query("SELECT set_config('pg_trgm.similarity_threshold', $1, true)")
            .bind(floor.clamp(0.0, 1.0).to_string())
            .execute(&mut *self.tx)
            .await?;

        let rows = sqlx::query_as::<_, MedicineRow>(
            r#"
            WITH hits AS (
                SELECT medicine_id, MAX(similarity(name_key, $1)) AS score
                FROM medicine_names
                WHERE name_key % $1 OR name_key = $1
                GROUP BY medicine_id
                ORDER BY score DESC, medicine_id
                LIMIT $2
            )
            SELECT m.id,
                   m.name,
                   COALESCE(
                       ARRAY_AGG(n.name ORDER BY n.name) FILTER (WHERE NOT n.is_canonical),
                       ARRAY[]::TEXT[]
                   ) AS aliases
            FROM hits h
            JOIN medicines m ON m.id = h.medicine_id
            JOIN medicine_names n ON n.medicine_id = m.id
            GROUP BY m.id, m.name, h.score
            ORDER BY h.score DESC, m.id
            "#,
        )
        .bind(key)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&mut *self.tx)
        .await?;

        debug!(candidates = rows.len(), "Fetched medicine candidates");
        Ok(rows.into_iter().map(Medicine::from).collect())
    }

    async fn medicines_by_key_length(
        &mut self,
        min_chars: usize,
        max_chars: usize,
    ) -> DatabaseResult<Vec<Medicine>> {
        let rows = sqlx::query_as::<_, MedicineRow>(
            r#"
            SELECT m.id,
                   m.name,
                   COALESCE(
                       ARRAY_AGG(n.name ORDER BY n.name) FILTER (WHERE NOT n.is_canonical),
                       ARRAY[]::TEXT[]
                   ) AS aliases
            FROM medicines m
            JOIN medicine_names n ON n.medicine_id = m.id
            WHERE m.id IN (
                SELECT medicine_id
                FROM medicine_names
                WHERE char_length(name_key) BETWEEN $1 AND $2
            )
            GROUP BY m.id, m.name
            ORDER BY m.id
            "#,
        )
        .bind(i32::try_from(min_chars).unwrap_or(i32::MAX))
        .bind(i32::try_from(max_chars).unwrap_or(i32::MAX))
        .fetch_all(&mut *self.tx)
        .await?;

        debug!(medicines = rows.len(), min_chars, max_chars, "Fetched key-length band");
        Ok(rows.into_iter().map(Medicine::from).collect())
    }

    async fn stocking_pharmacies(
        &mut self,
        medicine_ids: &[MedicineId],
    ) -> DatabaseResult<Vec<StockHit>> {
        if medicine_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = medicine_ids.iter().map(|id| id.0).collect();

        let rows = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT p.id, p.name, p.address, p.phone, p.created_at, i.medicine_id
            FROM inventory i
            JOIN pharmacies p ON p.id = i.pharmacy_id
            WHERE i.medicine_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StockHit {
                pharmacy: row.pharmacy.into(),
                medicine_id: MedicineId(row.medicine_id),
            })
            .collect())
    }

    async fn finish(self: Box<Self>) -> DatabaseResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(format!("Failed to end snapshot: {}", e)))
    }
}

struct PgWriteTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl WriteTx for PgWriteTx {
    async fn insert_pharmacy(&mut self, pharmacy: &NewPharmacy) -> DatabaseResult<PharmacyId> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO pharmacies (id, name, address, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&pharmacy.name)
        .bind(&pharmacy.address)
        .bind(&pharmacy.phone)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(PharmacyId(id))
    }

    async fn insert_owner(&mut self, owner: &Owner) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO pharmacy_owners (chat_id, pharmacy_id) VALUES ($1, $2)")
            .bind(owner.chat_id.0)
            .bind(owner.pharmacy_id.0)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DatabaseResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(format!("Failed to commit: {}", e)))
    }

    async fn rollback(self: Box<Self>) -> DatabaseResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(format!("Failed to roll back: {}", e)))
    }
}

#[async_trait]
impl CatalogAdmin for PgCatalogStore {
    async fn add_medicine(&self, medicine: &NewMedicine) -> DatabaseResult<MedicineId> {
        let mut tx = begin_with(&self.pool, IsolationLevel::ReadCommitted, AccessMode::ReadWrite).await?;
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO medicines (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(&medicine.name)
            .execute(&mut *tx)
            .await?;

        insert_name(&mut tx, id, &medicine.name, true).await?;
        for alias in &medicine.aliases {
            insert_name(&mut tx, id, alias, false).await?;
        }

        tx.commit().await?;
        info!(medicine_id = %id, name = %medicine.name, "Medicine added");
        Ok(MedicineId(id))
    }

    async fn add_alias(&self, medicine_id: MedicineId, alias: &str) -> DatabaseResult<()> {
        let mut tx = begin_with(&self.pool, IsolationLevel::ReadCommitted, AccessMode::ReadWrite).await?;
        insert_name(&mut tx, medicine_id.0, alias, false).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn add_stock(&self, entry: InventoryEntry) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory (pharmacy_id, medicine_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(entry.pharmacy_id.0)
        .bind(entry.medicine_id.0)
        .execute(self.pool.pool())
        .await?;
        Ok(())
    }

    async fn list_pharmacies(&self) -> DatabaseResult<Vec<Pharmacy>> {
        let rows = sqlx::query_as::<_, PharmacyRow>(
            "SELECT id, name, address, phone, created_at FROM pharmacies ORDER BY name, id",
        )
        .fetch_all(self.pool.pool())
        .await?;
        Ok(rows.into_iter().map(Pharmacy::from).collect())
    }

    async fn pharmacy_by_owner(&self, chat_id: ChatId) -> DatabaseResult<Option<Pharmacy>> {
        let row = sqlx::query_as::<_, PharmacyRow>(
            r#"
            SELECT p.id, p.name, p.address, p.phone, p.created_at
            FROM pharmacy_owners o
            JOIN pharmacies p ON p.id = o.pharmacy_id
            WHERE o.chat_id = $1
            "#,
        )
        .bind(chat_id.0)
        .fetch_optional(self.pool.pool())
        .await?;
        Ok(row.map(Pharmacy::from))
    }
}

async fn insert_name(
    tx: &mut Transaction<'static, Postgres>,
    medicine_id: Uuid,
    name: &str,
    canonical: bool,
) -> DatabaseResult<()> {
    let key = normalize(name);
    if key.is_empty() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "medicine name {:?} has no usable characters",
            name
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO medicine_names (medicine_id, name, name_key, is_canonical)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (medicine_id, name_key) DO NOTHING
        "#,
    )
    .bind(medicine_id)
    .bind(name)
    .bind(key)
    .bind(canonical)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
