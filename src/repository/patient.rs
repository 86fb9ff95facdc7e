use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::Result;
use crate::models::{Address, Patient, PatientRow};

use super::PatientStore;

const SELECT_PATIENT: &str = r#"
    SELECT
        p.id, p.firstname, p.lastname, p.personal_number, p.phone, p.email,
        a.id AS address_id, a.street, a.city, a.postal_code
    FROM patients p
    LEFT JOIN addresses a ON a.id = p.address_id
"#;

pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_address(
        tx: &mut Transaction<'_, Postgres>,
        address: &Address,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO addresses (street, city, postal_code)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.postal_code)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }
}

#[async_trait]
impl PatientStore for PatientRepository {
    async fn get_all(&self) -> Result<Vec<Patient>> {
        let sql = format!("{} ORDER BY p.id", SELECT_PATIENT);
        let rows = sqlx::query_as::<_, PatientRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = rows.len(), "Fetched all patients");

        Ok(rows.into_iter().map(Patient::from).collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Patient>> {
        let sql = format!("{} WHERE p.id = $1", SELECT_PATIENT);
        let row = sqlx::query_as::<_, PatientRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Patient::from))
    }

    async fn add(&self, patient: &mut Patient) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let address_id = match patient.address.as_mut() {
            Some(address) => {
                let id = Self::insert_address(&mut tx, address).await?;
                address.id = id;
                Some(id)
            }
            None => None,
        };

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO patients (firstname, lastname, personal_number, phone, email, address_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&patient.firstname)
        .bind(&patient.lastname)
        .bind(&patient.personal_number)
        .bind(&patient.phone)
        .bind(&patient.email)
        .bind(address_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        match id {
            Some(id) => {
                patient.id = id;
                tracing::info!(patient_id = %id, "Created patient");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update(&self, patient: &Patient) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, Option<i32>>(
            r#"
            SELECT address_id FROM patients
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(patient.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(old_address_id) = existing else {
            tracing::warn!(patient_id = %patient.id, "Update matched no patient");
            return Ok(false);
        };

        let new_address_id = match (&patient.address, old_address_id) {
            (Some(address), Some(address_id)) => {
                sqlx::query(
                    r#"
                    UPDATE addresses
                    SET street = $2, city = $3, postal_code = $4
                    WHERE id = $1
                    "#,
                )
                .bind(address_id)
                .bind(&address.street)
                .bind(&address.city)
                .bind(&address.postal_code)
                .execute(&mut *tx)
                .await?;
                Some(address_id)
            }
            (Some(address), None) => Some(Self::insert_address(&mut tx, address).await?),
            (None, _) => None,
        };

        let updated = sqlx::query(
            r#"
            UPDATE patients
            SET
                firstname = $2,
                lastname = $3,
                personal_number = $4,
                phone = $5,
                email = $6,
                address_id = $7
            WHERE id = $1
            "#,
        )
        .bind(patient.id)
        .bind(&patient.firstname)
        .bind(&patient.lastname)
        .bind(&patient.personal_number)
        .bind(&patient.phone)
        .bind(&patient.email)
        .bind(new_address_id)
        .execute(&mut *tx)
        .await?;

        // Address removed by this update: drop the orphan row.
        if let (Some(address_id), None) = (old_address_id, new_address_id) {
            sqlx::query("DELETE FROM addresses WHERE id = $1")
                .bind(address_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(patient_id = %patient.id, "Updated patient");

        Ok(updated.rows_affected() > 0)
    }

    async fn delete(&self, patient: &Patient) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_scalar::<_, Option<i32>>(
            r#"
            DELETE FROM patients
            WHERE id = $1
            RETURNING address_id
            "#,
        )
        .bind(patient.id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(Some(address_id)) = deleted {
            sqlx::query("DELETE FROM addresses WHERE id = $1")
                .bind(address_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        if deleted.is_some() {
            tracing::info!(patient_id = %patient.id, "Deleted patient");
        }

        Ok(deleted.is_some())
    }
}
