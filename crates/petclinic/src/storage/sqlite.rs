//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! SQLite storage implementation
//!
//! Integrity rules live in the schema: `UNIQUE` columns, `ON DELETE
//! CASCADE` from owners to pets to visits and `ON DELETE SET NULL` for
//! the lookup references. `AUTOINCREMENT` keeps ids from being reused.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SqliteConfig;
use crate::error::{ClinicError, ClinicResult};
use crate::model::{
    Contact, EntityId, EntityKind, NamedEntry, NewOwner, NewPet, NewVet, NewVisit, Owner,
    OwnerFilter, Pet, PetType, Specialty, Vet, VetFilter, Visit,
};
use crate::storage::{ClinicStore, StorageError, StorageStats};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS owners (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        street_address TEXT NOT NULL DEFAULT '',
        city TEXT NOT NULL DEFAULT '',
        state TEXT NOT NULL DEFAULT '',
        telephone TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pet_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS specialties (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        street_address TEXT NOT NULL DEFAULT '',
        city TEXT NOT NULL DEFAULT '',
        state TEXT NOT NULL DEFAULT '',
        telephone TEXT NOT NULL DEFAULT '',
        specialty_id INTEGER REFERENCES specialties(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        birth_date TEXT NOT NULL,
        owner_id INTEGER NOT NULL REFERENCES owners(id) ON DELETE CASCADE,
        pet_type_id INTEGER REFERENCES pet_types(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS visits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        visit_date TEXT NOT NULL,
        description TEXT NOT NULL,
        pet_id INTEGER NOT NULL REFERENCES pets(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_owners_state ON owners(state)",
    "CREATE INDEX IF NOT EXISTS idx_vets_state ON vets(state)",
    "CREATE INDEX IF NOT EXISTS idx_pets_owner ON pets(owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_visits_pet ON visits(pet_id)",
];

const OWNER_COLUMNS: &str =
    "id, email, first_name, last_name, street_address, city, state, telephone";
const VET_COLUMNS: &str =
    "id, email, first_name, last_name, street_address, city, state, telephone, specialty_id";
const PET_COLUMNS: &str = "id, name, birth_date, owner_id, pet_type_id";
const VISIT_COLUMNS: &str = "id, visit_date, description, pet_id";

fn query_error(err: sqlx::Error) -> ClinicError {
    StorageError::QueryError {
        message: format!("Query error: {}", err),
    }
    .into()
}

fn write_error(kind: EntityKind) -> impl Fn(sqlx::Error) -> ClinicError {
    move |err| StorageError::from_sqlx(kind, err).into()
}

/// Field, target kind and id of a reference written by a query
type Reference<'a> = (&'a str, EntityKind, Option<EntityId>);

fn transaction_error(err: sqlx::Error) -> ClinicError {
    StorageError::TransactionError {
        message: format!("Transaction error: {}", err),
    }
    .into()
}

fn contact_from_row(row: &SqliteRow) -> Result<Contact, sqlx::Error> {
    Ok(Contact {
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        street_address: row.try_get("street_address")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        telephone: row.try_get("telephone")?,
    })
}

fn owner_from_row(row: &SqliteRow) -> Result<Owner, sqlx::Error> {
    Ok(Owner {
        id: row.try_get("id")?,
        contact: contact_from_row(row)?,
    })
}

fn vet_from_row(row: &SqliteRow) -> Result<Vet, sqlx::Error> {
    Ok(Vet {
        id: row.try_get("id")?,
        contact: contact_from_row(row)?,
        specialty: row.try_get("specialty_id")?,
    })
}

fn pet_type_from_row(row: &SqliteRow) -> Result<PetType, sqlx::Error> {
    Ok(PetType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn specialty_from_row(row: &SqliteRow) -> Result<Specialty, sqlx::Error> {
    Ok(Specialty {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn pet_from_row(row: &SqliteRow) -> Result<Pet, sqlx::Error> {
    Ok(Pet {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        birth_date: row.try_get("birth_date")?,
        owner: row.try_get("owner_id")?,
        pet_type: row.try_get("pet_type_id")?,
    })
}

fn visit_from_row(row: &SqliteRow) -> Result<Visit, sqlx::Error> {
    Ok(Visit {
        id: row.try_get("id")?,
        visit_date: row.try_get("visit_date")?,
        description: row.try_get("description")?,
        pet: row.try_get("pet_id")?,
    })
}

fn pet_references(pet: &NewPet) -> [Reference<'static>; 2] {
    [
        ("owner", EntityKind::Owner, Some(pet.owner)),
        ("pet_type", EntityKind::PetType, pet.pet_type),
    ]
}

fn map_rows<T>(
    rows: Vec<SqliteRow>,
    convert: fn(&SqliteRow) -> Result<T, sqlx::Error>,
) -> ClinicResult<Vec<T>> {
    rows.iter()
        .map(|row| convert(row).map_err(query_error))
        .collect()
}

/// SQLite storage backend
pub struct SqliteStore {
    /// Database connection pool
    pool: SqlitePool,
    /// Database path, `None` for a private in-memory database
    database_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (and if allowed create) the database file
    pub async fn new(config: &SqliteConfig) -> ClinicResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.database_path)
            .create_if_missing(config.create_if_missing)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionError {
                message: format!("Connection error: {}", e),
            })?;

        Self::create_schema(&pool).await?;
        info!(
            "Opened SQLite store at {}",
            config.database_path.display()
        );

        Ok(Self {
            pool,
            database_path: Some(config.database_path.clone()),
        })
    }

    /// Private in-memory database. A single connection that is never
    /// recycled keeps the data alive as long as the store.
    pub async fn in_memory() -> ClinicResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::ConfigurationError {
                message: e.to_string(),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionError {
                message: format!("Connection error: {}", e),
            })?;

        Self::create_schema(&pool).await?;
        Ok(Self {
            pool,
            database_path: None,
        })
    }

    pub fn database_path(&self) -> Option<&PathBuf> {
        self.database_path.as_ref()
    }

    /// Create database schema
    async fn create_schema(pool: &SqlitePool) -> ClinicResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(pool)
                .await
                .map_err(query_error)?;
        }
        debug!("SQLite schema ready");
        Ok(())
    }

    async fn fetch_all<T>(
        &self,
        sql: &str,
        convert: fn(&SqliteRow) -> Result<T, sqlx::Error>,
    ) -> ClinicResult<Vec<T>> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        map_rows(rows, convert)
    }

    async fn fetch_by_id<T>(
        &self,
        sql: &str,
        id: EntityId,
        convert: fn(&SqliteRow) -> Result<T, sqlx::Error>,
    ) -> ClinicResult<Option<T>> {
        let row = sqlx::query(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        row.as_ref()
            .map(|row| convert(row).map_err(query_error))
            .transpose()
    }

    async fn delete_by_id(&self, kind: EntityKind, id: EntityId) -> ClinicResult<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// Turn a failed write into a clinic error. A foreign key failure is
    /// traced back to the first reference that names a missing record.
    async fn write_failure(
        &self,
        kind: EntityKind,
        err: sqlx::Error,
        references: &[Reference<'_>],
    ) -> ClinicError {
        let error = StorageError::from_sqlx(kind, err);
        if let StorageError::ConstraintViolation { .. } = error {
            for (field, target, id) in references {
                let Some(id) = *id else { continue };
                if let Ok(false) = self.exists(*target, id).await {
                    return StorageError::MissingReference {
                        field: field.to_string(),
                        id,
                    }
                    .into();
                }
            }
        }
        error.into()
    }
}

#[async_trait]
impl ClinicStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn list_owners(&self, filter: &OwnerFilter) -> ClinicResult<Vec<Owner>> {
        let rows = match filter.state.as_deref() {
            Some(state) => sqlx::query(&format!(
                "SELECT {} FROM owners WHERE state = ? ORDER BY id",
                OWNER_COLUMNS
            ))
            .bind(state)
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query(&format!("SELECT {} FROM owners ORDER BY id", OWNER_COLUMNS))
                .fetch_all(&self.pool)
                .await,
        }
        .map_err(query_error)?;
        map_rows(rows, owner_from_row)
    }

    async fn get_owner(&self, id: EntityId) -> ClinicResult<Option<Owner>> {
        self.fetch_by_id(
            &format!("SELECT {} FROM owners WHERE id = ?", OWNER_COLUMNS),
            id,
            owner_from_row,
        )
        .await
    }

    async fn insert_owner(&self, owner: NewOwner) -> ClinicResult<Owner> {
        let c = &owner.contact;
        let id = sqlx::query(
            "INSERT INTO owners (email, first_name, last_name, street_address, city, state, telephone) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&c.email)
        .bind(&c.first_name)
        .bind(&c.last_name)
        .bind(&c.street_address)
        .bind(&c.city)
        .bind(&c.state)
        .bind(&c.telephone)
        .execute(&self.pool)
        .await
        .map_err(write_error(EntityKind::Owner))?
        .last_insert_rowid();
        Ok(owner.into_owner(id))
    }

    async fn update_owner(&self, owner: Owner) -> ClinicResult<Owner> {
        let c = &owner.contact;
        let result = sqlx::query(
            "UPDATE owners SET email = ?, first_name = ?, last_name = ?, street_address = ?, \
             city = ?, state = ?, telephone = ? WHERE id = ?",
        )
        .bind(&c.email)
        .bind(&c.first_name)
        .bind(&c.last_name)
        .bind(&c.street_address)
        .bind(&c.city)
        .bind(&c.state)
        .bind(&c.telephone)
        .bind(owner.id)
        .execute(&self.pool)
        .await
        .map_err(write_error(EntityKind::Owner))?;
        if result.rows_affected() == 0 {
            return Err(ClinicError::not_found(EntityKind::Owner, owner.id));
        }
        Ok(owner)
    }

    async fn delete_owner(&self, id: EntityId) -> ClinicResult<bool> {
        self.delete_by_id(EntityKind::Owner, id).await
    }

    async fn list_vets(&self, filter: &VetFilter) -> ClinicResult<Vec<Vet>> {
        let rows = match filter.state.as_deref() {
            Some(state) => sqlx::query(&format!(
                "SELECT {} FROM vets WHERE state = ? ORDER BY id",
                VET_COLUMNS
            ))
            .bind(state)
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query(&format!("SELECT {} FROM vets ORDER BY id", VET_COLUMNS))
                .fetch_all(&self.pool)
                .await,
        }
        .map_err(query_error)?;
        map_rows(rows, vet_from_row)
    }

    async fn get_vet(&self, id: EntityId) -> ClinicResult<Option<Vet>> {
        self.fetch_by_id(
            &format!("SELECT {} FROM vets WHERE id = ?", VET_COLUMNS),
            id,
            vet_from_row,
        )
        .await
    }

    async fn insert_vet(&self, vet: NewVet) -> ClinicResult<Vet> {
        let c = &vet.contact;
        let result = sqlx::query(
            "INSERT INTO vets (email, first_name, last_name, street_address, city, state, telephone, specialty_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&c.email)
        .bind(&c.first_name)
        .bind(&c.last_name)
        .bind(&c.street_address)
        .bind(&c.city)
        .bind(&c.state)
        .bind(&c.telephone)
        .bind(vet.specialty)
        .execute(&self.pool)
        .await;
        match result {
            Ok(done) => Ok(vet.into_vet(done.last_insert_rowid())),
            Err(err) => Err(self
                .write_failure(
                    EntityKind::Vet,
                    err,
                    &[("specialty", EntityKind::Specialty, vet.specialty)],
                )
                .await),
        }
    }

    async fn update_vet(&self, vet: Vet) -> ClinicResult<Vet> {
        let c = &vet.contact;
        let result = sqlx::query(
            "UPDATE vets SET email = ?, first_name = ?, last_name = ?, street_address = ?, \
             city = ?, state = ?, telephone = ?, specialty_id = ? WHERE id = ?",
        )
        .bind(&c.email)
        .bind(&c.first_name)
        .bind(&c.last_name)
        .bind(&c.street_address)
        .bind(&c.city)
        .bind(&c.state)
        .bind(&c.telephone)
        .bind(vet.specialty)
        .bind(vet.id)
        .execute(&self.pool)
        .await;
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                return Err(self
                    .write_failure(
                        EntityKind::Vet,
                        err,
                        &[("specialty", EntityKind::Specialty, vet.specialty)],
                    )
                    .await)
            }
        };
        if result.rows_affected() == 0 {
            return Err(ClinicError::not_found(EntityKind::Vet, vet.id));
        }
        Ok(vet)
    }

    async fn delete_vet(&self, id: EntityId) -> ClinicResult<bool> {
        self.delete_by_id(EntityKind::Vet, id).await
    }

    async fn list_pet_types(&self) -> ClinicResult<Vec<PetType>> {
        self.fetch_all("SELECT id, name FROM pet_types ORDER BY id", pet_type_from_row)
            .await
    }

    async fn get_pet_type(&self, id: EntityId) -> ClinicResult<Option<PetType>> {
        self.fetch_by_id(
            "SELECT id, name FROM pet_types WHERE id = ?",
            id,
            pet_type_from_row,
        )
        .await
    }

    async fn insert_pet_type(&self, entry: NamedEntry) -> ClinicResult<PetType> {
        let id = sqlx::query("INSERT INTO pet_types (name) VALUES (?)")
            .bind(&entry.name)
            .execute(&self.pool)
            .await
            .map_err(write_error(EntityKind::PetType))?
            .last_insert_rowid();
        Ok(entry.into_pet_type(id))
    }

    async fn update_pet_type(&self, pet_type: PetType) -> ClinicResult<PetType> {
        let result = sqlx::query("UPDATE pet_types SET name = ? WHERE id = ?")
            .bind(&pet_type.name)
            .bind(pet_type.id)
            .execute(&self.pool)
            .await
            .map_err(write_error(EntityKind::PetType))?;
        if result.rows_affected() == 0 {
            return Err(ClinicError::not_found(EntityKind::PetType, pet_type.id));
        }
        Ok(pet_type)
    }

    async fn delete_pet_type(&self, id: EntityId) -> ClinicResult<bool> {
        self.delete_by_id(EntityKind::PetType, id).await
    }

    async fn list_specialties(&self) -> ClinicResult<Vec<Specialty>> {
        self.fetch_all(
            "SELECT id, name FROM specialties ORDER BY id",
            specialty_from_row,
        )
        .await
    }

    async fn get_specialty(&self, id: EntityId) -> ClinicResult<Option<Specialty>> {
        self.fetch_by_id(
            "SELECT id, name FROM specialties WHERE id = ?",
            id,
            specialty_from_row,
        )
        .await
    }

    async fn insert_specialty(&self, entry: NamedEntry) -> ClinicResult<Specialty> {
        let id = sqlx::query("INSERT INTO specialties (name) VALUES (?)")
            .bind(&entry.name)
            .execute(&self.pool)
            .await
            .map_err(write_error(EntityKind::Specialty))?
            .last_insert_rowid();
        Ok(entry.into_specialty(id))
    }

    async fn update_specialty(&self, specialty: Specialty) -> ClinicResult<Specialty> {
        let result = sqlx::query("UPDATE specialties SET name = ? WHERE id = ?")
            .bind(&specialty.name)
            .bind(specialty.id)
            .execute(&self.pool)
            .await
            .map_err(write_error(EntityKind::Specialty))?;
        if result.rows_affected() == 0 {
            return Err(ClinicError::not_found(EntityKind::Specialty, specialty.id));
        }
        Ok(specialty)
    }

    async fn delete_specialty(&self, id: EntityId) -> ClinicResult<bool> {
        self.delete_by_id(EntityKind::Specialty, id).await
    }

    async fn list_pets(&self, owner: Option<EntityId>) -> ClinicResult<Vec<Pet>> {
        let rows = match owner {
            Some(owner) => sqlx::query(&format!(
                "SELECT {} FROM pets WHERE owner_id = ? ORDER BY id",
                PET_COLUMNS
            ))
            .bind(owner)
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query(&format!("SELECT {} FROM pets ORDER BY id", PET_COLUMNS))
                .fetch_all(&self.pool)
                .await,
        }
        .map_err(query_error)?;
        map_rows(rows, pet_from_row)
    }

    async fn get_pet(&self, id: EntityId) -> ClinicResult<Option<Pet>> {
        self.fetch_by_id(
            &format!("SELECT {} FROM pets WHERE id = ?", PET_COLUMNS),
            id,
            pet_from_row,
        )
        .await
    }

    async fn insert_pets(&self, pets: Vec<NewPet>) -> ClinicResult<Vec<Pet>> {
        let mut tx = self.pool.begin().await.map_err(transaction_error)?;
        let mut stored = Vec::with_capacity(pets.len());
        for pet in pets {
            let result = sqlx::query(
                "INSERT INTO pets (name, birth_date, owner_id, pet_type_id) VALUES (?, ?, ?, ?)",
            )
            .bind(&pet.name)
            .bind(pet.birth_date)
            .bind(pet.owner)
            .bind(pet.pet_type)
            .execute(&mut *tx)
            .await;
            match result {
                Ok(done) => stored.push(pet.into_pet(done.last_insert_rowid())),
                Err(err) => {
                    drop(tx);
                    return Err(self
                        .write_failure(EntityKind::Pet, err, &pet_references(&pet))
                        .await);
                }
            }
        }
        tx.commit().await.map_err(transaction_error)?;
        Ok(stored)
    }

    async fn update_pet(&self, pet: Pet) -> ClinicResult<Pet> {
        let result = sqlx::query(
            "UPDATE pets SET name = ?, birth_date = ?, owner_id = ?, pet_type_id = ? WHERE id = ?",
        )
        .bind(&pet.name)
        .bind(pet.birth_date)
        .bind(pet.owner)
        .bind(pet.pet_type)
        .bind(pet.id)
        .execute(&self.pool)
        .await;
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                let references = [
                    ("owner", EntityKind::Owner, Some(pet.owner)),
                    ("pet_type", EntityKind::PetType, pet.pet_type),
                ];
                return Err(self.write_failure(EntityKind::Pet, err, &references).await);
            }
        };
        if result.rows_affected() == 0 {
            return Err(ClinicError::not_found(EntityKind::Pet, pet.id));
        }
        Ok(pet)
    }

    async fn delete_pet(&self, id: EntityId) -> ClinicResult<bool> {
        self.delete_by_id(EntityKind::Pet, id).await
    }

    async fn list_visits(&self, pet: Option<EntityId>) -> ClinicResult<Vec<Visit>> {
        let rows = match pet {
            Some(pet) => sqlx::query(&format!(
                "SELECT {} FROM visits WHERE pet_id = ? ORDER BY id",
                VISIT_COLUMNS
            ))
            .bind(pet)
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query(&format!("SELECT {} FROM visits ORDER BY id", VISIT_COLUMNS))
                .fetch_all(&self.pool)
                .await,
        }
        .map_err(query_error)?;
        map_rows(rows, visit_from_row)
    }

    async fn get_visit(&self, id: EntityId) -> ClinicResult<Option<Visit>> {
        self.fetch_by_id(
            &format!("SELECT {} FROM visits WHERE id = ?", VISIT_COLUMNS),
            id,
            visit_from_row,
        )
        .await
    }

    async fn insert_visits(&self, visits: Vec<NewVisit>) -> ClinicResult<Vec<Visit>> {
        let mut tx = self.pool.begin().await.map_err(transaction_error)?;
        let mut stored = Vec::with_capacity(visits.len());
        for visit in visits {
            let result = sqlx::query(
                "INSERT INTO visits (visit_date, description, pet_id) VALUES (?, ?, ?)",
            )
            .bind(visit.visit_date)
            .bind(&visit.description)
            .bind(visit.pet)
            .execute(&mut *tx)
            .await;
            match result {
                Ok(done) => stored.push(visit.into_visit(done.last_insert_rowid())),
                Err(err) => {
                    drop(tx);
                    let references = [("pet", EntityKind::Pet, Some(visit.pet))];
                    return Err(self.write_failure(EntityKind::Visit, err, &references).await);
                }
            }
        }
        tx.commit().await.map_err(transaction_error)?;
        Ok(stored)
    }

    async fn update_visit(&self, visit: Visit) -> ClinicResult<Visit> {
        let result = sqlx::query(
            "UPDATE visits SET visit_date = ?, description = ?, pet_id = ? WHERE id = ?",
        )
        .bind(visit.visit_date)
        .bind(&visit.description)
        .bind(visit.pet)
        .bind(visit.id)
        .execute(&self.pool)
        .await;
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                let references = [("pet", EntityKind::Pet, Some(visit.pet))];
                return Err(self.write_failure(EntityKind::Visit, err, &references).await);
            }
        };
        if result.rows_affected() == 0 {
            return Err(ClinicError::not_found(EntityKind::Visit, visit.id));
        }
        Ok(visit)
    }

    async fn delete_visit(&self, id: EntityId) -> ClinicResult<bool> {
        self.delete_by_id(EntityKind::Visit, id).await
    }

    async fn exists(&self, kind: EntityKind, id: EntityId) -> ClinicResult<bool> {
        let row = sqlx::query(&format!("SELECT 1 FROM {} WHERE id = ? LIMIT 1", kind.table()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(row.is_some())
    }

    async fn is_taken(
        &self,
        kind: EntityKind,
        value: &str,
        exclude: Option<EntityId>,
    ) -> ClinicResult<bool> {
        let Some(field) = kind.unique_field() else {
            return Ok(false);
        };
        let row = sqlx::query(&format!(
            "SELECT 1 FROM {} WHERE {} = ? AND id != ? LIMIT 1",
            kind.table(),
            field
        ))
        .bind(value)
        .bind(exclude.unwrap_or(0))
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;
        Ok(row.is_some())
    }

    async fn health_check(&self) -> ClinicResult<bool> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(true)
    }

    async fn get_stats(&self) -> ClinicResult<StorageStats> {
        let mut counts = [0u64; 6];
        for (slot, kind) in counts.iter_mut().zip(EntityKind::ALL) {
            let row = sqlx::query(&format!("SELECT COUNT(*) FROM {}", kind.table()))
                .fetch_one(&self.pool)
                .await
                .map_err(query_error)?;
            let count: i64 = row.try_get(0).map_err(query_error)?;
            *slot = count.max(0) as u64;
        }
        let [owners, pet_types, specialties, vets, pets, visits] = counts;
        Ok(StorageStats {
            owners,
            pets,
            pet_types,
            vets,
            specialties,
            visits,
        })
    }

    async fn shutdown(&self) -> ClinicResult<()> {
        self.pool.close().await;
        info!("SQLite store closed");
        Ok(())
    }
}
