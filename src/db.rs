use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::info;

use crate::models::{CompletedTranslation, Language, NewLanguage, Translation};
use crate::retry::{with_retry, RetryConfig};
use crate::store::{LanguageStore, TranslationStore};

/// Shared select list for translations with both languages resolved
const TRANSLATION_SELECT: &str = "
    SELECT t.id, t.original_text, t.translated_text, t.translated_at,
           o.id AS o_id, o.name AS o_name, o.abbreviation AS o_abbreviation,
           o.is_origin_language AS o_is_origin, o.is_target_language AS o_is_target,
           g.id AS g_id, g.name AS g_name, g.abbreviation AS g_abbreviation,
           g.is_origin_language AS g_is_origin, g.is_target_language AS g_is_target
    FROM translations t
    LEFT JOIN languages o ON o.id = t.origin_language_id
    LEFT JOIN languages g ON g.id = t.target_language_id";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database and create tables
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Connect with retries, for start-up while the database may still be coming up
    pub async fn connect_with_retry(database_url: &str, config: &RetryConfig) -> Result<Self> {
        with_retry(config, "Database connection", || Self::new(database_url)).await
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS languages (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL DEFAULT '',
                abbreviation TEXT,
                is_origin_language BOOLEAN NOT NULL DEFAULT FALSE,
                is_target_language BOOLEAN NOT NULL DEFAULT FALSE
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create languages table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS translations (
                id SERIAL PRIMARY KEY,
                original_text VARCHAR(500) NOT NULL,
                translated_text TEXT,
                translated_at TIMESTAMPTZ,
                origin_language_id INTEGER REFERENCES languages(id) ON DELETE SET NULL,
                target_language_id INTEGER REFERENCES languages(id) ON DELETE SET NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create translations table")?;

        info!("✓ Database schema ready");
        Ok(())
    }
}

/// Read a language from prefixed join columns; absent when the join found nothing
fn joined_language(row: &PgRow, prefix: &str) -> Result<Option<Language>, sqlx::Error> {
    let id: Option<i32> = row.try_get(format!("{}_id", prefix).as_str())?;
    let Some(id) = id else {
        return Ok(None);
    };

    Ok(Some(Language {
        id,
        name: row.try_get(format!("{}_name", prefix).as_str())?,
        abbreviation: row.try_get(format!("{}_abbreviation", prefix).as_str())?,
        is_origin_language: row.try_get(format!("{}_is_origin", prefix).as_str())?,
        is_target_language: row.try_get(format!("{}_is_target", prefix).as_str())?,
    }))
}

fn translation_from_row(row: &PgRow) -> Result<Translation, sqlx::Error> {
    Ok(Translation {
        id: row.try_get("id")?,
        original_text: row.try_get("original_text")?,
        translated_text: row.try_get("translated_text")?,
        translated_at: row.try_get("translated_at")?,
        origin_language: joined_language(row, "o")?,
        target_language: joined_language(row, "g")?,
    })
}

#[async_trait]
impl LanguageStore for Database {
    async fn add_language(&self, language: &NewLanguage) -> Result<Language> {
        sqlx::query_as::<_, Language>(
            "INSERT INTO languages (name, abbreviation, is_origin_language, is_target_language)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, abbreviation, is_origin_language, is_target_language",
        )
        .bind(&language.name)
        .bind(&language.abbreviation)
        .bind(language.is_origin_language)
        .bind(language.is_target_language)
        .fetch_one(&self.pool)
        .await
        .context("Failed to add language")
    }

    async fn insert_languages(&self, languages: &[NewLanguage]) -> Result<usize> {
        if languages.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO languages (name, abbreviation, is_origin_language, is_target_language) ",
        );
        builder.push_values(languages, |mut b, language| {
            b.push_bind(&language.name)
                .push_bind(&language.abbreviation)
                .push_bind(language.is_origin_language)
                .push_bind(language.is_target_language);
        });

        let result = builder
            .build()
            .execute(&mut *tx)
            .await
            .context("Failed to insert languages")?;

        tx.commit().await.context("Failed to commit language insert")?;

        Ok(result.rows_affected() as usize)
    }

    async fn remove_language(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to remove language")?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_language(&self, id: i32) -> Result<Option<Language>> {
        sqlx::query_as::<_, Language>(
            "SELECT id, name, abbreviation, is_origin_language, is_target_language
             FROM languages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get language")
    }

    async fn list_languages(&self) -> Result<Vec<Language>> {
        sqlx::query_as::<_, Language>(
            "SELECT id, name, abbreviation, is_origin_language, is_target_language
             FROM languages ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list languages")
    }

    async fn language_exists(&self, id: i32) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM languages WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to check language")?;
        Ok(exists)
    }

    async fn exists_by_name_and_abbreviation(
        &self,
        name: &str,
        abbreviation: Option<&str>,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM languages
                WHERE name = $1 AND abbreviation IS NOT DISTINCT FROM $2
            )",
        )
        .bind(name)
        .bind(abbreviation)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check language by name and abbreviation")?;
        Ok(exists)
    }

    async fn find_by_abbreviation(&self, abbreviation: &str) -> Result<Option<Language>> {
        sqlx::query_as::<_, Language>(
            "SELECT id, name, abbreviation, is_origin_language, is_target_language
             FROM languages WHERE abbreviation = $1 ORDER BY id LIMIT 1",
        )
        .bind(abbreviation)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find language by abbreviation")
    }
}

#[async_trait]
impl TranslationStore for Database {
    async fn add_translation(&self, translation: &CompletedTranslation) -> Result<Translation> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO translations
                (original_text, translated_text, translated_at, origin_language_id, target_language_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&translation.original_text)
        .bind(&translation.translated_text)
        .bind(translation.translated_at)
        .bind(translation.origin_language.id)
        .bind(translation.target_language.id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to save translation")?;

        Ok(Translation {
            id,
            original_text: translation.original_text.clone(),
            translated_text: Some(translation.translated_text.clone()),
            translated_at: Some(translation.translated_at),
            origin_language: Some(translation.origin_language.clone()),
            target_language: Some(translation.target_language.clone()),
        })
    }

    async fn list_translations(&self) -> Result<Vec<Translation>> {
        let rows = sqlx::query(&format!("{} ORDER BY t.id", TRANSLATION_SELECT))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list translations")?;

        rows.iter()
            .map(translation_from_row)
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read translation row")
    }

    async fn get_translation(&self, id: i32) -> Result<Option<Translation>> {
        let row = sqlx::query(&format!("{} WHERE t.id = $1", TRANSLATION_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get translation")?;

        row.as_ref()
            .map(translation_from_row)
            .transpose()
            .context("Failed to read translation row")
    }

    async fn delete_translation(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM translations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete translation")?;

        Ok(result.rows_affected() > 0)
    }

    async fn translation_exists(&self, id: i32) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM translations WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to check translation")?;
        Ok(exists)
    }
}
