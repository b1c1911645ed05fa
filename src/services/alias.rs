//! Alias-to-canonical uid resolution.
//!
//! Every write that names an anime goes through here first so that per-user
//! rows stay attached to one canonical identity, whichever provider uid the
//! caller still holds. Resolution is a single lookup and never chains.

use anyhow::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use sea_orm_migration::SchemaManager;
use tracing::{info, warn};

use crate::db::repositories::alias::AliasRepository;

const ALIAS_TABLE: &str = "anime_uid_aliases";

/// Whether the alias table exists in the connected database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasStoreCapability {
    Available,
    Unavailable,
}

#[derive(Clone)]
pub struct AliasResolver {
    conn: DatabaseConnection,
    capability: AliasStoreCapability,
}

impl AliasResolver {
    /// Checks once for the alias table and keeps the answer for the lifetime
    /// of the resolver. A failed check counts as unavailable.
    pub async fn probe(conn: DatabaseConnection) -> Self {
        let capability = match SchemaManager::new(&conn).has_table(ALIAS_TABLE).await {
            Ok(true) => AliasStoreCapability::Available,
            Ok(false) => {
                warn!("Alias table missing, uid canonicalization disabled");
                AliasStoreCapability::Unavailable
            }
            Err(e) => {
                warn!(error = %e, "Alias store probe failed, uid canonicalization disabled");
                AliasStoreCapability::Unavailable
            }
        };

        info!(?capability, "Alias store probed");
        Self { conn, capability }
    }

    #[must_use]
    pub const fn with_capability(conn: DatabaseConnection, capability: AliasStoreCapability) -> Self {
        Self { conn, capability }
    }

    #[must_use]
    pub const fn capability(&self) -> AliasStoreCapability {
        self.capability
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.capability, AliasStoreCapability::Available)
    }

    /// Canonical uid for `uid`, or the trimmed input when there is no alias,
    /// the store is unavailable, or the lookup fails.
    pub async fn resolve_canonical_uid(&self, uid: &str) -> String {
        self.resolve_in(&self.conn, uid).await
    }

    /// Same as [`Self::resolve_canonical_uid`] but on a caller-supplied
    /// connection, so lookups can join an open transaction.
    pub async fn resolve_in<C: ConnectionTrait>(&self, conn: &C, uid: &str) -> String {
        let uid = uid.trim();
        if uid.is_empty() || !self.is_available() {
            return uid.to_string();
        }

        match AliasRepository::new(conn).find_canonical(uid).await {
            Ok(Some(canonical)) => canonical,
            Ok(None) => uid.to_string(),
            Err(e) => {
                warn!(uid, error = %e, "Alias lookup failed, treating uid as canonical");
                uid.to_string()
            }
        }
    }

    /// Maps each of `aliases` to `canonical_uid`.
    ///
    /// Does nothing when `canonical_uid` is blank, the store is unavailable,
    /// or no alias is left after dropping blanks and `canonical_uid` itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails, so an enclosing transaction can
    /// roll back.
    pub async fn upsert_uid_aliases<C: ConnectionTrait>(
        &self,
        conn: &C,
        canonical_uid: &str,
        aliases: &[String],
    ) -> Result<u64> {
        let canonical_uid = canonical_uid.trim();
        if canonical_uid.is_empty() || !self.is_available() {
            return Ok(0);
        }

        let aliases = alias_candidates(canonical_uid, aliases);
        if aliases.is_empty() {
            return Ok(0);
        }

        AliasRepository::new(conn)
            .upsert_many(canonical_uid, &aliases)
            .await
    }
}

/// Trimmed, deduplicated aliases, minus blanks and the canonical uid.
fn alias_candidates(canonical_uid: &str, aliases: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(aliases.len());
    for alias in aliases {
        let alias = alias.trim();
        if alias.is_empty() || alias == canonical_uid || out.iter().any(|a| a == alias) {
            continue;
        }
        out.push(alias.to_string());
    }
    out
}
