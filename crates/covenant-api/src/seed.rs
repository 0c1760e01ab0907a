//! Startup seeding of the default contract.

use covenant_core::{ContractId, DEFAULT_CONTRACTOR_NAME, Error, NewContract, Result};
use covenant_store::ContractStore;

/// What [`ensure_default_contract`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The default contract was created.
    Created(ContractId),
    /// A default contract already existed and was left untouched.
    AlreadyPresent(ContractId),
}

impl SeedOutcome {
    /// Returns the default contract's id.
    #[must_use]
    pub const fn contract_id(&self) -> ContractId {
        match self {
            Self::Created(id) | Self::AlreadyPresent(id) => *id,
        }
    }
}

/// Creates the default contract, with no services and a zero quota, if it
/// does not exist yet.
///
/// # Errors
///
/// Returns the store error if lookup or creation fails.
pub async fn ensure_default_contract(store: &dyn ContractStore) -> Result<SeedOutcome> {
    match store.get_default_contract().await {
        Ok(existing) => return Ok(SeedOutcome::AlreadyPresent(existing.id)),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    match store.create(NewContract::new(DEFAULT_CONTRACTOR_NAME)).await {
        Ok(id) => {
            tracing::info!(contract_id = %id, "default contract created");
            Ok(SeedOutcome::Created(id))
        }
        // Another instance won the race.
        Err(Error::AlreadyExists { .. }) => {
            let existing = store.get_default_contract().await?;
            Ok(SeedOutcome::AlreadyPresent(existing.id))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use covenant_core::ResourceQuota;
    use covenant_store::InMemoryContractStore;

    use super::*;

    #[tokio::test]
    async fn seeding_is_idempotent() -> Result<()> {
        let store = InMemoryContractStore::new();

        let first = ensure_default_contract(&store).await?;
        assert!(matches!(first, SeedOutcome::Created(_)));

        let second = ensure_default_contract(&store).await?;
        assert_eq!(second, SeedOutcome::AlreadyPresent(first.contract_id()));
        assert_eq!(store.contract_count()?, 1);

        let default = store.get_default_contract().await?;
        assert!(default.available_services.is_empty());
        assert_eq!(default.quota, ResourceQuota::default());
        Ok(())
    }

    #[tokio::test]
    async fn existing_default_is_left_untouched() -> Result<()> {
        let store = InMemoryContractStore::new();
        let id = store
            .create(NewContract::new(DEFAULT_CONTRACTOR_NAME).with_services(["lma"]))
            .await?;

        let outcome = ensure_default_contract(&store).await?;
        assert_eq!(outcome, SeedOutcome::AlreadyPresent(id));
        assert_eq!(
            store.get_contract(&id).await?.available_services,
            vec!["lma".to_string()]
        );
        Ok(())
    }
}
