//! Contract model and quota merge rule.
//!
//! A [`Contract`] owns exactly one [`ResourceQuota`]. Both are created and
//! destroyed together by the store; the model here carries no persistence
//! logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::{ContractId, CreatorId};

/// Contractor name that identifies the default contract.
pub const DEFAULT_CONTRACTOR_NAME: &str = "default";

/// Largest value a quota field may hold; storage keeps quotas as signed
/// 64-bit integers.
#[allow(clippy::cast_sign_loss)]
pub const MAX_QUOTA_VALUE: u64 = i64::MAX as u64;

/// Capacity limits attached to a contract.
///
/// In a patch passed to [`ResourceQuota::merge`], a zero field means
/// "leave unchanged". A caller therefore cannot reset a limit to zero through
/// an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceQuota {
    /// CPU capacity.
    pub cpu: u64,
    /// Memory capacity.
    pub memory: u64,
    /// Block storage capacity.
    pub block: u64,
    /// SSD-backed block storage capacity.
    pub block_ssd: u64,
    /// File storage capacity.
    pub fs: u64,
    /// SSD-backed file storage capacity.
    pub fs_ssd: u64,
}

impl ResourceQuota {
    /// Applies `patch` on top of `self`, field by field.
    ///
    /// ```rust
    /// use covenant_core::ResourceQuota;
    ///
    /// let previous = ResourceQuota { cpu: 20, fs: 5, ..ResourceQuota::default() };
    /// let patch = ResourceQuota { cpu: 40, ..ResourceQuota::default() };
    /// assert_eq!(previous.merge(&patch), ResourceQuota { cpu: 40, fs: 5, ..ResourceQuota::default() });
    /// ```
    #[must_use]
    pub const fn merge(&self, patch: &Self) -> Self {
        Self {
            cpu: pick(self.cpu, patch.cpu),
            memory: pick(self.memory, patch.memory),
            block: pick(self.block, patch.block),
            block_ssd: pick(self.block_ssd, patch.block_ssd),
            fs: pick(self.fs, patch.fs),
            fs_ssd: pick(self.fs_ssd, patch.fs_ssd),
        }
    }

    /// Checks every field against [`MAX_QUOTA_VALUE`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first field out of range.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.fields() {
            if value > MAX_QUOTA_VALUE {
                return Err(Error::InvalidInput(format!(
                    "{name} quota {value} exceeds {MAX_QUOTA_VALUE}"
                )));
            }
        }
        Ok(())
    }

    /// Returns the fields paired with their names, in wire order.
    #[must_use]
    pub const fn fields(&self) -> [(&'static str, u64); 6] {
        [
            ("cpu", self.cpu),
            ("memory", self.memory),
            ("block", self.block),
            ("block_ssd", self.block_ssd),
            ("fs", self.fs),
            ("fs_ssd", self.fs_ssd),
        ]
    }

    /// Returns true when every field is zero, i.e. the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cpu == 0
            && self.memory == 0
            && self.block == 0
            && self.block_ssd == 0
            && self.fs == 0
            && self.fs_ssd == 0
    }
}

const fn pick(previous: u64, patch: u64) -> u64 {
    if patch == 0 { previous } else { patch }
}

/// A persisted contract joined with its quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Store-assigned identifier.
    pub id: ContractId,
    /// Unique contractor name.
    pub contractor_name: String,
    /// Enabled service names, in caller order.
    pub available_services: Vec<String>,
    /// Capacity limits.
    pub quota: ResourceQuota,
    /// Who requested the contract, if known.
    pub creator: Option<CreatorId>,
    /// Free-text description.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time of the contract row.
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// Returns true if this is the default contract.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.contractor_name == DEFAULT_CONTRACTOR_NAME
    }
}

/// Input for creating a contract. The identifier is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContract {
    /// Unique contractor name.
    pub contractor_name: String,
    /// Enabled service names.
    pub available_services: Vec<String>,
    /// Initial capacity limits.
    pub quota: ResourceQuota,
    /// Who requested the contract.
    pub creator: Option<CreatorId>,
    /// Free-text description.
    pub description: Option<String>,
}

impl NewContract {
    /// Creates a contract input with an empty service list and zero quota.
    #[must_use]
    pub fn new(contractor_name: impl Into<String>) -> Self {
        Self {
            contractor_name: contractor_name.into(),
            ..Self::default()
        }
    }

    /// Sets the enabled services.
    #[must_use]
    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_services = services.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the initial quota.
    #[must_use]
    pub const fn with_quota(mut self, quota: ResourceQuota) -> Self {
        self.quota = quota;
        self
    }

    /// Sets the creator.
    #[must_use]
    pub const fn with_creator(mut self, creator: Option<CreatorId>) -> Self {
        self.creator = creator;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// Before and after snapshots returned by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change<T> {
    /// Value before the update.
    pub previous: T,
    /// Value after the update.
    pub current: T,
}
