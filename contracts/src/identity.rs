//! # Role Resolution
//!
//! Turns the caller's certificate identity into a [`Role`]. Rules, first
//! match wins:
//!
//! 1. attribute `admin` equals `"true"` → [`Role::Admin`]
//! 2. decoded id contains `CN=<root admin CN>` → [`Role::Admin`]
//! 3. decoded id has fewer than two `::` segments → [`IdentityError::Format`]
//! 4. subject CN with one label equal to the admin marker → [`Role::Admin`]
//! 5. subject CN with exactly `gens_depth` labels → [`Role::Gens`]
//! 6. subject CN with more than `gens_depth` labels → [`Role::Human`]
//! 7. anything else → [`IdentityError::UnknownRole`]
//!
//! Resolution is pure. Any error means deny. An attribute lookup that fails
//! counts as an absent attribute, so such a caller is still classified by
//! its certificate name.
//!
//! ## Ownership
//!
//! Ownership is a substring test: a caller owns a wallet when its decoded
//! identity contains the wallet's `ownerId`. This is loose (an identity
//! containing `anna.worb.alps.ea.jedo.cc` also "contains" the owner id
//! `na.worb.alps.ea.jedo.cc`) and is kept as-is for compatibility with
//! existing wallets.

use base64::{engine::general_purpose, Engine as _};
use jedo_ledger::ClientIdentity;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{
    DEFAULT_ADMIN_ATTRIBUTE, DEFAULT_ADMIN_MARKER, DEFAULT_GENS_DEPTH, DEFAULT_ROOT_ADMIN_CN,
};
use crate::error::IdentityError;

const IDENTITY_DELIMITER: &str = "::";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What a caller is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Operates the ledger: freeze, close, credit, debit, global queries.
    Admin,
    /// A business that creates wallets for humans in its namespace.
    Gens,
    /// A wallet owner.
    Human,
    /// Never produced by [`CertificateRoleResolver`]; available to custom
    /// resolvers that want to admit a caller with no privileges.
    Unknown,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Gens => write!(f, "gens"),
            Role::Human => write!(f, "human"),
            Role::Unknown => write!(f, "unknown"),
        }
    }
}

/// Knobs of the naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Certificate attribute that grants admin when `"true"`.
    pub admin_attribute: String,
    /// Common name of the root administrator.
    pub root_admin_cn: String,
    /// Single-label CN that denotes an admin.
    pub admin_marker: String,
    /// CN label count of a gens; deeper names are humans.
    pub gens_depth: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            admin_attribute: DEFAULT_ADMIN_ATTRIBUTE.to_string(),
            root_admin_cn: DEFAULT_ROOT_ADMIN_CN.to_string(),
            admin_marker: DEFAULT_ADMIN_MARKER.to_string(),
            gens_depth: DEFAULT_GENS_DEPTH,
        }
    }
}

/// A resolved caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub role: Role,
    /// The decoded identity, `x509::<subject>::<issuer>`. Empty when it
    /// could not be decoded but an attribute granted admin anyway.
    pub id: String,
    /// The subject's CN, if one was found.
    pub common_name: Option<String>,
    /// Membership service provider of the caller's organization, when the
    /// host reports one. Logged with authorization decisions.
    pub msp_id: Option<String>,
}

impl Caller {
    /// A caller with the given role and decoded identity.
    pub fn new(role: Role, id: impl Into<String>) -> Self {
        let id = id.into();
        let common_name = common_name_of(&id).map(str::to_string);
        Self {
            role,
            id,
            common_name,
            msp_id: None,
        }
    }

    pub fn with_msp_id(mut self, msp_id: Option<String>) -> Self {
        self.msp_id = msp_id;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Substring ownership test against an `ownerId`.
    pub fn owns(&self, owner_id: &str) -> bool {
        !owner_id.is_empty() && self.id.contains(owner_id)
    }

    /// The gens's own name: the first label of its CN.
    pub fn gens_name(&self) -> Option<&str> {
        self.common_name
            .as_deref()
            .and_then(|cn| cn.split('.').next())
            .filter(|label| !label.is_empty())
    }
}

/// Maps a client identity to a [`Caller`].
pub trait RoleResolver {
    fn resolve(&self, identity: &dyn ClientIdentity) -> Result<Caller, IdentityError>;
}

// ---------------------------------------------------------------------------
// Certificate resolver
// ---------------------------------------------------------------------------

/// The naming-convention resolver described in the module docs.
#[derive(Debug, Clone, Default)]
pub struct CertificateRoleResolver {
    config: IdentityConfig,
}

impl CertificateRoleResolver {
    pub fn new(config: IdentityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Classifies an already decoded identity. Rules 2 to 7.
    pub fn role_of(&self, decoded: &str) -> Result<Role, IdentityError> {
        if decoded.contains(&format!("CN={}", self.config.root_admin_cn)) {
            return Ok(Role::Admin);
        }

        if decoded.split(IDENTITY_DELIMITER).count() < 2 {
            return Err(IdentityError::Format(decoded.to_string()));
        }

        let labels: Vec<&str> = match common_name_of(decoded) {
            Some(cn) => cn.split('.').collect(),
            None => return Err(IdentityError::UnknownRole(decoded.to_string())),
        };

        if labels.len() == 1 && labels[0] == self.config.admin_marker {
            Ok(Role::Admin)
        } else if labels.len() == self.config.gens_depth {
            Ok(Role::Gens)
        } else if labels.len() > self.config.gens_depth {
            Ok(Role::Human)
        } else {
            Err(IdentityError::UnknownRole(decoded.to_string()))
        }
    }
}

impl RoleResolver for CertificateRoleResolver {
    fn resolve(&self, identity: &dyn ClientIdentity) -> Result<Caller, IdentityError> {
        let admin_attribute = match identity.attribute(&self.config.admin_attribute) {
            Ok(value) => value,
            Err(e) => {
                debug!(attribute = %self.config.admin_attribute, error = %e, "attribute lookup failed");
                None
            }
        };
        let msp_id = match identity.msp_id() {
            Ok(msp_id) => Some(msp_id),
            Err(e) => {
                debug!(error = %e, "msp id unavailable");
                None
            }
        };

        let decoded = identity
            .id()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))
            .and_then(|raw| decode_identity(&raw));

        if admin_attribute.as_deref() == Some("true") {
            debug!(msp_id = ?msp_id, "caller is admin by attribute");
            return Ok(Caller::new(Role::Admin, decoded.unwrap_or_default()).with_msp_id(msp_id));
        }

        let decoded = decoded?;
        let role = self.role_of(&decoded)?;
        debug!(%role, msp_id = ?msp_id, "caller resolved");
        Ok(Caller::new(role, decoded).with_msp_id(msp_id))
    }
}

/// Decodes a base64 caller id into its `x509::<subject>::<issuer>` text.
pub fn decode_identity(raw: &str) -> Result<String, IdentityError> {
    let bytes = general_purpose::STANDARD
        .decode(raw)
        .map_err(|e| IdentityError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| IdentityError::Decode(e.to_string()))
}

/// The `CN=` value of the subject segment of a decoded identity.
fn common_name_of(decoded: &str) -> Option<&str> {
    let subject = decoded.split(IDENTITY_DELIMITER).nth(1)?;
    subject
        .split(',')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("CN="))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
