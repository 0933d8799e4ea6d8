//! # Client Identity
//!
//! The attestation layer hands every invocation an identity with two faces:
//!
//! 1. **Attributes**: name/value pairs the CA embedded in the certificate
//!    (e.g. `admin=true`). Trusted as-is.
//! 2. **ID**: `base64("x509::<subject DN>::<issuer DN>")`. Opaque to the
//!    host; contracts decode and interpret it.
//!
//! [`X509Identity`] is the concrete identity used by the node binary and by
//! tests. Anything else that can answer the same three questions can stand
//! in for it through the [`ClientIdentity`] trait.

use std::collections::BTreeMap;

use base64::{engine::general_purpose, Engine as _};

use crate::config::{DEFAULT_ISSUER, DEFAULT_MSP_ID, IDENTITY_DELIMITER, IDENTITY_PREFIX};
use crate::error::{LedgerError, LedgerResult};

/// Read-only view of the caller of an invocation.
pub trait ClientIdentity {
    /// The encoded caller id: `base64("x509::<subject>::<issuer>")`.
    fn id(&self) -> LedgerResult<String>;

    /// The value of a certificate attribute, or `None` if it is absent.
    fn attribute(&self, name: &str) -> LedgerResult<Option<String>>;

    /// The membership service provider that issued the identity.
    fn msp_id(&self) -> LedgerResult<String>;
}

/// An X.509-style caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X509Identity {
    msp_id: String,
    subject: String,
    issuer: String,
    attributes: BTreeMap<String, String>,
}

impl X509Identity {
    /// Creates an identity from a subject DN such as
    /// `CN=hans.worb.alps.ea.jedo.cc,OU=client,O=alps`.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            msp_id: DEFAULT_MSP_ID.to_string(),
            subject: subject.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    /// Creates a client identity whose subject carries only the given
    /// common name plus the usual client OU.
    pub fn from_common_name(common_name: &str) -> Self {
        Self::new(format!("CN={common_name},OU=client"))
    }

    /// Overrides the issuer DN.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Overrides the MSP id.
    pub fn with_msp_id(mut self, msp_id: impl Into<String>) -> Self {
        self.msp_id = msp_id.into();
        self
    }

    /// Adds (or replaces) a certificate attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// The subject DN.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The decoded form of [`ClientIdentity::id`].
    pub fn raw_id(&self) -> String {
        format!(
            "{IDENTITY_PREFIX}{IDENTITY_DELIMITER}{}{IDENTITY_DELIMITER}{}",
            self.subject, self.issuer
        )
    }
}

impl ClientIdentity for X509Identity {
    fn id(&self) -> LedgerResult<String> {
        if self.subject.trim().is_empty() {
            return Err(LedgerError::Identity("subject DN is empty".into()));
        }
        Ok(general_purpose::STANDARD.encode(self.raw_id()))
    }

    fn attribute(&self, name: &str) -> LedgerResult<Option<String>> {
        Ok(self.attributes.get(name).cloned())
    }

    fn msp_id(&self) -> LedgerResult<String> {
        Ok(self.msp_id.clone())
    }
}
