//! # Ledger Configuration & Constants
//!
//! Every host-side magic value lives here: composite key delimiters, sled
//! tree names, metadata keys, and the default MSP. Contract-level constants
//! (currency, id bounds, event names) belong to the contract crate, not here.

// ---------------------------------------------------------------------------
// Composite Keys
// ---------------------------------------------------------------------------

/// Prefix byte of every composite key. The stub rejects simple keys that
/// contain it; a key that starts with it must be a well-formed composite key.
pub const COMPOSITE_KEY_NAMESPACE: char = '\u{0}';

/// Separator written after the object type and after every attribute.
pub const COMPOSITE_KEY_SEPARATOR: char = '\u{0}';

/// Highest code point an attribute may contain. Everything else is allowed.
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Prefix of a rendered client identity (`x509::<subject>::<issuer>`).
pub const IDENTITY_PREFIX: &str = "x509";

/// Delimiter between the prefix, subject and issuer of a client identity.
pub const IDENTITY_DELIMITER: &str = "::";

/// MSP used when the caller does not name one.
pub const DEFAULT_MSP_ID: &str = "JedoMSP";

/// Issuer DN used when the caller does not name one.
pub const DEFAULT_ISSUER: &str = "CN=ca.alps.ea.jedo.cc,O=alps,C=CH";

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// sled tree holding the committed world state (JSON documents).
pub const TREE_WORLD_STATE: &str = "world_state";

/// sled tree holding committed chaincode events, keyed by commit sequence.
pub const TREE_EVENTS: &str = "events";

/// sled tree holding ledger bookkeeping values.
pub const TREE_METADATA: &str = "metadata";

/// Well-known key in the `metadata` tree for the latest commit sequence.
pub const META_LATEST_SEQUENCE: &[u8] = b"latest_commit_sequence";

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Length in bytes of a transaction id digest (hex doubles it).
pub const TX_ID_LENGTH: usize = 32;
