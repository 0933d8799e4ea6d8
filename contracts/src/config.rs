//! Wallet chaincode constants.
//!
//! Changing anything in the "Documents" or "Keys" sections changes what is
//! written to the ledger. Existing world state will not be migrated.

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Version reported by `GetContractVersion`.
pub const CONTRACT_VERSION: &str = "1.0.0";

/// The only currency this ledger carries.
pub const CURRENCY: &str = "JEDO";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Minimum length of a wallet or gens id, in bytes.
pub const MIN_ID_LENGTH: usize = 3;

/// Maximum length of a wallet or gens id, in bytes.
pub const MAX_ID_LENGTH: usize = 64;

/// Minimum length of an owner id, in bytes.
pub const MIN_OWNER_ID_LENGTH: usize = 3;

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// `docType` of wallet documents.
pub const DOC_TYPE_WALLET: &str = "wallet";

/// `docType` of transaction records.
pub const DOC_TYPE_TRANSACTION: &str = "transaction";

/// `docType` of gens documents.
pub const DOC_TYPE_GENS: &str = "gens";

/// Description of the record written for a non-zero opening balance.
pub const INITIAL_BALANCE_DESCRIPTION: &str = "Initial balance";

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Composite-key object type of transaction records: `(transaction, walletId, txId)`.
pub const TRANSACTION_NAMESPACE: &str = "transaction";

/// Composite-key object type of gens records: `(gens, gensId)`.
pub const GENS_NAMESPACE: &str = "gens";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Emitted by `CreateWallet`.
pub const EVENT_WALLET_CREATED: &str = "WalletCreated";

/// Emitted by `Transfer`.
pub const EVENT_TRANSFER_COMPLETED: &str = "TransferCompleted";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Certificate attribute that grants admin when set to `"true"`.
pub const DEFAULT_ADMIN_ATTRIBUTE: &str = "admin";

/// Common name of the root administrator.
pub const DEFAULT_ROOT_ADMIN_CN: &str = "admin.alps.ea.jedo.cc";

/// A single-label CN equal to this marker is an admin.
pub const DEFAULT_ADMIN_MARKER: &str = "admin";

/// Number of CN labels of a gens identity: `worb.alps.ea.jedo.cc` has
/// five. Anything deeper, such as `hans.worb.alps.ea.jedo.cc`, is a human.
pub const DEFAULT_GENS_DEPTH: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_bounds_are_ordered() {
        assert!(MIN_ID_LENGTH <= MAX_ID_LENGTH);
        assert!(MIN_OWNER_ID_LENGTH > 0);
    }

    #[test]
    fn test_root_admin_is_not_a_gens() {
        assert_ne!(DEFAULT_ROOT_ADMIN_CN.split('.').count(), DEFAULT_GENS_DEPTH);
    }

    #[test]
    fn test_gens_depth_fits_network_names() {
        assert_eq!("worb.alps.ea.jedo.cc".split('.').count(), DEFAULT_GENS_DEPTH);
        assert!("hans.worb.alps.ea.jedo.cc".split('.').count() > DEFAULT_GENS_DEPTH);
    }

    #[test]
    fn test_doc_types_are_distinct() {
        assert_ne!(DOC_TYPE_WALLET, DOC_TYPE_TRANSACTION);
        assert_ne!(DOC_TYPE_WALLET, DOC_TYPE_GENS);
        assert_ne!(DOC_TYPE_TRANSACTION, DOC_TYPE_GENS);
    }
}
