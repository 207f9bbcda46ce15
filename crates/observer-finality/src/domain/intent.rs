//! What the caller hands the finalizer: a builder still to be signed, or a
//! transaction whose signatures were already collected.

use shared_types::{SignedTransaction, TransactionBuilder, WireTransaction};

/// Exactly one of builder or signed transaction, by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionIntent {
    /// Unsigned; the finalizer signs it with the local keys it requires.
    Builder(TransactionBuilder),
    /// Already signed (e.g. after collecting counterparty signatures); used as-is.
    Signed(SignedTransaction),
}

impl TransactionIntent {
    pub fn is_signed(&self) -> bool {
        matches!(self, TransactionIntent::Signed(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TransactionIntent::Builder(_) => "builder",
            TransactionIntent::Signed(_) => "signed",
        }
    }

    /// Wire form of the underlying transaction.
    pub fn wire_transaction(&self) -> WireTransaction {
        match self {
            TransactionIntent::Builder(builder) => builder.to_wire_transaction(),
            TransactionIntent::Signed(stx) => stx.tx.clone(),
        }
    }
}

impl From<TransactionBuilder> for TransactionIntent {
    fn from(builder: TransactionBuilder) -> Self {
        TransactionIntent::Builder(builder)
    }
}

impl From<SignedTransaction> for TransactionIntent {
    fn from(stx: SignedTransaction) -> Self {
        TransactionIntent::Signed(stx)
    }
}
