//! Asset gateway error types.

use clipforge_firestore::FirestoreError;
use clipforge_models::AssetValidationError;
use clipforge_storage::StorageError;
use thiserror::Error;

pub type AssetResult<T> = Result<T, AssetError>;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Invalid asset: {0}")]
    Validation(#[from] AssetValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Firestore error: {0}")]
    Firestore(#[from] FirestoreError),
}
