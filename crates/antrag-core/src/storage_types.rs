use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// This enum defines the available storage backend types.
/// It's defined in core because it's used in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// Access level applied to stored blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobAccess {
    Public,
    Private,
}

impl FromStr for BlobAccess {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(BlobAccess::Public),
            "private" => Ok(BlobAccess::Private),
            _ => Err(anyhow::anyhow!("Invalid blob access level: {}", s)),
        }
    }
}

impl Display for BlobAccess {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BlobAccess::Public => write!(f, "public"),
            BlobAccess::Private => write!(f, "private"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_round_trip() {
        assert_eq!("s3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(
            "LOCAL".parse::<StorageBackend>().unwrap(),
            StorageBackend::Local
        );
        assert_eq!(StorageBackend::S3.to_string(), "s3");
        assert!("gcs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_blob_access_round_trip() {
        assert_eq!("public".parse::<BlobAccess>().unwrap(), BlobAccess::Public);
        assert_eq!(
            "Private".parse::<BlobAccess>().unwrap(),
            BlobAccess::Private
        );
        assert_eq!(BlobAccess::Private.to_string(), "private");
        assert!("internal".parse::<BlobAccess>().is_err());
    }
}
