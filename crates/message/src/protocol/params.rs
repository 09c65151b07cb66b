//! Parameter bags carried by a server request.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query, body and cookie parameters. Values may nest (`a[b]=1` parses to an object).
pub type Params = serde_json::Map<String, Value>;

/// Out-of-band values derived while handling a request, e.g. routing results.
pub type Attributes = BTreeMap<String, Value>;

/// Server and environment metadata, keyed by canonical upper-case names.
pub type ServerParams = BTreeMap<String, String>;

/// Uploaded file metadata keyed by form field name.
pub type FileParams = BTreeMap<String, UploadedFile>;

/// Metadata describing one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Filename as sent by the client.
    pub client_filename: Option<String>,
    /// Media type as sent by the client.
    pub client_media_type: Option<String>,
    /// Where the host stored the upload.
    pub tmp_path: PathBuf,
    pub error: UploadError,
    pub size: u64,
}

impl UploadedFile {
    /// Returns true when the upload arrived intact.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.error == UploadError::Ok
    }
}

/// Outcome of an upload, using the conventional numeric codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum UploadError {
    Ok = 0,
    IniSize = 1,
    FormSize = 2,
    Partial = 3,
    NoFile = 4,
    NoTmpDir = 6,
    CantWrite = 7,
    Extension = 8,
}

impl TryFrom<u8> for UploadError {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Ok),
            1 => Ok(Self::IniSize),
            2 => Ok(Self::FormSize),
            3 => Ok(Self::Partial),
            4 => Ok(Self::NoFile),
            6 => Ok(Self::NoTmpDir),
            7 => Ok(Self::CantWrite),
            8 => Ok(Self::Extension),
            _ => Err(format!("unknown upload error code {code}")),
        }
    }
}

impl From<UploadError> for u8 {
    fn from(error: UploadError) -> Self {
        error as u8
    }
}
