//! Document header: the metadata envelope embedded as the first line of
//! every stored document, and its wire codec.

mod codec;
mod errors;
mod models;

pub use codec::{header_line, load, migrate, pack, pack_bytes};
pub use errors::{HeaderError, HeaderResult};
pub use models::{DocumentHeader, EncryptionParams, HeaderFields, HEADER_KEY, MAX_HINT_LEN};
