//! Browser adapters for the classroom session directory.
//!
//! Each module implements one port trait from `classroom-core`:
//! - `remote` → `RemoteSessionStore` (fetch or in-process)
//! - `storage` → `StoragePort` (localStorage or memory)
//! - `opener` → `LinkOpener`
//! - `clock` → `Clock`

pub mod clock;
pub mod opener;
pub mod remote;
pub mod storage;
pub mod timeout;
