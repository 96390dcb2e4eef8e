pub mod http;
pub mod memory;

pub use http::HttpSessionStore;
pub use memory::MemorySessionStore;

use std::rc::Rc;
use classroom_core::ports::{Clock, RemoteSessionStore};
use classroom_types::config::{DirectoryConfig, RemoteBackendType};

/// Build the remote store named in `config`.
pub fn open_remote(config: &DirectoryConfig, clock: Rc<dyn Clock>) -> Rc<dyn RemoteSessionStore> {
    match config.remote {
        RemoteBackendType::Http => {
            log::info!("Remote backend: http ({})", config.api_base);
            Rc::new(HttpSessionStore::new(config))
        }
        RemoteBackendType::Memory => {
            log::info!("Remote backend: memory");
            Rc::new(MemorySessionStore::new(clock))
        }
    }
}
