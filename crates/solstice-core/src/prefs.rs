//! Persisted key-value preferences holding the weather snapshot.
//!
//! The store keeps one postcard-encoded block behind a [`PrefsBackend`],
//! so the same codec runs against flash, a file, or memory. Writes replace
//! the whole block (last write wins); the renderer calls [`PrefsStore::reload`]
//! on every redraw tick, so a snapshot written by the sync receiver shows
//! up at the next tick without any cross-component signalling.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::Debug;

use log::warn;
use thiserror_no_std::Error;

use crate::weather::WeatherPrefs;

/// Byte-block storage underneath the preference store.
pub trait PrefsBackend {
    type Error: Debug;

    /// Reads the whole preference block, or `None` if it was never written.
    fn load(&mut self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Replaces the whole preference block.
    fn save(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Error, Debug)]
pub enum PrefsError<E: Debug> {
    #[error("preference backend error: {0:?}")]
    Backend(E),
    #[error("preference encode failed: {0}")]
    Encode(postcard::Error),
}

/// Typed view over the persisted preference block.
pub struct PrefsStore<B: PrefsBackend> {
    backend: B,
    cached: WeatherPrefs,
}

impl<B: PrefsBackend> PrefsStore<B> {
    /// Opens the store and reads the current block.
    pub fn open(backend: B) -> Result<Self, PrefsError<B::Error>> {
        let mut store = Self {
            backend,
            cached: WeatherPrefs::default(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-reads the backend block.
    ///
    /// A missing block yields the empty snapshot. A block that no longer
    /// decodes is discarded with a warning rather than surfaced as an
    /// error; the face then renders placeholders until the next sync.
    pub fn reload(&mut self) -> Result<&WeatherPrefs, PrefsError<B::Error>> {
        self.cached = match self.backend.load().map_err(PrefsError::Backend)? {
            Some(bytes) => match postcard::from_bytes(&bytes) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("discarding unreadable preference block: {}", e);
                    WeatherPrefs::default()
                }
            },
            None => WeatherPrefs::default(),
        };
        Ok(&self.cached)
    }

    /// The snapshot as of the last reload or write.
    pub fn snapshot(&self) -> WeatherPrefs {
        self.cached
    }

    /// Overwrites the persisted snapshot synchronously. Last write wins.
    pub fn write(&mut self, prefs: WeatherPrefs) -> Result<(), PrefsError<B::Error>> {
        let bytes = postcard::to_allocvec(&prefs).map_err(PrefsError::Encode)?;
        self.backend.save(&bytes).map_err(PrefsError::Backend)?;
        self.cached = prefs;
        Ok(())
    }
}

/// In-memory backend.
///
/// Clones share the same block, so a receiver-side store and a
/// renderer-side store behave like two handles on one preference file.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    block: Rc<RefCell<Option<Vec<u8>>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefsBackend for MemoryBackend {
    type Error = core::convert::Infallible;

    fn load(&mut self) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.block.borrow().clone())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        *self.block.borrow_mut() = Some(bytes.to_vec());
        Ok(())
    }
}
