//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use crate::{Error, store::DomainStore, timezone::get_local_offset};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The store shared by every request.
    pub store: Arc<DomainStore>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] around a store.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if `local_timezone` is not a known timezone.
    pub fn new(store: Arc<DomainStore>, local_timezone: &str) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezone(local_timezone.to_owned()));
        }

        Ok(Self {
            store,
            local_timezone: local_timezone.to_owned(),
        })
    }
}
