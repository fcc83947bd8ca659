//! Solr submission parameters derived from a resolved store.

use serde::Serialize;
use tracing::{debug, error};

use crate::error::ConfigError;
use crate::schema::{OptionKey, SCHEMA};
use crate::store::ConfigStore;

/// Build the update endpoint as `http://{machine}:{port}/{solrpath}`.
///
/// One leading `/` on the path is dropped so `solrpath = "/solr"` and
/// `solrpath = "solr"` give the same URL.
pub fn solr_url(store: &ConfigStore) -> Result<String, ConfigError> {
    let machine = required(OptionKey::Machine, store.str(OptionKey::Machine))?;
    let port = required(OptionKey::Port, store.int(OptionKey::Port))?;
    let path = required(OptionKey::SolrPath, store.str(OptionKey::SolrPath))?;
    let path = path.strip_prefix('/').unwrap_or(path);
    Ok(format!("http://{machine}:{port}/{path}"))
}

fn required<T>(key: OptionKey, value: Option<T>) -> Result<T, ConfigError> {
    value.ok_or_else(|| {
        let what = match key {
            OptionKey::Machine => "solr machine name",
            OptionKey::Port => "solr port",
            _ => "solr path",
        };
        let err = ConfigError::MissingRequiredValue {
            key: what.to_string(),
            flag: format!("--{}", key.name()),
        };
        error!("{err}");
        err
    })
}

/// What the document sender needs: where to post and how hard to push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionSettings {
    pub url: String,
    /// Documents buffered ahead of the sender threads.
    pub queue_size: usize,
    pub threads: usize,
    /// Post with the binary request writer instead of XML.
    pub javabin: bool,
}

impl SubmissionSettings {
    pub fn from_store(store: &ConfigStore) -> Result<Self, ConfigError> {
        let url = solr_url(store)?;
        debug!(%url, "Set suss url");
        let settings = Self {
            url,
            queue_size: count(store, OptionKey::SussSize)?,
            threads: count(store, OptionKey::SussThreads)?,
            javabin: store.flag(OptionKey::Javabin),
        };
        if settings.javabin {
            debug!("Using javabin");
        }
        Ok(settings)
    }
}

/// A non-negative integer option, or its schema default when unset.
fn count(store: &ConfigStore, key: OptionKey) -> Result<usize, ConfigError> {
    let descriptor = SCHEMA.descriptor(key);
    let value = match store.int(key) {
        Some(n) => n,
        None => descriptor
            .default
            .and_then(|d| d.parse().ok())
            .unwrap_or(1),
    };
    usize::try_from(value).map_err(|_| ConfigError::InvalidValue {
        key: descriptor.name.to_string(),
        value: value.to_string(),
        reason: "must not be negative".into(),
    })
}
