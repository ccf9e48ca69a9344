//! The Ketra N4 device model: controller, entities, registration and
//! request coalescing.

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};

use crate::error::KetraError;
use crate::protocols::https::HttpsTransport;
use crate::protocols::N4Transport;

pub mod area;
pub mod coalesce;
pub mod keypad;
pub mod output;
pub mod parser;
pub mod registry;
pub mod state;

use area::Area;
use output::Output;
use parser::ParsedDb;
use state::Envelope;

/// Behavior knobs for a controller instance.
#[derive(Clone, Debug, Default)]
pub struct KetraOptions {
    /// Log state writes without sending them; the local cache still updates.
    pub noop_set_state: bool,
    /// Accept the N4's self-signed certificate.
    pub disable_certificate_verification: bool,
    /// Where the snapshot cache file lives. Defaults to the working directory.
    pub cache_dir: Option<PathBuf>,
}

/// Main Ketra controller class.
///
/// Owns the transport, the area and the loads discovered from the last
/// snapshot. Loading a snapshot replaces the whole entity graph at once; a
/// failed load leaves the previous graph untouched.
pub struct Ketra {
    host: String,
    area_name: String,
    options: KetraOptions,
    transport: Arc<dyn N4Transport>,
    db: Option<ParsedDb>,
}

impl Ketra {
    /// Create a controller talking HTTPS to `host`. No connection is made
    /// to the remote device until a snapshot is loaded.
    pub fn new(
        host: &str,
        password: &str,
        area: &str,
        options: KetraOptions,
    ) -> Result<Self, KetraError> {
        let transport = Arc::new(HttpsTransport::new(
            host,
            password,
            options.disable_certificate_verification,
        )?);
        Ok(Self::with_transport(host, area, options, transport))
    }

    /// Create a controller over a caller-supplied transport.
    pub fn with_transport(
        host: &str,
        area: &str,
        options: KetraOptions,
        transport: Arc<dyn N4Transport>,
    ) -> Self {
        Self {
            host: host.to_owned(),
            area_name: area.to_owned(),
            options,
            transport,
            db: None,
        }
    }

    /// Load the configuration snapshot, from the cache file when allowed
    /// and from the device otherwise.
    ///
    /// The new entity graph is swapped in only after the whole snapshot
    /// parsed and registered cleanly.
    pub async fn load_db(&mut self, disable_cache: bool) -> Result<(), KetraError> {
        let cached = if disable_cache {
            None
        } else {
            self.read_cached_config()
        };

        let records = match cached {
            Some(records) => records,
            None => {
                info!("doing request for ketra configuration file");
                let body = self.transport.fetch_groups().await?;
                let records = decode_envelope(&body)?;
                self.write_cached_config(&body);
                records
            }
        };

        let parsed = parser::parse_db(
            &self.area_name,
            &records,
            &self.transport,
            self.options.noop_set_state,
        )?;

        info!(
            "Found Ketra project: {} with {} loads",
            self.area_name,
            parsed.outputs.len()
        );
        self.db = Some(parsed);
        Ok(())
    }

    /// The full list of outputs in the controller.
    pub fn outputs(&self) -> &[Arc<Output>] {
        self.db.as_ref().map_or(&[], |db| db.outputs.as_slice())
    }

    /// The area the loaded outputs belong to.
    pub fn area(&self) -> Option<&Area> {
        self.db.as_ref().map(|db| &db.area)
    }

    /// Look up a load by its display name, as resolved at registration.
    pub fn output_by_name(&self, name: &str) -> Option<&Arc<Output>> {
        let db = self.db.as_ref()?;
        let uid = db.registry.uid_for_name(name)?;
        db.outputs.iter().find(|output| output.uid() == uid)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn cache_path(&self) -> PathBuf {
        let dir = self
            .options
            .cache_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        dir.join(format!("{}_ketraconfig.txt", self.host))
    }

    /// Best effort: a missing or corrupt cache file just means a live
    /// retrieval.
    fn read_cached_config(&self) -> Option<Vec<serde_json::Value>> {
        let path = self.cache_path();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed loading cached config file for ketra: {e}");
                return None;
            }
        };
        match decode_envelope(&raw) {
            Ok(records) => {
                info!("read cached ketra configuration file {}", path.display());
                Some(records)
            }
            Err(e) => {
                warn!("cached config file {} is corrupt: {e}", path.display());
                None
            }
        }
    }

    /// Best effort: losing the cache write is not fatal.
    fn write_cached_config(&self, body: &str) {
        let path = self.cache_path();
        match std::fs::write(&path, body) {
            Ok(()) => info!("wrote file {}", path.display()),
            Err(e) => warn!("could not save {}: {e}", path.display()),
        }
    }
}

fn decode_envelope(raw: &str) -> Result<Vec<serde_json::Value>, KetraError> {
    let de = &mut serde_json::Deserializer::from_str(raw);
    let envelope: Envelope<Vec<serde_json::Value>> = serde_path_to_error::deserialize(de)?;
    Ok(envelope.content)
}
