//! Node configuration.
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use chordkv_core::consts::DEFAULT_REPLICATION_FACTOR;
use chordkv_core::consts::DEFAULT_STABILIZE_INTERVAL_MS;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::util::ensure_parent_dir;
use crate::util::expand_home;

lazy_static::lazy_static! {
    static ref DEFAULT_SNAPSHOT_CONFIG: StorageConfig = StorageConfig {
        path: default_storage_location(".chordkv", "data/store.json"),
    };
}

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7401";

pub fn default_storage_location<P>(prefix: P, path: P) -> String
where P: AsRef<std::path::Path> {
    let home_dir = env::var_os("HOME").map(PathBuf::from);
    let expect = match home_dir {
        Some(dir) => dir.join(prefix).join(path),
        None => std::path::Path::new("data").join(prefix).join(path),
    };
    expect.to_str().unwrap().to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Address the HTTP endpoint listens on.
    pub bind_addr: String,
    /// Address peers use to reach this node; defaults to `bind_addr`. The
    /// node id is the hash of this value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_addr: Option<String>,
    /// Peer to join through. A missing bootstrap creates a new ring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<String>,
    pub replication_factor: u8,
    pub stabilize_interval_ms: u64,
    /// When set, the store is mirrored into a JSON snapshot file.
    #[serde(default)]
    pub snapshot: Option<StorageConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    pub path: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            external_addr: None,
            bootstrap: None,
            replication_factor: DEFAULT_REPLICATION_FACTOR,
            stabilize_interval_ms: DEFAULT_STABILIZE_INTERVAL_MS,
            snapshot: Some(DEFAULT_SNAPSHOT_CONFIG.clone()),
        }
    }

    /// Address peers dial; the node identity hashes this.
    pub fn advertised_addr(&self) -> String {
        self.external_addr
            .clone()
            .unwrap_or_else(|| self.bind_addr.clone())
    }

    pub fn write_fs<P>(&self, path: P) -> Result<String>
    where P: AsRef<std::path::Path> {
        let path = expand_home(path)?;
        ensure_parent_dir(&path)?;
        let f =
            fs::File::create(path.as_path()).map_err(|e| Error::CreateFileError(e.to_string()))?;
        let writer = io::BufWriter::new(f);
        serde_yaml::to_writer(writer, self).map_err(|_| Error::EncodeError)?;
        Ok(path.to_string_lossy().to_string())
    }

    pub fn read_fs<P>(path: P) -> Result<Config>
    where P: AsRef<std::path::Path> {
        let path = expand_home(path)?;
        tracing::debug!("read config from: {:?}", path);
        let f = fs::File::open(path).map_err(|e| Error::OpenFileError(e.to_string()))?;
        let reader = io::BufReader::new(f);
        serde_yaml::from_reader(reader).map_err(|_| Error::DecodeError)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
