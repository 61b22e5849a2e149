//! Loader: read local JSON artifacts (store snapshot, report parameters) with
//! a size ceiling, decode them, and check their invariants. No network I/O.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use qd_core::variables::{validate_domains, ReportParams};

use crate::store::{Snapshot, SnapshotStore};
use crate::{IoError, IoResult};

/// Hard ceiling for any single input file.
pub const MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

/// Read a JSON file into a `Value`, refusing files over `MAX_INPUT_BYTES`.
pub fn read_json_value_with_limits(path: &Path) -> IoResult<Value> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let mut buf = Vec::new();
    f.take(MAX_INPUT_BYTES + 1).read_to_end(&mut buf)?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        return Err(IoError::Limit(format!(
            "{} exceeds {} bytes",
            path.display(),
            MAX_INPUT_BYTES
        )));
    }
    let v: Value = serde_json::from_slice(&buf)?;
    Ok(v)
}

/// Decode a snapshot value and build the store (P4 / id checks apply).
pub fn snapshot_from_value(v: Value) -> IoResult<SnapshotStore> {
    let snap: Snapshot = serde_json::from_value(v)?;
    Ok(SnapshotStore::from_snapshot(snap)?)
}

pub fn load_snapshot(path: &Path) -> IoResult<SnapshotStore> {
    let v = read_json_value_with_limits(path)?;
    let store = snapshot_from_value(v)?;
    debug!(path = %path.display(), "snapshot loaded");
    Ok(store)
}

/// Decode and validate report parameters.
pub fn params_from_value(v: Value) -> IoResult<ReportParams> {
    let p: ReportParams = serde_json::from_value(v)?;
    validate_domains(&p)?;
    Ok(p)
}

pub fn load_params(path: &Path) -> IoResult<ReportParams> {
    let v = read_json_value_with_limits(path)?;
    params_from_value(v)
}
