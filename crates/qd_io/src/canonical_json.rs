//! Canonical JSON utilities (qd_io)
//! - Objects: keys sorted lexicographically (UTF-8 codepoint order)
//! - Arrays: order preserved (caller is responsible for stable ordering)
//! - Output: compact (no extra spaces, no trailing newline)
//! - Atomic write: temp file in same dir + fsync(temp) + rename; fsync(dir) on Unix
//! - Fallback: if rename fails (e.g., cross-device), write directly to target,
//!   fsync(target), then remove temp.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Convert a serde_json `Value` to canonical JSON bytes.
pub fn to_canonical_json_bytes(v: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(1024);
    write_canonical_value(v, &mut out);
    out
}

/// Write canonical JSON to `path` atomically (with cross-device fallback).
pub fn write_canonical_file(path: &Path, v: &Value) -> io::Result<()> {
    write_bytes_atomic(path, &to_canonical_json_bytes(v))
}

/// Atomic replace of `path` with `bytes`.
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let tmp = make_unique_tmp_path(path);
    let mut tf = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)?;
    tf.write_all(bytes)?;
    tf.sync_all()?;
    drop(tf);

    match fs::rename(&tmp, path) {
        Ok(()) => {
            let _ = fsync_dir(&parent);
            Ok(())
        }
        Err(_) => {
            let res: io::Result<()> = (|| {
                let mut f = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)?;
                f.write_all(bytes)?;
                f.sync_all()?;
                Ok(())
            })();
            let _ = fs::remove_file(&tmp);
            res?;
            let _ = fsync_dir(&parent);
            Ok(())
        }
    }
}

fn write_canonical_value(v: &Value, out: &mut Vec<u8>) {
    match v {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_json_string(s, out),
        Value::Array(arr) => {
            out.push(b'[');
            for (i, elem) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical_value(elem, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            out.push(b'{');
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (i, (k, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_json_string(k, out);
                out.push(b':');
                write_canonical_value(val, out);
            }
            out.push(b'}');
        }
    }
}

fn write_json_string(s: &str, out: &mut Vec<u8>) {
    // Display of a `Value::String` is its escaped JSON literal.
    let quoted = Value::String(s.to_string()).to_string();
    out.extend_from_slice(quoted.as_bytes());
}

/// "<filename>.<pid>.<counter>.tmp" next to `target`.
fn make_unique_tmp_path(target: &Path) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let fname = target
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let tmp_name = format!("{fname}.{pid}.{n}.tmp");
    match target.parent() {
        Some(dir) => dir.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    let df = OpenOptions::new().read(true).open(dir)?;
    df.sync_all()
}

#[cfg(not(unix))]
#[inline]
fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_are_sorted_arrays_preserved() {
        let v = json!({
            "b": 1,
            "a": { "y": 1, "x": 2 },
            "arr": [ {"k":2,"j":1}, 3, "z" ]
        });
        let s = String::from_utf8(to_canonical_json_bytes(&v)).unwrap();
        assert_eq!(s, r#"{"a":{"x":2,"y":1},"arr":[{"j":1,"k":2},3,"z"],"b":1}"#);
    }

    #[test]
    fn strings_are_escaped() {
        let v = json!({"q": "say \"hi\"\n"});
        let s = String::from_utf8(to_canonical_json_bytes(&v)).unwrap();
        assert_eq!(s, r#"{"q":"say \"hi\"\n"}"#);
    }

    #[test]
    fn atomic_write_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("out").join("report.json");
        write_canonical_file(&p, &json!({"v": 1})).unwrap();
        write_canonical_file(&p, &json!({"v": 2})).unwrap();
        assert_eq!(std::fs::read_to_string(&p).unwrap(), r#"{"v":2}"#);
        let leftovers = std::fs::read_dir(p.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
