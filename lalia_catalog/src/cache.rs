// Content-addressed disk cache for pipeline stages.
//
// A stage result is stored as `<dir>/<stage>-<digest>.json`, where the
// digest is an xxh3-128 hash of the stage name and the JSON serialization of
// the stage key. The key holds every input that changes the result (the
// language definition and the relevant config fields), so changing an
// input changes the file name and a stale file is simply never looked at.
//
// Writes go to a temporary sibling first and are renamed into place, so an
// interrupted build never leaves a truncated cache file behind.
//
// `serde_json` is built with `float_roundtrip`, so duration ranges read
// back from the cache are bit-identical to freshly computed ones.

use crate::error::{CatalogError, CatalogResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x6c61_6c69_615f_6361;

/// Stable digest of a stage name and its key.
pub fn stage_digest(stage: &str, key: &impl Serialize) -> CatalogResult<u128> {
    let bytes = serde_json::to_vec(key).map_err(|e| CatalogError::json(stage, e))?;
    let mut hasher = Xxh3::with_seed(XXH3_SEED);
    hasher.update(stage.as_bytes());
    hasher.update(&[0]);
    hasher.update(&bytes);
    Ok(hasher.digest128())
}

/// File holding the result of `stage` for `key` under `dir`.
pub fn stage_path(dir: &Path, stage: &str, key: &impl Serialize) -> CatalogResult<PathBuf> {
    let digest = stage_digest(stage, key)?;
    Ok(dir.join(format!("{stage}-{digest:032x}.json")))
}

/// Return the cached result of `stage` for `key`, or compute and store it.
///
/// With `force` the cached file is ignored and overwritten.
pub fn cached<T, K, F>(dir: &Path, stage: &str, key: &K, force: bool, compute: F) -> CatalogResult<T>
where
    T: Serialize + DeserializeOwned,
    K: Serialize,
    F: FnOnce() -> CatalogResult<T>,
{
    let path = stage_path(dir, stage, key)?;
    if !force && path.is_file() {
        info!(stage, path = %path.display(), "loading cached stage");
        let text = fs::read_to_string(&path).map_err(|e| CatalogError::io(&path, e))?;
        return serde_json::from_str(&text).map_err(|e| CatalogError::json(&path, e));
    }

    info!(stage, force, "computing stage");
    let value = compute()?;
    store(&path, &value)?;
    debug!(stage, path = %path.display(), "stored stage");
    Ok(value)
}

fn store(path: &Path, value: &impl Serialize) -> CatalogResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
    }
    let text = serde_json::to_string(value).map_err(|e| CatalogError::json(path, e))?;
    let temporary = path.with_extension("json.tmp");
    fs::write(&temporary, text).map_err(|e| CatalogError::io(&temporary, e))?;
    fs::rename(&temporary, path).map_err(|e| CatalogError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_digest_depends_on_stage_and_key() {
        let a = stage_digest("pages", &(1, 2)).unwrap();
        assert_eq!(a, stage_digest("pages", &(1, 2)).unwrap());
        assert_ne!(a, stage_digest("pages", &(1, 3)).unwrap());
        assert_ne!(a, stage_digest("combinations", &(1, 2)).unwrap());
    }

    #[test]
    fn test_second_call_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Cell::new(0);
        let compute = || -> CatalogResult<Vec<f64>> {
            calls.set(calls.get() + 1);
            Ok(vec![1.5, 2.25])
        };
        let first: Vec<f64> = cached(dir.path(), "numbers", &"key", false, compute).unwrap();
        let second: Vec<f64> = cached(dir.path(), "numbers", &"key", false, compute).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);

        let path = stage_path(dir.path(), "numbers", &"key").unwrap();
        assert!(path.is_file());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_force_recomputes() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Cell::new(0);
        let compute = || -> CatalogResult<usize> {
            calls.set(calls.get() + 1);
            Ok(calls.get())
        };
        let _: usize = cached(dir.path(), "count", &(), false, compute).unwrap();
        let forced: usize = cached(dir.path(), "count", &(), true, compute).unwrap();
        assert_eq!(forced, 2);
        let reread: usize = cached(dir.path(), "count", &(), false, compute).unwrap();
        assert_eq!(reread, 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_changed_key_misses_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Cell::new(0);
        let compute = || -> CatalogResult<u8> {
            calls.set(calls.get() + 1);
            Ok(0)
        };
        let _: u8 = cached(dir.path(), "stage", &1, false, compute).unwrap();
        let _: u8 = cached(dir.path(), "stage", &2, false, compute).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_compute_errors_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let result: CatalogResult<u8> = cached(dir.path(), "broken", &(), false, || {
            Err(CatalogError::inconsistency("nope"))
        });
        assert!(result.is_err());
        assert!(!stage_path(dir.path(), "broken", &()).unwrap().exists());
    }
}
