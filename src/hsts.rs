//! The HSTS policy store (§4.8): host→policy mapping with expiry and
//! superdomain matching, persisted via a line-oriented file with
//! merge-on-save.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use fs2::FileExt;
use log::warn;

use crate::NetError;

/// `(lowercased host, explicit port; 0 means the scheme's default port)`.
pub type HstsKey = (String, u16);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HstsEntry {
    pub created: i64,
    pub max_age: i64,
    pub include_subdomains: bool,
}

impl HstsEntry {
    #[must_use]
    pub const fn is_live(&self, now: i64) -> bool {
        now < self.created + self.max_age
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchKind {
    Congruent,
    Superdomain,
}

/// An in-memory HSTS store, optionally backed by a file on disk.
#[derive(Default)]
pub struct HstsStore {
    entries: HashMap<HstsKey, HstsEntry>,
    path: Option<PathBuf>,
    loaded_mtime: Option<SystemTime>,
    dirty: bool,
}

fn now_unix() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

impl HstsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads entries from `path`, if it exists and passes the regular-file
    /// and (on POSIX) not-world-writable checks; otherwise the store is
    /// disabled with a warning and operates purely in memory.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut store = Self { path: Some(path.clone()), ..Self::default() };

        let Ok(meta) = fs::metadata(&path) else {
            return store;
        };

        if !meta.is_file() {
            warn!("HSTS store {} is not a regular file; disabling", path.display());
            store.path = None;
            return store;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if meta.permissions().mode() & 0o002 != 0 {
                warn!("HSTS store {} is world-writable; disabling", path.display());
                store.path = None;
                return store;
            }
        }

        if let Ok(file) = File::open(&path) {
            store.loaded_mtime = meta.modified().ok();
            store.merge_from_reader(BufReader::new(file));
        }

        store
    }

    fn merge_from_reader(&mut self, reader: impl BufRead) {
        for line in reader.lines().map_while(Result::ok) {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 5 {
                continue;
            }

            let host = fields[0].to_ascii_lowercase();
            let Ok(port) = fields[1].parse::<u16>() else { continue };
            let include_subdomains = fields[2] == "1";
            let Ok(created) = fields[3].parse::<i64>() else { continue };
            let Ok(max_age) = fields[4].parse::<i64>() else { continue };

            if max_age == 0 {
                continue;
            }

            let key = (host, port);
            let candidate = HstsEntry { created, max_age, include_subdomains };

            self.entries
                .entry(key)
                .and_modify(|existing| {
                    if candidate.created > existing.created {
                        *existing = candidate;
                    }
                })
                .or_insert(candidate);
        }
    }

    /// Looks up the best match for `(host, port)`: an exact key
    /// (`Congruent`), or the nearest superdomain match with
    /// `include_subdomains` set, walking left-to-right while at least two
    /// labels remain.
    #[must_use]
    pub fn find(&self, host: &str, port: u16) -> Option<(MatchKind, HstsEntry)> {
        let host = host.to_ascii_lowercase();

        if let Some(&entry) = self.entries.get(&(host.clone(), port)) {
            return Some((MatchKind::Congruent, entry));
        }

        let labels: Vec<&str> = host.split('.').collect();
        for drop in 1..labels.len().saturating_sub(1) {
            let candidate = labels[drop..].join(".");
            if let Some(&entry) = self.entries.get(&(candidate, port)) {
                if entry.include_subdomains {
                    return Some((MatchKind::Superdomain, entry));
                }
            }
        }

        None
    }

    /// Applies HSTS policy to a plaintext URL's `(scheme_is_https, host,
    /// port)`, upgrading it when a live congruent or (superdomain +
    /// include_subdomains) entry exists. Port 80 is rewritten to 443; any
    /// other explicit port is left alone. Expired matches are removed.
    ///
    /// `port` is the URL's actual numeric port, not the `HstsKey` convention;
    /// it's translated to the stored-key form (0 for the default port 80)
    /// before lookup, matching how `store_entry` keys its entries.
    pub fn hsts_match(&mut self, is_https: bool, host: &str, port: u16) -> Option<u16> {
        if is_https {
            return None;
        }

        let key_port = if port == 80 { 0 } else { port };
        let now = now_unix();
        let (kind, entry) = self.find(host, key_port)?;

        if !entry.is_live(now) {
            self.remove(host, key_port);
            return None;
        }

        match kind {
            MatchKind::Congruent => {
                self.dirty = true;
                Some(if port == 80 { 443 } else { port })
            },
            MatchKind::Superdomain if entry.include_subdomains => {
                self.dirty = true;
                Some(if port == 80 { 443 } else { port })
            },
            MatchKind::Superdomain => None,
        }
    }

    fn remove(&mut self, host: &str, port: u16) {
        self.entries.remove(&(host.to_ascii_lowercase(), port));
        self.dirty = true;
    }

    /// Records a policy from a `Strict-Transport-Security` response
    /// header. Ignored unless the response came in over a secure scheme
    /// and `host` is not an IP literal. `max_age == 0` deletes an exact
    /// match; a new entry is only created for `max_age > 0`.
    pub fn store_entry(
        &mut self,
        is_https: bool,
        host: &str,
        port: u16,
        max_age: i64,
        include_subdomains: bool,
        is_ip_literal: bool,
    ) {
        if !is_https || is_ip_literal {
            return;
        }

        let key = (host.to_ascii_lowercase(), port);
        let now = now_unix();

        if self.entries.contains_key(&key) {
            if max_age == 0 {
                self.entries.remove(&key);
            } else {
                self.entries.insert(
                    key,
                    HstsEntry { created: now, max_age, include_subdomains },
                );
            }
            self.dirty = true;
            return;
        }

        if max_age > 0 {
            self.entries
                .insert(key, HstsEntry { created: now, max_age, include_subdomains });
            self.dirty = true;
        }
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Saves the store to its backing file under an exclusive advisory
    /// lock, re-reading and merging the on-disk content first if its mtime
    /// has advanced since load (tolerating a concurrent writer).
    pub fn save(&mut self) -> Result<(), NetError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        if !self.dirty {
            return Ok(());
        }

        let file = OpenOptions::new().read(true).write(true).create(true).open(&path)?;
        file.lock_exclusive().map_err(NetError::from)?;

        if let Ok(meta) = fs::metadata(&path) {
            let advanced = match (meta.modified().ok(), self.loaded_mtime) {
                (Some(disk), Some(loaded)) => disk > loaded,
                (Some(_), None) => true,
                _ => false,
            };

            if advanced {
                let reader = BufReader::new(File::open(&path)?);
                self.merge_from_reader(reader);
            }
        }

        let mut out = String::from("# HSTS store; host\\tport\\tinclude_subdomains\\tcreated\\tmax_age\n");
        for ((host, port), entry) in &self.entries {
            out.push_str(&format!(
                "{host}\t{port}\t{}\t{}\t{}\n",
                i32::from(entry.include_subdomains),
                entry.created,
                entry.max_age
            ));
        }

        let mut file = file;
        file.set_len(0)?;
        use std::io::Seek;
        file.seek(std::io::SeekFrom::Start(0))?;
        file.write_all(out.as_bytes())?;
        file.flush()?;

        FileExt::unlock(&file).ok();

        self.dirty = false;
        self.loaded_mtime = fs::metadata(&path).ok().and_then(|m| m.modified().ok());
        Ok(())
    }

    #[cfg(test)]
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
