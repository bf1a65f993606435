//! Visitor tracking and IP bans.
//!
//! Records are keyed by IP. Stored data may still contain several records for
//! one IP (older data was appended rather than replaced), so every read goes
//! through [`VisitorRegistry::unique_visitors`], which keeps the last stored
//! record per IP and orders the result newest first. The deduplicated view is
//! recomputed on each call and never stored.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence::{StateStore, keys, load_collection, save_collection};

/// A revisit inside this window leaves the existing record untouched.
pub const REFRESH_WINDOW_MILLIS: i64 = 60 * 60 * 1000;

/// What is known about one visitor IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorInfo {
    pub ip: String,
    /// Epoch milliseconds of the last recorded visit.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default)]
    pub banned: bool,
}

/// Best-effort lookup results attached to a visit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorMetadata {
    pub region: Option<String>,
    pub city: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
}

/// Visitor records, mirrored to a [`StateStore`] under `visitors`.
pub struct VisitorRegistry {
    store: Arc<dyn StateStore>,
    visitors: Vec<VisitorInfo>,
}

impl VisitorRegistry {
    /// Load stored visitors; starts empty when nothing is stored.
    #[must_use]
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let visitors = load_collection(store.as_ref(), keys::VISITORS).unwrap_or_default();
        Self { store, visitors }
    }

    /// One record per IP (the last stored one), newest first.
    #[must_use]
    pub fn unique_visitors(&self) -> Vec<VisitorInfo> {
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut unique: Vec<&VisitorInfo> = Vec::new();

        for visitor in &self.visitors {
            if let Some(&idx) = position.get(visitor.ip.as_str()) {
                if let Some(slot) = unique.get_mut(idx) {
                    *slot = visitor;
                }
            } else {
                position.insert(visitor.ip.as_str(), unique.len());
                unique.push(visitor);
            }
        }

        unique.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        unique.into_iter().cloned().collect()
    }

    /// Number of distinct IPs.
    #[must_use]
    pub fn visitor_count(&self) -> usize {
        self.unique_visitors().len()
    }

    /// The deduplicated record for `ip`, if any.
    #[must_use]
    pub fn find(&self, ip: &str) -> Option<&VisitorInfo> {
        self.visitors.iter().rev().find(|v| v.ip == ip)
    }

    /// Whether a visit from `ip` at `now_millis` should be recorded.
    ///
    /// False while the existing record is younger than
    /// [`REFRESH_WINDOW_MILLIS`].
    #[must_use]
    pub fn needs_refresh(&self, ip: &str, now_millis: i64) -> bool {
        self.find(ip)
            .is_none_or(|v| now_millis.saturating_sub(v.timestamp) >= REFRESH_WINDOW_MILLIS)
    }

    /// Replace any record for `ip` with a fresh one.
    ///
    /// The ban flag of the previous record is carried over.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the visitors cannot be saved.
    pub fn record_visit(
        &mut self,
        ip: &str,
        now_millis: i64,
        metadata: VisitorMetadata,
    ) -> Result<VisitorInfo> {
        let banned = self.find(ip).is_some_and(|v| v.banned);
        let visitor = VisitorInfo {
            ip: ip.to_owned(),
            timestamp: now_millis,
            region: metadata.region,
            city: metadata.city,
            device: metadata.device,
            browser: metadata.browser,
            os: metadata.os,
            banned,
        };

        let mut next: Vec<VisitorInfo> =
            self.visitors.iter().filter(|v| v.ip != ip).cloned().collect();
        next.push(visitor.clone());
        self.commit(next)?;

        tracing::debug!(ip, banned, "Visit recorded");
        Ok(visitor)
    }

    /// Ban `ip`. Returns `false` if no record exists for it.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the visitors cannot be saved.
    pub fn ban(&mut self, ip: &str) -> Result<bool> {
        let changed = self.set_banned(ip, true)?;
        if changed {
            tracing::info!(ip, "Visitor banned");
        }
        Ok(changed)
    }

    /// Lift a ban on `ip`. Returns `false` if no record exists for it.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the visitors cannot be saved.
    pub fn unban(&mut self, ip: &str) -> Result<bool> {
        let changed = self.set_banned(ip, false)?;
        if changed {
            tracing::info!(ip, "Visitor unbanned");
        }
        Ok(changed)
    }

    /// Whether the deduplicated record for `ip` is banned.
    #[must_use]
    pub fn is_ip_banned(&self, ip: &str) -> bool {
        self.find(ip).is_some_and(|v| v.banned)
    }

    /// Remove every record for `ip`. Returns `false` if there were none.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the visitors cannot be saved.
    pub fn delete(&mut self, ip: &str) -> Result<bool> {
        if self.find(ip).is_none() {
            return Ok(false);
        }
        let next = self.visitors.iter().filter(|v| v.ip != ip).cloned().collect();
        self.commit(next)?;
        tracing::info!(ip, "Visitor deleted");
        Ok(true)
    }

    /// Remove all records.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the visitors cannot be saved.
    pub fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())?;
        tracing::info!("All visitors cleared");
        Ok(())
    }

    fn set_banned(&mut self, ip: &str, banned: bool) -> Result<bool> {
        if self.find(ip).is_none() {
            return Ok(false);
        }
        let next = self
            .visitors
            .iter()
            .map(|v| {
                if v.ip == ip {
                    VisitorInfo {
                        banned,
                        ..v.clone()
                    }
                } else {
                    v.clone()
                }
            })
            .collect();
        self.commit(next)?;
        Ok(true)
    }

    fn commit(&mut self, next: Vec<VisitorInfo>) -> Result<()> {
        save_collection(self.store.as_ref(), keys::VISITORS, &next)?;
        self.visitors = next;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::persistence::MemoryStore;

    const T0: i64 = 1_700_000_000_000;

    fn registry() -> VisitorRegistry {
        VisitorRegistry::load(Arc::new(MemoryStore::new()))
    }

    fn meta(city: &str) -> VisitorMetadata {
        VisitorMetadata {
            city: Some(city.to_owned()),
            ..VisitorMetadata::default()
        }
    }

    /// Mirrors the storefront's visit flow without the network lookup.
    fn visit(reg: &mut VisitorRegistry, ip: &str, now: i64, city: &str) {
        if reg.needs_refresh(ip, now) {
            reg.record_visit(ip, now, meta(city)).unwrap();
        }
    }

    #[test]
    fn test_revisits_within_window_are_noops() {
        let mut reg = registry();
        visit(&mut reg, "1.1.1.1", T0, "Ankara");
        visit(&mut reg, "1.1.1.1", T0 + 1_000, "Izmir");
        visit(&mut reg, "1.1.1.1", T0 + REFRESH_WINDOW_MILLIS - 1, "Bursa");

        let visitors = reg.unique_visitors();
        assert_eq!(visitors.len(), 1);
        assert_eq!(visitors[0].timestamp, T0);
        assert_eq!(visitors[0].city.as_deref(), Some("Ankara"));
    }

    #[test]
    fn test_revisit_after_window_refreshes() {
        let mut reg = registry();
        visit(&mut reg, "1.1.1.1", T0, "Ankara");
        visit(&mut reg, "1.1.1.1", T0 + REFRESH_WINDOW_MILLIS, "Izmir");

        let visitor = reg.find("1.1.1.1").unwrap();
        assert_eq!(visitor.timestamp, T0 + REFRESH_WINDOW_MILLIS);
        assert_eq!(visitor.city.as_deref(), Some("Izmir"));
        assert_eq!(reg.visitor_count(), 1);
    }

    #[test]
    fn test_ban_survives_revisit() {
        let mut reg = registry();
        visit(&mut reg, "2.2.2.2", T0, "Ankara");
        assert!(reg.ban("2.2.2.2").unwrap());
        visit(&mut reg, "2.2.2.2", T0 + 2 * REFRESH_WINDOW_MILLIS, "Izmir");

        assert!(reg.is_ip_banned("2.2.2.2"));
        assert_eq!(
            reg.find("2.2.2.2").unwrap().timestamp,
            T0 + 2 * REFRESH_WINDOW_MILLIS
        );
    }

    #[test]
    fn test_ban_unban_absent_ip_is_noop() {
        let mut reg = registry();
        assert!(!reg.ban("9.9.9.9").unwrap());
        assert!(!reg.unban("9.9.9.9").unwrap());
        assert!(!reg.is_ip_banned("9.9.9.9"));
        assert_eq!(reg.visitor_count(), 0);
    }

    #[test]
    fn test_unban() {
        let mut reg = registry();
        visit(&mut reg, "3.3.3.3", T0, "Ankara");
        reg.ban("3.3.3.3").unwrap();
        assert!(reg.unban("3.3.3.3").unwrap());
        assert!(!reg.is_ip_banned("3.3.3.3"));
    }

    #[test]
    fn test_unique_visitors_sorted_without_duplicates() {
        let mut reg = registry();
        let order = [
            ("a", T0 + 5),
            ("b", T0 + 1),
            ("c", T0 + 9),
            ("d", T0 + 3),
            ("e", T0 + 7),
        ];
        for (ip, ts) in order {
            visit(&mut reg, ip, ts, "X");
        }

        let visitors = reg.unique_visitors();
        let ips: Vec<_> = visitors.iter().map(|v| v.ip.as_str()).collect();
        assert_eq!(ips, vec!["c", "e", "a", "d", "b"]);
        assert!(
            visitors
                .windows(2)
                .all(|w| w[0].timestamp >= w[1].timestamp)
        );
    }

    #[test]
    fn test_dedups_legacy_duplicate_records() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(
                keys::VISITORS,
                r#"[
                    {"ip":"1.1.1.1","timestamp":100,"banned":false},
                    {"ip":"2.2.2.2","timestamp":300,"banned":false},
                    {"ip":"1.1.1.1","timestamp":50,"banned":true},
                    {"ip":"3.3.3.3","timestamp":200}
                ]"#,
            )
            .unwrap();
        let reg = VisitorRegistry::load(store);

        let visitors = reg.unique_visitors();
        let ips: HashSet<_> = visitors.iter().map(|v| v.ip.clone()).collect();
        assert_eq!(ips.len(), visitors.len());
        assert_eq!(visitors.len(), 3);
        // Last stored record for 1.1.1.1 wins, even though it is older.
        assert!(reg.is_ip_banned("1.1.1.1"));
        assert_eq!(reg.find("1.1.1.1").unwrap().timestamp, 50);
        assert_eq!(visitors.last().unwrap().ip, "1.1.1.1");
    }

    #[test]
    fn test_record_visit_collapses_duplicates() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(
                keys::VISITORS,
                r#"[{"ip":"1.1.1.1","timestamp":1,"banned":true},{"ip":"1.1.1.1","timestamp":2,"banned":true}]"#,
            )
            .unwrap();
        let mut reg = VisitorRegistry::load(Arc::clone(&store) as Arc<dyn StateStore>);
        reg.record_visit("1.1.1.1", T0, VisitorMetadata::default())
            .unwrap();

        let raw: Vec<VisitorInfo> = load_collection(store.as_ref(), keys::VISITORS).unwrap();
        assert_eq!(raw.len(), 1);
        assert!(raw[0].banned);
    }

    #[test]
    fn test_delete_and_clear() {
        let mut reg = registry();
        visit(&mut reg, "1.1.1.1", T0, "A");
        visit(&mut reg, "2.2.2.2", T0, "B");

        assert!(reg.delete("1.1.1.1").unwrap());
        assert!(!reg.delete("1.1.1.1").unwrap());
        assert_eq!(reg.visitor_count(), 1);

        reg.clear().unwrap();
        assert_eq!(reg.visitor_count(), 0);
    }

    #[test]
    fn test_extreme_stored_timestamps_do_not_overflow() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(
                keys::VISITORS,
                r#"[{"ip":"1.1.1.1","timestamp":-9223372036854775808},{"ip":"2.2.2.2","timestamp":9223372036854775807}]"#,
            )
            .unwrap();
        let reg = VisitorRegistry::load(store);

        assert!(reg.needs_refresh("1.1.1.1", T0));
        assert!(!reg.needs_refresh("2.2.2.2", T0));
    }

    #[test]
    fn test_visitors_are_persisted() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let mut reg = VisitorRegistry::load(Arc::clone(&store));
        visit(&mut reg, "8.8.8.8", T0, "Mountain View");
        reg.ban("8.8.8.8").unwrap();

        let reloaded = VisitorRegistry::load(store);
        assert!(reloaded.is_ip_banned("8.8.8.8"));
        assert_eq!(reloaded.visitor_count(), 1);
    }
}
