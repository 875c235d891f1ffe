//! # Discovery Views
//!
//! Read-only, time-windowed projections over the ticker store:
//! - fresh:    first seen recently, newest first, capped
//! - momentum: mentioned recently, most recent first
//! - revived:  old ticker that is being mentioned again
//! - generic:  recently active, caller-chosen sort, paginated
//!
//! Symbols on the exclusion list (established large caps) never show up.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;

use crate::config::DiscoveryConfig;
use crate::error::{StoreError, ViewError};
use crate::store::TickerStore;
use crate::ticker::{normalize_symbol, TickerRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Score,
    Symbol,
    Recency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "score" | "mindshare" => Ok(Self::Score),
            "symbol" | "ticker" => Ok(Self::Symbol),
            "recency" | "recent" | "last_mentioned_at" => Ok(Self::Recency),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// 1-based page request for the generic view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

pub struct DiscoveryViews<'a, S: TickerStore> {
    store: &'a S,
    cfg: &'a DiscoveryConfig,
    excluded: HashSet<String>,
}

impl<'a, S: TickerStore> DiscoveryViews<'a, S> {
    pub fn new(store: &'a S, cfg: &'a DiscoveryConfig) -> Self {
        let excluded = cfg
            .excluded_symbols
            .iter()
            .map(|s| normalize_symbol(s))
            .collect();
        Self {
            store,
            cfg,
            excluded,
        }
    }

    /// Point lookup, bypassing the exclusion list.
    pub fn lookup(&self, symbol: &str) -> Result<Option<TickerRecord>, StoreError> {
        self.store.get(symbol)
    }

    fn candidates(&self) -> Result<Vec<TickerRecord>, StoreError> {
        let mut rows = self.store.all()?;
        rows.retain(|r| !self.excluded.contains(&normalize_symbol(&r.ticker_symbol)));
        Ok(rows)
    }

    pub fn fresh(&self, now: DateTime<Utc>) -> Result<Vec<TickerRecord>, ViewError> {
        let cutoff = before(now, self.cfg.fresh_window()?)?;
        let mut rows = self.candidates()?;
        rows.retain(|r| r.first_mentioned_at >= cutoff);
        rows.sort_by(|a, b| {
            b.first_mentioned_at
                .cmp(&a.first_mentioned_at)
                .then_with(|| a.ticker_symbol.cmp(&b.ticker_symbol))
        });
        rows.truncate(self.cfg.fresh_limit);
        Ok(rows)
    }

    pub fn momentum(&self, now: DateTime<Utc>) -> Result<Vec<TickerRecord>, ViewError> {
        let cutoff = before(now, self.cfg.momentum_window()?)?;
        let mut rows = self.candidates()?;
        rows.retain(|r| r.last_mentioned_at >= cutoff);
        rows.sort_by(by_recency_desc);
        Ok(rows)
    }

    pub fn revived(&self, now: DateTime<Utc>) -> Result<Vec<TickerRecord>, ViewError> {
        let old_cutoff = before(now, self.cfg.revived_min_age()?)?;
        let recent_cutoff = before(now, self.cfg.revived_recent()?)?;
        let mut rows = self.candidates()?;
        rows.retain(|r| r.first_mentioned_at < old_cutoff && r.last_mentioned_at >= recent_cutoff);
        rows.sort_by(by_recency_desc);
        Ok(rows)
    }

    pub fn generic(
        &self,
        now: DateTime<Utc>,
        req: PageRequest,
    ) -> Result<Page<TickerRecord>, ViewError> {
        let cutoff = before(now, self.cfg.generic_window()?)?;
        let mut rows = self.candidates()?;
        rows.retain(|r| r.last_mentioned_at >= cutoff);
        rows.sort_by(|a, b| compare(a, b, req.sort, req.direction));
        Ok(paginate(rows, req.page, req.page_size))
    }

    /// First page of the generic view with the configured page size.
    pub fn generic_default(
        &self,
        now: DateTime<Utc>,
        sort: SortKey,
        direction: SortDirection,
    ) -> Result<Page<TickerRecord>, ViewError> {
        self.generic(
            now,
            PageRequest {
                page: 1,
                page_size: self.cfg.default_page_size,
                sort,
                direction,
            },
        )
    }
}

fn before(now: DateTime<Utc>, window: Duration) -> Result<DateTime<Utc>, ViewError> {
    now.checked_sub_signed(window).ok_or(ViewError::Cutoff {
        now,
        hours: window.num_hours(),
    })
}

fn by_recency_desc(a: &TickerRecord, b: &TickerRecord) -> Ordering {
    b.last_mentioned_at
        .cmp(&a.last_mentioned_at)
        .then_with(|| a.ticker_symbol.cmp(&b.ticker_symbol))
}

fn compare(a: &TickerRecord, b: &TickerRecord, key: SortKey, dir: SortDirection) -> Ordering {
    let primary = match key {
        SortKey::Score => a.mindshare_score.total_cmp(&b.mindshare_score),
        SortKey::Symbol => a.ticker_symbol.cmp(&b.ticker_symbol),
        SortKey::Recency => a.last_mentioned_at.cmp(&b.last_mentioned_at),
    };
    let primary = match dir {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    // Stable tiebreak regardless of direction.
    primary.then_with(|| a.ticker_symbol.cmp(&b.ticker_symbol))
}

fn paginate<T>(rows: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = rows.len();
    let items = rows
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();
    Page {
        items,
        page,
        page_size,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTickerStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 10, 12, 0, 0).unwrap()
    }

    fn row(symbol: &str, score: f64, first_h_ago: i64, last_h_ago: i64) -> TickerRecord {
        TickerRecord {
            ticker_symbol: symbol.into(),
            category: "quiet".into(),
            mindshare_score: score,
            first_mentioned_at: now() - Duration::hours(first_h_ago),
            last_mentioned_at: now() - Duration::hours(last_h_ago),
            mention_details: serde_json::json!({}),
        }
    }

    fn store() -> InMemoryTickerStore {
        let s = InMemoryTickerStore::new();
        s.put(row("$NEW", 100.0, 1, 1));
        s.put(row("$NEWER", 50.0, 0, 0));
        s.put(row("$DAY", 300.0, 20, 10));
        s.put(row("$OLDBACK", 700.0, 24 * 30, 2));
        s.put(row("$STALE", 900.0, 24 * 30, 24 * 5));
        s.put(row("$BTC", 1000.0, 2, 1));
        s
    }

    fn cfg() -> DiscoveryConfig {
        DiscoveryConfig {
            excluded_symbols: vec!["btc".into()],
            ..Default::default()
        }
    }

    fn symbols(rows: &[TickerRecord]) -> Vec<&str> {
        rows.iter().map(|r| r.ticker_symbol.as_str()).collect()
    }

    #[test]
    fn fresh_is_newest_first_and_capped() {
        let s = store();
        let mut c = cfg();
        {
            let v = DiscoveryViews::new(&s, &c);
            assert_eq!(symbols(&v.fresh(now()).unwrap()), vec!["$NEWER", "$NEW"]);
        }

        c.fresh_limit = 1;
        let v = DiscoveryViews::new(&s, &c);
        assert_eq!(symbols(&v.fresh(now()).unwrap()), vec!["$NEWER"]);
    }

    #[test]
    fn momentum_window_24h() {
        let s = store();
        let c = cfg();
        let v = DiscoveryViews::new(&s, &c);
        assert_eq!(
            symbols(&v.momentum(now()).unwrap()),
            vec!["$NEWER", "$NEW", "$OLDBACK", "$DAY"]
        );
    }

    #[test]
    fn revived_needs_old_first_and_recent_last() {
        let s = store();
        let c = cfg();
        let v = DiscoveryViews::new(&s, &c);
        assert_eq!(symbols(&v.revived(now()).unwrap()), vec!["$OLDBACK"]);
    }

    #[test]
    fn excluded_symbols_hidden_but_lookup_works() {
        let s = store();
        let c = cfg();
        let v = DiscoveryViews::new(&s, &c);
        assert!(!symbols(&v.momentum(now()).unwrap()).contains(&"$BTC"));
        assert!(v.lookup("btc").unwrap().is_some());
    }

    #[test]
    fn generic_sorts_and_paginates() {
        let s = store();
        let c = cfg();
        let v = DiscoveryViews::new(&s, &c);

        let p1 = v
            .generic(
                now(),
                PageRequest {
                    page: 1,
                    page_size: 2,
                    sort: SortKey::Score,
                    direction: SortDirection::Desc,
                },
            )
            .unwrap();
        // $STALE (5 days) falls outside the 3-day window.
        assert_eq!(p1.total, 4);
        assert_eq!(symbols(&p1.items), vec!["$OLDBACK", "$DAY"]);

        let p2 = v
            .generic(
                now(),
                PageRequest {
                    page: 2,
                    page_size: 2,
                    sort: SortKey::Score,
                    direction: SortDirection::Desc,
                },
            )
            .unwrap();
        assert_eq!(symbols(&p2.items), vec!["$NEW", "$NEWER"]);

        let by_symbol = v
            .generic_default(now(), SortKey::Symbol, SortDirection::Asc)
            .unwrap();
        assert_eq!(
            symbols(&by_symbol.items),
            vec!["$DAY", "$NEW", "$NEWER", "$OLDBACK"]
        );
    }

    #[test]
    fn page_past_end_is_empty() {
        let s = store();
        let c = cfg();
        let v = DiscoveryViews::new(&s, &c);
        let p = v
            .generic(
                now(),
                PageRequest {
                    page: 9,
                    page_size: 10,
                    sort: SortKey::Recency,
                    direction: SortDirection::Desc,
                },
            )
            .unwrap();
        assert!(p.items.is_empty());
        assert_eq!(p.total, 4);
    }

    #[test]
    fn bad_window_is_an_error_not_a_panic() {
        let s = store();
        let c = DiscoveryConfig {
            generic_window_hours: i64::MAX / 1000,
            fresh_window_hours: -6,
            ..Default::default()
        };
        let v = DiscoveryViews::new(&s, &c);
        assert!(matches!(
            v.generic_default(now(), SortKey::Score, SortDirection::Desc),
            Err(ViewError::Window {
                name: "generic_window_hours",
                ..
            })
        ));
        assert!(matches!(v.fresh(now()), Err(ViewError::Window { .. })));
        assert!(v.momentum(now()).is_ok());
    }

    #[test]
    fn unrepresentable_cutoff_is_an_error() {
        let s = store();
        let c = cfg();
        let v = DiscoveryViews::new(&s, &c);
        assert!(matches!(
            v.momentum(DateTime::<Utc>::MIN_UTC),
            Err(ViewError::Cutoff { hours: 24, .. })
        ));
    }

    #[test]
    fn sort_params_parse() {
        assert_eq!("Recency".parse::<SortKey>().unwrap(), SortKey::Recency);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
