// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Access to externally stored resource profiles.
//!
//! A [`Session`] sits between profile constructors such as
//! [`Profile::resource`](crate::Profile::resource) and a
//! [`ResourceProvider`]. Resources are fetched lazily, the first time a
//! profile built on them is evaluated, and by default each name is fetched
//! only once per session.
//!
//! Resource values arrive as untyped [`serde_json::Value`]s and are decoded
//! into the profile's value type with serde.
//!
//! ```
//! use tempoline::{InMemoryProvider, Interval, Profile, Segment, Session};
//! use tempoline::time::micros;
//! use serde_json::json;
//!
//! let provider = InMemoryProvider::new().with_resource(
//!     "mode",
//!     vec![Segment::new(json!("idle"), Interval::between_closed_open(micros(0), micros(10)))],
//! );
//! let session = Session::new(provider);
//! let mode: Profile<String> = Profile::resource(&session, "mode");
//! assert_eq!(mode.value_at(micros(3)).unwrap().as_deref(), Some("idle"));
//! ```

use crate::time::{self, Duration};
use crate::timeline::{is_sorted_by_start, sort_by_start};
use crate::{IntervalLike, Result, Segment, Timeline, TimelineError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// A source of resource profiles, keyed by name.
pub trait ResourceProvider: Send + Sync {
    /// Every stored segment of the named resource.
    fn fetch(&self, name: &str) -> Result<Vec<Segment<JsonValue>>>;
}

/// A provider backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    resources: HashMap<String, Vec<Segment<JsonValue>>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`InMemoryProvider::insert`].
    pub fn with_resource(mut self, name: impl Into<String>, segments: Vec<Segment<JsonValue>>) -> Self {
        self.insert(name, segments);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, segments: Vec<Segment<JsonValue>>) {
        self.resources.insert(name.into(), segments);
    }

    /// Loads resources from a JSON object mapping names to segment lists.
    pub fn from_json(json: &str) -> Result<Self> {
        let resources: HashMap<String, Vec<Segment<JsonValue>>> = serde_json::from_str(json)?;
        Ok(InMemoryProvider { resources })
    }
}

impl ResourceProvider for InMemoryProvider {
    fn fetch(&self, name: &str) -> Result<Vec<Segment<JsonValue>>> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| TimelineError::UnknownResource(name.to_string()))
    }
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fetch each resource at most once per session.
    pub cache_resources: bool,
    /// Absolute instant that timeline offsets are relative to.
    pub plan_start: Option<DateTime<Utc>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            cache_resources: true,
            plan_start: None,
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

type ResourceCache = Mutex<HashMap<String, Arc<Vec<Segment<JsonValue>>>>>;

/// Shared, cached access to a [`ResourceProvider`].
#[derive(Clone)]
pub struct Session {
    provider: Arc<dyn ResourceProvider>,
    config: SessionConfig,
    cache: Arc<ResourceCache>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(provider: impl ResourceProvider + 'static) -> Self {
        Self::with_config(provider, SessionConfig::default())
    }

    pub fn with_config(provider: impl ResourceProvider + 'static, config: SessionConfig) -> Self {
        Session {
            provider: Arc::new(provider),
            config,
            cache: Arc::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// All stored segments of a resource, sorted by start.
    ///
    /// With caching enabled the provider is asked at most once per name,
    /// even under concurrent use. Failed fetches are not cached.
    pub fn fetch(&self, name: &str) -> Result<Arc<Vec<Segment<JsonValue>>>> {
        if !self.config.cache_resources {
            return self.fetch_uncached(name).map(Arc::new);
        }
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(name) {
            debug!(resource = name, "resource cache hit");
            return Ok(Arc::clone(hit));
        }
        let segments = Arc::new(self.fetch_uncached(name)?);
        cache.insert(name.to_string(), Arc::clone(&segments));
        Ok(segments)
    }

    fn fetch_uncached(&self, name: &str) -> Result<Vec<Segment<JsonValue>>> {
        debug!(resource = name, "fetching resource");
        let mut segments = self.provider.fetch(name)?;
        if !is_sorted_by_start(&segments) {
            warn!(resource = name, "resource segments out of order; sorting");
            sort_by_start(&mut segments);
        }
        Ok(segments)
    }

    /// A lazy timeline over the raw stored segments of a resource.
    pub fn resource(&self, name: &str) -> Timeline<Segment<JsonValue>> {
        self.decoded_resource(name, |segment| Ok(segment.value.clone()))
    }

    /// A lazy timeline over a resource, decoding each stored segment.
    ///
    /// `decode` sees the full stored segment, before it is clipped to the
    /// evaluation bounds. A decoding failure surfaces as
    /// [`TimelineError::ResourceShape`].
    pub fn decoded_resource<V, F>(&self, name: &str, decode: F) -> Timeline<Segment<V>>
    where
        V: Clone + Send + Sync + 'static,
        F: Fn(&Segment<JsonValue>) -> std::result::Result<V, String> + Send + Sync + 'static,
    {
        let session = self.clone();
        let name = name.to_string();
        Timeline::new(move |bounds| {
            let stored = session.fetch(&name)?;
            let mut result = Vec::new();
            for segment in stored.iter() {
                let Some(clipped) = segment.interval.bound(&bounds) else {
                    continue;
                };
                let value = decode(segment).map_err(|reason| TimelineError::ResourceShape {
                    name: name.clone(),
                    reason,
                })?;
                result.push(Segment::new(value, clipped));
            }
            Ok(result)
        })
    }

    /// Offset of an absolute instant from the configured plan start.
    pub fn offset_of(&self, instant: DateTime<Utc>) -> Result<Duration> {
        let start = self.config.plan_start.ok_or(TimelineError::MissingPlanStart)?;
        Ok(time::offset_from(start, instant))
    }

    /// Absolute instant at `offset` from the configured plan start.
    ///
    /// `None` if the instant is outside chrono's representable range.
    pub fn instant_at(&self, offset: Duration) -> Result<Option<DateTime<Utc>>> {
        let start = self.config.plan_start.ok_or(TimelineError::MissingPlanStart)?;
        Ok(time::instant_at(start, offset))
    }

    /// Forgets every cached resource.
    pub fn clear_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::micros;
    use crate::{Interval, Profile};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        inner: InMemoryProvider,
        calls: Arc<AtomicUsize>,
    }

    impl ResourceProvider for CountingProvider {
        fn fetch(&self, name: &str) -> Result<Vec<Segment<JsonValue>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(name)
        }
    }

    fn counting(cache_resources: bool) -> (Session, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = InMemoryProvider::new().with_resource(
            "power",
            vec![Segment::new(json!(3), Interval::between_closed_open(micros(0), micros(10)))],
        );
        let provider = CountingProvider {
            inner,
            calls: Arc::clone(&calls),
        };
        let config = SessionConfig {
            cache_resources,
            ..SessionConfig::default()
        };
        (Session::with_config(provider, config), calls)
    }

    #[test]
    fn test_resources_fetched_once() {
        let (session, calls) = counting(true);
        let power: Profile<i64> = Profile::resource(&session, "power");
        let bounds = Interval::closed(micros(0), micros(20));
        power.collect(bounds).unwrap();
        power.collect(bounds).unwrap();
        Profile::<i64>::resource(&session, "power").collect(bounds).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        session.clear_cache();
        power.collect(bounds).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_can_be_disabled() {
        let (session, calls) = counting(false);
        let power: Profile<i64> = Profile::resource(&session, "power");
        power.collect(Interval::at(micros(1))).unwrap();
        power.collect(Interval::at(micros(1))).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fetch_is_lazy() {
        let (session, calls) = counting(true);
        let _unused: Profile<i64> = Profile::resource(&session, "power");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_resource() {
        let session = Session::new(InMemoryProvider::new());
        let missing: Profile<bool> = Profile::resource(&session, "nope");
        assert_eq!(
            missing.collect(Interval::at(micros(0))),
            Err(TimelineError::UnknownResource("nope".into()))
        );
    }

    #[test]
    fn test_unsorted_resources_are_sorted() {
        let provider = InMemoryProvider::new().with_resource(
            "x",
            vec![
                Segment::new(json!(2), Interval::between_closed_open(micros(5), micros(10))),
                Segment::new(json!(1), Interval::between_closed_open(micros(0), micros(5))),
            ],
        );
        let session = Session::new(provider);
        let values: Vec<i64> = Profile::<i64>::resource(&session, "x")
            .collect(Interval::closed(micros(0), micros(10)))
            .unwrap()
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_provider_from_json() {
        let provider = InMemoryProvider::from_json(
            r#"{"on": [{"value": true, "interval": {"start_us": 0, "end_us": 4}}]}"#,
        )
        .unwrap();
        let segments = provider.fetch("on").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].interval, Interval::closed(micros(0), micros(4)));
    }

    #[test]
    fn test_config_and_plan_offsets() {
        let config = SessionConfig::from_json(r#"{"plan_start": "2026-01-01T00:00:00Z"}"#).unwrap();
        assert!(config.cache_resources);
        let session = Session::with_config(InMemoryProvider::new(), config);

        let start = session.config().plan_start.unwrap();
        let later = start + chrono::Duration::seconds(90);
        assert_eq!(session.offset_of(later).unwrap(), Duration::seconds(90));
        assert_eq!(session.instant_at(Duration::seconds(90)).unwrap(), Some(later));

        let bare = Session::new(InMemoryProvider::new());
        assert_eq!(bare.offset_of(later), Err(TimelineError::MissingPlanStart));
        assert!(SessionConfig::from_json("{ nope").is_err());
    }
}
