//! Collector plugin framework.
//!
//! A [`CollectorRegistry`] maps collector names to (default-enabled flag,
//! factory) pairs. It is populated once at startup by an explicit call
//! sequence ([`default_collector_registry`]) and is read-only during
//! serving. Per request, [`CollectorRegistry::build`] instantiates the
//! enabled collectors for one target identity into a [`CollectorSet`],
//! which registers into a request-scoped `prometheus::Registry`.

pub mod ping;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use prometheus::core::Desc;
use prometheus::proto::{self, MetricFamily, MetricType};
use tracing::debug;

use crate::config::CollectorSettings;
use crate::probe::ProbeRunner;

/// Metric namespace prefix for everything this exporter emits.
pub const NAMESPACE: &str = "fleet";

/// Wall-clock duration of one collection pass, labeled per collector.
/// Shared across all collector kinds, so it is deliberately not part of
/// any collector's `describe` output.
pub(crate) static COLLECT_DURATION: Lazy<Desc> = Lazy::new(|| {
    Desc::new(
        format!("{}_exporter_collector_duration_seconds", NAMESPACE),
        "Collector time duration.".to_string(),
        vec!["collector".to_string()],
        HashMap::new(),
    )
    .expect("valid descriptor")
});

/// Whether an error occurred during one collection pass, labeled per
/// collector. Shared across all collector kinds like [`COLLECT_DURATION`].
pub(crate) static COLLECT_ERROR: Lazy<Desc> = Lazy::new(|| {
    Desc::new(
        format!("{}_exporter_collect_error", NAMESPACE),
        "Indicates if error has occurred during collection".to_string(),
        vec!["collector".to_string()],
        HashMap::new(),
    )
    .expect("valid descriptor")
});

/// One family of related metric samples, produced fresh per request.
pub trait Collector: Send + Sync {
    /// Descriptors for the metric families owned by this collector kind.
    fn describe(&self) -> Vec<&Desc>;

    /// Performs one timed collection pass and returns its samples.
    fn collect(&self) -> Vec<MetricFamily>;
}

/// Builds a single-sample gauge family from a descriptor.
///
/// Label values are matched positionally against the descriptor's
/// variable labels.
pub(crate) fn gauge_family(desc: &Desc, value: f64, label_values: &[&str]) -> MetricFamily {
    let mut gauge = proto::Gauge::default();
    gauge.set_value(value);

    let mut metric = proto::Metric::default();
    metric.set_gauge(gauge);
    for (name, label_value) in desc.variable_labels.iter().zip(label_values) {
        let mut pair = proto::LabelPair::default();
        pair.set_name(name.clone());
        pair.set_value((*label_value).to_string());
        metric.label.push(pair);
    }

    let mut family = MetricFamily::default();
    family.set_name(desc.fq_name.clone());
    family.set_help(desc.help.clone());
    family.set_field_type(MetricType::GAUGE);
    family.mut_metric().push(metric);
    family
}

/// Adapter registering a boxed [`Collector`] with a `prometheus::Registry`.
struct RegisteredCollector(Box<dyn Collector>);

impl prometheus::core::Collector for RegisteredCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.0.describe()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.0.collect()
    }
}

/// Factory producing a collector instance bound to one target identity.
pub type CollectorFactory =
    Box<dyn Fn(&str, &CollectorSettings) -> Box<dyn Collector> + Send + Sync>;

struct CollectorKind {
    default_enabled: bool,
    factory: CollectorFactory,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Collector '{0}' is already registered")]
    Duplicate(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Path {} for the probe binary does not exist or is not a regular file", .0.display())]
    ProbeBinaryMissing(PathBuf),
}

/// Process-wide table of collector kinds.
///
/// Populated single-threaded before the server accepts requests and never
/// mutated afterwards, so concurrent reads need no locking.
#[derive(Default)]
pub struct CollectorRegistry {
    kinds: BTreeMap<&'static str, CollectorKind>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a collector kind. Duplicate names are a programming
    /// error and fail startup, never a request.
    pub fn register(
        &mut self,
        name: &'static str,
        default_enabled: bool,
        factory: CollectorFactory,
    ) -> Result<(), RegistryError> {
        if self.kinds.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.kinds.insert(
            name,
            CollectorKind {
                default_enabled,
                factory,
            },
        );
        Ok(())
    }

    /// Names of the collectors enabled under the given settings, applying
    /// per-collector overrides over each kind's registered default.
    pub fn enabled_names(&self, settings: &CollectorSettings) -> Vec<&'static str> {
        self.kinds
            .iter()
            .filter(|(name, kind)| {
                settings
                    .enabled
                    .get(**name)
                    .copied()
                    .unwrap_or(kind.default_enabled)
            })
            .map(|(name, _)| *name)
            .collect()
    }

    /// Instantiates the enabled collectors for one target identity.
    ///
    /// Never partially succeeds: the probe binary is validated up front,
    /// so either every enabled factory runs or the build fails with a
    /// deterministic missing-binary condition. The same check runs at
    /// process startup; it is repeated here so the builder is correct in
    /// isolation.
    pub fn build(
        &self,
        identity: &str,
        settings: &CollectorSettings,
    ) -> Result<CollectorSet, BuildError> {
        let enabled = self.enabled_names(settings);
        if !enabled.is_empty() && !is_regular_file(&settings.probe_path) {
            return Err(BuildError::ProbeBinaryMissing(settings.probe_path.clone()));
        }

        let mut collectors: BTreeMap<&'static str, Box<dyn Collector>> = BTreeMap::new();
        for name in enabled {
            let kind = &self.kinds[name];
            collectors.insert(name, (kind.factory)(identity, settings));
        }
        Ok(CollectorSet { collectors })
    }
}

/// Collectors built for one request, keyed by name.
pub struct CollectorSet {
    collectors: BTreeMap<&'static str, Box<dyn Collector>>,
}

impl CollectorSet {
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.collectors.keys().copied().collect()
    }

    /// Moves every collector into the request-scoped exposition registry.
    pub fn register_into(self, registry: &prometheus::Registry) -> Result<(), prometheus::Error> {
        for (name, collector) in self.collectors {
            debug!(collector = name, "Enabled collector");
            registry.register(Box::new(RegisteredCollector(collector)))?;
        }
        Ok(())
    }
}

/// Builds the registry of all known collector kinds.
///
/// This is the single, explicit initialization sequence; collectors do
/// not self-register via module-load side effects.
pub fn default_collector_registry(
    runner: Arc<dyn ProbeRunner>,
) -> Result<CollectorRegistry, RegistryError> {
    let mut registry = CollectorRegistry::new();
    registry.register(
        "ping",
        true,
        Box::new(move |identity, settings| {
            Box::new(ping::PingCollector::new(identity, settings, runner.clone()))
        }),
    )?;
    Ok(registry)
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeOutput;
    use prometheus::Registry;

    struct FakeRunner;

    impl ProbeRunner for FakeRunner {
        fn run(&self, _: &Path, _: &str, _: &str, _: &str) -> ProbeOutput {
            ProbeOutput {
                stdout: "node01 time=55.63 ms\n".to_string(),
                succeeded: true,
            }
        }
    }

    /// Settings whose probe path is guaranteed to be an existing regular
    /// file: the test binary itself.
    fn settings() -> CollectorSettings {
        CollectorSettings {
            probe_path: std::env::current_exe().expect("test binary path"),
            ping_timeout: "1".to_string(),
            enabled: HashMap::new(),
        }
    }

    fn noop_factory() -> CollectorFactory {
        Box::new(|identity, settings| {
            Box::new(ping::PingCollector::new(identity, settings, Arc::new(FakeRunner)))
        })
    }

    #[test]
    fn test_register_duplicate_name_fails() {
        let mut registry = CollectorRegistry::new();
        registry.register("ping", true, noop_factory()).unwrap();
        let err = registry.register("ping", false, noop_factory()).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(name) if name == "ping"));
    }

    #[test]
    fn test_default_disabled_collector_is_excluded() {
        let mut registry = CollectorRegistry::new();
        registry.register("shadow", false, noop_factory()).unwrap();

        let set = registry.build("node01", &settings()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_explicit_enable_overrides_default() {
        let mut registry = CollectorRegistry::new();
        registry.register("shadow", false, noop_factory()).unwrap();

        let mut enabled_settings = settings();
        enabled_settings.enabled.insert("shadow".to_string(), true);

        let set = registry.build("node01", &enabled_settings).unwrap();
        assert_eq!(set.names(), vec!["shadow"]);
    }

    #[test]
    fn test_explicit_disable_overrides_default() {
        let registry = default_collector_registry(Arc::new(FakeRunner)).unwrap();

        let mut disabled_settings = settings();
        disabled_settings.enabled.insert("ping".to_string(), false);

        assert!(registry.enabled_names(&disabled_settings).is_empty());
        let set = registry.build("node01", &disabled_settings).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_build_fails_when_probe_binary_missing() {
        let registry = default_collector_registry(Arc::new(FakeRunner)).unwrap();
        let mut bad_settings = settings();
        bad_settings.probe_path = PathBuf::from("/nonexistent/fleetctl");

        let err = registry
            .build("node01", &bad_settings)
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, BuildError::ProbeBinaryMissing(_)));
    }

    #[test]
    fn test_missing_binary_is_ignored_when_nothing_enabled() {
        let mut registry = CollectorRegistry::new();
        registry.register("shadow", false, noop_factory()).unwrap();

        let mut bad_settings = settings();
        bad_settings.probe_path = PathBuf::from("/nonexistent/fleetctl");

        let set = registry.build("node01", &bad_settings).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_two_builds_yield_independent_sets_with_identical_shape() {
        let registry = default_collector_registry(Arc::new(FakeRunner)).unwrap();

        let first = registry.build("node01", &settings()).unwrap();
        let second = registry.build("node01", &settings()).unwrap();
        assert_eq!(first.names(), second.names());

        let gather = |set: CollectorSet| {
            let prom = Registry::new();
            set.register_into(&prom).unwrap();
            prom.gather()
                .into_iter()
                .map(|f| f.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(gather(first), gather(second));
    }

    #[test]
    fn test_gauge_family_labels_follow_descriptor_order() {
        let family = gauge_family(&COLLECT_DURATION, 0.25, &["ping"]);
        assert_eq!(family.name(), "fleet_exporter_collector_duration_seconds");
        let metric = &family.metric[0];
        assert_eq!(metric.label[0].name(), "collector");
        assert_eq!(metric.label[0].value(), "ping");
        assert_eq!(metric.gauge.value(), 0.25);
    }
}
