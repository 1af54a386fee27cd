//! Collaborator seams: model miner and log source
//!
//! Process-model discovery is out of scope for this workspace; the engine
//! only needs an opaque handle it can hand to the comparator primitives.
//! The miner is invoked synchronously once per closed window, in window
//! order.

use std::collections::{BTreeMap, BTreeSet};

use procdrift_core::{Result, StreamItem, Trace, Window};

/// Opaque handle to a discovered process model
///
/// The engine never interprets the model beyond handing it to the
/// comparator primitives, which see it as two element sets (nodes and
/// directly-follows edges).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelHandle {
    nodes: BTreeSet<String>,
    edges: BTreeSet<(String, String)>,
}

impl ModelHandle {
    pub fn new(nodes: BTreeSet<String>, edges: BTreeSet<(String, String)>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &BTreeSet<String> {
        &self.nodes
    }

    pub fn edges(&self) -> &BTreeSet<(String, String)> {
        &self.edges
    }
}

/// External model miner, one discovery per closed window
pub trait ModelMiner: Send {
    /// Discover a model from the window's sublog
    fn discover(&mut self, window: &Window, sublog: &[StreamItem]) -> Result<ModelHandle>;

    /// Human-viewable rendering of a discovered model
    fn render(&self, model: &ModelHandle) -> String;
}

/// External log reader: imports a raw source into the ordered trace stream
pub trait LogSource {
    fn read(&mut self) -> Result<Vec<Trace>>;
}

/// Directly-follows miner over window sublogs
///
/// Minimal built-in miner used by examples and tests: nodes are the
/// observed activities, edges the directly-follows pairs within each trace.
/// Production deployments plug in a real discovery algorithm through
/// [`ModelMiner`].
#[derive(Debug, Clone, Default)]
pub struct DirectlyFollowsMiner;

impl ModelMiner for DirectlyFollowsMiner {
    fn discover(&mut self, _window: &Window, sublog: &[StreamItem]) -> Result<ModelHandle> {
        let mut nodes = BTreeSet::new();
        let mut edges = BTreeSet::new();
        for item in sublog {
            let events = item.events();
            for event in events {
                nodes.insert(event.activity.clone());
            }
            for pair in events.windows(2) {
                edges.insert((pair[0].activity.clone(), pair[1].activity.clone()));
            }
        }
        Ok(ModelHandle::new(nodes, edges))
    }

    fn render(&self, model: &ModelHandle) -> String {
        let mut out = String::from("digraph model {\n");
        for node in model.nodes() {
            out.push_str(&format!("  \"{node}\";\n"));
        }
        for (from, to) in model.edges() {
            out.push_str(&format!("  \"{from}\" -> \"{to}\";\n"));
        }
        out.push('}');
        out
    }
}

/// Everything the metric engine needs about one materialized window:
/// the discovered model plus per-attribute, per-activity numeric samples
#[derive(Debug, Clone, Default)]
pub struct WindowArtifact {
    model: ModelHandle,
    /// attribute name → activity → observed values, in stream order
    samples: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
}

impl WindowArtifact {
    pub fn new(model: ModelHandle) -> Self {
        Self {
            model,
            samples: BTreeMap::new(),
        }
    }

    /// Build the artifact, extracting samples for the named attributes
    pub fn from_sublog(model: ModelHandle, sublog: &[StreamItem], attributes: &[String]) -> Self {
        let mut samples: BTreeMap<String, BTreeMap<String, Vec<f64>>> = BTreeMap::new();
        for attribute in attributes {
            samples.insert(attribute.clone(), BTreeMap::new());
        }
        for item in sublog {
            for event in item.events() {
                for attribute in attributes {
                    if let Some(&value) = event.attributes.get(attribute) {
                        if let Some(per_activity) = samples.get_mut(attribute) {
                            per_activity
                                .entry(event.activity.clone())
                                .or_default()
                                .push(value);
                        }
                    }
                }
            }
        }
        Self { model, samples }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    /// Per-activity samples for one attribute, if extracted
    pub fn samples(&self, attribute: &str) -> Option<&BTreeMap<String, Vec<f64>>> {
        self.samples.get(attribute)
    }
}
