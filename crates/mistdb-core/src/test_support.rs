//! Shared fixtures for unit tests: scripted executor, cache doubles, and
//! record types covering both the plain and the recast hydration paths.

use crate::{
    db::{AttrMap, CacheError, MemoryCache, Page, RecordCache, RemoteError, RemoteExecutor, SelectOptions},
    traits::{Path, RecordCtor, RecordError, RecordKind, RecordValue},
    types::Id,
    value::Value,
};
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

///
/// Planet
/// Plain record: no recast, a couple of settable fields.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Planet {
    pub id: Id<Self>,
    pub color: String,
    pub status: String,
    pub mass: u64,
}

impl Planet {
    pub(crate) fn test_row(name: &str, color: &str) -> Self {
        Self {
            id: Id::new(name),
            color: color.to_string(),
            status: "active".to_string(),
            mass: 0,
        }
    }
}

pub(crate) fn planet_attrs(color: &str) -> AttrMap {
    AttrMap::new()
        .with("color", Value::Text(color.to_string()))
        .with("status", Value::Text("active".to_string()))
        .with("mass", Value::Uint(0))
}

impl Path for Planet {
    const PATH: &'static str = "test_support::Planet";
}

impl RecordKind for Planet {
    const COLLECTION: &'static str = "planets";
}

impl RecordValue for Planet {
    fn from_attrs(id: &Id<Self>, attrs: &AttrMap) -> Result<Self, RecordError> {
        let color = match attrs.get("color") {
            Some(Value::Text(color)) => color.clone(),
            Some(other) => {
                return Err(RecordError::AttributeType {
                    record: Self::PATH,
                    field: "color",
                    expected: "text",
                    found: other.kind(),
                });
            }
            None => {
                return Err(RecordError::MissingAttribute {
                    record: Self::PATH,
                    field: "color",
                });
            }
        };

        let status = attrs.get_text("status").unwrap_or("active").to_string();
        let mass = match attrs.get("mass") {
            Some(Value::Uint(mass)) => *mass,
            _ => 0,
        };

        Ok(Self {
            id: id.clone(),
            color,
            status,
            mass,
        })
    }

    fn to_attrs(&self) -> AttrMap {
        AttrMap::new()
            .with("color", Value::Text(self.color.clone()))
            .with("status", Value::Text(self.status.clone()))
            .with("mass", Value::Uint(self.mass))
    }

    fn id(&self) -> &Id<Self> {
        &self.id
    }

    fn set_attr(&mut self, field: &str, value: Value) -> Result<(), RecordError> {
        let type_err = |field: &'static str, expected: &'static str, found: &'static str| {
            RecordError::AttributeType {
                record: Self::PATH,
                field,
                expected,
                found,
            }
        };

        match field {
            "color" => match value {
                Value::Text(color) => self.color = color,
                other => return Err(type_err("color", "text", other.kind())),
            },
            "status" => match value {
                Value::Text(status) => self.status = status,
                other => return Err(type_err("status", "text", other.kind())),
            },
            "mass" => match value {
                Value::Uint(mass) => self.mass = mass,
                other => return Err(type_err("mass", "uint", other.kind())),
            },
            unknown => {
                return Err(RecordError::UnknownField {
                    record: Self::PATH,
                    field: unknown.to_string(),
                });
            }
        }

        Ok(())
    }
}

///
/// Vessel
/// Recast hierarchy: the `kind` attribute selects the concrete variant,
/// with `Unclassified` as the nominal fallback.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Vessel {
    Freighter { id: Id<Self>, cargo: u64 },
    Probe { id: Id<Self>, range: u64 },
    Unclassified { id: Id<Self> },
}

fn freighter_ctor(id: &Id<Vessel>, attrs: &AttrMap) -> Result<Vessel, RecordError> {
    let cargo = match attrs.get("cargo") {
        Some(Value::Uint(cargo)) => *cargo,
        _ => 0,
    };

    Ok(Vessel::Freighter {
        id: id.clone(),
        cargo,
    })
}

fn probe_ctor(id: &Id<Vessel>, attrs: &AttrMap) -> Result<Vessel, RecordError> {
    let range = match attrs.get("range") {
        Some(Value::Uint(range)) => *range,
        _ => 0,
    };

    Ok(Vessel::Probe {
        id: id.clone(),
        range,
    })
}

impl Path for Vessel {
    const PATH: &'static str = "test_support::Vessel";
}

impl RecordKind for Vessel {
    const COLLECTION: &'static str = "vessels";
    const RECAST_FIELD: Option<&'static str> = Some("kind");

    fn resolve_variant(tag: &str) -> Option<RecordCtor<Self>> {
        match tag {
            "freighter" => Some(freighter_ctor),
            "probe" => Some(probe_ctor),
            _ => None,
        }
    }
}

impl RecordValue for Vessel {
    fn from_attrs(id: &Id<Self>, _attrs: &AttrMap) -> Result<Self, RecordError> {
        Ok(Self::Unclassified { id: id.clone() })
    }

    fn to_attrs(&self) -> AttrMap {
        match self {
            Self::Freighter { cargo, .. } => AttrMap::new()
                .with("kind", Value::Text("freighter".to_string()))
                .with("cargo", Value::Uint(*cargo)),
            Self::Probe { range, .. } => AttrMap::new()
                .with("kind", Value::Text("probe".to_string()))
                .with("range", Value::Uint(*range)),
            Self::Unclassified { .. } => AttrMap::new(),
        }
    }

    fn id(&self) -> &Id<Self> {
        match self {
            Self::Freighter { id, .. } | Self::Probe { id, .. } | Self::Unclassified { id } => id,
        }
    }

    fn set_attr(&mut self, field: &str, value: Value) -> Result<(), RecordError> {
        match (self, field, value) {
            (Self::Freighter { cargo, .. }, "cargo", Value::Uint(n)) => *cargo = n,
            (Self::Probe { range, .. }, "range", Value::Uint(n)) => *range = n,
            (_, unknown, _) => {
                return Err(RecordError::UnknownField {
                    record: Self::PATH,
                    field: unknown.to_string(),
                });
            }
        }

        Ok(())
    }
}

///
/// ExecutorCall
/// One observed call against the mock executor, in arrival order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum ExecutorCall {
    Select {
        query: String,
        token: Option<String>,
        consistent: bool,
    },
    Count {
        query: String,
        consistent: bool,
    },
    Put {
        collection: String,
        name: String,
    },
    Delete {
        collection: String,
        name: String,
    },
}

///
/// MockExecutor
/// Scripted store: responses are keyed by `(query, continuation token)`,
/// so pagination scripts read exactly like the store behaves.
///

#[derive(Default)]
pub(crate) struct MockExecutor {
    selects: Mutex<HashMap<(String, Option<String>), Page>>,
    counts: Mutex<HashMap<String, u64>>,
    fail_puts: Mutex<HashSet<String>>,
    fail_deletes: Mutex<HashSet<String>>,
    calls: Mutex<Vec<ExecutorCall>>,
}

impl MockExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script_select(&self, query: &str, token: Option<&str>, page: Page) {
        self.selects
            .lock()
            .unwrap()
            .insert((query.to_string(), token.map(ToString::to_string)), page);
    }

    pub(crate) fn script_count(&self, query: &str, total: u64) {
        self.counts.lock().unwrap().insert(query.to_string(), total);
    }

    pub(crate) fn fail_put(&self, name: &str) {
        self.fail_puts.lock().unwrap().insert(name.to_string());
    }

    pub(crate) fn fail_delete(&self, name: &str) {
        self.fail_deletes.lock().unwrap().insert(name.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<ExecutorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn select_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ExecutorCall::Select { .. }))
            .count()
    }
}

impl RemoteExecutor for MockExecutor {
    fn select(&self, query: &str, opts: &SelectOptions) -> Result<Page, RemoteError> {
        let token = opts.token.as_ref().map(|t| t.as_str().to_string());
        self.calls.lock().unwrap().push(ExecutorCall::Select {
            query: query.to_string(),
            token: token.clone(),
            consistent: opts.consistency.is_strong(),
        });

        self.selects
            .lock()
            .unwrap()
            .get(&(query.to_string(), token))
            .cloned()
            .ok_or_else(|| RemoteError::Rejected {
                code: "UnscriptedQuery".to_string(),
                message: query.to_string(),
            })
    }

    fn select_count(&self, query: &str, opts: &SelectOptions) -> Result<u64, RemoteError> {
        self.calls.lock().unwrap().push(ExecutorCall::Count {
            query: query.to_string(),
            consistent: opts.consistency.is_strong(),
        });

        self.counts
            .lock()
            .unwrap()
            .get(query)
            .copied()
            .ok_or_else(|| RemoteError::Rejected {
                code: "UnscriptedQuery".to_string(),
                message: query.to_string(),
            })
    }

    fn put_row(&self, collection: &str, name: &str, _attrs: &AttrMap) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(ExecutorCall::Put {
            collection: collection.to_string(),
            name: name.to_string(),
        });

        if self.fail_puts.lock().unwrap().contains(name) {
            return Err(RemoteError::Transport("scripted put failure".to_string()));
        }

        Ok(())
    }

    fn delete_row(&self, collection: &str, name: &str) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(ExecutorCall::Delete {
            collection: collection.to_string(),
            name: name.to_string(),
        });

        if self.fail_deletes.lock().unwrap().contains(name) {
            return Err(RemoteError::Transport("scripted delete failure".to_string()));
        }

        Ok(())
    }
}

///
/// FailingCache
/// Every operation reports a backend failure.
///

pub(crate) struct FailingCache;

impl RecordCache for FailingCache {
    fn get(&self, _collection: &str, _name: &str) -> Result<Option<AttrMap>, CacheError> {
        Err(CacheError::Backend("scripted get failure".to_string()))
    }

    fn set(&self, _collection: &str, _name: &str, _attrs: &AttrMap) -> Result<(), CacheError> {
        Err(CacheError::Backend("scripted set failure".to_string()))
    }

    fn evict(&self, _collection: &str, _name: &str) -> Result<(), CacheError> {
        Err(CacheError::Backend("scripted evict failure".to_string()))
    }
}

///
/// WriteFailCache
/// Reads work; every write reports a backend failure. Exercises the
/// best-effort population and eviction paths.
///

#[derive(Default)]
pub(crate) struct WriteFailCache {
    inner: MemoryCache,
}

impl WriteFailCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl RecordCache for WriteFailCache {
    fn get(&self, collection: &str, name: &str) -> Result<Option<AttrMap>, CacheError> {
        self.inner.get(collection, name)
    }

    fn set(&self, _collection: &str, _name: &str, _attrs: &AttrMap) -> Result<(), CacheError> {
        Err(CacheError::Backend("scripted set failure".to_string()))
    }

    fn evict(&self, _collection: &str, _name: &str) -> Result<(), CacheError> {
        Err(CacheError::Backend("scripted evict failure".to_string()))
    }
}
