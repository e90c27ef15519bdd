//! Shared extension fixtures for the test modules in this crate.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::anyhow;
use serde_json::{json, Value};

use crate::error::RegistryError;
use crate::extensions::types::{Construct, Extension};

/// Install a fmt subscriber for tests that exercise logged paths.
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A conversation backend that echoes what it is sent.
pub(crate) struct EchoBackend {
    greeting: String,
}

impl Extension for EchoBackend {
    fn invoke(&self, op: &str, args: &Value) -> anyhow::Result<Value> {
        match op {
            "send" => {
                let text = args.get("text").and_then(Value::as_str).unwrap_or_default();
                Ok(json!(format!("{} {}", self.greeting, text)))
            }
            "status" => Ok(json!("ready")),
            other => Err(RegistryError::UnsupportedOp(other.to_string()).into()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Construct for EchoBackend {
    fn provides() -> &'static [&'static str] {
        &["send", "status"]
    }

    fn build(args: &Value) -> anyhow::Result<Self> {
        let greeting = args
            .get("greeting")
            .and_then(Value::as_str)
            .unwrap_or("hello")
            .to_string();
        Ok(Self { greeting })
    }
}

/// A backend that only reports status; it lacks `send`.
pub(crate) struct SilentBackend;

impl Extension for SilentBackend {
    fn invoke(&self, op: &str, _args: &Value) -> anyhow::Result<Value> {
        match op {
            "status" => Ok(json!("idle")),
            other => Err(RegistryError::UnsupportedOp(other.to_string()).into()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Construct for SilentBackend {
    fn provides() -> &'static [&'static str] {
        &["status"]
    }

    fn build(_args: &Value) -> anyhow::Result<Self> {
        Ok(Self)
    }
}

/// A backend whose constructor always fails.
pub(crate) struct ExplodingBackend;

impl Extension for ExplodingBackend {
    fn invoke(&self, op: &str, _args: &Value) -> anyhow::Result<Value> {
        Err(RegistryError::UnsupportedOp(op.to_string()).into())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Construct for ExplodingBackend {
    fn provides() -> &'static [&'static str] {
        &["send", "status"]
    }

    fn build(_args: &Value) -> anyhow::Result<Self> {
        Err(anyhow!("refusing to start"))
    }
}

/// Icon set that renders monochrome glyphs.
pub(crate) struct MonoIcons;

impl Extension for MonoIcons {
    fn invoke(&self, op: &str, args: &Value) -> anyhow::Result<Value> {
        match op {
            "render" => {
                let name = args.get("name").and_then(Value::as_str).unwrap_or("?");
                Ok(json!(format!("mono:{name}")))
            }
            other => Err(RegistryError::UnsupportedOp(other.to_string()).into()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Construct for MonoIcons {
    fn provides() -> &'static [&'static str] {
        &["render"]
    }

    fn build(_args: &Value) -> anyhow::Result<Self> {
        Ok(Self)
    }
}

/// Icon set that renders colored glyphs.
pub(crate) struct ColorIcons;

impl Extension for ColorIcons {
    fn invoke(&self, op: &str, args: &Value) -> anyhow::Result<Value> {
        match op {
            "render" => {
                let name = args.get("name").and_then(Value::as_str).unwrap_or("?");
                Ok(json!(format!("color:{name}")))
            }
            other => Err(RegistryError::UnsupportedOp(other.to_string()).into()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Construct for ColorIcons {
    fn provides() -> &'static [&'static str] {
        &["render"]
    }

    fn build(_args: &Value) -> anyhow::Result<Self> {
        Ok(Self)
    }
}

/// Icon set whose `render` always fails.
pub(crate) struct BrokenIcons;

impl Extension for BrokenIcons {
    fn invoke(&self, op: &str, _args: &Value) -> anyhow::Result<Value> {
        match op {
            "render" => Err(anyhow!("glyph table corrupted")),
            other => Err(RegistryError::UnsupportedOp(other.to_string()).into()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Construct for BrokenIcons {
    fn provides() -> &'static [&'static str] {
        &["render"]
    }

    fn build(_args: &Value) -> anyhow::Result<Self> {
        Ok(Self)
    }
}

/// A preference pane with keyed item access.
pub(crate) struct PrefPane {
    values: Mutex<BTreeMap<String, Value>>,
}

impl Extension for PrefPane {
    fn invoke(&self, op: &str, _args: &Value) -> anyhow::Result<Value> {
        Err(RegistryError::UnsupportedOp(op.to_string()).into())
    }

    fn get_item(&self, key: &str) -> anyhow::Result<Value> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("no such key: {key}"))
    }

    fn set_item(&self, key: &str, value: Value) -> anyhow::Result<()> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Construct for PrefPane {
    fn provides() -> &'static [&'static str] {
        &[]
    }

    fn build(args: &Value) -> anyhow::Result<Self> {
        let values = match args.as_object() {
            Some(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            None => BTreeMap::new(),
        };
        Ok(Self {
            values: Mutex::new(values),
        })
    }
}
