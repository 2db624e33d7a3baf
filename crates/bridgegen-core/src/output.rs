//! Output sink contract
//!
//! The traversal driver hands each finished unit (one class or one module's
//! globals) to an [`OutputSink`]. Sinks share an [`EmitCache`] that remembers
//! which destinations were already handed out during the run.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

/// Writer for one output unit
pub trait UnitWriter {
    /// Append a line of text
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    /// Whether this destination was already produced earlier in the run
    fn is_already_produced(&self) -> bool;

    /// Flush and release the destination
    fn close(self) -> io::Result<()>;

    /// Drop the unit unwritten. A destination claimed by this writer becomes
    /// available again.
    fn discard(self) -> io::Result<()>;
}

/// Destination for emitted units
pub trait OutputSink {
    /// Writer type handed out per unit
    type Writer: UnitWriter;

    /// Open the unit for `qualified_name` (a fully-qualified Java type name)
    fn writer(&mut self, qualified_name: &str) -> io::Result<Self::Writer>;
}

/// Append-only set of destinations produced during one run
///
/// Clones share the same set. Claims are checked and recorded under one lock.
#[derive(Debug, Clone, Default)]
pub struct EmitCache {
    produced: Arc<Mutex<FxHashSet<String>>>,
}

impl EmitCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`; returns `true` if it was not recorded before.
    pub fn claim(&self, key: &str) -> bool {
        self.produced.lock().insert(key.to_string())
    }

    /// Forget `key`, returning whether it was recorded
    pub fn release(&self, key: &str) -> bool {
        self.produced.lock().remove(key)
    }

    /// Check if `key` was recorded
    pub fn contains(&self, key: &str) -> bool {
        self.produced.lock().contains(key)
    }

    /// Number of recorded destinations
    pub fn len(&self) -> usize {
        self.produced.lock().len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.produced.lock().is_empty()
    }
}

/// A unit collected by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedUnit {
    /// Qualified Java type name
    pub name: String,
    /// Emitted source
    pub text: String,
}

/// Sink that keeps emitted units in memory, in emission order
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    units: Arc<Mutex<Vec<EmittedUnit>>>,
    cache: EmitCache,
}

impl MemorySink {
    /// Create a sink with its own cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink sharing `cache`
    pub fn with_cache(cache: EmitCache) -> Self {
        Self {
            units: Arc::default(),
            cache,
        }
    }

    /// Units emitted so far
    pub fn units(&self) -> Vec<EmittedUnit> {
        self.units.lock().clone()
    }

    /// Text of the unit named `name`
    pub fn get(&self, name: &str) -> Option<String> {
        self.units
            .lock()
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.text.clone())
    }
}

impl OutputSink for MemorySink {
    type Writer = MemoryWriter;

    fn writer(&mut self, qualified_name: &str) -> io::Result<MemoryWriter> {
        Ok(MemoryWriter {
            name: qualified_name.to_string(),
            already_produced: !self.cache.claim(qualified_name),
            buffer: String::new(),
            units: Arc::clone(&self.units),
            cache: self.cache.clone(),
        })
    }
}

/// Writer handed out by [`MemorySink`]
#[derive(Debug)]
pub struct MemoryWriter {
    name: String,
    already_produced: bool,
    buffer: String,
    units: Arc<Mutex<Vec<EmittedUnit>>>,
    cache: EmitCache,
}

impl UnitWriter for MemoryWriter {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.buffer.push_str(text);
        self.buffer.push('\n');
        Ok(())
    }

    fn is_already_produced(&self) -> bool {
        self.already_produced
    }

    fn close(self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let mut units = self.units.lock();
        let unit = EmittedUnit {
            name: self.name,
            text: self.buffer,
        };
        match units.iter_mut().find(|u| u.name == unit.name) {
            Some(existing) => *existing = unit,
            None => units.push(unit),
        }
        Ok(())
    }

    fn discard(self) -> io::Result<()> {
        if !self.already_produced {
            self.cache.release(&self.name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_cache_claims_once() {
        let cache = EmitCache::new();
        assert!(cache.claim("a.B"));
        assert!(!cache.claim("a.B"));
        assert!(cache.contains("a.B"));
        assert_eq!(cache.len(), 1);

        let shared = cache.clone();
        assert!(!shared.claim("a.B"));
        assert!(shared.claim("a.C"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_memory_sink_collects_units() {
        let mut sink = MemorySink::new();

        let mut writer = sink.writer("org.example.Wallet").unwrap();
        assert!(!writer.is_already_produced());
        writer.write_line("interface Wallet {}").unwrap();
        writer.close().unwrap();

        let again = sink.writer("org.example.Wallet").unwrap();
        assert!(again.is_already_produced());
        again.close().unwrap();

        let units = sink.units();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "interface Wallet {}\n");
        assert_eq!(sink.get("org.example.Wallet").as_deref(), Some("interface Wallet {}\n"));
    }

    #[test]
    fn test_discarded_unit_can_be_claimed_again() {
        let mut sink = MemorySink::new();

        let mut writer = sink.writer("org.example.Broken").unwrap();
        writer.write_line("partial").unwrap();
        writer.discard().unwrap();
        assert!(sink.units().is_empty());

        let retry = sink.writer("org.example.Broken").unwrap();
        assert!(!retry.is_already_produced());

        let duplicate = sink.writer("org.example.Broken").unwrap();
        assert!(duplicate.is_already_produced());
        duplicate.discard().unwrap();
        assert!(sink.writer("org.example.Broken").unwrap().is_already_produced());
    }

    #[test]
    fn test_memory_sink_replaces_rewritten_unit() {
        let mut sink = MemorySink::new();
        for text in ["first", "second"] {
            let mut writer = sink.writer("org.example.Bank").unwrap();
            writer.write_line(text).unwrap();
            writer.close().unwrap();
        }
        assert_eq!(sink.units().len(), 1);
        assert_eq!(sink.get("org.example.Bank").as_deref(), Some("second\n"));
    }
}
