//! Shared fixtures for the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use protolink::core::Location;
use protolink::dispatch::{GenerationError, Logger, Target, TypeHandler};
use protolink::linker;
use protolink::parser::{self, ast::FileNode};
use protolink::schema::{Schema, TypeId};
use protolink::source::Filesystem;

/// Parse one file under a synthetic test root.
pub fn parse(path: &str, text: &str) -> FileNode {
    let location = Location::get("test", path);
    parser::parse_proto(&location, text).expect("parse failed")
}

/// Parse and link a set of `(path, text)` files.
pub fn link_files(files: &[(&str, &str)]) -> Schema {
    try_link_files(files).expect("link failed")
}

pub fn try_link_files(
    files: &[(&str, &str)],
) -> Result<Schema, protolink::linker::LinkFailure> {
    let mut parsed: Vec<FileNode> =
        files.iter().map(|(path, text)| parse(path, text)).collect();
    // The loader injects the bundled descriptor definitions; linking
    // directly gets the same treatment.
    parsed.push(protolink::loader::descriptor::bundled_descriptor().unwrap());
    linker::link(parsed)
}

/// A target that records the qualified names it was handed.
pub struct RecordingTarget {
    pub name: String,
    pub elements: Vec<String>,
    pub handled: Arc<Mutex<Vec<String>>>,
}

impl RecordingTarget {
    pub fn new(name: &str, elements: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            elements: elements.iter().map(|e| e.to_string()).collect(),
            handled: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn handled(&self) -> Vec<String> {
        self.handled.lock().unwrap().clone()
    }
}

impl Target for RecordingTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn elements(&self) -> &[String] {
        &self.elements
    }

    fn new_handler(
        &self,
        _schema: &Schema,
        _fs: &dyn Filesystem,
        _logger: &dyn Logger,
    ) -> Box<dyn TypeHandler> {
        Box::new(RecordingHandler {
            handled: Arc::clone(&self.handled),
        })
    }
}

struct RecordingHandler {
    handled: Arc<Mutex<Vec<String>>>,
}

impl TypeHandler for RecordingHandler {
    fn handle(&mut self, schema: &Schema, id: TypeId) -> Result<(), GenerationError> {
        self.handled
            .lock()
            .unwrap()
            .push(schema.get(id).qualified_name().to_string());
        Ok(())
    }
}

/// A target whose handler fails on every declaration.
pub struct FailingTarget {
    pub elements: Vec<String>,
    pub fatal: bool,
    pub attempted: Arc<Mutex<Vec<String>>>,
}

impl FailingTarget {
    pub fn new(elements: &[&str], fatal: bool) -> Self {
        Self {
            elements: elements.iter().map(|e| e.to_string()).collect(),
            fatal,
            attempted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn attempted(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }
}

impl Target for FailingTarget {
    fn name(&self) -> &str {
        "failing"
    }

    fn elements(&self) -> &[String] {
        &self.elements
    }

    fn new_handler(
        &self,
        _schema: &Schema,
        _fs: &dyn Filesystem,
        _logger: &dyn Logger,
    ) -> Box<dyn TypeHandler> {
        Box::new(FailingHandler {
            fatal: self.fatal,
            attempted: Arc::clone(&self.attempted),
        })
    }
}

struct FailingHandler {
    fatal: bool,
    attempted: Arc<Mutex<Vec<String>>>,
}

impl TypeHandler for FailingHandler {
    fn handle(&mut self, schema: &Schema, id: TypeId) -> Result<(), GenerationError> {
        let name = schema.get(id).qualified_name().to_string();
        self.attempted.lock().unwrap().push(name.clone());
        if self.fatal {
            Err(GenerationError::Fatal(format!("cannot emit {name}")))
        } else {
            Err(GenerationError::Recoverable(format!("cannot emit {name}")))
        }
    }
}
