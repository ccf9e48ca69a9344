//! An area (i.e. a room) that groups outputs.

use std::fmt;
use std::sync::Arc;

use crate::n4::output::Output;

/// A named room or zone. Membership is append-only during the snapshot
/// parse and read-only afterwards; the whole area is replaced wholesale on
/// the next parse.
pub struct Area {
    name: String,
    uid: String,
    parent: Option<String>,
    outputs: Vec<Arc<Output>>,
}

impl Area {
    pub(crate) fn new(name: &str, uid: &str, parent: Option<String>) -> Self {
        Self {
            name: name.to_owned(),
            uid: uid.to_owned(),
            parent,
            outputs: Vec::new(),
        }
    }

    /// Only used during the initial parse.
    pub(crate) fn add_output(&mut self, output: Arc<Output>) {
        self.outputs.push(output);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn outputs(&self) -> &[Arc<Output>] {
        &self.outputs
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Area name: \"{}\", id: {}", self.name, self.uid)
    }
}
