use derive_more::Display;

use crate::filesystem::name::ROOT_DIR;

/// Represents the type of a filesystem node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeKind {
    #[display("root")]
    Root,
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
}

impl NodeKind {
    /// Root and directories can hold children, files never do.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Directory)
    }
}

/// Payload stored in every arena slot of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    kind: NodeKind,
}

impl Entry {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn root() -> Self {
        Self::new(ROOT_DIR, NodeKind::Root)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }
}
