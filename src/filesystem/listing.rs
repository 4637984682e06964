use std::fmt;

use derive_more::Deref;

use crate::filesystem::name::SEPARATOR;
use crate::filesystem::node::NodeKind;

/// One line of `ls` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub kind: NodeKind,
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.kind == NodeKind::Directory {
            write!(f, "{SEPARATOR}")?;
        }
        Ok(())
    }
}

/// Ordered result of listing a directory or naming a single file.
///
/// Displays as one entry per line, each terminated by a newline. An empty
/// listing displays as nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct Listing(Vec<ListEntry>);

impl FromIterator<ListEntry> for Listing {
    fn from_iter<I: IntoIterator<Item = ListEntry>>(iter: I) -> Self {
        Listing(iter.into_iter().collect())
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.0 {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
