use indextree::{Arena, NodeId};
use snafu::{OptionExt, Snafu, ensure};
use tracing::debug;

use crate::filesystem::listing::{ListEntry, Listing};
use crate::filesystem::name::{self, CURRENT_DIR, PARENT_DIR, ROOT_DIR};
use crate::filesystem::node::{Entry, NodeKind};

/// In-memory directory tree with a current-directory cursor.
///
/// Every node lives in an [`Arena`] that maintains the parent, first-child and
/// sibling links. Children of a directory are kept in strictly ascending
/// byte-wise order of their names, so listings never need sorting.
///
/// Names are always single path segments and are resolved against the current
/// directory only.
#[derive(Debug)]
pub struct FileSystem {
    arena: Arena<Entry>,
    root: NodeId,
    current: NodeId,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem {
    /// Creates a filesystem holding only the root directory, which is also the
    /// current directory.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(Entry::root());
        debug!("Created filesystem root");

        Self {
            arena,
            root,
            current: root,
        }
    }

    /// Creates an empty file in the current directory.
    ///
    /// Reserved names and names that already exist (as a file or a directory)
    /// are accepted without creating anything.
    pub fn create_file(&mut self, name: &str) -> Result<(), FilesystemError> {
        if name::is_reserved(name) || self.resolve(name).is_some() {
            debug!("Skipping creation of file '{}': name already in use", name);
            return Ok(());
        }
        ensure!(!name::is_malformed(name), InvalidNameSnafu { name });

        self.insert_sorted(name, NodeKind::File);
        Ok(())
    }

    /// Creates an empty directory in the current directory.
    pub fn create_directory(&mut self, name: &str) -> Result<(), FilesystemError> {
        ensure!(self.resolve(name).is_none(), AlreadyExistsSnafu { name });
        ensure!(!name::is_reserved(name), ReservedNameSnafu { name });
        ensure!(!name::is_malformed(name), InvalidNameSnafu { name });

        self.insert_sorted(name, NodeKind::Directory);
        Ok(())
    }

    /// Moves the current directory to `name`.
    ///
    /// `.` and the empty string stay put, `..` goes up one level (staying at the
    /// root when already there) and `/` jumps to the root.
    pub fn change_directory(&mut self, name: &str) -> Result<(), FilesystemError> {
        let target = self.locate(name)?;
        ensure!(
            self.entry(target).kind().is_container(),
            NotADirectorySnafu { name }
        );

        self.current = target;
        debug!("Changed directory to '{}'", self.entry(target).name());
        Ok(())
    }

    /// Lists the entry named by `name`, resolved the same way as
    /// [`change_directory`](Self::change_directory).
    ///
    /// A file lists as its own name; a directory lists its children in order.
    pub fn list(&self, name: &str) -> Result<Listing, FilesystemError> {
        let target = self.locate(name)?;
        let entry = self.entry(target);

        if !entry.kind().is_container() {
            return Ok(std::iter::once(ListEntry {
                name: entry.name().to_string(),
                kind: entry.kind(),
            })
            .collect());
        }

        Ok(self
            .children(target)
            .map(|child| {
                let entry = self.entry(child);
                ListEntry {
                    name: entry.name().to_string(),
                    kind: entry.kind(),
                }
            })
            .collect())
    }

    /// Absolute path of the current directory, e.g. `/a/b`. The root is `/`.
    pub fn working_directory(&self) -> String {
        let segments: Vec<&str> = self
            .current
            .ancestors(&self.arena)
            .filter(|&node| node != self.root)
            .map(|node| self.entry(node).name())
            .collect();

        let mut path = String::new();
        for segment in segments.iter().rev() {
            path.push(name::SEPARATOR);
            path.push_str(segment);
        }
        if path.is_empty() {
            path.push(name::SEPARATOR);
        }
        path
    }

    /// Removes the entry `name` from the current directory. Directories are
    /// removed together with everything below them.
    ///
    /// Only direct children of the current directory can be named, so the
    /// current directory and its ancestors always survive.
    ///
    /// Returns the number of nodes destroyed.
    pub fn remove(&mut self, name: &str) -> Result<usize, FilesystemError> {
        ensure!(!name::is_reserved(name), ReservedNameSnafu { name });
        ensure!(!name::is_malformed(name), InvalidNameSnafu { name });
        let target = self.resolve(name).context(NotFoundSnafu { name })?;

        let destroyed = self.destroy_subtree(target);
        debug!("Removed '{}' ({} nodes)", name, destroyed);
        Ok(destroyed)
    }

    /// Tears the whole tree down, root included, and returns the number of
    /// nodes destroyed.
    pub fn destroy(mut self) -> usize {
        let destroyed = self.destroy_subtree(self.root);
        debug!("Destroyed filesystem ({} nodes)", destroyed);
        destroyed
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.root.descendants(&self.arena).count()
    }

    pub fn entry(&self, node: NodeId) -> &Entry {
        self.arena[node].get()
    }

    /// Children of `node` in ascending name order.
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.arena)
    }

    /// Finds a direct child of the current directory named exactly `name`.
    pub fn resolve(&self, name: &str) -> Option<NodeId> {
        self.children(self.current)
            .find(|&child| self.entry(child).name() == name)
    }

    /// Maps a navigation argument to a node, honouring the reserved names.
    fn locate(&self, name: &str) -> Result<NodeId, FilesystemError> {
        match name {
            "" | CURRENT_DIR => Ok(self.current),
            PARENT_DIR => Ok(self.parent_of(self.current)),
            ROOT_DIR => Ok(self.root),
            _ => self.resolve(name).context(NotFoundSnafu { name }),
        }
    }

    /// The root is its own parent.
    fn parent_of(&self, node: NodeId) -> NodeId {
        self.arena[node].parent().unwrap_or(self.root)
    }

    fn insert_sorted(&mut self, name: &str, kind: NodeKind) -> NodeId {
        let successor = self
            .children(self.current)
            .find(|&child| self.entry(child).name() >= name);

        let node = self.arena.new_node(Entry::new(name, kind));
        match successor {
            Some(successor) => successor.insert_before(node, &mut self.arena),
            None => self.current.append(node, &mut self.arena),
        }

        debug!(
            "Created {} '{}' in '{}'",
            kind,
            name,
            self.entry(self.current).name()
        );
        node
    }

    /// Post-order teardown: walking the pre-order list backwards visits
    /// children before their parent, so each `remove` call only ever detaches
    /// a leaf from its sibling list.
    fn destroy_subtree(&mut self, node: NodeId) -> usize {
        let doomed: Vec<NodeId> = node.descendants(&self.arena).collect();
        for &node in doomed.iter().rev() {
            node.remove(&mut self.arena);
        }
        doomed.len()
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum FilesystemError {
    #[snafu(display("'{}' is not a valid name", name))]
    InvalidName { name: String },
    #[snafu(display("'{}' is a reserved name", name))]
    ReservedName { name: String },
    #[snafu(display("'{}' already exists", name))]
    AlreadyExists { name: String },
    #[snafu(display("'{}' does not exist", name))]
    NotFound { name: String },
    #[snafu(display("'{}' is not a directory", name))]
    NotADirectory { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn names(fs: &FileSystem, node: NodeId) -> Vec<String> {
        fs.children(node)
            .map(|child| fs.entry(child).name().to_string())
            .collect()
    }

    fn assert_sorted(fs: &FileSystem, node: NodeId) {
        let children = names(fs, node);
        for pair in children.windows(2) {
            assert!(pair[0] < pair[1], "{:?} is not sorted", children);
        }
        for child in fs.children(node) {
            assert_sorted(fs, child);
        }
    }

    #[fixture]
    fn nested() -> FileSystem {
        let mut fs = FileSystem::new();
        fs.create_directory("a").unwrap();
        fs.change_directory("a").unwrap();
        fs.create_directory("b").unwrap();
        fs.change_directory("b").unwrap();
        fs.create_directory("c").unwrap();
        fs.create_file("leaf").unwrap();
        fs.change_directory("/").unwrap();
        fs
    }

    #[test]
    fn new_filesystem_is_empty_root() {
        let fs = FileSystem::new();
        assert_eq!(fs.current, fs.root);
        assert_eq!(fs.node_count(), 1);
        assert_eq!(fs.working_directory(), "/");
        assert!(fs.list(".").unwrap().is_empty());
    }

    #[test]
    fn creations_keep_siblings_sorted() {
        let mut fs = FileSystem::new();
        for name in ["m", "b", "z", "a", "mm", "B", "_", "0"] {
            fs.create_file(name).unwrap();
        }
        fs.create_directory("k").unwrap();
        fs.change_directory("k").unwrap();
        for name in ["y", "x", "w"] {
            fs.create_directory(name).unwrap();
        }

        assert_eq!(
            names(&fs, fs.root),
            vec!["0", "B", "_", "a", "b", "k", "m", "mm", "z"]
        );
        assert_sorted(&fs, fs.root);
    }

    #[test]
    fn sibling_links_follow_sorted_order() {
        let mut fs = FileSystem::new();
        for name in ["c", "a", "b"] {
            fs.create_file(name).unwrap();
        }

        let first = fs.arena[fs.root].first_child().unwrap();
        let second = fs.arena[first].next_sibling().unwrap();
        let third = fs.arena[second].next_sibling().unwrap();
        assert_eq!(fs.entry(first).name(), "a");
        assert_eq!(fs.entry(second).name(), "b");
        assert_eq!(fs.entry(third).name(), "c");
        assert_eq!(fs.arena[third].previous_sibling(), Some(second));
        assert!(fs.arena[third].next_sibling().is_none());
        assert!(fs.arena[first].previous_sibling().is_none());
    }

    #[test]
    fn creating_file_twice_is_idempotent() {
        let mut fs = FileSystem::new();
        assert!(fs.create_file("x").is_ok());
        assert!(fs.create_file("x").is_ok());
        assert_eq!(names(&fs, fs.root), vec!["x"]);
    }

    #[test]
    fn creating_file_over_directory_is_a_silent_no_op() {
        let mut fs = FileSystem::new();
        fs.create_directory("x").unwrap();
        assert!(fs.create_file("x").is_ok());
        assert_eq!(fs.node_count(), 2);
        assert_eq!(fs.entry(fs.resolve("x").unwrap()).kind(), NodeKind::Directory);
    }

    #[test]
    fn creating_directory_twice_fails() {
        let mut fs = FileSystem::new();
        assert!(fs.create_directory("x").is_ok());
        assert_eq!(
            fs.create_directory("x"),
            Err(FilesystemError::AlreadyExists { name: "x".into() })
        );
        assert_eq!(names(&fs, fs.root), vec!["x"]);
    }

    #[test]
    fn creating_directory_over_file_fails() {
        let mut fs = FileSystem::new();
        fs.create_file("x").unwrap();
        assert!(matches!(
            fs.create_directory("x"),
            Err(FilesystemError::AlreadyExists { .. })
        ));
    }

    #[rstest]
    #[case(".")]
    #[case("..")]
    #[case("/")]
    fn reserved_names_are_accepted_for_files_only(#[case] name: &str) {
        let mut fs = FileSystem::new();
        assert!(fs.create_file(name).is_ok());
        assert_eq!(
            fs.create_directory(name),
            Err(FilesystemError::ReservedName { name: name.into() })
        );
        assert_eq!(fs.node_count(), 1);
    }

    #[rstest]
    #[case("")]
    #[case("a/b")]
    #[case("/a")]
    #[case("a/")]
    fn malformed_names_never_mutate(#[case] name: &str) {
        let mut fs = FileSystem::new();
        fs.create_directory("a").unwrap();

        assert!(matches!(
            fs.create_file(name),
            Err(FilesystemError::InvalidName { .. })
        ));
        assert!(matches!(
            fs.create_directory(name),
            Err(FilesystemError::InvalidName { .. })
        ));
        assert!(matches!(
            fs.remove(name),
            Err(FilesystemError::InvalidName { .. })
        ));
        assert_eq!(fs.node_count(), 2);
    }

    #[rstest]
    #[case("a/b")]
    #[case("/a")]
    fn separator_names_are_not_found_when_navigating(#[case] name: &str) {
        let mut fs = FileSystem::new();
        fs.create_directory("a").unwrap();

        assert!(matches!(
            fs.change_directory(name),
            Err(FilesystemError::NotFound { .. })
        ));
        assert!(matches!(fs.list(name), Err(FilesystemError::NotFound { .. })));
        assert_eq!(fs.current, fs.root);
    }

    #[test]
    fn parent_of_root_is_root() {
        let mut fs = FileSystem::new();
        assert!(fs.change_directory("..").is_ok());
        assert_eq!(fs.current, fs.root);
    }

    #[rstest]
    #[case(".")]
    #[case("")]
    fn current_dir_aliases_stay_put(mut nested: FileSystem, #[case] name: &str) {
        nested.change_directory("a").unwrap();
        nested.change_directory(name).unwrap();
        assert_eq!(nested.working_directory(), "/a");
    }

    #[rstest]
    fn slash_returns_to_root_from_anywhere(mut nested: FileSystem) {
        nested.change_directory("a").unwrap();
        nested.change_directory("b").unwrap();
        nested.change_directory("c").unwrap();
        nested.change_directory("/").unwrap();
        assert_eq!(nested.current, nested.root);
    }

    #[rstest]
    fn change_directory_round_trip(mut nested: FileSystem) {
        nested.change_directory("a").unwrap();
        let before = nested.current;
        nested.change_directory("b").unwrap();
        nested.change_directory("..").unwrap();
        assert_eq!(nested.current, before);
    }

    #[rstest]
    fn cannot_change_into_file(mut nested: FileSystem) {
        nested.change_directory("a").unwrap();
        nested.change_directory("b").unwrap();
        assert_eq!(
            nested.change_directory("leaf"),
            Err(FilesystemError::NotADirectory {
                name: "leaf".into()
            })
        );
        assert_eq!(nested.working_directory(), "/a/b");
    }

    #[test]
    fn change_directory_to_missing_name_fails() {
        let mut fs = FileSystem::new();
        assert_eq!(
            fs.change_directory("ghost"),
            Err(FilesystemError::NotFound {
                name: "ghost".into()
            })
        );
    }

    #[test]
    fn list_subdirectory_from_parent() {
        let mut fs = FileSystem::new();
        fs.create_directory("a").unwrap();
        fs.change_directory("a").unwrap();
        fs.create_file("b").unwrap();
        fs.change_directory("..").unwrap();

        assert_eq!(fs.list("a").unwrap().to_string(), "b\n");
    }

    #[test]
    fn list_marks_directories() {
        let mut fs = FileSystem::new();
        fs.create_file("zeta").unwrap();
        fs.create_directory("alpha").unwrap();
        fs.create_file("beta").unwrap();

        assert_eq!(fs.list("").unwrap().to_string(), "alpha/\nbeta\nzeta\n");
        assert_eq!(fs.list("/").unwrap(), fs.list(".").unwrap());
    }

    #[test]
    fn list_file_prints_its_name() {
        let mut fs = FileSystem::new();
        fs.create_file("readme").unwrap();
        assert_eq!(fs.list("readme").unwrap().to_string(), "readme\n");
    }

    #[test]
    fn list_parent_at_root_lists_root() {
        let mut fs = FileSystem::new();
        fs.create_file("x").unwrap();
        assert_eq!(fs.list("..").unwrap(), fs.list("/").unwrap());
    }

    #[rstest]
    fn list_parent_and_root_from_subdirectory(mut nested: FileSystem) {
        nested.change_directory("a").unwrap();
        nested.change_directory("b").unwrap();
        assert_eq!(nested.list("..").unwrap().to_string(), "b/\n");
        assert_eq!(nested.list("/").unwrap().to_string(), "a/\n");
        assert_eq!(nested.list(".").unwrap().to_string(), "c/\nleaf\n");
    }

    #[test]
    fn list_missing_name_fails() {
        let fs = FileSystem::new();
        assert!(matches!(fs.list("nope"), Err(FilesystemError::NotFound { .. })));
    }

    #[rstest]
    fn working_directory_walks_parents(mut nested: FileSystem) {
        nested.change_directory("a").unwrap();
        assert_eq!(nested.working_directory(), "/a");
        nested.change_directory("b").unwrap();
        assert_eq!(nested.working_directory(), "/a/b");
        nested.change_directory("c").unwrap();
        assert_eq!(nested.working_directory(), "/a/b/c");
    }

    #[rstest]
    fn removing_directory_removes_descendants(mut nested: FileSystem) {
        assert_eq!(nested.node_count(), 5);
        assert_eq!(nested.remove("a"), Ok(4));
        assert!(nested.list("/").unwrap().is_empty());
        assert_eq!(nested.node_count(), 1);
    }

    #[test]
    fn removing_relinks_siblings() {
        let mut fs = FileSystem::new();
        for name in ["a", "b", "c", "d"] {
            fs.create_file(name).unwrap();
        }

        assert_eq!(fs.remove("b"), Ok(1));
        assert_eq!(names(&fs, fs.root), vec!["a", "c", "d"]);
        assert_eq!(fs.remove("a"), Ok(1));
        assert_eq!(names(&fs, fs.root), vec!["c", "d"]);
        assert_eq!(fs.remove("d"), Ok(1));
        assert_eq!(names(&fs, fs.root), vec!["c"]);

        fs.create_file("b").unwrap();
        fs.create_file("e").unwrap();
        assert_eq!(names(&fs, fs.root), vec!["b", "c", "e"]);
    }

    #[rstest]
    #[case(".")]
    #[case("..")]
    #[case("/")]
    fn removing_reserved_names_fails(mut nested: FileSystem, #[case] name: &str) {
        assert_eq!(
            nested.remove(name),
            Err(FilesystemError::ReservedName { name: name.into() })
        );
        assert_eq!(nested.node_count(), 5);
    }

    #[test]
    fn removing_missing_name_fails() {
        let mut fs = FileSystem::new();
        assert_eq!(
            fs.remove("ghost"),
            Err(FilesystemError::NotFound {
                name: "ghost".into()
            })
        );
    }

    #[rstest]
    fn remove_only_sees_current_directory(mut nested: FileSystem) {
        nested.change_directory("a").unwrap();
        assert!(matches!(
            nested.remove("a"),
            Err(FilesystemError::NotFound { .. })
        ));
        assert_eq!(nested.working_directory(), "/a");
    }

    #[rstest]
    fn destroy_releases_every_node(nested: FileSystem) {
        assert_eq!(nested.destroy(), 5);
    }

    #[test]
    fn destroy_empty_filesystem_releases_root() {
        assert_eq!(FileSystem::new().destroy(), 1);
    }

    #[test]
    fn deep_nesting_does_not_exhaust_the_stack() {
        const DEPTH: usize = 100_000;
        let mut fs = FileSystem::new();
        for _ in 0..DEPTH {
            fs.create_directory("d").unwrap();
            fs.change_directory("d").unwrap();
        }

        let path = fs.working_directory();
        assert_eq!(path.len(), 2 * DEPTH);
        assert!(path.starts_with("/d/d/"));

        fs.change_directory("/").unwrap();
        assert_eq!(fs.remove("d"), Ok(DEPTH));
        assert_eq!(fs.node_count(), 1);
    }

    #[test]
    fn deep_tree_is_torn_down_completely() {
        const DEPTH: usize = 100_000;
        let mut fs = FileSystem::new();
        for _ in 0..DEPTH {
            fs.create_directory("d").unwrap();
            fs.change_directory("d").unwrap();
        }
        fs.create_file("leaf").unwrap();

        assert_eq!(fs.destroy(), DEPTH + 2);
    }

    #[rstest]
    fn removing_sibling_keeps_current_directory(mut nested: FileSystem) {
        nested.create_directory("z").unwrap();
        nested.change_directory("z").unwrap();
        nested.change_directory("..").unwrap();
        nested.change_directory("a").unwrap();
        nested.change_directory("..").unwrap();

        assert_eq!(nested.remove("z"), Ok(1));
        nested.change_directory("a").unwrap();
        nested.change_directory("b").unwrap();
        assert_eq!(nested.remove("c"), Ok(1));
        assert_eq!(nested.working_directory(), "/a/b");
        assert_eq!(nested.list(".").unwrap().to_string(), "leaf
");
    }

    #[test]
    fn independent_instances_do_not_share_state() {
        let mut first = FileSystem::new();
        let second = FileSystem::new();
        first.create_file("only-here").unwrap();
        assert_eq!(first.node_count(), 2);
        assert_eq!(second.node_count(), 1);
    }
}
