//! View-model for a loaded document
//!
//! Owns the parsed tree, the file it came from and the current selection.
//! Loading and saving go through synchronous `std::fs`; failures are
//! reported to the caller and mirrored into the `LastError` property.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::node::{self, TreeNodeViewModel};
use crate::config::Config;
use crate::file_types::DocumentFormat;
use crate::parsers::{self, ParseError};
use crate::reactive::{
    Action, DeclarationError, Declarations, Describe, Predicate, Property, PropertyKey, Reactor,
    ViewModel, ViewModelExt,
};
use crate::serializers::{self, SerializeError};
use crate::tree::{NodePath, TreeNode};

pub const SELECT_FILE: &str = "SelectFile";
pub const SAVE: &str = "Save";
pub const SAVE_AS: &str = "SaveAs";
pub const CLOSE: &str = "Close";
pub const SELECT_NODE: &str = "SelectNode";
pub const EDIT_SELECTED: &str = "EditSelected";
pub const COMMIT_EDIT: &str = node::COMMIT_EDIT;
pub const CANCEL_EDIT: &str = node::CANCEL_EDIT;

/// Title shown when no document is loaded
const UNTITLED: &str = "jxview";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported document type: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error("no document is loaded")]
    NoDocument,
    #[error("no node is selected")]
    NoSelection,
    #[error("no node at '{0}'")]
    InvalidPath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    HasChanges,
    Root,
    FilePath,
    Format,
    SelectedFileText,
    SelectedPath,
    LastError,
    /// Derived from `Root`
    NodeCount,
    /// Derived from `SelectedFileText` and `HasChanges`
    Title,
}

impl PropertyKey for DocumentKey {
    const HAS_CHANGES: Self = DocumentKey::HasChanges;

    fn name(self) -> &'static str {
        match self {
            DocumentKey::HasChanges => "HasChanges",
            DocumentKey::Root => "Root",
            DocumentKey::FilePath => "FilePath",
            DocumentKey::Format => "Format",
            DocumentKey::SelectedFileText => "SelectedFileText",
            DocumentKey::SelectedPath => "SelectedPath",
            DocumentKey::LastError => "LastError",
            DocumentKey::NodeCount => "NodeCount",
            DocumentKey::Title => "Title",
        }
    }
}

#[derive(Debug)]
pub struct DocumentViewModel {
    reactor: Reactor<Self>,
    config: Config,
    root: Property<Option<TreeNode>>,
    file_path: Property<Option<PathBuf>>,
    format: Property<Option<DocumentFormat>>,
    selected_file_text: Property<String>,
    selected_path: Property<NodePath>,
    last_error: Property<Option<String>>,
    selection: Option<TreeNodeViewModel>,
}

impl ViewModel for DocumentViewModel {
    type Key = DocumentKey;
    /// File paths for file commands, replacement text for `CommitEdit`,
    /// name paths for `SelectNode`
    type Param = str;

    fn declare(declarations: &mut Declarations<Self>) {
        declarations
            .depends_on(DocumentKey::NodeCount, [DocumentKey::Root])
            .depends_on(
                DocumentKey::Title,
                [DocumentKey::SelectedFileText, DocumentKey::HasChanges],
            )
            .method_depends_on(
                "refresh_selection",
                Self::refresh_selection,
                [DocumentKey::Root, DocumentKey::SelectedPath],
            )
            .command(SELECT_FILE, Action::WithParameter(Self::select_file))
            .command(SAVE, Action::Plain(Self::save_command))
            .can_execute(SAVE, Predicate::Plain(Self::can_save))
            .command(SAVE_AS, Action::WithParameter(Self::save_as_command))
            .can_execute(SAVE_AS, Predicate::Plain(Self::can_use_document))
            .command(CLOSE, Action::Plain(Self::close_command))
            .can_execute(CLOSE, Predicate::Plain(Self::can_use_document))
            .command(SELECT_NODE, Action::WithParameter(Self::select_node_command))
            .can_execute(SELECT_NODE, Predicate::Plain(Self::can_use_document))
            .command(EDIT_SELECTED, Action::Plain(Self::edit_selected))
            .can_execute(EDIT_SELECTED, Predicate::Plain(Self::can_edit_selected))
            .command(COMMIT_EDIT, Action::WithParameter(Self::commit_edit))
            .can_execute(COMMIT_EDIT, Predicate::WithParameter(Self::can_commit_edit))
            .command(CANCEL_EDIT, Action::Plain(Self::cancel_edit))
            .can_execute(CANCEL_EDIT, Predicate::Plain(Self::can_cancel_edit));
    }

    fn reactor(&self) -> &Reactor<Self> {
        &self.reactor
    }

    fn reactor_mut(&mut self) -> &mut Reactor<Self> {
        &mut self.reactor
    }
}

impl DocumentViewModel {
    pub fn new(config: Config) -> Result<Self, DeclarationError> {
        Ok(Self {
            reactor: Reactor::new()?,
            config,
            root: Property::new(),
            file_path: Property::new(),
            format: Property::new(),
            selected_file_text: Property::new(),
            selected_path: Property::new(),
            last_error: Property::new(),
            selection: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.get().and_then(Option::as_ref)
    }

    pub fn is_loaded(&self) -> bool {
        self.root().is_some()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.get().and_then(|path| path.as_deref())
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        self.format.get().copied().flatten()
    }

    /// `"{path} ({lines} Lines)"` for the loaded file, empty otherwise
    pub fn selected_file_text(&self) -> &str {
        self.selected_file_text
            .get()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn selected_path(&self) -> NodePath {
        self.selected_path.get_or_default()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.get().and_then(|error| error.as_deref())
    }

    pub fn node_count(&self) -> usize {
        self.root().map_or(0, TreeNode::count)
    }

    /// Window title: the file text, marked with `*` while there are unsaved
    /// changes
    pub fn title(&self) -> String {
        let text = match self.selected_file_text() {
            "" => UNTITLED,
            text => text,
        };
        if self.has_changes() {
            format!("{text} *")
        } else {
            text.to_string()
        }
    }

    /// View-model of the selected node
    pub fn selection(&self) -> Option<&TreeNodeViewModel> {
        self.selection.as_ref()
    }

    pub fn selection_mut(&mut self) -> Option<&mut TreeNodeViewModel> {
        self.selection.as_mut()
    }

    /// Load the document at `path`.
    ///
    /// On failure the current tree stays installed and the error is stored
    /// in `LastError`.
    pub fn load(&mut self, path: &Path) -> Result<(), DocumentError> {
        let (root, format, line_count) = match read_document(path, &self.config) {
            Ok(document) => document,
            Err(e) => return Err(self.fail(e)),
        };

        self.without_dependency_refresh(|vm| {
            vm.set(
                DocumentKey::FilePath,
                |vm| &mut vm.file_path,
                Some(path.to_path_buf()),
            );
            vm.set(DocumentKey::Format, |vm| &mut vm.format, Some(format));
            vm.set(
                DocumentKey::SelectedPath,
                |vm| &mut vm.selected_path,
                NodePath::root(),
            );
            vm.set(DocumentKey::Root, |vm| &mut vm.root, Some(root));
        });
        self.refresh_dependents(DocumentKey::Root);

        self.set(
            DocumentKey::SelectedFileText,
            |vm| &mut vm.selected_file_text,
            file_text(path, line_count),
        );
        self.set(DocumentKey::LastError, |vm| &mut vm.last_error, None);
        self.mark_saved();

        tracing::info!(
            "Loaded {} as {} ({} nodes)",
            path.display(),
            format,
            self.node_count()
        );
        Ok(())
    }

    /// Write the tree back to the file it was loaded from
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let target = self.file_path().map(Path::to_path_buf).zip(self.format());
        let Some((path, format)) = target else {
            return Err(self.fail(DocumentError::NoDocument));
        };
        self.write_to(&path, format)
    }

    /// Write the tree to `path`, in the format its extension names, and
    /// continue with that file
    pub fn save_as(&mut self, path: &Path) -> Result<(), DocumentError> {
        let Some(format) = DocumentFormat::from_path(path) else {
            return Err(self.fail(DocumentError::UnsupportedFormat(path.to_path_buf())));
        };
        self.write_to(path, format)
    }

    /// Serialize the current tree as `format`
    pub fn render(&self, format: DocumentFormat) -> Result<String, DocumentError> {
        let root = self.root().ok_or(DocumentError::NoDocument)?;
        Ok(serializers::serialize(root, format, &self.config.serializer)?)
    }

    /// Drop the loaded document
    pub fn close(&mut self) {
        self.without_dependency_refresh(|vm| {
            vm.set(DocumentKey::FilePath, |vm| &mut vm.file_path, None);
            vm.set(DocumentKey::Format, |vm| &mut vm.format, None);
            vm.set(
                DocumentKey::SelectedPath,
                |vm| &mut vm.selected_path,
                NodePath::root(),
            );
            vm.set(DocumentKey::Root, |vm| &mut vm.root, None);
        });
        self.refresh_dependents(DocumentKey::Root);

        self.set(
            DocumentKey::SelectedFileText,
            |vm| &mut vm.selected_file_text,
            String::new(),
        );
        self.set(DocumentKey::LastError, |vm| &mut vm.last_error, None);
        self.mark_saved();
    }

    /// Select the node at a slash-separated name path such as `a/[0]/b`
    pub fn select(&mut self, names: &str) -> Result<(), DocumentError> {
        let root = self.root().ok_or(DocumentError::NoDocument)?;
        let path = root
            .find(names)
            .ok_or_else(|| DocumentError::InvalidPath(names.to_string()))?;
        self.select_path(path)
    }

    pub fn select_path(&mut self, path: NodePath) -> Result<(), DocumentError> {
        let root = self.root().ok_or(DocumentError::NoDocument)?;
        if root.node_at(&path).is_none() {
            return Err(DocumentError::InvalidPath(path.to_string()));
        }
        self.set_view_state(DocumentKey::SelectedPath, |vm| &mut vm.selected_path, path);
        Ok(())
    }

    /// Replace the node at `path`. Returns whether the tree changed; an
    /// identical node leaves the document untouched.
    pub fn replace_node(
        &mut self,
        path: &NodePath,
        node: TreeNode,
    ) -> Result<bool, DocumentError> {
        let root = self.root().ok_or(DocumentError::NoDocument)?;
        match root.node_at(path) {
            None => return Err(DocumentError::InvalidPath(path.to_string())),
            Some(current) if *current == node => return Ok(false),
            Some(_) => {}
        }
        self.modify(
            DocumentKey::Root,
            |vm| &mut vm.root,
            |root| {
                if let Some(target) = root.as_mut().and_then(|root| root.node_at_mut(path)) {
                    *target = node;
                }
            },
        );
        Ok(true)
    }

    fn write_to(&mut self, path: &Path, format: DocumentFormat) -> Result<(), DocumentError> {
        let line_count = match self.render(format).and_then(|text| write_text(path, &text)) {
            Ok(line_count) => line_count,
            Err(e) => return Err(self.fail(e)),
        };

        self.set(
            DocumentKey::FilePath,
            |vm| &mut vm.file_path,
            Some(path.to_path_buf()),
        );
        self.set(DocumentKey::Format, |vm| &mut vm.format, Some(format));
        self.set(
            DocumentKey::SelectedFileText,
            |vm| &mut vm.selected_file_text,
            file_text(path, line_count),
        );
        self.set(DocumentKey::LastError, |vm| &mut vm.last_error, None);
        self.mark_saved();

        tracing::info!("Saved {} as {}", path.display(), format);
        Ok(())
    }

    /// Write a property that describes the view rather than the document,
    /// leaving the has-changes flag as it was
    fn set_view_state<T, F>(&mut self, key: DocumentKey, field: F, value: T) -> bool
    where
        T: PartialEq + Describe,
        F: FnOnce(&mut Self) -> &mut Property<T>,
    {
        let had_changes = self.has_changes();
        let changed = self.set(key, field, value);
        if changed && !had_changes {
            self.mark_saved();
        }
        changed
    }

    /// Record `error` in `LastError` and hand it back
    fn fail(&mut self, error: DocumentError) -> DocumentError {
        tracing::warn!("{error}");
        self.set_view_state(
            DocumentKey::LastError,
            |vm| &mut vm.last_error,
            Some(error.to_string()),
        );
        error
    }

    fn refresh_selection(&mut self) -> anyhow::Result<()> {
        self.selection = None;
        let Some(root) = self.root() else {
            return Ok(());
        };
        let path = self.selected_path();
        let node = root
            .node_at(&path)
            .ok_or_else(|| DocumentError::InvalidPath(path.to_string()))?;
        let selection = TreeNodeViewModel::new(node, path)?;
        self.selection = Some(selection);
        Ok(())
    }

    fn select_file(&mut self, path: Option<&str>) -> anyhow::Result<()> {
        let Some(path) = path.filter(|path| !path.is_empty()) else {
            tracing::debug!("No file selected");
            return Ok(());
        };
        Ok(self.load(Path::new(path))?)
    }

    fn save_command(&mut self) -> anyhow::Result<()> {
        Ok(self.save()?)
    }

    fn save_as_command(&mut self, path: Option<&str>) -> anyhow::Result<()> {
        let Some(path) = path.filter(|path| !path.is_empty()) else {
            tracing::debug!("No target file selected");
            return Ok(());
        };
        Ok(self.save_as(Path::new(path))?)
    }

    fn close_command(&mut self) -> anyhow::Result<()> {
        self.close();
        Ok(())
    }

    fn select_node_command(&mut self, names: Option<&str>) -> anyhow::Result<()> {
        Ok(self.select(names.unwrap_or_default())?)
    }

    fn edit_selected(&mut self) -> anyhow::Result<()> {
        let selection = self.selection.as_mut().ok_or(DocumentError::NoSelection)?;
        selection.invoke(node::BEGIN_EDIT, None)
    }

    fn commit_edit(&mut self, text: Option<&str>) -> anyhow::Result<()> {
        let selection = self.selection.as_mut().ok_or(DocumentError::NoSelection)?;
        selection.invoke(node::COMMIT_EDIT, text)?;
        let path = selection.path().clone();
        let mut edited = selection.to_node();
        edited.clear_editing();
        self.replace_node(&path, edited)?;
        Ok(())
    }

    fn cancel_edit(&mut self) -> anyhow::Result<()> {
        let selection = self.selection.as_mut().ok_or(DocumentError::NoSelection)?;
        selection.invoke(node::CANCEL_EDIT, None)
    }

    fn can_save(&self) -> anyhow::Result<bool> {
        Ok(self.has_changes() && self.is_loaded() && self.file_path().is_some())
    }

    fn can_use_document(&self) -> anyhow::Result<bool> {
        Ok(self.is_loaded())
    }

    fn can_edit_selected(&self) -> anyhow::Result<bool> {
        Ok(self
            .selection
            .as_ref()
            .is_some_and(|selection| selection.can_invoke(node::BEGIN_EDIT, None)))
    }

    fn can_commit_edit(&self, text: Option<&str>) -> anyhow::Result<bool> {
        Ok(self
            .selection
            .as_ref()
            .is_some_and(|selection| selection.can_invoke(node::COMMIT_EDIT, text)))
    }

    fn can_cancel_edit(&self) -> anyhow::Result<bool> {
        Ok(self
            .selection
            .as_ref()
            .is_some_and(TreeNodeViewModel::is_editing))
    }
}

/// Read and parse `path`, returning the tree, its format and the file's line
/// count
fn read_document(
    path: &Path,
    config: &Config,
) -> Result<(TreeNode, DocumentFormat, usize), DocumentError> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| DocumentError::UnsupportedFormat(path.to_path_buf()))?;
    let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root = parsers::parser_for(format, &config.xml).parse(&content)?;
    Ok((root, format, content.lines().count()))
}

/// Write `text` plus a final newline, returning the number of lines written
fn write_text(path: &Path, text: &str) -> Result<usize, DocumentError> {
    fs::write(path, format!("{text}\n")).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().count())
}

fn file_text(path: &Path, line_count: usize) -> String {
    format!("{} ({} Lines)", path.display(), group_thousands(line_count))
}

/// `1234567` → `1,234,567`
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
