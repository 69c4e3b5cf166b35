//! View-model for a single tree node
//!
//! Presents one [`TreeNode`] for display and inline editing. Edits live in
//! `EditText` until committed; [`TreeNodeViewModel::to_node`] hands the
//! result back to the owning document.

use anyhow::bail;

use crate::reactive::{
    Action, DeclarationError, Declarations, Predicate, Property, PropertyKey, Reactor, ViewModel,
    ViewModelExt,
};
use crate::tree::{NodePath, TreeNode};

pub const BEGIN_EDIT: &str = "BeginEdit";
pub const COMMIT_EDIT: &str = "CommitEdit";
pub const CANCEL_EDIT: &str = "CancelEdit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    HasChanges,
    Name,
    Value,
    IsEditing,
    EditText,
    ValidationError,
    /// Derived from `Name` and `Value`
    NameValueString,
}

impl PropertyKey for NodeKey {
    const HAS_CHANGES: Self = NodeKey::HasChanges;

    fn name(self) -> &'static str {
        match self {
            NodeKey::HasChanges => "HasChanges",
            NodeKey::Name => "Name",
            NodeKey::Value => "Value",
            NodeKey::IsEditing => "IsEditing",
            NodeKey::EditText => "EditText",
            NodeKey::ValidationError => "ValidationError",
            NodeKey::NameValueString => "NameValueString",
        }
    }
}

#[derive(Debug)]
pub struct TreeNodeViewModel {
    reactor: Reactor<Self>,
    path: NodePath,
    children: Vec<TreeNode>,
    name: Property<String>,
    value: Property<Option<String>>,
    is_editing: Property<bool>,
    edit_text: Property<String>,
    validation_error: Property<Option<String>>,
}

impl ViewModel for TreeNodeViewModel {
    type Key = NodeKey;
    type Param = str;

    fn declare(declarations: &mut Declarations<Self>) {
        declarations
            .depends_on(NodeKey::NameValueString, [NodeKey::Name, NodeKey::Value])
            .method_depends_on(
                "validate",
                Self::validate,
                [NodeKey::EditText, NodeKey::IsEditing],
            )
            .command(BEGIN_EDIT, Action::Plain(Self::begin_edit))
            .can_execute(BEGIN_EDIT, Predicate::Plain(Self::can_begin_edit))
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

impl TreeNodeViewModel {
    /// View-model for `node`, found at `path` in its document
    pub fn new(node: &TreeNode, path: NodePath) -> Result<Self, DeclarationError> {
        let mut view_model = Self {
            reactor: Reactor::new()?,
            path,
            children: node.children.clone(),
            name: Property::new(),
            value: Property::new(),
            is_editing: Property::new(),
            edit_text: Property::new(),
            validation_error: Property::new(),
        };

        view_model.without_dependency_refresh(|vm| {
            vm.set(NodeKey::Name, |vm| &mut vm.name, node.name.clone());
            vm.set(NodeKey::Value, |vm| &mut vm.value, node.value.clone());
            vm.set(
                NodeKey::EditText,
                |vm| &mut vm.edit_text,
                node.value.clone().unwrap_or_default(),
            );
            vm.set(NodeKey::IsEditing, |vm| &mut vm.is_editing, node.editing);
        });
        view_model.mark_saved();

        Ok(view_model)
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.name.get().map(String::as_str).unwrap_or_default()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.get().and_then(|value| value.as_deref())
    }

    pub fn is_leaf(&self) -> bool {
        self.value().is_some()
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing.get_or_default()
    }

    pub fn edit_text(&self) -> &str {
        self.edit_text.get().map(String::as_str).unwrap_or_default()
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.get().and_then(|error| error.as_deref())
    }

    /// `"name": value`
    pub fn name_value_string(&self) -> String {
        format!("\"{}\": {}", self.name(), self.value().unwrap_or_default())
    }

    /// Replace the pending edit text
    pub fn set_edit_text(&mut self, text: impl Into<String>) -> bool {
        self.set(NodeKey::EditText, |vm| &mut vm.edit_text, text.into())
    }

    /// The node as it stands, committed value included
    pub fn to_node(&self) -> TreeNode {
        TreeNode {
            name: self.name().to_string(),
            value: self.value().map(str::to_string),
            children: self.children.clone(),
            editing: self.is_editing(),
        }
    }

    fn validate(&mut self) -> anyhow::Result<()> {
        let error = if self.is_editing() {
            validation_message(self.is_leaf(), self.edit_text())
        } else {
            None
        };
        self.set(NodeKey::ValidationError, |vm| &mut vm.validation_error, error);
        Ok(())
    }

    fn begin_edit(&mut self) -> anyhow::Result<()> {
        if !self.is_leaf() {
            bail!("'{}' is a container and has no value to edit", self.name());
        }
        let current = self.value().unwrap_or_default().to_string();
        self.set_edit_text(current);
        self.set(NodeKey::IsEditing, |vm| &mut vm.is_editing, true);
        Ok(())
    }

    fn can_begin_edit(&self) -> anyhow::Result<bool> {
        Ok(self.is_leaf() && !self.is_editing())
    }

    fn commit_edit(&mut self, text: Option<&str>) -> anyhow::Result<()> {
        if !self.is_editing() {
            bail!("'{}' is not being edited", self.name());
        }
        if let Some(text) = text {
            self.set_edit_text(text);
        }
        if let Some(error) = self.validation_error() {
            bail!("cannot commit '{}': {}", self.name(), error);
        }

        let committed = self.edit_text().to_string();
        self.set(NodeKey::Value, |vm| &mut vm.value, Some(committed));
        self.set(NodeKey::IsEditing, |vm| &mut vm.is_editing, false);
        Ok(())
    }

    fn can_commit_edit(&self, text: Option<&str>) -> anyhow::Result<bool> {
        if !self.is_editing() {
            return Ok(false);
        }
        let text = text.unwrap_or(self.edit_text());
        Ok(validation_message(self.is_leaf(), text).is_none())
    }

    fn can_cancel_edit(&self) -> anyhow::Result<bool> {
        Ok(self.is_editing())
    }

    fn cancel_edit(&mut self) -> anyhow::Result<()> {
        let current = self.value().unwrap_or_default().to_string();
        self.set(NodeKey::IsEditing, |vm| &mut vm.is_editing, false);
        self.set_edit_text(current);
        Ok(())
    }
}

/// Why `text` cannot become the node's value, if it cannot
fn validation_message(is_leaf: bool, text: &str) -> Option<String> {
    if !is_leaf {
        return Some("containers have no value".to_string());
    }
    // XML 1.0 has no encoding for these
    text.chars()
        .find(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
        .map(|c| format!("control character U+{:04X} cannot be stored", c as u32))
}
