// Project-wide structure graph
//
// Entities are stored per variant in identifier order and referenced by
// `EntityId`. The graph has no public mutators: it is assembled by the
// builder (or re-derived from a structure document) and read-only after that.

use crate::analysis::sanitize::TokenMap;
use crate::parser::{
    ClassKind, EntityId, FunctionForm, FunctionKind, ImportKind, ImportedName, Language, Location,
    ParameterKind, Visibility,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a node was extracted from the project or synthesized for an unresolved reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Project,
    External,
}

/// A module node: one source file, or an external reference stub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub id: EntityId,
    /// Module name, or the reference string for external stubs
    pub name: String,
    pub origin: Origin,
    pub language: Option<Language>,
    pub location: Option<Location>,
    pub docstring: Option<String>,
    pub line_count: usize,
    pub classes: Vec<EntityId>,
    /// Top-level functions
    pub functions: Vec<EntityId>,
    pub imports: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
}

impl ModuleNode {
    pub fn is_external(&self) -> bool {
        self.origin == Origin::External
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassNode {
    pub id: EntityId,
    pub name: String,
    pub qualified_name: String,
    pub kind: ClassKind,
    pub origin: Origin,
    /// Owning module; `None` for external base stubs
    pub module: Option<EntityId>,
    pub location: Option<Location>,
    pub docstring: Option<String>,
    /// Base names as written in the source
    pub bases: Vec<String>,
    pub decorators: Vec<String>,
    pub attributes: Vec<EntityId>,
    pub methods: Vec<EntityId>,
}

impl ClassNode {
    pub fn is_external(&self) -> bool {
        self.origin == Origin::External
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub id: EntityId,
    pub name: String,
    pub kind: FunctionKind,
    pub form: FunctionForm,
    pub module: EntityId,
    /// Owning class for methods, enclosing function for nested functions
    pub owner: Option<EntityId>,
    pub location: Location,
    pub docstring: Option<String>,
    pub parameters: Vec<EntityId>,
    pub return_type: Option<String>,
    pub decorators: Vec<String>,
    pub visibility: Visibility,
    pub is_async: bool,
    pub is_static: bool,
    pub nested: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterNode {
    pub id: EntityId,
    pub function: EntityId,
    pub name: String,
    pub type_hint: Option<String>,
    pub default: Option<String>,
    pub kind: ParameterKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeNode {
    pub id: EntityId,
    pub class: EntityId,
    pub name: String,
    pub type_hint: Option<String>,
    pub default: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportNode {
    pub id: EntityId,
    pub module: EntityId,
    /// Reference exactly as written
    pub target: String,
    pub names: Vec<ImportedName>,
    pub kind: ImportKind,
    pub location: Location,
}

/// Any entity in the graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity<'g> {
    Module(&'g ModuleNode),
    Class(&'g ClassNode),
    Function(&'g FunctionNode),
    Parameter(&'g ParameterNode),
    Attribute(&'g AttributeNode),
    Import(&'g ImportNode),
}

impl<'g> Entity<'g> {
    pub fn id(&self) -> &'g EntityId {
        match self {
            Entity::Module(m) => &m.id,
            Entity::Class(c) => &c.id,
            Entity::Function(f) => &f.id,
            Entity::Parameter(p) => &p.id,
            Entity::Attribute(a) => &a.id,
            Entity::Import(i) => &i.id,
        }
    }

    /// Raw display name
    pub fn name(&self) -> &'g str {
        match self {
            Entity::Module(m) => &m.name,
            Entity::Class(c) => &c.name,
            Entity::Function(f) => &f.name,
            Entity::Parameter(p) => &p.name,
            Entity::Attribute(a) => &a.name,
            Entity::Import(i) => &i.target,
        }
    }

    pub fn location(&self) -> Option<&'g Location> {
        match self {
            Entity::Module(m) => m.location.as_ref(),
            Entity::Class(c) => c.location.as_ref(),
            Entity::Function(f) => Some(&f.location),
            Entity::Parameter(_) => None,
            Entity::Attribute(a) => Some(&a.location),
            Entity::Import(i) => Some(&i.location),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Module imports module
    Imports,
    /// Class inherits from (or implements) class
    InheritsFrom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Resolved,
    ExternalUnresolved,
}

/// Directed, typed edge between two entities
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: EntityId,
    pub to: EntityId,
    pub kind: EdgeKind,
    pub status: Resolution,
}

impl Edge {
    pub fn new(from: EntityId, to: EntityId, kind: EdgeKind, status: Resolution) -> Self {
        Self {
            from,
            to,
            kind,
            status,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == Resolution::Resolved
    }
}

/// All entities and edges of one project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureGraph {
    pub(crate) project: String,
    pub(crate) modules: BTreeMap<EntityId, ModuleNode>,
    pub(crate) classes: BTreeMap<EntityId, ClassNode>,
    pub(crate) functions: BTreeMap<EntityId, FunctionNode>,
    pub(crate) parameters: BTreeMap<EntityId, ParameterNode>,
    pub(crate) attributes: BTreeMap<EntityId, AttributeNode>,
    pub(crate) imports: BTreeMap<EntityId, ImportNode>,
    /// Sorted and free of duplicates
    pub(crate) edges: Vec<Edge>,
    pub(crate) tokens: TokenMap,
}

impl StructureGraph {
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Modules in identifier order, external stubs included
    pub fn modules(&self) -> impl Iterator<Item = &ModuleNode> {
        self.modules.values()
    }

    /// Classes in identifier order, external stubs included
    pub fn classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.classes.values()
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionNode> {
        self.functions.values()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &ParameterNode> {
        self.parameters.values()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &AttributeNode> {
        self.attributes.values()
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportNode> {
        self.imports.values()
    }

    /// Edges sorted by (from, to, kind, status)
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    pub fn module(&self, id: &EntityId) -> Option<&ModuleNode> {
        self.modules.get(id)
    }

    pub fn class(&self, id: &EntityId) -> Option<&ClassNode> {
        self.classes.get(id)
    }

    pub fn function(&self, id: &EntityId) -> Option<&FunctionNode> {
        self.functions.get(id)
    }

    pub fn parameter(&self, id: &EntityId) -> Option<&ParameterNode> {
        self.parameters.get(id)
    }

    pub fn attribute(&self, id: &EntityId) -> Option<&AttributeNode> {
        self.attributes.get(id)
    }

    pub fn import(&self, id: &EntityId) -> Option<&ImportNode> {
        self.imports.get(id)
    }

    /// Look up any entity by identifier
    pub fn entity(&self, id: &EntityId) -> Option<Entity<'_>> {
        self.modules
            .get(id)
            .map(Entity::Module)
            .or_else(|| self.classes.get(id).map(Entity::Class))
            .or_else(|| self.functions.get(id).map(Entity::Function))
            .or_else(|| self.parameters.get(id).map(Entity::Parameter))
            .or_else(|| self.attributes.get(id).map(Entity::Attribute))
            .or_else(|| self.imports.get(id).map(Entity::Import))
    }

    /// Rendering token of an entity
    pub fn token(&self, id: &EntityId) -> Option<&str> {
        self.tokens.token(id)
    }

    pub fn tokens(&self) -> &TokenMap {
        &self.tokens
    }

    pub fn entity_count(&self) -> usize {
        self.modules.len()
            + self.classes.len()
            + self.functions.len()
            + self.parameters.len()
            + self.attributes.len()
            + self.imports.len()
    }

    /// Project classes of a module, in identifier order
    pub fn classes_in(&self, module: &EntityId) -> impl Iterator<Item = &ClassNode> + '_ {
        let module = module.clone();
        self.classes
            .values()
            .filter(move |c| c.module.as_ref() == Some(&module))
    }

    /// Whether an identifier belongs to any entity
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entity(id).is_some()
    }
}
