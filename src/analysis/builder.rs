// Graph builder: flattens extraction outcomes and resolves cross-file references
//
// Resolution is name-based. Imports are matched against module keys (the
// slash form of a module's path); bases against class names project-wide.
// Whenever several candidates qualify, the one seen first in processing
// order wins. Anything that does not resolve points at a shared external stub.

use crate::analysis::graph::*;
use crate::analysis::sanitize::Sanitizer;
use crate::parser::{
    normalize_path, path_components, Class, ClassKind, EntityId, ExtractionOutcome, Function, Import,
    ImportKind, Language, Location, Module,
};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, info_span, warn};

/// Build the structure graph for one project
pub fn build(project: &str, outcomes: &[ExtractionOutcome]) -> StructureGraph {
    let mut builder = GraphBuilder::new(project);
    for outcome in outcomes {
        if let Some(module) = &outcome.module {
            builder.add_module(module);
        }
    }
    builder.finish()
}

struct IndexEntry {
    id: EntityId,
    key: String,
    /// Directory part of the key
    dir: String,
    language: Language,
}

/// Module keys in processing order
#[derive(Default)]
struct ModuleIndex {
    entries: Vec<IndexEntry>,
    exact: HashMap<String, usize>,
}

impl ModuleIndex {
    fn insert(&mut self, id: EntityId, key: String, language: Language) {
        let dir = key.rsplit_once('/').map(|(d, _)| d.to_string()).unwrap_or_default();
        self.exact.entry(key.clone()).or_insert(self.entries.len());
        self.entries.push(IndexEntry {
            id,
            key,
            dir,
            language,
        });
    }

    fn exact(&self, key: &str) -> Option<&EntityId> {
        self.exact.get(key).map(|&i| &self.entries[i].id)
    }

    /// Exact key, otherwise the first key ending in `/candidate`
    fn exact_or_suffix(&self, candidate: &str) -> Option<&EntityId> {
        if candidate.is_empty() {
            return None;
        }
        self.exact(candidate).or_else(|| {
            let suffix = format!("/{}", candidate);
            self.entries
                .iter()
                .find(|e| e.key.ends_with(&suffix))
                .map(|e| &e.id)
        })
    }

    /// First Go module whose directory ends an import path
    fn go_package(&self, import_path: &str) -> Option<&EntityId> {
        self.entries
            .iter()
            .filter(|e| e.language == Language::Go && !e.dir.is_empty())
            .find(|e| import_path == e.dir || import_path.ends_with(&format!("/{}", e.dir)))
            .map(|e| &e.id)
    }
}

/// What an import needs for resolution, captured while flattening
struct PendingImport {
    module: EntityId,
    module_key: String,
    path_dir: Vec<String>,
    is_package: bool,
    language: Language,
    target: String,
    names: Vec<String>,
    kind: ImportKind,
}

struct PendingBases {
    class: EntityId,
    bases: Vec<String>,
}

/// Incremental graph construction; `finish` resolves references and freezes the graph
pub struct GraphBuilder {
    graph: StructureGraph,
    sanitizer: Sanitizer,
    index: ModuleIndex,
    imports: Vec<PendingImport>,
    bases: Vec<PendingBases>,
    /// Class ids by simple name, in processing order
    classes_by_name: HashMap<String, Vec<EntityId>>,
    /// Members and imports get tokens after modules, classes and stubs
    deferred_tokens: Vec<(String, EntityId)>,
}

impl GraphBuilder {
    pub fn new(project: &str) -> Self {
        Self {
            graph: StructureGraph {
                project: project.to_string(),
                ..Default::default()
            },
            sanitizer: Sanitizer::new(),
            index: ModuleIndex::default(),
            imports: Vec::new(),
            bases: Vec::new(),
            classes_by_name: HashMap::new(),
            deferred_tokens: Vec::new(),
        }
    }

    /// Add one extracted module. A module whose id is already present is skipped.
    pub fn add_module(&mut self, module: &Module) -> bool {
        if self.graph.modules.contains_key(&module.id) {
            warn!(module = %module.id, "duplicate module skipped");
            return false;
        }

        self.sanitizer.sanitize(&module.name, &module.id);
        let mut node = ModuleNode {
            id: module.id.clone(),
            name: module.name.clone(),
            origin: Origin::Project,
            language: Some(module.language),
            location: Some(Location::new(module.path.clone(), 1)),
            docstring: module.docstring.clone(),
            line_count: module.line_count,
            classes: Vec::new(),
            functions: Vec::new(),
            imports: Vec::new(),
            exports: module.exports.clone(),
        };

        let key = module.language.module_key(&module.path);
        let mut path_dir = path_components(&module.path);
        let file_stem = path_dir.pop().unwrap_or_default();
        let is_package = module.language == Language::Python && file_stem.starts_with("__init__.");

        for import in &module.imports {
            self.add_import(import, module);
            node.imports.push(import.id.clone());
            self.imports.push(PendingImport {
                module: module.id.clone(),
                module_key: key.clone(),
                path_dir: path_dir.clone(),
                is_package,
                language: module.language,
                target: import.target.clone(),
                names: import.names.iter().map(|n| n.name.clone()).collect(),
                kind: import.kind,
            });
        }
        for class in &module.classes {
            self.add_class(class, module);
            node.classes.push(class.id.clone());
        }
        for function in &module.functions {
            self.add_function(function, module, None);
            node.functions.push(function.id.clone());
        }

        debug!(module = %module.id, key = %key, "module added");
        self.index.insert(module.id.clone(), key, module.language);
        self.graph.modules.insert(module.id.clone(), node);
        true
    }

    fn add_import(&mut self, import: &Import, module: &Module) {
        self.deferred_tokens.push((import.target.clone(), import.id.clone()));
        self.graph.imports.insert(
            import.id.clone(),
            ImportNode {
                id: import.id.clone(),
                module: module.id.clone(),
                target: import.target.clone(),
                names: import.names.clone(),
                kind: import.kind,
                location: Location::new(module.path.clone(), import.line),
            },
        );
    }

    fn add_class(&mut self, class: &Class, module: &Module) {
        self.sanitizer.sanitize(&class.qualified_name, &class.id);

        let mut attributes = Vec::with_capacity(class.attributes.len());
        for attribute in &class.attributes {
            self.deferred_tokens.push((attribute.name.clone(), attribute.id.clone()));
            attributes.push(attribute.id.clone());
            self.graph.attributes.insert(
                attribute.id.clone(),
                AttributeNode {
                    id: attribute.id.clone(),
                    class: class.id.clone(),
                    name: attribute.name.clone(),
                    type_hint: attribute.type_hint.clone(),
                    default: attribute.default.clone(),
                    visibility: attribute.visibility,
                    is_static: attribute.is_static,
                    location: Location::new(module.path.clone(), attribute.line),
                },
            );
        }

        let mut methods = Vec::with_capacity(class.methods.len());
        for method in &class.methods {
            self.add_function(method, module, Some(&class.id));
            methods.push(method.id.clone());
        }

        self.classes_by_name
            .entry(class.name.clone())
            .or_default()
            .push(class.id.clone());
        self.bases.push(PendingBases {
            class: class.id.clone(),
            bases: class.bases.clone(),
        });

        self.graph.classes.insert(
            class.id.clone(),
            ClassNode {
                id: class.id.clone(),
                name: class.name.clone(),
                qualified_name: class.qualified_name.clone(),
                kind: class.kind,
                origin: Origin::Project,
                module: Some(module.id.clone()),
                location: Some(Location::new(module.path.clone(), class.line)),
                docstring: class.docstring.clone(),
                bases: class.bases.clone(),
                decorators: class.decorators.clone(),
                attributes,
                methods,
            },
        );
    }

    fn add_function(&mut self, function: &Function, module: &Module, owner: Option<&EntityId>) {
        self.deferred_tokens.push((function.name.clone(), function.id.clone()));

        let mut parameters = Vec::with_capacity(function.parameters.len());
        for parameter in &function.parameters {
            self.deferred_tokens.push((parameter.name.clone(), parameter.id.clone()));
            parameters.push(parameter.id.clone());
            self.graph.parameters.insert(
                parameter.id.clone(),
                ParameterNode {
                    id: parameter.id.clone(),
                    function: function.id.clone(),
                    name: parameter.name.clone(),
                    type_hint: parameter.type_hint.clone(),
                    default: parameter.default.clone(),
                    kind: parameter.kind,
                },
            );
        }

        let mut nested = Vec::with_capacity(function.nested.len());
        for inner in &function.nested {
            self.add_function(inner, module, Some(&function.id));
            nested.push(inner.id.clone());
        }

        self.graph.functions.insert(
            function.id.clone(),
            FunctionNode {
                id: function.id.clone(),
                name: function.name.clone(),
                kind: function.kind,
                form: function.form,
                module: module.id.clone(),
                owner: owner.cloned(),
                location: Location::new(module.path.clone(), function.line),
                docstring: function.docstring.clone(),
                parameters,
                return_type: function.return_type.clone(),
                decorators: function.decorators.clone(),
                visibility: function.visibility,
                is_async: function.is_async,
                is_static: function.is_static,
                nested,
            },
        );
    }

    /// Resolve imports and inheritance, then freeze the graph
    pub fn finish(mut self) -> StructureGraph {
        let span = info_span!("build_graph", modules = self.graph.modules.len());
        let _guard = span.enter();

        let mut edges = BTreeSet::new();
        for pending in std::mem::take(&mut self.imports) {
            let targets = resolve_import(&self.index, &pending);
            if targets.is_empty() {
                let stub = self.external_module(&pending.target);
                edges.insert(Edge::new(
                    pending.module.clone(),
                    stub,
                    EdgeKind::Imports,
                    Resolution::ExternalUnresolved,
                ));
                continue;
            }
            for target in targets {
                if target != pending.module {
                    edges.insert(Edge::new(
                        pending.module.clone(),
                        target,
                        EdgeKind::Imports,
                        Resolution::Resolved,
                    ));
                }
            }
        }

        for pending in std::mem::take(&mut self.bases) {
            for base in &pending.bases {
                let simple = simple_name(base);
                let resolved = self
                    .classes_by_name
                    .get(simple)
                    .and_then(|ids| ids.iter().find(|id| **id != pending.class))
                    .cloned();
                let edge = match resolved {
                    Some(target) => Edge::new(
                        pending.class.clone(),
                        target,
                        EdgeKind::InheritsFrom,
                        Resolution::Resolved,
                    ),
                    None => Edge::new(
                        pending.class.clone(),
                        self.external_class(base),
                        EdgeKind::InheritsFrom,
                        Resolution::ExternalUnresolved,
                    ),
                };
                edges.insert(edge);
            }
        }

        let unresolved = edges.iter().filter(|e| !e.is_resolved()).count();
        info!(
            resolved = edges.len() - unresolved,
            unresolved,
            entities = self.graph.entity_count(),
            "graph built"
        );

        for (name, id) in std::mem::take(&mut self.deferred_tokens) {
            self.sanitizer.sanitize(&name, &id);
        }
        self.graph.edges = edges.into_iter().collect();
        self.graph.tokens = self.sanitizer.finish();
        self.graph
    }

    /// Shared stub for an unresolved import reference
    fn external_module(&mut self, reference: &str) -> EntityId {
        let id = EntityId::new(format!("external:{}", reference));
        if !self.graph.modules.contains_key(&id) {
            self.sanitizer.sanitize(reference, &id);
            self.graph.modules.insert(
                id.clone(),
                ModuleNode {
                    id: id.clone(),
                    name: reference.to_string(),
                    origin: Origin::External,
                    language: None,
                    location: None,
                    docstring: None,
                    line_count: 0,
                    classes: Vec::new(),
                    functions: Vec::new(),
                    imports: Vec::new(),
                    exports: Vec::new(),
                },
            );
        }
        id
    }

    /// Shared stub for an unresolved base, keyed by the base as written
    fn external_class(&mut self, base: &str) -> EntityId {
        let id = EntityId::new(format!("external-base:{}", base));
        if !self.graph.classes.contains_key(&id) {
            self.sanitizer.sanitize(base, &id);
            self.graph.classes.insert(
                id.clone(),
                ClassNode {
                    id: id.clone(),
                    name: base.to_string(),
                    qualified_name: base.to_string(),
                    kind: ClassKind::Class,
                    origin: Origin::External,
                    module: None,
                    location: None,
                    docstring: None,
                    bases: Vec::new(),
                    decorators: Vec::new(),
                    attributes: Vec::new(),
                    methods: Vec::new(),
                },
            );
        }
        id
    }
}

/// `models.Base` -> `Base`, `Repository<User>` -> `Repository`, `a::B` -> `B`
pub fn simple_name(base: &str) -> &str {
    let base = base.split(['<', '[', '(']).next().unwrap_or(base).trim();
    base.rsplit(['.', ':', '\\']).next().unwrap_or(base).trim()
}

fn resolve_import(index: &ModuleIndex, import: &PendingImport) -> Vec<EntityId> {
    match import.language {
        Language::Python => resolve_python(index, import),
        Language::JavaScript | Language::TypeScript => {
            let target = import.target.as_str();
            let candidate = if target.starts_with("./") || target.starts_with("../") || target == "." || target == ".." {
                join_relative(&import.path_dir, target).map(|p| strip_source_extension(&p))
            } else {
                Some(strip_source_extension(target))
            };
            candidate.and_then(|c| index.exact(&c).cloned()).into_iter().collect()
        }
        Language::Java | Language::Kotlin | Language::CSharp | Language::Php | Language::Swift => {
            let dotted = import.target.trim_start_matches('\\').trim_end_matches(".*");
            let full = dotted.replace(['.', '\\'], "/");
            let mut candidates = vec![full.clone()];
            if let Some((parent, _)) = full.rsplit_once('/') {
                candidates.push(parent.to_string());
            }
            first_match(&candidates, |c| index.exact_or_suffix(c))
        }
        Language::Rust => {
            let segments: Vec<&str> = import
                .target
                .split("::")
                .filter(|s| !s.is_empty())
                .skip_while(|s| matches!(*s, "crate" | "self" | "super"))
                .collect();
            let candidates: Vec<String> = (1..=segments.len())
                .rev()
                .map(|n| segments[..n].join("/"))
                .collect();
            first_match(&candidates, |c| index.exact_or_suffix(c))
        }
        Language::Go => index
            .exact_or_suffix(&import.target)
            .or_else(|| index.go_package(&import.target))
            .cloned()
            .into_iter()
            .collect(),
        Language::Ruby | Language::C | Language::Cpp => {
            let target = strip_source_extension(&import.target);
            let relative = join_relative(&import.path_dir, &target);
            if let Some(id) = relative.as_deref().and_then(|r| index.exact(r)) {
                return vec![id.clone()];
            }
            first_match(&[target], |c| index.exact_or_suffix(c))
        }
    }
}

fn first_match<'i>(candidates: &[String], lookup: impl Fn(&str) -> Option<&'i EntityId>) -> Vec<EntityId> {
    candidates
        .iter()
        .find_map(|c| lookup(c))
        .cloned()
        .into_iter()
        .collect()
}

fn resolve_python(index: &ModuleIndex, import: &PendingImport) -> Vec<EntityId> {
    let dotted = |s: &str| s.split('.').filter(|p| !p.is_empty()).collect::<Vec<_>>().join("/");
    let names: Vec<&str> = import
        .names
        .iter()
        .map(String::as_str)
        .filter(|n| *n != "*")
        .collect();

    match import.kind {
        ImportKind::Relative { level } => {
            let mut package: Vec<&str> = import.module_key.split('/').filter(|s| !s.is_empty()).collect();
            if !import.is_package {
                package.pop();
            }
            for _ in 1..level {
                if package.pop().is_none() {
                    return Vec::new();
                }
            }
            let mut base = package.join("/");
            let rest = dotted(&import.target);
            if !rest.is_empty() {
                base = if base.is_empty() { rest } else { format!("{}/{}", base, rest) };
            }

            let submodule = |name: &str| {
                if base.is_empty() {
                    name.to_string()
                } else {
                    format!("{}/{}", base, name)
                }
            };
            if import.target.trim_start_matches('.').is_empty() {
                let by_name: Vec<EntityId> = names
                    .iter()
                    .filter_map(|n| index.exact(&submodule(n)).cloned())
                    .collect();
                if !by_name.is_empty() {
                    return by_name;
                }
                return index.exact(&base).cloned().into_iter().collect();
            }
            if let Some(id) = index.exact(&base) {
                return vec![id.clone()];
            }
            names
                .iter()
                .filter_map(|n| index.exact(&submodule(n)).cloned())
                .collect()
        }
        ImportKind::From => {
            let base = dotted(&import.target);
            if let Some(id) = index.exact_or_suffix(&base) {
                return vec![id.clone()];
            }
            names
                .iter()
                .filter_map(|n| index.exact_or_suffix(&format!("{}/{}", base, n)).cloned())
                .collect()
        }
        _ => {
            let parts: Vec<&str> = import.target.split('.').filter(|p| !p.is_empty()).collect();
            (1..=parts.len())
                .rev()
                .find_map(|n| index.exact_or_suffix(&parts[..n].join("/")))
                .cloned()
                .into_iter()
                .collect()
        }
    }
}

/// Resolve `./x`, `../y/z` against a directory; `None` when climbing above the root
fn join_relative(dir: &[String], reference: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.iter().map(String::as_str).collect();
    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Drop a trailing source-file extension (`./util.js` -> `./util`, `shape.h` -> `shape`)
fn strip_source_extension(reference: &str) -> String {
    let path = Path::new(reference);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if Language::from_extension(ext).is_some() => normalize_reference(&path.with_extension("")),
        _ => reference.to_string(),
    }
}

fn normalize_reference(path: &Path) -> String {
    let text = path.to_string_lossy();
    if text.starts_with("./") || text.starts_with("../") {
        text.into_owned()
    } else {
        normalize_path(path)
    }
}
