// Entity types produced by the extractors
//
// Every extractor, whatever its input grammar, normalizes into these types.
// Nothing downstream of the parser module sees a syntax tree or a regex match.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Project-unique entity identifier.
///
/// Derived from the file path plus the entity's qualified name, so the same
/// project always yields the same identifiers regardless of processing order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out identifiers for the entities of one file.
///
/// Python allows redefining a class or function under the same name, so a
/// repeated identifier gets a `#n` suffix instead of silently aliasing.
#[derive(Debug)]
pub struct IdAllocator {
    module: EntityId,
    used: HashSet<String>,
}

impl IdAllocator {
    pub fn new(module: &EntityId) -> Self {
        Self {
            module: module.clone(),
            used: HashSet::new(),
        }
    }

    pub fn class(&mut self, qualified_name: &str) -> EntityId {
        self.unique(format!("{}::{}", self.module, qualified_name))
    }

    pub fn function(&mut self, qualified_name: &str) -> EntityId {
        self.unique(format!("{}::{}()", self.module, qualified_name))
    }

    pub fn attribute(&mut self, owner: &str, name: &str) -> EntityId {
        self.unique(format!("{}::{}@{}", self.module, owner, name))
    }

    pub fn parameter(&mut self, function: &EntityId, name: &str) -> EntityId {
        self.unique(format!("{}/{}", function, name))
    }

    pub fn import(&mut self, line: usize, target: &str) -> EntityId {
        self.unique(format!("{}::import:{}:{}", self.module, line, target))
    }

    fn unique(&mut self, candidate: String) -> EntityId {
        let mut id = candidate.clone();
        let mut n = 2;
        while !self.used.insert(id.clone()) {
            id = format!("{}#{}", candidate, n);
            n += 1;
        }
        EntityId(id)
    }
}

/// Source location of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: PathBuf,
    pub line: usize,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

/// Supported source languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Kotlin,
    CSharp,
    Go,
    Rust,
    Ruby,
    Php,
    Swift,
    C,
    Cpp,
}

impl Language {
    /// Infer a language from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext.to_ascii_lowercase().as_str() {
            "py" | "pyi" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "java" => Language::Java,
            "kt" | "kts" => Language::Kotlin,
            "cs" => Language::CSharp,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            _ => return None,
        };
        Some(lang)
    }

    /// Infer a language from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }

    /// Whether this language is handled by a full grammar rather than patterns
    pub fn is_precise(&self) -> bool {
        matches!(self, Language::Python)
    }

    /// File stem that stands for its directory (`__init__`, `index`, `mod`)
    fn package_stem(&self) -> Option<&'static str> {
        match self {
            Language::Python => Some("__init__"),
            Language::JavaScript | Language::TypeScript => Some("index"),
            Language::Rust => Some("mod"),
            _ => None,
        }
    }

    /// Slash-separated resolution key for a module file.
    ///
    /// `pkg/sub/__init__.py` -> `pkg/sub`, `src/utils/index.ts` -> `src/utils`,
    /// `src/app.py` -> `src/app`.
    pub fn module_key(&self, path: &Path) -> String {
        let mut parts = path_components(&path.with_extension(""));
        if parts.len() > 1 && parts.last().map(String::as_str) == self.package_stem() {
            parts.pop();
        }
        parts.join("/")
    }

    /// Display name of a module in the language's own convention
    pub fn module_name(&self, path: &Path) -> String {
        let key = self.module_key(path);
        match self {
            Language::Python => key.replace('/', "."),
            _ => key,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = match s.to_ascii_lowercase().as_str() {
            "python" | "py" => Language::Python,
            "javascript" | "js" => Language::JavaScript,
            "typescript" | "ts" => Language::TypeScript,
            "java" => Language::Java,
            "kotlin" | "kt" => Language::Kotlin,
            "csharp" | "c#" | "cs" => Language::CSharp,
            "go" | "golang" => Language::Go,
            "rust" | "rs" => Language::Rust,
            "ruby" | "rb" => Language::Ruby,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "c" => Language::C,
            "cpp" | "c++" | "cxx" => Language::Cpp,
            other => return Err(format!("unknown language: {}", other)),
        };
        Ok(lang)
    }
}

/// Normal path components as strings, dropping `.`, roots and prefixes
pub fn path_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().replace('\\', "/")),
            _ => None,
        })
        .flat_map(|part| {
            part.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Forward-slash form of a relative path, used as the module identifier
pub fn normalize_path(path: &Path) -> String {
    path_components(path).join("/")
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// Visibility implied by naming convention (`_name`, `#name`); dunder names stay public
    pub fn from_name(name: &str) -> Self {
        if name.starts_with('#') || (name.starts_with('_') && !is_dunder(name)) {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// One source file's extraction result: a module and what it contains
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Module {
    pub id: EntityId,
    /// Module name in the language's convention (`pkg.models`, `src/utils`)
    pub name: String,
    pub path: PathBuf,
    pub language: Language,
    pub docstring: Option<String>,
    pub classes: Vec<Class>,
    /// Top-level functions only; methods and nested functions live with their owners
    pub functions: Vec<Function>,
    pub imports: Vec<Import>,
    /// Names the module exports, where the language marks them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
    pub line_count: usize,
}

impl Module {
    pub fn new(path: &Path, language: Language) -> Self {
        Self {
            id: EntityId::new(normalize_path(path)),
            name: language.module_name(path),
            path: path.to_path_buf(),
            language,
            docstring: None,
            classes: Vec::new(),
            functions: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            line_count: 0,
        }
    }

    /// Check if the module declares anything
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.functions.is_empty() && self.imports.is_empty()
    }

    pub fn find_class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Number of entities in this module, the module itself included
    pub fn entity_count(&self) -> usize {
        1 + self.imports.len()
            + self
                .classes
                .iter()
                .map(|c| {
                    1 + c.attributes.len()
                        + c.methods.iter().map(Function::entity_count).sum::<usize>()
                })
                .sum::<usize>()
            + self.functions.iter().map(Function::entity_count).sum::<usize>()
    }
}

/// An import statement or equivalent (`require`, `use`, `#include`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Import {
    pub id: EntityId,
    /// Module reference exactly as written (`os.path`, `./utils`, `..models`)
    pub target: String,
    /// Specific names imported
    pub names: Vec<ImportedName>,
    pub kind: ImportKind,
    pub line: usize,
}

impl Import {
    pub fn new(id: EntityId, target: &str, kind: ImportKind, line: usize) -> Self {
        Self {
            id,
            target: target.to_string(),
            names: Vec::new(),
            kind,
            line,
        }
    }

    pub fn with_names(mut self, names: Vec<ImportedName>) -> Self {
        self.names = names;
        self
    }
}

/// A single imported name with optional alias
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn with_alias(name: &str, alias: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: Some(alias.to_string()),
        }
    }

    /// Get the name as used in code (alias if present, otherwise original)
    pub fn used_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Kind of import statement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImportKind {
    /// `import x`, `use a::b`, `import 'side-effect'`
    Direct,
    /// `from x import y`, `import { y } from 'x'`
    From,
    /// `from . import y` or `from ..x import y`
    Relative { level: usize },
    /// `require('x')`, `require 'x'`
    Require,
    /// `#include "x.h"`
    Include,
}

impl ImportKind {
    pub fn is_relative(&self) -> bool {
        matches!(self, ImportKind::Relative { .. })
    }
}

/// What sort of type declaration a class entity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
    TypeAlias,
}

impl ClassKind {
    /// Stereotype shown in class diagrams, if any
    pub fn stereotype(&self) -> Option<&'static str> {
        match self {
            ClassKind::Class => None,
            ClassKind::Interface => Some("interface"),
            ClassKind::Struct => Some("struct"),
            ClassKind::Enum => Some("enumeration"),
            ClassKind::TypeAlias => Some("type"),
        }
    }
}

/// A class, interface, struct or type alias
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Class {
    pub id: EntityId,
    /// Simple name, used for inheritance matching
    pub name: String,
    /// Dotted name including enclosing classes or functions
    pub qualified_name: String,
    pub kind: ClassKind,
    pub docstring: Option<String>,
    /// Base classes and implemented interfaces, as written
    pub bases: Vec<String>,
    pub decorators: Vec<String>,
    pub methods: Vec<Function>,
    pub attributes: Vec<Attribute>,
    pub line: usize,
}

impl Class {
    pub fn new(id: EntityId, name: &str, line: usize) -> Self {
        Self {
            id,
            name: name.to_string(),
            qualified_name: name.to_string(),
            kind: ClassKind::Class,
            docstring: None,
            bases: Vec::new(),
            decorators: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
            line,
        }
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a dataclass
    pub fn is_dataclass(&self) -> bool {
        self.decorators.iter().any(|d| d.contains("dataclass"))
    }

    pub fn find_method(&self, name: &str) -> Option<&Function> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A class attribute or field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    pub id: EntityId,
    pub name: String,
    pub type_hint: Option<String>,
    pub default: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub line: usize,
}

impl Attribute {
    pub fn new(id: EntityId, name: &str, line: usize) -> Self {
        Self {
            id,
            name: name.to_string(),
            type_hint: None,
            default: None,
            visibility: Visibility::from_name(name),
            is_static: false,
            line,
        }
    }
}

/// Where a function sits relative to its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// Declared directly at module level
    TopLevel,
    /// Declared directly in a class body (or bound to a type)
    Method,
    /// Declared inside another function
    Nested,
}

/// Syntactic form of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionForm {
    #[default]
    Declaration,
    /// `const f = (a) => ...`
    Arrow,
    /// `const f = function (a) { ... }`
    Anonymous,
}

/// A function or method definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Function {
    pub id: EntityId,
    pub name: String,
    pub kind: FunctionKind,
    pub form: FunctionForm,
    pub docstring: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub decorators: Vec<String>,
    pub visibility: Visibility,
    pub is_async: bool,
    pub is_static: bool,
    /// Functions declared inside this one
    pub nested: Vec<Function>,
    pub line: usize,
}

impl Function {
    pub fn new(id: EntityId, name: &str, kind: FunctionKind, line: usize) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            form: FunctionForm::Declaration,
            docstring: None,
            parameters: Vec::new(),
            return_type: None,
            decorators: Vec::new(),
            visibility: Visibility::from_name(name),
            is_async: false,
            is_static: false,
            nested: Vec::new(),
            line,
        }
    }

    /// Check if this is a staticmethod
    pub fn is_staticmethod(&self) -> bool {
        self.is_static || self.decorators.iter().any(|d| d == "staticmethod")
    }

    /// Check if this is a classmethod
    pub fn is_classmethod(&self) -> bool {
        self.decorators.iter().any(|d| d == "classmethod")
    }

    /// Check if this is a property
    pub fn is_property(&self) -> bool {
        self.decorators
            .iter()
            .any(|d| d == "property" || d.ends_with(".getter"))
    }

    /// Parameters excluding the implicit receiver (`self`, `cls`)
    pub fn explicit_parameters(&self) -> impl Iterator<Item = &Parameter> {
        let skip_receiver = self.kind == FunctionKind::Method
            && self
                .parameters
                .first()
                .map(|p| p.name == "self" || p.name == "cls")
                .unwrap_or(false);
        self.parameters.iter().skip(usize::from(skip_receiver))
    }

    /// This function, its parameters and all nested functions
    pub fn entity_count(&self) -> usize {
        1 + self.parameters.len() + self.nested.iter().map(Function::entity_count).sum::<usize>()
    }
}

/// A function parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    pub id: EntityId,
    pub name: String,
    pub type_hint: Option<String>,
    pub default: Option<String>,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn new(id: EntityId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            type_hint: None,
            default: None,
            kind: ParameterKind::Regular,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParameterKind::VarArgs => f.write_str("*")?,
            ParameterKind::VarKeyword => f.write_str("**")?,
            _ => {}
        }
        f.write_str(&self.name)?;
        if let Some(ref t) = self.type_hint {
            write!(f, ": {}", t)?;
        }
        Ok(())
    }
}

/// Kind of function parameter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Regular positional or keyword parameter
    Regular,
    /// Before a `/` separator
    PositionalOnly,
    /// After `*` or `*args`
    KeywordOnly,
    /// `*args`, `...rest`
    VarArgs,
    /// `**kwargs`
    VarKeyword,
}

/// Outcome of extracting one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FileStatus {
    Complete,
    PartialWithWarnings,
    Failed { reason: String },
}

impl FileStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, FileStatus::Failed { .. })
    }
}

/// Everything an extractor reports for one file
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    pub path: PathBuf,
    pub language: Option<Language>,
    /// Present unless the file failed
    pub module: Option<Module>,
    pub status: FileStatus,
    pub warnings: Vec<String>,
}

impl ExtractionOutcome {
    /// A successful extraction; the status follows from the warnings
    pub fn extracted(module: Module, warnings: Vec<String>) -> Self {
        let status = if warnings.is_empty() {
            FileStatus::Complete
        } else {
            FileStatus::PartialWithWarnings
        };
        Self {
            path: module.path.clone(),
            language: Some(module.language),
            module: Some(module),
            status,
            warnings,
        }
    }

    pub fn failed(path: &Path, language: Option<Language>, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            language,
            module: None,
            status: FileStatus::Failed {
                reason: reason.into(),
            },
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> EntityId {
        EntityId::new(s)
    }

    #[test]
    fn test_id_allocator_disambiguates_redefinitions() {
        let mut ids = IdAllocator::new(&id("app.py"));
        let first = ids.class("Handler");
        let second = ids.class("Handler");
        assert_eq!(first.as_str(), "app.py::Handler");
        assert_eq!(second.as_str(), "app.py::Handler#2");
    }

    #[test]
    fn test_id_allocator_kinds_do_not_collide() {
        let mut ids = IdAllocator::new(&id("app.py"));
        let class = ids.class("save");
        let func = ids.function("save");
        let attr = ids.attribute("Model", "save");
        assert_ne!(class, func);
        assert_ne!(func, attr);
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("TSX"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("hpp"), Some(Language::Cpp));
        assert_eq!(Language::from_extension("md"), None);
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("Python".parse::<Language>(), Ok(Language::Python));
        assert_eq!("c++".parse::<Language>(), Ok(Language::Cpp));
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_module_key_and_name() {
        let py = Language::Python;
        assert_eq!(py.module_key(Path::new("pkg/sub/__init__.py")), "pkg/sub");
        assert_eq!(py.module_name(Path::new("src/main.py")), "src.main");
        assert_eq!(py.module_name(Path::new("__init__.py")), "__init__");

        let ts = Language::TypeScript;
        assert_eq!(ts.module_name(Path::new("src/utils/index.ts")), "src/utils");
        assert_eq!(ts.module_name(Path::new("./src/app.tsx")), "src/app");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("./src/app.py")), "src/app.py");
        assert_eq!(normalize_path(Path::new("src\\win\\app.py")), "src/win/app.py");
    }

    #[test]
    fn test_visibility_from_name() {
        assert_eq!(Visibility::from_name("save"), Visibility::Public);
        assert_eq!(Visibility::from_name("_validate"), Visibility::Private);
        assert_eq!(Visibility::from_name("__init__"), Visibility::Public);
        assert_eq!(Visibility::from_name("#secret"), Visibility::Private);
    }

    #[test]
    fn test_explicit_parameters_skip_receiver() {
        let mut method = Function::new(id("a.py::A.m()"), "m", FunctionKind::Method, 1);
        method.parameters.push(Parameter::new(id("p/self"), "self"));
        method.parameters.push(Parameter::new(id("p/x"), "x"));
        let names: Vec<_> = method.explicit_parameters().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["x"]);

        let mut func = Function::new(id("a.py::f()"), "f", FunctionKind::TopLevel, 1);
        func.parameters.push(Parameter::new(id("p/self"), "self"));
        assert_eq!(func.explicit_parameters().count(), 1);
    }

    #[test]
    fn test_parameter_display() {
        let mut p = Parameter::new(id("f/args"), "args");
        p.kind = ParameterKind::VarArgs;
        assert_eq!(p.to_string(), "*args");

        let mut typed = Parameter::new(id("f/name"), "name");
        typed.type_hint = Some("str".to_string());
        assert_eq!(typed.to_string(), "name: str");
    }

    #[test]
    fn test_outcome_status_follows_warnings() {
        let module = Module::new(Path::new("a.js"), Language::JavaScript);
        let clean = ExtractionOutcome::extracted(module.clone(), vec![]);
        assert_eq!(clean.status, FileStatus::Complete);

        let partial = ExtractionOutcome::extracted(module, vec!["line 3: unrecognized".into()]);
        assert_eq!(partial.status, FileStatus::PartialWithWarnings);

        let failed = ExtractionOutcome::failed(Path::new("b.py"), Some(Language::Python), "bad");
        assert!(failed.status.is_failed());
        assert!(failed.module.is_none());
    }

    #[test]
    fn test_module_entity_count() {
        let mut module = Module::new(Path::new("a.py"), Language::Python);
        let mut class = Class::new(id("a.py::A"), "A", 1);
        let mut method = Function::new(id("a.py::A.m()"), "m", FunctionKind::Method, 2);
        method.parameters.push(Parameter::new(id("a.py::A.m()/self"), "self"));
        class.methods.push(method);
        module.classes.push(class);
        // module + class + method + parameter
        assert_eq!(module.entity_count(), 4);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&FileStatus::Failed {
            reason: "invalid UTF-8".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"state":"failed","reason":"invalid UTF-8"}"#);
    }
}
