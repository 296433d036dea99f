// Python extractor using tree-sitter
//
// Python is the one language parsed with a full grammar. A file with any
// syntax error fails as a whole; everything else reports every class,
// function, parameter, decorator and import found at any depth.

use crate::error::{Error, Result};
use crate::parser::model::*;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Parser for Python source files
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| Error::parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Extract the entities of one Python file
    pub fn parse_source(&mut self, source: &str, path: &Path) -> ExtractionOutcome {
        let Some(tree) = self.parser.parse(source, None) else {
            return ExtractionOutcome::failed(path, Some(Language::Python), "parser produced no tree");
        };

        let root = tree.root_node();
        if root.has_error() {
            return ExtractionOutcome::failed(path, Some(Language::Python), syntax_error_reason(root));
        }

        let mut module = Module::new(path, Language::Python);
        module.line_count = source.lines().count();
        module.docstring = block_docstring(root, source.as_bytes());

        let mut walker = Walker {
            source: source.as_bytes(),
            ids: IdAllocator::new(&module.id),
            module,
        };
        let mut body = Body::default();
        walker.visit_body(root, &Scope::Module, &mut body);

        let mut module = walker.module;
        module.functions = body.functions;
        ExtractionOutcome::extracted(module, Vec::new())
    }
}

/// Describe the first syntax error in the tree
fn syntax_error_reason(root: Node<'_>) -> String {
    match first_error(root) {
        Some(node) if node.is_missing() => format!(
            "syntax error at line {}: missing {}",
            node.start_position().row + 1,
            node.kind()
        ),
        Some(node) => format!("syntax error at line {}", node.start_position().row + 1),
        None => "syntax error".to_string(),
    }
}

fn first_error<'a>(node: Node<'a>) -> Option<Node<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

/// Where a definition appears, with the qualified name of its container
enum Scope {
    Module,
    Class(String),
    Function(String),
}

impl Scope {
    fn qualify(&self, name: &str) -> String {
        match self {
            Scope::Module => name.to_string(),
            Scope::Class(outer) | Scope::Function(outer) => format!("{}.{}", outer, name),
        }
    }

    fn function_kind(&self) -> FunctionKind {
        match self {
            Scope::Module => FunctionKind::TopLevel,
            Scope::Class(_) => FunctionKind::Method,
            Scope::Function(_) => FunctionKind::Nested,
        }
    }
}

/// Functions and attributes collected directly under one container
#[derive(Default)]
struct Body {
    functions: Vec<Function>,
    attributes: Vec<Attribute>,
}

/// Statements whose blocks still belong to the enclosing scope
const COMPOUND_STATEMENTS: &[&str] = &[
    "block",
    "if_statement",
    "elif_clause",
    "else_clause",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_statement",
    "for_statement",
    "while_statement",
    "match_statement",
    "case_clause",
];

struct Walker<'s> {
    source: &'s [u8],
    ids: IdAllocator,
    module: Module,
}

impl<'s> Walker<'s> {
    fn text(&self, node: Node<'_>) -> String {
        node.utf8_text(self.source).unwrap_or_default().to_string()
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> Option<String> {
        node.child_by_field_name(field).map(|n| self.text(n))
    }

    fn visit_body(&mut self, node: Node<'_>, scope: &Scope, out: &mut Body) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" => self.visit_import(child),
                "import_from_statement" => self.visit_import_from(child),
                "class_definition" => self.visit_class(child, Vec::new(), scope),
                "function_definition" => {
                    let func = self.visit_function(child, Vec::new(), scope);
                    out.functions.push(func);
                }
                "decorated_definition" => {
                    let decorators = self.decorators(child);
                    let Some(definition) = child.child_by_field_name("definition") else {
                        continue;
                    };
                    match definition.kind() {
                        "class_definition" => self.visit_class(definition, decorators, scope),
                        "function_definition" => {
                            let func = self.visit_function(definition, decorators, scope);
                            out.functions.push(func);
                        }
                        _ => {}
                    }
                }
                "expression_statement" => {
                    if let Scope::Class(owner) = scope {
                        let attrs = self.class_attributes(child, owner);
                        out.attributes.extend(attrs);
                    }
                }
                kind if COMPOUND_STATEMENTS.contains(&kind) => {
                    self.visit_body(child, scope, out);
                }
                _ => {}
            }
        }
    }

    /// `import a.b, c as d` yields one import per dotted name
    fn visit_import(&mut self, node: Node<'_>) {
        let line = node.start_position().row + 1;
        let mut cursor = node.walk();
        for child in node.children_by_field_name("name", &mut cursor) {
            let (target, name) = match child.kind() {
                "dotted_name" => {
                    let target = self.text(child);
                    let name = ImportedName::new(&target);
                    (target, name)
                }
                "aliased_import" => {
                    let Some(target) = self.field_text(child, "name") else {
                        continue;
                    };
                    let name = match self.field_text(child, "alias") {
                        Some(alias) => ImportedName::with_alias(&target, &alias),
                        None => ImportedName::new(&target),
                    };
                    (target, name)
                }
                _ => continue,
            };
            let id = self.ids.import(line, &target);
            let import = Import::new(id, &target, ImportKind::Direct, line).with_names(vec![name]);
            self.module.imports.push(import);
        }
    }

    /// `from x import y`, `from ..x import y as z`, `from . import *`
    fn visit_import_from(&mut self, node: Node<'_>) {
        let line = node.start_position().row + 1;
        let Some(module_node) = node.child_by_field_name("module_name") else {
            return;
        };
        let target = self.text(module_node);

        let kind = if module_node.kind() == "relative_import" {
            let level = target.chars().take_while(|c| *c == '.').count();
            ImportKind::Relative { level }
        } else {
            ImportKind::From
        };

        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.id() == module_node.id() {
                continue;
            }
            match child.kind() {
                "dotted_name" => names.push(ImportedName::new(&self.text(child))),
                "aliased_import" => {
                    if let Some(name) = self.field_text(child, "name") {
                        names.push(match self.field_text(child, "alias") {
                            Some(alias) => ImportedName::with_alias(&name, &alias),
                            None => ImportedName::new(&name),
                        });
                    }
                }
                "wildcard_import" => names.push(ImportedName::new("*")),
                _ => {}
            }
        }

        let id = self.ids.import(line, &target);
        self.module
            .imports
            .push(Import::new(id, &target, kind, line).with_names(names));
    }

    fn visit_class(&mut self, node: Node<'_>, decorators: Vec<String>, scope: &Scope) {
        let Some(name) = self.field_text(node, "name") else {
            return;
        };
        let qualified = scope.qualify(&name);
        let id = self.ids.class(&qualified);
        let mut class = Class::new(id, &name, node.start_position().row + 1);
        class.qualified_name = qualified.clone();
        class.decorators = decorators;

        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            class.bases = self.bases(superclasses);
        }

        // Reserve the slot so an outer class precedes the classes nested in it
        let slot = self.module.classes.len();
        if let Some(body) = node.child_by_field_name("body") {
            class.docstring = block_docstring(body, self.source);
            let mut members = Body::default();
            self.visit_body(body, &Scope::Class(qualified), &mut members);
            class.methods = members.functions;
            class.attributes = members.attributes;
        }
        self.module.classes.insert(slot, class);
    }

    fn bases(&self, arguments: Node<'_>) -> Vec<String> {
        let mut bases = Vec::new();
        let mut cursor = arguments.walk();
        for child in arguments.named_children(&mut cursor) {
            match child.kind() {
                "identifier" | "attribute" | "subscript" | "call" => bases.push(self.text(child)),
                // metaclass=..., **kwargs
                _ => {}
            }
        }
        bases
    }

    fn visit_function(&mut self, node: Node<'_>, decorators: Vec<String>, scope: &Scope) -> Function {
        let name = self.field_text(node, "name").unwrap_or_default();
        let qualified = scope.qualify(&name);
        let id = self.ids.function(&qualified);
        let mut func = Function::new(id, &name, scope.function_kind(), node.start_position().row + 1);

        func.is_async = has_async_keyword(node);
        func.is_static = decorators.iter().any(|d| d == "staticmethod");
        func.decorators = decorators;
        func.return_type = self.field_text(node, "return_type");

        if let Some(parameters) = node.child_by_field_name("parameters") {
            func.parameters = self.parameters(parameters, &func.id);
        }

        if let Some(body) = node.child_by_field_name("body") {
            func.docstring = block_docstring(body, self.source);
            let mut inner = Body::default();
            self.visit_body(body, &Scope::Function(qualified), &mut inner);
            func.nested = inner.functions;
        }

        func
    }

    /// Decorator names without `@` and call arguments
    fn decorators(&self, node: Node<'_>) -> Vec<String> {
        let mut decorators = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "decorator" {
                let text = self.text(child);
                let dec = text.trim_start_matches('@');
                let dec = match dec.find('(') {
                    Some(idx) => &dec[..idx],
                    None => dec,
                };
                decorators.push(dec.trim().to_string());
            }
        }
        decorators
    }

    fn parameters(&mut self, node: Node<'_>, function: &EntityId) -> Vec<Parameter> {
        let mut params: Vec<Parameter> = Vec::new();
        let mut seen_star = false;
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            let (name, kind, type_hint, default) = match child.kind() {
                "identifier" => (self.text(child), ParameterKind::Regular, None, None),
                "default_parameter" => (
                    self.field_text(child, "name").unwrap_or_default(),
                    ParameterKind::Regular,
                    None,
                    self.field_text(child, "value"),
                ),
                "typed_default_parameter" => (
                    self.field_text(child, "name").unwrap_or_default(),
                    ParameterKind::Regular,
                    self.field_text(child, "type"),
                    self.field_text(child, "value"),
                ),
                "typed_parameter" => {
                    let type_hint = self.field_text(child, "type");
                    let Some(target) = child.named_child(0) else {
                        continue;
                    };
                    let (name, kind) = self.splat(target);
                    (name, kind, type_hint, None)
                }
                "list_splat_pattern" | "dictionary_splat_pattern" => {
                    let (name, kind) = self.splat(child);
                    (name, kind, None, None)
                }
                "keyword_separator" | "*" => {
                    seen_star = true;
                    continue;
                }
                "positional_separator" | "/" => {
                    for param in params.iter_mut() {
                        param.kind = ParameterKind::PositionalOnly;
                    }
                    continue;
                }
                _ => continue,
            };

            if name.is_empty() {
                continue;
            }

            let kind = match kind {
                ParameterKind::Regular if seen_star => ParameterKind::KeywordOnly,
                ParameterKind::VarArgs => {
                    seen_star = true;
                    kind
                }
                other => other,
            };

            let mut param = Parameter::new(self.ids.parameter(function, &name), &name);
            param.kind = kind;
            param.type_hint = type_hint;
            param.default = default;
            params.push(param);
        }

        params
    }

    /// Name and kind of a parameter that may be `*args` or `**kwargs`
    fn splat(&self, node: Node<'_>) -> (String, ParameterKind) {
        let kind = match node.kind() {
            "list_splat_pattern" => ParameterKind::VarArgs,
            "dictionary_splat_pattern" => ParameterKind::VarKeyword,
            _ => return (self.text(node), ParameterKind::Regular),
        };
        let name = node
            .named_child(0)
            .map(|n| self.text(n))
            .unwrap_or_default();
        (name, kind)
    }

    /// `x = 1`, `x: int`, `x: int = 1`, `x = y = 1` directly in a class body
    fn class_attributes(&mut self, node: Node<'_>, owner: &str) -> Vec<Attribute> {
        let Some(first) = node.named_child(0).filter(|n| n.kind() == "assignment") else {
            return Vec::new();
        };

        // Chained targets nest on the right: `x = (y = 0)`
        let mut targets = Vec::new();
        let mut current = first;
        loop {
            if let Some(left) = current.child_by_field_name("left").filter(|l| l.kind() == "identifier") {
                targets.push(left);
            }
            match current.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => current = right,
                _ => break,
            }
        }
        let default = self.field_text(current, "right");
        let type_hint = self.field_text(first, "type");

        targets
            .into_iter()
            .map(|left| {
                let name = self.text(left);
                let id = self.ids.attribute(owner, &name);
                let mut attr = Attribute::new(id, &name, first.start_position().row + 1);
                attr.type_hint = type_hint.clone();
                attr.default = default.clone();
                attr
            })
            .collect()
    }
}

/// Check if a function_definition node has an async keyword
fn has_async_keyword(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == "async");
    found
}

/// Docstring of a module or block: a leading string expression
fn block_docstring(node: Node<'_>, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let first = node
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string = first.named_child(0)?;
    if string.kind() != "string" {
        return None;
    }
    extract_string_content(string, source)
}

/// Extract string content, handling prefixes and triple quotes
fn extract_string_content(node: Node<'_>, source: &[u8]) -> Option<String> {
    let text = node.utf8_text(source).ok()?;
    let text = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());

    let s = if text.starts_with("\"\"\"") || text.starts_with("'''") {
        text.get(3..text.len().saturating_sub(3))?
    } else if text.starts_with('"') || text.starts_with('\'') {
        text.get(1..text.len().saturating_sub(1))?
    } else {
        text
    };

    Some(s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> ExtractionOutcome {
        let mut parser = PythonParser::new().unwrap();
        parser.parse_source(source, Path::new("test.py"))
    }

    fn parse(source: &str) -> Module {
        let outcome = extract(source);
        assert_eq!(outcome.status, FileStatus::Complete, "{:?}", outcome.status);
        outcome.module.unwrap()
    }

    #[test]
    fn test_parser_new() {
        assert!(PythonParser::new().is_ok());
    }

    #[test]
    fn test_empty_file() {
        let module = parse("");
        assert!(module.is_empty());
        assert_eq!(module.name, "test");
        assert_eq!(module.id.as_str(), "test.py");
    }

    #[test]
    fn test_module_docstring() {
        let module = parse(r#""""Module docstring.""""#);
        assert_eq!(module.docstring, Some("Module docstring.".to_string()));
    }

    #[test]
    fn test_simple_import() {
        let module = parse("import os");
        assert_eq!(module.imports.len(), 1);
        assert_eq!(module.imports[0].target, "os");
        assert_eq!(module.imports[0].kind, ImportKind::Direct);
    }

    #[test]
    fn test_import_list_yields_one_entity_each() {
        let module = parse("import os, numpy as np");
        assert_eq!(module.imports.len(), 2);
        assert_eq!(module.imports[1].target, "numpy");
        assert_eq!(module.imports[1].names[0].used_name(), "np");
        assert_ne!(module.imports[0].id, module.imports[1].id);
    }

    #[test]
    fn test_from_import() {
        let module = parse("from os import path, getcwd as cwd");
        assert_eq!(module.imports.len(), 1);
        let import = &module.imports[0];
        assert_eq!(import.target, "os");
        assert_eq!(import.kind, ImportKind::From);
        let names: Vec<_> = import.names.iter().map(|n| n.used_name()).collect();
        assert_eq!(names, vec!["path", "cwd"]);
    }

    #[test]
    fn test_relative_import() {
        let module = parse("from ..utils import helper");
        assert_eq!(module.imports[0].target, "..utils");
        assert_eq!(module.imports[0].kind, ImportKind::Relative { level: 2 });

        let module = parse("from . import sibling");
        assert_eq!(module.imports[0].target, ".");
        assert_eq!(module.imports[0].kind, ImportKind::Relative { level: 1 });
    }

    #[test]
    fn test_wildcard_import() {
        let module = parse("from models import *");
        assert_eq!(module.imports[0].names[0].name, "*");
    }

    #[test]
    fn test_imports_found_at_any_depth() {
        let source = "\
try:
    import ujson as json
except ImportError:
    import json

def lazy():
    from heavy import thing
    return thing
";
        let module = parse(source);
        let targets: Vec<_> = module.imports.iter().map(|i| i.target.as_str()).collect();
        assert_eq!(targets, vec!["ujson", "json", "heavy"]);
    }

    #[test]
    fn test_function_with_params() {
        let module = parse("def greet(name: str, age: int = 0, *, loud=False) -> str: pass");
        let func = &module.functions[0];
        assert_eq!(func.name, "greet");
        assert_eq!(func.kind, FunctionKind::TopLevel);
        assert_eq!(func.return_type.as_deref(), Some("str"));
        assert_eq!(func.parameters.len(), 3);
        assert_eq!(func.parameters[0].type_hint.as_deref(), Some("str"));
        assert_eq!(func.parameters[1].default.as_deref(), Some("0"));
        assert_eq!(func.parameters[2].kind, ParameterKind::KeywordOnly);
    }

    #[test]
    fn test_splat_parameters() {
        let module = parse("def f(a, /, b, *args: int, c, **kwargs): pass");
        let kinds: Vec<_> = module.functions[0].parameters.iter().map(|p| (p.name.as_str(), p.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("a", ParameterKind::PositionalOnly),
                ("b", ParameterKind::Regular),
                ("args", ParameterKind::VarArgs),
                ("c", ParameterKind::KeywordOnly),
                ("kwargs", ParameterKind::VarKeyword),
            ]
        );
        assert_eq!(module.functions[0].parameters[2].type_hint.as_deref(), Some("int"));
    }

    #[test]
    fn test_async_function() {
        let module = parse("async def fetch(url): pass");
        assert!(module.functions[0].is_async);
    }

    #[test]
    fn test_decorated_function() {
        let module = parse("@app.route('/users')\n@cache\ndef users(): pass");
        assert_eq!(module.functions[0].decorators, vec!["app.route", "cache"]);
    }

    #[test]
    fn test_class_with_bases() {
        let module = parse("class Repo(models.Base, Generic[T], metaclass=ABCMeta): pass");
        let class = &module.classes[0];
        assert_eq!(class.bases, vec!["models.Base", "Generic[T]"]);
        assert_eq!(class.id.as_str(), "test.py::Repo");
    }

    #[test]
    fn test_methods_and_nested_functions_are_classified() {
        let source = "\
class Service:
    def run(self):
        def step():
            pass
        return step

    @staticmethod
    def build():
        pass

def outer():
    def inner():
        pass
    return inner
";
        let module = parse(source);
        let class = &module.classes[0];
        assert_eq!(class.methods.len(), 2);
        assert!(class.methods.iter().all(|m| m.kind == FunctionKind::Method));
        assert!(class.methods[1].is_staticmethod());
        assert_eq!(class.methods[0].nested[0].kind, FunctionKind::Nested);

        assert_eq!(module.functions.len(), 1);
        let outer = &module.functions[0];
        assert_eq!(outer.kind, FunctionKind::TopLevel);
        assert_eq!(outer.nested.len(), 1);
        assert_eq!(outer.nested[0].name, "inner");
        assert_eq!(outer.nested[0].kind, FunctionKind::Nested);
        assert_eq!(outer.nested[0].id.as_str(), "test.py::outer.inner()");
    }

    #[test]
    fn test_nested_class_is_qualified() {
        let source = "\
class Outer:
    class Meta:
        ordering = ['name']
";
        let module = parse(source);
        assert_eq!(module.classes.len(), 2);
        assert_eq!(module.classes[0].name, "Outer");
        assert_eq!(module.classes[1].name, "Meta");
        assert_eq!(module.classes[1].qualified_name, "Outer.Meta");
        assert_eq!(module.classes[1].attributes[0].name, "ordering");
    }

    #[test]
    fn test_class_attributes() {
        let source = "\
@dataclass
class User:
    \"\"\"A user.\"\"\"
    name: str
    age: int = 0
    _cache = {}
";
        let module = parse(source);
        let class = &module.classes[0];
        assert!(class.is_dataclass());
        assert_eq!(class.docstring.as_deref(), Some("A user."));
        assert_eq!(class.attributes.len(), 3);
        assert_eq!(class.attributes[0].type_hint.as_deref(), Some("str"));
        assert_eq!(class.attributes[1].default.as_deref(), Some("0"));
        assert_eq!(class.attributes[2].visibility, Visibility::Private);
    }

    #[test]
    fn test_chained_assignment_records_every_target() {
        let source = "class Point:\n    x = y = 0\n    a, b = 1, 2\n";
        let module = parse(source);
        let attrs: Vec<_> = module.classes[0].attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec!["x", "y"]);
        assert!(module.classes[0]
            .attributes
            .iter()
            .all(|a| a.default.as_deref() == Some("0")));
    }

    #[test]
    fn test_redefinition_gets_distinct_ids() {
        let module = parse("class A: pass\nclass A: pass\n");
        assert_eq!(module.classes.len(), 2);
        assert_ne!(module.classes[0].id, module.classes[1].id);
    }

    #[test]
    fn test_syntax_error_fails_file() {
        let outcome = extract("def broken(:\n    pass\n");
        assert!(outcome.status.is_failed());
        assert!(outcome.module.is_none());
    }

    #[test]
    fn test_unterminated_string_fails_file() {
        let outcome = extract("def ok():\n    return 1\n\nmessage = \"never closed\n");
        match outcome.status {
            FileStatus::Failed { reason } => assert!(reason.contains("syntax error")),
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_models() {
        let source = r#"
from dataclasses import dataclass
from typing import List, Optional

@dataclass
class BaseModel:
    id: int
    created_at: str

class UserModel(BaseModel):
    def __init__(self, name: str, email: str):
        self.name = name
        self.email = email

    def get_display_name(self) -> str:
        return f"{self.name} <{self.email}>"

def get_user_by_id(user_id: int) -> Optional[UserModel]:
    return None

async def fetch_users() -> List[UserModel]:
    return []
"#;
        let module = parse(source);
        assert_eq!(module.imports.len(), 2);
        assert_eq!(module.classes.len(), 2);
        let user = module.find_class("UserModel").unwrap();
        assert_eq!(user.bases, vec!["BaseModel"]);
        assert_eq!(user.methods.len(), 2);
        assert_eq!(user.methods[0].explicit_parameters().count(), 2);
        assert_eq!(module.functions.len(), 2);
        assert!(module.find_function("fetch_users").unwrap().is_async);
    }
}
