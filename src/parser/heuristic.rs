// Pattern-based extractor for languages without a bundled grammar
//
// Declarations are found with per-language patterns over masked source and
// placed by brace depth: a function directly inside a class body is a method,
// one inside another function's body is nested. Nothing here fails on odd
// input; lines that look like declarations but match no pattern become
// warnings and the file is reported as partial.

use crate::parser::model::*;
use crate::parser::patterns::{self, DefaultVisibility, LanguagePatterns, ParamStyle};
use crate::parser::scan::Scan;
use regex::Captures;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// Words that can sit where a function name is expected but never are one
const NOT_A_NAME: &[&str] = &[
    "if", "else", "elif", "for", "foreach", "while", "do", "switch", "case", "catch", "try",
    "return", "function", "new", "typeof", "sizeof", "using", "lock", "fixed", "synchronized",
    "with", "match", "when", "guard", "defer", "go", "select", "throw", "delete", "await",
    "yield", "super", "this", "unless", "until", "assert",
];

/// Words that can start a field-like line without being a type
const NOT_A_TYPE: &[&str] = &[
    "return", "throw", "package", "import", "new", "else", "case", "break", "continue", "goto",
    "assert", "yield", "using", "friend", "typedef", "namespace", "public:", "private:",
    "protected:", "delete", "await", "class", "struct", "enum", "export", "default",
    "static_assert", "event", "operator",
];

/// Extractor for every language handled by patterns
#[derive(Debug, Default)]
pub struct HeuristicParser;

impl HeuristicParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract the entities of one file
    pub fn parse_source(&self, source: &str, path: &Path, language: Language) -> ExtractionOutcome {
        let patterns = match patterns::for_language(language) {
            Ok(patterns) => patterns,
            Err(reason) => return ExtractionOutcome::failed(path, Some(language), reason),
        };

        let source = source.replace("\r\n", "\n");
        let scan = Scan::new(&source, &patterns.syntax);

        let mut module = Module::new(path, language);
        module.line_count = scan.line_count();

        let mut extraction = Extraction {
            scan: &scan,
            patterns,
            ids: IdAllocator::new(&module.id),
            recognized: BTreeSet::new(),
        };
        module.imports = extraction.imports();
        module.exports = extraction.exports();
        let classes = extraction.classes();
        let impls = extraction.impls();
        let functions = extraction.functions();
        extraction.assemble(&mut module, &classes, &impls, &functions);
        let warnings = extraction.warnings();

        debug!(
            path = %path.display(),
            language = %language,
            classes = module.classes.len(),
            functions = module.functions.len(),
            imports = module.imports.len(),
            warnings = warnings.len(),
            "pattern extraction finished"
        );
        ExtractionOutcome::extracted(module, warnings)
    }
}

struct ClassDecl {
    name: String,
    qualified: String,
    kind: ClassKind,
    bases: Vec<String>,
    /// Kotlin primary constructor parameters
    ctor: Option<String>,
    line: usize,
    pos: usize,
    body: Option<Range<usize>>,
}

/// `impl Type`, `impl Trait for Type`, `extension Type: Proto`
struct ImplDecl {
    target: String,
    traits: Vec<String>,
    body: Option<Range<usize>>,
}

struct FnDecl {
    name: String,
    form: FunctionForm,
    mods: String,
    params: String,
    ret: Option<String>,
    receiver: Option<String>,
    line: usize,
    pos: usize,
    body: Option<Range<usize>>,
    member_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    TopLevel,
    Method(usize),
    Nested(usize),
    Skip,
}

struct Extraction<'a> {
    scan: &'a Scan,
    patterns: &'static LanguagePatterns,
    ids: IdAllocator,
    /// Lines holding a declaration some pattern accepted
    recognized: BTreeSet<usize>,
}

impl<'a> Extraction<'a> {
    /// Trimmed, non-empty text of a capture group
    fn group(&self, caps: &Captures<'_>, name: &str) -> Option<&'a str> {
        self.group_at(caps, name, 0)
    }

    /// Same as `group` for captures taken on a slice starting at `offset`
    fn group_at(&self, caps: &Captures<'_>, name: &str, offset: usize) -> Option<&'a str> {
        let m = caps.name(name)?;
        let scan: &'a Scan = self.scan;
        let text = scan.text[offset + m.start()..offset + m.end()].trim();
        (!text.is_empty()).then_some(text)
    }

    /// Exported names in source order, each once
    fn exports(&self) -> Vec<String> {
        let mut found: Vec<(usize, String)> = Vec::new();
        for regex in &self.patterns.exports {
            for caps in regex.captures_iter(&self.scan.code) {
                let Some(whole) = caps.get(0) else { continue };
                // `export default class extends Base` has no name
                if let Some(name) = self.group(&caps, "name").filter(|n| *n != "extends") {
                    found.push((whole.start(), name.to_string()));
                }
                if let Some(names) = self.group(&caps, "names") {
                    let listed = imported_names(names);
                    found.extend(listed.iter().map(|n| (whole.start(), n.used_name().to_string())));
                }
            }
        }
        found.sort_by_key(|(pos, _)| *pos);

        let mut seen = HashSet::new();
        found
            .into_iter()
            .filter_map(|(_, name)| seen.insert(name.clone()).then_some(name))
            .collect()
    }

    fn imports(&mut self) -> Vec<Import> {
        struct Found {
            pos: usize,
            line: usize,
            target: String,
            names: Vec<ImportedName>,
            kind: ImportKind,
        }

        let code = &self.scan.code;
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        for pattern in &self.patterns.imports {
            for caps in pattern.regex.captures_iter(code) {
                let Some(whole) = caps.get(0) else { continue };
                if pattern.top_level_only && self.scan.depth_at(whole.start()) > 0 {
                    continue;
                }

                let mut targets = Vec::new();
                match (&pattern.item, caps.name("block")) {
                    (Some(item), Some(block)) => {
                        for inner in item.captures_iter(&code[block.range()]) {
                            if let Some(target) = inner.name("target") {
                                targets.push((block.start() + target.start(), block.start() + target.end(), None));
                            }
                        }
                    }
                    _ => {
                        if let Some(target) = caps.name("target") {
                            targets.push((target.start(), target.end(), self.group(&caps, "names")));
                        }
                    }
                }

                for (start, end, names) in targets {
                    let target = self.scan.text[start..end].trim();
                    if target.is_empty() || !seen.insert(start) {
                        continue;
                    }
                    let line = self.scan.line_of(start);
                    self.recognized.insert(line);
                    found.push(Found {
                        pos: start,
                        line,
                        target: target.to_string(),
                        names: names.map(imported_names).unwrap_or_default(),
                        kind: pattern.kind,
                    });
                }
            }
        }

        found.sort_by_key(|f| f.pos);
        found
            .into_iter()
            .map(|f| {
                let id = self.ids.import(f.line, &f.target);
                Import::new(id, &f.target, f.kind, f.line).with_names(f.names)
            })
            .collect()
    }

    fn classes(&mut self) -> Vec<ClassDecl> {
        let mut decls = Vec::new();

        for pattern in &self.patterns.classes {
            for caps in pattern.regex.captures_iter(&self.scan.code) {
                let Some(name_match) = caps.name("name") else { continue };
                let written = &self.scan.text[name_match.range()];
                let name = written.rsplit("::").next().unwrap_or(written).to_string();
                let mods = self.group(&caps, "mods").unwrap_or_default();
                let kind = pattern
                    .kind
                    .unwrap_or_else(|| class_kind(self.group(&caps, "kind").unwrap_or("class"), mods));

                let mut bases: Vec<String> = self.group(&caps, "bases").map(split_bases).unwrap_or_default();
                if let Some(implements) = self.group(&caps, "implements") {
                    bases.extend(split_bases(implements));
                }

                let open = caps.name("open").map(|m| m.start());
                let pos = name_match.start();
                let line = self.scan.line_of(pos);
                self.recognized.insert(line);

                decls.push(ClassDecl {
                    qualified: name.clone(),
                    name,
                    kind,
                    bases,
                    ctor: self.group(&caps, "ctor").map(str::to_string),
                    line,
                    pos,
                    body: self.scan.body(pos, open),
                });
            }
        }

        decls.sort_by_key(|d| d.pos);
        decls.dedup_by_key(|d| d.pos);

        for i in 0..decls.len() {
            let outer = (0..i)
                .rev()
                .find(|&j| decls[j].body.as_ref().is_some_and(|b| b.contains(&decls[i].pos)));
            if let Some(j) = outer {
                decls[i].qualified = format!("{}.{}", decls[j].qualified, decls[i].name);
            }
        }
        decls
    }

    fn impls(&mut self) -> Vec<ImplDecl> {
        let mut decls = Vec::new();
        for regex in &self.patterns.impls {
            for caps in regex.captures_iter(&self.scan.code) {
                let (Some(whole), Some(target)) = (caps.get(0), self.group(&caps, "target")) else {
                    continue;
                };
                self.recognized.insert(self.scan.line_of(whole.start()));
                let target = target.rsplit([':', '.']).next().unwrap_or(target).to_string();
                decls.push(ImplDecl {
                    target,
                    traits: self.group(&caps, "trait").map(split_bases).unwrap_or_default(),
                    body: self.scan.body(whole.start(), caps.name("open").map(|m| m.start())),
                });
            }
        }
        decls
    }

    fn functions(&self) -> Vec<FnDecl> {
        let mut decls = Vec::new();
        let mut seen = HashSet::new();

        let patterns = self.patterns;
        let candidates = patterns
            .functions
            .iter()
            .map(|p| (p, false))
            .chain(patterns.methods.iter().map(|p| (p, true)));

        for (pattern, member_only) in candidates {
            for caps in pattern.regex.captures_iter(&self.scan.code) {
                let Some(name_match) = caps.name("name") else { continue };
                let written = &self.scan.text[name_match.range()];
                let (qualifier, name) = match written.rsplit_once("::") {
                    Some((qualifier, name)) => (Some(qualifier), name),
                    None => (None, written),
                };
                if NOT_A_NAME.contains(&name) || !seen.insert(name_match.start()) {
                    continue;
                }

                let receiver = self
                    .group(&caps, "recv")
                    .or_else(|| qualifier.map(|q| q.rsplit("::").next().unwrap_or(q)))
                    .map(str::to_string);
                let params = self
                    .group(&caps, "params")
                    .or_else(|| self.group(&caps, "param"))
                    .unwrap_or_default();
                let pos = name_match.start();

                decls.push(FnDecl {
                    name: name.to_string(),
                    form: pattern.form,
                    mods: self.group(&caps, "mods").unwrap_or_default().to_string(),
                    params: params.to_string(),
                    ret: self.group(&caps, "ret").map(str::to_string),
                    receiver,
                    line: self.scan.line_of(pos),
                    pos,
                    body: self.scan.body(pos, caps.name("open").map(|m| m.start())),
                    member_only,
                });
            }
        }

        decls.sort_by_key(|d| d.pos);
        decls
    }

    /// Decide where each function belongs, in source order
    fn place(&self, classes: &[ClassDecl], impls: &[ImplDecl], functions: &[FnDecl]) -> Vec<Placement> {
        let class_named = |name: &str| classes.iter().position(|c| c.name == name);
        let mut placements: Vec<Placement> = Vec::with_capacity(functions.len());

        for (idx, decl) in functions.iter().enumerate() {
            let placement = match decl.receiver.as_deref() {
                Some(receiver) if receiver != "self" => match class_named(receiver) {
                    Some(c) => Placement::Method(c),
                    None => Placement::TopLevel,
                },
                _ => self.place_by_container(decl, idx, classes, impls, functions, &placements, &class_named),
            };
            placements.push(placement);
        }
        placements
    }

    #[allow(clippy::too_many_arguments)]
    fn place_by_container(
        &self,
        decl: &FnDecl,
        idx: usize,
        classes: &[ClassDecl],
        impls: &[ImplDecl],
        functions: &[FnDecl],
        placed: &[Placement],
        class_named: &dyn Fn(&str) -> Option<usize>,
    ) -> Placement {
        enum Container {
            Class(usize),
            Impl(usize),
            Function(usize),
        }

        let contains = |body: &Option<Range<usize>>| body.as_ref().filter(|b| b.contains(&decl.pos)).map(|b| b.start);
        let mut innermost: Option<(usize, Container)> = None;
        let mut consider = |start: Option<usize>, container: Container| {
            if let Some(start) = start {
                if innermost.as_ref().map_or(true, |(best, _)| start > *best) {
                    innermost = Some((start, container));
                }
            }
        };

        for (i, class) in classes.iter().enumerate() {
            consider(contains(&class.body), Container::Class(i));
        }
        for (i, block) in impls.iter().enumerate() {
            consider(contains(&block.body), Container::Impl(i));
        }
        for (i, function) in functions[..idx].iter().enumerate() {
            if placed[i] != Placement::Skip {
                consider(contains(&function.body), Container::Function(i));
            }
        }

        let direct_member = |start: usize| self.scan.depth_at(decl.pos) == self.scan.depth_at(start);
        match innermost {
            None if decl.member_only => Placement::Skip,
            None => Placement::TopLevel,
            Some((_, Container::Function(_))) if decl.member_only => Placement::Skip,
            Some((_, Container::Function(parent))) => Placement::Nested(parent),
            Some((start, Container::Class(c))) if direct_member(start) => Placement::Method(c),
            Some((start, Container::Impl(i))) if direct_member(start) => {
                class_named(&impls[i].target).map_or(Placement::TopLevel, Placement::Method)
            }
            Some(_) => Placement::Skip,
        }
    }

    fn assemble(&mut self, module: &mut Module, classes: &[ClassDecl], impls: &[ImplDecl], functions: &[FnDecl]) {
        let placements = self.place(classes, impls, functions);

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); functions.len()];
        let mut methods: Vec<Vec<usize>> = vec![Vec::new(); classes.len()];
        let mut top_level = Vec::new();
        let mut member_lines = BTreeSet::new();

        for (idx, placement) in placements.iter().enumerate() {
            match *placement {
                Placement::TopLevel => top_level.push(idx),
                Placement::Method(c) => methods[c].push(idx),
                Placement::Nested(parent) => children[parent].push(idx),
                Placement::Skip => continue,
            }
            self.recognized.insert(functions[idx].line);
            member_lines.insert(functions[idx].line);
        }

        // Bases contributed by `impl Trait for Type` and extensions
        let mut extra_bases: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for block in impls {
            if let Some(c) = classes.iter().position(|c| c.name == block.target) {
                extra_bases.entry(c).or_default().extend(block.traits.iter().cloned());
            }
        }

        for (c, decl) in classes.iter().enumerate() {
            let id = self.ids.class(&decl.qualified);
            let mut class = Class::new(id, &decl.name, decl.line).with_kind(decl.kind);
            class.qualified_name = decl.qualified.clone();
            class.bases = decl.bases.clone();
            for base in extra_bases.remove(&c).unwrap_or_default() {
                if !class.bases.contains(&base) {
                    class.bases.push(base);
                }
            }
            if matches!(decl.kind, ClassKind::Class | ClassKind::Struct) {
                class.attributes = self.attributes(decl, &member_lines);
            }
            let interface = decl.kind == ClassKind::Interface;
            class.methods = methods[c]
                .iter()
                .map(|&m| {
                    let mut method =
                        self.build_function(functions, &children, m, Some(&decl.qualified), FunctionKind::Method);
                    if interface {
                        method.visibility = Visibility::Public;
                    }
                    method
                })
                .collect();
            module.classes.push(class);
        }

        module.functions = top_level
            .iter()
            .map(|&f| self.build_function(functions, &children, f, None, FunctionKind::TopLevel))
            .collect();
    }

    fn build_function(
        &mut self,
        functions: &[FnDecl],
        children: &[Vec<usize>],
        idx: usize,
        prefix: Option<&str>,
        kind: FunctionKind,
    ) -> Function {
        let decl = &functions[idx];
        let name = decl.name.trim_start_matches('#');
        let qualified = prefix.map_or_else(|| name.to_string(), |p| format!("{}.{}", p, name));
        let id = self.ids.function(&qualified);

        let mut function = Function::new(id.clone(), name, kind, decl.line);
        function.form = decl.form;
        function.return_type = decl.ret.clone();
        function.visibility = self.visibility(&decl.mods, &decl.name);
        function.is_async = has_word(&decl.mods, "async") || has_word(&decl.mods, "suspend");
        function.is_static = decl.receiver.as_deref() == Some("self")
            || has_word(&decl.mods, "static")
            || (kind == FunctionKind::Method && has_word(&decl.mods, "class"));
        function.parameters = self.parameters(&decl.params, &id);
        function.nested = children[idx]
            .iter()
            .map(|&child| self.build_function(functions, children, child, Some(&qualified), FunctionKind::Nested))
            .collect();
        function
    }

    fn parameters(&mut self, text: &str, function: &EntityId) -> Vec<Parameter> {
        let style = self.patterns.syntax.params;
        split_top_level(text, &[','])
            .into_iter()
            .filter_map(|raw| parse_parameter(raw, style))
            .map(|parsed| {
                let id = self.ids.parameter(function, &parsed.name);
                let mut parameter = Parameter::new(id, &parsed.name);
                parameter.type_hint = parsed.type_hint;
                parameter.default = parsed.default;
                parameter.kind = parsed.kind;
                parameter
            })
            .collect()
    }

    fn attributes(&mut self, class: &ClassDecl, member_lines: &BTreeSet<usize>) -> Vec<Attribute> {
        let mut attributes: Vec<Attribute> = Vec::new();

        if let Some(ctor) = &class.ctor {
            for raw in split_top_level(ctor, &[',']) {
                let words: Vec<&str> = raw.split_whitespace().collect();
                if !words.iter().any(|w| *w == "val" || *w == "var") {
                    continue;
                }
                if let Some(parsed) = parse_parameter(raw, ParamStyle::NameColonType) {
                    let id = self.ids.attribute(&class.qualified, &parsed.name);
                    let mut attribute = Attribute::new(id, &parsed.name, class.line);
                    attribute.type_hint = parsed.type_hint;
                    attribute.default = parsed.default;
                    attribute.visibility = self.visibility(raw, &parsed.name);
                    attributes.push(attribute);
                }
            }
        }

        let Some(body) = class.body.clone() else {
            return attributes;
        };
        let depth = self.scan.body_depth(&body);
        let mut found = Vec::new();

        for regex in &self.patterns.fields {
            for caps in regex.captures_iter(&self.scan.code[body.clone()]) {
                let Some(whole) = caps.get(0) else { continue };
                let anchor = caps.name("name").or_else(|| caps.name("names")).unwrap_or(whole);
                let pos = body.start + anchor.start();
                let line = self.scan.line_of(pos);
                if self.scan.depth_at(pos) != depth || member_lines.contains(&line) {
                    continue;
                }

                let type_hint = self.group_at(&caps, "type", body.start);
                if type_hint
                    .and_then(|t| t.split_whitespace().next())
                    .is_some_and(|first| NOT_A_TYPE.contains(&first))
                {
                    continue;
                }
                let mods = self.group_at(&caps, "mods", body.start).unwrap_or_default();

                let names: Vec<String> = match self.group_at(&caps, "names", body.start) {
                    Some(list) => list
                        .split(',')
                        .map(|n| n.trim().trim_start_matches(':').to_string())
                        .filter(|n| !n.is_empty())
                        .collect(),
                    None => self
                        .group_at(&caps, "name", body.start)
                        .map(|n| vec![n.to_string()])
                        .unwrap_or_default(),
                };

                for name in names {
                    if NOT_A_NAME.contains(&name.as_str()) {
                        continue;
                    }
                    found.push((pos, line, name, type_hint.map(str::to_string), mods.to_string()));
                }
                self.recognized.insert(line);
            }
        }

        found.sort_by_key(|f| f.0);
        for (_, line, name, type_hint, mods) in found {
            let plain = name.trim_start_matches('#');
            if attributes.iter().any(|a| a.name == plain) {
                continue;
            }
            let id = self.ids.attribute(&class.qualified, plain);
            let mut attribute = Attribute::new(id, plain, line);
            attribute.type_hint = type_hint;
            attribute.visibility = self.visibility(&mods, &name);
            attribute.is_static = has_word(&mods, "static") || has_word(&mods, "const");
            attributes.push(attribute);
        }
        attributes
    }

    fn visibility(&self, mods: &str, name: &str) -> Visibility {
        if has_word(mods, "private") || has_word(mods, "fileprivate") {
            return Visibility::Private;
        }
        if has_word(mods, "protected") {
            return Visibility::Protected;
        }
        if has_word(mods, "public") || has_word(mods, "open") || mods.trim_start().starts_with("pub") {
            return Visibility::Public;
        }
        match self.patterns.syntax.visibility {
            DefaultVisibility::ByName => Visibility::from_name(name),
            DefaultVisibility::Private => Visibility::Private,
            DefaultVisibility::ExportCase => {
                if name.starts_with(|c: char| c.is_uppercase()) {
                    Visibility::Public
                } else {
                    Visibility::Private
                }
            }
        }
    }

    fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut reported = BTreeSet::new();

        for caps in self.patterns.probe.captures_iter(&self.scan.code) {
            let (Some(whole), Some(kw)) = (caps.get(0), caps.name("kw")) else {
                continue;
            };
            let line = self.scan.line_of(whole.start());
            if !self.recognized.contains(&line) && reported.insert(line) {
                warnings.push(format!("line {}: unrecognized {} declaration", line, kw.as_str()));
            }
        }

        if self.scan.unclosed > 0 {
            warnings.push(format!(
                "unbalanced braces: {} left open at end of file",
                self.scan.unclosed
            ));
        }
        if let Some(line) = self.scan.stray_close {
            warnings.push(format!("line {}: closing brace without a matching opening brace", line));
        }
        warnings
    }
}

fn has_word(text: &str, word: &str) -> bool {
    text.split_whitespace().any(|w| w == word)
}

fn class_kind(keyword: &str, mods: &str) -> ClassKind {
    if has_word(mods, "enum") {
        return ClassKind::Enum;
    }
    match keyword.split_whitespace().last().unwrap_or(keyword) {
        "interface" | "@interface" | "protocol" | "trait" => ClassKind::Interface,
        "struct" | "union" => ClassKind::Struct,
        "enum" => ClassKind::Enum,
        _ => ClassKind::Class,
    }
}

/// Base list as written, one entry per base
fn split_bases(text: &str) -> Vec<String> {
    split_top_level(text, &[',', '+'])
        .into_iter()
        .filter_map(|base| {
            let base = base
                .split_whitespace()
                .skip_while(|w| matches!(*w, "public" | "private" | "protected" | "virtual" | "internal"))
                .collect::<Vec<_>>()
                .join(" ");
            let base = base.split('(').next().unwrap_or_default().trim();
            let usable = !base.is_empty() && !base.starts_with(['\'', '?']);
            usable.then(|| base.to_string())
        })
        .collect()
}

/// Names listed in an import clause (`React, { useState as s }`, `* as fs`)
fn imported_names(text: &str) -> Vec<ImportedName> {
    let text = text.trim();
    let (outside, inside) = match (text.find('{'), text.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            format!("{} {}", &text[..open], &text[close + 1..]),
            Some(&text[open + 1..close]),
        ),
        _ => (text.to_string(), None),
    };

    outside
        .split(',')
        .chain(inside.into_iter().flat_map(|i| i.split(',')))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let part = part.strip_prefix("type ").unwrap_or(part).trim();
            match part.split_once(" as ") {
                Some((name, alias)) => ImportedName::with_alias(name.trim(), alias.trim()),
                None => ImportedName::new(part),
            }
        })
        .collect()
}

/// Split on separators outside any brackets
fn split_top_level<'t>(text: &'t str, separators: &[char]) -> Vec<&'t str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut prev = '\0';

    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '>' if prev != '=' && prev != '-' => depth -= 1,
            c if depth <= 0 && separators.contains(&c) => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
        prev = c;
    }
    parts.push(&text[start..]);
    parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect()
}

/// Split `decl = default` at the first top-level assignment sign
fn split_default(text: &str) -> (&str, Option<&str>) {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| bytes[p]);
        match b {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'>' if !matches!(prev, Some(b'=' | b'-')) => depth -= 1,
            b'=' if depth <= 0 => {
                let next = bytes.get(i + 1).copied();
                if !matches!(next, Some(b'>' | b'=')) && !matches!(prev, Some(b'=' | b'!' | b'<' | b'>')) {
                    return (text[..i].trim(), Some(text[i + 1..].trim()));
                }
            }
            _ => {}
        }
    }
    (text.trim(), None)
}

#[derive(Debug, PartialEq)]
struct ParsedParameter {
    name: String,
    type_hint: Option<String>,
    default: Option<String>,
    kind: ParameterKind,
}

fn parse_parameter(raw: &str, style: ParamStyle) -> Option<ParsedParameter> {
    let raw = strip_annotations(raw.trim());
    if raw.is_empty() || raw == "void" || raw == "..." {
        return None;
    }

    let (decl, default) = split_default(raw);
    let mut kind = ParameterKind::Regular;
    let mut decl = decl;

    if let Some(rest) = decl.strip_prefix("...") {
        kind = ParameterKind::VarArgs;
        decl = rest;
    } else if style == ParamStyle::Untyped {
        if let Some(rest) = decl.strip_prefix("**") {
            kind = ParameterKind::VarKeyword;
            decl = rest;
        } else if let Some(rest) = decl.strip_prefix('*') {
            kind = ParameterKind::VarArgs;
            decl = rest;
        } else if let Some(rest) = decl.strip_prefix('&') {
            decl = rest;
        }
    }
    if decl.contains("...") {
        kind = ParameterKind::VarArgs;
    }

    let (name, type_hint) = match style {
        ParamStyle::NameColonType => {
            let parts = split_top_level(decl, &[':']);
            let left = parts.first().copied().unwrap_or_default();
            let type_hint = decl
                .find(':')
                .filter(|_| parts.len() > 1)
                .map(|i| decl[i + 1..].trim().to_string());
            let name = if left.starts_with(['{', '[']) {
                left.to_string()
            } else {
                left.split_whitespace()
                    .last()
                    .unwrap_or_default()
                    .trim_start_matches('&')
                    .trim_end_matches('?')
                    .to_string()
            };
            (name, type_hint)
        }
        ParamStyle::TypeName => {
            let mut words: Vec<&str> = decl
                .split_whitespace()
                .filter(|w| {
                    !matches!(
                        *w,
                        "final" | "const" | "ref" | "out" | "in" | "this" | "readonly" | "public" | "private" | "protected"
                    )
                })
                .collect();
            if let Some(i) = words.iter().position(|w| *w == "params") {
                kind = ParameterKind::VarArgs;
                words.remove(i);
            }
            let Some(last) = words.pop() else {
                return None;
            };
            let mut type_hint = words.join(" ");
            let name = last.trim_start_matches(['*', '&']);
            type_hint.push_str(&last[..last.len() - name.len()]);
            let (name, array) = match name.find('[') {
                Some(i) => (&name[..i], &name[i..]),
                None => (name, ""),
            };
            type_hint.push_str(array);
            let name = name.trim_start_matches("...").trim_start_matches('$');
            let type_hint = type_hint.trim().trim_end_matches("...").trim();
            (name.to_string(), (!type_hint.is_empty()).then(|| type_hint.to_string()))
        }
        ParamStyle::NameType => {
            let mut words = decl.split_whitespace();
            let name = words.next().unwrap_or_default().to_string();
            let rest = words.collect::<Vec<_>>().join(" ");
            (name, (!rest.is_empty()).then_some(rest))
        }
        ParamStyle::Untyped => match decl.split_once(':') {
            Some((name, value)) => {
                let value = value.trim();
                let default = default.or((!value.is_empty()).then_some(value));
                return Some(ParsedParameter {
                    name: name.trim().to_string(),
                    type_hint: None,
                    default: default.map(str::to_string),
                    kind,
                });
            }
            None => (decl.trim().to_string(), None),
        },
    };

    if name.is_empty() {
        return None;
    }
    Some(ParsedParameter {
        name,
        type_hint,
        default: default.map(str::to_string),
        kind,
    })
}

/// Drop leading `@Annotation(...)` and `[Attribute]` markers
fn strip_annotations(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        if let Some(rest) = text.strip_prefix('@') {
            let end = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                .unwrap_or(rest.len());
            let mut rest = &rest[end..];
            if rest.starts_with('(') {
                rest = rest.find(')').map_or("", |close| &rest[close + 1..]);
            }
            text = rest;
        } else if text.starts_with('[') && !text.starts_with("[]") {
            match text.find(']') {
                Some(close) => text = &text[close + 1..],
                None => return text,
            }
        } else {
            return text;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str, file: &str) -> ExtractionOutcome {
        let path = Path::new(file);
        let language = Language::from_path(path).unwrap();
        HeuristicParser::new().parse_source(source, path, language)
    }

    fn module(source: &str, file: &str) -> Module {
        let outcome = extract(source, file);
        assert!(outcome.warnings.is_empty(), "unexpected warnings: {:?}", outcome.warnings);
        outcome.module.unwrap()
    }

    #[test]
    fn test_typescript_class_with_members() {
        let source = r#"
import { Repository } from './repository';
import * as fs from "fs";

export class UserService extends BaseService implements Disposable, Loggable {
  private repo: Repository;
  static count = 0;
  #secret = "x";

  constructor(repo: Repository) {
    super();
    this.repo = repo;
  }

  async findUser(id: string, ...rest: any[]): Promise<User> {
    const helper = (x) => x + 1;
    return this.repo.find(id);
  }

  protected dispose(): void {}
}
"#;
        let m = module(source, "src/services/user.ts");
        assert_eq!(m.imports.len(), 2);
        assert_eq!(m.imports[0].target, "./repository");
        assert_eq!(m.imports[0].names[0].name, "Repository");
        assert_eq!(m.imports[1].names[0].used_name(), "fs");

        let class = m.find_class("UserService").unwrap();
        assert_eq!(class.bases, vec!["BaseService", "Disposable", "Loggable"]);

        let attrs: Vec<_> = class.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec!["repo", "count", "secret"]);
        assert_eq!(class.attributes[0].visibility, Visibility::Private);
        assert_eq!(class.attributes[0].type_hint.as_deref(), Some("Repository"));
        assert!(class.attributes[1].is_static);
        assert_eq!(class.attributes[2].visibility, Visibility::Private);

        let methods: Vec<_> = class.methods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(methods, vec!["constructor", "findUser", "dispose"]);

        let find = class.find_method("findUser").unwrap();
        assert_eq!(find.kind, FunctionKind::Method);
        assert!(find.is_async);
        assert_eq!(find.return_type.as_deref(), Some("Promise<User>"));
        assert_eq!(find.parameters.len(), 2);
        assert_eq!(find.parameters[1].kind, ParameterKind::VarArgs);
        assert_eq!(find.nested.len(), 1);
        assert_eq!(find.nested[0].name, "helper");
        assert_eq!(find.nested[0].form, FunctionForm::Arrow);
        assert_eq!(find.nested[0].kind, FunctionKind::Nested);

        assert_eq!(class.find_method("dispose").unwrap().visibility, Visibility::Protected);
    }

    #[test]
    fn test_javascript_function_forms() {
        let source = r#"
const path = require('path');
function outer(a, b = 2) {
  function inner() {}
  return inner;
}
export const arrow = async (x) => x * 2;
const anon = function (y) { return y; };
"#;
        let m = module(source, "lib/util.js");
        assert_eq!(m.imports[0].kind, ImportKind::Require);
        assert_eq!(m.imports[0].names[0].name, "path");

        let names: Vec<_> = m.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "arrow", "anon"]);

        let outer = m.find_function("outer").unwrap();
        assert_eq!(outer.parameters[1].default.as_deref(), Some("2"));
        assert_eq!(outer.nested[0].name, "inner");
        assert_eq!(m.find_function("arrow").unwrap().form, FunctionForm::Arrow);
        assert!(m.find_function("arrow").unwrap().is_async);
        assert_eq!(m.find_function("anon").unwrap().form, FunctionForm::Anonymous);
    }

    #[test]
    fn test_declarations_in_comments_and_strings_are_ignored() {
        let source = r#"
// class Ghost {}
/* function phantom() {} */
const text = "class Fake { }";
const tpl = `function notReal() {}`;
class Real {}
"#;
        let m = module(source, "a.js");
        assert_eq!(m.classes.len(), 1);
        assert_eq!(m.classes[0].name, "Real");
        assert!(m.functions.is_empty());
    }

    #[test]
    fn test_typescript_interfaces_and_aliases() {
        let source = r#"
export interface Shape extends Named, Sized {
  area(): number;
  readonly sides?: number;
}
export type Id = string | number;
export enum Color { Red, Green }
"#;
        let m = module(source, "shapes.ts");
        let shape = m.find_class("Shape").unwrap();
        assert_eq!(shape.kind, ClassKind::Interface);
        assert_eq!(shape.bases, vec!["Named", "Sized"]);
        assert_eq!(shape.methods[0].name, "area");
        assert_eq!(shape.methods[0].visibility, Visibility::Public);
        assert_eq!(m.find_class("Id").unwrap().kind, ClassKind::TypeAlias);
        assert_eq!(m.find_class("Color").unwrap().kind, ClassKind::Enum);
    }

    #[test]
    fn test_exported_names() {
        let source = r#"
import { helper } from './helper';

export class Widget {}
export default async function render() {}
export const VERSION = '1.0';
export interface Props { id: string }
function internal() {}
const a = 1, b = 2;
export { internal, a as alias };
export { helper } from './helper';
export default Widget;
"#;
        let m = module(source, "widget.ts");
        assert_eq!(m.exports, vec!["Widget", "render", "VERSION", "Props", "internal", "alias"]);
        assert!(module("class Hidden {}\n", "hidden.js").exports.is_empty());
    }

    #[test]
    fn test_unrecognized_declaration_warns() {
        let source = "export default class extends Base {\n}\n";
        let outcome = extract(source, "weird.js");
        assert!(outcome.module.as_ref().unwrap().exports.is_empty());
        assert_eq!(outcome.status, FileStatus::PartialWithWarnings);
        assert_eq!(outcome.warnings, vec!["line 1: unrecognized class declaration"]);
    }

    #[test]
    fn test_unbalanced_braces_warn() {
        let outcome = extract("function f() {\n  if (x) {\n}\n", "broken.js");
        assert_eq!(outcome.status, FileStatus::PartialWithWarnings);
        assert!(outcome.warnings.iter().any(|w| w.contains("unbalanced braces")));
        assert!(outcome.module.is_some());
    }

    #[test]
    fn test_java_class() {
        let source = r#"
package com.example;

import java.util.List;
import com.example.base.Entity;

@Entity
public class Order extends Entity implements Serializable, Comparable<Order> {
    private final List<Item> items;
    public static int count = 0;

    public Order(List<Item> items) {
        this.items = items;
    }

    @Override
    public int compareTo(Order other) {
        if (other == null) {
            return 1;
        }
        return 0;
    }

    private static void log(String... parts) {}
}
"#;
        let m = module(source, "src/main/java/com/example/Order.java");
        assert_eq!(m.imports.len(), 2);
        assert_eq!(m.imports[1].target, "com.example.base.Entity");

        let order = m.find_class("Order").unwrap();
        assert_eq!(order.bases, vec!["Entity", "Serializable", "Comparable<Order>"]);
        let attrs: Vec<_> = order.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec!["items", "count"]);
        assert_eq!(order.attributes[0].type_hint.as_deref(), Some("List<Item>"));

        let methods: Vec<_> = order.methods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(methods, vec!["Order", "compareTo", "log"]);
        let compare = order.find_method("compareTo").unwrap();
        assert_eq!(compare.return_type.as_deref(), Some("int"));
        assert_eq!(compare.parameters[0].name, "other");
        assert_eq!(compare.parameters[0].type_hint.as_deref(), Some("Order"));

        let log = order.find_method("log").unwrap();
        assert!(log.is_static);
        assert_eq!(log.visibility, Visibility::Private);
        assert_eq!(log.parameters[0].kind, ParameterKind::VarArgs);
    }

    #[test]
    fn test_go_methods_attach_to_receiver() {
        let source = r#"
package store

import (
	"context"
	db "example.com/app/db"
)

type Repo struct {
	conn  *db.Conn
	Name  string `json:"name"`
}

type Store interface {
	Save(ctx context.Context) error
}

func (r *Repo) Save(ctx context.Context) error {
	return nil
}

func NewRepo() *Repo {
	return &Repo{}
}
"#;
        let m = module(source, "store/repo.go");
        let targets: Vec<_> = m.imports.iter().map(|i| i.target.as_str()).collect();
        assert_eq!(targets, vec!["context", "example.com/app/db"]);

        let repo = m.find_class("Repo").unwrap();
        assert_eq!(repo.kind, ClassKind::Struct);
        assert_eq!(repo.attributes.len(), 2);
        assert_eq!(repo.attributes[0].visibility, Visibility::Private);
        assert_eq!(repo.attributes[1].visibility, Visibility::Public);
        assert_eq!(repo.methods[0].name, "Save");
        assert_eq!(repo.methods[0].parameters[0].type_hint.as_deref(), Some("context.Context"));

        let store = m.find_class("Store").unwrap();
        assert_eq!(store.kind, ClassKind::Interface);
        assert_eq!(store.methods[0].name, "Save");

        assert_eq!(m.functions.len(), 1);
        assert_eq!(m.functions[0].name, "NewRepo");
        assert_eq!(m.functions[0].return_type.as_deref(), Some("*Repo"));
    }

    #[test]
    fn test_rust_impl_blocks() {
        let source = r#"
use crate::models::{User, Role};
mod helpers;

pub struct Account {
    pub id: u64,
    owner: String,
}

pub trait Audit: Send + Sync {
    fn audit(&self) -> String;
}

impl Account {
    pub fn new(id: u64) -> Self {
        Self { id, owner: String::new() }
    }
}

impl Audit for Account {
    fn audit(&self) -> String {
        format!("{}", self.id)
    }
}

fn main() {}
"#;
        let m = module(source, "src/account.rs");
        assert_eq!(m.imports[0].target, "crate::models");
        assert_eq!(m.imports[0].names.len(), 2);
        assert_eq!(m.imports[1].target, "helpers");

        let account = m.find_class("Account").unwrap();
        assert_eq!(account.kind, ClassKind::Struct);
        assert_eq!(account.bases, vec!["Audit"]);
        assert_eq!(account.attributes[0].visibility, Visibility::Public);
        assert_eq!(account.attributes[1].visibility, Visibility::Private);
        let methods: Vec<_> = account.methods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(methods, vec!["new", "audit"]);
        assert_eq!(account.methods[1].parameters[0].name, "self");

        let audit = m.find_class("Audit").unwrap();
        assert_eq!(audit.kind, ClassKind::Interface);
        assert_eq!(audit.bases, vec!["Send", "Sync"]);
        assert_eq!(audit.methods.len(), 1);

        assert_eq!(m.functions.len(), 1);
        assert_eq!(m.functions[0].name, "main");
    }

    #[test]
    fn test_ruby_classes() {
        let source = r#"
require 'json'
require_relative 'models/base'

class User < Base
  attr_accessor :name, :email

  def initialize(name, email = nil)
    @name = name
  end

  def self.find(id)
  end
end

def helper
end
"#;
        let m = module(source, "app/user.rb");
        assert_eq!(m.imports.len(), 2);
        let user = m.find_class("User").unwrap();
        assert_eq!(user.bases, vec!["Base"]);
        let attrs: Vec<_> = user.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec!["name", "email"]);
        let methods: Vec<_> = user.methods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(methods, vec!["initialize", "find"]);
        assert!(user.find_method("find").unwrap().is_static);
        assert_eq!(
            user.find_method("initialize").unwrap().parameters[1].default.as_deref(),
            Some("nil")
        );
        assert_eq!(m.functions.len(), 1);
        assert_eq!(m.functions[0].name, "helper");
    }

    #[test]
    fn test_kotlin_data_class() {
        let source = r#"
import com.example.core.Entity

data class Invoice(val id: Long, private val total: Double, note: String) : Entity(), Serializable

class Service {
    fun process(invoice: Invoice): Boolean {
        return true
    }
}
"#;
        let m = module(source, "Invoice.kt");
        let invoice = m.find_class("Invoice").unwrap();
        assert_eq!(invoice.bases, vec!["Entity", "Serializable"]);
        let attrs: Vec<_> = invoice.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec!["id", "total"]);
        assert_eq!(invoice.attributes[1].visibility, Visibility::Private);
        let service = m.find_class("Service").unwrap();
        assert_eq!(service.methods[0].name, "process");
        assert_eq!(service.methods[0].return_type.as_deref(), Some("Boolean"));
    }

    #[test]
    fn test_kotlin_modifiers_set_class_kind() {
        let source = "enum class Color { RED, GREEN }\n\nopen class Shape\n";
        let m = extract(source, "Color.kt").module.unwrap();
        assert_eq!(m.find_class("Color").unwrap().kind, ClassKind::Enum);
        assert_eq!(m.find_class("Shape").unwrap().kind, ClassKind::Class);
    }

    #[test]
    fn test_cpp_out_of_line_methods() {
        let source = r#"
#include "shape.h"
#include <vector>

class Circle : public Shape {
public:
    double area() const override;
private:
    double radius;
};

double Circle::area() const {
    return 3.14 * radius * radius;
}

int main(int argc, char** argv) {
    return 0;
}
"#;
        let m = module(source, "src/circle.cpp");
        let targets: Vec<_> = m.imports.iter().map(|i| i.target.as_str()).collect();
        assert_eq!(targets, vec!["shape.h", "vector"]);
        let circle = m.find_class("Circle").unwrap();
        assert_eq!(circle.bases, vec!["Shape"]);
        assert_eq!(circle.attributes[0].name, "radius");
        let areas = circle.methods.iter().filter(|f| f.name == "area").count();
        assert_eq!(areas, 2);
        let main = m.find_function("main").unwrap();
        assert_eq!(main.parameters[1].name, "argv");
        assert_eq!(main.parameters[1].type_hint.as_deref(), Some("char**"));
    }

    #[test]
    fn test_csharp_and_php_members() {
        let cs = r#"
using System.Collections.Generic;

public class Cart : BaseCart, ICart
{
    private List<Item> items;
    public int Count { get; set; }

    public void Add(Item item) { }
}
"#;
        let m = module(cs, "Cart.cs");
        assert_eq!(m.imports[0].target, "System.Collections.Generic");
        let cart = m.find_class("Cart").unwrap();
        assert_eq!(cart.bases, vec!["BaseCart", "ICart"]);
        assert_eq!(cart.attributes.len(), 2);
        assert_eq!(cart.methods[0].name, "Add");

        let php = r#"<?php
use App\Models\Model;

class Post extends Model implements JsonSerializable
{
    private ?string $title = null;

    public function publish(string $when, ...$tags): bool
    {
        return true;
    }
}
"#;
        let m = module(php, "app/Post.php");
        assert_eq!(m.imports[0].target, "App\\Models\\Model");
        let post = m.find_class("Post").unwrap();
        assert_eq!(post.bases, vec!["Model", "JsonSerializable"]);
        assert_eq!(post.attributes[0].name, "title");
        let publish = post.find_method("publish").unwrap();
        assert_eq!(publish.parameters[0].name, "when");
        assert_eq!(publish.parameters[1].kind, ParameterKind::VarArgs);
    }

    #[test]
    fn test_swift_extension_adds_conformance() {
        let source = r#"
import Foundation

struct Point {
    var x: Double
    let y: Double
}

extension Point: Equatable {
    static func zero() -> Point {
        return Point(x: 0, y: 0)
    }
}
"#;
        let m = module(source, "Point.swift");
        let point = m.find_class("Point").unwrap();
        assert_eq!(point.kind, ClassKind::Struct);
        assert_eq!(point.bases, vec!["Equatable"]);
        assert_eq!(point.attributes.len(), 2);
        assert_eq!(point.methods[0].name, "zero");
        assert!(point.methods[0].is_static);
    }

    #[test]
    fn test_parse_parameter_styles() {
        let p = parse_parameter("private readonly repo: Repo<User>", ParamStyle::NameColonType).unwrap();
        assert_eq!(p.name, "repo");
        assert_eq!(p.type_hint.as_deref(), Some("Repo<User>"));

        let p = parse_parameter("cb: (a: string) => void = noop", ParamStyle::NameColonType).unwrap();
        assert_eq!(p.name, "cb");
        assert_eq!(p.default.as_deref(), Some("noop"));

        let p = parse_parameter("@NotNull final Map<K, V> map", ParamStyle::TypeName).unwrap();
        assert_eq!(p.name, "map");
        assert_eq!(p.type_hint.as_deref(), Some("Map<K, V>"));

        let p = parse_parameter("args ...string", ParamStyle::NameType).unwrap();
        assert_eq!(p.kind, ParameterKind::VarArgs);

        let p = parse_parameter("**opts", ParamStyle::Untyped).unwrap();
        assert_eq!(p.kind, ParameterKind::VarKeyword);
        assert_eq!(p.name, "opts");

        assert!(parse_parameter("void", ParamStyle::TypeName).is_none());
    }

    #[test]
    fn test_split_top_level_respects_generics() {
        assert_eq!(split_top_level("Map<K, V>, List<T>", &[',']), vec!["Map<K, V>", "List<T>"]);
        assert_eq!(split_top_level("a: () => void, b", &[',']), vec!["a: () => void", "b"]);
    }
}
