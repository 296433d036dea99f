// Declaration patterns for the languages without a full grammar
//
// Each language family gets one table, compiled on first use. Patterns run
// against masked source (see `scan`), so they can be written without caring
// about comments or string literals. Group names used by the extractor:
//
//   name, kind, bases, implements, ctor      classes
//   target, trait                            impl / extension blocks
//   name, mods, params, param, ret, recv     functions and methods
//   name, names, mods, type                  fields
//   target, names, block                     imports
//   open                                     the opening brace of a body
//   kw                                       probe keyword

use crate::parser::model::{ClassKind, FunctionForm, ImportKind, Language};
use regex::Regex;
use std::sync::LazyLock;

/// Generic argument list, one level of nesting
const GENERICS: &str = r"<(?:[^<>{}]|<[^<>{}]*>)*>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockStyle {
    /// `{ ... }`
    Braces,
    /// `class X ... end`, matched by indentation
    EndKeyword,
}

/// How a single parameter is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamStyle {
    /// `name: Type` (TypeScript, Kotlin, Rust, Swift)
    NameColonType,
    /// `Type name` (Java, C#, C, PHP)
    TypeName,
    /// `name Type` (Go)
    NameType,
    /// `name` (Ruby)
    Untyped,
}

/// Member visibility when no modifier is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefaultVisibility {
    /// Naming convention (`_x`, `#x`)
    ByName,
    /// Private unless marked (`pub` in Rust, C# members)
    Private,
    /// Capitalized names are exported (Go)
    ExportCase,
}

#[derive(Debug)]
pub(crate) struct Syntax {
    pub line_comments: &'static [&'static str],
    pub block_comment: Option<(&'static str, &'static str)>,
    pub quotes: &'static [u8],
    pub triple_quotes: bool,
    pub blocks: BlockStyle,
    pub params: ParamStyle,
    pub visibility: DefaultVisibility,
}

const C_COMMENTS: Option<(&str, &str)> = Some(("/*", "*/"));

#[derive(Debug)]
pub(crate) struct ClassPattern {
    pub regex: Regex,
    /// Fixed kind, or `None` to read it from the `kind` group
    pub kind: Option<ClassKind>,
}

#[derive(Debug)]
pub(crate) struct FunctionPattern {
    pub regex: Regex,
    pub form: FunctionForm,
}

#[derive(Debug)]
pub(crate) struct ImportPattern {
    pub regex: Regex,
    pub kind: ImportKind,
    /// Applied inside the `block` group of `regex` when present
    pub item: Option<Regex>,
    /// Only accept matches outside any braces
    pub top_level_only: bool,
}

#[derive(Debug)]
pub(crate) struct LanguagePatterns {
    pub syntax: Syntax,
    pub classes: Vec<ClassPattern>,
    /// Blocks that add members to a type declared elsewhere (`impl`, `extension`)
    pub impls: Vec<Regex>,
    /// Function declarations valid anywhere
    pub functions: Vec<FunctionPattern>,
    /// Member declarations only valid directly inside a class body
    pub methods: Vec<FunctionPattern>,
    pub fields: Vec<Regex>,
    pub imports: Vec<ImportPattern>,
    /// Exported names (`name`) or export lists (`names`)
    pub exports: Vec<Regex>,
    /// Lines that look like a declaration; unmatched ones produce a warning
    pub probe: Regex,
}

type Compiled = Result<LanguagePatterns, regex::Error>;

static JAVASCRIPT: LazyLock<Compiled> = LazyLock::new(javascript);
static JAVA: LazyLock<Compiled> = LazyLock::new(java);
static KOTLIN: LazyLock<Compiled> = LazyLock::new(kotlin);
static CSHARP: LazyLock<Compiled> = LazyLock::new(csharp);
static GO: LazyLock<Compiled> = LazyLock::new(go);
static RUST: LazyLock<Compiled> = LazyLock::new(rust);
static RUBY: LazyLock<Compiled> = LazyLock::new(ruby);
static PHP: LazyLock<Compiled> = LazyLock::new(php);
static SWIFT: LazyLock<Compiled> = LazyLock::new(swift);
static C_FAMILY: LazyLock<Compiled> = LazyLock::new(c_family);

/// Pattern table for a language
pub(crate) fn for_language(language: Language) -> Result<&'static LanguagePatterns, String> {
    let compiled: &'static Compiled = match language {
        Language::JavaScript | Language::TypeScript => &JAVASCRIPT,
        Language::Java => &JAVA,
        Language::Kotlin => &KOTLIN,
        Language::CSharp => &CSHARP,
        Language::Go => &GO,
        Language::Rust => &RUST,
        Language::Ruby => &RUBY,
        Language::Php => &PHP,
        Language::Swift => &SWIFT,
        Language::C | Language::Cpp => &C_FAMILY,
        Language::Python => return Err("python is handled by the grammar-based parser".into()),
    };
    compiled
        .as_ref()
        .map_err(|e| format!("invalid {} pattern: {}", language, e))
}

fn re(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&pattern.replace("%G%", GENERICS))
}

fn class(pattern: &str, kind: Option<ClassKind>) -> Result<ClassPattern, regex::Error> {
    Ok(ClassPattern {
        regex: re(pattern)?,
        kind,
    })
}

fn function(pattern: &str, form: FunctionForm) -> Result<FunctionPattern, regex::Error> {
    Ok(FunctionPattern {
        regex: re(pattern)?,
        form,
    })
}

fn import(pattern: &str, kind: ImportKind) -> Result<ImportPattern, regex::Error> {
    Ok(ImportPattern {
        regex: re(pattern)?,
        kind,
        item: None,
        top_level_only: false,
    })
}

fn javascript() -> Compiled {
    const DECORATORS: &str = r"(?:@[\w.]+(?:\([^)\n]*\))?[ \t]+)*";
    Ok(LanguagePatterns {
        syntax: Syntax {
            line_comments: &["//"],
            block_comment: C_COMMENTS,
            quotes: b"\"'`",
            triple_quotes: false,
            blocks: BlockStyle::Braces,
            params: ParamStyle::NameColonType,
            visibility: DefaultVisibility::ByName,
        },
        classes: vec![
            class(
                r"(?m)^[ \t]*(?:export[ \t]+)?(?:default[ \t]+)?(?:declare[ \t]+)?(?:abstract[ \t]+)?class[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?:%G%)?(?:\s+extends\s+(?P<bases>[A-Za-z_$][\w$.]*(?:%G%)?))?(?:\s+implements\s+(?P<implements>[^{]+?))?\s*(?P<open>\{)",
                Some(ClassKind::Class),
            )?,
            class(
                r"(?m)^[ \t]*(?:export[ \t]+)?(?:default[ \t]+)?(?:declare[ \t]+)?interface[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?:%G%)?(?:\s+extends\s+(?P<bases>[^{]+?))?\s*(?P<open>\{)",
                Some(ClassKind::Interface),
            )?,
            class(
                r"(?m)^[ \t]*(?:export[ \t]+)?(?:declare[ \t]+)?type[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?:%G%)?[ \t]*=",
                Some(ClassKind::TypeAlias),
            )?,
            class(
                r"(?m)^[ \t]*(?:export[ \t]+)?(?:declare[ \t]+)?(?:const[ \t]+)?enum[ \t]+(?P<name>[A-Za-z_$][\w$]*)\s*(?P<open>\{)",
                Some(ClassKind::Enum),
            )?,
        ],
        impls: vec![],
        functions: vec![
            function(
                r"(?m)^[ \t]*(?:export[ \t]+)?(?:default[ \t]+)?(?:declare[ \t]+)?(?P<mods>(?:async[ \t]+)?)function\b[ \t]*\*?[ \t]*(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?:%G%)?[ \t]*\((?P<params>[^)]*)\)(?:[ \t]*:[ \t]*(?P<ret>[^{;\n]+?))?[ \t]*(?:(?P<open>\{)|;|$)",
                FunctionForm::Declaration,
            )?,
            function(
                r"(?m)^[ \t]*(?:export[ \t]+)?(?:const|let|var)[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?::[^=\n]+)?=[ \t]*(?P<mods>(?:async[ \t]+)?)(?:%G%)?(?:\((?P<params>[^)]*)\)|(?P<param>[A-Za-z_$][\w$]*))(?:[ \t]*:[ \t]*(?P<ret>[^=\n{]+?))?[ \t]*=>[ \t]*(?P<open>\{)?",
                FunctionForm::Arrow,
            )?,
            function(
                r"(?m)^[ \t]*(?:export[ \t]+)?(?:const|let|var)[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?::[^=\n]+)?=[ \t]*(?P<mods>(?:async[ \t]+)?)function\b[ \t]*\*?[ \t]*(?:[A-Za-z_$][\w$]*)?[ \t]*\((?P<params>[^)]*)\)[^{\n]*(?P<open>\{)?",
                FunctionForm::Anonymous,
            )?,
        ],
        methods: vec![function(
            &format!(
                r"(?m)^[ \t]*{DECORATORS}(?P<mods>(?:(?:public|private|protected|static|async|readonly|override|abstract|declare|get|set)[ \t]+)*)\*?[ \t]*(?P<name>#?[A-Za-z_$][\w$]*)[ \t]*\??[ \t]*(?:%G%)?[ \t]*\((?P<params>[^)]*)\)(?:[ \t]*:[ \t]*(?P<ret>[^{{;\n]+?))?[ \t]*(?:(?P<open>\{{)|;|$)"
            ),
            FunctionForm::Declaration,
        )?],
        fields: vec![re(&format!(
            r"(?m)^[ \t]*{DECORATORS}(?P<mods>(?:(?:public|private|protected|static|readonly|declare|override|abstract|accessor)[ \t]+)*)(?P<name>#?[A-Za-z_$][\w$]*)[ \t]*[?!]?[ \t]*(?::[ \t]*(?P<type>[^=;\n]+?))?[ \t]*(?:=[^\n]*?)?;?[ \t]*$"
        ))?],
        imports: vec![
            import(
                r#"(?m)^[ \t]*import[ \t]+(?:type[ \t]+)?(?P<names>[^'";]*?)[ \t]*\bfrom[ \t]*['"](?P<target>[^'"\n]*)['"]"#,
                ImportKind::From,
            )?,
            import(
                r#"(?m)^[ \t]*import[ \t]*['"](?P<target>[^'"\n]*)['"]"#,
                ImportKind::Direct,
            )?,
            import(
                r#"(?m)^[ \t]*export[ \t]+(?:type[ \t]+)?(?P<names>\*(?:[ \t]+as[ \t]+[\w$]+)?|\{[^}]*\})[ \t]*from[ \t]*['"](?P<target>[^'"\n]*)['"]"#,
                ImportKind::From,
            )?,
            import(
                r#"(?:(?:const|let|var)[ \t]+(?P<names>[A-Za-z_$][\w$]*|\{[^}]*\})[ \t]*=[ \t]*)?\brequire[ \t]*\([ \t]*['"](?P<target>[^'"\n]*)['"][ \t]*\)"#,
                ImportKind::Require,
            )?,
            import(
                r#"\bimport[ \t]*\([ \t]*['"](?P<target>[^'"\n]*)['"][ \t]*\)"#,
                ImportKind::Direct,
            )?,
        ],
        exports: vec![
            re(r"(?m)^[ \t]*export[ \t]+(?:default[ \t]+)?(?:declare[ \t]+)?(?:abstract[ \t]+)?(?:async[ \t]+)?(?:const[ \t]+)?(?:class|function\*?|const|let|var|interface|type|enum|namespace)[ \t]+(?P<name>[A-Za-z_$][\w$]*)")?,
            re(r"(?m)^[ \t]*export[ \t]*\{(?P<names>[^}]*)\}[ \t]*;?[ \t]*$")?,
            re(r"(?m)^[ \t]*export[ \t]+default[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*;?[ \t]*$")?,
        ],
        probe: re(
            r"(?m)^[ \t]*(?:export[ \t]+(?:default[ \t]+)?)?(?:declare[ \t]+)?(?:abstract[ \t]+)?(?:async[ \t]+)?(?:const[ \t]+)?(?P<kw>class|function|interface|type|enum|namespace)[ \t]+[A-Za-z_$*{(]",
        )?,
    })
}

fn java() -> Compiled {
    const ANNOTATIONS: &str = r"(?:@[\w.]+(?:\([^)\n]*\))?[ \t]+)*";
    Ok(LanguagePatterns {
        syntax: Syntax {
            line_comments: &["//"],
            block_comment: C_COMMENTS,
            quotes: b"\"'",
            triple_quotes: true,
            blocks: BlockStyle::Braces,
            params: ParamStyle::TypeName,
            visibility: DefaultVisibility::ByName,
        },
        classes: vec![class(
            &format!(
                r"(?m)^[ \t]*{ANNOTATIONS}(?P<mods>(?:(?:public|private|protected|static|final|abstract|sealed|non-sealed|strictfp)[ \t]+)*)(?P<kind>class|interface|enum|record|@interface)[ \t]+(?P<name>[A-Za-z_$][\w$]*)(?:%G%)?(?:[ \t]*\([^)]*\))?(?:\s+extends\s+(?P<bases>[^{{]+?))?(?:\s+implements\s+(?P<implements>[^{{]+?))?(?:\s+permits\s+[^{{]+?)?\s*(?P<open>\{{)"
            ),
            None,
        )?],
        impls: vec![],
        functions: vec![],
        methods: vec![function(
            r"(?m)^[ \t]*(?:@[\w.]+(?:\([^)\n]*\))?\s+)*(?P<mods>(?:(?:public|private|protected|static|final|abstract|synchronized|native|default|strictfp)[ \t]+)*)(?:%G%[ \t]+)?(?:(?P<ret>[A-Za-z_$][\w$.]*(?:%G%)?(?:\[\])*)[ \t]+)?(?P<name>[A-Za-z_$][\w$]*)[ \t]*\((?P<params>[^)]*)\)(?:\s*throws\s+[\w$.,\s]+?)?\s*(?:(?P<open>\{)|;)",
            FunctionForm::Declaration,
        )?],
        fields: vec![re(&format!(
            r"(?m)^[ \t]*{ANNOTATIONS}(?P<mods>(?:(?:public|private|protected|static|final|transient|volatile)[ \t]+)*)(?P<type>[A-Za-z_$][\w$.]*(?:%G%)?(?:\[\])*)[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?:=[^;]*)?;"
        ))?],
        imports: vec![import(
            r"(?m)^[ \t]*import[ \t]+(?:static[ \t]+)?(?P<target>[\w$.]+(?:\.\*)?)[ \t]*;",
            ImportKind::Direct,
        )?],
        exports: vec![],
        probe: re(
            r"(?m)^[ \t]*(?:(?:public|private|protected|static|final|abstract|sealed|non-sealed)[ \t]+)*(?P<kw>class|interface|enum|record)[ \t]+[A-Za-z_$]",
        )?,
    })
}

fn kotlin() -> Compiled {
    const ANNOTATIONS: &str = r"(?:@[\w.:]+(?:\([^)\n]*\))?[ \t]+)*";
    Ok(LanguagePatterns {
        syntax: Syntax {
            line_comments: &["//"],
            block_comment: C_COMMENTS,
            quotes: b"\"'",
            triple_quotes: true,
            blocks: BlockStyle::Braces,
            params: ParamStyle::NameColonType,
            visibility: DefaultVisibility::ByName,
        },
        classes: vec![class(
            &format!(
                r"(?m)^[ \t]*{ANNOTATIONS}(?P<mods>(?:(?:public|private|protected|internal|open|abstract|sealed|data|enum|inner|annotation|value|final|expect|actual)[ \t]+)*)(?P<kind>class|interface|object)[ \t]+(?P<name>[A-Za-z_]\w*)(?:%G%)?(?:[ \t]*(?:(?:private|public|protected|internal)[ \t]+)?(?:constructor[ \t]*)?\((?P<ctor>[^)]*)\))?(?:[ \t]*:[ \t]*(?P<bases>[^{{\n]+?))?[ \t]*(?:(?P<open>\{{)|$)"
            ),
            None,
        )?],
        impls: vec![],
        functions: vec![function(
            &format!(
                r"(?m)^[ \t]*{ANNOTATIONS}(?P<mods>(?:(?:public|private|protected|internal|open|override|abstract|suspend|inline|operator|infix|tailrec|final|external|actual|expect)[ \t]+)*)fun[ \t]+(?:%G%[ \t]*)?(?:(?P<recv>[A-Za-z_]\w*)(?:%G%)?\??\.)?(?P<name>[A-Za-z_]\w*)[ \t]*\((?P<params>[^)]*)\)(?:[ \t]*:[ \t]*(?P<ret>[^{{=\n]+?))?[ \t]*(?:(?P<open>\{{)|=|$)"
            ),
            FunctionForm::Declaration,
        )?],
        methods: vec![],
        fields: vec![re(&format!(
            r"(?m)^[ \t]*{ANNOTATIONS}(?P<mods>(?:(?:public|private|protected|internal|override|open|lateinit|const|abstract|final)[ \t]+)*)(?:val|var)[ \t]+(?P<name>[A-Za-z_]\w*)(?:[ \t]*:[ \t]*(?P<type>[^=\n{{]+?))?[ \t]*(?:(?:=|by\b)[^\n]*)?$"
        ))?],
        imports: vec![import(
            r"(?m)^[ \t]*import[ \t]+(?P<target>[\w.]+(?:\.\*)?)",
            ImportKind::Direct,
        )?],
        exports: vec![],
        probe: re(
            r"(?m)^[ \t]*(?:(?:public|private|protected|internal|open|abstract|sealed|data|enum|inner|override|suspend|inline|value|annotation)[ \t]+)*(?P<kw>class|interface|object|fun)[ \t]+[A-Za-z_<]",
        )?,
    })
}

fn csharp() -> Compiled {
    const ATTRIBUTES: &str = r"(?:\[[^\]\n]*\][ \t]*)*";
    Ok(LanguagePatterns {
        syntax: Syntax {
            line_comments: &["//"],
            block_comment: C_COMMENTS,
            quotes: b"\"'",
            triple_quotes: true,
            blocks: BlockStyle::Braces,
            params: ParamStyle::TypeName,
            visibility: DefaultVisibility::Private,
        },
        classes: vec![class(
            r"(?m)^[ \t]*(?P<mods>(?:(?:public|private|protected|internal|static|abstract|sealed|partial|readonly|unsafe|new|file|ref)[ \t]+)*)(?P<kind>class|interface|struct|enum|record(?:[ \t]+(?:class|struct))?)[ \t]+(?P<name>[A-Za-z_]\w*)(?:%G%)?(?:[ \t]*\([^)]*\))?(?:\s*:\s*(?P<bases>[^{;]+?))?(?:\s+where\s+[^{;]+?)?\s*(?:(?P<open>\{)|;)",
            None,
        )?],
        impls: vec![],
        functions: vec![],
        methods: vec![function(
            &format!(
                r"(?m)^[ \t]*{ATTRIBUTES}(?P<mods>(?:(?:public|private|protected|internal|static|virtual|override|abstract|sealed|async|extern|unsafe|new|partial|readonly)[ \t]+)*)(?:(?P<ret>[A-Za-z_][\w.]*(?:%G%)?(?:\[\])*\??)[ \t]+)?(?P<name>[A-Za-z_]\w*)[ \t]*(?:%G%)?[ \t]*\((?P<params>[^)]*)\)(?:\s*:\s*(?:base|this)[ \t]*\([^)]*\))?(?:\s*where\s+[^{{;=]+?)?\s*(?:(?P<open>\{{)|;|=>)"
            ),
            FunctionForm::Declaration,
        )?],
        fields: vec![re(&format!(
            r"(?m)^[ \t]*{ATTRIBUTES}(?P<mods>(?:(?:public|private|protected|internal|static|readonly|const|volatile|required|new|virtual|override|abstract)[ \t]+)*)(?P<type>[A-Za-z_][\w.]*(?:%G%)?(?:\[\])*\??)[ \t]+(?P<name>[A-Za-z_]\w*)[ \t]*(?:\{{|=>|=[^;\n]*;|;)"
        ))?],
        imports: vec![import(
            r"(?m)^[ \t]*(?:global[ \t]+)?using[ \t]+(?:static[ \t]+)?(?:[A-Za-z_]\w*[ \t]*=[ \t]*)?(?P<target>[A-Za-z_][\w.]*)[ \t]*;",
            ImportKind::Direct,
        )?],
        exports: vec![],
        probe: re(
            r"(?m)^[ \t]*(?:(?:public|private|protected|internal|static|abstract|sealed|partial|readonly|file)[ \t]+)*(?P<kw>class|interface|struct|enum|record)[ \t]+[A-Za-z_]",
        )?,
    })
}

fn go() -> Compiled {
    Ok(LanguagePatterns {
        syntax: Syntax {
            line_comments: &["//"],
            block_comment: C_COMMENTS,
            quotes: b"\"'`",
            triple_quotes: false,
            blocks: BlockStyle::Braces,
            params: ParamStyle::NameType,
            visibility: DefaultVisibility::ExportCase,
        },
        classes: vec![
            class(
                r"(?m)^[ \t]*type[ \t]+(?P<name>[A-Za-z_]\w*)(?:\[[^\]\n]*\])?[ \t]+struct[ \t]*(?P<open>\{)",
                Some(ClassKind::Struct),
            )?,
            class(
                r"(?m)^[ \t]*type[ \t]+(?P<name>[A-Za-z_]\w*)(?:\[[^\]\n]*\])?[ \t]+interface[ \t]*(?P<open>\{)",
                Some(ClassKind::Interface),
            )?,
        ],
        impls: vec![],
        functions: vec![function(
            r"(?m)^func[ \t]*(?:\([ \t]*(?:[A-Za-z_]\w*[ \t]+)?\*?[ \t]*(?P<recv>[A-Za-z_]\w*)(?:\[[^\]\n]*\])?[ \t]*\)[ \t]*)?(?P<name>[A-Za-z_]\w*)[ \t]*(?:\[[^\]\n]*\])?[ \t]*\((?P<params>[^)]*)\)[ \t]*(?P<ret>[^{\n]*?)[ \t]*(?P<open>\{)?[ \t]*$",
            FunctionForm::Declaration,
        )?],
        methods: vec![function(
            r"(?m)^[ \t]*(?P<name>[A-Za-z_]\w*)[ \t]*\((?P<params>[^)]*)\)[ \t]*(?P<ret>[^{\n]*?)[ \t]*$",
            FunctionForm::Declaration,
        )?],
        fields: vec![re(
            r"(?m)^[ \t]*(?P<name>[A-Za-z_]\w*)(?:[ \t]*,[ \t]*[A-Za-z_]\w*)*[ \t]+(?P<type>[\*\[\]A-Za-z_][^\s`]*)[ \t]*(?:`[^`\n]*`)?[ \t]*$",
        )?],
        imports: vec![
            import(
                r#"(?m)^[ \t]*import[ \t]+(?:[A-Za-z_.]\w*[ \t]+)?"(?P<target>[^"\n]*)""#,
                ImportKind::Direct,
            )?,
            ImportPattern {
                regex: re(r"(?m)^[ \t]*import[ \t]*\((?P<block>[^)]*)\)")?,
                kind: ImportKind::Direct,
                item: Some(re(r#"(?:[A-Za-z_.]\w*[ \t]+)?"(?P<target>[^"\n]*)""#)?),
                top_level_only: true,
            },
        ],
        exports: vec![],
        probe: re(r"(?m)^(?P<kw>func)\b")?,
    })
}

fn rust() -> Compiled {
    const VIS: &str = r"(?:pub(?:\([^)\n]*\))?[ \t]+)?";
    Ok(LanguagePatterns {
        syntax: Syntax {
            line_comments: &["//"],
            block_comment: C_COMMENTS,
            quotes: b"\"",
            triple_quotes: false,
            blocks: BlockStyle::Braces,
            params: ParamStyle::NameColonType,
            visibility: DefaultVisibility::Private,
        },
        classes: vec![
            class(
                &format!(
                    r"(?m)^[ \t]*(?P<mods>{VIS})struct[ \t]+(?P<name>[A-Za-z_]\w*)(?:%G%)?(?:\s*where[^{{;(]*)?[ \t]*(?:(?P<open>\{{)|\(|;)"
                ),
                Some(ClassKind::Struct),
            )?,
            class(
                &format!(
                    r"(?m)^[ \t]*(?P<mods>{VIS})enum[ \t]+(?P<name>[A-Za-z_]\w*)(?:%G%)?(?:\s*where[^{{]*)?\s*(?P<open>\{{)"
                ),
                Some(ClassKind::Enum),
            )?,
            class(
                &format!(
                    r"(?m)^[ \t]*(?P<mods>{VIS})(?:unsafe[ \t]+)?trait[ \t]+(?P<name>[A-Za-z_]\w*)(?:%G%)?(?:[ \t]*:[ \t]*(?P<bases>[^{{\n]+?))?(?:\s*where[^{{]*)?\s*(?P<open>\{{)"
                ),
                Some(ClassKind::Interface),
            )?,
        ],
        impls: vec![re(
            r"(?m)^[ \t]*(?:unsafe[ \t]+)?impl(?:%G%)?[ \t]+(?:!?(?P<trait>[A-Za-z_][\w:]*(?:%G%)?)[ \t]+for[ \t]+)?&?(?:dyn[ \t]+)?(?P<target>[A-Za-z_][\w:]*)(?:%G%)?(?:\s*where[^{]*)?\s*(?P<open>\{)",
        )?],
        functions: vec![function(
            &format!(
                r#"(?m)^[ \t]*(?P<mods>{VIS}(?:(?:const|async|unsafe|default|extern(?:[ \t]+"[^"\n]*")?)[ \t]+)*)fn[ \t]+(?P<name>[A-Za-z_]\w*)[ \t]*(?:%G%)?[ \t]*\((?P<params>[^)]*)\)(?:[ \t]*->[ \t]*(?P<ret>[^{{;\n]+?))?\s*(?:where\b[^{{;]*)?(?:(?P<open>\{{)|;)"#
            ),
            FunctionForm::Declaration,
        )?],
        methods: vec![],
        fields: vec![re(&format!(
            r"(?m)^[ \t]*(?:#\[[^\]\n]*\][ \t]*)*(?P<mods>{VIS})(?P<name>[A-Za-z_]\w*)[ \t]*:[ \t]*(?P<type>[^,\n]+?)[ \t]*,?[ \t]*$"
        ))?],
        imports: vec![
            import(
                &format!(
                    r"(?m)^[ \t]*{VIS}use[ \t]+(?P<target>(?:::)?[A-Za-z_][\w:]*?)(?:::\{{(?P<names>[^}}]*)\}}|::\*|[ \t]+as[ \t]+\w+)?[ \t]*;"
                ),
                ImportKind::Direct,
            )?,
            import(
                &format!(r"(?m)^[ \t]*{VIS}mod[ \t]+(?P<target>[A-Za-z_]\w*)[ \t]*;"),
                ImportKind::Direct,
            )?,
        ],
        exports: vec![],
        probe: re(&format!(
            r#"(?m)^[ \t]*{VIS}(?:(?:const|async|unsafe|default|extern(?:[ \t]+"[^"\n]*")?)[ \t]+)*(?P<kw>fn|struct|enum|trait|impl|union)\b"#
        ))?,
    })
}

fn ruby() -> Compiled {
    Ok(LanguagePatterns {
        syntax: Syntax {
            line_comments: &["#"],
            block_comment: Some(("=begin", "=end")),
            quotes: b"\"'",
            triple_quotes: false,
            blocks: BlockStyle::EndKeyword,
            params: ParamStyle::Untyped,
            visibility: DefaultVisibility::ByName,
        },
        classes: vec![class(
            r"(?m)^[ \t]*class[ \t]+(?P<name>[A-Z]\w*(?:::[A-Z]\w*)*)(?:[ \t]*<[ \t]*(?P<bases>[A-Z][\w:]*))?",
            Some(ClassKind::Class),
        )?],
        impls: vec![],
        functions: vec![function(
            r"(?m)^[ \t]*def[ \t]+(?:(?P<recv>self|[A-Z]\w*)\.)?(?P<name>[A-Za-z_]\w*[?!=]?)(?:[ \t]*\((?P<params>[^)]*)\)|[ \t]+(?P<param>[^\n;#]+))?",
            FunctionForm::Declaration,
        )?],
        methods: vec![],
        fields: vec![re(r"(?m)^[ \t]*attr_(?:accessor|reader|writer)[ \t]+(?P<names>[^\n]+)")?],
        imports: vec![import(
            r#"(?m)^[ \t]*require(?:_relative)?[ \t]*\(?[ \t]*['"](?P<target>[^'"\n]*)['"]"#,
            ImportKind::Require,
        )?],
        exports: vec![],
        probe: re(r"(?m)^[ \t]*(?P<kw>class|def)[ \t]+[A-Za-z_]")?,
    })
}

fn php() -> Compiled {
    Ok(LanguagePatterns {
        syntax: Syntax {
            line_comments: &["//", "#"],
            block_comment: C_COMMENTS,
            quotes: b"\"'",
            triple_quotes: false,
            blocks: BlockStyle::Braces,
            params: ParamStyle::TypeName,
            visibility: DefaultVisibility::ByName,
        },
        classes: vec![class(
            r"(?m)^[ \t]*(?P<mods>(?:(?:abstract|final|readonly)[ \t]+)*)(?P<kind>class|interface|trait|enum)[ \t]+(?P<name>[A-Za-z_]\w*)(?:[ \t]*:[ \t]*[\w\\]+)?(?:\s+extends\s+(?P<bases>[^{]+?))?(?:\s+implements\s+(?P<implements>[^{]+?))?\s*(?P<open>\{)",
            None,
        )?],
        impls: vec![],
        functions: vec![function(
            r"(?m)^[ \t]*(?P<mods>(?:(?:public|private|protected|static|abstract|final)[ \t]+)*)function[ \t]+&?(?P<name>[A-Za-z_]\w*)[ \t]*\((?P<params>[^)]*)\)(?:[ \t]*:[ \t]*(?P<ret>\??[\w\\|]+))?\s*(?:(?P<open>\{)|;)",
            FunctionForm::Declaration,
        )?],
        methods: vec![],
        fields: vec![re(
            r"(?m)^[ \t]*(?P<mods>(?:(?:public|private|protected|static|readonly|var)[ \t]+)+)(?:(?P<type>\??[\w\\|]+)[ \t]+)?\$(?P<name>[A-Za-z_]\w*)[ \t]*(?:=[^;]*)?;",
        )?],
        imports: vec![
            ImportPattern {
                regex: re(
                    r"(?m)^[ \t]*use[ \t]+(?:function[ \t]+|const[ \t]+)?(?P<target>\\?[A-Za-z_][\w\\]*)(?:[ \t]+as[ \t]+\w+)?[ \t]*;",
                )?,
                kind: ImportKind::Direct,
                item: None,
                top_level_only: true,
            },
            import(
                r#"\b(?:require|include)(?:_once)?[ \t]*\(?[ \t]*['"](?P<target>[^'"\n]*)['"]"#,
                ImportKind::Require,
            )?,
        ],
        exports: vec![],
        probe: re(
            r"(?m)^[ \t]*(?:(?:abstract|final|readonly|public|private|protected|static)[ \t]+)*(?P<kw>class|interface|trait|enum|function)[ \t]+&?[A-Za-z_]",
        )?,
    })
}

fn swift() -> Compiled {
    const ATTRIBUTES: &str = r"(?:@\w+(?:\([^)\n]*\))?[ \t]+)*";
    Ok(LanguagePatterns {
        syntax: Syntax {
            line_comments: &["//"],
            block_comment: C_COMMENTS,
            quotes: b"\"",
            triple_quotes: true,
            blocks: BlockStyle::Braces,
            params: ParamStyle::NameColonType,
            visibility: DefaultVisibility::ByName,
        },
        classes: vec![class(
            &format!(
                r"(?m)^[ \t]*{ATTRIBUTES}(?P<mods>(?:(?:public|private|fileprivate|internal|open|final|indirect)[ \t]+)*)(?P<kind>class|struct|protocol|enum|actor)[ \t]+(?P<name>[A-Za-z_]\w*)(?:%G%)?(?:[ \t]*:[ \t]*(?P<bases>[^{{\n]+?))?(?:[ \t]+where[^{{\n]+?)?[ \t]*(?P<open>\{{)"
            ),
            None,
        )?],
        impls: vec![re(
            r"(?m)^[ \t]*(?:(?:public|private|fileprivate|internal)[ \t]+)?extension[ \t]+(?P<target>[A-Za-z_][\w.]*)(?:%G%)?(?:[ \t]*:[ \t]*(?P<trait>[^{\n]+?))?(?:[ \t]+where[^{\n]+?)?[ \t]*(?P<open>\{)",
        )?],
        functions: vec![function(
            &format!(
                r"(?m)^[ \t]*{ATTRIBUTES}(?P<mods>(?:(?:public|private|fileprivate|internal|open|static|class|final|override|mutating|nonmutating|convenience|required|optional|dynamic|nonisolated)[ \t]+)*)func[ \t]+(?P<name>[A-Za-z_]\w*)[ \t]*(?:%G%)?[ \t]*\((?P<params>[^)]*)\)(?:[ \t]*(?:async|throws|rethrows))*(?:[ \t]*->[ \t]*(?P<ret>[^{{\n]+?))?(?:[ \t]+where[^{{\n]+?)?[ \t]*(?:(?P<open>\{{)[^\n]*|$)"
            ),
            FunctionForm::Declaration,
        )?],
        methods: vec![function(
            &format!(
                r"(?m)^[ \t]*{ATTRIBUTES}(?P<mods>(?:(?:public|private|fileprivate|internal|convenience|required|override)[ \t]+)*)(?P<name>init|deinit)[?!]?[ \t]*(?:\((?P<params>[^)]*)\))?[^{{\n]*(?P<open>\{{)"
            ),
            FunctionForm::Declaration,
        )?],
        fields: vec![re(&format!(
            r"(?m)^[ \t]*{ATTRIBUTES}(?P<mods>(?:(?:public|private|fileprivate|internal|open|static|class|final|override|lazy|weak|unowned)[ \t]+)*)(?:let|var)[ \t]+(?P<name>[A-Za-z_]\w*)(?:[ \t]*:[ \t]*(?P<type>[^={{\n]+?))?[ \t]*(?:[={{][^\n]*)?$"
        ))?],
        imports: vec![import(
            r"(?m)^[ \t]*(?:@\w+[ \t]+)?import[ \t]+(?:(?:typealias|struct|class|enum|protocol|let|var|func)[ \t]+)?(?P<target>[\w.]+)",
            ImportKind::Direct,
        )?],
        exports: vec![],
        probe: re(
            r"(?m)^[ \t]*(?:@\w+[ \t]+)*(?:(?:public|private|fileprivate|internal|open|final|static|override|mutating)[ \t]+)*(?P<kw>class|struct|protocol|enum|actor|func|extension)[ \t]+[A-Za-z_]",
        )?,
    })
}

fn c_family() -> Compiled {
    const RET: &str = r"(?:(?P<ret>[A-Za-z_][\w:<>,\*& \t]*?)[ \t\*&]+)?";
    Ok(LanguagePatterns {
        syntax: Syntax {
            line_comments: &["//"],
            block_comment: C_COMMENTS,
            quotes: b"\"'",
            triple_quotes: false,
            blocks: BlockStyle::Braces,
            params: ParamStyle::TypeName,
            visibility: DefaultVisibility::ByName,
        },
        classes: vec![
            class(
                r"(?m)^[ \t]*(?:template[ \t]*<[^>\n]*>[ \t]*)?(?:typedef[ \t]+)?(?P<kind>class|struct|union)[ \t]+(?:[A-Z][A-Z0-9_]*[ \t]+)?(?P<name>[A-Za-z_]\w*)(?:[ \t]+final)?(?:[ \t]*:[ \t]*(?P<bases>[^{;\n]+?))?\s*(?P<open>\{)",
                None,
            )?,
            class(
                r"(?m)^[ \t]*(?:typedef[ \t]+)?enum(?:[ \t]+(?:class|struct))?[ \t]+(?P<name>[A-Za-z_]\w*)(?:[ \t]*:[ \t]*[\w:]+)?\s*(?P<open>\{)",
                Some(ClassKind::Enum),
            )?,
        ],
        impls: vec![],
        functions: vec![function(
            &format!(
                r"(?m)^[ \t]*(?:template[ \t]*<[^>\n]*>\s*)?(?P<mods>(?:(?:static|inline|virtual|extern|constexpr|explicit|friend)[ \t]+)*){RET}(?P<name>~?[A-Za-z_]\w*(?:::~?[A-Za-z_]\w*)*)[ \t]*\((?P<params>[^)]*)\)[ \t]*(?:const)?[ \t]*(?:noexcept)?[ \t]*(?:override|final)?[ \t]*(?::[^{{;]*)?(?P<open>\{{)"
            ),
            FunctionForm::Declaration,
        )?],
        methods: vec![function(
            &format!(
                r"(?m)^[ \t]*(?P<mods>(?:(?:static|inline|virtual|explicit|friend|constexpr)[ \t]+)*){RET}(?P<name>~?[A-Za-z_]\w*)[ \t]*\((?P<params>[^)]*)\)[ \t]*(?:const)?[ \t]*(?:noexcept)?[ \t]*(?:override|final)?[ \t]*(?:=[ \t]*(?:0|default|delete))?[ \t]*;"
            ),
            FunctionForm::Declaration,
        )?],
        fields: vec![re(
            r"(?m)^[ \t]*(?P<mods>(?:(?:static|mutable|const|constexpr|inline)[ \t]+)*)(?P<type>[A-Za-z_][\w:<>,\*& \t]*?)[ \t\*&]+(?P<name>[A-Za-z_]\w*)(?:\[[^\]\n]*\])?[ \t]*(?:=[^;\n]*|\{[^}\n]*\})?;",
        )?],
        imports: vec![import(
            r#"(?m)^[ \t]*#[ \t]*include[ \t]*["<](?P<target>[^">\n]*)[">]"#,
            ImportKind::Include,
        )?],
        exports: vec![],
        probe: re(
            r"(?m)^[ \t]*(?:typedef[ \t]+)?(?:template[ \t]*<[^>\n]*>[ \t]*)?(?P<kw>class|struct|union|enum)[ \t]+[A-Za-z_][^;\n]*\{",
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Language; 12] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::Kotlin,
        Language::CSharp,
        Language::Go,
        Language::Rust,
        Language::Ruby,
        Language::Php,
        Language::Swift,
        Language::C,
        Language::Cpp,
    ];

    #[test]
    fn test_every_table_compiles() {
        for language in ALL {
            assert!(
                for_language(language).is_ok(),
                "{:?}",
                for_language(language).err()
            );
        }
    }

    #[test]
    fn test_python_has_no_table() {
        assert!(for_language(Language::Python).is_err());
    }

    #[test]
    fn test_generic_placeholder_expands() {
        let regex = re(r"^List%G%$").unwrap();
        assert!(regex.is_match("List<Map<K, V>>"));
        assert!(!regex.is_match("List"));
    }

    #[test]
    fn test_probe_requires_declaration_shape() {
        let probe = &for_language(Language::TypeScript).unwrap().probe;
        assert!(probe.is_match("export type Id = string;"));
        assert!(!probe.is_match("  type: 'button',"));
        assert!(!probe.is_match("  type = 'x';"));
    }
}
