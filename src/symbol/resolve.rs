//! Does an import source refer to a given file?
//!
//! Resolution is purely textual: no module search paths, no package
//! manifests. It is good enough to answer "who imports this file" for the
//! common layouts of each language.

use crate::language::Language;

const JS_EXTENSIONS: &[&str] = &["d.ts", "js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

/// Whether `source`, imported from `importer`, resolves to `target`.
pub fn resolves_to(importer: &str, language: Language, source: &str, target: &str) -> bool {
    if source == target {
        return true;
    }
    match language {
        Language::JavaScript | Language::TypeScript => resolves_js(importer, source, target),
        Language::Python => resolves_python(importer, source, target),
        Language::Go => resolves_go(source, target),
        Language::Rust => resolves_rust(importer, source, target),
    }
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Join `relative` onto `base`, collapsing `.` and `..`. `None` when it
/// climbs above the root.
fn join_relative(base: &str, relative: &str) -> Option<String> {
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

fn strip_js_extension(path: &str) -> &str {
    JS_EXTENSIONS
        .iter()
        .find_map(|ext| path.strip_suffix(ext).and_then(|p| p.strip_suffix('.')))
        .unwrap_or(path)
}

fn resolves_js(importer: &str, source: &str, target: &str) -> bool {
    if !(source.starts_with("./") || source.starts_with("../")) {
        return false;
    }
    let Some(resolved) = join_relative(parent_dir(importer), source) else {
        return false;
    };
    let resolved = strip_js_extension(&resolved);
    let target = strip_js_extension(target);
    target == resolved || target.strip_suffix("/index") == Some(resolved)
}

/// `pkg/sub/mod.py` -> `pkg/sub/mod`, `pkg/__init__.py` -> `pkg`
fn python_module_path(path: &str) -> Option<&str> {
    let stem = path
        .strip_suffix(".py")
        .or_else(|| path.strip_suffix(".pyi"))?;
    Some(
        stem.strip_suffix("/__init__")
            .unwrap_or(if stem == "__init__" { "" } else { stem }),
    )
}

fn resolves_python(importer: &str, source: &str, target: &str) -> bool {
    let Some(target_module) = python_module_path(target) else {
        return false;
    };

    let dots = source.chars().take_while(|c| *c == '.').count();
    let dotted = &source[dots..];
    let relative_path = dotted.replace('.', "/");

    if dots > 0 {
        let mut base = parent_dir(importer).to_string();
        for _ in 1..dots {
            base = parent_dir(&base).to_string();
        }
        return join_relative(&base, &relative_path).as_deref() == Some(target_module);
    }

    // Absolute: either from the repository root or from a source root such
    // as `src/`
    !relative_path.is_empty()
        && (target_module == relative_path
            || target_module.ends_with(&format!("/{}", relative_path)))
}

fn resolves_go(source: &str, target: &str) -> bool {
    if !target.ends_with(".go") {
        return false;
    }
    let package_dir = parent_dir(target);
    !package_dir.is_empty()
        && (source == package_dir || source.ends_with(&format!("/{}", package_dir)))
}

/// Crate directory and module path of a Rust file:
/// `src/lib.rs` -> `("", [])`, `core/src/a/mod.rs` -> `("core/", [a])`,
/// `src/a/b.rs` -> `("", [a, b])`.
fn rust_module_path(path: &str) -> Option<(&str, Vec<&str>)> {
    let stem = path.strip_suffix(".rs")?;
    let (crate_dir, within) = match stem.rfind("src/") {
        Some(i) if i == 0 || stem[..i].ends_with('/') => (&stem[..i], &stem[i + 4..]),
        _ => ("", stem),
    };
    let mut segments: Vec<&str> = within.split('/').filter(|s| !s.is_empty()).collect();
    match segments.last() {
        Some(&"mod") => {
            segments.pop();
        }
        Some(&"lib") | Some(&"main") if segments.len() == 1 => {
            segments.pop();
        }
        _ => {}
    }
    Some((crate_dir, segments))
}

/// `crate::a::{b, c::D}` -> `[crate::a::b, crate::a::c::D]`
fn expand_use_tree(source: &str) -> Vec<String> {
    match source.split_once('{') {
        Some((prefix, rest)) => rest
            .trim_end_matches('}')
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| format!("{}{}", prefix, item))
            .collect(),
        None => vec![source.to_string()],
    }
}

fn resolves_rust(importer: &str, source: &str, target: &str) -> bool {
    let (Some((importer_crate, importer_module)), Some((target_crate, target_module))) =
        (rust_module_path(importer), rust_module_path(target))
    else {
        return false;
    };
    if importer_crate != target_crate {
        return false;
    }

    expand_use_tree(source).iter().any(|path| {
        let mut segments = path.split("::").map(str::trim).filter(|s| !s.is_empty());
        let mut resolved: Vec<&str> = match segments.next() {
            Some("crate") => Vec::new(),
            Some("self") => importer_module.clone(),
            Some("super") => {
                let mut parent = importer_module.clone();
                if parent.pop().is_none() {
                    return false;
                }
                parent
            }
            _ => return false,
        };
        resolved.extend(segments);
        prefix_matches(&resolved, &target_module)
    })
}

/// `use a::b::Item` refers to module `a::b`, so any prefix of the path may
/// name the target module.
fn prefix_matches(path: &[&str], target_module: &[&str]) -> bool {
    !target_module.is_empty()
        && path.len() >= target_module.len()
        && path[..target_module.len()] == *target_module
}
