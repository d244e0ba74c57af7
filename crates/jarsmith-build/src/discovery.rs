//! Entry-point discovery over compiled classes

use crate::classfile::{BytecodeIndexer, ClassInfo};
use crate::error::{BuildError, BuildResult};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// `String[]`
pub const STRING_ARRAY: &str = "[Ljava/lang/String;";
/// `String`
pub const STRING: &str = "Ljava/lang/String;";
/// `java.lang.instrument.Instrumentation`
pub const INSTRUMENTATION: &str = "Ljava/lang/instrument/Instrumentation;";

/// Entry points found in a compiled unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPoints {
    /// Chosen `main` class
    pub main_class: Option<String>,
    /// Every class the choice was made from, in indexing order
    pub candidates: Vec<String>,
    /// Class declaring `agentmain`
    pub agent_main_class: Option<String>,
    /// Class declaring `premain`
    pub pre_main_class: Option<String>,
}

impl EntryPoints {
    /// More than one class qualified as `main` and no hint settled it
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

/// Index every top-level class below `dir`, in a stable order
pub fn index_classes(dir: &Path, indexer: &dyn BytecodeIndexer) -> BuildResult<Vec<ClassInfo>> {
    let mut classes = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            BuildError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(".class") || name.contains('$') {
            continue;
        }
        let bytes = fs::read(entry.path()).map_err(|e| BuildError::io(entry.path(), e))?;
        classes.push(indexer.index(entry.path(), &bytes)?);
    }

    Ok(classes)
}

/// Pick the entry points of the classes compiled into `dir`.
///
/// With several `main` candidates the one whose simple name equals
/// `suggested` wins; otherwise the first in indexing order is chosen and
/// the result reports itself ambiguous.
pub fn discover_entry_points(
    dir: &Path,
    indexer: &dyn BytecodeIndexer,
    suggested: Option<&str>,
    agent: bool,
) -> BuildResult<EntryPoints> {
    let classes = index_classes(dir, indexer)?;
    Ok(select_entry_points(&classes, suggested, agent))
}

pub(crate) fn select_entry_points(
    classes: &[ClassInfo],
    suggested: Option<&str>,
    agent: bool,
) -> EntryPoints {
    let mut mains: Vec<&ClassInfo> = classes
        .iter()
        .filter(|c| c.method("main", &[STRING_ARRAY]).is_some())
        .collect();

    if mains.len() > 1 {
        if let Some(suggested) = suggested {
            let matching: Vec<&ClassInfo> = mains
                .iter()
                .copied()
                .filter(|c| c.simple_name() == suggested)
                .collect();
            if !matching.is_empty() {
                mains = matching;
            }
        }
    }

    let mut entry_points = EntryPoints {
        main_class: mains.first().map(|c| c.name.clone()),
        candidates: mains.iter().map(|c| c.name.clone()).collect(),
        ..Default::default()
    };

    if agent {
        entry_points.agent_main_class = find_agent_method(classes, "agentmain");
        entry_points.pre_main_class = find_agent_method(classes, "premain");
    }

    entry_points
}

fn find_agent_method(classes: &[ClassInfo], method: &str) -> Option<String> {
    classes
        .iter()
        .find(|c| {
            c.method(method, &[STRING, INSTRUMENTATION]).is_some()
                || c.method(method, &[STRING]).is_some()
        })
        .map(|c| c.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::MethodInfo;
    use pretty_assertions::assert_eq;

    fn class(name: &str, methods: &[(&str, &str)]) -> ClassInfo {
        ClassInfo {
            name: name.to_string(),
            access_flags: 0,
            methods: methods
                .iter()
                .map(|(n, d)| MethodInfo {
                    access_flags: 0x0009,
                    name: n.to_string(),
                    descriptor: d.to_string(),
                })
                .collect(),
        }
    }

    const MAIN: (&str, &str) = ("main", "([Ljava/lang/String;)V");

    #[test]
    fn test_single_main() {
        let classes = vec![class("util.Helper", &[]), class("app.hello", &[MAIN])];
        let found = select_entry_points(&classes, None, false);
        assert_eq!(found.main_class.as_deref(), Some("app.hello"));
        assert!(!found.is_ambiguous());
    }

    #[test]
    fn test_suggested_name_breaks_tie() {
        let classes = vec![class("a.Other", &[MAIN]), class("b.hello", &[MAIN])];
        let found = select_entry_points(&classes, Some("hello"), false);
        assert_eq!(found.main_class.as_deref(), Some("b.hello"));
        assert!(!found.is_ambiguous());
    }

    #[test]
    fn test_ambiguous_falls_back_to_first() {
        let classes = vec![class("a.One", &[MAIN]), class("b.Two", &[MAIN])];
        let found = select_entry_points(&classes, Some("nomatch"), false);
        assert_eq!(found.main_class.as_deref(), Some("a.One"));
        assert!(found.is_ambiguous());
        assert_eq!(found.candidates, vec!["a.One", "b.Two"]);
    }

    #[test]
    fn test_main_with_wrong_signature_ignored() {
        let classes = vec![class("a.NotMain", &[("main", "()V")])];
        let found = select_entry_points(&classes, None, false);
        assert_eq!(found.main_class, None);
    }

    #[test]
    fn test_agent_entry_points() {
        let classes = vec![
            class("a.App", &[MAIN]),
            class(
                "a.Agent",
                &[(
                    "agentmain",
                    "(Ljava/lang/String;Ljava/lang/instrument/Instrumentation;)V",
                )],
            ),
            class("a.Pre", &[("premain", "(Ljava/lang/String;)V")]),
        ];

        let found = select_entry_points(&classes, None, true);
        assert_eq!(found.main_class.as_deref(), Some("a.App"));
        assert_eq!(found.agent_main_class.as_deref(), Some("a.Agent"));
        assert_eq!(found.pre_main_class.as_deref(), Some("a.Pre"));

        let found = select_entry_points(&classes, None, false);
        assert_eq!(found.agent_main_class, None);
        assert_eq!(found.pre_main_class, None);
    }
}
