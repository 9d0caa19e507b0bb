//! Operation scripts: parsed commands executed against a typed tree.

use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::{KeyKind, Settings};
use crate::domain::{BinarySearchTree, FloatKey, NodeRef};
use crate::parser::{parse_line, Command};
use crate::tree_traits::TreeNodeConvert;

/// A command together with the (1-based) script line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub command: Command,
}

/// Sequence of tree operations, executed top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// Parses script source. Blank and comment lines are skipped.
    #[instrument(level = "debug", skip(source))]
    pub fn parse(source: &str) -> ApplicationResult<Self> {
        let mut steps = Vec::new();
        for (i, raw) in source.lines().enumerate() {
            let line = i + 1;
            let (_, command) = parse_line(raw).map_err(|_| ApplicationError::Parse {
                line,
                content: raw.trim().to_string(),
            })?;
            if let Some(command) = command {
                steps.push(Step { line, command });
            }
        }
        debug!(steps = steps.len(), "parsed script");
        Ok(Self { steps })
    }

    #[instrument(level = "debug")]
    pub fn from_file(path: &Path) -> ApplicationResult<Self> {
        if !path.exists() {
            return Err(ApplicationError::ScriptNotFound(path.to_path_buf()));
        }
        let source = fs::read_to_string(path).with_path_context("read script", path)?;
        Self::parse(&source)
    }

    pub fn from_commands(commands: impl IntoIterator<Item = Command>) -> Self {
        let steps = commands
            .into_iter()
            .enumerate()
            .map(|(i, command)| Step {
                line: i + 1,
                command,
            })
            .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Runs the script on a fresh tree whose key type follows `settings.key_kind`.
    pub fn execute<W: Write>(&self, settings: &Settings, out: &mut W) -> ApplicationResult<()> {
        match settings.key_kind {
            KeyKind::Int => self.run(&mut BinarySearchTree::<i64>::new(), settings, out),
            KeyKind::Float => self.run(&mut BinarySearchTree::<FloatKey>::new(), settings, out),
            KeyKind::String => self.run(&mut BinarySearchTree::<String>::new(), settings, out),
        }
    }

    /// Runs the script on `tree`, writing query results to `out`.
    #[instrument(level = "debug", skip_all)]
    pub fn run<K, W>(
        &self,
        tree: &mut BinarySearchTree<K>,
        settings: &Settings,
        out: &mut W,
    ) -> ApplicationResult<()>
    where
        K: Ord + FromStr + Display,
        K::Err: Display,
        W: Write,
    {
        for step in &self.steps {
            step.apply(tree, settings, out)?;
        }
        if settings.show_tree {
            writeln!(out, "{}", tree.to_tree_string()).with_context("write script output")?;
        }
        debug!(len = tree.len(), height = tree.height(), "script finished");
        Ok(())
    }
}

impl Step {
    fn apply<K, W>(
        &self,
        tree: &mut BinarySearchTree<K>,
        settings: &Settings,
        out: &mut W,
    ) -> ApplicationResult<()>
    where
        K: Ord + FromStr + Display,
        K::Err: Display,
        W: Write,
    {
        let line = self.line;
        let parse_key = |raw: &str| {
            raw.parse::<K>().map_err(|e| ApplicationError::InvalidKey {
                line,
                key: raw.to_string(),
                reason: e.to_string(),
            })
        };
        // all keys of a line are parsed before the tree is touched
        let parse_keys = |raw: &[String]| {
            raw.iter()
                .map(|k| parse_key(k.as_str()))
                .collect::<ApplicationResult<Vec<K>>>()
        };

        let written = match &self.command {
            Command::Insert(raw) => {
                let added = parse_keys(raw.as_slice())?
                    .into_iter()
                    .map(|key| tree.insert(key))
                    .filter(|&added| added)
                    .count();
                debug!(line, added, "insert");
                Ok(())
            }
            Command::Delete(raw) => {
                let removed = parse_keys(raw.as_slice())?
                    .iter()
                    .filter(|key| tree.delete(*key))
                    .count();
                debug!(line, removed, "delete");
                Ok(())
            }
            Command::Contains(raw) => {
                let key = parse_key(raw.as_str())?;
                writeln!(out, "contains {}: {}", key, tree.contains(&key))
            }
            Command::Find(raw) => {
                let key = parse_key(raw.as_str())?;
                match tree.find_by_key(&key) {
                    Some(node) => writeln!(
                        out,
                        "find {}: parent={} left={} right={}",
                        node.key(),
                        link_label(node.parent()),
                        link_label(node.left()),
                        link_label(node.right()),
                    ),
                    None => writeln!(out, "find {}: not found", key),
                }
            }
            Command::Min => writeln!(out, "min: {}", key_label(tree.min())),
            Command::Max => writeln!(out, "max: {}", key_label(tree.max())),
            Command::Height => writeln!(out, "height: {}", tree.height()),
            Command::Empty => writeln!(out, "empty: {}", tree.empty()),
            Command::Len => writeln!(out, "len: {}", tree.len()),
            Command::Print => writeln!(out, "{}", tree.iter().join(&settings.separator)),
            Command::Tree => writeln!(out, "{}", tree.to_tree_string()),
            Command::Validate => {
                tree.validate()?;
                writeln!(out, "validate: ok")
            }
            Command::Clear => {
                tree.clear();
                Ok(())
            }
        };
        written.with_context("write script output")
    }
}

fn key_label<K: Display>(key: Option<&K>) -> String {
    key.map_or_else(|| "none".to_string(), ToString::to_string)
}

fn link_label<K: Display>(node: Option<NodeRef<'_, K>>) -> String {
    node.map_or_else(|| "-".to_string(), |n| n.key().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    fn run_int(source: &str) -> String {
        let script = Script::parse(source).expect("script parses");
        let mut out = Vec::new();
        script
            .run(&mut BinarySearchTree::<i64>::new(), &settings(), &mut out)
            .expect("script runs");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn test_scenario_script() {
        let output = run_int(
            "insert 5 3 2 1 6 10 9\n\
             contains 9\n\
             height\n\
             min\n\
             max\n\
             delete 5\n\
             print\n",
        );
        assert_eq!(
            output,
            "contains 9: true\nheight: 4\nmin: 1\nmax: 10\n1 2 3 6 9 10\n"
        );
    }

    #[test]
    fn test_empty_tree_queries() {
        let output = run_int("empty\nmin\nmax\nheight\ndelete 7\nlen\n");
        assert_eq!(
            output,
            "empty: true\nmin: none\nmax: none\nheight: 0\nlen: 0\n"
        );
    }

    #[test]
    fn test_find_reports_links() {
        let output = run_int("insert 5 3 8 4\nfind 3\nfind 42\n");
        assert_eq!(
            output,
            "find 3: parent=5 left=- right=4\nfind 42: not found\n"
        );
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = Script::parse("insert 1\n\nbogus 2\n").unwrap_err();
        match err {
            ApplicationError::Parse { line, content } => {
                assert_eq!(line, 3);
                assert_eq!(content, "bogus 2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_key_leaves_tree_untouched() {
        let script = Script::parse("insert 1 2 x 3").expect("script parses");
        let mut tree = BinarySearchTree::<i64>::new();
        let err = script
            .run(&mut tree, &settings(), &mut Vec::<u8>::new())
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidKey { line: 1, .. }));
        assert!(tree.empty());
    }

    #[test]
    fn test_separator_and_key_kind_from_settings() {
        let settings = Settings {
            key_kind: KeyKind::String,
            separator: ",".to_string(),
            ..Settings::default()
        };
        let script = Script::parse("insert p e q a\nprint").expect("script parses");
        let mut out = Vec::new();
        script.execute(&settings, &mut out).expect("script runs");
        assert_eq!(String::from_utf8(out).unwrap(), "a,e,p,q\n");
    }
}
