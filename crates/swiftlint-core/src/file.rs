//! A source file under lint, with lazily computed derived data.

use crate::command::{commands_in, Command, RuleIdentifier};
use crate::location::{ByteRange, Location, LocationConverter, Position};
use crate::region::{regions, Region};
use crate::storage::FileId;
use crate::syntax::{scan_comments, Comment, ParseError, SourceParser, SyntaxTree};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

static NEXT_VIRTUAL_ID: AtomicU64 = AtomicU64::new(0);

/// One line of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Line number (1-indexed).
    pub index: usize,
    /// Byte span, excluding the newline.
    pub range: ByteRange,
    /// Line text, excluding the newline.
    pub content: &'a str,
}

/// A Swift source file, on disk or in memory.
///
/// Derived data (location converter, tree, comments, commands, regions) is
/// computed on first use and cached until the contents change.
pub struct SwiftLintFile {
    id: FileId,
    contents: String,
    parser: Arc<dyn SourceParser>,
    converter: OnceLock<LocationConverter>,
    tree: OnceLock<Result<Arc<SyntaxTree>, ParseError>>,
    comments: OnceLock<Vec<Comment>>,
    commands: OnceLock<Vec<Command>>,
    expanded_commands: OnceLock<Vec<Command>>,
    regions: OnceLock<Vec<Region>>,
}

impl std::fmt::Debug for SwiftLintFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwiftLintFile")
            .field("id", &self.id)
            .field("len", &self.contents.len())
            .finish_non_exhaustive()
    }
}

impl SwiftLintFile {
    /// Reads a file from disk.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read as UTF-8.
    pub fn from_path(path: impl Into<PathBuf>, parser: Arc<dyn SourceParser>) -> std::io::Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)?;
        Ok(Self::with_id(FileId::Path(path), contents, parser))
    }

    /// Creates an in-memory file that is never written to disk.
    #[must_use]
    pub fn virtual_file(contents: impl Into<String>, parser: Arc<dyn SourceParser>) -> Self {
        let id = FileId::Virtual(NEXT_VIRTUAL_ID.fetch_add(1, Ordering::Relaxed));
        Self::with_id(id, contents.into(), parser)
    }

    fn with_id(id: FileId, contents: String, parser: Arc<dyn SourceParser>) -> Self {
        Self {
            id,
            contents,
            parser,
            converter: OnceLock::new(),
            tree: OnceLock::new(),
            comments: OnceLock::new(),
            commands: OnceLock::new(),
            expanded_commands: OnceLock::new(),
            regions: OnceLock::new(),
        }
    }

    /// Stable identity of this file within a run.
    #[must_use]
    pub fn id(&self) -> &FileId {
        &self.id
    }

    /// Path on disk, `None` for virtual files.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.id {
            FileId::Path(path) => Some(path),
            FileId::Virtual(_) => None,
        }
    }

    /// Returns true for in-memory files.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        matches!(self.id, FileId::Virtual(_))
    }

    /// Current text.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Empty files (or a lone newline) never produce violations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty() || self.contents == "\n"
    }

    /// Offset-to-line/column converter for the current text.
    pub fn converter(&self) -> &LocationConverter {
        self.converter
            .get_or_init(|| LocationConverter::new(&self.contents))
    }

    /// Lines of the file, 1-indexed.
    pub fn lines(&self) -> impl Iterator<Item = Line<'_>> {
        let converter = self.converter();
        (1..=converter.line_count()).filter_map(move |index| {
            let range = converter.line_range(index)?;
            let content = self.contents.get(range.start..range.end)?;
            Some(Line {
                index,
                range,
                content: content.strip_suffix('\r').unwrap_or(content),
            })
        })
    }

    /// Location of a byte position in this file.
    #[must_use]
    pub fn location(&self, position: Position) -> Location {
        Location::from_position(self.path().map(Path::to_path_buf), self.converter(), position)
    }

    /// Location of a whole line or a line/column pair.
    #[must_use]
    pub fn location_at(&self, line: usize, character: Option<usize>) -> Location {
        Location::new(self.path().map(Path::to_path_buf), line, character)
    }

    /// The parsed tree, shared by every rule that needs it.
    ///
    /// # Errors
    ///
    /// Returns the cached [`ParseError`] if the parser rejected the file.
    pub fn syntax_tree(&self) -> Result<Arc<SyntaxTree>, ParseError> {
        self.tree
            .get_or_init(|| {
                let parsed = self.parser.parse(&self.contents).map(Arc::new);
                match &parsed {
                    Ok(tree) if tree.has_errors() => {
                        debug!("{}: parsed with error recovery", self.display_name());
                    }
                    Err(e) => debug!("{}: parse failed: {}", self.display_name(), e),
                    Ok(_) => {}
                }
                parsed
            })
            .clone()
    }

    /// The parse failure, if any.
    #[must_use]
    pub fn parse_error(&self) -> Option<ParseError> {
        self.syntax_tree().err()
    }

    /// Comment trivia, from the tree when available and lexically otherwise.
    pub fn comments(&self) -> &[Comment] {
        self.comments.get_or_init(|| match self.syntax_tree() {
            Ok(tree) => tree.comments(),
            Err(_) => scan_comments(&self.contents),
        })
    }

    /// Directive commands as written, without expanding modifiers.
    pub fn commands(&self) -> &[Command] {
        self.commands
            .get_or_init(|| commands_in(self.comments(), self.converter()))
    }

    /// Valid directive commands with `previous`/`this`/`next` expanded.
    pub fn expanded_commands(&self) -> &[Command] {
        self.expanded_commands.get_or_init(|| {
            self.commands()
                .iter()
                .filter(|command| command.is_valid())
                .flat_map(Command::expand)
                .collect()
        })
    }

    /// Suppression regions for every rule.
    pub fn regions(&self) -> &[Region] {
        self.regions.get_or_init(|| {
            regions(self.path_buf().as_ref(), self.expanded_commands(), None)
        })
    }

    /// Regions built only from commands naming one of `identifiers`.
    #[must_use]
    pub fn regions_restricted_to(&self, identifiers: &BTreeSet<RuleIdentifier>) -> Vec<Region> {
        regions(
            self.path_buf().as_ref(),
            self.expanded_commands(),
            Some(identifiers),
        )
    }

    /// Returns true unless `position` lies in a region disabling `rule_id`.
    #[must_use]
    pub fn is_rule_enabled_at(&self, rule_id: &str, position: Position) -> bool {
        let location = self.location(position);
        self.regions()
            .iter()
            .find(|r| r.contains(&location))
            .map_or(true, |r| r.is_rule_enabled(rule_id))
    }

    /// Replaces the contents, persisting them for disk files.
    ///
    /// Every cache is reset so the next query sees the new text.
    ///
    /// # Errors
    ///
    /// Returns an IO error if writing to disk fails.
    pub fn write(&mut self, contents: String) -> std::io::Result<()> {
        if let FileId::Path(path) = &self.id {
            std::fs::write(path, &contents)?;
        }
        self.contents = contents;
        self.invalidate_cache();
        Ok(())
    }

    /// Re-reads a disk file. Virtual files are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read.
    pub fn reload(&mut self) -> std::io::Result<()> {
        if let FileId::Path(path) = &self.id {
            self.contents = std::fs::read_to_string(path)?;
            self.invalidate_cache();
        }
        Ok(())
    }

    /// Drops every derived value.
    pub fn invalidate_cache(&mut self) {
        self.converter = OnceLock::new();
        self.tree = OnceLock::new();
        self.comments = OnceLock::new();
        self.commands = OnceLock::new();
        self.expanded_commands = OnceLock::new();
        self.regions = OnceLock::new();
    }

    /// Path for messages, `<nopath>` for virtual files.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path()
            .map_or_else(|| "<nopath>".to_string(), |p| p.display().to_string())
    }

    fn path_buf(&self) -> Option<PathBuf> {
        self.path().map(Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxTreeBuilder;

    struct FlatParser;

    impl SourceParser for FlatParser {
        fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
            if source.contains("@@") {
                return Err(ParseError::new("unexpected '@@'"));
            }
            let mut builder = SyntaxTreeBuilder::new(source);
            builder.start_node("source_file", true, 0);
            for comment in scan_comments(source) {
                builder.leaf("comment", true, comment.span.start, comment.span.end);
            }
            builder.finish_node(source.len());
            Ok(builder.finish())
        }
    }

    fn file(contents: &str) -> SwiftLintFile {
        SwiftLintFile::virtual_file(contents, Arc::new(FlatParser))
    }

    #[test]
    fn empty_and_newline_only_files_are_empty() {
        assert!(file("").is_empty());
        assert!(file("\n").is_empty());
        assert!(!file("\n\n").is_empty());
    }

    #[test]
    fn virtual_files_get_distinct_ids() {
        let a = file("let a = 1\n");
        let b = file("let a = 1\n");
        assert_ne!(a.id(), b.id());
        assert!(a.is_virtual());
        assert!(a.path().is_none());
    }

    #[test]
    fn lines_strip_newlines() {
        let f = file("one\ntwo  \r\nthree");
        let lines: Vec<_> = f.lines().map(|l| (l.index, l.content)).collect();
        assert_eq!(lines, vec![(1, "one"), (2, "two  "), (3, "three")]);
    }

    #[test]
    fn regions_come_from_comment_directives() {
        let f = file("// swiftlint:disable force_cast\nlet x = y as! Int\n");
        assert_eq!(f.commands().len(), 1);
        assert!(!f.is_rule_enabled_at("force_cast", Position(42)));
        assert!(f.is_rule_enabled_at("nesting", Position(42)));
    }

    #[test]
    fn invalid_commands_do_not_build_regions() {
        let f = file("// swiftlint:disabled force_cast\nlet x = y as! Int\n");
        assert_eq!(f.commands().len(), 1);
        assert!(f.expanded_commands().is_empty());
        assert!(f.is_rule_enabled_at("force_cast", Position(42)));
    }

    #[test]
    fn unparseable_file_still_resolves_directives() {
        let f = file("// swiftlint:disable line_length\n@@ broken\n");
        assert!(f.parse_error().is_some());
        assert_eq!(f.commands().len(), 1);
    }

    #[test]
    fn write_resets_caches_for_virtual_files() {
        let mut f = file("let a = 1\n");
        assert_eq!(f.converter().line_count(), 1);
        f.write("let a = 1\nlet b = 2\n".to_string()).unwrap();
        assert_eq!(f.converter().line_count(), 2);
        assert_eq!(f.contents(), "let a = 1\nlet b = 2\n");
    }

    #[test]
    fn write_persists_disk_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.swift");
        std::fs::write(&path, "let a = 1 \n").unwrap();
        let mut f = SwiftLintFile::from_path(&path, Arc::new(FlatParser)).unwrap();
        f.write("let a = 1\n".to_string()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "let a = 1\n");
        assert_eq!(f.path(), Some(path.as_path()));
    }
}
