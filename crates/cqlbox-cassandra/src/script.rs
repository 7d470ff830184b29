//! Init-script loading and application
//!
//! After the node is confirmed ready, an optional CQL script is resolved,
//! split into statements and submitted in order through the command delegate.
//! No internal retries: a failed attempt is rerun from the first statement by
//! the owning startup loop, never resumed mid-script.

use crate::delegate::CqlDelegate;
use crate::resource::ResourceLoader;
use cqlbox_common::{CqlboxError, Result};
use tracing::{debug, error, info, warn};

/// Split a script into discrete statements.
///
/// Statements are terminated by `;` outside string literals. `--` and `//`
/// line comments and `/* */` block comments are stripped; blank statements
/// are skipped. Trailing text without a terminator still counts as a
/// statement.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = script.chars().peekable();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    while let Some(c) = chars.next() {
        if in_single_quote {
            current.push(c);
            if c == '\'' {
                in_single_quote = false;
            }
            continue;
        }
        if in_double_quote {
            current.push(c);
            if c == '"' {
                in_double_quote = false;
            }
            continue;
        }

        match c {
            '\'' => {
                in_single_quote = true;
                current.push(c);
            }
            '"' => {
                in_double_quote = true;
                current.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                skip_line_comment(&mut chars);
                current.push('\n');
            }
            '/' if chars.peek() == Some(&'/') => {
                skip_line_comment(&mut chars);
                current.push('\n');
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                skip_block_comment(&mut chars);
                current.push(' ');
            }
            ';' => {
                push_statement(&mut statements, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_statement(&mut statements, &current);

    statements
}

fn skip_line_comment(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    for c in chars.by_ref() {
        if c == '\n' {
            break;
        }
    }
}

fn skip_block_comment(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    let mut prev = ' ';
    for c in chars.by_ref() {
        if prev == '*' && c == '/' {
            break;
        }
        prev = c;
    }
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

/// Applies an optional init script through a command delegate
pub struct InitScriptApplier<'a> {
    loader: &'a dyn ResourceLoader,
}

impl<'a> InitScriptApplier<'a> {
    /// Create an applier resolving scripts through the given loader
    pub fn new(loader: &'a dyn ResourceLoader) -> Self {
        Self { loader }
    }

    /// Resolve and execute the script, if one is configured.
    ///
    /// An absent script is immediate success. A script that cannot be located
    /// or read fails the attempt before any statement runs. The first failing
    /// statement halts the sequence; the error carries the script identity
    /// and the zero-based statement index.
    pub async fn apply(&self, script: Option<&str>, delegate: &dyn CqlDelegate) -> Result<()> {
        let Some(script) = script else {
            debug!("No init script configured");
            return Ok(());
        };

        let cql = match self.loader.read_to_string(script) {
            Ok(cql) => cql,
            Err(err) => {
                warn!(script = %script, error = %err, "Could not load init script");
                return Err(err);
            }
        };

        let statements = split_statements(&cql);
        info!(
            script = %script,
            statements = statements.len(),
            "Applying init script"
        );

        for (index, statement) in statements.iter().enumerate() {
            if let Err(err) = delegate.execute(statement).await {
                error!(
                    script = %script,
                    index,
                    error = %err,
                    "Error while executing init script"
                );
                return Err(CqlboxError::ScriptExecution {
                    script: script.to_string(),
                    index,
                    source: Box::new(err),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::DirResourceLoader;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    // ------------------------------------------------------------------------
    // Statement splitting
    // ------------------------------------------------------------------------

    #[test]
    fn splits_on_terminators() {
        let statements = split_statements("CREATE KEYSPACE ks;\nUSE ks;\n");
        assert_eq!(statements, vec!["CREATE KEYSPACE ks", "USE ks"]);
    }

    #[test]
    fn strips_comments() {
        let script = "\
-- leading comment
CREATE TABLE t (id bigint PRIMARY KEY); // trailing comment
/* block
   comment */
INSERT INTO t (id) VALUES (1);
";
        let statements = split_statements(script);
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE t (id bigint PRIMARY KEY)",
                "INSERT INTO t (id) VALUES (1)"
            ]
        );
    }

    #[test]
    fn terminator_inside_literal_is_preserved() {
        let statements =
            split_statements("INSERT INTO t (name) VALUES ('a;b');\nINSERT INTO t (name) VALUES ('it''s');");
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("'a;b'"));
        assert!(statements[1].contains("'it''s'"));
    }

    #[test]
    fn comment_markers_inside_literal_are_preserved() {
        let statements = split_statements("INSERT INTO t (name) VALUES ('-- not a comment');");
        assert_eq!(
            statements,
            vec!["INSERT INTO t (name) VALUES ('-- not a comment')"]
        );
    }

    #[test]
    fn blank_statements_are_skipped() {
        let statements = split_statements(";;  ;\n-- only a comment\n;");
        assert!(statements.is_empty());
    }

    #[test]
    fn trailing_statement_without_terminator_counts() {
        let statements = split_statements("SELECT 1;\nSELECT 2");
        assert_eq!(statements, vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn empty_script_yields_nothing() {
        assert!(split_statements("").is_empty());
        assert!(split_statements("   \n\t").is_empty());
    }

    // ------------------------------------------------------------------------
    // Applier
    // ------------------------------------------------------------------------

    /// Records every submitted statement; optionally rejects one index within
    /// a run, either on every run or only the first.
    struct RecordingDelegate {
        submitted: Mutex<Vec<String>>,
        fail_at: Option<usize>,
        fail_once: bool,
        calls_this_run: AtomicUsize,
        failed_already: AtomicBool,
    }

    impl RecordingDelegate {
        fn accepting() -> Self {
            Self {
                submitted: Mutex::new(Vec::new()),
                fail_at: None,
                fail_once: false,
                calls_this_run: AtomicUsize::new(0),
                failed_already: AtomicBool::new(false),
            }
        }

        fn failing_at(index: usize, fail_once: bool) -> Self {
            Self {
                fail_at: Some(index),
                fail_once,
                ..Self::accepting()
            }
        }

        /// Reset the per-run statement counter, as a fresh start attempt would.
        fn begin_run(&self) {
            self.calls_this_run.store(0, Ordering::SeqCst);
        }

        fn submitted(&self) -> Vec<String> {
            self.submitted.lock().expect("lock poisoned").clone()
        }
    }

    #[async_trait]
    impl CqlDelegate for RecordingDelegate {
        async fn execute(&self, statement: &str) -> cqlbox_common::Result<()> {
            let index = self.calls_this_run.fetch_add(1, Ordering::SeqCst);
            self.submitted
                .lock()
                .expect("lock poisoned")
                .push(statement.to_string());

            if let Some(fail_at) = self.fail_at {
                let already = self.fail_once && self.failed_already.load(Ordering::SeqCst);
                if index == fail_at && !already {
                    self.failed_already.store(true, Ordering::SeqCst);
                    return Err(cqlbox_common::CqlboxError::Statement(
                        "injected failure".to_string(),
                    ));
                }
            }
            Ok(())
        }
    }

    fn script_loader(contents: &str) -> (tempfile::TempDir, DirResourceLoader) {
        let root = tempfile::tempdir().expect("tempdir");
        fs::write(root.path().join("seed.cql"), contents).expect("write");
        let loader = DirResourceLoader::new(vec![root.path().to_path_buf()]);
        (root, loader)
    }

    #[tokio::test]
    async fn absent_script_is_immediate_success() {
        let loader = DirResourceLoader::default();
        let delegate = RecordingDelegate::accepting();

        InitScriptApplier::new(&loader)
            .apply(None, &delegate)
            .await
            .expect("absent script succeeds");
        assert!(delegate.submitted().is_empty());
    }

    #[tokio::test]
    async fn missing_script_fails_before_any_statement() {
        let root = tempfile::tempdir().expect("tempdir");
        let loader = DirResourceLoader::new(vec![root.path().to_path_buf()]);
        let delegate = RecordingDelegate::accepting();

        let err = InitScriptApplier::new(&loader)
            .apply(Some("absent.cql"), &delegate)
            .await
            .unwrap_err();

        assert!(matches!(err, cqlbox_common::CqlboxError::ResourceNotFound(id) if id == "absent.cql"));
        assert!(delegate.submitted().is_empty());
    }

    #[tokio::test]
    async fn statements_run_in_file_order() {
        let (_root, loader) = script_loader(
            "CREATE KEYSPACE ks;\nCREATE TABLE ks.t (id bigint PRIMARY KEY);\nINSERT INTO ks.t (id) VALUES (1);",
        );
        let delegate = RecordingDelegate::accepting();

        InitScriptApplier::new(&loader)
            .apply(Some("seed.cql"), &delegate)
            .await
            .expect("script applies");

        assert_eq!(
            delegate.submitted(),
            vec![
                "CREATE KEYSPACE ks",
                "CREATE TABLE ks.t (id bigint PRIMARY KEY)",
                "INSERT INTO ks.t (id) VALUES (1)"
            ]
        );
    }

    #[tokio::test]
    async fn first_failing_statement_halts_the_sequence() {
        let (_root, loader) = script_loader("SELECT 1;\nSELECT 2;\nSELECT 3;");
        let delegate = RecordingDelegate::failing_at(1, false);

        let err = InitScriptApplier::new(&loader)
            .apply(Some("seed.cql"), &delegate)
            .await
            .unwrap_err();

        match err {
            cqlbox_common::CqlboxError::ScriptExecution { script, index, .. } => {
                assert_eq!(script, "seed.cql");
                assert_eq!(index, 1);
            }
            other => panic!("expected ScriptExecution, got {other:?}"),
        }
        // Statement 2 was never submitted.
        assert_eq!(delegate.submitted(), vec!["SELECT 1", "SELECT 2"]);
    }

    #[tokio::test]
    async fn retried_attempt_reexecutes_from_the_first_statement() {
        let (_root, loader) = script_loader("SELECT 1;\nSELECT 2;\nSELECT 3;");
        let delegate = RecordingDelegate::failing_at(1, true);
        let applier = InitScriptApplier::new(&loader);

        applier
            .apply(Some("seed.cql"), &delegate)
            .await
            .unwrap_err();

        // A retried attempt starts over; nothing is resumed mid-script.
        delegate.begin_run();
        applier
            .apply(Some("seed.cql"), &delegate)
            .await
            .expect("second run succeeds");

        assert_eq!(
            delegate.submitted(),
            vec!["SELECT 1", "SELECT 2", "SELECT 1", "SELECT 2", "SELECT 3"]
        );
    }
}
