use refactor_core::{
    rename_symbol, FileFilter, LexicalSource, LineRange, QueryCommand, RenameScope,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = root.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_strings_and_comments_are_never_renamed() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        temp_dir.path(),
        "app.js",
        "// render the page\nfunction render() {}\nconst label = \"render\";\n/* render */\nrender();\n",
    );

    let outcome = rename_symbol(
        &LexicalSource,
        &FileFilter::default(),
        "render",
        "draw",
        &RenameScope::project(temp_dir.path()),
        false,
    )
    .unwrap();

    assert_eq!(outcome.changes(), 2);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "// render the page\nfunction draw() {}\nconst label = \"render\";\n/* render */\ndraw();\n"
    );
}

#[test]
fn test_raw_string_contents_are_never_renamed() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        temp_dir.path(),
        "raw.rs",
        "fn target() {}\nlet s = r#\"say \"target\" now\"#;\ntarget();\n",
    );

    let outcome = rename_symbol(
        &LexicalSource,
        &FileFilter::default(),
        "target",
        "aim",
        &RenameScope::file(&path),
        false,
    )
    .unwrap();

    assert_eq!(outcome.changes(), 2);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "fn aim() {}\nlet s = r#\"say \"target\" now\"#;\naim();\n"
    );
}

#[test]
fn test_calls_inside_interpolations_are_renamed() {
    let temp_dir = TempDir::new().unwrap();
    let js = write(
        temp_dir.path(),
        "msg.js",
        "function target() {}\nconst s = `target: ${target()}`;\n",
    );
    let py = write(
        temp_dir.path(),
        "msg.py",
        "def target(): pass\nprint(f\"target: {target()}\")\n",
    );

    let outcome = rename_symbol(
        &LexicalSource,
        &FileFilter::default(),
        "target",
        "aim",
        &RenameScope::project(temp_dir.path()),
        false,
    )
    .unwrap();

    assert_eq!(outcome.changes(), 4);
    assert_eq!(
        fs::read_to_string(&js).unwrap(),
        "function aim() {}\nconst s = `target: ${aim()}`;\n"
    );
    assert_eq!(
        fs::read_to_string(&py).unwrap(),
        "def aim(): pass\nprint(f\"target: {aim()}\")\n"
    );
}

#[test]
fn test_only_whole_identifiers_are_renamed() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        temp_dir.path(),
        "ids.rs",
        "let id = 1;\nlet id2 = id + 1;\nlet myid = id2;\nlet identifier = id;\n",
    );

    let outcome = rename_symbol(
        &LexicalSource,
        &FileFilter::default(),
        "id",
        "identifier2",
        &RenameScope::file(&path),
        false,
    )
    .unwrap();

    assert_eq!(outcome.changes(), 3);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "let identifier2 = 1;\nlet id2 = identifier2 + 1;\nlet myid = id2;\nlet identifier = identifier2;\n"
    );
}

#[test]
fn test_second_rename_finds_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.py", "def area(r):\n    return area(r - 1)\n");
    let scope = RenameScope::project(temp_dir.path());

    let first =
        rename_symbol(&LexicalSource, &FileFilter::default(), "area", "size", &scope, false)
            .unwrap();
    let second =
        rename_symbol(&LexicalSource, &FileFilter::default(), "area", "size", &scope, false)
            .unwrap();

    assert_eq!(first.changes(), 2);
    assert_eq!(second.changes(), 0);
    assert!(second.files_touched.is_empty());
    assert!(second.failures.is_empty());
}

#[test]
fn test_dry_run_keeps_content_and_mtime() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        temp_dir.path(),
        "lib.rs",
        "fn total() -> u32 { 1 }\nfn twice() -> u32 { total() + total() }\n",
    );
    let before = fs::read(&path).unwrap();
    let modified = fs::metadata(&path).unwrap().modified().unwrap();
    let scope = RenameScope::project(temp_dir.path());

    let preview =
        rename_symbol(&LexicalSource, &FileFilter::default(), "total", "sum", &scope, true)
            .unwrap();

    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);

    let applied =
        rename_symbol(&LexicalSource, &FileFilter::default(), "total", "sum", &scope, false)
            .unwrap();
    assert_eq!(preview.changes(), 3);
    assert_eq!(preview.changes(), applied.changes());
    assert_eq!(preview.changed_locations, applied.changed_locations);
}

#[test]
fn test_line_range_limits_the_rename() {
    let temp_dir = TempDir::new().unwrap();
    let content: String = std::iter::once("let x = 0;\n".to_string())
        .chain((2..=25).map(|n| format!("show(x, {});\n", n)))
        .collect();
    let path = write(temp_dir.path(), "lines.rs", &content);

    let outcome = rename_symbol(
        &LexicalSource,
        &FileFilter::default(),
        "x",
        "y",
        &RenameScope::lines(&path, LineRange::new(10, 20).unwrap()),
        false,
    )
    .unwrap();

    assert_eq!(outcome.changes(), 11);
    for (number, line) in fs::read_to_string(&path).unwrap().lines().enumerate() {
        let number = number + 1;
        if (10..=20).contains(&number) {
            assert!(line.contains("(y,"), "line {} should be renamed: {}", number, line);
        } else {
            assert!(!line.contains('y'), "line {} should be untouched: {}", number, line);
        }
    }
}

#[test]
fn test_missing_file_scope_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = rename_symbol(
        &LexicalSource,
        &FileFilter::default(),
        "a",
        "b",
        &RenameScope::file(temp_dir.path().join("nope.rs")),
        false,
    )
    .unwrap_err();
    assert!(err.is_input_error());
}

#[cfg(unix)]
#[test]
fn test_query_tool_decides_what_is_a_string() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(temp_dir.path(), "a.rs", "let id = id;\n");

    // The tool claims the second `id` is inside a string
    let tool = QueryCommand::new(
        vec![
            "sh".to_string(),
            "-c".to_string(),
            "printf 'definition 0 4 0 6 id\\nstring 0 9 0 11 id\\n'".to_string(),
        ],
        None,
    )
    .unwrap();

    let outcome = rename_symbol(
        &tool,
        &FileFilter::default(),
        "id",
        "renamed",
        &RenameScope::file(&path),
        false,
    )
    .unwrap();

    assert_eq!(outcome.changes(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), "let renamed = id;\n");
}

#[cfg(unix)]
#[test]
fn test_failing_query_tool_is_a_per_file_failure() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(temp_dir.path(), "a.rs", "let id = 1;\n");
    let tool = QueryCommand::new(vec!["false".to_string()], None).unwrap();

    let outcome = rename_symbol(
        &tool,
        &FileFilter::default(),
        "id",
        "renamed",
        &RenameScope::project(temp_dir.path()),
        false,
    )
    .unwrap();

    assert_eq!(outcome.changes(), 0);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), "let id = 1;\n");
}
