//! Lint: key labels like `[M]` must only be drawn on clickable rows.
//!
//! Every action in the mine is reachable by tap as well as by key, so a
//! render.rs line that shows a bracketed key through plain `push(` is a
//! button nobody can tap on a phone.

use std::fs;
use std::path::{Path, PathBuf};

/// True for a single-character key label such as `[M]` or `[1]`.
fn contains_key_label(s: &str) -> bool {
    s.as_bytes()
        .windows(3)
        .any(|w| w[0] == b'[' && w[2] == b']' && w[1].is_ascii_alphanumeric())
}

/// `(line_number, text)` for every plain push that renders a key label.
fn unclickable_key_labels(source: &str) -> Vec<(usize, String)> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim_start();
            !trimmed.starts_with("//")
                && contains_key_label(line)
                && line.contains(".push(")
                && !line.contains("push_clickable(")
        })
        .map(|(i, line)| (i + 1, line.trim().to_string()))
        .collect()
}

fn render_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            render_files(&path, out);
        } else if path.file_name().is_some_and(|n| n == "render.rs") {
            out.push(path);
        }
    }
}

#[test]
fn key_labels_are_clickable() {
    let games_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/games");
    let mut files = Vec::new();
    render_files(&games_dir, &mut files);
    assert!(!files.is_empty(), "no render.rs found under {}", games_dir.display());

    let mut report = String::new();
    for path in &files {
        let Ok(source) = fs::read_to_string(path) else {
            continue;
        };
        for (line_num, line) in unclickable_key_labels(&source) {
            report.push_str(&format!("  {}:{}: {}\n", path.display(), line_num, line));
        }
    }
    assert!(
        report.is_empty(),
        "key labels drawn with push() instead of push_clickable():\n{}",
        report
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_plain_push_with_key_label() {
        let source = r#"cl.push(Line::from(" [U] 解放する"));"#;
        assert_eq!(unclickable_key_labels(source).len(), 1);
    }

    #[test]
    fn allows_clickable_push() {
        let source = r#"cl.push_clickable(Line::from(" [M] 採掘"), MINE_BASE);"#;
        assert!(unclickable_key_labels(source).is_empty());
    }

    #[test]
    fn ignores_comments_and_format_placeholders() {
        let source = "// cl.push(Line::from(\" [C] 回収\"));\n\
                      cl.push(Line::from(format!(\" [{}] \", key)));";
        assert!(unclickable_key_labels(source).is_empty());
    }

    #[test]
    fn key_label_detection() {
        assert!(contains_key_label("[M]"));
        assert!(contains_key_label("x [4] y"));
        assert!(!contains_key_label("[]"));
        assert!(!contains_key_label("[MAX]"));
        assert!(!contains_key_label("[{}]"));
    }
}
