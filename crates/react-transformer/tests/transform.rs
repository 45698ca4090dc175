//! Transformation behavior on small on-disk components.

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use react_transformer::{transform, DiagnosticCode, Severity, TransformError, TransformOptions};
use std::fs;
use tempfile::TempDir;

struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("out")).unwrap();
        Self { _dir: dir, root }
    }

    fn write(&self, path: &str, contents: &str) {
        let path = self.root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn options(&self, component: &str) -> TransformOptions {
        TransformOptions {
            filename: self.root.join("src").join(component),
            output_dir: self.root.join("out"),
            ..Default::default()
        }
    }
}

#[test]
fn unresolved_alias_import_is_reported() {
    let project = Project::new();
    let mut options = project.options("Card.jsx");
    options
        .aliases
        .insert("LIB".to_string(), project.root.join("lib"));

    let source = "\
import format from 'LIB/format';

export default function Card({ value }) {
  return <p>{format(value)}</p>;
}
";
    let result = transform(source, &options).unwrap();
    assert!(result
        .code
        .starts_with("<script>\n  import format from '../lib/format';\n"));

    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.code, DiagnosticCode::UnresolvedImport);
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!((diagnostic.line, diagnostic.column), (1, 20));

    project.write("lib/format.js", "export default (v) => String(v);\n");
    let result = transform(source, &options).unwrap();
    assert!(result.diagnostics.is_empty());
}

#[test]
fn alias_import_resolves_before_output_dir_exists() {
    let project = Project::new();
    project.write("lib/format.js", "export default (v) => String(v);\n");
    let mut options = project.options("Card.jsx");
    options.output_dir = project.root.join("build/svelte");
    options
        .aliases
        .insert("LIB".to_string(), project.root.join("lib"));

    let source = "\
import format from 'LIB/format';

export default ({ value }) => <p>{format(value)}</p>;
";
    let result = transform(source, &options).unwrap();
    assert!(!project.root.join("build").exists());
    assert!(result
        .code
        .starts_with("<script>\n  import format from '../../lib/format';\n"));
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn style_module_is_compiled_and_inlined() {
    let project = Project::new();
    project.write(
        "src/Badge/styles.js",
        "\
import { css } from 'emotion';

export const ROOT_CLASS = 'badge';

export default css`
  display: inline-block;

  .${ROOT_CLASS}__label {
    font-weight: bold;
  }
`;
",
    );
    let options = project.options("Badge/index.jsx");
    let source = "\
import styles, { ROOT_CLASS } from './styles';

export default ({ text }) => (
  <span className={`${ROOT_CLASS} ${styles}`}>
    <b className={`${ROOT_CLASS}__label`}>{text}</b>
  </span>
);
";
    let result = transform(source, &options).unwrap();
    assert_eq!(result.component_name, "Badge");
    assert_eq!(
        result.code,
        "\
<script>
  export let text = undefined;
</script>

<span class=\"badge\">
  <b class=\"badge__label\">{text}</b>
</span>

<style>
  .badge {
    display: inline-block;
  }

  .badge__label {
    font-weight: bold;
  }
</style>
"
    );
}

#[test]
fn style_import_without_literal_value_is_reported() {
    let project = Project::new();
    project.write(
        "src/Badge/styles.js",
        "\
import { css } from 'emotion';

export const ROOT_CLASS = 'badge';
const MODIFIER__OFF = 'is--off';

export default css`
  display: inline;
`;
",
    );
    let source = "\
import styles, { ROOT_CLASS, MODIFIER__OFF } from './styles';

export default ({ off }) => <span className={off ? MODIFIER__OFF : ROOT_CLASS}>x</span>;
";
    let result = transform(source, &project.options("Badge/index.jsx")).unwrap();

    let unresolved: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::UnresolvedImport)
        .collect();
    assert_eq!(unresolved.len(), 1, "{:?}", result.diagnostics);
    assert_eq!(
        unresolved[0].message,
        "`MODIFIER__OFF` is not exported with a literal value by \"./styles\""
    );
    assert_eq!((unresolved[0].line, unresolved[0].column), (1, 1));
    assert_eq!(unresolved[0].severity, Severity::Warning);
}

#[test]
fn missing_style_module_is_an_error() {
    let project = Project::new();
    let source = "import styles from './styles';\n\nexport default () => <div className={styles} />;\n";
    let err = transform(source, &project.options("Box.jsx")).unwrap_err();
    assert!(matches!(err, TransformError::StyleModuleRead { .. }));
}

#[test]
fn second_style_import_is_an_error() {
    let project = Project::new();
    let styles = "\
import { css } from 'emotion';

export const ROOT_CLASS = 'box';

export default css`
  margin: 0;
`;
";
    project.write("src/styles.js", styles);
    project.write("src/more-styles.js", styles);

    let source = "\
import styles from './styles';
import moreStyles from './more-styles';

export default () => <div />;
";
    let err = transform(source, &project.options("Box.jsx")).unwrap_err();
    match err {
        TransformError::DuplicateStyleImport { first, second, .. } => {
            assert_eq!(first, "./styles");
            assert_eq!(second, "./more-styles");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unsupported_lifecycle_is_fenced() {
    let project = Project::new();
    let source = "\
import React from 'react';

export default class Clock extends React.Component {
  shouldComponentUpdate() {
    return false;
  }

  render() {
    return <time>{this.props.now}</time>;
  }
}
";
    let result = transform(source, &project.options("Clock.jsx")).unwrap();
    assert!(result.code.contains(
        "\
  /* ==== MANUAL REVIEW: lifecycle method `shouldComponentUpdate` ==== */
  shouldComponentUpdate() {
    return false;
  }
  /* ==== END MANUAL REVIEW ==== */
</script>
"
    ));
    assert!(result.code.contains("export let now = undefined;"));
    assert!(result.code.contains("<time>{now}</time>"));
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::ManualReview && d.severity == Severity::Hint));
}

#[test]
fn children_referenced_in_logic_stay_a_prop() {
    let project = Project::new();
    let source = "\
export default function List({ children }) {
  const count = children.length;
  return <ul data-count={count}>{children}</ul>;
}
";
    let result = transform(source, &project.options("List.jsx")).unwrap();
    assert!(result.code.contains("export let children = undefined;"));
    assert!(result.code.contains("$: count = children.length;"));
    assert!(result.code.contains("<ul data-count={count}><slot /></ul>"));
}

#[test]
fn custom_excluded_modules() {
    let project = Project::new();
    let mut options = project.options("Icon.jsx");
    options.excluded_modules.push("classnames".to_string());
    options.aliases = IndexMap::new();

    let source = "\
import cx from 'classnames';
import { format } from 'date-fns';

export default ({ date }) => <i>{format(date)}</i>;
";
    let result = transform(source, &options).unwrap();
    assert!(!result.code.contains("classnames"));
    assert!(result.code.contains("  import { format } from 'date-fns';\n"));
}
