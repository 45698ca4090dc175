//! Component naming.

use camino::Utf8Path;

/// Extracts a component name from a file path.
///
/// Given `components/Card.jsx`, returns `"Card"`. An `index` file takes the
/// name of its directory, so `components/Card/index.js` is also `"Card"`.
/// Returns `"Component"` if no name can be extracted.
pub fn component_name_from_path(path: &Utf8Path) -> String {
    let stem = path.file_stem().unwrap_or_default();

    let name = if stem == "index" {
        path.parent()
            .and_then(Utf8Path::file_name)
            .unwrap_or(stem)
    } else {
        stem
    };

    if name.is_empty() {
        "Component".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_name_from_path() {
        assert_eq!(component_name_from_path(Utf8Path::new("src/Card.jsx")), "Card");
        assert_eq!(
            component_name_from_path(Utf8Path::new("components/SearchPanel/index.js")),
            "SearchPanel"
        );
        assert_eq!(component_name_from_path(Utf8Path::new("index.tsx")), "index");
        assert_eq!(component_name_from_path(Utf8Path::new("")), "Component");
    }
}
