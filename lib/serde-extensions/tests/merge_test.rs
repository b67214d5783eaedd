use serde_extensions::{DottedPath, Merge};
use serde_json::json;

#[test]
pub fn merge_is_deep() {
    let mut base = json!({
        "title": "Home",
        "_meta": { "context_path": "index" },
        "nav": { "home": "/", "about": "/about" }
    });
    base.merge(json!({
        "_meta": { "culture": "en" },
        "nav": { "about": "/en/about" }
    }));

    assert_eq!(
        base,
        json!({
            "title": "Home",
            "_meta": { "context_path": "index", "culture": "en" },
            "nav": { "home": "/", "about": "/en/about" }
        })
    );
}

#[test]
pub fn last_overlay_wins() {
    let overlays = vec![
        json!({"a": 1, "shared": {"x": 1, "y": 1}}),
        json!({"b": 2, "shared": {"y": 2}}),
        json!({"shared": {"y": 3, "z": 3}}),
    ];
    let mut merged = json!({});
    for overlay in overlays {
        merged.merge(overlay);
    }

    assert_eq!(
        merged,
        json!({"a": 1, "b": 2, "shared": {"x": 1, "y": 3, "z": 3}})
    );
}

#[test]
pub fn mapping_replaces_scalar() {
    let mut base = json!({"author": "anonymous"});
    base.merge(json!({"author": {"name": "Lyr"}}));
    assert_eq!(base.dotted("author.name"), Some(&json!("Lyr")));
}
