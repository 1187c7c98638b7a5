//! End-to-end checks: JSON document to resolved server configuration text.

use rstest::rstest;

use steward_tree::{Environment, Scalar, render_children_to_string, resolve_tree, source};

const DOCUMENT: &str = r#"{
    "application": {
        "terminal": "true",
        "path": "[object]/mongod.conf",
        "executable": "/usr/bin/mongod"
    },
    "database": {
        "systemLog": {
            "destination": "file",
            "path": {"[v]": "[object]/logs/mongod.log"},
            "logAppend": "true"
        },
        "net": {
            "bindIp": ["127.0.0.1", "[subnet]"],
            "port": 27017
        },
        "storage": {
            "[v]": "dropped because storage is a branch",
            "dbPath": "[object]/data"
        },
        "processManagement": null
    }
}"#;

#[rstest]
fn renders_resolved_database_subtree() {
    let mut tree = source::parse_str(DOCUMENT).expect("document should parse");
    resolve_tree(&mut tree, &Environment::new("192.168.1.20", "/srv/db"));

    assert_eq!(tree.value_at("application.terminal"), Some(&Scalar::Bool(true)));
    assert_eq!(
        tree.value_at("database.systemLog.path.[v]"),
        Some(&Scalar::from("/srv/db/logs/mongod.log"))
    );

    let database = tree.find("database").expect("database subtree");
    assert_eq!(
        render_children_to_string(database),
        concat!(
            "systemLog:\n",
            "  destination: file\n",
            "  path: /srv/db/logs/mongod.log\n",
            "  logAppend: true\n",
            "net:\n",
            "  bindIp: 127.0.0.1\n",
            "  bindIp: 192.168.1.20\n",
            "  port: 27017\n",
            "storage:\n",
            "  dbPath: /srv/db/data\n",
        )
    );
}

#[rstest]
fn rendering_resolved_output_twice_is_stable() {
    let environment = Environment::new("10.0.0.7", "/opt/db");
    let mut tree = source::parse_str(DOCUMENT).expect("document should parse");
    resolve_tree(&mut tree, &environment);
    let first = render_children_to_string(tree.find("database").expect("database subtree"));

    resolve_tree(&mut tree, &environment);
    let second = render_children_to_string(tree.find("database").expect("database subtree"));

    assert_eq!(first, second);
}
