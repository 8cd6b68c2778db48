#[cfg(feature = "fs-store")]
use chrono::{Duration, Utc};
#[cfg(feature = "fs-store")]
use concat_with::concat_line;
#[cfg(feature = "fs-store")]
use serde_json::json;
#[cfg(feature = "fs-store")]
use std::fs;
#[cfg(feature = "fs-store")]
use tempfile::tempdir;

#[cfg(feature = "fs-store")]
use webapp_admin_lib::{
    categories, AdminConfig, Certificate, CertificateKind, FsConfig, FsStore, Property, Session,
    SettingsPath, Store, StoreBuilder, StoreConfig,
};

#[cfg(feature = "fs-store")]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[cfg(feature = "fs-store")]
#[test]
fn test_fs_store() {
    init_logger();

    let root = tempdir().unwrap();
    let backups = tempdir().unwrap();

    let store = FsStore::new(&FsConfig {
        root_dir: root.path().to_owned(),
    })
    .unwrap();
    store
        .create_user(
            "alice",
            Some(concat_line!(
                "language = \"nl_NL\"",
                "addresses = [\"SMTP:alice@localhost\", \"smtp:a@localhost\"]",
            )),
        )
        .unwrap();
    store.create_user("bob", None).unwrap();

    assert_eq!(vec!["alice", "bob"], store.list_users().unwrap());
    let profile = store.user_profile("alice").unwrap();
    assert_eq!(Some("nl_NL"), profile.language.as_deref());
    assert_eq!(2, profile.addresses.len());
    assert_eq!(None, store.user_profile("bob").unwrap().language);
    assert!(store.user_profile("carol").is_err());

    let config = AdminConfig {
        backup_dir: Some(backups.path().to_owned()),
        ..AdminConfig::default()
    };
    let session = Session::new(&store, &config);

    // settings are persisted as a whole document
    session.set_theme("alice", "dark").unwrap();
    let raw = fs::read(root.path().join("alice").join("webapp-settings.json")).unwrap();
    let raw: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(
        json!({"settings": {"zarafa": {"v1": {
            "contexts": {"mail": {}},
            "main": {"active_theme": "dark"},
        }}}}),
        raw
    );

    // backup with sorted keys, then restore into another user
    let path = session.backup_settings("alice").unwrap();
    assert_eq!(backups.path().join("alice.json"), path);
    assert_eq!(
        concat_line!(
            "{",
            "    \"settings\": {",
            "        \"zarafa\": {",
            "            \"v1\": {",
            "                \"contexts\": {",
            "                    \"mail\": {}",
            "                },",
            "                \"main\": {",
            "                    \"active_theme\": \"dark\"",
            "                }",
            "            }",
            "        }",
            "    }",
            "}",
        )
        .trim_end(),
        fs::read_to_string(&path).unwrap()
    );

    session.restore_settings("bob", Some(&path)).unwrap();
    let (tree, _) = session.read_settings("bob").unwrap();
    assert_eq!(
        Some("dark"),
        tree.get_str(&SettingsPath::parse("settings.zarafa.v1.main.active_theme").unwrap())
    );

    // a backup without settings root is refused
    let invalid = backups.path().join("invalid.json");
    fs::write(&invalid, "{\"zarafa\": {}}").unwrap();
    assert!(session.restore_settings("bob", Some(&invalid)).is_err());

    session.reset_settings("alice").unwrap();
    assert_eq!(
        Some(br#"{"settings":{"zarafa":{"v1":{"contexts":{"mail":{}}}}}}"#.to_vec()),
        store.read_property("alice", Property::WebappSettings).unwrap()
    );
}

#[cfg(feature = "fs-store")]
#[test]
fn test_signature_files() {
    init_logger();

    let root = tempdir().unwrap();
    let backups = tempdir().unwrap();

    let store = FsStore::new(&FsConfig {
        root_dir: root.path().to_owned(),
    })
    .unwrap();
    store.create_user("alice", None).unwrap();

    let config = AdminConfig {
        backup_dir: Some(backups.path().to_owned()),
        ..AdminConfig::default()
    };
    let session = Session::new(&store, &config);

    // adding takes the file name as signature name
    let file = backups.path().join("Work.html");
    fs::write(&file, "<p>Work</p>").unwrap();
    let id = session
        .restore_signature("alice", &file, false, true)
        .unwrap();

    let paths = session.backup_signatures("alice").unwrap();
    let expected = backups.path().join(format!("alice_Work_{}.html", id));
    assert_eq!(vec![expected.clone()], paths);
    assert_eq!("<p>Work</p>", fs::read_to_string(&expected).unwrap());

    // replacing takes both the name and the id from the file name
    let file = backups.path().join("alice_My-signature_42.html");
    fs::write(&file, "<p>Mine</p>").unwrap();
    assert_eq!(
        "42",
        session.restore_signature("alice", &file, true, false).unwrap()
    );
    let signatures = session.list_signatures("alice").unwrap();
    assert_eq!(2, signatures.len());
    assert_eq!("My signature", signatures[1].1.name);

    let file = backups.path().join("no-id.html");
    fs::write(&file, "").unwrap();
    assert!(session.restore_signature("alice", &file, true, false).is_err());
}

#[cfg(feature = "fs-store")]
#[test]
fn test_categories_and_certificates() {
    init_logger();

    let root = tempdir().unwrap();
    let backups = tempdir().unwrap();

    let config = AdminConfig {
        store: StoreConfig::Fs(FsConfig {
            root_dir: root.path().to_owned(),
        }),
        backup_dir: Some(backups.path().to_owned()),
        ..AdminConfig::default()
    };
    fs::create_dir(root.path().join("alice")).unwrap();

    let store = StoreBuilder::build(&config.store).unwrap();
    let session = Session::new(store.as_ref(), &config);

    // categories
    assert_eq!(None, session.export_categories("alice").unwrap());

    let file = backups.path().join("red.json");
    fs::write(&file, r##"[{"name": "Red", "color": "#e40023"}]"##).unwrap();
    session.import_categories("alice", Some(&file)).unwrap();

    let raw = store
        .read_property("alice", Property::PersistentSettings)
        .unwrap();
    let (tree, _) = categories::load(raw.as_deref());
    assert_eq!(
        Some(&json!([{"name": "Red", "color": "#e40023"}])),
        categories::export(&tree)
    );

    let path = session.export_categories("alice").unwrap().unwrap();
    assert_eq!(backups.path().join("alice-categories.json"), path);

    // certificates
    let now = Utc::now();
    for (id, kind, valid_until) in [
        ("1", CertificateKind::Private, now + Duration::days(30)),
        ("2", CertificateKind::Public, now - Duration::days(30)),
    ] {
        let certificate = Certificate {
            id: id.into(),
            kind,
            subject: "alice@localhost".into(),
            serial: format!("100{}", id),
            valid_from: now - Duration::days(365),
            valid_until,
            body: format!("body {}", id).into_bytes(),
        };
        session.import_certificate("alice", &certificate).unwrap();
    }

    let certificates = store.list_certificates("alice").unwrap();
    assert_eq!(2, certificates.len());
    assert_eq!(b"body 1".to_vec(), certificates[0].body);
    assert_eq!(CertificateKind::Public, certificates[1].kind);

    let paths = session.export_certificates("alice", false).unwrap();
    assert_eq!(vec![backups.path().join("alice@localhost-1001.pfx")], paths);
    let paths = session.export_certificates("alice", true).unwrap();
    assert_eq!(2, paths.len());
    assert_eq!(
        "body 2",
        fs::read_to_string(backups.path().join("alice@localhost-1002.pub")).unwrap()
    );

    let removed = session.remove_expired_certificates("alice").unwrap();
    assert_eq!(1, removed.len());
    assert_eq!("2", removed[0].id);
    assert_eq!(1, store.list_certificates("alice").unwrap().len());
    assert!(store.delete_certificate("alice", "2").is_err());
}
