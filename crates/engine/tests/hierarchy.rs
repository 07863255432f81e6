use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    ConnectOptions, ConnectionType, Engine, EngineError, FinancialSettings, Network, OnExisting,
    OwnedShop, ShopLevel,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn sharing_revenue() -> ConnectOptions {
    ConnectOptions {
        settings: FinancialSettings {
            share_revenue: true,
            ..FinancialSettings::default()
        },
        ..ConnectOptions::default()
    }
}

#[tokio::test]
async fn designate_master_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let main = engine.create_shop("Main").await.unwrap();
    assert_eq!(main.level, ShopLevel::Independent);

    let first = engine.designate_master(&main.id).await.unwrap();
    let second = engine.designate_master(&main.id).await.unwrap();
    assert_eq!(first.level, ShopLevel::Master);
    assert_eq!(second.level, ShopLevel::Master);

    let stored = engine.shop(&main.id).await.unwrap();
    assert!(stored.is_master());
    assert_eq!(stored.master_shop_id, None);
}

#[tokio::test]
async fn connect_sets_branch_level_and_master() {
    let (engine, _db) = engine_with_db().await;
    let main = engine.create_shop("Main").await.unwrap();
    let branch = engine.create_shop("Branch A").await.unwrap();
    engine.designate_master(&main.id).await.unwrap();

    let connection = engine
        .connect_shop(&branch.id, &main.id, ConnectOptions::default())
        .await
        .unwrap();
    assert!(connection.active);
    assert_eq!(connection.connection_type, ConnectionType::Branch);
    assert_eq!(connection.settings, FinancialSettings::default());

    let branch = engine.shop(&branch.id).await.unwrap();
    assert_eq!(branch.level, ShopLevel::Branch);
    assert_eq!(branch.master_shop_id.as_deref(), Some(main.id.as_str()));
}

#[tokio::test]
async fn connecting_twice_keeps_a_single_entry() {
    let (engine, _db) = engine_with_db().await;
    let main = engine.create_shop("Main").await.unwrap();
    let branch = engine.create_shop("Branch A").await.unwrap();
    engine.designate_master(&main.id).await.unwrap();

    engine
        .connect_shop(&branch.id, &main.id, sharing_revenue())
        .await
        .unwrap();
    let again = engine
        .connect_shop(&branch.id, &main.id, ConnectOptions::default())
        .await
        .unwrap();
    assert!(again.settings.share_revenue);

    let connections = engine.list_connected_shops(&main.id, false).await.unwrap();
    assert_eq!(connections.len(), 1);
    assert!(connections[0].settings.share_revenue);
}

#[tokio::test]
async fn update_policy_replaces_settings() {
    let (engine, _db) = engine_with_db().await;
    let main = engine.create_shop("Main").await.unwrap();
    let branch = engine.create_shop("Branch A").await.unwrap();
    engine.designate_master(&main.id).await.unwrap();

    let first = engine
        .connect_shop(&branch.id, &main.id, ConnectOptions::default())
        .await
        .unwrap();
    let updated = engine
        .connect_shop(
            &branch.id,
            &main.id,
            ConnectOptions {
                connection_type: ConnectionType::Partner,
                on_existing: OnExisting::Update,
                ..sharing_revenue()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.connection_type, ConnectionType::Partner);
    assert!(updated.settings.share_revenue);

    let connections = engine.list_connected_shops(&main.id, false).await.unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].connection_type, ConnectionType::Partner);
}

#[tokio::test]
async fn reject_policy_fails_on_active_duplicate() {
    let (engine, _db) = engine_with_db().await;
    let main = engine.create_shop("Main").await.unwrap();
    let branch = engine.create_shop("Branch A").await.unwrap();
    engine.designate_master(&main.id).await.unwrap();

    let reject = ConnectOptions {
        on_existing: OnExisting::Reject,
        ..ConnectOptions::default()
    };
    engine
        .connect_shop(&branch.id, &main.id, reject)
        .await
        .unwrap();
    let err = engine
        .connect_shop(&branch.id, &main.id, reject)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateConnection(_)));

    // An inactive entry is not a duplicate.
    engine.disconnect_shop(&branch.id, &main.id).await.unwrap();
    let connection = engine
        .connect_shop(&branch.id, &main.id, reject)
        .await
        .unwrap();
    assert!(connection.active);
}

#[tokio::test]
async fn disconnect_and_reconnect_reuse_the_entry() {
    let (engine, _db) = engine_with_db().await;
    let main = engine.create_shop("Main").await.unwrap();
    let first = engine.create_shop("Branch A").await.unwrap();
    let second = engine.create_shop("Branch B").await.unwrap();
    engine.designate_master(&main.id).await.unwrap();

    let original = engine
        .connect_shop(&first.id, &main.id, ConnectOptions::default())
        .await
        .unwrap();
    engine
        .connect_shop(&second.id, &main.id, ConnectOptions::default())
        .await
        .unwrap();

    let disconnected = engine.disconnect_shop(&first.id, &main.id).await.unwrap();
    assert!(!disconnected.active);
    assert_eq!(
        engine.shop(&first.id).await.unwrap().level,
        ShopLevel::Independent
    );

    let active = engine.list_connected_shops(&main.id, true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].child_shop_id, second.id);
    assert_eq!(
        engine.list_connected_shops(&main.id, false).await.unwrap().len(),
        2
    );

    let err = engine.disconnect_shop(&first.id, &main.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let reconnected = engine
        .connect_shop(&first.id, &main.id, ConnectOptions::default())
        .await
        .unwrap();
    assert_eq!(reconnected.id, original.id);
    assert_eq!(reconnected.position, original.position);

    let order: Vec<_> = engine
        .list_connected_shops(&main.id, true)
        .await
        .unwrap()
        .into_iter()
        .map(|connection| connection.child_shop_id)
        .collect();
    assert_eq!(order, vec![first.id, second.id]);
}

#[tokio::test]
async fn resolve_network_lists_master_then_active_shops() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.create_user("alice").await.unwrap();
    let main = engine.create_shop("Main").await.unwrap();
    let a1 = engine.create_shop("A1").await.unwrap();
    let a2 = engine.create_shop("A2").await.unwrap();
    let a3 = engine.create_shop("A3").await.unwrap();
    engine.designate_master(&main.id).await.unwrap();
    for shop in [&a1, &a2, &a3] {
        engine
            .connect_shop(&shop.id, &main.id, ConnectOptions::default())
            .await
            .unwrap();
    }
    engine.disconnect_shop(&a3.id, &main.id).await.unwrap();
    engine
        .add_owned_shop(&user.id, &main.id, true)
        .await
        .unwrap();

    let Network::Master(shops) = engine.resolve_network(&user.id).await.unwrap() else {
        panic!("expected a master network");
    };
    let ids: Vec<_> = shops.into_iter().map(|shop| shop.id).collect();
    assert_eq!(ids, vec![main.id.clone(), a1.id.clone(), a2.id.clone()]);

    let from_branch: Vec<_> = engine
        .shop_network(&a2.id)
        .await
        .unwrap()
        .into_iter()
        .map(|shop| shop.id)
        .collect();
    assert_eq!(from_branch, vec![main.id, a1.id, a2.id]);
}

#[tokio::test]
async fn resolve_network_without_master_returns_owned_shops() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.create_user("bob").await.unwrap();
    let kiosk = engine.create_shop("Kiosk").await.unwrap();
    engine
        .add_owned_shop(&user.id, &kiosk.id, false)
        .await
        .unwrap();

    let network = engine.resolve_network(&user.id).await.unwrap();
    assert_eq!(
        network,
        Network::Owned(vec![OwnedShop {
            shop_id: kiosk.id,
            is_master: false,
        }])
    );
}

#[tokio::test]
async fn resolve_network_with_dangling_master_fails() {
    let (engine, db) = engine_with_db().await;
    let user = engine.create_user("carol").await.unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, "PRAGMA foreign_keys = OFF;"))
        .await
        .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE users SET master_shop_id = ? WHERE id = ?;",
        vec!["gone".into(), user.id.clone().into()],
    ))
    .await
    .unwrap();

    let err = engine.resolve_network(&user.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("master shop gone".to_string()));
}

#[tokio::test]
async fn connecting_unknown_or_same_shop_fails() {
    let (engine, _db) = engine_with_db().await;
    let main = engine.create_shop("Main").await.unwrap();
    engine.designate_master(&main.id).await.unwrap();

    let err = engine
        .connect_shop("missing", &main.id, ConnectOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("shop missing".to_string()));

    let err = engine
        .connect_shop(&main.id, "missing", ConnectOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("shop missing".to_string()));

    let err = engine
        .connect_shop(&main.id, &main.id, ConnectOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidConnection(_)));

    let err = engine.designate_master("missing").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("shop missing".to_string()));
}

#[tokio::test]
async fn a_shop_has_a_single_master() {
    let (engine, _db) = engine_with_db().await;
    let north = engine.create_shop("North").await.unwrap();
    let south = engine.create_shop("South").await.unwrap();
    let corner = engine.create_shop("Corner").await.unwrap();
    engine.designate_master(&north.id).await.unwrap();
    engine.designate_master(&south.id).await.unwrap();

    engine
        .connect_shop(&corner.id, &north.id, ConnectOptions::default())
        .await
        .unwrap();
    engine
        .connect_shop(&corner.id, &south.id, ConnectOptions::default())
        .await
        .unwrap();

    assert!(
        engine
            .list_connected_shops(&north.id, true)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        engine.shop(&corner.id).await.unwrap().master_shop_id,
        Some(south.id.clone())
    );

    // A branch cannot take connected shops of its own.
    let other = engine.create_shop("Other").await.unwrap();
    let err = engine
        .connect_shop(&other.id, &corner.id, ConnectOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidConnection(_)));

    // Promoting the branch detaches it from its master.
    engine.designate_master(&corner.id).await.unwrap();
    assert!(
        engine
            .list_connected_shops(&south.id, true)
            .await
            .unwrap()
            .is_empty()
    );
    let corner = engine.shop(&corner.id).await.unwrap();
    assert_eq!(corner.level, ShopLevel::Master);
    assert_eq!(corner.master_shop_id, None);
}

#[tokio::test]
async fn shop_names_are_unique_ignoring_case_and_accents() {
    let (engine, _db) = engine_with_db().await;
    engine.create_shop("Caffè Roma").await.unwrap();

    let err = engine.create_shop("  caffe   ROMA ").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let found = engine.shop_by_name("CAFFE roma").await.unwrap();
    assert_eq!(found.name, "Caffè Roma");
    assert_eq!(engine.shops().await.unwrap().len(), 1);
}
