use epic_crm_core::{
    open_db_in_memory, Action, Actor, DeleteOutcome, EntityKind, EntityRepository, EntityService,
    FieldValue, Filters, FormData, Purpose, QueryOptions, RepoError, Role, ServiceError,
};
use rusqlite::Connection;

const ADMIN: Actor = Actor {
    id: 1,
    role: Role::Admin,
};
const MANAGER: Actor = Actor {
    id: 2,
    role: Role::Management,
};
const SELLER: Actor = Actor {
    id: 3,
    role: Role::Commercial,
};
const SUPPORT: Actor = Actor {
    id: 4,
    role: Role::Support,
};

fn seeded() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO collaborators (id, full_name, password, email, role) VALUES
            (1, 'Root Admin', 'x', 'root@corp.test', 'admin'),
            (2, 'Greta Manager', 'x', 'greta@corp.test', 'gestion'),
            (3, 'Sam Seller', 'x', 'sam@corp.test', 'commercial'),
            (4, 'Ann Lee', 'x', 'ann@corp.test', 'support'),
            (6, 'Tom Trader', 'x', 'tom@corp.test', 'commercial');
         INSERT INTO clients (id, full_name, email, company_name, id_commercial) VALUES
            (1, 'Jane Doe', 'jane@corp.test', 'Acme', 3),
            (2, 'Bob Martin', 'bob@corp.test', 'Globex', 6);
         INSERT INTO contracts (id, client_id, total_amount, amount_due, signed) VALUES
            (1, 1, 1000.0, 200.0, 1),
            (2, 1, 500.0, 500.0, 0),
            (3, 1, 800.0, 0.0, 1),
            (4, 2, 900.0, 0.0, 1);
         INSERT INTO events (id, contract_id, support_id, title, start_date, end_date, participants) VALUES
            (1, 1, 4, 'Launch', '2025-06-10 09:00:00', '2025-06-10 18:00:00', 50),
            (2, 4, NULL, 'Gala', '2025-07-01 19:00:00', '2025-07-01 23:00:00', 120);",
    )
    .unwrap();
    conn
}

fn form(entries: &[(&str, FieldValue)]) -> FormData {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn ids(records: &[epic_crm_core::Record]) -> Vec<i64> {
    records.iter().map(|record| record.id().unwrap()).collect()
}

#[test]
fn commercial_creates_client_owned_by_themself() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let client = service
        .create(
            &SELLER,
            EntityKind::Client,
            form(&[
                ("full_name", FieldValue::from("Dana Scully")),
                ("email", FieldValue::from("dana@corp.test")),
                ("phone", FieldValue::from("06 12 34 56 78")),
            ]),
        )
        .unwrap();

    let client = client.as_client().unwrap();
    assert!(client.id.is_some());
    assert_eq!(client.id_commercial, Some(3));
    assert_eq!(client.phone.as_deref(), Some("0612345678"));
}

#[test]
fn support_cannot_create_clients() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let err = service
        .create(
            &SUPPORT,
            EntityKind::Client,
            form(&[("full_name", FieldValue::from("Dana Scully"))]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::PermissionDenied {
            action: Action::Create,
            kind: EntityKind::Client,
            id: None
        }
    ));
}

#[test]
fn missing_mandatory_fields_are_listed_together() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let err = service
        .create(
            &MANAGER,
            EntityKind::Contract,
            form(&[("client_id", FieldValue::from("1"))]),
        )
        .unwrap_err();
    match err {
        ServiceError::MissingFields { kind, fields } => {
            assert_eq!(kind, EntityKind::Contract);
            assert_eq!(fields, vec!["total_amount", "amount_due", "signed"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn contract_creation_checks_amounts() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let err = service
        .create(
            &MANAGER,
            EntityKind::Contract,
            form(&[
                ("client_id", FieldValue::from("1")),
                ("total_amount", FieldValue::from("1000")),
                ("amount_due", FieldValue::from("1500")),
                ("signed", FieldValue::from("oui")),
            ]),
        )
        .unwrap_err();
    match err {
        ServiceError::Validation(err) => assert_eq!(err.field, "amount_due"),
        other => panic!("unexpected error: {other}"),
    }

    let contract = service
        .create(
            &MANAGER,
            EntityKind::Contract,
            form(&[
                ("client_id", FieldValue::from("1")),
                ("total_amount", FieldValue::from("1000")),
                ("amount_due", FieldValue::from("250.5")),
                ("signed", FieldValue::from("oui")),
            ]),
        )
        .unwrap();
    let contract = contract.as_contract().unwrap();
    assert!(contract.signed);
    assert_eq!(contract.amount_due, 250.5);
    assert!(contract.created_date.is_some());
}

#[test]
fn commercial_creates_event_for_own_signed_contract() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let event = service
        .create(
            &SELLER,
            EntityKind::Event,
            form(&[
                ("contract_id", FieldValue::from("3")),
                ("title", FieldValue::from("Kickoff")),
                ("start_date", FieldValue::from("01-09-2025 10:00")),
                ("end_date", FieldValue::from("01-09-2025 12:00")),
                ("location", FieldValue::from("Paris")),
                ("participants", FieldValue::from("20")),
            ]),
        )
        .unwrap();

    let event = event.as_event().unwrap();
    assert_eq!(event.contract_id, 3);
    assert_eq!(event.support_id, None);
    assert!(event.start_date < event.end_date);
    assert_eq!(event.participants, 20);
}

#[test]
fn create_ignores_fields_outside_the_create_form() {
    let conn = seeded();
    let service = EntityService::new(&conn);

    let client = service
        .create(
            &SELLER,
            EntityKind::Client,
            form(&[
                ("full_name", FieldValue::from("Dana Scully")),
                ("email", FieldValue::from("dana@corp.test")),
                ("archived", FieldValue::Bool(true)),
                ("created_date", FieldValue::from("01-01-1999")),
            ]),
        )
        .unwrap();
    let stored = service
        .repo()
        .get(EntityKind::Client, client.id().unwrap(), QueryOptions::with_archived())
        .unwrap();
    assert!(!stored.is_archived());
    assert_ne!(
        stored.scalar("created_date"),
        Some(FieldValue::Date(
            chrono::NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()
        ))
    );

    let event = service
        .create(
            &SELLER,
            EntityKind::Event,
            form(&[
                ("contract_id", FieldValue::from("3")),
                ("title", FieldValue::from("Kickoff")),
                ("start_date", FieldValue::from("01-09-2025 10:00")),
                ("end_date", FieldValue::from("01-09-2025 12:00")),
                ("location", FieldValue::from("Paris")),
                ("participants", FieldValue::from("20")),
                ("support_id", FieldValue::Integer(3)),
            ]),
        )
        .unwrap();
    let stored = service
        .repo()
        .get(EntityKind::Event, event.id().unwrap(), QueryOptions::active_only())
        .unwrap();
    assert_eq!(stored.scalar("support_id"), Some(FieldValue::Null));
}

#[test]
fn commercial_contract_listing_shows_unplanned_signed_contracts() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let contracts = service
        .list(
            &SELLER,
            EntityKind::Contract,
            Purpose::List,
            QueryOptions::active_only(),
        )
        .unwrap();
    assert_eq!(ids(&contracts), vec![3]);

    let events = service
        .list(
            &MANAGER,
            EntityKind::Event,
            Purpose::List,
            QueryOptions::active_only(),
        )
        .unwrap();
    assert_eq!(ids(&events), vec![2]);
}

#[test]
fn search_narrows_the_default_scope() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let found = service
        .search(
            &ADMIN,
            EntityKind::Contract,
            QueryOptions::active_only(),
            &Filters::new().eq("client.company_name", "Globex"),
        )
        .unwrap();
    assert_eq!(ids(&found), vec![4]);
}

#[test]
fn support_edits_own_event_and_can_discard() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let mut event = service
        .details(EntityKind::Event, 1, QueryOptions::active_only())
        .unwrap();
    assert!(event.related().contains_key("contract"));

    service
        .apply_edit(&SUPPORT, &mut event, "title", FieldValue::from("Launch party"))
        .unwrap();
    let err = service
        .apply_edit(&SUPPORT, &mut event, "end_date", FieldValue::from("09-06-2025 08:00"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    service.save_changes(&SUPPORT, &event).unwrap();
    let stored = service
        .repo()
        .get(EntityKind::Event, 1, QueryOptions::active_only())
        .unwrap();
    assert_eq!(stored.scalar("title"), Some(FieldValue::from("Launch party")));

    service
        .apply_edit(&SUPPORT, &mut event, "notes", FieldValue::from("VIP list"))
        .unwrap();
    service.discard_changes(&mut event).unwrap();
    assert_eq!(event.scalar("notes"), Some(FieldValue::Null));
}

#[test]
fn support_cannot_touch_unassigned_events() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let mut event = service
        .repo()
        .get(EntityKind::Event, 2, QueryOptions::active_only())
        .unwrap();
    let err = service
        .apply_edit(&SUPPORT, &mut event, "title", FieldValue::from("Mine now"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied { .. }));
}

#[test]
fn management_only_assigns_support() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let mut event = service
        .repo()
        .get(EntityKind::Event, 2, QueryOptions::active_only())
        .unwrap();

    let err = service
        .apply_edit(&MANAGER, &mut event, "title", FieldValue::from("Renamed"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied { .. }));

    let err = service
        .apply_edit(&MANAGER, &mut event, "support_id", FieldValue::from("3"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    service
        .apply_edit(&MANAGER, &mut event, "support_id", FieldValue::from("4"))
        .unwrap();
    service.save_changes(&MANAGER, &event).unwrap();
    let stored = service
        .repo()
        .get(EntityKind::Event, 2, QueryOptions::active_only())
        .unwrap();
    assert_eq!(stored.scalar("support_id"), Some(FieldValue::Integer(4)));
}

#[test]
fn collaborator_changes_own_password() {
    let conn = seeded();
    let service = EntityService::new(&conn);
    let mut me = service
        .repo()
        .get(EntityKind::Collaborator, 3, QueryOptions::active_only())
        .unwrap();

    service
        .apply_edit(&SELLER, &mut me, "password", FieldValue::from("n3w-Secret"))
        .unwrap();
    service.save_changes(&SELLER, &me).unwrap();

    let signed_in = service.authenticate("Sam Seller", "n3w-Secret").unwrap();
    assert_eq!(signed_in.and_then(|user| user.id), Some(3));

    let mut colleague = service
        .repo()
        .get(EntityKind::Collaborator, 6, QueryOptions::active_only())
        .unwrap();
    let err = service
        .apply_edit(&SELLER, &mut colleague, "password", FieldValue::from("hijack"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::PermissionDenied {
            action: Action::Password,
            ..
        }
    ));
}

#[test]
fn delete_archives_for_users_and_removes_for_admin() {
    let conn = seeded();
    let service = EntityService::new(&conn);

    let mut client = service
        .repo()
        .get(EntityKind::Client, 1, QueryOptions::active_only())
        .unwrap();
    let err = service.delete(&SUPPORT, &mut client).unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied { .. }));

    assert_eq!(
        service.delete(&SELLER, &mut client).unwrap(),
        DeleteOutcome::Archived
    );
    assert!(service
        .repo()
        .get(EntityKind::Client, 1, QueryOptions::with_archived())
        .unwrap()
        .is_archived());

    let mut event = service
        .repo()
        .get(EntityKind::Event, 2, QueryOptions::active_only())
        .unwrap();
    assert_eq!(
        service.delete(&ADMIN, &mut event).unwrap(),
        DeleteOutcome::Removed
    );
    let err = service
        .repo()
        .get(EntityKind::Event, 2, QueryOptions::with_archived())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn bootstrap_admin_is_created_once_and_can_sign_in() {
    let conn = open_db_in_memory().unwrap();
    let service = EntityService::new(&conn);

    assert!(service
        .ensure_bootstrap_admin("Root Admin", "root@corp.test", "s3cret")
        .unwrap());
    assert!(!service
        .ensure_bootstrap_admin("Root Admin", "root@corp.test", "other")
        .unwrap());

    let admin = service.authenticate("Root Admin", "s3cret").unwrap().unwrap();
    assert_eq!(admin.id, Some(1));
    assert_eq!(admin.role, Role::Admin);

    assert!(service.authenticate("Root Admin", "wrong").unwrap().is_none());
    assert!(service.authenticate("Nobody", "s3cret").unwrap().is_none());
}

#[test]
fn archived_collaborators_cannot_sign_in() {
    let conn = open_db_in_memory().unwrap();
    let service = EntityService::new(&conn);
    service
        .ensure_bootstrap_admin("Root Admin", "root@corp.test", "s3cret")
        .unwrap();

    let manager = service
        .create(
            &ADMIN,
            EntityKind::Collaborator,
            form(&[
                ("full_name", FieldValue::from("Greta Manager")),
                ("email", FieldValue::from("greta@corp.test")),
                ("role", FieldValue::from("gestion")),
                ("password", FieldValue::from("hunter22")),
            ]),
        )
        .unwrap();
    assert!(service
        .authenticate("Greta Manager", "hunter22")
        .unwrap()
        .is_some());

    let mut manager = manager;
    service.repo().soft_delete(&mut manager).unwrap();
    assert!(service
        .authenticate("Greta Manager", "hunter22")
        .unwrap()
        .is_none());
}
