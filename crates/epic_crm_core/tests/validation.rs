use epic_crm_core::access::fields::descriptor;
use epic_crm_core::{
    open_db_in_memory, validate, Actor, EntityKind, FieldDescriptor, FieldValue, FormData, Role,
    ValidationContext,
};
use rusqlite::Connection;

fn seeded() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO collaborators (id, full_name, password, email, role) VALUES
            (1, 'Root Admin', 'x', 'root@corp.test', 'admin'),
            (3, 'Sam Seller', 'x', 'sam@corp.test', 'commercial'),
            (4, 'Ann Lee', 'x', 'ann@corp.test', 'support'),
            (6, 'Tom Trader', 'x', 'tom@corp.test', 'commercial');
         INSERT INTO clients (id, full_name, email, company_name, id_commercial) VALUES
            (1, 'Jane Doe', 'jane@corp.test', 'Acme', 3);
         INSERT INTO contracts (id, client_id, total_amount, amount_due, signed, archived) VALUES
            (1, 1, 1000.0, 200.0, 1, 0),
            (2, 1, 500.0, 500.0, 0, 0),
            (3, 1, 800.0, 0.0, 1, 0),
            (4, 1, 300.0, 0.0, 1, 1);
         INSERT INTO events (id, contract_id, support_id, title, start_date, end_date, participants) VALUES
            (1, 1, 4, 'Launch', '2025-06-10 09:00:00', '2025-06-10 18:00:00', 50);",
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

fn field(kind: EntityKind, name: &str) -> FieldDescriptor {
    descriptor(kind, name).unwrap()
}

fn check_contract_id(
    conn: &Connection,
    user: Actor,
    contract_id: i64,
) -> Result<FieldValue, String> {
    let data = form(&[("contract_id", FieldValue::Integer(contract_id))]);
    let ctx = ValidationContext::new(conn, &user, &data);
    validate(EntityKind::Event, &field(EntityKind::Event, "contract_id"), &ctx)
        .map_err(|err| err.message)
}

#[test]
fn amount_due_above_total_is_rejected() {
    let conn = seeded();
    let user = Actor::new(1, Role::Admin);
    let data = form(&[
        ("total_amount", FieldValue::Real(1000.0)),
        ("amount_due", FieldValue::from("1200")),
    ]);
    let ctx = ValidationContext::new(&conn, &user, &data);

    let err = validate(
        EntityKind::Contract,
        &field(EntityKind::Contract, "amount_due"),
        &ctx,
    )
    .unwrap_err();
    assert_eq!(err.field, "amount_due");
    assert!(err.message.contains("exceeds total"));
}

#[test]
fn unsigned_contract_cannot_host_an_event() {
    let conn = seeded();
    let err = check_contract_id(&conn, Actor::new(3, Role::Commercial), 2).unwrap_err();
    assert!(err.contains("must be signed"), "{err}");
}

#[test]
fn contract_with_event_is_rejected() {
    let conn = seeded();
    let err = check_contract_id(&conn, Actor::new(3, Role::Commercial), 1).unwrap_err();
    assert!(err.contains("already has a linked event"), "{err}");
}

#[test]
fn archived_contract_is_not_found() {
    let conn = seeded();
    let err = check_contract_id(&conn, Actor::new(3, Role::Commercial), 4).unwrap_err();
    assert!(err.contains("not found"), "{err}");
}

#[test]
fn only_the_owning_commercial_or_admin_may_use_a_contract() {
    let conn = seeded();
    assert_eq!(
        check_contract_id(&conn, Actor::new(3, Role::Commercial), 3),
        Ok(FieldValue::Integer(3))
    );
    assert!(check_contract_id(&conn, Actor::new(6, Role::Commercial), 3).is_err());
    assert_eq!(
        check_contract_id(&conn, Actor::new(1, Role::Admin), 3),
        Ok(FieldValue::Integer(3))
    );
}

#[test]
fn collaborator_name_must_be_unique() {
    let conn = seeded();
    let user = Actor::new(1, Role::Admin);
    let data = form(&[("full_name", FieldValue::from("Sam Seller"))]);
    let ctx = ValidationContext::new(&conn, &user, &data);
    let err = validate(
        EntityKind::Collaborator,
        &field(EntityKind::Collaborator, "full_name"),
        &ctx,
    )
    .unwrap_err();
    assert!(err.message.contains("already in use"));
}

#[test]
fn client_dates_are_normalized() {
    let conn = seeded();
    let user = Actor::new(3, Role::Commercial);
    let data = form(&[("last_contact_date", FieldValue::from("05/02/2025"))]);
    let ctx = ValidationContext::new(&conn, &user, &data);
    let value = validate(
        EntityKind::Client,
        &field(EntityKind::Client, "last_contact_date"),
        &ctx,
    )
    .unwrap();
    assert_eq!(
        value,
        FieldValue::Date(chrono::NaiveDate::from_ymd_opt(2025, 2, 5).unwrap())
    );
}

#[test]
fn missing_validator_is_a_hard_error() {
    let conn = seeded();
    let user = Actor::new(1, Role::Admin);
    let data = form(&[("client.company_name", FieldValue::from("Acme"))]);
    let ctx = ValidationContext::new(&conn, &user, &data);
    let err = validate(
        EntityKind::Contract,
        &field(EntityKind::Contract, "client.company_name"),
        &ctx,
    )
    .unwrap_err();
    assert!(err.message.contains("validate_client.company_name"));
}
