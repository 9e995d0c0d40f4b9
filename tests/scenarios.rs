//! End-to-end tests for building aggregate schemas
//!
//! Fixtures live in `tests/fixtures/` and go through the same loader the CLI
//! uses.

use std::path::Path;
use std::sync::Arc;

use aggregate_schema::config::NamingConfig;
use aggregate_schema::naming::NameResolver;
use aggregate_schema::source::{load_from_directory, load_from_path, parse_str, LoadConfig};
use aggregate_schema::{
    AggregateDef, AggregateId, AggregateKind, AppSchema, Backend, BuildPhase, DiagnosticCode,
    MemberDef, MemberKind, MemberType, SchemaConfig, SchemaSource,
};

fn fixtures_path() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").leak()
}

fn fixture(name: &str) -> SchemaSource {
    load_from_path(&fixtures_path().join(name)).unwrap()
}

fn sales() -> AppSchema {
    AppSchema::try_from(fixture("sales.json")).unwrap()
}

fn key_paths(schema: &AppSchema, schema_id: &str) -> Vec<String> {
    let aggregate = schema.find(schema_id).unwrap();
    schema.key_members(aggregate.id).map(|m| m.path.clone()).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_two_independent_roots() {
    let schema = AppSchema::try_from(fixture("two_roots.json")).unwrap();
    assert_eq!(schema.all_aggregates().len(), 2);
    assert_eq!(schema.roots().count(), 2);
    assert!(schema.warnings().is_empty());
}

#[test]
fn test_root_keys_and_instance_name() {
    let mut source = SchemaSource::new();
    source.add_aggregate(
        AggregateDef::root("営業所")
            .with_member(MemberDef::value("営業所ID", "identifier").key())
            .with_member(MemberDef::value("営業所名", "word").instance_name()),
    );
    let schema = AppSchema::try_from(source).unwrap();
    let office = schema.find("営業所").unwrap().id;

    let keys: Vec<_> = schema.key_members(office).map(|m| m.name.as_str()).collect();
    assert_eq!(keys, vec!["営業所ID"]);
    assert_eq!(
        schema.instance_name_member(office).map(|m| m.name.as_str()),
        Some("営業所名")
    );
}

#[test]
fn test_keyless_children_get_sequence_key() {
    let schema = sales();
    let office = schema.find("営業所").unwrap();
    let staff = schema.find("営業所/担当者").unwrap();

    let mut expected: Vec<_> = schema.keys(office.id).to_vec();
    expected.push(staff.members[0].id);
    assert_eq!(schema.keys(staff.id), expected.as_slice());

    let sequence = &staff.members[0];
    assert!(sequence.implicit && sequence.is_key && !sequence.nullable);
    assert_eq!(sequence.name, "seq");
}

#[test]
fn test_sales_fixture_shape() {
    let schema = sales();
    let ids: Vec<_> = schema.all_aggregates().iter().map(|a| a.schema_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "営業所",
            "営業所/担当者",
            "営業所/直営",
            "営業所/代理店",
            "顧客",
            "注文",
            "注文/明細",
            "注文/配送",
        ]
    );
    assert_eq!(schema.application_name(), Some("販売管理"));
    assert!(schema.fingerprint().is_some());

    assert_eq!(key_paths(&schema, "営業所/直営"), vec!["営業所.営業所ID"]);
    assert_eq!(key_paths(&schema, "注文/明細"), vec!["注文.注文番号", "注文/明細.行番号"]);
    assert_eq!(key_paths(&schema, "注文/配送"), vec!["注文.注文番号"]);

    let office = schema.find("営業所").unwrap().id;
    let variants: Vec<_> = schema
        .descendants(office, Some(AggregateKind::Variation))
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(variants, vec!["直営", "代理店"]);

    let customer = schema.find("顧客").unwrap();
    let referrers: Vec<_> = schema.referrers(customer.id).iter().map(|a| a.name.clone()).collect();
    assert_eq!(referrers, vec!["注文"]);

    // reserved member names are prefixed with the aggregate
    let shipping = schema.find("注文/配送").unwrap();
    assert_eq!(shipping.member_named("Type").unwrap().physical_name, "配送_Type");
}

#[test]
fn test_enumeration_numbering() {
    let schema = sales();
    let division = schema.enumeration("区分").unwrap();
    let numbered: Vec<_> = division.items.iter().map(|i| (i.name.as_str(), i.value)).collect();
    assert_eq!(numbered, vec![("通常", 1), ("特別", 0), ("臨時", 2)]);
}

#[test]
fn test_variation_switch_gets_an_enumeration() {
    let schema = sales();
    let switch = schema.enumeration("E_形態").unwrap();
    let numbered: Vec<_> = switch.items.iter().map(|i| (i.name.as_str(), i.value)).collect();
    assert_eq!(numbered, vec![("直営", 1), ("代理店", 2)]);
    assert_eq!(switch.switch.as_deref(), Some("営業所.形態"));

    let member = schema.find("営業所").unwrap().member_named("形態").unwrap();
    assert_eq!(member.representable_type_name(Backend::Server).as_deref(), Some("E_形態"));
    assert_eq!(
        member.representable_type_name(Backend::Client).as_deref(),
        Some("'直営' | '代理店'")
    );

    // derived again on load, never written out
    let document = schema.to_document();
    let written: Vec<_> = document.enums.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(written, vec!["区分"]);
}

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn test_every_owned_aggregate_has_exactly_one_owner() {
    let schema = sales();
    for aggregate in schema.all_aggregates() {
        let owning_members = schema
            .all_aggregates()
            .iter()
            .flat_map(|a| a.members.iter())
            .filter(|m| match &m.kind {
                MemberKind::Child { target }
                | MemberKind::Children { target } => *target == aggregate.id,
                MemberKind::Variation { variants, .. } => {
                    variants.iter().any(|v| v.target == aggregate.id)
                }
                _ => false,
            })
            .count();
        if aggregate.is_root() {
            assert_eq!(owning_members, 0, "{}", aggregate.schema_id);
            assert!(schema.owner(aggregate.id).is_none());
        } else {
            assert_eq!(owning_members, 1, "{}", aggregate.schema_id);
            assert!(schema.owner(aggregate.id).is_some());
        }
    }
}

#[test]
fn test_keys_are_deterministic() {
    let first = sales();
    let second = sales();
    for (a, b) in first.all_aggregates().iter().zip(second.all_aggregates()) {
        let left: Vec<_> = first.key_members(a.id).map(|m| m.path.clone()).collect();
        let right: Vec<_> = second.key_members(b.id).map(|m| m.path.clone()).collect();
        assert_eq!(left, right);
        assert_eq!(first.keys(a.id), first.keys(a.id));
    }
}

#[test]
fn test_round_trip_through_interchange_form() {
    let schema = sales();
    let written = serde_json::to_string_pretty(&schema.to_document()).unwrap();
    let rebuilt = AppSchema::try_from(parse_str(&written).unwrap()).unwrap();

    assert_eq!(schema.len(), rebuilt.len());
    for (a, b) in schema.all_aggregates().iter().zip(rebuilt.all_aggregates()) {
        assert_eq!(a.schema_id, b.schema_id);
        assert_eq!(a.physical_name, b.physical_name);
        assert_eq!(a.kind, b.kind);

        let tags = |s: &AppSchema, id: AggregateId| {
            s.members(id)
                .iter()
                .map(|m| (m.physical_name.clone(), m.kind.tag().to_string()))
                .collect::<Vec<_>>()
        };
        assert_eq!(tags(&schema, a.id), tags(&rebuilt, b.id));

        let owner = |s: &AppSchema, id: AggregateId| s.owner(id).map(|o| o.schema_id.clone());
        assert_eq!(owner(&schema, a.id), owner(&rebuilt, b.id));

        assert_eq!(key_paths(&schema, &a.schema_id), key_paths(&rebuilt, &b.schema_id));
    }
    assert_eq!(schema.enumerations(), rebuilt.enumerations());
}

#[test]
fn test_disambiguation_is_idempotent() {
    let resolver = NameResolver::new(&NamingConfig::default());
    let once = resolver.disambiguate("明細", "注文");
    assert_eq!(once, "注文_明細");
    assert_eq!(resolver.disambiguate(&once, "注文"), once);

    let mut source = SchemaSource::new();
    for root in ["注文", "見積"] {
        source.add_aggregate(
            AggregateDef::root(root)
                .with_member(MemberDef::value("番号", "word").key())
                .with_member(MemberDef::children("明細", format!("{root}/明細"))),
        );
        source.add_aggregate(AggregateDef::new(format!("{root}/明細"), "明細", AggregateKind::Children));
    }
    let schema = AppSchema::try_from(source).unwrap();
    for aggregate in schema.all_aggregates() {
        if let Some(owner) = schema.owner(aggregate.id) {
            assert_eq!(
                resolver.disambiguate(&aggregate.physical_name, &owner.physical_name),
                aggregate.physical_name
            );
        }
    }
    assert_eq!(schema.find("見積/明細").unwrap().physical_name, "見積_明細");
}

#[test]
fn test_concurrent_reads() {
    let schema = Arc::new(sales());
    let expected: Vec<Vec<String>> = schema
        .all_aggregates()
        .iter()
        .map(|a| schema.key_members(a.id).map(|m| m.physical_name.clone()).collect())
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let schema = Arc::clone(&schema);
            let expected = &expected;
            scope.spawn(move || {
                let keys: Vec<Vec<String>> = schema
                    .all_aggregates()
                    .iter()
                    .map(|a| schema.key_members(a.id).map(|m| m.physical_name.clone()).collect())
                    .collect();
                assert_eq!(&keys, expected);
            });
        }
    });
}

// =============================================================================
// Defects
// =============================================================================

#[test]
fn test_cycle_is_rejected_with_its_path() {
    let mut source = SchemaSource::new();
    source.add_aggregate(
        AggregateDef::root("本社").with_member(MemberDef::value("本社ID", "identifier").key()),
    );
    source.add_aggregate(
        AggregateDef::new("X", "X", AggregateKind::Child).with_member(MemberDef::child("y", "Y")),
    );
    source.add_aggregate(
        AggregateDef::new("Y", "Y", AggregateKind::Child).with_member(MemberDef::child("x", "X")),
    );

    let failure = AppSchema::try_from(source).unwrap_err();
    assert_eq!(failure.error_codes(), vec![DiagnosticCode::CyclicOwnership]);
    let item = failure.diagnostics.errors().next().unwrap();
    assert!(item.paths.contains(&"X".to_string()));
    assert!(item.paths.contains(&"Y".to_string()));
    assert_eq!(item.phase, BuildPhase::Structural);
}

#[test]
fn test_unresolved_reference_names_member_and_target() {
    let mut source = SchemaSource::new();
    source.add_aggregate(
        AggregateDef::root("Customer").with_member(MemberDef::value("CustomerId", "identifier").key()),
    );
    source.add_aggregate(
        AggregateDef::root("Invoice")
            .with_member(MemberDef::value("InvoiceNo", "word").key())
            .with_member(MemberDef::reference("Buyer", "Custmer")),
    );

    let failure = AppSchema::try_from(source.clone()).unwrap_err();
    assert_eq!(failure.error_codes(), vec![DiagnosticCode::UnresolvedReference]);
    let item = failure.diagnostics.errors().next().unwrap();
    assert_eq!(item.paths, vec!["Invoice.Buyer", "Custmer"]);
    assert_eq!(item.context, vec!["did you mean 'Customer'?"]);

    let mut config = SchemaConfig::default();
    config.validation.suggest_references = false;
    let quiet = AppSchema::build(source, &config).unwrap_err();
    assert!(quiet.diagnostics.errors().next().unwrap().context.is_empty());
}

#[test]
fn test_phase_reports_every_defect_and_stops() {
    let failure = AppSchema::try_from(fixture("structural_defects.json")).unwrap_err();
    assert_eq!(
        failure.error_codes(),
        vec![
            DiagnosticCode::UnknownMemberType,
            DiagnosticCode::UnknownMemberType,
            DiagnosticCode::DuplicateMemberName,
        ]
    );
    assert!(failure.diagnostics.iter().all(|d| d.phase == BuildPhase::Structural));
    // the dangling ref belongs to a later phase
    assert!(!failure.has(DiagnosticCode::UnresolvedReference));
}

#[test]
fn test_duplicate_discriminator_and_variant_key() {
    let failure = AppSchema::try_from(fixture("bad_variation.json")).unwrap_err();
    assert_eq!(
        failure.error_codes(),
        vec![DiagnosticCode::DuplicateDiscriminator, DiagnosticCode::VariantHasOwnKey]
    );
    let own_key = failure
        .diagnostics
        .with_code(DiagnosticCode::VariantHasOwnKey)
        .next()
        .unwrap();
    assert_eq!(own_key.paths[0], "契約/法人");
}

#[test]
fn test_name_collisions_are_reported() {
    let mut source = SchemaSource::new();
    source.add_aggregate(
        AggregateDef::root("売上 明細").with_member(MemberDef::value("番号", "word").key()),
    );
    source.add_aggregate(
        AggregateDef::root("売上-明細")
            .with_member(MemberDef::value("番号", "word").key())
            .with_member(MemberDef::value("単価-税込", "numeric"))
            .with_member(MemberDef::value("単価_税込", "numeric")),
    );

    let failure = AppSchema::try_from(source).unwrap_err();
    assert_eq!(
        failure.error_codes(),
        vec![DiagnosticCode::NameCollision, DiagnosticCode::NameCollision]
    );
    let mut items = failure.diagnostics.errors();
    assert_eq!(items.next().unwrap().paths, vec!["売上 明細", "売上-明細"]);
    assert_eq!(
        items.next().unwrap().paths,
        vec!["売上-明細.単価-税込", "売上-明細.単価_税込"]
    );
}

#[test]
fn test_missing_key_on_keyless_root_and_its_child() {
    let mut source = SchemaSource::new();
    source.add_aggregate(
        AggregateDef::root("R")
            .with_member(MemberDef::value("名称", "word"))
            .with_member(MemberDef::child("c", "R/c"))
            .with_member(MemberDef::children("l", "R/l")),
    );
    source.add_aggregate(AggregateDef::new("R/c", "c", AggregateKind::Child));
    source.add_aggregate(AggregateDef::new("R/l", "l", AggregateKind::Children));

    let failure = AppSchema::try_from(source).unwrap_err();
    let missing: Vec<_> = failure
        .diagnostics
        .errors()
        .map(|d| (d.code, d.paths.clone()))
        .collect();
    // the children aggregate still gets its sequence key
    assert_eq!(
        missing,
        vec![
            (DiagnosticCode::MissingKey, vec!["R".to_string()]),
            (DiagnosticCode::MissingKey, vec!["R/c".to_string()]),
        ]
    );
    assert!(failure.diagnostics.iter().all(|d| d.phase == BuildPhase::Key));
}

#[test]
fn test_ownership_forest_defects() {
    let mut source = SchemaSource::new();
    source.add_aggregate(
        AggregateDef::root("A")
            .with_member(MemberDef::value("AID", "identifier").key())
            .with_member(MemberDef::child("x", "A/x"))
            .with_member(MemberDef::child("b", "B"))
            .with_member(MemberDef::children("l1", "L"))
            .with_member(MemberDef::children("l2", "L")),
    );
    source.add_aggregate(
        AggregateDef::root("B").with_member(MemberDef::value("BID", "identifier").key()),
    );
    source.add_aggregate(AggregateDef::new("L", "L", AggregateKind::Children));
    source.add_aggregate(AggregateDef::new("O", "O", AggregateKind::Child));

    let failure = AppSchema::try_from(source).unwrap_err();
    assert_eq!(
        failure.error_codes(),
        vec![
            DiagnosticCode::UnknownAggregate,
            DiagnosticCode::OwnershipKindMismatch,
            DiagnosticCode::MultipleOwners,
            DiagnosticCode::OrphanAggregate,
        ]
    );
    let paths = |code| {
        failure
            .diagnostics
            .with_code(code)
            .flat_map(|d| d.paths.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(paths(DiagnosticCode::UnknownAggregate), vec!["A.x"]);
    assert_eq!(paths(DiagnosticCode::OwnershipKindMismatch), vec!["A.b", "B"]);
    assert_eq!(paths(DiagnosticCode::MultipleOwners), vec!["L", "A.l1", "A.l2"]);
    assert_eq!(paths(DiagnosticCode::OrphanAggregate), vec!["O"]);
}

#[test]
fn test_reference_to_owned_aggregate_is_rejected() {
    let mut source = SchemaSource::new();
    source.add_aggregate(
        AggregateDef::root("注文")
            .with_member(MemberDef::value("注文番号", "word").key())
            .with_member(MemberDef::children("明細", "注文/明細"))
            .with_member(MemberDef::reference("先頭行", "注文/明細")),
    );
    source.add_aggregate(AggregateDef::new("注文/明細", "明細", AggregateKind::Children));

    let failure = AppSchema::try_from(source).unwrap_err();
    assert_eq!(failure.error_codes(), vec![DiagnosticCode::RefTargetNotRoot]);
    let item = failure.diagnostics.errors().next().unwrap();
    assert_eq!(item.paths, vec!["注文.先頭行", "注文/明細"]);
    assert_eq!(item.phase, BuildPhase::Reference);
}

#[test]
fn test_empty_switch_and_blank_discriminator() {
    let mut source = SchemaSource::new();
    source.add_aggregate(
        AggregateDef::root("契約")
            .with_member(MemberDef::value("契約番号", "word").key())
            .with_member(MemberDef::variation("空", Vec::<(&str, &str)>::new()))
            .with_member(MemberDef::variation("種別", [(" ", "契約/個人"), ("2", "契約/法人")])),
    );
    source.add_aggregate(AggregateDef::new("契約/個人", "個人", AggregateKind::Variation));
    source.add_aggregate(AggregateDef::new("契約/法人", "法人", AggregateKind::Variation));

    let failure = AppSchema::try_from(source).unwrap_err();
    assert_eq!(
        failure.error_codes(),
        vec![DiagnosticCode::EmptyVariationSwitch, DiagnosticCode::EmptyDiscriminator]
    );
    assert!(failure.diagnostics.iter().all(|d| d.phase == BuildPhase::Variation));
}

#[test]
fn test_two_instance_names_are_rejected() {
    let mut source = SchemaSource::new();
    source.add_aggregate(
        AggregateDef::root("顧客")
            .with_member(MemberDef::value("顧客ID", "identifier").key())
            .with_member(MemberDef::value("氏名", "word").instance_name())
            .with_member(MemberDef::value("略称", "word").instance_name()),
    );

    let failure = AppSchema::try_from(source).unwrap_err();
    assert_eq!(failure.error_codes(), vec![DiagnosticCode::DuplicateInstanceName]);
    assert_eq!(
        failure.diagnostics.errors().next().unwrap().paths,
        vec!["顧客.氏名", "顧客.略称"]
    );
}

#[test]
fn test_enumeration_named_like_a_builtin_type() {
    let source = parse_str(
        r#"{
            "enums": [ { "name": "Date", "items": [ { "name": "A" }, { "name": "B" } ] } ],
            "aggregates": [ { "name": "予定", "members": [
                { "name": "予定ID", "kind": "identifier", "primary": true },
                { "name": "d", "kind": "Date" } ] } ]
        }"#,
    )
    .unwrap();

    let failure = AppSchema::try_from(source).unwrap_err();
    assert_eq!(failure.error_codes(), vec![DiagnosticCode::InvalidEnumeration]);
    assert_eq!(failure.diagnostics.errors().next().unwrap().paths, vec!["Date"]);
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_directory_of_files_builds_as_one_schema() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("customer.json"),
        r#"{ "aggregates": [ { "name": "顧客", "members": [
            { "name": "顧客ID", "kind": "identifier", "primary": true } ] } ] }"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("order.json"),
        r#"{ "aggregates": [ { "name": "注文", "members": [
            { "name": "注文番号", "kind": "word", "primary": true },
            { "name": "顧客", "kind": "ref", "refTarget": "顧客" } ] } ] }"#,
    )
    .unwrap();

    let source = load_from_directory(dir.path(), &LoadConfig::default()).unwrap();
    let schema = AppSchema::try_from(source).unwrap();
    let order = schema.find("注文").unwrap();
    let target = schema.resolve_ref(order.member_named("顧客").unwrap()).unwrap();
    assert_eq!(target.schema_id, "顧客");
}

#[test]
fn test_ids_duplicated_across_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for file in ["two_roots.json", "sales.json"] {
        std::fs::copy(fixtures_path().join(file), dir.path().join(file)).unwrap();
    }
    let source = load_from_directory(dir.path(), &LoadConfig::default()).unwrap();
    let failure = AppSchema::try_from(source).unwrap_err();
    assert_eq!(failure.error_codes(), vec![DiagnosticCode::DuplicateNodeId]);
    assert_eq!(failure.diagnostics.errors().next().unwrap().paths, vec!["顧客"]);
}
