use super::*;
use pretty_assertions::assert_eq;

fn install(packages: &mut PackageMap, export: &ExportData) -> Result<(), DecodeError> {
    let bytes = export
        .to_bytes()
        .unwrap_or_else(|e| panic!("export data: {e}"));
    let record = PackageRecord::import(&export.path, &export.name, &bytes, packages)?;
    packages.insert(record);
    Ok(())
}

fn errors_package() -> ExportData {
    ExportData::new("errors", "errors")
        .with_object("New", ObjectKind::Func, TypeRef::Func {
            params: vec![TypeRef::basic("string")],
            results: vec![TypeRef::basic("error")],
        })
        .with_object("errorString", ObjectKind::Type, TypeRef::basic("struct"))
}

#[test]
fn empty_export_data_exports_nothing() {
    let packages = PackageMap::new();
    let record = PackageRecord::import("runtime", "runtime", &[], &packages)
        .unwrap_or_else(|e| panic!("import: {e}"));

    assert_eq!(record.path, "runtime");
    assert!(record.object_names().is_empty());
    assert!(record.imports.is_empty());
}

#[test]
fn cross_package_references_resolve() {
    let mut packages = PackageMap::new();
    install(&mut packages, &errors_package()).unwrap_or_else(|e| panic!("errors: {e}"));

    let os = ExportData::new("os", "os")
        .with_import("errors")
        .with_object(
            "ErrNotExist",
            ObjectKind::Var,
            TypeRef::named("errors", "errorString"),
        )
        .with_object(
            "Lookup",
            ObjectKind::Func,
            TypeRef::Func {
                params: vec![TypeRef::Map {
                    key: Box::new(TypeRef::basic("string")),
                    value: Box::new(TypeRef::named("os", "File")),
                }],
                results: vec![],
            },
        );
    install(&mut packages, &os).unwrap_or_else(|e| panic!("os: {e}"));

    let record = packages.get("os").unwrap_or_else(|| panic!("os missing"));
    assert_eq!(record.object_names(), vec!["ErrNotExist", "Lookup"]);
    assert_eq!(record.imports[0].name, "errors");
}

#[test]
fn unknown_package_reference_fails() {
    let mut packages = PackageMap::new();
    let os = ExportData::new("os", "os").with_object(
        "ErrNotExist",
        ObjectKind::Var,
        TypeRef::Slice(Box::new(TypeRef::named("errors", "errorString"))),
    );

    let err = install(&mut packages, &os).err();
    assert!(matches!(
        err,
        Some(DecodeError::UnresolvedPackage { ref path, ref package })
            if path == "os" && package == "errors"
    ));
    assert!(packages.is_empty());
}

#[test]
fn unknown_object_reference_fails() {
    let mut packages = PackageMap::new();
    install(&mut packages, &errors_package()).unwrap_or_else(|e| panic!("errors: {e}"));

    let os = ExportData::new("os", "os").with_object(
        "Err",
        ObjectKind::Var,
        TypeRef::named("errors", "Missing"),
    );

    let err = install(&mut packages, &os).err();
    assert!(matches!(
        err,
        Some(DecodeError::UnresolvedObject { ref name, .. }) if name == "Missing"
    ));
}

#[test]
fn garbage_export_data_is_malformed() {
    let packages = PackageMap::new();
    let err = PackageRecord::import("p", "p", &[0xff, 0xff, 0xff], &packages).err();
    assert!(matches!(
        err,
        Some(DecodeError::MalformedExportData { ref path, .. }) if path == "p"
    ));
}

#[test]
fn insert_replaces_existing_record() {
    let mut packages = PackageMap::new();
    install(&mut packages, &ExportData::new("p", "p")).unwrap_or_else(|e| panic!("{e}"));
    install(
        &mut packages,
        &ExportData::new("p", "p").with_object("X", ObjectKind::Const, TypeRef::basic("int")),
    )
    .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(packages.len(), 1);
    assert!(packages
        .get("p")
        .is_some_and(|p| p.lookup("X").is_some()));
}
