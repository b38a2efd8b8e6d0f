use super::*;
use lode_archive::Dependency;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn ids(selection: &Selection, pkgs: &[Archive]) -> Vec<String> {
    selection
        .decls(pkgs)
        .map(|(_, d)| d.full_name.clone())
        .collect()
}

#[test]
fn roots_are_always_selected() {
    let pkgs = vec![Archive::new("main", "main")
        .with_decl(Decl::new("main.init").with_dep("main.Missing"))
        .with_decl(Decl::new("main.x"))];

    let selection = eliminate(&pkgs);
    assert_eq!(ids(&selection, &pkgs), vec!["main.init", "main.x"]);
}

#[test]
fn dependency_makes_declaration_eligible() {
    // D1 defines p.T; D2 is a method of T waiting on p.T; D3 is a root using p.T.
    let pkgs = vec![Archive::new("p", "p")
        .with_decl(Decl::new("D1").with_object_filter("T"))
        .with_decl(
            Decl::new("D2")
                .with_object_filter("T")
                .with_method_filter("m~")
                .with_dep("p.T"),
        )
        .with_decl(Decl::new("D3").with_dep("p.T").with_dep("p.m~"))];

    let selection = eliminate(&pkgs);
    assert_eq!(ids(&selection, &pkgs), vec!["D1", "D2", "D3"]);
}

#[test]
fn method_waits_for_both_filters() {
    let pkgs = vec![Archive::new("p", "p")
        .with_decl(Decl::new("T").with_object_filter("T"))
        .with_decl(Decl::new("T.m").with_object_filter("T").with_method_filter("m~"))
        .with_decl(Decl::new("root").with_dep("p.T"))];

    let selection = eliminate(&pkgs);
    assert_eq!(ids(&selection, &pkgs), vec!["T", "root"]);
}

#[test]
fn unreferenced_filter_is_excluded() {
    let pkgs = vec![Archive::new("p", "p")
        .with_decl(Decl::new("D1").with_object_filter("T"))
        .with_decl(Decl::new("D4").with_object_filter("Unused"))
        .with_decl(Decl::new("root").with_dep("p.T"))];

    let selection = eliminate(&pkgs);
    assert!(!selection.contains(DeclId::new(0, 1)));
    assert_eq!(selection.len(), 2);
}

#[test]
fn transitive_selection_across_packages() {
    let pkgs = vec![
        Archive::new("strings", "strings")
            .with_decl(Decl::new("strings.Builder").with_object_filter("Builder"))
            .with_decl(
                Decl::new("strings.Join")
                    .with_object_filter("Join")
                    .with_dep(Dependency::object("strings", "Builder").filter_key()),
            )
            .with_decl(Decl::new("strings.Split").with_object_filter("Split")),
        Archive::new("main", "main").with_decl(
            Decl::new("main.main")
                .with_dep(Dependency::object("strings", "Join").filter_key()),
        ),
    ];

    let selection = eliminate(&pkgs);
    assert_eq!(
        ids(&selection, &pkgs),
        vec!["strings.Builder", "strings.Join", "main.main"]
    );
    assert_eq!(selection.count_in(0), 2);
    assert_eq!(selection.count_in(1), 1);
}

#[test]
fn filter_keys_are_scoped_by_import_path() {
    let pkgs = vec![
        Archive::new("a", "a").with_decl(Decl::new("a.T").with_object_filter("T")),
        Archive::new("b", "b").with_decl(Decl::new("b.T").with_object_filter("T")),
        Archive::new("main", "main").with_decl(Decl::new("main").with_dep("b.T")),
    ];

    let selection = eliminate(&pkgs);
    assert_eq!(ids(&selection, &pkgs), vec!["b.T", "main"]);
}

#[test]
fn shared_method_filter_selects_every_implementation() {
    let pkgs = vec![Archive::new("p", "p")
        .with_decl(Decl::new("A").with_object_filter("A"))
        .with_decl(Decl::new("A.String").with_object_filter("A").with_method_filter("String~"))
        .with_decl(Decl::new("B").with_object_filter("B"))
        .with_decl(Decl::new("B.String").with_object_filter("B").with_method_filter("String~"))
        .with_decl(
            Decl::new("root")
                .with_dep("p.A")
                .with_dep("p.B")
                .with_dep(Dependency::method("p", "String").filter_key()),
        )];

    let selection = eliminate(&pkgs);
    assert_eq!(selection.len(), 5);
}

#[test]
fn identical_object_and_method_keys_select_once() {
    let pkgs = vec![Archive::new("p", "p")
        .with_decl(Decl::new("odd").with_object_filter("k").with_method_filter("k"))
        .with_decl(Decl::new("root").with_dep("p.k"))];

    let selection = eliminate(&pkgs);
    assert_eq!(ids(&selection, &pkgs), vec!["odd", "root"]);
}

#[test]
fn empty_program_selects_nothing() {
    assert!(eliminate(&[]).is_empty());
}

#[test]
fn all_selects_everything() {
    let pkgs = vec![
        Archive::new("a", "a").with_decl(Decl::new("x").with_object_filter("x")),
        Archive::new("b", "b").with_decl(Decl::new("y")).with_decl(Decl::new("z")),
    ];
    assert_eq!(Selection::all(&pkgs).len(), 3);
}

const PACKAGES: [&str; 2] = ["p0", "p1"];
const OBJECTS: [&str; 4] = ["A", "B", "C", "D"];
const METHODS: [&str; 2] = ["m~", "n~"];

fn arb_key() -> impl Strategy<Value = String> {
    (0..PACKAGES.len(), prop_oneof![
        (0..OBJECTS.len()).prop_map(|i| OBJECTS[i]),
        (0..METHODS.len()).prop_map(|i| METHODS[i]),
    ])
        .prop_map(|(p, local)| format!("{}.{local}", PACKAGES[p]))
}

fn arb_decl() -> impl Strategy<Value = Decl> {
    (
        proptest::option::of(0..OBJECTS.len()),
        proptest::option::of(0..METHODS.len()),
        proptest::collection::vec(arb_key(), 0..4),
    )
        .prop_map(|(object, method, deps)| {
            let mut decl = Decl::new("d");
            decl.object_filter = object.map(|i| OBJECTS[i].to_string());
            decl.method_filter = method.map(|i| METHODS[i].to_string());
            decl.deps = deps;
            decl
        })
}

fn arb_program() -> impl Strategy<Value = Vec<Archive>> {
    proptest::collection::vec(proptest::collection::vec(arb_decl(), 0..8), PACKAGES.len())
        .prop_map(|decls| {
            decls
                .into_iter()
                .zip(PACKAGES)
                .map(|(decls, path)| {
                    let mut archive = Archive::new(path, path);
                    archive.declarations = decls;
                    archive
                })
                .collect()
        })
}

/// Keep only the selected declarations of each package.
fn restrict(pkgs: &[Archive], selection: &Selection) -> Vec<Archive> {
    pkgs.iter()
        .enumerate()
        .map(|(p, pkg)| {
            let mut kept = Archive::new(pkg.import_path.clone(), pkg.name.clone());
            kept.declarations = selection.package_decls(p, pkg).cloned().collect();
            kept
        })
        .collect()
}

proptest! {
    #[test]
    fn elimination_is_idempotent(pkgs in arb_program()) {
        let selection = eliminate(&pkgs);
        let restricted = restrict(&pkgs, &selection);
        let again = eliminate(&restricted);
        prop_assert_eq!(again, Selection::all(&restricted));
    }

    #[test]
    fn roots_survive_any_configuration(pkgs in arb_program()) {
        let selection = eliminate(&pkgs);
        for (p, pkg) in pkgs.iter().enumerate() {
            for (i, decl) in pkg.declarations.iter().enumerate() {
                if decl.is_root() {
                    prop_assert!(selection.contains(DeclId::new(p, i)));
                }
            }
        }
    }

    #[test]
    fn selected_filters_are_all_used(pkgs in arb_program()) {
        let selection = eliminate(&pkgs);
        let used: FxHashSet<&str> = selection
            .decls(&pkgs)
            .flat_map(|(_, d)| d.deps.iter().map(String::as_str))
            .collect();
        for (id, decl) in selection.decls(&pkgs) {
            let path = &pkgs[id.package].import_path;
            for key in decl.object_filter_key(path).into_iter().chain(decl.method_filter_key(path)) {
                prop_assert!(used.contains(key.as_str()), "{} selected without {}", decl.full_name, key);
            }
        }
    }
}
