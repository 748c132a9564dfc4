//! Whole-script regression tests against the fixture library and scene
//!
//! The fixture library holds one malformed snippet on purpose; every test
//! here relies on the rest of the library loading around it.

use std::path::Path;

use pretty_assertions::assert_eq;

use snipgen::library::DiagnosticKind;
use snipgen::{
    DistinctColors, Generator, GeneratorConfig, LibraryRegistry, LoopStyle, MessageCatalog, ParseError,
    Scene, World,
};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load() -> (LibraryRegistry, World) {
    let mut registry = LibraryRegistry::new();
    registry
        .load_file(&fixture("network.tcl"))
        .expect("Library should load");
    let scene = Scene::from_file(&fixture("network.toml")).expect("Scene should parse");
    let world = scene.build(&registry).expect("Scene should build");
    (registry, world)
}

#[test]
fn test_fixture_library_partial_load() {
    let mut registry = LibraryRegistry::new();
    let diagnostics = registry.load_file(&fixture("network.tcl")).unwrap();

    let library = registry.library("Network").unwrap();
    assert_eq!(library.toolbar_name(), "NS-2 Basic");
    let names: Vec<&str> = library.iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        vec!["Simulator", "Node", "TCP", "FTP", "Colors", "Link", "Attach", "Bind"]
    );

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].block, 4);
    assert_eq!(diagnostics[0].line, 26);
    match &diagnostics[0].kind {
        DiagnosticKind::Parse(errors) => {
            assert!(matches!(errors[0], ParseError::MissingMarker { marker: ":", .. }))
        }
        other => panic!("Expected a parse diagnostic, got {:?}", other),
    }
}

#[test]
fn test_fixture_script() {
    let (_, mut world) = load();
    let generator = Generator::default().with_pre_pass("Colors", DistinctColors);
    let script = generator.assemble(&mut world);

    insta::assert_snapshot!(script, @r###"
    set ns [new Simulator]
    $ns namtrace-all [open out.nam w]
    $ns at 10.0 "exit 0"
    set n0 [$ns node]
    for {set i 0} {$i<4} {incr i} {
    set n1($i) [$ns node]
    $n1($i) shape box
    }
    for {set i 0} {$i<4} {incr i} {
    $ns duplex-link $n0 $n1($i) 10Mb 10ms DropTail
    }
    set tcp0 [new Agent/TCP/Reno]
    $tcp0 set window_ 20
    $ns attach-agent $n0 $tcp0
    set ftp0 [new Application/FTP]
    $ns at 1.0 "$ftp0 start"
    $ns at 9.0 "$ftp0 stop"
    $ftp0 attach-agent $tcp0
    $ns color 1 red
    $ns color 2 black
    $ns run
    "###);
}

#[test]
fn test_colors_untouched_without_pre_pass() {
    let (_, world) = load();
    let script = Generator::default().assemble_prepared(&world);
    assert!(script.contains("$ns color 1 red\n$ns color 2 red\n$ns run"));
}

#[test]
fn test_dual_array_link_styles() {
    let (registry, mut world) = load();
    let j = world.add_array("j", 2);
    let n0 = world.get_by_name("n0").unwrap().id();
    world.set_array_index(n0, Some(j)).unwrap();

    let link = world.get_by_name("l0").unwrap();
    let nested = Generator::default().to_text(&world, link);
    assert_eq!(
        nested,
        "for {set j 0} {$j<2} {incr j} {\n  for {set i 0} {$i<4} {incr i} {\n$ns duplex-link $n0($j) $n1($i) 10Mb 10ms DropTail\n  }\n}"
    );

    let legacy = Generator::new(GeneratorConfig::new().with_loop_style(LoopStyle::Legacy));
    assert_eq!(
        legacy.to_text(&world, link),
        "for {set j 0} {$j<2} {incr j} {\n  for {set i 0} {$i<4} {incr i} {\n$ns duplex-link $n0($j) $n1($i) 10Mb 10ms DropTail\n}\n  }"
    );
    assert!(registry.snippet("Link").is_some());
}

#[test]
fn test_removing_array_unrolls_loops() {
    let (_, mut world) = load();
    world.remove_array(0).unwrap();

    let n1 = world.get_by_name("n1").unwrap();
    assert_eq!(n1.array_index(), None);
    assert_eq!(
        Generator::default().to_text(&world, n1),
        "set n1 [$ns node]\n$n1 shape box"
    );
}

#[test]
fn test_cascading_removal() {
    let (_, mut world) = load();
    let n0 = world.get_by_name("n0").unwrap().id();
    let removed = world.remove_instance(n0).unwrap();

    assert_eq!(removed.len(), 3);
    assert!(world.get_by_name("l0").is_none());
    assert!(world.get_by_name("Attach0").is_none());
    assert!(world.get_by_name("Bind0").is_some());

    let script = Generator::default().assemble_prepared(&world);
    assert!(!script.contains("n0"));
}

#[test]
fn test_custom_catalog_and_separator() {
    let mut registry = LibraryRegistry::new();
    registry
        .load_str("Pct\nPct\n1\n!entity Sim env 4 : begin set %name% [new Simulator]; %missing%; bad %tag; end\n")
        .unwrap();
    let env = registry.snippet("Sim").unwrap().clone();
    let world = World::new(env, "sim").unwrap();

    let messages = MessageCatalog::from_str(
        "[messages]\nbad_pattern = \"# malformed\"\nnot_found_suffix = \"?\"\n",
    )
    .unwrap();
    let config = GeneratorConfig::new()
        .with_separator('%')
        .with_messages(messages);

    assert_eq!(
        Generator::new(config).assemble_prepared(&world),
        "set sim [new Simulator]\nmissing?\n# malformed\n$sim run"
    );
}
